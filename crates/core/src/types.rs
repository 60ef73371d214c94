//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 패키지 그래프 공급자(외부 analyzer)가 전달하는 패키지 메타데이터와,
//! 스캔 과정에서 발생하는 이슈를 표현하는 타입을 정의합니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 패키지 식별자
///
/// `kind:namespace:name:version` 좌표 형식으로 패키지를 고유하게 식별합니다.
/// 예: `cargo::serde:1.0.200`, `maven:org.apache:commons-lang3:3.14.0`
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Identifier {
    /// 패키지 관리자 종류 (cargo, maven, npm 등)
    pub kind: String,
    /// 네임스페이스 (그룹 ID, 스코프 등 -- 없으면 빈 문자열)
    pub namespace: String,
    /// 패키지명
    pub name: String,
    /// 버전
    pub version: String,
}

impl Identifier {
    /// 좌표 문자열을 반환합니다.
    pub fn coordinates(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.kind, self.namespace, self.name, self.version
        )
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinates())
    }
}

/// VCS 종류
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VcsType {
    /// Git
    Git,
    /// Mercurial
    Mercurial,
    /// Subversion
    Subversion,
    /// 알 수 없는 VCS
    #[default]
    Unknown,
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Mercurial => write!(f, "mercurial"),
            Self::Subversion => write!(f, "subversion"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// VCS 소스 위치 정보
///
/// 패키지 메타데이터에 선언된 저장소 위치를 나타냅니다.
/// `revision`은 선언된(요청된) 리비전이며, 해소된 리비전은
/// [`RepositoryProvenance`](crate::provenance::RepositoryProvenance)가 별도로 가집니다.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VcsInfo {
    /// VCS 종류
    pub vcs_type: VcsType,
    /// 저장소 URL
    pub url: String,
    /// 선언된 리비전 (태그, 브랜치, 커밋 해시)
    pub revision: String,
}

impl VcsInfo {
    /// URL과 리비전이 모두 채워져 있는지 반환합니다.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.revision.is_empty()
    }
}

/// 아티팩트 콘텐츠 해시
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ArtifactHash {
    /// 해시 값 (hex)
    pub value: String,
    /// 해시 알고리즘 (sha256 등)
    pub algorithm: String,
}

/// 소스 아티팩트
///
/// 다운로드 가능한 소스 압축 파일과 그 콘텐츠 해시를 나타냅니다.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RemoteArtifact {
    /// 다운로드 URL
    pub url: String,
    /// 콘텐츠 해시
    pub hash: ArtifactHash,
}

impl fmt::Display for RemoteArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.url, self.hash.algorithm, self.hash.value)
    }
}

/// 스캔 대상 패키지
///
/// 외부 패키지 그래프 공급자가 VCS/아티팩트 메타데이터를 채워 전달합니다.
/// 분석 이후에는 불변입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// 패키지 식별자
    pub id: Identifier,
    /// 선언된 VCS 위치
    #[serde(default)]
    pub vcs: VcsInfo,
    /// 소스 아티팩트 (있을 경우)
    #[serde(default)]
    pub source_artifact: Option<RemoteArtifact>,
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// 이슈 심각도
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Hint < Warning < Error`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// 참고성 정보
    Hint,
    /// 경고
    #[default]
    Warning,
    /// 오류 -- 결과가 불완전할 수 있음
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hint => write!(f, "Hint"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// 스캔 과정에서 발생한 이슈
///
/// 실행을 중단시키지 않는 문제(해소 실패, 다운로드 실패, 스캐너 오류 등)를
/// 결과에 첨부하여 전달합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 발생 시각
    pub timestamp: SystemTime,
    /// 발생 주체 (Downloader, 스캐너 이름 등)
    pub source: String,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
    /// 심각도
    pub severity: Severity,
}

impl Issue {
    /// 오류 심각도의 이슈를 생성합니다.
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source: source.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.message)
    }
}
