//! 프로비넌스 -- 소스 콘텐츠의 불변 식별자
//!
//! 프로비넌스는 이 시스템의 콘텐츠 식별 키입니다. 두 프로비넌스가 같으면
//! 같은 불변 소스 콘텐츠를 가리키며, 따라서 캐시된 스캔 결과를 재사용할 수
//! 있습니다.
//!
//! - [`Provenance`]: 해소 실패를 포함한 전체 상태
//! - [`KnownProvenance`]: 캐시 키로 사용 가능한 부분 집합
//! - [`NestedProvenance`]: 루트와 내장 하위 저장소를 경로로 평탄화한 구조

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{RemoteArtifact, VcsInfo};

/// 허용되는 소스 출처
///
/// 프로비넌스 해소 시 어떤 출처를 어떤 우선순위로 시도할지 지정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCodeOrigin {
    /// VCS 저장소
    Vcs,
    /// 소스 아티팩트
    Artifact,
}

impl SourceCodeOrigin {
    /// 문자열에서 출처를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vcs" => Some(Self::Vcs),
            "artifact" => Some(Self::Artifact),
            _ => None,
        }
    }
}

impl fmt::Display for SourceCodeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vcs => write!(f, "vcs"),
            Self::Artifact => write!(f, "artifact"),
        }
    }
}

/// 아티팩트 프로비넌스
///
/// 다운로드 URL과 콘텐츠 해시로 식별되는 소스 아티팩트입니다.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ArtifactProvenance {
    /// 소스 아티팩트
    pub source_artifact: RemoteArtifact,
}

impl fmt::Display for ArtifactProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact {}", self.source_artifact)
    }
}

/// 저장소 프로비넌스
///
/// VCS 저장소의 특정 해소된 리비전입니다. `vcs_info.revision`은 선언된
/// 리비전이고 `resolved_revision`은 실제로 해소된 불변 리비전입니다.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RepositoryProvenance {
    /// VCS 위치 정보 (선언된 리비전 포함)
    pub vcs_info: VcsInfo,
    /// 해소된 리비전 -- 비어 있지 않아야 함
    pub resolved_revision: String,
}

impl fmt::Display for RepositoryProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.vcs_info.url, self.resolved_revision)
    }
}

/// 프로비넌스 -- 패키지 소스 식별 결과
///
/// 해소 실패는 [`Provenance::Unknown`]으로 표현됩니다. 실패를 에러가 아닌
/// 값으로 반환하므로 한 패키지의 실패가 전체 배치를 중단시키지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Provenance {
    /// 해소 실패
    Unknown,
    /// 소스 아티팩트
    Artifact(ArtifactProvenance),
    /// VCS 저장소 리비전
    Repository(RepositoryProvenance),
}

impl Provenance {
    /// 캐시 키로 사용 가능한 형태로 변환합니다.
    ///
    /// [`Provenance::Unknown`]이면 `None`을 반환합니다.
    pub fn known(&self) -> Option<KnownProvenance> {
        match self {
            Self::Unknown => None,
            Self::Artifact(artifact) => Some(KnownProvenance::Artifact(artifact.clone())),
            Self::Repository(repository) => {
                Some(KnownProvenance::Repository(repository.clone()))
            }
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Artifact(artifact) => artifact.fmt(f),
            Self::Repository(repository) => repository.fmt(f),
        }
    }
}

/// 알려진 프로비넌스 -- 캐시 키로 사용 가능한 프로비넌스
///
/// 구조적 동등성이 곧 콘텐츠 동일성입니다. 결정적 순회를 위해 `Ord`를
/// 구현하여 `BTreeMap`/`BTreeSet` 키로 사용합니다.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KnownProvenance {
    /// 소스 아티팩트
    Artifact(ArtifactProvenance),
    /// VCS 저장소 리비전
    Repository(RepositoryProvenance),
}

impl fmt::Display for KnownProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact(artifact) => artifact.fmt(f),
            Self::Repository(repository) => repository.fmt(f),
        }
    }
}

impl From<KnownProvenance> for Provenance {
    fn from(known: KnownProvenance) -> Self {
        match known {
            KnownProvenance::Artifact(artifact) => Self::Artifact(artifact),
            KnownProvenance::Repository(repository) => Self::Repository(repository),
        }
    }
}

/// 중첩 프로비넌스
///
/// 루트 프로비넌스와 소스 트리에 내장된 모든 하위 저장소를 상대 경로로
/// 평탄화한 맵입니다. 하위 저장소의 하위 저장소도 전체 상대 경로를 키로
/// 같은 맵에 들어갑니다 (재귀 구조 없음). 루트는 암묵적으로 경로 `""`에
/// 대응합니다.
///
/// 실행마다 새로 계산되는 읽기 전용 값이며, 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedProvenance {
    /// 루트 프로비넌스
    pub root: KnownProvenance,
    /// 상대 경로 -> 하위 저장소 프로비넌스
    pub sub_repositories: BTreeMap<String, RepositoryProvenance>,
}

impl NestedProvenance {
    /// 하위 저장소 없는 중첩 프로비넌스를 생성합니다.
    pub fn flat(root: KnownProvenance) -> Self {
        Self {
            root,
            sub_repositories: BTreeMap::new(),
        }
    }

    /// 포함된 모든 프로비넌스를 반환합니다.
    ///
    /// 루트는 하위 저장소 맵이 비어 있어도 항상 정확히 한 번 포함됩니다.
    pub fn provenances(&self) -> BTreeSet<KnownProvenance> {
        let mut all: BTreeSet<KnownProvenance> = self
            .sub_repositories
            .values()
            .cloned()
            .map(KnownProvenance::Repository)
            .collect();
        all.insert(self.root.clone());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArtifactHash, VcsType};

    fn repository(url: &str, revision: &str) -> RepositoryProvenance {
        RepositoryProvenance {
            vcs_info: VcsInfo {
                vcs_type: VcsType::Git,
                url: url.to_owned(),
                revision: revision.to_owned(),
            },
            resolved_revision: revision.to_owned(),
        }
    }

    #[test]
    fn unknown_provenance_is_not_known() {
        assert!(Provenance::Unknown.known().is_none());
    }

    #[test]
    fn repository_provenance_is_known() {
        let provenance = Provenance::Repository(repository("https://example.org/a.git", "abc"));
        let known = provenance.known().unwrap();
        assert!(matches!(known, KnownProvenance::Repository(_)));
    }

    #[test]
    fn provenance_equality_is_structural() {
        let a = repository("https://example.org/a.git", "abc");
        let b = repository("https://example.org/a.git", "abc");
        let c = repository("https://example.org/a.git", "def");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn nested_provenances_include_root_exactly_once_when_empty() {
        let root = KnownProvenance::Repository(repository("https://example.org/a.git", "abc"));
        let nested = NestedProvenance::flat(root.clone());
        let all = nested.provenances();
        assert_eq!(all.len(), 1);
        assert!(all.contains(&root));
    }

    #[test]
    fn nested_provenances_include_root_and_sub_repositories() {
        let root = KnownProvenance::Repository(repository("https://example.org/a.git", "abc"));
        let sub = repository("https://example.org/b.git", "def");
        let nested = NestedProvenance {
            root: root.clone(),
            sub_repositories: BTreeMap::from([("vendor/b".to_owned(), sub.clone())]),
        };
        let all = nested.provenances();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&root));
        assert!(all.contains(&KnownProvenance::Repository(sub)));
    }

    #[test]
    fn nested_provenances_dedupe_root_equal_to_sub_repository() {
        // 루트와 동일한 하위 저장소가 있어도 집합에는 한 번만 들어감
        let repo = repository("https://example.org/a.git", "abc");
        let nested = NestedProvenance {
            root: KnownProvenance::Repository(repo.clone()),
            sub_repositories: BTreeMap::from([("mirror".to_owned(), repo)]),
        };
        assert_eq!(nested.provenances().len(), 1);
    }

    #[test]
    fn source_code_origin_from_str_loose() {
        assert_eq!(SourceCodeOrigin::from_str_loose("vcs"), Some(SourceCodeOrigin::Vcs));
        assert_eq!(
            SourceCodeOrigin::from_str_loose("ARTIFACT"),
            Some(SourceCodeOrigin::Artifact)
        );
        assert_eq!(SourceCodeOrigin::from_str_loose("ftp"), None);
    }

    #[test]
    fn known_provenance_serialize_roundtrip() {
        let known = KnownProvenance::Artifact(ArtifactProvenance {
            source_artifact: RemoteArtifact {
                url: "https://example.org/a.tgz".to_owned(),
                hash: ArtifactHash {
                    value: "abc".to_owned(),
                    algorithm: "sha256".to_owned(),
                },
            },
        });
        let json = serde_json::to_string(&known).unwrap();
        let parsed: KnownProvenance = serde_json::from_str(&json).unwrap();
        assert_eq!(known, parsed);
    }
}
