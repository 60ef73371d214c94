//! 스캔 결과 모델 -- 스캐너 출력과 저장/조회 단위
//!
//! [`ScanResult`]는 저장소에 저장되고 조회되는 원자 단위입니다.
//! `(프로비넌스, 스캐너)` 쌍마다 정확히 한 번 생성되며 이후 변경되지
//! 않습니다. 같은 키로 새 결과를 저장하면 대체될 뿐입니다.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::provenance::{KnownProvenance, NestedProvenance};
use crate::types::{Identifier, Issue};

/// 스캐너 식별 정보
///
/// 이름, 버전, 설정 지문의 조합이 스캐너의 정체성을 결정합니다.
/// 설정이 다르면 다른 결과를 낼 수 있으므로 설정도 정체성에 포함됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScannerDetails {
    /// 스캐너 이름
    pub name: String,
    /// 스캐너 버전 (semver)
    pub version: String,
    /// 설정 지문
    pub configuration: String,
}

impl fmt::Display for ScannerDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// 저장된 결과 수용 기준
///
/// 저장소에서 결과를 읽을 때 어떤 결과를 현재 스캐너의 결과로 인정할지
/// 결정하는 술어입니다. 쓰기 경로에서는 사용되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerCriteria {
    /// 스캐너 이름 (정확히 일치해야 함)
    pub name: String,
    /// 허용 최소 버전 (포함)
    pub min_version: Version,
    /// 허용 최대 버전 (미포함)
    pub max_version: Version,
    /// 요구 설정 지문 (None이면 설정 무시)
    pub configuration: Option<String>,
}

impl ScannerCriteria {
    /// 스캐너 상세 정보에서 기본 기준을 만듭니다.
    ///
    /// 기본 허용 범위는 `[version, 다음 마이너 버전)`입니다.
    pub fn for_details(details: &ScannerDetails) -> Result<Self, ScanError> {
        let version = parse_version(&details.name, &details.version)?;
        let next_minor = Version::new(version.major, version.minor + 1, 0);
        Ok(Self {
            name: details.name.clone(),
            min_version: version,
            max_version: next_minor,
            configuration: None,
        })
    }

    /// 저장된 결과의 스캐너 정보가 이 기준에 맞는지 판정합니다.
    ///
    /// 버전이 semver로 파싱되지 않으면 맞지 않는 것으로 처리합니다.
    pub fn matches(&self, details: &ScannerDetails) -> bool {
        if details.name != self.name {
            return false;
        }

        let Ok(version) = Version::parse(&details.version) else {
            return false;
        };

        if version < self.min_version || version >= self.max_version {
            return false;
        }

        match &self.configuration {
            Some(configuration) => *configuration == details.configuration,
            None => true,
        }
    }
}

fn parse_version(scanner: &str, version: &str) -> Result<Version, ScanError> {
    Version::parse(version).map_err(|e| ScanError::VersionParse {
        scanner: scanner.to_owned(),
        version: version.to_owned(),
        reason: e.to_string(),
    })
}

/// 파일 내 텍스트 위치
///
/// 경로는 스캔된 트리 루트 기준 상대 경로이며 `/` 구분자를 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextLocation {
    /// 상대 경로
    pub path: String,
    /// 시작 줄 (1부터)
    pub start_line: u32,
    /// 끝 줄 (포함)
    pub end_line: u32,
}

impl TextLocation {
    /// 위치를 생성합니다.
    pub fn new(path: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line,
        }
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.path, self.start_line, self.end_line)
    }
}

/// 라이선스 발견
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseFinding {
    /// SPDX 라이선스 식별자/표현식
    pub license: String,
    /// 발견 위치
    pub location: TextLocation,
}

// 경로 우선 정렬 -- 발견 집합은 경로순으로 순회됩니다.
impl Ord for LicenseFinding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location
            .cmp(&other.location)
            .then_with(|| self.license.cmp(&other.license))
    }
}

impl PartialOrd for LicenseFinding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 저작권 표기 발견
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CopyrightFinding {
    /// 저작권 문구
    pub statement: String,
    /// 발견 위치
    pub location: TextLocation,
}

impl Ord for CopyrightFinding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location
            .cmp(&other.location)
            .then_with(|| self.statement.cmp(&other.statement))
    }
}

impl PartialOrd for CopyrightFinding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 스캔 요약 -- 단일 스캔의 구조화된 출력
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// 스캔 시작 시각
    pub start_time: SystemTime,
    /// 스캔 종료 시각
    pub end_time: SystemTime,
    /// 소스 검증 코드 (없으면 빈 문자열)
    pub package_verification_code: String,
    /// 라이선스 발견 (경로순)
    pub license_findings: std::collections::BTreeSet<LicenseFinding>,
    /// 저작권 발견 (경로순)
    pub copyright_findings: std::collections::BTreeSet<CopyrightFinding>,
    /// 스캔 중 발생한 이슈
    pub issues: Vec<Issue>,
}

impl ScanSummary {
    /// 발견 없이 이슈만 담은 요약을 만듭니다.
    ///
    /// 다운로드 실패나 스캐너 오류를 "시도했으나 실패"로 기록할 때
    /// 사용합니다.
    pub fn with_issue(issue: Issue) -> Self {
        let now = SystemTime::now();
        Self {
            start_time: now,
            end_time: now,
            package_verification_code: String::new(),
            license_findings: Default::default(),
            copyright_findings: Default::default(),
            issues: vec![issue],
        }
    }
}

impl Default for ScanSummary {
    fn default() -> Self {
        let now = SystemTime::now();
        Self {
            start_time: now,
            end_time: now,
            package_verification_code: String::new(),
            license_findings: Default::default(),
            copyright_findings: Default::default(),
            issues: Vec::new(),
        }
    }
}

/// 스캔 결과 -- 저장/조회의 원자 단위
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// 스캔된 콘텐츠의 프로비넌스
    pub provenance: KnownProvenance,
    /// 결과를 생성한 스캐너
    pub scanner: ScannerDetails,
    /// 스캔 요약
    pub summary: ScanSummary,
}

/// 패키지 단위 최종 결과물
///
/// 중첩 프로비넌스에 포함된 모든 프로비넌스마다, 해당 프로비넌스를 다룬
/// 모든 스캐너의 결과 목록을 담습니다. 스캐너 간 발견 병합은 하지
/// 않습니다 -- 어떤 스캐너가 어떤 결과를 냈는지 보존됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedProvenanceScanResult {
    /// 중첩 프로비넌스
    pub nested_provenance: NestedProvenance,
    /// 프로비넌스별 스캔 결과
    #[serde(with = "map_entries")]
    pub scan_results: BTreeMap<KnownProvenance, Vec<ScanResult>>,
}

impl NestedProvenanceScanResult {
    /// 모든 포함 프로비넌스에 대해 하나 이상의 결과가 있는지 반환합니다.
    pub fn is_complete(&self) -> bool {
        self.nested_provenance
            .provenances()
            .iter()
            .all(|provenance| {
                self.scan_results
                    .get(provenance)
                    .is_some_and(|results| !results.is_empty())
            })
    }
}

/// 스캔 실행 기록
///
/// 오케스트레이터 한 번의 실행이 산출하는 전체 결과입니다. 해소 실패 등
/// 패키지 단위 이슈는 `issues`에 별도로 담깁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    /// 실행 시작 시각
    pub start_time: SystemTime,
    /// 실행 종료 시각
    pub end_time: SystemTime,
    /// 패키지별 최종 결과
    #[serde(with = "map_entries")]
    pub scan_results: BTreeMap<Identifier, NestedProvenanceScanResult>,
    /// 패키지별 이슈 (해소 실패 등)
    #[serde(with = "map_entries")]
    pub issues: BTreeMap<Identifier, Vec<Issue>>,
}

/// 구조체 키 맵의 JSON 직렬화 코덱
///
/// JSON 객체 키는 문자열만 허용되므로, 프로비넌스나 식별자를 키로 쓰는
/// 맵은 `{ "key": ..., "value": ... }` 엔트리 목록으로 직렬화합니다.
mod map_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct EntryRef<'a, K, V> {
        key: &'a K,
        value: &'a V,
    }

    #[derive(Deserialize)]
    struct Entry<K, V> {
        key: K,
        value: V,
    }

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter().map(|(key, value)| EntryRef { key, value }))
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let entries = Vec::<Entry<K, V>>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|e| (e.key, e.value)).collect())
    }
}
