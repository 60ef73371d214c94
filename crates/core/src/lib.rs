#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod provenance;
pub mod scan;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, ProvenanceError, ProvostError, ScanError, StorageError};

// 설정
pub use config::ProvostConfig;

// 프로비넌스
pub use provenance::{
    ArtifactProvenance, KnownProvenance, NestedProvenance, Provenance, RepositoryProvenance,
    SourceCodeOrigin,
};

// 스캔 결과
pub use scan::{
    CopyrightFinding, LicenseFinding, NestedProvenanceScanResult, ScanRecord, ScanResult,
    ScanSummary, ScannerCriteria, ScannerDetails, TextLocation,
};

// 도메인 타입
pub use types::{
    ArtifactHash, Identifier, Issue, Package, RemoteArtifact, Severity, VcsInfo, VcsType,
};

/// dyn-compatible trait 메서드가 반환하는 박스 퓨처 타입
///
/// RPITIT를 쓰는 trait은 `dyn`이 불가하므로, 트레이트 객체로 다뤄야 하는
/// 경계(다운로더, 저장소, 원격 스캐너)에서는 이 타입을 반환합니다.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
