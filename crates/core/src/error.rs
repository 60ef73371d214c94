//! 에러 타입 -- 도메인별 에러 정의
//!
//! 이 서브시스템에서 전체 프로세스를 중단시키는 에러는 유효하지 않은
//! 설정(스캐너 0개)뿐입니다. 그 외 실패는 이슈로 기록되거나 로그로
//! 강등됩니다 -- 읽기 실패는 "스캔 필요"로, 쓰기 실패는 "캐시되지 않음"으로
//! 처리됩니다.

/// Provost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ProvostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 프로비넌스 해소/다운로드 에러
    #[error("provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 스캔 실행 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 프로비넌스 해소/다운로드 에러
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// 다운로드 실패
    #[error("download failed for {provenance}: {reason}")]
    Download { provenance: String, reason: String },

    /// 하위 저장소 탐색 실패
    #[error("sub-repository discovery failed: {0}")]
    Discovery(String),

    /// 중첩 깊이 제한 초과
    #[error("nested repository depth limit exceeded at '{path}'")]
    DepthExceeded { path: String },
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 파일 I/O 실패
    #[error("io error: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 결과 직렬화/역직렬화 실패
    #[error("serialization error: {0}")]
    Serialization(String),

    /// 아카이브 생성/해제 실패
    #[error("archive error: {0}")]
    Archive(String),
}

/// 스캔 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 구성된 스캐너가 없음 -- 유일한 fail-fast 에러
    #[error("no scanner wrappers configured")]
    NoScanners,

    /// 스캐너 실행 실패
    #[error("scanner '{scanner}' failed: {reason}")]
    ScannerFailed { scanner: String, reason: String },

    /// 스캐너 출력 파싱 실패
    #[error("failed to parse output of scanner '{scanner}': {reason}")]
    OutputParse { scanner: String, reason: String },

    /// 스캐너 버전 파싱 실패
    #[error("scanner '{scanner}' has invalid version '{version}': {reason}")]
    VersionParse {
        scanner: String,
        version: String,
        reason: String,
    },

    /// 백그라운드 태스크 join 실패
    #[error("task join failed: {0}")]
    TaskJoin(String),
}
