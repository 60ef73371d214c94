//! 설정 관리 -- provost.toml 파싱 및 런타임 설정
//!
//! [`ProvostConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PROVOST_GENERAL_LOG_LEVEL=debug` 형식)
//! 3. 설정 파일 (`provost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), provost_core::error::ProvostError> {
//! use provost_core::config::ProvostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ProvostConfig::load("provost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ProvostConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ProvostError};
use crate::provenance::SourceCodeOrigin;

/// Provost 통합 설정
///
/// `provost.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 다운로더/프로비넌스 해소 설정
    #[serde(default)]
    pub downloader: DownloaderConfig,
    /// 결과 저장소 설정
    #[serde(default)]
    pub storage: StorageBackendConfig,
    /// 파일 아카이버 설정
    #[serde(default)]
    pub archiver: ArchiverConfig,
    /// 스캐너 설정
    #[serde(default)]
    pub scanner: ScannerSectionConfig,
}

impl ProvostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ProvostError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ProvostError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProvostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ProvostError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ProvostError> {
        toml::from_str(toml_str).map_err(|e| {
            ProvostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PROVOST_{SECTION}_{FIELD}`
    /// 예: `PROVOST_GENERAL_DATA_DIR=/var/lib/provost`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PROVOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PROVOST_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "PROVOST_GENERAL_DATA_DIR");

        // Downloader
        override_csv(
            &mut self.downloader.source_code_origins,
            "PROVOST_DOWNLOADER_SOURCE_CODE_ORIGINS",
        );

        // Storage
        override_string(&mut self.storage.backend, "PROVOST_STORAGE_BACKEND");
        override_bool(
            &mut self.storage.read_packages,
            "PROVOST_STORAGE_READ_PACKAGES",
        );

        // Archiver
        override_bool(&mut self.archiver.enabled, "PROVOST_ARCHIVER_ENABLED");
        override_csv(&mut self.archiver.patterns, "PROVOST_ARCHIVER_PATTERNS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ProvostError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 소스 출처 검증
        if self.downloader.source_code_origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "downloader.source_code_origins".to_owned(),
                reason: "at least one origin is required".to_owned(),
            }
            .into());
        }
        for origin in &self.downloader.source_code_origins {
            if SourceCodeOrigin::from_str_loose(origin).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "downloader.source_code_origins".to_owned(),
                    reason: format!("unknown origin '{origin}', must be 'vcs' or 'artifact'"),
                }
                .into());
            }
        }

        // 스토리지 백엔드 검증
        let valid_backends = ["file"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "storage.backend".to_owned(),
                reason: format!("must be one of: {}", valid_backends.join(", ")),
            }
            .into());
        }

        // 아카이버 검증
        if self.archiver.enabled && self.archiver.patterns.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "archiver.patterns".to_owned(),
                reason: "at least one glob pattern is required when the archiver is enabled"
                    .to_owned(),
            }
            .into());
        }

        // 스캐너 버전 검증
        for command in &self.scanner.command {
            if command.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "scanner.command.name".to_owned(),
                    reason: "scanner name must not be empty".to_owned(),
                }
                .into());
            }
            if semver::Version::parse(&command.version).is_err() {
                return Err(ConfigError::InvalidValue {
                    field: format!("scanner.command.{}.version", command.name),
                    reason: format!("'{}' is not a valid semver version", command.version),
                }
                .into());
            }
        }

        Ok(())
    }

    /// 파싱된 소스 출처 우선순위를 반환합니다.
    ///
    /// `validate()`를 통과한 설정에서만 호출해야 하며, 파싱 불가능한
    /// 항목은 건너뜁니다.
    pub fn source_code_origins(&self) -> Vec<SourceCodeOrigin> {
        self.downloader
            .source_code_origins
            .iter()
            .filter_map(|s| SourceCodeOrigin::from_str_loose(s))
            .collect()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리 (결과 저장소, 아카이브 저장 위치)
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "/var/lib/provost".to_owned(),
        }
    }
}

/// 다운로더/프로비넌스 해소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// 허용 소스 출처 (우선순위 순서, "vcs" | "artifact")
    pub source_code_origins: Vec<String>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            source_code_origins: vec!["vcs".to_owned(), "artifact".to_owned()],
        }
    }
}

/// 결과 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageBackendConfig {
    /// 저장소 백엔드 종류 (현재 "file"만 지원)
    pub backend: String,
    /// 패키지 키 저장소를 읽기 경로에 포함할지 여부
    pub read_packages: bool,
}

impl Default for StorageBackendConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_owned(),
            read_packages: true,
        }
    }
}

/// 파일 아카이버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiverConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 아카이브 대상 glob 패턴 (대소문자 무시)
    pub patterns: Vec<String>,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: vec![
                "LICENSE*".to_owned(),
                "LICENCE*".to_owned(),
                "COPYING*".to_owned(),
                "NOTICE".to_owned(),
                "**/LICENSE*".to_owned(),
            ],
        }
    }
}

/// 스캐너 설정 섹션
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSectionConfig {
    /// 외부 명령 기반 로컬 스캐너 목록
    pub command: Vec<CommandScannerConfig>,
}

/// 외부 명령 기반 로컬 스캐너 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandScannerConfig {
    /// 스캐너 이름
    pub name: String,
    /// 스캐너 버전 (semver)
    pub version: String,
    /// 실행할 명령
    pub command: String,
    /// 명령 인자 -- 스캔 대상 디렉토리가 마지막 인자로 덧붙습니다
    pub args: Vec<String>,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
