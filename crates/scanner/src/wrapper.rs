//! 스캐너 능력 모델
//!
//! 모든 스캐너는 정확히 하나의 능력을 가집니다. 다운로드된 소스 트리를
//! 읽는 로컬 스캐너, 패키지 좌표로 질의하는 패키지 원격 스캐너,
//! 프로비넌스로 질의하는 프로비넌스 원격 스캐너입니다. 능력 집합은
//! 닫혀 있으므로 오케스트레이터는 [`ScannerWrapper`] enum으로 분기하며
//! 다운캐스트를 쓰지 않습니다.

use std::path::Path;
use std::sync::Arc;

use provost_core::BoxFuture;
use provost_core::error::ScanError;
use provost_core::provenance::KnownProvenance;
use provost_core::scan::{ScanSummary, ScannerDetails};
use provost_core::types::Package;

/// 로컬 스캐너 -- 다운로드된 소스 트리를 스캔
///
/// `scan_path`는 동기 호출입니다. 외부 명령을 실행하거나 파일을 읽는
/// 블로킹 작업이므로, 오케스트레이터가 블로킹 풀에서 호출합니다.
pub trait LocalScanner: Send + Sync {
    /// 스캐너 상세 정보 (이름/버전/설정 지문)
    fn details(&self) -> &ScannerDetails;

    /// 경로 아래 소스 트리를 스캔하고 요약을 반환합니다.
    fn scan_path(&self, path: &Path) -> Result<ScanSummary, ScanError>;
}

/// 패키지 원격 스캐너 -- 패키지 좌표로 외부 서비스에 질의
pub trait PackageRemoteScanner: Send + Sync {
    /// 스캐너 상세 정보
    fn details(&self) -> &ScannerDetails;

    /// 패키지 전체에 대한 스캔 요약을 반환합니다.
    ///
    /// 반환된 요약의 경로는 소스 트리 루트 기준이며, 오케스트레이터가
    /// 중첩 프로비넌스별로 분할합니다.
    fn scan_package<'a>(
        &'a self,
        pkg: &'a Package,
    ) -> BoxFuture<'a, Result<ScanSummary, ScanError>>;
}

/// 프로비넌스 원격 스캐너 -- 콘텐츠 정체성으로 외부 서비스에 질의
pub trait ProvenanceRemoteScanner: Send + Sync {
    /// 스캐너 상세 정보
    fn details(&self) -> &ScannerDetails;

    /// 단일 프로비넌스에 대한 스캔 요약을 반환합니다.
    fn scan_provenance<'a>(
        &'a self,
        provenance: &'a KnownProvenance,
    ) -> BoxFuture<'a, Result<ScanSummary, ScanError>>;
}

/// 구성된 스캐너 -- 능력별 태그가 붙은 래퍼
#[derive(Clone)]
pub enum ScannerWrapper {
    /// 로컬 스캐너
    Local(Arc<dyn LocalScanner>),
    /// 패키지 원격 스캐너
    PackageRemote(Arc<dyn PackageRemoteScanner>),
    /// 프로비넌스 원격 스캐너
    ProvenanceRemote(Arc<dyn ProvenanceRemoteScanner>),
}

impl ScannerWrapper {
    /// 스캐너 상세 정보
    pub fn details(&self) -> &ScannerDetails {
        match self {
            Self::Local(scanner) => scanner.details(),
            Self::PackageRemote(scanner) => scanner.details(),
            Self::ProvenanceRemote(scanner) => scanner.details(),
        }
    }

    /// 스캐너 이름
    pub fn name(&self) -> &str {
        &self.details().name
    }
}
