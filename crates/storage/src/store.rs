//! 스캔 결과 저장 프로토콜 -- 역할(읽기/쓰기)과 키 체계의 조합
//!
//! 저장 백엔드는 역할(리더/라이터)과 키 체계(프로비넌스 키/패키지 키)의
//! 두 축으로 나뉩니다. 조합은 닫혀 있으므로 오케스트레이터는 다운캐스팅
//! 없이 [`StorageReader`]/[`StorageWriter`] enum에 대한 완전 매칭으로
//! 분기합니다.
//!
//! 수용 기준은 읽기 경로에서만 적용됩니다 -- 쓰기는 생성된 결과를 그대로
//! 보존합니다.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use provost_core::BoxFuture;
use provost_core::error::StorageError;
use provost_core::provenance::{KnownProvenance, NestedProvenance};
use provost_core::scan::{NestedProvenanceScanResult, ScanResult, ScannerCriteria};
use provost_core::types::Package;

/// 콘텐츠 정체성(프로비넌스)으로 색인되는 저장 백엔드의 읽기 역할
pub trait ProvenanceScanStorageRead: Send + Sync {
    /// 로깅용 백엔드 이름
    fn name(&self) -> &str;

    /// 정확히 이 프로비넌스에 대해 저장된 결과 중 기준에 맞는 것을 모두
    /// 반환합니다.
    fn read<'a>(
        &'a self,
        provenance: &'a KnownProvenance,
        criteria: &'a ScannerCriteria,
    ) -> BoxFuture<'a, Result<Vec<ScanResult>, StorageError>>;
}

/// 콘텐츠 정체성으로 색인되는 저장 백엔드의 쓰기 역할
pub trait ProvenanceScanStorageWrite: Send + Sync {
    /// 로깅용 백엔드 이름
    fn name(&self) -> &str;

    /// 스캔 결과 하나를 프로비넌스 키 아래에 저장합니다.
    fn write<'a>(&'a self, result: &'a ScanResult) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// 패키지로 색인되는 저장 백엔드의 읽기 역할 (레거시 저장소용)
///
/// 오케스트레이터 내부 색인은 항상 프로비넌스 기준입니다. 이 인터페이스는
/// 콘텐츠 키를 만들 수 없는 백엔드를 위해서만 존재합니다.
pub trait PackageScanStorageRead: Send + Sync {
    /// 로깅용 백엔드 이름
    fn name(&self) -> &str;

    /// 저장된 패키지 단위 결과 중 중첩 프로비넌스가 일치하고 스캐너가
    /// 기준에 맞는 것을 반환합니다.
    fn read<'a>(
        &'a self,
        pkg: &'a Package,
        nested_provenance: &'a NestedProvenance,
        criteria: &'a ScannerCriteria,
    ) -> BoxFuture<'a, Result<Vec<NestedProvenanceScanResult>, StorageError>>;
}

/// 패키지로 색인되는 저장 백엔드의 쓰기 역할
pub trait PackageScanStorageWrite: Send + Sync {
    /// 로깅용 백엔드 이름
    fn name(&self) -> &str;

    /// 패키지 단위 결과 전체를 저장합니다.
    fn write<'a>(
        &'a self,
        pkg: &'a Package,
        result: &'a NestedProvenanceScanResult,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// 키 체계 태그가 붙은 설정된 읽기 백엔드
///
/// 리더는 설정된 순서대로 조회되며, 프로비넌스마다 결과를 낸 첫 리더가
/// 이기고 이후 리더는 조회되지 않습니다.
#[derive(Clone)]
pub enum StorageReader {
    /// 프로비넌스 키 리더
    Provenance(Arc<dyn ProvenanceScanStorageRead>),
    /// 패키지 키 리더
    Package(Arc<dyn PackageScanStorageRead>),
}

impl StorageReader {
    /// 로깅용 백엔드 이름
    pub fn name(&self) -> &str {
        match self {
            Self::Provenance(reader) => reader.name(),
            Self::Package(reader) => reader.name(),
        }
    }
}

/// 키 체계 태그가 붙은 설정된 쓰기 백엔드
#[derive(Clone)]
pub enum StorageWriter {
    /// 프로비넌스 키 라이터
    Provenance(Arc<dyn ProvenanceScanStorageWrite>),
    /// 패키지 키 라이터
    Package(Arc<dyn PackageScanStorageWrite>),
}

impl StorageWriter {
    /// 로깅용 백엔드 이름
    pub fn name(&self) -> &str {
        match self {
            Self::Provenance(writer) => writer.name(),
            Self::Package(writer) => writer.name(),
        }
    }
}

/// 프로비넌스의 안정적인 저장 키를 유도합니다.
///
/// 키는 프로비넌스의 정규 JSON 표현에 대한 16진수 sha256입니다.
/// 구조적으로 같은 프로비넌스는 같은 키를 얻으므로, 서로 다른 프로세스도
/// 같은 콘텐츠에 대해 독립적으로 같은 키를 만듭니다.
pub fn provenance_storage_key(provenance: &KnownProvenance) -> String {
    // KnownProvenance 직렬화는 실패할 수 없습니다. 맵, 문자열, 유닛
    // enum만 담고 있습니다.
    let canonical = serde_json::to_vec(provenance).unwrap_or_default();
    hex::encode(Sha256::digest(canonical))
}
