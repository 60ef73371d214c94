//! Provenance Downloader 경계
//!
//! 실제 VCS 클론이나 아티팩트 다운로드는 이 시스템의 범위 밖입니다.
//! 오케스트레이터는 이 trait을 통해서만 다운로드를 요청합니다.

use std::path::Path;

use provost_core::BoxFuture;
use provost_core::error::ProvenanceError;
use provost_core::provenance::KnownProvenance;

/// 프로비넌스 다운로더 trait
///
/// 구현 계약: 성공 시 `destination`이 완전히 채워져야 하고, 실패 시
/// `destination`은 건드리지 않은 상태로 남아야 합니다. 실패 에러는 사람이
/// 읽을 수 있는 원인을 담아야 합니다.
pub trait ProvenanceDownloader: Send + Sync {
    /// 프로비넌스가 가리키는 소스 트리를 `destination`에 다운로드합니다.
    fn download<'a>(
        &'a self,
        provenance: &'a KnownProvenance,
        destination: &'a Path,
    ) -> BoxFuture<'a, Result<(), ProvenanceError>>;
}
