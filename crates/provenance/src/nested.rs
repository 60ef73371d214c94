//! 중첩 프로비넌스 해소
//!
//! 루트 프로비넌스의 소스 트리에 내장된 하위 저장소들을 발견하여 하나의
//! 경로 키 맵으로 평탄화합니다. 하위 저장소의 하위 저장소도 전체 상대
//! 경로(`p/q`)를 키로 같은 맵에 들어가며, 중첩된 NestedProvenance 재귀
//! 구조는 만들지 않습니다.

use std::collections::BTreeMap;

use tracing::warn;

use provost_core::error::ProvenanceError;
use provost_core::provenance::{KnownProvenance, NestedProvenance, RepositoryProvenance};

/// 평탄화 재귀 깊이 상한
///
/// 자기 자신을 하위 저장소로 보고하는 잘못된 탐색 구현으로부터
/// 보호합니다.
const MAX_NESTING_DEPTH: usize = 16;

/// 하위 저장소 탐색 경계 trait
///
/// 한 저장소 리비전의 *직접* 하위 저장소만 반환합니다 (git submodule
/// 조회 등, 외부 협력자가 구현). 재귀 평탄화는
/// [`DefaultNestedProvenanceResolver`]가 담당합니다.
pub trait SubRepositoryDiscovery: Send + Sync {
    /// 직접 하위 저장소를 `상대 경로 -> 프로비넌스` 맵으로 반환합니다.
    fn discover(
        &self,
        provenance: &RepositoryProvenance,
    ) -> Result<BTreeMap<String, RepositoryProvenance>, ProvenanceError>;
}

/// 하위 저장소가 없다고 가정하는 탐색 구현
///
/// 아티팩트만 다루는 구성이나 테스트에서 사용합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubRepositories;

impl SubRepositoryDiscovery for NoSubRepositories {
    fn discover(
        &self,
        _provenance: &RepositoryProvenance,
    ) -> Result<BTreeMap<String, RepositoryProvenance>, ProvenanceError> {
        Ok(BTreeMap::new())
    }
}

/// 중첩 프로비넌스 해소 trait
pub trait NestedProvenanceResolver: Send + Sync {
    /// 루트 프로비넌스의 중첩 프로비넌스를 계산합니다.
    fn resolve(&self, root: &KnownProvenance) -> Result<NestedProvenance, ProvenanceError>;
}

/// 기본 중첩 프로비넌스 해소기
///
/// 아티팩트는 항상 평평하므로 빈 맵을 반환합니다. 저장소는 탐색 trait의
/// 출력을 재귀적으로 평탄화합니다. 경로가 중복되면 먼저 발견된 항목을
/// 유지하고 경고를 남깁니다.
pub struct DefaultNestedProvenanceResolver<D> {
    discovery: D,
}

impl<D: SubRepositoryDiscovery> DefaultNestedProvenanceResolver<D> {
    /// 탐색 구현으로 해소기를 생성합니다.
    pub fn new(discovery: D) -> Self {
        Self { discovery }
    }

    fn flatten_into(
        &self,
        provenance: &RepositoryProvenance,
        prefix: &str,
        depth: usize,
        flattened: &mut BTreeMap<String, RepositoryProvenance>,
    ) -> Result<(), ProvenanceError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ProvenanceError::DepthExceeded {
                path: prefix.to_owned(),
            });
        }

        for (path, sub) in self.discovery.discover(provenance)? {
            let full_path = if prefix.is_empty() {
                path
            } else {
                format!("{prefix}/{path}")
            };

            if flattened.contains_key(&full_path) {
                warn!(path = %full_path, "duplicate sub-repository path, keeping first entry");
                continue;
            }

            self.flatten_into(&sub, &full_path, depth + 1, flattened)?;
            flattened.insert(full_path, sub);
        }

        Ok(())
    }
}

impl<D: SubRepositoryDiscovery> NestedProvenanceResolver
    for DefaultNestedProvenanceResolver<D>
{
    fn resolve(&self, root: &KnownProvenance) -> Result<NestedProvenance, ProvenanceError> {
        let mut sub_repositories = BTreeMap::new();

        if let KnownProvenance::Repository(repository) = root {
            self.flatten_into(repository, "", 0, &mut sub_repositories)?;
        }

        Ok(NestedProvenance {
            root: root.clone(),
            sub_repositories,
        })
    }
}
