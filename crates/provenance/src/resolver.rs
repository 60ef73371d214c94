//! 패키지 프로비넌스 해소
//!
//! 패키지 메타데이터와 허용 출처 정책으로부터 권위 있는 소스 식별자를
//! 결정합니다. 해소는 실패해도 에러를 반환하지 않고
//! [`Provenance::Unknown`]을 반환합니다 -- 오케스트레이터가 이를 패키지
//! 이슈로 기록하고 스캔 대상에서 제외합니다.

use tracing::debug;

use provost_core::provenance::{
    ArtifactProvenance, Provenance, RepositoryProvenance, SourceCodeOrigin,
};
use provost_core::types::Package;

/// 패키지 -> 프로비넌스 해소 trait
///
/// 새로운 해소 전략(예: 실제 VCS 조회)을 추가하려면 이 trait을 구현합니다.
pub trait PackageProvenanceResolver: Send + Sync {
    /// 허용 출처를 우선순위 순서로 시도하여 프로비넌스를 결정합니다.
    ///
    /// 어떤 출처도 사용 가능한 식별자를 주지 못하면
    /// [`Provenance::Unknown`]을 반환합니다.
    fn resolve(&self, pkg: &Package, origins: &[SourceCodeOrigin]) -> Provenance;
}

/// 기본 프로비넌스 해소기
///
/// 선언된 메타데이터만 사용합니다. VCS 출처는 URL과 리비전이 모두
/// 채워져 있어야 하며, 선언된 리비전을 해소된 리비전으로 간주합니다
/// (VCS 프로토콜은 이 시스템의 범위 밖입니다). 아티팩트 출처는 URL과
/// 콘텐츠 해시가 모두 있어야 합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProvenanceResolver;

impl DefaultProvenanceResolver {
    fn resolve_vcs(&self, pkg: &Package) -> Option<Provenance> {
        if !pkg.vcs.is_complete() {
            return None;
        }

        Some(Provenance::Repository(RepositoryProvenance {
            vcs_info: pkg.vcs.clone(),
            resolved_revision: pkg.vcs.revision.clone(),
        }))
    }

    fn resolve_artifact(&self, pkg: &Package) -> Option<Provenance> {
        let artifact = pkg.source_artifact.as_ref()?;
        if artifact.url.is_empty() || artifact.hash.value.is_empty() {
            return None;
        }

        Some(Provenance::Artifact(ArtifactProvenance {
            source_artifact: artifact.clone(),
        }))
    }
}

impl PackageProvenanceResolver for DefaultProvenanceResolver {
    fn resolve(&self, pkg: &Package, origins: &[SourceCodeOrigin]) -> Provenance {
        for origin in origins {
            let resolved = match origin {
                SourceCodeOrigin::Vcs => self.resolve_vcs(pkg),
                SourceCodeOrigin::Artifact => self.resolve_artifact(pkg),
            };

            if let Some(provenance) = resolved {
                debug!(package = %pkg.id, origin = %origin, provenance = %provenance, "provenance resolved");
                return provenance;
            }
        }

        debug!(package = %pkg.id, "no permitted origin yielded a provenance");
        Provenance::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provost_core::types::{ArtifactHash, Identifier, RemoteArtifact, VcsInfo, VcsType};

    fn package(vcs: bool, artifact: bool) -> Package {
        Package {
            id: Identifier {
                kind: "cargo".to_owned(),
                namespace: String::new(),
                name: "example".to_owned(),
                version: "1.0.0".to_owned(),
            },
            vcs: if vcs {
                VcsInfo {
                    vcs_type: VcsType::Git,
                    url: "https://example.org/example.git".to_owned(),
                    revision: "v1.0.0".to_owned(),
                }
            } else {
                VcsInfo::default()
            },
            source_artifact: artifact.then(|| RemoteArtifact {
                url: "https://crates.example.org/example-1.0.0.crate".to_owned(),
                hash: ArtifactHash {
                    value: "abc123".to_owned(),
                    algorithm: "sha256".to_owned(),
                },
            }),
        }
    }

    const BOTH: &[SourceCodeOrigin] = &[SourceCodeOrigin::Vcs, SourceCodeOrigin::Artifact];

    #[test]
    fn prefers_vcs_when_first_in_priority() {
        let provenance = DefaultProvenanceResolver.resolve(&package(true, true), BOTH);
        assert!(matches!(provenance, Provenance::Repository(_)));
    }

    #[test]
    fn prefers_artifact_when_first_in_priority() {
        let origins = [SourceCodeOrigin::Artifact, SourceCodeOrigin::Vcs];
        let provenance = DefaultProvenanceResolver.resolve(&package(true, true), &origins);
        assert!(matches!(provenance, Provenance::Artifact(_)));
    }

    #[test]
    fn falls_back_to_artifact_when_vcs_incomplete() {
        let provenance = DefaultProvenanceResolver.resolve(&package(false, true), BOTH);
        assert!(matches!(provenance, Provenance::Artifact(_)));
    }

    #[test]
    fn returns_unknown_when_nothing_usable() {
        let provenance = DefaultProvenanceResolver.resolve(&package(false, false), BOTH);
        assert_eq!(provenance, Provenance::Unknown);
    }

    #[test]
    fn skips_origin_not_in_policy() {
        // artifact 출처가 허용되지 않으면 아티팩트 메타데이터가 있어도 Unknown
        let origins = [SourceCodeOrigin::Vcs];
        let provenance = DefaultProvenanceResolver.resolve(&package(false, true), &origins);
        assert_eq!(provenance, Provenance::Unknown);
    }

    #[test]
    fn declared_revision_is_taken_as_resolved() {
        let provenance = DefaultProvenanceResolver.resolve(&package(true, false), BOTH);
        match provenance {
            Provenance::Repository(repository) => {
                assert_eq!(repository.resolved_revision, "v1.0.0");
            }
            other => panic!("expected repository provenance, got {other:?}"),
        }
    }

    #[test]
    fn artifact_without_hash_is_unusable() {
        let mut pkg = package(false, true);
        pkg.source_artifact.as_mut().unwrap().hash.value = String::new();
        let provenance = DefaultProvenanceResolver.resolve(&pkg, BOTH);
        assert_eq!(provenance, Provenance::Unknown);
    }
}
