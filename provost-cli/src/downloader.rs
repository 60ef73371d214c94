//! Source tree download via the git CLI
//!
//! VCS protocol handling is delegated to the installed `git` binary,
//! so the orchestrator's downloader boundary stays free of protocol
//! code. Artifact provenances are reported as download failures; the
//! error surfaces as an issue on the affected scan results.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use provost_core::BoxFuture;
use provost_core::error::ProvenanceError;
use provost_core::provenance::KnownProvenance;
use provost_core::types::VcsType;
use provost_provenance::download::ProvenanceDownloader;

/// Downloader that shells out to `git clone` / `git checkout`.
pub struct GitCliDownloader;

async fn run_git(args: &[&str], provenance: &KnownProvenance) -> Result<(), ProvenanceError> {
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| ProvenanceError::Download {
            provenance: provenance.to_string(),
            reason: format!("failed to run git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProvenanceError::Download {
            provenance: provenance.to_string(),
            reason: format!("git {} failed: {}", args[0], stderr.trim()),
        });
    }
    Ok(())
}

impl ProvenanceDownloader for GitCliDownloader {
    fn download<'a>(
        &'a self,
        provenance: &'a KnownProvenance,
        destination: &'a Path,
    ) -> BoxFuture<'a, Result<(), ProvenanceError>> {
        Box::pin(async move {
            let repository = match provenance {
                KnownProvenance::Repository(repository) => repository,
                KnownProvenance::Artifact(_) => {
                    return Err(ProvenanceError::Download {
                        provenance: provenance.to_string(),
                        reason: "artifact download is not supported by the git downloader"
                            .to_owned(),
                    });
                }
            };
            if repository.vcs_info.vcs_type != VcsType::Git {
                return Err(ProvenanceError::Download {
                    provenance: provenance.to_string(),
                    reason: format!(
                        "unsupported vcs type '{}'",
                        repository.vcs_info.vcs_type
                    ),
                });
            }

            let destination_str = destination.display().to_string();
            debug!(
                url = %repository.vcs_info.url,
                revision = %repository.resolved_revision,
                destination = %destination_str,
                "cloning repository"
            );

            run_git(
                &["clone", &repository.vcs_info.url, &destination_str],
                provenance,
            )
            .await?;
            run_git(
                &[
                    "-C",
                    &destination_str,
                    "checkout",
                    "--detach",
                    &repository.resolved_revision,
                ],
                provenance,
            )
            .await
        })
    }
}
