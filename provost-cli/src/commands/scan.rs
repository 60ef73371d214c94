//! `provost scan` command handler
//!
//! Wires the configuration into a scan orchestrator: file-based result
//! storage and archiver under the data directory, one command scanner
//! per configured entry, and the git CLI downloader.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use provost_core::config::ProvostConfig;
use provost_core::error::ProvostError;
use provost_core::scan::{ScanRecord, ScanResult};
use provost_core::types::{Identifier, Package};
use provost_scanner::{
    CommandScanner, ScanOrchestrator, ScannerWrapper, merge_nested_result,
};
use provost_storage::{
    FileArchiver, FileBasedStorage, FilePackageStorage, FsArchiverStorage, StorageReader,
    StorageWriter,
};

use crate::cli::ScanArgs;
use crate::downloader::GitCliDownloader;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Analyzer result file: the portion of it this tool consumes.
#[derive(Debug, Deserialize)]
struct AnalyzerResult {
    packages: Vec<Package>,
}

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = ProvostConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    let input = tokio::fs::read(&args.input)
        .await
        .map_err(|e| CliError::Input(format!("{}: {e}", args.input.display())))?;
    let analyzer: AnalyzerResult = serde_json::from_slice(&input)
        .map_err(|e| CliError::Input(format!("{}: {e}", args.input.display())))?;

    info!(
        input = %args.input.display(),
        packages = analyzer.packages.len(),
        "starting scan"
    );

    // Ctrl-C stops dispatching new scan units; in-flight units finish
    // and the partial record is still emitted.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight scans");
            signal_token.cancel();
        }
    });

    let orchestrator = build_orchestrator(&config, cancel)?;
    let record = orchestrator.scan(&analyzer.packages).await?;

    let resolution_issues: usize = record.issues.values().map(Vec::len).sum();
    if resolution_issues > 0 {
        warn!(issues = resolution_issues, "scan finished with package issues");
    }

    if args.merged {
        let report = MergedReport::from_record(&record);
        emit(&report, args.output_file.as_deref(), writer).await
    } else {
        let report = ScanReport { record };
        emit(&report, args.output_file.as_deref(), writer).await
    }
}

/// Assemble the orchestrator from the configuration.
fn build_orchestrator(
    config: &ProvostConfig,
    cancel: CancellationToken,
) -> Result<ScanOrchestrator, CliError> {
    let data_dir = Path::new(&config.general.data_dir);
    let provenance_storage = Arc::new(FileBasedStorage::new(data_dir.join("provenance")));
    let package_storage = Arc::new(FilePackageStorage::new(data_dir.join("packages")));

    let mut builder = ScanOrchestrator::builder()
        .downloader(Arc::new(GitCliDownloader))
        .cancellation_token(cancel)
        .source_code_origins(config.source_code_origins())
        .reader(StorageReader::Provenance(provenance_storage.clone()))
        .writer(StorageWriter::Provenance(provenance_storage))
        .writer(StorageWriter::Package(package_storage.clone()));
    if config.storage.read_packages {
        builder = builder.reader(StorageReader::Package(package_storage));
    }

    if config.archiver.enabled {
        let archive_storage = Arc::new(FsArchiverStorage::new(data_dir.join("archives")));
        let archiver = FileArchiver::new(&config.archiver.patterns, archive_storage)
            .map_err(ProvostError::Storage)?;
        builder = builder.archiver(Arc::new(archiver));
    }

    for scanner in &config.scanner.command {
        builder = builder.scanner(ScannerWrapper::Local(Arc::new(CommandScanner::new(
            scanner.name.clone(),
            scanner.version.clone(),
            scanner.command.clone(),
            scanner.args.clone(),
        ))));
    }

    Ok(builder.build()?)
}

/// Write the payload to a file as JSON, or render it to stdout.
async fn emit<T: Render + Serialize>(
    payload: &T,
    output_file: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match output_file {
        Some(path) => {
            let json = serde_json::to_vec_pretty(payload)?;
            tokio::fs::write(path, json).await?;
            info!(path = %path.display(), "scan record written");
            Ok(())
        }
        None => writer.render(payload),
    }
}

/// Full scan record payload.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    record: ScanRecord,
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "Scanned {} package(s), {} with issues",
            self.record.scan_results.len(),
            self.record.issues.len()
        )?;
        for (id, result) in &self.record.scan_results {
            let findings: usize = result
                .scan_results
                .values()
                .flatten()
                .map(|r| r.summary.license_findings.len())
                .sum();
            let status = if result.is_complete() {
                "complete"
            } else {
                "incomplete"
            };
            writeln!(
                w,
                "  {id}: {} provenance(s), {findings} license finding(s), {status}",
                result.nested_provenance.sub_repositories.len() + 1
            )?;
        }
        for (id, issues) in &self.record.issues {
            for issue in issues {
                writeln!(w, "  {id}: {issue}")?;
            }
        }
        Ok(())
    }
}

/// Per-package flattened results payload.
#[derive(Debug, Serialize)]
pub struct MergedReport {
    packages: Vec<MergedPackage>,
}

#[derive(Debug, Serialize)]
struct MergedPackage {
    id: Identifier,
    results: Vec<ScanResult>,
}

impl MergedReport {
    fn from_record(record: &ScanRecord) -> Self {
        let packages = record
            .scan_results
            .iter()
            .map(|(id, result)| MergedPackage {
                id: id.clone(),
                results: merge_nested_result(result),
            })
            .collect();
        Self { packages }
    }
}

impl Render for MergedReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for package in &self.packages {
            writeln!(w, "{}:", package.id)?;
            for result in &package.results {
                writeln!(
                    w,
                    "  {} {}: {} license finding(s), {} issue(s)",
                    result.scanner.name,
                    result.scanner.version,
                    result.summary.license_findings.len(),
                    result.summary.issues.len()
                )?;
            }
        }
        Ok(())
    }
}
