//! 오케스트레이터 통합 테스트
//!
//! 모의 스캐너/다운로더/스토리지로 파이프라인 전체를 검증합니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use provost_core::BoxFuture;
use provost_core::error::{ProvenanceError, ScanError, StorageError};
use provost_core::provenance::{KnownProvenance, RepositoryProvenance};
use provost_core::scan::{
    LicenseFinding, ScanResult, ScanSummary, ScannerCriteria, ScannerDetails, TextLocation,
};
use provost_core::types::{Identifier, Package, Severity, VcsInfo, VcsType};
use provost_provenance::download::ProvenanceDownloader;
use provost_provenance::nested::SubRepositoryDiscovery;
use provost_scanner::{
    LocalScanner, PackageRemoteScanner, ProvenanceRemoteScanner, ScanOrchestrator, ScannerWrapper,
};
use provost_storage::{
    FileArchiver, FileBasedStorage, FsArchiverStorage, ProvenanceScanStorageRead, StorageReader,
    StorageWriter,
};

fn package(name: &str) -> Package {
    Package {
        id: Identifier {
            kind: "cargo".to_owned(),
            namespace: String::new(),
            name: name.to_owned(),
            version: "1.0.0".to_owned(),
        },
        vcs: VcsInfo {
            vcs_type: VcsType::Git,
            url: format!("https://example.org/{name}.git"),
            revision: "main".to_owned(),
        },
        source_artifact: None,
    }
}

fn package_without_source(name: &str) -> Package {
    Package {
        id: Identifier {
            kind: "cargo".to_owned(),
            namespace: String::new(),
            name: name.to_owned(),
            version: "1.0.0".to_owned(),
        },
        vcs: VcsInfo::default(),
        source_artifact: None,
    }
}

fn details(name: &str) -> ScannerDetails {
    ScannerDetails {
        name: name.to_owned(),
        version: "1.0.0".to_owned(),
        configuration: String::new(),
    }
}

/// 호출 횟수를 세는 프로비넌스 원격 스캐너
struct CountingRemoteScanner {
    details: ScannerDetails,
    calls: Arc<AtomicUsize>,
}

impl CountingRemoteScanner {
    fn new(name: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                details: details(name),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl ProvenanceRemoteScanner for CountingRemoteScanner {
    fn details(&self) -> &ScannerDetails {
        &self.details
    }

    fn scan_provenance<'a>(
        &'a self,
        _provenance: &'a KnownProvenance,
    ) -> BoxFuture<'a, Result<ScanSummary, ScanError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {
            let mut summary = ScanSummary::default();
            summary.license_findings.insert(LicenseFinding {
                license: "MIT".to_owned(),
                location: TextLocation::new("LICENSE", 1, 1),
            });
            Ok(summary)
        })
    }
}

/// 항상 실패하는 프로비넌스 원격 스캐너
struct FailingRemoteScanner(ScannerDetails);

impl ProvenanceRemoteScanner for FailingRemoteScanner {
    fn details(&self) -> &ScannerDetails {
        &self.0
    }

    fn scan_provenance<'a>(
        &'a self,
        _provenance: &'a KnownProvenance,
    ) -> BoxFuture<'a, Result<ScanSummary, ScanError>> {
        Box::pin(async {
            Err(ScanError::ScannerFailed {
                scanner: "failing".to_owned(),
                reason: "service unavailable".to_owned(),
            })
        })
    }
}

/// 전체 트리 경로로 결과를 내는 패키지 원격 스캐너
struct TreeRemoteScanner(ScannerDetails);

impl PackageRemoteScanner for TreeRemoteScanner {
    fn details(&self) -> &ScannerDetails {
        &self.0
    }

    fn scan_package<'a>(
        &'a self,
        _pkg: &'a Package,
    ) -> BoxFuture<'a, Result<ScanSummary, ScanError>> {
        Box::pin(async {
            let mut summary = ScanSummary::default();
            summary.license_findings.insert(LicenseFinding {
                license: "MIT".to_owned(),
                location: TextLocation::new("LICENSE", 1, 1),
            });
            summary.license_findings.insert(LicenseFinding {
                license: "Apache-2.0".to_owned(),
                location: TextLocation::new("vendor/lib/LICENSE", 1, 1),
            });
            Ok(summary)
        })
    }
}

/// 다운로드된 트리의 LICENSE 파일을 읽는 로컬 스캐너
struct LicenseFileScanner(ScannerDetails);

impl LocalScanner for LicenseFileScanner {
    fn details(&self) -> &ScannerDetails {
        &self.0
    }

    fn scan_path(&self, path: &Path) -> Result<ScanSummary, ScanError> {
        let mut summary = ScanSummary::default();
        if path.join("LICENSE").is_file() {
            summary.license_findings.insert(LicenseFinding {
                license: "MIT".to_owned(),
                location: TextLocation::new("LICENSE", 1, 1),
            });
        }
        Ok(summary)
    }
}

/// LICENSE 파일 하나를 만들어 주는 모의 다운로더
struct FakeDownloader {
    calls: Arc<AtomicUsize>,
}

impl FakeDownloader {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl ProvenanceDownloader for FakeDownloader {
    fn download<'a>(
        &'a self,
        _provenance: &'a KnownProvenance,
        destination: &'a Path,
    ) -> BoxFuture<'a, Result<(), ProvenanceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            std::fs::write(destination.join("LICENSE"), "MIT").map_err(|e| {
                ProvenanceError::Download {
                    provenance: "fake".to_owned(),
                    reason: e.to_string(),
                }
            })
        })
    }
}

/// 항상 실패하는 다운로더 (전달받은 대상 경로를 기록)
struct FailingDownloader {
    destination: Arc<Mutex<Option<PathBuf>>>,
}

impl FailingDownloader {
    fn new() -> (Self, Arc<Mutex<Option<PathBuf>>>) {
        let destination = Arc::new(Mutex::new(None));
        (
            Self {
                destination: destination.clone(),
            },
            destination,
        )
    }
}

impl ProvenanceDownloader for FailingDownloader {
    fn download<'a>(
        &'a self,
        provenance: &'a KnownProvenance,
        destination: &'a Path,
    ) -> BoxFuture<'a, Result<(), ProvenanceError>> {
        *self.destination.lock().unwrap() = Some(destination.to_path_buf());
        Box::pin(async move {
            Err(ProvenanceError::Download {
                provenance: provenance.to_string(),
                reason: "network unreachable".to_owned(),
            })
        })
    }
}

/// 읽기 호출 횟수를 세고 항상 빈 결과를 내는 리더
struct CountingEmptyReader {
    calls: Arc<AtomicUsize>,
}

impl ProvenanceScanStorageRead for CountingEmptyReader {
    fn name(&self) -> &str {
        "counting-empty"
    }

    fn read<'a>(
        &'a self,
        _provenance: &'a KnownProvenance,
        _criteria: &'a ScannerCriteria,
    ) -> BoxFuture<'a, Result<Vec<ScanResult>, StorageError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// "vendor/lib" 하위 저장소 하나를 보고하는 탐색기
struct VendorDiscovery;

impl SubRepositoryDiscovery for VendorDiscovery {
    fn discover(
        &self,
        root: &RepositoryProvenance,
    ) -> Result<BTreeMap<String, RepositoryProvenance>, ProvenanceError> {
        let mut sub = BTreeMap::new();
        if root.vcs_info.url.contains("vendor") {
            // 하위 저장소의 하위 저장소는 없습니다.
            return Ok(sub);
        }
        sub.insert(
            "vendor/lib".to_owned(),
            RepositoryProvenance {
                vcs_info: VcsInfo {
                    vcs_type: VcsType::Git,
                    url: "https://example.org/vendor-lib.git".to_owned(),
                    revision: "main".to_owned(),
                },
                resolved_revision: "fedcba".to_owned(),
            },
        );
        Ok(sub)
    }
}

#[tokio::test]
async fn second_run_hits_the_cache() {
    let storage_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileBasedStorage::new(storage_dir.path()));
    let (scanner, calls) = CountingRemoteScanner::new("remote");
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(scanner)))
        .reader(StorageReader::Provenance(storage.clone()))
        .writer(StorageWriter::Provenance(storage.clone()))
        .build()
        .unwrap();

    let packages = vec![package("serde")];
    let first = orchestrator.scan(&packages).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(first.scan_results[&packages[0].id].is_complete());

    let second = orchestrator.scan(&packages).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1, "cache hit must not rescan");
    assert!(second.scan_results[&packages[0].id].is_complete());
}

#[tokio::test]
async fn packages_sharing_content_are_scanned_once() {
    let (scanner, calls) = CountingRemoteScanner::new("remote");
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(scanner)))
        .build()
        .unwrap();

    // 같은 VCS 좌표 -> 같은 프로비넌스
    let a = package("serde");
    let mut b = package("serde-fork");
    b.vcs = a.vcs.clone();

    let record = orchestrator.scan(&[a.clone(), b.clone()]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(record.scan_results[&a.id].is_complete());
    assert!(record.scan_results[&b.id].is_complete());
}

#[tokio::test]
async fn unresolvable_package_gets_an_issue() {
    let (scanner, calls) = CountingRemoteScanner::new("remote");
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(scanner)))
        .build()
        .unwrap();

    let pkg = package_without_source("mystery");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!record.scan_results.contains_key(&pkg.id));
    let issues = &record.issues[&pkg.id];
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].source, "resolver");
}

#[tokio::test]
async fn download_failure_yields_issue_results_per_local_scanner() {
    let (downloader, destination) = FailingDownloader::new();
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::Local(Arc::new(LicenseFileScanner(details(
            "first",
        )))))
        .scanner(ScannerWrapper::Local(Arc::new(LicenseFileScanner(details(
            "second",
        )))))
        .downloader(Arc::new(downloader))
        .build()
        .unwrap();

    let pkg = package("serde");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    let result = &record.scan_results[&pkg.id];
    let root_results = &result.scan_results[&result.nested_provenance.root];
    assert_eq!(root_results.len(), 2);
    for scan_result in root_results {
        assert_eq!(scan_result.summary.issues.len(), 1);
        assert_eq!(scan_result.summary.issues[0].source, "downloader");
        assert_eq!(scan_result.summary.issues[0].severity, Severity::Error);
        assert!(scan_result.summary.license_findings.is_empty());
    }

    // 임시 디렉터리는 실패 경로에서도 정리되어야 합니다.
    let destination = destination.lock().unwrap().clone().unwrap();
    assert!(!destination.exists());
}

#[tokio::test]
async fn local_scanners_share_one_download() {
    let (downloader, downloads) = FakeDownloader::new();
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::Local(Arc::new(LicenseFileScanner(details(
            "first",
        )))))
        .scanner(ScannerWrapper::Local(Arc::new(LicenseFileScanner(details(
            "second",
        )))))
        .downloader(Arc::new(downloader))
        .build()
        .unwrap();

    let pkg = package("serde");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    assert_eq!(downloads.load(Ordering::SeqCst), 1);
    let result = &record.scan_results[&pkg.id];
    assert!(result.is_complete());
    let root_results = &result.scan_results[&result.nested_provenance.root];
    assert_eq!(root_results.len(), 2);
    assert!(root_results.iter().all(|r| r.summary.license_findings.len() == 1));
}

#[tokio::test]
async fn remote_scanner_failure_yields_an_issue_result() {
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(
            FailingRemoteScanner(details("failing")),
        )))
        .build()
        .unwrap();

    let pkg = package("serde");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    let result = &record.scan_results[&pkg.id];
    let root_results = &result.scan_results[&result.nested_provenance.root];
    assert_eq!(root_results.len(), 1);
    assert_eq!(root_results[0].summary.issues.len(), 1);
    assert_eq!(root_results[0].summary.issues[0].source, "failing");
}

#[tokio::test]
async fn first_matching_reader_wins() {
    let storage_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileBasedStorage::new(storage_dir.path()));
    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let (scanner, scan_calls) = CountingRemoteScanner::new("remote");

    // 첫 실행으로 스토리지를 채웁니다.
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(scanner)))
        .reader(StorageReader::Provenance(storage.clone()))
        .reader(StorageReader::Provenance(Arc::new(CountingEmptyReader {
            calls: fallback_calls.clone(),
        })))
        .writer(StorageWriter::Provenance(storage.clone()))
        .build()
        .unwrap();

    let packages = vec![package("serde")];
    orchestrator.scan(&packages).await.unwrap();
    // 첫 실행은 캐시가 비어 있으므로 두 번째 리더까지 조회합니다.
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);

    orchestrator.scan(&packages).await.unwrap();
    // 두 번째 실행은 첫 리더가 결과를 내므로 두 번째 리더를 건너뜁니다.
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(scan_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn package_remote_results_are_split_by_sub_repository() {
    use provost_provenance::nested::DefaultNestedProvenanceResolver;

    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::PackageRemote(Arc::new(TreeRemoteScanner(
            details("tree"),
        ))))
        .nested_resolver(Arc::new(DefaultNestedProvenanceResolver::new(
            VendorDiscovery,
        )))
        .build()
        .unwrap();

    let pkg = package("app");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    let result = &record.scan_results[&pkg.id];
    assert!(result.is_complete());
    assert_eq!(result.nested_provenance.sub_repositories.len(), 1);

    let sub_provenance = KnownProvenance::Repository(
        result.nested_provenance.sub_repositories["vendor/lib"].clone(),
    );
    let sub_results = &result.scan_results[&sub_provenance];
    assert_eq!(sub_results.len(), 1);
    let finding = sub_results[0].summary.license_findings.iter().next().unwrap();
    assert_eq!(finding.license, "Apache-2.0");
    assert_eq!(finding.location.path, "LICENSE");

    let root_results = &result.scan_results[&result.nested_provenance.root];
    let finding = root_results[0].summary.license_findings.iter().next().unwrap();
    assert_eq!(finding.location.path, "LICENSE");
    assert_eq!(finding.license, "MIT");
}

#[tokio::test]
async fn cancelled_scan_dispatches_no_units() {
    let (scanner, calls) = CountingRemoteScanner::new("remote");
    let cancel = CancellationToken::new();
    cancel.cancel();
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(scanner)))
        .cancellation_token(cancel)
        .build()
        .unwrap();

    let pkg = package("serde");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!record.scan_results[&pkg.id].is_complete());
}

#[tokio::test]
async fn successful_local_scan_archives_license_files() {
    let archive_dir = tempfile::tempdir().unwrap();
    let archiver = Arc::new(
        FileArchiver::new(
            &["LICENSE*".to_owned()],
            Arc::new(FsArchiverStorage::new(archive_dir.path())),
        )
        .unwrap(),
    );
    let (downloader, _) = FakeDownloader::new();
    let orchestrator = ScanOrchestrator::builder()
        .scanner(ScannerWrapper::Local(Arc::new(LicenseFileScanner(details(
            "local",
        )))))
        .downloader(Arc::new(downloader))
        .archiver(archiver.clone())
        .build()
        .unwrap();

    let pkg = package("serde");
    let record = orchestrator.scan(std::slice::from_ref(&pkg)).await.unwrap();

    let result = &record.scan_results[&pkg.id];
    assert!(result.is_complete());
    assert!(archiver.has_archive(&result.nested_provenance.root).unwrap());

    let target = tempfile::tempdir().unwrap();
    assert!(archiver
        .unarchive(target.path(), &result.nested_provenance.root)
        .unwrap());
    assert_eq!(
        std::fs::read_to_string(target.path().join("LICENSE")).unwrap(),
        "MIT"
    );
}
