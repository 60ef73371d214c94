//! 스캔 오케스트레이터
//!
//! 실행 파이프라인: 패키지별 프로비넌스 해소 -> 중첩 프로비넌스 확장 ->
//! 저장된 결과 조회 -> 빠진 (스캐너, 프로비넌스) 조합만 스캔 -> 결과
//! 저장 및 패키지 단위 조립.
//!
//! 내부 상태는 항상 프로비넌스를 키로 합니다. 같은 콘텐츠를 공유하는
//! 패키지는 결과를 공유하며, 한 번의 실행에서 같은 (스캐너, 콘텐츠)
//! 조합은 최대 한 번만 스캔됩니다.
//!
//! 실패 정책: 전체 실행을 중단시키는 것은 스캐너 0개 구성뿐입니다.
//! 해소 실패는 패키지 이슈로, 다운로드/스캐너 실패는 이슈가 담긴
//! 결과로, 스토리지 읽기 실패는 캐시 미스로, 쓰기 실패는 미캐시로
//! 강등됩니다.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::SystemTime;

use tempfile::TempDir;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use provost_core::error::{ConfigError, ProvostError, ScanError};
use provost_core::provenance::{KnownProvenance, NestedProvenance, SourceCodeOrigin};
use provost_core::scan::{
    NestedProvenanceScanResult, ScanRecord, ScanResult, ScanSummary, ScannerCriteria,
    ScannerDetails,
};
use provost_core::types::{Identifier, Issue, Package};
use provost_provenance::download::ProvenanceDownloader;
use provost_provenance::nested::{DefaultNestedProvenanceResolver, NestedProvenanceResolver, NoSubRepositories};
use provost_provenance::resolver::{DefaultProvenanceResolver, PackageProvenanceResolver};
use provost_storage::archiver::FileArchiver;
use provost_storage::store::{StorageReader, StorageWriter};

use crate::split::split_summary;
use crate::wrapper::{LocalScanner, PackageRemoteScanner, ProvenanceRemoteScanner, ScannerWrapper};

/// 스캔 오케스트레이터 빌더
pub struct ScanOrchestratorBuilder {
    package_resolver: Arc<dyn PackageProvenanceResolver>,
    nested_resolver: Arc<dyn NestedProvenanceResolver>,
    downloader: Option<Arc<dyn ProvenanceDownloader>>,
    readers: Vec<StorageReader>,
    writers: Vec<StorageWriter>,
    scanners: Vec<(ScannerWrapper, Option<ScannerCriteria>)>,
    archiver: Option<Arc<FileArchiver>>,
    origins: Vec<SourceCodeOrigin>,
    cancel: CancellationToken,
}

impl Default for ScanOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanOrchestratorBuilder {
    /// 기본 구성의 빌더를 생성합니다.
    ///
    /// 기본값: 선언 메타데이터 기반 해소, 하위 저장소 탐색 없음, 소스
    /// 출처 우선순위 VCS -> 아티팩트. 스캐너는 최소 하나 설정해야 하고,
    /// 로컬 스캐너를 쓰려면 다운로더가 필요합니다.
    pub fn new() -> Self {
        Self {
            package_resolver: Arc::new(DefaultProvenanceResolver),
            nested_resolver: Arc::new(DefaultNestedProvenanceResolver::new(NoSubRepositories)),
            downloader: None,
            readers: Vec::new(),
            writers: Vec::new(),
            scanners: Vec::new(),
            archiver: None,
            origins: vec![SourceCodeOrigin::Vcs, SourceCodeOrigin::Artifact],
            cancel: CancellationToken::new(),
        }
    }

    /// 패키지 프로비넌스 해소기를 교체합니다.
    pub fn package_resolver(mut self, resolver: Arc<dyn PackageProvenanceResolver>) -> Self {
        self.package_resolver = resolver;
        self
    }

    /// 중첩 프로비넌스 해소기를 교체합니다.
    pub fn nested_resolver(mut self, resolver: Arc<dyn NestedProvenanceResolver>) -> Self {
        self.nested_resolver = resolver;
        self
    }

    /// 다운로더를 설정합니다. 로컬 스캐너 사용 시 필수입니다.
    pub fn downloader(mut self, downloader: Arc<dyn ProvenanceDownloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// 스토리지 리더를 추가합니다. 추가한 순서대로 조회합니다.
    pub fn reader(mut self, reader: StorageReader) -> Self {
        self.readers.push(reader);
        self
    }

    /// 스토리지 라이터를 추가합니다.
    pub fn writer(mut self, writer: StorageWriter) -> Self {
        self.writers.push(writer);
        self
    }

    /// 스캐너를 추가합니다. 저장 결과 수용 기준은 스캐너 버전에서
    /// 파생됩니다 (같은 이름, [버전, 다음 마이너) 구간).
    pub fn scanner(mut self, wrapper: ScannerWrapper) -> Self {
        self.scanners.push((wrapper, None));
        self
    }

    /// 명시적 수용 기준과 함께 스캐너를 추가합니다.
    pub fn scanner_with_criteria(
        mut self,
        wrapper: ScannerWrapper,
        criteria: ScannerCriteria,
    ) -> Self {
        self.scanners.push((wrapper, Some(criteria)));
        self
    }

    /// 파일 아카이버를 설정합니다.
    pub fn archiver(mut self, archiver: Arc<FileArchiver>) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// 소스 출처 우선순위를 설정합니다.
    pub fn source_code_origins(mut self, origins: Vec<SourceCodeOrigin>) -> Self {
        self.origins = origins;
        self
    }

    /// 취소 토큰을 설정합니다. 취소 후에는 새 스캔 유닛을 띄우지 않으며,
    /// 진행 중인 유닛은 끝까지 수행됩니다.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 오케스트레이터를 생성합니다.
    ///
    /// 스캐너가 없거나, 버전이 semver가 아니거나, 로컬 스캐너가 있는데
    /// 다운로더가 없으면 실패합니다.
    pub fn build(self) -> Result<ScanOrchestrator, ProvostError> {
        if self.scanners.is_empty() {
            return Err(ScanError::NoScanners.into());
        }

        let has_local = self
            .scanners
            .iter()
            .any(|(wrapper, _)| matches!(wrapper, ScannerWrapper::Local(_)));
        if has_local && self.downloader.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "downloader".to_owned(),
                reason: "local scanners are configured but no downloader is set".to_owned(),
            }
            .into());
        }

        let mut scanners = Vec::with_capacity(self.scanners.len());
        for (wrapper, criteria) in self.scanners {
            let criteria = match criteria {
                Some(criteria) => criteria,
                None => ScannerCriteria::for_details(wrapper.details())?,
            };
            scanners.push((wrapper, criteria));
        }

        Ok(ScanOrchestrator {
            package_resolver: self.package_resolver,
            nested_resolver: self.nested_resolver,
            downloader: self.downloader,
            readers: self.readers,
            writers: self.writers,
            scanners,
            archiver: self.archiver,
            origins: self.origins,
            cancel: self.cancel,
        })
    }
}

/// 스캔 오케스트레이터
pub struct ScanOrchestrator {
    package_resolver: Arc<dyn PackageProvenanceResolver>,
    nested_resolver: Arc<dyn NestedProvenanceResolver>,
    downloader: Option<Arc<dyn ProvenanceDownloader>>,
    readers: Vec<StorageReader>,
    writers: Vec<StorageWriter>,
    scanners: Vec<(ScannerWrapper, ScannerCriteria)>,
    archiver: Option<Arc<FileArchiver>>,
    origins: Vec<SourceCodeOrigin>,
    cancel: CancellationToken,
}

/// 실행 단위 -- 하나의 독립 스캔 작업
enum ScanUnit {
    PackageRemote {
        scanner: Arc<dyn PackageRemoteScanner>,
        pkg: Package,
        nested: NestedProvenance,
    },
    ProvenanceRemote {
        scanner: Arc<dyn ProvenanceRemoteScanner>,
        provenance: KnownProvenance,
    },
    Local {
        provenance: KnownProvenance,
        scanners: Vec<Arc<dyn LocalScanner>>,
    },
}

fn has_result(
    results: &BTreeMap<KnownProvenance, Vec<ScanResult>>,
    provenance: &KnownProvenance,
    criteria: &ScannerCriteria,
) -> bool {
    results
        .get(provenance)
        .is_some_and(|r| r.iter().any(|r| criteria.matches(&r.scanner)))
}

fn issue_results(
    provenance: &KnownProvenance,
    details: &[ScannerDetails],
    source: &str,
    message: &str,
) -> Vec<ScanResult> {
    details
        .iter()
        .map(|d| ScanResult {
            provenance: provenance.clone(),
            scanner: d.clone(),
            summary: ScanSummary::with_issue(Issue::error(source, message)),
        })
        .collect()
}

impl ScanOrchestrator {
    /// 빌더를 반환합니다.
    pub fn builder() -> ScanOrchestratorBuilder {
        ScanOrchestratorBuilder::new()
    }

    /// 패키지 목록을 스캔하고 실행 기록을 반환합니다.
    pub async fn scan(&self, packages: &[Package]) -> Result<ScanRecord, ProvostError> {
        let start_time = SystemTime::now();
        let mut issues: BTreeMap<Identifier, Vec<Issue>> = BTreeMap::new();

        // 1. 패키지 -> 프로비넌스 해소. 실패는 패키지 이슈로 남습니다.
        let mut package_provenances: Vec<(Package, KnownProvenance)> = Vec::new();
        for pkg in packages {
            match self.package_resolver.resolve(pkg, &self.origins).known() {
                Some(provenance) => package_provenances.push((pkg.clone(), provenance)),
                None => {
                    warn!(package = %pkg.id, "provenance could not be resolved");
                    issues.entry(pkg.id.clone()).or_default().push(Issue::error(
                        "resolver",
                        format!("could not resolve provenance for {}", pkg.id),
                    ));
                }
            }
        }

        // 2. 루트별 중첩 프로비넌스 확장. 탐색 실패는 평평한 중첩으로
        //    강등하고 해당 패키지에 이슈를 남깁니다.
        let mut nested: BTreeMap<KnownProvenance, NestedProvenance> = BTreeMap::new();
        let mut discovery_failures: BTreeMap<KnownProvenance, String> = BTreeMap::new();
        for (_, root) in &package_provenances {
            if nested.contains_key(root) {
                continue;
            }
            match self.nested_resolver.resolve(root) {
                Ok(n) => {
                    nested.insert(root.clone(), n);
                }
                Err(e) => {
                    warn!(provenance = %root, error = %e, "sub-repository discovery failed");
                    discovery_failures.insert(root.clone(), e.to_string());
                    nested.insert(root.clone(), NestedProvenance::flat(root.clone()));
                }
            }
        }
        for (pkg, root) in &package_provenances {
            if let Some(reason) = discovery_failures.get(root) {
                issues
                    .entry(pkg.id.clone())
                    .or_default()
                    .push(Issue::error("resolver", reason.clone()));
            }
        }

        let all_provenances: BTreeSet<KnownProvenance> = nested
            .values()
            .flat_map(|n| n.provenances())
            .collect();
        info!(
            packages = packages.len(),
            provenances = all_provenances.len(),
            scanners = self.scanners.len(),
            "starting scan"
        );

        // 프로비넌스 -> 결과. 조회와 스캔 결과가 모두 여기로 모입니다.
        let mut results: BTreeMap<KnownProvenance, Vec<ScanResult>> = all_provenances
            .iter()
            .map(|p| (p.clone(), Vec::new()))
            .collect();

        // 3. 저장된 결과 조회. 리더는 설정 순서대로, (스캐너, 프로비넌스)
        //    조합마다 처음으로 결과를 낸 리더가 이깁니다. 읽기 실패는
        //    캐시 미스로 강등됩니다.
        self.read_stored_results(&package_provenances, &nested, &all_provenances, &mut results)
            .await;

        // 4. 빠진 조합을 실행 단위로 묶습니다.
        let units = self.plan_units(&package_provenances, &nested, &all_provenances, &results);
        debug!(units = units.len(), "dispatching scan units");

        // 5. 유닛 실행. 취소되면 남은 유닛은 띄우지 않습니다.
        let mut join_set: JoinSet<Vec<ScanResult>> = JoinSet::new();
        for unit in units {
            if self.cancel.is_cancelled() {
                warn!("scan cancelled, remaining units will not run");
                break;
            }
            self.dispatch(unit, &mut join_set);
        }

        while let Some(joined) = join_set.join_next().await {
            let produced = match joined {
                Ok(produced) => produced,
                Err(e) => {
                    warn!(error = %e, "scan unit failed to complete");
                    continue;
                }
            };
            for result in produced {
                self.store_provenance_result(&result).await;
                results
                    .entry(result.provenance.clone())
                    .or_default()
                    .push(result);
            }
        }

        // 6. 패키지 단위 조립과 패키지 스토리지 저장.
        let mut scan_results: BTreeMap<Identifier, NestedProvenanceScanResult> = BTreeMap::new();
        for (pkg, root) in &package_provenances {
            let nested_provenance = nested[root].clone();
            let per_provenance: BTreeMap<KnownProvenance, Vec<ScanResult>> = nested_provenance
                .provenances()
                .into_iter()
                .map(|p| {
                    let r = results.get(&p).cloned().unwrap_or_default();
                    (p, r)
                })
                .collect();
            let result = NestedProvenanceScanResult {
                nested_provenance,
                scan_results: per_provenance,
            };
            if result.is_complete() {
                self.store_package_result(pkg, &result).await;
            } else {
                debug!(package = %pkg.id, "result is incomplete, not storing per package");
            }
            scan_results.insert(pkg.id.clone(), result);
        }

        Ok(ScanRecord {
            start_time,
            end_time: SystemTime::now(),
            scan_results,
            issues,
        })
    }

    async fn read_stored_results(
        &self,
        package_provenances: &[(Package, KnownProvenance)],
        nested: &BTreeMap<KnownProvenance, NestedProvenance>,
        all_provenances: &BTreeSet<KnownProvenance>,
        results: &mut BTreeMap<KnownProvenance, Vec<ScanResult>>,
    ) {
        for reader in &self.readers {
            match reader {
                StorageReader::Provenance(storage) => {
                    for provenance in all_provenances {
                        for (_, criteria) in &self.scanners {
                            if has_result(results, provenance, criteria) {
                                continue;
                            }
                            match storage.read(provenance, criteria).await {
                                Ok(found) if !found.is_empty() => {
                                    debug!(
                                        storage = storage.name(),
                                        provenance = %provenance,
                                        results = found.len(),
                                        "found stored scan results"
                                    );
                                    results
                                        .entry(provenance.clone())
                                        .or_default()
                                        .extend(found);
                                }
                                Ok(_) => {}
                                Err(e) => {
                                    warn!(
                                        storage = storage.name(),
                                        error = %e,
                                        "storage read failed, treating as cache miss"
                                    );
                                }
                            }
                        }
                    }
                }
                StorageReader::Package(storage) => {
                    for (pkg, root) in package_provenances {
                        let nested_provenance = &nested[root];
                        for (_, criteria) in &self.scanners {
                            let incomplete = nested_provenance
                                .provenances()
                                .iter()
                                .any(|p| !has_result(results, p, criteria));
                            if !incomplete {
                                continue;
                            }
                            match storage.read(pkg, nested_provenance, criteria).await {
                                Ok(found) => {
                                    for stored in found {
                                        for (provenance, stored_results) in stored.scan_results {
                                            if has_result(results, &provenance, criteria) {
                                                continue;
                                            }
                                            results.entry(provenance).or_default().extend(
                                                stored_results
                                                    .into_iter()
                                                    .filter(|r| criteria.matches(&r.scanner)),
                                            );
                                        }
                                    }
                                }
                                Err(e) => {
                                    warn!(
                                        storage = storage.name(),
                                        error = %e,
                                        "storage read failed, treating as cache miss"
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn plan_units(
        &self,
        package_provenances: &[(Package, KnownProvenance)],
        nested: &BTreeMap<KnownProvenance, NestedProvenance>,
        all_provenances: &BTreeSet<KnownProvenance>,
        results: &BTreeMap<KnownProvenance, Vec<ScanResult>>,
    ) -> Vec<ScanUnit> {
        let mut units = Vec::new();
        let mut local_pending: BTreeMap<KnownProvenance, Vec<Arc<dyn LocalScanner>>> =
            BTreeMap::new();

        for (wrapper, criteria) in &self.scanners {
            match wrapper {
                ScannerWrapper::PackageRemote(scanner) => {
                    // 같은 루트를 공유하는 패키지는 한 번만 스캔합니다.
                    let mut planned: BTreeSet<KnownProvenance> = BTreeSet::new();
                    for (pkg, root) in package_provenances {
                        if planned.contains(root) {
                            continue;
                        }
                        let nested_provenance = &nested[root];
                        let incomplete = nested_provenance
                            .provenances()
                            .iter()
                            .any(|p| !has_result(results, p, criteria));
                        if incomplete {
                            planned.insert(root.clone());
                            units.push(ScanUnit::PackageRemote {
                                scanner: scanner.clone(),
                                pkg: pkg.clone(),
                                nested: nested_provenance.clone(),
                            });
                        }
                    }
                }
                ScannerWrapper::ProvenanceRemote(scanner) => {
                    for provenance in all_provenances {
                        if !has_result(results, provenance, criteria) {
                            units.push(ScanUnit::ProvenanceRemote {
                                scanner: scanner.clone(),
                                provenance: provenance.clone(),
                            });
                        }
                    }
                }
                ScannerWrapper::Local(scanner) => {
                    for provenance in all_provenances {
                        if !has_result(results, provenance, criteria) {
                            local_pending
                                .entry(provenance.clone())
                                .or_default()
                                .push(scanner.clone());
                        }
                    }
                }
            }
        }

        // 로컬 스캐너는 프로비넌스당 하나의 유닛으로 묶여 다운로드를
        // 공유합니다.
        for (provenance, scanners) in local_pending {
            units.push(ScanUnit::Local {
                provenance,
                scanners,
            });
        }
        units
    }

    fn dispatch(&self, unit: ScanUnit, join_set: &mut JoinSet<Vec<ScanResult>>) {
        match unit {
            ScanUnit::PackageRemote {
                scanner,
                pkg,
                nested,
            } => {
                join_set.spawn(async move {
                    let details = scanner.details().clone();
                    debug!(scanner = %details.name, package = %pkg.id, "scanning package");
                    match scanner.scan_package(&pkg).await {
                        Ok(summary) => split_summary(&nested, &details, summary),
                        Err(e) => {
                            warn!(scanner = %details.name, package = %pkg.id, error = %e, "package scan failed");
                            let message = e.to_string();
                            let source = details.name.clone();
                            vec![ScanResult {
                                provenance: nested.root.clone(),
                                scanner: details,
                                summary: ScanSummary::with_issue(Issue::error(source, message)),
                            }]
                        }
                    }
                });
            }
            ScanUnit::ProvenanceRemote {
                scanner,
                provenance,
            } => {
                join_set.spawn(async move {
                    let details = scanner.details().clone();
                    debug!(scanner = %details.name, provenance = %provenance, "scanning provenance");
                    let summary = match scanner.scan_provenance(&provenance).await {
                        Ok(summary) => summary,
                        Err(e) => {
                            warn!(scanner = %details.name, provenance = %provenance, error = %e, "provenance scan failed");
                            ScanSummary::with_issue(Issue::error(details.name.clone(), e.to_string()))
                        }
                    };
                    vec![ScanResult {
                        provenance,
                        scanner: details,
                        summary,
                    }]
                });
            }
            ScanUnit::Local {
                provenance,
                scanners,
            } => {
                // build()가 로컬 스캐너와 다운로더의 동시 존재를 보장합니다.
                let Some(downloader) = self.downloader.clone() else {
                    let details: Vec<ScannerDetails> =
                        scanners.iter().map(|s| s.details().clone()).collect();
                    join_set.spawn(async move {
                        issue_results(&provenance, &details, "downloader", "no downloader configured")
                    });
                    return;
                };
                let archiver = self.archiver.clone();
                join_set.spawn(run_local_unit(downloader, archiver, provenance, scanners));
            }
        }
    }

    async fn store_provenance_result(&self, result: &ScanResult) {
        for writer in &self.writers {
            if let StorageWriter::Provenance(storage) = writer {
                if let Err(e) = storage.write(result).await {
                    warn!(
                        storage = storage.name(),
                        error = %e,
                        "failed to store scan result, continuing uncached"
                    );
                }
            }
        }
    }

    async fn store_package_result(&self, pkg: &Package, result: &NestedProvenanceScanResult) {
        for writer in &self.writers {
            if let StorageWriter::Package(storage) = writer {
                if let Err(e) = storage.write(pkg, result).await {
                    warn!(
                        storage = storage.name(),
                        error = %e,
                        "failed to store package scan result, continuing uncached"
                    );
                }
            }
        }
    }
}

/// 로컬 스캔 유닛 실행
///
/// 프로비넌스당 한 번 다운로드하고, 대기 중인 모든 로컬 스캐너를
/// 블로킹 풀에서 순서대로 실행합니다. 임시 디렉토리는 성공/실패와
/// 무관하게 유닛 종료 시 삭제됩니다. 다운로드 실패 시 스캐너마다
/// 이슈가 담긴 결과를 만듭니다.
async fn run_local_unit(
    downloader: Arc<dyn ProvenanceDownloader>,
    archiver: Option<Arc<FileArchiver>>,
    provenance: KnownProvenance,
    scanners: Vec<Arc<dyn LocalScanner>>,
) -> Vec<ScanResult> {
    let details: Vec<ScannerDetails> = scanners.iter().map(|s| s.details().clone()).collect();

    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(e) => {
            return issue_results(
                &provenance,
                &details,
                "downloader",
                &format!("failed to create temporary directory: {e}"),
            );
        }
    };

    debug!(provenance = %provenance, path = %dir.path().display(), "downloading source tree");
    if let Err(e) = downloader.download(&provenance, dir.path()).await {
        warn!(provenance = %provenance, error = %e, "download failed");
        return issue_results(&provenance, &details, "downloader", &e.to_string());
    }

    let path = dir.path().to_path_buf();
    let task_provenance = provenance.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut produced = Vec::with_capacity(scanners.len());
        for scanner in &scanners {
            let details = scanner.details().clone();
            debug!(scanner = %details.name, provenance = %task_provenance, "scanning source tree");
            let summary = match scanner.scan_path(&path) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(scanner = %details.name, error = %e, "local scan failed");
                    ScanSummary::with_issue(Issue::error(details.name.clone(), e.to_string()))
                }
            };
            produced.push(ScanResult {
                provenance: task_provenance.clone(),
                scanner: details,
                summary,
            });
        }

        if let Some(archiver) = archiver {
            match archiver.has_archive(&task_provenance) {
                Ok(true) => {}
                Ok(false) => {
                    if let Err(e) = archiver.archive(&path, &task_provenance) {
                        warn!(provenance = %task_provenance, error = %e, "failed to archive source files");
                    }
                }
                Err(e) => {
                    warn!(provenance = %task_provenance, error = %e, "failed to query archive storage");
                }
            }
        }
        produced
    })
    .await;

    // 임시 디렉토리는 블로킹 작업이 끝난 뒤에만 삭제됩니다.
    drop(dir);

    match joined {
        Ok(produced) => produced,
        Err(e) => issue_results(
            &provenance,
            &details,
            "scanner",
            &format!("scan task failed to complete: {e}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provost_core::BoxFuture;

    struct FakeRemote(ScannerDetails);

    impl ProvenanceRemoteScanner for FakeRemote {
        fn details(&self) -> &ScannerDetails {
            &self.0
        }

        fn scan_provenance<'a>(
            &'a self,
            _provenance: &'a KnownProvenance,
        ) -> BoxFuture<'a, Result<ScanSummary, ScanError>> {
            Box::pin(async { Ok(ScanSummary::default()) })
        }
    }

    struct FakeLocal(ScannerDetails);

    impl LocalScanner for FakeLocal {
        fn details(&self) -> &ScannerDetails {
            &self.0
        }

        fn scan_path(&self, _path: &std::path::Path) -> Result<ScanSummary, ScanError> {
            Ok(ScanSummary::default())
        }
    }

    fn details(version: &str) -> ScannerDetails {
        ScannerDetails {
            name: "fake".to_owned(),
            version: version.to_owned(),
            configuration: String::new(),
        }
    }

    #[test]
    fn build_without_scanners_fails() {
        let err = ScanOrchestrator::builder().build().err().unwrap();
        assert!(matches!(err, ProvostError::Scan(ScanError::NoScanners)));
    }

    #[test]
    fn build_with_invalid_scanner_version_fails() {
        let err = ScanOrchestrator::builder()
            .scanner(ScannerWrapper::ProvenanceRemote(Arc::new(FakeRemote(
                details("not-semver"),
            ))))
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProvostError::Scan(ScanError::VersionParse { .. })
        ));
    }

    #[test]
    fn build_with_local_scanner_requires_downloader() {
        let err = ScanOrchestrator::builder()
            .scanner(ScannerWrapper::Local(Arc::new(FakeLocal(details("1.0.0")))))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ProvostError::Config(_)));
    }
}
