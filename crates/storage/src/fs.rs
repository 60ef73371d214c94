//! 파일 기반 저장 백엔드
//!
//! 두 백엔드 모두 루트 디렉터리 아래에 키당 JSON 파일 하나를 둡니다.
//! 블로킹 파일시스템 작업은 `tokio::task::spawn_blocking` 뒤에서
//! 실행됩니다. 쓰기는 구조적 중복 제거를 포함한 읽기-수정-쓰기이므로
//! 같은 결과를 두 번 저장해도 멱등이며, 동시 쓰기는 마지막 쓰기 승리로
//! 수렴합니다.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use provost_core::BoxFuture;
use provost_core::error::StorageError;
use provost_core::provenance::{KnownProvenance, NestedProvenance};
use provost_core::scan::{NestedProvenanceScanResult, ScanResult, ScannerCriteria};
use provost_core::types::Package;

use crate::store::{
    PackageScanStorageRead, PackageScanStorageWrite, ProvenanceScanStorageRead,
    ProvenanceScanStorageWrite, provenance_storage_key,
};

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn join_error(e: tokio::task::JoinError) -> StorageError {
    StorageError::Io {
        path: String::new(),
        source: std::io::Error::other(format!("spawn_blocking failed: {e}")),
    }
}

fn read_json_vec<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_slice(&content).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn write_json_vec<T: serde::Serialize>(path: &Path, values: &[T]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let content = serde_json::to_vec_pretty(values)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| io_error(path, e))
}

/// 프로비넌스 키 파일 저장소
///
/// 프로비넌스마다 `<프로비넌스 sha256>.json` 파일 하나를 두고, 해당
/// 콘텐츠에 대해 저장된 모든 [`ScanResult`]를 담습니다.
#[derive(Debug, Clone)]
pub struct FileBasedStorage {
    root: PathBuf,
}

impl FileBasedStorage {
    /// 주어진 디렉터리를 루트로 하는 백엔드를 만듭니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, provenance: &KnownProvenance) -> PathBuf {
        self.root
            .join(format!("{}.json", provenance_storage_key(provenance)))
    }

    fn read_sync(path: &Path) -> Result<Vec<ScanResult>, StorageError> {
        read_json_vec(path)
    }

    fn write_sync(path: &Path, result: &ScanResult) -> Result<(), StorageError> {
        let mut results = Self::read_sync(path)?;
        if !results.contains(result) {
            results.push(result.clone());
        }
        write_json_vec(path, &results)
    }
}

impl ProvenanceScanStorageRead for FileBasedStorage {
    fn name(&self) -> &str {
        "file-provenance"
    }

    fn read<'a>(
        &'a self,
        provenance: &'a KnownProvenance,
        criteria: &'a ScannerCriteria,
    ) -> BoxFuture<'a, Result<Vec<ScanResult>, StorageError>> {
        let path = self.path_for(provenance);
        let criteria = criteria.clone();
        Box::pin(async move {
            let results =
                tokio::task::spawn_blocking(move || Self::read_sync(&path))
                    .await
                    .map_err(join_error)??;
            Ok(results
                .into_iter()
                .filter(|result| criteria.matches(&result.scanner))
                .collect())
        })
    }
}

impl ProvenanceScanStorageWrite for FileBasedStorage {
    fn name(&self) -> &str {
        "file-provenance"
    }

    fn write<'a>(&'a self, result: &'a ScanResult) -> BoxFuture<'a, Result<(), StorageError>> {
        let path = self.path_for(&result.provenance);
        let result = result.clone();
        Box::pin(async move {
            debug!(path = %path.display(), scanner = %result.scanner, "storing scan result");
            tokio::task::spawn_blocking(move || Self::write_sync(&path, &result))
                .await
                .map_err(join_error)?
        })
    }
}

/// 패키지 키 파일 저장소
///
/// 패키지마다 `<패키지 좌표 sha256>.json` 파일 하나를 두고, 해당 패키지에
/// 대해 저장된 모든 [`NestedProvenanceScanResult`]를 담습니다. 읽기
/// 경로는 중첩 루트가 질의한 프로비넌스와 일치하는 결과, 그리고 기준이
/// 수용하는 스캐너로 거릅니다.
#[derive(Debug, Clone)]
pub struct FilePackageStorage {
    root: PathBuf,
}

impl FilePackageStorage {
    /// 주어진 디렉터리를 루트로 하는 백엔드를 만듭니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, pkg: &Package) -> PathBuf {
        let key = hex::encode(Sha256::digest(pkg.id.coordinates().as_bytes()));
        self.root.join(format!("{key}.json"))
    }

    fn write_sync(path: &Path, result: &NestedProvenanceScanResult) -> Result<(), StorageError> {
        let mut results: Vec<NestedProvenanceScanResult> = read_json_vec(path)?;
        if !results.contains(result) {
            results.push(result.clone());
        }
        write_json_vec(path, &results)
    }
}

impl PackageScanStorageRead for FilePackageStorage {
    fn name(&self) -> &str {
        "file-package"
    }

    fn read<'a>(
        &'a self,
        pkg: &'a Package,
        nested_provenance: &'a NestedProvenance,
        criteria: &'a ScannerCriteria,
    ) -> BoxFuture<'a, Result<Vec<NestedProvenanceScanResult>, StorageError>> {
        let path = self.path_for(pkg);
        let root = nested_provenance.root.clone();
        let criteria = criteria.clone();
        Box::pin(async move {
            let stored: Vec<NestedProvenanceScanResult> =
                tokio::task::spawn_blocking(move || read_json_vec(&path))
                    .await
                    .map_err(join_error)??;

            Ok(stored
                .into_iter()
                .filter(|result| result.nested_provenance.root == root)
                .map(|mut result| {
                    for results in result.scan_results.values_mut() {
                        results.retain(|r| criteria.matches(&r.scanner));
                    }
                    result
                })
                .filter(|result| result.scan_results.values().any(|r| !r.is_empty()))
                .collect())
        })
    }
}

impl PackageScanStorageWrite for FilePackageStorage {
    fn name(&self) -> &str {
        "file-package"
    }

    fn write<'a>(
        &'a self,
        pkg: &'a Package,
        result: &'a NestedProvenanceScanResult,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        let path = self.path_for(pkg);
        let result = result.clone();
        Box::pin(async move {
            debug!(path = %path.display(), package = %pkg.id, "storing package scan result");
            tokio::task::spawn_blocking(move || Self::write_sync(&path, &result))
                .await
                .map_err(join_error)?
        })
    }
}
