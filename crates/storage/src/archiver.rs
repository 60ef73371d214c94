//! 파일 아카이버 -- 근거 파일 원본을 프로비넌스 키로 보존
//!
//! 스캔 결과는 발견만 담습니다. 아카이버는 매칭된 파일 자체(라이선스
//! 전문, 고지문)를 추가로 보존하여 소스를 다시 내려받지 않고도 나중에
//! 재현할 수 있게 합니다. 아카이브는 스캔 결과와 같은 프로비넌스
//! 정체성으로 키가 매겨지지만 독립적으로 저장됩니다 -- 아카이브의 존재와
//! 결과의 존재는 별개의 사실입니다.

use std::fs::File;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

use provost_core::error::StorageError;
use provost_core::provenance::KnownProvenance;

use crate::store::provenance_storage_key;

fn archive_error(context: &str, e: impl std::fmt::Display) -> StorageError {
    StorageError::Archive(format!("{context}: {e}"))
}

/// 아카이브 컨테이너의 블롭 저장소
///
/// `get_archive`는 컨테이너의 임시 사본을 넘겨줍니다. 호출자 쪽 임시
/// 파일은 드롭 시 삭제되므로, 가져온 컨테이너가 사용 범위를 넘겨 남지
/// 않습니다.
pub trait FileArchiverStorage: Send + Sync {
    /// 프로비넌스에 대한 아카이브가 존재하는지 반환합니다.
    fn has_archive(&self, provenance: &KnownProvenance) -> Result<bool, StorageError>;

    /// 컨테이너 파일을 프로비넌스 키 아래에 저장합니다.
    fn add_archive(
        &self,
        provenance: &KnownProvenance,
        container: &Path,
    ) -> Result<(), StorageError>;

    /// 프로비넌스의 컨테이너를 가져옵니다. 없으면 `None`입니다.
    fn get_archive(
        &self,
        provenance: &KnownProvenance,
    ) -> Result<Option<NamedTempFile>, StorageError>;
}

/// 파일시스템 기반 아카이브 저장소 (`<root>/<key>.zip`)
#[derive(Debug, Clone)]
pub struct FsArchiverStorage {
    root: PathBuf,
}

impl FsArchiverStorage {
    /// 주어진 디렉터리를 루트로 하는 아카이브 저장소를 만듭니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, provenance: &KnownProvenance) -> PathBuf {
        self.root
            .join(format!("{}.zip", provenance_storage_key(provenance)))
    }
}

impl FileArchiverStorage for FsArchiverStorage {
    fn has_archive(&self, provenance: &KnownProvenance) -> Result<bool, StorageError> {
        Ok(self.path_for(provenance).is_file())
    }

    fn add_archive(
        &self,
        provenance: &KnownProvenance,
        container: &Path,
    ) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| archive_error("failed to create archive root", e))?;
        std::fs::copy(container, self.path_for(provenance))
            .map_err(|e| archive_error("failed to store archive", e))?;
        Ok(())
    }

    fn get_archive(
        &self,
        provenance: &KnownProvenance,
    ) -> Result<Option<NamedTempFile>, StorageError> {
        let path = self.path_for(provenance);
        if !path.is_file() {
            return Ok(None);
        }

        let temp = NamedTempFile::new()
            .map_err(|e| archive_error("failed to create temporary container", e))?;
        std::fs::copy(&path, temp.path())
            .map_err(|e| archive_error("failed to fetch archive", e))?;
        Ok(Some(temp))
    }
}

/// 글롭 패턴에 매칭된 파일을 zip 컨테이너로 묶어 프로비넌스 키 아래에
/// 저장합니다.
///
/// 패턴은 아카이브 대상 디렉터리 기준 상대 경로에 대해 `/` 구분자,
/// 대소문자 무시로 매칭됩니다.
pub struct FileArchiver {
    patterns: Vec<Pattern>,
    storage: std::sync::Arc<dyn FileArchiverStorage>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

impl FileArchiver {
    /// 글롭 패턴과 블롭 저장소로 아카이버를 만듭니다.
    pub fn new(
        patterns: &[String],
        storage: std::sync::Arc<dyn FileArchiverStorage>,
    ) -> Result<Self, StorageError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| archive_error("invalid glob pattern", e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, storage })
    }

    /// 프로비넌스에 대한 아카이브가 존재하는지 반환합니다.
    pub fn has_archive(&self, provenance: &KnownProvenance) -> Result<bool, StorageError> {
        self.storage.has_archive(provenance)
    }

    fn matches(&self, relative_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(relative_path, MATCH_OPTIONS))
    }

    /// `directory` 아래에서 매칭되는 모든 파일을 프로비넌스 키로
    /// 아카이브합니다.
    ///
    /// 임시 컨테이너는 성공이든 실패든 반환 시 삭제됩니다.
    pub fn archive(
        &self,
        directory: &Path,
        provenance: &KnownProvenance,
    ) -> Result<(), StorageError> {
        // 어느 경로로 빠져나가든 함수 끝에서 드롭됩니다.
        let temp = NamedTempFile::new()
            .map_err(|e| archive_error("failed to create temporary container", e))?;

        let file = File::create(temp.path())
            .map_err(|e| archive_error("failed to open temporary container", e))?;
        let mut writer = zip::ZipWriter::new(file);
        let mut matched = 0usize;

        for entry in WalkDir::new(directory) {
            let entry = entry.map_err(|e| archive_error("failed to walk directory", e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(directory)
                .map_err(|e| archive_error("failed to relativize path", e))?;
            let relative = relative.to_string_lossy().replace('\\', "/");

            if !self.matches(&relative) {
                continue;
            }

            writer
                .start_file(relative.as_str(), SimpleFileOptions::default())
                .map_err(|e| archive_error("failed to add archive entry", e))?;
            let mut source = File::open(entry.path())
                .map_err(|e| archive_error("failed to read matched file", e))?;
            std::io::copy(&mut source, &mut writer)
                .map_err(|e| archive_error("failed to write archive entry", e))?;
            matched += 1;
        }

        writer
            .finish()
            .map_err(|e| archive_error("failed to finalize archive", e))?;

        debug!(provenance = %provenance, files = matched, "storing archive");
        self.storage.add_archive(provenance, temp.path())
    }

    /// 프로비넌스의 아카이브를 `directory`에 풉니다.
    ///
    /// 아카이브가 없으면 `Ok(false)`를 반환합니다. 가져온 임시
    /// 컨테이너는 이후 항상 삭제됩니다.
    pub fn unarchive(
        &self,
        directory: &Path,
        provenance: &KnownProvenance,
    ) -> Result<bool, StorageError> {
        let Some(temp) = self.storage.get_archive(provenance)? else {
            return Ok(false);
        };

        let file =
            File::open(temp.path()).map_err(|e| archive_error("failed to open archive", e))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| archive_error("failed to read archive", e))?;
        archive
            .extract(directory)
            .map_err(|e| archive_error("failed to extract archive", e))?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use provost_core::provenance::RepositoryProvenance;
    use provost_core::types::{VcsInfo, VcsType};

    fn provenance() -> KnownProvenance {
        KnownProvenance::Repository(RepositoryProvenance {
            vcs_info: VcsInfo {
                vcs_type: VcsType::Git,
                url: "https://example.org/a.git".to_owned(),
                revision: "main".to_owned(),
            },
            resolved_revision: "abc123".to_owned(),
        })
    }

    fn archiver(root: &Path, patterns: &[&str]) -> FileArchiver {
        let patterns: Vec<String> = patterns.iter().map(|s| (*s).to_owned()).collect();
        FileArchiver::new(&patterns, Arc::new(FsArchiverStorage::new(root))).unwrap()
    }

    #[test]
    fn rejects_invalid_pattern() {
        let store = Arc::new(FsArchiverStorage::new("/tmp"));
        let result = FileArchiver::new(&["[".to_owned()], store);
        assert!(result.is_err());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let archiver = archiver(dir.path(), &["LICENSE*"]);
        assert!(archiver.matches("license.txt"));
        assert!(archiver.matches("LICENSE"));
        assert!(!archiver.matches("README.md"));
    }

    #[test]
    fn archive_roundtrip_keeps_only_matched_files() {
        let store_dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        std::fs::write(source_dir.path().join("LICENSE"), "MIT").unwrap();
        std::fs::write(source_dir.path().join("main.rs"), "fn main() {}").unwrap();
        std::fs::create_dir(source_dir.path().join("sub")).unwrap();
        std::fs::write(source_dir.path().join("sub/COPYING"), "GPL").unwrap();

        let archiver = archiver(store_dir.path(), &["LICENSE*", "**/COPYING"]);
        let provenance = provenance();

        assert!(!archiver.has_archive(&provenance).unwrap());
        archiver.archive(source_dir.path(), &provenance).unwrap();
        assert!(archiver.has_archive(&provenance).unwrap());

        let target_dir = tempfile::tempdir().unwrap();
        assert!(archiver.unarchive(target_dir.path(), &provenance).unwrap());
        assert_eq!(
            std::fs::read_to_string(target_dir.path().join("LICENSE")).unwrap(),
            "MIT"
        );
        assert_eq!(
            std::fs::read_to_string(target_dir.path().join("sub/COPYING")).unwrap(),
            "GPL"
        );
        assert!(!target_dir.path().join("main.rs").exists());
    }

    #[test]
    fn unarchive_missing_archive_returns_false() {
        let store_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let archiver = archiver(store_dir.path(), &["LICENSE*"]);
        assert!(!archiver.unarchive(target_dir.path(), &provenance()).unwrap());
    }
}
