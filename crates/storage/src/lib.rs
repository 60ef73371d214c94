#![doc = include_str!("../README.md")]

pub mod archiver;
pub mod fs;
pub mod store;

pub use archiver::{FileArchiver, FileArchiverStorage, FsArchiverStorage};
pub use fs::{FileBasedStorage, FilePackageStorage};
pub use store::{
    PackageScanStorageRead, PackageScanStorageWrite, ProvenanceScanStorageRead,
    ProvenanceScanStorageWrite, StorageReader, StorageWriter, provenance_storage_key,
};
