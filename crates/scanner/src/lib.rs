#![doc = include_str!("../README.md")]

pub mod command;
pub mod orchestrator;
pub mod split;
pub mod wrapper;

pub use command::CommandScanner;
pub use orchestrator::{ScanOrchestrator, ScanOrchestratorBuilder};
pub use split::{merge_nested_result, split_summary};
pub use wrapper::{LocalScanner, PackageRemoteScanner, ProvenanceRemoteScanner, ScannerWrapper};
