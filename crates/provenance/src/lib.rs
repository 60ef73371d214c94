#![doc = include_str!("../README.md")]

pub mod download;
pub mod nested;
pub mod resolver;

pub use download::ProvenanceDownloader;
pub use nested::{
    DefaultNestedProvenanceResolver, NestedProvenanceResolver, NoSubRepositories,
    SubRepositoryDiscovery,
};
pub use resolver::{DefaultProvenanceResolver, PackageProvenanceResolver};
