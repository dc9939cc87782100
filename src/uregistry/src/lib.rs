//! Unreal Engine asset registry decoder
//!
//! Reads `AssetRegistry.bin` style streams into an in-memory model and resolves
//! soft object paths against an external package provider.
//!
//! # Format Overview
//!
//! ## Header
//!
//! - 16 bytes: version GUID (`717F9EE7-E9B0493A-88B49132-1B2EB1F4`)
//! - 4 bytes: registry version
//! - 4 bytes: editor-only filter flag (`AddedHeader` and later)
//!
//! ## Body
//!
//! Name resolution depends on the version:
//! - Before `FixedTags`: an `i64` offset to a trailing name table
//! - From `FixedTags`: a name batch and a fixed tag store inline
//!
//! Then, in order:
//! - Asset data array
//! - Dependency section (`i64` byte length prefix from `AddedDependencyFlags`)
//! - Package data array

pub mod archive;
mod asset_data;
pub mod depends;
pub mod name;
mod package_data;
pub mod provider;
mod reader;
pub mod soft_path;
mod state;
mod tag_store;
pub mod version;

#[cfg(test)]
mod test_support;

pub use archive::{Archive, Guid, PackageFileVersion};
pub use asset_data::{AssetData, TagMap};
pub use depends::{
    AssetIdentifier, DependencyFlags, DependsGraph, DependsNode, Edge, ManageFlags,
};
pub use name::{Name, TopLevelAssetPath};
pub use package_data::{AssetPackageData, ChunkHash, CustomVersion};
pub use provider::{Export, Package, PackageProvider};
pub use reader::RegistryReader;
pub use soft_path::SoftObjectPath;
pub use state::AssetRegistryState;
pub use version::{Header, ReaderStrategy, RegistryVersion};

/// Errors from registry decoding and object path resolution
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of stream at offset {offset}: need {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("Invalid count {count} at offset {offset}")]
    InvalidCount { count: i64, offset: u64 },

    #[error("Invalid boolean value {value} at offset {offset}")]
    InvalidBool { value: u32, offset: u64 },

    #[error("Seek to {target} is beyond end of stream ({len} bytes)")]
    SeekOutOfRange { target: u64, len: u64 },

    #[error("Unknown asset registry version {0}")]
    UnknownVersion(i32),

    #[error("Name index {index} out of range ({count} names)")]
    NameIndex { index: i64, count: usize },

    #[error("Depends node index {index} out of range ({count} nodes)")]
    DependsNodeIndex { index: i32, count: usize },

    #[error("Depends node count mismatch: declared {declared}, created {created}")]
    DependsNodeCount { declared: usize, created: usize },

    #[error("Invalid tag store magic: 0x{0:08x}")]
    TagStoreMagic(u32),

    #[error("Invalid tag value id 0x{0:08x}")]
    TagValue(u32),

    #[error("Tag map handle 0x{0:016x} is out of range")]
    MapHandle(u64),

    #[error("Asset path \"{0}\" is in short form and is not supported")]
    UnsupportedPathForm(String),

    #[error("Package was loaded without a package provider")]
    NoProvider,

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Soft object path is empty")]
    EmptyPath,

    #[error("Export {name} not found in package {package}")]
    ExportNotFound { name: String, package: String },

    #[error("Failed to load subobject {name} of {outer} because it was not found")]
    SubobjectNotFound { name: String, outer: String },

    #[error("Loaded export {name} but it was of wrong type (expected {expected})")]
    WrongExportType { name: String, expected: &'static str },
}

impl Error {
    /// Whether this error is a missing-object outcome that lenient
    /// resolution reports as `None` instead of failing.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Error::NoProvider
                | Error::EmptyPath
                | Error::ExportNotFound { .. }
                | Error::SubobjectNotFound { .. }
                | Error::WrongExportType { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
