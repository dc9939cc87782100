//! Registry format versions and reader strategy selection

use serde::Serialize;
use std::fmt;
use std::io::{Read, Seek};

use crate::archive::{Archive, Guid};
use crate::{Error, Result};

/// GUID that marks a versioned registry stream
pub const VERSION_GUID: Guid = Guid::new(0x717F9EE7, 0xE9B0493A, 0x88B49132, 0x1B2EB1F4);

/// Historical registry format revisions, in the order they were introduced
///
/// Every layout decision compares against one of these with `<`/`>=`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RegistryVersion {
    PreVersioning = 0,
    HardSoftDependencies,
    AddAssetRegistryState,
    ChangedAssetData,
    RemovedMD5Hash,
    AddedHardManage,
    AddedCookedMD5Hash,
    AddedDependencyFlags,
    FixedTags,
    WorkspaceDomain,
    PackageImportedClasses,
    PackageFileSummaryVersionChange,
    ObjectResourceOptionalVersionChange,
    AddedChunkHashes,
    ClassPaths,
    RemoveAssetPathFNames,
    AddedHeader,
    AssetPackageDataHasExtension,
    AssetPackageDataHasPackageLocation,
    MarshalledTextAsUTF8String,
}

impl RegistryVersion {
    pub const LATEST: Self = Self::MarshalledTextAsUTF8String;

    pub const ALL: [Self; 20] = [
        Self::PreVersioning,
        Self::HardSoftDependencies,
        Self::AddAssetRegistryState,
        Self::ChangedAssetData,
        Self::RemovedMD5Hash,
        Self::AddedHardManage,
        Self::AddedCookedMD5Hash,
        Self::AddedDependencyFlags,
        Self::FixedTags,
        Self::WorkspaceDomain,
        Self::PackageImportedClasses,
        Self::PackageFileSummaryVersionChange,
        Self::ObjectResourceOptionalVersionChange,
        Self::AddedChunkHashes,
        Self::ClassPaths,
        Self::RemoveAssetPathFNames,
        Self::AddedHeader,
        Self::AssetPackageDataHasExtension,
        Self::AssetPackageDataHasPackageLocation,
        Self::MarshalledTextAsUTF8String,
    ];
}

impl TryFrom<i32> for RegistryVersion {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(Error::UnknownVersion(value))
    }
}

impl fmt::Display for RegistryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Registry stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub version: RegistryVersion,
    pub filter_editor_only_data: bool,
}

impl Header {
    /// Header of a stream that carries no version marker
    pub const UNVERSIONED: Self = Self {
        version: RegistryVersion::PreVersioning,
        filter_editor_only_data: false,
    };

    pub fn read<R: Read + Seek>(ar: &mut Archive<R>) -> Result<Self> {
        let guid = ar.read_guid()?;
        if guid != VERSION_GUID {
            tracing::debug!(%guid, "registry stream has no version marker");
            return Ok(Self::UNVERSIONED);
        }

        let version = RegistryVersion::try_from(ar.read_i32()?)?;
        let filter_editor_only_data = if version >= RegistryVersion::AddedHeader {
            ar.read_bool()?
        } else {
            false
        };

        Ok(Self {
            version,
            filter_editor_only_data,
        })
    }
}

/// How the registry body resolves names and tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStrategy {
    /// Predates persisted registry state; nothing past the header is read
    Unsupported,
    /// Names come from a table referenced by offset; tags are inline
    NameTable,
    /// Names come from an inline batch; tags live in a fixed tag store
    FixedTags,
}

impl ReaderStrategy {
    pub fn select(version: RegistryVersion) -> Self {
        if version < RegistryVersion::AddAssetRegistryState {
            Self::Unsupported
        } else if version < RegistryVersion::FixedTags {
            Self::NameTable
        } else {
            Self::FixedTags
        }
    }
}
