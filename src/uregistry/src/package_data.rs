//! Package records

use serde::Serialize;
use std::io::{Read, Seek};

use crate::archive::{Guid, PackageFileVersion};
use crate::name::Name;
use crate::reader::RegistryReader;
use crate::version::RegistryVersion;
use crate::Result;

/// Hash of one IO store chunk belonging to a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkHash {
    pub chunk_id: [u8; 12],
    pub hash: [u8; 20],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomVersion {
    pub key: Guid,
    pub version: i32,
}

/// Package-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetPackageData {
    pub package_name: Name,
    pub disk_size: i64,
    pub package_guid: Guid,
    pub cooked_hash: Option<[u8; 16]>,
    pub chunk_hashes: Vec<ChunkHash>,
    pub file_version: Option<PackageFileVersion>,
    pub file_version_licensee: i32,
    pub flags: u32,
    pub custom_versions: Vec<CustomVersion>,
    pub imported_classes: Vec<Name>,
    /// Raw package extension id
    pub extension: Option<u8>,
    /// Raw package location id
    pub location: Option<u8>,
}

impl AssetPackageData {
    pub fn read<R: Read + Seek>(ar: &mut RegistryReader<'_, R>) -> Result<Self> {
        let version = ar.version();

        let package_name = ar.read_name()?;
        let disk_size = ar.read_i64()?;
        let package_guid = ar.read_guid()?;

        let cooked_hash = if version >= RegistryVersion::AddedCookedMD5Hash && ar.read_bool()? {
            Some(ar.read_fixed::<16>()?)
        } else {
            None
        };

        let chunk_hashes = if version >= RegistryVersion::AddedChunkHashes {
            ar.read_array(|ar| {
                Ok(ChunkHash {
                    chunk_id: ar.read_fixed::<12>()?,
                    hash: ar.read_fixed::<20>()?,
                })
            })?
        } else {
            Vec::new()
        };

        let mut file_version = None;
        let mut file_version_licensee = 0;
        let mut flags = 0;
        let mut custom_versions = Vec::new();
        if version >= RegistryVersion::WorkspaceDomain {
            file_version = Some(if version >= RegistryVersion::PackageFileSummaryVersionChange {
                let ue4 = ar.read_i32()?;
                let ue5 = ar.read_i32()?;
                PackageFileVersion::new(ue4, ue5)
            } else {
                PackageFileVersion::ue4_only(ar.read_i32()?)
            });
            file_version_licensee = ar.read_i32()?;
            flags = ar.read_u32()?;
            custom_versions = ar.read_array(|ar| {
                Ok(CustomVersion {
                    key: ar.read_guid()?,
                    version: ar.read_i32()?,
                })
            })?;
        }

        let imported_classes = if version >= RegistryVersion::PackageImportedClasses {
            ar.read_array(|ar| ar.read_name())?
        } else {
            Vec::new()
        };

        let extension = if version >= RegistryVersion::AssetPackageDataHasExtension {
            Some(ar.read_u8()?)
        } else {
            None
        };

        let location = if version >= RegistryVersion::AssetPackageDataHasPackageLocation {
            Some(ar.read_u8()?)
        } else {
            None
        };

        Ok(Self {
            package_name,
            disk_size,
            package_guid,
            cooked_hash,
            chunk_hashes,
            file_version,
            file_version_licensee,
            flags,
            custom_versions,
            imported_classes,
            extension,
            location,
        })
    }
}
