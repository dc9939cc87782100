//! Asset registry state
//!
//! The aggregate root: reads the header, picks a reader strategy and loads
//! asset records, the dependency graph and package records in one pass.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::archive::{Archive, PackageFileVersion};
use crate::asset_data::AssetData;
use crate::depends::DependsGraph;
use crate::package_data::AssetPackageData;
use crate::reader::RegistryReader;
use crate::version::{Header, ReaderStrategy, RegistryVersion};
use crate::{Error, Result};

/// Decoded registry, read-only after load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRegistryState {
    header: Header,
    assets: Vec<AssetData>,
    depends: DependsGraph,
    packages: Vec<AssetPackageData>,
}

impl AssetRegistryState {
    /// Read a registry from the archive's current position
    ///
    /// Registries older than `AddAssetRegistryState` load as an empty state
    /// with a warning. Any other failure aborts the whole load.
    pub fn read<R: Read + Seek>(ar: &mut Archive<R>) -> Result<Self> {
        let header = Header::read(ar)?;

        match ReaderStrategy::select(header.version) {
            ReaderStrategy::Unsupported => {
                tracing::warn!(
                    version = %header.version,
                    "cannot read registry state before {:?}",
                    RegistryVersion::AddAssetRegistryState
                );
                Ok(Self::empty(header))
            }
            ReaderStrategy::NameTable => Self::load(RegistryReader::name_table(ar, header)?),
            ReaderStrategy::FixedTags => Self::load(RegistryReader::fixed_tags(ar, header)?),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_version(bytes, PackageFileVersion::default())
    }

    pub fn from_bytes_with_version(bytes: &[u8], version: PackageFileVersion) -> Result<Self> {
        let mut ar = Archive::with_version(Cursor::new(bytes), version)?;
        Self::read(&mut ar)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_version(path, PackageFileVersion::default())
    }

    pub fn open_with_version(path: impl AsRef<Path>, version: PackageFileVersion) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut ar = Archive::with_version(BufReader::new(file), version)?;
        Self::read(&mut ar)
    }

    fn empty(header: Header) -> Self {
        Self {
            header,
            assets: Vec::new(),
            depends: DependsGraph::default(),
            packages: Vec::new(),
        }
    }

    fn load<R: Read + Seek>(mut ar: RegistryReader<'_, R>) -> Result<Self> {
        let header = *ar.header();
        let version = header.version;

        let assets = ar.read_array(AssetData::read)?;

        if version < RegistryVersion::RemovedMD5Hash {
            // Trailing sections of these versions are not decoded
            return Ok(Self {
                assets,
                ..Self::empty(header)
            });
        }

        let depends = if version < RegistryVersion::AddedDependencyFlags {
            let mut depends = placeholders(&mut ar)?;
            if !depends.is_empty() {
                depends.load_before_flags(&mut ar)?;
            }
            depends
        } else {
            let offset = ar.position();
            let section_size = ar.read_i64()?;
            let section_start = ar.position();
            let section_end = u64::try_from(section_size)
                .ok()
                .and_then(|size| section_start.checked_add(size))
                .ok_or(Error::InvalidCount {
                    count: section_size,
                    offset,
                })?;

            let mut depends = placeholders(&mut ar)?;
            if !depends.is_empty() {
                depends.load(&mut ar)?;
            }

            tracing::debug!(
                nodes = depends.len(),
                consumed = ar.position() - section_start,
                declared = section_size,
                "skipping to end of dependency section"
            );
            ar.set_position(section_end)?;
            depends
        };

        let packages = ar.read_array(AssetPackageData::read)?;

        Ok(Self {
            header,
            assets,
            depends,
            packages,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Whether the registry predates persisted state and was left empty
    pub fn is_unsupported(&self) -> bool {
        ReaderStrategy::select(self.header.version) == ReaderStrategy::Unsupported
    }

    pub fn assets(&self) -> &[AssetData] {
        &self.assets
    }

    pub fn depends_graph(&self) -> &DependsGraph {
        &self.depends
    }

    pub fn packages(&self) -> &[AssetPackageData] {
        &self.packages
    }

    /// All assets whose class name is `class`, as a new vector
    pub fn by_asset_class(&self, class: &str) -> Vec<AssetData> {
        self.assets
            .iter()
            .filter(|asset| asset.class_name() == class)
            .cloned()
            .collect()
    }

    /// Number of assets per class name
    pub fn asset_class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for asset in &self.assets {
            *counts.entry(asset.class_name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Asset with object path `Package.Asset`
    pub fn find_asset(&self, object_path: &str) -> Option<&AssetData> {
        let (package, asset) = object_path.rsplit_once('.')?;
        self.assets
            .iter()
            .find(|a| a.package_name == package && a.asset_name == asset)
    }

    pub fn assets_in_package<'a>(
        &'a self,
        package_name: &'a str,
    ) -> impl Iterator<Item = &'a AssetData> + 'a {
        self.assets
            .iter()
            .filter(move |asset| asset.package_name == package_name)
    }

    pub fn find_package(&self, package_name: &str) -> Option<&AssetPackageData> {
        self.packages
            .iter()
            .find(|package| package.package_name == package_name)
    }
}

/// Read the node count and allocate that many placeholder nodes
fn placeholders<R: Read + Seek>(ar: &mut RegistryReader<'_, R>) -> Result<DependsGraph> {
    let declared = ar.read_count()?;
    let depends = DependsGraph::with_placeholders(declared);
    if depends.len() != declared {
        return Err(Error::DependsNodeCount {
            declared,
            created: depends.len(),
        });
    }
    Ok(depends)
}
