//! Asset records

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Read, Seek};

use crate::name::{Name, TopLevelAssetPath};
use crate::reader::RegistryReader;
use crate::version::RegistryVersion;
use crate::Result;

/// Asset tags, sorted by key
pub type TagMap = BTreeMap<String, String>;

/// Lightweight descriptor of one discoverable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetData {
    pub package_path: Name,
    /// Full class path; `TopLevelAssetPath::asset_name` is the class name
    pub asset_class: TopLevelAssetPath,
    pub package_name: Name,
    pub asset_name: Name,
    pub tags: TagMap,
    pub chunk_ids: Vec<i32>,
    pub package_flags: u32,
}

impl AssetData {
    pub fn read<R: Read + Seek>(ar: &mut RegistryReader<'_, R>) -> Result<Self> {
        let version = ar.version();

        if version < RegistryVersion::RemoveAssetPathFNames {
            // Redundant with package_name + asset_name
            let _object_path = ar.read_name()?;
        }

        let package_path = ar.read_name()?;
        let asset_class = if version >= RegistryVersion::ClassPaths {
            ar.read_top_level_asset_path()?
        } else {
            // Short class name only; the owning package is unknown
            TopLevelAssetPath {
                package_name: Name::default(),
                asset_name: ar.read_name()?,
            }
        };
        let package_name = ar.read_name()?;
        let asset_name = ar.read_name()?;
        let tags = ar.read_tags()?;
        let chunk_ids = ar.read_array(|ar| ar.read_i32())?;
        let package_flags = ar.read_u32()?;

        Ok(Self {
            package_path,
            asset_class,
            package_name,
            asset_name,
            tags,
            chunk_ids,
            package_flags,
        })
    }

    /// Class name used for class filtering (`Texture2D`, `StaticMesh`, ...)
    pub fn class_name(&self) -> &str {
        self.asset_class.asset_name.as_str()
    }

    /// `Package.Asset`
    pub fn object_path(&self) -> String {
        format!("{}.{}", self.package_name, self.asset_name)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Writer;
    use crate::version::Header;
    use crate::Error;

    fn header(version: RegistryVersion) -> Header {
        Header {
            version,
            filter_editor_only_data: false,
        }
    }

    const NAMES: [&str; 7] = [
        "None",
        "/Game/Weapons",
        "/Script/Engine",
        "Texture2D",
        "/Game/Weapons/T_Gun",
        "T_Gun",
        "/Game/Weapons/T_Gun.T_Gun",
    ];

    #[test]
    fn test_read_current_layout() {
        let mut w = Writer::new();
        w.name_batch(&NAMES).empty_tag_store();
        w.name(1, 0); // package path
        w.name(2, 0).name(3, 0); // class path
        w.name(4, 0).name(5, 0);
        w.u64(0); // tag map handle
        w.i32(2).i32(0).i32(11);
        w.u32(0x8000_0000);

        let mut ar = w.archive();
        let mut reader = RegistryReader::fixed_tags(&mut ar, header(RegistryVersion::LATEST)).unwrap();
        let asset = AssetData::read(&mut reader).unwrap();

        assert_eq!(asset.package_path, "/Game/Weapons");
        assert_eq!(asset.class_name(), "Texture2D");
        assert_eq!(asset.asset_class.to_string(), "/Script/Engine.Texture2D");
        assert_eq!(asset.object_path(), "/Game/Weapons/T_Gun.T_Gun");
        assert!(asset.tags.is_empty());
        assert_eq!(asset.chunk_ids, vec![0, 11]);
        assert_eq!(asset.package_flags, 0x8000_0000);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_legacy_layout() {
        let mut w = Writer::new();
        w.i64(0);
        w.name(6, 0); // object path
        w.name(1, 0);
        w.name(3, 0); // short class name
        w.name(4, 0).name(5, 0);
        w.i32(1).name(3, 0).fstring("1024x1024");
        w.i32(0);
        w.u32(0);
        let table_at = w.position();
        w.i32(NAMES.len() as i32);
        for name in NAMES {
            w.fstring(name).u32(0);
        }
        w.patch_i64(0, table_at as i64);

        let mut ar = w.archive();
        let mut reader =
            RegistryReader::name_table(&mut ar, header(RegistryVersion::ChangedAssetData)).unwrap();
        let asset = AssetData::read(&mut reader).unwrap();

        assert_eq!(asset.class_name(), "Texture2D");
        assert!(asset.asset_class.package_name.is_none());
        assert_eq!(asset.object_path(), "/Game/Weapons/T_Gun.T_Gun");
        assert_eq!(asset.tag("Texture2D"), Some("1024x1024"));
        assert!(asset.chunk_ids.is_empty());
        assert_eq!(reader.position(), table_at);
    }

    #[test]
    fn test_truncated_record() {
        let mut w = Writer::new();
        w.name_batch(&NAMES).empty_tag_store();
        w.name(1, 0).name(2, 0);

        let mut ar = w.archive();
        let mut reader = RegistryReader::fixed_tags(&mut ar, header(RegistryVersion::LATEST)).unwrap();
        assert!(matches!(
            AssetData::read(&mut reader),
            Err(Error::UnexpectedEof { .. })
        ));
    }
}
