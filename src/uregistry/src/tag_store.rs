//! Fixed-layout tag store
//!
//! From `FixedTags` on, asset tags are not written inline. Each asset carries a
//! 64-bit map handle pointing at a run of key/value pairs in a shared store, and
//! each value is a typed id into one of the store's tables.
//!
//! ## Layout
//!
//! - `u32` begin magic (`0x12345678`, or `0x12345679` when texts come first)
//! - 11 `i32` table counts
//! - `u32` text byte size and texts (text-first order only)
//! - numberless names, names, numberless export paths, export paths
//! - texts (member order only)
//! - ANSI offsets, wide offsets, ANSI bytes, wide code units
//! - numberless pairs, pairs
//! - `u32` end magic `0x87654321`

use std::fmt;
use std::io::{Read, Seek};

use crate::archive::Archive;
use crate::asset_data::TagMap;
use crate::name::{read_name, read_name_entry, Name};
use crate::version::RegistryVersion;
use crate::{Error, Result};

const BEGIN_MAGIC: u32 = 0x12345678;
const BEGIN_MAGIC_TEXT_FIRST: u32 = 0x12345679;
const END_MAGIC: u32 = 0x87654321;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadOrder {
    Member,
    TextFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    AnsiString,
    WideString,
    NumberlessName,
    Name,
    NumberlessExportPath,
    ExportPath,
    LocalizedText,
}

/// Typed index into one of the store tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValueId {
    kind: ValueType,
    index: usize,
}

impl TryFrom<u32> for ValueId {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        let kind = match id & 0x7 {
            0 => ValueType::AnsiString,
            1 => ValueType::WideString,
            2 => ValueType::NumberlessName,
            3 => ValueType::Name,
            4 => ValueType::NumberlessExportPath,
            5 => ValueType::ExportPath,
            6 => ValueType::LocalizedText,
            _ => return Err(Error::TagValue(id)),
        };
        Ok(Self {
            kind,
            index: (id >> 3) as usize,
        })
    }
}

/// Handle an asset uses to reference its tag pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapHandle {
    numberless: bool,
    count: usize,
    first: usize,
}

impl From<u64> for MapHandle {
    fn from(raw: u64) -> Self {
        Self {
            numberless: raw >> 63 != 0,
            count: ((raw >> 32) & 0xffff) as usize,
            first: (raw & 0xffff_ffff) as usize,
        }
    }
}

/// `Class'Package.Object'`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ExportPath {
    class: String,
    package: Name,
    object: Name,
}

impl fmt::Display for ExportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.class.is_empty() {
            write!(f, "{}'", self.class)?;
        }
        write!(f, "{}", self.package)?;
        if !self.object.is_none() {
            write!(f, ".{}", self.object)?;
        }
        if !self.class.is_empty() {
            f.write_str("'")?;
        }
        Ok(())
    }
}

/// Decoded tag store, shared by every asset in the registry
#[derive(Debug, Default)]
pub(crate) struct TagStore {
    numberless_names: Vec<Name>,
    names: Vec<Name>,
    numberless_export_paths: Vec<ExportPath>,
    export_paths: Vec<ExportPath>,
    texts: Vec<String>,
    ansi_offsets: Vec<u32>,
    wide_offsets: Vec<u32>,
    ansi_strings: Vec<u8>,
    wide_strings: Vec<u16>,
    numberless_pairs: Vec<(Name, u32)>,
    pairs: Vec<(Name, u32)>,
}

impl TagStore {
    pub fn read<R: Read + Seek>(
        ar: &mut Archive<R>,
        names: &[String],
        version: RegistryVersion,
    ) -> Result<Self> {
        let order = match ar.read_u32()? {
            BEGIN_MAGIC => LoadOrder::Member,
            BEGIN_MAGIC_TEXT_FIRST => LoadOrder::TextFirst,
            magic => return Err(Error::TagStoreMagic(magic)),
        };

        let mut counts = [0usize; 11];
        for count in counts.iter_mut() {
            *count = ar.read_count()?;
        }
        let [numberless_names, name_count, numberless_export_paths, export_paths, texts, ansi_offsets, wide_offsets, ansi_strings, wide_strings, numberless_pairs, pairs] =
            counts;

        let mut store = Self::default();

        if order == LoadOrder::TextFirst {
            let _text_bytes = ar.read_u32()?;
            store.texts = ar.read_vec(texts, |ar| read_text(ar, version))?;
        }

        store.numberless_names = ar.read_vec(numberless_names, |ar| read_name_entry(ar, names))?;
        store.names = ar.read_vec(name_count, |ar| read_name(ar, names))?;
        store.numberless_export_paths = ar.read_vec(numberless_export_paths, |ar| {
            read_numberless_export_path(ar, names, version)
        })?;
        store.export_paths =
            ar.read_vec(export_paths, |ar| read_export_path(ar, names, version))?;

        if order == LoadOrder::Member {
            store.texts = ar.read_vec(texts, |ar| read_text(ar, version))?;
        }

        store.ansi_offsets = ar.read_vec(ansi_offsets, |ar| ar.read_u32())?;
        store.wide_offsets = ar.read_vec(wide_offsets, |ar| ar.read_u32())?;
        store.ansi_strings = ar.read_bytes(ansi_strings)?;
        store.wide_strings = ar.read_utf16(wide_strings)?;

        store.numberless_pairs = ar.read_vec(numberless_pairs, |ar| {
            Ok((read_name_entry(ar, names)?, ar.read_u32()?))
        })?;
        store.pairs = ar.read_vec(pairs, |ar| Ok((read_name(ar, names)?, ar.read_u32()?)))?;

        match ar.read_u32()? {
            END_MAGIC => {}
            magic => return Err(Error::TagStoreMagic(magic)),
        }

        tracing::debug!(
            pairs = store.pairs.len(),
            numberless_pairs = store.numberless_pairs.len(),
            texts = store.texts.len(),
            "loaded tag store"
        );
        Ok(store)
    }

    /// Resolve the tag map referenced by `handle`
    pub fn resolve(&self, handle: u64) -> Result<TagMap> {
        let map = MapHandle::from(handle);
        let pairs = if map.numberless {
            &self.numberless_pairs
        } else {
            &self.pairs
        };

        let run = map
            .first
            .checked_add(map.count)
            .and_then(|end| pairs.get(map.first..end))
            .ok_or(Error::MapHandle(handle))?;

        run.iter()
            .map(|(key, id)| Ok((key.to_string(), self.value(*id)?)))
            .collect()
    }

    fn value(&self, raw: u32) -> Result<String> {
        let id = ValueId::try_from(raw)?;
        let missing = || Error::TagValue(raw);

        let value = match id.kind {
            ValueType::AnsiString => {
                let offset = *self.ansi_offsets.get(id.index).ok_or_else(missing)? as usize;
                let bytes = self.ansi_strings.get(offset..).ok_or_else(missing)?;
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            }
            ValueType::WideString => {
                let offset = *self.wide_offsets.get(id.index).ok_or_else(missing)? as usize;
                let units = self.wide_strings.get(offset..).ok_or_else(missing)?;
                let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
                String::from_utf16_lossy(&units[..end])
            }
            ValueType::NumberlessName => self
                .numberless_names
                .get(id.index)
                .ok_or_else(missing)?
                .to_string(),
            ValueType::Name => self.names.get(id.index).ok_or_else(missing)?.to_string(),
            ValueType::NumberlessExportPath => self
                .numberless_export_paths
                .get(id.index)
                .ok_or_else(missing)?
                .to_string(),
            ValueType::ExportPath => self
                .export_paths
                .get(id.index)
                .ok_or_else(missing)?
                .to_string(),
            ValueType::LocalizedText => self.texts.get(id.index).ok_or_else(missing)?.clone(),
        };
        Ok(value)
    }
}

fn read_text<R: Read + Seek>(ar: &mut Archive<R>, version: RegistryVersion) -> Result<String> {
    if version < RegistryVersion::MarshalledTextAsUTF8String {
        return ar.read_fstring();
    }

    let offset = ar.position();
    let len = ar.read_i32()?;
    let len = usize::try_from(len).map_err(|_| Error::InvalidCount {
        count: len as i64,
        offset,
    })?;
    let bytes = ar.read_bytes(len)?;
    Ok(String::from_utf8_lossy(&bytes)
        .trim_end_matches('\0')
        .to_string())
}

fn read_numberless_export_path<R: Read + Seek>(
    ar: &mut Archive<R>,
    names: &[String],
    version: RegistryVersion,
) -> Result<ExportPath> {
    if version >= RegistryVersion::ClassPaths {
        let class_package = read_name_entry(ar, names)?;
        let class_object = read_name_entry(ar, names)?;
        let package = read_name_entry(ar, names)?;
        let object = read_name_entry(ar, names)?;
        Ok(ExportPath {
            class: class_path(&class_package, &class_object),
            package,
            object,
        })
    } else {
        let class = read_name_entry(ar, names)?;
        let object = read_name_entry(ar, names)?;
        let package = read_name_entry(ar, names)?;
        Ok(ExportPath {
            class: class_text(&class),
            package,
            object,
        })
    }
}

fn read_export_path<R: Read + Seek>(
    ar: &mut Archive<R>,
    names: &[String],
    version: RegistryVersion,
) -> Result<ExportPath> {
    if version >= RegistryVersion::ClassPaths {
        let class_package = read_name(ar, names)?;
        let class_object = read_name(ar, names)?;
        let package = read_name(ar, names)?;
        let object = read_name(ar, names)?;
        Ok(ExportPath {
            class: class_path(&class_package, &class_object),
            package,
            object,
        })
    } else {
        let class = read_name(ar, names)?;
        let object = read_name(ar, names)?;
        let package = read_name(ar, names)?;
        Ok(ExportPath {
            class: class_text(&class),
            package,
            object,
        })
    }
}

fn class_text(class: &Name) -> String {
    if class.is_none() {
        String::new()
    } else {
        class.to_string()
    }
}

fn class_path(package: &Name, object: &Name) -> String {
    match (package.is_none(), object.is_none()) {
        (true, _) => String::new(),
        (false, true) => package.to_string(),
        (false, false) => format!("{}.{}", package, object),
    }
}
