//! Names and name map loading
//!
//! Registry streams never store name text inline. Names are written as an
//! index into a per-file name map plus an instance number, and the map itself
//! is stored in one of two layouts depending on the registry version:
//!
//! - Name table: an `i64` offset pointing at a trailing table of strings
//! - Name batch: a count, hashes, 2-byte headers and packed string data inline

use serde::Serialize;
use std::fmt;
use std::io::{Read, Seek};

use crate::archive::{Archive, VER_UE4_NAME_HASHES_SERIALIZED};
use crate::{Error, Result};

/// Resolved name text, including any instance number suffix
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Build the display form of `base` with an instance number
    ///
    /// Number 0 means no suffix; otherwise the suffix is `_{number - 1}`.
    pub fn with_number(base: &str, number: u32) -> Self {
        if number == 0 {
            Self(base.to_string())
        } else {
            Self(format!("{}_{}", base, number - 1))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or the engine's `None` name
    pub fn is_none(&self) -> bool {
        self.0.is_empty() || self.0 == "None"
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for Name {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Package name plus top-level asset name (`/Game/Foo.Foo`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TopLevelAssetPath {
    pub package_name: Name,
    pub asset_name: Name,
}

impl TopLevelAssetPath {
    pub fn read<R: Read + Seek>(ar: &mut Archive<R>, names: &[String]) -> Result<Self> {
        Ok(Self {
            package_name: read_name(ar, names)?,
            asset_name: read_name(ar, names)?,
        })
    }

    pub fn to_name(&self) -> Name {
        Name(self.to_string())
    }
}

impl fmt::Display for TopLevelAssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package_name.is_none() {
            return Ok(());
        }
        if self.asset_name.is_none() {
            write!(f, "{}", self.package_name)
        } else {
            write!(f, "{}.{}", self.package_name, self.asset_name)
        }
    }
}

fn lookup(names: &[String], index: i64) -> Result<&str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| names.get(i))
        .map(String::as_str)
        .ok_or(Error::NameIndex {
            index,
            count: names.len(),
        })
}

/// Read a name reference (`i32 index`, `u32 number`)
pub fn read_name<R: Read + Seek>(ar: &mut Archive<R>, names: &[String]) -> Result<Name> {
    let index = ar.read_i32()?;
    let number = ar.read_u32()?;
    Ok(Name::with_number(lookup(names, index as i64)?, number))
}

/// Read a numberless name reference (`u32 index` only)
pub fn read_name_entry<R: Read + Seek>(ar: &mut Archive<R>, names: &[String]) -> Result<Name> {
    let index = ar.read_u32()?;
    Ok(Name::new(lookup(names, index as i64)?))
}

/// Load a name table referenced by an `i64` offset at the cursor
///
/// The cursor is restored to just after the offset field. A non-positive
/// offset means the stream carries no names.
pub fn load_name_table<R: Read + Seek>(ar: &mut Archive<R>) -> Result<Vec<String>> {
    let name_offset = ar.read_i64()?;
    if name_offset <= 0 {
        return Ok(Vec::new());
    }

    let resume = ar.position();
    ar.set_position(name_offset as u64)?;

    let with_hashes = ar.version().ue4 >= VER_UE4_NAME_HASHES_SERIALIZED;
    let names = ar.read_array(|ar| {
        let name = ar.read_fstring()?;
        if with_hashes {
            // Non-case-preserving and case-preserving hashes
            ar.skip(4)?;
        }
        Ok(name)
    })?;

    ar.set_position(resume)?;
    tracing::debug!(count = names.len(), offset = name_offset, "loaded name table");
    Ok(names)
}

/// Load an inline name batch
pub fn load_name_batch<R: Read + Seek>(ar: &mut Archive<R>) -> Result<Vec<String>> {
    let count = ar.read_count()?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let string_bytes = ar.read_u32()?;
    let hash_version = ar.read_u64()?;
    ar.skip(count as u64 * 8)?;

    let headers = ar.read_vec(count, |ar| {
        let hi = ar.read_u8()?;
        let lo = ar.read_u8()?;
        let is_utf16 = hi & 0x80 != 0;
        let len = (((hi & 0x7f) as usize) << 8) | lo as usize;
        Ok((is_utf16, len))
    })?;

    let names = headers
        .into_iter()
        .map(|(is_utf16, len)| {
            if is_utf16 {
                Ok(String::from_utf16_lossy(&ar.read_utf16(len)?))
            } else {
                Ok(String::from_utf8_lossy(&ar.read_bytes(len)?).into_owned())
            }
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        count,
        string_bytes,
        hash_version = format_args!("{:#x}", hash_version),
        "loaded name batch"
    );
    Ok(names)
}
