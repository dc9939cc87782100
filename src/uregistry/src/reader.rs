//! Archive bound to a name and tag resolution strategy

use std::io::{Read, Seek};
use std::ops::{Deref, DerefMut};

use crate::archive::Archive;
use crate::asset_data::TagMap;
use crate::name::{self, Name, TopLevelAssetPath};
use crate::tag_store::TagStore;
use crate::version::{Header, RegistryVersion};
use crate::Result;

enum TagSource {
    /// `(Name, FString)` pairs written next to each asset
    Inline,
    /// 64-bit handles into a shared store
    Store(TagStore),
}

/// Registry body reader
///
/// Record readers only see names and tags through this type, so the same
/// record code serves both name strategies. Primitive reads go straight to
/// the wrapped [`Archive`].
pub struct RegistryReader<'a, R> {
    ar: &'a mut Archive<R>,
    header: Header,
    names: Vec<String>,
    tags: TagSource,
}

impl<'a, R: Read + Seek> RegistryReader<'a, R> {
    /// Names from a table referenced by offset, tags inline
    pub fn name_table(ar: &'a mut Archive<R>, header: Header) -> Result<Self> {
        let names = name::load_name_table(ar)?;
        Ok(Self {
            ar,
            header,
            names,
            tags: TagSource::Inline,
        })
    }

    /// Names from an inline batch, tags from the fixed store that follows it
    pub fn fixed_tags(ar: &'a mut Archive<R>, header: Header) -> Result<Self> {
        let names = name::load_name_batch(ar)?;
        let store = TagStore::read(ar, &names, header.version)?;
        Ok(Self {
            ar,
            header,
            names,
            tags: TagSource::Store(store),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> RegistryVersion {
        self.header.version
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn read_name(&mut self) -> Result<Name> {
        name::read_name(self.ar, &self.names)
    }

    pub fn read_top_level_asset_path(&mut self) -> Result<TopLevelAssetPath> {
        TopLevelAssetPath::read(self.ar, &self.names)
    }

    /// Length-prefixed array whose elements may read names and tags
    pub fn read_array<T>(&mut self, mut read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.ar.read_count()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    pub fn read_tags(&mut self) -> Result<TagMap> {
        match &self.tags {
            TagSource::Inline => {
                let count = self.ar.read_count()?;
                let mut tags = TagMap::new();
                for _ in 0..count {
                    let key = name::read_name(self.ar, &self.names)?;
                    let value = self.ar.read_fstring()?;
                    tags.insert(key.into_string(), value);
                }
                Ok(tags)
            }
            TagSource::Store(store) => {
                let handle = self.ar.read_u64()?;
                store.resolve(handle)
            }
        }
    }
}

impl<R> Deref for RegistryReader<'_, R> {
    type Target = Archive<R>;

    fn deref(&self) -> &Archive<R> {
        &*self.ar
    }
}

impl<R> DerefMut for RegistryReader<'_, R> {
    fn deref_mut(&mut self) -> &mut Archive<R> {
        &mut *self.ar
    }
}
