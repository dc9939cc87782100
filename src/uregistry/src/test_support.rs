//! Byte stream builders for tests

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Cursor;

use crate::archive::{Archive, Guid, PackageFileVersion};
use crate::version::{RegistryVersion, VERSION_GUID};

/// Little-endian byte writer mirroring the archive reads
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.clone()
    }

    pub fn archive(&self) -> Archive<Cursor<Vec<u8>>> {
        Archive::new(Cursor::new(self.to_vec())).unwrap()
    }

    pub fn archive_with_version(&self, version: PackageFileVersion) -> Archive<Cursor<Vec<u8>>> {
        Archive::with_version(Cursor::new(self.to_vec()), version).unwrap()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.write_u8(v).unwrap();
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.write_u16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.write_i32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.buf.write_i64::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.write_u64::<LittleEndian>(v).unwrap();
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u32(v as u32)
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn guid(&mut self, guid: Guid) -> &mut Self {
        for word in guid.0 {
            self.u32(word);
        }
        self
    }

    /// Single-byte string with trailing NUL
    pub fn fstring(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self.i32(0);
        }
        self.i32(s.len() as i32 + 1).bytes(s.as_bytes()).u8(0)
    }

    /// UTF-16 string with trailing NUL (negative length)
    pub fn utf16_fstring(&mut self, s: &str) -> &mut Self {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.i32(-(units.len() as i32 + 1));
        for unit in units {
            self.u16(unit);
        }
        self.u16(0)
    }

    /// Name reference as `(index, number)`
    pub fn name(&mut self, index: u32, number: u32) -> &mut Self {
        self.u32(index).u32(number)
    }

    /// Overwrite a previously written `i64` placeholder
    pub fn patch_i64(&mut self, at: u64, v: i64) -> &mut Self {
        let at = at as usize;
        self.buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
        self
    }

    /// Registry header for `version`
    pub fn header(&mut self, version: RegistryVersion) -> &mut Self {
        self.guid(VERSION_GUID).i32(version as i32);
        if version >= RegistryVersion::AddedHeader {
            self.bool(false);
        }
        self
    }

    /// Name batch (UTF-8 entries only)
    pub fn name_batch(&mut self, names: &[&str]) -> &mut Self {
        self.i32(names.len() as i32);
        if names.is_empty() {
            return self;
        }
        let string_bytes: usize = names.iter().map(|n| n.len()).sum();
        self.u32(string_bytes as u32).u64(0xC1640000);
        for _ in names {
            self.u64(0);
        }
        for name in names {
            let len = name.len() as u16;
            self.u8((len >> 8) as u8 & 0x7f).u8(len as u8);
        }
        for name in names {
            self.bytes(name.as_bytes());
        }
        self
    }

    /// Flagged-layout depends node for package `name` with package
    /// dependencies `(index, flag bits)` and referencers
    pub fn depends_node(&mut self, name: u32, deps: &[(i32, u32)], referencers: &[i32]) -> &mut Self {
        self.u8(0b0001).name(name, 0);

        self.i32(deps.len() as i32);
        for (index, _) in deps {
            self.i32(*index);
        }
        let mut words = vec![0u32; (deps.len() * 3).div_ceil(32)];
        for (edge, (_, flags)) in deps.iter().enumerate() {
            for bit in 0..3 {
                if flags & (1 << bit) != 0 {
                    let pos = edge * 3 + bit;
                    words[pos / 32] |= 1 << (pos % 32);
                }
            }
        }
        for word in words {
            self.u32(word);
        }

        self.i32(0); // name dependencies
        self.i32(0); // manage dependencies
        self.i32(referencers.len() as i32);
        for index in referencers {
            self.i32(*index);
        }
        self
    }

    /// Empty fixed tag store
    pub fn empty_tag_store(&mut self) -> &mut Self {
        self.u32(0x12345679);
        for _ in 0..11 {
            self.i32(0);
        }
        self.u32(0).u32(0x87654321)
    }
}
