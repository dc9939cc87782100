//! Bounds-checked byte stream reader
//!
//! Wraps any `Read + Seek` source with little-endian primitive reads. The cursor
//! position and stream length are cached so that every read is checked against
//! the remaining bytes before the source is touched.

use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::{Error, Result};

/// UE4 object version that appended hashes to serialized name entries
pub const VER_UE4_NAME_HASHES_SERIALIZED: i32 = 504;

/// UE4 object version that introduced soft object path serialization
pub const VER_UE4_ADDED_SOFT_OBJECT_PATH: i32 = 514;

/// Latest UE4 object version
pub const VER_UE4_LATEST: i32 = 522;

/// UE5 object version that stores soft object asset paths as top-level paths
pub const VER_UE5_FSOFTOBJECTPATH_REMOVE_ASSET_PATH_FNAMES: i32 = 1007;

/// Latest UE5 object version
pub const VER_UE5_LATEST: i32 = 1012;

/// Engine object version pair used to gate package-level layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PackageFileVersion {
    pub ue4: i32,
    /// Zero for streams written by UE4
    pub ue5: i32,
}

impl PackageFileVersion {
    pub const LATEST: Self = Self {
        ue4: VER_UE4_LATEST,
        ue5: VER_UE5_LATEST,
    };

    pub fn new(ue4: i32, ue5: i32) -> Self {
        Self { ue4, ue5 }
    }

    /// Version for a stream written before UE5 object versions existed
    pub fn ue4_only(ue4: i32) -> Self {
        Self { ue4, ue5: 0 }
    }
}

impl Default for PackageFileVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

/// 128-bit GUID stored as four little-endian u32 words
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(pub [u32; 4]);

impl Guid {
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self([a, b, c, d])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{:08X}{:08X}{:08X}{:08X}", a, b, c, d)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sequential reader over a seekable stream
///
/// The archive owns whatever it is given; pass `&mut reader` to keep the
/// underlying stream with the caller.
pub struct Archive<R> {
    inner: R,
    pos: u64,
    len: u64,
    version: PackageFileVersion,
}

impl<R: Read + Seek> Archive<R> {
    /// Wrap a stream using the latest engine object versions
    pub fn new(inner: R) -> Result<Self> {
        Self::with_version(inner, PackageFileVersion::default())
    }

    /// Wrap a stream, gating package-level layouts on `version`
    pub fn with_version(mut inner: R, version: PackageFileVersion) -> Result<Self> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;

        Ok(Self {
            inner,
            pos,
            len,
            version,
        })
    }

    pub fn version(&self) -> PackageFileVersion {
        self.version
    }

    pub fn set_version(&mut self, version: PackageFileVersion) {
        self.version = version;
    }

    /// Absolute cursor position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Total stream length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left between the cursor and the end of the stream
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute offset (forward or backward)
    pub fn set_position(&mut self, target: u64) -> Result<()> {
        if target > self.len {
            return Err(Error::SeekOutOfRange {
                target,
                len: self.len,
            });
        }
        self.inner.seek(SeekFrom::Start(target))?;
        self.pos = target;
        Ok(())
    }

    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.ensure(count)?;
        self.set_position(self.pos + count)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(Error::UnexpectedEof {
                offset: self.pos,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn read_with<T>(
        &mut self,
        size: u64,
        read: impl FnOnce(&mut R) -> std::io::Result<T>,
    ) -> Result<T> {
        self.ensure(size)?;
        let value = read(&mut self.inner)?;
        self.pos += size;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_with(1, |r| r.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_with(2, |r| r.read_u16::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_with(4, |r| r.read_i32::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(4, |r| r.read_u32::<LittleEndian>())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_with(8, |r| r.read_i64::<LittleEndian>())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_with(8, |r| r.read_u64::<LittleEndian>())
    }

    /// Read a 32-bit boolean; anything other than 0 or 1 is rejected
    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.pos;
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(Error::InvalidBool { value, offset }),
        }
    }

    pub fn read_guid(&mut self) -> Result<Guid> {
        Ok(Guid([
            self.read_u32()?,
            self.read_u32()?,
            self.read_u32()?,
            self.read_u32()?,
        ]))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.read_with(count as u64, |r| {
            let mut buf = vec![0u8; count];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.read_with(N as u64, |r| {
            let mut buf = [0u8; N];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    /// Read `count` UTF-16 code units
    pub fn read_utf16(&mut self, count: usize) -> Result<Vec<u16>> {
        self.ensure(count as u64 * 2)?;
        (0..count).map(|_| self.read_u16()).collect()
    }

    /// Read a length-prefixed string
    ///
    /// Positive lengths are single-byte characters, negative lengths are UTF-16
    /// code units; both include a trailing NUL which is stripped.
    pub fn read_fstring(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_i32()?;

        match len {
            0 => Ok(String::new()),
            i32::MIN => Err(Error::InvalidCount {
                count: len as i64,
                offset,
            }),
            len if len > 0 => {
                let bytes = self.read_bytes(len as usize)?;
                Ok(String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\0')
                    .to_string())
            }
            len => {
                let units = self.read_utf16(len.unsigned_abs() as usize)?;
                Ok(String::from_utf16_lossy(&units)
                    .trim_end_matches('\0')
                    .to_string())
            }
        }
    }

    /// Read an `i32` element count, rejecting negative counts and counts that
    /// cannot fit in the rest of the stream
    pub fn read_count(&mut self) -> Result<usize> {
        let offset = self.pos;
        let count = self.read_i32()?;
        if count < 0 || count as u64 > self.remaining() {
            return Err(Error::InvalidCount {
                count: count as i64,
                offset,
            });
        }
        Ok(count as usize)
    }

    /// Read exactly `count` elements
    pub fn read_vec<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Read a length-prefixed array
    pub fn read_array<T>(&mut self, read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_count()?;
        self.read_vec(count, read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Writer;
    use std::io::Cursor;

    #[test]
    fn test_primitive_reads() {
        let mut w = Writer::new();
        w.u8(0xab).u16(0x1234).i32(-5).u32(7).i64(-9).u64(11);
        let mut ar = w.archive();

        assert_eq!(ar.read_u8().unwrap(), 0xab);
        assert_eq!(ar.read_u16().unwrap(), 0x1234);
        assert_eq!(ar.read_i32().unwrap(), -5);
        assert_eq!(ar.read_u32().unwrap(), 7);
        assert_eq!(ar.read_i64().unwrap(), -9);
        assert_eq!(ar.read_u64().unwrap(), 11);
        assert_eq!(ar.remaining(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let mut ar = Writer::new().u16(1).archive();
        let err = ar.read_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof {
                offset: 0,
                needed: 4,
                available: 2
            }
        ));
        // Failed reads do not advance the cursor
        assert_eq!(ar.position(), 0);
    }

    #[test]
    fn test_fstring_ansi_and_utf16() {
        let mut w = Writer::new();
        w.fstring("Hello").utf16_fstring("Wörld").i32(0);
        let mut ar = w.archive();

        assert_eq!(ar.read_fstring().unwrap(), "Hello");
        assert_eq!(ar.read_fstring().unwrap(), "Wörld");
        assert_eq!(ar.read_fstring().unwrap(), "");
    }

    #[test]
    fn test_fstring_length_beyond_stream() {
        let mut w = Writer::new();
        w.i32(100).bytes(b"short");
        let mut ar = w.archive();
        assert!(matches!(
            ar.read_fstring(),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_bool_rejects_garbage() {
        let mut w = Writer::new();
        w.u32(1).u32(0).u32(2);
        let mut ar = w.archive();

        assert!(ar.read_bool().unwrap());
        assert!(!ar.read_bool().unwrap());
        assert!(matches!(
            ar.read_bool(),
            Err(Error::InvalidBool { value: 2, offset: 8 })
        ));
    }

    #[test]
    fn test_count_validation() {
        let mut ar = Writer::new().i32(-1).archive();
        assert!(matches!(
            ar.read_count(),
            Err(Error::InvalidCount { count: -1, .. })
        ));

        // Declares more elements than there are bytes left
        let mut w = Writer::new();
        w.i32(1000).i32(1);
        let mut ar = w.archive();
        assert!(matches!(
            ar.read_count(),
            Err(Error::InvalidCount { count: 1000, .. })
        ));
    }

    #[test]
    fn test_read_array() {
        let mut w = Writer::new();
        w.i32(3).i32(10).i32(20).i32(30);
        let mut ar = w.archive();

        let values = ar.read_array(|ar| ar.read_i32()).unwrap();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn test_seek_bounds() {
        let mut ar = Writer::new().u64(0).archive();
        ar.set_position(8).unwrap();
        assert_eq!(ar.remaining(), 0);
        ar.set_position(2).unwrap();
        assert_eq!(ar.position(), 2);
        assert!(matches!(
            ar.set_position(9),
            Err(Error::SeekOutOfRange { target: 9, len: 8 })
        ));
    }

    #[test]
    fn test_archive_starts_at_stream_position() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        cursor.set_position(2);

        let mut ar = Archive::new(&mut cursor).unwrap();
        assert_eq!(ar.position(), 2);
        assert_eq!(ar.read_u8().unwrap(), 3);
        drop(ar);

        // Stream stays usable by the caller
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_guid_display() {
        let guid = Guid::new(0x717F9EE7, 0xE9B0493A, 0x88B49132, 0x1B2EB1F4);
        assert_eq!(guid.to_string(), "717F9EE7E9B0493A88B491321B2EB1F4");
        assert!(!guid.is_zero());
        assert!(Guid::default().is_zero());
    }

    #[test]
    fn test_default_version_is_latest() {
        let version = PackageFileVersion::default();
        assert_eq!(version.ue4, VER_UE4_LATEST);
        assert_eq!(version.ue5, VER_UE5_LATEST);
        assert_eq!(PackageFileVersion::ue4_only(500).ue5, 0);
    }
}
