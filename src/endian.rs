// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Byte order handling. An ELF file has exactly one byte order, declared in
//! `e_ident[EI_DATA]`, and every multi-byte integer in the file uses it.

use crate::error::{Error, Result};

/// The byte order used for every multi-byte field of a file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// What to do with a 64-bit model value that doesn't fit the 32-bit field it
/// is written to in a class-32 file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Narrowing {
    /// Keep the low 32 bits.
    #[default]
    Truncate,
    /// Fail with `Error::Narrowing`.
    Reject,
}

impl Narrowing {
    pub fn narrow(self, field: &'static str, value: u64) -> Result<u32> {
        match self {
            Narrowing::Truncate => Ok(value as u32),
            Narrowing::Reject => {
                u32::try_from(value).map_err(|_| Error::Narrowing { field, value })
            }
        }
    }
}

fn span(at: usize, len: usize, size: usize) -> Option<std::ops::Range<usize>> {
    let end = at.checked_add(len)?;
    if end > size {
        return None;
    }
    Some(at..end)
}

fn truncated(at: usize, len: usize, size: usize) -> Error {
    Error::Truncated { offset: at as u64, len, size }
}

fn out_of_range(at: usize, len: usize, size: usize) -> Error {
    Error::OutOfRange { offset: at as u64, len, size }
}

macro_rules! endian_accessors {
    ($($read:ident, $write:ident, $ty:ty;)*) => {$(
        pub fn $read(self, buf: &[u8], at: usize) -> Result<$ty> {
            const N: usize = std::mem::size_of::<$ty>();
            let r = span(at, N, buf.len()).ok_or_else(|| truncated(at, N, buf.len()))?;
            let mut raw = [0u8; N];
            raw.copy_from_slice(&buf[r]);
            Ok(match self {
                Endian::Little => <$ty>::from_le_bytes(raw),
                Endian::Big => <$ty>::from_be_bytes(raw),
            })
        }

        pub fn $write(self, buf: &mut [u8], at: usize, value: $ty) -> Result<()> {
            const N: usize = std::mem::size_of::<$ty>();
            let r = span(at, N, buf.len()).ok_or_else(|| out_of_range(at, N, buf.len()))?;
            let raw = match self {
                Endian::Little => value.to_le_bytes(),
                Endian::Big => value.to_be_bytes(),
            };
            buf[r].copy_from_slice(&raw);
            Ok(())
        }
    )*};
}

impl Endian {
    endian_accessors! {
        read_u16, write_u16, u16;
        read_u32, write_u32, u32;
        read_u64, write_u64, u64;
    }
}

/// Borrows the `len` bytes of `buf` starting at `at`.
pub fn read_bytes(buf: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    let r = span(at, len, buf.len()).ok_or_else(|| truncated(at, len, buf.len()))?;
    Ok(&buf[r])
}

/// Copies `bytes` into `buf` starting at `at`.
pub fn write_bytes(buf: &mut [u8], at: usize, bytes: &[u8]) -> Result<()> {
    let r = span(at, bytes.len(), buf.len())
        .ok_or_else(|| out_of_range(at, bytes.len(), buf.len()))?;
    buf[r].copy_from_slice(bytes);
    Ok(())
}

/// Converts a file offset from the model into a buffer index. Offsets that
/// don't fit in `usize` can never be inside a buffer anyway.
pub fn offset(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order_is_respected() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

        assert_eq!(Endian::Little.read_u16(&buf, 0), Ok(0x0201));
        assert_eq!(Endian::Big.read_u16(&buf, 0), Ok(0x0102));
        assert_eq!(Endian::Little.read_u32(&buf, 4), Ok(0x08070605));
        assert_eq!(Endian::Big.read_u32(&buf, 4), Ok(0x05060708));
        assert_eq!(Endian::Little.read_u64(&buf, 0), Ok(0x0807060504030201));
        assert_eq!(Endian::Big.read_u64(&buf, 0), Ok(0x0102030405060708));
    }

    #[test]
    fn test_write_matches_read() {
        let mut buf = [0u8; 8];

        Endian::Big.write_u32(&mut buf, 2, 0xdeadbeef).unwrap();
        assert_eq!(buf, [0, 0, 0xde, 0xad, 0xbe, 0xef, 0, 0]);

        Endian::Little.write_u16(&mut buf, 0, 0x1234).unwrap();
        assert_eq!(&buf[..2], &[0x34, 0x12]);
    }

    #[test]
    fn test_reads_past_end_are_truncated() {
        let buf = [0u8; 6];

        assert_eq!(
            Endian::Little.read_u32(&buf, 4),
            Err(Error::Truncated { offset: 4, len: 4, size: 6 })
        );
        assert!(Endian::Big.read_u64(&buf, usize::MAX).is_err());
        assert!(read_bytes(&buf, 2, 4).is_ok());
        assert!(read_bytes(&buf, 3, 4).is_err());
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(Narrowing::Truncate.narrow("x", 0x1_0000_0001), Ok(1));
        assert_eq!(Narrowing::Reject.narrow("x", 0xffff_ffff), Ok(0xffff_ffff));
        assert_eq!(
            Narrowing::Reject.narrow("x", 0x1_0000_0000),
            Err(Error::Narrowing { field: "x", value: 0x1_0000_0000 })
        );
    }

    #[test]
    fn test_writes_past_end_are_out_of_range() {
        let mut buf = [0u8; 4];

        assert_eq!(
            Endian::Little.write_u16(&mut buf, 3, 1),
            Err(Error::OutOfRange { offset: 3, len: 2, size: 4 })
        );
        assert!(write_bytes(&mut buf, 1, &[1, 2, 3]).is_ok());
        assert_eq!(buf, [0, 1, 2, 3]);
    }
}
