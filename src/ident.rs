// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! The 16 byte identification block at the very start of every ELF file,
//! `e_ident`. It declares the class and byte order the rest of the file is
//! written in, so it is always decoded first and encoded first.

use crate::endian::{self, Endian};
use crate::error::{Error, Result};
use crate::format::*;

/// File class, `e_ident[EI_CLASS]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Class {
    /// Invalid class
    None,
    /// 32-bit objects
    Elf32,
    /// 64-bit objects
    Elf64,
    /// Unknown class; value copied literally
    Unknown(u8),
}

impl Class {
    pub fn from_u8(v: u8) -> Class {
        match v {
            ELFCLASSNONE => Class::None,
            ELFCLASS32 => Class::Elf32,
            ELFCLASS64 => Class::Elf64,
            x => Class::Unknown(x),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Class::None => ELFCLASSNONE,
            Class::Elf32 => ELFCLASS32,
            Class::Elf64 => ELFCLASS64,
            Class::Unknown(x) => x,
        }
    }

    /// Fails with `BadClass` unless this is one of the two classes with a
    /// defined layout.
    pub fn check(self) -> Result<Class> {
        match self {
            Class::Elf32 | Class::Elf64 => Ok(self),
            other => Err(Error::BadClass(other.to_u8())),
        }
    }

    /// Size of the file header, identification included.
    pub fn ehdr_size(self) -> u16 {
        match self {
            Class::Elf64 => ELF64_EHDR_SIZE,
            _ => ELF32_EHDR_SIZE,
        }
    }

    pub fn phdr_size(self) -> u16 {
        match self {
            Class::Elf64 => ELF64_PHDR_SIZE,
            _ => ELF32_PHDR_SIZE,
        }
    }

    pub fn shdr_size(self) -> u16 {
        match self {
            Class::Elf64 => ELF64_SHDR_SIZE,
            _ => ELF32_SHDR_SIZE,
        }
    }
}

/// Data format (endianness), `e_ident[EI_DATA]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Data {
    None,
    LittleEndian,
    BigEndian,
    /// Unknown data format; value copied literally
    Unknown(u8),
}

impl Data {
    pub fn from_u8(v: u8) -> Data {
        match v {
            ELFDATANONE => Data::None,
            ELFDATA2LSB => Data::LittleEndian,
            ELFDATA2MSB => Data::BigEndian,
            x => Data::Unknown(x),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Data::None => ELFDATANONE,
            Data::LittleEndian => ELFDATA2LSB,
            Data::BigEndian => ELFDATA2MSB,
            Data::Unknown(x) => x,
        }
    }

    /// Byte order used for the rest of the file. Only `ELFDATA2LSB` means
    /// little-endian; anything else is read and written big-endian.
    pub fn endian(self) -> Endian {
        match self {
            Data::LittleEndian => Endian::Little,
            _ => Endian::Big,
        }
    }
}

/// The identification block. Every byte is kept, padding included, so that
/// encoding reproduces exactly what was decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    /// `EI_MAG0` through `EI_MAG3`. Always `ELFMAG` for a decoded file.
    pub magic: [u8; 4],
    pub class: Class,
    pub data: Data,
    /// `EI_VERSION`; only `EV_CURRENT` is meaningful.
    pub version: u8,
    pub osabi: u8,
    pub abiversion: u8,
    /// `EI_PAD` onwards. Reserved, but written back verbatim.
    pub pad: [u8; EI_NIDENT - EI_PAD],
}

impl Ident {
    /// A fresh identification for the given class and byte order, with the
    /// magic number and current version filled in.
    pub fn new(class: Class, data: Data) -> Ident {
        Ident {
            magic: ELFMAG,
            class,
            data,
            version: EV_CURRENT,
            osabi: ELFOSABI_NONE,
            abiversion: 0,
            pad: [0; EI_NIDENT - EI_PAD],
        }
    }

    /// Decodes `e_ident` from the start of `buf`. Only the magic number is
    /// checked here; class and data format are taken as found.
    pub fn decode(buf: &[u8]) -> Result<Ident> {
        if buf.get(..ELFMAG.len()) != Some(&ELFMAG[..]) {
            return Err(Error::BadMagic);
        }

        let raw = endian::read_bytes(buf, 0, EI_NIDENT)?;

        let mut pad = [0; EI_NIDENT - EI_PAD];
        pad.copy_from_slice(&raw[EI_PAD..]);

        Ok(Ident {
            magic: [raw[EI_MAG0], raw[EI_MAG1], raw[EI_MAG2], raw[EI_MAG3]],
            class: Class::from_u8(raw[EI_CLASS]),
            data: Data::from_u8(raw[EI_DATA]),
            version: raw[EI_VERSION],
            osabi: raw[EI_OSABI],
            abiversion: raw[EI_ABIVERSION],
            pad,
        })
    }

    /// Writes the 16 identification bytes to the start of `buf`.
    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        let mut raw = [0u8; EI_NIDENT];

        raw[EI_MAG0..=EI_MAG3].copy_from_slice(&self.magic);
        raw[EI_CLASS] = self.class.to_u8();
        raw[EI_DATA] = self.data.to_u8();
        raw[EI_VERSION] = self.version;
        raw[EI_OSABI] = self.osabi;
        raw[EI_ABIVERSION] = self.abiversion;
        raw[EI_PAD..].copy_from_slice(&self.pad);

        endian::write_bytes(buf, 0, &raw)
    }

    pub fn endian(&self) -> Endian {
        self.data.endian()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> [u8; 16] {
        [0x7f, b'E', b'L', b'F', 2, 1, 1, 3, 0, 1, 2, 3, 4, 5, 6, 7]
    }

    #[test]
    fn test_decode_fields() {
        let ident = Ident::decode(&sample()).unwrap();

        assert_eq!(ident.magic, ELFMAG);
        assert_eq!(ident.class, Class::Elf64);
        assert_eq!(ident.data, Data::LittleEndian);
        assert_eq!(ident.version, EV_CURRENT);
        assert_eq!(ident.osabi, ELFOSABI_LINUX);
        assert_eq!(ident.abiversion, 0);
        assert_eq!(ident.pad, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_padding_written_verbatim() {
        let ident = Ident::decode(&sample()).unwrap();
        let mut out = [0u8; 16];
        ident.encode(&mut out).unwrap();
        assert_eq!(out, sample());
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = sample();
        buf[1] = b'e';
        assert_eq!(Ident::decode(&buf), Err(Error::BadMagic));
        assert_eq!(Ident::decode(&[0x7f, b'E']), Err(Error::BadMagic));
        assert_eq!(Ident::decode(&[]), Err(Error::BadMagic));
    }

    #[test]
    fn test_class_is_not_checked_by_decode() {
        let mut buf = sample();
        buf[EI_CLASS] = 99;
        let ident = Ident::decode(&buf).unwrap();
        assert_eq!(ident.class, Class::Unknown(99));
        assert_eq!(ident.class.check(), Err(Error::BadClass(99)));
        assert_eq!(Class::None.check(), Err(Error::BadClass(0)));
        assert_eq!(Class::Elf32.check(), Ok(Class::Elf32));
    }

    #[test]
    fn test_short_identification_is_truncated() {
        assert!(matches!(
            Ident::decode(&sample()[..10]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_only_lsb_is_little_endian() {
        assert_eq!(Data::LittleEndian.endian(), Endian::Little);
        assert_eq!(Data::BigEndian.endian(), Endian::Big);
        assert_eq!(Data::None.endian(), Endian::Big);
        assert_eq!(Data::from_u8(7), Data::Unknown(7));
        assert_eq!(Data::Unknown(7).to_u8(), 7);
    }
}
