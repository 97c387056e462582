// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! The ELF file header, `Elf32_Ehdr`/`Elf64_Ehdr`. Offsets, addresses and the
//! entry point are held as `u64` whatever the class; a class-32 file has them
//! zero-extended on decode and narrowed again on encode.

use log::debug;

use crate::endian::{Endian, Narrowing};
use crate::error::Result;
use crate::format::*;
use crate::ident::{Class, Ident};

/// File header. Some object file control structures can grow, because the
/// header records their actual sizes; the table strides below are honored
/// exactly as declared when reading and writing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub ident: Ident,

    /// Object file type, one of the `ET_*` values.
    pub typ: u16,

    /// Target architecture, one of the `EM_*` values.
    pub machine: u16,

    pub version: u32,

    /// Virtual address to which the system first transfers control. Zero if
    /// the file has no entry point.
    pub entry: u64,

    /// File offset of the program header table, or zero.
    pub phoff: u64,

    /// File offset of the section header table, or zero.
    pub shoff: u64,

    /// Processor-specific flags, `EF_machine_flag`.
    pub flags: u32,

    pub ehsize: u16,

    /// Size of one program header table entry. All entries are the same size.
    pub phentsize: u16,

    /// Number of program header table entries.
    pub phnum: u16,

    /// Size of one section header table entry. All entries are the same size.
    pub shentsize: u16,

    /// Number of section header table entries.
    pub shnum: u16,

    /// Section header index of the section name string table, or `SHN_UNDEF`.
    pub shstrndx: u16,
}

/// Different types an ELF file can be.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileType {
    /// The file has no type
    NoType,
    /// A relocatable file
    Relocatable,
    /// An executable file
    Executable,
    /// A shared object file
    SharedObject,
    /// A core dump
    Core,
    /// Unknown file type; value copied literally
    Unknown(u16),
}

/// The architecture for a file. Only the common ones get a name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Machine {
    NoMachine,
    Sparc,
    I386,
    M68000,
    Mips,
    PowerPC,
    PowerPC64,
    S390,
    Arm,
    SuperH,
    Ia64,
    X86_64,
    AArch64,
    /// Unknown machine type; value copied literally
    Unknown(u16),
}

impl FileHeader {
    /// A header for an empty file of the identification's class: no tables,
    /// and the class's natural structure sizes.
    pub fn new(ident: Ident) -> FileHeader {
        let class = ident.class;
        FileHeader {
            ident,
            typ: ET_NONE,
            machine: EM_NONE,
            version: EV_CURRENT as u32,
            entry: 0,
            phoff: 0,
            shoff: 0,
            flags: 0,
            ehsize: class.ehdr_size(),
            phentsize: class.phdr_size(),
            phnum: 0,
            shentsize: class.shdr_size(),
            shnum: 0,
            shstrndx: SHN_UNDEF,
        }
    }

    /// Decodes the header fields following an already decoded
    /// identification. The class must be 32 or 64 bit.
    pub fn decode(buf: &[u8], ident: Ident) -> Result<FileHeader> {
        let class = ident.class.check()?;
        let e = ident.endian();

        let h = match class {
            Class::Elf64 => decode64(buf, e, ident)?,
            _ => decode32(buf, e, ident)?,
        };

        debug!(
            "{:?} {:?} header: phoff={:#x} phnum={} shoff={:#x} shnum={}",
            class, e, h.phoff, h.phnum, h.shoff, h.shnum
        );

        Ok(h)
    }

    /// Writes identification and header to the start of `buf`.
    pub fn encode(&self, buf: &mut [u8], narrowing: Narrowing) -> Result<()> {
        let class = self.ident.class.check()?;
        let e = self.ident.endian();

        self.ident.encode(buf)?;

        match class {
            Class::Elf64 => encode64(self, buf, e),
            _ => encode32(self, buf, e, narrowing),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self.typ {
            ET_NONE => FileType::NoType,
            ET_REL => FileType::Relocatable,
            ET_EXEC => FileType::Executable,
            ET_DYN => FileType::SharedObject,
            ET_CORE => FileType::Core,
            x => FileType::Unknown(x),
        }
    }

    pub fn machine(&self) -> Machine {
        match self.machine {
            EM_NONE => Machine::NoMachine,
            EM_SPARC => Machine::Sparc,
            EM_386 => Machine::I386,
            EM_68K => Machine::M68000,
            EM_MIPS => Machine::Mips,
            EM_PPC => Machine::PowerPC,
            EM_PPC64 => Machine::PowerPC64,
            EM_S390 => Machine::S390,
            EM_ARM => Machine::Arm,
            EM_SH => Machine::SuperH,
            EM_IA_64 => Machine::Ia64,
            EM_X86_64 => Machine::X86_64,
            EM_AARCH64 => Machine::AArch64,
            x => Machine::Unknown(x),
        }
    }
}

// Both classes share type/machine/version at 16/18/20. After that the 32-bit
// layout has 4 byte addresses from 24 and the rest from 36, while the 64-bit
// layout has 8 byte addresses from 24 and the rest from 48.

fn decode32(buf: &[u8], e: Endian, ident: Ident) -> Result<FileHeader> {
    Ok(FileHeader {
        ident,
        typ: e.read_u16(buf, 16)?,
        machine: e.read_u16(buf, 18)?,
        version: e.read_u32(buf, 20)?,
        entry: e.read_u32(buf, 24)? as u64,
        phoff: e.read_u32(buf, 28)? as u64,
        shoff: e.read_u32(buf, 32)? as u64,
        flags: e.read_u32(buf, 36)?,
        ehsize: e.read_u16(buf, 40)?,
        phentsize: e.read_u16(buf, 42)?,
        phnum: e.read_u16(buf, 44)?,
        shentsize: e.read_u16(buf, 46)?,
        shnum: e.read_u16(buf, 48)?,
        shstrndx: e.read_u16(buf, 50)?,
    })
}

fn decode64(buf: &[u8], e: Endian, ident: Ident) -> Result<FileHeader> {
    Ok(FileHeader {
        ident,
        typ: e.read_u16(buf, 16)?,
        machine: e.read_u16(buf, 18)?,
        version: e.read_u32(buf, 20)?,
        entry: e.read_u64(buf, 24)?,
        phoff: e.read_u64(buf, 32)?,
        shoff: e.read_u64(buf, 40)?,
        flags: e.read_u32(buf, 48)?,
        ehsize: e.read_u16(buf, 52)?,
        phentsize: e.read_u16(buf, 54)?,
        phnum: e.read_u16(buf, 56)?,
        shentsize: e.read_u16(buf, 58)?,
        shnum: e.read_u16(buf, 60)?,
        shstrndx: e.read_u16(buf, 62)?,
    })
}

fn encode32(h: &FileHeader, buf: &mut [u8], e: Endian, n: Narrowing) -> Result<()> {
    e.write_u16(buf, 16, h.typ)?;
    e.write_u16(buf, 18, h.machine)?;
    e.write_u32(buf, 20, h.version)?;
    e.write_u32(buf, 24, n.narrow("e_entry", h.entry)?)?;
    e.write_u32(buf, 28, n.narrow("e_phoff", h.phoff)?)?;
    e.write_u32(buf, 32, n.narrow("e_shoff", h.shoff)?)?;
    e.write_u32(buf, 36, h.flags)?;
    e.write_u16(buf, 40, h.ehsize)?;
    e.write_u16(buf, 42, h.phentsize)?;
    e.write_u16(buf, 44, h.phnum)?;
    e.write_u16(buf, 46, h.shentsize)?;
    e.write_u16(buf, 48, h.shnum)?;
    e.write_u16(buf, 50, h.shstrndx)?;
    Ok(())
}

fn encode64(h: &FileHeader, buf: &mut [u8], e: Endian) -> Result<()> {
    e.write_u16(buf, 16, h.typ)?;
    e.write_u16(buf, 18, h.machine)?;
    e.write_u32(buf, 20, h.version)?;
    e.write_u64(buf, 24, h.entry)?;
    e.write_u64(buf, 32, h.phoff)?;
    e.write_u64(buf, 40, h.shoff)?;
    e.write_u32(buf, 48, h.flags)?;
    e.write_u16(buf, 52, h.ehsize)?;
    e.write_u16(buf, 54, h.phentsize)?;
    e.write_u16(buf, 56, h.phnum)?;
    e.write_u16(buf, 58, h.shentsize)?;
    e.write_u16(buf, 60, h.shnum)?;
    e.write_u16(buf, 62, h.shstrndx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ident::Data;

    fn header(class: Class, data: Data) -> FileHeader {
        let mut h = FileHeader::new(Ident::new(class, data));
        h.typ = ET_EXEC;
        h.machine = EM_386;
        h.entry = 0x0804_8000;
        h.phoff = 0x34;
        h.shoff = 0x400;
        h.flags = 0x1234_5678;
        h.phnum = 2;
        h.shnum = 4;
        h.shstrndx = 3;
        h
    }

    #[test]
    fn test_class32_offsets() {
        let h = header(Class::Elf32, Data::LittleEndian);
        let mut buf = vec![0u8; 52];
        h.encode(&mut buf, Narrowing::Truncate).unwrap();

        assert_eq!(&buf[..4], b"\x7fELF");
        assert_eq!(&buf[24..28], &[0x00, 0x80, 0x04, 0x08]);
        assert_eq!(&buf[28..32], &[0x34, 0, 0, 0]);
        assert_eq!(&buf[36..40], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(&buf[40..42], &[52, 0]);
        assert_eq!(&buf[50..52], &[3, 0]);

        let ident = Ident::decode(&buf).unwrap();
        assert_eq!(FileHeader::decode(&buf, ident).unwrap(), h);
    }

    #[test]
    fn test_class64_offsets_big_endian() {
        let mut h = header(Class::Elf64, Data::BigEndian);
        h.entry = 0x1_0000_0000_0040;
        let mut buf = vec![0u8; 64];
        h.encode(&mut buf, Narrowing::Truncate).unwrap();

        assert_eq!(&buf[24..32], &[0, 1, 0, 0, 0, 0, 0, 0x40]);
        assert_eq!(&buf[40..48], &[0, 0, 0, 0, 0, 0, 0x04, 0]);
        assert_eq!(&buf[48..52], &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(&buf[52..54], &[0, 64]);
        assert_eq!(&buf[62..64], &[0, 3]);

        let ident = Ident::decode(&buf).unwrap();
        assert_eq!(FileHeader::decode(&buf, ident).unwrap(), h);
    }

    #[test]
    fn test_class32_narrowing() {
        let mut h = header(Class::Elf32, Data::LittleEndian);
        h.entry = 0x1_2345_6789;
        let mut buf = vec![0u8; 52];

        h.encode(&mut buf, Narrowing::Truncate).unwrap();
        let ident = Ident::decode(&buf).unwrap();
        assert_eq!(FileHeader::decode(&buf, ident).unwrap().entry, 0x2345_6789);

        assert_eq!(
            h.encode(&mut buf, Narrowing::Reject),
            Err(Error::Narrowing { field: "e_entry", value: 0x1_2345_6789 })
        );
    }

    #[test]
    fn test_bad_class_before_any_field() {
        let mut ident = Ident::new(Class::None, Data::LittleEndian);
        assert_eq!(
            FileHeader::decode(&[0u8; 64], ident.clone()),
            Err(Error::BadClass(0))
        );
        ident.class = Class::Unknown(99);
        let h = FileHeader::new(ident);
        assert_eq!(
            h.encode(&mut [0u8; 64], Narrowing::Truncate),
            Err(Error::BadClass(99))
        );
    }

    #[test]
    fn test_typed_views() {
        let mut h = header(Class::Elf64, Data::LittleEndian);
        assert_eq!(h.file_type(), FileType::Executable);
        assert_eq!(h.machine(), Machine::I386);
        h.typ = ET_LOOS;
        h.machine = 0x7777;
        assert_eq!(h.file_type(), FileType::Unknown(ET_LOOS));
        assert_eq!(h.machine(), Machine::Unknown(0x7777));
    }
}
