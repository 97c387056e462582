// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Loading an `Elf` model from a byte buffer.
//!
//! The identification is decoded first since it fixes the class and byte
//! order of everything after it. Then come the file header, the two header
//! tables at the offsets the header gives, and finally the section contents.

use log::debug;

use crate::elf::Elf;
use crate::error::Result;
use crate::header::FileHeader;
use crate::ident::Ident;
use crate::{section, segment};

/// Reader over an ELF image held in memory. It keeps no state between
/// calls, so one reader may be used from several threads at once.
#[derive(Copy, Clone, Debug)]
pub struct ElfReader<'a> {
    buf: &'a [u8],
}

impl<'a> ElfReader<'a> {
    pub fn new(buf: &'a [u8]) -> ElfReader<'a> {
        ElfReader { buf }
    }

    /// Decodes just the identification. Fails only on a bad magic number or
    /// a buffer shorter than 16 bytes.
    pub fn ident(&self) -> Result<Ident> {
        Ident::decode(self.buf)
    }

    /// Decodes the identification and file header. The class must be 32 or
    /// 64 bit.
    pub fn header(&self) -> Result<FileHeader> {
        FileHeader::decode(self.buf, self.ident()?)
    }

    /// Decodes the whole file.
    ///
    /// Only a bad magic number, a bad class, or a header table entry
    /// extending past the end of the buffer are errors. Counts and offsets
    /// are otherwise taken at face value, and sections whose contents lie
    /// outside the buffer are simply left out of `section_data`.
    pub fn read(&self) -> Result<Elf> {
        let header = self.header()?;
        let program_headers = segment::decode_table(self.buf, &header)?;
        let section_headers = section::decode_table(self.buf, &header)?;
        let section_data = section::extract(self.buf, &section_headers);

        debug!(
            "read {} program headers, {} section headers, {} sections with data",
            program_headers.len(),
            section_headers.len(),
            section_data.len()
        );

        Ok(Elf {
            header,
            program_headers,
            section_headers,
            section_data,
        })
    }

    /// See `Elf::section_name`.
    pub fn section_name(&self, elf: &Elf, index: usize) -> String {
        elf.section_name(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::format::*;
    use crate::ident::{Class, Data};

    #[test]
    fn test_bad_magic_regardless_of_content() {
        let mut buf = vec![0u8; 64];
        assert_eq!(ElfReader::new(&buf).read(), Err(Error::BadMagic));

        buf[..4].copy_from_slice(b"\x7fELG");
        buf[EI_CLASS] = ELFCLASS64;
        buf[EI_DATA] = ELFDATA2LSB;
        assert_eq!(ElfReader::new(&buf).read(), Err(Error::BadMagic));
        assert_eq!(ElfReader::new(&[]).read(), Err(Error::BadMagic));
    }

    #[test]
    fn test_bad_class() {
        let mut buf = vec![0u8; 64];
        buf[..4].copy_from_slice(&ELFMAG);
        buf[EI_CLASS] = 99;
        assert_eq!(ElfReader::new(&buf).read(), Err(Error::BadClass(99)));

        buf[EI_CLASS] = ELFCLASSNONE;
        assert_eq!(ElfReader::new(&buf).read(), Err(Error::BadClass(0)));

        // identification alone does not care about the class
        assert!(ElfReader::new(&buf).ident().is_ok());
    }

    #[test]
    fn test_header_only_file() {
        let mut buf = vec![0u8; 52];
        buf[..4].copy_from_slice(&ELFMAG);
        buf[EI_CLASS] = ELFCLASS32;
        buf[EI_DATA] = ELFDATA2MSB;
        buf[EI_VERSION] = EV_CURRENT;
        buf[17] = ET_REL as u8;

        let elf = ElfReader::new(&buf).read().unwrap();
        assert_eq!(elf.header.ident.class, Class::Elf32);
        assert_eq!(elf.header.ident.data, Data::BigEndian);
        assert_eq!(elf.header.typ, ET_REL);
        assert!(elf.program_headers.is_empty());
        assert!(elf.section_headers.is_empty());
        assert!(elf.section_data.is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let mut buf = vec![0u8; 60];
        buf[..4].copy_from_slice(&ELFMAG);
        buf[EI_CLASS] = ELFCLASS64;
        assert!(matches!(
            ElfReader::new(&buf).read(),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_table_past_end_is_truncated() {
        let mut buf = vec![0u8; 64];
        buf[..4].copy_from_slice(&ELFMAG);
        buf[EI_CLASS] = ELFCLASS64;
        buf[EI_DATA] = ELFDATA2LSB;
        buf[32] = 64; // e_phoff
        buf[54] = 56; // e_phentsize
        buf[56] = 1; // e_phnum
        assert!(matches!(
            ElfReader::new(&buf).read(),
            Err(Error::Truncated { offset: 64, .. })
        ));
    }
}
