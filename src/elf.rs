// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! The in-memory model of a whole ELF file. This is what `ElfReader::read`
//! produces and what `ElfWriter::write` consumes.

use crate::format::SHN_UNDEF;
use crate::header::FileHeader;
use crate::section::{self, SectionData, SectionHeader};
use crate::segment::ProgramHeader;

/// Top level structure for an ELF file.
///
/// To be writable, `program_headers` and `section_headers` should have
/// `header.phnum` and `header.shnum` entries respectively, and every key of
/// `section_data` should index a section header that is not `SHT_NOBITS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Elf {
    pub header: FileHeader,
    pub program_headers: Vec<ProgramHeader>,
    pub section_headers: Vec<SectionHeader>,
    pub section_data: SectionData,
}

impl Elf {
    /// A model with the given header and nothing else.
    pub fn new(header: FileHeader) -> Elf {
        Elf {
            header,
            program_headers: Vec::new(),
            section_headers: Vec::new(),
            section_data: SectionData::new(),
        }
    }

    /// The name of section `index`, looked up in the section name string
    /// table (`e_shstrndx`). Never fails: if the section, the string table,
    /// or the string table's contents are missing, the name is empty.
    pub fn section_name(&self, index: usize) -> String {
        let strtab = match self.section_data.get(&(self.header.shstrndx as usize)) {
            Some(t) => t,
            None => return String::new(),
        };

        match self.section_headers.get(index) {
            Some(sh) => section::name_in(strtab, sh.name),
            None => String::new(),
        }
    }

    /// Index of the first section called `name`.
    pub fn section_by_name(&self, name: &str) -> Option<usize> {
        if self.header.shstrndx == SHN_UNDEF {
            return None;
        }
        (0..self.section_headers.len()).find(|&i| self.section_name(i) == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::*;
    use crate::ident::{Class, Data, Ident};

    fn named() -> Elf {
        let mut elf = Elf::new(FileHeader::new(Ident::new(Class::Elf64, Data::BigEndian)));
        let names = [0, 1, 7, 13];
        for &name in &names {
            elf.section_headers.push(SectionHeader { name, ..SectionHeader::default() });
        }
        elf.section_headers[3].typ = SHT_STRTAB;
        elf.header.shnum = 4;
        elf.header.shstrndx = 3;
        elf.section_data.insert(3, b"\0.text\0.data\0.shstr\0".to_vec());
        elf
    }

    #[test]
    fn test_section_names() {
        let elf = named();
        assert_eq!(elf.section_name(0), "");
        assert_eq!(elf.section_name(1), ".text");
        assert_eq!(elf.section_name(2), ".data");
        assert_eq!(elf.section_name(3), ".shstr");
    }

    #[test]
    fn test_missing_string_table_gives_empty_names() {
        let mut elf = named();
        elf.section_data.remove(&3);
        assert_eq!(elf.section_name(1), "");

        let mut elf = named();
        elf.header.shstrndx = 40;
        assert_eq!(elf.section_name(1), "");

        assert_eq!(named().section_name(99), "");
    }

    #[test]
    fn test_section_by_name() {
        let elf = named();
        assert_eq!(elf.section_by_name(".data"), Some(2));
        assert_eq!(elf.section_by_name(".bss"), None);

        let mut elf = named();
        elf.header.shstrndx = SHN_UNDEF;
        assert_eq!(elf.section_by_name(""), None);
    }
}
