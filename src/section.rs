// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Section header table entries, `Elf32_Shdr`/`Elf64_Shdr`, and the section
//! contents they describe.
//!
//! Unlike program headers, section headers keep the same field order in both
//! classes. `sh_flags`, `sh_addr`, `sh_offset`, `sh_size`, `sh_addralign` and
//! `sh_entsize` are word sized, while `sh_name`, `sh_type`, `sh_link` and
//! `sh_info` are 32 bits everywhere.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::endian::{self, Endian, Narrowing};
use crate::error::{Error, Result};
use crate::format::*;
use crate::header::FileHeader;
use crate::ident::Class;
use crate::segment::entry_offset;

/// Section contents by section header index. Only sections that actually
/// occupy bytes in the file have an entry, so the keys are usually sparse.
pub type SectionData = BTreeMap<usize, Vec<u8>>;

/// Section header. There's one for every section in the file; index 0 is
/// reserved and normally all zeros.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionHeader {
    /// Offset of the section's name in the section name string table.
    pub name: u32,

    /// The section's contents and semantics, one of the `SHT_*` values.
    pub typ: u32,

    pub flags: SectionFlags,

    /// Address of the section's first byte in the memory image, or 0.
    pub addr: u64,

    /// File offset of the section's first byte. For `SHT_NOBITS` this is
    /// only a conceptual placement.
    pub offset: u64,

    /// Size in bytes. A `SHT_NOBITS` section may have a non-zero size but
    /// occupies no space in the file.
    pub size: u64,

    /// A section header index whose meaning depends on `typ`.
    pub link: u32,

    /// Extra information whose meaning depends on `typ`.
    pub info: u32,

    /// Alignment constraint on `addr`. Values 0 and 1 mean none; otherwise
    /// a power of two.
    pub addralign: u64,

    /// Size of each entry for sections holding a table of fixed-size
    /// entries, otherwise 0.
    pub entsize: u64,
}

impl SectionHeader {
    /// Whether the section has bytes in the file at all.
    pub fn has_file_data(&self) -> bool {
        self.typ != SHT_NOBITS
    }

    /// `offset..offset + size`, or `None` if that overflows.
    pub fn file_range(&self) -> Option<std::ops::Range<u64>> {
        Some(self.offset..self.offset.checked_add(self.size)?)
    }

    pub fn decode32(buf: &[u8], at: usize, e: Endian) -> Result<SectionHeader> {
        Ok(SectionHeader {
            name: e.read_u32(buf, at)?,
            typ: e.read_u32(buf, at + 4)?,
            flags: SectionFlags::from_bits_retain(e.read_u32(buf, at + 8)? as u64),
            addr: e.read_u32(buf, at + 12)? as u64,
            offset: e.read_u32(buf, at + 16)? as u64,
            size: e.read_u32(buf, at + 20)? as u64,
            link: e.read_u32(buf, at + 24)?,
            info: e.read_u32(buf, at + 28)?,
            addralign: e.read_u32(buf, at + 32)? as u64,
            entsize: e.read_u32(buf, at + 36)? as u64,
        })
    }

    pub fn decode64(buf: &[u8], at: usize, e: Endian) -> Result<SectionHeader> {
        Ok(SectionHeader {
            name: e.read_u32(buf, at)?,
            typ: e.read_u32(buf, at + 4)?,
            flags: SectionFlags::from_bits_retain(e.read_u64(buf, at + 8)?),
            addr: e.read_u64(buf, at + 16)?,
            offset: e.read_u64(buf, at + 24)?,
            size: e.read_u64(buf, at + 32)?,
            link: e.read_u32(buf, at + 40)?,
            info: e.read_u32(buf, at + 44)?,
            addralign: e.read_u64(buf, at + 48)?,
            entsize: e.read_u64(buf, at + 56)?,
        })
    }

    pub fn encode32(&self, buf: &mut [u8], at: usize, e: Endian, n: Narrowing) -> Result<()> {
        e.write_u32(buf, at, self.name)?;
        e.write_u32(buf, at + 4, self.typ)?;
        e.write_u32(buf, at + 8, n.narrow("sh_flags", self.flags.bits())?)?;
        e.write_u32(buf, at + 12, n.narrow("sh_addr", self.addr)?)?;
        e.write_u32(buf, at + 16, n.narrow("sh_offset", self.offset)?)?;
        e.write_u32(buf, at + 20, n.narrow("sh_size", self.size)?)?;
        e.write_u32(buf, at + 24, self.link)?;
        e.write_u32(buf, at + 28, self.info)?;
        e.write_u32(buf, at + 32, n.narrow("sh_addralign", self.addralign)?)?;
        e.write_u32(buf, at + 36, n.narrow("sh_entsize", self.entsize)?)?;
        Ok(())
    }

    pub fn encode64(&self, buf: &mut [u8], at: usize, e: Endian) -> Result<()> {
        e.write_u32(buf, at, self.name)?;
        e.write_u32(buf, at + 4, self.typ)?;
        e.write_u64(buf, at + 8, self.flags.bits())?;
        e.write_u64(buf, at + 16, self.addr)?;
        e.write_u64(buf, at + 24, self.offset)?;
        e.write_u64(buf, at + 32, self.size)?;
        e.write_u32(buf, at + 40, self.link)?;
        e.write_u32(buf, at + 44, self.info)?;
        e.write_u64(buf, at + 48, self.addralign)?;
        e.write_u64(buf, at + 56, self.entsize)?;
        Ok(())
    }
}

/// Reads `h.shnum` entries starting at `h.shoff`, `h.shentsize` bytes apart.
pub fn decode_table(buf: &[u8], h: &FileHeader) -> Result<Vec<SectionHeader>> {
    let class = h.ident.class.check()?;
    let e = h.ident.endian();

    debug!(
        "reading {} section headers at {:#x}, stride {}",
        h.shnum, h.shoff, h.shentsize
    );

    (0..h.shnum as usize)
        .map(|i| {
            let at = entry_offset(h.shoff, h.shentsize, i);
            match class {
                Class::Elf64 => SectionHeader::decode64(buf, at, e),
                _ => SectionHeader::decode32(buf, at, e),
            }
        })
        .collect()
}

/// Writes every entry of `shdrs` at `h.shoff`, `h.shentsize` bytes apart.
pub fn encode_table(
    buf: &mut [u8],
    h: &FileHeader,
    shdrs: &[SectionHeader],
    n: Narrowing,
) -> Result<()> {
    let class = h.ident.class.check()?;
    let e = h.ident.endian();

    debug!(
        "writing {} section headers at {:#x}, stride {}",
        shdrs.len(),
        h.shoff,
        h.shentsize
    );

    for (i, sh) in shdrs.iter().enumerate() {
        let at = entry_offset(h.shoff, h.shentsize, i);
        match class {
            Class::Elf64 => sh.encode64(buf, at, e)?,
            _ => sh.encode32(buf, at, e, n)?,
        }
    }

    Ok(())
}

/// Copies out the contents of every section that has some. `SHT_NOBITS`
/// and empty sections are skipped, and so is any section whose bytes would
/// run past the end of `buf`.
pub fn extract(buf: &[u8], shdrs: &[SectionHeader]) -> SectionData {
    let mut data = SectionData::new();

    for (i, sh) in shdrs.iter().enumerate() {
        if !sh.has_file_data() || sh.size == 0 {
            continue;
        }

        let bytes = sh
            .file_range()
            .filter(|r| r.end <= buf.len() as u64)
            .map(|r| &buf[r.start as usize..r.end as usize]);

        match bytes {
            Some(b) => {
                trace!("section {}: {} bytes at {:#x}", i, b.len(), sh.offset);
                data.insert(i, b.to_vec());
            }
            None => debug!(
                "section {}: {} bytes at {:#x} lie outside the input, dropped",
                i, sh.size, sh.offset
            ),
        }
    }

    data
}

/// Copies each entry of `data` to the file offset of its section header.
pub fn place(buf: &mut [u8], shdrs: &[SectionHeader], data: &SectionData) -> Result<()> {
    for (&i, bytes) in data {
        let sh = shdrs.get(i).ok_or(Error::MissingSectionHeader(i))?;
        trace!("section {}: {} bytes at {:#x}", i, bytes.len(), sh.offset);
        endian::write_bytes(buf, endian::offset(sh.offset), bytes)?;
    }
    Ok(())
}

/// Looks up the null-terminated string at `offset` in a string table. The
/// string ends at the first null byte or at the end of the table. Offsets
/// past the end give the empty string.
pub fn name_in(strtab: &[u8], offset: u32) -> String {
    let start = endian::offset(offset as u64);
    let tail = match strtab.get(start..) {
        Some(t) => t,
        None => {
            debug!("name offset {:#x} past a {} byte string table", offset, strtab.len());
            return String::new();
        }
    };
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8_lossy(&tail[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRTAB: &[u8] = b"\0.text\0.data\0.shstr\0";

    fn text() -> SectionHeader {
        SectionHeader {
            name: 1,
            typ: SHT_PROGBITS,
            flags: SectionFlags::SHF_ALLOC | SectionFlags::SHF_EXECINSTR,
            addr: 0x40_0000,
            offset: 0x100,
            size: 0x40,
            addralign: 16,
            ..SectionHeader::default()
        }
    }

    #[test]
    fn test_class_layouts() {
        let mut sh = text();
        sh.link = 0xaabb_ccdd;
        sh.info = 7;
        sh.entsize = 24;

        let mut b32 = [0u8; 40];
        sh.encode32(&mut b32, 0, Endian::Little, Narrowing::Truncate).unwrap();
        assert_eq!(&b32[8..12], &[6, 0, 0, 0]);
        assert_eq!(&b32[16..20], &[0x00, 0x01, 0, 0]);
        assert_eq!(&b32[24..28], &[0xdd, 0xcc, 0xbb, 0xaa]);
        assert_eq!(&b32[36..40], &[24, 0, 0, 0]);

        let mut b64 = [0u8; 64];
        sh.encode64(&mut b64, 0, Endian::Big).unwrap();
        assert_eq!(&b64[8..16], &[0, 0, 0, 0, 0, 0, 0, 6]);
        assert_eq!(&b64[24..32], &[0, 0, 0, 0, 0, 0, 0x01, 0x00]);
        assert_eq!(&b64[40..44], &[0xaa, 0xbb, 0xcc, 0xdd]);
        assert_eq!(&b64[44..48], &[0, 0, 0, 7]);
        assert_eq!(&b64[56..64], &[0, 0, 0, 0, 0, 0, 0, 24]);

        assert_eq!(SectionHeader::decode32(&b32, 0, Endian::Little).unwrap(), sh);
        assert_eq!(SectionHeader::decode64(&b64, 0, Endian::Big).unwrap(), sh);
    }

    #[test]
    fn test_extract_skips_nobits_and_empty() {
        let buf = vec![0xabu8; 0x200];
        let bss = SectionHeader {
            typ: SHT_NOBITS,
            offset: 0x140,
            size: 0x1000,
            ..SectionHeader::default()
        };
        let empty = SectionHeader { typ: SHT_PROGBITS, offset: 0x140, ..SectionHeader::default() };
        let shdrs = vec![SectionHeader::default(), text(), bss, empty];

        let data = extract(&buf, &shdrs);
        assert_eq!(data.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(data[&1], vec![0xab; 0x40]);
    }

    #[test]
    fn test_extract_drops_out_of_range() {
        let buf = vec![0u8; 0x120];
        let mut overflowing = text();
        overflowing.offset = u64::MAX;
        let shdrs = vec![SectionHeader::default(), text(), overflowing];

        assert!(extract(&buf, &shdrs).is_empty());

        let buf = vec![0u8; 0x140];
        assert_eq!(extract(&buf, &shdrs).len(), 1);
    }

    #[test]
    fn test_place_writes_at_offset() {
        let mut buf = vec![0u8; 0x140];
        let shdrs = vec![SectionHeader::default(), text()];
        let mut data = SectionData::new();
        data.insert(1, vec![0x90; 0x40]);

        place(&mut buf, &shdrs, &data).unwrap();
        assert!(buf[..0x100].iter().all(|&b| b == 0));
        assert!(buf[0x100..].iter().all(|&b| b == 0x90));

        data.insert(5, vec![1]);
        assert_eq!(place(&mut buf, &shdrs, &data), Err(Error::MissingSectionHeader(5)));

        let mut short = vec![0u8; 0x120];
        data.remove(&5);
        assert!(matches!(
            place(&mut short, &shdrs, &data),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(name_in(STRTAB, 0), "");
        assert_eq!(name_in(STRTAB, 1), ".text");
        assert_eq!(name_in(STRTAB, 7), ".data");
        assert_eq!(name_in(STRTAB, 13), ".shstr");
        assert_eq!(name_in(STRTAB, 3), "ext");
        assert_eq!(name_in(b"\0abc", 1), "abc");
        assert_eq!(name_in(STRTAB, 20), "");
        assert_eq!(name_in(STRTAB, 400), "");
    }
}
