// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Program header table entries, `Elf32_Phdr`/`Elf64_Phdr`.
//!
//! The two classes do not just differ in width: `p_flags` sits after
//! `p_memsz` in the 32-bit layout but right after `p_type` in the 64-bit one,
//! where it keeps the 8 byte fields aligned. Each class therefore gets its
//! own fully spelled out decoder and encoder.

use log::debug;

use crate::endian::{self, Endian, Narrowing};
use crate::error::Result;
use crate::format::*;
use crate::header::FileHeader;
use crate::ident::Class;

/// One program header table entry, describing a segment or other
/// information the system needs to prepare the program for execution. It
/// owns no bytes; the segment's contents are wherever `offset` points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramHeader {
    /// What kind of segment this is, one of the `PT_*` values.
    pub typ: u32,
    pub flags: SegmentFlags,
    /// Offset from the beginning of the file of the segment's first byte.
    pub offset: u64,
    /// Virtual address of the segment's first byte in memory.
    pub vaddr: u64,
    /// Physical address, on systems where that is relevant.
    pub paddr: u64,
    /// Number of bytes in the file image of the segment; may be zero.
    pub filesz: u64,
    /// Number of bytes in the memory image of the segment; may be zero.
    pub memsz: u64,
    /// Values 0 and 1 mean no alignment is required. Otherwise a power of
    /// two, and `vaddr` should equal `offset` modulo `align`.
    pub align: u64,
}

impl ProgramHeader {
    pub fn decode32(buf: &[u8], at: usize, e: Endian) -> Result<ProgramHeader> {
        Ok(ProgramHeader {
            typ: e.read_u32(buf, at)?,
            offset: e.read_u32(buf, at + 4)? as u64,
            vaddr: e.read_u32(buf, at + 8)? as u64,
            paddr: e.read_u32(buf, at + 12)? as u64,
            filesz: e.read_u32(buf, at + 16)? as u64,
            memsz: e.read_u32(buf, at + 20)? as u64,
            flags: SegmentFlags::from_bits_retain(e.read_u32(buf, at + 24)?),
            align: e.read_u32(buf, at + 28)? as u64,
        })
    }

    pub fn decode64(buf: &[u8], at: usize, e: Endian) -> Result<ProgramHeader> {
        Ok(ProgramHeader {
            typ: e.read_u32(buf, at)?,
            flags: SegmentFlags::from_bits_retain(e.read_u32(buf, at + 4)?),
            offset: e.read_u64(buf, at + 8)?,
            vaddr: e.read_u64(buf, at + 16)?,
            paddr: e.read_u64(buf, at + 24)?,
            filesz: e.read_u64(buf, at + 32)?,
            memsz: e.read_u64(buf, at + 40)?,
            align: e.read_u64(buf, at + 48)?,
        })
    }

    pub fn encode32(&self, buf: &mut [u8], at: usize, e: Endian, n: Narrowing) -> Result<()> {
        e.write_u32(buf, at, self.typ)?;
        e.write_u32(buf, at + 4, n.narrow("p_offset", self.offset)?)?;
        e.write_u32(buf, at + 8, n.narrow("p_vaddr", self.vaddr)?)?;
        e.write_u32(buf, at + 12, n.narrow("p_paddr", self.paddr)?)?;
        e.write_u32(buf, at + 16, n.narrow("p_filesz", self.filesz)?)?;
        e.write_u32(buf, at + 20, n.narrow("p_memsz", self.memsz)?)?;
        e.write_u32(buf, at + 24, self.flags.bits())?;
        e.write_u32(buf, at + 28, n.narrow("p_align", self.align)?)?;
        Ok(())
    }

    pub fn encode64(&self, buf: &mut [u8], at: usize, e: Endian) -> Result<()> {
        e.write_u32(buf, at, self.typ)?;
        e.write_u32(buf, at + 4, self.flags.bits())?;
        e.write_u64(buf, at + 8, self.offset)?;
        e.write_u64(buf, at + 16, self.vaddr)?;
        e.write_u64(buf, at + 24, self.paddr)?;
        e.write_u64(buf, at + 32, self.filesz)?;
        e.write_u64(buf, at + 40, self.memsz)?;
        e.write_u64(buf, at + 48, self.align)?;
        Ok(())
    }
}

/// Offset of entry `i` of a table at `base` with the given stride.
pub(crate) fn entry_offset(base: u64, stride: u16, i: usize) -> usize {
    (stride as u64)
        .checked_mul(i as u64)
        .and_then(|rel| base.checked_add(rel))
        .map_or(usize::MAX, endian::offset)
}

/// Reads `h.phnum` entries starting at `h.phoff`, `h.phentsize` bytes apart.
pub fn decode_table(buf: &[u8], h: &FileHeader) -> Result<Vec<ProgramHeader>> {
    let class = h.ident.class.check()?;
    let e = h.ident.endian();

    debug!(
        "reading {} program headers at {:#x}, stride {}",
        h.phnum, h.phoff, h.phentsize
    );

    (0..h.phnum as usize)
        .map(|i| {
            let at = entry_offset(h.phoff, h.phentsize, i);
            match class {
                Class::Elf64 => ProgramHeader::decode64(buf, at, e),
                _ => ProgramHeader::decode32(buf, at, e),
            }
        })
        .collect()
}

/// Writes every entry of `phdrs` at `h.phoff`, `h.phentsize` bytes apart.
pub fn encode_table(
    buf: &mut [u8],
    h: &FileHeader,
    phdrs: &[ProgramHeader],
    n: Narrowing,
) -> Result<()> {
    let class = h.ident.class.check()?;
    let e = h.ident.endian();

    debug!(
        "writing {} program headers at {:#x}, stride {}",
        phdrs.len(),
        h.phoff,
        h.phentsize
    );

    for (i, ph) in phdrs.iter().enumerate() {
        let at = entry_offset(h.phoff, h.phentsize, i);
        match class {
            Class::Elf64 => ph.encode64(buf, at, e)?,
            _ => ph.encode32(buf, at, e, n)?,
        }
    }

    Ok(())
}
