// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Saving an `Elf` model to a byte buffer.
//!
//! The writer does no layout of its own. Every header and section lands at
//! the offset the model declares, and the buffer is just large enough to hold
//! all of them. Gaps between structures are zero filled.

use log::debug;

use crate::elf::Elf;
use crate::error::{Error, Result};
use crate::{section, segment};

pub use crate::endian::Narrowing;

/// Writer settings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub narrowing: Narrowing,
}

#[derive(Clone, Debug, Default)]
pub struct ElfWriter {
    opts: WriteOptions,
}

impl ElfWriter {
    pub fn new() -> ElfWriter {
        ElfWriter::default()
    }

    pub fn with_options(opts: WriteOptions) -> ElfWriter {
        ElfWriter { opts }
    }

    /// The settings this writer was built with.
    pub fn options(&self) -> &WriteOptions {
        &self.opts
    }

    /// Encodes `elf` into a new buffer of exactly `layout_size(elf)` bytes:
    /// identification and file header, program headers, section headers,
    /// then section contents, each at its declared offset.
    ///
    /// Header counts and offsets are trusted as they are. The tables written
    /// are the model's vectors, so they should agree with `phnum`/`shnum`.
    pub fn write(&self, elf: &Elf) -> Result<Vec<u8>> {
        let size = layout_size(elf)?;
        let n = self.opts.narrowing;

        debug!(
            "writing {:?} {:?} file of {} bytes",
            elf.header.ident.class, elf.header.ident.data, size
        );

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(size).map_err(|_| Error::TooLarge(size as u64))?;
        buf.resize(size, 0);

        elf.header.encode(&mut buf, n)?;
        segment::encode_table(&mut buf, &elf.header, &elf.program_headers, n)?;
        section::encode_table(&mut buf, &elf.header, &elf.section_headers, n)?;
        section::place(&mut buf, &elf.section_headers, &elf.section_data)?;

        Ok(buf)
    }
}

/// The smallest buffer holding the file header, both header tables as
/// declared by the header, and the declared extent of every section that
/// has bytes in the file.
pub fn layout_size(elf: &Elf) -> Result<usize> {
    let h = &elf.header;
    let class = h.ident.class.check()?;

    let table_end = |off: u64, num: u16, entsize: u16| {
        off.saturating_add(num as u64 * entsize as u64)
    };

    let sections = elf
        .section_headers
        .iter()
        .filter(|sh| sh.has_file_data())
        .map(|sh| sh.offset.saturating_add(sh.size));

    let end = [
        class.ehdr_size() as u64,
        table_end(h.phoff, h.phnum, h.phentsize),
        table_end(h.shoff, h.shnum, h.shentsize),
    ]
    .into_iter()
    .chain(sections)
    .max()
    .unwrap_or(0);

    usize::try_from(end).map_err(|_| Error::TooLarge(end))
}
