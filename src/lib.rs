// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! This crate reads and writes ELF object files, executables and shared
//! libraries, in both the 32-bit and 64-bit classes and in either byte order.
//!
//! # Model
//! A file is read into an `Elf`: the file header (identification included),
//! the program header table, the section header table, and the raw contents
//! of every section that occupies bytes in the file. Offsets, addresses and
//! sizes are held as `u64` regardless of class. Nothing is interpreted beyond
//! that; symbols, relocations and dynamic linking information stay raw bytes
//! in `section_data`.
//!
//! # Round trips
//! `ElfWriter::write` puts every structure back at the offset the model
//! declares, so reading a file and writing the result reproduces its headers
//! and section contents. Bytes not covered by any header or section (for
//! example, segment contents outside all sections) are not kept.
//!
//! ```no_run
//! use elfcodec::{ElfReader, ElfWriter};
//!
//! let bytes = std::fs::read("a.out").unwrap();
//! let elf = ElfReader::new(&bytes).read().unwrap();
//! for i in 0..elf.section_headers.len() {
//!     println!("{}", elf.section_name(i));
//! }
//! let out = ElfWriter::new().write(&elf).unwrap();
//! ```
//!
//! The low level module `format` has the constants from the format manual.

pub mod elf;
pub mod endian;
pub mod error;
pub mod format;
pub mod header;
pub mod ident;
pub mod reader;
pub mod section;
pub mod segment;
pub mod writer;

pub use elf::Elf;
pub use endian::Endian;
pub use error::{Error, Result};
pub use format::{SectionFlags, SegmentFlags};
pub use header::{FileHeader, FileType, Machine};
pub use ident::{Class, Data, Ident};
pub use reader::ElfReader;
pub use section::{SectionData, SectionHeader};
pub use segment::ProgramHeader;
pub use writer::{layout_size, ElfWriter, Narrowing, WriteOptions};
