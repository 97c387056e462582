// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Errors produced while reading or writing ELF files.

use thiserror::Error;

/// Everything that can stop a read or a write. Most oddities in an input file
/// are tolerated silently; only the cases below are hard failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The first four bytes are not `\x7fELF`.
    #[error("invalid ELF magic number")]
    BadMagic,

    /// `EI_CLASS` is neither `ELFCLASS32` nor `ELFCLASS64`. The raw byte is
    /// carried along.
    #[error("invalid ELF class {0}")]
    BadClass(u8),

    /// A fixed-size structure (identification, file header, or a table entry)
    /// extends past the end of the input.
    #[error("{len} bytes at offset {offset:#x} lie outside a {size} byte input")]
    Truncated { offset: u64, len: usize, size: usize },

    /// A 64-bit model value does not fit the 32-bit field it is written to.
    /// Only reported when the writer rejects narrowing.
    #[error("{field} value {value:#x} does not fit in 32 bits")]
    Narrowing { field: &'static str, value: u64 },

    /// Section data was supplied for an index with no section header.
    #[error("section data for index {0} has no section header")]
    MissingSectionHeader(usize),

    /// The model asks for bytes to be placed past the end of the output.
    #[error("{len} bytes at offset {offset:#x} lie outside a {size} byte output")]
    OutOfRange { offset: u64, len: usize, size: usize },

    /// The model lays out more bytes than can be allocated, usually because a
    /// section header declares an offset far past anything real.
    #[error("output of {0:#x} bytes is too large to allocate")]
    TooLarge(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
