//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Endian;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// the buffer cannot hold an XBIN header
    #[error("file is too short for an xbin header ({size} bytes)")]
    Truncated { size: usize },

    /// the file does not start with "XBIN"
    #[error("incorrect xbin magic {found:02X?}")]
    InvalidMagic { found: Vec<u8> },

    /// the byte order mark does not read 0x1234 in the requested byte order
    #[error("byte order mark does not match {endian} endian")]
    ByteOrderMismatch { endian: Endian },

    /// the byte order mark matches no supported byte order
    #[error("unknown byte order mark {found:02X?}")]
    UnknownByteOrder { found: [u8; 2] },

    /// only versions 2 and 4 are supported
    #[error("unsupported xbin version {0}")]
    UnsupportedVersion(u8),

    /// the byte after the version must be zero
    #[error("reserved xbin byte is {0:#04x} (expected 0)")]
    ReservedByte(u8),

    /// the declared file size does not fit the buffer
    #[error("declared file size {declared:#x} is out of range (header {header:#x}, buffer {actual:#x})")]
    FileSizeOutOfRange {
        declared: u32,
        header: u32,
        actual: usize,
    },

    /// the version 4 COLR offset does not agree with the file size
    #[error("COLR offset {colr_offset:#x} does not match file size {file_size:#x}")]
    ColrOffsetMismatch { colr_offset: u32, file_size: u32 },

    /// the payload does not fit in a 32-bit file size
    #[error("payload of {0} bytes is too large for an xbin container")]
    PayloadTooLarge(usize),

    /// {0}
    #[error("invalid endianness {0:?} (expected \"big\" or \"little\")")]
    InvalidEndian(String),

    /// {0}
    #[error("invalid xbin configuration: {0}")]
    InvalidConfig(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
