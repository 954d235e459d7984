//! Base types for structure of XBIN file.

use std::{borrow::Cow, fmt, str::FromStr};

use binrw::{BinRead, BinWrite};
use bon::Builder;

use crate::error::{Error, Result};

/// The bytes every XBIN file starts with
pub const MAGIC: &[u8; 4] = b"XBIN";

/// Value of the byte order mark when read in the correct byte order
pub const BYTE_ORDER_MARK: u16 = 0x1234;

/// Metadata word written when none was captured
pub const DEFAULT_METADATA: u32 = 0xFDE9;

/// Byte order of an XBIN container and its payload
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Most significant byte first, as used by *Kirby's Return to Dreamland*
    #[default]
    Big,

    /// Least significant byte first, as used by the 3DS and Switch titles
    Little,
}

impl Endian {
    /// Byte orders in the order they are tried when probing a file
    pub const CANDIDATES: [Endian; 2] = [Endian::Big, Endian::Little];

    /// The name used for this byte order in configuration strings and documents
    pub const fn name(self) -> &'static str {
        match self {
            Endian::Big => "big",
            Endian::Little => "little",
        }
    }
}

impl From<Endian> for binrw::Endian {
    fn from(value: Endian) -> Self {
        match value {
            Endian::Big => binrw::Endian::Big,
            Endian::Little => binrw::Endian::Little,
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endian {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "big" => Ok(Endian::Big),
            "little" => Ok(Endian::Little),
            _ => Err(Error::InvalidEndian(s.to_owned())),
        }
    }
}

/// Supported XBIN header layouts
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum XbinVersion {
    /// 16 byte header, no trailing block
    #[default]
    V2 = 2,

    /// 20 byte header followed by a trailing COLR block
    V4 = 4,
}

impl XbinVersion {
    /// Size of the header, which is also the file offset of the payload
    pub const fn header_size(self) -> u32 {
        match self {
            XbinVersion::V2 => 0x10,
            XbinVersion::V4 => 0x14,
        }
    }
}

impl TryFrom<u8> for XbinVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            2 => Ok(XbinVersion::V2),
            4 => Ok(XbinVersion::V4),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for XbinVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl FromStr for XbinVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u8>()
            .map_err(|_| Error::InvalidConfig(format!("xbin version {s:?} is not a number")))
            .and_then(XbinVersion::try_from)
    }
}

/// XBIN file header
///
/// The byte order is not fixed by the format, so it has to be supplied at runtime through
/// [`BinRead::read_options`] and [`BinWrite::write_options`].
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"XBIN")]
pub struct XbinHeader {
    /// Reads [`BYTE_ORDER_MARK`] when decoded in the correct byte order
    pub byte_order_mark: u16,

    /// Raw header version
    pub version: u8,

    /// Always zero
    pub reserved: u8,

    /// Offset of the end of the payload from the start of the file
    pub file_size: u32,

    /// Opaque metadata word
    pub metadata: u32,

    /// Offset of the trailing block, only present in version 4 headers
    #[br(if(version == 4))]
    pub colr_offset: Option<u32>,
}

/// Everything needed to reproduce a container around a payload
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct XbinInfo {
    /// Byte order of the container and payload
    pub endian: Endian,

    /// Header layout
    #[builder(default)]
    pub version: XbinVersion,

    /// Opaque metadata word
    #[builder(default = DEFAULT_METADATA)]
    pub metadata: u32,

    /// Captured trailing block, `None` when it matches [`trailer_template`]
    pub trailer: Option<Vec<u8>>,
}

impl XbinInfo {
    /// Container info with the default metadata and trailing block
    pub fn new(endian: Endian, version: XbinVersion) -> Self {
        Self::builder().endian(endian).version(version).build()
    }

    /// Offset of the payload in the file
    pub const fn header_size(&self) -> u32 {
        self.version.header_size()
    }

    /// The trailing block to write after the payload
    pub fn trailer(&self) -> Cow<'_, [u8]> {
        match &self.trailer {
            Some(trailer) => Cow::Borrowed(trailer.as_slice()),
            None => Cow::Owned(trailer_template(self.endian, self.version)),
        }
    }
}

/// The trailing block written by the games for a given byte order and version
pub fn trailer_template(endian: Endian, version: XbinVersion) -> Vec<u8> {
    match version {
        XbinVersion::V2 => Vec::new(),
        XbinVersion::V4 => {
            let mut block = match endian {
                Endian::Big => b"COLR".to_vec(),
                Endian::Little => b"RLOC".to_vec(),
            };
            block.extend_from_slice(&[0u8; 8]);
            block
        }
    }
}
