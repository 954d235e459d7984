//! This library handles reading from and creating **XBIN** containers used by several *Kirby* games.
//!
//! # XBIN Container Format Documentation
//!
//! XBIN is a very thin wrapper placed around other binary formats (most notably the **FDGH** asset
//! preload table). It only records the byte order, a format version, the total size and an opaque
//! metadata word. *Kirby's Return to Dreamland* uses big-endian version 2 containers, the 3DS and
//! Switch titles use little-endian containers, and *Kirby Battle Royale* onwards use version 4.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "XBIN"                                            |
//! | 0x0004         | Byte order mark        | 2 bytes: 0x1234 in the byte order of the file              |
//! | 0x0006         | Version                | 1 byte: 2 or 4                                             |
//! | 0x0007         | Reserved               | 1 byte: always 0                                           |
//! | 0x0008         | File Size              | 4 bytes: Header plus payload size                          |
//! | 0x000C         | Metadata               | 4 bytes: Opaque value, usually 0xFDE9                      |
//! | 0x0010         | COLR Offset            | 4 bytes: Version 4 only, equal to the file size            |
//!
//! ### Header
//!
//! - **Magic Number**: The ASCII bytes "XBIN". These do not depend on the byte order.
//! - **Byte Order Mark**: `12 34` for big-endian files and `34 12` for little-endian files. Every
//!   other multi-byte integer of the container and of the payload uses the same byte order.
//! - **Version**: `2` gives a 16 byte header, `4` gives a 20 byte header.
//! - **File Size**: The offset of the end of the payload from the beginning of the file.
//! - **Metadata**: A value with unknown meaning. `0xFDE9` and `0x3A4` have been observed. It is
//!   carried through unchanged.
//! - **COLR Offset**: Only present in version 4 headers. Points at the trailing block.
//!
//! ### Payload
//!
//! The payload immediately follows the header and ends at **File Size**.
//!
//! ### Trailing Block
//!
//! Version 4 containers end with a 12 byte block: `COLR` (`RLOC` when little-endian) followed by
//! eight zero bytes. Version 2 containers have no trailing block. Whatever follows the payload is
//! captured as-is by [`read::unwrap`] and replayed by [`write::wrap`], so containers that deviate
//! from the template still round-trip.
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.bin`, `.dat`
//! - **Endianness**: Selected per file by the byte order mark
//!

pub mod config;
pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use config::XbinConfig;
pub use read::{probe, unwrap};
pub use types::{Endian, XbinHeader, XbinInfo, XbinVersion};
pub use write::wrap;
