//! This library converts **FDGH** files used by several *Kirby* games to and from XML.
//!
//! # FDGH Format Documentation
//!
//! FDGH files tell the game which rooms make up the world map, how rooms link to each other and
//! which assets to preload for every room. The data is always wrapped in an XBIN container (see
//! [`fdgh_xbin`]), whose byte order applies to every integer below. Every stored offset counts from
//! the start of the file, so it is the payload position plus the XBIN header size.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "FDGH" ("HGDF" when little-endian)                |
//! | 0x0004         | World Map Value        | 4 bytes: Opaque, usually 2                                 |
//! | 0x0008         | World Map Offset       | 4 bytes: Offset of the world map list                      |
//! | 0x000C         | Room Table Offset      | 4 bytes: Offset of the room table                          |
//! | 0x0010         | Asset Table Offset     | 4 bytes: Offset of the asset table                         |
//!
//! ### Lists
//!
//! The world map and every room's links and assets are a `u32` count followed by that many `u32`
//! indices. World map entries and links index the room table, room assets index the asset table.
//!
//! ### Room Table
//!
//! A `u32` count followed by three offsets per room: its name, its link list and its asset list.
//!
//! ### Asset Table
//!
//! A `u32` count followed by one record per asset. A record is the offset of the asset name,
//! optionally followed by a 64-bit FNV-1a hash of the name. Files either hash every record or none.
//!
//! ### Strings
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Length                 | 4 bytes: Number of text bytes                              |
//! | 0x0004         | Text                   | Latin-1 bytes                                              |
//! | ...            | Terminators            | N zero bytes, usually 4                                    |
//! | ...            | Padding                | Zero bytes up to a multiple of 4                           |
//!
//! ## Canonical Layout
//!
//! Files are written section after section: header, world map, room table, then for every room
//! its name, links and assets, then the asset records and finally the asset names.
//!
//! ## Document Form
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <fdgh endian="big" xbin_version="2" num_string_null_terminators="4">
//!   <worldmap value="2">
//!     <room>Cave</room>
//!   </worldmap>
//!   <rooms>
//!     <room name="Cave">
//!       <link>Sea</link>
//!       <asset>chara/kirby</asset>
//!     </room>
//!     <room name="Sea"/>
//!   </rooms>
//! </fdgh>
//! ```
//!
//! Indices become names. When several rooms or assets share a name, a reference to any but the
//! first of them keeps its position as well, e.g. `<link index="3">Sea</link>`. Text made only of
//! whitespace is written as a CDATA section. The root attributes record the format variant so that
//! re-encoding reproduces the original bytes.
//!

mod bytes;
mod codec;
pub mod document;
pub mod error;
pub mod hash;
pub mod read;
pub mod tree;
pub mod types;
pub mod variant;
pub mod write;
mod xml;

pub use bytes::{ByteReader, ByteWriter};
pub use codec::{decode_to_document, document_to_text, encode_from_document, text_to_document};
pub use document::{Document, Element};
pub use types::{Fdgh, Room};
pub use variant::{AssetNameHash, FormatVariant};
