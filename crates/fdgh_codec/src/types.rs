//! Base types for structure of FDGH data.

/// The payload magic, `FDGH` as a number. Little-endian files store it as `HGDF`.
pub const FDGH_MAGIC: u32 = u32::from_be_bytes(*b"FDGH");

/// World map value written when a document does not give one
pub const DEFAULT_WORLDMAP_VALUE: u32 = 2;

/// Decoded contents of an FDGH payload
///
/// Rooms and assets are referenced by their position in [`Fdgh::rooms`] and [`Fdgh::assets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fdgh {
    /// Opaque value stored in the payload header
    pub worldmap_value: u32,

    /// Rooms that make up the world map, as room indices
    pub worldmap: Vec<u32>,

    pub rooms: Vec<Room>,

    /// The asset table, in stored order
    pub assets: Vec<String>,
}

/// A room and the data it preloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Room {
    pub name: String,

    /// Linked rooms, as room indices
    pub links: Vec<u32>,

    /// Preloaded assets, as asset table indices
    pub assets: Vec<u32>,
}

impl Fdgh {
    /// Name of the asset at `index`
    pub fn asset_name(&self, index: u32) -> Option<&str> {
        self.assets.get(index as usize).map(String::as_str)
    }

    /// Asset names in the order rooms first reference them.
    ///
    /// This is the asset table an encoder builds when a document does not list it explicitly.
    pub fn referenced_assets(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for index in self.rooms.iter().flat_map(|room| &room.assets) {
            if let Some(name) = self.asset_name(*index) {
                if !seen.contains(&name) {
                    seen.push(name);
                }
            }
        }
        seen
    }
}

/// Strings are stored as Latin-1, so every byte maps to the code point of the same value.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode `text` as Latin-1, returning the first character that has no Latin-1 form.
pub fn string_to_latin1(text: &str) -> Result<Vec<u8>, char> {
    text.chars().map(|c| u8::try_from(c).map_err(|_| c)).collect()
}
