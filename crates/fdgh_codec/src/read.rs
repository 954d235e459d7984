//! Functions for reading FDGH payloads
//!

use fdgh_xbin::Endian;
use tracing::{debug, instrument, trace, warn};

use crate::{
    bytes::ByteReader,
    error::{Error, Result},
    hash::fnv1a64,
    types::{latin1_to_string, Fdgh, Room, FDGH_MAGIC},
    variant::{AssetNameHash, DEFAULT_TERMINATORS},
};

/// Layout details of a payload that are not part of its contents
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PayloadLayout {
    pub num_string_null_terminators: u32,
    pub asset_name_hashes: Option<AssetNameHash>,
}

/// Whether `payload` starts with the FDGH magic in the given byte order
pub fn has_magic(payload: &[u8], endian: Endian) -> bool {
    ByteReader::new(payload, endian)
        .read_u32()
        .is_ok_and(|magic| magic == FDGH_MAGIC)
}

/// Decode an FDGH payload.
///
/// `base` is the file offset of the payload; every offset stored in the payload is relative to the
/// start of the file. The string terminator count and the asset record layout are detected from
/// the data.
#[instrument(skip(payload), fields(size = payload.len()), err)]
pub fn read_payload(payload: &[u8], endian: Endian, base: u32) -> Result<(Fdgh, PayloadLayout)> {
    FdghReader::new(payload, endian, base)
        .read()
        .map_err(Error::into_malformed)
}

/// Where a string sits and where the next structure begins
#[derive(Debug, Copy, Clone)]
struct StringSpan {
    /// Position of the length prefix
    start: usize,
    len: usize,
    /// Start of whatever follows the string
    next: usize,
}

impl StringSpan {
    fn text_end(&self) -> usize {
        self.start + 4 + self.len
    }

    /// Whether `terminators` zero bytes plus padding to 4 bytes exactly fill the gap
    fn fits(&self, terminators: usize) -> bool {
        (self.text_end() + terminators).next_multiple_of(4) == self.next
    }
}

struct FdghReader<'a> {
    reader: ByteReader<'a>,
    base: usize,
    /// Every structure start referenced by an offset
    starts: Vec<usize>,
    /// Strings as `(start, len)`
    strings: Vec<(usize, usize)>,
}

impl<'a> FdghReader<'a> {
    fn new(payload: &'a [u8], endian: Endian, base: u32) -> Self {
        Self {
            reader: ByteReader::new(payload, endian),
            base: base as usize,
            starts: Vec::new(),
            strings: Vec::new(),
        }
    }

    fn read(mut self) -> Result<(Fdgh, PayloadLayout)> {
        let magic = self.reader.read_u32()?;
        if magic != FDGH_MAGIC {
            return Err(Error::malformed(0, format!("incorrect fdgh magic {magic:#010x}")));
        }

        let worldmap_value = self.reader.read_u32()?;
        let worldmap_at = self.read_offset()?;
        let rooms_at = self.read_offset()?;
        let assets_at = self.read_offset()?;
        debug!(worldmap_at, rooms_at, assets_at, "fdgh header");

        let room_count = self.peek_count(rooms_at)?;
        let asset_count = self.peek_count(assets_at)?;

        self.reader.seek(worldmap_at)?;
        let worldmap = self.read_index_list(room_count, "world map room")?;

        self.reader.seek(rooms_at)?;
        let count = self.read_count(12)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push((self.read_offset()?, self.read_offset()?, self.read_offset()?));
        }

        let mut rooms = Vec::with_capacity(count);
        for (name_at, links_at, room_assets_at) in entries {
            self.reader.seek(name_at)?;
            let name = latin1_to_string(self.read_string()?);

            self.reader.seek(links_at)?;
            let links = self.read_index_list(room_count, "linked room")?;

            self.reader.seek(room_assets_at)?;
            let assets = self.read_index_list(asset_count, "asset")?;

            trace!(%name, links = links.len(), assets = assets.len(), "room");
            rooms.push(Room {
                name,
                links,
                assets,
            });
        }

        self.reader.seek(assets_at)?;
        let count = self.read_count(4)?;
        let asset_name_hashes = self.detect_asset_records(count)?;
        self.reader
            .ensure(count * AssetNameHash::record_size(asset_name_hashes))?;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let at = self.read_offset()?;
            let hash = match asset_name_hashes {
                Some(AssetNameHash::Fnv1a64) => Some(self.reader.read_u64()?),
                None => None,
            };
            records.push((at, hash));
        }

        let mut assets = Vec::with_capacity(count);
        for (at, hash) in records {
            self.reader.seek(at)?;
            let bytes = self.read_string()?;
            let name = latin1_to_string(bytes);

            if let Some(stored) = hash {
                let expected = fnv1a64(bytes);
                if stored != expected {
                    warn!(
                        asset = %name,
                        stored = format_args!("{stored:#018x}"),
                        expected = format_args!("{expected:#018x}"),
                        "asset name hash does not match, it will be recomputed on encode"
                    );
                }
            }
            assets.push(name);
        }

        let spans = self.string_spans()?;
        let num_string_null_terminators = detect_terminators(&spans)?;
        self.verify_strings(&spans, num_string_null_terminators as usize)?;

        let fdgh = Fdgh {
            worldmap_value,
            worldmap,
            rooms,
            assets,
        };
        let layout = PayloadLayout {
            num_string_null_terminators,
            asset_name_hashes,
        };
        debug!(
            rooms = fdgh.rooms.len(),
            assets = fdgh.assets.len(),
            ?layout,
            "decoded fdgh payload"
        );

        Ok((fdgh, layout))
    }

    /// Read a stored file offset and turn it into a payload position.
    fn read_offset(&mut self) -> Result<usize> {
        let at = self.reader.position();
        let offset = self.reader.read_u32()?;
        let pos = (offset as usize)
            .checked_sub(self.base)
            .filter(|&pos| pos <= self.reader.len())
            .ok_or_else(|| {
                Error::malformed(at, format!("offset {offset:#x} points outside the payload"))
            })?;
        self.starts.push(pos);
        Ok(pos)
    }

    /// Read a `u32` count of elements of `size` bytes each that must fit in the payload.
    fn read_count(&mut self, size: usize) -> Result<usize> {
        let at = self.reader.position();
        let count = self.reader.read_u32()? as usize;
        match count.checked_mul(size) {
            Some(wanted) => self.reader.ensure(wanted)?,
            None => return Err(Error::malformed(at, format!("count {count} is too large"))),
        }
        Ok(count)
    }

    fn peek_count(&mut self, at: usize) -> Result<usize> {
        let pos = self.reader.position();
        self.reader.seek(at)?;
        let count = self.reader.read_u32()? as usize;
        self.reader.seek(pos)?;
        Ok(count)
    }

    /// Read a counted list of indices that must each be below `limit`.
    fn read_index_list(&mut self, limit: usize, what: &str) -> Result<Vec<u32>> {
        let count = self.read_count(4)?;
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            let at = self.reader.position();
            let index = self.reader.read_u32()?;
            if index as usize >= limit {
                return Err(Error::malformed(
                    at,
                    format!("{what} index {index} is out of range (count {limit})"),
                ));
            }
            indices.push(index);
        }
        Ok(indices)
    }

    fn read_string(&mut self) -> Result<&'a [u8]> {
        let start = self.reader.position();
        let bytes = self.reader.read_len_prefixed()?;
        self.strings.push((start, bytes.len()));
        Ok(bytes)
    }

    /// Pair every string with the closest structure that starts after it, or the payload end.
    fn string_spans(&mut self) -> Result<Vec<StringSpan>> {
        self.starts.push(self.reader.len());
        self.starts.sort_unstable();
        self.starts.dedup();

        let mut spans = Vec::with_capacity(self.strings.len());
        for &(start, len) in &self.strings {
            let next_index = self.starts.partition_point(|&pos| pos <= start);
            let next = self.starts.get(next_index).copied().unwrap_or(self.reader.len());
            let span = StringSpan { start, len, next };
            if span.text_end() > next {
                return Err(Error::malformed(start, "string overlaps the data after it"));
            }
            spans.push(span);
        }
        Ok(spans)
    }

    /// Asset records are either plain offsets or offsets followed by a 64-bit name hash. The size
    /// of the record region, up to the first string, tells them apart.
    fn detect_asset_records(&mut self, count: usize) -> Result<Option<AssetNameHash>> {
        if count == 0 {
            return Ok(None);
        }

        let records_at = self.reader.position();
        let first = self.reader.read_u32()? as usize;
        self.reader.seek(records_at)?;
        let first = first.saturating_sub(self.base);

        let region = first.checked_sub(records_at).ok_or_else(|| {
            Error::malformed(records_at, "first asset string precedes the asset records")
        })?;

        let hashed = AssetNameHash::Fnv1a64;
        if region == count * AssetNameHash::record_size(None) {
            Ok(None)
        } else if region == count * AssetNameHash::record_size(Some(hashed)) {
            debug!(count, "asset records carry name hashes");
            Ok(Some(hashed))
        } else {
            Err(Error::malformed(
                records_at,
                format!("{region} bytes of asset records do not fit {count} plain or hashed records"),
            ))
        }
    }

    /// Check that every string is followed by exactly `terminators` zero bytes and zero padding.
    fn verify_strings(&mut self, spans: &[StringSpan], terminators: usize) -> Result<()> {
        for span in spans {
            self.reader.seek(span.start + 4)?;
            let text = self.reader.read_terminated(terminators)?;
            if text.len() != span.len {
                return Err(Error::malformed(
                    span.start,
                    format!("string of {} bytes is not followed by {terminators} terminators", span.len),
                ));
            }
            self.reader.skip_padding(4)?;
        }
        Ok(())
    }
}

/// Find the terminator count that explains the gap after every string.
///
/// The usual count of 4 is tried first, then every other count from 1 up.
fn detect_terminators(spans: &[StringSpan]) -> Result<u32> {
    let Some(widest) = spans.iter().map(|s| s.next - s.text_end()).max() else {
        return Ok(DEFAULT_TERMINATORS);
    };

    let default = DEFAULT_TERMINATORS as usize;
    std::iter::once(default)
        .chain((1..=widest).filter(|&n| n != default))
        .find(|&n| spans.iter().all(|span| span.fits(n)))
        .map(|n| n as u32)
        .ok_or_else(|| {
            let start = spans.first().map_or(0, |span| span.start);
            Error::malformed(start, "no string terminator count fits every string")
        })
}
