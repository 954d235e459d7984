//! Functions for writing FDGH payloads
//!

use tracing::{debug, instrument};

use crate::{
    bytes::ByteWriter,
    error::{Error, Result},
    hash::fnv1a64,
    types::{string_to_latin1, Fdgh, FDGH_MAGIC},
    variant::{AssetNameHash, FormatVariant},
};

/// Encode `fdgh` as a payload laid out the way the games write it.
///
/// Sections follow each other in a fixed order (header, world map, room table, each room's name,
/// links and assets, asset table, asset names) and every stored offset is the payload position
/// plus the container header size of the variant.
#[instrument(skip_all, fields(rooms = fdgh.rooms.len(), assets = fdgh.assets.len()), err)]
pub fn write_payload(fdgh: &Fdgh, variant: &FormatVariant) -> Result<Vec<u8>> {
    check_indices(fdgh)?;

    let mut writer = FdghWriter {
        writer: ByteWriter::new(variant.endian),
        base: variant.base_offset(),
        terminators: variant.num_string_null_terminators as usize,
    };
    writer.write(fdgh, variant.asset_name_hashes)?;

    let payload = writer.writer.into_inner();
    debug!(size = payload.len(), "encoded fdgh payload");
    Ok(payload)
}

fn check_indices(fdgh: &Fdgh) -> Result<()> {
    let rooms = fdgh.rooms.len();
    for (i, &index) in fdgh.worldmap.iter().enumerate() {
        if index as usize >= rooms {
            return Err(Error::invalid(
                format!("/fdgh/worldmap[1]/room[{}]", i + 1),
                format!("room index {index} is out of range"),
            ));
        }
    }

    for (r, room) in fdgh.rooms.iter().enumerate() {
        if let Some(i) = room.links.iter().position(|&index| index as usize >= rooms) {
            return Err(Error::invalid(
                format!("/fdgh/rooms[1]/room[{}]/link[{}]", r + 1, i + 1),
                format!("room index {} is out of range", room.links[i]),
            ));
        }
        if let Some(i) = room
            .assets
            .iter()
            .position(|&index| index as usize >= fdgh.assets.len())
        {
            return Err(Error::invalid(
                format!("/fdgh/rooms[1]/room[{}]/asset[{}]", r + 1, i + 1),
                format!("asset index {} is out of range", room.assets[i]),
            ));
        }
    }

    Ok(())
}

struct FdghWriter {
    writer: ByteWriter,
    base: u32,
    terminators: usize,
}

impl FdghWriter {
    fn write(&mut self, fdgh: &Fdgh, hashes: Option<AssetNameHash>) -> Result<()> {
        self.writer.write_u32(FDGH_MAGIC)?;
        self.writer.write_u32(fdgh.worldmap_value)?;
        let worldmap_slot = self.writer.reserve_u32();
        let rooms_slot = self.writer.reserve_u32();
        let assets_slot = self.writer.reserve_u32();

        self.patch_here(worldmap_slot)?;
        self.write_list(&fdgh.worldmap)?;

        self.patch_here(rooms_slot)?;
        self.write_count(fdgh.rooms.len())?;
        let room_slots: Vec<[usize; 3]> = fdgh
            .rooms
            .iter()
            .map(|_| std::array::from_fn(|_| self.writer.reserve_u32()))
            .collect();

        for (r, (room, [name_slot, links_slot, room_assets_slot])) in
            fdgh.rooms.iter().zip(room_slots).enumerate()
        {
            self.patch_here(name_slot)?;
            self.write_string(&room.name, || format!("/fdgh/rooms[1]/room[{}]/@name", r + 1))?;
            self.patch_here(links_slot)?;
            self.write_list(&room.links)?;
            self.patch_here(room_assets_slot)?;
            self.write_list(&room.assets)?;
        }

        self.patch_here(assets_slot)?;
        self.write_count(fdgh.assets.len())?;
        let mut record_slots = Vec::with_capacity(fdgh.assets.len());
        for (i, name) in fdgh.assets.iter().enumerate() {
            record_slots.push(self.writer.reserve_u32());
            if let Some(AssetNameHash::Fnv1a64) = hashes {
                let bytes = latin1(name, || format!("/fdgh/assets[1]/asset[{}]", i + 1))?;
                self.writer.write_u64(fnv1a64(&bytes))?;
            }
        }

        for (i, (name, slot)) in fdgh.assets.iter().zip(record_slots).enumerate() {
            self.patch_here(slot)?;
            self.write_string(name, || format!("/fdgh/assets[1]/asset[{}]", i + 1))?;
        }

        Ok(())
    }

    /// Store the current file offset in a reserved slot.
    fn patch_here(&mut self, slot: usize) -> Result<()> {
        let offset = u32::try_from(self.writer.position())
            .ok()
            .and_then(|pos| pos.checked_add(self.base))
            .ok_or_else(|| Error::invalid("/fdgh", "encoded data exceeds 4 GiB"))?;
        self.writer.patch_u32(slot, offset);
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| Error::invalid("/fdgh", format!("{count} entries do not fit a u32")))?;
        self.writer.write_u32(count)
    }

    fn write_list(&mut self, indices: &[u32]) -> Result<()> {
        self.write_count(indices.len())?;
        for &index in indices {
            self.writer.write_u32(index)?;
        }
        Ok(())
    }

    fn write_string(&mut self, text: &str, path: impl Fn() -> String) -> Result<()> {
        let bytes = latin1(text, path)?;
        self.writer.write_len_prefixed(&bytes, self.terminators)
    }
}

fn latin1(text: &str, path: impl Fn() -> String) -> Result<Vec<u8>> {
    string_to_latin1(text).map_err(|c| {
        Error::invalid(
            path(),
            format!("character {c:?} in {text:?} cannot be stored as Latin-1"),
        )
    })
}
