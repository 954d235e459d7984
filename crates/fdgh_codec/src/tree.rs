//! Mapping between decoded FDGH data and its document form.
//!
//! Indices are replaced by names in documents: world map entries and links name a room, room
//! assets name an asset. Names resolve to the first room or asset that carries them. A reference
//! to a later entry with a repeated name also carries the entry's position in an `index`
//! attribute.

use std::collections::HashMap;

use fdgh_xbin::{config::parse_int, XbinInfo};
use tracing::debug;

use crate::{
    document::{Document, Element},
    error::{Error, Result},
    types::{string_to_latin1, Fdgh, Room, DEFAULT_WORLDMAP_VALUE},
    variant::FormatVariant,
};

pub const ROOT: &str = "fdgh";
pub const WORLDMAP: &str = "worldmap";
pub const ROOMS: &str = "rooms";
pub const ROOM: &str = "room";
pub const LINK: &str = "link";
pub const ASSET: &str = "asset";
pub const ASSETS: &str = "assets";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_NAME: &str = "name";
pub const ATTR_INDEX: &str = "index";

/// Build the document for decoded data.
///
/// An `<assets>` section is only added when the asset table differs from the order in which rooms
/// first reference their assets, since that order is what [`from_document`] rebuilds otherwise.
pub fn to_document(fdgh: &Fdgh, variant: &FormatVariant, xbin: &XbinInfo) -> Result<Document> {
    let room_names = Names::new(fdgh.rooms.iter().map(|room| room.name.as_str()));
    let asset_names = Names::new(fdgh.assets.iter().map(String::as_str));

    let mut root = Element::new(ROOT);
    variant.write_root(xbin, &mut root);

    let mut worldmap = Element::new(WORLDMAP).with_attr(ATTR_VALUE, fdgh.worldmap_value.to_string());
    for &index in &fdgh.worldmap {
        worldmap.push(room_names.reference(ROOM, index)?);
    }
    root.push(worldmap);

    let mut rooms = Element::new(ROOMS);
    for room in &fdgh.rooms {
        let mut element = Element::new(ROOM).with_attr(ATTR_NAME, room.name.as_str());
        for &index in &room.links {
            element.push(room_names.reference(LINK, index)?);
        }
        for &index in &room.assets {
            element.push(asset_names.reference(ASSET, index)?);
        }
        rooms.push(element);
    }
    root.push(rooms);

    let table: Vec<&str> = fdgh.assets.iter().map(String::as_str).collect();
    if table != fdgh.referenced_assets() {
        debug!(count = table.len(), "asset table is listed explicitly");
        let mut assets = Element::new(ASSETS);
        for name in table {
            assets.push(Element::new(ASSET).with_text(name));
        }
        root.push(assets);
    }

    Ok(Document::new(root))
}

/// Rebuild the data, format variant and container details described by a document.
///
/// Counts come from the number of children. Unknown elements are skipped.
pub fn from_document(document: &Document) -> Result<(Fdgh, FormatVariant, XbinInfo)> {
    let root = &document.root;
    if root.name != ROOT {
        return Err(Error::invalid(
            format!("/{}", root.name),
            format!("root element must be <{ROOT}>"),
        ));
    }

    let (variant, xbin) = FormatVariant::read_root(root)?;

    let mut worldmap_value = DEFAULT_WORLDMAP_VALUE;
    let mut worldmap_names = Vec::new();
    let mut room_elements = Vec::new();
    let mut asset_table = AssetTable::default();

    for (section, path) in with_paths(&format!("/{ROOT}"), &root.children) {
        match section.name.as_str() {
            WORLDMAP => {
                if let Some(value) = section.attr(ATTR_VALUE) {
                    worldmap_value = parse_int(value.trim()).map_err(|e| {
                        Error::invalid(format!("{path}/@{ATTR_VALUE}"), e.to_string())
                    })?;
                }
                worldmap_names.extend(
                    with_paths(&path, &section.children).filter(|(child, _)| child.name == ROOM),
                );
            }
            ROOMS => room_elements.extend(
                with_paths(&path, &section.children).filter(|(child, _)| child.name == ROOM),
            ),
            ASSETS => {
                for (asset, path) in with_paths(&path, &section.children) {
                    if asset.name == ASSET {
                        asset_table.push(asset.text(), &path)?;
                    }
                }
            }
            other => debug!(element = other, %path, "skipping unknown element"),
        }
    }

    let mut names = Vec::with_capacity(room_elements.len());
    let mut room_indices = HashMap::new();
    for (index, (room, path)) in room_elements.iter().enumerate() {
        let name = room
            .attr(ATTR_NAME)
            .ok_or_else(|| Error::invalid(path, "room has no name attribute"))?;
        check_latin1(name, &format!("{path}/@{ATTR_NAME}"))?;
        room_indices.entry(name).or_insert(index as u32);
        names.push(name);
    }
    let resolve_room = |element: &Element, path: &str| -> Result<u32> {
        if let Some(index) = pinned_index(element, path, &names)? {
            return Ok(index);
        }
        room_indices.get(element.text()).copied().ok_or_else(|| {
            Error::invalid(path, format!("unknown room {:?}", element.text()))
        })
    };

    let worldmap = worldmap_names
        .iter()
        .map(|(element, path)| resolve_room(element, path))
        .collect::<Result<Vec<_>>>()?;

    let mut rooms = Vec::with_capacity(room_elements.len());
    for ((room, path), name) in room_elements.iter().zip(&names) {
        let mut links = Vec::new();
        let mut assets = Vec::new();
        for (child, path) in with_paths(path, &room.children) {
            match child.name.as_str() {
                LINK => links.push(resolve_room(child, &path)?),
                ASSET => assets.push(asset_table.resolve(child, &path)?),
                other => debug!(element = other, %path, "skipping unknown element"),
            }
        }

        rooms.push(Room {
            name: (*name).to_owned(),
            links,
            assets,
        });
    }

    let fdgh = Fdgh {
        worldmap_value,
        worldmap,
        rooms,
        assets: asset_table.names,
    };
    Ok((fdgh, variant, xbin))
}

/// Room or asset names by index, with the first index of every distinct name
struct Names<'a> {
    names: Vec<&'a str>,
    first: HashMap<&'a str, u32>,
}

impl<'a> Names<'a> {
    fn new(names: impl Iterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = names.collect();
        let mut first = HashMap::with_capacity(names.len());
        for (index, &name) in names.iter().enumerate() {
            first.entry(name).or_insert(index as u32);
        }
        Self { names, first }
    }

    /// An element naming entry `index`, pinned to it when an earlier entry has the same name.
    fn reference(&self, tag: &str, index: u32) -> Result<Element> {
        let name = self.names.get(index as usize).copied().ok_or_else(|| {
            Error::malformed(0, format!("<{tag}> index {index} is out of range"))
        })?;

        let element = Element::new(tag).with_text(name);
        if self.first.get(name) == Some(&index) {
            Ok(element)
        } else {
            Ok(element.with_attr(ATTR_INDEX, index.to_string()))
        }
    }
}

/// The entry a reference pins through its `index` attribute, which must carry the same name.
fn pinned_index<S: AsRef<str>>(
    element: &Element,
    path: &str,
    names: &[S],
) -> Result<Option<u32>> {
    let Some(value) = element.attr(ATTR_INDEX) else {
        return Ok(None);
    };

    let attr_path = format!("{path}/@{ATTR_INDEX}");
    let index = parse_int(value.trim()).map_err(|e| Error::invalid(&attr_path, e.to_string()))?;
    let found: Option<&str> = names.get(index as usize).map(|name| name.as_ref());
    match found {
        Some(name) if name == element.text() => Ok(Some(index)),
        Some(name) => Err(Error::invalid(
            attr_path,
            format!("entry {index} is {name:?}, not {:?}", element.text()),
        )),
        None => Err(Error::invalid(
            attr_path,
            format!("index {index} is out of range (count {})", names.len()),
        )),
    }
}

/// Asset names in table order, with the first index of every distinct name
#[derive(Debug, Default)]
struct AssetTable {
    names: Vec<String>,
    indices: HashMap<String, u32>,
}

impl AssetTable {
    /// Append an entry of an explicit asset list.
    fn push(&mut self, name: &str, path: &str) -> Result<u32> {
        check_latin1(name, path)?;
        let index = u32::try_from(self.names.len())
            .map_err(|_| Error::invalid(path, "too many assets"))?;
        self.names.push(name.to_owned());
        Ok(*self.indices.entry(name.to_owned()).or_insert(index))
    }

    /// Index of a room asset, appending it to the table on first use.
    fn resolve(&mut self, element: &Element, path: &str) -> Result<u32> {
        if let Some(index) = pinned_index(element, path, &self.names)? {
            return Ok(index);
        }
        match self.indices.get(element.text()) {
            Some(&index) => Ok(index),
            None => self.push(element.text(), path),
        }
    }
}

/// Pair children with their path, numbering siblings of the same name from 1.
fn with_paths<'a>(
    parent: &str,
    children: &'a [Element],
) -> impl Iterator<Item = (&'a Element, String)> + 'a {
    let parent = parent.to_owned();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    children.iter().map(move |child| {
        let position = seen.entry(child.name.as_str()).or_default();
        *position += 1;
        (child, format!("{parent}/{}[{position}]", child.name))
    })
}

fn check_latin1(text: &str, path: &str) -> Result<()> {
    string_to_latin1(text).map(|_| ()).map_err(|c| {
        Error::invalid(path, format!("character {c:?} cannot be stored as Latin-1"))
    })
}
