use std::path::{Path, PathBuf};

use fdgh_codec::{
    decode_to_document, document_to_text, encode_from_document, error::Error, text_to_document,
    Element,
};
use pretty_assertions::{assert_eq, assert_str_eq};
use tracing::info;
use tracing_test::traced_test;

#[rustfmt::skip]
const TWO_ROOMS: &[u8] = &[
    b'X', b'B', b'I', b'N', 0x12, 0x34, 0x02, 0x00, 0x00, 0x00, 0x00, 0xA4, 0x00, 0x00, 0xFD, 0xE9,
    // Header
    b'F', b'D', b'G', b'H', 0x00, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x80,
    // World map
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    // Room table
    0x00, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x48, 0x00, 0x00, 0x00, 0x54, 0x00, 0x00, 0x00, 0x5C,
    0x00, 0x00, 0x00, 0x64, 0x00, 0x00, 0x00, 0x70, 0x00, 0x00, 0x00, 0x74,
    // Room "A"
    0x00, 0x00, 0x00, 0x01, b'A', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    // Room "B"
    0x00, 0x00, 0x00, 0x01, b'B', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    // Asset table
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x8C, 0x00, 0x00, 0x00, 0x98,
    0x00, 0x00, 0x00, 0x01, b'x', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x02, b'y', b'z', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const TWO_ROOMS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<fdgh endian="big" xbin_version="2" num_string_null_terminators="4">
  <worldmap value="2">
    <room>A</room>
  </worldmap>
  <rooms>
    <room name="A">
      <link>B</link>
      <asset>x</asset>
    </room>
    <room name="B">
      <asset>x</asset>
      <asset>yz</asset>
    </room>
  </rooms>
</fdgh>
"#;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("resources").join(name)
}

fn read_resource(name: &str) -> Result<Vec<u8>, Error> {
    Ok(std::fs::read(resource(name))?)
}

#[traced_test]
#[test]
fn decode_two_rooms() -> Result<(), Error> {
    let document = decode_to_document(TWO_ROOMS)?;
    assert_str_eq!(document_to_text(&document)?, TWO_ROOMS_XML);

    let encoded = encode_from_document(&text_to_document(TWO_ROOMS_XML)?)?;
    assert_str_eq!(format!("{:02X?}", encoded), format!("{:02X?}", TWO_ROOMS));

    Ok(())
}

#[traced_test]
#[test]
fn validate_resources_round_trip() -> Result<(), Error> {
    let to_test = std::fs::read_dir(resource(""))?
        .filter_map(|res| res.ok())
        .map(|dir_entry| dir_entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "bin"))
        .collect::<Vec<_>>();
    assert!(!to_test.is_empty());

    for path in to_test {
        info!("testing {}", path.display());
        let original = std::fs::read(&path)?;

        let document = decode_to_document(&original)?;
        assert_eq!(encode_from_document(&document)?, original);

        let reparsed = text_to_document(&document_to_text(&document)?)?;
        assert_eq!(reparsed, document);
        assert_eq!(encode_from_document(&reparsed)?, original);
    }

    Ok(())
}

#[traced_test]
#[test]
fn decode_big_v2_resource() -> Result<(), Error> {
    let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<fdgh endian="big" xbin_version="2" num_string_null_terminators="4">
  <worldmap value="2">
    <room>Stage1-1</room>
    <room>Boss Café</room>
  </worldmap>
  <rooms>
    <room name="Stage1-1">
      <link>Stage1-2</link>
      <asset>chara/kirby</asset>
      <asset>map/grass</asset>
    </room>
    <room name="Stage1-2">
      <link>Stage1-1</link>
      <link>Boss Café</link>
      <asset>map/grass</asset>
      <asset>map/sea</asset>
    </room>
    <room name="Boss Café">
      <asset>chara/whispy</asset>
      <asset>chara/kirby</asset>
    </room>
  </rooms>
</fdgh>
"#;

    let document = decode_to_document(&read_resource("big_v2.bin")?)?;
    assert_str_eq!(document_to_text(&document)?, expected);

    Ok(())
}

#[traced_test]
#[test]
fn decode_variant_attributes() -> Result<(), Error> {
    let hashed = decode_to_document(&read_resource("little_v4_hashed.bin")?)?;
    let attrs: Vec<(&str, &str)> = hashed
        .root
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        attrs,
        [
            ("endian", "little"),
            ("xbin_version", "4"),
            ("num_string_null_terminators", "4"),
            ("asset_name_hashes", "fnv1a_64"),
            ("xbin_metadata", "0x3a4"),
        ]
    );

    let trailer = decode_to_document(&read_resource("little_v2_trailer.bin")?)?;
    assert_eq!(trailer.root.attr("xbin_trailer"), Some("524c4f430000000000000000"));
    assert_eq!(
        trailer.root.child("worldmap").and_then(|w| w.attr("value")),
        Some("3")
    );

    Ok(())
}

#[traced_test]
#[test]
fn decode_single_terminator_with_asset_table() -> Result<(), Error> {
    let document = decode_to_document(&read_resource("big_v4_one_terminator.bin")?)?;
    assert_eq!(document.root.attr("num_string_null_terminators"), Some("1"));

    let listed: Vec<&str> = document
        .root
        .child("assets")
        .map(|assets| assets.children.iter().map(Element::text).collect())
        .unwrap_or_default();
    assert_eq!(listed, ["a.dat", "unused.dat", "b.dat"]);

    Ok(())
}

#[traced_test]
#[test]
fn hash_mismatch_is_only_a_warning() -> Result<(), Error> {
    let original = read_resource("little_v4_hashed.bin")?;
    let mut corrupted = original.clone();
    corrupted[0xD8] ^= 0xFF;

    let document = decode_to_document(&corrupted)?;
    assert!(logs_contain("asset name hash does not match"));
    assert_eq!(encode_from_document(&document)?, original);

    Ok(())
}

#[test]
fn reject_bad_container() {
    let mut data = TWO_ROOMS.to_vec();
    data[0] = b'Y';
    assert!(matches!(
        decode_to_document(&data),
        Err(Error::MalformedContainer(_))
    ));

    assert!(matches!(
        decode_to_document(&TWO_ROOMS[..12]),
        Err(Error::MalformedContainer(_))
    ));

    // Declared file size larger than the buffer
    let mut data = TWO_ROOMS.to_vec();
    data[0x0B] = 0xFF;
    assert!(matches!(
        decode_to_document(&data),
        Err(Error::MalformedContainer(_))
    ));
}

#[test]
fn reject_unknown_byte_order() {
    for mark in [[0xAB, 0xCD], [0x00, 0x00]] {
        let mut data = TWO_ROOMS.to_vec();
        data[4..6].copy_from_slice(&mark);
        assert!(matches!(
            decode_to_document(&data),
            Err(Error::MalformedContainer(
                fdgh_xbin::error::Error::UnknownByteOrder { found }
            )) if found == mark
        ));
    }

    // Big-endian container around a little-endian payload
    let mut data = TWO_ROOMS.to_vec();
    data[0x10..0x14].copy_from_slice(b"HGDF");
    assert!(matches!(
        decode_to_document(&data),
        Err(Error::UnknownEndianness(_))
    ));
}

#[test]
fn reject_missing_fdgh_magic() {
    let mut data = TWO_ROOMS.to_vec();
    data[0x10..0x14].copy_from_slice(b"FDGX");
    assert!(matches!(
        decode_to_document(&data),
        Err(Error::MalformedBinary { offset: 0, .. })
    ));

    #[rustfmt::skip]
    let empty = [
        b'X', b'B', b'I', b'N', 0x12, 0x34, 0x02, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0xFD, 0xE9,
    ];
    assert!(matches!(
        decode_to_document(&empty),
        Err(Error::MalformedBinary { offset: 0, .. })
    ));
}

#[test]
fn reject_broken_payload() {
    let mut data = TWO_ROOMS.to_vec();
    // Room table offset past the end of the payload
    data[0x1C..0x20].copy_from_slice(&[0x00, 0x00, 0x10, 0x00]);
    assert!(matches!(
        decode_to_document(&data),
        Err(Error::MalformedBinary { offset: 0x0C, .. })
    ));

    let mut data = TWO_ROOMS.to_vec();
    // Link to room 5 of 2
    data[0x5B] = 0x05;
    assert!(matches!(
        decode_to_document(&data),
        Err(Error::MalformedBinary { .. })
    ));
}
