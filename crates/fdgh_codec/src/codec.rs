//! Whole-file conversion between FDGH binaries, documents and XML text.

use fdgh_xbin::Endian;
use tracing::{debug, info, instrument};

use crate::{
    document::Document,
    error::{Error, Result},
    read::{has_magic, read_payload},
    tree::{from_document, to_document},
    variant::FormatVariant,
    write::write_payload,
};

/// Outcome of decoding under one candidate byte order
enum Attempt {
    /// The container's byte order mark does not read correctly
    WrongMark(String),
    /// The payload disagrees with the byte order of its container
    Rejected(String),
    /// The byte order is right but the file is broken
    Failed(Error),
}

impl From<Error> for Attempt {
    fn from(error: Error) -> Self {
        Attempt::Failed(error)
    }
}

/// Decode an XBIN-wrapped FDGH file into a document.
///
/// Big-endian is tried before little-endian. A byte order is rejected when the container's byte
/// order mark does not read correctly under it, or when the payload magic only reads correctly in
/// the other byte order. A byte order mark that fits neither is a malformed container, and a
/// payload magic that fits neither is malformed data. Once a byte order is accepted, any later
/// failure is returned as is.
///
/// ```
/// # fn doit() -> fdgh_codec::error::Result<()> {
/// #[rustfmt::skip]
/// let file = [
///     b'X', b'B', b'I', b'N', 0x12, 0x34, 0x02, 0x00, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0xFD, 0xE9,
///     b'F', b'D', b'G', b'H', 0x00, 0x00, 0x00, 0x02,
///     0x00, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0x00, 0x2C,
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
/// ];
///
/// let document = fdgh_codec::decode_to_document(&file)?;
/// assert_eq!(document.root.attr("endian"), Some("big"));
/// assert_eq!(fdgh_codec::encode_from_document(&document)?, file);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[instrument(skip_all, fields(size = data.len()), err)]
pub fn decode_to_document(data: &[u8]) -> Result<Document> {
    let mut rejected = Vec::new();
    let mut wrong_marks = 0;
    for endian in Endian::CANDIDATES {
        match decode_as(data, endian) {
            Ok(document) => {
                info!(%endian, "decoded fdgh file");
                return Ok(document);
            }
            Err(Attempt::WrongMark(reason)) => {
                debug!(%endian, %reason, "byte order mark rejected");
                wrong_marks += 1;
                rejected.push(format!("{endian}: {reason}"));
            }
            Err(Attempt::Rejected(reason)) => {
                debug!(%endian, %reason, "byte order rejected");
                rejected.push(format!("{endian}: {reason}"));
            }
            Err(Attempt::Failed(error)) => return Err(error),
        }
    }

    match data.get(4..6) {
        Some(&[a, b]) if wrong_marks == Endian::CANDIDATES.len() => {
            Err(fdgh_xbin::error::Error::UnknownByteOrder { found: [a, b] }.into())
        }
        _ => Err(Error::UnknownEndianness(rejected.join("; "))),
    }
}

fn decode_as(data: &[u8], endian: Endian) -> std::result::Result<Document, Attempt> {
    let (xbin, payload) = match fdgh_xbin::unwrap(data, endian) {
        Ok(unwrapped) => unwrapped,
        Err(error @ fdgh_xbin::error::Error::ByteOrderMismatch { .. }) => {
            return Err(Attempt::WrongMark(error.to_string()))
        }
        Err(error) => return Err(Attempt::Failed(error.into())),
    };

    if !has_magic(payload, endian) {
        let swapped = Endian::CANDIDATES.into_iter().find(|&other| other != endian);
        return Err(match swapped {
            Some(other) if has_magic(payload, other) => {
                Attempt::Rejected(format!("payload is {other} endian"))
            }
            _ if payload.len() < 4 => Attempt::Failed(Error::malformed(
                0,
                format!("payload of {} bytes has no fdgh magic", payload.len()),
            )),
            _ => Attempt::Failed(Error::malformed(0, "incorrect fdgh magic")),
        });
    }

    let (fdgh, layout) = read_payload(payload, endian, xbin.header_size())?;
    let variant = FormatVariant {
        endian,
        xbin_version: xbin.version,
        num_string_null_terminators: layout.num_string_null_terminators,
        asset_name_hashes: layout.asset_name_hashes,
    };

    Ok(to_document(&fdgh, &variant, &xbin)?)
}

/// Encode a document into an XBIN-wrapped FDGH file.
///
/// Counts are taken from the number of children, so rooms, links and assets can be added or removed
/// by editing the document alone.
#[instrument(skip_all, err)]
pub fn encode_from_document(document: &Document) -> Result<Vec<u8>> {
    let (fdgh, variant, xbin) = from_document(document)?;
    let payload = write_payload(&fdgh, &variant)?;
    let file = fdgh_xbin::wrap(&payload, &xbin)?;
    info!(size = file.len(), endian = %variant.endian, "encoded fdgh file");
    Ok(file)
}

/// Render a document as XML text.
pub fn document_to_text(document: &Document) -> Result<String> {
    document.to_xml_string()
}

/// Parse XML text into a document.
pub fn text_to_document(text: &str) -> Result<Document> {
    Document::from_xml_str(text)
}
