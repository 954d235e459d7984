//! Functions for unwrapping XBIN containers
//!

use std::io::Cursor;

use binrw::BinRead;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{trailer_template, Endian, XbinHeader, XbinInfo, XbinVersion, BYTE_ORDER_MARK, MAGIC},
};

/// Validate the container header under the given byte order and split off the payload.
///
/// The trailing block is captured verbatim into [`XbinInfo::trailer`] unless it matches the
/// template for the detected version.
///
/// ```
/// use fdgh_xbin::{Endian, XbinVersion};
///
/// # fn doit() -> fdgh_xbin::error::Result<()> {
/// let file = [
///     b'X', b'B', b'I', b'N', 0x12, 0x34, 0x02, 0x00,
///     0x00, 0x00, 0x00, 0x12, 0x00, 0x00, 0xFD, 0xE9,
///     0xAB, 0xCD,
/// ];
///
/// let (info, payload) = fdgh_xbin::unwrap(&file, Endian::Big)?;
/// assert_eq!(info.version, XbinVersion::V2);
/// assert_eq!(payload, &[0xAB, 0xCD]);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[instrument(skip(data), fields(size = data.len()), err)]
pub fn unwrap(data: &[u8], endian: Endian) -> Result<(XbinInfo, &[u8])> {
    if data.len() < XbinVersion::V2.header_size() as usize {
        return Err(Error::Truncated { size: data.len() });
    }

    if &data[..MAGIC.len()] != MAGIC {
        return Err(Error::InvalidMagic {
            found: data[..MAGIC.len()].to_vec(),
        });
    }

    let header = XbinHeader::read_options(&mut Cursor::new(data), endian.into(), ())?;
    if header.byte_order_mark != BYTE_ORDER_MARK {
        return Err(Error::ByteOrderMismatch { endian });
    }

    let version = XbinVersion::try_from(header.version)?;
    if header.reserved != 0 {
        return Err(Error::ReservedByte(header.reserved));
    }

    let header_size = version.header_size();
    if header.file_size < header_size || header.file_size as usize > data.len() {
        return Err(Error::FileSizeOutOfRange {
            declared: header.file_size,
            header: header_size,
            actual: data.len(),
        });
    }

    if let Some(colr_offset) = header.colr_offset {
        if colr_offset != header.file_size {
            return Err(Error::ColrOffsetMismatch {
                colr_offset,
                file_size: header.file_size,
            });
        }
    }

    let end = header.file_size as usize;
    let trailer = &data[end..];
    let trailer = (trailer != trailer_template(endian, version).as_slice()).then(|| {
        debug!(len = trailer.len(), "capturing non-standard trailing block");
        trailer.to_vec()
    });

    let info = XbinInfo {
        endian,
        version,
        metadata: header.metadata,
        trailer,
    };

    Ok((info, &data[header_size as usize..end]))
}

/// Unwrap a container, detecting its byte order from the byte order mark.
///
/// Each of [`Endian::CANDIDATES`] is tried in turn; the first one whose byte order mark matches
/// is used and any other failure under that byte order is returned as-is.
#[instrument(skip(data), fields(size = data.len()), err)]
pub fn probe(data: &[u8]) -> Result<(XbinInfo, &[u8])> {
    for endian in Endian::CANDIDATES {
        match unwrap(data, endian) {
            Err(Error::ByteOrderMismatch { .. }) => {
                debug!(%endian, "byte order mark rejected");
            }
            result => return result,
        }
    }

    Err(Error::UnknownByteOrder {
        found: [data[4], data[5]],
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::read::{probe, unwrap};
    use crate::types::{Endian, XbinVersion};

    #[rustfmt::skip]
    const LITTLE_V4: [u8; 26] = [
        b'X', b'B', b'I', b'N', 0x34, 0x12, 0x04, 0x00,
        0x16, 0x00, 0x00, 0x00,
        0xE9, 0xFD, 0x00, 0x00,
        0x16, 0x00, 0x00, 0x00,
        // Payload
        0x01, 0x02,
        // Trailer
        b'R', b'L', b'O', b'C',
    ];

    #[traced_test]
    #[test]
    fn unwrap_captures_short_trailer() -> Result<()> {
        let (info, payload) = unwrap(&LITTLE_V4, Endian::Little)?;

        assert_eq!(info.version, XbinVersion::V4);
        assert_eq!(info.metadata, 0xFDE9);
        assert_eq!(info.trailer, Some(b"RLOC".to_vec()));
        assert_eq!(payload, &[0x01, 0x02]);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn unwrap_rejects_wrong_byte_order() {
        let result = unwrap(&LITTLE_V4, Endian::Big);
        assert!(matches!(
            result,
            Err(Error::ByteOrderMismatch { endian: Endian::Big })
        ));
    }

    #[traced_test]
    #[test]
    fn probe_falls_back_to_little_endian() -> Result<()> {
        let (info, _) = probe(&LITTLE_V4)?;
        assert_eq!(info.endian, Endian::Little);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn probe_rejects_unknown_byte_order_mark() {
        let mut input = LITTLE_V4;
        input[4] = 0x00;

        let result = probe(&input);
        assert!(matches!(
            result,
            Err(Error::UnknownByteOrder { found: [0x00, 0x12] })
        ));
    }

    #[traced_test]
    #[test]
    fn unwrap_rejects_colr_offset_mismatch() {
        let mut input = LITTLE_V4;
        input[0x10] = 0x17;

        let result = unwrap(&input, Endian::Little);
        assert!(matches!(result, Err(Error::ColrOffsetMismatch { .. })));
    }

    #[traced_test]
    #[test]
    fn unwrap_rejects_nonzero_reserved_byte() {
        let mut input = LITTLE_V4;
        input[7] = 0x01;

        let result = unwrap(&input, Endian::Little);
        assert!(matches!(result, Err(Error::ReservedByte(0x01))));
    }
}
