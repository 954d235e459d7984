//! Functions for creating XBIN containers
//!

use std::io::{Cursor, Write};

use binrw::BinWrite;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    types::{XbinHeader, XbinInfo, XbinVersion, BYTE_ORDER_MARK},
};

/// Wrap a payload into a container described by `info`.
///
/// The trailing block is the one captured when the container was unwrapped, or the template for
/// the version when none was captured.
#[instrument(skip(payload), fields(size = payload.len()), err)]
pub fn wrap(payload: &[u8], info: &XbinInfo) -> Result<Vec<u8>> {
    let header_size = info.header_size();
    let file_size = u32::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_add(header_size))
        .ok_or(Error::PayloadTooLarge(payload.len()))?;

    let header = XbinHeader {
        byte_order_mark: BYTE_ORDER_MARK,
        version: info.version as u8,
        reserved: 0,
        file_size,
        metadata: info.metadata,
        colr_offset: (info.version == XbinVersion::V4).then_some(file_size),
    };

    let trailer = info.trailer();
    let mut out = Cursor::new(Vec::with_capacity(file_size as usize + trailer.len()));
    header.write_options(&mut out, info.endian.into(), ())?;
    out.write_all(payload)?;
    out.write_all(&trailer)?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::types::{Endian, XbinInfo, XbinVersion};
    use crate::write::wrap;

    #[traced_test]
    #[test]
    fn wrap_big_endian_v2() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            b'X', b'B', b'I', b'N', 0x12, 0x34, 0x02, 0x00,
            0x00, 0x00, 0x00, 0x13,
            0x00, 0x00, 0xFD, 0xE9,
            // Payload
            0x0A, 0x0B, 0x0C,
        ];

        let actual = wrap(&[0x0A, 0x0B, 0x0C], &XbinInfo::new(Endian::Big, XbinVersion::V2))?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn wrap_little_endian_v4_appends_template() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            b'X', b'B', b'I', b'N', 0x34, 0x12, 0x04, 0x00,
            0x15, 0x00, 0x00, 0x00,
            0xA4, 0x03, 0x00, 0x00,
            0x15, 0x00, 0x00, 0x00,
            // Payload
            0xFF,
            // Trailer
            b'R', b'L', b'O', b'C', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let info = XbinInfo::builder()
            .endian(Endian::Little)
            .version(XbinVersion::V4)
            .metadata(0x3A4)
            .build();

        let actual = wrap(&[0xFF], &info)?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn wrap_replays_captured_trailer() -> Result<()> {
        let info = XbinInfo::builder()
            .endian(Endian::Big)
            .trailer(b"COLR\0\0\0\0\0\0\0\0".to_vec())
            .build();

        let actual = wrap(&[], &info)?;
        assert_eq!(actual.len(), 0x10 + 12);
        assert_eq!(&actual[0x10..0x14], b"COLR");

        Ok(())
    }
}
