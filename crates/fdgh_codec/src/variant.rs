//! Layout choices that vary between FDGH files and are kept as root attributes.

use std::{fmt, str::FromStr};

use bon::Builder;
use fdgh_xbin::{config::parse_int, types::DEFAULT_METADATA, Endian, XbinInfo, XbinVersion};

use crate::{
    document::Element,
    error::{Error, Result},
};

/// Terminator count used by every known game
pub const DEFAULT_TERMINATORS: u32 = 4;

pub const ATTR_ENDIAN: &str = "endian";
pub const ATTR_XBIN_VERSION: &str = "xbin_version";
pub const ATTR_TERMINATORS: &str = "num_string_null_terminators";
pub const ATTR_HASHES: &str = "asset_name_hashes";
pub const ATTR_METADATA: &str = "xbin_metadata";
pub const ATTR_TRAILER: &str = "xbin_trailer";

/// Hash stored next to every asset record offset
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AssetNameHash {
    /// 64-bit FNV-1a of the Latin-1 name bytes
    Fnv1a64,
}

impl AssetNameHash {
    pub const fn name(self) -> &'static str {
        match self {
            AssetNameHash::Fnv1a64 => "fnv1a_64",
        }
    }

    /// Size of one asset record: the string offset plus the hash
    pub const fn record_size(hash: Option<Self>) -> usize {
        match hash {
            None => 4,
            Some(AssetNameHash::Fnv1a64) => 12,
        }
    }
}

impl fmt::Display for AssetNameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetNameHash {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "fnv1a_64" => Ok(AssetNameHash::Fnv1a64),
            other => Err(format!("unknown asset name hash {other:?} (expected \"fnv1a_64\")")),
        }
    }
}

/// The format variant of one file
#[derive(Debug, Copy, Clone, PartialEq, Eq, Builder)]
pub struct FormatVariant {
    #[builder(default)]
    pub endian: Endian,

    #[builder(default)]
    pub xbin_version: XbinVersion,

    /// Zero bytes written after the text of every string
    #[builder(default = DEFAULT_TERMINATORS)]
    pub num_string_null_terminators: u32,

    pub asset_name_hashes: Option<AssetNameHash>,
}

impl Default for FormatVariant {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FormatVariant {
    /// Offset added to every payload position stored in the file
    pub const fn base_offset(&self) -> u32 {
        self.xbin_version.header_size()
    }

    /// Record this variant and the container details on the root element.
    ///
    /// Attributes that hold their default value are left out, except for the three that every
    /// document carries.
    pub fn write_root(&self, xbin: &XbinInfo, root: &mut Element) {
        root.set_attr(ATTR_ENDIAN, self.endian.name());
        root.set_attr(ATTR_XBIN_VERSION, self.xbin_version.to_string());
        root.set_attr(ATTR_TERMINATORS, self.num_string_null_terminators.to_string());
        if let Some(hash) = self.asset_name_hashes {
            root.set_attr(ATTR_HASHES, hash.name());
        }
        if xbin.metadata != DEFAULT_METADATA {
            root.set_attr(ATTR_METADATA, format!("{:#x}", xbin.metadata));
        }
        if let Some(trailer) = &xbin.trailer {
            root.set_attr(ATTR_TRAILER, to_hex(trailer));
        }
    }

    /// Read the variant and container details from the root element, defaulting absent
    /// attributes.
    pub fn read_root(root: &Element) -> Result<(Self, XbinInfo)> {
        let path = |key: &str| format!("/{}/@{key}", root.name);

        let endian = match root.attr(ATTR_ENDIAN) {
            Some(value) => value.trim().parse().map_err(|_| {
                Error::invalid(
                    path(ATTR_ENDIAN),
                    format!("expected \"big\" or \"little\", found {value:?}"),
                )
            })?,
            None => Endian::default(),
        };

        let xbin_version = match root.attr(ATTR_XBIN_VERSION) {
            Some(value) => value.trim().parse().map_err(|_| {
                Error::invalid(
                    path(ATTR_XBIN_VERSION),
                    format!("expected 2 or 4, found {value:?}"),
                )
            })?,
            None => XbinVersion::default(),
        };

        let num_string_null_terminators = match root.attr(ATTR_TERMINATORS) {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|&count| count > 0)
                .ok_or_else(|| {
                    Error::invalid(
                        path(ATTR_TERMINATORS),
                        format!("expected a positive count, found {value:?}"),
                    )
                })?,
            None => DEFAULT_TERMINATORS,
        };

        let asset_name_hashes = root
            .attr(ATTR_HASHES)
            .map(|value| value.trim().parse::<AssetNameHash>())
            .transpose()
            .map_err(|reason| Error::invalid(path(ATTR_HASHES), reason))?;

        let metadata = match root.attr(ATTR_METADATA) {
            Some(value) => parse_int(value.trim())
                .map_err(|e| Error::invalid(path(ATTR_METADATA), e.to_string()))?,
            None => DEFAULT_METADATA,
        };

        let trailer = root
            .attr(ATTR_TRAILER)
            .map(from_hex)
            .transpose()
            .map_err(|reason| Error::invalid(path(ATTR_TRAILER), reason))?;

        let variant = Self {
            endian,
            xbin_version,
            num_string_null_terminators,
            asset_name_hashes,
        };
        let xbin = XbinInfo {
            endian,
            version: xbin_version,
            metadata,
            trailer,
        };

        Ok((variant, xbin))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(text: &str) -> std::result::Result<Vec<u8>, String> {
    let text = text.trim();
    if text.len() % 2 != 0 || !text.is_ascii() {
        return Err(format!("{text:?} is not an even number of hex digits"));
    }

    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .map_err(|_| format!("{:?} is not a hex byte", &text[i..i + 2]))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use fdgh_xbin::{Endian, XbinInfo, XbinVersion};
    use pretty_assertions::assert_eq;

    use crate::document::Element;
    use crate::error::{Error, Result};
    use crate::variant::{from_hex, to_hex, AssetNameHash, FormatVariant};

    #[test]
    fn defaults() {
        let variant = FormatVariant::default();
        assert_eq!(variant.endian, Endian::Big);
        assert_eq!(variant.xbin_version, XbinVersion::V2);
        assert_eq!(variant.num_string_null_terminators, 4);
        assert_eq!(variant.asset_name_hashes, None);
        assert_eq!(variant.base_offset(), 0x10);
    }

    #[test]
    fn minimal_root_attributes() {
        let variant = FormatVariant::builder().endian(Endian::Little).build();
        let mut root = Element::new("fdgh");
        variant.write_root(&XbinInfo::new(Endian::Little, XbinVersion::V2), &mut root);

        let attrs: Vec<(&str, &str)> = root
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            attrs,
            [
                ("endian", "little"),
                ("xbin_version", "2"),
                ("num_string_null_terminators", "4"),
            ]
        );
    }

    #[test]
    fn full_root_attributes_read_back() -> Result<()> {
        let variant = FormatVariant::builder()
            .xbin_version(XbinVersion::V4)
            .num_string_null_terminators(1)
            .asset_name_hashes(AssetNameHash::Fnv1a64)
            .build();
        let xbin = XbinInfo::builder()
            .endian(Endian::Big)
            .version(XbinVersion::V4)
            .metadata(0x3A4)
            .trailer(vec![0xAB, 0x01])
            .build();

        let mut root = Element::new("fdgh");
        variant.write_root(&xbin, &mut root);
        assert_eq!(root.attr("xbin_metadata"), Some("0x3a4"));
        assert_eq!(root.attr("xbin_trailer"), Some("ab01"));

        assert_eq!(FormatVariant::read_root(&root)?, (variant, xbin));
        Ok(())
    }

    #[test]
    fn absent_attributes_default() -> Result<()> {
        let (variant, xbin) = FormatVariant::read_root(&Element::new("fdgh"))?;
        assert_eq!(variant, FormatVariant::default());
        assert_eq!(xbin, XbinInfo::new(Endian::Big, XbinVersion::V2));
        Ok(())
    }

    #[test]
    fn attributes_are_trimmed() -> Result<()> {
        let root = Element::new("fdgh")
            .with_attr("endian", " little ")
            .with_attr("xbin_version", "4 ")
            .with_attr("num_string_null_terminators", " 1")
            .with_attr("asset_name_hashes", " fnv1a_64 ")
            .with_attr("xbin_metadata", " 0x3a4 ");

        let (variant, xbin) = FormatVariant::read_root(&root)?;
        assert_eq!(variant.endian, Endian::Little);
        assert_eq!(variant.xbin_version, XbinVersion::V4);
        assert_eq!(variant.num_string_null_terminators, 1);
        assert_eq!(variant.asset_name_hashes, Some(AssetNameHash::Fnv1a64));
        assert_eq!(xbin.metadata, 0x3A4);
        Ok(())
    }

    #[test]
    fn reject_bad_attributes() {
        for (key, value) in [
            ("endian", "middle"),
            ("xbin_version", "3"),
            ("num_string_null_terminators", "0"),
            ("num_string_null_terminators", "four"),
            ("asset_name_hashes", "crc32"),
            ("xbin_metadata", "lots"),
            ("xbin_trailer", "abc"),
        ] {
            let root = Element::new("fdgh").with_attr(key, value);
            match FormatVariant::read_root(&root) {
                Err(Error::InvalidDocument { path, .. }) => {
                    assert_eq!(path, format!("/fdgh/@{key}"))
                }
                other => panic!("{key}={value:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(to_hex(b"COLR\0"), "434f4c5200");
        assert_eq!(from_hex("434F4c5200"), Ok(b"COLR\0".to_vec()));
        assert!(from_hex("zz").is_err());
    }
}
