//! Textual container configuration, as printed when unpacking and required when packing.

use std::{fmt, str::FromStr};

use crate::{
    error::{Error, Result},
    types::{Endian, XbinInfo, XbinVersion},
};

/// A `version,endianness,metadata` triple such as `2,big,0xfde9`.
///
/// This is all that is needed to recreate a container around an extracted payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct XbinConfig {
    pub version: XbinVersion,
    pub endian: Endian,
    pub metadata: u32,
}

impl XbinConfig {
    /// Container info using the template trailing block
    pub fn into_info(self) -> XbinInfo {
        XbinInfo::builder()
            .endian(self.endian)
            .version(self.version)
            .metadata(self.metadata)
            .build()
    }
}

impl From<&XbinInfo> for XbinConfig {
    fn from(info: &XbinInfo) -> Self {
        Self {
            version: info.version,
            endian: info.endian,
            metadata: info.metadata,
        }
    }
}

impl fmt::Display for XbinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{:#x}", self.version, self.endian, self.metadata)
    }
}

impl FromStr for XbinConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        let [version, endian, metadata] = parts.as_slice() else {
            return Err(Error::InvalidConfig(format!(
                "{s:?} must be a comma-separated triple \"version,endianness,metadata\""
            )));
        };

        Ok(Self {
            version: version.trim().parse()?,
            endian: endian.trim().to_lowercase().parse()?,
            metadata: parse_int(metadata.trim())?,
        })
    }
}

/// Parse an integer written either in decimal or with a `0x` prefix.
pub fn parse_int(value: &str) -> Result<u32> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };

    parsed.map_err(|_| Error::InvalidConfig(format!("{value:?} is not an integer")))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::config::{parse_int, XbinConfig};
    use crate::error::Result;
    use crate::types::{Endian, XbinVersion};

    #[test]
    fn parse_config() -> Result<()> {
        let config: XbinConfig = "4,Little,0xfde9".parse()?;
        assert_eq!(
            config,
            XbinConfig {
                version: XbinVersion::V4,
                endian: Endian::Little,
                metadata: 0xFDE9,
            }
        );

        Ok(())
    }

    #[test]
    fn display_config() {
        let config = XbinConfig {
            version: XbinVersion::V2,
            endian: Endian::Big,
            metadata: 0x3A4,
        };
        assert_eq!(config.to_string(), "2,big,0x3a4");
    }

    #[test]
    fn reject_bad_configs() {
        assert!("2,big".parse::<XbinConfig>().is_err());
        assert!("3,big,0".parse::<XbinConfig>().is_err());
        assert!("2,middle,0".parse::<XbinConfig>().is_err());
        assert!("2,big,zero".parse::<XbinConfig>().is_err());
    }

    #[test]
    fn parse_int_radix() -> Result<()> {
        assert_eq!(parse_int("65001")?, 0xFDE9);
        assert_eq!(parse_int("0xFDE9")?, 0xFDE9);
        Ok(())
    }
}
