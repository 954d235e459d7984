use std::path::PathBuf;

use clap::{Args, Subcommand};
use fdgh_xbin::{probe, wrap, XbinConfig};
use miette::{Context, Result};
use tracing::info;

use crate::commands::{output_path, read_input, write_output};

#[derive(Subcommand)]
pub enum XbinCommands {
    /// Extract the payload of an XBIN container
    #[command(alias = "extract")]
    Unpack(UnpackArgs),
    /// Wrap a payload into an XBIN container
    Pack(PackArgs),
}

impl XbinCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            XbinCommands::Unpack(unpack) => unpack.handle(),
            XbinCommands::Pack(pack) => pack.handle(),
        }
    }
}

#[derive(Args)]
pub struct UnpackArgs {
    /// An input XBIN file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Where to write the payload, `<FILE>.unpacked.bin` by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting a derived output path
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        let (info, payload) = probe(&data).context(format!("unpacking {}", self.file.display()))?;

        info!(
            "configuration string for this xbin: {}",
            XbinConfig::from(&info)
        );
        if let Some(trailer) = &info.trailer {
            info!(len = trailer.len(), "trailing block is not kept in the payload");
        }

        let (path, overwrite) =
            output_path(&self.file, self.output.as_deref(), "unpacked.bin", self.overwrite);
        write_output(&path, payload, overwrite)
    }
}

#[derive(Args)]
pub struct PackArgs {
    /// A raw payload
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// The container configuration as `version,endianness,metadata`, e.g. `2,big,0xfde9`.
    /// `xbin unpack` prints it for an existing file.
    #[arg(value_name = "CONFIG")]
    config: XbinConfig,

    /// Where to write the container, `<FILE>.packed.bin` by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting a derived output path
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let payload = read_input(&self.file)?;
        info!("packing {} as {}", self.file.display(), self.config);

        let data = wrap(&payload, &self.config.into_info())?;

        let (path, overwrite) =
            output_path(&self.file, self.output.as_deref(), "packed.bin", self.overwrite);
        write_output(&path, &data, overwrite)
    }
}
