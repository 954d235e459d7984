pub mod convert;
pub mod xbin;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::info;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Convert an FDGH file to XML, or an XML file back to FDGH
    Convert(convert::ConvertArgs),
    /// Handle raw XBIN containers
    Xbin {
        #[command(subcommand)]
        command: xbin::XbinCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Convert(convert) => convert.handle(),
            Commands::Xbin { command } => command.handle(),
        }
    }
}

/// The explicit output path, or the input path with its extension replaced.
///
/// Explicit paths are always overwritten; derived ones only with `overwrite`.
pub(crate) fn output_path(
    input: &Path,
    output: Option<&Path>,
    extension: &str,
    overwrite: bool,
) -> (PathBuf, bool) {
    match output {
        Some(path) => (path.to_path_buf(), true),
        None => (input.with_extension(extension), overwrite),
    }
}

pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .context(format!("reading {}", path.display()))
}

pub(crate) fn write_output(path: &Path, data: &[u8], overwrite: bool) -> Result<()> {
    info!("writing {}", path.display());

    let mut out = if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {} (pass --overwrite to replace it)", path.display()))?
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))?
    };

    out.write_all(data)
        .into_diagnostic()
        .context(format!("writing {}", path.display()))
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

pub(crate) fn utf8(data: Vec<u8>, path: &Path) -> Result<String> {
    String::from_utf8(data).map_err(|e| miette!("{} is not UTF-8 text: {e}", path.display()))
}
