use std::path::PathBuf;

use clap::Args;
use fdgh_codec::{decode_to_document, document_to_text, encode_from_document, text_to_document};
use miette::{Context, Result};
use tracing::info;

use crate::commands::{has_extension, output_path, read_input, utf8, write_output};

#[derive(Args)]
pub struct ConvertArgs {
    /// An input file: `.xml` files are encoded, anything else is decoded
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Where to write the result, next to the input by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting a derived output path
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;

        if has_extension(&self.file, "xml") {
            info!("converting {} to fdgh", self.file.display());
            let text = utf8(data, &self.file)?;
            let document =
                text_to_document(&text).context(format!("parsing {}", self.file.display()))?;
            let binary = encode_from_document(&document)
                .context(format!("encoding {}", self.file.display()))?;

            let (path, overwrite) =
                output_path(&self.file, self.output.as_deref(), "dat", self.overwrite);
            write_output(&path, &binary, overwrite)
        } else {
            info!("converting {} to xml", self.file.display());
            let document = decode_to_document(&data)
                .context(format!("decoding {}", self.file.display()))?;
            let text = document_to_text(&document)?;

            let (path, overwrite) =
                output_path(&self.file, self.output.as_deref(), "xml", self.overwrite);
            write_output(&path, text.as_bytes(), overwrite)
        }
    }
}
