//! `ollama-export zip` command — stream model files into a stored zip archive.

use clap::Args;

use ollama_export_core::{ArchiveFormat, FileSet};

use super::{write_archive_to, StoreArgs};

#[derive(Args)]
pub struct ZipArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Archive to write; use '-' to stream to standard output
    #[arg(long, value_name = "PATH")]
    pub archive: String,
}

pub fn execute(args: ZipArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.store();
    let file_set = FileSet::build(&store, &args.store.references())?;

    write_archive_to(ArchiveFormat::Zip, &file_set, &store, &args.archive)
}
