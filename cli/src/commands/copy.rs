//! `ollama-export copy` command — replicate model files under a directory.

use std::path::PathBuf;

use clap::Args;

use ollama_export_core::{copy_files, FileSet};

use crate::output;

use super::StoreArgs;

#[derive(Args)]
pub struct CopyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Directory to copy the files into; created if it does not exist
    #[arg(long, value_name = "DIRECTORY")]
    pub to: PathBuf,
}

pub fn execute(args: CopyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.store();
    let file_set = FileSet::build(&store, &args.store.references())?;

    let bytes = copy_files(&file_set, &store, &args.to)?;

    println!(
        "Copied {} files ({}) to {}",
        file_set.len(),
        output::format_bytes(bytes),
        args.to.display()
    );
    Ok(())
}
