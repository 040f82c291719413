//! `ollama-export list` command — print the files of one or more models.

use clap::Args;

use ollama_export_core::{write_listing, FileSet};

use super::StoreArgs;

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.store();
    let file_set = FileSet::build(&store, &args.store.references())?;

    let stdout = std::io::stdout();
    write_listing(&file_set, stdout.lock())?;
    Ok(())
}
