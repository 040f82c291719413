//! `ollama-export show` command — summarize one or more models.

use clap::Args;

use ollama_export_core::ModelManifest;

use crate::output;

use super::StoreArgs;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.store.store();

    let mut table = output::new_table(&["MODEL", "MANIFEST", "BLOBS", "SIZE"]);
    for reference in args.store.references() {
        let location = store.resolve(&reference)?;
        let manifest = ModelManifest::read(&location.absolute_path)?;

        table.add_row(&[
            &reference.to_string(),
            &location.relative_path.display().to_string(),
            &manifest.digests().count().to_string(),
            &output::format_bytes(manifest.total_size()),
        ]);
    }

    println!("{table}");
    Ok(())
}
