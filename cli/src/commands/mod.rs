//! CLI command definitions and dispatch.

mod copy;
mod list;
mod show;
mod tar;
mod zip;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use ollama_export_core::{write_archive, ArchiveFormat, FileSet, ModelReference, ModelStore};

/// ollama-export: export locally stored Ollama models.
#[derive(Parser)]
#[command(name = "ollama-export", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the files that make up one or more models
    List(list::ListArgs),
    /// Copy model files into a destination directory
    Copy(copy::CopyArgs),
    /// Write model files to a tar archive
    Tar(tar::TarArgs),
    /// Write model files to an uncompressed zip archive
    Zip(zip::ZipArgs),
    /// Show a summary of one or more models
    Show(show::ShowArgs),
}

/// Arguments shared by every command: the models directory and the
/// model references to operate on.
#[derive(Args)]
pub struct StoreArgs {
    /// Directory where Ollama stores its models (default: $OLLAMA_MODELS
    /// or the platform default)
    #[arg(long, value_name = "DIRECTORY")]
    pub models_dir: Option<PathBuf>,

    /// Model names (name[:tag]) or paths to manifest files
    #[arg(required = true, value_name = "MODEL")]
    pub models: Vec<String>,
}

impl StoreArgs {
    /// The model store to resolve against.
    pub fn store(&self) -> ModelStore {
        let root = self
            .models_dir
            .clone()
            .unwrap_or_else(default_models_dir);
        ModelStore::new(root)
    }

    /// The parsed model references, in input order.
    pub fn references(&self) -> Vec<ModelReference> {
        self.models
            .iter()
            .map(|m| ModelReference::parse(m))
            .collect()
    }
}

/// Return the models directory: the `OLLAMA_MODELS` environment
/// variable when set, otherwise the platform default used by Ollama
/// itself (`~/.ollama/models` on macOS and Windows, the system-wide
/// service directory on Linux).
pub(crate) fn default_models_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("OLLAMA_MODELS") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if cfg!(any(target_os = "macos", target_os = "windows")) {
        dirs::home_dir()
            .map(|h| h.join(".ollama"))
            .unwrap_or_else(|| PathBuf::from(".ollama"))
            .join("models")
    } else {
        PathBuf::from("/usr/share/ollama/.ollama/models")
    }
}

/// Write an archive to a file path, or to standard output when the
/// destination is `-` (for piping into a remote-copy tool).
pub(crate) fn write_archive_to(
    format: ArchiveFormat,
    file_set: &FileSet,
    store: &ModelStore,
    destination: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if destination == "-" {
        let stdout = std::io::stdout();
        write_archive(format, file_set, store, stdout.lock())?;
    } else {
        let file = File::create(destination)
            .map_err(|e| format!("Failed to create {destination}: {e}"))?;
        write_archive(format, file_set, store, BufWriter::new(file))?;
    }
    tracing::debug!(?format, destination, files = file_set.len(), "wrote archive");
    Ok(())
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::List(args) => list::execute(args),
        Command::Copy(args) => copy::execute(args),
        Command::Tar(args) => tar::execute(args),
        Command::Zip(args) => zip::execute(args),
        Command::Show(args) => show::execute(args),
    }
}
