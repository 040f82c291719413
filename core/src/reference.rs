//! Model reference parsing.
//!
//! Parses references like `qwen3:0.6b` into name and tag components, or
//! recognizes explicit paths to manifest files.

use std::path::PathBuf;

/// Default tag when none is specified.
const DEFAULT_TAG: &str = "latest";

/// A reference to a locally stored model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReference {
    /// A `name:tag` pair resolved against the storage layout
    Named {
        /// Model name (e.g., "qwen3")
        name: String,
        /// Tag (e.g., "0.6b", defaults to "latest")
        tag: String,
    },
    /// An explicit filesystem path to a manifest file
    Manifest(PathBuf),
}

impl ModelReference {
    /// Parse a reference string.
    ///
    /// A reference containing a path separator is taken as an explicit
    /// manifest path. Anything else is `name[:tag]`: the string is split
    /// on the *last* `:` (tags cannot contain `:`, names can), and the
    /// tag defaults to `latest` when absent or empty.
    ///
    /// Supported forms:
    /// - `qwen3` → name `qwen3`, tag `latest`
    /// - `qwen3:0.6b` → name `qwen3`, tag `0.6b`
    /// - `a:b:c` → name `a:b`, tag `c`
    /// - `./manifests/qwen3/0.6b` → manifest path
    pub fn parse(reference: &str) -> Self {
        if reference.contains('/') || reference.contains(std::path::MAIN_SEPARATOR) {
            return Self::Manifest(PathBuf::from(reference));
        }

        match reference.rsplit_once(':') {
            Some((name, tag)) if !tag.is_empty() => Self::Named {
                name: name.to_string(),
                tag: tag.to_string(),
            },
            Some((name, _)) => Self::Named {
                name: name.to_string(),
                tag: DEFAULT_TAG.to_string(),
            },
            None => Self::Named {
                name: reference.to_string(),
                tag: DEFAULT_TAG.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ModelReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named { name, tag } => write!(f, "{name}:{tag}"),
            Self::Manifest(path) => write!(f, "{}", path.display()),
        }
    }
}
