//! File set construction.
//!
//! Unions the manifest and blob paths of one or more models into a
//! duplicate-free, insertion-ordered list of root-relative paths, the
//! single input every exporter consumes.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::digest::Digest;
use crate::error::{ExportError, Result};
use crate::manifest::ModelManifest;
use crate::reference::ModelReference;
use crate::store::ModelStore;

/// An ordered, duplicate-free list of storage-root-relative file paths.
///
/// Contains one manifest path per requested model plus one blob path per
/// distinct referenced digest. Built fresh per invocation, never
/// persisted. Building twice from an unchanged store yields an identical
/// list.
#[derive(Debug, Clone)]
pub struct FileSet {
    files: Vec<PathBuf>,
}

impl FileSet {
    /// Build the file set for the given references, in input order.
    ///
    /// Every digest referenced by a manifest must have a blob file under
    /// the root; a missing blob aborts the build with `BlobNotFound`
    /// rather than producing a partial list, since a silently incomplete
    /// export would fail much later inside the model-serving software.
    pub fn build(store: &ModelStore, references: &[ModelReference]) -> Result<Self> {
        let mut files = Vec::new();
        let mut seen_manifests: HashSet<PathBuf> = HashSet::new();
        let mut seen_digests: HashSet<Digest> = HashSet::new();

        for reference in references {
            let location = store.resolve(reference)?;
            if seen_manifests.insert(location.relative_path.clone()) {
                files.push(location.relative_path.clone());
            }

            let manifest = ModelManifest::read(&location.absolute_path)?;
            for digest in manifest.digests() {
                if seen_digests.contains(digest) {
                    continue;
                }
                let relative_path = ModelStore::blob_rel_path(digest);
                let absolute_path = store.root().join(&relative_path);
                if !absolute_path.is_file() {
                    return Err(ExportError::BlobNotFound {
                        digest: digest.to_string(),
                        reference: reference.to_string(),
                        path: absolute_path,
                    });
                }
                seen_digests.insert(digest.clone());
                files.push(relative_path);
            }
        }

        tracing::debug!(files = files.len(), "built export file set");
        Ok(Self { files })
    }

    /// The root-relative paths, in insertion order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Seed a model whose manifest references the given blob digests
    /// (first entry becomes the config, the rest layers).
    fn seed_model(root: &Path, name: &str, tag: &str, hexes: &[&str]) {
        let manifest_path = root.join(ModelStore::manifest_rel_path(name, tag));
        fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();

        let (config_hex, layer_hexes) = hexes.split_first().unwrap();
        let layers: Vec<String> = layer_hexes
            .iter()
            .map(|h| format!(r#"{{ "digest": "sha256:{h}", "size": 10 }}"#))
            .collect();
        let manifest = format!(
            r#"{{ "config": {{ "digest": "sha256:{config_hex}", "size": 4 }}, "layers": [ {} ] }}"#,
            layers.join(", ")
        );
        fs::write(&manifest_path, manifest).unwrap();

        fs::create_dir_all(root.join("blobs")).unwrap();
        for hex in hexes {
            fs::write(root.join("blobs").join(format!("sha256-{hex}")), hex).unwrap();
        }
    }

    fn refs(inputs: &[&str]) -> Vec<ModelReference> {
        inputs.iter().map(|s| ModelReference::parse(s)).collect()
    }

    #[test]
    fn test_build_single_model() {
        let tmp = TempDir::new().unwrap();
        seed_model(tmp.path(), "qwen3", "0.6b", &["aa", "bb", "cc"]);

        let store = ModelStore::new(tmp.path());
        let set = FileSet::build(&store, &refs(&["qwen3:0.6b"])).unwrap();

        assert_eq!(
            set.paths(),
            &[
                PathBuf::from("manifests/registry.ollama.ai/library/qwen3/0.6b"),
                PathBuf::from("blobs/sha256-aa"),
                PathBuf::from("blobs/sha256-bb"),
                PathBuf::from("blobs/sha256-cc"),
            ]
        );
    }

    #[test]
    fn test_build_five_layer_manifest_yields_six_paths() {
        let tmp = TempDir::new().unwrap();
        let hexes = ["a1", "a2", "a3", "a4", "a5"];

        let manifest_path = tmp
            .path()
            .join(ModelStore::manifest_rel_path("qwen3", "0.6b"));
        fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        let layers: Vec<String> = hexes
            .iter()
            .map(|h| format!(r#"{{ "digest": "sha256:{h}" }}"#))
            .collect();
        fs::write(
            &manifest_path,
            format!(r#"{{ "layers": [ {} ] }}"#, layers.join(", ")),
        )
        .unwrap();
        fs::create_dir_all(tmp.path().join("blobs")).unwrap();
        for hex in &hexes {
            fs::write(tmp.path().join("blobs").join(format!("sha256-{hex}")), hex).unwrap();
        }

        let store = ModelStore::new(tmp.path());
        let set = FileSet::build(&store, &refs(&["qwen3:0.6b"])).unwrap();

        // 1 manifest + 5 distinct blobs, in manifest order
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_build_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        seed_model(tmp.path(), "qwen3", "0.6b", &["aa", "bb"]);
        seed_model(tmp.path(), "phi4", "latest", &["dd", "ee"]);

        let store = ModelStore::new(tmp.path());
        let references = refs(&["qwen3:0.6b", "phi4"]);
        let first = FileSet::build(&store, &references).unwrap();
        let second = FileSet::build(&store, &references).unwrap();

        assert_eq!(first.paths(), second.paths());
    }

    #[test]
    fn test_build_dedups_shared_blob() {
        let tmp = TempDir::new().unwrap();
        // Both models share the "cc" blob (a common template layer)
        seed_model(tmp.path(), "qwen3", "0.6b", &["aa", "cc"]);
        seed_model(tmp.path(), "qwen3", "1.7b", &["bb", "cc"]);

        let store = ModelStore::new(tmp.path());
        let set = FileSet::build(&store, &refs(&["qwen3:0.6b", "qwen3:1.7b"])).unwrap();

        let shared = set
            .paths()
            .iter()
            .filter(|p| p.ends_with("sha256-cc"))
            .count();
        assert_eq!(shared, 1);
        // 2 manifests + 3 distinct blobs
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_build_dedups_repeated_reference() {
        let tmp = TempDir::new().unwrap();
        seed_model(tmp.path(), "qwen3", "0.6b", &["aa", "bb"]);

        let store = ModelStore::new(tmp.path());
        let set = FileSet::build(&store, &refs(&["qwen3:0.6b", "qwen3:0.6b"])).unwrap();

        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_build_missing_blob_fails() {
        let tmp = TempDir::new().unwrap();
        seed_model(tmp.path(), "qwen3", "0.6b", &["aa", "bb"]);
        fs::remove_file(tmp.path().join("blobs/sha256-bb")).unwrap();

        let store = ModelStore::new(tmp.path());
        let err = FileSet::build(&store, &refs(&["qwen3:0.6b"])).unwrap_err();

        match err {
            ExportError::BlobNotFound {
                digest, reference, ..
            } => {
                assert_eq!(digest, "sha256:bb");
                assert_eq!(reference, "qwen3:0.6b");
            }
            other => panic!("expected BlobNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_build_missing_manifest_fails() {
        let tmp = TempDir::new().unwrap();
        let store = ModelStore::new(tmp.path());
        let err = FileSet::build(&store, &refs(&["absent:latest"])).unwrap_err();
        assert!(matches!(err, ExportError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_build_via_explicit_manifest_path() {
        let tmp = TempDir::new().unwrap();
        seed_model(tmp.path(), "qwen3", "0.6b", &["aa", "bb"]);
        let manifest_path = tmp
            .path()
            .join("manifests/registry.ollama.ai/library/qwen3/0.6b");

        let store = ModelStore::new(tmp.path());
        let set =
            FileSet::build(&store, &[ModelReference::Manifest(manifest_path)]).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(
            set.paths()[0],
            PathBuf::from("manifests/registry.ollama.ai/library/qwen3/0.6b")
        );
    }
}
