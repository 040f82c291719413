//! Content digest parsing and formatting.
//!
//! A digest appears in two textual forms: `sha256:<hex>` inside manifest
//! JSON, and `sha256-<hex>` as the blob filename on disk. Both carry the
//! same information and round-trip losslessly.

use serde::Deserialize;

use crate::error::{ExportError, Result};

/// A content digest: hash algorithm plus lowercase hex value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Digest {
    /// Hash algorithm identifier (e.g., "sha256")
    pub algorithm: String,
    /// Lowercase hexadecimal hash value
    pub hex: String,
}

impl Digest {
    /// Parse the manifest JSON form, `<algorithm>:<hex>`.
    pub fn parse_colon_form(text: &str) -> Result<Self> {
        Self::parse(text, ':')
    }

    /// Parse the blob filename form, `<algorithm>-<hex>`.
    pub fn parse_dash_form(text: &str) -> Result<Self> {
        Self::parse(text, '-')
    }

    fn parse(text: &str, separator: char) -> Result<Self> {
        let malformed = || ExportError::MalformedDigest {
            text: text.to_string(),
            separator,
        };

        let (algorithm, hex) = text.split_once(separator).ok_or_else(malformed)?;

        if algorithm.is_empty() || !algorithm.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(malformed());
        }
        if hex.is_empty()
            || !hex
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        {
            return Err(malformed());
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            hex: hex.to_string(),
        })
    }

    /// Format as the manifest JSON form, `<algorithm>:<hex>`.
    pub fn to_manifest_form(&self) -> String {
        format!("{}:{}", self.algorithm, self.hex)
    }

    /// Format as the on-disk blob filename, `<algorithm>-<hex>`.
    pub fn to_blob_filename(&self) -> String {
        format!("{}-{}", self.algorithm, self.hex)
    }
}

impl TryFrom<String> for Digest {
    type Error = ExportError;

    fn try_from(text: String) -> Result<Self> {
        Self::parse_colon_form(&text)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}
