//! Version → source location table
//!
//! Each version lists two archives: `serd` (the library) and `autowaf` (the
//! waf helper scripts serd ships with its own modifications).
//!
//! ```toml
//! [sources."0.30.16".serd]
//! url = "https://download.drobilla.net/serd-0.30.16.tar.xz"
//! sha256 = "..."
//!
//! [sources."0.30.16".autowaf]
//! url = ["https://mirror-a/autowaf.tar.gz", "https://mirror-b/autowaf.tar.gz"]
//! sha256 = "..."
//! ```

use crate::core::error::RecipeError;
use crate::helpers::acquire::{HashAlgorithm, Integrity};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the library source entry
pub const SERD_SOURCE: &str = "serd";
/// Name of the waf helper-scripts entry
pub const AUTOWAF_SOURCE: &str = "autowaf";

/// One or several mirror URLs
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Urls {
    One(String),
    Many(Vec<String>),
}

impl Urls {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(url) => std::slice::from_ref(url),
            Self::Many(urls) => urls,
        }
    }
}

/// Archive location plus integrity descriptor
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub url: Urls,
    pub sha256: Option<String>,
    pub sha512: Option<String>,
    pub blake3: Option<String>,
}

impl SourceEntry {
    /// Integrity descriptor, strongest first.
    pub fn integrity(&self) -> Option<Integrity> {
        if let Some(h) = &self.sha512 {
            Some(Integrity::new(HashAlgorithm::Sha512, h))
        } else if let Some(h) = &self.sha256 {
            Some(Integrity::new(HashAlgorithm::Sha256, h))
        } else {
            self.blake3
                .as_ref()
                .map(|h| Integrity::new(HashAlgorithm::Blake3, h))
        }
    }

    pub fn urls(&self) -> &[String] {
        self.url.as_slice()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SourcesToml {
    #[serde(default)]
    sources: BTreeMap<String, BTreeMap<String, SourceEntry>>,
}

/// Source table keyed by version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    versions: BTreeMap<String, BTreeMap<String, SourceEntry>>,
}

impl SourceTable {
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecipeError::Config(format!("cannot read source table {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| RecipeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, RecipeError> {
        let parsed: SourcesToml = toml::from_str(content)
            .map_err(|e| RecipeError::Config(format!("invalid source table: {}", e)))?;
        for (version, entries) in &parsed.sources {
            for (name, entry) in entries {
                if entry.urls().is_empty() {
                    return Err(RecipeError::Config(format!(
                        "source '{}' for version {} has no url",
                        name, version
                    )));
                }
            }
        }
        Ok(Self {
            versions: parsed.sources,
        })
    }

    /// Look up a named archive for a version.
    pub fn entry(&self, version: &str, name: &str) -> Result<&SourceEntry, RecipeError> {
        let entries = self
            .versions
            .get(version)
            .ok_or_else(|| RecipeError::UnsupportedVersion(version.to_string()))?;
        entries.get(name).ok_or_else(|| RecipeError::MissingSource {
            version: version.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
[sources."0.30.16".serd]
url = "https://example.com/serd-0.30.16.tar.xz"
sha256 = "aa"

[sources."0.30.16".autowaf]
url = ["https://a.example.com/autowaf.tar.gz", "https://b.example.com/autowaf.tar.gz"]
blake3 = "bb"
"#;

    #[test]
    fn test_parse_single_and_mirror_urls() {
        let table = SourceTable::parse(TABLE).unwrap();
        let serd = table.entry("0.30.16", SERD_SOURCE).unwrap();
        assert_eq!(serd.urls(), ["https://example.com/serd-0.30.16.tar.xz"]);

        let autowaf = table.entry("0.30.16", AUTOWAF_SOURCE).unwrap();
        assert_eq!(autowaf.urls().len(), 2);
        assert_eq!(autowaf.integrity().unwrap().algorithm.name(), "BLAKE3");
    }

    #[test]
    fn test_unknown_version_is_unsupported() {
        let table = SourceTable::parse(TABLE).unwrap();
        let err = table.entry("1.0", SERD_SOURCE).unwrap_err();
        assert!(matches!(err, RecipeError::UnsupportedVersion(v) if v == "1.0"));
    }

    #[test]
    fn test_missing_named_entry() {
        let table = SourceTable::parse(
            "[sources.\"1.0\".serd]\nurl = \"https://example.com/serd.tar.gz\"\n",
        )
        .unwrap();
        let err = table.entry("1.0", AUTOWAF_SOURCE).unwrap_err();
        assert!(matches!(err, RecipeError::MissingSource { .. }));
    }

    #[test]
    fn test_empty_mirror_list_rejected() {
        let err = SourceTable::parse("[sources.\"1.0\".serd]\nurl = []\n").unwrap_err();
        assert!(err.to_string().contains("has no url"), "got: {err}");
    }

    #[test]
    fn test_integrity_prefers_sha512() {
        let entry = SourceEntry {
            url: Urls::One("https://example.com/x.tar.gz".into()),
            sha256: Some("aa".into()),
            sha512: Some("bb".into()),
            blake3: None,
        };
        assert_eq!(entry.integrity().unwrap().algorithm.name(), "SHA512");
    }
}
