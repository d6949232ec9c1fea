//! Application settings for a transform.
//!
//! The same settings must be given to both ends: a document encoded with one set of context ids,
//! term codecs, or literal tables can only be decoded with the same set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Transform settings. All fields are optional when deserializing, and default to empty.
///
/// ```
/// # use ld_pack::Options;
/// let options = Options::from_json(r#"{
///     "app_context_map": { "https://app.example/v1": 32768 },
///     "app_term_map": { "publicKey": "multibase" }
/// }"#).unwrap();
/// assert_eq!(options.app_context_map["https://app.example/v1"], 0x8000);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Extra context URLs with fixed ids. Ids must be at least
    /// [`APP_CONTEXT_START`][crate::tables::APP_CONTEXT_START] and unique.
    pub app_context_map: BTreeMap<String, u64>,
    /// Terms whose values should always go through a named codec: one of `url`, `vocab`,
    /// `multibase`, `date`, `dateTime`, or `none`.
    pub app_term_map: BTreeMap<String, String>,
    /// Extra typed-literal table entries, keyed by type IRI (or `url` / `none`), then by value.
    pub type_table: BTreeMap<String, BTreeMap<String, u64>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Bind a context URL to an id.
    pub fn context(mut self, url: impl Into<String>, id: u64) -> Self {
        self.app_context_map.insert(url.into(), id);
        self
    }

    /// Force a term's values through a named codec.
    pub fn term_codec(mut self, term: impl Into<String>, codec: impl Into<String>) -> Self {
        self.app_term_map.insert(term.into(), codec.into());
        self
    }

    /// Add one entry to a typed-literal table.
    pub fn type_entry(
        mut self,
        type_name: impl Into<String>,
        value: impl Into<String>,
        id: u64,
    ) -> Self {
        self.type_table
            .entry(type_name.into())
            .or_default()
            .insert(value.into(), id);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    #[test]
    fn builder() {
        let options = Options::new()
            .context("https://app.example/v1", 0x8000)
            .term_codec("publicKey", "multibase")
            .type_entry("none", "VerifiableCredential", 1)
            .type_entry("none", "VerifiablePresentation", 2);
        assert_eq!(options.app_context_map.len(), 1);
        assert_eq!(options.app_term_map["publicKey"], "multibase");
        assert_eq!(options.type_table["none"].len(), 2);
    }

    #[test]
    fn json() {
        let options = Options::from_json(r#"{"type_table": {"url": {"https://a.example/": 4}}}"#)
            .unwrap();
        assert_eq!(options.type_table["url"]["https://a.example/"], 4);
        assert!(options.app_context_map.is_empty());
        assert_eq!(Options::from_json("{}").unwrap(), Options::default());
    }

    #[test]
    fn unknown_fields() {
        assert!(matches!(
            Options::from_json(r#"{"app_context": {}}"#),
            Err(Error::SerdeFail(_))
        ));
    }
}
