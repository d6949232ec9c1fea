use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

/// Context ids below this value are reserved for the built-in registry. Application-supplied
/// contexts must use ids at or above it.
pub const APP_CONTEXT_START: u64 = 0x8000;

/// Well-known context documents and their reserved ids.
pub const BUILTIN_CONTEXTS: &[(&str, u64)] = &[
    ("https://www.w3.org/ns/activitystreams", 0x10),
    ("https://www.w3.org/2018/credentials/v1", 0x11),
    ("https://www.w3.org/ns/did/v1", 0x12),
    ("https://w3id.org/security/suites/ed25519-2018/v1", 0x13),
    ("https://w3id.org/security/suites/ed25519-2020/v1", 0x14),
    ("https://w3id.org/cit/v1", 0x15),
    ("https://w3id.org/age/v1", 0x16),
    ("https://w3id.org/security/suites/x25519-2020/v1", 0x17),
    ("https://w3id.org/veres-one/v1", 0x18),
    ("https://w3id.org/webkms/v1", 0x19),
    ("https://w3id.org/zcap/v1", 0x1a),
    ("https://w3id.org/security/suites/hmac-2019/v1", 0x1b),
    ("https://w3id.org/security/suites/aes-2019/v1", 0x1c),
    ("https://w3id.org/vaccination/v1", 0x1d),
    ("https://w3id.org/vc-revocation-list-2020/v1", 0x1e),
    ("https://w3id.org/dcc/v1", 0x1f),
    ("https://w3id.org/vc/status-list/v1", 0x20),
    ("https://www.w3.org/ns/credentials/v2", 0x21),
    ("https://w3id.org/security/data-integrity/v1", 0x30),
    ("https://w3id.org/security/multikey/v1", 0x31),
    ("https://purl.imsglobal.org/spec/ob/v3p0/context.json", 0x32),
    ("https://w3id.org/security/data-integrity/v2", 0x33),
];

/// Bidirectional map between context URLs and reserved integers.
#[derive(Clone, Debug)]
pub struct ContextRegistry {
    url_to_id: HashMap<String, u64>,
    id_to_url: HashMap<u64, String>,
}

impl ContextRegistry {
    /// Build the registry from the built-in contexts plus application bindings. Fails if an
    /// application binding falls inside the reserved range or reuses an id.
    pub fn new(app_contexts: &BTreeMap<String, u64>) -> Result<Self> {
        let mut registry = Self {
            url_to_id: HashMap::new(),
            id_to_url: HashMap::new(),
        };
        for (url, id) in BUILTIN_CONTEXTS {
            registry.url_to_id.insert(url.to_string(), *id);
            registry.id_to_url.insert(*id, url.to_string());
        }
        for (url, &id) in app_contexts {
            if id < APP_CONTEXT_START || registry.id_to_url.contains_key(&id) {
                return Err(Error::InvalidContextValue {
                    url: url.clone(),
                    value: id,
                });
            }
            registry.id_to_url.insert(id, url.clone());
            // A built-in URL keeps its built-in id when encoding; both ids decode to it.
            registry.url_to_id.entry(url.clone()).or_insert(id);
        }
        Ok(registry)
    }

    pub fn id(&self, url: &str) -> Option<u64> {
        self.url_to_id.get(url).copied()
    }

    pub fn url(&self, id: u64) -> Option<&str> {
        self.id_to_url.get(&id).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin() {
        let registry = ContextRegistry::new(&BTreeMap::new()).unwrap();
        assert_eq!(registry.id("https://www.w3.org/ns/did/v1"), Some(0x12));
        assert_eq!(registry.url(0x11), Some("https://www.w3.org/2018/credentials/v1"));
        assert_eq!(registry.id("https://example.com/unknown"), None);
    }

    #[test]
    fn app_contexts() {
        let mut app = BTreeMap::new();
        app.insert("https://example.com/ctx/v1".to_string(), 0x8000);
        app.insert("https://example.com/ctx/v2".to_string(), 0x8001);
        let registry = ContextRegistry::new(&app).unwrap();
        assert_eq!(registry.id("https://example.com/ctx/v2"), Some(0x8001));
        assert_eq!(registry.url(0x8000), Some("https://example.com/ctx/v1"));
    }

    #[test]
    fn reserved_range() {
        let mut app = BTreeMap::new();
        app.insert("https://example.com/ctx/v1".to_string(), 0x7fff);
        assert_eq!(
            ContextRegistry::new(&app).unwrap_err(),
            Error::InvalidContextValue {
                url: "https://example.com/ctx/v1".into(),
                value: 0x7fff
            }
        );
    }

    #[test]
    fn duplicate_app_id() {
        let mut app = BTreeMap::new();
        app.insert("https://example.com/a".to_string(), 0x9000);
        app.insert("https://example.com/b".to_string(), 0x9000);
        assert!(matches!(
            ContextRegistry::new(&app),
            Err(Error::InvalidContextValue { value: 0x9000, .. })
        ));
    }
}
