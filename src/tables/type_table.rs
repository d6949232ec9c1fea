use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const MULTIBASE_TYPE: &str = "https://w3id.org/security#multibase";
pub const CRYPTOSUITE_TYPE: &str = "https://w3id.org/security#cryptosuiteString";

/// Table for `@id`-typed values.
pub const URL_TABLE: &str = "url";
/// Table for values with no declared type. Doubles as the general string-interning table.
pub const NONE_TABLE: &str = "none";

/// Tables whose ids are packed into bytes, because native integers already mean something in
/// those positions.
const BYTE_PACKED: &[&str] = &[NONE_TABLE, XSD_DATE, XSD_DATETIME];

const BUILTIN_TABLES: &[(&str, &[(&str, u64)])] = &[(
    CRYPTOSUITE_TYPE,
    &[
        ("ecdsa-rdfc-2019", 1),
        ("ecdsa-sd-2023", 2),
        ("eddsa-rdfc-2022", 3),
        ("ecdsa-xi-2023", 4),
    ],
)];

/// Bidirectional map between the literal values of one type and small integers.
#[derive(Clone, Debug, Default)]
pub struct LiteralTable {
    value_to_id: HashMap<String, u64>,
    id_to_value: HashMap<u64, String>,
}

impl LiteralTable {
    fn insert(&mut self, type_name: &str, value: &str, id: u64) -> Result<()> {
        if let Some(existing) = self.id_to_value.get(&id) {
            if existing != value {
                return Err(Error::InvalidTypeTable(format!(
                    "id {} of type {} is used for both \"{}\" and \"{}\"",
                    id, type_name, existing, value
                )));
            }
        }
        if let Some(old) = self.value_to_id.insert(value.to_string(), id) {
            self.id_to_value.remove(&old);
        }
        self.id_to_value.insert(id, value.to_string());
        Ok(())
    }

    pub fn id(&self, value: &str) -> Option<u64> {
        self.value_to_id.get(value).copied()
    }

    pub fn value(&self, id: u64) -> Option<&str> {
        self.id_to_value.get(&id).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.value_to_id.is_empty()
    }
}

/// The typed-literal tables of a session, keyed by normalized term type.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    tables: HashMap<String, LiteralTable>,
}

impl TypeTable {
    /// Build the built-in tables, then layer the application's entries on top. An application
    /// entry replaces the built-in id for the same value.
    pub fn new(extra: &BTreeMap<String, BTreeMap<String, u64>>) -> Result<Self> {
        let mut table = TypeTable::default();
        for (type_name, entries) in BUILTIN_TABLES {
            for (value, id) in entries.iter() {
                table.insert(type_name, value, *id)?;
            }
        }
        for (type_name, entries) in extra {
            for (value, &id) in entries {
                table.insert(type_name, value, id)?;
            }
        }
        Ok(table)
    }

    fn insert(&mut self, type_name: &str, value: &str, id: u64) -> Result<()> {
        self.tables
            .entry(type_name.to_string())
            .or_default()
            .insert(type_name, value, id)
    }

    /// Get the table for a type, if it has any entries.
    pub fn get(&self, type_name: &str) -> Option<&LiteralTable> {
        self.tables.get(type_name).filter(|t| !t.is_empty())
    }

    /// Whether ids from this type's table are stored as packed bytes instead of integers.
    pub fn is_byte_packed(type_name: &str) -> bool {
        BYTE_PACKED.contains(&type_name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_cryptosuites() {
        let table = TypeTable::new(&BTreeMap::new()).unwrap();
        let suites = table.get(CRYPTOSUITE_TYPE).unwrap();
        assert_eq!(suites.id("eddsa-rdfc-2022"), Some(3));
        assert_eq!(suites.value(1), Some("ecdsa-rdfc-2019"));
        assert!(table.get(URL_TABLE).is_none());
    }

    #[test]
    fn app_entries() {
        let mut extra = BTreeMap::new();
        let mut none = BTreeMap::new();
        none.insert("VerifiableCredential".to_string(), 7);
        extra.insert(NONE_TABLE.to_string(), none);
        let table = TypeTable::new(&extra).unwrap();
        assert_eq!(table.get(NONE_TABLE).unwrap().id("VerifiableCredential"), Some(7));
    }

    #[test]
    fn conflicting_ids() {
        let mut extra = BTreeMap::new();
        let mut suites = BTreeMap::new();
        suites.insert("my-suite".to_string(), 1);
        extra.insert(CRYPTOSUITE_TYPE.to_string(), suites);
        assert!(matches!(
            TypeTable::new(&extra),
            Err(Error::InvalidTypeTable(_))
        ));
    }

    #[test]
    fn byte_packing() {
        assert!(TypeTable::is_byte_packed(NONE_TABLE));
        assert!(TypeTable::is_byte_packed(XSD_DATETIME));
        assert!(!TypeTable::is_byte_packed(URL_TABLE));
        assert!(!TypeTable::is_byte_packed(MULTIBASE_TYPE));
    }
}
