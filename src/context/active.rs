use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::definition::{is_keyword, TermDefinition, TermInfo};

// Terms defined as other terms can form cycles
const MAX_EXPANSION: usize = 8;

/// Terms that stand in for the `@id` and `@type` keywords.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aliases {
    pub id: BTreeSet<String>,
    pub type_: BTreeSet<String>,
}

/// One frame of the context stack: the merged term definitions in effect at some point in the
/// document. Frames are never changed after being pushed; a child frame is built from a copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveContext {
    aliases: Aliases,
    raw: Option<Value>,
    scoped: BTreeMap<String, Value>,
    terms: BTreeMap<String, TermDefinition>,
}

impl ActiveContext {
    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    /// The context value that produced this frame.
    pub fn raw_context(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    pub fn term(&self, term: &str) -> Option<TermInfo> {
        self.terms.get_key_value(term).map(|(term, definition)| TermInfo {
            term: term.as_str(),
            definition,
        })
    }

    /// The context scoped to a term, used both for nodes of that type and values of that property.
    pub fn scoped_context(&self, term: &str) -> Option<&Value> {
        self.scoped.get(term)
    }

    pub fn is_id_term(&self, term: &str) -> bool {
        term == "@id" || self.aliases.id.contains(term)
    }

    pub fn is_type_term(&self, term: &str) -> bool {
        term == "@type" || self.aliases.type_.contains(term)
    }

    pub(crate) fn set_raw(&mut self, raw: Value) {
        self.raw = Some(raw);
    }

    /// Merge one context object into this frame. Returns the context's `@propagate` setting, if
    /// it has one.
    pub(crate) fn define_all(&mut self, context: &Map<String, Value>) -> Option<bool> {
        let mut propagate = None;
        for (term, def) in context {
            if is_keyword(term) {
                if term == "@propagate" {
                    propagate = def.as_bool();
                }
                continue;
            }
            self.define(term, def);
        }
        propagate
    }

    fn define(&mut self, term: &str, def: &Value) {
        self.aliases.id.remove(term);
        self.aliases.type_.remove(term);
        self.scoped.remove(term);
        if def.is_null() {
            self.terms.remove(term);
            return;
        }
        let def = TermDefinition::new(def.clone());
        match def.id() {
            Some("@id") => {
                self.aliases.id.insert(term.to_string());
            }
            Some("@type") => {
                self.aliases.type_.insert(term.to_string());
            }
            _ => (),
        }
        if let Some(scoped) = def.context() {
            self.scoped.insert(term.to_string(), scoped.clone());
        }
        self.terms.insert(term.to_string(), def);
    }

    /// Expand a compact IRI or term into a full IRI, using the prefixes defined in this frame.
    pub fn expand_iri(&self, value: &str) -> String {
        self.expand_iri_limited(value, MAX_EXPANSION)
    }

    fn expand_iri_limited(&self, value: &str, limit: usize) -> String {
        if is_keyword(value) || limit == 0 {
            return value.to_string();
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if suffix.starts_with("//") {
                return value.to_string();
            }
            if let Some(base) = self.terms.get(prefix).and_then(|d| d.id()) {
                return format!("{}{}", base, suffix);
            }
            return value.to_string();
        }
        match self.terms.get(value).and_then(|d| d.id()) {
            Some(iri) if iri != value && !is_keyword(iri) => {
                self.expand_iri_limited(iri, limit - 1)
            }
            _ => value.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn frame(ctx: Value) -> ActiveContext {
        let mut active = ActiveContext::default();
        active.define_all(ctx.as_object().unwrap());
        active
    }

    #[test]
    fn aliases() {
        let active = frame(json!({"id": "@id", "type": {"@id": "@type"}, "name": "ex:name"}));
        assert!(active.is_id_term("id"));
        assert!(active.is_id_term("@id"));
        assert!(active.is_type_term("type"));
        assert!(!active.is_id_term("name"));
    }

    #[test]
    fn redefine_and_null() {
        let mut active = frame(json!({
            "id": "@id",
            "Thing": {"@id": "ex:Thing", "@context": {"name": "ex:name"}}
        }));
        assert!(active.scoped_context("Thing").is_some());
        active.define_all(json!({"id": "ex:identifier", "Thing": null}).as_object().unwrap());
        assert!(!active.is_id_term("id"));
        assert_eq!(active.term("id").unwrap().definition.id(), Some("ex:identifier"));
        assert!(active.term("Thing").is_none());
        assert!(active.scoped_context("Thing").is_none());
    }

    #[test]
    fn propagate_flag() {
        let mut active = ActiveContext::default();
        let map = json!({"@propagate": true, "@protected": true, "a": "ex:a"});
        assert_eq!(active.define_all(map.as_object().unwrap()), Some(true));
        assert!(active.term("@protected").is_none());
    }

    #[test]
    fn expand() {
        let active = frame(json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "dateTime": "xsd:dateTime"
        }));
        assert_eq!(
            active.expand_iri("xsd:dateTime"),
            "http://www.w3.org/2001/XMLSchema#dateTime"
        );
        assert_eq!(
            active.expand_iri("dateTime"),
            "http://www.w3.org/2001/XMLSchema#dateTime"
        );
        assert_eq!(active.expand_iri("https://x.example/a"), "https://x.example/a");
        assert_eq!(active.expand_iri("unknown:thing"), "unknown:thing");
        assert_eq!(active.expand_iri("@id"), "@id");
    }

    #[test]
    fn expand_cycle() {
        let active = frame(json!({"a": "b", "b": "a"}));
        let expanded = active.expand_iri("a");
        assert!(expanded == "a" || expanded == "b");
    }
}
