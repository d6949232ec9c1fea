use serde_json::Value;

/// True for JSON-LD keywords (and anything shaped like one).
pub fn is_keyword(term: &str) -> bool {
    term.starts_with('@')
}

/// The raw definition a context gives a term: either a bare IRI / keyword alias, or an object
/// that may carry `@id`, `@type`, and `@context`.
#[derive(Clone, Debug, PartialEq)]
pub struct TermDefinition(Value);

impl TermDefinition {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// The IRI or keyword this term stands for.
    pub fn id(&self) -> Option<&str> {
        match &self.0 {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("@id").and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// The declared type of this term's values.
    pub fn value_type(&self) -> Option<&str> {
        self.0.get("@type").and_then(|v| v.as_str())
    }

    /// The term-scoped context, if there is one.
    pub fn context(&self) -> Option<&Value> {
        self.0.get("@context")
    }
}

/// A vocabulary term together with its definition in the active context.
#[derive(Clone, Debug, PartialEq)]
pub struct TermInfo<'a> {
    pub term: &'a str,
    pub definition: &'a TermDefinition,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_alias() {
        let def = TermDefinition::new(json!("@id"));
        assert_eq!(def.id(), Some("@id"));
        assert_eq!(def.value_type(), None);
        assert!(def.context().is_none());
    }

    #[test]
    fn expanded() {
        let def = TermDefinition::new(json!({
            "@id": "https://www.w3.org/2018/credentials#issuanceDate",
            "@type": "xsd:dateTime",
            "@context": {"id": "@id"}
        }));
        assert_eq!(def.id(), Some("https://www.w3.org/2018/credentials#issuanceDate"));
        assert_eq!(def.value_type(), Some("xsd:dateTime"));
        assert_eq!(def.context(), Some(&json!({"id": "@id"})));
    }

    #[test]
    fn keywords() {
        assert!(is_keyword("@protected"));
        assert!(!is_keyword("id"));
    }
}
