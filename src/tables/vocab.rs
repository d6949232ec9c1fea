use std::collections::{BTreeSet, HashMap};

/// JSON-LD keywords and their fixed ids. Every id is even; the odd id above each one marks an
/// array value.
pub const KEYWORDS: &[(&str, u64)] = &[
    ("@context", 0),
    ("@type", 2),
    ("@id", 4),
    ("@value", 6),
    ("@direction", 8),
    ("@graph", 10),
    ("@included", 12),
    ("@index", 14),
    ("@json", 16),
    ("@language", 18),
    ("@list", 20),
    ("@nest", 22),
    ("@reverse", 24),
    ("@base", 26),
    ("@container", 28),
    ("@default", 30),
    ("@embed", 32),
    ("@explicit", 34),
    ("@none", 36),
    ("@omitDefault", 38),
    ("@prefix", 40),
    ("@preserve", 42),
    ("@protected", 44),
    ("@requireAll", 46),
    ("@set", 48),
    ("@version", 50),
    ("@vocab", 52),
];

/// Id given to the first non-keyword term.
pub const FIRST_CUSTOM_TERM_ID: u64 = 100;

/// The key written into a compressed map for a term id. Array values use the odd key.
pub fn term_key(id: u64, plural: bool) -> u64 {
    if plural {
        id | 1
    } else {
        id
    }
}

/// Split a compressed map key into its term id and whether the value is an array.
pub fn split_term_key(key: u64) -> (u64, bool) {
    (key & !1, key & 1 == 1)
}

/// Bidirectional map between vocabulary terms and small integers.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    term_to_id: HashMap<String, u64>,
    id_to_term: HashMap<u64, String>,
    next_id: u64,
}

impl Vocabulary {
    /// A vocabulary holding only the keywords.
    pub fn new() -> Self {
        let mut vocab = Self {
            term_to_id: HashMap::new(),
            id_to_term: HashMap::new(),
            next_id: FIRST_CUSTOM_TERM_ID,
        };
        for (term, id) in KEYWORDS {
            vocab.term_to_id.insert(term.to_string(), *id);
            vocab.id_to_term.insert(*id, term.to_string());
        }
        vocab
    }

    /// Build the vocabulary from every term seen across a set of contexts. Terms are assigned ids
    /// in byte order, so the same set of terms always yields the same table no matter what order
    /// they were found in.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut vocab = Self::new();
        let sorted: BTreeSet<String> = terms.into_iter().collect();
        for term in sorted {
            vocab.add(term);
        }
        vocab
    }

    fn add(&mut self, term: String) {
        if self.term_to_id.contains_key(&term) {
            return;
        }
        let id = self.next_id;
        self.next_id += 2;
        self.id_to_term.insert(id, term.clone());
        self.term_to_id.insert(term, id);
    }

    pub fn id(&self, term: &str) -> Option<u64> {
        self.term_to_id.get(term).copied()
    }

    pub fn term(&self, id: u64) -> Option<&str> {
        self.id_to_term.get(&id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.term_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_to_id.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
