use std::collections::{BTreeSet, HashMap};

use futures_core::future::BoxFuture;
use serde_json::Value;
use tracing::trace;

use super::definition::is_keyword;
use crate::error::{Error, Result};

/// Something that can fetch remote JSON-LD documents by URL.
///
/// Fetching is the only asynchronous step of a transform. Everything a document needs is fetched
/// up front into a [`ContextCache`], and the walk itself never waits on the loader.
pub trait DocumentLoader {
    /// Fetch the document at `url`. The returned document is expected to be a JSON object with an
    /// `@context` entry.
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>>;
}

/// A loader that serves documents from an in-memory map. Useful for pinned contexts and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticLoader {
    docs: HashMap<String, Value>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, builder-style.
    pub fn with(mut self, url: impl Into<String>, doc: Value) -> Self {
        self.insert(url, doc);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, doc: Value) {
        self.docs.insert(url.into(), doc);
    }
}

impl DocumentLoader for StaticLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            self.docs
                .get(url)
                .cloned()
                .ok_or_else(|| Error::ContextResolution(format!("no document for {}", url)))
        })
    }
}

/// Fetched context documents, keyed by URL, along with every term they define.
///
/// Each URL is fetched at most once per cache, so a cache should live no longer than one
/// transform session.
#[derive(Clone, Debug, Default)]
pub struct ContextCache {
    contexts: HashMap<String, Value>,
    terms: BTreeSet<String>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the `@context` value of a fetched document.
    pub fn get(&self, url: &str) -> Option<&Value> {
        self.contexts.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.contexts.contains_key(url)
    }

    /// Every non-keyword term defined anywhere in the loaded contexts, in byte order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|s| s.as_str())
    }

    /// Fetch the closure of the given context values: the contexts themselves, every remote
    /// context they reference, and every term-scoped context inside them.
    pub async fn load_closure(&mut self, loader: &dyn DocumentLoader, roots: &[Value]) -> Result<()> {
        let mut pending: Vec<Value> = roots.iter().rev().cloned().collect();
        while let Some(value) = pending.pop() {
            match value {
                Value::Null => (),
                Value::String(url) => {
                    if self.contains(&url) {
                        continue;
                    }
                    trace!(url = %url, "Fetching context");
                    let doc = loader.load(&url).await.map_err(|e| match e {
                        Error::ContextResolution(_) => e,
                        other => Error::ContextResolution(format!("{}: {}", url, other)),
                    })?;
                    let context = match doc {
                        Value::Object(mut map) => map.remove("@context").ok_or_else(|| {
                            Error::ContextResolution(format!("{} has no @context entry", url))
                        })?,
                        other => {
                            return Err(Error::ContextResolution(format!(
                                "{} is not a JSON object: {}",
                                url, other
                            )))
                        }
                    };
                    pending.push(context.clone());
                    self.contexts.insert(url, context);
                }
                Value::Array(items) => pending.extend(items.into_iter().rev()),
                Value::Object(map) => {
                    for (term, def) in map {
                        if term == "@import" {
                            pending.push(def);
                            continue;
                        }
                        if is_keyword(&term) {
                            continue;
                        }
                        if let Some(scoped) = def.get("@context") {
                            pending.push(scoped.clone());
                        }
                        self.terms.insert(term);
                    }
                }
                other => {
                    return Err(Error::ContextResolution(format!(
                        "{} is not a valid context",
                        other
                    )))
                }
            }
        }
        Ok(())
    }
}
