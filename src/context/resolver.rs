use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use super::active::ActiveContext;
use super::loader::ContextCache;
use super::stack::{Checkpoint, ContextStack};
use crate::error::{Error, Result};

// Remote contexts that include each other would otherwise never finish
const MAX_CONTEXT_NESTING: usize = 32;

enum ContextItem<'a> {
    Reset,
    Define(&'a Map<String, Value>),
}

/// Applies context values to a [`ContextStack`], reading remote contexts from a prefetched
/// [`ContextCache`]. Never fetches anything itself.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'s> {
    cache: &'s ContextCache,
}

impl<'s> Resolver<'s> {
    pub fn new(cache: &'s ContextCache) -> Self {
        Self { cache }
    }

    /// Resolve all the contexts that apply to one node, in order:
    ///
    /// 1. If the frame in effect doesn't propagate (it came from a type-scoped context of the
    ///    parent), the nearest propagating frame is restored. Value objects and nodes holding
    ///    nothing but an `@id` pass `keep_type_scope` and stay in the parent's type scope.
    /// 2. The context scoped to the property holding this node.
    /// 3. The node's own `@context` entry.
    /// 4. The contexts scoped to each of the node's types, taken from the frame before any of
    ///    them applied. `node_types` is given that frame and returns the node's types.
    ///
    /// The returned checkpoint must be reverted to once the node's subtree is done.
    pub fn resolve<F>(
        &self,
        stack: &mut ContextStack,
        property_scope: Option<&Value>,
        node_context: Option<&Value>,
        keep_type_scope: bool,
        node_types: F,
    ) -> Result<Checkpoint>
    where
        F: FnOnce(&ActiveContext) -> Result<Vec<String>>,
    {
        let checkpoint = stack.checkpoint();
        if !stack.top_propagates() && !keep_type_scope {
            let base = stack.propagating_top().clone();
            stack.push(base, true);
        }
        if let Some(scope) = property_scope {
            self.push_context(stack, scope, true, false)?;
        }
        if let Some(context) = node_context {
            self.push_context(stack, context, false, false)?;
        }

        let active = stack.top().clone();
        let mut types = node_types(&active)?;
        types.sort();
        types.dedup();
        for ty in types.iter() {
            if let Some(scoped) = active.scoped_context(ty) {
                self.push_context(stack, scoped, true, true)?;
            }
        }
        Ok(checkpoint)
    }

    /// Build a new frame from the top of the stack with a context value applied, and push it.
    ///
    /// `scoped` allows inline context objects, which are only legal inside term definitions.
    /// Type-scoped frames don't propagate unless the context says `"@propagate": true`; all others
    /// propagate unless it says `false`.
    pub fn push_context(
        &self,
        stack: &mut ContextStack,
        value: &Value,
        scoped: bool,
        type_scoped: bool,
    ) -> Result<()> {
        let mut items = Vec::new();
        self.collect(value, scoped, 0, &mut items)?;

        let mut frame = ActiveContext::clone(stack.top());
        let mut propagate = None;
        for item in items {
            match item {
                ContextItem::Reset => frame = ActiveContext::default(),
                ContextItem::Define(map) => {
                    if let Some(p) = frame.define_all(map) {
                        propagate = Some(p);
                    }
                }
            }
        }
        frame.set_raw(value.clone());
        let propagate = propagate.unwrap_or(!type_scoped);
        trace!(
            depth = stack.depth(),
            type_scoped,
            propagate,
            "Pushing context frame"
        );
        stack.push(Arc::new(frame), propagate);
        Ok(())
    }

    fn collect<'a>(
        &'a self,
        value: &'a Value,
        scoped: bool,
        nesting: usize,
        items: &mut Vec<ContextItem<'a>>,
    ) -> Result<()> {
        if nesting > MAX_CONTEXT_NESTING {
            return Err(Error::ContextResolution(
                "remote contexts nested too deeply".to_string(),
            ));
        }
        match value {
            Value::Null => items.push(ContextItem::Reset),
            Value::String(url) => {
                let context = self.cache.get(url).ok_or_else(|| {
                    Error::ContextResolution(format!("{} was never loaded", url))
                })?;
                self.collect(context, true, nesting + 1, items)?;
            }
            Value::Array(list) => {
                for v in list {
                    self.collect(v, scoped, nesting, items)?;
                }
            }
            Value::Object(map) => {
                if !scoped {
                    return Err(Error::EmbeddedContextNotSupported(format!(
                        "inline context with {} entries",
                        map.len()
                    )));
                }
                if let Some(import) = map.get("@import") {
                    self.collect(import, true, nesting + 1, items)?;
                }
                items.push(ContextItem::Define(map));
            }
            other => {
                return Err(Error::ContextResolution(format!(
                    "{} is not a valid context",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::loader::StaticLoader;
    use serde_json::json;

    fn cache() -> ContextCache {
        let loader = StaticLoader::new()
            .with(
                "https://base.example/",
                json!({"@context": {
                    "id": "@id",
                    "type": "@type",
                    "Person": {"@id": "ex:Person", "@context": {"name": "ex:name", "knows": {
                        "@id": "ex:knows",
                        "@context": {"nick": "ex:nick"}
                    }}},
                    "Sticky": {"@id": "ex:Sticky", "@context": {"@propagate": true, "glue": "ex:glue"}}
                }}),
            )
            .with("https://reset.example/", json!({"@context": [null, {"only": "ex:only"}]}));
        let mut cache = ContextCache::new();
        futures_executor::block_on(cache.load_closure(
            &loader,
            &[json!(["https://base.example/", "https://reset.example/"])],
        ))
        .unwrap();
        cache
    }

    #[test]
    fn node_context() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let cp = resolver
            .resolve(&mut stack, None, Some(&json!("https://base.example/")), false, |_| Ok(vec![]))
            .unwrap();
        assert!(stack.top().is_id_term("id"));
        assert_eq!(stack.top().raw_context(), Some(&json!("https://base.example/")));
        stack.revert(cp);
        assert!(!stack.top().is_id_term("id"));
    }

    #[test]
    fn inline_rejected() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let inline = json!({"a": "ex:a"});
        let result = resolver.resolve(&mut stack, None, Some(&inline), false, |_| Ok(vec![]));
        assert!(matches!(result, Err(Error::EmbeddedContextNotSupported(_))));
    }

    #[test]
    fn unloaded_rejected() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let other = json!("https://other.example/");
        let result = resolver.resolve(&mut stack, None, Some(&other), false, |_| Ok(vec![]));
        assert!(matches!(result, Err(Error::ContextResolution(_))));
    }

    #[test]
    fn type_scope_does_not_propagate() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let root = resolver
            .resolve(&mut stack, None, Some(&json!("https://base.example/")), false, |active| {
                assert!(active.is_type_term("type"));
                Ok(vec!["Person".to_string(), "Person".to_string()])
            })
            .unwrap();
        assert!(stack.top().term("name").is_some());
        assert!(!stack.top_propagates());

        // A child node sees the frame from before the type scope
        let knows = stack.top().scoped_context("knows").cloned();
        let child = resolver
            .resolve(&mut stack, knows.as_ref(), None, false, |_| Ok(vec![]))
            .unwrap();
        assert!(stack.top().term("name").is_none());
        assert!(stack.top().term("nick").is_some());
        assert!(stack.top().is_id_term("id"));
        stack.revert(child);
        stack.revert(root);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn type_scope_kept_for_value_nodes() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let _root = resolver
            .resolve(&mut stack, None, Some(&json!("https://base.example/")), false, |_| {
                Ok(vec!["Person".to_string()])
            })
            .unwrap();
        let child = resolver.resolve(&mut stack, None, None, true, |_| Ok(vec![])).unwrap();
        assert!(stack.top().term("name").is_some());
        stack.revert(child);
        assert!(!stack.top_propagates());
    }

    #[test]
    fn type_scope_with_propagate() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let _root = resolver
            .resolve(&mut stack, None, Some(&json!("https://base.example/")), false, |_| {
                Ok(vec!["Sticky".to_string()])
            })
            .unwrap();
        assert!(stack.top_propagates());
        let _child = resolver.resolve(&mut stack, None, None, false, |_| Ok(vec![])).unwrap();
        assert!(stack.top().term("glue").is_some());
    }

    #[test]
    fn null_resets() {
        let cache = cache();
        let resolver = Resolver::new(&cache);
        let mut stack = ContextStack::new();
        let _ = resolver
            .resolve(&mut stack, None, Some(&json!("https://base.example/")), false, |_| Ok(vec![]))
            .unwrap();
        let _ = resolver
            .resolve(&mut stack, None, Some(&json!("https://reset.example/")), false, |_| Ok(vec![]))
            .unwrap();
        assert!(!stack.top().is_id_term("id"));
        assert!(stack.top().term("only").is_some());
    }
}
