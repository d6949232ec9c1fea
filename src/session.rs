use std::collections::BTreeMap;

use educe::Educe;
use serde_json::Value;
use tracing::debug;

use crate::codec::{Codecs, NamedCodec};
use crate::context::{ContextCache, DocumentLoader, Resolver};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::tables::{ContextRegistry, TypeTable, Vocabulary};

/// Everything one encode or decode call works from: the loader, the fetched contexts, and the
/// tables built from them and from the application's settings.
///
/// A session is built in two steps. [`Session::new`] validates the settings, and
/// [`Session::load_contexts`] fetches the contexts a document uses and freezes the vocabulary.
/// Only after that can a document be walked.
#[derive(Educe)]
#[educe(Debug)]
pub struct Session<'l> {
    #[educe(Debug(ignore))]
    loader: &'l dyn DocumentLoader,
    cache: ContextCache,
    vocab: Vocabulary,
    registry: ContextRegistry,
    types: TypeTable,
    term_codecs: BTreeMap<String, NamedCodec>,
}

impl<'l> Session<'l> {
    pub fn new(loader: &'l dyn DocumentLoader, options: &Options) -> Result<Self> {
        let registry = ContextRegistry::new(&options.app_context_map)?;
        let types = TypeTable::new(&options.type_table)?;
        let term_codecs = options
            .app_term_map
            .iter()
            .map(|(term, codec)| match NamedCodec::from_name(codec) {
                Some(named) => Ok((term.clone(), named)),
                None => Err(Error::UnknownCodec {
                    term: term.clone(),
                    codec: codec.clone(),
                }),
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self {
            loader,
            cache: ContextCache::new(),
            vocab: Vocabulary::new(),
            registry,
            types,
            term_codecs,
        })
    }

    /// Fetch the closure of the given context values, then rebuild the vocabulary from every
    /// term they define.
    pub async fn load_contexts(&mut self, roots: &[Value]) -> Result<()> {
        self.cache.load_closure(self.loader, roots).await?;
        self.vocab = Vocabulary::from_terms(self.cache.terms().map(|t| t.to_string()));
        debug!(
            contexts = roots.len(),
            terms = self.vocab.len(),
            "Loaded contexts"
        );
        Ok(())
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// Application codec overrides, by term.
    pub fn term_codecs(&self) -> &BTreeMap<String, NamedCodec> {
        &self.term_codecs
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.cache)
    }

    pub fn codecs(&self) -> Codecs<'_> {
        Codecs::new(&self.vocab, &self.registry, &self.types)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::StaticLoader;
    use serde_json::json;

    #[test]
    fn unknown_codec() {
        let loader = StaticLoader::new();
        let options = Options::new().term_codec("publicKey", "base32");
        assert_eq!(
            Session::new(&loader, &options).unwrap_err(),
            Error::UnknownCodec {
                term: "publicKey".into(),
                codec: "base32".into()
            }
        );
    }

    #[test]
    fn reserved_context_id() {
        let loader = StaticLoader::new();
        let options = Options::new().context("https://app.example/", 0x7fff);
        assert!(matches!(
            Session::new(&loader, &options),
            Err(Error::InvalidContextValue { value: 0x7fff, .. })
        ));
    }

    #[test]
    fn vocabulary_from_contexts() {
        let loader = StaticLoader::new().with(
            "https://a.example/",
            json!({"@context": {"zeta": "ex:zeta", "alpha": "ex:alpha"}}),
        );
        let mut session = Session::new(&loader, &Options::default()).unwrap();
        futures_executor::block_on(session.load_contexts(&[json!("https://a.example/")])).unwrap();
        assert_eq!(session.vocab().id("alpha"), Some(100));
        assert_eq!(session.vocab().id("zeta"), Some(102));
        assert!(format!("{:?}", session).contains("Session"));
    }
}
