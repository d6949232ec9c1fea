use serde_json::{Map, Value};
use tracing::debug;

use crate::codec::{Codecs, Position};
use crate::compress_type::CompressType;
use crate::context::{is_keyword, ActiveContext, ContextStack, DocumentLoader};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::session::Session;
use crate::tables::vocab::term_key;
use crate::token::Token;
use crate::MAX_DEPTH;

/// Encode a JSON-LD document into its compact binary form.
///
/// Every context the document references is fetched through `loader` first. If some value in the
/// document can't be compressed without ambiguity, the whole document is written in the
/// uncompressed format instead, which still decodes to the same document.
pub async fn encode(doc: &Value, loader: &dyn DocumentLoader, options: &Options) -> Result<Vec<u8>> {
    check_depth(doc, 1)?;
    let mut roots = Vec::new();
    collect_contexts(doc, &mut roots)?;
    let mut session = Session::new(loader, options)?;
    session.load_contexts(&roots).await?;
    let bytes = encode_with_session(doc, &session)?;
    debug!(len = bytes.len(), "Encoded document");
    Ok(bytes)
}

/// Encode a document once its session has every context loaded.
pub(crate) fn encode_with_session(doc: &Value, session: &Session) -> Result<Vec<u8>> {
    check_depth(doc, 1)?;
    let mut encoder = Encoder::new(session);
    let token = match encoder.encode_value(doc, &Position::None, None) {
        Ok(body) => Token::Tag(CompressType::Compressed.into(), Box::new(body)),
        Err(Error::Uncompressible(reason)) => {
            debug!(%reason, "Writing document uncompressed");
            Token::Tag(CompressType::Uncompressed.into(), Box::new(Token::from_json(doc)))
        }
        Err(e) => return Err(e),
    };
    // Compressed values can add a level of their own at the leaves
    let depth = token.depth();
    if depth > MAX_DEPTH {
        return Err(too_deep(depth));
    }
    Ok(token.to_vec())
}

fn too_deep(depth: usize) -> Error {
    Error::ParseLimit(format!(
        "document nests {} levels deep, more than the limit of {}",
        depth, MAX_DEPTH
    ))
}

/// Fail as soon as a value nests deeper than a decoder accepts. `depth` counts the levels already
/// open around the value, including the envelope tag.
fn check_depth(value: &Value, depth: usize) -> Result<()> {
    let depth = match value {
        Value::Array(_) | Value::Object(_) => depth + 1,
        _ => return Ok(()),
    };
    if depth > MAX_DEPTH {
        return Err(too_deep(depth));
    }
    match value {
        Value::Array(items) => items.iter().try_for_each(|v| check_depth(v, depth)),
        Value::Object(map) => map.values().try_for_each(|v| check_depth(v, depth)),
        _ => Ok(()),
    }
}

/// Check that a document-level `@context` value holds only URLs (or `null`).
pub(crate) fn check_document_context(value: &Value) -> Result<()> {
    match value {
        Value::Null | Value::String(_) => Ok(()),
        Value::Array(items) => items.iter().try_for_each(check_document_context),
        Value::Object(map) => Err(Error::EmbeddedContextNotSupported(format!(
            "inline context with {} entries",
            map.len()
        ))),
        other => Err(Error::ContextResolution(format!(
            "{} is not a valid context",
            other
        ))),
    }
}

/// Gather every `@context` value in the document, at any depth.
fn collect_contexts(value: &Value, roots: &mut Vec<Value>) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                if key == "@context" {
                    check_document_context(val)?;
                    roots.push(val.clone());
                } else {
                    collect_contexts(val, roots)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|v| collect_contexts(v, roots)),
        _ => Ok(()),
    }
}

/// The context scoped to a property, for nodes held by that property.
pub(crate) fn property_scope<'a>(term: &str, active: &'a ActiveContext) -> Option<&'a Value> {
    if is_keyword(term) || active.is_id_term(term) || active.is_type_term(term) {
        return None;
    }
    active.scoped_context(term)
}

/// The types of a node, as written in it.
fn node_types(node: &Map<String, Value>, active: &ActiveContext) -> Vec<String> {
    let mut types = Vec::new();
    for (key, val) in node {
        if !active.is_type_term(key) {
            continue;
        }
        match val {
            Value::String(ty) => types.push(ty.clone()),
            Value::Array(list) => {
                types.extend(list.iter().filter_map(|v| v.as_str()).map(|s| s.to_string()))
            }
            _ => (),
        }
    }
    types
}

/// Value objects, and nodes holding only an `@id`, stay inside the type scope they appear in.
fn keeps_type_scope(node: &Map<String, Value>, active: &ActiveContext) -> bool {
    node.contains_key("@value") || (node.len() == 1 && node.keys().all(|k| active.is_id_term(k)))
}

struct Encoder<'a> {
    session: &'a Session<'a>,
    codecs: Codecs<'a>,
    stack: ContextStack,
}

impl<'a> Encoder<'a> {
    fn new(session: &'a Session<'a>) -> Self {
        Self {
            session,
            codecs: session.codecs(),
            stack: ContextStack::new(),
        }
    }

    fn encode_value(
        &mut self,
        value: &Value,
        position: &Position,
        scope: Option<&Value>,
    ) -> Result<Token> {
        match value {
            Value::Object(node) => self.encode_node(node, scope),
            Value::Array(items) => {
                if self.codecs.claims_array(position) {
                    return Err(Error::Uncompressible(format!(
                        "nested array in a {} position",
                        position
                    )));
                }
                self.encode_list(items, position, scope)
            }
            scalar => self.codecs.encode_scalar(scalar, position),
        }
    }

    fn encode_list(
        &mut self,
        items: &[Value],
        position: &Position,
        scope: Option<&Value>,
    ) -> Result<Token> {
        let tokens = items
            .iter()
            .map(|item| self.encode_value(item, position, scope))
            .collect::<Result<Vec<_>>>()?;
        Ok(Token::Array(tokens))
    }

    fn encode_node(&mut self, node: &Map<String, Value>, scope: Option<&Value>) -> Result<Token> {
        let session = self.session;
        let keep = keeps_type_scope(node, self.stack.top());
        let checkpoint = session.resolver().resolve(
            &mut self.stack,
            scope,
            node.get("@context"),
            keep,
            |active| Ok(node_types(node, active)),
        )?;
        let result = self.encode_entries(node);
        self.stack.revert(checkpoint);
        result
    }

    fn encode_entries(&mut self, node: &Map<String, Value>) -> Result<Token> {
        let session = self.session;
        let active = self.stack.top().clone();

        // @context always goes first, so a decoder can resolve it before anything else
        let mut keys: Vec<&String> = node.keys().collect();
        keys.sort_by_key(|k| (k.as_str() != "@context", k.as_str()));

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let value = &node[key.as_str()];
            let Some(id) = session.vocab().id(key) else {
                // Terms outside the vocabulary are kept as they are, values and all
                entries.push((Token::Str(key.clone()), Token::from_json(value)));
                continue;
            };
            let position = Position::for_term(key, &active, session.term_codecs());
            let scope = property_scope(key, &active);
            let (plural, token) = match value {
                Value::Array(items) => (true, self.encode_list(items, &position, scope)?),
                _ => (false, self.encode_value(value, &position, scope)?),
            };
            entries.push((Token::UInt(term_key(id, plural)), token));
        }
        Ok(Token::Map(entries))
    }
}
