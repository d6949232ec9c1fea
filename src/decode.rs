use serde_json::{Map, Value};
use tracing::debug;

use crate::codec::{decode_context, Codecs, Position};
use crate::compress_type::CompressType;
use crate::context::{ActiveContext, ContextStack, DocumentLoader};
use crate::encode::{check_document_context, property_scope};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::session::Session;
use crate::tables::vocab::split_term_key;
use crate::tables::ContextRegistry;
use crate::token::Token;

const CONTEXT_TERM_ID: u64 = 0;

/// Decode a binary document back into JSON-LD.
///
/// Both formats are accepted. Compressed documents need the same `options` they were encoded
/// with, and a `loader` that serves the same contexts.
pub async fn decode(bytes: &[u8], loader: &dyn DocumentLoader, options: &Options) -> Result<Value> {
    let token = Token::from_slice(bytes)?;
    let (tag, body) = match token {
        Token::Tag(tag, body) => (tag, body),
        other => {
            return Err(Error::BadHeader(format!(
                "expected a format tag, found {}",
                other.name()
            )))
        }
    };
    match CompressType::try_from(tag) {
        Ok(CompressType::Uncompressed) => {
            debug!("Decoding uncompressed document");
            body.to_json()
        }
        Ok(CompressType::Compressed) => {
            let mut session = Session::new(loader, options)?;
            let mut roots = Vec::new();
            collect_contexts(&body, session.registry(), &mut roots)?;
            session.load_contexts(&roots).await?;
            debug!(len = bytes.len(), "Decoding compressed document");
            decode_with_session(&body, &session)
        }
        Err(tag) => Err(Error::BadHeader(format!(
            "unrecognized format tag 0x{:04x}",
            tag
        ))),
    }
}

/// Decode a compressed body once its session has every context loaded.
pub(crate) fn decode_with_session(body: &Token, session: &Session) -> Result<Value> {
    let mut decoder = Decoder::new(session);
    decoder.decode_value(body, &Position::None, None)
}

fn is_context_key(key: &Token) -> bool {
    matches!(*key, Token::UInt(k) if split_term_key(k).0 == CONTEXT_TERM_ID)
}

/// Gather every `@context` value in a compressed body, at any depth. Compressed maps use the
/// `@context` term id; maps kept in native form use the plain key.
fn collect_contexts(token: &Token, registry: &ContextRegistry, roots: &mut Vec<Value>) -> Result<()> {
    match token {
        Token::Map(entries) => {
            for (key, val) in entries {
                if is_context_key(key) {
                    roots.push(decode_context(val, registry)?);
                } else if key.as_str() == Some("@context") {
                    let context = val.to_json()?;
                    check_document_context(&context)?;
                    roots.push(context);
                } else {
                    collect_contexts(val, registry, roots)?;
                }
            }
            Ok(())
        }
        Token::Array(items) => items
            .iter()
            .try_for_each(|item| collect_contexts(item, registry, roots)),
        Token::Tag(_, inner) => collect_contexts(inner, registry, roots),
        _ => Ok(()),
    }
}

/// The types of a compressed node, decoded against the frame from before any type scopes.
fn node_types(
    codecs: &Codecs,
    session: &Session,
    entries: &[(Token, Token)],
    active: &ActiveContext,
) -> Result<Vec<String>> {
    let mut types = Vec::new();
    for (key, val) in entries {
        match key {
            Token::UInt(k) => {
                let (id, plural) = split_term_key(*k);
                let Some(term) = session.vocab().term(id) else {
                    continue;
                };
                if !active.is_type_term(term) {
                    continue;
                }
                let values: &[Token] = match (plural, val) {
                    (true, Token::Array(items)) => items,
                    _ => std::slice::from_ref(val),
                };
                for v in values {
                    if matches!(v, Token::Map(_)) {
                        continue;
                    }
                    if let Value::String(ty) = codecs.decode_scalar(v, &Position::Vocab)? {
                        types.push(ty);
                    }
                }
            }
            Token::Str(term) if active.is_type_term(term) => match val.to_json()? {
                Value::String(ty) => types.push(ty),
                Value::Array(list) => types.extend(
                    list.into_iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string())),
                ),
                _ => (),
            },
            _ => (),
        }
    }
    Ok(types)
}

/// Compressed counterpart of the encoder's check: value objects, and nodes holding only an
/// `@id`, stay inside the type scope they appear in.
fn keeps_type_scope<'t>(
    session: &'t Session,
    entries: &'t [(Token, Token)],
    active: &ActiveContext,
) -> bool {
    let term = |key: &'t Token| -> Option<&'t str> { match *key {
        Token::UInt(k) => session.vocab().term(split_term_key(k).0),
        Token::Str(ref term) => Some(term.as_str()),
        _ => None,
    } };
    let is_value = entries.iter().any(|(key, _)| term(key) == Some("@value"));
    let id_only = match entries {
        [(key, _)] => term(key).is_some_and(|t| active.is_id_term(t)),
        _ => false,
    };
    is_value || id_only
}

struct Decoder<'a> {
    session: &'a Session<'a>,
    codecs: Codecs<'a>,
    stack: ContextStack,
}

impl<'a> Decoder<'a> {
    fn new(session: &'a Session<'a>) -> Self {
        Self {
            session,
            codecs: session.codecs(),
            stack: ContextStack::new(),
        }
    }

    fn decode_value(
        &mut self,
        token: &Token,
        position: &Position,
        scope: Option<&Value>,
    ) -> Result<Value> {
        match token {
            Token::Map(entries) => self.decode_node(entries, scope),
            Token::Array(items) if !self.codecs.claims_array(position) => {
                self.decode_list(items, position, scope)
            }
            _ => self.codecs.decode_scalar(token, position),
        }
    }

    fn decode_list(
        &mut self,
        items: &[Token],
        position: &Position,
        scope: Option<&Value>,
    ) -> Result<Value> {
        let values = items
            .iter()
            .map(|item| self.decode_value(item, position, scope))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(values))
    }

    fn decode_node(&mut self, entries: &[(Token, Token)], scope: Option<&Value>) -> Result<Value> {
        let session = self.session;
        let codecs = self.codecs;
        let node_context = entries
            .iter()
            .find(|(key, _)| is_context_key(key))
            .map(|(_, val)| decode_context(val, session.registry()))
            .transpose()?;
        let keep = keeps_type_scope(session, entries, self.stack.top());
        let checkpoint = session.resolver().resolve(
            &mut self.stack,
            scope,
            node_context.as_ref(),
            keep,
            |active| node_types(&codecs, session, entries, active),
        )?;
        let result = self.decode_entries(entries);
        self.stack.revert(checkpoint);
        result
    }

    fn decode_entries(&mut self, entries: &[(Token, Token)]) -> Result<Value> {
        let session = self.session;
        let active = self.stack.top().clone();
        let mut node = Map::new();
        for (key, val) in entries {
            let id = match *key {
                Token::UInt(k) => k,
                Token::Str(ref term) => {
                    node.insert(term.clone(), val.to_json()?);
                    continue;
                }
                ref other => {
                    return Err(Error::UnknownCompressedValue(format!(
                        "{} as a map key",
                        other.name()
                    )))
                }
            };
            let (id, plural) = split_term_key(id);
            let term = session
                .vocab()
                .term(id)
                .ok_or_else(|| Error::UnknownCompressedValue(format!("term id {}", id)))?;
            let position = Position::for_term(term, &active, session.term_codecs());
            let scope = property_scope(term, &active);
            let value = if plural {
                let items = val.as_array().ok_or_else(|| {
                    Error::BadEncode(format!(
                        "term \"{}\" is marked as a list but holds {}",
                        term,
                        val.name()
                    ))
                })?;
                self.decode_list(items, &position, scope)?
            } else {
                self.decode_value(val, &position, scope)?
            };
            node.insert(term.to_string(), value);
        }
        Ok(Value::Object(node))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::StaticLoader;
    use serde_json::json;

    fn block_decode(bytes: &[u8]) -> Result<Value> {
        let loader = StaticLoader::new();
        futures_executor::block_on(decode(bytes, &loader, &Options::default()))
    }

    #[test]
    fn bad_header() {
        let bytes = Token::UInt(5).to_vec();
        assert!(matches!(block_decode(&bytes), Err(Error::BadHeader(_))));
        let bytes = Token::Tag(0x0502, Box::new(Token::Null)).to_vec();
        assert!(matches!(block_decode(&bytes), Err(Error::BadHeader(_))));
    }

    #[test]
    fn uncompressed_passthrough() {
        let doc = json!({"name": "x", "list": [1, -2, 2.5, null, true]});
        let bytes = Token::Tag(0x0500, Box::new(Token::from_json(&doc))).to_vec();
        assert_eq!(block_decode(&bytes).unwrap(), doc);
    }

    #[test]
    fn truncated() {
        let mut bytes = Token::Tag(0x0500, Box::new(Token::Str("hello".into()))).to_vec();
        bytes.pop();
        assert!(block_decode(&bytes).is_err());
    }

    #[test]
    fn unknown_term_id() {
        let body = Token::Map(vec![(Token::UInt(200), Token::Null)]);
        let bytes = Token::Tag(0x0501, Box::new(body)).to_vec();
        assert!(matches!(
            block_decode(&bytes),
            Err(Error::UnknownCompressedValue(_))
        ));
    }

    #[test]
    fn plural_without_array() {
        // @type's plural key, holding a plain value
        let body = Token::Map(vec![(Token::UInt(3), Token::Str("A".into()))]);
        let bytes = Token::Tag(0x0501, Box::new(body)).to_vec();
        assert!(matches!(block_decode(&bytes), Err(Error::BadEncode(_))));
    }

    #[test]
    fn unknown_context_id() {
        let body = Token::Map(vec![(Token::UInt(0), Token::UInt(0x9000))]);
        let bytes = Token::Tag(0x0501, Box::new(body)).to_vec();
        assert!(matches!(
            block_decode(&bytes),
            Err(Error::UnknownCompressedValue(_))
        ));
    }
}
