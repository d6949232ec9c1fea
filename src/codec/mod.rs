//! Value codecs, and the dispatch that picks one based on where a value sits in the document.
//!
//! Every value is encoded according to its [`Position`], which the encoder and decoder both
//! derive from the key holding the value and the active context. Within a position, codecs are
//! tried from most to least specific, and the generic [`Literal`] codec takes whatever is left.
//!
//! A compressed position "claims" some token kinds: integers for table ids and epoch seconds,
//! arrays for URL schemes and millisecond timestamps. A native value that would land on a claimed
//! kind can't be encoded unambiguously, and produces [`Error::Uncompressible`].

pub mod date;
pub mod literal;
pub mod multibase;
pub mod url;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use self::date::{XsdDate, XsdDateTime};
use self::literal::Literal;
use self::multibase::Multibase;
use crate::context::{is_keyword, ActiveContext};
use crate::error::{Error, Result};
use crate::tables::type_table::{MULTIBASE_TYPE, NONE_TABLE, URL_TABLE, XSD_DATE, XSD_DATETIME};
use crate::tables::{ContextRegistry, TypeTable, Vocabulary};
use crate::token::Token;
use crate::uint_bytes::{bytes_to_uint, uint_to_bytes};

/// Codecs an application can force onto a term, by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedCodec {
    Url,
    Vocab,
    Multibase,
    Date,
    DateTime,
    None,
}

impl NamedCodec {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "url" => Some(NamedCodec::Url),
            "vocab" => Some(NamedCodec::Vocab),
            "multibase" => Some(NamedCodec::Multibase),
            "date" => Some(NamedCodec::Date),
            "dateTime" => Some(NamedCodec::DateTime),
            "none" => Some(NamedCodec::None),
            _ => None,
        }
    }

    fn position(&self) -> Position {
        match *self {
            NamedCodec::Url => Position::Url,
            NamedCodec::Vocab => Position::Vocab,
            NamedCodec::Multibase => Position::Typed(MULTIBASE_TYPE.to_string()),
            NamedCodec::Date => Position::Typed(XSD_DATE.to_string()),
            NamedCodec::DateTime => Position::Typed(XSD_DATETIME.to_string()),
            NamedCodec::None => Position::None,
        }
    }
}

/// Where a value sits, which decides how it gets encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Position {
    /// A value of `@context`.
    Context,
    /// A value of `@type` (or an alias), or of a term typed `@vocab`.
    Vocab,
    /// A value of `@id` (or an alias), or of a term typed `@id`.
    Url,
    /// A value of a term with a declared type, holding the fully expanded type IRI.
    Typed(String),
    /// Anything else.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypeKind {
    Date,
    DateTime,
    Multibase,
    Other,
}

impl TypeKind {
    fn of(type_iri: &str) -> Self {
        match type_iri {
            XSD_DATE => TypeKind::Date,
            XSD_DATETIME => TypeKind::DateTime,
            MULTIBASE_TYPE => TypeKind::Multibase,
            _ => TypeKind::Other,
        }
    }

    /// Whether leftover strings of this type go through the `none` table. Types that already
    /// give byte strings a meaning of their own keep them plain.
    fn interns(type_iri: &str) -> bool {
        TypeKind::of(type_iri) == TypeKind::Other && !TypeTable::is_byte_packed(type_iri)
    }
}

impl Position {
    /// Work out the position of a term's values.
    ///
    /// Keywords and their aliases come first, then application overrides, then the term's
    /// declared type in the active context.
    pub fn for_term(
        term: &str,
        active: &ActiveContext,
        overrides: &BTreeMap<String, NamedCodec>,
    ) -> Position {
        if term == "@context" {
            return Position::Context;
        }
        if active.is_type_term(term) {
            return Position::Vocab;
        }
        if active.is_id_term(term) {
            return Position::Url;
        }
        if is_keyword(term) {
            return Position::None;
        }
        if let Some(codec) = overrides.get(term) {
            return codec.position();
        }
        match active
            .term(term)
            .and_then(|info| info.definition.value_type())
        {
            Some("@id") => Position::Url,
            Some("@vocab") => Position::Vocab,
            Some(ty) if is_keyword(ty) => Position::None,
            Some(ty) => Position::Typed(active.expand_iri(ty)),
            None => Position::None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Position::Context => f.write_str("@context"),
            Position::Vocab => f.write_str("vocab"),
            Position::Url => f.write_str("url"),
            Position::Typed(ref ty) => write!(f, "typed <{}>", ty),
            Position::None => f.write_str("untyped"),
        }
    }
}

/// Decode one `@context` value. Needs only the registry, so it can run before the vocabulary
/// exists.
pub fn decode_context(token: &Token, registry: &ContextRegistry) -> Result<Value> {
    match *token {
        Token::UInt(id) => registry
            .url(id)
            .map(|url| Value::String(url.to_string()))
            .ok_or_else(|| Error::UnknownCompressedValue(format!("context id 0x{:x}", id))),
        Token::Str(ref url) => Ok(Value::String(url.clone())),
        Token::Null => Ok(Value::Null),
        Token::Array(ref items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| decode_context(item, registry))
                .collect::<Result<_>>()?,
        )),
        ref other => Err(Error::UnknownCompressedValue(format!(
            "{} as a context value",
            other.name()
        ))),
    }
}

/// The scalar codecs of one session.
#[derive(Clone, Copy, Debug)]
pub struct Codecs<'s> {
    vocab: &'s Vocabulary,
    registry: &'s ContextRegistry,
    types: &'s TypeTable,
}

impl<'s> Codecs<'s> {
    pub fn new(vocab: &'s Vocabulary, registry: &'s ContextRegistry, types: &'s TypeTable) -> Self {
        Self {
            vocab,
            registry,
            types,
        }
    }

    /// Whether arrays in this position are compressed values rather than lists of values.
    pub fn claims_array(&self, position: &Position) -> bool {
        match position {
            Position::Vocab | Position::Url => true,
            Position::Typed(ty) => TypeKind::of(ty) == TypeKind::DateTime,
            _ => false,
        }
    }

    fn claims_uint(&self, position: &Position) -> bool {
        match position {
            Position::Context | Position::Vocab | Position::Url => true,
            Position::Typed(ty) => match TypeKind::of(ty) {
                TypeKind::Date | TypeKind::DateTime => true,
                _ => !TypeTable::is_byte_packed(ty) && self.types.get(ty).is_some(),
            },
            Position::None => false,
        }
    }

    fn claims_negint(&self, position: &Position) -> bool {
        match position {
            Position::Typed(ty) => {
                matches!(TypeKind::of(ty), TypeKind::Date | TypeKind::DateTime)
            }
            _ => false,
        }
    }

    /// Encode a scalar value. Arrays and objects are walked by the caller.
    pub fn encode_scalar(&self, value: &Value, position: &Position) -> Result<Token> {
        let literal = Literal::classify(value).ok_or_else(|| {
            Error::UnsupportedValueType(format!("container in a {} position", position))
        })?;
        match literal {
            Literal::Str(s) => self.encode_str(s, position),
            Literal::UInt(v) if self.claims_uint(position) => Err(Error::Uncompressible(format!(
                "native integer {} in a {} position",
                v, position
            ))),
            Literal::NegInt(v) if self.claims_negint(position) => Err(Error::Uncompressible(
                format!("native integer {} in a {} position", v, position),
            )),
            other => Ok(other.to_token()),
        }
    }

    fn encode_str(&self, s: &str, position: &Position) -> Result<Token> {
        match position {
            Position::Context => Ok(self
                .registry
                .id(s)
                .map(Token::UInt)
                .unwrap_or_else(|| Token::Str(s.to_string()))),
            Position::Vocab => Ok(match self.vocab.id(s) {
                Some(id) => Token::UInt(id),
                None => url::encode(s),
            }),
            Position::Url => Ok(match self.table_id(URL_TABLE, s) {
                Some(id) => Token::UInt(id),
                None => url::encode(s),
            }),
            Position::Typed(ty) => {
                if let Some(id) = self.table_id(ty, s) {
                    return self.table_token(ty, id);
                }
                let packed = match TypeKind::of(ty) {
                    TypeKind::Date => XsdDate::probe(s).map(|d| d.to_token()),
                    TypeKind::DateTime => XsdDateTime::probe(s).map(|d| d.to_token()),
                    TypeKind::Multibase => Multibase::probe(s).map(|m| m.to_token()),
                    TypeKind::Other => None,
                };
                match packed {
                    Some(token) => Ok(token),
                    None if TypeKind::interns(ty) => self.intern(s),
                    None => Ok(Token::Str(s.to_string())),
                }
            }
            Position::None => self.intern(s),
        }
    }

    fn intern(&self, s: &str) -> Result<Token> {
        match self.table_id(NONE_TABLE, s) {
            Some(id) => self.table_token(NONE_TABLE, id),
            None => Ok(Token::Str(s.to_string())),
        }
    }

    fn table_id(&self, table: &str, value: &str) -> Option<u64> {
        self.types.get(table).and_then(|t| t.id(value))
    }

    fn table_token(&self, table: &str, id: u64) -> Result<Token> {
        if TypeTable::is_byte_packed(table) {
            Ok(Token::Bin(uint_to_bytes(id)?))
        } else {
            Ok(Token::UInt(id))
        }
    }

    fn table_value(&self, table: &str, id: u64) -> Result<Value> {
        self.types
            .get(table)
            .and_then(|t| t.value(id))
            .map(|v| Value::String(v.to_string()))
            .ok_or_else(|| Error::UnknownCompressedValue(format!("id {} in table <{}>", id, table)))
    }

    /// Decode a scalar, or a compressed value that happens to be an array.
    pub fn decode_scalar(&self, token: &Token, position: &Position) -> Result<Value> {
        match (position, token) {
            (Position::Context, _) => decode_context(token, self.registry),
            (Position::Vocab, Token::UInt(id)) => self
                .vocab
                .term(*id)
                .map(|t| Value::String(t.to_string()))
                .ok_or_else(|| Error::UnknownCompressedValue(format!("term id {}", id))),
            (Position::Url, Token::UInt(id)) => self.table_value(URL_TABLE, *id),
            (Position::Vocab | Position::Url, Token::Array(parts)) => {
                Ok(Value::String(url::decode(parts)?))
            }
            (Position::Typed(ty), _) => self.decode_typed(ty, token),
            (Position::None, Token::Bin(bytes)) => {
                self.table_value(NONE_TABLE, bytes_to_uint(bytes)?)
            }
            _ => Literal::from_token(token),
        }
    }

    fn decode_typed(&self, ty: &str, token: &Token) -> Result<Value> {
        let kind = TypeKind::of(ty);
        match *token {
            Token::Bin(ref bytes) if kind == TypeKind::Multibase => {
                Ok(Value::String(Multibase::decode(bytes)?))
            }
            Token::Bin(ref bytes) if TypeTable::is_byte_packed(ty) => {
                self.table_value(ty, bytes_to_uint(bytes)?)
            }
            Token::Bin(ref bytes) if TypeKind::interns(ty) => {
                self.table_value(NONE_TABLE, bytes_to_uint(bytes)?)
            }
            Token::UInt(_) | Token::NegInt(_) if kind == TypeKind::Date => {
                Ok(Value::String(XsdDate::decode(token)?))
            }
            Token::UInt(_) | Token::NegInt(_) | Token::Array(_) if kind == TypeKind::DateTime => {
                Ok(Value::String(XsdDateTime::decode(token)?))
            }
            Token::UInt(id) if self.claims_uint(&Position::Typed(ty.to_string())) => {
                self.table_value(ty, id)
            }
            _ => Literal::from_token(token),
        }
    }
}
