use crate::codec::literal::Literal;
use crate::element::{serialize_elem, Element, Parser};
use crate::error::{Error, Result};

use serde_json::{Map, Value};

/// An owned tree of binary tokens. This is what the transform produces and consumes; turning it
/// into bytes is a plain structural walk.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Null,
    Bool(bool),
    UInt(u64),
    /// Always less than zero.
    NegInt(i64),
    F64(f64),
    Bin(Vec<u8>),
    Str(String),
    Array(Vec<Token>),
    /// Entries keep the order they were written in.
    Map(Vec<(Token, Token)>),
    Tag(u64, Box<Token>),
}

impl Token {
    pub fn name(&self) -> &'static str {
        match self {
            Token::Null => "Null",
            Token::Bool(_) => "Bool",
            Token::UInt(_) => "UInt",
            Token::NegInt(_) => "NegInt",
            Token::F64(_) => "F64",
            Token::Bin(_) => "Bin",
            Token::Str(_) => "Str",
            Token::Array(_) => "Array",
            Token::Map(_) => "Map",
            Token::Tag(..) => "Tag",
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        if let Token::UInt(v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Token::Str(ref v) = *self {
            Some(v.as_str())
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> Option<&[u8]> {
        if let Token::Bin(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&[Token]> {
        if let Token::Array(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&[(Token, Token)]> {
        if let Token::Map(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    /// Nesting depth of the tree. Each array, map, and tag counts as one level.
    pub fn depth(&self) -> usize {
        match self {
            Token::Array(items) => 1 + items.iter().map(Token::depth).max().unwrap_or(0),
            Token::Map(entries) => {
                1 + entries
                    .iter()
                    .map(|(k, v)| k.depth().max(v.depth()))
                    .max()
                    .unwrap_or(0)
            }
            Token::Tag(_, inner) => 1 + inner.depth(),
            _ => 0,
        }
    }

    /// Append the encoded form of this token tree to a buffer.
    pub fn encode_vec(&self, buf: &mut Vec<u8>) {
        match self {
            Token::Null => serialize_elem(buf, Element::Null),
            Token::Bool(v) => serialize_elem(buf, Element::Bool(*v)),
            Token::UInt(v) => serialize_elem(buf, Element::UInt(*v)),
            Token::NegInt(v) => serialize_elem(buf, Element::NegInt(*v)),
            Token::F64(v) => serialize_elem(buf, Element::F64(*v)),
            Token::Bin(v) => serialize_elem(buf, Element::Bin(v)),
            Token::Str(v) => serialize_elem(buf, Element::Str(v)),
            Token::Array(items) => {
                serialize_elem(buf, Element::Array(items.len()));
                for item in items {
                    item.encode_vec(buf);
                }
            }
            Token::Map(entries) => {
                serialize_elem(buf, Element::Map(entries.len()));
                for (key, val) in entries {
                    key.encode_vec(buf);
                    val.encode_vec(buf);
                }
            }
            Token::Tag(tag, inner) => {
                serialize_elem(buf, Element::Tag(*tag));
                inner.encode_vec(buf);
            }
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_vec(&mut buf);
        buf
    }

    /// Parse exactly one token tree from the data. Fails on malformed data or trailing bytes.
    pub fn from_slice(data: &[u8]) -> Result<Token> {
        let mut parser = Parser::new(data);
        let token = read_token(&mut parser)?;
        if parser.remaining() > 0 {
            return Err(Error::BadEncode(format!(
                "{} bytes of trailing data after the document",
                parser.remaining()
            )));
        }
        Ok(token)
    }

    /// Convert a JSON value into tokens with no compression at all.
    pub fn from_json(value: &Value) -> Token {
        match value {
            Value::Array(items) => Token::Array(items.iter().map(Token::from_json).collect()),
            Value::Object(map) => Token::Map(
                map.iter()
                    .map(|(k, v)| (Token::Str(k.clone()), Token::from_json(v)))
                    .collect(),
            ),
            scalar => match Literal::classify(scalar) {
                Some(lit) => lit.to_token(),
                // classify covers every non-container kind
                None => Token::Null,
            },
        }
    }

    /// Convert natively-encoded tokens back into a JSON value.
    pub fn to_json(&self) -> Result<Value> {
        match self {
            Token::Array(items) => Ok(Value::Array(
                items.iter().map(|t| t.to_json()).collect::<Result<_>>()?,
            )),
            Token::Map(entries) => {
                let mut map = Map::new();
                for (key, val) in entries {
                    let key = key.as_str().ok_or_else(|| {
                        Error::UnsupportedValueType(format!(
                            "{} as an uncompressed map key",
                            key.name()
                        ))
                    })?;
                    map.insert(key.to_string(), val.to_json()?);
                }
                Ok(Value::Object(map))
            }
            token => Literal::from_token(token),
        }
    }
}

fn read_token(parser: &mut Parser) -> Result<Token> {
    let elem = parser.next().ok_or(Error::LengthTooShort {
        step: "get next token",
        actual: 0,
        expected: 1,
    })??;
    Ok(match elem {
        Element::Null => Token::Null,
        Element::Bool(v) => Token::Bool(v),
        Element::UInt(v) => Token::UInt(v),
        Element::NegInt(v) => Token::NegInt(v),
        Element::F64(v) => Token::F64(v),
        Element::Bin(v) => Token::Bin(v.to_vec()),
        Element::Str(v) => Token::Str(v.to_string()),
        Element::Array(len) => {
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(read_token(parser)?);
            }
            Token::Array(items)
        }
        Element::Map(len) => {
            let mut entries = Vec::with_capacity(len);
            for _ in 0..len {
                let key = read_token(parser)?;
                let val = read_token(parser)?;
                entries.push((key, val));
            }
            Token::Map(entries)
        }
        Element::Tag(tag) => Token::Tag(tag, Box::new(read_token(parser)?)),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn tree_roundtrip() {
        let token = Token::Tag(
            0x0501,
            Box::new(Token::Map(vec![
                (Token::UInt(0), Token::UInt(0x12)),
                (
                    Token::UInt(4),
                    Token::Array(vec![Token::UInt(1025), Token::Bin(vec![0xed, 0x01])]),
                ),
                (Token::Str("extra".into()), Token::NegInt(-5)),
            ])),
        );
        let enc = token.to_vec();
        assert_eq!(&enc[..4], &[0xd9, 0x05, 0x01, 0xa3]);
        assert_eq!(Token::from_slice(&enc).unwrap(), token);
    }

    #[test]
    fn depth_limit() {
        let mut token = Token::Null;
        for _ in 0..crate::MAX_DEPTH {
            token = Token::Array(vec![token]);
        }
        assert_eq!(token.depth(), crate::MAX_DEPTH);
        assert!(Token::from_slice(&token.to_vec()).is_ok());
        let deeper = Token::Tag(0x0500, Box::new(token));
        assert!(matches!(
            Token::from_slice(&deeper.to_vec()),
            Err(Error::ParseLimit(_))
        ));
    }

    #[test]
    fn trailing_data() {
        let mut enc = Token::UInt(1).to_vec();
        enc.push(0x00);
        assert!(matches!(Token::from_slice(&enc), Err(Error::BadEncode(_))));
    }

    #[test]
    fn truncated() {
        let enc = Token::Array(vec![Token::Null, Token::Null]).to_vec();
        assert!(Token::from_slice(&enc[..2]).is_err());
        assert!(Token::from_slice(&[]).is_err());
    }

    #[test]
    fn native_json() {
        let doc = json!({
            "name": "x",
            "count": 3,
            "offset": -40,
            "ratio": 0.25,
            "flags": [true, false, null],
            "nested": {"a": {"b": []}}
        });
        let token = Token::from_json(&doc);
        assert_eq!(token.to_json().unwrap(), doc);
        let bytes = token.to_vec();
        assert_eq!(Token::from_slice(&bytes).unwrap().to_json().unwrap(), doc);
    }

    #[test]
    fn native_rejects_binary() {
        let token = Token::Map(vec![(Token::UInt(1), Token::Null)]);
        assert!(matches!(
            token.to_json(),
            Err(Error::UnsupportedValueType(_))
        ));
        assert!(Token::Bin(vec![1]).to_json().is_err());
    }
}
