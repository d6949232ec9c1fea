//! Generic literal codec: the last resort for any scalar that no more specific codec took.

use crate::error::{Error, Result};
use crate::token::Token;

use serde_json::{Number, Value};

/// The runtime kinds a scalar JSON value can have.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal<'a> {
    Null,
    Bool(bool),
    Str(&'a str),
    UInt(u64),
    /// Always less than zero.
    NegInt(i64),
    Float(f64),
}

impl<'a> Literal<'a> {
    /// Classify a scalar value. Arrays and objects aren't literals.
    pub fn classify(value: &'a Value) -> Option<Literal<'a>> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(v) => Some(Literal::Bool(*v)),
            Value::String(v) => Some(Literal::Str(v)),
            Value::Number(n) => Some(if let Some(v) = n.as_u64() {
                Literal::UInt(v)
            } else if let Some(v) = n.as_i64() {
                Literal::NegInt(v)
            } else {
                // Without arbitrary precision, every number is one of the three
                Literal::Float(n.as_f64().unwrap_or(f64::NAN))
            }),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_token(&self) -> Token {
        match *self {
            Literal::Null => Token::Null,
            Literal::Bool(v) => Token::Bool(v),
            Literal::Str(v) => Token::Str(v.to_string()),
            Literal::UInt(v) => Token::UInt(v),
            Literal::NegInt(v) => Token::NegInt(v),
            Literal::Float(v) => Token::F64(v),
        }
    }

    /// Decode a literal token. Binary data, tags, and containers have no literal meaning.
    pub fn from_token(token: &Token) -> Result<Value> {
        match *token {
            Token::Null => Ok(Value::Null),
            Token::Bool(v) => Ok(Value::Bool(v)),
            Token::Str(ref v) => Ok(Value::String(v.clone())),
            Token::UInt(v) => Ok(Value::from(v)),
            Token::NegInt(v) => Ok(Value::from(v)),
            Token::F64(v) => Number::from_f64(v).map(Value::Number).ok_or_else(|| {
                Error::UnsupportedValueType(format!("non-finite float {}", v))
            }),
            ref other => Err(Error::UnsupportedValueType(format!(
                "{} where a literal was expected",
                other.name()
            ))),
        }
    }
}
