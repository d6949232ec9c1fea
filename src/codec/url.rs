//! URL compression by scheme. A recognized URL becomes an array whose first element is the
//! scheme's id, followed by scheme-specific parts. Unrecognized URLs stay strings.
//!
//! | Scheme        | Id   | Parts                                             |
//! | ------------- | ---- | ------------------------------------------------- |
//! | `http://`     | 1    | rest of the URL                                   |
//! | `https://`    | 2    | rest of the URL                                   |
//! | `urn:uuid:`   | 3    | 16 bytes, or the text if not canonical lowercase  |
//! | `data:`       | 4    | media type and bytes for base64 data, else text   |
//! | `did:v1:nym:` | 1024 | authority, then fragment if present               |
//! | `did:key:`    | 1025 | authority, then fragment if present               |
//!
//! DID parts are raw bytes when they are base58-btc multibase (a `z` prefix), and text otherwise.

use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;

use super::multibase::base58_exact;
use crate::error::{Error, Result};
use crate::token::Token;

fn uuid_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").ok()
    })
    .as_ref()
}

fn data_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?s)(?P<media>[^,]*?)(?P<b64>;base64)?,(?P<data>.*)$").ok())
        .as_ref()
}

fn malformed(scheme: &str) -> Error {
    Error::UnknownCompressedValue(format!("malformed {} URL parts", scheme))
}

/// One URL scheme's compression.
trait SchemeCodec<'a>: Sized {
    const ID: u64;
    const PREFIX: &'static str;

    /// Try to compress the part of the URL after the prefix.
    fn probe(suffix: &'a str) -> Option<Self>;

    /// The compressed parts, not including the scheme id.
    fn parts(&self) -> Vec<Token>;

    /// Rebuild the full URL from the parts that followed the scheme id.
    fn decode(parts: &[Token]) -> Result<String>;
}

fn try_scheme<'a, C: SchemeCodec<'a>>(value: &'a str) -> Option<Token> {
    let suffix = value.strip_prefix(C::PREFIX)?;
    let codec = C::probe(suffix)?;
    let mut parts = vec![Token::UInt(C::ID)];
    parts.extend(codec.parts());
    Some(Token::Array(parts))
}

fn text_part(parts: &[Token], prefix: &str, scheme: &str) -> Result<String> {
    match parts {
        [Token::Str(rest)] => Ok(format!("{}{}", prefix, rest)),
        _ => Err(malformed(scheme)),
    }
}

struct Http<'a>(&'a str);

impl<'a> SchemeCodec<'a> for Http<'a> {
    const ID: u64 = 1;
    const PREFIX: &'static str = "http://";

    fn probe(suffix: &'a str) -> Option<Self> {
        Some(Self(suffix))
    }

    fn parts(&self) -> Vec<Token> {
        vec![Token::Str(self.0.to_string())]
    }

    fn decode(parts: &[Token]) -> Result<String> {
        text_part(parts, Self::PREFIX, "http")
    }
}

struct Https<'a>(&'a str);

impl<'a> SchemeCodec<'a> for Https<'a> {
    const ID: u64 = 2;
    const PREFIX: &'static str = "https://";

    fn probe(suffix: &'a str) -> Option<Self> {
        Some(Self(suffix))
    }

    fn parts(&self) -> Vec<Token> {
        vec![Token::Str(self.0.to_string())]
    }

    fn decode(parts: &[Token]) -> Result<String> {
        text_part(parts, Self::PREFIX, "https")
    }
}

enum UuidUrn<'a> {
    Bytes(Vec<u8>),
    Text(&'a str),
}

impl<'a> SchemeCodec<'a> for UuidUrn<'a> {
    const ID: u64 = 3;
    const PREFIX: &'static str = "urn:uuid:";

    fn probe(suffix: &'a str) -> Option<Self> {
        // Upper or mixed case wouldn't survive the trip through bytes
        if uuid_regex().map_or(false, |re| re.is_match(suffix)) {
            if let Ok(bytes) = hex::decode(suffix.replace('-', "")) {
                return Some(UuidUrn::Bytes(bytes));
            }
        }
        Some(UuidUrn::Text(suffix))
    }

    fn parts(&self) -> Vec<Token> {
        match self {
            UuidUrn::Bytes(bytes) => vec![Token::Bin(bytes.clone())],
            UuidUrn::Text(text) => vec![Token::Str(text.to_string())],
        }
    }

    fn decode(parts: &[Token]) -> Result<String> {
        match parts {
            [Token::Bin(bytes)] => {
                if bytes.len() != 16 {
                    return Err(Error::MalformedBytes {
                        step: "decode UUID",
                        len: bytes.len(),
                    });
                }
                let hex = hex::encode(bytes);
                Ok(format!(
                    "{}{}-{}-{}-{}-{}",
                    Self::PREFIX,
                    &hex[0..8],
                    &hex[8..12],
                    &hex[12..16],
                    &hex[16..20],
                    &hex[20..32]
                ))
            }
            _ => text_part(parts, Self::PREFIX, "urn:uuid"),
        }
    }
}

enum DataUrl<'a> {
    Base64 { media: &'a str, data: Vec<u8> },
    Text(&'a str),
}

impl<'a> SchemeCodec<'a> for DataUrl<'a> {
    const ID: u64 = 4;
    const PREFIX: &'static str = "data:";

    fn probe(suffix: &'a str) -> Option<Self> {
        let packed = data_regex().and_then(|re| re.captures(suffix)).and_then(|caps| {
            caps.name("b64")?;
            let media = caps.name("media")?.as_str();
            let text = caps.name("data")?.as_str();
            let data = STANDARD.decode(text).ok()?;
            (STANDARD.encode(&data) == text).then_some(DataUrl::Base64 { media, data })
        });
        Some(packed.unwrap_or(DataUrl::Text(suffix)))
    }

    fn parts(&self) -> Vec<Token> {
        match self {
            DataUrl::Base64 { media, data } => {
                vec![Token::Str(media.to_string()), Token::Bin(data.clone())]
            }
            DataUrl::Text(text) => vec![Token::Str(text.to_string())],
        }
    }

    fn decode(parts: &[Token]) -> Result<String> {
        match parts {
            [Token::Str(media), Token::Bin(data)] => Ok(format!(
                "{}{};base64,{}",
                Self::PREFIX,
                media,
                STANDARD.encode(data)
            )),
            _ => text_part(parts, Self::PREFIX, "data"),
        }
    }
}

/// One piece of a DID URL: raw bytes if it was base58-btc multibase, otherwise the text.
enum DidPart<'a> {
    Bytes(Vec<u8>),
    Text(&'a str),
}

impl<'a> DidPart<'a> {
    fn probe(text: &'a str) -> Self {
        text.strip_prefix('z')
            .and_then(base58_exact)
            .map(DidPart::Bytes)
            .unwrap_or(DidPart::Text(text))
    }

    fn to_token(&self) -> Token {
        match self {
            DidPart::Bytes(bytes) => Token::Bin(bytes.clone()),
            DidPart::Text(text) => Token::Str(text.to_string()),
        }
    }

    fn decode(token: &Token, scheme: &str) -> Result<String> {
        match token {
            Token::Bin(bytes) => Ok(format!("z{}", bs58::encode(bytes).into_string())),
            Token::Str(text) => Ok(text.clone()),
            _ => Err(malformed(scheme)),
        }
    }
}

/// The authority of a DID, and the fragment after its first `#`.
struct DidParts<'a> {
    authority: DidPart<'a>,
    fragment: Option<DidPart<'a>>,
}

impl<'a> DidParts<'a> {
    fn probe(suffix: &'a str) -> Self {
        match suffix.split_once('#') {
            Some((authority, fragment)) => Self {
                authority: DidPart::probe(authority),
                fragment: Some(DidPart::probe(fragment)),
            },
            None => Self {
                authority: DidPart::probe(suffix),
                fragment: None,
            },
        }
    }

    fn parts(&self) -> Vec<Token> {
        let mut parts = vec![self.authority.to_token()];
        if let Some(fragment) = &self.fragment {
            parts.push(fragment.to_token());
        }
        parts
    }

    fn decode(parts: &[Token], prefix: &str, scheme: &str) -> Result<String> {
        match parts {
            [authority] => Ok(format!("{}{}", prefix, DidPart::decode(authority, scheme)?)),
            [authority, fragment] => Ok(format!(
                "{}{}#{}",
                prefix,
                DidPart::decode(authority, scheme)?,
                DidPart::decode(fragment, scheme)?
            )),
            _ => Err(malformed(scheme)),
        }
    }
}

struct DidV1Nym<'a>(DidParts<'a>);

impl<'a> SchemeCodec<'a> for DidV1Nym<'a> {
    const ID: u64 = 1024;
    const PREFIX: &'static str = "did:v1:nym:";

    fn probe(suffix: &'a str) -> Option<Self> {
        Some(Self(DidParts::probe(suffix)))
    }

    fn parts(&self) -> Vec<Token> {
        self.0.parts()
    }

    fn decode(parts: &[Token]) -> Result<String> {
        DidParts::decode(parts, Self::PREFIX, "did:v1:nym")
    }
}

struct DidKey<'a>(DidParts<'a>);

impl<'a> SchemeCodec<'a> for DidKey<'a> {
    const ID: u64 = 1025;
    const PREFIX: &'static str = "did:key:";

    fn probe(suffix: &'a str) -> Option<Self> {
        Some(Self(DidParts::probe(suffix)))
    }

    fn parts(&self) -> Vec<Token> {
        self.0.parts()
    }

    fn decode(parts: &[Token]) -> Result<String> {
        DidParts::decode(parts, Self::PREFIX, "did:key")
    }
}

/// Compress a URL by scheme, or leave it as a plain string.
pub fn encode(value: &str) -> Token {
    try_scheme::<Http>(value)
        .or_else(|| try_scheme::<Https>(value))
        .or_else(|| try_scheme::<UuidUrn>(value))
        .or_else(|| try_scheme::<DataUrl>(value))
        .or_else(|| try_scheme::<DidV1Nym>(value))
        .or_else(|| try_scheme::<DidKey>(value))
        .unwrap_or_else(|| Token::Str(value.to_string()))
}

/// Rebuild a URL from a scheme array.
pub fn decode(parts: &[Token]) -> Result<String> {
    let (id, rest) = parts
        .split_first()
        .ok_or_else(|| Error::UnknownCompressedValue("empty URL array".to_string()))?;
    let id = id.as_u64().ok_or_else(|| {
        Error::UnknownCompressedValue(format!("{} as a URL scheme id", id.name()))
    })?;
    match id {
        id if id == Http::ID => Http::decode(rest),
        id if id == Https::ID => Https::decode(rest),
        id if id == UuidUrn::ID => UuidUrn::decode(rest),
        id if id == DataUrl::ID => DataUrl::decode(rest),
        id if id == DidV1Nym::ID => DidV1Nym::decode(rest),
        id if id == DidKey::ID => DidKey::decode(rest),
        _ => Err(Error::UnknownCompressedValue(format!(
            "URL scheme id {}",
            id
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(url: &str) -> Token {
        let token = encode(url);
        let parts = token.as_array().unwrap();
        assert_eq!(decode(parts).unwrap(), url);
        token
    }

    #[test]
    fn http() {
        let token = round_trip("https://example.com/path?q=1");
        assert_eq!(
            token,
            Token::Array(vec![Token::UInt(2), Token::Str("example.com/path?q=1".into())])
        );
        let token = round_trip("http://example.com");
        assert_eq!(token.as_array().unwrap()[0], Token::UInt(1));
    }

    #[test]
    fn uuid() {
        let token = round_trip("urn:uuid:188e8450-269e-11eb-b545-d3692cf35398");
        let parts = token.as_array().unwrap();
        assert_eq!(parts[0], Token::UInt(3));
        assert_eq!(parts[1].as_slice().unwrap().len(), 16);

        let token = round_trip("urn:uuid:188E8450-269E-11EB-B545-D3692CF35398");
        assert_eq!(
            token.as_array().unwrap()[1],
            Token::Str("188E8450-269E-11EB-B545-D3692CF35398".into())
        );
        round_trip("urn:uuid:not-a-uuid");
    }

    #[test]
    fn data() {
        let token = round_trip("data:image/png;base64,iVBORw0KGgo=");
        let parts = token.as_array().unwrap();
        assert_eq!(parts[1], Token::Str("image/png".into()));
        assert!(matches!(parts[2], Token::Bin(_)));

        let token = round_trip("data:,Hello%2C%20World");
        assert_eq!(
            token,
            Token::Array(vec![Token::UInt(4), Token::Str(",Hello%2C%20World".into())])
        );
        // Non-canonical base64 keeps the text
        let token = round_trip("data:text/plain;base64,SGVsbG8");
        assert_eq!(token.as_array().unwrap().len(), 2);
    }

    #[test]
    fn did_key() {
        let did = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";
        let token = round_trip(did);
        let parts = token.as_array().unwrap();
        assert_eq!(parts[0], Token::UInt(1025));
        assert!(matches!(parts[1], Token::Bin(_)));
        assert_eq!(parts.len(), 2);

        let with_fragment = format!("{}#z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK", did);
        let token = round_trip(&with_fragment);
        let parts = token.as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[2], Token::Bin(_)));
    }

    #[test]
    fn did_v1_text_parts() {
        let token = round_trip("did:v1:nym:not-multibase#keys-1");
        assert_eq!(
            token,
            Token::Array(vec![
                Token::UInt(1024),
                Token::Str("not-multibase".into()),
                Token::Str("keys-1".into())
            ])
        );
    }

    #[test]
    fn unknown_scheme() {
        assert_eq!(encode("ftp://x"), Token::Str("ftp://x".into()));
        assert_eq!(encode("did:web:example.com"), Token::Str("did:web:example.com".into()));
        assert!(matches!(
            decode(&[Token::UInt(99), Token::Str("x".into())]),
            Err(Error::UnknownCompressedValue(_))
        ));
        assert!(decode(&[]).is_err());
        assert!(decode(&[Token::UInt(1)]).is_err());
    }

    #[test]
    fn bad_uuid_bytes() {
        assert!(matches!(
            decode(&[Token::UInt(3), Token::Bin(vec![0; 4])]),
            Err(Error::MalformedBytes { len: 4, .. })
        ));
    }
}
