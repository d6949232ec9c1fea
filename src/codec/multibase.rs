//! Multibase strings: a one-character base prefix followed by the encoded payload. Compressed,
//! they become bytes holding the prefix character followed by the raw payload.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};

use crate::error::{Error, Result};
use crate::token::Token;

const BASE58BTC: u8 = b'z';
const BASE64URL: u8 = b'u';
const BASE64PAD: u8 = b'M';

/// Decode base58-btc text, but only if encoding the result gives back the exact same text.
pub(crate) fn base58_exact(text: &str) -> Option<Vec<u8>> {
    let bytes = bs58::decode(text).into_vec().ok()?;
    (bs58::encode(&bytes).into_string() == text).then_some(bytes)
}

fn decode_payload(prefix: u8, text: &str) -> Option<Vec<u8>> {
    match prefix {
        BASE58BTC => bs58::decode(text).into_vec().ok(),
        BASE64URL => URL_SAFE_NO_PAD.decode(text).ok(),
        BASE64PAD => STANDARD.decode(text).ok(),
        _ => None,
    }
}

fn encode_payload(prefix: u8, payload: &[u8]) -> Option<String> {
    match prefix {
        BASE58BTC => Some(bs58::encode(payload).into_string()),
        BASE64URL => Some(URL_SAFE_NO_PAD.encode(payload)),
        BASE64PAD => Some(STANDARD.encode(payload)),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Multibase {
    prefix: u8,
    payload: Vec<u8>,
}

impl Multibase {
    /// Check if a string can be packed. Only the base58-btc, base64url, and padded base64
    /// prefixes are supported, and the payload must re-encode to exactly the same text.
    pub fn probe(value: &str) -> Option<Self> {
        let prefix = *value.as_bytes().first()?;
        // Every supported prefix is ASCII, so slicing after it stays on a char boundary
        let text = match prefix {
            BASE58BTC | BASE64URL | BASE64PAD => &value[1..],
            _ => return None,
        };
        let payload = decode_payload(prefix, text)?;
        if encode_payload(prefix, &payload)? != text {
            return None;
        }
        Some(Self { prefix, payload })
    }

    pub fn to_token(&self) -> Token {
        let mut bytes = Vec::with_capacity(self.payload.len() + 1);
        bytes.push(self.prefix);
        bytes.extend_from_slice(&self.payload);
        Token::Bin(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<String> {
        let (&prefix, payload) = bytes.split_first().ok_or(Error::MalformedBytes {
            step: "decode multibase",
            len: 0,
        })?;
        let text = encode_payload(prefix, payload).ok_or_else(|| {
            Error::UnknownCompressedValue(format!("multibase prefix 0x{:02x}", prefix))
        })?;
        Ok(format!("{}{}", prefix as char, text))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base58() {
        let value = "zCn8eVZg";
        let mb = Multibase::probe(value).unwrap();
        let token = mb.to_token();
        let bytes = token.as_slice().unwrap();
        assert_eq!(bytes[0], b'z');
        assert_eq!(&bytes[1..], b"hello");
        assert_eq!(Multibase::decode(bytes).unwrap(), value);
    }

    #[test]
    fn base64_variants() {
        let url = "uaGVsbG8";
        let mb = Multibase::probe(url).unwrap();
        assert_eq!(Multibase::decode(mb.to_token().as_slice().unwrap()).unwrap(), url);

        let padded = "MaGVsbG8=";
        let mb = Multibase::probe(padded).unwrap();
        assert_eq!(Multibase::decode(mb.to_token().as_slice().unwrap()).unwrap(), padded);
    }

    #[test]
    fn refuses() {
        // Unsupported prefix
        assert!(Multibase::probe("f68656c6c6f").is_none());
        // Invalid base58
        assert!(Multibase::probe("z0OIl").is_none());
        // Padding where there shouldn't be any
        assert!(Multibase::probe("uaGVsbG8=").is_none());
        assert!(Multibase::probe("").is_none());
        assert!(Multibase::probe("é").is_none());
    }

    #[test]
    fn bad_bytes() {
        assert!(matches!(
            Multibase::decode(&[]),
            Err(Error::MalformedBytes { len: 0, .. })
        ));
        assert!(matches!(
            Multibase::decode(&[b'f', 1, 2]),
            Err(Error::UnknownCompressedValue(_))
        ));
    }

    #[test]
    fn exact_base58() {
        assert_eq!(base58_exact("Cn8eVZg").unwrap(), b"hello");
        assert!(base58_exact("not base58!").is_none());
    }
}
