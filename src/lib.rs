//! ld-pack is a lossless compression format for JSON-LD documents. It keeps the structure of a
//! document but swaps its repetitive text for small integers and raw bytes:
//!
//! - Every term defined by the document's contexts becomes an integer id. The table of ids is
//!   built from the contexts themselves, so encoder and decoder agree on it without ever sending
//!   it.
//! - Well-known context URLs become fixed integer ids.
//! - Values are compressed according to their declared types: URLs by scheme, DIDs and multibase
//!   values to raw bytes, `xsd:date` and `xsd:dateTime` values to epoch seconds, and common
//!   literals to table ids.
//!
//! Decoding reproduces the original document exactly. Documents that can't be compressed without
//! ambiguity are written in an uncompressed form instead, so any JSON document can be encoded.
//!
//! # Example
//!
//! ```
//! # use ld_pack::{decode, encode, Options, StaticLoader};
//! # use serde_json::json;
//! let loader = StaticLoader::new().with(
//!     "https://www.w3.org/ns/did/v1",
//!     json!({"@context": {"id": "@id", "type": "@type"}}),
//! );
//! let doc = json!({
//!     "@context": "https://www.w3.org/ns/did/v1",
//!     "id": "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
//! });
//! let options = Options::default();
//! let bytes = futures_executor::block_on(encode(&doc, &loader, &options)).unwrap();
//! let decoded = futures_executor::block_on(decode(&bytes, &loader, &options)).unwrap();
//! assert_eq!(decoded, doc);
//! ```
//!
//! # Format
//!
//! The binary form is a subset of CBOR: shortest-form integer heads, definite lengths, and
//! 64-bit floats only. The whole document is wrapped in a tag: `0x0501` for compressed data and
//! `0x0500` for uncompressed data.
//!
//! In compressed data, a JSON object becomes a map keyed by term id. Even ids mean the value is
//! a single value, and `id + 1` means it is a list. Keys that aren't terms in the vocabulary are
//! kept as strings, with their values in uncompressed form.

pub mod codec;
mod compress_type;
pub mod context;
mod decode;
mod depth_tracking;
mod element;
mod encode;
mod error;
mod marker;
mod options;
mod session;
pub mod tables;
mod token;
pub mod uint_bytes;

pub use self::compress_type::{CompressType, COMPRESSED_TAG, UNCOMPRESSED_TAG};
pub use self::context::{ContextCache, ContextStack, DocumentLoader, Resolver, StaticLoader};
pub use self::decode::decode;
pub use self::encode::encode;
pub use self::error::{Error, Result};
pub use self::options::Options;
pub use self::session::Session;
pub use self::token::Token;

/// The maximum nesting depth of binary data that will be parsed. Each nested map, array, or tag
/// counts as one level.
pub const MAX_DEPTH: usize = 100;
