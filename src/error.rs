use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Occurs when a context document couldn't be fetched, had no `@context` entry, or held
    /// something that isn't a context.
    ContextResolution(String),
    /// Occurs when an inline context object shows up where only context URLs are allowed.
    EmbeddedContextNotSupported(String),
    /// An application term override named a codec that doesn't exist.
    UnknownCodec { term: String, codec: String },
    /// Decoding hit an id or table key with no mapping in the session's tables.
    UnknownCompressedValue(String),
    /// A compression table id was too large to pack into 4 bytes.
    CompressionValueOverflow(u64),
    /// A packed byte value had a length that doesn't correspond to any encoding.
    MalformedBytes { step: &'static str, len: usize },
    /// A value had a runtime kind with no token mapping.
    UnsupportedValueType(String),
    /// An application context binding used an id inside the reserved range, or reused an id.
    InvalidContextValue { url: String, value: u64 },
    /// An application typed-literal table reused an id.
    InvalidTypeTable(String),
    /// The envelope tag wasn't one of the two recognized formats.
    BadHeader(String),
    /// Basic token encoding failure
    BadEncode(String),
    /// Token data ended too early.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// Token data hit some parsing limit.
    ParseLimit(String),
    /// Occurs when serde serialization or deserialization fails
    SerdeFail(String),
    /// A value can't be represented without ambiguity in its compressed position. The encoder
    /// reacts to this by emitting the uncompressed format, so it never escapes `encode`.
    Uncompressible(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ContextResolution(ref err) => write!(f, "Failed to resolve context: {}", err),
            Error::EmbeddedContextNotSupported(ref err) => {
                write!(f, "Embedded contexts are not supported here: {}", err)
            }
            Error::UnknownCodec {
                ref term,
                ref codec,
            } => write!(f, "Term \"{}\" asked for unknown codec \"{}\"", term, codec),
            Error::UnknownCompressedValue(ref err) => {
                write!(f, "No mapping for compressed value: {}", err)
            }
            Error::CompressionValueOverflow(v) => write!(
                f,
                "Compression table id {} doesn't fit in 4 bytes",
                v
            ),
            Error::MalformedBytes { step, len } => write!(
                f,
                "Got {} bytes on step [{}], which isn't a valid length",
                len, step
            ),
            Error::UnsupportedValueType(ref err) => {
                write!(f, "Unsupported value type: {}", err)
            }
            Error::InvalidContextValue { ref url, value } => write!(
                f,
                "Context {} can't use id {}: application ids must be unique and at least 0x8000",
                url, value
            ),
            Error::InvalidTypeTable(ref err) => write!(f, "Invalid type table: {}", err),
            Error::BadHeader(ref err) => write!(f, "Data has bad header format: {}", err),
            Error::BadEncode(ref err) => write!(f, "Basic data encoding failure: {}", err),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected data length {}, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::ParseLimit(ref err) => write!(f, "Hit parsing limit: {}", err),
            Error::SerdeFail(ref msg) => f.write_str(msg),
            Error::Uncompressible(ref err) => write!(f, "Value can't be compressed: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl std::convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::SerdeFail(e.to_string())
    }
}
