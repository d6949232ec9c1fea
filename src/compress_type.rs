use std::convert::TryFrom;

/// CBOR tag marking a document that went through the compression transform.
pub const COMPRESSED_TAG: u64 = 0x0501;
/// CBOR tag marking a document stored verbatim.
pub const UNCOMPRESSED_TAG: u64 = 0x0500;

/// Defines the envelope formats an encoded document may use. Format when encoded is a CBOR tag
/// wrapping the document body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressType {
    /// The body is the native document structure, with no compression applied.
    Uncompressed,
    /// The body is a map keyed by vocabulary ids.
    Compressed,
}

impl From<CompressType> for u64 {
    fn from(val: CompressType) -> u64 {
        match val {
            CompressType::Uncompressed => UNCOMPRESSED_TAG,
            CompressType::Compressed => COMPRESSED_TAG,
        }
    }
}

impl TryFrom<u64> for CompressType {
    type Error = u64;
    fn try_from(val: u64) -> Result<CompressType, u64> {
        match val {
            UNCOMPRESSED_TAG => Ok(CompressType::Uncompressed),
            COMPRESSED_TAG => Ok(CompressType::Compressed),
            _ => Err(val),
        }
    }
}
