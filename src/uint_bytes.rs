//! Byte-width codec for table ids that must be stored as bytes instead of native integers.
//!
//! An id is packed big-endian into the smallest of 1, 2, or 4 bytes that holds it. Decoding goes
//! purely by length; any length other than 1, 2, or 4 is malformed.

use crate::error::{Error, Result};

use byteorder::{BigEndian, ReadBytesExt};

/// Pack a table id into the minimal 1/2/4-byte big-endian form.
pub fn uint_to_bytes(value: u64) -> Result<Vec<u8>> {
    if value < (1 << 8) {
        Ok(vec![value as u8])
    } else if value < (1 << 16) {
        Ok((value as u16).to_be_bytes().to_vec())
    } else if value < (1 << 32) {
        Ok((value as u32).to_be_bytes().to_vec())
    } else {
        Err(Error::CompressionValueOverflow(value))
    }
}

/// Unpack a table id, dispatching strictly on the byte length.
pub fn bytes_to_uint(mut bytes: &[u8]) -> Result<u64> {
    let len = bytes.len();
    let malformed = |_| Error::MalformedBytes {
        step: "unpack table id",
        len,
    };
    match len {
        1 => bytes.read_u8().map(u64::from).map_err(malformed),
        2 => bytes.read_u16::<BigEndian>().map(u64::from).map_err(malformed),
        4 => bytes.read_u32::<BigEndian>().map(u64::from).map_err(malformed),
        _ => Err(Error::MalformedBytes {
            step: "unpack table id",
            len,
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn width_boundaries() {
        assert_eq!(uint_to_bytes(0).unwrap(), vec![0]);
        assert_eq!(uint_to_bytes(255).unwrap(), vec![0xff]);
        assert_eq!(uint_to_bytes(256).unwrap(), vec![0x01, 0x00]);
        assert_eq!(uint_to_bytes(65535).unwrap(), vec![0xff, 0xff]);
        assert_eq!(uint_to_bytes(65536).unwrap(), vec![0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            uint_to_bytes(u32::MAX as u64).unwrap(),
            vec![0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn overflow() {
        assert_eq!(
            uint_to_bytes(1 << 32),
            Err(Error::CompressionValueOverflow(1 << 32))
        );
    }

    #[test]
    fn unpack() {
        for v in [0u64, 255, 256, 65535, 65536, u32::MAX as u64] {
            assert_eq!(bytes_to_uint(&uint_to_bytes(v).unwrap()).unwrap(), v);
        }
    }

    #[test]
    fn bad_lengths() {
        for len in [0usize, 3, 5, 8] {
            let bytes = vec![1u8; len];
            assert!(
                matches!(bytes_to_uint(&bytes), Err(Error::MalformedBytes { .. })),
                "length {} should fail",
                len
            );
        }
    }
}
