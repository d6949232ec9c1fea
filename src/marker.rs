/// CBOR major types, taken from the top 3 bits of a head byte. For internal use only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MajorType {
    UInt,
    NegInt,
    Bin,
    Str,
    Array,
    Map,
    Tag,
    Simple,
}

impl MajorType {
    pub fn from_u8(n: u8) -> MajorType {
        match n >> 5 {
            0 => MajorType::UInt,
            1 => MajorType::NegInt,
            2 => MajorType::Bin,
            3 => MajorType::Str,
            4 => MajorType::Array,
            5 => MajorType::Map,
            6 => MajorType::Tag,
            _ => MajorType::Simple,
        }
    }

    pub fn into_u8(self) -> u8 {
        let n = match self {
            MajorType::UInt => 0,
            MajorType::NegInt => 1,
            MajorType::Bin => 2,
            MajorType::Str => 3,
            MajorType::Array => 4,
            MajorType::Map => 5,
            MajorType::Tag => 6,
            MajorType::Simple => 7,
        };
        n << 5
    }
}

/// CBOR head markers. For internal use only.
///
/// Only the subset of CBOR used by this crate is recognized: definite lengths, the `false`,
/// `true`, and `null` simple values, and 64-bit floats. Everything else maps to `Reserved`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Marker {
    /// Argument is stored in the low 5 bits of the head byte.
    Fix(MajorType, u8),
    /// Argument follows as a single byte.
    Arg8(MajorType),
    /// Argument follows as a big-endian u16.
    Arg16(MajorType),
    /// Argument follows as a big-endian u32.
    Arg32(MajorType),
    /// Argument follows as a big-endian u64.
    Arg64(MajorType),
    False,
    True,
    Null,
    F64,
    Reserved(u8),
}

impl Marker {
    /// Construct a marker from a single byte.
    pub fn from_u8(n: u8) -> Marker {
        let major = MajorType::from_u8(n);
        let info = n & 0x1f;
        match (major, info) {
            (MajorType::Simple, 20) => Marker::False,
            (MajorType::Simple, 21) => Marker::True,
            (MajorType::Simple, 22) => Marker::Null,
            (MajorType::Simple, 27) => Marker::F64,
            (MajorType::Simple, _) => Marker::Reserved(n),
            (_, 0..=23) => Marker::Fix(major, info),
            (_, 24) => Marker::Arg8(major),
            (_, 25) => Marker::Arg16(major),
            (_, 26) => Marker::Arg32(major),
            (_, 27) => Marker::Arg64(major),
            // 28-30 are unassigned, 31 is an indefinite length
            _ => Marker::Reserved(n),
        }
    }

    /// Converts a marker object into a single-byte representation.
    /// Assumes the content of the marker is already masked approprately
    pub fn into_u8(self) -> u8 {
        match self {
            Marker::Fix(major, val) => major.into_u8() | val,
            Marker::Arg8(major) => major.into_u8() | 24,
            Marker::Arg16(major) => major.into_u8() | 25,
            Marker::Arg32(major) => major.into_u8() | 26,
            Marker::Arg64(major) => major.into_u8() | 27,
            Marker::False => 0xf4,
            Marker::True => 0xf5,
            Marker::Null => 0xf6,
            Marker::F64 => 0xfb,
            Marker::Reserved(val) => val,
        }
    }

    /// Write the head for a major type, using the shortest encoding of the argument.
    pub fn encode_head(buf: &mut Vec<u8>, major: MajorType, arg: u64) {
        if arg <= 23 {
            buf.push(Marker::Fix(major, arg as u8).into());
        } else if arg <= u8::MAX as u64 {
            buf.push(Marker::Arg8(major).into());
            buf.push(arg as u8);
        } else if arg <= u16::MAX as u64 {
            buf.push(Marker::Arg16(major).into());
            buf.extend_from_slice(&(arg as u16).to_be_bytes());
        } else if arg <= u32::MAX as u64 {
            buf.push(Marker::Arg32(major).into());
            buf.extend_from_slice(&(arg as u32).to_be_bytes());
        } else {
            buf.push(Marker::Arg64(major).into());
            buf.extend_from_slice(&arg.to_be_bytes());
        }
    }
}

impl From<u8> for Marker {
    fn from(val: u8) -> Marker {
        Marker::from_u8(val)
    }
}

impl From<Marker> for u8 {
    fn from(val: Marker) -> u8 {
        val.into_u8()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_byte_roundtrips() {
        for n in 0..=u8::MAX {
            assert_eq!(Marker::from_u8(n).into_u8(), n, "byte 0x{:x} didn't survive", n);
        }
    }

    #[test]
    fn heads() {
        let mut buf = Vec::new();
        Marker::encode_head(&mut buf, MajorType::UInt, 23);
        Marker::encode_head(&mut buf, MajorType::UInt, 24);
        Marker::encode_head(&mut buf, MajorType::Tag, 0x0501);
        assert_eq!(buf, &[0x17, 0x18, 0x18, 0xd9, 0x05, 0x01]);
    }

    #[test]
    fn indefinite_is_reserved() {
        assert_eq!(Marker::from_u8(0x9f), Marker::Reserved(0x9f));
        assert_eq!(Marker::from_u8(0xf7), Marker::Reserved(0xf7));
    }
}
