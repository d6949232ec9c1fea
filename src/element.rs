use crate::{depth_tracking::DepthTracker, marker::*};
use crate::error::{Error, Result};

use byteorder::{BigEndian, ReadBytesExt};

#[derive(Clone, Debug, PartialEq)]
pub enum Element<'a> {
    Null,
    Bool(bool),
    UInt(u64),
    /// Always less than zero.
    NegInt(i64),
    F64(f64),
    Bin(&'a [u8]),
    Str(&'a str),
    Array(usize),
    Map(usize),
    Tag(u64),
}

/// Serialize an element onto a byte vector. Doesn't check if Array, Map & Tag structures make
/// sense, just writes elements out.
pub fn serialize_elem(buf: &mut Vec<u8>, elem: Element) {
    use self::Element::*;
    match elem {
        Null => buf.push(Marker::Null.into()),
        Bool(v) => buf.push(if v { Marker::True } else { Marker::False }.into()),
        UInt(v) => Marker::encode_head(buf, MajorType::UInt, v),
        NegInt(v) => {
            debug_assert!(v < 0);
            // CBOR stores -1 - n
            Marker::encode_head(buf, MajorType::NegInt, !v as u64)
        }
        F64(v) => {
            buf.push(Marker::F64.into());
            buf.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        Bin(v) => {
            Marker::encode_head(buf, MajorType::Bin, v.len() as u64);
            buf.extend_from_slice(v);
        }
        Str(v) => {
            Marker::encode_head(buf, MajorType::Str, v.len() as u64);
            buf.extend_from_slice(v.as_bytes());
        }
        Array(len) => Marker::encode_head(buf, MajorType::Array, len as u64),
        Map(len) => Marker::encode_head(buf, MajorType::Map, len as u64),
        Tag(v) => Marker::encode_head(buf, MajorType::Tag, v),
    }
}

#[derive(Clone, Debug)]
pub struct Parser<'a> {
    data: &'a [u8],
    depth_tracking: DepthTracker,
    errored: bool,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Parser<'a> {
        Self {
            data,
            depth_tracking: DepthTracker::new(),
            errored: false,
        }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    // Read the argument that follows a head, rejecting any argument that had a shorter encoding
    // available.
    fn parse_arg(&mut self, marker: Marker) -> Result<(MajorType, u64)> {
        match marker {
            Marker::Fix(major, v) => Ok((major, v as u64)),
            Marker::Arg8(major) => {
                let v = self.data.read_u8().map_err(|_| Error::LengthTooShort {
                    step: "decode 1-byte argument",
                    actual: 0,
                    expected: 1,
                })?;
                if v <= 23 {
                    return Err(Error::BadEncode(format!(
                        "Got 1-byte argument with value = {}. This is not the shortest encoding.",
                        v
                    )));
                }
                Ok((major, v as u64))
            }
            Marker::Arg16(major) => {
                let v = self.data.read_u16::<BigEndian>().map_err(|_| {
                    Error::LengthTooShort {
                        step: "decode 2-byte argument",
                        actual: self.data.len(),
                        expected: 2,
                    }
                })?;
                if v <= u8::MAX as u16 {
                    return Err(Error::BadEncode(format!(
                        "Got 2-byte argument with value = {}. This is not the shortest encoding.",
                        v
                    )));
                }
                Ok((major, v as u64))
            }
            Marker::Arg32(major) => {
                let v = self.data.read_u32::<BigEndian>().map_err(|_| {
                    Error::LengthTooShort {
                        step: "decode 4-byte argument",
                        actual: self.data.len(),
                        expected: 4,
                    }
                })?;
                if v <= u16::MAX as u32 {
                    return Err(Error::BadEncode(format!(
                        "Got 4-byte argument with value = {}. This is not the shortest encoding.",
                        v
                    )));
                }
                Ok((major, v as u64))
            }
            Marker::Arg64(major) => {
                let v = self.data.read_u64::<BigEndian>().map_err(|_| {
                    Error::LengthTooShort {
                        step: "decode 8-byte argument",
                        actual: self.data.len(),
                        expected: 8,
                    }
                })?;
                if v <= u32::MAX as u64 {
                    return Err(Error::BadEncode(format!(
                        "Got 8-byte argument with value = {}. This is not the shortest encoding.",
                        v
                    )));
                }
                Ok((major, v))
            }
            _ => Err(Error::BadEncode(format!(
                "Marker {:?} carries no argument",
                marker
            ))),
        }
    }

    fn take(&mut self, step: &'static str, len: u64) -> Result<&'a [u8]> {
        if len > self.data.len() as u64 {
            return Err(Error::LengthTooShort {
                step,
                actual: self.data.len(),
                expected: len as usize,
            });
        }
        let (bytes, data) = self.data.split_at(len as usize);
        self.data = data;
        Ok(bytes)
    }

    // Given a retrieved marker, try to turn it into the next element, which may move through the
    // data. If we can't, error. This function *does not* set the the errored flag. That's up to
    // the caller.
    fn parse_element(&mut self, marker: Marker) -> Result<Element<'a>> {
        let elem = match marker {
            Marker::Reserved(v) => {
                return Err(Error::BadEncode(format!(
                    "Unsupported marker 0x{:02x} found",
                    v
                )))
            }
            Marker::Null => Element::Null,
            Marker::False => Element::Bool(false),
            Marker::True => Element::Bool(true),
            Marker::F64 => {
                let v = self.data.read_f64::<BigEndian>().map_err(|_| {
                    Error::LengthTooShort {
                        step: "decode F64",
                        actual: self.data.len(),
                        expected: 8,
                    }
                })?;
                Element::F64(v)
            }
            marker => {
                let (major, arg) = self.parse_arg(marker)?;
                match major {
                    MajorType::UInt => Element::UInt(arg),
                    MajorType::NegInt => {
                        if arg > i64::MAX as u64 {
                            return Err(Error::BadEncode(format!(
                                "Negative integer -1-{} is out of range",
                                arg
                            )));
                        }
                        Element::NegInt(!(arg as i64))
                    }
                    MajorType::Bin => Element::Bin(self.take("get Bin content", arg)?),
                    MajorType::Str => {
                        let string = self.take("get Str content", arg)?;
                        let string = std::str::from_utf8(string)
                            .map_err(|e| Error::BadEncode(format!("{}", e)))?;
                        Element::Str(string)
                    }
                    MajorType::Array => {
                        if arg > self.data.len() as u64 {
                            return Err(Error::BadEncode(format!(
                                "Got Array with length = {}, but there are only {} bytes left.",
                                arg,
                                self.data.len()
                            )));
                        }
                        Element::Array(arg as usize)
                    }
                    MajorType::Map => {
                        if arg.saturating_mul(2) > self.data.len() as u64 {
                            return Err(Error::BadEncode(format!(
                                "Got Map with length = {}, but there are only {} bytes left.",
                                arg,
                                self.data.len()
                            )));
                        }
                        Element::Map(arg as usize)
                    }
                    MajorType::Tag => Element::Tag(arg),
                    MajorType::Simple => {
                        return Err(Error::BadEncode(format!(
                            "Unsupported simple value {}",
                            arg
                        )))
                    }
                }
            }
        };
        self.depth_tracking.update_elem(&elem)?;
        Ok(elem)
    }
}

impl<'a> std::iter::Iterator for Parser<'a> {
    type Item = Result<Element<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored {
            return None;
        }
        let (&marker, data) = self.data.split_first()?;
        self.data = data;
        let result = self.parse_element(Marker::from_u8(marker));
        if result.is_err() {
            self.errored = true;
        }
        Some(result)
    }
}
