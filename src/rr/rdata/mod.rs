// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the [`Rdata`] type and RDATA serialization.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::Type;
use crate::name::Name;
use crate::wire::{self, Width};

////////////////////////////////////////////////////////////////////////
// RDATA                                                              //
////////////////////////////////////////////////////////////////////////

/// The RDATA of an answer record, tagged by type.
///
/// Adding support for a new RR type means adding a variant here, an arm
/// to [`Rdata::rr_type`], and an arm to [`Rdata::write`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Rdata {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Mx { preference: u16, exchange: Name },
    Txt(Txt),
}

impl Rdata {
    /// Returns the RR type this RDATA belongs to.
    pub fn rr_type(&self) -> Type {
        match self {
            Self::A(_) => Type::A,
            Self::Aaaa(_) => Type::AAAA,
            Self::Mx { .. } => Type::MX,
            Self::Txt(_) => Type::TXT,
        }
    }

    /// Returns the length of the serialized RDATA (the RDLENGTH).
    pub fn len(&self) -> usize {
        match self {
            Self::A(_) => 4,
            Self::Aaaa(_) => 16,
            Self::Mx { exchange, .. } => 2 + exchange.wire_len(),
            Self::Txt(txt) => 1 + txt.len(),
        }
    }

    /// Returns whether the serialized RDATA is empty. None of the
    /// supported types have empty RDATA.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the serialized RDATA to `buf`:
    ///
    /// * A and AAAA: the address in network byte order;
    /// * MX: the 16-bit preference, then the exchange as an
    ///   uncompressed name;
    /// * TXT: a single character-string (length octet, then the text).
    pub fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Self::A(address) => buf.extend_from_slice(&address.octets()),
            Self::Aaaa(address) => buf.extend_from_slice(&address.octets()),
            Self::Mx {
                preference,
                exchange,
            } => {
                wire::put_be(buf, (*preference).into(), Width::U16);
                exchange.write_uncompressed(buf);
            }
            Self::Txt(txt) => {
                wire::put_be(buf, txt.len() as u32, Width::U8);
                buf.extend_from_slice(txt.as_str().as_bytes());
            }
        }
    }
}

impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::A(address) => address.fmt(f),
            Self::Aaaa(address) => address.fmt(f),
            Self::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            Self::Txt(txt) => write!(f, "\"{}\"", txt.as_str()),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TXT CHARACTER-STRINGS                                              //
////////////////////////////////////////////////////////////////////////

/// The text of a TXT record: an ASCII string of at most 255 octets,
/// which is what fits in a single `<character-string>`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Txt(Box<str>);

impl Txt {
    /// The maximum length of the text.
    pub const MAX_LEN: usize = 255;

    /// Returns the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length of the text in octets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&str> for Txt {
    type Error = TxtError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        if !text.is_ascii() {
            Err(TxtError::NotAscii)
        } else if text.len() > Self::MAX_LEN {
            Err(TxtError::TooLong)
        } else {
            Ok(Self(text.into()))
        }
    }
}

/// An error signaling that text cannot be used as TXT RDATA.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TxtError {
    NotAscii,
    TooLong,
}

impl fmt::Display for TxtError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NotAscii => f.write_str("TXT data is not ASCII"),
            Self::TooLong => f.write_str("TXT data is longer than 255 octets"),
        }
    }
}

impl std::error::Error for TxtError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(rdata: &Rdata) -> Vec<u8> {
        let mut buf = Vec::new();
        rdata.write(&mut buf);
        assert_eq!(buf.len(), rdata.len());
        buf
    }

    #[test]
    fn a_is_four_octets() {
        let rdata = Rdata::A(Ipv4Addr::new(10, 0, 0, 100));
        assert_eq!(serialize(&rdata), [10, 0, 0, 100]);
        assert_eq!(rdata.rr_type(), Type::A);
    }

    #[test]
    fn aaaa_is_sixteen_octets() {
        let rdata = Rdata::Aaaa("2001:db8:85a3::8a2e:370:7334".parse().unwrap());
        assert_eq!(
            serialize(&rdata),
            b"\x20\x01\x0d\xb8\x85\xa3\x00\x00\x00\x00\x8a\x2e\x03\x70\x73\x34",
        );
    }

    #[test]
    fn mx_has_preference_then_uncompressed_name() {
        let rdata = Rdata::Mx {
            preference: 30,
            exchange: "mail.fbear.ru".parse().unwrap(),
        };
        assert_eq!(serialize(&rdata), b"\x00\x1e\x04mail\x05fbear\x02ru\x00");
        assert_eq!(rdata.len(), 2 + 15);
    }

    #[test]
    fn txt_is_length_prefixed() {
        let rdata = Rdata::Txt(Txt::try_from("fbear domain").unwrap());
        let octets = serialize(&rdata);
        assert_eq!(octets[0], 12);
        assert_eq!(&octets[1..], b"fbear domain");
    }

    #[test]
    fn txt_rejects_bad_text() {
        assert_eq!(Txt::try_from("é"), Err(TxtError::NotAscii));
        let long = "x".repeat(256);
        assert_eq!(Txt::try_from(long.as_str()), Err(TxtError::TooLong));
        assert!(Txt::try_from("x".repeat(255).as_str()).is_ok());
    }
}
