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

//! Decoding of received DNS queries into [`Message`]s.

use std::fmt;

use super::constants::*;
use super::{Header, Message, Opcode, Question, Rcode};
use crate::class::Class;
use crate::name::{self, Name};
use crate::rr::Type;
use crate::wire::{self, decode_be};

////////////////////////////////////////////////////////////////////////
// DECODING                                                           //
////////////////////////////////////////////////////////////////////////

/// Decodes a received datagram into a [`Message`].
///
/// `octets` must be exactly the datagram as received (the slice length
/// is the datagram length). Decoding proceeds as follows:
///
/// * The 12-octet header is unpacked (see [`read_header`]).
/// * The question name is read as a sequence of uncompressed labels
///   starting at offset 12. Compression pointers are not followed.
/// * The QTYPE following the name must be one of the supported
///   [`Type`]s. The QCLASS is not inspected.
/// * Everything from offset 12 to the end of the datagram is kept as
///   [`Message::raw_question`].
///
/// Only the first question is read, whatever QDCOUNT says.
pub fn decode(octets: &[u8]) -> Result<Message> {
    let header = read_header(octets)?;
    let (qname, qname_len) = Name::read_uncompressed(octets, HEADER_SIZE)?;
    let raw_qtype = wire::read_u16(octets, HEADER_SIZE + qname_len).ok_or(Error::Truncated)?;
    let qtype = Type::try_from(raw_qtype).map_err(|e| Error::UnsupportedType(e.0))?;
    Ok(Message {
        header,
        question: Question {
            qname,
            qtype,
            qclass: Class::ANY,
        },
        raw_question: octets[HEADER_SIZE..].into(),
    })
}

/// Unpacks the 12-octet header at the start of `octets`.
pub fn read_header(octets: &[u8]) -> Result<Header> {
    if octets.len() < HEADER_SIZE {
        return Err(Error::Truncated);
    }
    let hi = octets[FLAGS_HI_BYTE];
    let lo = octets[FLAGS_LO_BYTE];
    let raw_opcode = (hi & OPCODE_MASK) >> OPCODE_SHIFT;
    let raw_rcode = lo & RCODE_MASK;
    let count = |start: usize, end: usize| decode_be(&octets[start..end]) as u16;

    Ok(Header {
        id: count(ID_START, ID_END),
        qr: hi & QR_MASK != 0,
        opcode: Opcode::try_from(raw_opcode).map_err(|e| Error::InvalidOpcode(e.0))?,
        aa: hi & AA_MASK != 0,
        tc: hi & TC_MASK != 0,
        rd: hi & RD_MASK != 0,
        ra: lo & RA_MASK != 0,
        rcode: Rcode::try_from(raw_rcode).map_err(|e| Error::InvalidRcode(e.0))?,
        qdcount: count(QDCOUNT_START, QDCOUNT_END),
        ancount: count(ANCOUNT_START, ANCOUNT_END),
        nscount: count(NSCOUNT_START, NSCOUNT_END),
        arcount: count(ARCOUNT_START, ARCOUNT_END),
    })
}

impl TryFrom<&[u8]> for Message {
    type Error = Error;

    fn try_from(octets: &[u8]) -> Result<Self> {
        decode(octets)
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a datagram could not be decoded. Any such
/// datagram is dropped without a response.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The datagram ended before the header or question did.
    Truncated,

    /// The opcode is not QUERY, IQUERY or STATUS.
    InvalidOpcode(u8),

    /// The RCODE is not one of those defined in RFC 1035.
    InvalidRcode(u8),

    /// The QTYPE is not A, MX, TXT or AAAA.
    UnsupportedType(u16),

    /// The question name is malformed.
    InvalidName(name::Error),
}

impl From<name::Error> for Error {
    fn from(err: name::Error) -> Self {
        match err {
            name::Error::UnexpectedEom => Self::Truncated,
            other => Self::InvalidName(other),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Truncated => f.write_str("message is truncated"),
            Self::InvalidOpcode(raw) => write!(f, "invalid opcode {}", raw),
            Self::InvalidRcode(raw) => write!(f, "invalid RCODE {}", raw),
            Self::UnsupportedType(raw) => write!(f, "unsupported QTYPE {}", raw),
            Self::InvalidName(err) => write!(f, "invalid QNAME: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible decoding functions.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// A query for fbear.ru. IN A with RD set, as sent by dig.
    const FBEAR_RU_A_QUERY: &[u8] =
        b"\x1f\x3a\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\x05\x66\x62\x65\
          \x61\x72\x02\x72\x75\x00\x00\x01\x00\x01";

    /// Replaces octets of a copy of `FBEAR_RU_A_QUERY`.
    fn patched(offset: usize, replacement: &[u8]) -> Vec<u8> {
        let mut octets = FBEAR_RU_A_QUERY.to_vec();
        octets[offset..offset + replacement.len()].copy_from_slice(replacement);
        octets
    }

    #[test]
    fn decode_works() {
        let message = decode(FBEAR_RU_A_QUERY).unwrap();
        let header = message.header;
        assert_eq!(header.id, 0x1f3a);
        assert!(!header.qr);
        assert_eq!(header.opcode, Opcode::Query);
        assert!(!header.aa);
        assert!(!header.tc);
        assert!(header.rd);
        assert!(!header.ra);
        assert_eq!(header.rcode, Rcode::NoError);
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.ancount, 0);
        assert_eq!(header.nscount, 0);
        assert_eq!(header.arcount, 0);

        assert_eq!(message.question.qname.as_str(), "fbear.ru");
        assert_eq!(message.question.qtype, Type::A);
        assert_eq!(message.question.qclass, Class::ANY);
        assert_eq!(message.raw_question.as_ref(), &FBEAR_RU_A_QUERY[12..]);
    }

    #[test]
    fn decode_reads_multi_label_names() {
        let mut octets = FBEAR_RU_A_QUERY[..12].to_vec();
        octets.extend_from_slice(b"\x03www\x05fbear\x02ru\x00\x00\x10\x00\xff");
        let message = decode(&octets).unwrap();
        assert_eq!(message.question.qname.as_str(), "www.fbear.ru");
        assert_eq!(message.question.qtype, Type::TXT);
    }

    #[test]
    fn decode_ignores_qclass() {
        let octets = patched(24, b"\x00\x03");
        let message = decode(&octets).unwrap();
        assert_eq!(message.question.qclass, Class::ANY);

        // A missing QCLASS is not an error either.
        let message = decode(&FBEAR_RU_A_QUERY[..24]).unwrap();
        assert_eq!(message.raw_question.len(), 12);
    }

    #[test]
    fn decode_rejects_short_header() {
        for size in 0..HEADER_SIZE {
            assert_eq!(decode(&FBEAR_RU_A_QUERY[..size]), Err(Error::Truncated));
        }
    }

    #[test]
    fn decode_rejects_label_past_end() {
        // The first label claims 40 octets.
        let octets = patched(12, b"\x28");
        assert_eq!(decode(&octets), Err(Error::Truncated));

        // The datagram stops in the middle of a label.
        assert_eq!(decode(&FBEAR_RU_A_QUERY[..16]), Err(Error::Truncated));

        // The datagram stops before the terminator or QTYPE.
        assert_eq!(decode(&FBEAR_RU_A_QUERY[..21]), Err(Error::Truncated));
        assert_eq!(decode(&FBEAR_RU_A_QUERY[..23]), Err(Error::Truncated));
    }

    #[test]
    fn decode_reports_long_label_past_end_as_truncated() {
        let mut octets = FBEAR_RU_A_QUERY[..12].to_vec();
        octets.extend_from_slice(b"\x40abc");
        assert_eq!(decode(&octets), Err(Error::Truncated));

        octets.truncate(12);
        octets.push(0xc0);
        assert_eq!(decode(&octets), Err(Error::Truncated));
    }

    #[test]
    fn decode_rejects_compressed_qname() {
        let mut octets = FBEAR_RU_A_QUERY[..12].to_vec();
        octets.extend_from_slice(b"\xc0\x0c\x00\x01\x00\x01");
        assert_eq!(decode(&octets), Err(Error::Truncated));

        // Enough trailing octets for the "label" to fit.
        octets.resize(HEADER_SIZE + 1 + 0xc0, 0);
        assert_eq!(
            decode(&octets),
            Err(Error::InvalidName(name::Error::LabelTooLong)),
        );
    }

    #[test]
    fn decode_rejects_invalid_opcode() {
        // Opcode 4 (NOTIFY) with RD set.
        let octets = patched(2, b"\x21");
        assert_eq!(decode(&octets), Err(Error::InvalidOpcode(4)));
    }

    #[test]
    fn decode_rejects_invalid_rcode() {
        let octets = patched(3, b"\x09");
        assert_eq!(decode(&octets), Err(Error::InvalidRcode(9)));
    }

    #[test]
    fn decode_rejects_unsupported_qtype() {
        // CNAME
        let octets = patched(22, b"\x00\x05");
        assert_eq!(decode(&octets), Err(Error::UnsupportedType(5)));
    }

    #[test]
    fn message_try_from_decodes() {
        let message = Message::try_from(FBEAR_RU_A_QUERY).unwrap();
        assert_eq!(message.question.qtype, Type::A);
    }
}
