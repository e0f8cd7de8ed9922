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

//! Encoding of responses into on-the-wire DNS messages.

use super::constants::*;
use super::{Header, Message};
use crate::rr::Answer;
use crate::wire::{encode_be, put_be, Width};

/// The size of the fixed part of an answer RR: the two-octet name
/// pointer, TYPE, CLASS, TTL and RDLENGTH.
const ANSWER_FIXED_SIZE: usize = 12;

////////////////////////////////////////////////////////////////////////
// ENCODING                                                           //
////////////////////////////////////////////////////////////////////////

/// Encodes the response to `message` carrying the single RR `answer`.
///
/// The response consists of:
///
/// * the header from [`Header::response_to`];
/// * [`Message::raw_question`], echoed verbatim;
/// * the answer RR. Its owner is written as a compression pointer to
///   the question name at offset 12 when the two names are equal, and
///   uncompressed otherwise. Its RDLENGTH is the length of the RDATA as
///   actually serialized.
///
/// No authority or additional RRs are written.
///
/// # Panics
///
/// Panics if the answer's RDATA does not belong to its declared type.
/// Answers come from the server's own [`Policy`](crate::zone::Policy),
/// so this is a bug there, not bad input.
pub fn encode(message: &Message, answer: &Answer) -> Vec<u8> {
    assert_eq!(
        answer.rr_type,
        answer.rdata.rr_type(),
        "answer RDATA does not match the answer type",
    );

    let mut buf = Vec::with_capacity(
        HEADER_SIZE + message.raw_question.len() + ANSWER_FIXED_SIZE + answer.rdata.len(),
    );
    write_header(&Header::response_to(&message.header), &mut buf);
    buf.extend_from_slice(&message.raw_question);
    write_answer(message, answer, &mut buf);
    buf
}

/// Packs `header` into 12 octets appended to `buf`. This is the exact
/// inverse of [`read_header`](super::reader::read_header).
pub fn write_header(header: &Header, buf: &mut Vec<u8>) {
    let mut hi = u8::from(header.opcode) << OPCODE_SHIFT;
    if header.qr {
        hi |= QR_MASK;
    }
    if header.aa {
        hi |= AA_MASK;
    }
    if header.tc {
        hi |= TC_MASK;
    }
    if header.rd {
        hi |= RD_MASK;
    }
    let mut lo = u8::from(header.rcode);
    if header.ra {
        lo |= RA_MASK;
    }

    put_be(buf, header.id.into(), Width::U16);
    put_be(buf, hi.into(), Width::U8);
    put_be(buf, lo.into(), Width::U8);
    put_be(buf, header.qdcount.into(), Width::U16);
    put_be(buf, header.ancount.into(), Width::U16);
    put_be(buf, header.nscount.into(), Width::U16);
    put_be(buf, header.arcount.into(), Width::U16);
}

/// Appends the answer RR to `buf`.
fn write_answer(message: &Message, answer: &Answer, buf: &mut Vec<u8>) {
    if answer.name == message.question.qname {
        buf.extend_from_slice(&QNAME_POINTER);
    } else {
        answer.name.write_uncompressed(buf);
    }
    put_be(buf, u16::from(answer.rr_type).into(), Width::U16);
    put_be(buf, u16::from(answer.class).into(), Width::U16);
    put_be(buf, answer.ttl.into(), Width::U32);

    // RDLENGTH is filled in once the RDATA is written.
    let rdlength_start = buf.len();
    buf.extend_from_slice(&[0, 0]);
    answer.rdata.write(buf);
    let rdlength = buf.len() - rdlength_start - 2;
    buf[rdlength_start..rdlength_start + 2]
        .copy_from_slice(&encode_be(rdlength as u32, Width::U16));
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use rand::Rng;

    use super::super::reader::{decode, read_header};
    use super::super::{Opcode, Rcode};
    use super::*;
    use crate::name::Name;
    use crate::rr::{Rdata, Ttl, Txt, Type};

    /// A query for fbear.ru. IN A with RD set, as sent by dig.
    const FBEAR_RU_A_QUERY: &[u8] =
        b"\x1f\x3a\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\x05\x66\x62\x65\
          \x61\x72\x02\x72\x75\x00\x00\x01\x00\x01";

    fn fbear_ru() -> Name {
        "fbear.ru".parse().unwrap()
    }

    /// Encodes a response to `FBEAR_RU_A_QUERY` and returns it along
    /// with the offset of the answer RR.
    fn respond(rdata: Rdata) -> (Vec<u8>, usize) {
        let message = decode(FBEAR_RU_A_QUERY).unwrap();
        let answer = Answer::new(fbear_ru(), Ttl::DEFAULT, rdata);
        (encode(&message, &answer), FBEAR_RU_A_QUERY.len())
    }

    #[test]
    fn encode_a_response_works() {
        let (response, _) = respond(Rdata::A(Ipv4Addr::new(10, 0, 0, 100)));
        let expected: &[u8] =
            b"\x1f\x3a\x81\x00\x00\x01\x00\x01\x00\x00\x00\x00\x05\x66\x62\x65\
              \x61\x72\x02\x72\x75\x00\x00\x01\x00\x01\xc0\x0c\x00\x01\x00\x01\
              \x00\x00\x00\x64\x00\x04\x0a\x00\x00\x64";
        assert_eq!(response, expected);
    }

    #[test]
    fn encode_txt_response_works() {
        let (response, rr) = respond(Rdata::Txt(Txt::try_from("fbear domain").unwrap()));
        assert_eq!(&response[rr..rr + 2], &QNAME_POINTER);
        assert_eq!(&response[rr + 2..rr + 4], &[0, 16]);
        assert_eq!(&response[rr + 4..rr + 6], &[0, 1]);
        assert_eq!(&response[rr + 6..rr + 10], &[0, 0, 0, 100]);
        assert_eq!(&response[rr + 10..rr + 12], &[0, 13]);
        assert_eq!(response[rr + 12], 12);
        assert_eq!(&response[rr + 13..], b"fbear domain");
    }

    #[test]
    fn encode_mx_response_works() {
        let (response, rr) = respond(Rdata::Mx {
            preference: 30,
            exchange: "mail.fbear.ru".parse().unwrap(),
        });
        let rdata: &[u8] = b"\x00\x1e\x04mail\x05fbear\x02ru\x00";
        assert_eq!(&response[rr + 2..rr + 4], &[0, 15]);
        assert_eq!(&response[rr + 10..rr + 12], &[0, rdata.len() as u8]);
        assert_eq!(&response[rr + 12..], rdata);
    }

    #[test]
    fn encode_aaaa_response_has_sixteen_octet_rdata() {
        let (response, rr) = respond(Rdata::Aaaa(
            "2001:0db8:85a3:0000:0000:8a2e:0370:7334".parse().unwrap(),
        ));
        assert_eq!(&response[rr + 2..rr + 4], &[0, 28]);
        assert_eq!(&response[rr + 10..rr + 12], &[0, 16]);
        assert_eq!(response.len(), rr + 12 + 16);
    }

    #[test]
    fn encode_echoes_counts_and_clears_second_flags_octet() {
        // Set RA and RCODE 5 in the query, plus NSCOUNT 2 and ARCOUNT 1.
        let mut query = FBEAR_RU_A_QUERY.to_vec();
        query[3] = 0x85;
        query[9] = 2;
        query[11] = 1;
        let message = decode(&query).unwrap();
        let answer = Answer::new(
            fbear_ru(),
            Ttl::DEFAULT,
            Rdata::A(Ipv4Addr::new(10, 0, 0, 100)),
        );
        let response = encode(&message, &answer);

        let header = read_header(&response).unwrap();
        assert!(header.qr);
        assert!(header.rd);
        assert!(!header.ra);
        assert_eq!(header.rcode, Rcode::NoError);
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.ancount, 1);
        assert_eq!(header.nscount, 2);
        assert_eq!(header.arcount, 1);
        assert_eq!(response[3], 0);
    }

    #[test]
    fn encode_writes_differing_owner_uncompressed() {
        let message = decode(FBEAR_RU_A_QUERY).unwrap();
        let answer = Answer::new(
            "other.test".parse().unwrap(),
            Ttl::DEFAULT,
            Rdata::A(Ipv4Addr::new(10, 0, 0, 1)),
        );
        let response = encode(&message, &answer);
        let rr = FBEAR_RU_A_QUERY.len();
        assert_eq!(&response[rr..rr + 12], b"\x05other\x04test\x00");
    }

    #[test]
    fn encode_matches_owner_case_insensitively() {
        let message = decode(FBEAR_RU_A_QUERY).unwrap();
        let answer = Answer::new(
            "FBEAR.RU".parse().unwrap(),
            Ttl::DEFAULT,
            Rdata::A(Ipv4Addr::new(10, 0, 0, 100)),
        );
        let response = encode(&message, &answer);
        let rr = FBEAR_RU_A_QUERY.len();
        assert_eq!(&response[rr..rr + 2], &QNAME_POINTER);
    }

    #[test]
    #[should_panic]
    fn encode_panics_on_mismatched_rdata() {
        let message = decode(FBEAR_RU_A_QUERY).unwrap();
        let mut answer = Answer::new(
            fbear_ru(),
            Ttl::DEFAULT,
            Rdata::A(Ipv4Addr::new(10, 0, 0, 100)),
        );
        answer.rr_type = Type::MX;
        encode(&message, &answer);
    }

    #[test]
    fn header_round_trips() {
        let opcodes = [Opcode::Query, Opcode::IQuery, Opcode::Status];
        let rcodes = [
            Rcode::NoError,
            Rcode::FormErr,
            Rcode::ServFail,
            Rcode::NxDomain,
            Rcode::NotImp,
            Rcode::Refused,
        ];
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let header = Header {
                id: rng.gen(),
                qr: rng.gen(),
                opcode: opcodes[rng.gen_range(0..opcodes.len())],
                aa: rng.gen(),
                tc: rng.gen(),
                rd: rng.gen(),
                ra: rng.gen(),
                rcode: rcodes[rng.gen_range(0..rcodes.len())],
                qdcount: rng.gen(),
                ancount: rng.gen(),
                nscount: rng.gen(),
                arcount: rng.gen(),
            };
            let mut buf = Vec::new();
            write_header(&header, &mut buf);
            assert_eq!(buf.len(), HEADER_SIZE);
            assert_eq!(read_header(&buf), Ok(header));
        }
    }
}
