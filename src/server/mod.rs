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

//! The processing logic of the DNS responder.
//!
//! The [`Server`] structure is the heart of this module; see its
//! documentation for details.

use std::net::SocketAddr;

use log::debug;

use crate::message::{reader, writer, Opcode};
use crate::zone::Policy;

////////////////////////////////////////////////////////////////////////
// SERVER                                                             //
////////////////////////////////////////////////////////////////////////

/// A DNS responder, abstracted from any underlying network I/O
/// provider or answer policy.
///
/// The [`Server`] takes a received datagram through
/// [`Server::handle_message`], decodes it, asks its [`Policy`] for an
/// answer, and encodes the response. An I/O provider (see
/// [`io`](crate::io)) does the receiving and sending.
///
/// A `Server` holds no per-message state, so one `Server` may handle
/// any number of datagrams concurrently.
pub struct Server<P> {
    policy: P,
}

impl<P> Server<P> {
    /// Creates a new `Server` that answers according to `policy`.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Returns the server's policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<P> Server<P>
where
    P: Policy,
{
    /// Handles a received DNS message. This is the API through which
    /// I/O providers submit messages.
    ///
    /// `received_buf` is the datagram received from `source`. A
    /// response is produced only for a well-formed standard query (QR
    /// clear, opcode QUERY) that the policy has an answer for. In every
    /// other case, including any decoding failure, [`Response::None`]
    /// is returned and nothing should be sent.
    pub fn handle_message(&self, received_buf: &[u8], source: SocketAddr) -> Response {
        let message = match reader::decode(received_buf) {
            Ok(m) => m,
            Err(e) => {
                debug!("Dropping malformed message from {}: {}.", source, e);
                return Response::None;
            }
        };

        // Ignore messages that are responses or not standard queries.
        if message.header.qr || message.header.opcode != Opcode::Query {
            debug!(
                "Ignoring message from {} (QR = {}, opcode {:?}).",
                source, message.header.qr, message.header.opcode,
            );
            return Response::None;
        }

        match self.policy.answer(&message.question) {
            Some(answer) => {
                debug!("Answering {} from {}: {}.", message.question, source, answer);
                Response::Single(writer::encode(&message, &answer))
            }
            None => Response::None,
        }
    }
}

/// The result of [`Server::handle_message`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// A single response datagram is to be sent.
    Single(Vec<u8>),

    /// No response is to be sent.
    None,
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::*;
    use crate::message::reader::read_header;
    use crate::zone::FixedZone;

    const SOURCE: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5353));

    /// Builds a query for `qname` with the given QTYPE code and second
    /// header octet.
    fn query(qname: &[u8], qtype: u16, flags_hi: u8) -> Vec<u8> {
        let mut octets = vec![0xab, 0xcd, flags_hi, 0, 0, 1, 0, 0, 0, 0, 0, 0];
        octets.extend_from_slice(qname);
        octets.extend_from_slice(&qtype.to_be_bytes());
        octets.extend_from_slice(&[0, 1]);
        octets
    }

    const FBEAR_RU: &[u8] = b"\x05fbear\x02ru\x00";

    fn server() -> Server<FixedZone> {
        Server::new(FixedZone::default())
    }

    fn single(response: Response) -> Vec<u8> {
        match response {
            Response::Single(octets) => octets,
            Response::None => panic!("expected a response"),
        }
    }

    #[test]
    fn answers_fbear_ru_a() {
        let received = query(FBEAR_RU, 1, 0x01);
        let response = single(server().handle_message(&received, SOURCE));
        let header = read_header(&response).unwrap();
        assert_eq!(header.id, 0xabcd);
        assert!(header.qr);
        assert!(header.rd);
        assert_eq!(header.ancount, 1);
        assert_eq!(&response[12..received.len()], &received[12..]);
        assert_eq!(
            &response[received.len()..],
            b"\xc0\x0c\x00\x01\x00\x01\x00\x00\x00\x64\x00\x04\x0a\x00\x00\x64",
        );
    }

    #[test]
    fn answers_fbear_ru_mx() {
        let received = query(FBEAR_RU, 15, 0x00);
        let response = single(server().handle_message(&received, SOURCE));
        let rr = received.len();
        assert_eq!(&response[rr + 10..rr + 12], &[0, 17]);
        assert_eq!(&response[rr + 12..], b"\x00\x1e\x04mail\x05fbear\x02ru\x00");
    }

    #[test]
    fn ignores_other_names() {
        let received = query(b"\x07example\x03com\x00", 1, 0x01);
        assert_eq!(server().handle_message(&received, SOURCE), Response::None);
    }

    #[test]
    fn drops_unsupported_qtype() {
        let received = query(FBEAR_RU, 5, 0x01);
        assert_eq!(server().handle_message(&received, SOURCE), Response::None);
    }

    #[test]
    fn drops_malformed_messages() {
        let server = server();
        assert_eq!(server.handle_message(&[], SOURCE), Response::None);
        assert_eq!(server.handle_message(&[0; 11], SOURCE), Response::None);
        let mut received = query(FBEAR_RU, 1, 0x01);
        received[12] = 0x3f;
        assert_eq!(server.handle_message(&received, SOURCE), Response::None);
    }

    #[test]
    fn ignores_responses_and_nonstandard_queries() {
        let server = server();
        let response = query(FBEAR_RU, 1, 0x81);
        assert_eq!(server.handle_message(&response, SOURCE), Response::None);
        let status = query(FBEAR_RU, 1, 0x10);
        assert_eq!(server.handle_message(&status, SOURCE), Response::None);
        let iquery = query(FBEAR_RU, 1, 0x08);
        assert_eq!(server.handle_message(&iquery, SOURCE), Response::None);
    }
}
