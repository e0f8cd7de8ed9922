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

//! Implementation of reading and writing of DNS messages.
//!
//! A received datagram is decoded by [`reader::decode`] into a
//! [`Message`]. The response is produced by [`writer::encode`] from that
//! [`Message`] and an [`Answer`](crate::rr::Answer).

mod constants;
mod header;
mod opcode;
mod question;
mod rcode;
pub mod reader;
pub mod writer;
pub use constants::HEADER_SIZE;
pub use header::Header;
pub use opcode::{IntoOpcodeError, Opcode};
pub use question::Question;
pub use rcode::{IntoRcodeError, Rcode};

/// A decoded query.
///
/// A `Message` is built fresh for every received datagram by
/// [`reader::decode`] and is never modified afterwards. Besides the
/// header and the (first) question, it keeps the raw octets following
/// the header, which the response echoes verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub header: Header,
    pub question: Question,
    pub raw_question: Box<[u8]>,
}
