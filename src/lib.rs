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

//! A minimal authoritative DNS responder over UDP.
//!
//! The core of this crate is the DNS message codec: [`message::reader`]
//! decodes a received datagram into a [`message::Message`], and
//! [`message::writer`] encodes the response carrying an
//! [`rr::Answer`]. Which answer to give is decided by a
//! [`zone::Policy`]; [`zone::FixedZone`] is the single-domain policy
//! the `fbear-dnsd` daemon serves. The [`server::Server`] ties the
//! codec and policy together, and the providers in [`io`] run it on a
//! UDP socket.

pub mod class;
pub mod io;
pub mod message;
pub mod name;
pub mod rr;
pub mod server;
pub mod wire;
pub mod zone;
