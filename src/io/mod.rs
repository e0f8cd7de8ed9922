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

//! I/O providers for running [`Server`s](crate::server::Server).
//!
//! The [`Server`](crate::server::Server) structure implements the
//! message processing of the responder abstracted from network I/O.
//! The providers here bind a UDP socket, receive datagrams, pass them
//! to the [`Server`](crate::server::Server), and send back whatever
//! response it produces to the datagram's source.
//!
//! Both providers handle one datagram at a time, in the order received.
//! A datagram that cannot be decoded only ever costs that datagram; the
//! receive loop carries on with the next one.

mod blocking;
#[cfg(feature = "tokio")]
mod tokio;

pub use blocking::{BlockingIoConfig, BlockingIoProvider, BlockingShutdownController};
#[cfg(feature = "tokio")]
pub use self::tokio::{TokioIoProvider, TokioShutdownController};

/// The size of the buffer datagrams are received into. Longer
/// datagrams are truncated to this size.
pub const RECEIVE_BUF_SIZE: usize = 1024;
