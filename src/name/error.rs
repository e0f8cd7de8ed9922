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

//! Implementation of the [`Error`] type for name-related errors.

use std::fmt;

/// An error type used to report problems constructing a
/// [`Name`](super::Name).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A label contained a `.` octet, which cannot be represented in the
    /// dot-joined form of a name.
    DotInLabel,

    /// A label length octet was larger than 63. This includes the
    /// compression pointer forms, which questions do not use here.
    LabelTooLong,

    /// The name is too long (longer than 255 octets on the wire).
    NameTooLong,

    /// A non-terminal label was empty (e.g. `"a..b"`).
    NullNonTerminal,

    /// The name was not strictly ASCII.
    NotAscii,

    /// We unexpectedly encountered the end of the message while reading
    /// the name.
    UnexpectedEom,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::DotInLabel => f.write_str("label contains a dot"),
            Self::LabelTooLong => f.write_str("label is longer than 63 octets"),
            Self::NameTooLong => f.write_str("name is longer than 255 bytes on the wire"),
            Self::NullNonTerminal => f.write_str("non-terminal label is null"),
            Self::NotAscii => f.write_str("name is not ASCII"),
            Self::UnexpectedEom => f.write_str("unexpected end of message"),
        }
    }
}

impl std::error::Error for Error {}
