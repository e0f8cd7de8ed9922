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

//! Implementation of the [`Name`] type for domain names.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

mod error;
pub use error::Error;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
pub const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAMES                                                              //
////////////////////////////////////////////////////////////////////////

/// A domain name.
///
/// A `Name` is kept in its dot-joined textual form without a trailing
/// dot, e.g. `www.fbear.ru`. The root name is the empty string. Every
/// label is 1–63 ASCII octets and contains no `.`, so the dot-joined
/// form is unambiguous and can be split back into labels.
///
/// `Name`s are constructed through the [`FromStr`] implementation or
/// read from a message with [`Name::read_uncompressed`]. Equality and
/// hashing are ASCII case-insensitive, as DNS name comparisons are
/// ([RFC 4343]).
///
/// [RFC 4343]: https://datatracker.ietf.org/doc/html/rfc4343
#[derive(Clone)]
pub struct Name(Box<str>);

impl Name {
    /// Returns the root name.
    pub fn root() -> Self {
        Self("".into())
    }

    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the dot-joined form of the name, without a trailing dot.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an iterator over the labels of the name. The root name
    /// has no labels.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|label| !label.is_empty())
    }

    /// Returns the length of the uncompressed on-the-wire form of the
    /// name, including the terminating null label.
    pub fn wire_len(&self) -> usize {
        self.labels().map(|label| label.len() + 1).sum::<usize>() + 1
    }

    /// Appends the uncompressed on-the-wire form of the name to `buf`:
    /// each label prefixed by its length, then a zero octet.
    pub fn write_uncompressed(&self, buf: &mut Vec<u8>) {
        for label in self.labels() {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
        buf.push(0);
    }

    /// Reads an uncompressed name starting at `start` in `octets`.
    ///
    /// Length octets are read until a zero octet ends the name. On
    /// success, returns the name along with the number of octets it
    /// occupied (including the terminating zero octet). Reading stops
    /// at the end of `octets`; a length octet that would take us past
    /// it produces [`Error::UnexpectedEom`], whatever its value. Only a
    /// length octet over 63 whose label fits is [`Error::LabelTooLong`].
    pub fn read_uncompressed(octets: &[u8], start: usize) -> Result<(Self, usize), Error> {
        let mut text = String::new();
        let mut cursor = start;
        loop {
            let len = *octets.get(cursor).ok_or(Error::UnexpectedEom)? as usize;
            if len == 0 {
                break;
            }
            let label = octets
                .get(cursor + 1..cursor + 1 + len)
                .ok_or(Error::UnexpectedEom)?;
            if len > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }
            check_label(label)?;
            if cursor + 1 + len - start + 1 > MAX_WIRE_LEN {
                return Err(Error::NameTooLong);
            }

            // check_label guarantees ASCII, so this is valid UTF-8.
            for &octet in label {
                text.push(octet as char);
            }
            text.push('.');
            cursor += len + 1;
        }

        // Strip the separator left over from the last label.
        text.pop();
        Ok((Self(text.into()), cursor + 1 - start))
    }
}

/// Checks the contents (not the length) of a single label.
fn check_label(label: &[u8]) -> Result<(), Error> {
    if !label.is_ascii() {
        Err(Error::NotAscii)
    } else if label.contains(&b'.') {
        Err(Error::DotInLabel)
    } else {
        Ok(())
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a dot-joined name. A single trailing dot is accepted and
    /// dropped; both `""` and `"."` give the root name.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.strip_suffix('.').unwrap_or(text);
        if text.is_empty() {
            return Ok(Self::root());
        } else if !text.is_ascii() {
            return Err(Error::NotAscii);
        }

        let mut wire_len = 1;
        for label in text.split('.') {
            if label.is_empty() {
                return Err(Error::NullNonTerminal);
            } else if label.len() > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }
            wire_len += label.len() + 1;
        }
        if wire_len > MAX_WIRE_LEN {
            Err(Error::NameTooLong)
        } else {
            Ok(Self(text.into()))
        }
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for octet in self.0.bytes() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
