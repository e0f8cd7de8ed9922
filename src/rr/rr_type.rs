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

//! Implementation of the [`Type`] type for the supported RR types.

use std::fmt;
use std::str::FromStr;

////////////////////////////////////////////////////////////////////////
// TYPES                                                              //
////////////////////////////////////////////////////////////////////////

/// An RR type (or QTYPE) that this server understands.
///
/// Unlike a general-purpose DNS library, the server only supports four
/// types, so any other value on the wire fails to convert (see
/// [`IntoTypeError`]) and the query is dropped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    A,
    MX,
    TXT,
    AAAA,
}

impl TryFrom<u16> for Type {
    type Error = IntoTypeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::A),
            15 => Ok(Self::MX),
            16 => Ok(Self::TXT),
            28 => Ok(Self::AAAA),
            _ => Err(IntoTypeError(value)),
        }
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        match rr_type {
            Type::A => 1,
            Type::MX => 15,
            Type::TXT => 16,
            Type::AAAA => 28,
        }
    }
}

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        [Self::A, Self::MX, Self::TXT, Self::AAAA]
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(text))
            .ok_or("unsupported type")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::A => f.write_str("A"),
            Self::MX => f.write_str("MX"),
            Self::TXT => f.write_str("TXT"),
            Self::AAAA => f.write_str("AAAA"),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a wire value is not one of the supported
/// types. The offending value is included.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IntoTypeError(pub u16);

impl fmt::Display for IntoTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unsupported type TYPE{}", self.0)
    }
}

impl std::error::Error for IntoTypeError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_match_iana() {
        for (rr_type, code) in [
            (Type::A, 1),
            (Type::MX, 15),
            (Type::TXT, 16),
            (Type::AAAA, 28),
        ] {
            assert_eq!(u16::from(rr_type), code);
            assert_eq!(Type::try_from(code), Ok(rr_type));
        }
    }

    #[test]
    fn unsupported_types_are_rejected() {
        assert_eq!(Type::try_from(5), Err(IntoTypeError(5)));
        assert_eq!(Type::try_from(255), Err(IntoTypeError(255)));
    }

    #[test]
    fn type_parses_case_insensitively() {
        assert_eq!("aaaa".parse::<Type>(), Ok(Type::AAAA));
        assert!("CNAME".parse::<Type>().is_err());
    }
}
