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

//! Implementation of the [`Answer`] type.

use std::fmt;

use super::{Rdata, Ttl, Type};
use crate::class::Class;
use crate::name::Name;

/// A single answer RR, as produced by a [`Policy`](crate::zone::Policy)
/// and consumed by [`writer::encode`](crate::message::writer::encode).
///
/// The RDLENGTH is not stored; the writer derives it from the RDATA it
/// actually serializes (see [`Answer::rdlength`]).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Answer {
    pub name: Name,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    pub rdata: Rdata,
}

impl Answer {
    /// Creates a new `Answer` of class IN. The type is taken from the
    /// RDATA.
    pub fn new(name: Name, ttl: Ttl, rdata: Rdata) -> Self {
        Self {
            name,
            rr_type: rdata.rr_type(),
            class: Class::IN,
            ttl,
            rdata,
        }
    }

    /// Returns the RDLENGTH this answer will be written with.
    pub fn rdlength(&self) -> u16 {
        self.rdata.len() as u16
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.class, self.rr_type, self.rdata,
        )
    }
}
