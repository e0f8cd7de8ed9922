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

//! The answer policy: which answer, if any, to give for a question.
//!
//! The message codec knows nothing about zone data. The
//! [`Server`](crate::server::Server) hands each decoded [`Question`] to
//! a [`Policy`], and either encodes the [`Answer`] it returns or sends
//! nothing at all. [`FixedZone`] is the policy the daemon uses: one
//! domain with one record of each supported type.

use std::net::{Ipv4Addr, Ipv6Addr};

use lazy_static::lazy_static;
use log::debug;

use crate::message::Question;
use crate::name::Name;
use crate::rr::{Answer, Rdata, Ttl, Txt, Type};

////////////////////////////////////////////////////////////////////////
// POLICY TRAIT                                                       //
////////////////////////////////////////////////////////////////////////

/// Decides the answer to a question.
///
/// Returning [`None`] means no response is sent. Closures of the right
/// signature implement `Policy`, which is convenient for tests.
pub trait Policy {
    fn answer(&self, question: &Question) -> Option<Answer>;
}

impl<F> Policy for F
where
    F: Fn(&Question) -> Option<Answer>,
{
    fn answer(&self, question: &Question) -> Option<Answer> {
        self(question)
    }
}

////////////////////////////////////////////////////////////////////////
// FIXED ZONE                                                         //
////////////////////////////////////////////////////////////////////////

lazy_static! {
    static ref FBEAR_RU: Name = "fbear.ru".parse().unwrap();
    static ref MAIL_FBEAR_RU: Name = "mail.fbear.ru".parse().unwrap();
    static ref FBEAR_DOMAIN_TXT: Txt = Txt::try_from("fbear domain").unwrap();
}

/// A policy serving exactly one domain name with one record of each
/// supported type.
///
/// Questions for any other name get no answer. The [`Default`] zone is
/// `fbear.ru` with TTL 100 and these records:
///
/// ```text
/// fbear.ru.  100  IN  A     10.0.0.100
/// fbear.ru.  100  IN  AAAA  2001:db8:85a3::8a2e:370:7334
/// fbear.ru.  100  IN  MX    30 mail.fbear.ru.
/// fbear.ru.  100  IN  TXT   "fbear domain"
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedZone {
    pub name: Name,
    pub ttl: Ttl,
    pub a: Ipv4Addr,
    pub aaaa: Ipv6Addr,
    pub mx_preference: u16,
    pub mx_exchange: Name,
    pub txt: Txt,
}

impl FixedZone {
    /// Returns the RDATA this zone serves for `rr_type`.
    pub fn rdata(&self, rr_type: Type) -> Rdata {
        match rr_type {
            Type::A => Rdata::A(self.a),
            Type::AAAA => Rdata::Aaaa(self.aaaa),
            Type::MX => Rdata::Mx {
                preference: self.mx_preference,
                exchange: self.mx_exchange.clone(),
            },
            Type::TXT => Rdata::Txt(self.txt.clone()),
        }
    }
}

impl Default for FixedZone {
    fn default() -> Self {
        Self {
            name: FBEAR_RU.clone(),
            ttl: Ttl::DEFAULT,
            a: Ipv4Addr::new(10, 0, 0, 100),
            aaaa: Ipv6Addr::new(0x2001, 0x0db8, 0x85a3, 0, 0, 0x8a2e, 0x0370, 0x7334),
            mx_preference: 30,
            mx_exchange: MAIL_FBEAR_RU.clone(),
            txt: FBEAR_DOMAIN_TXT.clone(),
        }
    }
}

impl Policy for FixedZone {
    fn answer(&self, question: &Question) -> Option<Answer> {
        if question.qname != self.name {
            debug!("No answer for {}: not {}.", question.qname, self.name);
            return None;
        }

        // The owner is the name as queried, so that it can be
        // compressed to point at the question.
        Some(Answer::new(
            question.qname.clone(),
            self.ttl,
            self.rdata(question.qtype),
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    fn question(qname: &str, qtype: Type) -> Question {
        Question {
            qname: qname.parse().unwrap(),
            qtype,
            qclass: Class::ANY,
        }
    }

    #[test]
    fn fixed_zone_answers_every_supported_type() {
        let zone = FixedZone::default();
        let expected = [
            (Type::A, "10.0.0.100"),
            (Type::AAAA, "2001:db8:85a3::8a2e:370:7334"),
            (Type::MX, "30 mail.fbear.ru"),
            (Type::TXT, "\"fbear domain\""),
        ];
        for (qtype, rdata) in expected {
            let answer = zone.answer(&question("fbear.ru", qtype)).unwrap();
            assert_eq!(answer.name.as_str(), "fbear.ru");
            assert_eq!(answer.rr_type, qtype);
            assert_eq!(answer.class, Class::IN);
            assert_eq!(u32::from(answer.ttl), 100);
            assert_eq!(answer.rdata.to_string(), rdata);
        }
    }

    #[test]
    fn fixed_zone_rdlengths() {
        let zone = FixedZone::default();
        let rdlength = |qtype| zone.answer(&question("fbear.ru", qtype)).unwrap().rdlength();
        assert_eq!(rdlength(Type::A), 4);
        assert_eq!(rdlength(Type::AAAA), 16);
        assert_eq!(rdlength(Type::MX), 2 + 15);
        assert_eq!(rdlength(Type::TXT), 1 + 12);
    }

    #[test]
    fn fixed_zone_ignores_other_names() {
        let zone = FixedZone::default();
        assert!(zone.answer(&question("www.fbear.ru", Type::A)).is_none());
        assert!(zone.answer(&question("example.com", Type::A)).is_none());
        assert!(zone.answer(&question("ru", Type::MX)).is_none());
    }

    #[test]
    fn fixed_zone_echoes_query_case() {
        let zone = FixedZone::default();
        let answer = zone.answer(&question("FBear.ru", Type::A)).unwrap();
        assert_eq!(answer.name.as_str(), "FBear.ru");
    }

    #[test]
    fn closures_are_policies() {
        let never = |_: &Question| -> Option<Answer> { None };
        assert!(never.answer(&question("fbear.ru", Type::A)).is_none());
    }
}
