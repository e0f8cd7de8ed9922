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

//! Data structures for the resource records this server answers with.

mod answer;
pub mod rdata;
mod rr_type;
mod ttl;
pub use answer::Answer;
pub use rdata::{Rdata, Txt, TxtError};
pub use rr_type::{IntoTypeError, Type};
pub use ttl::Ttl;
