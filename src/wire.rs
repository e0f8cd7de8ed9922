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

//! Fixed-width big-endian integer helpers shared by the message reader
//! and writer.
//!
//! Every integer field in a DNS message has a declared width. The
//! encoder here always produces exactly that many octets, with leading
//! zeros as needed, so that no call site has to pad by hand.

use arrayvec::ArrayVec;

////////////////////////////////////////////////////////////////////////
// WIDTHS                                                             //
////////////////////////////////////////////////////////////////////////

/// The width of an integer field on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Width {
    U8,
    U16,
    U32,
}

impl Width {
    /// Returns the number of octets a field of this width occupies.
    pub const fn octets(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Returns the largest value that fits in a field of this width.
    pub const fn max(self) -> u32 {
        match self {
            Self::U8 => u8::MAX as u32,
            Self::U16 => u16::MAX as u32,
            Self::U32 => u32::MAX,
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ENCODING AND DECODING                                              //
////////////////////////////////////////////////////////////////////////

/// Encodes `value` in network byte order, left-padded with zeros to
/// exactly `width`.
///
/// # Panics
///
/// Panics if `value` does not fit in `width`. Integer fields are always
/// produced by this crate's own code, so an oversized value is a bug.
pub fn encode_be(value: u32, width: Width) -> ArrayVec<u8, 4> {
    assert!(
        value <= width.max(),
        "{} does not fit in a {}-octet field",
        value,
        width.octets(),
    );
    let all = value.to_be_bytes();
    all[4 - width.octets()..].iter().copied().collect()
}

/// Appends `value`, encoded as by [`encode_be`], to `buf`.
pub fn put_be(buf: &mut Vec<u8>, value: u32, width: Width) {
    buf.extend_from_slice(&encode_be(value, width));
}

/// Decodes a big-endian unsigned integer from all of `octets`.
///
/// There is no sign extension. At most four octets may be given.
///
/// # Panics
///
/// Panics if `octets` is longer than four octets.
pub fn decode_be(octets: &[u8]) -> u32 {
    assert!(octets.len() <= 4, "too many octets for a u32");
    octets
        .iter()
        .fold(0, |acc, &octet| (acc << 8) | u32::from(octet))
}

/// Reads a network-byte-order `u16` at `offset` in `octets`, returning
/// [`None`] if it would run past the end.
pub fn read_u16(octets: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    octets.get(offset..end).map(|o| decode_be(o) as u16)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_be_pads_to_width() {
        assert_eq!(encode_be(0, Width::U16).as_slice(), &[0, 0]);
        assert_eq!(encode_be(1, Width::U16).as_slice(), &[0, 1]);
        assert_eq!(encode_be(100, Width::U32).as_slice(), &[0, 0, 0, 100]);
        assert_eq!(encode_be(0xabcd, Width::U16).as_slice(), &[0xab, 0xcd]);
        assert_eq!(encode_be(7, Width::U8).as_slice(), &[7]);
    }

    #[test]
    #[should_panic]
    fn encode_be_rejects_oversized_value() {
        encode_be(0x1_0000, Width::U16);
    }

    #[test]
    fn decode_be_does_not_sign_extend() {
        assert_eq!(decode_be(&[0xff, 0xfe]), 0xfffe);
        assert_eq!(decode_be(&[0x80, 0, 0, 1]), 0x8000_0001);
        assert_eq!(decode_be(&[]), 0);
    }

    #[test]
    fn read_u16_checks_bounds() {
        let octets = [0x12, 0x34, 0x56];
        assert_eq!(read_u16(&octets, 0), Some(0x1234));
        assert_eq!(read_u16(&octets, 1), Some(0x3456));
        assert_eq!(read_u16(&octets, 2), None);
        assert_eq!(read_u16(&octets, usize::MAX), None);
    }
}
