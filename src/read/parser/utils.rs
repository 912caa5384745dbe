//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use nom::{
    IResult,
    bytes::complete::take,
};

/// Returns a parser which recognizes a variable-length little-endian number
/// between 1 and 4 bytes long, inclusive.
///
/// # Notes
///
/// 1. A three byte value `[0x01, 0x02, 0x03]` reads as `0x030201`.
pub fn le_u32_n(
    n: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], u32> {
    assert!(n >= 1 && n <= 4, "number must be between 1 and 4 bytes, inclusive");
    move |input: &[u8]| {
        let (input, bytes) = take(n)(input)?;
        let value = bytes.iter().enumerate().fold(0u32, |acc, (i, x)| {
            acc | (*x as u32) << (8 * i)
        });
        Ok((input, value))
    }
}

/// Returns a parser which recognizes a variable-length unsigned little-endian
/// number between 1 and 4 bytes long, inclusive, widened to usize.
pub fn le_usize_n(
    n: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], usize> {
    move |input: &[u8]| {
        let (input, value) = le_u32_n(n)(input)?;
        Ok((input, value as usize))
    }
}
