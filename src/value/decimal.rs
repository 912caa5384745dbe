//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Fixed-point decimal values.
//!
//! The format stores decimals as an unscaled two's-complement integer of 4,
//! 8 or 16 bytes plus a scale between 0 and 38. The 16-byte width admits
//! magnitudes beyond 96 bits, which most native decimal types cannot hold;
//! [`Decimal`] is constrained to the 96-bit range shared by the narrower
//! widths while [`WideDecimal`] carries the full 16-byte range.

use std::fmt;

use crate::error::{Error, Result};

/// Largest legal decimal scale.
pub const MAX_DECIMAL_SCALE: u8 = 38;

/// Largest unscaled magnitude representable in 96 bits.
const NARROW_LIMIT: u128 = (1 << 96) - 1;

/// Reduces a decimal to its canonical numeric form by stripping factors of
/// ten from the unscaled value while the scale is positive.
///
/// Two decimals denote the same number exactly when their canonical forms
/// are identical; equality and hashing of the value model both rely on it.
pub(crate) fn canonical_parts(mut unscaled: i128, mut scale: u8) -> (i128, u8) {
    while scale > 0 && unscaled % 10 == 0 {
        unscaled /= 10;
        scale -= 1;
    }
    (unscaled, scale)
}

fn format_parts(unscaled: i128, scale: u8, f: &mut fmt::Formatter) -> fmt::Result {
    if scale == 0 {
        return write!(f, "{}", unscaled);
    }
    let sign = if unscaled < 0 { "-" } else { "" };
    let digits = unscaled.unsigned_abs().to_string();
    let scale = scale as usize;
    if digits.len() > scale {
        let (integral, fractional) = digits.split_at(digits.len() - scale);
        write!(f, "{}{}.{}", sign, integral, fractional)
    } else {
        write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
    }
}

/// A fixed-point decimal whose unscaled magnitude fits in 96 bits.
///
/// This is the value carried by the Decimal4 and Decimal8 primitives and by
/// 16-byte decimals within the native range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Decimal {
    unscaled: i128,
    scale: u8,
}

impl Decimal {
    /// Builds a decimal, rejecting scales above 38 and magnitudes beyond
    /// 96 bits.
    pub fn new(unscaled: i128, scale: u8) -> Result<Decimal> {
        if scale > MAX_DECIMAL_SCALE {
            return Err(Error::MalformedEncoding);
        }
        if unscaled.unsigned_abs() > NARROW_LIMIT {
            return Err(Error::DecimalOverflow);
        }
        Ok(Decimal { unscaled, scale })
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Whether the unscaled value fits the 4-byte encoding.
    pub fn fits_decimal4(&self) -> bool {
        i32::try_from(self.unscaled).is_ok()
    }

    /// Whether the unscaled value fits the 8-byte encoding.
    pub fn fits_decimal8(&self) -> bool {
        i64::try_from(self.unscaled).is_ok()
    }

    pub(crate) fn canonical(&self) -> (i128, u8) {
        canonical_parts(self.unscaled, self.scale)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_parts(self.unscaled, self.scale, f)
    }
}

/// A fixed-point decimal spanning the full 16-byte two's-complement range.
///
/// Only the Decimal16 primitive can produce magnitudes beyond 96 bits; the
/// two operations required of this representation are conversion to and
/// from the little-endian encoding and decimal-string formatting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WideDecimal {
    unscaled: i128,
    scale: u8,
}

impl WideDecimal {
    /// Builds a wide decimal, rejecting scales above 38.
    pub fn new(unscaled: i128, scale: u8) -> Result<WideDecimal> {
        if scale > MAX_DECIMAL_SCALE {
            return Err(Error::MalformedEncoding);
        }
        Ok(WideDecimal { unscaled, scale })
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Whether the magnitude fits the 96-bit range of [`Decimal`].
    pub fn fits_narrow(&self) -> bool {
        self.unscaled.unsigned_abs() <= NARROW_LIMIT
    }

    /// The 96-bit-fitting view of this value.
    pub fn narrow(&self) -> Result<Decimal> {
        Decimal::new(self.unscaled, self.scale)
    }

    /// The 16-byte little-endian two's-complement unscaled value.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        self.unscaled.to_le_bytes()
    }

    /// Rebuilds a wide decimal from its encoded unscaled bytes and scale.
    pub fn from_le_bytes(bytes: [u8; 16], scale: u8) -> Result<WideDecimal> {
        WideDecimal::new(i128::from_le_bytes(bytes), scale)
    }

    pub(crate) fn canonical(&self) -> (i128, u8) {
        canonical_parts(self.unscaled, self.scale)
    }
}

impl fmt::Display for WideDecimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_parts(self.unscaled, self.scale, f)
    }
}
