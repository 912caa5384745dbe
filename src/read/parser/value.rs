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
    branch::alt,
    bytes::complete::take,
    combinator::{map, verify},
    number::complete::{
        u8 as any_u8,
        le_u32,
        le_i8, le_i16, le_i32, le_i64, le_i128,
        le_f32, le_f64,
    },
    sequence::tuple,
};

use crate::format::{BasicType, PrimitiveTag, primitive_header};

/// Largest legal decimal scale.
const MAX_DECIMAL_SCALE: u8 = 38;

/// Returns a parser which consumes the header byte of a primitive of the
/// specified tag. On success the parser yields the validated tag.
fn marker(
    tag: PrimitiveTag
) -> impl Fn(&[u8]) -> IResult<&[u8], PrimitiveTag> {
    move |input: &[u8]| {
        map(
            verify(take(1usize), move |b: &[u8]| -> bool {
                b[0] == primitive_header(tag)
            }),
            move |_| tag
        )(input)
    }
}

/// Parses a null value, which is just its header.
pub fn null(input: &[u8]) -> IResult<&[u8], ()> {
    map(
        marker(PrimitiveTag::Null),
        |_| ()
    )(input)
}

/// Parses either boolean header; the value is carried by the tag itself.
pub fn boolean(input: &[u8]) -> IResult<&[u8], bool> {
    map(
        alt((
            marker(PrimitiveTag::BooleanTrue),
            marker(PrimitiveTag::BooleanFalse),
        )),
        |tag| tag == PrimitiveTag::BooleanTrue
    )(input)
}

/// Parses an 8-bit signed integer value.
pub fn int8(input: &[u8]) -> IResult<&[u8], i8> {
    map(
        tuple((
            marker(PrimitiveTag::Int8),
            le_i8,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a 16-bit signed little-endian integer value.
pub fn int16(input: &[u8]) -> IResult<&[u8], i16> {
    map(
        tuple((
            marker(PrimitiveTag::Int16),
            le_i16,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a 32-bit signed little-endian integer value.
pub fn int32(input: &[u8]) -> IResult<&[u8], i32> {
    map(
        tuple((
            marker(PrimitiveTag::Int32),
            le_i32,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a 64-bit signed little-endian integer value.
pub fn int64(input: &[u8]) -> IResult<&[u8], i64> {
    map(
        tuple((
            marker(PrimitiveTag::Int64),
            le_i64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a 32-bit single-precision IEEE-754 value.
pub fn float(input: &[u8]) -> IResult<&[u8], f32> {
    map(
        tuple((
            marker(PrimitiveTag::Float),
            le_f32,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a 64-bit double-precision IEEE-754 value.
pub fn double(input: &[u8]) -> IResult<&[u8], f64> {
    map(
        tuple((
            marker(PrimitiveTag::Double),
            le_f64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a decimal scale byte, between 0 and 38.
fn scale(input: &[u8]) -> IResult<&[u8], u8> {
    verify(any_u8, |s: &u8| *s <= MAX_DECIMAL_SCALE)(input)
}

/// Parses a 4-byte decimal into its unscaled value and scale.
pub fn decimal4(input: &[u8]) -> IResult<&[u8], (i32, u8)> {
    map(
        tuple((
            marker(PrimitiveTag::Decimal4),
            scale,
            le_i32,
        )),
        |(_, scale, unscaled)| (unscaled, scale)
    )(input)
}

/// Parses an 8-byte decimal into its unscaled value and scale.
pub fn decimal8(input: &[u8]) -> IResult<&[u8], (i64, u8)> {
    map(
        tuple((
            marker(PrimitiveTag::Decimal8),
            scale,
            le_i64,
        )),
        |(_, scale, unscaled)| (unscaled, scale)
    )(input)
}

/// Parses a 16-byte decimal into its unscaled value and scale.
///
/// The unscaled value is a full two's-complement little-endian quantity; a
/// magnitude above 96 bits is legal here and is dealt with by the caller.
pub fn decimal16(input: &[u8]) -> IResult<&[u8], (i128, u8)> {
    map(
        tuple((
            marker(PrimitiveTag::Decimal16),
            scale,
            le_i128,
        )),
        |(_, scale, unscaled)| (unscaled, scale)
    )(input)
}

/// Parses a date value as signed days since the Unix epoch.
pub fn date(input: &[u8]) -> IResult<&[u8], i32> {
    map(
        tuple((
            marker(PrimitiveTag::Date),
            le_i32,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a timezone-aware timestamp as signed microseconds since the epoch.
pub fn timestamp_micros(input: &[u8]) -> IResult<&[u8], i64> {
    map(
        tuple((
            marker(PrimitiveTag::Timestamp),
            le_i64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a local-time timestamp as signed microseconds since the epoch.
pub fn timestamp_ntz_micros(input: &[u8]) -> IResult<&[u8], i64> {
    map(
        tuple((
            marker(PrimitiveTag::TimestampNtz),
            le_i64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a time-of-day value as signed microseconds since midnight.
pub fn time_micros(input: &[u8]) -> IResult<&[u8], i64> {
    map(
        tuple((
            marker(PrimitiveTag::TimeNtz),
            le_i64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a timezone-aware timestamp as signed nanoseconds since the epoch.
pub fn timestamp_tz_nanos(input: &[u8]) -> IResult<&[u8], i64> {
    map(
        tuple((
            marker(PrimitiveTag::TimestampTzNanos),
            le_i64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a local-time timestamp as signed nanoseconds since the epoch.
pub fn timestamp_ntz_nanos(input: &[u8]) -> IResult<&[u8], i64> {
    map(
        tuple((
            marker(PrimitiveTag::TimestampNtzNanos),
            le_i64,
        )),
        |(_, value)| value
    )(input)
}

/// Parses a binary value and returns the corresponding slice of the input.
pub fn binary(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, _) = marker(PrimitiveTag::Binary)(input)?;
    let (input, length) = le_u32(input)?;
    take(length as usize)(input)
}

/// Parses a long-form string value and returns its raw bytes.
///
/// UTF-8 validation is left to the caller so that the error can be told
/// apart from a truncation.
pub fn string_bytes(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, _) = marker(PrimitiveTag::String)(input)?;
    let (input, length) = le_u32(input)?;
    take(length as usize)(input)
}

/// Parses a short string value and returns its raw bytes.
///
/// The byte length, 0 to 63, lives in the header itself.
pub fn short_string_bytes(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, header) = verify(take(1usize), |b: &[u8]| -> bool {
        BasicType::from_header(b[0]) == BasicType::ShortString
    })(input)?;
    take((header[0] >> 2) as usize)(input)
}

/// Parses a UUID value and returns its 16 bytes in RFC 4122 network order.
pub fn uuid(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, _) = marker(PrimitiveTag::Uuid)(input)?;
    take(16usize)(input)
}
