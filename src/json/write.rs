//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Emission of JSON text from an encoded value.
//!
//! The writer walks the blob directly through the readers; nothing is
//! materialized. Objects serialize in stored order, which for a conforming
//! producer is ascending field-name order.

use base64::prelude::*;
use chrono::{DateTime, NaiveDate};

use crate::build::encode;
use crate::error::{Error, Result};
use crate::format::{BasicType, PrimitiveTag};
use crate::read::{MetadataReader, ValueReader};
use crate::value::VariantValue;

/// Serializes an encoded value to JSON text as UTF-8 bytes.
pub fn to_json(reader: &ValueReader) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    write_value(reader, &mut output)?;
    Ok(output)
}

impl VariantValue {
    /// Serializes a value tree to JSON text as UTF-8 bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let (metadata, value) = encode(self)?;
        let metadata = MetadataReader::new(&metadata)?;
        let reader = ValueReader::new(metadata, &value)?;
        to_json(&reader)
    }
}

fn write_value(reader: &ValueReader, output: &mut Vec<u8>) -> Result<()> {
    match reader.basic_type() {
        BasicType::ShortString => {
            write_string(reader.get_string()?, output);
            Ok(())
        }
        BasicType::Object => {
            let object = reader.object()?;
            output.push(b'{');
            for index in 0 .. object.len() {
                if index > 0 {
                    output.push(b',');
                }
                write_string(object.get_field_name(index)?, output);
                output.push(b':');
                write_value(&object.get_field_value(index)?, output)?;
            }
            output.push(b'}');
            Ok(())
        }
        BasicType::Array => {
            let array = reader.array()?;
            output.push(b'[');
            for index in 0 .. array.len() {
                if index > 0 {
                    output.push(b',');
                }
                write_value(&array.get_element(index)?, output)?;
            }
            output.push(b']');
            Ok(())
        }
        BasicType::Primitive => match reader.primitive_tag()? {
            PrimitiveTag::Null => {
                output.extend_from_slice(b"null");
                Ok(())
            }
            PrimitiveTag::BooleanTrue => {
                output.extend_from_slice(b"true");
                Ok(())
            }
            PrimitiveTag::BooleanFalse => {
                output.extend_from_slice(b"false");
                Ok(())
            }
            PrimitiveTag::Int8 => write_integer(reader.get_int8()? as i64, output),
            PrimitiveTag::Int16 => write_integer(reader.get_int16()? as i64, output),
            PrimitiveTag::Int32 => write_integer(reader.get_int32()? as i64, output),
            PrimitiveTag::Int64 => write_integer(reader.get_int64()?, output),
            PrimitiveTag::Float => {
                let value = reader.get_float()?;
                if !value.is_finite() {
                    return Err(Error::UnrepresentableFloat);
                }
                let mut buffer = ryu::Buffer::new();
                output.extend_from_slice(buffer.format_finite(value).as_bytes());
                Ok(())
            }
            PrimitiveTag::Double => {
                let value = reader.get_double()?;
                if !value.is_finite() {
                    return Err(Error::UnrepresentableFloat);
                }
                let mut buffer = ryu::Buffer::new();
                output.extend_from_slice(buffer.format_finite(value).as_bytes());
                Ok(())
            }
            PrimitiveTag::Decimal4 => {
                output.extend_from_slice(reader.get_decimal4()?.to_string().as_bytes());
                Ok(())
            }
            PrimitiveTag::Decimal8 => {
                output.extend_from_slice(reader.get_decimal8()?.to_string().as_bytes());
                Ok(())
            }
            PrimitiveTag::Decimal16 => {
                // The wide view covers both storage flavors; the numeric
                // literal comes out the same either way.
                output.extend_from_slice(reader.get_decimal16_wide()?.to_string().as_bytes());
                Ok(())
            }
            PrimitiveTag::Date => {
                let formatted = format_date(reader.get_date()?)?;
                write_string(&formatted, output);
                Ok(())
            }
            PrimitiveTag::Timestamp => {
                let formatted = format_timestamp(reader.get_timestamp_micros()?, true)?;
                write_string(&formatted, output);
                Ok(())
            }
            PrimitiveTag::TimestampNtz => {
                let formatted = format_timestamp(reader.get_timestamp_ntz_micros()?, false)?;
                write_string(&formatted, output);
                Ok(())
            }
            PrimitiveTag::TimeNtz => write_integer(reader.get_time_micros()?, output),
            PrimitiveTag::TimestampTzNanos => {
                write_integer(reader.get_timestamp_tz_nanos()?, output)
            }
            PrimitiveTag::TimestampNtzNanos => {
                write_integer(reader.get_timestamp_ntz_nanos()?, output)
            }
            PrimitiveTag::Binary => {
                output.push(b'"');
                output.extend_from_slice(BASE64_STANDARD.encode(reader.get_binary()?).as_bytes());
                output.push(b'"');
                Ok(())
            }
            PrimitiveTag::String => {
                write_string(reader.get_string()?, output);
                Ok(())
            }
            PrimitiveTag::Uuid => {
                write_string(&reader.get_uuid()?.to_string(), output);
                Ok(())
            }
        },
    }
}

fn write_integer(value: i64, output: &mut Vec<u8>) -> Result<()> {
    let mut buffer = itoa::Buffer::new();
    output.extend_from_slice(buffer.format(value).as_bytes());
    Ok(())
}

/// Writes a quoted JSON string with the mandatory escapes.
fn write_string(value: &str, output: &mut Vec<u8>) {
    output.push(b'"');
    for c in value.chars() {
        match c {
            '"' => output.extend_from_slice(b"\\\""),
            '\\' => output.extend_from_slice(b"\\\\"),
            '\x08' => output.extend_from_slice(b"\\b"),
            '\x0C' => output.extend_from_slice(b"\\f"),
            '\n' => output.extend_from_slice(b"\\n"),
            '\r' => output.extend_from_slice(b"\\r"),
            '\t' => output.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                output.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut encoded = [0u8; 4];
                output.extend_from_slice(c.encode_utf8(&mut encoded).as_bytes());
            }
        }
    }
    output.push(b'"');
}

/// Days since the Unix epoch as `YYYY-MM-DD`.
fn format_date(days: i32) -> Result<String> {
    // 1970-01-01 is day 719163 of the proleptic Gregorian calendar.
    let from_ce = days as i64 + 719_163;
    i32::try_from(from_ce)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| Error::Message(format!("date of {} days is out of range", days)))
}

/// Microseconds since the Unix epoch as an ISO-8601 instant, with a
/// `+00:00` offset for the timezone-aware kind and none for local time.
fn format_timestamp(micros: i64, with_offset: bool) -> Result<String> {
    let instant = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        Error::Message(format!("timestamp of {} microseconds is out of range", micros))
    })?;
    if with_offset {
        Ok(instant.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string())
    } else {
        Ok(instant.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
    }
}
