//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt;

use ordered_float::OrderedFloat;
use serde::de;

use crate::de::magic;
use crate::value::{Decimal, VariantObject, VariantValue, WideDecimal};

/// Deserialization of any self-describing serde format into the value
/// model. Kinds without a serde analogue, such as dates and decimals, are
/// carried as single-entry maps with magic keys and will only arrive from
/// this crate's own Deserializer; every other kind deserializes from any
/// format, so a `serde_json` document turns into objects, arrays, and
/// 64-bit-width numbers.
impl<'de> de::Deserialize<'de> for VariantValue {
    fn deserialize<D>(deserializer: D) -> Result<VariantValue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = VariantValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid variant value")
            }

            #[inline]
            fn visit_bool<E>(self, value: bool) -> Result<VariantValue, E> {
                Ok(VariantValue::Boolean(value))
            }

            #[inline]
            fn visit_i8<E>(self, value: i8) -> Result<VariantValue, E> {
                Ok(VariantValue::Int8(value))
            }

            #[inline]
            fn visit_i16<E>(self, value: i16) -> Result<VariantValue, E> {
                Ok(VariantValue::Int16(value))
            }

            #[inline]
            fn visit_i32<E>(self, value: i32) -> Result<VariantValue, E> {
                Ok(VariantValue::Int32(value))
            }

            #[inline]
            fn visit_i64<E>(self, value: i64) -> Result<VariantValue, E> {
                Ok(VariantValue::Int64(value))
            }

            #[inline]
            fn visit_u64<E>(self, value: u64) -> Result<VariantValue, E>
            where
                E: de::Error,
            {
                if value <= i64::MAX as u64 {
                    Ok(VariantValue::Int64(value as i64))
                } else {
                    Err(de::Error::custom("u64 value was too large"))
                }
            }

            #[inline]
            fn visit_f32<E>(self, value: f32) -> Result<VariantValue, E> {
                Ok(VariantValue::Float(OrderedFloat(value)))
            }

            #[inline]
            fn visit_f64<E>(self, value: f64) -> Result<VariantValue, E> {
                Ok(VariantValue::Double(OrderedFloat(value)))
            }

            #[inline]
            fn visit_str<E>(self, value: &str) -> Result<VariantValue, E> {
                Ok(VariantValue::String(value.into()))
            }

            #[inline]
            fn visit_string<E>(self, value: String) -> Result<VariantValue, E> {
                Ok(VariantValue::String(value))
            }

            #[inline]
            fn visit_bytes<E>(self, value: &[u8]) -> Result<VariantValue, E> {
                Ok(VariantValue::Binary(value.into()))
            }

            #[inline]
            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<VariantValue, E> {
                Ok(VariantValue::Binary(value))
            }

            #[inline]
            fn visit_unit<E>(self) -> Result<VariantValue, E> {
                Ok(VariantValue::Null)
            }

            #[inline]
            fn visit_seq<V>(self, mut visitor: V) -> Result<VariantValue, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut elements = Vec::new();
                while let Some(element) = visitor.next_element()? {
                    elements.push(element);
                }
                Ok(VariantValue::Array(elements))
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<VariantValue, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                // Re-mapped primitive kinds are identified by a magic key.
                let mut key = visitor.next_key::<String>()?;

                if let Some(magic_key) = key.as_deref() {
                    match magic_key {
                        magic::DATE => {
                            return Ok(VariantValue::Date(visitor.next_value()?));
                        }
                        magic::TIMESTAMP => {
                            return Ok(VariantValue::Timestamp(visitor.next_value()?));
                        }
                        magic::TIMESTAMP_NTZ => {
                            return Ok(VariantValue::TimestampNtz(visitor.next_value()?));
                        }
                        magic::TIME_NTZ => {
                            return Ok(VariantValue::TimeNtz(visitor.next_value()?));
                        }
                        magic::TIMESTAMP_TZ_NANOS => {
                            return Ok(VariantValue::TimestampTzNanos(visitor.next_value()?));
                        }
                        magic::TIMESTAMP_NTZ_NANOS => {
                            return Ok(VariantValue::TimestampNtzNanos(visitor.next_value()?));
                        }
                        magic::DECIMAL4 => {
                            let (unscaled, scale) = visitor.next_value::<(i128, u8)>()?;
                            let decimal = Decimal::new(unscaled, scale)
                                .map_err(de::Error::custom)?;
                            return Ok(VariantValue::Decimal4(decimal));
                        }
                        magic::DECIMAL8 => {
                            let (unscaled, scale) = visitor.next_value::<(i128, u8)>()?;
                            let decimal = Decimal::new(unscaled, scale)
                                .map_err(de::Error::custom)?;
                            return Ok(VariantValue::Decimal8(decimal));
                        }
                        magic::DECIMAL16 => {
                            let (unscaled, scale) = visitor.next_value::<(i128, u8)>()?;
                            let decimal = WideDecimal::new(unscaled, scale)
                                .map_err(de::Error::custom)?;
                            return Ok(VariantValue::from_wide_decimal(decimal));
                        }
                        magic::UUID => {
                            let bytes = visitor.next_value::<&[u8]>()?;
                            let uuid = uuid::Uuid::from_slice(bytes)
                                .map_err(de::Error::custom)?;
                            return Ok(VariantValue::Uuid(uuid));
                        }
                        _ => {}
                    }
                }

                // Process all key-value pairs checking for duplicates.
                let mut object = VariantObject::new();
                while let Some(name) = key {
                    let value = visitor.next_value()?;
                    object.insert(name, value).map_err(de::Error::custom)?;
                    key = visitor.next_key()?;
                }

                Ok(VariantValue::Object(object))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
