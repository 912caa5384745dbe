//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! A serde Deserializer reading directly from encoded blobs.
//!
//! [`from_slices`] decodes any `Deserialize` type out of a
//! `(metadata, value)` pair without an intermediate model: strings and
//! binary payloads are borrowed from the value blob, objects become maps
//! with dictionary-resolved keys, and integers arrive at their exact wire
//! width.
//!
//! Serde has no analogue for dates, timestamps, decimals, or UUIDs. Those
//! kinds surface as single-field pseudo-structures with private magic
//! field names, the same device the TOML crate uses for its datetime; the
//! [`crate::VariantValue`] `Deserialize` impl recognizes them, so
//! `from_slices::<VariantValue>` restores every primitive kind exactly.

use serde::de::{
    self,
    DeserializeSeed,
    IntoDeserializer,
    MapAccess,
    SeqAccess,
    Visitor,
};
use serde::de::value::{
    BorrowedBytesDeserializer,
    BorrowedStrDeserializer,
    SeqDeserializer,
};

use crate::error::{Error, Result};
use crate::format::{BasicType, PrimitiveTag};
use crate::read::{ArrayReader, MetadataReader, ObjectReader, ValueReader};

/// Magic field names carrying the primitive kinds serde cannot express.
pub(crate) mod magic {
    pub const DATE: &str = "$__variant_private_Date_days";
    pub const TIMESTAMP: &str = "$__variant_private_Timestamp_micros";
    pub const TIMESTAMP_NTZ: &str = "$__variant_private_TimestampNtz_micros";
    pub const TIME_NTZ: &str = "$__variant_private_TimeNtz_micros";
    pub const TIMESTAMP_TZ_NANOS: &str = "$__variant_private_TimestampTzNanos_nanos";
    pub const TIMESTAMP_NTZ_NANOS: &str = "$__variant_private_TimestampNtzNanos_nanos";
    pub const DECIMAL4: &str = "$__variant_private_Decimal4_parts";
    pub const DECIMAL8: &str = "$__variant_private_Decimal8_parts";
    pub const DECIMAL16: &str = "$__variant_private_Decimal16_parts";
    pub const UUID: &str = "$__variant_private_Uuid_bytes";
}

/// Deserializer positioned at one encoded value.
#[derive(Copy, Clone, Debug)]
pub struct Deserializer<'de> {
    reader: ValueReader<'de>,
}

impl<'de> Deserializer<'de> {
    /// Designated initializer for a Variant value deserializer.
    pub fn from_reader(reader: ValueReader<'de>) -> Self {
        Deserializer { reader }
    }
}

/// Deserializes any supported type from a metadata and value blob pair.
pub fn from_slices<'a, T>(metadata: &'a [u8], value: &'a [u8]) -> Result<T>
where
    T: de::Deserialize<'a>,
{
    let metadata = MetadataReader::new(metadata)?;
    let reader = ValueReader::new(metadata, value)?;
    T::deserialize(Deserializer::from_reader(reader))
}

/// The payload of a pseudo-structure.
enum Payload<'de> {
    I32(i32),
    I64(i64),
    Decimal { unscaled: i128, scale: u8 },
    Bytes(&'de [u8]),
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.reader.basic_type() {
            BasicType::ShortString =>
                visitor.visit_borrowed_str(self.reader.get_string()?),

            BasicType::Object => visitor.visit_map(FieldAccess {
                object: self.reader.object()?,
                index: 0,
            }),

            BasicType::Array => visitor.visit_seq(ElementAccess {
                array: self.reader.array()?,
                index: 0,
            }),

            BasicType::Primitive => match self.reader.primitive_tag()? {
                PrimitiveTag::Null =>
                    visitor.visit_unit(),
                PrimitiveTag::BooleanTrue | PrimitiveTag::BooleanFalse =>
                    visitor.visit_bool(self.reader.get_boolean()?),
                PrimitiveTag::Int8 =>
                    visitor.visit_i8(self.reader.get_int8()?),
                PrimitiveTag::Int16 =>
                    visitor.visit_i16(self.reader.get_int16()?),
                PrimitiveTag::Int32 =>
                    visitor.visit_i32(self.reader.get_int32()?),
                PrimitiveTag::Int64 =>
                    visitor.visit_i64(self.reader.get_int64()?),
                PrimitiveTag::Float =>
                    visitor.visit_f32(self.reader.get_float()?),
                PrimitiveTag::Double =>
                    visitor.visit_f64(self.reader.get_double()?),
                PrimitiveTag::String =>
                    visitor.visit_borrowed_str(self.reader.get_string()?),
                PrimitiveTag::Binary =>
                    visitor.visit_borrowed_bytes(self.reader.get_binary()?),

                PrimitiveTag::Date => visitor.visit_map(PseudoAccess {
                    field: magic::DATE,
                    payload: Some(Payload::I32(self.reader.get_date()?)),
                }),
                PrimitiveTag::Timestamp => visitor.visit_map(PseudoAccess {
                    field: magic::TIMESTAMP,
                    payload: Some(Payload::I64(self.reader.get_timestamp_micros()?)),
                }),
                PrimitiveTag::TimestampNtz => visitor.visit_map(PseudoAccess {
                    field: magic::TIMESTAMP_NTZ,
                    payload: Some(Payload::I64(self.reader.get_timestamp_ntz_micros()?)),
                }),
                PrimitiveTag::TimeNtz => visitor.visit_map(PseudoAccess {
                    field: magic::TIME_NTZ,
                    payload: Some(Payload::I64(self.reader.get_time_micros()?)),
                }),
                PrimitiveTag::TimestampTzNanos => visitor.visit_map(PseudoAccess {
                    field: magic::TIMESTAMP_TZ_NANOS,
                    payload: Some(Payload::I64(self.reader.get_timestamp_tz_nanos()?)),
                }),
                PrimitiveTag::TimestampNtzNanos => visitor.visit_map(PseudoAccess {
                    field: magic::TIMESTAMP_NTZ_NANOS,
                    payload: Some(Payload::I64(self.reader.get_timestamp_ntz_nanos()?)),
                }),

                PrimitiveTag::Decimal4 => {
                    let decimal = self.reader.get_decimal4()?;
                    visitor.visit_map(PseudoAccess {
                        field: magic::DECIMAL4,
                        payload: Some(Payload::Decimal {
                            unscaled: decimal.unscaled(),
                            scale: decimal.scale(),
                        }),
                    })
                }
                PrimitiveTag::Decimal8 => {
                    let decimal = self.reader.get_decimal8()?;
                    visitor.visit_map(PseudoAccess {
                        field: magic::DECIMAL8,
                        payload: Some(Payload::Decimal {
                            unscaled: decimal.unscaled(),
                            scale: decimal.scale(),
                        }),
                    })
                }
                PrimitiveTag::Decimal16 => {
                    let decimal = self.reader.get_decimal16_wide()?;
                    visitor.visit_map(PseudoAccess {
                        field: magic::DECIMAL16,
                        payload: Some(Payload::Decimal {
                            unscaled: decimal.unscaled(),
                            scale: decimal.scale(),
                        }),
                    })
                }
                PrimitiveTag::Uuid => visitor.visit_map(PseudoAccess {
                    field: magic::UUID,
                    payload: Some(Payload::Bytes(self.reader.get_uuid_bytes()?)),
                }),
            },
        }
    }

    /// Null maps to `None`; anything else is wrapped in `Some`.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.reader.basic_type() == BasicType::Primitive
            && self.reader.primitive_tag()? == PrimitiveTag::Null
        {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    serde::forward_to_deserialize_any! {
        bool
        u8 u16 u32 u64 u128
        i8 i16 i32 i64 i128
        f32 f64
        char str string
        seq map
        bytes byte_buf
        enum
        struct
        unit unit_struct
        tuple tuple_struct
        newtype_struct
        ignored_any
        identifier
    }
}

/// Access object to process the elements of an encoded array.
struct ElementAccess<'de> {
    array: ArrayReader<'de>,
    index: usize,
}

impl<'de> SeqAccess<'de> for ElementAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.index >= self.array.len() {
            return Ok(None);
        }
        let reader = self.array.get_element(self.index)?;
        self.index += 1;
        seed.deserialize(Deserializer::from_reader(reader)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.array.len() - self.index)
    }
}

/// Access object to process the fields of an encoded object.
struct FieldAccess<'de> {
    object: ObjectReader<'de>,
    index: usize,
}

impl<'de> MapAccess<'de> for FieldAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.index >= self.object.len() {
            return Ok(None);
        }
        let name = self.object.get_field_name(self.index)?;
        seed.deserialize(BorrowedStrDeserializer::new(name)).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let reader = self.object.get_field_value(self.index)?;
        self.index += 1;
        seed.deserialize(Deserializer::from_reader(reader))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.object.len() - self.index)
    }
}

/// Access object providing a single-field map around a pseudo-structure.
struct PseudoAccess<'de> {
    field: &'static str,
    payload: Option<Payload<'de>>,
}

impl<'de> MapAccess<'de> for PseudoAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.payload.is_none() {
            return Ok(None);
        }
        seed.deserialize(self.field.into_deserializer()).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.payload.take() {
            None => Err(de::Error::custom("pseudo-structure value already taken")),
            Some(Payload::I32(value)) =>
                seed.deserialize(value.into_deserializer()),
            Some(Payload::I64(value)) =>
                seed.deserialize(value.into_deserializer()),
            Some(Payload::Decimal { unscaled, scale }) =>
                seed.deserialize(SeqDeserializer::new([unscaled, scale as i128].into_iter())),
            Some(Payload::Bytes(bytes)) =>
                seed.deserialize(BorrowedBytesDeserializer::new(bytes)),
        }
    }
}
