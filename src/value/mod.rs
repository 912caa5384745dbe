//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The Variant value model.
//!
//! [`VariantValue`] is the in-memory form of an encoded value: the input to
//! the builders and the output of materialization. It preserves the exact
//! primitive kind of its source, so an Int16 re-encodes as an Int16 and a
//! 16-byte decimal keeps its storage flavor.
//!
//! Equality is structural. Objects compare independently of insertion
//! order; arrays compare element by element in order. The `Hash`
//! implementation agrees: object hashes XOR-accumulate over their entries
//! while array hashes are order-dependent.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::error::{Error, Result};
use crate::format::{BasicType, PrimitiveTag};
use crate::read::ValueReader;

mod de;
mod decimal;

pub use decimal::{Decimal, WideDecimal, MAX_DECIMAL_SCALE};

/// Represents any valid Variant value.
///
/// Numeric kinds carry the wire width they were read with or will be
/// written with; converting between widths is the caller's decision, not
/// an equivalence the model applies.
#[derive(Clone, Debug)]
pub enum VariantValue {
    /// The null value.
    Null,
    /// A boolean; true and false are distinct primitive kinds on the wire.
    Boolean(bool),
    /// An 8-bit signed integer.
    Int8(i8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A single-precision float.
    ///
    /// Wrapped in [`OrderedFloat`] so the model has total equality and can
    /// be hashed, as with the doubles below.
    Float(OrderedFloat<f32>),
    /// A double-precision float.
    Double(OrderedFloat<f64>),
    /// A decimal stored in 4 bytes.
    Decimal4(Decimal),
    /// A decimal stored in 8 bytes.
    Decimal8(Decimal),
    /// A decimal stored in 16 bytes whose magnitude fits 96 bits.
    Decimal16(Decimal),
    /// A decimal stored in 16 bytes whose magnitude needs the full width.
    ///
    /// Compares equal to [`VariantValue::Decimal16`] when the numeric
    /// values agree.
    Decimal16Wide(WideDecimal),
    /// Days since the Unix epoch.
    Date(i32),
    /// Timezone-aware microseconds since the Unix epoch.
    Timestamp(i64),
    /// Local-time microseconds since the Unix epoch.
    TimestampNtz(i64),
    /// Microseconds since midnight.
    TimeNtz(i64),
    /// Timezone-aware nanoseconds since the Unix epoch.
    TimestampTzNanos(i64),
    /// Local-time nanoseconds since the Unix epoch.
    TimestampNtzNanos(i64),
    /// An arbitrary byte buffer.
    Binary(Vec<u8>),
    /// A UTF-8 string of either wire form.
    String(String),
    /// An RFC 4122 UUID.
    Uuid(uuid::Uuid),
    /// A mapping from field name to value, in insertion order.
    Object(VariantObject),
    /// An ordered sequence of values.
    Array(Vec<VariantValue>),
}

impl VariantValue {
    /// Wraps a decimal in the narrowest width variant that fits its
    /// unscaled value.
    pub fn from_decimal(decimal: Decimal) -> VariantValue {
        if decimal.fits_decimal4() {
            VariantValue::Decimal4(decimal)
        } else if decimal.fits_decimal8() {
            VariantValue::Decimal8(decimal)
        } else {
            VariantValue::Decimal16(decimal)
        }
    }

    /// Wraps a wide decimal, preferring the 96-bit flavor when it fits.
    pub fn from_wide_decimal(decimal: WideDecimal) -> VariantValue {
        match decimal.narrow() {
            Ok(narrow) => VariantValue::Decimal16(narrow),
            Err(_) => VariantValue::Decimal16Wide(decimal),
        }
    }
}

impl From<bool> for VariantValue {
    fn from(value: bool) -> VariantValue {
        VariantValue::Boolean(value)
    }
}

impl From<i8> for VariantValue {
    fn from(value: i8) -> VariantValue {
        VariantValue::Int8(value)
    }
}

impl From<i16> for VariantValue {
    fn from(value: i16) -> VariantValue {
        VariantValue::Int16(value)
    }
}

impl From<i32> for VariantValue {
    fn from(value: i32) -> VariantValue {
        VariantValue::Int32(value)
    }
}

impl From<i64> for VariantValue {
    fn from(value: i64) -> VariantValue {
        VariantValue::Int64(value)
    }
}

impl From<f32> for VariantValue {
    fn from(value: f32) -> VariantValue {
        VariantValue::Float(OrderedFloat(value))
    }
}

impl From<f64> for VariantValue {
    fn from(value: f64) -> VariantValue {
        VariantValue::Double(OrderedFloat(value))
    }
}

impl From<&str> for VariantValue {
    fn from(value: &str) -> VariantValue {
        VariantValue::String(value.to_string())
    }
}

impl From<String> for VariantValue {
    fn from(value: String) -> VariantValue {
        VariantValue::String(value)
    }
}

impl From<Vec<u8>> for VariantValue {
    fn from(value: Vec<u8>) -> VariantValue {
        VariantValue::Binary(value)
    }
}

impl From<uuid::Uuid> for VariantValue {
    fn from(value: uuid::Uuid) -> VariantValue {
        VariantValue::Uuid(value)
    }
}

impl PartialEq for VariantValue {
    fn eq(&self, other: &VariantValue) -> bool {
        use VariantValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Int8(a), Int8(b)) => a == b,
            (Int16(a), Int16(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Decimal4(a), Decimal4(b)) => a.canonical() == b.canonical(),
            (Decimal8(a), Decimal8(b)) => a.canonical() == b.canonical(),
            (Decimal16(a), Decimal16(b)) => a.canonical() == b.canonical(),
            (Decimal16Wide(a), Decimal16Wide(b)) => a.canonical() == b.canonical(),
            (Decimal16(a), Decimal16Wide(b)) => a.canonical() == b.canonical(),
            (Decimal16Wide(a), Decimal16(b)) => a.canonical() == b.canonical(),
            (Date(a), Date(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (TimestampNtz(a), TimestampNtz(b)) => a == b,
            (TimeNtz(a), TimeNtz(b)) => a == b,
            (TimestampTzNanos(a), TimestampTzNanos(b)) => a == b,
            (TimestampNtzNanos(a), TimestampNtzNanos(b)) => a == b,
            (Binary(a), Binary(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for VariantValue {}

impl Hash for VariantValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use VariantValue::*;
        // Explicit kind codes rather than the discriminant: the two
        // Decimal16 flavors must hash identically when numerically equal.
        match self {
            Null => state.write_u8(0),
            Boolean(v) => { state.write_u8(1); v.hash(state) }
            Int8(v) => { state.write_u8(2); v.hash(state) }
            Int16(v) => { state.write_u8(3); v.hash(state) }
            Int32(v) => { state.write_u8(4); v.hash(state) }
            Int64(v) => { state.write_u8(5); v.hash(state) }
            Float(v) => { state.write_u8(6); v.hash(state) }
            Double(v) => { state.write_u8(7); v.hash(state) }
            Decimal4(v) => { state.write_u8(8); v.canonical().hash(state) }
            Decimal8(v) => { state.write_u8(9); v.canonical().hash(state) }
            Decimal16(v) => { state.write_u8(10); v.canonical().hash(state) }
            Decimal16Wide(v) => { state.write_u8(10); v.canonical().hash(state) }
            Date(v) => { state.write_u8(11); v.hash(state) }
            Timestamp(v) => { state.write_u8(12); v.hash(state) }
            TimestampNtz(v) => { state.write_u8(13); v.hash(state) }
            TimeNtz(v) => { state.write_u8(14); v.hash(state) }
            TimestampTzNanos(v) => { state.write_u8(15); v.hash(state) }
            TimestampNtzNanos(v) => { state.write_u8(16); v.hash(state) }
            Binary(v) => { state.write_u8(17); v.hash(state) }
            String(v) => { state.write_u8(18); v.hash(state) }
            Uuid(v) => { state.write_u8(19); v.hash(state) }
            Object(v) => { state.write_u8(20); v.hash(state) }
            Array(v) => { state.write_u8(21); v.hash(state) }
        }
    }
}

/// An insertion-ordered mapping from field name to value.
///
/// Duplicate names are rejected at insertion, matching the producer rule
/// that an encoded object may not repeat a field.
#[derive(Clone, Debug, Default)]
pub struct VariantObject {
    fields: IndexMap<String, VariantValue>,
}

impl VariantObject {
    pub fn new() -> VariantObject {
        VariantObject::default()
    }

    /// Adds a field, failing if the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: VariantValue) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(Error::DuplicateField(name));
        }
        self.fields.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VariantValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl PartialEq for VariantObject {
    fn eq(&self, other: &VariantObject) -> bool {
        // IndexMap equality disregards order, which is exactly the object
        // semantics: {"a":1,"b":2} == {"b":2,"a":1}.
        self.fields == other.fields
    }
}

impl Eq for VariantObject {}

impl Hash for VariantObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // XOR-accumulated entry hashes keep the hash order-independent to
        // match equality.
        let mut accumulated: u64 = 0;
        for (name, value) in &self.fields {
            let mut entry = DefaultHasher::new();
            name.hash(&mut entry);
            value.hash(&mut entry);
            accumulated ^= entry.finish();
        }
        state.write_usize(self.fields.len());
        state.write_u64(accumulated);
    }
}

/// Decodes an entire value into the owned model.
///
/// The exact primitive kind of every value is preserved: a 16-byte decimal
/// materializes as [`VariantValue::Decimal16`] when its magnitude fits 96
/// bits and as [`VariantValue::Decimal16Wide`] otherwise.
pub fn materialize(reader: &ValueReader) -> Result<VariantValue> {
    match reader.basic_type() {
        BasicType::ShortString => Ok(VariantValue::String(reader.get_string()?.to_string())),
        BasicType::Object => {
            let object = reader.object()?;
            let mut fields = VariantObject::new();
            for index in 0 .. object.len() {
                let name = object.get_field_name(index)?;
                let child = materialize(&object.get_field_value(index)?)?;
                fields.insert(name, child)?;
            }
            Ok(VariantValue::Object(fields))
        }
        BasicType::Array => {
            let array = reader.array()?;
            let mut elements = Vec::with_capacity(array.len());
            for index in 0 .. array.len() {
                elements.push(materialize(&array.get_element(index)?)?);
            }
            Ok(VariantValue::Array(elements))
        }
        BasicType::Primitive => match reader.primitive_tag()? {
            PrimitiveTag::Null => Ok(VariantValue::Null),
            PrimitiveTag::BooleanTrue => Ok(VariantValue::Boolean(true)),
            PrimitiveTag::BooleanFalse => Ok(VariantValue::Boolean(false)),
            PrimitiveTag::Int8 => Ok(VariantValue::Int8(reader.get_int8()?)),
            PrimitiveTag::Int16 => Ok(VariantValue::Int16(reader.get_int16()?)),
            PrimitiveTag::Int32 => Ok(VariantValue::Int32(reader.get_int32()?)),
            PrimitiveTag::Int64 => Ok(VariantValue::Int64(reader.get_int64()?)),
            PrimitiveTag::Float => Ok(VariantValue::Float(OrderedFloat(reader.get_float()?))),
            PrimitiveTag::Double => Ok(VariantValue::Double(OrderedFloat(reader.get_double()?))),
            PrimitiveTag::Decimal4 => Ok(VariantValue::Decimal4(reader.get_decimal4()?)),
            PrimitiveTag::Decimal8 => Ok(VariantValue::Decimal8(reader.get_decimal8()?)),
            PrimitiveTag::Decimal16 => match reader.try_get_decimal16()? {
                Some(narrow) => Ok(VariantValue::Decimal16(narrow)),
                None => Ok(VariantValue::Decimal16Wide(reader.get_decimal16_wide()?)),
            },
            PrimitiveTag::Date => Ok(VariantValue::Date(reader.get_date()?)),
            PrimitiveTag::Timestamp => Ok(VariantValue::Timestamp(reader.get_timestamp_micros()?)),
            PrimitiveTag::TimestampNtz =>
                Ok(VariantValue::TimestampNtz(reader.get_timestamp_ntz_micros()?)),
            PrimitiveTag::TimeNtz => Ok(VariantValue::TimeNtz(reader.get_time_micros()?)),
            PrimitiveTag::TimestampTzNanos =>
                Ok(VariantValue::TimestampTzNanos(reader.get_timestamp_tz_nanos()?)),
            PrimitiveTag::TimestampNtzNanos =>
                Ok(VariantValue::TimestampNtzNanos(reader.get_timestamp_ntz_nanos()?)),
            PrimitiveTag::Binary => Ok(VariantValue::Binary(reader.get_binary()?.to_vec())),
            PrimitiveTag::String => Ok(VariantValue::String(reader.get_string()?.to_string())),
            PrimitiveTag::Uuid => Ok(VariantValue::Uuid(reader.get_uuid()?)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(value: &VariantValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_exact_tags_are_not_equivalent() {
        assert_ne!(VariantValue::Int8(5), VariantValue::Int16(5));
        assert_ne!(VariantValue::Int32(5), VariantValue::Int64(5));
        assert_ne!(
            VariantValue::Timestamp(100),
            VariantValue::TimestampNtz(100),
        );
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let mut forward = VariantObject::new();
        forward.insert("a", VariantValue::Int8(1)).unwrap();
        forward.insert("b", VariantValue::Int8(2)).unwrap();

        let mut backward = VariantObject::new();
        backward.insert("b", VariantValue::Int8(2)).unwrap();
        backward.insert("a", VariantValue::Int8(1)).unwrap();

        let forward = VariantValue::Object(forward);
        let backward = VariantValue::Object(backward);
        assert_eq!(forward, backward);
        assert_eq!(hash_of(&forward), hash_of(&backward));
    }

    #[test]
    fn test_array_equality_respects_order() {
        let forward = VariantValue::Array(vec![VariantValue::Int8(1), VariantValue::Int8(2)]);
        let backward = VariantValue::Array(vec![VariantValue::Int8(2), VariantValue::Int8(1)]);
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut object = VariantObject::new();
        object.insert("a", VariantValue::Null).unwrap();
        assert_eq!(
            object.insert("a", VariantValue::Null),
            Err(Error::DuplicateField("a".to_string())),
        );
    }

    #[test]
    fn test_decimal_flavors_equal_when_values_agree() {
        let narrow = VariantValue::Decimal16(Decimal::new(1234, 2).unwrap());
        let wide = VariantValue::Decimal16Wide(WideDecimal::new(1234, 2).unwrap());
        assert_eq!(narrow, wide);
        assert_eq!(hash_of(&narrow), hash_of(&wide));

        let other = VariantValue::Decimal16Wide(WideDecimal::new(1235, 2).unwrap());
        assert_ne!(narrow, other);
    }

    #[test]
    fn test_decimal_trailing_zero_equivalence() {
        let padded = VariantValue::Decimal4(Decimal::new(1200, 2).unwrap());
        let plain = VariantValue::Decimal4(Decimal::new(12, 0).unwrap());
        assert_eq!(padded, plain);
        assert_eq!(hash_of(&padded), hash_of(&plain));
    }

    #[test]
    fn test_from_decimal_picks_narrowest_width() {
        let small = Decimal::new(100, 0).unwrap();
        assert!(matches!(VariantValue::from_decimal(small), VariantValue::Decimal4(_)));

        let medium = Decimal::new(i32::MAX as i128 + 1, 0).unwrap();
        assert!(matches!(VariantValue::from_decimal(medium), VariantValue::Decimal8(_)));

        let large = Decimal::new(i64::MAX as i128 + 1, 0).unwrap();
        assert!(matches!(VariantValue::from_decimal(large), VariantValue::Decimal16(_)));
    }

    #[test]
    fn test_from_wide_decimal_prefers_narrow() {
        let fits = WideDecimal::new(7, 0).unwrap();
        assert!(matches!(VariantValue::from_wide_decimal(fits), VariantValue::Decimal16(_)));

        let wide = WideDecimal::new(1 << 96, 0).unwrap();
        assert!(matches!(
            VariantValue::from_wide_decimal(wide),
            VariantValue::Decimal16Wide(_),
        ));
    }
}
