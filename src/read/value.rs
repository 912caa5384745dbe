//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::str;

use nom::IResult;

use crate::error::{Error, Result};
use crate::format::{
    BasicType,
    PrimitiveTag,
    unpack_array_header,
    unpack_object_header,
    unpack_value_header,
};
use crate::read::metadata::MetadataReader;
use crate::read::parser;
use crate::value::{Decimal, WideDecimal};

/// A borrowed view of one encoded value.
///
/// The reader holds the metadata reader and the tail of the value blob
/// starting at this value's header byte. Values are self-delimiting, so no
/// length is needed; accessors parse exactly the payload they name. Child
/// readers handed out by [`ObjectReader`] and [`ArrayReader`] borrow the
/// same two buffers and must not outlive them.
#[derive(Copy, Clone, Debug)]
pub struct ValueReader<'a> {
    metadata: MetadataReader<'a>,
    value: &'a [u8],
}

impl<'a> ValueReader<'a> {
    /// Binds a reader to a value blob, validating that the header byte is
    /// present and names a known kind.
    pub fn new(metadata: MetadataReader<'a>, value: &'a [u8]) -> Result<ValueReader<'a>> {
        let (basic_type, value_header) = match value.first() {
            None => return Err(Error::MalformedEncoding),
            Some(byte) => unpack_value_header(*byte),
        };
        if basic_type == BasicType::Primitive {
            PrimitiveTag::from_type_id(value_header)?;
        }
        Ok(ValueReader { metadata, value })
    }

    /// The metadata dictionary this value was encoded against.
    pub fn metadata(&self) -> MetadataReader<'a> {
        self.metadata
    }

    /// The 2-bit family of this value.
    pub fn basic_type(&self) -> BasicType {
        BasicType::from_header(self.value[0])
    }

    /// The concrete primitive kind, failing on the other three families.
    pub fn primitive_tag(&self) -> Result<PrimitiveTag> {
        let (basic_type, value_header) = unpack_value_header(self.value[0]);
        if basic_type != BasicType::Primitive {
            return Err(Error::TypeMismatch);
        }
        PrimitiveTag::from_type_id(value_header)
    }

    fn expect(&self, tag: PrimitiveTag) -> Result<()> {
        if self.primitive_tag()? != tag {
            return Err(Error::TypeMismatch);
        }
        Ok(())
    }

    /// Runs a payload parser after the tag has been asserted; whatever still
    /// fails at that point is a truncated or corrupt buffer.
    fn run<T>(&self, parse: impl Fn(&'a [u8]) -> IResult<&'a [u8], T>) -> Result<T> {
        parse(self.value)
            .map(|(_, value)| value)
            .map_err(|_| Error::MalformedEncoding)
    }

    pub fn get_null(&self) -> Result<()> {
        self.expect(PrimitiveTag::Null)?;
        Ok(())
    }

    pub fn get_boolean(&self) -> Result<bool> {
        match self.primitive_tag()? {
            PrimitiveTag::BooleanTrue => Ok(true),
            PrimitiveTag::BooleanFalse => Ok(false),
            _ => Err(Error::TypeMismatch),
        }
    }

    pub fn get_int8(&self) -> Result<i8> {
        self.expect(PrimitiveTag::Int8)?;
        self.run(parser::value::int8)
    }

    pub fn get_int16(&self) -> Result<i16> {
        self.expect(PrimitiveTag::Int16)?;
        self.run(parser::value::int16)
    }

    pub fn get_int32(&self) -> Result<i32> {
        self.expect(PrimitiveTag::Int32)?;
        self.run(parser::value::int32)
    }

    pub fn get_int64(&self) -> Result<i64> {
        self.expect(PrimitiveTag::Int64)?;
        self.run(parser::value::int64)
    }

    pub fn get_float(&self) -> Result<f32> {
        self.expect(PrimitiveTag::Float)?;
        self.run(parser::value::float)
    }

    pub fn get_double(&self) -> Result<f64> {
        self.expect(PrimitiveTag::Double)?;
        self.run(parser::value::double)
    }

    pub fn get_decimal4(&self) -> Result<Decimal> {
        self.expect(PrimitiveTag::Decimal4)?;
        let (unscaled, scale) = self.run(parser::value::decimal4)?;
        Decimal::new(unscaled as i128, scale)
    }

    pub fn get_decimal8(&self) -> Result<Decimal> {
        self.expect(PrimitiveTag::Decimal8)?;
        let (unscaled, scale) = self.run(parser::value::decimal8)?;
        Decimal::new(unscaled as i128, scale)
    }

    /// Reads a 16-byte decimal whose magnitude fits in 96 bits.
    ///
    /// Fails with [`Error::DecimalOverflow`] when it does not; use
    /// [`ValueReader::try_get_decimal16`] or
    /// [`ValueReader::get_decimal16_wide`] for the general case.
    pub fn get_decimal16(&self) -> Result<Decimal> {
        self.expect(PrimitiveTag::Decimal16)?;
        let (unscaled, scale) = self.run(parser::value::decimal16)?;
        Decimal::new(unscaled, scale)
    }

    /// Reads a 16-byte decimal as a 96-bit-fitting value, yielding `None`
    /// instead of failing when the magnitude is too large.
    pub fn try_get_decimal16(&self) -> Result<Option<Decimal>> {
        self.expect(PrimitiveTag::Decimal16)?;
        let (unscaled, scale) = self.run(parser::value::decimal16)?;
        Ok(Decimal::new(unscaled, scale).ok())
    }

    /// Reads a 16-byte decimal with its full two's-complement magnitude.
    pub fn get_decimal16_wide(&self) -> Result<WideDecimal> {
        self.expect(PrimitiveTag::Decimal16)?;
        let (unscaled, scale) = self.run(parser::value::decimal16)?;
        WideDecimal::new(unscaled, scale)
    }

    /// Signed days since the Unix epoch.
    pub fn get_date(&self) -> Result<i32> {
        self.expect(PrimitiveTag::Date)?;
        self.run(parser::value::date)
    }

    /// Timezone-aware microseconds since the Unix epoch.
    pub fn get_timestamp_micros(&self) -> Result<i64> {
        self.expect(PrimitiveTag::Timestamp)?;
        self.run(parser::value::timestamp_micros)
    }

    /// Local-time microseconds since the Unix epoch.
    pub fn get_timestamp_ntz_micros(&self) -> Result<i64> {
        self.expect(PrimitiveTag::TimestampNtz)?;
        self.run(parser::value::timestamp_ntz_micros)
    }

    /// Microseconds since midnight.
    pub fn get_time_micros(&self) -> Result<i64> {
        self.expect(PrimitiveTag::TimeNtz)?;
        self.run(parser::value::time_micros)
    }

    /// Timezone-aware nanoseconds since the Unix epoch.
    pub fn get_timestamp_tz_nanos(&self) -> Result<i64> {
        self.expect(PrimitiveTag::TimestampTzNanos)?;
        self.run(parser::value::timestamp_tz_nanos)
    }

    /// Local-time nanoseconds since the Unix epoch.
    pub fn get_timestamp_ntz_nanos(&self) -> Result<i64> {
        self.expect(PrimitiveTag::TimestampNtzNanos)?;
        self.run(parser::value::timestamp_ntz_nanos)
    }

    pub fn get_binary(&self) -> Result<&'a [u8]> {
        self.expect(PrimitiveTag::Binary)?;
        self.run(parser::value::binary)
    }

    /// Returns the raw bytes of a string value of either form.
    pub fn get_string_bytes(&self) -> Result<&'a [u8]> {
        match self.basic_type() {
            BasicType::ShortString => self.run(parser::value::short_string_bytes),
            BasicType::Primitive => {
                self.expect(PrimitiveTag::String)?;
                self.run(parser::value::string_bytes)
            }
            _ => Err(Error::TypeMismatch),
        }
    }

    /// Returns a string value of either form, validating UTF-8.
    pub fn get_string(&self) -> Result<&'a str> {
        str::from_utf8(self.get_string_bytes()?).map_err(|_| Error::InvalidUtf8)
    }

    /// Reads a UUID value.
    ///
    /// The payload is stored in RFC 4122 network order, which is also the
    /// in-memory layout of [`uuid::Uuid`], so the bytes pass through
    /// unchanged.
    pub fn get_uuid(&self) -> Result<uuid::Uuid> {
        let bytes = self.get_uuid_bytes()?;
        uuid::Uuid::from_slice(bytes).map_err(|_| Error::MalformedEncoding)
    }

    /// The 16 raw payload bytes of a UUID value, in network order.
    pub fn get_uuid_bytes(&self) -> Result<&'a [u8]> {
        self.expect(PrimitiveTag::Uuid)?;
        self.run(parser::value::uuid)
    }

    /// Enters an object value.
    pub fn object(&self) -> Result<ObjectReader<'a>> {
        ObjectReader::new(self.metadata, self.value)
    }

    /// Enters an array value.
    pub fn array(&self) -> Result<ArrayReader<'a>> {
        ArrayReader::new(self.metadata, self.value)
    }
}

/// Reads a little-endian unsigned integer of `width` bytes at `start`.
///
/// The caller established at construction that the range is in bounds.
fn uint_at(data: &[u8], start: usize, width: usize) -> usize {
    data[start .. start + width].iter().enumerate().fold(0, |acc, (i, b)| {
        acc | (*b as usize) << (8 * i)
    })
}

/// A borrowed view of an object value: a sorted list of field-ID/offset
/// pairs over a region of concatenated field values.
#[derive(Copy, Clone, Debug)]
pub struct ObjectReader<'a> {
    metadata: MetadataReader<'a>,
    value: &'a [u8],
    num_fields: usize,
    field_id_size: usize,
    offset_size: usize,
    field_ids_start: usize,
    offsets_start: usize,
    values_start: usize,
}

impl<'a> ObjectReader<'a> {
    /// Parses the container header and locates the three payload regions.
    pub fn new(metadata: MetadataReader<'a>, value: &'a [u8]) -> Result<ObjectReader<'a>> {
        let (basic_type, value_header) = match value.first() {
            None => return Err(Error::MalformedEncoding),
            Some(byte) => unpack_value_header(*byte),
        };
        if basic_type != BasicType::Object {
            return Err(Error::TypeMismatch);
        }
        let (field_id_size, offset_size, is_large) = unpack_object_header(value_header)?;

        let count_size = if is_large { 4 } else { 1 };
        if value.len() < 1 + count_size {
            return Err(Error::MalformedEncoding);
        }
        let num_fields = uint_at(value, 1, count_size);

        let field_ids_start = 1 + count_size;
        let offsets_start = field_ids_start + num_fields * field_id_size;
        let values_start = offsets_start + (num_fields + 1) * offset_size;
        if value.len() < values_start {
            return Err(Error::MalformedEncoding);
        }

        Ok(ObjectReader {
            metadata,
            value,
            num_fields,
            field_id_size,
            offset_size,
            field_ids_start,
            offsets_start,
            values_start,
        })
    }

    /// The number of fields in the object.
    pub fn len(&self) -> usize {
        self.num_fields
    }

    pub fn is_empty(&self) -> bool {
        self.num_fields == 0
    }

    /// The dictionary index of field `index`.
    pub fn field_id(&self, index: usize) -> Result<usize> {
        if index >= self.num_fields {
            return Err(Error::MalformedEncoding);
        }
        Ok(uint_at(self.value, self.field_ids_start + index * self.field_id_size, self.field_id_size))
    }

    fn offset(&self, index: usize) -> usize {
        uint_at(self.value, self.offsets_start + index * self.offset_size, self.offset_size)
    }

    /// The name of field `index`, resolved through the dictionary.
    pub fn get_field_name(&self, index: usize) -> Result<&'a str> {
        self.metadata.get_string(self.field_id(index)?)
    }

    /// A reader over the value of field `index`.
    ///
    /// The offset names where the child starts; the child's own header
    /// delimits it, which is why non-monotonic offset tables are legal.
    pub fn get_field_value(&self, index: usize) -> Result<ValueReader<'a>> {
        if index >= self.num_fields {
            return Err(Error::MalformedEncoding);
        }
        let start = self.values_start + self.offset(index);
        if start > self.value.len() {
            return Err(Error::MalformedEncoding);
        }
        ValueReader::new(self.metadata, &self.value[start ..])
    }

    /// Looks a field up by name.
    ///
    /// Field IDs are written in ascending order and reference sorted
    /// dictionary positions, so the field names are themselves in ascending
    /// byte order and binary search applies.
    pub fn try_get_field(&self, name: &str) -> Result<Option<ValueReader<'a>>> {
        let needle = name.as_bytes();
        let mut low = 0;
        let mut high = self.num_fields;
        while low < high {
            let mid = low + (high - low) / 2;
            let entry = self.metadata.get_bytes(self.field_id(mid)?)?;
            match entry.cmp(needle) {
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid,
                std::cmp::Ordering::Equal => return self.get_field_value(mid).map(Some),
            }
        }
        Ok(None)
    }
}

/// A borrowed view of an array value.
#[derive(Copy, Clone, Debug)]
pub struct ArrayReader<'a> {
    metadata: MetadataReader<'a>,
    value: &'a [u8],
    num_elements: usize,
    offset_size: usize,
    offsets_start: usize,
    values_start: usize,
}

impl<'a> ArrayReader<'a> {
    /// Parses the container header and locates the payload regions.
    pub fn new(metadata: MetadataReader<'a>, value: &'a [u8]) -> Result<ArrayReader<'a>> {
        let (basic_type, value_header) = match value.first() {
            None => return Err(Error::MalformedEncoding),
            Some(byte) => unpack_value_header(*byte),
        };
        if basic_type != BasicType::Array {
            return Err(Error::TypeMismatch);
        }
        let (offset_size, is_large) = unpack_array_header(value_header)?;

        let count_size = if is_large { 4 } else { 1 };
        if value.len() < 1 + count_size {
            return Err(Error::MalformedEncoding);
        }
        let num_elements = uint_at(value, 1, count_size);

        let offsets_start = 1 + count_size;
        let values_start = offsets_start + (num_elements + 1) * offset_size;
        if value.len() < values_start {
            return Err(Error::MalformedEncoding);
        }

        Ok(ArrayReader {
            metadata,
            value,
            num_elements,
            offset_size,
            offsets_start,
            values_start,
        })
    }

    /// The number of elements in the array.
    pub fn len(&self) -> usize {
        self.num_elements
    }

    pub fn is_empty(&self) -> bool {
        self.num_elements == 0
    }

    fn offset(&self, index: usize) -> usize {
        uint_at(self.value, self.offsets_start + index * self.offset_size, self.offset_size)
    }

    /// A reader over the element at `index`.
    pub fn get_element(&self, index: usize) -> Result<ValueReader<'a>> {
        if index >= self.num_elements {
            return Err(Error::MalformedEncoding);
        }
        let start = self.values_start + self.offset(index);
        if start > self.value.len() {
            return Err(Error::MalformedEncoding);
        }
        ValueReader::new(self.metadata, &self.value[start ..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_metadata() -> &'static [u8] {
        &[0x11, 0x00, 0x00]
    }

    fn reader<'a>(metadata: &'a [u8], value: &'a [u8]) -> ValueReader<'a> {
        ValueReader::new(MetadataReader::new(metadata).unwrap(), value).unwrap()
    }

    #[test]
    fn test_short_string_hi() {
        let value = reader(empty_metadata(), &[0x09, 0x48, 0x69]);
        assert_eq!(value.basic_type(), BasicType::ShortString);
        assert_eq!(value.get_string(), Ok("Hi"));
        assert_eq!(value.get_string_bytes(), Ok(&b"Hi"[..]));
    }

    #[test]
    fn test_long_string() {
        let value = reader(empty_metadata(), &[0x40, 0x02, 0x00, 0x00, 0x00, 0x48, 0x69]);
        assert_eq!(value.basic_type(), BasicType::Primitive);
        assert_eq!(value.primitive_tag(), Ok(PrimitiveTag::String));
        assert_eq!(value.get_string(), Ok("Hi"));
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let value = reader(empty_metadata(), &[0x09, 0x48, 0x69]);
        assert_eq!(value.get_int8(), Err(Error::TypeMismatch));
        assert_eq!(value.get_boolean(), Err(Error::TypeMismatch));
        assert_eq!(value.object().unwrap_err(), Error::TypeMismatch);
        assert_eq!(value.array().unwrap_err(), Error::TypeMismatch);
    }

    #[test]
    fn test_unknown_primitive_rejected() {
        let metadata = MetadataReader::new(empty_metadata()).unwrap();
        assert_eq!(
            ValueReader::new(metadata, &[21 << 2]).unwrap_err(),
            Error::UnsupportedPrimitive(21),
        );
    }

    #[test]
    fn test_object_age_name() {
        // {"age": 30, "name": "Bob"} over the dictionary {"age", "name"}.
        let metadata = &[
            0x11, 0x02, 0x00, 0x03, 0x07, 0x61, 0x67, 0x65, 0x6E, 0x61, 0x6D, 0x65,
        ];
        let value = &[
            0x02, 0x02, 0x00, 0x01, 0x00, 0x02, 0x06, 0x0C, 0x1E, 0x0D, 0x42, 0x6F, 0x62,
        ];
        let object = reader(metadata, value).object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object.get_field_name(0), Ok("age"));
        assert_eq!(object.get_field_name(1), Ok("name"));
        assert_eq!(object.get_field_value(0).unwrap().get_int8(), Ok(30));
        assert_eq!(object.get_field_value(1).unwrap().get_string(), Ok("Bob"));

        let by_name = object.try_get_field("name").unwrap().unwrap();
        assert_eq!(by_name.get_string(), Ok("Bob"));
        let by_name = object.try_get_field("age").unwrap().unwrap();
        assert_eq!(by_name.get_int8(), Ok(30));
        assert!(object.try_get_field("missing").unwrap().is_none());
    }

    #[test]
    fn test_array_int_string_null() {
        // [42, "hi", null]
        let value = reader(empty_metadata(), &[
            0x03, 0x03, 0x00, 0x02, 0x05, 0x06, 0x0C, 0x2A, 0x09, 0x68, 0x69, 0x00,
        ]);
        let array = value.array().unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.get_element(0).unwrap().get_int8(), Ok(42));
        assert_eq!(array.get_element(1).unwrap().get_string(), Ok("hi"));
        assert_eq!(array.get_element(2).unwrap().get_null(), Ok(()));
        assert_eq!(array.get_element(3).unwrap_err(), Error::MalformedEncoding);
    }

    #[test]
    fn test_uuid_network_order() {
        let mut value = vec![0x50];
        value.extend_from_slice(&[
            0x55, 0x0E, 0x84, 0x00, 0xE2, 0x9B, 0x41, 0xD4,
            0xA7, 0x16, 0x44, 0x66, 0x55, 0x44, 0x00, 0x00,
        ]);
        let uuid = reader(empty_metadata(), &value).get_uuid().unwrap();
        assert_eq!(uuid.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_decimal16_wide_accessors() {
        // 2^96 with scale zero: too large for the 96-bit view.
        let mut value = vec![0x28, 0x00];
        value.extend_from_slice(&(1i128 << 96).to_le_bytes());
        let value = reader(empty_metadata(), &value);
        assert_eq!(value.get_decimal16(), Err(Error::DecimalOverflow));
        assert_eq!(value.try_get_decimal16(), Ok(None));
        let wide = value.get_decimal16_wide().unwrap();
        assert_eq!(wide.unscaled(), 1i128 << 96);
        assert_eq!(wide.scale(), 0);
    }

    #[test]
    fn test_decimal16_narrow_accessors() {
        // 2^96 - 1 fits the 96-bit view.
        let mut value = vec![0x28, 0x02];
        value.extend_from_slice(&((1i128 << 96) - 1).to_le_bytes());
        let value = reader(empty_metadata(), &value);
        let narrow = value.get_decimal16().unwrap();
        assert_eq!(narrow.unscaled(), (1i128 << 96) - 1);
        assert_eq!(narrow.scale(), 2);
        assert_eq!(value.try_get_decimal16(), Ok(Some(narrow)));
    }

    #[test]
    fn test_truncated_container_rejected() {
        let metadata = MetadataReader::new(empty_metadata()).unwrap();
        // Object claiming two fields but holding no tables.
        assert_eq!(
            ObjectReader::new(metadata, &[0x02, 0x02]).unwrap_err(),
            Error::MalformedEncoding,
        );
        assert_eq!(
            ArrayReader::new(metadata, &[0x03, 0x03, 0x00]).unwrap_err(),
            Error::MalformedEncoding,
        );
    }

    #[test]
    fn test_empty_containers() {
        let metadata = MetadataReader::new(empty_metadata()).unwrap();
        let object = ObjectReader::new(metadata, &[0x02, 0x00, 0x00]).unwrap();
        assert!(object.is_empty());
        assert!(object.try_get_field("x").unwrap().is_none());
        let array = ArrayReader::new(metadata, &[0x03, 0x00, 0x00]).unwrap();
        assert!(array.is_empty());
    }
}
