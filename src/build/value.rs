//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use crate::build::MetadataBuilder;
use crate::error::{Error, Result};
use crate::format::{
    self,
    MAX_SHORT_STRING_LEN,
    MAX_SMALL_CONTAINER_LEN,
    PrimitiveTag,
    min_width,
    primitive_header,
    push_uint,
    short_string_header,
};
use crate::value::{Decimal, VariantValue, WideDecimal};

enum FrameKind {
    /// Sorted field IDs paired with each child's start offset in the
    /// scratch buffer, in input order.
    Object { fields: Vec<(u32, usize)> },
    /// Each child's start offset in the scratch buffer.
    Array { starts: Vec<usize> },
}

/// One open container: children accumulate in a scratch buffer until the
/// payload length is known and the final header can be sized.
struct Frame {
    buffer: Vec<u8>,
    kind: FrameKind,
}

/// Encodes values into the Variant wire form.
///
/// Primitives append directly. Containers are encoded in two phases:
/// children are first written into a scratch buffer rented from an
/// internal pool, and once the payload length is known the container
/// header, count, field IDs, offsets, and payload are emitted with the
/// minimum widths that fit. Patching offsets back into the output is not
/// possible because the header size itself depends on the payload length.
///
/// A builder is reusable across top-level encodings; the scratch pool is
/// retained so container encoding stops allocating once the buffers have
/// grown to the working-set size.
#[derive(Default)]
pub struct ValueBuilder {
    output: Vec<u8>,
    frames: Vec<Frame>,
    pool: Vec<Vec<u8>>,
}

impl ValueBuilder {
    pub fn new() -> ValueBuilder {
        ValueBuilder::default()
    }

    /// Encodes a whole value tree against a collected name table.
    ///
    /// `remap` is the provisional-to-sorted table produced by
    /// [`MetadataBuilder::build`]; every object field name in `value` must
    /// have been interned beforehand, which [`MetadataBuilder::collect`]
    /// guarantees.
    pub fn write(
        &mut self,
        value: &VariantValue,
        names: &MetadataBuilder,
        remap: &[u32],
    ) -> Result<Vec<u8>> {
        self.output.clear();
        self.frames.clear();
        self.write_value(value, names, remap)?;
        self.finish()
    }

    fn write_value(
        &mut self,
        value: &VariantValue,
        names: &MetadataBuilder,
        remap: &[u32],
    ) -> Result<()> {
        match value {
            VariantValue::Null => self.append_null(),
            VariantValue::Boolean(v) => self.append_boolean(*v),
            VariantValue::Int8(v) => self.append_int8(*v),
            VariantValue::Int16(v) => self.append_int16(*v),
            VariantValue::Int32(v) => self.append_int32(*v),
            VariantValue::Int64(v) => self.append_int64(*v),
            VariantValue::Float(v) => self.append_float(v.into_inner()),
            VariantValue::Double(v) => self.append_double(v.into_inner()),
            VariantValue::Decimal4(v) => self.append_decimal4(*v)?,
            VariantValue::Decimal8(v) => self.append_decimal8(*v)?,
            VariantValue::Decimal16(v) => self.append_decimal16(*v),
            VariantValue::Decimal16Wide(v) => self.append_decimal16_wide(*v),
            VariantValue::Date(v) => self.append_date(*v),
            VariantValue::Timestamp(v) => self.append_timestamp_micros(*v),
            VariantValue::TimestampNtz(v) => self.append_timestamp_ntz_micros(*v),
            VariantValue::TimeNtz(v) => self.append_time_micros(*v),
            VariantValue::TimestampTzNanos(v) => self.append_timestamp_tz_nanos(*v),
            VariantValue::TimestampNtzNanos(v) => self.append_timestamp_ntz_nanos(*v),
            VariantValue::Binary(v) => self.append_binary(v)?,
            VariantValue::String(v) => self.append_string(v)?,
            VariantValue::Uuid(v) => self.append_uuid(*v),
            VariantValue::Object(object) => {
                self.begin_object();
                for (name, child) in object.iter() {
                    let provisional = names.id_of(name).ok_or_else(|| {
                        Error::Message(format!("field name `{}` was not collected", name))
                    })?;
                    self.object_key(remap[provisional as usize])?;
                    self.write_value(child, names, remap)?;
                }
                self.end_object()?;
            }
            VariantValue::Array(elements) => {
                self.begin_array();
                for child in elements {
                    self.write_value(child, names, remap)?;
                }
                self.end_array()?;
            }
        }
        Ok(())
    }

    /// Takes the finished top-level encoding out of the builder.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if !self.frames.is_empty() {
            return Err(Error::BuilderMisuse("a container is still open"));
        }
        Ok(std::mem::take(&mut self.output))
    }

    /// The buffer the next value lands in: the innermost open container's
    /// scratch buffer, or the output itself at top level.
    fn target(&mut self) -> &mut Vec<u8> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.buffer,
            None => &mut self.output,
        }
    }

    /// Records an element boundary when the enclosing container is an
    /// array; object children are delimited by [`ValueBuilder::object_key`].
    fn mark_element(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if let FrameKind::Array { starts } = &mut frame.kind {
                starts.push(frame.buffer.len());
            }
        }
    }

    pub fn append_null(&mut self) {
        self.mark_element();
        self.target().push(primitive_header(PrimitiveTag::Null));
    }

    pub fn append_boolean(&mut self, value: bool) {
        self.mark_element();
        let tag = if value { PrimitiveTag::BooleanTrue } else { PrimitiveTag::BooleanFalse };
        self.target().push(primitive_header(tag));
    }

    pub fn append_int8(&mut self, value: i8) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Int8));
        target.push(value as u8);
    }

    pub fn append_int16(&mut self, value: i16) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Int16));
        target.extend_from_slice(&value.to_le_bytes());
    }

    pub fn append_int32(&mut self, value: i32) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Int32));
        target.extend_from_slice(&value.to_le_bytes());
    }

    pub fn append_int64(&mut self, value: i64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Int64));
        target.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a 64-bit integer using the narrowest width that fits it.
    pub fn append_integer(&mut self, value: i64) {
        if let Ok(value) = i8::try_from(value) {
            self.append_int8(value);
        } else if let Ok(value) = i16::try_from(value) {
            self.append_int16(value);
        } else if let Ok(value) = i32::try_from(value) {
            self.append_int32(value);
        } else {
            self.append_int64(value);
        }
    }

    pub fn append_float(&mut self, value: f32) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Float));
        target.extend_from_slice(&value.to_le_bytes());
    }

    pub fn append_double(&mut self, value: f64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Double));
        target.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a 4-byte decimal; the unscaled value must fit 32 bits.
    pub fn append_decimal4(&mut self, value: Decimal) -> Result<()> {
        let unscaled = i32::try_from(value.unscaled()).map_err(|_| Error::DecimalOverflow)?;
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Decimal4));
        target.push(value.scale());
        target.extend_from_slice(&unscaled.to_le_bytes());
        Ok(())
    }

    /// Appends an 8-byte decimal; the unscaled value must fit 64 bits.
    pub fn append_decimal8(&mut self, value: Decimal) -> Result<()> {
        let unscaled = i64::try_from(value.unscaled()).map_err(|_| Error::DecimalOverflow)?;
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Decimal8));
        target.push(value.scale());
        target.extend_from_slice(&unscaled.to_le_bytes());
        Ok(())
    }

    pub fn append_decimal16(&mut self, value: Decimal) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Decimal16));
        target.push(value.scale());
        target.extend_from_slice(&value.unscaled().to_le_bytes());
    }

    pub fn append_decimal16_wide(&mut self, value: WideDecimal) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Decimal16));
        target.push(value.scale());
        target.extend_from_slice(&value.to_le_bytes());
    }

    pub fn append_date(&mut self, days: i32) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Date));
        target.extend_from_slice(&days.to_le_bytes());
    }

    pub fn append_timestamp_micros(&mut self, micros: i64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Timestamp));
        target.extend_from_slice(&micros.to_le_bytes());
    }

    pub fn append_timestamp_ntz_micros(&mut self, micros: i64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::TimestampNtz));
        target.extend_from_slice(&micros.to_le_bytes());
    }

    pub fn append_time_micros(&mut self, micros: i64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::TimeNtz));
        target.extend_from_slice(&micros.to_le_bytes());
    }

    pub fn append_timestamp_tz_nanos(&mut self, nanos: i64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::TimestampTzNanos));
        target.extend_from_slice(&nanos.to_le_bytes());
    }

    pub fn append_timestamp_ntz_nanos(&mut self, nanos: i64) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::TimestampNtzNanos));
        target.extend_from_slice(&nanos.to_le_bytes());
    }

    pub fn append_binary(&mut self, value: &[u8]) -> Result<()> {
        let length = u32::try_from(value.len()).map_err(|_| Error::MalformedEncoding)?;
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Binary));
        target.extend_from_slice(&length.to_le_bytes());
        target.extend_from_slice(value);
        Ok(())
    }

    /// Appends a string, choosing the short form whenever the byte length
    /// fits its 6-bit header.
    pub fn append_string(&mut self, value: &str) -> Result<()> {
        self.mark_element();
        if value.len() <= MAX_SHORT_STRING_LEN {
            let target = self.target();
            target.push(short_string_header(value.len()));
            target.extend_from_slice(value.as_bytes());
        } else {
            let length = u32::try_from(value.len()).map_err(|_| Error::MalformedEncoding)?;
            let target = self.target();
            target.push(primitive_header(PrimitiveTag::String));
            target.extend_from_slice(&length.to_le_bytes());
            target.extend_from_slice(value.as_bytes());
        }
        Ok(())
    }

    pub fn append_uuid(&mut self, value: uuid::Uuid) {
        self.mark_element();
        let target = self.target();
        target.push(primitive_header(PrimitiveTag::Uuid));
        target.extend_from_slice(value.as_bytes());
    }

    /// Opens an object. Each field is introduced by
    /// [`ValueBuilder::object_key`] followed by exactly one appended value.
    pub fn begin_object(&mut self) {
        self.mark_element();
        let buffer = self.rent();
        self.frames.push(Frame {
            buffer,
            kind: FrameKind::Object { fields: Vec::new() },
        });
    }

    /// Introduces the next object field by its sorted dictionary ID.
    ///
    /// Fields may be written in any order; they are sorted by ID when the
    /// object is closed. Repeating an ID is reported when the object is
    /// closed.
    pub fn object_key(&mut self, sorted_id: u32) -> Result<()> {
        let frame = match self.frames.last_mut() {
            None => return Err(Error::BuilderMisuse("object_key outside a container")),
            Some(frame) => frame,
        };
        match &mut frame.kind {
            FrameKind::Object { fields } => {
                if fields.last().map_or(false, |&(_, start)| start == frame.buffer.len()) {
                    return Err(Error::BuilderMisuse("the previous field has no value"));
                }
                fields.push((sorted_id, frame.buffer.len()));
                Ok(())
            }
            FrameKind::Array { .. } => Err(Error::BuilderMisuse("object_key inside an array")),
        }
    }

    /// Closes the innermost object and writes it to its parent.
    pub fn end_object(&mut self) -> Result<()> {
        let frame = match self.frames.pop() {
            None => return Err(Error::BuilderMisuse("end_object without begin_object")),
            Some(frame) => frame,
        };
        let fields = match frame.kind {
            FrameKind::Object { fields } => fields,
            kind @ FrameKind::Array { .. } => {
                self.frames.push(Frame { buffer: frame.buffer, kind });
                return Err(Error::BuilderMisuse("end_object closes an array"));
            }
        };
        let buffer = frame.buffer;

        let count = fields.len();
        let total = buffer.len();

        // Stable sort keeps input order for equal IDs so the duplicate
        // check below sees them adjacent.
        let mut order: Vec<usize> = (0 .. count).collect();
        order.sort_by_key(|&index| fields[index].0);
        if order.windows(2).any(|pair| fields[pair[0]].0 == fields[pair[1]].0) {
            self.recycle(buffer);
            return Err(Error::BuilderMisuse("duplicate field ids in object"));
        }

        let max_id = fields.iter().map(|&(id, _)| id).max().unwrap_or(0);
        let field_id_size = min_width(max_id as usize);
        let offset_size = min_width(std::cmp::max(1, total));
        let is_large = count > MAX_SMALL_CONTAINER_LEN;

        let end_of = |index: usize| -> usize {
            if index + 1 < count { fields[index + 1].1 } else { total }
        };

        let output = self.target();
        output.push(format::object_header(field_id_size, offset_size, is_large));
        push_uint(output, count, if is_large { 4 } else { 1 });
        for &index in &order {
            push_uint(output, fields[index].0 as usize, field_id_size);
        }
        let mut offset = 0;
        for &index in &order {
            push_uint(output, offset, offset_size);
            offset += end_of(index) - fields[index].1;
        }
        push_uint(output, offset, offset_size);
        for &index in &order {
            output.extend_from_slice(&buffer[fields[index].1 .. end_of(index)]);
        }

        self.recycle(buffer);
        Ok(())
    }

    /// Opens an array; appended values become its elements in order.
    pub fn begin_array(&mut self) {
        self.mark_element();
        let buffer = self.rent();
        self.frames.push(Frame {
            buffer,
            kind: FrameKind::Array { starts: Vec::new() },
        });
    }

    /// Closes the innermost array and writes it to its parent.
    pub fn end_array(&mut self) -> Result<()> {
        let frame = match self.frames.pop() {
            None => return Err(Error::BuilderMisuse("end_array without begin_array")),
            Some(frame) => frame,
        };
        let starts = match frame.kind {
            FrameKind::Array { starts } => starts,
            kind @ FrameKind::Object { .. } => {
                self.frames.push(Frame { buffer: frame.buffer, kind });
                return Err(Error::BuilderMisuse("end_array closes an object"));
            }
        };
        let buffer = frame.buffer;

        let count = starts.len();
        let total = buffer.len();
        let offset_size = min_width(std::cmp::max(1, total));
        let is_large = count > MAX_SMALL_CONTAINER_LEN;

        let output = self.target();
        output.push(format::array_header(offset_size, is_large));
        push_uint(output, count, if is_large { 4 } else { 1 });
        for &start in &starts {
            push_uint(output, start, offset_size);
        }
        push_uint(output, total, offset_size);
        output.extend_from_slice(&buffer);

        self.recycle(buffer);
        Ok(())
    }

    fn rent(&mut self) -> Vec<u8> {
        self.pool.pop().unwrap_or_default()
    }

    fn recycle(&mut self, mut buffer: Vec<u8>) {
        buffer.clear();
        self.pool.push(buffer);
    }
}

#[cfg(test)]
mod tests {
    use crate::build::encode;
    use crate::read::{ArrayReader, MetadataReader, ObjectReader, ValueReader};
    use crate::value::VariantObject;

    use super::*;

    #[test]
    fn test_array_of_int_string_null() {
        let mut builder = ValueBuilder::new();
        builder.begin_array();
        builder.append_int8(42);
        builder.append_string("hi").unwrap();
        builder.append_null();
        builder.end_array().unwrap();
        assert_eq!(
            builder.finish().unwrap(),
            &[0x03, 0x03, 0x00, 0x02, 0x05, 0x06, 0x0C, 0x2A, 0x09, 0x68, 0x69, 0x00],
        );
    }

    #[test]
    fn test_object_age_name_bytes() {
        // {"age": 30, "name": "Bob"} against the sorted dictionary
        // {"age" -> 0, "name" -> 1}.
        let mut builder = ValueBuilder::new();
        builder.begin_object();
        builder.object_key(0).unwrap();
        builder.append_int8(30);
        builder.object_key(1).unwrap();
        builder.append_string("Bob").unwrap();
        builder.end_object().unwrap();
        assert_eq!(
            builder.finish().unwrap(),
            &[0x02, 0x02, 0x00, 0x01, 0x00, 0x02, 0x06, 0x0C, 0x1E, 0x0D, 0x42, 0x6F, 0x62],
        );
    }

    #[test]
    fn test_object_fields_sorted_by_id() {
        // Fields written out of order come out sorted, with their payloads
        // physically reordered to match.
        let mut builder = ValueBuilder::new();
        builder.begin_object();
        builder.object_key(1).unwrap();
        builder.append_string("Bob").unwrap();
        builder.object_key(0).unwrap();
        builder.append_int8(30);
        builder.end_object().unwrap();
        assert_eq!(
            builder.finish().unwrap(),
            &[0x02, 0x02, 0x00, 0x01, 0x00, 0x02, 0x06, 0x0C, 0x1E, 0x0D, 0x42, 0x6F, 0x62],
        );
    }

    #[test]
    fn test_empty_containers() {
        let mut builder = ValueBuilder::new();
        builder.begin_object();
        builder.end_object().unwrap();
        assert_eq!(builder.finish().unwrap(), &[0x02, 0x00, 0x00]);

        builder.begin_array();
        builder.end_array().unwrap();
        assert_eq!(builder.finish().unwrap(), &[0x03, 0x00, 0x00]);
    }

    #[test]
    fn test_large_object_count() {
        let mut names = MetadataBuilder::new();
        let mut object = VariantObject::new();
        for index in 0 .. 256 {
            object.insert(format!("f{:03}", index), VariantValue::Null).unwrap();
        }
        let value = VariantValue::Object(object);
        names.collect(&value);
        let (metadata, remap) = names.build();

        let mut builder = ValueBuilder::new();
        let bytes = builder.write(&value, &names, &remap).unwrap();

        let metadata = MetadataReader::new(&metadata).unwrap();
        let object = ObjectReader::new(metadata, &bytes).unwrap();
        assert_eq!(object.len(), 256);
        // Field ids must come out strictly ascending.
        for index in 1 .. object.len() {
            assert!(object.field_id(index - 1).unwrap() < object.field_id(index).unwrap());
        }
        assert!(object.try_get_field("f255").unwrap().is_some());
    }

    #[test]
    fn test_string_form_threshold() {
        let mut builder = ValueBuilder::new();
        let at_limit = "x".repeat(63);
        builder.append_string(&at_limit).unwrap();
        let bytes = builder.finish().unwrap();
        assert_eq!(bytes[0], 0b1111_1101);
        assert_eq!(bytes.len(), 64);

        let over_limit = "x".repeat(64);
        builder.append_string(&over_limit).unwrap();
        let bytes = builder.finish().unwrap();
        assert_eq!(bytes[0], 0x40);
        assert_eq!(&bytes[1 .. 5], &64u32.to_le_bytes());
        assert_eq!(bytes.len(), 69);
    }

    #[test]
    fn test_narrowest_integer_selection() {
        let mut builder = ValueBuilder::new();
        builder.begin_array();
        builder.append_integer(0);
        builder.append_integer(-128);
        builder.append_integer(128);
        builder.append_integer(40_000);
        builder.append_integer(-3_000_000_000);
        builder.end_array().unwrap();
        let bytes = builder.finish().unwrap();

        let metadata_bytes = [0x11, 0x00, 0x00];
        let metadata = MetadataReader::new(&metadata_bytes).unwrap();
        let array = ArrayReader::new(metadata, &bytes).unwrap();
        assert_eq!(array.get_element(0).unwrap().get_int8(), Ok(0));
        assert_eq!(array.get_element(1).unwrap().get_int8(), Ok(-128));
        assert_eq!(array.get_element(2).unwrap().get_int16(), Ok(128));
        assert_eq!(array.get_element(3).unwrap().get_int32(), Ok(40_000));
        assert_eq!(array.get_element(4).unwrap().get_int64(), Ok(-3_000_000_000));
    }

    #[test]
    fn test_out_of_sequence_calls_rejected() {
        let mut builder = ValueBuilder::new();
        assert_eq!(
            builder.end_object(),
            Err(Error::BuilderMisuse("end_object without begin_object")),
        );
        assert_eq!(
            builder.end_array(),
            Err(Error::BuilderMisuse("end_array without begin_array")),
        );
        assert_eq!(
            builder.object_key(0),
            Err(Error::BuilderMisuse("object_key outside a container")),
        );

        builder.begin_array();
        assert_eq!(
            builder.object_key(0),
            Err(Error::BuilderMisuse("object_key inside an array")),
        );
        assert_eq!(
            builder.end_object(),
            Err(Error::BuilderMisuse("end_object closes an array")),
        );
        assert_eq!(
            builder.finish(),
            Err(Error::BuilderMisuse("a container is still open")),
        );
        // The failed closes left the array open; it still finishes cleanly.
        builder.append_null();
        builder.end_array().unwrap();
        assert_eq!(builder.finish().unwrap(), &[0x03, 0x01, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_duplicate_field_ids_rejected() {
        let mut builder = ValueBuilder::new();
        builder.begin_object();
        builder.object_key(3).unwrap();
        builder.append_int8(1);
        builder.object_key(3).unwrap();
        builder.append_int8(2);
        assert_eq!(
            builder.end_object(),
            Err(Error::BuilderMisuse("duplicate field ids in object")),
        );
    }

    #[test]
    fn test_key_without_value_rejected() {
        let mut builder = ValueBuilder::new();
        builder.begin_object();
        builder.object_key(0).unwrap();
        assert_eq!(
            builder.object_key(1),
            Err(Error::BuilderMisuse("the previous field has no value")),
        );
    }

    #[test]
    fn test_decimal_width_mismatch_rejected() {
        let oversized = Decimal::new(i32::MAX as i128 + 1, 0).unwrap();
        let mut builder = ValueBuilder::new();
        assert_eq!(builder.append_decimal4(oversized), Err(Error::DecimalOverflow));
    }

    #[test]
    fn test_builder_reuse_produces_identical_bytes() {
        let mut object = VariantObject::new();
        object.insert("k", VariantValue::Array(vec![
            VariantValue::Int8(1),
            VariantValue::from("two"),
        ])).unwrap();
        let value = VariantValue::Object(object);

        let mut names = MetadataBuilder::new();
        names.collect(&value);
        let (_, remap) = names.build();

        let mut builder = ValueBuilder::new();
        let first = builder.write(&value, &names, &remap).unwrap();
        let second = builder.write(&value, &names, &remap).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_nested_round_trip_bytes() {
        let mut inner = VariantObject::new();
        inner.insert("name", VariantValue::from("Alice")).unwrap();
        inner.insert("scores", VariantValue::Array(vec![
            VariantValue::Int8(95),
            VariantValue::Int8(87),
        ])).unwrap();
        let mut outer = VariantObject::new();
        outer.insert("users", VariantValue::Array(vec![
            VariantValue::Object(inner),
        ])).unwrap();
        let value = VariantValue::Object(outer);

        let (metadata, bytes) = encode(&value).unwrap();
        let metadata = MetadataReader::new(&metadata).unwrap();
        let reader = ValueReader::new(metadata, &bytes).unwrap();

        let users = reader.object().unwrap().try_get_field("users").unwrap().unwrap();
        let first = users.array().unwrap().get_element(0).unwrap();
        let first = first.object().unwrap();
        assert_eq!(
            first.try_get_field("name").unwrap().unwrap().get_string(),
            Ok("Alice"),
        );
        let scores = first.try_get_field("scores").unwrap().unwrap();
        assert_eq!(scores.array().unwrap().len(), 2);
    }
}
