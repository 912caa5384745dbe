//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Streaming encoding of JSON text into the Variant form.
//!
//! The encoder runs two passes over the same input through serde_json's
//! streaming deserializer, driven by `DeserializeSeed` visitors rather
//! than a document model. The first pass collects object keys into a
//! [`MetadataBuilder`]; the second writes value bytes against the sorted
//! dictionary. JSON numbers take the narrowest signed integer width that
//! fits, or a double when they are not 64-bit integers at all.

use std::fmt;

use serde::de::{self, DeserializeSeed, Visitor};

use crate::build::{MetadataBuilder, ValueBuilder};
use crate::error::{Error, Result};
use crate::value::{VariantObject, VariantValue};

/// Encodes UTF-8 JSON text into its `(metadata, value)` blob pair.
pub fn encode_json(json: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut names = MetadataBuilder::new();
    run_pass(json, CollectFieldNames { names: &mut names })?;
    let (metadata, remap) = names.build();

    let mut builder = ValueBuilder::new();
    run_pass(json, WriteJsonValue {
        builder: &mut builder,
        names: &names,
        remap: &remap,
    })?;
    Ok((metadata, builder.finish()?))
}

/// Parses UTF-8 JSON text into a value tree under the same number policy
/// as [`encode_json`], so parsing and encode-then-materialize agree.
pub fn parse_json(json: &[u8]) -> Result<VariantValue> {
    run_pass(json, BuildJsonValue)
}

/// Runs one streaming pass, mapping every serde_json failure to
/// [`Error::MalformedJson`] and insisting the input holds a single value.
fn run_pass<'de, S>(json: &'de [u8], seed: S) -> Result<S::Value>
where
    S: DeserializeSeed<'de>,
{
    let mut deserializer = serde_json::Deserializer::from_slice(json);
    let value = seed
        .deserialize(&mut deserializer)
        .map_err(|e| Error::MalformedJson(e.to_string()))?;
    deserializer
        .end()
        .map_err(|e| Error::MalformedJson(e.to_string()))?;
    Ok(value)
}

/// Picks the narrowest integer kind for a 64-bit value.
fn narrowest_integer(value: i64) -> VariantValue {
    if let Ok(value) = i8::try_from(value) {
        VariantValue::Int8(value)
    } else if let Ok(value) = i16::try_from(value) {
        VariantValue::Int16(value)
    } else if let Ok(value) = i32::try_from(value) {
        VariantValue::Int32(value)
    } else {
        VariantValue::Int64(value)
    }
}

/// First pass: intern every object key, in document order.
struct CollectFieldNames<'a> {
    names: &'a mut MetadataBuilder,
}

impl<'de, 'a> DeserializeSeed<'de> for CollectFieldNames<'a> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for CollectFieldNames<'a> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, _: bool) -> std::result::Result<(), E> {
        Ok(())
    }

    fn visit_i64<E>(self, _: i64) -> std::result::Result<(), E> {
        Ok(())
    }

    fn visit_u64<E>(self, _: u64) -> std::result::Result<(), E> {
        Ok(())
    }

    fn visit_f64<E>(self, _: f64) -> std::result::Result<(), E> {
        Ok(())
    }

    fn visit_str<E>(self, _: &str) -> std::result::Result<(), E> {
        Ok(())
    }

    fn visit_unit<E>(self) -> std::result::Result<(), E> {
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let names = self.names;
        while seq
            .next_element_seed(CollectFieldNames { names: &mut *names })?
            .is_some()
        {}
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let names = self.names;
        while let Some(key) = map.next_key::<String>()? {
            names.add(&key);
            map.next_value_seed(CollectFieldNames { names: &mut *names })?;
        }
        Ok(())
    }
}

/// Second pass: emit value bytes against the sorted dictionary.
struct WriteJsonValue<'a> {
    builder: &'a mut ValueBuilder,
    names: &'a MetadataBuilder,
    remap: &'a [u32],
}

impl<'de, 'a> DeserializeSeed<'de> for WriteJsonValue<'a> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for WriteJsonValue<'a> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> std::result::Result<(), E> {
        self.builder.append_boolean(value);
        Ok(())
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<(), E> {
        self.builder.append_integer(value);
        Ok(())
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<(), E> {
        // Beyond the signed 64-bit range the value is no longer an
        // integer for this format; fall back to a double.
        match i64::try_from(value) {
            Ok(value) => self.builder.append_integer(value),
            Err(_) => self.builder.append_double(value as f64),
        }
        Ok(())
    }

    fn visit_f64<E>(self, value: f64) -> std::result::Result<(), E> {
        self.builder.append_double(value);
        Ok(())
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<(), E>
    where
        E: de::Error,
    {
        self.builder.append_string(value).map_err(de::Error::custom)
    }

    fn visit_unit<E>(self) -> std::result::Result<(), E> {
        self.builder.append_null();
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        self.builder.begin_array();
        while seq
            .next_element_seed(WriteJsonValue {
                builder: &mut *self.builder,
                names: self.names,
                remap: self.remap,
            })?
            .is_some()
        {}
        self.builder.end_array().map_err(de::Error::custom)?;
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: de::MapAccess<'de>,
    {
        self.builder.begin_object();
        let mut seen: Vec<u32> = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            let provisional = self.names.id_of(&key).ok_or_else(|| {
                de::Error::custom(format!("key `{}` missing from the first pass", key))
            })?;
            let sorted = self.remap[provisional as usize];
            if seen.contains(&sorted) {
                return Err(de::Error::custom(Error::DuplicateField(key)));
            }
            seen.push(sorted);
            self.builder.object_key(sorted).map_err(de::Error::custom)?;
            map.next_value_seed(WriteJsonValue {
                builder: &mut *self.builder,
                names: self.names,
                remap: self.remap,
            })?;
        }
        self.builder.end_object().map_err(de::Error::custom)?;
        Ok(())
    }
}

/// One-pass construction of a value tree from JSON text.
struct BuildJsonValue;

impl<'de> DeserializeSeed<'de> for BuildJsonValue {
    type Value = VariantValue;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<VariantValue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for BuildJsonValue {
    type Value = VariantValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, value: bool) -> std::result::Result<VariantValue, E> {
        Ok(VariantValue::Boolean(value))
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<VariantValue, E> {
        Ok(narrowest_integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<VariantValue, E> {
        match i64::try_from(value) {
            Ok(value) => Ok(narrowest_integer(value)),
            Err(_) => Ok(VariantValue::from(value as f64)),
        }
    }

    fn visit_f64<E>(self, value: f64) -> std::result::Result<VariantValue, E> {
        Ok(VariantValue::from(value))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<VariantValue, E> {
        Ok(VariantValue::from(value))
    }

    fn visit_unit<E>(self) -> std::result::Result<VariantValue, E> {
        Ok(VariantValue::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<VariantValue, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut elements = Vec::new();
        while let Some(element) = seq.next_element_seed(BuildJsonValue)? {
            elements.push(element);
        }
        Ok(VariantValue::Array(elements))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<VariantValue, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut object = VariantObject::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(BuildJsonValue)?;
            object.insert(key, value).map_err(de::Error::custom)?;
        }
        Ok(VariantValue::Object(object))
    }
}
