//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use indexmap::IndexMap;

use crate::format::{metadata_header, min_width, push_uint};
use crate::value::VariantValue;

/// Collects unique field names and emits the sorted metadata blob.
///
/// Names receive provisional IDs in insertion order while collecting;
/// [`MetadataBuilder::build`] sorts them into dictionary order and returns
/// the remap table carrying each provisional ID to its sorted position.
#[derive(Clone, Debug, Default)]
pub struct MetadataBuilder {
    names: IndexMap<String, ()>,
}

impl MetadataBuilder {
    pub fn new() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    /// Interns a field name, returning its provisional ID.
    pub fn add(&mut self, name: &str) -> u32 {
        match self.names.get_index_of(name) {
            Some(index) => index as u32,
            None => self.names.insert_full(name.to_string(), ()).0 as u32,
        }
    }

    /// The provisional ID previously assigned to `name`, if any.
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.names.get_index_of(name).map(|index| index as u32)
    }

    /// The number of interned names.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Walks a value tree and interns every object field name in it.
    pub fn collect(&mut self, value: &VariantValue) {
        match value {
            VariantValue::Object(object) => {
                for (name, child) in object.iter() {
                    self.add(name);
                    self.collect(child);
                }
            }
            VariantValue::Array(elements) => {
                for child in elements {
                    self.collect(child);
                }
            }
            _ => {}
        }
    }

    /// Emits the metadata blob with its strings in ascending byte order.
    ///
    /// Returns the blob and the remap table: `remap[provisional] = sorted`.
    /// The offset width is the minimum that fits both the total string
    /// bytes and the dictionary size.
    pub fn build(&self) -> (Vec<u8>, Vec<u32>) {
        let count = self.names.len();

        let mut order: Vec<usize> = (0 .. count).collect();
        order.sort_by(|&a, &b| self.name_at(a).cmp(self.name_at(b)));

        let mut remap = vec![0u32; count];
        for (sorted, &provisional) in order.iter().enumerate() {
            remap[provisional] = sorted as u32;
        }

        let total_bytes: usize = self.names.keys().map(|name| name.len()).sum();
        let offset_size = min_width(std::cmp::max(total_bytes, count));

        let mut output = Vec::with_capacity(1 + (count + 2) * offset_size + total_bytes);
        output.push(metadata_header(offset_size, true));
        push_uint(&mut output, count, offset_size);

        let mut offset = 0;
        for &index in &order {
            push_uint(&mut output, offset, offset_size);
            offset += self.name_at(index).len();
        }
        push_uint(&mut output, offset, offset_size);

        for &index in &order {
            output.extend_from_slice(self.name_at(index));
        }

        (output, remap)
    }

    fn name_at(&self, index: usize) -> &[u8] {
        self.names.get_index(index).map(|(name, _)| name.as_bytes()).unwrap_or(b"")
    }
}

#[cfg(test)]
mod tests {
    use crate::read::MetadataReader;

    use super::*;

    #[test]
    fn test_interning_is_idempotent() {
        let mut builder = MetadataBuilder::new();
        assert_eq!(builder.add("b"), 0);
        assert_eq!(builder.add("a"), 1);
        assert_eq!(builder.add("b"), 0);
        assert_eq!(builder.count(), 2);
        assert_eq!(builder.id_of("a"), Some(1));
        assert_eq!(builder.id_of("c"), None);
    }

    #[test]
    fn test_build_sorts_and_remaps() {
        let mut builder = MetadataBuilder::new();
        builder.add("name");
        builder.add("age");
        let (metadata, remap) = builder.build();

        // "age" sorts ahead of "name".
        assert_eq!(remap, vec![1, 0]);
        assert_eq!(
            metadata,
            &[0x11, 0x02, 0x00, 0x03, 0x07, 0x61, 0x67, 0x65, 0x6E, 0x61, 0x6D, 0x65],
        );

        let reader = MetadataReader::new(&metadata).unwrap();
        assert!(reader.is_sorted());
        assert_eq!(reader.get_string(0), Ok("age"));
        assert_eq!(reader.get_string(1), Ok("name"));
    }

    #[test]
    fn test_build_empty() {
        let (metadata, remap) = MetadataBuilder::new().build();
        assert_eq!(metadata, &[0x11, 0x00, 0x00]);
        assert!(remap.is_empty());

        let reader = MetadataReader::new(&metadata).unwrap();
        assert_eq!(reader.size(), 0);
        assert_eq!(reader.find(b"x"), None);
    }

    #[test]
    fn test_build_strict_byte_order() {
        let mut builder = MetadataBuilder::new();
        for name in ["zz", "a", "m", "ab", "z"] {
            builder.add(name);
        }
        let (metadata, _) = builder.build();
        let reader = MetadataReader::new(&metadata).unwrap();
        let mut previous: Option<Vec<u8>> = None;
        for index in 0 .. reader.size() {
            let entry = reader.get_bytes(index).unwrap().to_vec();
            if let Some(previous) = &previous {
                assert!(previous < &entry);
            }
            previous = Some(entry);
        }
    }

    #[test]
    fn test_wide_offsets_when_strings_grow() {
        let mut builder = MetadataBuilder::new();
        // Two 200-byte names force two-byte offsets.
        let first = "x".repeat(200);
        let second = "y".repeat(200);
        builder.add(&first);
        builder.add(&second);
        let (metadata, _) = builder.build();

        // offset_size - 1 == 1 in the upper header bits.
        assert_eq!(metadata[0], 0x51);
        let reader = MetadataReader::new(&metadata).unwrap();
        assert_eq!(reader.get_string(0), Ok(first.as_str()));
        assert_eq!(reader.get_string(1), Ok(second.as_str()));
    }

    #[test]
    fn test_collect_walks_nested_values() {
        use crate::value::VariantObject;

        let mut inner = VariantObject::new();
        inner.insert("deep", VariantValue::Null).unwrap();
        let mut outer = VariantObject::new();
        outer.insert("items", VariantValue::Array(vec![
            VariantValue::Object(inner),
            VariantValue::Int8(1),
        ])).unwrap();

        let mut builder = MetadataBuilder::new();
        builder.collect(&VariantValue::Object(outer));
        assert_eq!(builder.id_of("items"), Some(0));
        assert_eq!(builder.id_of("deep"), Some(1));
    }
}
