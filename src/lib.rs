//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! A native Rust encoder and decoder of the Apache Parquet/Arrow Variant
//! binary format.
//!
//! A Variant is a pair of byte blobs: a *metadata* dictionary of field-name
//! strings, typically shared across many values, and a self-describing
//! *value* encoding which references the dictionary by small integer IDs.
//!
//! ```
//! use variant::{encode, parse_json, to_json};
//! use variant::{MetadataReader, ValueReader};
//!
//! # fn main() -> variant::Result<()> {
//! let tree = parse_json(br#"{"age": 30, "name": "Bob"}"#)?;
//! let (metadata, value) = encode(&tree)?;
//!
//! let metadata = MetadataReader::new(&metadata)?;
//! let reader = ValueReader::new(metadata, &value)?;
//! let object = reader.object()?;
//! assert_eq!(object.try_get_field("age")?.unwrap().get_int8()?, 30);
//! assert_eq!(String::from_utf8(to_json(&reader)?).unwrap(),
//!            r#"{"age":30,"name":"Bob"}"#);
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod de;
pub mod format;
pub mod json;
pub mod read;
pub mod value;

mod error;

pub use error::{Error, Result};

pub use build::{encode, MetadataBuilder, ValueBuilder};
pub use de::{from_slices, Deserializer};
pub use json::{encode_json, parse_json, to_json};
pub use read::{ArrayReader, MetadataReader, ObjectReader, ValueReader};
pub use value::{materialize, Decimal, VariantObject, VariantValue, WideDecimal};
