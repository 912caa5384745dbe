//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Builders producing encoded metadata and value blobs.

mod metadata;
mod value;

pub use metadata::MetadataBuilder;
pub use value::ValueBuilder;

use crate::error::Result;
use crate::value::VariantValue;

/// Encodes a value tree into its `(metadata, value)` blob pair.
///
/// The metadata dictionary is always emitted sorted, so the same tree
/// always produces the same bytes.
pub fn encode(value: &VariantValue) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut names = MetadataBuilder::new();
    names.collect(value);
    let (metadata, remap) = names.build();
    let mut builder = ValueBuilder::new();
    let value_bytes = builder.write(value, &names, &remap)?;
    Ok((metadata, value_bytes))
}
