//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Conversion between JSON text and the Variant encoding, in both
//! directions, without an intermediate document model.

mod encode;
mod write;

pub use encode::{encode_json, parse_json};
pub use write::to_json;
