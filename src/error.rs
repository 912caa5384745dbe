//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt::{self, Display};

use serde::de;

pub type Result<T> = std::result::Result<T, Error>;

/// Variant encoding and decoding error.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Constructed from serde deserialization errors.
    Message(String),
    /// A buffer was too short, an offset pointed out of range, a width was
    /// illegal, or a reserved header bit was set.
    MalformedEncoding,
    /// The metadata version is not the single version supported by this library.
    UnsupportedVersion(u8),
    /// A primitive header named a type ID with no assignment.
    UnsupportedPrimitive(u8),
    /// An accessor was invoked on a value of a different type.
    TypeMismatch,
    /// A 96-bit view was requested of a decimal whose magnitude is larger.
    DecimalOverflow,
    /// The JSON input could not be parsed or a structure was unterminated.
    MalformedJson(String),
    /// NaN and infinities have no JSON representation.
    UnrepresentableFloat,
    /// A dictionary string is not valid UTF-8.
    InvalidUtf8,
    /// An object may not contain the same field name twice.
    DuplicateField(String),
    /// A builder operation was invoked out of sequence.
    BuilderMisuse(&'static str),
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) =>
                formatter.write_str(msg),
            Error::MalformedEncoding =>
                formatter.write_str("malformed variant encoding"),
            Error::UnsupportedVersion(version) =>
                write!(formatter, "unsupported metadata version {}", version),
            Error::UnsupportedPrimitive(type_id) =>
                write!(formatter, "unassigned primitive type id {}", type_id),
            Error::TypeMismatch =>
                formatter.write_str("value does not have the requested type"),
            Error::DecimalOverflow =>
                formatter.write_str("decimal magnitude exceeds 96 bits"),
            Error::MalformedJson(msg) =>
                write!(formatter, "malformed json: {}", msg),
            Error::UnrepresentableFloat =>
                formatter.write_str("NaN and infinities cannot be represented in JSON"),
            Error::InvalidUtf8 =>
                formatter.write_str("dictionary string is not valid UTF-8"),
            Error::DuplicateField(name) =>
                write!(formatter, "duplicate object field name `{}`", name),
            Error::BuilderMisuse(detail) =>
                write!(formatter, "builder misuse: {}", detail),
        }
    }
}

impl std::error::Error for Error {}
