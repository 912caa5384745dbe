//
// Copyright 2024 Variant Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use nom::{
    IResult,
    bytes::complete::take,
    combinator::map_res,
};

use crate::error::Error;
use crate::format::unpack_metadata_header;
use crate::read::parser::utils::le_usize_n;

/// Header fields of a metadata blob.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Header {
    /// Byte width of the dictionary size and every offset, 1 to 4.
    pub offset_size: usize,
    /// Whether the dictionary strings are in ascending byte order.
    pub sorted_strings: bool,
    /// Number of strings in the dictionary.
    pub dictionary_size: usize,
}

/// Parses the metadata header byte and the dictionary size which follows it.
///
/// Fails on any version other than 1 and on a set reserved bit. The offset
/// table is not consumed here; readers index into it in place.
pub fn header(input: &[u8]) -> IResult<&[u8], Header> {
    let (input, (offset_size, sorted_strings)) = map_res(
        take(1usize),
        |b: &[u8]| -> Result<(usize, bool), Error> {
            unpack_metadata_header(b[0])
        }
    )(input)?;
    let (input, dictionary_size) = le_usize_n(offset_size)(input)?;
    Ok((input, Header { offset_size, sorted_strings, dictionary_size }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_unsorted_one_byte_offsets() {
        let (rest, parsed) = header(&[0x01, 0x02, 0xAA]).unwrap();
        assert_eq!(rest, &[0xAA]);
        assert_eq!(parsed, Header {
            offset_size: 1,
            sorted_strings: false,
            dictionary_size: 2,
        });
    }

    #[test]
    fn test_header_sorted_two_byte_offsets() {
        let (rest, parsed) = header(&[0x51, 0x10, 0x00]).unwrap();
        assert_eq!(rest.len(), 0);
        assert_eq!(parsed, Header {
            offset_size: 2,
            sorted_strings: true,
            dictionary_size: 16,
        });
    }

    #[test]
    fn test_header_bad_version() {
        assert!(header(&[0x02, 0x00]).is_err());
        assert!(header(&[0x00, 0x00]).is_err());
    }

    #[test]
    fn test_header_reserved_bit() {
        assert!(header(&[0x21, 0x00]).is_err());
    }

    #[test]
    fn test_header_truncated_size() {
        assert!(header(&[0x51]).is_err());
        assert!(header(&[0x51, 0x10]).is_err());
    }
}
