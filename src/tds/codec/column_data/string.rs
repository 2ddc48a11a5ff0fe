use std::borrow::Cow;

use byteorder::{ByteOrder, LittleEndian};

use crate::{error::Error, tds::Collation};

/// Decodes single-byte character data in the code page of its collation.
///
/// Without a collation the data is taken as Windows-1252. ASCII and valid
/// UTF-8 in a `_UTF8` collation come back borrowed.
pub fn decode_char<'a>(buf: &'a [u8], collation: Option<&Collation>) -> crate::Result<Cow<'a, str>> {
    let encoder = match collation {
        Some(collation) => collation.encoding()?,
        None => encoding_rs::WINDOWS_1252,
    };

    encoder
        .decode_without_bom_handling_and_without_replacement(buf)
        .ok_or_else(|| Error::MalformedText(format!("invalid {} sequence", encoder.name()).into()))
}

/// Decodes UTF-16LE character data.
pub fn decode_nchar(buf: &[u8]) -> crate::Result<String> {
    if buf.len() % 2 != 0 {
        return Err(Error::MalformedText(
            format!("UTF-16: odd length of {}", buf.len()).into(),
        ));
    }

    let buf: Vec<_> = buf.chunks(2).map(LittleEndian::read_u16).collect();
    Ok(String::from_utf16(&buf)?)
}
