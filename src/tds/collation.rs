//! Collations of character columns and the code pages they imply.
//!
//! Only the codec part of a collation matters here: `varchar`, `char` and
//! `text` values are stored in the code page of their collation, which is
//! found either from the sort id (SQL collations) or from the locale id
//! (Windows collations). The mappings follow the tables of the Microsoft
//! JDBC driver, grouped by code page.
use encoding_rs::Encoding;
use std::fmt;

use crate::{error::Error, SqlReadBytes};

/// Set in the collation info for `_UTF8` collations (SQL Server 2019+).
const UTF8_FLAG: u32 = 0x0400_0000;

/// Collation of a character column, as sent in its type info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collation {
    /// LCID ColFlags Version
    info: u32,
    /// Sortid
    sort_id: u8,
}

impl Collation {
    /// Size of the collation block on the wire.
    pub const WIRE_SIZE: usize = 5;

    /// Construct a collation from its raw parts.
    pub fn new(info: u32, sort_id: u8) -> Self {
        Self { info, sort_id }
    }

    /// The locale id part of the collation info.
    pub fn lcid(&self) -> u16 {
        (self.info & 0xffff) as u16
    }

    /// The SQL collation sort id, zero for Windows collations.
    pub fn sort_id(&self) -> u8 {
        self.sort_id
    }

    /// The raw collation info word.
    pub fn info(&self) -> u32 {
        self.info
    }

    /// True for `_UTF8` collations.
    pub fn is_utf8(&self) -> bool {
        self.info & UTF8_FLAG != 0
    }

    /// The codec used for single-byte character data in this collation.
    pub fn encoding(&self) -> crate::Result<&'static Encoding> {
        let res = if self.is_utf8() {
            Some(encoding_rs::UTF_8)
        } else if self.sort_id == 0 {
            lcid_to_encoding(self.lcid())
        } else {
            sortid_to_encoding(self.sort_id)
        };

        res.ok_or_else(|| {
            Error::MalformedText(
                format!(
                    "unsupported code page (LCID: {:#06x}, sort ID: {})",
                    self.lcid(),
                    self.sort_id(),
                )
                .into(),
            )
        })
    }

    pub(crate) fn decode<R>(src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        let info = src.read_u32_le()?;
        let sort_id = src.read_u8()?;

        Ok(Self::new(info, sort_id))
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding() {
            Ok(encoding) => write!(f, "{}", encoding.name()),
            _ => write!(f, "None"),
        }
    }
}

/// Maps the locale part of an LCID to its ANSI code page.
pub fn lcid_to_encoding(locale: u16) -> Option<&'static Encoding> {
    let encoding = match locale {
        // CP874
        0x041e => encoding_rs::WINDOWS_874,
        // CP932
        0x0411 => encoding_rs::SHIFT_JIS,
        // CP936
        0x0804 | 0x1004 => encoding_rs::GB18030,
        // CP949
        0x0412 => encoding_rs::EUC_KR,
        // CP950
        0x0404 | 0x0c04 | 0x1404 => encoding_rs::BIG5,
        0x0405 | 0x040e | 0x0415 | 0x0418 | 0x041a | 0x041b | 0x041c | 0x0424 | 0x081a
        | 0x101a | 0x141a | 0x181a => encoding_rs::WINDOWS_1250,
        0x0402 | 0x0419 | 0x0422 | 0x0423 | 0x042f | 0x043f | 0x0440 | 0x0444 | 0x0450
        | 0x046d | 0x0485 | 0x082c | 0x0843 | 0x0850 | 0x0c1a | 0x1c1a | 0x201a => {
            encoding_rs::WINDOWS_1251
        }
        0x0408 => encoding_rs::WINDOWS_1253,
        0x041f | 0x042c | 0x0443 => encoding_rs::WINDOWS_1254,
        0x040d => encoding_rs::WINDOWS_1255,
        0x0401 | 0x0420 | 0x0429 | 0x0463 | 0x0480 | 0x048c | 0x0801 | 0x0c01 | 0x1001
        | 0x1401 | 0x1801 | 0x1c01 | 0x2001 | 0x2401 | 0x2801 | 0x2c01 | 0x3001 | 0x3401
        | 0x3801 | 0x3c01 | 0x4001 => encoding_rs::WINDOWS_1256,
        0x0425 | 0x0426 | 0x0427 | 0x0827 => encoding_rs::WINDOWS_1257,
        0x042a => encoding_rs::WINDOWS_1258,
        // Unicode-only locales have no ANSI code page.
        0x0439 | 0x0445 | 0x0446 | 0x0447 | 0x0449 | 0x044a | 0x044b | 0x044d | 0x044e
        | 0x044f | 0x0457 | 0x045a | 0x0465 | 0x0845 => return None,
        0x0403 | 0x0406 | 0x0407 | 0x0409 | 0x040a | 0x040b | 0x040c | 0x040f | 0x0410
        | 0x0413 | 0x0414 | 0x0416 | 0x0417 | 0x041d | 0x0421 | 0x042d | 0x0436 | 0x0438
        | 0x043e | 0x0441 | 0x0807 | 0x0809 | 0x080a | 0x080c | 0x0810 | 0x0813 | 0x0814
        | 0x0816 | 0x081d | 0x083e | 0x0c07 | 0x0c09 | 0x0c0a | 0x0c0c | 0x1007 | 0x1009
        | 0x100a | 0x100c | 0x1407 | 0x1409 | 0x140a | 0x140c | 0x1809 | 0x180a | 0x180c
        | 0x1c09 | 0x1c0a | 0x2009 | 0x200a | 0x2409 | 0x240a | 0x2809 | 0x280a | 0x2c09
        | 0x2c0a | 0x3009 | 0x300a | 0x3409 | 0x340a | 0x380a | 0x3c0a | 0x400a | 0x440a
        | 0x480a | 0x4c0a | 0x500a => encoding_rs::WINDOWS_1252,
        _ => return None,
    };

    Some(encoding)
}

/// Maps a SQL collation sort id to its code page.
pub fn sortid_to_encoding(sort_id: u8) -> Option<&'static Encoding> {
    let encoding = match sort_id {
        50..=54 | 71..=75 | 183..=186 | 210..=217 => encoding_rs::WINDOWS_1252,
        80..=98 => encoding_rs::WINDOWS_1250,
        104..=108 => encoding_rs::WINDOWS_1251,
        112..=114 | 120..=122 | 124 => encoding_rs::WINDOWS_1253,
        128..=130 => encoding_rs::WINDOWS_1254,
        136..=138 => encoding_rs::WINDOWS_1255,
        144..=146 => encoding_rs::WINDOWS_1256,
        152..=160 => encoding_rs::WINDOWS_1257,
        // CP932
        192 | 193 | 200 => encoding_rs::SHIFT_JIS,
        // CP949
        194 | 195 => encoding_rs::EUC_KR,
        // CP950
        196 | 197 | 201 | 202 => encoding_rs::BIG5,
        // CP936, GB18030 is a superset
        198 | 199 | 203 => encoding_rs::GB18030,
        204..=206 => encoding_rs::WINDOWS_874,
        // CP437 and CP850 have no codec in encoding_rs.
        _ => return None,
    };

    Some(encoding)
}
