//! Column metadata resolution and value decoding for the Tabular Data Stream
//! (TDS) protocol of Microsoft SQL Server.
//!
//! A result set starts with the type info of every column. Resolving it
//! gives a [`ColumnDescriptor`]: the column's [`TypeInfo`], a
//! [`PayloadReader`] matching how its payloads are framed and a scratch
//! buffer. Every row then holds one payload per column, read in column
//! order from the same blocking stream and decoded into a [`ColumnData`].
//!
//! ```
//! use std::io::Cursor;
//! use tds_coldata::{ColumnData, ColumnDescriptor};
//!
//! # fn main() -> tds_coldata::Result<()> {
//! // An `intn(4)` column, then the values 42 and NULL.
//! let mut src = Cursor::new(vec![0x26, 0x04, 0x04, 0x2a, 0x00, 0x00, 0x00, 0x00]);
//!
//! let mut column = ColumnDescriptor::decode(&mut src)?;
//! assert_eq!("int", column.type_info().to_string());
//!
//! assert_eq!(ColumnData::I32(Some(42)), column.read_value(&mut src)?);
//! assert_eq!(ColumnData::I32(None), column.read_value(&mut src)?);
//! # Ok(())
//! # }
//! ```
//!
//! The stream is anything implementing [`std::io::Read`]. Reads block until
//! the bytes of a column are complete; a stream ending early surfaces as an
//! [`Error::Io`] for which [`Error::is_truncated`] holds. No error leaves the
//! stream in a usable state.
//!
//! Values of strings and binaries borrow the scratch buffer of their column
//! where possible. [`ColumnData::into_owned`] copies them out before the
//! next row is read.
//!
//! # Features
//!
//! - `rust_decimal`: conversions from [`numeric::Decimal`] and
//!   [`numeric::Money`] into `rust_decimal::Decimal`.
#![cfg_attr(feature = "docs", feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(missing_debug_implementations, rust_2018_idioms)]
#![doc(test(attr(deny(rust_2018_idioms, warnings))))]
#![doc(test(attr(allow(unused_extern_crates, unused_variables))))]

#[macro_use]
mod macros;

mod sql_read_bytes;

pub mod error;
mod tds;

pub use error::Error;
pub use sql_read_bytes::SqlReadBytes;
pub use tds::{
    codec::{
        decode_char, decode_guid, decode_nchar, ByteLenType, ColumnData, ColumnDescriptor,
        DataType, FixedLenType, Guid, LengthCategory, LongLenType, PayloadReader, ShortLenType,
        TypeInfo,
    },
    numeric, time, Collation,
};
pub use uuid::Uuid;

/// An alias for a result that holds crate's error type as the error.
pub type Result<T> = std::result::Result<T, Error>;
