//! Error module
pub use std::io::ErrorKind as IoErrorKind;
use std::{borrow::Cow, io};
use thiserror::Error;

/// Everything that can go wrong while resolving column metadata, reading a
/// payload or decoding a value.
///
/// None of the errors are recoverable on the stream they happened on: the
/// reader has consumed an unknown amount of a column and every following
/// read would be misaligned. Callers should drop the connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("An error occured during the attempt of performing I/O: {}", message)]
    /// The underlying stream failed or ended before the column was complete.
    Io {
        /// A list specifying general categories of I/O error.
        kind: IoErrorKind,
        /// The error description.
        message: String,
    },
    #[error("Protocol error: {}", _0)]
    /// The data on the wire contradicts the declared column type.
    Protocol(Cow<'static, str>),
    #[error("Unsupported column type: {:#04x}", _0)]
    /// The type id byte is not a known TDS data type.
    UnsupportedType(u8),
    #[error("Invalid scale for TIME/DATETIME2/DATETIMEOFFSET type: {}", _0)]
    /// A time-family column announced a scale outside of `0..=7`.
    InvalidScale(u8),
    #[error("Unsupported encoding: {}", _0)]
    /// The column uses an encoding this crate does not read (PLP, XML, UDT).
    UnsupportedEncoding(Cow<'static, str>),
    #[error("Malformed text: {}", _0)]
    /// Character data could not be transcoded to UTF-8.
    MalformedText(Cow<'static, str>),
    #[error("Conversion error: {}", _0)]
    /// Conversion failure from one type to another.
    Conversion(Cow<'static, str>),
}

impl Error {
    /// True, if the stream ended before the expected amount of bytes was
    /// read.
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            Error::Io {
                kind: IoErrorKind::UnexpectedEof,
                ..
            }
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Self::Io {
            kind: err.kind(),
            message: format!("{}", err),
        }
    }
}

impl From<std::string::FromUtf16Error> for Error {
    fn from(_err: std::string::FromUtf16Error) -> Error {
        Error::MalformedText("invalid UTF-16 sequence".into())
    }
}

impl From<uuid::Error> for Error {
    fn from(e: uuid::Error) -> Self {
        Self::Conversion(format!("Error converting a Guid value {}", e).into())
    }
}
