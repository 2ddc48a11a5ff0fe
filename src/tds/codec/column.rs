use bytes::BytesMut;
use std::convert::TryFrom;
use tracing::{event, Level};

use crate::{error::Error, ColumnData, LengthCategory, LongLenType, SqlReadBytes, TypeInfo};

/// How the payload of a column is framed on the wire, chosen once per column
/// from its type info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadReader {
    /// Exactly the declared size, no prefix. Never NULL.
    Fixed,
    /// `u8` length, zero meaning NULL.
    ByteLen,
    /// `u16` length, zero or `0xffff` meaning NULL.
    ShortLen,
    /// Text pointer framing for `text`, `ntext` and `image`, a plain `i32`
    /// length for `sql_variant`.
    LongLen,
}

impl PayloadReader {
    /// The reader for columns of the given type.
    pub fn for_type(ty: &TypeInfo) -> Self {
        match ty.category() {
            LengthCategory::Fixed => PayloadReader::Fixed,
            LengthCategory::ByteLen => PayloadReader::ByteLen,
            LengthCategory::ShortLen => PayloadReader::ShortLen,
            LengthCategory::LongLen => PayloadReader::LongLen,
        }
    }

    /// Reads one payload of a column of type `ty` into `buf`.
    ///
    /// Consumes exactly the prefix and payload bytes of the column and
    /// nothing else, also for NULL. `buf` grows for long-length payloads;
    /// every other category rejects payloads over the declared size.
    pub fn read<'a, R>(
        self,
        ty: &TypeInfo,
        buf: &'a mut BytesMut,
        src: &mut R,
    ) -> crate::Result<Option<&'a [u8]>>
    where
        R: SqlReadBytes,
    {
        let len = match self {
            PayloadReader::Fixed => Some(ty.size()),
            PayloadReader::ByteLen => match src.read_u8()? {
                0 => None,
                len => Some(len as usize),
            },
            PayloadReader::ShortLen => match src.read_u16_le()? {
                0 | 0xffff => None,
                len => Some(len as usize),
            },
            PayloadReader::LongLen => Self::read_long_len(ty, src)?,
        };

        let len = match len {
            Some(len) => len,
            None => {
                event!(Level::TRACE, type_info = %ty, "NULL payload");
                return Ok(None);
            }
        };

        let limit = match self {
            PayloadReader::LongLen => ty.size(),
            _ => buf.len(),
        };

        if len > limit {
            return Err(Error::Protocol(
                format!(
                    "{}: payload of {} bytes exceeds the declared size of {}",
                    ty, len, limit
                )
                .into(),
            ));
        }

        if len > buf.len() {
            buf.resize(len, 0);
        }

        src.read_bytes(&mut buf[..len])?;

        Ok(Some(&buf[..len]))
    }

    fn read_long_len<R>(ty: &TypeInfo, src: &mut R) -> crate::Result<Option<usize>>
    where
        R: SqlReadBytes,
    {
        match ty {
            TypeInfo::LongLen {
                ty: LongLenType::SSVariant,
                ..
            } => {
                let len = src.read_i32_le()?;
                Ok(if len > 0 { Some(len as usize) } else { None })
            }
            _ => {
                let ptr_len = src.read_u8()? as usize;

                if ptr_len == 0 {
                    return Ok(None);
                }

                // text pointer and timestamp
                src.skip_bytes(ptr_len + 8)?;

                let len = src.read_i32_le()?;
                Ok(usize::try_from(len).ok())
            }
        }
    }
}

/// A resolved result set column: its type info, the payload reader chosen
/// for it and a scratch buffer for its payloads.
///
/// The buffer is reused for every row. Values read from it borrow the
/// descriptor until the next read.
#[derive(Debug)]
pub struct ColumnDescriptor {
    ty: TypeInfo,
    reader: PayloadReader,
    buf: BytesMut,
}

impl ColumnDescriptor {
    /// A descriptor for an already resolved type.
    pub fn new(ty: TypeInfo) -> Self {
        let reader = PayloadReader::for_type(&ty);

        let capacity = match reader {
            PayloadReader::LongLen => 0,
            _ => ty.size(),
        };

        let mut buf = BytesMut::with_capacity(capacity);
        buf.resize(capacity, 0);

        Self { ty, reader, buf }
    }

    /// Reads the type info header of a column whose type id byte was already
    /// consumed.
    pub fn resolve<R>(type_id: u8, src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        Ok(Self::new(TypeInfo::resolve(type_id, src)?))
    }

    /// Reads the type id and the type info header of a column.
    pub fn decode<R>(src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        Ok(Self::new(TypeInfo::decode(src)?))
    }

    /// The resolved type info.
    pub fn type_info(&self) -> &TypeInfo {
        &self.ty
    }

    /// The payload reader of the column.
    pub fn payload_reader(&self) -> PayloadReader {
        self.reader
    }

    /// Reads the next raw payload of the column, `None` being SQL NULL.
    pub fn read_payload<R>(&mut self, src: &mut R) -> crate::Result<Option<&[u8]>>
    where
        R: SqlReadBytes,
    {
        let Self { ty, reader, buf } = self;
        reader.read(ty, buf, src)
    }

    /// Reads and decodes the next value of the column.
    pub fn read_value<R>(&mut self, src: &mut R) -> crate::Result<ColumnData<'_>>
    where
        R: SqlReadBytes,
    {
        let Self { ty, reader, buf } = self;

        match reader.read(ty, buf, src)? {
            Some(payload) => ColumnData::decode(ty, payload),
            None => Ok(ty.null_value()),
        }
    }
}
