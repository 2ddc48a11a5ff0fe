use byteorder::{ByteOrder, LittleEndian};

use crate::{
    error::Error,
    tds::{
        numeric::{decode_money, decode_money4},
        time::{decode_datetime, decode_small_datetime},
    },
    ColumnData, FixedLenType,
};

pub(crate) fn decode(ty: FixedLenType, buf: &[u8]) -> crate::Result<ColumnData<'static>> {
    if buf.len() != ty.size() {
        return Err(Error::Protocol(
            format!("{:?}: length of {} is invalid", ty, buf.len()).into(),
        ));
    }

    let data = match ty {
        FixedLenType::Null => ColumnData::Bit(None),
        FixedLenType::Bit => ColumnData::Bit(Some(buf[0] != 0)),
        FixedLenType::Int1 | FixedLenType::Int2 | FixedLenType::Int4 | FixedLenType::Int8 => {
            int(buf)?
        }
        FixedLenType::Float4 | FixedLenType::Float8 => float(buf)?,
        FixedLenType::Datetime4 => ColumnData::SmallDateTime(Some(decode_small_datetime(buf)?)),
        FixedLenType::Datetime => ColumnData::DateTime(Some(decode_datetime(buf)?)),
        FixedLenType::Money4 => ColumnData::Money(Some(decode_money4(buf)?)),
        FixedLenType::Money => ColumnData::Money(Some(decode_money(buf)?)),
    };

    Ok(data)
}

/// An integer sized by its payload, shared with `intn`.
pub(crate) fn int(buf: &[u8]) -> crate::Result<ColumnData<'static>> {
    let res = match buf.len() {
        1 => ColumnData::U8(Some(buf[0])),
        2 => ColumnData::I16(Some(LittleEndian::read_i16(buf))),
        4 => ColumnData::I32(Some(LittleEndian::read_i32(buf))),
        8 => ColumnData::I64(Some(LittleEndian::read_i64(buf))),
        len => {
            return Err(Error::Protocol(
                format!("int: length of {} is invalid", len).into(),
            ))
        }
    };

    Ok(res)
}

/// A float sized by its payload, shared with `floatn`.
pub(crate) fn float(buf: &[u8]) -> crate::Result<ColumnData<'static>> {
    let res = match buf.len() {
        4 => ColumnData::F32(Some(LittleEndian::read_f32(buf))),
        8 => ColumnData::F64(Some(LittleEndian::read_f64(buf))),
        len => {
            return Err(Error::Protocol(
                format!("float: length of {} is invalid", len).into(),
            ))
        }
    };

    Ok(res)
}
