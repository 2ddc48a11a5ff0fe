use std::borrow::Cow;

use crate::{
    error::Error,
    tds::{
        codec::decode_guid,
        numeric::{decode_money, decode_money4},
        time::{
            decode_date, decode_datetime, decode_datetime2, decode_datetimeoffset,
            decode_small_datetime, decode_time,
        },
        Collation,
    },
    ByteLenType, ColumnData, LongLenType, ShortLenType,
};

use super::{decode_char, decode_nchar, fixed_len};

pub(crate) fn decode_byte_len(ty: ByteLenType, buf: &[u8]) -> crate::Result<ColumnData<'_>> {
    use ByteLenType::*;

    let res = match ty {
        Guid => ColumnData::Guid(Some(decode_guid(buf)?)),
        Intn => fixed_len::int(buf)?,
        Bitn => match buf {
            [b] => ColumnData::Bit(Some(*b != 0)),
            _ => {
                return Err(Error::Protocol(
                    format!("bitn: length of {} is invalid", buf.len()).into(),
                ))
            }
        },
        Floatn => fixed_len::float(buf)?,
        Money => match buf.len() {
            4 => ColumnData::Money(Some(decode_money4(buf)?)),
            _ => ColumnData::Money(Some(decode_money(buf)?)),
        },
        Datetimen => match buf.len() {
            4 => ColumnData::SmallDateTime(Some(decode_small_datetime(buf)?)),
            _ => ColumnData::DateTime(Some(decode_datetime(buf)?)),
        },
        Daten => ColumnData::Date(Some(decode_date(buf)?)),
        Char | VarChar => ColumnData::String(Some(decode_char(buf, None)?)),
        Binary | VarBinary => ColumnData::Binary(Some(Cow::Borrowed(buf))),
        Decimal | Numeric | Decimaln | Numericn | Timen | Datetime2 | DatetimeOffsetn => {
            return Err(Error::Protocol(
                format!("{:?}: missing precision or scale", ty).into(),
            ))
        }
    };

    Ok(res)
}

pub(crate) fn decode_scaled(
    ty: ByteLenType,
    scale: u8,
    buf: &[u8],
) -> crate::Result<ColumnData<'static>> {
    let res = match ty {
        ByteLenType::Timen => ColumnData::Time(Some(decode_time(scale, buf)?.time())),
        ByteLenType::Datetime2 => ColumnData::DateTime2(Some(decode_datetime2(scale, buf)?)),
        ByteLenType::DatetimeOffsetn => {
            ColumnData::DateTimeOffset(Some(decode_datetimeoffset(scale, buf)?))
        }
        _ => return decode_byte_len(ty, buf).map(ColumnData::into_owned),
    };

    Ok(res)
}

pub(crate) fn decode_short_len<'a>(
    ty: ShortLenType,
    collation: Option<&Collation>,
    buf: &'a [u8],
) -> crate::Result<ColumnData<'a>> {
    use ShortLenType::*;

    let res = match ty {
        BigVarBin | BigBinary => ColumnData::Binary(Some(Cow::Borrowed(buf))),
        BigVarChar | BigChar => ColumnData::String(Some(decode_char(buf, collation)?)),
        NVarchar | NChar => ColumnData::String(Some(decode_nchar(buf)?.into())),
        Xml | Udt => {
            return Err(Error::UnsupportedEncoding(
                format!("{:?} values are not supported", ty).into(),
            ))
        }
    };

    Ok(res)
}

pub(crate) fn decode_long_len<'a>(
    ty: LongLenType,
    collation: Option<&Collation>,
    buf: &'a [u8],
) -> crate::Result<ColumnData<'a>> {
    let res = match ty {
        LongLenType::Text => ColumnData::String(Some(decode_char(buf, collation)?)),
        LongLenType::NText => ColumnData::String(Some(decode_nchar(buf)?.into())),
        LongLenType::Image => ColumnData::Binary(Some(Cow::Borrowed(buf))),
        LongLenType::SSVariant => super::variant::decode(buf)?,
    };

    Ok(res)
}
