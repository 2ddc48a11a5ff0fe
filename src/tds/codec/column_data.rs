mod fixed_len;
mod string;
mod var_len;
mod variant;

pub use string::{decode_char, decode_nchar};

use super::{Guid, TypeInfo};
use crate::tds::{
    numeric::{decode_decimal, Decimal, Money},
    time::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime},
};
use std::borrow::Cow;

#[derive(Clone, Debug, PartialEq)]
/// A decoded column value.
///
/// Strings and binaries borrow the payload buffer they were decoded from
/// when no transcoding was needed. [`ColumnData::into_owned`] detaches the
/// value from the buffer before the next payload overwrites it.
pub enum ColumnData<'a> {
    /// 8-bit integer, unsigned.
    U8(Option<u8>),
    /// 16-bit integer, signed.
    I16(Option<i16>),
    /// 32-bit integer, signed.
    I32(Option<i32>),
    /// 64-bit integer, signed.
    I64(Option<i64>),
    /// 32-bit floating point number.
    F32(Option<f32>),
    /// 64-bit floating point number.
    F64(Option<f64>),
    /// Boolean.
    Bit(Option<bool>),
    /// `money` or `smallmoney`.
    Money(Option<Money>),
    /// A string value.
    String(Option<Cow<'a, str>>),
    /// A Guid value, in wire byte order.
    Guid(Option<Guid>),
    /// Binary data.
    Binary(Option<Cow<'a, [u8]>>),
    /// `decimal` or `numeric`.
    Decimal(Option<Decimal>),
    /// A small DateTime value.
    SmallDateTime(Option<NaiveDateTime>),
    /// DateTime value.
    DateTime(Option<NaiveDateTime>),
    /// Date value.
    Date(Option<NaiveDate>),
    /// Time value.
    Time(Option<NaiveTime>),
    /// DateTime2 value.
    DateTime2(Option<NaiveDateTime>),
    /// DateTime2 value with an offset.
    DateTimeOffset(Option<DateTime<FixedOffset>>),
}

impl<'a> ColumnData<'a> {
    /// Decodes a non-NULL payload of a column of type `ty`.
    ///
    /// The payload must be exactly what the payload reader returned for the
    /// column. Fixed-size types reject any other length.
    pub fn decode(ty: &TypeInfo, buf: &'a [u8]) -> crate::Result<Self> {
        match ty {
            TypeInfo::FixedLen(ty) => fixed_len::decode(*ty, buf),
            TypeInfo::ByteLen { ty, .. } => var_len::decode_byte_len(*ty, buf),
            TypeInfo::Precision {
                precision, scale, ..
            } => Ok(ColumnData::Decimal(Some(decode_decimal(
                *precision, *scale, buf,
            )?))),
            TypeInfo::Scaled { ty, scale, .. } => var_len::decode_scaled(*ty, *scale, buf),
            TypeInfo::ShortLen { ty, collation, .. } => {
                var_len::decode_short_len(*ty, collation.as_ref(), buf)
            }
            TypeInfo::LongLen { ty, collation, .. } => {
                var_len::decode_long_len(*ty, collation.as_ref(), buf)
            }
        }
    }

    /// True for any NULL value.
    pub fn is_null(&self) -> bool {
        match self {
            ColumnData::U8(v) => v.is_none(),
            ColumnData::I16(v) => v.is_none(),
            ColumnData::I32(v) => v.is_none(),
            ColumnData::I64(v) => v.is_none(),
            ColumnData::F32(v) => v.is_none(),
            ColumnData::F64(v) => v.is_none(),
            ColumnData::Bit(v) => v.is_none(),
            ColumnData::Money(v) => v.is_none(),
            ColumnData::String(v) => v.is_none(),
            ColumnData::Guid(v) => v.is_none(),
            ColumnData::Binary(v) => v.is_none(),
            ColumnData::Decimal(v) => v.is_none(),
            ColumnData::SmallDateTime(v) => v.is_none(),
            ColumnData::DateTime(v) => v.is_none(),
            ColumnData::Date(v) => v.is_none(),
            ColumnData::Time(v) => v.is_none(),
            ColumnData::DateTime2(v) => v.is_none(),
            ColumnData::DateTimeOffset(v) => v.is_none(),
        }
    }

    /// Copies borrowed strings and binaries, detaching the value from the
    /// payload buffer.
    pub fn into_owned(self) -> ColumnData<'static> {
        match self {
            ColumnData::U8(v) => ColumnData::U8(v),
            ColumnData::I16(v) => ColumnData::I16(v),
            ColumnData::I32(v) => ColumnData::I32(v),
            ColumnData::I64(v) => ColumnData::I64(v),
            ColumnData::F32(v) => ColumnData::F32(v),
            ColumnData::F64(v) => ColumnData::F64(v),
            ColumnData::Bit(v) => ColumnData::Bit(v),
            ColumnData::Money(v) => ColumnData::Money(v),
            ColumnData::String(v) => ColumnData::String(v.map(|s| Cow::Owned(s.into_owned()))),
            ColumnData::Guid(v) => ColumnData::Guid(v),
            ColumnData::Binary(v) => ColumnData::Binary(v.map(|b| Cow::Owned(b.into_owned()))),
            ColumnData::Decimal(v) => ColumnData::Decimal(v),
            ColumnData::SmallDateTime(v) => ColumnData::SmallDateTime(v),
            ColumnData::DateTime(v) => ColumnData::DateTime(v),
            ColumnData::Date(v) => ColumnData::Date(v),
            ColumnData::Time(v) => ColumnData::Time(v),
            ColumnData::DateTime2(v) => ColumnData::DateTime2(v),
            ColumnData::DateTimeOffset(v) => ColumnData::DateTimeOffset(v),
        }
    }

    /// A SQL type name matching the value.
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            ColumnData::U8(_) => "tinyint".into(),
            ColumnData::I16(_) => "smallint".into(),
            ColumnData::I32(_) => "int".into(),
            ColumnData::I64(_) => "bigint".into(),
            ColumnData::F32(_) => "real".into(),
            ColumnData::F64(_) => "float".into(),
            ColumnData::Bit(_) => "bit".into(),
            ColumnData::Money(_) => "money".into(),
            ColumnData::String(_) => "nvarchar".into(),
            ColumnData::Guid(_) => "uniqueidentifier".into(),
            ColumnData::Binary(_) => "varbinary".into(),
            ColumnData::Decimal(Some(ref n)) => {
                format!("numeric({},{})", n.precision(), n.scale()).into()
            }
            ColumnData::Decimal(None) => "numeric".into(),
            ColumnData::SmallDateTime(_) => "smalldatetime".into(),
            ColumnData::DateTime(_) => "datetime".into(),
            ColumnData::Date(_) => "date".into(),
            ColumnData::Time(_) => "time".into(),
            ColumnData::DateTime2(_) => "datetime2".into(),
            ColumnData::DateTimeOffset(_) => "datetimeoffset".into(),
        }
    }
}

impl TypeInfo {
    /// The NULL value of the column type.
    ///
    /// The `null` type and `sql_variant` carry no value type of their own
    /// and give `Bit(None)`.
    pub fn null_value(&self) -> ColumnData<'static> {
        use super::{ByteLenType, FixedLenType, LongLenType, ShortLenType};

        match self {
            TypeInfo::FixedLen(ty) => match ty {
                FixedLenType::Null | FixedLenType::Bit => ColumnData::Bit(None),
                FixedLenType::Int1 => ColumnData::U8(None),
                FixedLenType::Int2 => ColumnData::I16(None),
                FixedLenType::Int4 => ColumnData::I32(None),
                FixedLenType::Int8 => ColumnData::I64(None),
                FixedLenType::Float4 => ColumnData::F32(None),
                FixedLenType::Float8 => ColumnData::F64(None),
                FixedLenType::Money | FixedLenType::Money4 => ColumnData::Money(None),
                FixedLenType::Datetime4 => ColumnData::SmallDateTime(None),
                FixedLenType::Datetime => ColumnData::DateTime(None),
            },
            TypeInfo::ByteLen { ty, len } => match (ty, len) {
                (ByteLenType::Guid, _) => ColumnData::Guid(None),
                (ByteLenType::Intn, 1) => ColumnData::U8(None),
                (ByteLenType::Intn, 2) => ColumnData::I16(None),
                (ByteLenType::Intn, 4) => ColumnData::I32(None),
                (ByteLenType::Intn, _) => ColumnData::I64(None),
                (ByteLenType::Bitn, _) => ColumnData::Bit(None),
                (ByteLenType::Floatn, 4) => ColumnData::F32(None),
                (ByteLenType::Floatn, _) => ColumnData::F64(None),
                (ByteLenType::Money, _) => ColumnData::Money(None),
                (ByteLenType::Datetimen, 4) => ColumnData::SmallDateTime(None),
                (ByteLenType::Datetimen, _) => ColumnData::DateTime(None),
                (ByteLenType::Daten, _) => ColumnData::Date(None),
                (ByteLenType::Char, _) | (ByteLenType::VarChar, _) => ColumnData::String(None),
                (ByteLenType::Binary, _) | (ByteLenType::VarBinary, _) => ColumnData::Binary(None),
                _ => ColumnData::Bit(None),
            },
            TypeInfo::Precision { .. } => ColumnData::Decimal(None),
            TypeInfo::Scaled { ty, .. } => match ty {
                ByteLenType::Timen => ColumnData::Time(None),
                ByteLenType::Datetime2 => ColumnData::DateTime2(None),
                _ => ColumnData::DateTimeOffset(None),
            },
            TypeInfo::ShortLen { ty, .. } => match ty {
                ShortLenType::BigVarBin | ShortLenType::BigBinary | ShortLenType::Udt => {
                    ColumnData::Binary(None)
                }
                _ => ColumnData::String(None),
            },
            TypeInfo::LongLen { ty, .. } => match ty {
                LongLenType::Text | LongLenType::NText => ColumnData::String(None),
                LongLenType::Image => ColumnData::Binary(None),
                LongLenType::SSVariant => ColumnData::Bit(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tds::{
        codec::{ByteLenType, FixedLenType, LongLenType, ShortLenType},
        Collation,
    };

    fn latin1() -> Option<Collation> {
        Some(Collation::new(0x00d0_0409, 52))
    }

    #[test]
    fn fixed_int() {
        let ty = TypeInfo::FixedLen(FixedLenType::Int4);
        let data = ColumnData::decode(&ty, &[0x2a, 0, 0, 0]).unwrap();

        assert_eq!(ColumnData::I32(Some(42)), data);
        assert_eq!("int", data.type_name());
    }

    #[test]
    fn fixed_wrong_length() {
        let ty = TypeInfo::FixedLen(FixedLenType::Int8);
        let err = ColumnData::decode(&ty, &[0; 4]).unwrap_err();

        assert!(matches!(err, crate::Error::Protocol(_)));
    }

    #[test]
    fn decimal_column() {
        let ty = TypeInfo::Precision {
            ty: ByteLenType::Decimaln,
            len: 5,
            precision: 5,
            scale: 2,
        };

        match ColumnData::decode(&ty, &[1, 0x39, 0x30, 0, 0]).unwrap() {
            ColumnData::Decimal(Some(dec)) => assert_eq!("123.45", dec.to_string()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nvarchar_is_utf16() {
        let ty = TypeInfo::ShortLen {
            ty: ShortLenType::NVarchar,
            len: 100,
            collation: latin1(),
        };

        let data = ColumnData::decode(&ty, &[0x68, 0x00, 0x69, 0x00]).unwrap();
        assert_eq!(ColumnData::String(Some("hi".into())), data);
    }

    #[test]
    fn varchar_ascii_is_borrowed() {
        let ty = TypeInfo::ShortLen {
            ty: ShortLenType::BigVarChar,
            len: 10,
            collation: latin1(),
        };

        match ColumnData::decode(&ty, b"abc").unwrap() {
            ColumnData::String(Some(Cow::Borrowed(s))) => assert_eq!("abc", s),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn into_owned_detaches() {
        let buf = vec![1u8, 2, 3];

        let owned = {
            let ty = TypeInfo::ShortLen {
                ty: ShortLenType::BigVarBin,
                len: 10,
                collation: None,
            };

            ColumnData::decode(&ty, &buf).unwrap().into_owned()
        };

        drop(buf);
        assert_eq!(ColumnData::Binary(Some(vec![1, 2, 3].into())), owned);
    }

    #[test]
    fn null_values_follow_the_type() {
        let cases = vec![
            (TypeInfo::FixedLen(FixedLenType::Int2), ColumnData::I16(None)),
            (
                TypeInfo::ByteLen {
                    ty: ByteLenType::Intn,
                    len: 8,
                },
                ColumnData::I64(None),
            ),
            (
                TypeInfo::Scaled {
                    ty: ByteLenType::DatetimeOffsetn,
                    scale: 7,
                    len: 10,
                },
                ColumnData::DateTimeOffset(None),
            ),
            (
                TypeInfo::LongLen {
                    ty: LongLenType::Image,
                    len: i32::MAX,
                    collation: None,
                },
                ColumnData::Binary(None),
            ),
        ];

        for (ty, null) in cases {
            assert!(null.is_null());
            assert_eq!(null, ty.null_value());
        }
    }
}
