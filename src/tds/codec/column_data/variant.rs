//! `sql_variant` bodies.
//!
//! A variant carries its own base type: one type id byte, one byte counting
//! the property bytes, the properties of the base type, and then the value
//! bytes up to the end of the payload.

use std::convert::TryFrom;

use crate::{
    error::Error,
    tds::{codec::DataType, Collation},
    ColumnData, ShortLenType, TypeInfo,
};

pub(crate) fn decode(buf: &[u8]) -> crate::Result<ColumnData<'_>> {
    let (header, rest) = match buf {
        [id, prop_len, rest @ ..] => ((*id, *prop_len as usize), rest),
        _ => {
            return Err(Error::Protocol(
                format!("sql_variant: length of {} is invalid", buf.len()).into(),
            ))
        }
    };

    let (id, prop_len) = header;

    if rest.len() < prop_len {
        return Err(Error::Protocol(
            format!(
                "sql_variant: {} property bytes announced, {} left",
                prop_len,
                rest.len()
            )
            .into(),
        ));
    }

    let (props, value) = rest.split_at(prop_len);
    let ty = base_type(id, props, value.len())?;

    ColumnData::decode(&ty, value)
}

fn base_type(id: u8, props: &[u8], value_len: usize) -> crate::Result<TypeInfo> {
    let invalid_props = || {
        Error::Protocol(
            format!(
                "sql_variant: {} property bytes for base type {:#04x}",
                props.len(),
                id
            )
            .into(),
        )
    };

    let byte_len = || {
        u8::try_from(value_len).map_err(|_| {
            Error::Protocol(
                format!(
                    "sql_variant: value of {} bytes for base type {:#04x}",
                    value_len, id
                )
                .into(),
            )
        })
    };

    let ty = match DataType::try_from(id)? {
        DataType::Fixed(ty) => TypeInfo::FixedLen(ty),
        DataType::ByteLen(ty) if ty.is_decimal() => match props {
            [precision, scale] => TypeInfo::Precision {
                ty,
                len: byte_len()?,
                precision: *precision,
                scale: *scale,
            },
            _ => return Err(invalid_props()),
        },
        DataType::ByteLen(ty) if ty.is_scaled_time() => match props {
            [scale] => TypeInfo::Scaled {
                ty,
                scale: *scale,
                len: ty.scaled_len(*scale)?,
            },
            _ => return Err(invalid_props()),
        },
        DataType::ByteLen(ty) => TypeInfo::ByteLen {
            ty,
            len: byte_len()?,
        },
        DataType::ShortLen(ty @ ShortLenType::BigVarBin)
        | DataType::ShortLen(ty @ ShortLenType::BigBinary) => match props {
            [l0, l1] => TypeInfo::ShortLen {
                ty,
                len: u16::from_le_bytes([*l0, *l1]),
                collation: None,
            },
            _ => return Err(invalid_props()),
        },
        DataType::ShortLen(ty) if ty.has_collation() => match props {
            [l0, l1, c0, c1, c2, c3, sort_id] => TypeInfo::ShortLen {
                ty,
                len: u16::from_le_bytes([*l0, *l1]),
                collation: Some(Collation::new(
                    u32::from_le_bytes([*c0, *c1, *c2, *c3]),
                    *sort_id,
                )),
            },
            _ => return Err(invalid_props()),
        },
        _ => {
            return Err(Error::Protocol(
                format!("sql_variant: base type {:#04x} is not allowed", id).into(),
            ))
        }
    };

    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tds::time::NaiveDate;

    #[test]
    fn int_variant() {
        let buf = [0x38, 0x00, 0x2a, 0x00, 0x00, 0x00];
        assert_eq!(ColumnData::I32(Some(42)), decode(&buf).unwrap());
    }

    #[test]
    fn decimal_variant() {
        let buf = [0x6c, 0x02, 0x05, 0x02, 0x01, 0x39, 0x30, 0x00, 0x00];

        match decode(&buf).unwrap() {
            ColumnData::Decimal(Some(dec)) => {
                assert_eq!(5, dec.precision());
                assert_eq!("123.45", dec.to_string());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nvarchar_variant() {
        let buf = [
            0xe7, 0x07, 0x40, 0x1f, 0x09, 0x04, 0xd0, 0x00, 0x34, 0x68, 0x00, 0x69, 0x00,
        ];

        assert_eq!(ColumnData::String(Some("hi".into())), decode(&buf).unwrap());
    }

    #[test]
    fn date_variant() {
        let buf = [0x28, 0x00, 0x00, 0x00, 0x00];

        assert_eq!(
            ColumnData::Date(NaiveDate::from_ymd_opt(1, 1, 1)),
            decode(&buf).unwrap()
        );
    }

    #[test]
    fn datetime2_variant() {
        // datetime2(3): 0001-01-02 00:00:01.000
        let mut buf = vec![0x2a, 0x01, 0x03];
        buf.extend_from_slice(&1000u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x00, 0x00]);

        let expected = NaiveDate::from_ymd_opt(1, 1, 2).and_then(|d| d.and_hms_opt(0, 0, 1));
        assert_eq!(ColumnData::DateTime2(expected), decode(&buf).unwrap());
    }

    #[test]
    fn scaled_base_types_include_date_and_offset() {
        assert_eq!(8, base_type(0x2a, &[7], 8).unwrap().size());
        assert_eq!(10, base_type(0x2b, &[7], 10).unwrap().size());
        assert_eq!(5, base_type(0x29, &[7], 5).unwrap().size());
    }

    #[test]
    fn oversized_value_is_rejected() {
        assert!(matches!(
            base_type(0x6c, &[0x26, 0x00], 300).unwrap_err(),
            Error::Protocol(_)
        ));
        assert!(matches!(
            base_type(0x25, &[], 300).unwrap_err(),
            Error::Protocol(_)
        ));
    }

    #[test]
    fn nested_variant_is_rejected() {
        let buf = [0x62, 0x00, 0x00];
        assert!(matches!(decode(&buf).unwrap_err(), Error::Protocol(_)));
    }

    #[test]
    fn truncated_properties() {
        let buf = [0x6c, 0x02, 0x05];
        assert!(matches!(decode(&buf).unwrap_err(), Error::Protocol(_)));
    }
}
