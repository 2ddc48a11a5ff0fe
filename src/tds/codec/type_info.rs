use crate::{tds::time::time_len, tds::Collation, Error, SqlReadBytes};
use std::{convert::TryFrom, fmt};
use tracing::{event, Level};

type_id_enum! {
    /// 2.2.5.4.1, types whose length is implied by the type id.
    pub enum FixedLenType {
        Null = 0x1F,
        Int1 = 0x30,
        Bit = 0x32,
        Int2 = 0x34,
        Int4 = 0x38,
        Datetime4 = 0x3A,
        Float4 = 0x3B,
        Money = 0x3C,
        Datetime = 0x3D,
        Float8 = 0x3E,
        Money4 = 0x7A,
        Int8 = 0x7F,
    }
}

impl FixedLenType {
    /// Payload size in bytes.
    pub fn size(self) -> usize {
        match self {
            FixedLenType::Null => 0,
            FixedLenType::Int1 | FixedLenType::Bit => 1,
            FixedLenType::Int2 => 2,
            FixedLenType::Int4
            | FixedLenType::Datetime4
            | FixedLenType::Float4
            | FixedLenType::Money4 => 4,
            FixedLenType::Money
            | FixedLenType::Datetime
            | FixedLenType::Float8
            | FixedLenType::Int8 => 8,
        }
    }
}

type_id_enum! {
    /// 2.2.5.4.2, variable-length types framed by a one-byte length.
    pub enum ByteLenType {
        Guid = 0x24,
        Intn = 0x26,
        // legacy
        Decimal = 0x37,
        // legacy
        Numeric = 0x3F,
        Bitn = 0x68,
        Decimaln = 0x6A,
        Numericn = 0x6C,
        Floatn = 0x6D,
        Money = 0x6E,
        Datetimen = 0x6F,
        Daten = 0x28,
        Timen = 0x29,
        Datetime2 = 0x2A,
        DatetimeOffsetn = 0x2B,
        // legacy
        Char = 0x2F,
        // legacy
        VarChar = 0x27,
        // legacy
        Binary = 0x2D,
        // legacy
        VarBinary = 0x25,
    }
}

impl ByteLenType {
    /// Decimal and numeric, legacy or not.
    pub fn is_decimal(self) -> bool {
        matches!(
            self,
            ByteLenType::Decimal
                | ByteLenType::Numeric
                | ByteLenType::Decimaln
                | ByteLenType::Numericn
        )
    }

    /// Types with a scale byte and a scale-dependent width.
    pub fn is_scaled_time(self) -> bool {
        matches!(
            self,
            ByteLenType::Timen | ByteLenType::Datetime2 | ByteLenType::DatetimeOffsetn
        )
    }

    /// Payload size of a scaled time type: the time component plus three
    /// date bytes for `datetime2` and five date and offset bytes for
    /// `datetimeoffset`.
    pub fn scaled_len(self, scale: u8) -> crate::Result<u8> {
        let time_len = time_len(scale)? as u8;

        Ok(match self {
            ByteLenType::Datetime2 => time_len + 3,
            ByteLenType::DatetimeOffsetn => time_len + 5,
            _ => time_len,
        })
    }
}

type_id_enum! {
    /// 2.2.5.4.2, variable-length types framed by a two-byte length.
    pub enum ShortLenType {
        BigVarBin = 0xA5,
        BigVarChar = 0xA7,
        BigBinary = 0xAD,
        BigChar = 0xAF,
        NVarchar = 0xE7,
        NChar = 0xEF,
        Xml = 0xF1,
        Udt = 0xF0,
    }
}

impl ShortLenType {
    /// Character types carrying a collation.
    pub fn has_collation(self) -> bool {
        matches!(
            self,
            ShortLenType::BigVarChar
                | ShortLenType::BigChar
                | ShortLenType::NVarchar
                | ShortLenType::NChar
        )
    }
}

type_id_enum! {
    /// 2.2.5.4.2, variable-length types framed by a four-byte length.
    pub enum LongLenType {
        Text = 0x23,
        Image = 0x22,
        NText = 0x63,
        SSVariant = 0x62,
    }
}

impl LongLenType {
    /// Character types carrying a collation.
    pub fn has_collation(self) -> bool {
        matches!(self, LongLenType::Text | LongLenType::NText)
    }
}

/// How the length of a column payload is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthCategory {
    /// No length prefix, the type id implies the size.
    Fixed,
    /// One-byte unsigned length prefix.
    ByteLen,
    /// Two-byte little-endian unsigned length prefix.
    ShortLen,
    /// Four-byte little-endian signed length prefix.
    LongLen,
}

/// A type id byte classified into its length category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// See [`FixedLenType`].
    Fixed(FixedLenType),
    /// See [`ByteLenType`].
    ByteLen(ByteLenType),
    /// See [`ShortLenType`].
    ShortLen(ShortLenType),
    /// See [`LongLenType`].
    LongLen(LongLenType),
}

impl DataType {
    /// The length framing of the type.
    pub fn category(self) -> LengthCategory {
        match self {
            DataType::Fixed(_) => LengthCategory::Fixed,
            DataType::ByteLen(_) => LengthCategory::ByteLen,
            DataType::ShortLen(_) => LengthCategory::ShortLen,
            DataType::LongLen(_) => LengthCategory::LongLen,
        }
    }

    /// The type id byte.
    pub fn id(self) -> u8 {
        match self {
            DataType::Fixed(ty) => ty as u8,
            DataType::ByteLen(ty) => ty as u8,
            DataType::ShortLen(ty) => ty as u8,
            DataType::LongLen(ty) => ty as u8,
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(id: u8) -> crate::Result<Self> {
        if let Ok(ty) = FixedLenType::try_from(id) {
            Ok(DataType::Fixed(ty))
        } else if let Ok(ty) = ByteLenType::try_from(id) {
            Ok(DataType::ByteLen(ty))
        } else if let Ok(ty) = ShortLenType::try_from(id) {
            Ok(DataType::ShortLen(ty))
        } else if let Ok(ty) = LongLenType::try_from(id) {
            Ok(DataType::LongLen(ty))
        } else {
            Err(Error::UnsupportedType(id))
        }
    }
}

/// Describes the type of a column, as resolved from its type info.
///
/// Every variant carries only the header fields its types have on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeInfo {
    /// A fixed-size type.
    FixedLen(FixedLenType),
    /// A one-byte length type with a declared maximum size.
    ByteLen {
        /// The type.
        ty: ByteLenType,
        /// Declared maximum payload size.
        len: u8,
    },
    /// `decimal` or `numeric`.
    Precision {
        /// The type.
        ty: ByteLenType,
        /// Declared maximum payload size.
        len: u8,
        /// Total number of digits.
        precision: u8,
        /// Number of fractional digits.
        scale: u8,
    },
    /// `time`, `datetime2` or `datetimeoffset`.
    Scaled {
        /// The type.
        ty: ByteLenType,
        /// Fractional second digits, `0..=7`.
        scale: u8,
        /// Payload size implied by the scale.
        len: u8,
    },
    /// A two-byte length type.
    ShortLen {
        /// The type.
        ty: ShortLenType,
        /// Declared maximum payload size in bytes.
        len: u16,
        /// Present for character types.
        collation: Option<Collation>,
    },
    /// A four-byte length type.
    LongLen {
        /// The type.
        ty: LongLenType,
        /// Declared maximum payload size in bytes.
        len: i32,
        /// Present for `text` and `ntext`.
        collation: Option<Collation>,
    },
}

impl TypeInfo {
    /// Reads the type id byte and the type info header following it.
    pub fn decode<R>(src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        let id = src.read_u8()?;
        Self::resolve(id, src)
    }

    /// Reads the type info header of a column whose type id byte was
    /// already consumed.
    ///
    /// Fixed-size types read nothing. Every other type reads exactly its
    /// header: sizes, scale, precision and collation as the wire has them.
    pub fn resolve<R>(id: u8, src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        let ty = match DataType::try_from(id)? {
            DataType::Fixed(ty) => TypeInfo::FixedLen(ty),
            DataType::ByteLen(ty) => Self::resolve_byte_len(ty, src)?,
            DataType::ShortLen(ty) => Self::resolve_short_len(ty, src)?,
            DataType::LongLen(ty) => Self::resolve_long_len(ty, src)?,
        };

        event!(Level::TRACE, type_info = %ty, size = ty.size(), "resolved column type");

        Ok(ty)
    }

    fn resolve_byte_len<R>(ty: ByteLenType, src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        if ty == ByteLenType::Daten {
            return Ok(TypeInfo::ByteLen { ty, len: 3 });
        }

        if ty.is_scaled_time() {
            let scale = src.read_u8()?;
            let len = ty.scaled_len(scale)?;

            return Ok(TypeInfo::Scaled { ty, scale, len });
        }

        let len = src.read_u8()?;

        if ty.is_decimal() {
            let precision = src.read_u8()?;
            let scale = src.read_u8()?;

            return Ok(TypeInfo::Precision {
                ty,
                len,
                precision,
                scale,
            });
        }

        Ok(TypeInfo::ByteLen { ty, len })
    }

    fn resolve_short_len<R>(ty: ShortLenType, src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        if matches!(ty, ShortLenType::Xml | ShortLenType::Udt) {
            event!(Level::WARN, ?ty, "refusing a column of an unsupported type");

            return Err(Error::UnsupportedEncoding(
                format!("{:?} columns are not supported", ty).into(),
            ));
        }

        let len = src.read_u16_le()?;

        let collation = if ty.has_collation() {
            Some(Collation::decode(src)?)
        } else {
            None
        };

        if len == 0xffff {
            event!(Level::WARN, ?ty, "refusing a MAX length column");

            return Err(Error::UnsupportedEncoding(
                format!("{:?}: partially length-prefixed (MAX) columns are not supported", ty)
                    .into(),
            ));
        }

        Ok(TypeInfo::ShortLen { ty, len, collation })
    }

    fn resolve_long_len<R>(ty: LongLenType, src: &mut R) -> crate::Result<Self>
    where
        R: SqlReadBytes,
    {
        let len = src.read_i32_le()?;

        let collation = if ty.has_collation() {
            Some(Collation::decode(src)?)
        } else {
            None
        };

        Ok(TypeInfo::LongLen { ty, len, collation })
    }

    /// The classified type id.
    pub fn data_type(&self) -> DataType {
        match self {
            TypeInfo::FixedLen(ty) => DataType::Fixed(*ty),
            TypeInfo::ByteLen { ty, .. }
            | TypeInfo::Precision { ty, .. }
            | TypeInfo::Scaled { ty, .. } => DataType::ByteLen(*ty),
            TypeInfo::ShortLen { ty, .. } => DataType::ShortLen(*ty),
            TypeInfo::LongLen { ty, .. } => DataType::LongLen(*ty),
        }
    }

    /// The type id byte.
    pub fn id(&self) -> u8 {
        self.data_type().id()
    }

    /// The length framing of the column payload.
    pub fn category(&self) -> LengthCategory {
        self.data_type().category()
    }

    /// Declared (maximum) payload size in bytes.
    pub fn size(&self) -> usize {
        match self {
            TypeInfo::FixedLen(ty) => ty.size(),
            TypeInfo::ByteLen { len, .. }
            | TypeInfo::Precision { len, .. }
            | TypeInfo::Scaled { len, .. } => *len as usize,
            TypeInfo::ShortLen { len, .. } => *len as usize,
            TypeInfo::LongLen { len, .. } => (*len).max(0) as usize,
        }
    }

    /// Total digits of a `decimal` or `numeric`.
    pub fn precision(&self) -> Option<u8> {
        match self {
            TypeInfo::Precision { precision, .. } => Some(*precision),
            _ => None,
        }
    }

    /// Fractional digits of a `decimal`/`numeric` or fractional second
    /// digits of a time type.
    pub fn scale(&self) -> Option<u8> {
        match self {
            TypeInfo::Precision { scale, .. } | TypeInfo::Scaled { scale, .. } => Some(*scale),
            _ => None,
        }
    }

    /// Collation of a character column.
    pub fn collation(&self) -> Option<Collation> {
        match self {
            TypeInfo::ShortLen { collation, .. } | TypeInfo::LongLen { collation, .. } => {
                *collation
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::FixedLen(ty) => match ty {
                FixedLenType::Null => write!(f, "null"),
                FixedLenType::Int1 => write!(f, "tinyint"),
                FixedLenType::Bit => write!(f, "bit"),
                FixedLenType::Int2 => write!(f, "smallint"),
                FixedLenType::Int4 => write!(f, "int"),
                FixedLenType::Datetime4 => write!(f, "smalldatetime"),
                FixedLenType::Float4 => write!(f, "real"),
                FixedLenType::Money => write!(f, "money"),
                FixedLenType::Datetime => write!(f, "datetime"),
                FixedLenType::Float8 => write!(f, "float"),
                FixedLenType::Money4 => write!(f, "smallmoney"),
                FixedLenType::Int8 => write!(f, "bigint"),
            },
            TypeInfo::ByteLen { ty, len } => match (ty, len) {
                (ByteLenType::Guid, _) => write!(f, "uniqueidentifier"),
                (ByteLenType::Intn, 1) => write!(f, "tinyint"),
                (ByteLenType::Intn, 2) => write!(f, "smallint"),
                (ByteLenType::Intn, 4) => write!(f, "int"),
                (ByteLenType::Intn, _) => write!(f, "bigint"),
                (ByteLenType::Bitn, _) => write!(f, "bit"),
                (ByteLenType::Floatn, 4) => write!(f, "real"),
                (ByteLenType::Floatn, _) => write!(f, "float"),
                (ByteLenType::Money, 4) => write!(f, "smallmoney"),
                (ByteLenType::Money, _) => write!(f, "money"),
                (ByteLenType::Datetimen, 4) => write!(f, "smalldatetime"),
                (ByteLenType::Datetimen, _) => write!(f, "datetime"),
                (ByteLenType::Daten, _) => write!(f, "date"),
                (ByteLenType::Char, len) => write!(f, "char({})", len),
                (ByteLenType::VarChar, len) => write!(f, "varchar({})", len),
                (ByteLenType::Binary, len) => write!(f, "binary({})", len),
                (ByteLenType::VarBinary, len) => write!(f, "varbinary({})", len),
                (ty, len) => write!(f, "{:?}({})", ty, len),
            },
            TypeInfo::Precision {
                ty,
                precision,
                scale,
                ..
            } => match ty {
                ByteLenType::Decimal | ByteLenType::Decimaln => {
                    write!(f, "decimal({},{})", precision, scale)
                }
                _ => write!(f, "numeric({},{})", precision, scale),
            },
            TypeInfo::Scaled { ty, scale, .. } => match ty {
                ByteLenType::Timen => write!(f, "time({})", scale),
                ByteLenType::Datetime2 => write!(f, "datetime2({})", scale),
                _ => write!(f, "datetimeoffset({})", scale),
            },
            TypeInfo::ShortLen { ty, len, .. } => match ty {
                ShortLenType::BigVarBin => write!(f, "varbinary({})", len),
                ShortLenType::BigVarChar => write!(f, "varchar({})", len),
                ShortLenType::BigBinary => write!(f, "binary({})", len),
                ShortLenType::BigChar => write!(f, "char({})", len),
                ShortLenType::NVarchar => write!(f, "nvarchar({})", len / 2),
                ShortLenType::NChar => write!(f, "nchar({})", len / 2),
                ShortLenType::Xml => write!(f, "xml"),
                ShortLenType::Udt => write!(f, "udt"),
            },
            TypeInfo::LongLen { ty, .. } => match ty {
                LongLenType::Text => write!(f, "text"),
                LongLenType::Image => write!(f, "image"),
                LongLenType::NText => write!(f, "ntext"),
                LongLenType::SSVariant => write!(f, "sql_variant"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn resolve(id: u8, header: &[u8]) -> (crate::Result<TypeInfo>, u64) {
        let mut src = Cursor::new(header.to_vec());
        let res = TypeInfo::resolve(id, &mut src);
        (res, src.position())
    }

    #[test]
    fn every_type_id_has_at_most_one_category() {
        let mut known = 0;

        for id in 0..=255u8 {
            let hits = [
                FixedLenType::try_from(id).is_ok(),
                ByteLenType::try_from(id).is_ok(),
                ShortLenType::try_from(id).is_ok(),
                LongLenType::try_from(id).is_ok(),
            ]
            .iter()
            .filter(|hit| **hit)
            .count();

            assert!(hits <= 1, "{:#04x} is in {} categories", id, hits);

            match DataType::try_from(id) {
                Ok(ty) => {
                    assert_eq!(id, ty.id());
                    known += 1;
                }
                Err(e) => assert_eq!(Error::UnsupportedType(id), e),
            }
        }

        let documented = FixedLenType::ALL.len()
            + ByteLenType::ALL.len()
            + ShortLenType::ALL.len()
            + LongLenType::ALL.len();

        assert_eq!(42, documented);
        assert_eq!(documented, known);
    }

    #[test]
    fn categories() {
        let cases = [
            (0x38, LengthCategory::Fixed),
            (0x26, LengthCategory::ByteLen),
            (0x2a, LengthCategory::ByteLen),
            (0xe7, LengthCategory::ShortLen),
            (0x23, LengthCategory::LongLen),
            (0x62, LengthCategory::LongLen),
        ];

        for (id, category) in cases.iter() {
            assert_eq!(*category, DataType::try_from(*id).unwrap().category());
        }
    }

    #[test]
    fn fixed_reads_nothing() {
        let (res, pos) = resolve(0x3d, &[0xaa]);

        assert_eq!(TypeInfo::FixedLen(FixedLenType::Datetime), res.unwrap());
        assert_eq!(0, pos);
    }

    #[test]
    fn fixed_sizes() {
        let sizes: Vec<(u8, usize)> = FixedLenType::ALL
            .iter()
            .map(|ty| (*ty as u8, ty.size()))
            .collect();

        assert_eq!(
            vec![
                (0x1f, 0),
                (0x30, 1),
                (0x32, 1),
                (0x34, 2),
                (0x38, 4),
                (0x3a, 4),
                (0x3b, 4),
                (0x3c, 8),
                (0x3d, 8),
                (0x3e, 8),
                (0x7a, 4),
                (0x7f, 8),
            ],
            sizes
        );
    }

    #[test]
    fn date_has_no_header() {
        let (res, pos) = resolve(0x28, &[0xaa]);
        let ty = res.unwrap();

        assert_eq!(3, ty.size());
        assert_eq!(None, ty.scale());
        assert_eq!(0, pos);
    }

    #[test]
    fn time_family_sizes_follow_scale() {
        let cases = [
            (0x29, 0, 3),
            (0x29, 2, 3),
            (0x29, 4, 4),
            (0x29, 7, 5),
            (0x2a, 0, 6),
            (0x2a, 3, 7),
            (0x2a, 7, 8),
            (0x2b, 1, 8),
            (0x2b, 7, 10),
        ];

        for (id, scale, size) in cases.iter() {
            let (res, pos) = resolve(*id, &[*scale]);
            let ty = res.unwrap();

            assert_eq!(*size, ty.size(), "{:#04x} scale {}", id, scale);
            assert_eq!(Some(*scale), ty.scale());
            assert_eq!(1, pos);
        }
    }

    #[test]
    fn invalid_time_scale() {
        let (res, _) = resolve(0x29, &[8]);
        assert_eq!(Error::InvalidScale(8), res.unwrap_err());

        let (res, _) = resolve(0x2b, &[0xff]);
        assert_eq!(Error::InvalidScale(0xff), res.unwrap_err());
    }

    #[test]
    fn sized_byte_len() {
        let (res, pos) = resolve(0x26, &[4, 0xaa]);

        assert_eq!(
            TypeInfo::ByteLen {
                ty: ByteLenType::Intn,
                len: 4
            },
            res.unwrap()
        );
        assert_eq!(1, pos);
    }

    #[test]
    fn decimal_reads_precision_and_scale() {
        for id in [0x37u8, 0x3f, 0x6a, 0x6c].iter() {
            let (res, pos) = resolve(*id, &[17, 38, 10]);
            let ty = res.unwrap();

            assert_eq!(17, ty.size());
            assert_eq!(Some(38), ty.precision());
            assert_eq!(Some(10), ty.scale());
            assert_eq!(3, pos);
        }
    }

    #[test]
    fn short_len_character_reads_collation() {
        let (res, pos) = resolve(0xe7, &[0x64, 0x00, 0x09, 0x04, 0xd0, 0x00, 0x34]);
        let ty = res.unwrap();

        assert_eq!(100, ty.size());
        assert_eq!(Some(Collation::new(0x00d0_0409, 0x34)), ty.collation());
        assert_eq!("nvarchar(50)", ty.to_string());
        assert_eq!(7, pos);
    }

    #[test]
    fn short_len_binary_has_no_collation() {
        let (res, pos) = resolve(0xa5, &[0x10, 0x00, 0xaa]);
        let ty = res.unwrap();

        assert_eq!(16, ty.size());
        assert_eq!(None, ty.collation());
        assert_eq!(2, pos);
    }

    #[test]
    fn max_length_is_unsupported() {
        let (res, _) = resolve(0xa7, &[0xff, 0xff, 0x09, 0x04, 0xd0, 0x00, 0x34]);
        assert!(matches!(res.unwrap_err(), Error::UnsupportedEncoding(_)));

        let (res, _) = resolve(0xa5, &[0xff, 0xff]);
        assert!(matches!(res.unwrap_err(), Error::UnsupportedEncoding(_)));
    }

    #[test]
    fn xml_and_udt_are_unsupported() {
        for id in [0xf1u8, 0xf0].iter() {
            let (res, _) = resolve(*id, &[0x00, 0x00]);
            assert!(matches!(res.unwrap_err(), Error::UnsupportedEncoding(_)));
        }
    }

    #[test]
    fn long_len_text_reads_collation() {
        let mut header = 0x7fff_ffffi32.to_le_bytes().to_vec();
        header.extend_from_slice(&[0x09, 0x04, 0xd0, 0x00, 0x34]);

        let (res, pos) = resolve(0x23, &header);
        let ty = res.unwrap();

        assert_eq!(i32::MAX as usize, ty.size());
        assert!(ty.collation().is_some());
        assert_eq!(9, pos);
    }

    #[test]
    fn long_len_image_has_no_collation() {
        let (res, pos) = resolve(0x22, &0x7fff_ffffi32.to_le_bytes());

        assert_eq!(None, res.unwrap().collation());
        assert_eq!(4, pos);
    }

    #[test]
    fn unknown_type_id() {
        let (res, pos) = resolve(0x99, &[]);

        assert_eq!(Error::UnsupportedType(0x99), res.unwrap_err());
        assert_eq!(0, pos);
    }

    #[test]
    fn truncated_header() {
        let (res, _) = resolve(0xe7, &[0x64]);
        assert!(res.unwrap_err().is_truncated());
    }

    #[test]
    fn decode_reads_the_type_id() {
        let mut src = Cursor::new(vec![0x6a, 9, 18, 2]);
        let ty = TypeInfo::decode(&mut src).unwrap();

        assert_eq!("decimal(18,2)", ty.to_string());
        assert_eq!(0x6a, ty.id());
        assert_eq!(4, src.position());
    }
}
