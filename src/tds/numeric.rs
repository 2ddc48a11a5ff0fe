//! Representations of numeric types.

use crate::Error;
use byteorder::{ByteOrder, LittleEndian};
use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// A sql `decimal` / `numeric` value as it comes from the wire.
///
/// The magnitude is an unsigned integer of up to 128 bits, kept as four
/// 32-bit words with the least significant word first. The logical value is
/// `±magnitude / 10^scale`. Precision never exceeds 38 digits on the server,
/// which always fits the four words.
///
/// A recommended way of doing arithmetic with the value is enabling the
/// `rust_decimal` feature and converting into its `Decimal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    positive: bool,
    precision: u8,
    scale: u8,
    magnitude: [u32; 4],
}

impl Decimal {
    /// Maximum number of magnitude words.
    pub const MAX_WORDS: usize = 4;

    /// Creates a new decimal from its parts.
    pub fn new(positive: bool, precision: u8, scale: u8, magnitude: [u32; 4]) -> Self {
        Self {
            positive,
            precision,
            scale,
            magnitude,
        }
    }

    /// False for negative values.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// The declared precision of the column.
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The declared scale (number of fractional digits) of the column.
    #[inline]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// The magnitude words, least significant first.
    #[inline]
    pub fn magnitude(&self) -> [u32; 4] {
        self.magnitude
    }

    /// The magnitude as one unsigned integer.
    pub fn unsigned_value(&self) -> u128 {
        self.magnitude
            .iter()
            .rev()
            .fold(0u128, |acc, word| acc << 32 | *word as u128)
    }

    /// The signed, unscaled value. `None` if the magnitude does not fit an
    /// `i128`, which cannot happen within 38 digits of precision.
    pub fn to_i128(&self) -> Option<i128> {
        let value = i128::try_from(self.unsigned_value()).ok()?;
        Some(if self.positive { value } else { -value })
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let digits = self.unsigned_value().to_string();
        let scale = self.scale as usize;

        let digits = if digits.len() <= scale {
            format!("{:0>width$}", digits, width = scale + 1)
        } else {
            digits
        };

        if !self.positive && self.unsigned_value() != 0 {
            write!(f, "-")?;
        }

        let (int, frac) = digits.split_at(digits.len() - scale);

        if frac.is_empty() {
            write!(f, "{}", int)
        } else {
            write!(f, "{}.{}", int, frac)
        }
    }
}

impl From<Decimal> for f64 {
    fn from(dec: Decimal) -> f64 {
        let value = dec.unsigned_value() as f64 / 10f64.powi(dec.scale as i32);
        if dec.positive {
            value
        } else {
            -value
        }
    }
}

/// Decodes a `decimal` / `numeric` payload: one sign byte (nonzero is
/// positive, zero is negative) followed by the magnitude in little-endian
/// 32-bit words.
///
/// A trailing partial word is zero-extended, so the word count is the byte
/// count after the sign divided by four, rounded up.
pub fn decode_decimal(precision: u8, scale: u8, buf: &[u8]) -> crate::Result<Decimal> {
    let (sign, rest) = buf
        .split_first()
        .ok_or_else(|| Error::Protocol("decimal: empty payload".into()))?;

    if rest.len() > Decimal::MAX_WORDS * 4 {
        return Err(Error::Protocol(
            format!("decimal/numeric: invalid length of {} received", buf.len()).into(),
        ));
    }

    let mut magnitude = [0u32; 4];

    for (word, chunk) in magnitude.iter_mut().zip(rest.chunks(4)) {
        let mut bytes = [0u8; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        *word = LittleEndian::read_u32(&bytes);
    }

    Ok(Decimal::new(*sign != 0, precision, scale, magnitude))
}

/// A `money` or `smallmoney` value: a signed 64-bit integer counting
/// ten-thousandths.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Fractional digits of every money value.
    pub const SCALE: u8 = 4;

    /// Creates a money value from ten-thousandths.
    pub fn new(value: i64) -> Self {
        Money(value)
    }

    /// The value in ten-thousandths.
    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };

        write!(f, "{}{}.{:04}", sign, abs / 10_000, abs % 10_000)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> f64 {
        money.0 as f64 / 1e4
    }
}

/// Decodes an eight-byte `money`: the high 32 bits come first.
pub fn decode_money(buf: &[u8]) -> crate::Result<Money> {
    if buf.len() != 8 {
        return Err(Error::Protocol(
            format!("money: length of {} is invalid", buf.len()).into(),
        ));
    }

    let high = LittleEndian::read_i32(&buf[0..4]) as i64;
    let low = LittleEndian::read_u32(&buf[4..8]) as i64;

    Ok(Money(high << 32 | low))
}

/// Decodes a four-byte `smallmoney`.
pub fn decode_money4(buf: &[u8]) -> crate::Result<Money> {
    if buf.len() != 4 {
        return Err(Error::Protocol(
            format!("smallmoney: length of {} is invalid", buf.len()).into(),
        ));
    }

    Ok(Money(LittleEndian::read_i32(buf) as i64))
}

#[cfg(feature = "rust_decimal")]
mod decimal {
    use super::{Decimal, Money};
    use crate::Error;
    use std::convert::TryFrom;

    #[cfg_attr(feature = "docs", doc(cfg(feature = "rust_decimal")))]
    impl TryFrom<Decimal> for rust_decimal::Decimal {
        type Error = Error;

        fn try_from(dec: Decimal) -> crate::Result<Self> {
            let value = dec.to_i128().ok_or_else(|| {
                Error::Conversion(format!("decimal {} does not fit 128 bits", dec).into())
            })?;

            rust_decimal::Decimal::try_from_i128_with_scale(value, dec.scale() as u32)
                .map_err(|e| Error::Conversion(format!("decimal {}: {}", dec, e).into()))
        }
    }

    #[cfg_attr(feature = "docs", doc(cfg(feature = "rust_decimal")))]
    impl From<Money> for rust_decimal::Decimal {
        fn from(money: Money) -> Self {
            rust_decimal::Decimal::new(money.value(), Money::SCALE as u32)
        }
    }
}
