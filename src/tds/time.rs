//! Date and time decoding.
//!
//! The server sends temporal values in a handful of layouts, all of them
//! little-endian:
//!
//! - `smalldatetime`: `u16` days since 1900-01-01, `u16` minutes since
//!   midnight.
//! - `datetime`: `i32` days since 1900-01-01 (negative back to 1753),
//!   `u32` ticks of 1/300 second since midnight.
//! - `date`: three bytes of days since 0001-01-01.
//! - `time`: three to five bytes of 10^-n second increments since midnight,
//!   `n` being the column scale.
//! - `datetime2`: a `time` followed by a `date`.
//! - `datetimeoffset`: a `datetime2` in UTC followed by an `i16` offset in
//!   minutes.
//!
//! Results are [`chrono`] values on the proleptic Gregorian calendar. Only
//! `datetimeoffset` carries a zone; everything else is naive.
//!
//! [`chrono`]: https://docs.rs/chrono

use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian};
pub use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use chrono::{Duration, TimeZone};

/// `datetime` counts time of day in 1/300 second ticks.
const TICKS_PER_SECOND: u32 = 300;

#[inline]
fn from_days(days: i64, start_year: i32) -> crate::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(start_year, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(days)))
        .ok_or_else(|| {
            Error::Conversion(
                format!("{} days from year {} is out of range", days, start_year).into(),
            )
        })
}

#[inline]
fn at_time(date: NaiveDate, secs: u64, nanos: u32) -> crate::Result<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.checked_add_signed(Duration::seconds(secs as i64)))
        .and_then(|dt| dt.checked_add_signed(Duration::nanoseconds(nanos as i64)))
        .ok_or_else(|| {
            Error::Conversion(format!("{} + {}s is out of range", date, secs).into())
        })
}

#[inline]
fn expect_len(buf: &[u8], len: usize, ty: &str) -> crate::Result<()> {
    if buf.len() != len {
        return Err(Error::Protocol(
            format!("{}: length of {} is invalid", ty, buf.len()).into(),
        ));
    }

    Ok(())
}

/// Number of bytes the time component takes with the given scale.
pub fn time_len(scale: u8) -> crate::Result<usize> {
    Ok(match scale {
        0..=2 => 3,
        3..=4 => 4,
        5..=7 => 5,
        _ => return Err(Error::InvalidScale(scale)),
    })
}

/// Decodes a `smalldatetime` (four bytes).
pub fn decode_small_datetime(buf: &[u8]) -> crate::Result<NaiveDateTime> {
    expect_len(buf, 4, "smalldatetime")?;

    let days = LittleEndian::read_u16(&buf[0..2]);
    let minutes = LittleEndian::read_u16(&buf[2..4]);

    at_time(from_days(days as i64, 1900)?, minutes as u64 * 60, 0)
}

/// Decodes a `datetime` (eight bytes).
///
/// The sub-second part is computed as
/// `trunc((ticks % 300) * 10_000_000 / 3)` nanoseconds, which is how the
/// server rounds its 1/300 second ticks.
pub fn decode_datetime(buf: &[u8]) -> crate::Result<NaiveDateTime> {
    expect_len(buf, 8, "datetime")?;

    let days = LittleEndian::read_i32(&buf[0..4]);
    let ticks = LittleEndian::read_u32(&buf[4..8]);

    let secs = (ticks / TICKS_PER_SECOND) as u64;
    let nanos = ((ticks % TICKS_PER_SECOND) as u64 * 10_000_000 / 3) as u32;

    at_time(from_days(days as i64, 1900)?, secs, nanos)
}

/// Reads the three-byte day count of a `date`.
pub fn decode_date_int(buf: &[u8]) -> crate::Result<u32> {
    if buf.len() < 3 {
        return Err(Error::Protocol(
            format!("date: length of {} is invalid", buf.len()).into(),
        ));
    }

    Ok(buf[0] as u32 | (buf[1] as u32) << 8 | (buf[2] as u32) << 16)
}

/// Decodes a `date` (three bytes).
pub fn decode_date(buf: &[u8]) -> crate::Result<NaiveDate> {
    expect_len(buf, 3, "date")?;
    from_days(decode_date_int(buf)? as i64, 1)
}

/// Reads the increments of a `time` component, normalized to seconds and
/// nanoseconds since midnight.
///
/// Whatever the scale, the increments are first brought to 100 nanosecond
/// units by multiplying with `10^(7 - scale)`. A time of a day or more is a
/// protocol error.
pub fn decode_time_int(scale: u8, buf: &[u8]) -> crate::Result<(u64, u32)> {
    let len = time_len(scale)?;

    if buf.len() != len {
        return Err(Error::Protocol(
            format!("timen: length of {} is invalid for scale {}", buf.len(), scale).into(),
        ));
    }

    let acc = buf
        .iter()
        .rev()
        .fold(0u64, |acc, byte| acc << 8 | *byte as u64);

    let nanos = acc * 10u64.pow(7 - scale as u32) * 100;
    let secs = nanos / 1_000_000_000;

    if secs >= 86_400 {
        return Err(Error::Protocol(
            format!("timen: {} seconds exceed a day", secs).into(),
        ));
    }

    Ok((secs, (nanos % 1_000_000_000) as u32))
}

/// Decodes a `time` as a timestamp on 0001-01-01.
pub fn decode_time(scale: u8, buf: &[u8]) -> crate::Result<NaiveDateTime> {
    let (secs, nanos) = decode_time_int(scale, buf)?;
    at_time(from_days(0, 1)?, secs, nanos)
}

/// Decodes a `datetime2`: the time component followed by three date bytes.
pub fn decode_datetime2(scale: u8, buf: &[u8]) -> crate::Result<NaiveDateTime> {
    if buf.len() < 3 {
        return Err(Error::Protocol(
            format!("datetime2: length of {} is invalid", buf.len()).into(),
        ));
    }

    let (time, date) = buf.split_at(buf.len() - 3);
    let (secs, nanos) = decode_time_int(scale, time)?;
    let days = decode_date_int(date)?;

    at_time(from_days(days as i64, 1)?, secs, nanos)
}

/// Decodes a `datetimeoffset`: a UTC `datetime2` followed by the offset in
/// minutes.
pub fn decode_datetimeoffset(scale: u8, buf: &[u8]) -> crate::Result<DateTime<FixedOffset>> {
    if buf.len() < 5 {
        return Err(Error::Protocol(
            format!("datetimeoffset: length of {} is invalid", buf.len()).into(),
        ));
    }

    let (datetime2, offset) = buf.split_at(buf.len() - 2);
    let utc = decode_datetime2(scale, datetime2)?;
    let minutes = LittleEndian::read_i16(offset);

    let offset = FixedOffset::east_opt(minutes as i32 * 60).ok_or_else(|| {
        Error::Conversion(format!("datetimeoffset: offset of {} minutes", minutes).into())
    })?;

    Ok(offset.from_utc_datetime(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn datetime_bytes(days: i32, ticks: u32) -> Vec<u8> {
        let mut buf = days.to_le_bytes().to_vec();
        buf.extend_from_slice(&ticks.to_le_bytes());
        buf
    }

    fn date_bytes(date: NaiveDate) -> [u8; 3] {
        let days = date
            .signed_duration_since(NaiveDate::from_ymd_opt(1, 1, 1).unwrap())
            .num_days() as u32;
        let le = days.to_le_bytes();
        [le[0], le[1], le[2]]
    }

    #[test]
    fn small_datetime_epoch() {
        let dt = decode_small_datetime(&[0, 0, 0, 0]).unwrap();
        assert_eq!(ymd_hms(1900, 1, 1, 0, 0, 0), dt);
    }

    #[test]
    fn small_datetime_one_day_one_minute() {
        let dt = decode_small_datetime(&[1, 0, 1, 0]).unwrap();
        assert_eq!(ymd_hms(1900, 1, 2, 0, 1, 0), dt);
    }

    #[test]
    fn small_datetime_wrong_length() {
        let err = decode_small_datetime(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn datetime_full_second_has_no_fraction() {
        let dt = decode_datetime(&datetime_bytes(0, 300)).unwrap();

        assert_eq!(ymd_hms(1900, 1, 1, 0, 0, 1), dt);
        assert_eq!(0, chrono::Timelike::nanosecond(&dt));
    }

    #[test]
    fn datetime_half_second() {
        let dt = decode_datetime(&datetime_bytes(0, 150)).unwrap();
        assert_eq!(500_000_000, chrono::Timelike::nanosecond(&dt));
    }

    #[test]
    fn datetime_tick_rounding_truncates() {
        // 1 * 10_000_000 / 3 = 3_333_333.33...
        let dt = decode_datetime(&datetime_bytes(0, 1)).unwrap();
        assert_eq!(3_333_333, chrono::Timelike::nanosecond(&dt));

        // 2 * 10_000_000 / 3 = 6_666_666.66...
        let dt = decode_datetime(&datetime_bytes(0, 2)).unwrap();
        assert_eq!(6_666_666, chrono::Timelike::nanosecond(&dt));
    }

    #[test]
    fn datetime_negative_days() {
        let dt = decode_datetime(&datetime_bytes(-1, 300 * 60)).unwrap();
        assert_eq!(ymd_hms(1899, 12, 31, 0, 1, 0), dt);

        // 1753-01-01, the lower bound of the type
        let dt = decode_datetime(&datetime_bytes(-53690, 0)).unwrap();
        assert_eq!(ymd_hms(1753, 1, 1, 0, 0, 0), dt);
    }

    #[test]
    fn date_int_is_little_endian() {
        assert_eq!(0x030201, decode_date_int(&[1, 2, 3]).unwrap());
        assert!(decode_date_int(&[1, 2]).is_err());
    }

    #[test]
    fn date_from_year_one() {
        assert_eq!(
            NaiveDate::from_ymd_opt(1, 1, 1).unwrap(),
            decode_date(&[0, 0, 0]).unwrap()
        );

        let expected = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(expected, decode_date(&date_bytes(expected)).unwrap());
    }

    #[test]
    fn time_int_at_scale_seven_is_not_scaled() {
        // 1.5 seconds in 100ns ticks
        let ticks = 15_000_000u64.to_le_bytes();
        assert_eq!((1, 500_000_000), decode_time_int(7, &ticks[..5]).unwrap());
    }

    #[test]
    fn time_int_at_scale_zero_is_whole_seconds() {
        let secs = 3661u32.to_le_bytes();
        assert_eq!((3661, 0), decode_time_int(0, &secs[..3]).unwrap());
    }

    #[test]
    fn time_int_at_scale_three_is_millis() {
        let millis = 1_234u32.to_le_bytes();
        assert_eq!((1, 234_000_000), decode_time_int(3, &millis).unwrap());
    }

    #[test]
    fn time_int_rejects_bad_scale_and_length() {
        assert_eq!(Error::InvalidScale(8), decode_time_int(8, &[0; 5]).unwrap_err());
        assert!(matches!(
            decode_time_int(7, &[0; 3]).unwrap_err(),
            Error::Protocol(_)
        ));
    }

    #[test]
    fn time_int_rejects_a_full_day() {
        assert!(matches!(
            decode_time_int(7, &[0xff; 5]).unwrap_err(),
            Error::Protocol(_)
        ));

        let day = 86_400u32.to_le_bytes();
        assert!(decode_time_int(0, &day[..3]).is_err());

        let last = 86_399u32.to_le_bytes();
        assert_eq!((86_399, 0), decode_time_int(0, &last[..3]).unwrap());
    }

    #[test]
    fn time_lengths_by_scale() {
        let lens: Vec<usize> = (0..=7).map(|s| time_len(s).unwrap()).collect();
        assert_eq!(vec![3, 3, 3, 4, 4, 5, 5, 5], lens);
    }

    #[test]
    fn time_is_on_year_one() {
        let ticks = (13 * 3600 + 37 * 60 + 5) as u64 * 10_000_000;
        let dt = decode_time(7, &ticks.to_le_bytes()[..5]).unwrap();

        assert_eq!(ymd_hms(1, 1, 1, 13, 37, 5), dt);
    }

    #[test]
    fn datetime2_combines_time_and_date() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        let ticks = (8 * 3600) as u64 * 10_000_000 + 1;

        let mut buf = ticks.to_le_bytes()[..5].to_vec();
        buf.extend_from_slice(&date_bytes(date));

        let dt = decode_datetime2(7, &buf).unwrap();

        assert_eq!(date.and_hms_nano_opt(8, 0, 0, 100).unwrap(), dt);
    }

    #[test]
    fn datetimeoffset_applies_offset() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        let millis = (10 * 3600) as u32 * 1000;

        let mut buf = millis.to_le_bytes().to_vec();
        buf.extend_from_slice(&date_bytes(date));
        buf.extend_from_slice(&120i16.to_le_bytes());

        let dto = decode_datetimeoffset(3, &buf).unwrap();

        assert_eq!(ymd_hms(2021, 6, 15, 10, 0, 0), dto.naive_utc());
        assert_eq!(ymd_hms(2021, 6, 15, 12, 0, 0), dto.naive_local());
        assert_eq!(7200, dto.offset().local_minus_utc());
    }
}
