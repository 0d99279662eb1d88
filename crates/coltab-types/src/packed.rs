//! Packed temporal encodings.
//!
//! Dates, times, and date-times are stored as plain integers whose numeric
//! order matches chronological order, so indexes and comparators treat them
//! exactly like integer columns.

/// Pack a calendar date as `year << 16 | month << 8 | day`.
#[must_use]
pub const fn pack_date(year: i16, month: u8, day: u8) -> i32 {
    ((year as i32) << 16) | ((month as i32) << 8) | day as i32
}

/// Inverse of [`pack_date`].
#[must_use]
pub const fn unpack_date(packed: i32) -> (i16, u8, u8) {
    ((packed >> 16) as i16, ((packed >> 8) & 0xFF) as u8, (packed & 0xFF) as u8)
}

/// Pack a time of day as milliseconds since midnight.
#[must_use]
pub const fn pack_time(hour: u8, minute: u8, second: u8, millis: u16) -> i32 {
    ((hour as i32 * 60 + minute as i32) * 60 + second as i32) * 1000 + millis as i32
}

/// Inverse of [`pack_time`].
#[must_use]
pub const fn unpack_time(packed: i32) -> (u8, u8, u8, u16) {
    let millis = (packed % 1000) as u16;
    let secs = packed / 1000;
    ((secs / 3600) as u8, ((secs / 60) % 60) as u8, (secs % 60) as u8, millis)
}

/// Pack a date-time with the packed date in the high 32 bits.
#[must_use]
pub const fn pack_date_time(date: i32, time: i32) -> i64 {
    ((date as i64) << 32) | (time as u32 as i64)
}

/// Split a packed date-time into `(packed_date, packed_time)`.
#[must_use]
pub const fn unpack_date_time(packed: i64) -> (i32, i32) {
    ((packed >> 32) as i32, packed as u32 as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_dates_sort_chronologically() {
        let a = pack_date(2019, 12, 31);
        let b = pack_date(2020, 1, 1);
        let c = pack_date(2020, 1, 2);
        assert!(a < b && b < c);
        assert_eq!(unpack_date(b), (2020, 1, 1));
    }

    #[test]
    fn packed_times_sort_chronologically() {
        let noon = pack_time(12, 0, 0, 0);
        let later = pack_time(12, 0, 0, 1);
        assert!(noon < later);
        assert_eq!(unpack_time(pack_time(23, 59, 58, 999)), (23, 59, 58, 999));
    }

    #[test]
    fn date_time_orders_by_date_then_time() {
        let d1 = pack_date_time(pack_date(2020, 5, 1), pack_time(23, 0, 0, 0));
        let d2 = pack_date_time(pack_date(2020, 5, 2), pack_time(1, 0, 0, 0));
        assert!(d1 < d2);
        assert_eq!(
            unpack_date_time(d2),
            (pack_date(2020, 5, 2), pack_time(1, 0, 0, 0))
        );
    }
}
