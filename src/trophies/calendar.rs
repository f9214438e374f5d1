use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Maps instants to calendar days in the user's local time.
pub trait Calendar: Send + Sync {
    /// The local calendar day containing `instant`.
    fn day_of(&self, instant: OffsetDateTime) -> Date;

    /// Local midnight at the start of `day`.
    fn start_of_day(&self, day: Date) -> OffsetDateTime;

    /// `[start, end)` where `end` is the start of the following day.
    fn day_bounds(&self, day: Date) -> (OffsetDateTime, OffsetDateTime) {
        let start = self.start_of_day(day);
        let end = match day.next_day() {
            Some(next) => self.start_of_day(next),
            None => start + Duration::DAY,
        };
        (start, end)
    }

    /// Steps back `n` calendar days (not `n * 24h`). `None` past `Date::MIN`.
    fn days_before(&self, day: Date, n: u32) -> Option<Date> {
        day.checked_sub(Duration::days(i64::from(n)))
    }
}

/// Calendar with a fixed UTC offset for local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOffsetCalendar {
    offset: UtcOffset,
}

impl FixedOffsetCalendar {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(UtcOffset::UTC)
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Calendar for FixedOffsetCalendar {
    fn day_of(&self, instant: OffsetDateTime) -> Date {
        instant.to_offset(self.offset).date()
    }

    fn start_of_day(&self, day: Date) -> OffsetDateTime {
        day.midnight().assume_offset(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    #[test]
    fn day_of_uses_local_offset() {
        let cal = FixedOffsetCalendar::new(offset!(+03:00));
        // 22:30 UTC is already the next day at +03:00
        assert_eq!(cal.day_of(datetime!(2025-03-10 22:30 UTC)), date!(2025-03-11));
        assert_eq!(cal.day_of(datetime!(2025-03-10 20:59 UTC)), date!(2025-03-10));
    }

    #[test]
    fn day_bounds_are_local_midnights() {
        let cal = FixedOffsetCalendar::new(offset!(-05:00));
        let (start, end) = cal.day_bounds(date!(2025-03-10));
        assert_eq!(start, datetime!(2025-03-10 05:00 UTC));
        assert_eq!(end, datetime!(2025-03-11 05:00 UTC));
    }

    #[test]
    fn days_before_steps_calendar_days() {
        let cal = FixedOffsetCalendar::utc();
        assert_eq!(cal.days_before(date!(2025-03-02), 2), Some(date!(2025-02-28)));
        assert_eq!(cal.days_before(date!(2024-03-01), 1), Some(date!(2024-02-29)));
        assert_eq!(cal.days_before(date!(2025-03-02), 0), Some(date!(2025-03-02)));
        assert_eq!(cal.days_before(Date::MIN, 1), None);
    }

    /// Calendar whose offset changes on a given day, like a DST switch.
    struct SwitchingCalendar {
        switch_day: Date,
    }

    impl Calendar for SwitchingCalendar {
        fn day_of(&self, instant: OffsetDateTime) -> Date {
            instant.to_offset(offset!(+01:00)).date()
        }

        fn start_of_day(&self, day: Date) -> OffsetDateTime {
            let off = if day >= self.switch_day { offset!(+02:00) } else { offset!(+01:00) };
            day.midnight().assume_offset(off)
        }
    }

    #[test]
    fn day_bounds_follow_offset_change() {
        let cal = SwitchingCalendar { switch_day: date!(2025-03-30) };
        let (start, end) = cal.day_bounds(date!(2025-03-29));
        // 23h day: the next midnight comes an hour early in UTC terms
        assert_eq!(end - start, Duration::hours(23));
        assert_eq!(cal.days_before(date!(2025-03-31), 2), Some(date!(2025-03-29)));
    }
}
