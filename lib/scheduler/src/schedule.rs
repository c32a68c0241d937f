//! Once-per-day schedule evaluation in local time.

use crate::error::ScheduleError;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A fixed local time-of-day at which generation fires once per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    /// Hour of day (24h).
    pub hour: u32,
    /// Minute.
    pub minute: u32,
}

impl DailySchedule {
    /// Creates a schedule, validating the time of day.
    ///
    /// # Errors
    ///
    /// Returns an error if hour or minute is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// The scheduled occurrence on a given date, if the local calendar has
    /// one (a DST gap can swallow it).
    fn occurrence_on(&self, date: NaiveDate) -> Option<DateTime<Local>> {
        date.and_hms_opt(self.hour, self.minute, 0)?
            .and_local_timezone(Local)
            .earliest()
    }

    /// Computes the next occurrence strictly after the given instant.
    #[must_use]
    pub fn next_after(&self, after: DateTime<Local>) -> DateTime<Local> {
        let mut date = after.date_naive();
        // A couple of days covers any DST gap.
        for _ in 0..4 {
            if let Some(candidate) = self.occurrence_on(date) {
                if candidate > after {
                    return candidate;
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        after + chrono::Duration::days(1)
    }
}

/// The UTC bounds `[start, end)` of the local calendar day containing
/// `now`, used to decide whether a record already exists for today.
#[must_use]
pub fn local_day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = now.date_naive();
    let next = date.succ_opt().unwrap_or(date);
    (midnight_utc(date), midnight_utc(next))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    naive
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn rejects_out_of_range_times() {
        assert!(DailySchedule::new(24, 0).is_err());
        assert!(DailySchedule::new(7, 60).is_err());
        assert!(DailySchedule::new(23, 59).is_ok());
    }

    #[test]
    fn next_occurrence_is_strictly_in_the_future() {
        let schedule = DailySchedule::new(7, 0).expect("valid");
        let now = Local::now();
        let next = schedule.next_after(now);

        assert!(next > now);
        assert_eq!(next.hour(), 7);
        assert_eq!(next.minute(), 0);
        // At most a day away, give or take a DST shift.
        assert!(next - now <= chrono::Duration::hours(25));
    }

    #[test]
    fn occurrence_at_exactly_the_scheduled_instant_moves_to_tomorrow() {
        let schedule = DailySchedule::new(7, 30).expect("valid");
        let now = Local::now();
        let first = schedule.next_after(now);
        let second = schedule.next_after(first);

        assert!(second > first);
        assert_eq!(second.date_naive(), first.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn day_bounds_contain_now_and_span_a_day() {
        let now = Local::now();
        let (from, to) = local_day_bounds(now);

        let now_utc = now.with_timezone(&Utc);
        assert!(from <= now_utc && now_utc < to);

        let span = to - from;
        assert!(span >= chrono::Duration::hours(23));
        assert!(span <= chrono::Duration::hours(25));
    }
}
