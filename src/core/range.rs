use chrono::{DateTime, Days, Local, MappedLocalTime, NaiveDate, NaiveTime, TimeDelta, TimeZone};

use crate::core::interval::Interval;

/// Search-range selection for one planning pass.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub enum SearchMode {
    Moving { search_length_hours: u32 },
    Static { start_hour: u32, end_hour: u32 },
}

/// The eligible scan range plus the full cycle it belongs to.
///
/// For a moving planner the two coincide. For a static planner the cycle is
/// the unclamped daily range used for quota bookkeeping, while the scan range
/// never starts in the past.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct ResolvedRange {
    pub scan: Interval,
    pub cycle: Interval,
}

impl SearchMode {
    pub fn resolve(self, now: DateTime<Local>) -> ResolvedRange {
        match self {
            Self::Moving { search_length_hours } => {
                let range =
                    Interval::new(now, now + TimeDelta::hours(i64::from(search_length_hours)));
                ResolvedRange { scan: range, cycle: range }
            }
            Self::Static { start_hour, end_hour } => {
                let today = now.date_naive();
                let mut start = clock_hour(today, start_hour);
                // The end is always chronologically after the start: an
                // earlier clock hour means the range wraps past midnight.
                let mut end_date = if end_hour > start_hour { today } else { next_day(today) };
                let mut end = clock_hour(end_date, end_hour);
                if now >= end {
                    // This cycle is over, plan for the next one.
                    start = clock_hour(next_day(today), start_hour);
                    end_date = next_day(end_date);
                    end = clock_hour(end_date, end_hour);
                }
                let cycle = Interval::new(start, end);
                ResolvedRange { scan: Interval::new(start.max(now), end), cycle }
            }
        }
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap()
}

/// Local wall-clock time at a whole hour of the given day.
fn clock_hour(date: NaiveDate, hour: u32) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(hour));
    match naive.and_local_timezone(Local) {
        MappedLocalTime::Single(time) | MappedLocalTime::Ambiguous(time, _) => time,
        // Spring-forward gap: the configured hour does not exist on this day.
        MappedLocalTime::None => (naive + TimeDelta::hours(1))
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&naive)),
    }
}
