use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::interval::Interval;

/// Hours already spent inside the committed low-cost window during the
/// current static cycle. Persisted across runs and restarts; once the count
/// reaches the run duration, the scan stops for the rest of the cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct RunningQuota {
    pub hours_used: u32,

    /// Start of the last wall-clock hour that was counted.
    last_counted: Option<DateTime<Local>>,

    /// End boundary of the cycle the count belongs to.
    cycle_end: Option<DateTime<Local>>,
}

/// `Scanning → LowCostActive → Idle → Scanning` over one static cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum CycleState {
    #[display("scanning")]
    Scanning,

    #[display("low-cost active")]
    LowCostActive,

    #[display("idle")]
    Idle,
}

impl RunningQuota {
    /// Reset the count when the pass targets a new cycle.
    ///
    /// This fires at the previous cycle's end boundary, not at the next
    /// cycle's start: between the two the planner is already scanning the
    /// next cycle and a stale count must not idle it. During that gap the
    /// reported state is therefore `Scanning`, not `Idle`.
    pub fn roll_over(&mut self, cycle: Interval) {
        if self.cycle_end != Some(cycle.end) {
            self.hours_used = 0;
            self.last_counted = None;
            self.cycle_end = Some(cycle.end);
        }
    }

    /// Count at most one hour per wall-clock hour change: ticks landing in
    /// the same hour must not double-count.
    pub fn count_hour(&mut self, now: DateTime<Local>, in_low_window: bool) {
        if !in_low_window {
            return;
        }
        let hour = hour_of(now);
        if self.last_counted != Some(hour) {
            self.hours_used += 1;
            self.last_counted = Some(hour);
        }
    }

    #[must_use]
    pub const fn state(&self, duration_hours: u32, in_low_window: bool) -> CycleState {
        if self.hours_used >= duration_hours {
            CycleState::Idle
        } else if in_low_window {
            CycleState::LowCostActive
        } else {
            CycleState::Scanning
        }
    }
}

fn hour_of(now: DateTime<Local>) -> DateTime<Local> {
    now.with_minute(0)
        .and_then(|time| time.with_second(0))
        .and_then(|time| time.with_nanosecond(0))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 27, hour, minute, 0).unwrap()
    }

    fn cycle() -> Interval {
        Interval::new(at(8, 0), at(16, 0))
    }

    #[test]
    fn test_same_hour_is_counted_once() {
        let mut quota = RunningQuota::default();
        quota.roll_over(cycle());
        quota.count_hour(at(9, 5), true);
        quota.count_hour(at(9, 55), true);
        assert_eq!(quota.hours_used, 1);
        quota.count_hour(at(10, 0), true);
        assert_eq!(quota.hours_used, 2);
    }

    #[test]
    fn test_outside_window_is_not_counted() {
        let mut quota = RunningQuota::default();
        quota.roll_over(cycle());
        quota.count_hour(at(9, 0), false);
        assert_eq!(quota.hours_used, 0);
    }

    #[test]
    fn test_new_cycle_resets_the_count() {
        let mut quota = RunningQuota::default();
        quota.roll_over(cycle());
        quota.count_hour(at(9, 0), true);
        quota.count_hour(at(10, 0), true);
        assert_eq!(quota.hours_used, 2);

        let next = Interval::new(cycle().start + TimeDelta::days(1), cycle().end + TimeDelta::days(1));
        quota.roll_over(next);
        assert_eq!(quota.hours_used, 0);

        // Same cycle again: nothing resets.
        quota.count_hour(at(9, 0), true);
        quota.roll_over(next);
        assert_eq!(quota.hours_used, 1);
    }

    #[test]
    fn test_met_quota_does_not_idle_the_next_cycle() {
        let mut quota = RunningQuota::default();
        quota.roll_over(cycle());
        quota.count_hour(at(9, 0), true);
        quota.count_hour(at(10, 0), true);
        assert_eq!(quota.state(2, false), CycleState::Idle);

        // Past the end boundary the pass resolves the next cycle; rolling
        // over must reset the count so its scan is not skipped.
        let next = Interval::new(cycle().start + TimeDelta::days(1), cycle().end + TimeDelta::days(1));
        quota.roll_over(next);
        assert_eq!(quota.state(2, false), CycleState::Scanning);
        assert_eq!(quota.hours_used, 0);
    }

    #[test]
    fn test_state_transitions() {
        let mut quota = RunningQuota::default();
        quota.roll_over(cycle());
        assert_eq!(quota.state(2, false), CycleState::Scanning);
        quota.count_hour(at(9, 0), true);
        assert_eq!(quota.state(2, true), CycleState::LowCostActive);
        quota.count_hour(at(10, 0), true);
        assert_eq!(quota.state(2, true), CycleState::Idle);
    }
}
