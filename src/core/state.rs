use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local, TimeDelta};

use crate::core::{
    interval::Interval,
    planner::{PlanOutcome, WindowResult},
};

/// Three-way sensor value, mirroring the host platform's distinction between
/// "never computed" and "computed but not derivable".
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SensorValue<T> {
    Unknown,
    Unavailable,
    Value(T),
}

impl<T> SensorValue<T> {
    pub fn from_option(option: Option<T>) -> Self {
        option.map_or(Self::Unavailable, Self::Value)
    }
}

impl<T: Display> Display for SensorValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
            Self::Value(value) => value.fmt(f),
        }
    }
}

/// Published snapshot of one window result.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct WindowState {
    pub starts_at: SensorValue<DateTime<Local>>,
    pub cost_at: SensorValue<f64>,
    pub now_cost_rate: SensorValue<f64>,
}

impl WindowState {
    pub const fn unknown() -> Self {
        Self {
            starts_at: SensorValue::Unknown,
            cost_at: SensorValue::Unknown,
            now_cost_rate: SensorValue::Unknown,
        }
    }

    pub fn from_result(result: &WindowResult) -> Self {
        Self {
            starts_at: SensorValue::Value(result.starts_at),
            cost_at: SensorValue::Value(result.average),
            now_cost_rate: SensorValue::from_option(result.now_cost_ratio),
        }
    }
}

/// Everything one pass publishes. Replaced as a whole, never field by field,
/// so readers always see one consistent pass.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct PlannerState {
    pub low_cost: WindowState,
    pub high_cost: WindowState,
    pub low_cost_now: SensorValue<bool>,
    pub hours_used: u32,
}

impl PlannerState {
    pub const fn unknown() -> Self {
        Self {
            low_cost: WindowState::unknown(),
            high_cost: WindowState::unknown(),
            low_cost_now: SensorValue::Unknown,
            hours_used: 0,
        }
    }

    pub fn from_outcome(
        outcome: &PlanOutcome,
        now: DateTime<Local>,
        duration_hours: u32,
        hours_used: u32,
    ) -> Self {
        Self {
            low_cost: WindowState::from_result(&outcome.lowest),
            high_cost: WindowState::from_result(&outcome.highest),
            low_cost_now: SensorValue::Value(low_window(outcome, duration_hours).contains(now)),
            hours_used,
        }
    }
}

/// The active low-cost run: `[starts_at, starts_at + duration)`.
pub fn low_window(outcome: &PlanOutcome, duration_hours: u32) -> Interval {
    Interval::new(
        outcome.lowest.starts_at,
        outcome.lowest.starts_at + TimeDelta::hours(i64::from(duration_hours)),
    )
}
