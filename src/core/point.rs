use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One spot-price slot.
///
/// A `None` value is an upstream data gap, not an error: upstream sensors
/// occasionally publish null prices for individual hours.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub start: DateTime<Local>,
    pub value: Option<f64>,
}

impl PricePoint {
    pub const fn new(start: DateTime<Local>, value: Option<f64>) -> Self {
        Self { start, value }
    }
}
