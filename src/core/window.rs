use chrono::{DateTime, Local};

use crate::core::point::PricePoint;

/// Contiguous slice of the price series considered as one candidate run.
#[derive(Copy, Clone)]
#[must_use]
pub struct PriceWindow<'a> {
    points: &'a [PricePoint],
}

impl<'a> PriceWindow<'a> {
    pub const fn new(points: &'a [PricePoint]) -> Self {
        Self { points }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Local>> {
        self.points.first().map(|point| point.start)
    }

    /// Mean over the non-null points.
    ///
    /// Returns `None` for an empty window and for a window where nulls are in
    /// the majority: such a window is not a candidate at all.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let n_nulls = self.points.iter().filter(|point| point.value.is_none()).count();
        if n_nulls * 2 > self.points.len() {
            return None;
        }
        let values: Vec<f64> = self.points.iter().filter_map(|point| point.value).collect();
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
