use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;

use crate::{
    core::{interval::Interval, point::PricePoint, window::PriceWindow},
    prelude::*,
};

/// Chronologically ordered spot prices spanning today and, once published,
/// tomorrow.
///
/// Rebuilt in full from the upstream snapshot on every pass and never mutated
/// afterwards. Slots are nominally hourly; gaps are tolerated.
#[must_use]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Slot length assumed for the last point and for "which slot is it now"
    /// lookups.
    pub const SLOT: TimeDelta = TimeDelta::hours(1);

    pub fn try_new(points: Vec<PricePoint>) -> Result<Self> {
        ensure!(!points.is_empty(), "the price series is empty");
        ensure!(
            points.iter().tuple_windows().all(|(a, b)| a.start < b.start),
            "price points are not strictly increasing in time",
        );
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// End of the last slot.
    #[must_use]
    pub fn end(&self) -> DateTime<Local> {
        self.points[self.points.len() - 1].start + Self::SLOT
    }

    #[must_use]
    pub fn covers(&self, interval: Interval) -> bool {
        self.points[0].start <= interval.start && self.end() >= interval.end
    }

    /// Index of the slot containing `at`, or of the first later slot.
    #[must_use]
    pub fn index_at(&self, at: DateTime<Local>) -> Option<usize> {
        self.points.iter().position(|point| point.start + Self::SLOT > at)
    }

    /// Price of the slot containing `at`, if known.
    #[must_use]
    pub fn price_at(&self, at: DateTime<Local>) -> Option<f64> {
        let point = &self.points[self.index_at(at)?];
        (point.start <= at).then_some(point.value).flatten()
    }

    /// Mean over the non-null points of the whole series.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        let values = self.points.iter().filter_map(|point| point.value).collect_vec();
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Window of up to `len` slots starting at `index`, clamped to the end of
    /// the series.
    pub fn window(&self, index: usize, len: usize) -> PriceWindow<'_> {
        let end = (index + len).min(self.points.len());
        PriceWindow::new(&self.points[index..end])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    use super::*;

    fn hour(h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 27, h, 0, 0).unwrap()
    }

    fn series(values: &[Option<f64>]) -> PriceSeries {
        PriceSeries::try_new(
            values
                .iter()
                .enumerate()
                .map(|(index, value)| PricePoint::new(hour(index as u32), *value))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_unordered() {
        let points =
            vec![PricePoint::new(hour(2), Some(1.0)), PricePoint::new(hour(1), Some(2.0))];
        assert!(PriceSeries::try_new(points).is_err());
    }

    #[test]
    fn test_rejects_duplicate_starts() {
        let points =
            vec![PricePoint::new(hour(1), Some(1.0)), PricePoint::new(hour(1), Some(2.0))];
        assert!(PriceSeries::try_new(points).is_err());
    }

    #[test]
    fn test_average_skips_nulls() {
        let series = series(&[Some(1.0), None, Some(3.0)]);
        assert_relative_eq!(series.average().unwrap(), 2.0);
    }

    #[test]
    fn test_price_at_mid_slot() {
        let series = series(&[Some(1.0), Some(2.0)]);
        let at = hour(1) + TimeDelta::minutes(30);
        assert_relative_eq!(series.price_at(at).unwrap(), 2.0);
    }

    #[test]
    fn test_price_at_before_series_is_none() {
        let series = PriceSeries::try_new(vec![PricePoint::new(hour(5), Some(1.0))]).unwrap();
        assert_eq!(series.price_at(hour(3)), None);
    }

    #[test]
    fn test_covers() {
        let series = series(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert!(series.covers(Interval::new(hour(0), hour(3))));
        assert!(!series.covers(Interval::new(hour(0), hour(4))));
    }

    #[test]
    fn test_window_is_clamped() {
        let series = series(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(series.window(2, 5).len(), 1);
    }
}
