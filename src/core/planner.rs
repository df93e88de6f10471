use bon::Builder;
use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        config::{PlannerConfig, PlannerType},
        error::PlanError,
        range::SearchMode,
        series::PriceSeries,
    },
    prelude::*,
};

/// One direction of the scan result.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    pub starts_at: DateTime<Local>,

    /// Average price over the window's non-null points.
    pub average: f64,

    /// Current price divided by the window average, when derivable.
    pub now_cost_ratio: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PassStatus {
    /// Candidates were scanned this pass.
    Scanned,

    /// Static quota already met: the committed window was reported unchanged.
    Idle,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct PlanOutcome {
    pub lowest: WindowResult,
    pub highest: WindowResult,
    pub status: PassStatus,
}

/// A candidate as seen by the scan. `average` is `None` when the window was
/// excluded because nulls were in the majority.
#[derive(Copy, Clone, Debug)]
pub struct Candidate {
    pub starts_at: DateTime<Local>,
    pub average: Option<f64>,
}

/// The scan-and-select core: pure in `(series, now, previous, hours_used)`,
/// no side effects, bounded by the series length.
#[derive(Builder)]
#[must_use]
pub struct Planner {
    pub duration_hours: u32,
    pub mode: SearchMode,
    pub accept_cost: Option<f64>,
    pub accept_rate: Option<f64>,
}

impl Planner {
    pub fn try_from_config(config: PlannerConfig) -> Result<Self, PlanError> {
        let duration_hours =
            config.duration_hours.ok_or(PlanError::MissingParameter("duration-hours"))?;
        if duration_hours < 1 {
            return Err(PlanError::InvalidParameter {
                name: "duration-hours",
                value: duration_hours.to_string(),
            });
        }
        let mode = match config.planner_type {
            PlannerType::Moving => {
                let search_length_hours = config
                    .search_length_hours
                    .ok_or(PlanError::MissingParameter("search-length-hours"))?;
                if search_length_hours < duration_hours {
                    // Configuration health check, not an error: the first
                    // candidate is evaluated regardless.
                    warn!(
                        search_length_hours,
                        duration_hours, "the search length is shorter than the run duration",
                    );
                }
                SearchMode::Moving { search_length_hours }
            }
            PlannerType::Static => SearchMode::Static {
                start_hour: config.start_hour.ok_or(PlanError::MissingParameter("start-hour"))?,
                end_hour: config.end_hour.ok_or(PlanError::MissingParameter("end-hour"))?,
            },
        };
        Ok(Self {
            duration_hours,
            mode,
            accept_cost: config.accept_cost,
            accept_rate: config.accept_rate,
        })
    }

    /// Run one planning pass.
    #[instrument(skip_all, fields(now = %now, hours_used))]
    pub fn plan(
        &self,
        series: &PriceSeries,
        now: DateTime<Local>,
        previous: Option<&PlanOutcome>,
        hours_used: u32,
    ) -> Result<PlanOutcome, PlanError> {
        if matches!(self.mode, SearchMode::Static { .. })
            && hours_used >= self.duration_hours
            && let Some(previous) = previous
        {
            // Quota met for this cycle: report the committed window as still
            // pending and evaluate nothing.
            debug!("quota met, skipping the scan");
            return Ok(PlanOutcome { status: PassStatus::Idle, ..*previous });
        }

        let candidates = self.candidates(series, now)?;
        let valid: Vec<(DateTime<Local>, f64)> = candidates
            .iter()
            .filter_map(|candidate| candidate.average.map(|average| (candidate.starts_at, average)))
            .collect();
        if valid.is_empty() {
            return Err(PlanError::NoEligibleWindow);
        }

        let series_average = series.average();
        let mut lowest = valid[0];
        for candidate in &valid {
            if candidate.1 < lowest.1 {
                lowest = *candidate;
                trace!(starts_at = %lowest.0, average = lowest.1, "new minimum");
            }
            // The shortcuts are tested against the best-so-far average, so a
            // good-enough window stops the scan before later candidates are
            // ever examined.
            if self.accepts(lowest.1, series_average) {
                debug!(starts_at = %lowest.0, average = lowest.1, "window accepted early");
                break;
            }
        }

        // The highest-cost window has no accept shortcut and always sees the
        // full candidate list.
        let mut highest = valid[0];
        for candidate in &valid[1..] {
            if candidate.1 > highest.1 {
                highest = *candidate;
            }
        }

        let current_price = series.price_at(now);
        Ok(PlanOutcome {
            lowest: Self::into_result(lowest, current_price),
            highest: Self::into_result(highest, current_price),
            status: PassStatus::Scanned,
        })
    }

    /// Enumerate candidate windows hour-by-hour across the eligible range.
    ///
    /// The first candidate is evaluated even when it overruns the range end,
    /// so a range narrower than the run duration still yields a result.
    pub fn candidates(
        &self,
        series: &PriceSeries,
        now: DateTime<Local>,
    ) -> Result<Vec<Candidate>, PlanError> {
        let range = self.mode.resolve(now).scan;
        if !series.covers(range) {
            return Err(PlanError::InsufficientData { covered_until: series.end(), needed: range });
        }
        let first_index = series.index_at(range.start).ok_or(PlanError::NoEligibleWindow)?;
        let duration = TimeDelta::hours(i64::from(self.duration_hours));

        let mut candidates = Vec::new();
        for index in first_index..series.len() {
            let starts_at = series.points()[index].start;
            if index > first_index && starts_at + duration > range.end {
                break;
            }
            let window = series.window(index, self.duration_hours as usize);
            candidates.push(Candidate { starts_at, average: window.average() });
        }
        if candidates.is_empty() {
            return Err(PlanError::NoEligibleWindow);
        }
        Ok(candidates)
    }

    fn accepts(&self, best_average: f64, series_average: Option<f64>) -> bool {
        if self.accept_cost.is_some_and(|cost| best_average <= cost) {
            return true;
        }
        match (self.accept_rate, series_average) {
            (Some(rate), Some(series_average)) if series_average > 0.0 => {
                best_average / series_average <= rate
            }
            // Non-positive series average: the ratio comparison degenerates,
            // accept only a window that is itself non-positive.
            (Some(_), Some(_)) => best_average <= 0.0,
            _ => false,
        }
    }

    fn into_result(
        (starts_at, average): (DateTime<Local>, f64),
        current_price: Option<f64>,
    ) -> WindowResult {
        let now_cost_ratio =
            current_price.and_then(|price| (average != 0.0).then(|| price / average));
        WindowResult { starts_at, average, now_cost_ratio }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::core::point::PricePoint;

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

    fn moving(duration_hours: u32, search_length_hours: u32) -> Planner {
        Planner::builder()
            .duration_hours(duration_hours)
            .mode(SearchMode::Moving { search_length_hours })
            .build()
    }

    #[test]
    fn test_equal_prices_give_equal_extremes() {
        let series = series(&[Some(2.0); 8]);
        let outcome = moving(2, 6).plan(&series, hour(0), None, 0).unwrap();
        assert_relative_eq!(outcome.lowest.average, outcome.highest.average);
    }

    #[test]
    fn test_extremes_bound_every_candidate() {
        let series = series(&[Some(5.0), Some(1.0), Some(4.0), Some(2.0), Some(3.0), Some(6.0)]);
        let planner = moving(2, 4);
        let outcome = planner.plan(&series, hour(0), None, 0).unwrap();
        for candidate in planner.candidates(&series, hour(0)).unwrap() {
            let average = candidate.average.unwrap();
            assert!(outcome.lowest.average <= average);
            assert!(average <= outcome.highest.average);
        }
    }

    #[test]
    fn test_plan_is_idempotent() {
        let series = series(&[Some(5.0), Some(1.0), Some(4.0), Some(2.0), Some(3.0), Some(6.0)]);
        let planner = moving(2, 4);
        let first = planner.plan(&series, hour(0), None, 0).unwrap();
        let second = planner.plan(&series, hour(0), None, 0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_majority_window_is_never_selected() {
        // The window at hour 2 has the extremal partial average 0.1, but two
        // of its three points are null, so it must not be a candidate.
        let series = series(&[Some(5.0), Some(5.0), None, None, Some(0.1), Some(5.0)]);
        let planner = moving(3, 5);
        let candidates = planner.candidates(&series, hour(0)).unwrap();
        assert_eq!(candidates[1].average, None);
        assert_eq!(candidates[2].average, None);
        let outcome = planner.plan(&series, hour(0), None, 0).unwrap();
        assert_eq!(outcome.lowest.starts_at, hour(0));
        assert_relative_eq!(outcome.lowest.average, 5.0);
    }

    #[test]
    fn test_accept_cost_stops_the_scan() {
        let series = series(&[Some(5.0), Some(5.0), Some(1.0), Some(0.5), Some(5.0)]);
        let planner = Planner::builder()
            .duration_hours(1)
            .mode(SearchMode::Moving { search_length_hours: 5 })
            .accept_cost(2.0)
            .build();
        let outcome = planner.plan(&series, hour(0), None, 0).unwrap();
        // Index 3 is cheaper still, but the scan stopped at index 2.
        assert_eq!(outcome.lowest.starts_at, hour(2));
        assert_relative_eq!(outcome.lowest.average, 1.0);
    }

    #[test]
    fn test_accept_rate_degenerates_on_zero_series_average() {
        // The series averages exactly zero, so the ratio test must accept a
        // zero window and keep scanning past a positive one.
        let series = series(&[Some(0.01), Some(0.0), Some(-0.01)]);
        let planner = Planner::builder()
            .duration_hours(1)
            .mode(SearchMode::Moving { search_length_hours: 3 })
            .accept_rate(0.0)
            .build();
        let outcome = planner.plan(&series, hour(0), None, 0).unwrap();
        assert_eq!(outcome.lowest.starts_at, hour(1));
        assert_relative_eq!(outcome.lowest.average, 0.0);
    }

    #[test]
    fn test_first_candidate_survives_a_narrow_range() {
        let series = series(&[Some(1.0); 24]);
        let planner = Planner::builder()
            .duration_hours(5)
            .mode(SearchMode::Static { start_hour: 8, end_hour: 11 })
            .build();
        let outcome = planner.plan(&series, hour(7), None, 0).unwrap();
        assert_eq!(outcome.lowest.starts_at, hour(8));
        assert_eq!(outcome.highest.starts_at, hour(8));
        assert_eq!(planner.candidates(&series, hour(7)).unwrap().len(), 1);
    }

    #[test]
    fn test_met_quota_returns_previous_without_scanning() {
        let planner = Planner::builder()
            .duration_hours(2)
            .mode(SearchMode::Static { start_hour: 8, end_hour: 16 })
            .build();
        let previous = PlanOutcome {
            lowest: WindowResult { starts_at: hour(9), average: 1.5, now_cost_ratio: None },
            highest: WindowResult { starts_at: hour(14), average: 4.0, now_cost_ratio: None },
            status: PassStatus::Scanned,
        };
        // This series is far too short to scan, so any candidate evaluation
        // would fail loudly.
        let series = series(&[Some(1.0)]);
        let outcome = planner.plan(&series, hour(10), Some(&previous), 2).unwrap();
        assert_eq!(outcome.status, PassStatus::Idle);
        assert_eq!(outcome.lowest, previous.lowest);
        assert_eq!(outcome.highest, previous.highest);
    }

    #[test]
    fn test_zero_average_window_has_no_ratio() {
        let series = series(&[Some(0.0), Some(0.0), Some(0.0)]);
        let outcome = moving(1, 3).plan(&series, hour(0), None, 0).unwrap();
        assert_eq!(outcome.lowest.now_cost_ratio, None);
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let series = series(&[Some(1.0), Some(2.0)]);
        let error = moving(1, 12).plan(&series, hour(0), None, 0).unwrap_err();
        assert!(matches!(error, PlanError::InsufficientData { .. }));
    }

    #[test]
    fn test_all_null_series_has_no_eligible_window() {
        let series = series(&[None, None, None]);
        let error = moving(1, 3).plan(&series, hour(0), None, 0).unwrap_err();
        assert!(matches!(error, PlanError::NoEligibleWindow));
    }

    #[test]
    fn test_missing_duration_is_a_configuration_error() {
        let config = PlannerConfig {
            planner_type: PlannerType::Moving,
            duration_hours: None,
            search_length_hours: Some(6),
            start_hour: None,
            end_hour: None,
            accept_cost: None,
            accept_rate: None,
        };
        assert!(matches!(
            Planner::try_from_config(config),
            Err(PlanError::MissingParameter("duration-hours")),
        ));
    }

    #[test]
    fn test_zero_duration_is_an_invalid_value() {
        let config = PlannerConfig {
            planner_type: PlannerType::Moving,
            duration_hours: Some(0),
            search_length_hours: Some(6),
            start_hour: None,
            end_hour: None,
            accept_cost: None,
            accept_rate: None,
        };
        assert!(matches!(
            Planner::try_from_config(config),
            Err(PlanError::InvalidParameter { name: "duration-hours", .. }),
        ));
    }
}
