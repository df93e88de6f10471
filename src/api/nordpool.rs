//! Nordpool sensor attribute shape.

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::{
    api::home_assistant::EntityState,
    core::{point::PricePoint, series::PriceSeries},
    prelude::*,
};

#[must_use]
#[derive(Debug, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    raw_today: Vec<RawPrice>,

    #[serde(default)]
    raw_tomorrow: Vec<RawPrice>,

    /// Tomorrow's prices are published in the afternoon; until then the list
    /// is present but must be ignored.
    #[serde(default)]
    tomorrow_valid: bool,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    start: DateTime<Local>,
    value: Option<f64>,
}

impl Attributes {
    pub fn try_from_state(state: &EntityState) -> Result<Self> {
        serde_json::from_value(state.attributes.clone())
            .context("unexpected Nordpool attribute shape")
    }

    /// Today's prices followed by tomorrow's, once those are valid.
    pub fn into_series(self) -> Result<PriceSeries> {
        let mut points: Vec<PricePoint> =
            self.raw_today.into_iter().map(RawPrice::into_point).collect();
        if self.tomorrow_valid {
            points.extend(self.raw_tomorrow.into_iter().map(RawPrice::into_point));
        }
        PriceSeries::try_new(points)
    }
}

impl RawPrice {
    fn into_point(self) -> PricePoint {
        PricePoint::new(self.start, self.value)
    }
}
