//! ENTSO-e sensor attribute shape: the same data as Nordpool publishes, but
//! as one flat list with renamed fields.

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
    prices: Vec<HourlyPrice>,
}

#[derive(Debug, Deserialize)]
struct HourlyPrice {
    time: DateTime<Local>,
    price: Option<f64>,
}

impl Attributes {
    pub fn try_from_state(state: &EntityState) -> Result<Self> {
        serde_json::from_value(state.attributes.clone())
            .context("unexpected ENTSO-e attribute shape")
    }

    pub fn into_series(self) -> Result<PriceSeries> {
        PriceSeries::try_new(
            self.prices
                .into_iter()
                .map(|hourly| PricePoint::new(hourly.time, hourly.price))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_are_normalized() -> Result {
        // language=JSON
        const ATTRIBUTES: &str = r#"
            {
                "prices": [
                    {"time": "2026-08-27T00:00:00+02:00", "price": 0.09},
                    {"time": "2026-08-27T01:00:00+02:00", "price": null}
                ]
            }
        "#;
        let series = serde_json::from_str::<Attributes>(ATTRIBUTES)?.into_series()?;
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].value, Some(0.09));
        assert_eq!(series.points()[1].value, None);
        Ok(())
    }
}
