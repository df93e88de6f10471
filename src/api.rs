pub mod entsoe;
pub mod home_assistant;
pub mod nordpool;

use self::home_assistant::EntityState;
use crate::{core::series::PriceSeries, prelude::*};

/// Which attribute shape the price sensor publishes.
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum SourceShape {
    /// `raw_today`/`raw_tomorrow` lists of `{start, value}`.
    Nordpool,

    /// A flat `prices` list of `{time, price}`.
    Entsoe,
}

/// Normalize a sensor snapshot into the canonical price series, so the
/// planner never sees vendor-specific field names.
pub fn normalize(shape: SourceShape, state: &EntityState) -> Result<PriceSeries> {
    match shape {
        SourceShape::Nordpool => nordpool::Attributes::try_from_state(state)?.into_series(),
        SourceShape::Entsoe => entsoe::Attributes::try_from_state(state)?.into_series(),
    }
}
