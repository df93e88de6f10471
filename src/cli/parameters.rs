use clap::{Parser, value_parser};

use crate::{
    api::home_assistant::Api,
    core::{
        config::{PlannerConfig, PlannerType},
        error::PlanError,
    },
    prelude::*,
};

/// Planner parameters: local defaults plus optional helper entities that
/// override them at runtime, re-read on every pass.
#[derive(Parser)]
pub struct PlannerArgs {
    #[clap(long = "planner-type", env = "PLANNER_TYPE", value_enum, default_value = "moving")]
    pub planner_type: PlannerType,

    /// Length of the run window, in whole hours.
    #[clap(long = "duration-hours", env = "DURATION_HOURS")]
    pub duration_hours: Option<u32>,

    /// Moving planner: how far ahead of now to search, in whole hours.
    #[clap(long = "search-length-hours", env = "SEARCH_LENGTH_HOURS")]
    pub search_length_hours: Option<u32>,

    /// Static planner: clock hour the daily range opens at.
    #[clap(long = "start-hour", env = "START_HOUR", value_parser = value_parser!(u32).range(0..24))]
    pub start_hour: Option<u32>,

    /// Static planner: clock hour the daily range closes at.
    #[clap(long = "end-hour", env = "END_HOUR", value_parser = value_parser!(u32).range(0..24))]
    pub end_hour: Option<u32>,

    /// Accept the best window so far once its average is at or below this price.
    #[clap(long = "accept-cost", env = "ACCEPT_COST")]
    pub accept_cost: Option<f64>,

    /// Accept the best window so far once its average divided by the series
    /// average is at or below this rate.
    #[clap(long = "accept-rate", env = "ACCEPT_RATE")]
    pub accept_rate: Option<f64>,

    /// Helper entity overriding `--duration-hours`.
    #[clap(long = "duration-entity-id", env = "DURATION_ENTITY_ID")]
    pub duration_entity_id: Option<String>,

    /// Helper entity overriding `--search-length-hours`.
    #[clap(long = "search-length-entity-id", env = "SEARCH_LENGTH_ENTITY_ID")]
    pub search_length_entity_id: Option<String>,

    /// Helper entity overriding `--start-hour`.
    #[clap(long = "start-hour-entity-id", env = "START_HOUR_ENTITY_ID")]
    pub start_hour_entity_id: Option<String>,

    /// Helper entity overriding `--end-hour`.
    #[clap(long = "end-hour-entity-id", env = "END_HOUR_ENTITY_ID")]
    pub end_hour_entity_id: Option<String>,

    /// Helper entity overriding `--accept-cost`.
    #[clap(long = "accept-cost-entity-id", env = "ACCEPT_COST_ENTITY_ID")]
    pub accept_cost_entity_id: Option<String>,

    /// Helper entity overriding `--accept-rate`.
    #[clap(long = "accept-rate-entity-id", env = "ACCEPT_RATE_ENTITY_ID")]
    pub accept_rate_entity_id: Option<String>,
}

impl PlannerArgs {
    pub const fn has_overrides(&self) -> bool {
        self.duration_entity_id.is_some()
            || self.search_length_entity_id.is_some()
            || self.start_hour_entity_id.is_some()
            || self.end_hour_entity_id.is_some()
            || self.accept_cost_entity_id.is_some()
            || self.accept_rate_entity_id.is_some()
    }

    /// Apply the runtime overrides and produce the effective configuration
    /// for this pass.
    pub async fn resolve(&self, api: Option<&Api>) -> Result<PlannerConfig> {
        Ok(PlannerConfig {
            planner_type: self.planner_type,
            duration_hours: override_integer(api, self.duration_entity_id.as_deref())
                .await?
                .or(self.duration_hours),
            search_length_hours: override_integer(api, self.search_length_entity_id.as_deref())
                .await?
                .or(self.search_length_hours),
            start_hour: override_hour(api, self.start_hour_entity_id.as_deref())
                .await?
                .or(self.start_hour),
            end_hour: override_hour(api, self.end_hour_entity_id.as_deref())
                .await?
                .or(self.end_hour),
            accept_cost: override_number(api, self.accept_cost_entity_id.as_deref())
                .await?
                .or(self.accept_cost),
            accept_rate: override_number(api, self.accept_rate_entity_id.as_deref())
                .await?
                .or(self.accept_rate),
        })
    }
}

async fn override_number(api: Option<&Api>, entity_id: Option<&str>) -> Result<Option<f64>> {
    let Some(entity_id) = entity_id else {
        return Ok(None);
    };
    let api = api.context("a runtime override requires the Home Assistant connection")?;
    let value = api.get_number(entity_id).await?;
    debug!(entity_id, value, "override");
    Ok(Some(value))
}

async fn override_integer(api: Option<&Api>, entity_id: Option<&str>) -> Result<Option<u32>> {
    let Some(value) = override_number(api, entity_id).await? else {
        return Ok(None);
    };
    let integer = to_bounded_integer(value).ok_or_else(|| PlanError::MalformedUpstreamValue {
        entity_id: entity_id.unwrap_or_default().to_owned(),
        value: value.to_string(),
    })?;
    Ok(Some(integer))
}

async fn override_hour(api: Option<&Api>, entity_id: Option<&str>) -> Result<Option<u32>> {
    let Some(value) = override_number(api, entity_id).await? else {
        return Ok(None);
    };
    let hour = to_clock_hour(value).ok_or_else(|| PlanError::MalformedUpstreamValue {
        entity_id: entity_id.unwrap_or_default().to_owned(),
        value: value.to_string(),
    })?;
    Ok(Some(hour))
}

/// Truncate a helper entity's number to a non-negative integer, if it is one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_bounded_integer(value: f64) -> Option<u32> {
    let truncated = value.trunc();
    (truncated >= 0.0 && truncated <= f64::from(u32::MAX)).then(|| truncated as u32)
}

fn to_clock_hour(value: f64) -> Option<u32> {
    to_bounded_integer(value).filter(|hour| *hour < 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_integer_truncates() {
        assert_eq!(to_bounded_integer(3.9), Some(3));
        assert_eq!(to_bounded_integer(0.0), Some(0));
    }

    #[test]
    fn test_bounded_integer_rejects_negative() {
        assert_eq!(to_bounded_integer(-1.0), None);
        assert_eq!(to_bounded_integer(-0.5), Some(0));
    }

    #[test]
    fn test_bounded_integer_rejects_overflow() {
        assert_eq!(to_bounded_integer(f64::from(u32::MAX) * 2.0), None);
        assert_eq!(to_bounded_integer(f64::NAN), None);
    }

    #[test]
    fn test_clock_hour_is_bounded() {
        assert_eq!(to_clock_hour(23.0), Some(23));
        assert_eq!(to_clock_hour(24.0), None);
        assert_eq!(to_clock_hour(-1.0), None);
    }
}
