use std::path::Path;

use chrono::{DateTime, Local};
use reqwest::{
    Client,
    ClientBuilder,
    Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Deserialize;

use crate::{core::error::PlanError, prelude::*};

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn try_new(access_token: &str, base_url: Url) -> Result<Self> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {access_token}"))?,
        )]);
        let client = ClientBuilder::new().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    #[instrument(skip_all, fields(entity_id = entity_id))]
    pub async fn get_state(&self, entity_id: &str) -> Result<EntityState> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .push("states")
            .push(entity_id);
        let state: EntityState =
            self.client.get(url).send().await?.error_for_status()?.json().await?;
        info!(last_updated_at = %state.last_updated_at, "fetched");
        Ok(state)
    }

    /// Read a numeric helper entity, used for runtime parameter overrides.
    pub async fn get_number(&self, entity_id: &str) -> Result<f64> {
        let state = self.get_state(entity_id).await?;
        Ok(parse_number(entity_id, &state.state)?)
    }
}

/// Parse a stringly-typed entity state as a number.
fn parse_number(entity_id: &str, state: &str) -> Result<f64, PlanError> {
    state.trim().parse().map_err(|_| PlanError::MalformedUpstreamValue {
        entity_id: entity_id.to_owned(),
        value: state.to_owned(),
    })
}

#[must_use]
#[derive(Debug, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,

    #[serde(default)]
    pub attributes: serde_json::Value,

    #[serde(rename = "last_updated")]
    pub last_updated_at: DateTime<Local>,
}

impl EntityState {
    /// Load a captured `GET /api/states/{entity_id}` response body from disk.
    pub fn read_from(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&body)
            .with_context(|| format!("failed to parse the snapshot at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_entity_state_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "entity_id": "sensor.nordpool_kwh_se3_eur",
                "state": "0.231",
                "attributes": {"average": 0.2},
                "last_changed": "2026-08-27T13:00:00+02:00",
                "last_updated": "2026-08-27T13:00:00+02:00"
            }
        "#;
        let state: EntityState = serde_json::from_str(RESPONSE)?;
        assert_eq!(state.entity_id, "sensor.nordpool_kwh_se3_eur");
        assert_eq!(state.state, "0.231");
        Ok(())
    }

    #[test]
    fn test_parse_number_trims_whitespace() -> Result {
        assert_eq!(parse_number("input_number.duration", " 3.5 ")?, 3.5);
        Ok(())
    }

    #[test]
    fn test_parse_number_reports_the_malformed_state() {
        let error = parse_number("input_number.duration", "unavailable").unwrap_err();
        assert!(matches!(
            error,
            PlanError::MalformedUpstreamValue { entity_id, value }
                if entity_id == "input_number.duration" && value == "unavailable",
        ));
    }
}
