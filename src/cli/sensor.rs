use std::path::PathBuf;

use clap::Parser;

use crate::{
    api::{SourceShape, home_assistant},
    prelude::*,
};

#[derive(Parser)]
pub struct PriceSensorArgs {
    /// Spot-price sensor entity ID.
    #[clap(long = "price-entity-id", env = "PRICE_ENTITY_ID")]
    pub entity_id: String,

    /// Attribute shape published by the price sensor.
    #[clap(long = "price-shape", env = "PRICE_SHAPE", value_enum, default_value = "nordpool")]
    pub shape: SourceShape,

    /// Read the sensor snapshot from a captured JSON file instead of the API.
    #[clap(long = "snapshot-file", env = "SNAPSHOT_FILE")]
    pub snapshot_file: Option<PathBuf>,
}

impl PriceSensorArgs {
    pub async fn fetch(
        &self,
        api: Option<&home_assistant::Api>,
    ) -> Result<home_assistant::EntityState> {
        match (&self.snapshot_file, api) {
            (Some(path), _) => home_assistant::EntityState::read_from(path),
            (None, Some(api)) => api.get_state(&self.entity_id).await,
            (None, None) => {
                bail!("either a snapshot file or the Home Assistant connection is required")
            }
        }
    }
}
