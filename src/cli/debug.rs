use chrono::Local;
use clap::{Parser, Subcommand};

use crate::{
    api,
    cli::{connection::HomeAssistantArgs, parameters::PlannerArgs, sensor::PriceSensorArgs},
    core::{planner::Planner, series::PriceSeries},
    prelude::*,
    store::StateFile,
    tables::{build_candidates_table, build_series_table},
};

#[derive(Parser)]
pub struct DebugArgs {
    #[command(subcommand)]
    pub command: DebugCommand,
}

#[derive(Subcommand)]
pub enum DebugCommand {
    /// Print the normalized price series.
    #[clap(name = "prices")]
    Prices {
        #[clap(flatten)]
        home_assistant: HomeAssistantArgs,

        #[clap(flatten)]
        sensor: PriceSensorArgs,
    },

    /// Print every candidate window and the verdict on each.
    #[clap(name = "windows")]
    Windows {
        #[clap(flatten)]
        home_assistant: HomeAssistantArgs,

        #[clap(flatten)]
        sensor: PriceSensorArgs,

        #[clap(flatten)]
        parameters: PlannerArgs,
    },

    /// Print the persisted quota and the committed outcome.
    #[clap(name = "quota")]
    Quota {
        #[clap(long = "state-file", env = "STATE_FILE", default_value = "spotplan-state.toml")]
        state_file: std::path::PathBuf,
    },
}

impl DebugArgs {
    pub async fn run(self) -> Result {
        match self.command {
            DebugCommand::Prices { home_assistant, sensor } => {
                let series = fetch_series(&home_assistant, &sensor).await?;
                println!("{}", build_series_table(&series, Local::now()));
            }
            DebugCommand::Windows { home_assistant, sensor, parameters } => {
                let now = Local::now();
                let api = if sensor.snapshot_file.is_none() || parameters.has_overrides() {
                    Some(home_assistant.try_new_client()?)
                } else {
                    None
                };
                let entity_state = sensor.fetch(api.as_ref()).await?;
                let series = api::normalize(sensor.shape, &entity_state)?;
                let config = parameters.resolve(api.as_ref()).await?;
                let planner = Planner::try_from_config(config)?;
                let candidates = planner.candidates(&series, now)?;
                let outcome = planner.plan(&series, now, None, 0).ok();
                println!("{}", build_candidates_table(&candidates, outcome.as_ref()));
            }
            DebugCommand::Quota { state_file } => {
                let state = StateFile::new(state_file).read();
                println!("{}", toml::to_string_pretty(&state)?);
            }
        }
        Ok(())
    }
}

async fn fetch_series(
    home_assistant: &HomeAssistantArgs,
    sensor: &PriceSensorArgs,
) -> Result<PriceSeries> {
    let api = if sensor.snapshot_file.is_none() {
        Some(home_assistant.try_new_client()?)
    } else {
        None
    };
    let entity_state = sensor.fetch(api.as_ref()).await?;
    api::normalize(sensor.shape, &entity_state)
}
