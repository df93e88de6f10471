use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::Parser;

use crate::{
    api,
    cli::{connection::HomeAssistantArgs, parameters::PlannerArgs, sensor::PriceSensorArgs},
    core::{
        error::PlanError,
        planner::Planner,
        range::SearchMode,
        state::{PlannerState, low_window},
    },
    prelude::*,
    store::{PersistedState, StateFile},
    tables::build_state_table,
};

#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub home_assistant: HomeAssistantArgs,

    #[clap(flatten)]
    pub sensor: PriceSensorArgs,

    #[clap(flatten)]
    pub parameters: PlannerArgs,

    /// Where to persist the quota and the committed outcome between runs.
    #[clap(long = "state-file", env = "STATE_FILE", default_value = "spotplan-state.toml")]
    pub state_file: PathBuf,
}

impl PlanArgs {
    pub async fn run(self) -> Result {
        let store = StateFile::new(self.state_file.clone());
        let mut persisted = store.read();
        match run_pass(
            &self.home_assistant,
            &self.sensor,
            &self.parameters,
            &mut persisted,
            Local::now(),
        )
        .await
        {
            Ok(state) => {
                store.write(&persisted);
                println!("{}", build_state_table(&state));
                Ok(())
            }
            Err(error) => match error.downcast_ref::<PlanError>() {
                // An expected planning failure publishes the unknown state and
                // exits cleanly, so a scheduler does not flap on it.
                Some(plan_error) => {
                    warn!("pass failed: {plan_error}");
                    println!("{}", build_state_table(&PlannerState::unknown()));
                    Ok(())
                }
                None => Err(error),
            },
        }
    }
}

/// One complete pass: fetch, normalize, resolve parameters, scan, and update
/// the quota bookkeeping. Shared between `plan` and `watch`.
#[instrument(skip_all, fields(now = %now))]
pub async fn run_pass(
    home_assistant: &HomeAssistantArgs,
    sensor: &PriceSensorArgs,
    parameters: &PlannerArgs,
    persisted: &mut PersistedState,
    now: DateTime<Local>,
) -> Result<PlannerState> {
    let api = if sensor.snapshot_file.is_none() || parameters.has_overrides() {
        Some(home_assistant.try_new_client()?)
    } else {
        None
    };

    let entity_state = sensor.fetch(api.as_ref()).await?;
    let series = api::normalize(sensor.shape, &entity_state)?;
    let config = parameters.resolve(api.as_ref()).await?;
    let planner = Planner::try_from_config(config)?;

    let range = planner.mode.resolve(now);
    let is_static = matches!(planner.mode, SearchMode::Static { .. });
    if is_static {
        persisted.quota.roll_over(range.cycle);
    }

    let outcome =
        planner.plan(&series, now, persisted.previous.as_ref(), persisted.quota.hours_used)?;
    let in_low_window = low_window(&outcome, planner.duration_hours).contains(now);
    if is_static {
        persisted.quota.count_hour(now, in_low_window);
        info!(
            cycle_state = %persisted.quota.state(planner.duration_hours, in_low_window),
            hours_used = persisted.quota.hours_used,
        );
    }
    persisted.previous = Some(outcome);

    let state =
        PlannerState::from_outcome(&outcome, now, planner.duration_hours, persisted.quota.hours_used);
    info!(
        low_cost_starts_at = %state.low_cost.starts_at,
        low_cost_at = %state.low_cost.cost_at,
        high_cost_starts_at = %state.high_cost.starts_at,
        high_cost_at = %state.high_cost.cost_at,
        low_cost_now = %state.low_cost_now,
        hours_used = state.hours_used,
        "planned",
    );
    Ok(state)
}
