use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::{DateTime, Local, Timelike};
use clap::Parser;
use tokio::time::MissedTickBehavior;

use crate::{
    cli::{connection::HomeAssistantArgs, parameters::PlannerArgs, plan, sensor::PriceSensorArgs},
    prelude::*,
    store::StateFile,
    tables::build_state_table,
};

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub home_assistant: HomeAssistantArgs,

    #[clap(flatten)]
    pub sensor: PriceSensorArgs,

    #[clap(flatten)]
    pub parameters: PlannerArgs,

    /// Where to persist the quota and the committed outcome between runs.
    #[clap(long = "state-file", env = "STATE_FILE", default_value = "spotplan-state.toml")]
    pub state_file: PathBuf,

    /// How often to check for an hour change or a sensor update.
    #[clap(long = "poll-interval", env = "POLL_INTERVAL", default_value = "1min")]
    pub poll_interval: humantime::Duration,
}

impl WatchArgs {
    pub async fn run(self) -> Result {
        let should_stop = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&should_stop))?;
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&should_stop))?;

        let store = StateFile::new(self.state_file.clone());
        let mut persisted = store.read();
        let probe = if self.sensor.snapshot_file.is_none() {
            Some(self.home_assistant.try_new_client()?)
        } else {
            None
        };

        let mut interval = tokio::time::interval(self.poll_interval.into());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_hour: Option<u32> = None;
        let mut last_updated_at: Option<DateTime<Local>> = None;

        while !should_stop.load(Ordering::Relaxed) {
            interval.tick().await;
            let now = Local::now();

            let hour_changed = last_hour != Some(now.hour());
            let sensor_updated = match &probe {
                Some(api) => {
                    let state = api.get_state(&self.sensor.entity_id).await;
                    match state {
                        Ok(state) => {
                            let updated = last_updated_at != Some(state.last_updated_at);
                            last_updated_at = Some(state.last_updated_at);
                            updated
                        }
                        Err(error) => {
                            warn!("failed to probe the price sensor: {error:#}");
                            false
                        }
                    }
                }
                None => false,
            };
            if !hour_changed && !sensor_updated {
                continue;
            }
            last_hour = Some(now.hour());

            match plan::run_pass(
                &self.home_assistant,
                &self.sensor,
                &self.parameters,
                &mut persisted,
                now,
            )
            .await
            {
                Ok(state) => {
                    store.write(&persisted);
                    println!("{}", build_state_table(&state));
                }
                // Keep the previously published state: a transient failure
                // must not flap the sensors.
                Err(error) => warn!("pass failed, keeping the previous state: {error:#}"),
            }
        }
        info!("quitting…");
        Ok(())
    }
}
