use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    core::{planner::PlanOutcome, quota::RunningQuota},
    prelude::*,
};

/// Planner state preserved between runs: the quota count and the last
/// committed outcome it refers to.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[must_use]
pub struct PersistedState {
    #[serde(default)]
    pub quota: RunningQuota,

    #[serde(default)]
    pub previous: Option<PlanOutcome>,
}

/// TOML state file. Replaced via a temporary file and a rename, so a reader
/// never observes a partially written pass.
#[must_use]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn read(&self) -> PersistedState {
        self.read_fallibly().unwrap_or_else(|error| {
            error!("failed to load the state: {error:#}");
            PersistedState::default()
        })
    }

    fn read_fallibly(&self) -> Result<PersistedState> {
        if self.path.is_file() {
            Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?)
        } else {
            Ok(PersistedState::default())
        }
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn write(&self, state: &PersistedState) {
        if let Err(error) = self.write_fallibly(state) {
            error!("failed to save the state: {error:#}");
        }
    }

    fn write_fallibly(&self, state: &PersistedState) -> Result {
        let temporary_path = self.path.with_extension("toml.new");
        std::fs::write(&temporary_path, toml::to_string_pretty(state)?)?;
        std::fs::rename(&temporary_path, &self.path)?;
        Ok(())
    }
}
