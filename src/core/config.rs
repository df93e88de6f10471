/// Whether the search window slides along with the clock or is pinned between
/// two clock hours recurring daily.
#[derive(
    Copy, Clone, Debug, Hash, Eq, PartialEq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
pub enum PlannerType {
    /// Search `[now, now + search length)`.
    #[serde(rename = "moving")]
    Moving,

    /// Search between fixed start and end clock hours, recurring daily.
    #[serde(rename = "static")]
    Static,
}

/// Per-pass parameter set, after runtime overrides have been applied.
///
/// Everything except the planner type is optional here: which parameters are
/// actually required depends on the type, and a missing required one aborts
/// the pass rather than defaulting.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct PlannerConfig {
    pub planner_type: PlannerType,
    pub duration_hours: Option<u32>,
    pub search_length_hours: Option<u32>,
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub accept_cost: Option<f64>,
    pub accept_rate: Option<f64>,
}
