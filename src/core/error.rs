use chrono::{DateTime, Local};

use crate::core::interval::Interval;

/// Recoverable planning failures.
///
/// None of these is fatal: the caller logs a warning, leaves the previously
/// published output untouched, and retries on the next trigger.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A required parameter is absent (there are no implicit defaults).
    #[error("required parameter `{0}` is not set")]
    MissingParameter(&'static str),

    /// A parameter is present but its value is out of range.
    #[error("parameter `{name}` has an invalid value `{value}`")]
    InvalidParameter { name: &'static str, value: String },

    /// The price series does not cover the full search range.
    #[error("price series covers up to {covered_until}, but the search range is {needed:?}")]
    InsufficientData { covered_until: DateTime<Local>, needed: Interval },

    /// Every candidate window was skipped, or the search range was empty.
    #[error("no eligible window within the search range")]
    NoEligibleWindow,

    /// An upstream entity's state cannot be parsed as the expected number.
    #[error("cannot parse {entity_id} state `{value}` as a number")]
    MalformedUpstreamValue { entity_id: String, value: String },
}
