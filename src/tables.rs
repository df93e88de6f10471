use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{
    planner::{Candidate, PlanOutcome},
    series::PriceSeries,
    state::PlannerState,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

pub fn build_series_table(series: &PriceSeries, now: DateTime<Local>) -> Table {
    let average = series.average();
    let mut table = new_table();
    table.set_header(vec!["Start", "Price", ""]);
    for point in series.points() {
        let is_now = (point.start..point.start + PriceSeries::SLOT).contains(&now);
        let price_cell = match point.value {
            Some(value) => {
                Cell::new(format!("{value:.3}")).set_alignment(CellAlignment::Right).fg(
                    if average.is_some_and(|average| value >= average) {
                        Color::Red
                    } else {
                        Color::Green
                    },
                )
            }
            None => {
                Cell::new("null").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim)
            }
        };
        table.add_row(vec![
            Cell::new(point.start.format("%a %H:%M")),
            price_cell,
            Cell::new(if is_now { "now" } else { "" }),
        ]);
    }
    table
}

pub fn build_candidates_table(candidates: &[Candidate], outcome: Option<&PlanOutcome>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Starts", "Average", "Verdict"]);
    for candidate in candidates {
        let verdict = match (candidate.average, outcome) {
            (None, _) => Cell::new("skipped").add_attribute(Attribute::Dim),
            (Some(_), Some(outcome)) if candidate.starts_at == outcome.lowest.starts_at => {
                Cell::new("lowest").fg(Color::Green)
            }
            (Some(_), Some(outcome)) if candidate.starts_at == outcome.highest.starts_at => {
                Cell::new("highest").fg(Color::Red)
            }
            _ => Cell::new(""),
        };
        let average_cell = match candidate.average {
            Some(average) => Cell::new(format!("{average:.3}")).set_alignment(CellAlignment::Right),
            None => Cell::new("null").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
        };
        table.add_row(vec![
            Cell::new(candidate.starts_at.format("%a %H:%M")),
            average_cell,
            verdict,
        ]);
    }
    table
}

pub fn build_state_table(state: &PlannerState) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Starts at", "Cost at", "Now-cost rate"]);
    table.add_row(vec![
        Cell::new("Low cost").fg(Color::Green),
        Cell::new(state.low_cost.starts_at.to_string()),
        Cell::new(state.low_cost.cost_at.to_string()).set_alignment(CellAlignment::Right),
        Cell::new(state.low_cost.now_cost_rate.to_string()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("High cost").fg(Color::Red),
        Cell::new(state.high_cost.starts_at.to_string()),
        Cell::new(state.high_cost.cost_at.to_string()).set_alignment(CellAlignment::Right),
        Cell::new(state.high_cost.now_cost_rate.to_string()).set_alignment(CellAlignment::Right),
    ]);
    table
}
