use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PriorityBand, PriorityComponents, PriorityScoreInput, PriorityScoreResult};
use crate::numeric::clamp;

const CREDIT_BASELINE: f64 = 20.0;
const PROXIMITY_MIDPOINT_DAYS: f64 = 3.0;
const PROXIMITY_SPREAD_DAYS: f64 = 3.0;

/// Blend coefficients for the four urgency signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub impact: f64,
    pub proximity: f64,
    pub deficit: f64,
    pub progression: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            impact: 0.35,
            proximity: 0.35,
            deficit: 0.15,
            progression: 0.15,
        }
    }
}

pub fn get_priority_score(input: &PriorityScoreInput) -> PriorityScoreResult {
    get_priority_score_with(input, &PriorityWeights::default())
}

pub fn get_priority_score_with(
    input: &PriorityScoreInput,
    weights: &PriorityWeights,
) -> PriorityScoreResult {
    let reference = input
        .reference_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let days_until_due = input.due_date.map(|due| days_until_due(due, reference));

    let impact = clamp(
        (input.weight_percent / 100.0) * (input.module_credits / CREDIT_BASELINE),
        0.0,
        2.0,
    );
    let proximity = logistic_proximity(days_until_due);

    // A zero target or prediction counts as unset.
    let deficit = if input.target_mark != 0.0 && input.current_predicted != 0.0 {
        clamp((input.target_mark - input.current_predicted) / 100.0, 0.0, 1.0)
    } else {
        0.0
    };

    let prereq = if input.is_prereq_critical { 0.7 } else { 0.0 };
    let progression_raw = prereq
        + clamp(input.failed_before_count as f64 * 0.2, 0.0, 0.4)
        + clamp(input.missed_assignments_count as f64 * 0.1, 0.0, 0.3);
    let progression = clamp(progression_raw, 0.0, 1.0);

    let credit_multiplier = 1.0 + clamp(input.module_credits / 30.0, 0.0, 2.0);

    // Any positive deficit earns at least the 0.05 floor.
    let elective_deficit = input.elective_credit_deficit.unwrap_or(0.0);
    let elective_bonus = if input.is_elective_dsm && elective_deficit > 0.0 {
        clamp(elective_deficit / 60.0, 0.05, 0.1)
    } else {
        0.0
    };

    let blend = impact * weights.impact
        + proximity * weights.proximity
        + deficit * weights.deficit
        + progression * weights.progression;
    let raw = blend * credit_multiplier + elective_bonus;
    let score = clamp(raw * 100.0, 0.0, 100.0).round() as u8;

    PriorityScoreResult {
        score,
        band: PriorityBand::from_score(score),
        components: PriorityComponents {
            impact,
            proximity,
            deficit,
            progression,
            credit_multiplier,
            elective_bonus,
            blend,
            days_until_due,
        },
    }
}

pub fn days_until_due(due: NaiveDate, reference: NaiveDate) -> i64 {
    (due - reference).num_days()
}

/// Logistic urgency curve: near 1.0 when overdue, 0.5 at three days out,
/// decaying toward 0 beyond a couple of weeks. Undated work is neutral.
pub fn logistic_proximity(days_until_due: Option<i64>) -> f64 {
    let Some(days) = days_until_due else {
        return 0.5;
    };
    let d = clamp(days as f64, -5.0, 60.0);
    1.0 / (1.0 + ((d - PROXIMITY_MIDPOINT_DAYS) / PROXIMITY_SPREAD_DAYS).exp())
}
