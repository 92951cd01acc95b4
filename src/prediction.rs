use crate::models::{AssignmentRecord, ModulePredictionResult};
use crate::numeric::{clamp, round4};

#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionOptions {
    pub target_mark: Option<f64>,
}

/// Projects a module's semester mark from its assignments.
///
/// Weights are normalised so they sum to 100 whatever their raw total is.
/// Ungraded work is assumed to land at the average of the graded work so far.
/// A module whose weights sum to zero (or has no assignments) yields an
/// all-zero result.
pub fn compute_module_prediction(
    assignments: &[AssignmentRecord],
    options: PredictionOptions,
) -> ModulePredictionResult {
    let sum_weights: f64 = assignments.iter().map(|a| a.weight).sum();
    if sum_weights <= 0.0 {
        return ModulePredictionResult::default();
    }

    let norm_factor = 100.0 / sum_weights;
    let mut total_graded_weight = 0.0;
    let mut current_obtained = 0.0;
    let mut percentage_sum = 0.0;
    let mut graded_count = 0usize;

    for assignment in assignments {
        if !assignment.is_graded() {
            continue;
        }
        // GRADED status without a score contributes nothing.
        let Some(percentage) = assignment.percentage() else {
            continue;
        };

        let normalized_weight = assignment.weight * norm_factor;
        total_graded_weight += normalized_weight;
        current_obtained += (percentage / 100.0) * normalized_weight;
        percentage_sum += percentage;
        graded_count += 1;
    }

    let remaining_weight = clamp(100.0 - total_graded_weight, 0.0, 100.0);
    let avg_graded_percent = if graded_count == 0 {
        0.0
    } else {
        percentage_sum / graded_count as f64
    };
    let predicted_semester_mark = current_obtained + remaining_weight * (avg_graded_percent / 100.0);

    let required_average_on_remaining = match options.target_mark {
        Some(target) if remaining_weight > 0.0 => Some(round4(clamp(
            (target - current_obtained) / remaining_weight * 100.0,
            0.0,
            100.0,
        ))),
        _ => None,
    };

    ModulePredictionResult {
        current_obtained: round4(current_obtained),
        remaining_weight: round4(remaining_weight),
        required_average_on_remaining,
        predicted_semester_mark: round4(predicted_semester_mark),
        graded_count,
        normalization_factor: round4(norm_factor),
    }
}
