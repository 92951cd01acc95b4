use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::models::{
    AssignmentRecord, BandSummary, ModuleOutlook, ModuleRecord, PriorityBand, PriorityScoreInput,
    RankedWorkItem,
};
use crate::prediction::{compute_module_prediction, PredictionOptions};
use crate::priority::{get_priority_score_with, PriorityWeights};

fn group_by_module<'a>(
    modules: &[&ModuleRecord],
    assignments: &'a [AssignmentRecord],
) -> HashMap<String, Vec<&'a AssignmentRecord>> {
    let mut grouped: HashMap<String, Vec<&AssignmentRecord>> = HashMap::new();
    for module in modules {
        grouped.insert(module.code.clone(), Vec::new());
    }

    for assignment in assignments {
        match grouped.get_mut(&assignment.module_code) {
            Some(entry) => entry.push(assignment),
            None => tracing::warn!(
                module = %assignment.module_code,
                title = %assignment.title,
                "skipping assignment for unknown module"
            ),
        }
    }

    grouped
}

/// First row per module code; later duplicates are dropped with a warning.
fn unique_modules(modules: &[ModuleRecord]) -> Vec<&ModuleRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for module in modules {
        if seen.insert(module.code.as_str()) {
            unique.push(module);
        } else {
            tracing::warn!(module = %module.code, "ignoring duplicate module row");
        }
    }
    unique
}

fn owned(assignments: &[&AssignmentRecord]) -> Vec<AssignmentRecord> {
    assignments.iter().map(|a| (*a).clone()).collect()
}

pub fn predict_modules(
    modules: &[ModuleRecord],
    assignments: &[AssignmentRecord],
) -> Vec<ModuleOutlook> {
    let modules = unique_modules(modules);
    let grouped = group_by_module(&modules, assignments);

    modules
        .into_iter()
        .map(|module| {
            let module_assignments = grouped
                .get(&module.code)
                .map(|items| owned(items))
                .unwrap_or_default();
            let prediction = compute_module_prediction(
                &module_assignments,
                PredictionOptions {
                    target_mark: module.target_mark,
                },
            );

            ModuleOutlook {
                module_code: module.code.clone(),
                module_name: module.name.clone(),
                target_mark: module.target_mark,
                assignment_count: module_assignments.len(),
                prediction,
            }
        })
        .collect()
}

/// Far horizons saturate at the last representable date.
pub fn horizon_date(reference: NaiveDate, horizon_days: i64) -> NaiveDate {
    Duration::try_days(horizon_days.max(0))
        .and_then(|delta| reference.checked_add_signed(delta))
        .unwrap_or(NaiveDate::MAX)
}

fn is_missed(assignment: &AssignmentRecord, reference: NaiveDate) -> bool {
    !assignment.is_graded() && assignment.due_date.is_some_and(|due| due < reference)
}

/// Scores every ungraded assignment due within the horizon (overdue and
/// undated work included), highest priority first.
pub fn rank_work_items(
    modules: &[ModuleRecord],
    assignments: &[AssignmentRecord],
    reference: NaiveDate,
    horizon_days: i64,
    weights: &PriorityWeights,
) -> Vec<RankedWorkItem> {
    let modules = unique_modules(modules);
    let grouped = group_by_module(&modules, assignments);
    let horizon = horizon_date(reference, horizon_days);
    let mut ranked = Vec::new();

    for module in modules {
        let Some(items) = grouped.get(&module.code) else {
            continue;
        };
        let module_assignments = owned(items);
        let prediction = compute_module_prediction(
            &module_assignments,
            PredictionOptions {
                target_mark: module.target_mark,
            },
        );
        let weight_sum: f64 = module_assignments.iter().map(|a| a.weight).sum();
        let norm_factor = if weight_sum > 0.0 { 100.0 / weight_sum } else { 0.0 };
        let missed = module_assignments
            .iter()
            .filter(|a| is_missed(a, reference))
            .count() as u32;

        for assignment in module_assignments.iter() {
            if assignment.is_graded() {
                continue;
            }
            if assignment.due_date.is_some_and(|due| due > horizon) {
                continue;
            }

            let weight_percent = assignment.weight * norm_factor;
            let input = PriorityScoreInput {
                weight_percent,
                module_credits: module.credits,
                due_date: assignment.due_date,
                reference_date: Some(reference),
                target_mark: module.target_mark.unwrap_or(0.0),
                current_predicted: prediction.predicted_semester_mark,
                is_prereq_critical: module.is_prereq_critical,
                failed_before_count: module.failed_before_count,
                missed_assignments_count: missed,
                is_elective_dsm: module.is_elective_dsm,
                elective_credit_deficit: module.elective_credit_deficit,
            };

            ranked.push(RankedWorkItem {
                module_code: module.code.clone(),
                title: assignment.title.clone(),
                due_date: assignment.due_date,
                weight_percent,
                priority: get_priority_score_with(&input, weights),
            });
        }
    }

    ranked.sort_by(|a, b| {
        b.priority
            .score
            .cmp(&a.priority.score)
            .then_with(|| match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.title.cmp(&b.title))
    });

    tracing::debug!(items = ranked.len(), %horizon, "ranked work items");
    ranked
}

pub fn summarize_bands(items: &[RankedWorkItem]) -> BandSummary {
    let mut summary = BandSummary::default();
    for item in items {
        match item.priority.band {
            PriorityBand::High => summary.high += 1,
            PriorityBand::Medium => summary.medium += 1,
            PriorityBand::Low => summary.low += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn module(code: &str, credits: f64, target: Option<f64>) -> ModuleRecord {
        ModuleRecord {
            code: code.to_string(),
            name: format!("{code} module"),
            credits,
            target_mark: target,
            is_prereq_critical: false,
            failed_before_count: 0,
            is_elective_dsm: false,
            elective_credit_deficit: None,
        }
    }

    fn assignment(
        module_code: &str,
        title: &str,
        weight: f64,
        score: Option<f64>,
        due_in: Option<i64>,
    ) -> AssignmentRecord {
        AssignmentRecord {
            module_code: module_code.to_string(),
            title: title.to_string(),
            weight,
            score,
            max_score: None,
            status: score.map(|_| "GRADED".to_string()),
            due_date: due_in.map(|days| reference() + Duration::days(days)),
        }
    }

    #[test]
    fn predicts_each_module_against_its_target() {
        let modules = vec![module("MATH201", 20.0, Some(75.0)), module("BIO101", 10.0, None)];
        let assignments = vec![
            assignment("MATH201", "Quiz", 40.0, Some(50.0), Some(-10)),
            assignment("MATH201", "Final", 60.0, None, Some(40)),
            assignment("CHEM999", "Orphan", 50.0, Some(90.0), None),
        ];

        let outlooks = predict_modules(&modules, &assignments);
        assert_eq!(outlooks.len(), 2);
        assert_eq!(outlooks[0].assignment_count, 2);
        let required = outlooks[0].prediction.required_average_on_remaining.unwrap();
        assert!((required - 91.6667).abs() < 0.001);
        assert_eq!(outlooks[1].assignment_count, 0);
        assert_eq!(outlooks[1].prediction.normalization_factor, 0.0);
    }

    #[test]
    fn ranks_within_horizon_and_orders_by_score() {
        let modules = vec![module("MATH201", 20.0, Some(75.0))];
        let assignments = vec![
            assignment("MATH201", "Quiz", 20.0, Some(60.0), Some(-14)),
            assignment("MATH201", "Lab report", 10.0, None, Some(6)),
            assignment("MATH201", "Problem set", 30.0, None, Some(1)),
            assignment("MATH201", "Final", 40.0, None, Some(45)),
            assignment("MATH201", "Reading", 0.0, None, None),
        ];

        let ranked = rank_work_items(
            &modules,
            &assignments,
            reference(),
            7,
            &PriorityWeights::default(),
        );
        let titles: Vec<&str> = ranked.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Problem set", "Reading", "Lab report"]);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].priority.score >= pair[1].priority.score));
        assert!((ranked[0].weight_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn overdue_ungraded_work_counts_as_missed() {
        let modules = vec![module("MATH201", 20.0, None)];
        let with_missed = vec![
            assignment("MATH201", "Lost essay", 20.0, None, Some(-3)),
            assignment("MATH201", "Project", 20.0, None, Some(20)),
        ];
        let without_missed = vec![
            assignment("MATH201", "Lost essay", 20.0, Some(70.0), Some(-3)),
            assignment("MATH201", "Project", 20.0, None, Some(20)),
        ];

        let weights = PriorityWeights::default();
        let missed = rank_work_items(&modules, &with_missed, reference(), 30, &weights);
        let clean = rank_work_items(&modules, &without_missed, reference(), 30, &weights);

        let project = |items: &[RankedWorkItem]| {
            items
                .iter()
                .find(|item| item.title == "Project")
                .map(|item| item.priority.components.progression)
                .unwrap()
        };
        assert!((project(&missed) - 0.1).abs() < 1e-9);
        assert_eq!(project(&clean), 0.0);
    }

    #[test]
    fn band_summary_counts_each_band() {
        let modules = vec![module("MATH201", 40.0, Some(80.0))];
        let assignments = vec![
            assignment("MATH201", "Overdue", 50.0, None, Some(-2)),
            assignment("MATH201", "Later", 1.0, None, Some(7)),
        ];
        let ranked = rank_work_items(
            &modules,
            &assignments,
            reference(),
            7,
            &PriorityWeights::default(),
        );
        let summary = summarize_bands(&ranked);
        assert_eq!(summary.high + summary.medium + summary.low, ranked.len());
        assert_eq!(summary.high, 1);
    }

    #[test]
    fn negative_horizon_is_today() {
        assert_eq!(horizon_date(reference(), -4), reference());
        assert_eq!(
            horizon_date(reference(), 7),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
    }

    #[test]
    fn far_horizon_saturates_instead_of_overflowing() {
        assert_eq!(horizon_date(reference(), 200_000_000), NaiveDate::MAX);
        assert_eq!(horizon_date(reference(), i64::MAX), NaiveDate::MAX);

        let modules = vec![module("MATH201", 20.0, None)];
        let assignments = vec![assignment("MATH201", "Thesis", 50.0, None, Some(3_000))];
        let ranked = rank_work_items(
            &modules,
            &assignments,
            reference(),
            i64::MAX,
            &PriorityWeights::default(),
        );
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn duplicate_module_rows_are_scored_once() {
        let mut repeated = module("MATH201", 40.0, Some(90.0));
        repeated.name = "Repeated row".to_string();
        let modules = vec![module("MATH201", 20.0, Some(75.0)), repeated];
        let assignments = vec![assignment("MATH201", "Problem set", 30.0, None, Some(1))];

        let outlooks = predict_modules(&modules, &assignments);
        assert_eq!(outlooks.len(), 1);
        assert_eq!(outlooks[0].module_name, "MATH201 module");
        assert_eq!(outlooks[0].target_mark, Some(75.0));

        let ranked = rank_work_items(
            &modules,
            &assignments,
            reference(),
            7,
            &PriorityWeights::default(),
        );
        assert_eq!(ranked.len(), 1);
        let summary = summarize_bands(&ranked);
        assert_eq!(summary.high + summary.medium + summary.low, 1);
    }

    #[test]
    fn weight_shares_sum_to_exactly_100() {
        let modules = vec![module("PHYS150", 20.0, None)];
        let assignments = vec![
            assignment("PHYS150", "Lab 1", 1.0, None, Some(1)),
            assignment("PHYS150", "Lab 2", 1.0, None, Some(2)),
            assignment("PHYS150", "Lab 3", 1.0, None, Some(3)),
        ];

        let ranked = rank_work_items(
            &modules,
            &assignments,
            reference(),
            7,
            &PriorityWeights::default(),
        );
        let total: f64 = ranked.iter().map(|item| item.weight_percent).sum();
        assert_eq!(ranked.len(), 3);
        assert!((total - 100.0).abs() < 1e-9, "shares summed to {total}");
    }
}
