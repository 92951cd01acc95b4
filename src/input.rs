use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{AssignmentRecord, ModuleRecord};

pub fn load_modules(csv_path: &Path) -> anyhow::Result<Vec<ModuleRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        code: String,
        name: Option<String>,
        credits: Option<f64>,
        target_mark: Option<f64>,
        is_prereq_critical: Option<bool>,
        failed_before_count: Option<u32>,
        is_elective_dsm: Option<bool>,
        elective_credit_deficit: Option<f64>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut modules = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| {
            format!("invalid module row {} in {}", index + 1, csv_path.display())
        })?;
        let code = row.code.trim().to_string();
        if !seen.insert(code.clone()) {
            anyhow::bail!(
                "duplicate module code {code} at row {} in {}",
                index + 1,
                csv_path.display()
            );
        }
        modules.push(ModuleRecord {
            code,
            name: row.name.unwrap_or_default(),
            credits: row.credits.unwrap_or(0.0),
            target_mark: row.target_mark,
            is_prereq_critical: row.is_prereq_critical.unwrap_or(false),
            failed_before_count: row.failed_before_count.unwrap_or(0),
            is_elective_dsm: row.is_elective_dsm.unwrap_or(false),
            elective_credit_deficit: row.elective_credit_deficit,
        });
    }

    tracing::debug!(count = modules.len(), path = %csv_path.display(), "loaded modules");
    Ok(modules)
}

pub fn load_assignments(csv_path: &Path) -> anyhow::Result<Vec<AssignmentRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        module_code: String,
        title: String,
        weight: f64,
        score: Option<f64>,
        max_score: Option<f64>,
        status: Option<String>,
        due_date: Option<NaiveDate>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut assignments = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| {
            format!(
                "invalid assignment row {} in {}",
                index + 1,
                csv_path.display()
            )
        })?;
        assignments.push(AssignmentRecord {
            module_code: row.module_code.trim().to_string(),
            title: row.title,
            weight: row.weight,
            score: row.score,
            max_score: row.max_score,
            status: row
                .status
                .map(|status| status.trim().to_uppercase())
                .filter(|status| !status.is_empty()),
            due_date: row.due_date,
        });
    }

    tracing::debug!(
        count = assignments.len(),
        path = %csv_path.display(),
        "loaded assignments"
    );
    Ok(assignments)
}
