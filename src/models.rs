use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const GRADED_STATUS: &str = "GRADED";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(default)]
    pub module_code: String,
    #[serde(default)]
    pub title: String,
    pub weight: f64,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl AssignmentRecord {
    /// Score as a 0-100 percentage. A raw score is treated as a percentage
    /// already unless a positive `max_score` is present.
    pub fn percentage(&self) -> Option<f64> {
        let score = self.score?;
        match self.max_score {
            Some(max) if max > 0.0 => Some(score / max * 100.0),
            _ => Some(score),
        }
    }

    // Status and score overlap upstream; either one marks the row as graded.
    pub fn is_graded(&self) -> bool {
        self.status.as_deref() == Some(GRADED_STATUS) || self.percentage().is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePredictionResult {
    pub current_obtained: f64,
    pub remaining_weight: f64,
    pub required_average_on_remaining: Option<f64>,
    pub predicted_semester_mark: f64,
    pub graded_count: usize,
    pub normalization_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credits: f64,
    pub target_mark: Option<f64>,
    #[serde(default)]
    pub is_prereq_critical: bool,
    #[serde(default)]
    pub failed_before_count: u32,
    #[serde(default)]
    pub is_elective_dsm: bool,
    pub elective_credit_deficit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityScoreInput {
    pub weight_percent: f64,
    pub module_credits: f64,
    pub due_date: Option<NaiveDate>,
    /// Falls back to today's date when absent.
    pub reference_date: Option<NaiveDate>,
    pub target_mark: f64,
    pub current_predicted: f64,
    pub is_prereq_critical: bool,
    pub failed_before_count: u32,
    pub missed_assignments_count: u32,
    #[serde(rename = "isElectiveDSM")]
    pub is_elective_dsm: bool,
    pub elective_credit_deficit: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriorityBand {
    High,
    Medium,
    Low,
}

impl PriorityBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            71..=u8::MAX => PriorityBand::High,
            40..=70 => PriorityBand::Medium,
            _ => PriorityBand::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityBand::High => "HIGH",
            PriorityBand::Medium => "MEDIUM",
            PriorityBand::Low => "LOW",
        }
    }
}

impl std::fmt::Display for PriorityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Every intermediate term behind a priority score, kept so a ranking can
/// be explained to the student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityComponents {
    pub impact: f64,
    pub proximity: f64,
    pub deficit: f64,
    pub progression: f64,
    pub credit_multiplier: f64,
    pub elective_bonus: f64,
    pub blend: f64,
    pub days_until_due: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityScoreResult {
    pub score: u8,
    pub band: PriorityBand,
    pub components: PriorityComponents,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutlook {
    pub module_code: String,
    pub module_name: String,
    pub target_mark: Option<f64>,
    pub assignment_count: usize,
    pub prediction: ModulePredictionResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedWorkItem {
    pub module_code: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub weight_percent: f64,
    pub priority: PriorityScoreResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}
