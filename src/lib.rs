//! Grade projection and weekly priority scoring for student modules.
//!
//! [`prediction`] and [`priority`] are pure functions over plain records and
//! are safe to call from any number of threads. The remaining modules wire
//! them to CSV exports and Markdown reports for the `grade-priority` CLI.

pub mod config;
pub mod input;
pub mod models;
pub mod numeric;
pub mod outlook;
pub mod prediction;
pub mod priority;
pub mod report;

pub use models::{
    AssignmentRecord, ModulePredictionResult, PriorityBand, PriorityComponents,
    PriorityScoreInput, PriorityScoreResult,
};
pub use prediction::{compute_module_prediction, PredictionOptions};
pub use priority::{get_priority_score, get_priority_score_with, PriorityWeights};
