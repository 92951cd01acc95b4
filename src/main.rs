use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use groupscholar_grade_priority::config::EngineConfig;
use groupscholar_grade_priority::models::{AssignmentRecord, ModuleRecord};
use groupscholar_grade_priority::{input, outlook, report};

#[derive(Parser)]
#[command(name = "grade-priority")]
#[command(about = "Module grade projections and weekly priority queue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Sources {
    /// Module CSV (code, name, credits, target_mark, risk flags)
    #[arg(long)]
    modules: PathBuf,
    /// Assignment CSV (module_code, title, weight, score, max_score, status, due_date)
    #[arg(long)]
    assignments: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Project semester marks per module
    Predict {
        #[command(flatten)]
        sources: Sources,
        #[arg(long)]
        module: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Rank open work due within the horizon
    Priority {
        #[command(flatten)]
        sources: Sources,
        /// Reference date, defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = 7)]
        horizon_days: i64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
        /// Blend weights JSON, overrides GRADE_PRIORITY_CONFIG
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        sources: Sources,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = 7)]
        horizon_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            sources,
            module,
            json,
        } => {
            let (modules, assignments) = load_sources(&sources)?;
            let mut outlooks = outlook::predict_modules(&modules, &assignments);
            if let Some(code) = module.as_deref() {
                outlooks.retain(|item| item.module_code == code);
                if outlooks.is_empty() {
                    anyhow::bail!("module {code} not found in {}", sources.modules.display());
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&outlooks)?);
                return Ok(());
            }

            for item in outlooks.iter() {
                let prediction = &item.prediction;
                println!(
                    "- {} ({}) obtained {:.2}, predicted {:.2}, remaining weight {:.2}, graded {}",
                    item.module_code,
                    item.module_name,
                    prediction.current_obtained,
                    prediction.predicted_semester_mark,
                    prediction.remaining_weight,
                    prediction.graded_count
                );
                if let Some(required) = prediction.required_average_on_remaining {
                    println!("  needs {required:.2}% average on remaining work");
                }
            }
        }
        Commands::Priority {
            sources,
            as_of,
            horizon_days,
            limit,
            json,
            config,
        } => {
            let config = EngineConfig::resolve(config.as_deref())?;
            let (modules, assignments) = load_sources(&sources)?;
            let reference = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let ranked = outlook::rank_work_items(
                &modules,
                &assignments,
                reference,
                horizon_days,
                &config.priority,
            );

            if json {
                let top: Vec<_> = ranked.into_iter().take(limit).collect();
                println!("{}", serde_json::to_string_pretty(&top)?);
                return Ok(());
            }

            if ranked.is_empty() {
                println!("No open work due in this window.");
                return Ok(());
            }

            println!("Top work items by priority:");
            for item in ranked.iter().take(limit) {
                let components = &item.priority.components;
                println!(
                    "- [{}] {} ({}) score {} | impact {:.2} proximity {:.2} deficit {:.2} progression {:.2}",
                    item.priority.band,
                    item.title,
                    item.module_code,
                    item.priority.score,
                    components.impact,
                    components.proximity,
                    components.deficit,
                    components.progression
                );
            }
        }
        Commands::Report {
            sources,
            as_of,
            horizon_days,
            out,
            config,
        } => {
            let config = EngineConfig::resolve(config.as_deref())?;
            let (modules, assignments) = load_sources(&sources)?;
            let reference = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let outlooks = outlook::predict_modules(&modules, &assignments);
            let ranked = outlook::rank_work_items(
                &modules,
                &assignments,
                reference,
                horizon_days,
                &config.priority,
            );
            let report = report::build_report(reference, horizon_days, &outlooks, &ranked);
            write_report(&out, &report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_sources(sources: &Sources) -> anyhow::Result<(Vec<ModuleRecord>, Vec<AssignmentRecord>)> {
    let modules = input::load_modules(&sources.modules)?;
    let assignments = input::load_assignments(&sources.assignments)?;
    tracing::info!(
        modules = modules.len(),
        assignments = assignments.len(),
        "loaded sources"
    );
    Ok((modules, assignments))
}

fn write_report(out: &Path, report: &str) -> anyhow::Result<()> {
    std::fs::write(out, report).with_context(|| format!("failed to write {}", out.display()))
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groupscholar_grade_priority=info,grade_priority=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    Ok(())
}
