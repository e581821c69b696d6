//! CLI output formatting

use crate::{
    core::{ExecutionStatus, RunStats, StepResult},
    execution::{ExecutionEvent, LoadedPipeline},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{}ms", millis);
    }
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
            total_steps,
        } => format!(
            "{} Starting pipeline {} with {} step(s) ({})",
            ROCKET,
            style(pipeline_name).bold(),
            style(total_steps).cyan(),
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            step,
            job,
            iterations,
        } => match iterations {
            Some(n) => format!(
                "{} {} [{}] over {} item(s)",
                SPINNER,
                style(step).cyan(),
                style(job).dim(),
                n
            ),
            None => format!("{} {} [{}]", SPINNER, style(step).cyan(), style(job).dim()),
        },
        ExecutionEvent::StepSkipped { step } => {
            format!("{} {} {}", SKIP, style(step).dim(), style("(disabled)").dim())
        }
        ExecutionEvent::IterationStarted { step, index, total } => format!(
            "   {} item {}/{}",
            style(step).dim(),
            index + 1,
            total
        ),
        ExecutionEvent::IterationFinished {
            index,
            total,
            success,
            message,
            ..
        } => {
            let icon = if *success { CHECK } else { CROSS };
            match message {
                Some(message) => format!("   {} item {}/{}: {}", icon, index + 1, total, style(message).dim()),
                None => format!("   {} item {}/{}", icon, index + 1, total),
            }
        }
        ExecutionEvent::StepCompleted { result } => format_step_result(result),
        ExecutionEvent::StepFailed { step, error } => {
            format!("{} {}: {}", CROSS, style(step).red(), style(error).dim())
        }
        ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        } => {
            let status_str = match status {
                ExecutionStatus::Completed => format!("{} completed", style("successfully").green()),
                ExecutionStatus::Failed => style("failed").red().to_string(),
                other => format_status(*other),
            };
            format!(
                "{} Pipeline ({}) {}",
                INFO,
                style(&execution_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}

/// One line per step result
pub fn format_step_result(result: &StepResult) -> String {
    let (icon, name) = if result.success {
        (CHECK, style(&result.name).green())
    } else {
        (CROSS, style(&result.name).red())
    };
    let mut line = format!(
        "{} {} ({})",
        icon,
        name,
        style(format_duration(result.duration)).dim()
    );
    if let Some(message) = &result.message {
        line.push_str(&format!(" - {}", message));
    }
    line
}

/// Horizontal rule spanning the terminal width
pub fn separator() -> String {
    let width = term_size::dimensions_stdout().map(|(w, _)| w).unwrap_or(80);
    "─".repeat(width)
}

/// Final run summary
pub fn format_summary(pipeline_name: &str, stats: &RunStats) -> String {
    let mut lines = vec![separator()];
    lines.push(format!(
        "{} {} {}",
        if stats.is_failed() { CROSS } else { CHECK },
        style(pipeline_name).bold(),
        format_status(stats.status)
    ));
    lines.push(format!(
        "  Steps: {} total, {} succeeded, {} failed, {} skipped",
        style(stats.total).cyan(),
        style(stats.successful).green(),
        style(stats.failed).red(),
        style(stats.skipped).dim()
    ));
    if let Some(elapsed) = stats.elapsed().and_then(|d| d.to_std().ok()) {
        lines.push(format!("  Duration: {}", style(format_duration(elapsed)).dim()));
    }
    if let Some(error) = &stats.error {
        lines.push(format!("  Error: {}", style(error).red()));
    }
    lines.push(separator());
    lines.join("\n")
}

/// Overview printed by `validate`
pub fn format_pipeline_overview(loaded: &LoadedPipeline) -> String {
    let pipeline = &loaded.pipeline;
    let mut lines = vec![
        format!("  Name: {}", style(&pipeline.name).bold()),
        format!(
            "  Steps: {} ({} enabled, {} disabled)",
            style(pipeline.steps.len()).cyan(),
            pipeline.enabled_steps().count(),
            pipeline.disabled_steps().count()
        ),
        format!("  Inputs: {}", style(loaded.inputs.len()).cyan()),
    ];
    if let Some(path) = &loaded.inputs_file {
        lines.push(format!("  Inputs file: {}", style(path.display()).dim()));
    }
    for (index, step) in pipeline.steps.iter().enumerate() {
        let mut line = format!("  {:>3}. {} [{}]", index + 1, step.name, style(&step.job).dim());
        if let Some(key) = step.params_list_key() {
            line.push_str(&format!(" over inputs.{}", key));
        }
        if !step.enabled {
            line.push_str(&format!(" {}", style("(disabled)").yellow()));
        }
        lines.push(line);
    }
    lines.join("\n")
}
