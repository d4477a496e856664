//! Terminal output: progress bar and the final report

use crate::workflow::{StepStatus, WorkflowResults};
use indicatif::{ProgressBar, ProgressStyle};

/// Creates the workflow progress bar, or `None` when stderr is not a
/// terminal (logs remain the only output in that case).
pub fn create_progress_bar(total_steps: usize) -> Option<ProgressBar> {
    if !atty::is(atty::Stream::Stderr) {
        return None;
    }

    let bar = ProgressBar::new(total_steps as u64);
    let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    Some(bar)
}

/// Advances the bar on terminal step transitions.
pub fn update_progress_bar(bar: &ProgressBar, description: &str, status: StepStatus) {
    bar.set_message(description.to_string());
    if matches!(
        status,
        StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped
    ) {
        bar.inc(1);
    }
}

/// Prints the per-asset result table.
pub fn print_report(results: &WorkflowResults, dry_run: bool) {
    println!();
    if dry_run {
        println!("Dry run results (no files were written):");
    } else {
        println!("Generation results:");
    }

    let rows = results.rows();
    let width = rows
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    for (name, status) in rows {
        println!("  {name:width$}  {status}");
    }
    println!();
}
