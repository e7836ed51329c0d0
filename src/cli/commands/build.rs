//! Build command - one-shot generation.

use console::style;

use crate::config::Settings;
use crate::pipeline::{BuildReport, ResourceOutcome};

use super::reve_from_settings;

/// Print a per-resource summary of a build.
pub fn print_report(report: &BuildReport) {
    for resource in &report.resources {
        match &resource.outcome {
            ResourceOutcome::Built(processed) => {
                println!(
                    "  {} {:<24} {} ({} bytes)",
                    style("built").green(),
                    resource.name,
                    processed.path.display(),
                    processed.bytes_in
                );
            }
            ResourceOutcome::Skipped { reason } => {
                println!(
                    "  {} {:<24} {reason}",
                    style("skipped").yellow(),
                    resource.name
                );
            }
        }
    }
    println!(
        "{} {}/{} resources -> {}",
        style("Built").bold(),
        report.built_count(),
        report.resources.len(),
        report.index_path.display()
    );
}

/// Run the build command.
pub async fn run(settings: &Settings) -> anyhow::Result<BuildReport> {
    let mut reve = reve_from_settings(settings)?;
    let report = reve.build().await?;
    print_report(&report);
    Ok(report)
}
