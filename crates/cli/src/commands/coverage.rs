//! Coverage summary command

use anyhow::Result;
use recon_lib::run::{run_once, RunOptions};
use recon_lib::search::InventorySource;

use crate::output::{color_coverage, OutputFormat};

/// Reconcile and print only the coverage statistics.
pub async fn coverage(
    source: &dyn InventorySource,
    options: &RunOptions,
    format: OutputFormat,
) -> Result<()> {
    let output = run_once(source, options).await?;
    let report = &output.coverage;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Csv => {
            println!("total_hosts,matched_hosts,coverage_percent");
            println!(
                "{},{},{:.1}",
                report.total_hosts, report.matched_hosts, report.coverage_percent
            );
        }
        OutputFormat::Table => {
            println!("Total hosts:    {}", report.total_hosts);
            println!("With agent:     {}", report.matched_hosts);
            println!(
                "Without agent:  {}",
                report.total_hosts - report.matched_hosts
            );
            println!(
                "Unmatched agents: {}",
                output.result.agents_without_inventory.len()
            );
            println!("Coverage:       {}", color_coverage(report.coverage_percent));
        }
    }

    Ok(())
}
