//! Full reconciliation report command

use anyhow::Result;
use recon_lib::models::{InstanceResult, OutputRecord, UnmatchedAgent};
use recon_lib::run::{run_once, RunOptions};
use recon_lib::search::InventorySource;
use tabled::Tabled;

use crate::output::{
    color_coverage, csv_field, format_kubernetes, format_timestamp, print_heading, print_info,
    OutputFormat,
};

/// Row for instance tables
#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "URN")]
    urn: String,
    #[tabled(rename = "Kubernetes")]
    kubernetes: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "OS Image")]
    os_image: String,
}

impl InstanceRow {
    fn from_record(record: &OutputRecord) -> Self {
        Self {
            urn: record.urn.clone(),
            kubernetes: format_kubernetes(record),
            created: format_timestamp(record.creation_time),
            os_image: record.os_image.to_string(),
        }
    }
}

/// Row for the unmatched-agent table
#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "Agent Identity")]
    identity: String,
}

/// Reconcile and render the three result sets.
pub async fn report(
    source: &dyn InventorySource,
    options: &RunOptions,
    statistics: bool,
    format: OutputFormat,
) -> Result<()> {
    let output = run_once(source, options).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output.result)?);
            if statistics {
                println!("{}", serde_json::to_string_pretty(&output.coverage)?);
            }
        }
        OutputFormat::Csv => {
            print_csv(&output.result);
        }
        OutputFormat::Table => {
            print_tables(&output.result);
            if let Some(fargate) = &output.fargate {
                print_info(&format!(
                    "Fargate tasks: {} with agent, {} without",
                    fargate.with_agent.len(),
                    fargate.without_agent.len()
                ));
            }
        }
    }

    if statistics && !matches!(format, OutputFormat::Json) {
        println!(
            "\nCoverage: {} ({}/{} hosts)",
            color_coverage(output.coverage.coverage_percent),
            output.coverage.matched_hosts,
            output.coverage.total_hosts
        );
    }

    Ok(())
}

fn print_tables(result: &InstanceResult) {
    print_section(
        "Instances without agents",
        &result.instances_without_agents,
    );
    print_section("Instances with agents", &result.instances_with_agents);

    print_heading("Agents without inventory");
    if result.agents_without_inventory.is_empty() {
        println!("(none)");
    } else {
        let rows: Vec<AgentRow> = result
            .agents_without_inventory
            .iter()
            .map(|agent| AgentRow {
                identity: agent.urn().to_string(),
            })
            .collect();
        print_table(rows);
    }
}

fn print_section(title: &str, records: &[OutputRecord]) {
    print_heading(title);
    if records.is_empty() {
        println!("(none)");
        return;
    }
    let rows: Vec<InstanceRow> = records.iter().map(InstanceRow::from_record).collect();
    print_table(rows);
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}

fn print_csv(result: &InstanceResult) {
    println!("set,identity");
    for record in &result.instances_without_agents {
        println!("instances_without_agents,{}", csv_field(&record.urn));
    }
    for record in &result.instances_with_agents {
        println!("instances_with_agents,{}", csv_field(&record.urn));
    }
    for agent in &result.agents_without_inventory {
        let identity = match agent {
            UnmatchedAgent::Known(record) => record.urn.as_str(),
            UnmatchedAgent::Raw(id) => id.as_str(),
        };
        println!("agents_without_inventory,{}", csv_field(identity));
    }
}
