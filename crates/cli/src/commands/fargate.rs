//! Fargate task partition command

use anyhow::Result;
use recon_lib::fargate::partition_tasks;
use recon_lib::models::OutputRecord;
use recon_lib::search::{InventorySource, TimeWindow};
use tabled::Tabled;

use crate::output::{format_timestamp, print_heading, OutputFormat};

/// Row for task tables
#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Task ARN")]
    task_arn: String,
    #[tabled(rename = "Subaccount")]
    subaccount: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl TaskRow {
    fn from_record(record: &OutputRecord) -> Self {
        Self {
            task_arn: record.urn.clone(),
            subaccount: record.subaccount.clone().unwrap_or_else(|| "-".to_string()),
            created: format_timestamp(record.creation_time),
        }
    }
}

/// Partition container tasks by agent container presence and render them.
pub async fn fargate(
    source: &dyn InventorySource,
    lookback_hours: u64,
    subaccount: &str,
    agent_image: &str,
    format: OutputFormat,
) -> Result<()> {
    let window = TimeWindow::from_lookback_hours(lookback_hours)?;
    let pages = source.search_container_tasks(window).await?;
    let partition = partition_tasks(&pages, subaccount, agent_image);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&partition)?);
        }
        OutputFormat::Csv => {
            println!("set,task_arn");
            for record in &partition.with_agent {
                println!("with_agent,{}", record.urn);
            }
            for record in &partition.without_agent {
                println!("without_agent,{}", record.urn);
            }
        }
        OutputFormat::Table => {
            print_task_section("Tasks with agent", &partition.with_agent);
            print_task_section("Tasks without agent", &partition.without_agent);
        }
    }

    Ok(())
}

fn print_task_section(title: &str, records: &[OutputRecord]) {
    print_heading(title);
    if records.is_empty() {
        println!("(none)");
        return;
    }
    let rows: Vec<TaskRow> = records.iter().map(TaskRow::from_record).collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}
