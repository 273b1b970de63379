//! Output formatting utilities

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use recon_lib::models::OutputRecord;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

/// Print a section heading
pub fn print_heading(text: &str) {
    println!("\n{}", text.bold());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format an optional timestamp for table display
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

/// Format kubernetes membership, including the cluster when known
pub fn format_kubernetes(record: &OutputRecord) -> String {
    match (record.is_kubernetes, &record.cluster) {
        (true, Some(cluster)) => format!("yes ({cluster})"),
        (true, None) => "yes".to_string(),
        (false, _) => "no".to_string(),
    }
}

/// Color a coverage percentage by how healthy it looks
pub fn color_coverage(percent: f64) -> String {
    let formatted = format!("{percent:.1}%");
    if percent >= 90.0 {
        formatted.green().to_string()
    } else if percent >= 70.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Quote a CSV field when it contains separators or quotes
pub fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_format_kubernetes() {
        let mut record = OutputRecord::bare("urn:test");
        assert_eq!(format_kubernetes(&record), "no");

        record.is_kubernetes = true;
        assert_eq!(format_kubernetes(&record), "yes");

        record.cluster = Some("prod".to_string());
        assert_eq!(format_kubernetes(&record), "yes (prod)");
    }

    #[test]
    fn test_format_timestamp_none() {
        assert_eq!(format_timestamp(None), "-");
    }
}
