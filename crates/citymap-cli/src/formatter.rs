//! Output formatters for command results.

use clap::ValueEnum;
use comfy_table::Table;
use serde::Serialize;

use crate::commands::{MappingSummary, TableReport, TypeReport};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable tables
    Text,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the entity counts of a mapping.
    fn format_summary(&self, summary: &MappingSummary) -> String;

    /// Format a type description.
    fn format_type(&self, report: &TypeReport) -> String;

    /// Format the types stored in a table.
    fn format_tables(&self, report: &TableReport) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Text formatter using comfy-table.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_summary(&self, summary: &MappingSummary) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Collection", "Count"]);
        for (collection, count) in [
            ("schemas", summary.schemas),
            ("complex attribute types", summary.complex_attribute_types),
            ("complex types", summary.complex_types),
            ("object types", summary.object_types),
            ("feature types", summary.feature_types),
            ("property injections", summary.property_injections),
        ] {
            table.add_row(vec![collection.to_string(), count.to_string()]);
        }

        let name = summary.name.as_deref().unwrap_or("unnamed mapping");
        let mut output = format!("Mapping '{}' is valid", name);
        if summary.merged > 0 {
            output.push_str(&format!(" ({} merged)", summary.merged));
        }
        output.push('\n');
        output.push_str(&table.to_string());
        output
    }

    fn format_type(&self, report: &TypeReport) -> String {
        let mut output = format!("{} '{}' ({}:{})\n", report.kind, report.id, report.schema, report.path);
        if report.is_abstract {
            output.push_str("abstract\n");
        }
        output.push_str(&format!(
            "table: {}{}\n",
            report.table.as_deref().unwrap_or("-"),
            if report.shared_table { " (shared)" } else { "" }
        ));
        output.push_str(&format!("super types: {}\n", list(&report.super_types)));
        output.push_str(&format!("sub types: {}\n", list(&report.sub_types)));

        let mut table = Table::new();
        table.set_header(vec!["Property", "Kind", "Declared by", "Queryable"]);
        for row in &report.properties {
            let declared_by = if row.injected {
                format!("{} (injected)", row.declared_by)
            } else {
                row.declared_by.clone()
            };
            table.add_row(vec![
                row.name.clone(),
                row.kind.clone(),
                declared_by,
                row.queryable.to_string(),
            ]);
        }
        output.push_str(&table.to_string());
        output
    }

    fn format_tables(&self, report: &TableReport) -> String {
        if report.feature_types.is_empty() && report.object_types.is_empty() {
            return format!("No types stored in table '{}'", report.table);
        }

        let mut table = Table::new();
        table.set_header(vec!["Type", "Kind"]);
        for id in &report.feature_types {
            table.add_row(vec![id.as_str(), "feature type"]);
        }
        for id in &report.object_types {
            table.add_row(vec![id.as_str(), "object type"]);
        }
        table.to_string()
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_summary(&self, summary: &MappingSummary) -> String {
        to_json(summary)
    }

    fn format_type(&self, report: &TypeReport) -> String {
        to_json(report)
    }

    fn format_tables(&self, report: &TableReport) -> String {
        to_json(report)
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({ "message": message }).to_string()
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn list(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}
