//! Writers for the lines_to_cover JSON/CSV outputs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::coverage::{format_float, FileCoverageRow, ReportSummary};

const PER_FILE_HEADER: [&str; 5] = ["file", "total_lines", "missed", "covered", "coverage_pct"];

/// A single metric/value pair, values are always strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub metric: String,
    pub value: String,
}

impl Measure {
    fn new(metric: &str, value: String) -> Self {
        Self {
            metric: metric.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: Option<String>,
    pub key: Option<String>,
    pub measures: Vec<Measure>,
}

/// JSON document written to `--out-json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub component: Component,
}

impl Payload {
    pub fn new(summary: &ReportSummary, project_key: Option<&str>) -> Self {
        Self {
            component: Component {
                id: None,
                key: project_key.map(str::to_string),
                measures: measures(summary),
            },
        }
    }
}

/// The three summary measures in output order
pub fn measures(summary: &ReportSummary) -> Vec<Measure> {
    vec![
        Measure::new("lines_to_cover", summary.lines_to_cover.to_string()),
        Measure::new("uncovered_lines", summary.uncovered_lines.to_string()),
        Measure::new("coverage", format_float(summary.coverage)),
    ]
}

/// Write the JSON payload and the metric CSV
pub fn write_outputs(
    summary: &ReportSummary,
    out_json: &Path,
    out_csv: &Path,
    project_key: Option<&str>,
) -> Result<()> {
    let payload = Payload::new(summary, project_key);
    write_json(&payload, out_json)?;

    let rows: Vec<Vec<String>> = payload
        .component
        .measures
        .iter()
        .map(|m| vec![m.metric.clone(), m.value.clone()])
        .collect();
    write_csv(out_csv, &["metric", "value"], &rows)
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    create_parent(path)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the per-file CSV, rows are expected in their final order
pub fn write_per_file(rows: &[FileCoverageRow], path: &Path) -> Result<()> {
    let records: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.name.clone(),
                row.total_lines.to_string(),
                row.missed.to_string(),
                row.covered.to_string(),
                format_float(row.coverage_pct),
            ]
        })
        .collect();
    write_csv(path, &PER_FILE_HEADER, &records)
}

/// Pretty JSON of the summary as printed on stdout
pub fn summary_json(summary: &ReportSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut out = csv_record(header.iter().copied());
    for row in rows {
        out.push_str(&csv_record(row.iter().map(String::as_str)));
    }
    create_parent(path)?;
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

fn csv_record<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut record = fields.map(csv_field).collect::<Vec<_>>().join(",");
    record.push_str("\r\n");
    record
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
