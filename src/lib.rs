//! jacoco-lines - JaCoCo line coverage exporter
//!
//! A library for turning a JaCoCo XML report into lines_to_cover metrics:
//! - XML loading into an element tree
//! - Report-wide LINE counter aggregation with nested fallback
//! - Per-source-file breakdown sorted by missed lines
//! - JSON payload and CSV writers

pub mod config;
pub mod coverage;
pub mod error;
pub mod export;

pub use coverage::{per_file_rows, summarize, Counter, FileCoverageRow, ReportSummary};
pub use error::ExportError;
pub use export::{write_outputs, write_per_file, Payload};
