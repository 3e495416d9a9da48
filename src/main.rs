use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;

use jacoco_lines::config::{Config, ExportSettings, Options};
use jacoco_lines::coverage::{self, Element, ReportSummary};
use jacoco_lines::error::ExportError;
use jacoco_lines::export;

#[derive(Parser)]
#[command(name = "jacoco-lines")]
#[command(about = "Parse jacoco XML and export lines_to_cover metrics")]
#[command(version)]
struct Cli {
    /// Path to jacoco.xml (default: target/site/jacoco/jacoco.xml)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON filename (default: lines_to_cover.json)
    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Output CSV filename (default: lines_to_cover.csv)
    #[arg(long)]
    out_csv: Option<PathBuf>,

    /// Optional per-file CSV output (e.g. per_file_coverage.csv)
    #[arg(long)]
    per_file_out: Option<PathBuf>,

    /// Optional Sonar project key to include in JSON
    #[arg(long)]
    project_key: Option<String>,

    /// TOML file with an [export] table providing defaults for the flags above
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_options(self) -> Result<Options> {
        let file_settings = match &self.config {
            Some(path) => Config::load(path)?.export,
            None => ExportSettings::default(),
        };

        let flags = ExportSettings {
            input: self.input,
            out_json: self.out_json,
            out_csv: self.out_csv,
            per_file_out: self.per_file_out,
            project_key: self.project_key,
        };
        Ok(flags.or(file_settings).resolve())
    }
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let options = match cli.into_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {:#}", "ERROR: invalid configuration:".red().bold(), e);
            return 1;
        }
    };

    let (root, summary) = match load(&options) {
        Ok(loaded) => loaded,
        Err(e @ ExportError::InputNotFound(_)) => {
            eprintln!("{} {}", "ERROR:".red().bold(), e);
            return e.exit_code();
        }
        Err(e) => {
            eprintln!("{} {}", "ERROR parsing jacoco XML:".red().bold(), e);
            return e.exit_code();
        }
    };

    let mut exit_code = 0;
    match export::write_outputs(
        &summary,
        &options.out_json,
        &options.out_csv,
        options.project_key.as_deref(),
    ) {
        Ok(()) => {
            if let Some(per_file_out) = &options.per_file_out {
                write_per_file(&root, per_file_out);
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "ERROR writing outputs:".red().bold(), e);
            exit_code = 1;
        }
    }

    match export::summary_json(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{} {:#}", "ERROR:".red().bold(), e);
            exit_code = 1;
        }
    }

    exit_code
}

fn load(options: &Options) -> Result<(Element, ReportSummary), ExportError> {
    let root = coverage::parse_report(&options.input)?;
    let summary = coverage::summarize(&root)?;
    Ok((root, summary))
}

/// Best effort: failures are reported but never change the exit code
fn write_per_file(root: &Element, path: &Path) {
    let result = coverage::per_file_rows(root)
        .map_err(anyhow::Error::from)
        .and_then(|rows| export::write_per_file(&rows, path));

    match result {
        Ok(()) => println!("Per-file CSV written to: {}", path.display()),
        Err(e) => eprintln!("{} {:#}", "ERROR generating per-file CSV:".red().bold(), e),
    }
}
