//! OpenAPI Lint CLI
//!
//! Checks OpenAPI documents and prints the issues found.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use openapi_lint::config::{JsonStyle, OutputFormat};
use openapi_lint::{format_summary, Issue, IssueCode, LintConfig, Linter, Severity};

#[derive(Parser)]
#[command(name = "openapi-lint")]
#[command(about = "Find OpenAPI problems that break client code generation")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze files or directories
    Check {
        /// Documents, or directories to search for documents
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format (overrides the configuration)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Drop issues below this severity (overrides the configuration)
        #[arg(long, value_enum)]
        min_severity: Option<MinSeverity>,
    },

    /// List every issue code
    Rules,

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum MinSeverity {
    Info,
    Warning,
    Error,
}

impl From<MinSeverity> for Severity {
    fn from(value: MinSeverity) -> Self {
        match value {
            MinSeverity::Info => Severity::Info,
            MinSeverity::Warning => Severity::Warning,
            MinSeverity::Error => Severity::Error,
        }
    }
}

/// One analyzed file in the JSON report
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    path: String,
    issues: Vec<Issue>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    generated_at: DateTime<Utc>,
    files: Vec<FileReport>,
    errors: usize,
    warnings: usize,
    infos: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => std::process::exit(1),
        Ok(false) => {}
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether any Error-severity issue was found
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = LintConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Check { paths, format, min_severity } => {
            if let Some(format) = format {
                config.output.format = match format {
                    Format::Text => OutputFormat::Text,
                    Format::Json => OutputFormat::Json,
                };
            }
            if let Some(min) = min_severity {
                config.rules.min_severity = min.into();
            }
            check(&paths, config)
        }

        Commands::Rules => {
            for code in IssueCode::ALL {
                println!(
                    "{:<36} {:<8} {:<14} {}",
                    code.as_str(),
                    code.severity().to_string(),
                    code.category().to_string(),
                    code.summary()
                );
            }
            Ok(false)
        }

        Commands::Config => {
            print!("{}", config.to_toml().context("rendering configuration")?);
            Ok(false)
        }
    }
}

/// Expand directories into the documents they contain, sorted for stable output
fn collect_documents(paths: &[PathBuf], config: &LintConfig) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    for path in paths {
        if !path.is_dir() {
            // Missing paths are reported by the linter itself
            documents.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| config.discovery.matches(p))
            .collect();
        found.sort();
        debug!(dir = %path.display(), count = found.len(), "Discovered documents");
        documents.extend(found);
    }
    documents
}

fn check(paths: &[PathBuf], config: LintConfig) -> anyhow::Result<bool> {
    let documents = collect_documents(paths, &config);
    let output = config.output.clone();
    let linter = Linter::with_config(config);

    let files: Vec<FileReport> = documents
        .iter()
        .map(|path| FileReport {
            path: path.display().to_string(),
            issues: linter.analyze_file(path),
        })
        .collect();

    let all: Vec<Issue> = files.iter().flat_map(|f| f.issues.iter().cloned()).collect();
    let has_errors = all.iter().any(|i| i.severity == Severity::Error);

    match output.format {
        OutputFormat::Text => print_text(&files, &all),
        OutputFormat::Json => {
            let count = |s: Severity| all.iter().filter(|i| i.severity == s).count();
            let report = Report {
                generated_at: Utc::now(),
                errors: count(Severity::Error),
                warnings: count(Severity::Warning),
                infos: count(Severity::Info),
                files,
            };
            let rendered = match output.json_style {
                JsonStyle::Pretty => serde_json::to_string_pretty(&report)?,
                JsonStyle::Compact => serde_json::to_string(&report)?,
            };
            println!("{}", rendered);
        }
    }

    Ok(has_errors)
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
        Severity::Info => "ℹ️ ",
    }
}

fn print_text(files: &[FileReport], all: &[Issue]) {
    for file in files {
        if file.issues.is_empty() {
            println!("✅ {}", file.path);
            continue;
        }
        println!("🔍 {}", file.path);
        for issue in &file.issues {
            println!("  {} {}", marker(issue.severity), issue);
        }
        println!();
    }
    println!("{}", format_summary(all));
}
