//! Lint Orchestrator
//!
//! Runs every analysis pass over one document with a fresh context and
//! returns the flat issue list. Nothing here returns an error: parse and read
//! failures become boundary issues, and a panic inside a pass becomes a single
//! `UNEXPECTED_ANALYSIS_ERROR`.
//!
//! Pass order is fixed. The dependency cycle pass runs last because it reads
//! the graph the schema pass fills in.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::LintConfig;
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::parse::read_document_text;
use crate::document::{parse_document, OpenApiDocument};
use crate::error::LintError;
use crate::graph::CyclePass;
use crate::rules::{
    AnalysisPass, NamingPass, ParameterPass, PathPass, ResponsePass, SchemaPass, SecurityPass,
    StructurePass, TagPass,
};

/// Entry point for analysis
#[derive(Debug, Clone, Default)]
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// All passes in run order
    pub fn passes() -> Vec<Box<dyn AnalysisPass>> {
        vec![
            Box::new(StructurePass),
            Box::new(PathPass),
            Box::new(ParameterPass),
            Box::new(ResponsePass),
            Box::new(SchemaPass),
            Box::new(NamingPass),
            Box::new(SecurityPass),
            Box::new(TagPass),
            Box::new(CyclePass),
        ]
    }

    /// Parse JSON or YAML text, then analyze it
    ///
    /// A parse failure yields exactly one `PARSE_ERROR` issue.
    pub fn analyze(&self, text: &str) -> Vec<Issue> {
        match parse_document(text) {
            Ok(doc) => self.analyze_document(&doc),
            Err(err) => {
                warn!(error = %err, "Document failed to parse");
                vec![Issue::new(IssueCode::ParseError, err.detail(), err.location())]
            }
        }
    }

    /// Read a file, then analyze its contents
    pub fn analyze_file(&self, path: &Path) -> Vec<Issue> {
        info!(path = %path.display(), "Analyzing file");
        match read_document_text(path) {
            Ok(text) => self.analyze(&text),
            Err(LintError::FileNotFound(missing)) => {
                warn!(path = %missing, "File not found");
                vec![Issue::new(
                    IssueCode::FileNotFound,
                    format!("File not found: {}", missing),
                    missing,
                )]
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "File could not be read");
                vec![Issue::new(
                    IssueCode::FileReadError,
                    format!("Failed to read file: {}", err.detail()),
                    path.display().to_string(),
                )]
            }
        }
    }

    /// Analyze an already parsed document
    pub fn analyze_document(&self, doc: &OpenApiDocument) -> Vec<Issue> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_passes(doc)));

        let issues = match outcome {
            Ok(issues) => issues,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!(reason = %reason, "Analysis aborted");
                vec![Issue::new(
                    IssueCode::UnexpectedAnalysisError,
                    format!("Analysis aborted unexpectedly: {}", reason),
                    "#",
                )]
            }
        };

        let rules = &self.config.rules;
        let kept: Vec<Issue> = issues.into_iter().filter(|i| rules.keeps(i)).collect();
        info!(issues = kept.len(), "Analysis complete");
        kept
    }

    fn run_passes(&self, doc: &OpenApiDocument) -> Vec<Issue> {
        let mut ctx = AnalysisContext::new(self.config.rules.clone());

        for pass in Self::passes() {
            let before = ctx.issue_count();
            pass.run(doc, &mut ctx);
            debug!(
                pass = pass.name(),
                issues = ctx.issue_count() - before,
                "Pass finished"
            );
        }

        ctx.into_issues()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

/// [`Linter::analyze`] with the default configuration
pub fn analyze(text: &str) -> Vec<Issue> {
    Linter::new().analyze(text)
}

/// [`Linter::analyze_file`] with the default configuration
pub fn analyze_file(path: impl AsRef<Path>) -> Vec<Issue> {
    Linter::new().analyze_file(path.as_ref())
}

/// [`Linter::analyze_document`] with the default configuration
pub fn analyze_document(doc: &OpenApiDocument) -> Vec<Issue> {
    Linter::new().analyze_document(doc)
}
