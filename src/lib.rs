//! OpenAPI Lint
//!
//! Static analysis for OpenAPI 3.x documents, aimed at problems that break or
//! degrade client code generation.
//!
//! ## Features
//!
//! - **Single pass**: every analyzer runs over an immutable document with a
//!   fresh per-run context
//! - **Cycle-safe schema walks**: references are leaves, keyed by their target
//! - **Dependency cycles**: reference loops between component schemas are
//!   reported once each
//! - **Never fails**: parse errors, missing files and internal faults come back
//!   as issues
//!
//! ## Architecture
//!
//! ```text
//! text ──► document::parse ──► OpenApiDocument
//!                                   │
//!                 Linter::analyze_document (fresh AnalysisContext)
//!                                   │
//!   structure ► paths ► parameters ► responses ► schemas ► naming
//!             ► security ► tags ► dependency cycles
//!                                   │
//!                               Vec<Issue>
//! ```
//!
//! ```no_run
//! let issues = openapi_lint::analyze_file("openapi.yaml");
//! for issue in &issues {
//!     println!("{}", issue);
//! }
//! ```

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod graph;
pub mod linter;
pub mod rules;
pub mod walker;

pub use config::{LintConfig, RuleConfig};
pub use context::AnalysisContext;
pub use diagnostics::{format_summary, Category, Issue, IssueCode, Severity};
pub use document::{parse_document, OpenApiDocument};
pub use error::{LintError, Result};
pub use linter::{analyze, analyze_document, analyze_file, Linter};
