//! Document loading
//!
//! Turns JSON or YAML text into an [`OpenApiDocument`]. Text whose first
//! non-blank character is `{` is read as JSON, anything else as YAML.

use std::path::Path;

use tracing::debug;

use super::OpenApiDocument;
use crate::error::{LintError, Result};

/// Parse raw document text
pub fn parse_document(text: &str) -> Result<OpenApiDocument> {
    if text.trim_start().starts_with('{') {
        debug!("parsing document as JSON");
        Ok(serde_json::from_str(text)?)
    } else {
        debug!("parsing document as YAML");
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Read and parse a document from disk
pub fn parse_document_file(path: &Path) -> Result<OpenApiDocument> {
    let text = read_document_text(path)?;
    parse_document(&text)
}

/// Read document text, distinguishing a missing path from other IO failures
pub fn read_document_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            LintError::FileNotFound(path.display().to_string())
        } else {
            LintError::Io(err)
        }
    })
}
