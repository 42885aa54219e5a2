//! Analysis Passes
//!
//! Each pass reads the document and appends issues to the shared context.
//! Passes never fail and never stop one another; the orchestrator decides the
//! order they run in.

pub mod enums;
pub mod naming;
pub mod parameters;
pub mod paths;
pub mod responses;
pub mod schemas;
pub mod security;
pub mod structure;
pub mod tags;

use regex::Regex;
use std::sync::OnceLock;

use crate::context::AnalysisContext;
use crate::document::{path_pointer, OpenApiDocument, Operation, PathItem};

pub use naming::NamingPass;
pub use parameters::ParameterPass;
pub use paths::PathPass;
pub use responses::ResponsePass;
pub use schemas::SchemaPass;
pub use security::SecurityPass;
pub use structure::StructurePass;
pub use tags::TagPass;

/// One analyzer over the whole document
pub trait AnalysisPass {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext);
}

/// An operation together with where it was declared
#[derive(Debug, Clone)]
pub struct OperationSite<'a> {
    pub path: &'a str,
    pub item: &'a PathItem,
    pub method: &'static str,
    pub operation: &'a Operation,
    /// `#/paths/<escaped>/<method>`
    pub pointer: String,
}

impl OperationSite<'_> {
    /// `GET /items/{id}`
    pub fn label(&self) -> String {
        format!("{} {}", self.method.to_uppercase(), self.path)
    }
}

/// Every operation in declaration order (paths, then method order)
pub fn operations(doc: &OpenApiDocument) -> Vec<OperationSite<'_>> {
    doc.paths
        .iter()
        .flat_map(|(path, item)| {
            item.operations().map(move |(method, operation)| OperationSite {
                path,
                item,
                method,
                operation,
                pointer: format!("{}/{}", path_pointer(path), method),
            })
        })
        .collect()
}

/// Letters, digits and underscores, not starting with a digit
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// `{name}` placeholders of a path template
pub(crate) fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern is valid"))
}

/// Placeholder names in template order, duplicates kept
pub fn path_placeholders(path: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Media types carrying JSON (`application/json`, `application/problem+json`, ...)
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or(media_type).trim();
    essence.eq_ignore_ascii_case("application/json")
        || essence.to_ascii_lowercase().ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("listPets"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("Pet2"));
        assert!(!is_identifier("2Pet"));
        assert!(!is_identifier("list-pets"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_path_placeholders() {
        assert_eq!(path_placeholders("/users/{userId}/posts/{postId}"), vec!["userId", "postId"]);
        assert!(path_placeholders("/ping").is_empty());
    }

    #[test]
    fn test_json_media_types() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("application/json; charset=utf-8"));
        assert!(is_json_media_type("application/problem+json"));
        assert!(!is_json_media_type("application/octet-stream"));
    }

    #[test]
    fn test_operations_order_and_pointer() {
        let doc: OpenApiDocument = serde_json::from_value(json!({
            "paths": {
                "/b": { "post": {}, "get": {} },
                "/a/{id}": { "delete": {} }
            }
        }))
        .unwrap();
        let sites: Vec<_> = operations(&doc).iter().map(|s| s.pointer.clone()).collect();
        assert_eq!(
            sites,
            vec!["#/paths/~1b/get", "#/paths/~1b/post", "#/paths/~1a~1{id}/delete"]
        );
        assert_eq!(operations(&doc)[2].label(), "DELETE /a/{id}");
    }
}
