//! Path templates and operations
//!
//! Path placeholders and `in: path` parameters are checked in both
//! directions, per operation. Operation ids must be present, valid
//! identifiers, and unique ignoring case.

use std::collections::HashMap;

use super::{is_identifier, operations, path_placeholders, AnalysisPass, OperationSite};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{path_pointer, OpenApiDocument, ParameterLocation};

pub struct PathPass;

impl AnalysisPass for PathPass {
    fn name(&self) -> &'static str {
        "paths"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        for (path, item) in &doc.paths {
            if !path.starts_with('/') {
                ctx.push(Issue::new(
                    IssueCode::InvalidPathFormat,
                    format!("Path '{}' must start with '/'", path),
                    path_pointer(path),
                ));
            }
            if item.operations().next().is_none() {
                ctx.push(Issue::new(
                    IssueCode::EmptyPathItem,
                    format!("Path '{}' declares no operations", path),
                    path_pointer(path),
                ));
            }
        }

        // lowercased id -> label of the operation that claimed it
        let mut first_claim: HashMap<String, String> = HashMap::new();

        for site in operations(doc) {
            check_path_parameters(doc, &site, ctx);
            check_operation_id(&site, ctx, &mut first_claim);
            check_success_responses(&site, ctx);
        }
    }
}

/// Names of `in: path` parameters visible to the operation, in declaration order
fn declared_path_parameters<'a>(doc: &'a OpenApiDocument, site: &OperationSite<'a>) -> Vec<&'a str> {
    let mut names: Vec<&str> = Vec::new();
    for param in site.item.parameters.iter().chain(&site.operation.parameters) {
        let Some(param) = doc.resolve_parameter(param) else {
            continue;
        };
        if param.location != ParameterLocation::Path {
            continue;
        }
        if let Some(name) = param.declared_name() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn check_path_parameters(doc: &OpenApiDocument, site: &OperationSite<'_>, ctx: &mut AnalysisContext) {
    let declared = declared_path_parameters(doc, site);
    let mut placeholders = path_placeholders(site.path);
    placeholders.dedup();

    for placeholder in &placeholders {
        if !declared.contains(placeholder) {
            ctx.push(Issue::new(
                IssueCode::MissingPathParameter,
                format!(
                    "{}: placeholder '{{{}}}' has no matching 'in: path' parameter",
                    site.label(),
                    placeholder
                ),
                format!("{}/parameters", site.pointer),
            ));
        }
    }

    for name in &declared {
        if !placeholders.contains(name) {
            ctx.push(Issue::new(
                IssueCode::UnusedPathParameter,
                format!(
                    "{}: path parameter '{}' does not appear in the path template",
                    site.label(),
                    name
                ),
                format!("{}/parameters", site.pointer),
            ));
        }
    }
}

fn check_operation_id(
    site: &OperationSite<'_>,
    ctx: &mut AnalysisContext,
    first_claim: &mut HashMap<String, String>,
) {
    let location = format!("{}/operationId", site.pointer);
    let Some(operation_id) = site
        .operation
        .operation_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
    else {
        ctx.push(Issue::new(
            IssueCode::MissingOperationId,
            format!("{} has no operationId", site.label()),
            location,
        ));
        return;
    };

    if !is_identifier(operation_id) {
        ctx.push(Issue::new(
            IssueCode::InvalidOperationId,
            format!(
                "operationId '{}' is not a valid identifier (letters, digits, underscore; no leading digit)",
                operation_id
            ),
            location.clone(),
        ));
    }

    let key = operation_id.to_lowercase();
    if ctx.claim_operation_id(operation_id) {
        first_claim.insert(key, site.label());
    } else {
        let first = first_claim.get(&key).cloned().unwrap_or_default();
        ctx.push(Issue::new(
            IssueCode::DuplicateOperationId,
            format!(
                "operationId '{}' on {} is already used by {}",
                operation_id,
                site.label(),
                first
            ),
            location,
        ));
    }
}

/// `200`, `204`, `2XX`
pub fn is_success_status(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 3
        && bytes[0] == b'2'
        && (bytes[1..].iter().all(u8::is_ascii_digit) || code[1..].eq_ignore_ascii_case("xx"))
}

fn check_success_responses(site: &OperationSite<'_>, ctx: &mut AnalysisContext) {
    let location = format!("{}/responses", site.pointer);
    let responses = &site.operation.responses;

    if responses.is_empty() {
        ctx.push(Issue::new(
            IssueCode::MissingResponses,
            format!("{} declares no responses", site.label()),
            location,
        ));
        return;
    }

    let success: Vec<&str> = responses
        .keys()
        .map(String::as_str)
        .filter(|code| is_success_status(code))
        .collect();

    match success.len() {
        0 => ctx.push(Issue::new(
            IssueCode::NoSuccessResponse,
            format!("{} declares no 2xx response", site.label()),
            location,
        )),
        1 => {}
        _ => ctx.push(Issue::new(
            IssueCode::MultipleSuccessResponses,
            format!(
                "{} declares several 2xx responses ({}); the generated return type is ambiguous",
                site.label(),
                success.join(", ")
            ),
            location,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: serde_json::Value) -> Vec<Issue> {
        let doc: OpenApiDocument = serde_json::from_value(value).unwrap();
        let mut ctx = AnalysisContext::default();
        PathPass.run(&doc, &mut ctx);
        ctx.into_issues()
    }

    fn count(issues: &[Issue], code: IssueCode) -> usize {
        issues.iter().filter(|i| i.code == code).count()
    }

    fn ok() -> serde_json::Value {
        json!({ "200": { "description": "ok" } })
    }

    #[test]
    fn test_success_status() {
        assert!(is_success_status("200"));
        assert!(is_success_status("2XX"));
        assert!(is_success_status("2xx"));
        assert!(!is_success_status("default"));
        assert!(!is_success_status("500"));
        assert!(!is_success_status("20"));
    }

    #[test]
    fn test_path_must_start_with_slash() {
        let issues = run(json!({ "paths": { "pets": { "get": { "operationId": "a", "responses": ok() } } } }));
        assert_eq!(count(&issues, IssueCode::InvalidPathFormat), 1);
    }

    #[test]
    fn test_query_param_does_not_satisfy_placeholder() {
        let issues = run(json!({
            "paths": {
                "/items/{id}": {
                    "get": {
                        "operationId": "getItem",
                        "parameters": [ { "name": "id", "in": "query", "schema": { "type": "string" } } ],
                        "responses": ok()
                    }
                }
            }
        }));
        assert_eq!(count(&issues, IssueCode::MissingPathParameter), 1);
        assert_eq!(count(&issues, IssueCode::UnusedPathParameter), 0);
        assert_eq!(issues[0].location, "#/paths/~1items~1{id}/get/parameters");
    }

    #[test]
    fn test_path_item_parameters_count() {
        let issues = run(json!({
            "paths": {
                "/items/{id}": {
                    "parameters": [ { "name": "id", "in": "path", "required": true } ],
                    "get": { "operationId": "getItem", "responses": ok() },
                    "delete": { "operationId": "deleteItem", "responses": ok() }
                }
            }
        }));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_unused_path_parameter() {
        let issues = run(json!({
            "paths": {
                "/items": {
                    "get": {
                        "operationId": "listItems",
                        "parameters": [ { "name": "id", "in": "path", "required": true } ],
                        "responses": ok()
                    }
                }
            }
        }));
        assert_eq!(count(&issues, IssueCode::UnusedPathParameter), 1);
    }

    #[test]
    fn test_duplicate_operation_id_reported_on_second() {
        let issues = run(json!({
            "paths": {
                "/a": { "get": { "operationId": "listThings", "responses": ok() } },
                "/b": { "get": { "operationId": "ListThings", "responses": ok() } }
            }
        }));
        let dupes: Vec<_> = issues.iter().filter(|i| i.code == IssueCode::DuplicateOperationId).collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].location, "#/paths/~1b/get/operationId");
        assert!(dupes[0].message.contains("GET /a"));
    }

    #[test]
    fn test_missing_and_invalid_operation_id() {
        let issues = run(json!({
            "paths": {
                "/a": {
                    "get": { "responses": ok() },
                    "post": { "operationId": "create-thing", "responses": ok() }
                }
            }
        }));
        assert_eq!(count(&issues, IssueCode::MissingOperationId), 1);
        assert_eq!(count(&issues, IssueCode::InvalidOperationId), 1);
    }

    #[test]
    fn test_response_counts() {
        let issues = run(json!({
            "paths": {
                "/a": {
                    "get": { "operationId": "a", "responses": { "500": { "description": "x" } } },
                    "put": { "operationId": "b" },
                    "post": {
                        "operationId": "c",
                        "responses": { "200": { "description": "x" }, "201": { "description": "y" } }
                    }
                }
            }
        }));
        assert_eq!(count(&issues, IssueCode::NoSuccessResponse), 1);
        assert_eq!(count(&issues, IssueCode::MissingResponses), 1);
        assert_eq!(count(&issues, IssueCode::MultipleSuccessResponses), 1);
    }

    #[test]
    fn test_empty_path_item() {
        let issues = run(json!({ "paths": { "/nothing": {} } }));
        assert_eq!(count(&issues, IssueCode::EmptyPathItem), 1);
    }
}
