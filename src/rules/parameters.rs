//! Parameter rules
//!
//! Path-item parameters are checked once per path; operation parameters once
//! per operation. An operation may legally redeclare a path-item parameter,
//! so duplicates are only looked for within one list.

use std::collections::HashSet;

use super::{operations, AnalysisPass};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{path_pointer, OpenApiDocument, Parameter, ParameterLocation, RefOr, Schema};

pub struct ParameterPass;

impl AnalysisPass for ParameterPass {
    fn name(&self) -> &'static str {
        "parameters"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        for (path, item) in &doc.paths {
            check_parameter_list(doc, &item.parameters, &path_pointer(path), ctx);
        }
        for site in operations(doc) {
            check_parameter_list(doc, &site.operation.parameters, &site.pointer, ctx);
        }
    }
}

/// Inline object with its own structure: should be a named component
pub(crate) fn is_complex_inline(schema: &Schema) -> bool {
    !schema.is_reference()
        && schema.is_object_like()
        && (!schema.properties.is_empty() || schema.has_composition())
}

fn check_parameter_list(
    doc: &OpenApiDocument,
    params: &[RefOr<Parameter>],
    owner_pointer: &str,
    ctx: &mut AnalysisContext,
) {
    let mut seen: HashSet<(String, ParameterLocation)> = HashSet::new();

    for (i, entry) in params.iter().enumerate() {
        let location = format!("{}/parameters/{}", owner_pointer, i);

        let Some(param) = doc.resolve_parameter(entry) else {
            ctx.push(Issue::new(
                IssueCode::UnresolvedReference,
                format!(
                    "Parameter reference '{}' does not resolve",
                    entry.reference().unwrap_or_default()
                ),
                location,
            ));
            continue;
        };

        let Some(name) = param.declared_name() else {
            ctx.push(Issue::new(
                IssueCode::MissingParameterName,
                format!("Parameter {} has no name", i),
                location,
            ));
            continue;
        };

        // Header names are case-insensitive
        let key = match param.location {
            ParameterLocation::Header => name.to_ascii_lowercase(),
            _ => name.to_string(),
        };
        if !seen.insert((key, param.location)) {
            ctx.push(Issue::new(
                IssueCode::DuplicateParameter,
                format!("Parameter '{}' (in: {}) is declared more than once", name, param.location),
                location.clone(),
            ));
        }

        if param.location == ParameterLocation::Path && !param.is_required() {
            ctx.push(Issue::new(
                IssueCode::PathParameterNotRequired,
                format!("Path parameter '{}' must be marked required: true", name),
                location.clone(),
            ));
        }

        let content_schemas: Vec<&Schema> =
            param.content.values().filter_map(|m| m.schema.as_ref()).collect();
        match &param.schema {
            None if content_schemas.is_empty() => ctx.push(Issue::new(
                IssueCode::MissingParameterSchema,
                format!("Parameter '{}' declares no schema", name),
                location.clone(),
            )),
            _ => {}
        }

        if param.schema.iter().chain(content_schemas).any(is_complex_inline) {
            ctx.push(Issue::new(
                IssueCode::ComplexInlineParameterSchema,
                format!(
                    "Parameter '{}' uses an inline object schema; extract it to components/schemas",
                    name
                ),
                format!("{}/schema", location),
            ));
        }

        if ctx.rules().check_nullable_required_parameters && param.is_required() {
            let nullable = param
                .schema
                .as_ref()
                .map(|s| s.nullable == Some(true) || s.is_type("null"))
                .unwrap_or(false);
            if nullable {
                ctx.push(Issue::new(
                    IssueCode::NullableRequiredParameter,
                    format!("Parameter '{}' is required but its schema is nullable", name),
                    location,
                ));
            }
        }
    }
}
