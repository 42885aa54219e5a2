//! Request bodies, responses and their media types
//!
//! Bodies and responses are checked where they are defined: inline on the
//! operation, or once under `components`. A use-site reference is only
//! checked for resolving.

use indexmap::IndexMap;

use super::parameters::is_complex_inline;
use super::{is_json_media_type, operations, AnalysisPass};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{escape_pointer, MediaType, OpenApiDocument, RefOr, Schema};

pub struct ResponsePass;

impl AnalysisPass for ResponsePass {
    fn name(&self) -> &'static str {
        "responses"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        for site in operations(doc) {
            if let Some(body) = &site.operation.request_body {
                let pointer = format!("{}/requestBody", site.pointer);
                match body {
                    RefOr::Item(body) => check_request_body(&body.content, &pointer, ctx),
                    RefOr::Ref { reference } => {
                        if doc.resolve_request_body(body).is_none() {
                            unresolved(reference, &pointer, ctx);
                        }
                    }
                }
            }

            for (status, response) in &site.operation.responses {
                let pointer = format!("{}/responses/{}", site.pointer, escape_pointer(status));
                match response {
                    RefOr::Item(response) => {
                        check_response(response.description.as_deref(), &response.content, &pointer, ctx)
                    }
                    RefOr::Ref { reference } => {
                        if doc.resolve_response(response).is_none() {
                            unresolved(reference, &pointer, ctx);
                        }
                    }
                }
            }
        }

        if let Some(components) = &doc.components {
            for (name, body) in &components.request_bodies {
                if let RefOr::Item(body) = body {
                    let pointer = format!("#/components/requestBodies/{}", escape_pointer(name));
                    check_request_body(&body.content, &pointer, ctx);
                }
            }
            for (name, response) in &components.responses {
                if let RefOr::Item(response) = response {
                    let pointer = format!("#/components/responses/{}", escape_pointer(name));
                    check_response(response.description.as_deref(), &response.content, &pointer, ctx);
                }
            }
        }
    }
}

fn unresolved(reference: &str, pointer: &str, ctx: &mut AnalysisContext) {
    ctx.push(Issue::new(
        IssueCode::UnresolvedReference,
        format!("Reference '{}' does not resolve", reference),
        pointer,
    ));
}

fn check_request_body(content: &IndexMap<String, MediaType>, pointer: &str, ctx: &mut AnalysisContext) {
    if content.is_empty() {
        ctx.push(Issue::new(
            IssueCode::EmptyRequestBodyContent,
            "Request body declares no content",
            pointer,
        ));
    }
    check_content(content, pointer, ctx);
}

fn check_response(
    description: Option<&str>,
    content: &IndexMap<String, MediaType>,
    pointer: &str,
    ctx: &mut AnalysisContext,
) {
    if description.map(|d| d.trim().is_empty()).unwrap_or(true) {
        ctx.push(Issue::new(
            IssueCode::MissingResponseDescription,
            "Response has no description",
            format!("{}/description", pointer),
        ));
    }
    check_content(content, pointer, ctx);
}

/// The schema itself, or its `items` for arrays
fn shape_of(schema: &Schema) -> &Schema {
    match &schema.items {
        Some(items) if schema.is_type("array") => &**items,
        _ => schema,
    }
}

fn check_content(content: &IndexMap<String, MediaType>, owner: &str, ctx: &mut AnalysisContext) {
    for (media_type, media) in content {
        let Some(schema) = &media.schema else {
            continue;
        };
        let pointer = format!("{}/content/{}/schema", owner, escape_pointer(media_type));

        if is_complex_inline(shape_of(schema)) {
            ctx.push(Issue::new(
                IssueCode::InlineComplexSchema,
                format!(
                    "Inline object schema under '{}'; extract it to components/schemas for a named model",
                    media_type
                ),
                pointer.clone(),
            ));
        }

        if is_json_media_type(media_type) && shape_of(schema).is_binary_string() {
            ctx.push(Issue::new(
                IssueCode::BinaryInJsonContent,
                format!("Binary string schema declared under JSON media type '{}'", media_type),
                pointer,
            ));
        }
    }
}
