//! Schema rules
//!
//! Every component schema is walked once from its own root. The same walk
//! registers dependency edges (owner -> referenced component) for the cycle
//! pass and evaluates the per-node rules. Inline schemas under parameters,
//! request bodies and responses are walked too, without dependency edges.

use std::collections::HashSet;

use regex::Regex;

use super::{enums, operations, AnalysisPass};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{
    escape_pointer, schema_pointer, MediaType, OpenApiDocument, Parameter, RefOr, Schema,
    SCHEMA_REF_PREFIX,
};
use crate::walker::{walk_schema, Slot, Visit};

pub struct SchemaPass;

impl AnalysisPass for SchemaPass {
    fn name(&self) -> &'static str {
        "schemas"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        if let Some(schemas) = doc.schemas() {
            for (name, schema) in schemas {
                ctx.register_schema(name);
                check_component(doc, name, schema, ctx);
            }
        }

        for (pointer, schema) in inline_schemas(doc) {
            check_inline(doc, &pointer, schema, ctx);
        }
    }
}

fn check_component(doc: &OpenApiDocument, name: &str, schema: &Schema, ctx: &mut AnalysisContext) {
    let pointer = schema_pointer(name);
    let mut visited = HashSet::new();
    let mut self_reported = false;

    walk_schema(schema, &pointer, &mut visited, &mut |visit: &Visit<'_>| {
        let mut found = Vec::new();

        if let Some(target) = visit.schema.reference_target() {
            if visit.schema.is_local_reference() {
                ctx.add_dependency(name, target);
                // One report per schema, at the first site
                if target == name && !self_reported {
                    self_reported = true;
                    found.push(Issue::new(
                        IssueCode::SelfReferencingSchema,
                        format!("Schema '{}' references itself at {}", name, visit.path),
                        visit.path,
                    ));
                }
            }
            found.extend(check_reference(doc, visit));
        } else {
            found.extend(check_node(doc, visit));
        }

        for issue in found {
            ctx.push(issue.with_component(name, pointer.as_str(), "schema"));
        }
    });
}

fn check_inline(doc: &OpenApiDocument, pointer: &str, schema: &Schema, ctx: &mut AnalysisContext) {
    let mut visited = HashSet::new();
    walk_schema(schema, pointer, &mut visited, &mut |visit: &Visit<'_>| {
        let found = if visit.schema.is_reference() {
            check_reference(doc, visit)
        } else {
            check_node(doc, visit)
        };
        for issue in found {
            ctx.push(issue);
        }
    });
}

/// Inline schemas owned by operations and by the reusable parameter, request
/// body and response components, with their pointers
///
/// Referenced parameters/bodies/responses are skipped at the use site; their
/// component entry is walked once instead.
pub fn inline_schemas(doc: &OpenApiDocument) -> Vec<(String, &Schema)> {
    let mut found = Vec::new();

    for (path, item) in &doc.paths {
        let path_pointer = crate::document::path_pointer(path);
        collect_parameters(&item.parameters, &path_pointer, &mut found);
    }

    for site in operations(doc) {
        collect_parameters(&site.operation.parameters, &site.pointer, &mut found);
        if let Some(RefOr::Item(body)) = &site.operation.request_body {
            collect_content(&body.content, &format!("{}/requestBody", site.pointer), &mut found);
        }
        for (status, response) in &site.operation.responses {
            if let RefOr::Item(response) = response {
                let owner = format!("{}/responses/{}", site.pointer, escape_pointer(status));
                collect_content(&response.content, &owner, &mut found);
            }
        }
    }

    if let Some(components) = &doc.components {
        for (name, param) in &components.parameters {
            if let RefOr::Item(param) = param {
                collect_parameter(param, &format!("#/components/parameters/{}", escape_pointer(name)), &mut found);
            }
        }
        for (name, body) in &components.request_bodies {
            if let RefOr::Item(body) = body {
                let owner = format!("#/components/requestBodies/{}", escape_pointer(name));
                collect_content(&body.content, &owner, &mut found);
            }
        }
        for (name, response) in &components.responses {
            if let RefOr::Item(response) = response {
                let owner = format!("#/components/responses/{}", escape_pointer(name));
                collect_content(&response.content, &owner, &mut found);
            }
        }
    }

    found
}

fn collect_parameters<'a>(
    params: &'a [RefOr<Parameter>],
    owner: &str,
    found: &mut Vec<(String, &'a Schema)>,
) {
    for (i, param) in params.iter().enumerate() {
        if let RefOr::Item(param) = param {
            collect_parameter(param, &format!("{}/parameters/{}", owner, i), found);
        }
    }
}

fn collect_parameter<'a>(param: &'a Parameter, owner: &str, found: &mut Vec<(String, &'a Schema)>) {
    if let Some(schema) = &param.schema {
        found.push((format!("{}/schema", owner), schema));
    }
    collect_content(&param.content, owner, found);
}

fn collect_content<'a>(
    content: &'a indexmap::IndexMap<String, MediaType>,
    owner: &str,
    found: &mut Vec<(String, &'a Schema)>,
) {
    for (media_type, media) in content {
        if let Some(schema) = &media.schema {
            let pointer = format!("{}/content/{}/schema", owner, escape_pointer(media_type));
            found.push((pointer, schema));
        }
    }
}

// =============================================================================
// Node rules
// =============================================================================

/// Local references must point at a declared component
fn check_reference(doc: &OpenApiDocument, visit: &Visit<'_>) -> Vec<Issue> {
    let mut issues = Vec::new();
    if !visit.schema.is_local_reference() {
        return issues;
    }
    if let Some(target) = visit.schema.reference_target() {
        if doc.schema(target).is_none() {
            issues.push(Issue::new(
                IssueCode::UnresolvedReference,
                format!("Reference to undeclared schema '{}'", target),
                visit.path,
            ));
        }
    }
    issues
}

/// Rules for one inline (non-reference) node
pub fn check_node(doc: &OpenApiDocument, visit: &Visit<'_>) -> Vec<Issue> {
    let schema = visit.schema;
    let path = visit.path;
    let mut issues = Vec::new();

    if let Slot::Property(name) = visit.slot {
        if schema.is_empty() {
            issues.push(Issue::new(
                IssueCode::EmptyPropertySchema,
                format!("Property '{}' has an empty schema", name),
                path,
            ));
        }
    }

    if schema.is_type("array") && schema.items.as_deref().map(Schema::is_empty).unwrap_or(true) {
        issues.push(Issue::new(
            IssueCode::EmptyArrayItems,
            "Array schema does not describe its items",
            path,
        ));
    }

    check_discriminator(doc, schema, path, &mut issues);
    check_all_of(doc, schema, path, &mut issues);
    check_ranges(schema, path, &mut issues);

    if let Some(pattern) = &schema.pattern {
        if let Some(reason) = invalid_pattern(pattern) {
            issues.push(Issue::new(
                IssueCode::InvalidPattern,
                format!("Pattern '{}' does not compile: {}", pattern, reason),
                path,
            ));
        }
    }

    if is_weakly_typed(schema) {
        issues.push(Issue::new(
            IssueCode::WeakTyping,
            "Object schema has no properties and accepts any additional property",
            path,
        ));
    }

    if let Some(values) = &schema.enum_values {
        let empty = values
            .iter()
            .any(|v| matches!(v, crate::document::EnumValue::String(s) if s.is_empty()));
        if empty {
            issues.push(Issue::new(
                IssueCode::EmptyEnumValue,
                "Enum contains an empty string value",
                path,
            ));
        }
    }

    issues.extend(enums::check_enum(schema, path));
    issues
}

/// Names listed as required by the schema or by any of its allOf members
fn required_names<'a>(doc: &'a OpenApiDocument, schema: &'a Schema) -> HashSet<&'a str> {
    let mut names: HashSet<&str> = schema.required.iter().map(String::as_str).collect();
    for member in &schema.all_of {
        let member = match member.reference_target() {
            Some(target) if member.is_local_reference() => match doc.schema(target) {
                Some(resolved) => resolved,
                None => continue,
            },
            _ => member,
        };
        names.extend(member.required.iter().map(String::as_str));
    }
    names
}

/// Mapping values may be full refs or bare component names
fn mapping_target_exists(doc: &OpenApiDocument, target: &str) -> bool {
    match target.strip_prefix(SCHEMA_REF_PREFIX) {
        Some(name) => doc.schema(name).is_some(),
        None => !target.contains('/') && !target.contains('#') && doc.schema(target).is_some(),
    }
}

fn check_discriminator(doc: &OpenApiDocument, schema: &Schema, path: &str, issues: &mut Vec<Issue>) {
    let Some(discriminator) = &schema.discriminator else {
        let polymorphic = schema
            .one_of
            .iter()
            .any(|m| m.is_reference() || m.is_object_like());
        if polymorphic {
            issues.push(Issue::new(
                IssueCode::MissingDiscriminator,
                format!(
                    "oneOf with {} alternatives has no discriminator; clients cannot pick the subtype",
                    schema.one_of.len()
                ),
                path,
            ));
        }
        return;
    };

    let location = format!("{}.discriminator", path);

    match discriminator.property_name.as_deref().filter(|p| !p.trim().is_empty()) {
        None => issues.push(Issue::new(
            IssueCode::MissingDiscriminatorProperty,
            "Discriminator has no propertyName",
            location.clone(),
        )),
        Some(property) => {
            if !required_names(doc, schema).contains(property) {
                issues.push(Issue::new(
                    IssueCode::DiscriminatorPropertyNotRequired,
                    format!("Discriminator property '{}' is not listed in required", property),
                    location.clone(),
                ));
            }
        }
    }

    if discriminator.mapping.is_empty() {
        issues.push(Issue::new(
            IssueCode::MissingDiscriminatorMapping,
            "Discriminator declares no mapping",
            location.clone(),
        ));
    }

    for (value, target) in &discriminator.mapping {
        if !mapping_target_exists(doc, target) {
            issues.push(Issue::new(
                IssueCode::InvalidDiscriminatorMapping,
                format!("Mapping '{}' points at '{}', which is not a declared schema", value, target),
                format!("{}.mapping.{}", location, value),
            ));
        }
    }
}

fn check_all_of(doc: &OpenApiDocument, schema: &Schema, path: &str, issues: &mut Vec<Issue>) {
    for (i, member) in schema.all_of.iter().enumerate() {
        let location = format!("{}{}", path, Slot::AllOf(i));

        let resolved = match member.reference_target() {
            // Unresolved refs are reported by the reference rule
            Some(target) if member.is_local_reference() => match doc.schema(target) {
                Some(resolved) => resolved,
                None => continue,
            },
            Some(_) => continue,
            None => member,
        };

        if resolved.is_empty() {
            issues.push(Issue::new(
                IssueCode::InvalidAllOfFragment,
                format!("allOf member {} is empty", i),
                location,
            ));
        } else if resolved.schema_type.is_some() && !resolved.is_type("object") {
            issues.push(Issue::new(
                IssueCode::InvalidAllOfFragment,
                format!("allOf member {} is not an object schema", i),
                location,
            ));
        }
    }
}

fn check_ranges(schema: &Schema, path: &str, issues: &mut Vec<Issue>) {
    let mut inverted = |lower: &str, upper: &str, low: f64, high: f64| {
        issues.push(Issue::new(
            IssueCode::InvalidRange,
            format!("{} ({}) is greater than {} ({})", lower, low, upper, high),
            path,
        ));
    };

    if let (Some(min), Some(max)) = (schema.minimum, schema.maximum) {
        if min > max {
            inverted("minimum", "maximum", min, max);
        }
    }

    let counted = [
        ("minLength", "maxLength", schema.min_length, schema.max_length),
        ("minItems", "maxItems", schema.min_items, schema.max_items),
        ("minProperties", "maxProperties", schema.min_properties, schema.max_properties),
    ];
    for (lower, upper, min, max) in counted {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                inverted(lower, upper, min as f64, max as f64);
            }
        }
    }
}

/// Compile error for `pattern`, ignoring features the regex engine
/// deliberately lacks (look-around, backreferences) but ECMA 262 allows
fn invalid_pattern(pattern: &str) -> Option<String> {
    match Regex::new(pattern) {
        Ok(_) => None,
        Err(err) => {
            let message = err.to_string();
            if message.contains("look-around") || message.contains("backreferences") {
                None
            } else {
                Some(message.lines().last().unwrap_or_default().trim().to_string())
            }
        }
    }
}

fn is_weakly_typed(schema: &Schema) -> bool {
    let untyped_or_object = schema.schema_type.is_none() || schema.is_type("object");
    untyped_or_object
        && schema.properties.is_empty()
        && !schema.has_composition()
        && schema
            .additional_properties
            .as_ref()
            .map(|ap| ap.is_free_form())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: serde_json::Value) -> (Vec<Issue>, AnalysisContext) {
        let doc: OpenApiDocument = serde_json::from_value(value).unwrap();
        let mut ctx = AnalysisContext::default();
        SchemaPass.run(&doc, &mut ctx);
        (ctx.issues().to_vec(), ctx)
    }

    fn schemas(value: serde_json::Value) -> Vec<Issue> {
        run(json!({ "components": { "schemas": value } })).0
    }

    fn codes(issues: &[Issue]) -> Vec<IssueCode> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_clean_schema() {
        let issues = schemas(json!({
            "Pet": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string", "pattern": "^[a-z]+$" },
                    "tags": { "type": "array", "items": { "type": "string" } }
                }
            }
        }));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_one_of_without_discriminator() {
        let issues = schemas(json!({
            "Pet": { "oneOf": [
                { "$ref": "#/components/schemas/Dog" },
                { "$ref": "#/components/schemas/Cat" }
            ] },
            "Dog": { "type": "object", "properties": { "bark": { "type": "boolean" } } },
            "Cat": { "type": "object", "properties": { "meow": { "type": "boolean" } } }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::MissingDiscriminator]);
        assert_eq!(issues[0].component_name.as_deref(), Some("Pet"));
        assert_eq!(issues[0].location, "#/components/schemas/Pet");
    }

    #[test]
    fn test_one_of_scalars_needs_no_discriminator() {
        let issues = schemas(json!({
            "Id": { "oneOf": [ { "type": "string" }, { "type": "integer" } ] }
        }));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_discriminator_rules() {
        let issues = schemas(json!({
            "Pet": {
                "type": "object",
                "properties": { "kind": { "type": "string" } },
                "oneOf": [ { "$ref": "#/components/schemas/Dog" } ],
                "discriminator": {
                    "propertyName": "kind",
                    "mapping": { "dog": "#/components/schemas/Dog", "cat": "#/components/schemas/Cat" }
                }
            },
            "Dog": { "type": "object", "properties": { "kind": { "type": "string" } } }
        }));
        assert_eq!(
            codes(&issues),
            vec![IssueCode::DiscriminatorPropertyNotRequired, IssueCode::InvalidDiscriminatorMapping]
        );
        assert_eq!(issues[1].location, "#/components/schemas/Pet.discriminator.mapping.cat");
    }

    #[test]
    fn test_discriminator_required_through_all_of() {
        let issues = schemas(json!({
            "Base": { "type": "object", "required": ["kind"], "properties": { "kind": { "type": "string" } } },
            "Dog": {
                "allOf": [ { "$ref": "#/components/schemas/Base" } ],
                "discriminator": { "propertyName": "kind", "mapping": { "dog": "Dog" } }
            }
        }));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_discriminator_without_property_or_mapping() {
        let issues = schemas(json!({
            "Pet": { "type": "object", "properties": { "a": { "type": "string" } }, "discriminator": {} }
        }));
        assert_eq!(
            codes(&issues),
            vec![IssueCode::MissingDiscriminatorProperty, IssueCode::MissingDiscriminatorMapping]
        );
    }

    #[test]
    fn test_invalid_range_once() {
        let issues = schemas(json!({ "Score": { "type": "number", "minimum": 10, "maximum": 5 } }));
        assert_eq!(codes(&issues), vec![IssueCode::InvalidRange]);
    }

    #[test]
    fn test_counted_ranges() {
        let issues = schemas(json!({
            "Name": { "type": "string", "minLength": 4, "maxLength": 2 },
            "List": { "type": "array", "items": { "type": "string" }, "minItems": 3, "maxItems": 1 }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::InvalidRange, IssueCode::InvalidRange]);
    }

    #[test]
    fn test_empty_property_and_items() {
        let issues = schemas(json!({
            "Thing": {
                "type": "object",
                "properties": {
                    "blob": {},
                    "list": { "type": "array" }
                }
            }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::EmptyPropertySchema, IssueCode::EmptyArrayItems]);
        assert_eq!(issues[0].location, "#/components/schemas/Thing.blob");
        assert_eq!(issues[1].location, "#/components/schemas/Thing.list");
    }

    #[test]
    fn test_patterns() {
        assert!(invalid_pattern("^[a-z]+$").is_none());
        assert!(invalid_pattern("(?=abc)").is_none());
        assert!(invalid_pattern("[a-").is_some());

        let issues = schemas(json!({ "Code": { "type": "string", "pattern": "(unclosed" } }));
        assert_eq!(codes(&issues), vec![IssueCode::InvalidPattern]);
    }

    #[test]
    fn test_weak_typing() {
        let issues = schemas(json!({
            "Bag": { "type": "object", "additionalProperties": true },
            "Map": { "type": "object", "additionalProperties": { "type": "string" } }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::WeakTyping]);
        assert_eq!(issues[0].component_name.as_deref(), Some("Bag"));
    }

    #[test]
    fn test_all_of_fragments() {
        let issues = schemas(json!({
            "Mixed": { "allOf": [ {}, { "type": "string" }, { "type": "object" } ] }
        }));
        assert_eq!(
            codes(&issues),
            vec![IssueCode::InvalidAllOfFragment, IssueCode::InvalidAllOfFragment]
        );
    }

    #[test]
    fn test_enum_values() {
        let issues = schemas(json!({ "Size": { "type": "string", "enum": ["", "small", "large"] } }));
        assert_eq!(codes(&issues), vec![IssueCode::EmptyEnumValue]);
    }

    #[test]
    fn test_self_reference_and_dependencies() {
        let (issues, ctx) = run(json!({
            "components": { "schemas": {
                "Tree": {
                    "type": "object",
                    "properties": {
                        "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } },
                        "owner": { "$ref": "#/components/schemas/User" }
                    }
                },
                "User": { "type": "object", "properties": { "name": { "type": "string" } } }
            } }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::SelfReferencingSchema]);
        assert_eq!(issues[0].location, "#/components/schemas/Tree.children.items");

        let deps = ctx.dependencies();
        let tree: Vec<_> = deps["Tree"].iter().map(String::as_str).collect();
        assert_eq!(tree, vec!["Tree", "User"]);
        assert!(deps["User"].is_empty());
    }

    #[test]
    fn test_unresolved_reference() {
        let issues = schemas(json!({
            "Order": { "type": "object", "properties": { "item": { "$ref": "#/components/schemas/Item" } } }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::UnresolvedReference]);
    }

    #[test]
    fn test_sibling_unresolved_references_each_reported() {
        let issues = schemas(json!({
            "Order": { "type": "object", "properties": {
                "item": { "$ref": "#/components/schemas/Item" },
                "spare": { "$ref": "#/components/schemas/Item" }
            } }
        }));
        let locations: Vec<_> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(codes(&issues), vec![IssueCode::UnresolvedReference; 2]);
        assert_eq!(
            locations,
            vec!["#/components/schemas/Order.item", "#/components/schemas/Order.spare"]
        );
    }

    #[test]
    fn test_self_reference_reported_once_per_schema() {
        let issues = schemas(json!({
            "Category": { "type": "object", "properties": {
                "parent": { "$ref": "#/components/schemas/Category" },
                "children": { "type": "array", "items": { "$ref": "#/components/schemas/Category" } }
            } }
        }));
        assert_eq!(codes(&issues), vec![IssueCode::SelfReferencingSchema]);
        assert_eq!(issues[0].location, "#/components/schemas/Category.parent");
    }

    #[test]
    fn test_inline_operation_schemas() {
        let (issues, ctx) = run(json!({
            "paths": { "/scores": { "post": {
                "requestBody": { "content": { "application/json": {
                    "schema": { "type": "integer", "minimum": 3, "maximum": 1 }
                } } },
                "responses": { "200": { "description": "ok", "content": { "application/json": {
                    "schema": { "$ref": "#/components/schemas/Missing" }
                } } } }
            } } }
        }));
        assert_eq!(
            codes(&issues),
            vec![IssueCode::InvalidRange, IssueCode::UnresolvedReference]
        );
        assert_eq!(
            issues[0].location,
            "#/paths/~1scores/post/requestBody/content/application~1json/schema"
        );
        assert!(issues[0].component_name.is_none());
        assert!(ctx.dependencies().is_empty());
    }
}
