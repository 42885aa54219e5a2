//! Enum rules
//!
//! Enum values are tagged by JSON kind when the document loads, so these
//! checks only match on [`EnumKind`].

use std::collections::BTreeSet;

use crate::diagnostics::{Issue, IssueCode};
use crate::document::schema::EnumKind;
use crate::document::Schema;

/// Findings for the `enum` keyword of one schema node
pub fn check_enum(schema: &Schema, location: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    let Some(values) = &schema.enum_values else {
        return issues;
    };

    match values.len() {
        0 => {
            issues.push(Issue::new(
                IssueCode::EmptyEnum,
                "Enum declares no values",
                location,
            ));
            return issues;
        }
        1 => issues.push(Issue::new(
            IssueCode::SingleValueEnum,
            "Enum has a single value; consider a constant or a plain type",
            location,
        )),
        _ => {}
    }

    let kinds: BTreeSet<EnumKind> = values.iter().map(|v| v.kind()).collect();

    if values.len() > 1 && kinds.len() == 1 && kinds.contains(&EnumKind::Bool) {
        issues.push(Issue::new(
            IssueCode::BooleanEnum,
            "Enum only lists boolean values; use type: boolean instead",
            location,
        ));
    }

    if kinds.contains(&EnumKind::Array) {
        issues.push(Issue::new(
            IssueCode::NestedArrayEnum,
            "Enum contains array values",
            location,
        ));
    }

    let non_null: Vec<_> = kinds.iter().filter(|k| **k != EnumKind::Null).collect();
    if non_null.len() > 1 {
        let names: Vec<String> = non_null.iter().map(|k| format!("{:?}", k).to_lowercase()).collect();
        issues.push(Issue::new(
            IssueCode::MixedTypeEnum,
            format!("Enum mixes value types ({})", names.join(", ")),
            location,
        ));
    }

    issues
}
