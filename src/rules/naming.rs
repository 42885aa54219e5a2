//! Component schema names
//!
//! Names become type names in generated clients, so they must be valid
//! identifiers, avoid target-language keywords, and stay distinct once
//! normalized to PascalCase.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::{is_identifier, AnalysisPass};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{schema_pointer, OpenApiDocument};

/// Keywords of the languages clients are generated for (C#, Java, Go,
/// TypeScript, Python, PHP), lowercase
const RESERVED_WORDS: &[&str] = &[
    "abstract", "and", "as", "assert", "async", "await", "base", "bool", "boolean", "break",
    "byte", "case", "catch", "chan", "char", "checked", "class", "const", "continue", "decimal",
    "def", "default", "defer", "del", "delegate", "do", "double", "elif", "else", "enum",
    "event", "except", "explicit", "export", "extends", "extern", "fallthrough", "false", "final",
    "finally", "fixed", "float", "for", "foreach", "from", "func", "function", "global", "go",
    "goto", "if", "implements", "implicit", "import", "in", "instanceof", "int", "interface",
    "internal", "is", "lambda", "let", "lock", "long", "map", "namespace", "new", "nil",
    "none", "nonlocal", "not", "null", "object", "operator", "or", "out", "override", "package",
    "params", "pass", "private", "protected", "public", "raise", "range", "readonly", "ref",
    "return", "sbyte", "sealed", "select", "short", "sizeof", "static", "string", "struct",
    "super", "switch", "this", "throw", "throws", "true", "try", "type", "typeof", "uint",
    "ulong", "unchecked", "unsafe", "ushort", "using", "var", "virtual", "void", "volatile",
    "while", "with", "yield",
];

pub struct NamingPass;

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\W_]+").expect("separator pattern is valid"))
}

/// PascalCase form used for type names: split on non-word characters and
/// underscores, upper-case the first letter of every segment
pub fn normalize_name(name: &str) -> String {
    separator_regex()
        .split(name)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn is_reserved(name: &str, extra: &[String]) -> bool {
    let lower = name.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str()) || extra.iter().any(|w| w.eq_ignore_ascii_case(name))
}

impl AnalysisPass for NamingPass {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        let Some(schemas) = doc.schemas() else {
            return;
        };

        // lowercased normalized form -> first declared name
        let mut claimed: HashMap<String, &str> = HashMap::new();

        for name in schemas.keys() {
            let pointer = schema_pointer(name);
            let mut found = Vec::new();

            if !is_identifier(name) {
                found.push(Issue::new(
                    IssueCode::InvalidSchemaName,
                    format!(
                        "Schema name '{}' is not a valid identifier (letters, digits, underscore; no leading digit)",
                        name
                    ),
                    pointer.clone(),
                ));
            }

            if is_reserved(name, &ctx.rules().extra_reserved_words) {
                found.push(Issue::new(
                    IssueCode::ReservedKeywordName,
                    format!("Schema name '{}' is a reserved word in generated code", name),
                    pointer.clone(),
                ));
            }

            let normalized = normalize_name(name);
            if !normalized.is_empty() {
                match claimed.get(&normalized.to_lowercase()) {
                    Some(first) => found.push(Issue::new(
                        IssueCode::NormalizedNameCollision,
                        format!(
                            "Schema name '{}' normalizes to '{}', already used by '{}'",
                            name, normalized, first
                        ),
                        pointer.clone(),
                    )),
                    None => {
                        claimed.insert(normalized.to_lowercase(), name.as_str());
                    }
                }
            }

            for issue in found {
                ctx.push(issue.with_component(name.as_str(), pointer.as_str(), "schema"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use serde_json::json;

    fn run_with(names: &[&str], rules: RuleConfig) -> Vec<Issue> {
        let schemas: serde_json::Map<String, serde_json::Value> = names
            .iter()
            .map(|n| (n.to_string(), json!({ "type": "object" })))
            .collect();
        let doc: OpenApiDocument =
            serde_json::from_value(json!({ "components": { "schemas": schemas } })).unwrap();
        let mut ctx = AnalysisContext::new(rules);
        NamingPass.run(&doc, &mut ctx);
        ctx.into_issues()
    }

    fn run(names: &[&str]) -> Vec<Issue> {
        run_with(names, RuleConfig::default())
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("user_profile"), "UserProfile");
        assert_eq!(normalize_name("user-profile"), "UserProfile");
        assert_eq!(normalize_name("UserProfile"), "UserProfile");
        assert_eq!(normalize_name("api.v2.Item"), "ApiV2Item");
        assert_eq!(normalize_name("__"), "");
    }

    #[test]
    fn test_clean_names() {
        assert!(run(&["Pet", "PetList", "Error"]).is_empty());
    }

    #[test]
    fn test_collision_references_first_name() {
        let issues = run(&["UserProfile", "user_profile", "user-profile"]);
        let collisions: Vec<_> = issues
            .iter()
            .filter(|i| i.code == IssueCode::NormalizedNameCollision)
            .collect();
        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[0].component_name.as_deref(), Some("user_profile"));
        assert!(collisions[0].message.contains("'UserProfile'"));
        assert!(collisions[1].message.contains("'UserProfile'"));
    }

    #[test]
    fn test_collision_is_case_insensitive() {
        let issues = run(&["userProfile", "UserProfile"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].component_name.as_deref(), Some("UserProfile"));
    }

    #[test]
    fn test_invalid_and_reserved() {
        let issues = run(&["2Fast", "class", "Object"]);
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                IssueCode::InvalidSchemaName,
                IssueCode::ReservedKeywordName,
                IssueCode::ReservedKeywordName
            ]
        );
        assert_eq!(issues[0].location, "#/components/schemas/2Fast");
    }

    #[test]
    fn test_extra_reserved_words() {
        let rules = RuleConfig {
            extra_reserved_words: vec!["Widget".to_string()],
            ..Default::default()
        };
        let issues = run_with(&["widget"], rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::ReservedKeywordName);
    }
}
