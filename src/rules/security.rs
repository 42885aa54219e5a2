//! Security schemes and requirements

use super::{operations, AnalysisPass};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::{escape_pointer, OpenApiDocument, SecurityRequirement};

pub struct SecurityPass;

impl AnalysisPass for SecurityPass {
    fn name(&self) -> &'static str {
        "security"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        let schemes = doc.components.as_ref().map(|c| &c.security_schemes);

        if let Some(schemes) = schemes {
            for (name, scheme) in schemes {
                let pointer = format!("#/components/securitySchemes/{}", escape_pointer(name));
                let Some(resolved) = doc.resolve_security_scheme(scheme) else {
                    ctx.push(Issue::new(
                        IssueCode::UnresolvedReference,
                        format!("Security scheme '{}' does not resolve", name),
                        pointer,
                    ));
                    continue;
                };
                let has_flows = resolved
                    .flows
                    .as_ref()
                    .map(|f| f.as_object().map(|o| !o.is_empty()).unwrap_or(false))
                    .unwrap_or(false);
                if resolved.is_oauth2() && !has_flows {
                    ctx.push(
                        Issue::new(
                            IssueCode::MissingOAuth2Flows,
                            format!("OAuth2 security scheme '{}' declares no flows", name),
                            format!("{}/flows", pointer),
                        )
                        .with_component(name.as_str(), pointer.as_str(), "securityScheme"),
                    );
                }
            }
        }

        check_requirements(&doc.security, "#", doc, ctx);
        for site in operations(doc) {
            if let Some(requirements) = &site.operation.security {
                check_requirements(requirements, &site.pointer, doc, ctx);
            }
        }
    }
}

/// Every scheme named by a requirement must be declared under components
fn check_requirements(
    requirements: &[SecurityRequirement],
    owner: &str,
    doc: &OpenApiDocument,
    ctx: &mut AnalysisContext,
) {
    let schemes = doc.components.as_ref().map(|c| &c.security_schemes);
    for (i, requirement) in requirements.iter().enumerate() {
        for scheme in requirement.keys() {
            if !schemes.map(|s| s.contains_key(scheme)).unwrap_or(false) {
                ctx.push(Issue::new(
                    IssueCode::UndefinedSecurityScheme,
                    format!("Security requirement names undeclared scheme '{}'", scheme),
                    format!("{}/security/{}", owner, i),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: serde_json::Value) -> Vec<Issue> {
        let doc: OpenApiDocument = serde_json::from_value(value).unwrap();
        let mut ctx = AnalysisContext::default();
        SecurityPass.run(&doc, &mut ctx);
        ctx.into_issues()
    }

    #[test]
    fn test_oauth2_needs_flows() {
        let issues = run(json!({
            "components": { "securitySchemes": {
                "oauth": { "type": "oauth2" },
                "full": { "type": "oauth2", "flows": { "clientCredentials": {
                    "tokenUrl": "https://example.com/token", "scopes": {}
                } } },
                "key": { "type": "apiKey", "in": "header", "name": "X-Key" }
            } }
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::MissingOAuth2Flows);
        assert_eq!(issues[0].location, "#/components/securitySchemes/oauth/flows");
        assert_eq!(issues[0].component_name.as_deref(), Some("oauth"));
    }

    #[test]
    fn test_undeclared_schemes() {
        let issues = run(json!({
            "security": [ { "bearer": [] } ],
            "paths": { "/a": { "get": { "security": [ { "key": [] }, { "basic": [] } ] } } },
            "components": { "securitySchemes": { "key": { "type": "apiKey" } } }
        }));
        let locations: Vec<_> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locations, vec!["#/security/0", "#/paths/~1a/get/security/1"]);
        assert!(issues.iter().all(|i| i.code == IssueCode::UndefinedSecurityScheme));
    }

    #[test]
    fn test_empty_operation_security_is_fine() {
        let issues = run(json!({ "paths": { "/a": { "get": { "security": [] } } } }));
        assert!(issues.is_empty());
    }
}
