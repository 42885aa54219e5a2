//! Operation tags

use std::collections::HashSet;

use super::{operations, AnalysisPass};
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::OpenApiDocument;

pub struct TagPass;

impl AnalysisPass for TagPass {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        let declared: HashSet<&str> = doc.tags.iter().map(|t| t.name.as_str()).collect();

        for site in operations(doc) {
            let location = format!("{}/tags", site.pointer);
            if site.operation.tags.is_empty() {
                ctx.push(Issue::new(
                    IssueCode::MissingTags,
                    format!("{} has no tags", site.label()),
                    location,
                ));
                continue;
            }

            for (i, tag) in site.operation.tags.iter().enumerate() {
                if !declared.contains(tag.as_str()) {
                    ctx.push(Issue::new(
                        IssueCode::UndeclaredTag,
                        format!("{} uses tag '{}', which is not declared in the top-level tags", site.label(), tag),
                        format!("{}/{}", location, i),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tags() {
        let doc: OpenApiDocument = serde_json::from_value(json!({
            "tags": [ { "name": "pets" } ],
            "paths": {
                "/pets": {
                    "get": { "tags": ["pets"] },
                    "post": { "tags": ["pets", "admin"] },
                    "delete": {}
                }
            }
        }))
        .unwrap();
        let mut ctx = AnalysisContext::default();
        TagPass.run(&doc, &mut ctx);

        let found: Vec<_> = ctx.issues().iter().map(|i| (i.code, i.location.as_str())).collect();
        assert_eq!(
            found,
            vec![
                (IssueCode::UndeclaredTag, "#/paths/~1pets/post/tags/1"),
                (IssueCode::MissingTags, "#/paths/~1pets/delete/tags"),
            ]
        );
    }
}
