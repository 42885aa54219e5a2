//! Document-level structure: info, servers, paths

use super::AnalysisPass;
use crate::context::AnalysisContext;
use crate::diagnostics::{Issue, IssueCode};
use crate::document::OpenApiDocument;

pub struct StructurePass;

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

impl AnalysisPass for StructurePass {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn run(&self, doc: &OpenApiDocument, ctx: &mut AnalysisContext) {
        let info = doc.info.as_ref();

        if is_blank(info.and_then(|i| i.title.as_deref())) {
            ctx.push(Issue::new(
                IssueCode::MissingTitle,
                "API title is required (info.title)",
                "#/info/title",
            ));
        }

        if is_blank(info.and_then(|i| i.version.as_deref())) {
            ctx.push(Issue::new(
                IssueCode::MissingVersion,
                "API version is required (info.version)",
                "#/info/version",
            ));
        }

        if doc.servers.is_empty() {
            ctx.push(Issue::new(
                IssueCode::MissingServers,
                "No servers declared; generated clients will have no default base URL",
                "#/servers",
            ));
        }

        for (i, server) in doc.servers.iter().enumerate() {
            if is_blank(server.url.as_deref()) {
                ctx.push(Issue::new(
                    IssueCode::EmptyServerUrl,
                    format!("Server {} has no url", i),
                    format!("#/servers/{}/url", i),
                ));
            }
        }

        if doc.paths.is_empty() {
            ctx.push(Issue::new(
                IssueCode::NoPaths,
                "The document declares no paths",
                "#/paths",
            ));
        }
    }
}
