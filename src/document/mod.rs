//! OpenAPI Document Graph
//!
//! Typed, read-only view of an OpenAPI 3.x document. Only the parts the
//! analysis passes look at are modelled; everything else is ignored on load.
//!
//! Mappings keep declaration order (`IndexMap`) so that "first" and "later"
//! findings are stable for a given source text.

pub mod parse;
pub mod schema;

pub use parse::{parse_document, parse_document_file};
pub use schema::{AdditionalProperties, Discriminator, EnumValue, Schema, SchemaType};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of local component schema references
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// HTTP methods in the order the OpenAPI path item object lists them
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: Option<String>,
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Option<Components>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Scheme name -> required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

// =============================================================================
// References
// =============================================================================

/// A `$ref` or an inline object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

impl<T> RefOr<T> {
    /// Resolve against a components table keyed by the last pointer segment
    pub fn resolve<'a>(&'a self, table: Option<&'a IndexMap<String, RefOr<T>>>) -> Option<&'a T> {
        self.resolve_depth(table, 0)
    }

    fn resolve_depth<'a>(
        &'a self,
        table: Option<&'a IndexMap<String, RefOr<T>>>,
        depth: usize,
    ) -> Option<&'a T> {
        match self {
            Self::Item(item) => Some(item),
            Self::Ref { reference } => {
                // Chains of component refs are legal; a loop is not.
                if depth > 16 {
                    return None;
                }
                let name = reference.rsplit('/').next()?;
                table?.get(name)?.resolve_depth(table, depth + 1)
            }
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Ref { reference } => Some(reference),
            Self::Item(_) => None,
        }
    }
}

// =============================================================================
// Paths and operations
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub options: Option<Operation>,
    #[serde(default)]
    pub head: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Declared operations with their lowercase method name
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        let slots = [
            &self.get,
            &self.put,
            &self.post,
            &self.delete,
            &self.options,
            &self.head,
            &self.patch,
            &self.trace,
        ];
        HTTP_METHODS
            .into_iter()
            .zip(slots)
            .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    #[serde(default)]
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Cookie => write!(f, "cookie"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl Parameter {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Non-empty parameter name, if any
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

// =============================================================================
// Components
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    #[serde(default)]
    pub security_schemes: IndexMap<String, RefOr<SecurityScheme>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type", default)]
    pub scheme_type: Option<String>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub flows: Option<serde_json::Value>,
}

impl SecurityScheme {
    pub fn is_oauth2(&self) -> bool {
        self.scheme_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("oauth2"))
            .unwrap_or(false)
    }
}

impl OpenApiDocument {
    pub fn schemas(&self) -> Option<&IndexMap<String, Schema>> {
        self.components.as_ref().map(|c| &c.schemas)
    }

    /// Look up a component schema by name
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas()?.get(name)
    }

    pub fn resolve_parameter<'a>(&'a self, param: &'a RefOr<Parameter>) -> Option<&'a Parameter> {
        param.resolve(self.components.as_ref().map(|c| &c.parameters))
    }

    pub fn resolve_request_body<'a>(&'a self, body: &'a RefOr<RequestBody>) -> Option<&'a RequestBody> {
        body.resolve(self.components.as_ref().map(|c| &c.request_bodies))
    }

    pub fn resolve_response<'a>(&'a self, response: &'a RefOr<Response>) -> Option<&'a Response> {
        response.resolve(self.components.as_ref().map(|c| &c.responses))
    }

    pub fn resolve_security_scheme<'a>(
        &'a self,
        scheme: &'a RefOr<SecurityScheme>,
    ) -> Option<&'a SecurityScheme> {
        scheme.resolve(self.components.as_ref().map(|c| &c.security_schemes))
    }
}

/// Escape a key for use as a JSON pointer segment
pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// `#/paths/<escaped path>`
pub fn path_pointer(path: &str) -> String {
    format!("#/paths/{}", escape_pointer(path))
}

/// `#/components/schemas/<name>`
pub fn schema_pointer(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, escape_pointer(name))
}
