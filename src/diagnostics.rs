//! Diagnostics
//!
//! The issue model every analysis pass emits into. Each issue carries a stable
//! machine-readable code; the code decides the default severity and category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LintError;

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// Closed set of issue categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Structure,
    Schema,
    Path,
    Operation,
    Parameter,
    Response,
    Security,
    Naming,
    /// Stricter than OpenAPI itself, but breaks or degrades Kiota output
    KiotaSpecific,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structure => "structure",
            Self::Schema => "schema",
            Self::Path => "path",
            Self::Operation => "operation",
            Self::Parameter => "parameter",
            Self::Response => "response",
            Self::Security => "security",
            Self::Naming => "naming",
            Self::KiotaSpecific => "kiota",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Issue Codes
// =============================================================================

macro_rules! issue_codes {
    ($($variant:ident => $code:literal, $severity:ident, $category:ident, $summary:literal;)+) => {
        /// Stable code identifying the rule that produced an issue
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum IssueCode {
            $($variant,)+
        }

        impl IssueCode {
            /// Every known code, in rule-table order
            pub const ALL: &'static [IssueCode] = &[$(IssueCode::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            pub fn severity(&self) -> Severity {
                match self {
                    $(Self::$variant => Severity::$severity,)+
                }
            }

            pub fn category(&self) -> Category {
                match self {
                    $(Self::$variant => Category::$category,)+
                }
            }

            /// One-line description used by `openapi-lint rules`
            pub fn summary(&self) -> &'static str {
                match self {
                    $(Self::$variant => $summary,)+
                }
            }
        }

        impl FromStr for IssueCode {
            type Err = LintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    other => Err(LintError::UnknownCode(other.to_string())),
                }
            }
        }
    };
}

issue_codes! {
    // === Boundary ===
    ParseError => "PARSE_ERROR", Error, Structure, "Document text could not be parsed";
    FileNotFound => "FILE_NOT_FOUND", Error, Structure, "Input path does not exist";
    FileReadError => "FILE_READ_ERROR", Error, Structure, "Input path exists but could not be read";
    UnexpectedAnalysisError => "UNEXPECTED_ANALYSIS_ERROR", Error, Other, "An analysis pass failed unexpectedly";

    // === Structure ===
    MissingTitle => "MISSING_TITLE", Error, Structure, "info.title is missing or empty";
    MissingVersion => "MISSING_VERSION", Error, Structure, "info.version is missing or empty";
    MissingServers => "MISSING_SERVERS", Warning, Structure, "No servers are declared";
    EmptyServerUrl => "EMPTY_SERVER_URL", Warning, Structure, "A server entry has no url";
    NoPaths => "NO_PATHS", Error, Structure, "The document declares no paths";

    // === Paths ===
    InvalidPathFormat => "INVALID_PATH_FORMAT", Error, Path, "Path template does not start with '/'";
    MissingPathParameter => "MISSING_PATH_PARAMETER", Error, Path, "Path placeholder has no matching 'in: path' parameter";
    UnusedPathParameter => "UNUSED_PATH_PARAMETER", Error, Path, "'in: path' parameter has no matching placeholder";
    EmptyPathItem => "EMPTY_PATH_ITEM", Warning, Path, "Path item declares no operations";

    // === Operations ===
    MissingOperationId => "MISSING_OPERATION_ID", Error, Operation, "Operation has no operationId";
    InvalidOperationId => "INVALID_OPERATION_ID", Warning, Operation, "operationId is not a valid identifier";
    DuplicateOperationId => "DUPLICATE_OPERATION_ID", Error, Operation, "operationId is already used (case-insensitive)";
    MissingResponses => "MISSING_RESPONSES", Error, Operation, "Operation declares no responses";
    NoSuccessResponse => "NO_SUCCESS_RESPONSE", Warning, Operation, "Operation declares no 2xx response";
    MultipleSuccessResponses => "MULTIPLE_SUCCESS_RESPONSES", Warning, KiotaSpecific, "Several 2xx responses make the generated return type ambiguous";

    // === Parameters ===
    MissingParameterName => "MISSING_PARAMETER_NAME", Error, Parameter, "Parameter has no name";
    DuplicateParameter => "DUPLICATE_PARAMETER", Error, Parameter, "Parameter (name, in) pair declared twice";
    PathParameterNotRequired => "PATH_PARAMETER_NOT_REQUIRED", Error, Parameter, "Path parameter is not marked required";
    MissingParameterSchema => "MISSING_PARAMETER_SCHEMA", Warning, Parameter, "Parameter has neither schema nor content";
    ComplexInlineParameterSchema => "COMPLEX_INLINE_PARAMETER_SCHEMA", Warning, KiotaSpecific, "Parameter uses an inline object schema";
    NullableRequiredParameter => "NULLABLE_REQUIRED_PARAMETER", Info, Parameter, "Required parameter is also nullable";

    // === Request / response content ===
    EmptyRequestBodyContent => "EMPTY_REQUEST_BODY_CONTENT", Warning, Response, "Request body declares no content";
    InlineComplexSchema => "INLINE_COMPLEX_SCHEMA", Warning, KiotaSpecific, "Content uses an inline object schema";
    BinaryInJsonContent => "BINARY_IN_JSON_CONTENT", Warning, Response, "Binary string format declared under a JSON media type";
    MissingResponseDescription => "MISSING_RESPONSE_DESCRIPTION", Info, Response, "Response has no description";

    // === Schemas ===
    EmptyPropertySchema => "EMPTY_PROPERTY_SCHEMA", Warning, Schema, "Property schema is empty";
    EmptyArrayItems => "EMPTY_ARRAY_ITEMS", Warning, Schema, "Array schema has missing or empty items";
    MissingDiscriminatorProperty => "MISSING_DISCRIMINATOR_PROPERTY", Error, Schema, "Discriminator has no propertyName";
    DiscriminatorPropertyNotRequired => "DISCRIMINATOR_PROPERTY_NOT_REQUIRED", Error, KiotaSpecific, "Discriminator property is not listed as required";
    MissingDiscriminatorMapping => "MISSING_DISCRIMINATOR_MAPPING", Warning, Schema, "Discriminator has no mapping";
    InvalidDiscriminatorMapping => "INVALID_DISCRIMINATOR_MAPPING", Error, Schema, "Discriminator mapping targets an unknown schema";
    MissingDiscriminator => "MISSING_DISCRIMINATOR", Warning, KiotaSpecific, "oneOf polymorphism without a discriminator";
    InvalidAllOfFragment => "INVALID_ALLOF_FRAGMENT", Warning, Schema, "allOf member is empty or not an object";
    SelfReferencingSchema => "SELF_REFERENCING_SCHEMA", Info, Schema, "Schema references itself";
    InvalidRange => "INVALID_RANGE", Error, Schema, "Lower bound is greater than upper bound";
    InvalidPattern => "INVALID_PATTERN", Error, Schema, "pattern is not a valid regular expression";
    WeakTyping => "WEAK_TYPING", Warning, Schema, "Untyped object with free-form additionalProperties";
    EmptyEnumValue => "EMPTY_ENUM_VALUE", Warning, Schema, "Enum contains an empty string";
    UnresolvedReference => "UNRESOLVED_REFERENCE", Error, Schema, "$ref points at an undeclared component";
    CircularDependency => "CIRCULAR_DEPENDENCY", Warning, Schema, "Schemas form a reference cycle";

    // === Enums ===
    EmptyEnum => "EMPTY_ENUM", Warning, Schema, "Enum declares no values";
    SingleValueEnum => "SINGLE_VALUE_ENUM", Info, Schema, "Enum declares a single value";
    BooleanEnum => "BOOLEAN_ENUM", Info, Schema, "Enum of booleans, use a boolean type";
    NestedArrayEnum => "NESTED_ARRAY_ENUM", Warning, KiotaSpecific, "Enum contains array values";
    MixedTypeEnum => "MIXED_TYPE_ENUM", Warning, KiotaSpecific, "Enum mixes value types";

    // === Security / tags ===
    MissingOAuth2Flows => "MISSING_OAUTH2_FLOWS", Error, Security, "OAuth2 scheme declares no flows";
    UndefinedSecurityScheme => "UNDEFINED_SECURITY_SCHEME", Error, Security, "Security requirement names an undeclared scheme";
    MissingTags => "MISSING_TAGS", Warning, Operation, "Operation has no tags";
    UndeclaredTag => "UNDECLARED_TAG", Warning, Operation, "Operation tag is not declared globally";

    // === Naming ===
    InvalidSchemaName => "INVALID_SCHEMA_NAME", Warning, Naming, "Schema name is not a valid identifier";
    ReservedKeywordName => "RESERVED_KEYWORD_NAME", Warning, Naming, "Schema name is a reserved keyword";
    NormalizedNameCollision => "NORMALIZED_NAME_COLLISION", Error, Naming, "Schema names collide once normalized";
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for IssueCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IssueCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Issue
// =============================================================================

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    pub code: IssueCode,
    pub message: String,
    /// JSON-pointer-like location in the source document
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            category: code.category(),
            code,
            message: message.into(),
            location: location.into(),
            component_name: None,
            component_path: None,
            component_type: None,
        }
    }

    /// Attach the named component this issue belongs to
    pub fn with_component(
        mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        component_type: impl Into<String>,
    ) -> Self {
        self.component_name = Some(name.into());
        self.component_path = Some(path.into());
        self.component_type = Some(component_type.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code, self.severity, self.message, self.location
        )
    }
}

/// Summary line for a batch of issues
pub fn format_summary(issues: &[Issue]) -> String {
    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warnings = issues.iter().filter(|i| i.severity == Severity::Warning).count();
    let infos = issues.len() - errors - warnings;
    format!("{} error(s), {} warning(s), {} info(s)", errors, warnings, infos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_defaults() {
        assert_eq!(IssueCode::MissingVersion.severity(), Severity::Error);
        assert_eq!(IssueCode::MissingServers.severity(), Severity::Warning);
        assert_eq!(IssueCode::MultipleSuccessResponses.category(), Category::KiotaSpecific);
        assert_eq!(IssueCode::CircularDependency.as_str(), "CIRCULAR_DEPENDENCY");
    }

    #[test]
    fn test_code_from_str() {
        let code: IssueCode = "INVALID_RANGE".parse().unwrap();
        assert_eq!(code, IssueCode::InvalidRange);
        assert!("NOT_A_RULE".parse::<IssueCode>().is_err());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in IssueCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate code {}", code);
        }
    }

    #[test]
    fn test_issue_serializes_code_as_string() {
        let issue = Issue::new(IssueCode::NoPaths, "no paths", "#/paths");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "NO_PATHS");
        assert_eq!(json["severity"], "error");
        assert!(json.get("componentName").is_none());
    }

    #[test]
    fn test_summary() {
        let issues = vec![
            Issue::new(IssueCode::NoPaths, "a", "#"),
            Issue::new(IssueCode::MissingServers, "b", "#"),
            Issue::new(IssueCode::SingleValueEnum, "c", "#"),
        ];
        assert_eq!(format_summary(&issues), "1 error(s), 1 warning(s), 1 info(s)");
    }
}
