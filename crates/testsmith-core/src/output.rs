//! JSON output types and serialization for CLI responses.
//!
//! Every response starts with `status` and carries `schema_version`.
//! Absent optional fields are skipped rather than written as `null`.

use std::io::{self, Write};

use serde::Serialize;

use crate::dictionary::CacheStats;
use crate::error::{OutputErrorCode, TestsmithError};
use crate::model::{Field, Method, MethodFlags, Type};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Errors
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &TestsmithError) -> Self {
        let details = match err {
            TestsmithError::InvalidArguments { details, .. } => details.clone(),
            TestsmithError::NotTestable { class, method } => Some(serde_json::json!({
                "class": class,
                "method": method,
            })),
            TestsmithError::TargetError { target, .. } => {
                Some(serde_json::json!({ "target": target }))
            }
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Response emitted for any failed command.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &TestsmithError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Response for the `generate` command.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Qualified name of the generated test class.
    pub target: String,
    /// Test-double and subject fields added to the target.
    pub fields_added: Vec<String>,
    /// Whether the fixture method was created or extended.
    pub fixture_updated: bool,
    /// Feature method names added, in order.
    pub methods_added: Vec<String>,
    /// Feature methods left alone because the target already had them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods_skipped: Vec<String>,
    /// Full source of the target after generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl GenerateResponse {
    pub fn new(
        target: impl Into<String>,
        fields_added: Vec<String>,
        fixture_updated: bool,
        methods_added: Vec<String>,
    ) -> Self {
        GenerateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            target: target.into(),
            fields_added,
            fixture_updated,
            methods_added,
            methods_skipped: Vec::new(),
            source: None,
        }
    }

    pub fn with_skipped(mut self, methods_skipped: Vec<String>) -> Self {
        self.methods_skipped = methods_skipped;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// A field as shown by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub owner: String,
    pub is_static: bool,
    pub inherited: bool,
}

impl FieldSummary {
    pub fn from_field(field: &Field) -> Self {
        FieldSummary {
            name: field.name().to_string(),
            field_type: field.field_type().identity().to_string(),
            owner: field.owner().to_string(),
            is_static: field.is_static(),
            inherited: field.is_inherited(),
        }
    }
}

/// A method as shown by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct MethodSummary {
    pub method_id: String,
    pub name: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// `name: type` per parameter.
    pub params: Vec<String>,
    pub testable: bool,
    pub flags: MethodFlags,
    /// Callee method ids, in call order.
    pub calls: Vec<String>,
    /// Callees declared on the same class.
    pub spy_methods: Vec<String>,
    /// Method ids of bound method references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub method_references: Vec<String>,
    /// Fields written by a delegated-to constructor.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indirectly_affected_fields: Vec<String>,
}

impl MethodSummary {
    pub fn from_method(method: &Method) -> Self {
        MethodSummary {
            method_id: method.method_id().to_string(),
            name: method.name().to_string(),
            owner: method.owner().to_string(),
            return_type: method.return_type().map(|t| t.identity().to_string()),
            params: method
                .params()
                .iter()
                .map(|p| format!("{}: {}", p.name(), p.param_type().identity()))
                .collect(),
            testable: method.is_testable(),
            flags: *method.flags(),
            calls: method
                .direct_method_calls()
                .iter()
                .map(|c| c.method().method_id().to_string())
                .collect(),
            spy_methods: method
                .spy_methods()
                .iter()
                .map(|m| m.method_id().to_string())
                .collect(),
            method_references: method
                .method_references()
                .iter()
                .map(|m| m.method_id().to_string())
                .collect(),
            indirectly_affected_fields: method
                .indirectly_affected_fields()
                .iter()
                .map(|f| f.name().to_string())
                .collect(),
        }
    }
}

/// Response for the `inspect` command: the extracted model of one class.
#[derive(Debug, Clone, Serialize)]
pub struct InspectResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub class: String,
    pub supertypes: Vec<String>,
    pub fields: Vec<FieldSummary>,
    pub methods: Vec<MethodSummary>,
    pub cache: CacheStats,
}

impl InspectResponse {
    pub fn from_type(ty: &Type, cache: CacheStats) -> Self {
        InspectResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            class: ty.canonical_name().to_string(),
            supertypes: ty.supertypes().to_vec(),
            fields: ty.fields().iter().map(FieldSummary::from_field).collect(),
            methods: ty.methods().iter().map(MethodSummary::from_method).collect(),
            cache,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_response {
        use super::*;

        #[test]
        fn not_testable_carries_details() {
            let err = TestsmithError::NotTestable {
                class: "com.example.Calc".to_string(),
                method: "getTotal".to_string(),
            };
            let resp = ErrorResponse::from_error(&err);
            let json = serde_json::to_value(&resp).unwrap();
            assert_eq!(json["status"], "error");
            assert_eq!(json["error"]["code"], 6);
            assert_eq!(json["error"]["details"]["method"], "getTotal");
        }

        #[test]
        fn absent_details_are_skipped() {
            let resp = ErrorResponse::from_error(&TestsmithError::internal("boom"));
            let json = serde_json::to_string(&resp).unwrap();
            assert!(!json.contains("details"));
        }
    }

    mod emission {
        use super::*;

        #[test]
        fn status_comes_first() {
            let resp = GenerateResponse::new(
                "com.example.CalcSpec",
                vec!["testObj".to_string()],
                false,
                vec!["addTest".to_string()],
            );
            let mut buf = Vec::new();
            emit_response(&resp, &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.trim_start().starts_with("{\n  \"status\": \"ok\""));
            assert!(!text.contains("\"source\""));
        }

        #[test]
        fn source_is_included_when_set() {
            let resp = GenerateResponse::new("a.B", Vec::new(), false, Vec::new()).with_source("x");
            let mut buf = Vec::new();
            emit_response(&resp, &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.contains("\"source\": \"x\""));
        }
    }
}
