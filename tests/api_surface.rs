//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Semantic Model
// ============================================================================

// adapter module - host facade and data types
use testsmith::adapter::{
    CallSiteNode, Capability, ClassNode, FieldNode, FieldWrite, Language, MethodHandle,
    MethodMarker, MethodNode, Modifier, ParamNode, ReferenceKind, ReferenceNode, SymbolProvider,
    TypeKind, TypeNode,
};

// index module - in-memory provider
use testsmith::index::ClassIndex;

// hierarchy and dialect rules
use testsmith::dialect::{dialect_for, Dialect, ImplicitVisibility, Visibility};
use testsmith::hierarchy::{Ancestor, HierarchyError, HierarchyResult};

// dictionary module - per-request type cache
use testsmith::dictionary::{CacheStats, DictionaryOptions, TypeDictionary};

// model module - immutable entities
use testsmith::model::{
    format_method_id, Field, Method, MethodCall, MethodFlags, Param, Reference, Type,
};

// call graph relevance
use testsmith::callgraph::{is_relevant, is_root_type, ROOT_TYPES};

// tables and configuration
use testsmith::config::{
    Config, DoubleSubstitution, GeneratorConfig, LabelConfig, MockPolicy, NamingConfig,
    TableConfig,
};
use testsmith::tables::{
    DefaultValueTable, MatcherTable, ShapeEntry, ShapeTable, TYPES_PLACEHOLDER, VAL_PLACEHOLDER,
};

// error module - error types and codes
use testsmith::error::{ConfigError, ModelError, OutputErrorCode, ProviderError, TestsmithError};

// output module - JSON output types
use testsmith::output::{
    emit_response, ErrorInfo, ErrorResponse, FieldSummary, GenerateResponse, InspectResponse,
    MethodSummary, SCHEMA_VERSION,
};

// ============================================================================
// Generation
// ============================================================================

use testsmith::artifact::{InMemoryTargetStore, MemberDecl, TargetStore, TestClassArtifact};
use testsmith::builder::{DataColumn, DataTable, ParameterizedTestComponents, TestBuilder};
use testsmith::generator::{GenerationReport, GenerationRequest, SpockGenerator};
use testsmith::inspect::TestSubjectInspector;
use testsmith::mock::{MockBuilder, StubTarget, TestDouble};
use testsmith::plan::{
    parse_selection, plan_test_class, DoubleDecl, Receiver, SpyLine, StubLine, SubjectDecl,
    TestClassPlan, TestMethodPlan,
};
use testsmith::render::TemplateRenderer;
use testsmith_spock::error::{GenerationError, GenerationResult, RenderError, TargetError};

// ============================================================================
// Front Door
// ============================================================================

use testsmith::cli::{load_config, run_generate, run_inspect, TargetPaths};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // The imports above form the public API contract.
    let _ = std::any::type_name::<TypeDictionary<'static>>();
    let _ = std::any::type_name::<Method>();
    let _ = std::any::type_name::<TestsmithError>();
    let _ = std::any::type_name::<SpockGenerator<'static>>();
    let _ = std::any::type_name::<TestClassArtifact>();
}

#[test]
fn schema_version_is_stable() {
    assert_eq!(SCHEMA_VERSION, "1");
}
