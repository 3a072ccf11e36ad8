//! Configuration handling for testsmith

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::tables::{DefaultValueTable, MatcherTable, ShapeTable};

/// Testsmith configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Core generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Depth bound for type and call-graph expansion
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: usize,

    /// Comma-separated method-id prefixes admitted even when not relevant
    #[serde(default)]
    pub generate_pojo_prefix: String,

    /// Spy on the subject when a tested method calls its own methods
    #[serde(default = "default_spy_self_calls")]
    pub spy_self_calls: bool,

    /// Matcher-table dialect for stub argument matchers
    #[serde(default = "default_matcher_dialect")]
    pub matcher_dialect: String,

    /// Naming settings
    #[serde(default)]
    pub naming: NamingConfig,

    /// Block label texts
    #[serde(default)]
    pub labels: LabelConfig,

    /// Which fields get test doubles, and which kind
    #[serde(default)]
    pub mock_policy: MockPolicy,

    /// Literal and matcher tables
    #[serde(default)]
    pub tables: TableConfig,
}

/// Names used in the emitted specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Superclass attached to the target class
    #[serde(default = "default_superclass")]
    pub superclass: String,

    /// Appended to the class under test's qualified name to name the target
    #[serde(default = "default_target_suffix")]
    pub target_suffix: String,

    /// Field holding the instance under test
    #[serde(default = "default_subject_name")]
    pub subject_name: String,

    /// Fixture method assigning doubles into the subject
    #[serde(default = "default_fixture_name")]
    pub fixture_name: String,

    /// Appended to the method name to form the feature name
    #[serde(default = "default_test_name_suffix")]
    pub test_name_suffix: String,

    /// Annotation placed on each feature method; empty disables it
    #[serde(default = "default_unroll_annotation")]
    pub unroll_annotation: String,

    /// Local variable holding the spy
    #[serde(default = "default_spy_name")]
    pub spy_name: String,

    /// Local variable holding the call result
    #[serde(default = "default_result_name")]
    pub result_name: String,

    /// Data-table column holding the expected result
    #[serde(default = "default_expected_column")]
    pub expected_column: String,
}

/// Spock block label descriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_given_label")]
    pub given: String,

    #[serde(default = "default_stubs_label")]
    pub stubs: String,

    #[serde(default = "default_spies_label")]
    pub spies: String,

    #[serde(default = "default_then_label")]
    pub then: String,

    #[serde(default = "default_where_label")]
    pub scenarios: String,
}

/// Exclusion-and-substitution policy for test doubles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockPolicy {
    /// Types never replaced by a double
    #[serde(default = "default_excluded_types")]
    pub excluded_types: Vec<String>,

    /// Allow doubles for final classes
    #[serde(default)]
    pub mock_final: bool,

    /// Allow doubles for enums
    #[serde(default)]
    pub mock_enums: bool,

    /// Allow doubles for arrays
    #[serde(default)]
    pub mock_arrays: bool,

    /// Annotated types instantiated through a factory instead of mocked
    #[serde(default = "default_substitutions")]
    pub substitutions: Vec<DoubleSubstitution>,
}

/// A field type marker and the factory expression that replaces the mock.
///
/// `<TYPE>` in `factory` is replaced by the field's canonical type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleSubstitution {
    pub annotation: String,
    pub factory: String,
}

/// Literal and matcher tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Container shapes for parameters and stub responses
    #[serde(default = "ShapeTable::groovy_defaults")]
    pub shapes: ShapeTable,

    /// Container shapes for element literals nested inside a shape
    #[serde(default = "ShapeTable::groovy_defaults")]
    pub nested_shapes: ShapeTable,

    #[serde(default = "DefaultValueTable::groovy_defaults")]
    pub defaults: DefaultValueTable,

    #[serde(default = "MatcherTable::with_defaults")]
    pub matchers: MatcherTable,
}

fn default_max_recursion_depth() -> usize {
    3
}

fn default_spy_self_calls() -> bool {
    true
}

fn default_matcher_dialect() -> String {
    "groovy".to_string()
}

fn default_superclass() -> String {
    "spock.lang.Specification".to_string()
}

fn default_target_suffix() -> String {
    "Test".to_string()
}

fn default_subject_name() -> String {
    "testObj".to_string()
}

fn default_fixture_name() -> String {
    "setup".to_string()
}

fn default_test_name_suffix() -> String {
    "Test".to_string()
}

fn default_unroll_annotation() -> String {
    "spock.lang.Unroll".to_string()
}

fn default_spy_name() -> String {
    "spy".to_string()
}

fn default_result_name() -> String {
    "result".to_string()
}

fn default_expected_column() -> String {
    "expectedResult".to_string()
}

fn default_given_label() -> String {
    "prepare method inputs".to_string()
}

fn default_stubs_label() -> String {
    "stub collaborator responses".to_string()
}

fn default_spies_label() -> String {
    "stub calls on the subject itself".to_string()
}

fn default_then_label() -> String {
    "the result matches the expectation".to_string()
}

fn default_where_label() -> String {
    "scenarios".to_string()
}

fn default_excluded_types() -> Vec<String> {
    [
        "java.lang.String",
        "java.lang.Boolean",
        "java.lang.Byte",
        "java.lang.Character",
        "java.lang.Double",
        "java.lang.Float",
        "java.lang.Integer",
        "java.lang.Long",
        "java.lang.Short",
        "java.lang.Class",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_substitutions() -> Vec<DoubleSubstitution> {
    vec![DoubleSubstitution {
        annotation: "org.mapstruct.Mapper".to_string(),
        factory: "org.mapstruct.factory.Mappers.getMapper(<TYPE>)".to_string(),
    }]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: default_max_recursion_depth(),
            generate_pojo_prefix: String::new(),
            spy_self_calls: default_spy_self_calls(),
            matcher_dialect: default_matcher_dialect(),
            naming: NamingConfig::default(),
            labels: LabelConfig::default(),
            mock_policy: MockPolicy::default(),
            tables: TableConfig::default(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            superclass: default_superclass(),
            target_suffix: default_target_suffix(),
            subject_name: default_subject_name(),
            fixture_name: default_fixture_name(),
            test_name_suffix: default_test_name_suffix(),
            unroll_annotation: default_unroll_annotation(),
            spy_name: default_spy_name(),
            result_name: default_result_name(),
            expected_column: default_expected_column(),
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            given: default_given_label(),
            stubs: default_stubs_label(),
            spies: default_spies_label(),
            then: default_then_label(),
            scenarios: default_where_label(),
        }
    }
}

impl Default for MockPolicy {
    fn default() -> Self {
        Self {
            excluded_types: default_excluded_types(),
            mock_final: false,
            mock_enums: false,
            mock_arrays: false,
            substitutions: default_substitutions(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            shapes: ShapeTable::groovy_defaults(),
            nested_shapes: ShapeTable::groovy_defaults(),
            defaults: DefaultValueTable::groovy_defaults(),
            matchers: MatcherTable::with_defaults(),
        }
    }
}

impl GeneratorConfig {
    /// The allow-list prefixes, trimmed, blanks dropped.
    pub fn pojo_prefixes(&self) -> Vec<String> {
        self.generate_pojo_prefix
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from .testsmith/config.toml in the given project root
    pub fn load_from_project(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(".testsmith").join("config.toml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }
}
