//! CLI front door.
//!
//! The functions here do the file handling around one request and return
//! response structs; `main.rs` decides how to print them.
//!
//! ## Inputs
//!
//! - a class snapshot: JSON for a [`ClassIndex`]
//! - optionally an existing target class: JSON for a [`TestClassArtifact`]
//! - optionally a TOML configuration file, or `.testsmith/config.toml` under
//!   a project root
//!
//! ## Error Handling
//!
//! All functions return `Result<T, TestsmithError>`; generation errors are
//! converted through their `From` impls.

use std::fs;
use std::path::Path;

use tracing::info;

use testsmith_core::config::{Config, GeneratorConfig};
use testsmith_core::dictionary::{DictionaryOptions, TypeDictionary};
use testsmith_core::error::TestsmithError;
use testsmith_core::index::ClassIndex;
use testsmith_core::output::{GenerateResponse, InspectResponse};
use testsmith_spock::artifact::{InMemoryTargetStore, TestClassArtifact};
use testsmith_spock::generator::{GenerationRequest, SpockGenerator};
use testsmith_spock::plan::parse_selection;

/// Where `generate` reads and writes the target class.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetPaths<'a> {
    /// Existing target class to merge into.
    pub existing: Option<&'a Path>,
    /// Where to write the merged target class as JSON.
    pub output: Option<&'a Path>,
}

/// Resolve the generator configuration.
///
/// An explicit file wins over the project configuration; with neither, the
/// defaults apply.
pub fn load_config(
    config: Option<&Path>,
    project_root: Option<&Path>,
) -> Result<GeneratorConfig, TestsmithError> {
    let config = match (config, project_root) {
        (Some(path), _) => {
            if !path.exists() {
                return Err(TestsmithError::file_not_found(path.display().to_string()));
            }
            Config::load(path)?
        }
        (None, Some(root)) => Config::load_from_project(root)?,
        (None, None) => Config::default(),
    };
    Ok(config.generator)
}

fn load_target(path: &Path) -> Result<TestClassArtifact, TestsmithError> {
    let content = fs::read_to_string(path)
        .map_err(|_| TestsmithError::file_not_found(path.display().to_string()))?;
    serde_json::from_str(&content).map_err(|e| {
        TestsmithError::invalid_args_with_details(
            format!("malformed target class: {}", e),
            serde_json::json!({ "line": e.line(), "column": e.column() }),
        )
    })
}

/// Generate feature methods for `methods` of `class`.
///
/// The response always carries the full source of the target after the
/// merge.
pub fn run_generate(
    snapshot: &Path,
    class: &str,
    methods: &[String],
    target: TargetPaths<'_>,
    config: &GeneratorConfig,
) -> Result<GenerateResponse, TestsmithError> {
    let selection = parse_selection(methods);
    if selection.is_empty() {
        return Err(TestsmithError::invalid_args(
            "at least one method must be selected",
        ));
    }
    let index = ClassIndex::load(snapshot)?;

    let mut store = InMemoryTargetStore::new(true);
    let mut request = GenerationRequest::new(class, selection);
    if let Some(path) = target.existing {
        let existing = load_target(path)?;
        request = request.with_target(existing.qualified_name());
        store.insert(existing);
    }

    let report = SpockGenerator::new(config).generate(&index, &mut store, &request)?;
    let artifact = store.get(&report.target).ok_or_else(|| {
        TestsmithError::internal(format!("target '{}' missing after generation", report.target))
    })?;

    if let Some(path) = target.output {
        let json = serde_json::to_string_pretty(artifact)
            .map_err(|e| TestsmithError::internal(format!("JSON serialization error: {}", e)))?;
        fs::write(path, json).map_err(|e| {
            TestsmithError::internal(format!("failed to write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "wrote target class");
    }

    Ok(GenerateResponse::new(
        report.target.clone(),
        report.fields_added,
        report.fixture_updated,
        report.methods_added,
    )
    .with_skipped(report.methods_skipped)
    .with_source(artifact.to_source()))
}

/// Extract the model of `class` and summarize it.
pub fn run_inspect(
    snapshot: &Path,
    class: &str,
    config: &GeneratorConfig,
) -> Result<InspectResponse, TestsmithError> {
    let index = ClassIndex::load(snapshot)?;
    let dict = TypeDictionary::new(&index, class, DictionaryOptions::from(config))?;
    let ty = dict.extract_class();
    Ok(InspectResponse::from_type(&ty, dict.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml")), None).unwrap_err();
        assert!(matches!(err, TestsmithError::FileNotFound { .. }));
    }

    #[test]
    fn project_config_is_optional() {
        let dir = TempDir::new().unwrap();
        let config = load_config(None, Some(dir.path())).unwrap();
        assert_eq!(config.max_recursion_depth, 3);
    }

    #[test]
    fn project_config_is_read() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".testsmith")).unwrap();
        fs::write(
            dir.path().join(".testsmith").join("config.toml"),
            "[generator]\nmax_recursion_depth = 5\nspy_self_calls = false\n",
        )
        .unwrap();
        let config = load_config(None, Some(dir.path())).unwrap();
        assert_eq!(config.max_recursion_depth, 5);
        assert!(!config.spy_self_calls);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = run_generate(
            &dir.path().join("snapshot.json"),
            "com.example.Calc",
            &[" ".to_string()],
            TargetPaths::default(),
            &GeneratorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TestsmithError::InvalidArguments { .. }));
    }
}
