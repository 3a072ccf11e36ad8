//! One generation request, start to finish.
//!
//! Extraction, planning and rendering happen before the target is opened;
//! only the final merge mutates it. A failure during the merge leaves the
//! members already inserted in place.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use testsmith_core::adapter::SymbolProvider;
use testsmith_core::config::GeneratorConfig;
use testsmith_core::dictionary::{CacheStats, DictionaryOptions, TypeDictionary};

use crate::artifact::{TargetStore, TestClassArtifact};
use crate::error::GenerationResult;
use crate::plan::{plan_test_class, TestClassPlan};
use crate::render::TemplateRenderer;

/// What to generate.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Qualified name of the class under test.
    pub class_name: String,
    /// Names of the methods to test.
    pub selection: BTreeSet<String>,
    /// Qualified target name; defaults to the class name plus the
    /// configured target suffix.
    pub target_name: Option<String>,
}

impl GenerationRequest {
    pub fn new(class_name: impl Into<String>, selection: BTreeSet<String>) -> Self {
        GenerationRequest {
            class_name: class_name.into(),
            selection,
            target_name: None,
        }
    }

    pub fn with_target(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = Some(target_name.into());
        self
    }
}

/// What a request changed in its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub target: String,
    pub fields_added: Vec<String>,
    pub fixture_updated: bool,
    pub methods_added: Vec<String>,
    /// Feature methods whose name already existed in the target.
    pub methods_skipped: Vec<String>,
    pub cache: CacheStats,
}

/// Generates Spock specifications into a [`TargetStore`].
pub struct SpockGenerator<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> SpockGenerator<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        SpockGenerator { config }
    }

    pub fn generate(
        &self,
        provider: &dyn SymbolProvider,
        store: &mut dyn TargetStore,
        request: &GenerationRequest,
    ) -> GenerationResult<GenerationReport> {
        let result = self.run(provider, store, request);
        if let Err(err) = &result {
            error!(class = %request.class_name, error = %err, "generation aborted");
        }
        result
    }

    fn run(
        &self,
        provider: &dyn SymbolProvider,
        store: &mut dyn TargetStore,
        request: &GenerationRequest,
    ) -> GenerationResult<GenerationReport> {
        let dict = TypeDictionary::new(
            provider,
            &request.class_name,
            DictionaryOptions::from(self.config),
        )?;
        let ty = dict.extract_class();
        for name in &request.selection {
            if !ty.methods().iter().any(|m| m.name() == name) {
                warn!(class = %request.class_name, method = %name, "selected method not found");
            }
        }

        let plan = plan_test_class(&ty, &request.selection, self.config)?;
        let target_name = match &request.target_name {
            Some(name) => name.clone(),
            None => format!("{}{}", request.class_name, self.config.naming.target_suffix),
        };

        let artifact = store.open(&target_name)?;
        let mut report = self.merge(&plan, artifact)?;
        report.target = target_name;
        report.cache = dict.stats();
        info!(
            target_class = %report.target,
            fields = report.fields_added.len(),
            methods = report.methods_added.len(),
            skipped = report.methods_skipped.len(),
            "generation finished"
        );
        Ok(report)
    }

    /// Insert the plan's members into `artifact`, skipping names already
    /// present.
    fn merge(
        &self,
        plan: &TestClassPlan,
        artifact: &mut TestClassArtifact,
    ) -> GenerationResult<GenerationReport> {
        let renderer = TemplateRenderer::new(&self.config.naming, &self.config.labels);
        let mut report = GenerationReport {
            target: artifact.qualified_name(),
            fields_added: Vec::new(),
            fixture_updated: false,
            methods_added: Vec::new(),
            methods_skipped: Vec::new(),
            cache: CacheStats::default(),
        };

        artifact.ensure_superclass(&plan.superclass);
        if artifact.add_field(&plan.subject.name, renderer.render_subject_field(&plan.subject)) {
            report.fields_added.push(plan.subject.name.clone());
        }

        let mut assignments = Vec::new();
        for double in &plan.doubles {
            if artifact.add_field(&double.name, renderer.render_double_field(double)) {
                debug!(field = %double.name, "added test double");
                report.fields_added.push(double.name.clone());
                assignments.push(renderer.render_fixture_assignment(double));
            }
        }

        if !assignments.is_empty() {
            let fixture = &self.config.naming.fixture_name;
            if !artifact.append_to_method(fixture, &assignments)? {
                artifact.add_method(fixture, renderer.render_fixture(&assignments));
            }
            report.fixture_updated = true;
        }

        for method in &plan.methods {
            if artifact.add_method(&method.name, renderer.render_test_method(method)) {
                report.methods_added.push(method.name.clone());
            } else {
                debug!(method = %method.name, "feature method already present");
                report.methods_skipped.push(method.name.clone());
            }
        }
        Ok(report)
    }
}

