//! What to generate, as plain data.
//!
//! Planning reads the semantic model and the generator configuration and
//! produces a [`TestClassPlan`]: every decision and every literal, no text
//! layout. It fails fast: one selected method that is not testable aborts
//! the whole plan before any target is touched.

use std::collections::BTreeSet;

use tracing::debug;

use testsmith_core::config::GeneratorConfig;
use testsmith_core::model::{Method, Type};

use crate::builder::{DataTable, TestBuilder};
use crate::error::{GenerationError, GenerationResult};
use crate::inspect::TestSubjectInspector;
use crate::mock::{MockBuilder, TestDouble};

/// `def testObj = new com.example.Subject()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDecl {
    pub name: String,
    pub type_name: String,
}

/// A test-double field of the specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleDecl {
    pub name: String,
    pub type_name: String,
    pub double: TestDouble,
}

/// `receiver.method(matchers) >> response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubLine {
    pub receiver: String,
    pub method: String,
    pub matchers: String,
    pub response: String,
}

/// A stubbed self-call on the spy. `response` is `None` for void methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpyLine {
    pub method: String,
    pub matchers: String,
    pub response: Option<String>,
}

/// Who the tested method is invoked on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Static method: the class's qualified name.
    Static(String),
    /// The spy wrapping the subject.
    Spy,
    /// The subject field.
    Subject,
}

/// One feature method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMethodPlan {
    /// Feature method name, e.g. `addTest`.
    pub name: String,
    /// Name of the tested method.
    pub method_name: String,
    pub stubs: Vec<StubLine>,
    /// Whether to wrap the subject in a spy.
    pub spy: bool,
    pub spies: Vec<SpyLine>,
    pub receiver: Receiver,
    pub invocation_args: String,
    pub returns_value: bool,
    pub table: DataTable,
}

impl TestMethodPlan {
    /// True when the given/and blocks are emitted.
    pub fn has_setup_blocks(&self) -> bool {
        !self.stubs.is_empty() || self.spy
    }
}

/// Everything one generation run adds to the target class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestClassPlan {
    /// Qualified name of the class under test.
    pub source_class: String,
    pub superclass: String,
    pub subject: SubjectDecl,
    /// Doubles for the class's own fields, in declaration order.
    pub doubles: Vec<DoubleDecl>,
    pub methods: Vec<TestMethodPlan>,
}

// ============================================================================
// Planning
// ============================================================================

/// Plan the specification of `ty` for the methods named in `selection`.
///
/// Inherited methods are never generated. Selected methods are planned in
/// declaration order; overloads sharing a name are all selected.
pub fn plan_test_class(
    ty: &Type,
    selection: &BTreeSet<String>,
    config: &GeneratorConfig,
) -> GenerationResult<TestClassPlan> {
    let tables = &config.tables;
    let naming = &config.naming;
    let mocks = MockBuilder::new(&config.mock_policy, &tables.matchers, ty.canonical_name());
    let inspector = TestSubjectInspector::new(config.spy_self_calls);
    let literals = TestBuilder::new(&tables.shapes, &tables.nested_shapes, &tables.defaults);

    let selected: Vec<&Method> = ty
        .methods()
        .iter()
        .filter(|m| selection.contains(m.name()) && !m.is_inherited())
        .collect();
    if let Some(method) = selected.iter().find(|m| !inspector.should_be_tested(m)) {
        return Err(GenerationError::NotTestable {
            class: ty.canonical_name().to_string(),
            method: method.name().to_string(),
        });
    }

    let doubles = ty
        .fields()
        .iter()
        .filter(|f| !f.is_inherited())
        .filter_map(|f| {
            mocks.double_for(f).map(|double| DoubleDecl {
                name: f.name().to_string(),
                type_name: f.field_type().canonical_name().to_string(),
                double,
            })
        })
        .collect();

    let mut methods = Vec::with_capacity(selected.len());
    for method in selected {
        debug!(method = %method.method_id(), "planning feature method");
        let components =
            literals.build_parameterized_test_components(method, &naming.expected_column)?;

        let mut stubs = Vec::new();
        for target in mocks.stub_targets(method, ty.fields()) {
            if target.field.is_inherited() {
                continue;
            }
            let Some(return_type) = target.method.return_type() else {
                continue;
            };
            stubs.push(StubLine {
                receiver: target.field.name().to_string(),
                method: target.method.name().to_string(),
                matchers: mocks
                    .build_mock_args_matchers(target.method.params(), &config.matcher_dialect),
                response: literals.render_return_param(
                    method,
                    return_type,
                    &format!("{}Response", target.method.name()),
                )?,
            });
        }

        let spy_methods = inspector.spy_methods(method);
        let mut spies = Vec::with_capacity(spy_methods.len());
        for callee in &spy_methods {
            let response = match callee.return_type() {
                Some(return_type) if callee.has_return() => Some(literals.render_return_param(
                    method,
                    return_type,
                    &format!("{}Response", callee.name()),
                )?),
                _ => None,
            };
            spies.push(SpyLine {
                method: callee.name().to_string(),
                matchers: mocks.build_mock_args_matchers(callee.params(), &config.matcher_dialect),
                response,
            });
        }
        let spy = !spies.is_empty();

        let receiver = if method.is_static() {
            Receiver::Static(ty.canonical_name().to_string())
        } else if spy {
            Receiver::Spy
        } else {
            Receiver::Subject
        };

        methods.push(TestMethodPlan {
            name: format!("{}{}", method.name(), naming.test_name_suffix),
            method_name: method.name().to_string(),
            stubs,
            spy,
            spies,
            receiver,
            invocation_args: components.invocation_args,
            returns_value: method.has_return(),
            table: components.table,
        });
    }

    Ok(TestClassPlan {
        source_class: ty.canonical_name().to_string(),
        superclass: naming.superclass.clone(),
        subject: SubjectDecl {
            name: naming.subject_name.clone(),
            type_name: ty.canonical_name().to_string(),
        },
        doubles,
        methods,
    })
}

/// Method names from selection display strings, cut at the first `(`.
///
/// `add(int, int)` and `add` both select `add`.
pub fn parse_selection<S: AsRef<str>>(entries: &[S]) -> BTreeSet<String> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            let name = match entry.find('(') {
                Some(idx) => &entry[..idx],
                None => entry,
            };
            name.trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}
