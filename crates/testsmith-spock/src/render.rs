//! Text binding: plan data in, Groovy member text out.
//!
//! Nothing here consults the model. Member texts are produced without
//! indentation; bodies use four spaces, and the artifact indents members
//! when it lays out the class.

use testsmith_core::config::{LabelConfig, NamingConfig};

use crate::builder::DataTable;
use crate::mock::TestDouble;
use crate::plan::{DoubleDecl, Receiver, SpyLine, StubLine, SubjectDecl, TestMethodPlan};

const INDENT: &str = "    ";

/// Spock's placeholder column for single-column tables.
const EMPTY_COLUMN: &str = "_";

/// Emits declarations, the fixture method and feature methods.
pub struct TemplateRenderer<'c> {
    naming: &'c NamingConfig,
    labels: &'c LabelConfig,
}

impl<'c> TemplateRenderer<'c> {
    pub fn new(naming: &'c NamingConfig, labels: &'c LabelConfig) -> Self {
        TemplateRenderer { naming, labels }
    }

    /// `def testObj = new com.example.Subject()`
    pub fn render_subject_field(&self, subject: &SubjectDecl) -> String {
        format!("def {} = new {}()", subject.name, subject.type_name)
    }

    /// `def repo = Mock(com.example.Repo)` or the substitution factory.
    pub fn render_double_field(&self, double: &DoubleDecl) -> String {
        match &double.double {
            TestDouble::Mock => format!("def {} = Mock({})", double.name, double.type_name),
            TestDouble::Factory(factory) => format!("def {} = {}", double.name, factory),
        }
    }

    /// `testObj.repo = repo`
    pub fn render_fixture_assignment(&self, double: &DoubleDecl) -> String {
        format!("{}.{} = {}", self.naming.subject_name, double.name, double.name)
    }

    /// A complete fixture method holding `statements`.
    pub fn render_fixture(&self, statements: &[String]) -> String {
        let mut out = format!("def {}(){{\n", self.naming.fixture_name);
        for statement in statements {
            push_line(&mut out, statement);
        }
        out.push('}');
        out
    }

    /// One feature method, from the annotation to the closing brace.
    pub fn render_test_method(&self, plan: &TestMethodPlan) -> String {
        let mut out = String::new();
        if !self.naming.unroll_annotation.is_empty() {
            out.push('@');
            out.push_str(&self.naming.unroll_annotation);
            out.push('\n');
        }
        out.push_str(&format!("def \"{}\"(){{\n", plan.name));

        if plan.has_setup_blocks() {
            push_line(&mut out, &labelled("given", &self.labels.given));
            push_line(&mut out, &labelled("and", &self.labels.stubs));
            for stub in &plan.stubs {
                push_line(&mut out, &render_stub(stub));
            }
            if plan.spy {
                push_line(&mut out, &labelled("and", &self.labels.spies));
                push_line(
                    &mut out,
                    &format!(
                        "def {} = Spy({})",
                        self.naming.spy_name, self.naming.subject_name
                    ),
                );
                for spy in &plan.spies {
                    push_line(&mut out, &self.render_spy(spy));
                }
            }
        }

        push_line(&mut out, "when:");
        let receiver = match &plan.receiver {
            Receiver::Static(name) => name.as_str(),
            Receiver::Spy => self.naming.spy_name.as_str(),
            Receiver::Subject => self.naming.subject_name.as_str(),
        };
        let call = format!("{}.{}({})", receiver, plan.method_name, plan.invocation_args);
        if plan.returns_value {
            push_line(&mut out, &format!("def {} = {}", self.naming.result_name, call));
        } else {
            push_line(&mut out, &call);
        }

        push_line(&mut out, &labelled("then", &self.labels.then));
        if plan.returns_value {
            push_line(
                &mut out,
                &format!("{} == {}", self.naming.result_name, self.naming.expected_column),
            );
        } else {
            push_line(&mut out, "noExceptionThrown()");
        }

        if !plan.table.is_empty() {
            push_line(&mut out, &labelled("where", &self.labels.scenarios));
            for row in render_table(&plan.table) {
                push_line(&mut out, &row);
            }
        }
        out.push('}');
        out
    }

    fn render_spy(&self, spy: &SpyLine) -> String {
        let call = format!("{}.{}({})", self.naming.spy_name, spy.method, spy.matchers);
        match &spy.response {
            Some(response) => format!("{} >> {}", call, response),
            None => format!("{} >> {{}}", call),
        }
    }
}

fn render_stub(stub: &StubLine) -> String {
    format!(
        "{}.{}({}) >> {}",
        stub.receiver, stub.method, stub.matchers, stub.response
    )
}

/// `given: "label"`, or the bare block name when the label is empty.
fn labelled(block: &str, label: &str) -> String {
    if label.is_empty() {
        format!("{}:", block)
    } else {
        format!("{}: \"{}\"", block, label.replace('"', "\\\""))
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(INDENT);
    out.push_str(line);
    out.push('\n');
}

/// Header and single row of a `where:` block.
///
/// A method without parameters uses a data pipe for its expected value; a
/// lone input column is padded with `_` since Spock tables need two columns.
fn render_table(table: &DataTable) -> Vec<String> {
    let mut header: Vec<&str> = table.inputs.iter().map(|c| c.name.as_str()).collect();
    let mut row: Vec<&str> = table.inputs.iter().map(|c| c.value.as_str()).collect();

    match &table.expected {
        Some(expected) if header.is_empty() => {
            vec![format!("{} << [{}]", expected.name, expected.value)]
        }
        Some(expected) => vec![
            format!("{} || {}", header.join(" | "), expected.name),
            format!("{} || {}", row.join(" | "), expected.value),
        ],
        None => {
            if header.len() == 1 {
                header.push(EMPTY_COLUMN);
                row.push(EMPTY_COLUMN);
            }
            vec![header.join(" | "), row.join(" | ")]
        }
    }
}
