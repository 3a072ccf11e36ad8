//! The target test class and where it is kept.
//!
//! A [`TestClassArtifact`] is an ordered list of named members. Merging is
//! by name: a field or method that already exists is never added twice, so
//! repeated generation runs leave shared declarations alone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RenderError, TargetError};

const INDENT: &str = "    ";

/// A named member and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub text: String,
}

/// A test class being generated into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestClassArtifact {
    /// Package name, empty for the default package.
    #[serde(default)]
    pub package: String,
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub fields: Vec<MemberDecl>,
    #[serde(default)]
    pub methods: Vec<MemberDecl>,
    #[serde(default)]
    pub read_only: bool,
}

impl TestClassArtifact {
    /// An empty class named by its qualified name.
    pub fn new(qualified: &str) -> Self {
        let (package, name) = match qualified.rfind('.') {
            Some(idx) => (&qualified[..idx], &qualified[idx + 1..]),
            None => ("", qualified),
        };
        TestClassArtifact {
            package: package.to_string(),
            name: name.to_string(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
            read_only: false,
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn contains_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Names of the methods already present, in order.
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    /// Set the superclass when there is none.
    ///
    /// Returns true when it was set. A different existing superclass is kept.
    pub fn ensure_superclass(&mut self, superclass: &str) -> bool {
        match &self.superclass {
            None => {
                self.superclass = Some(superclass.to_string());
                true
            }
            Some(existing) if existing == superclass => false,
            Some(existing) => {
                warn!(
                    target_class = %self.qualified_name(),
                    existing = %existing,
                    wanted = %superclass,
                    "keeping existing superclass"
                );
                false
            }
        }
    }

    /// Append a field unless one of that name exists. Returns true when added.
    pub fn add_field(&mut self, name: &str, text: String) -> bool {
        if self.contains_field(name) {
            return false;
        }
        self.fields.push(MemberDecl {
            name: name.to_string(),
            text,
        });
        true
    }

    /// Append a method unless one of that name exists. Returns true when added.
    pub fn add_method(&mut self, name: &str, text: String) -> bool {
        if self.contains_method(name) {
            return false;
        }
        self.methods.push(MemberDecl {
            name: name.to_string(),
            text,
        });
        true
    }

    /// Insert `statements` at the end of the body of the existing method
    /// `name`.
    ///
    /// Returns `Ok(false)` when there is no such method.
    pub fn append_to_method(
        &mut self,
        name: &str,
        statements: &[String],
    ) -> Result<bool, RenderError> {
        let Some(method) = self.methods.iter_mut().find(|m| m.name == name) else {
            return Ok(false);
        };
        let Some(close) = method.text.rfind('}') else {
            return Err(RenderError::MalformedFixture {
                name: name.to_string(),
            });
        };
        let mut inserted = String::new();
        if !method.text[..close].ends_with('\n') {
            inserted.push('\n');
        }
        for statement in statements {
            inserted.push_str(INDENT);
            inserted.push_str(statement);
            inserted.push('\n');
        }
        method.text.insert_str(close, &inserted);
        debug!(method = name, count = statements.len(), "extended existing method");
        Ok(true)
    }

    /// Groovy source of the class.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&format!("package {}\n\n", self.package));
        }
        out.push_str(&format!("class {}", self.name));
        if let Some(superclass) = &self.superclass {
            out.push_str(&format!(" extends {}", superclass));
        }
        out.push_str(" {\n");
        if !self.fields.is_empty() {
            out.push('\n');
            for field in &self.fields {
                push_indented(&mut out, &field.text);
            }
        }
        for method in &self.methods {
            out.push('\n');
            push_indented(&mut out, &method.text);
        }
        out.push_str("}\n");
        out
    }
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
}

// ============================================================================
// Stores
// ============================================================================

/// Where target classes live.
pub trait TargetStore {
    /// The artifact named `qualified`, created if the store allows it.
    fn open(&mut self, qualified: &str) -> Result<&mut TestClassArtifact, TargetError>;
}

/// A [`TargetStore`] over a map of artifacts.
#[derive(Debug, Default)]
pub struct InMemoryTargetStore {
    artifacts: BTreeMap<String, TestClassArtifact>,
    allow_create: bool,
}

impl InMemoryTargetStore {
    pub fn new(allow_create: bool) -> Self {
        InMemoryTargetStore {
            artifacts: BTreeMap::new(),
            allow_create,
        }
    }

    pub fn insert(&mut self, artifact: TestClassArtifact) {
        self.artifacts.insert(artifact.qualified_name(), artifact);
    }

    pub fn get(&self, qualified: &str) -> Option<&TestClassArtifact> {
        self.artifacts.get(qualified)
    }

    pub fn into_artifacts(self) -> BTreeMap<String, TestClassArtifact> {
        self.artifacts
    }
}

impl TargetStore for InMemoryTargetStore {
    fn open(&mut self, qualified: &str) -> Result<&mut TestClassArtifact, TargetError> {
        if !self.artifacts.contains_key(qualified) && !self.allow_create {
            return Err(TargetError::CreationRefused {
                name: qualified.to_string(),
            });
        }
        let artifact = self
            .artifacts
            .entry(qualified.to_string())
            .or_insert_with(|| TestClassArtifact::new(qualified));
        if artifact.read_only {
            return Err(TargetError::NotWritable {
                name: qualified.to_string(),
            });
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod merging {
        use super::*;

        #[test]
        fn members_are_unique_by_name() {
            let mut artifact = TestClassArtifact::new("com.example.CalcTest");
            assert_eq!(artifact.qualified_name(), "com.example.CalcTest");
            assert!(artifact.add_field("testObj", "def testObj = new Calc()".to_string()));
            assert!(!artifact.add_field("testObj", "def testObj = null".to_string()));
            assert!(artifact.add_method("addTest", "def \"addTest\"(){\n}".to_string()));
            assert!(!artifact.add_method("addTest", String::new()));
            assert_eq!(artifact.fields.len(), 1);
            assert_eq!(artifact.method_names(), vec!["addTest"]);
        }

        #[test]
        fn superclass_is_never_replaced() {
            let mut artifact = TestClassArtifact::new("CalcTest");
            assert!(artifact.ensure_superclass("spock.lang.Specification"));
            assert!(!artifact.ensure_superclass("spock.lang.Specification"));
            assert!(!artifact.ensure_superclass("com.example.BaseSpec"));
            assert_eq!(artifact.superclass.as_deref(), Some("spock.lang.Specification"));
        }

        #[test]
        fn statements_go_before_the_closing_brace() {
            let mut artifact = TestClassArtifact::new("CalcTest");
            artifact.add_method("setup", "def setup(){}".to_string());
            let appended = artifact
                .append_to_method("setup", &["testObj.repo = repo".to_string()])
                .unwrap();
            assert!(appended);
            assert_eq!(
                artifact.methods[0].text,
                "def setup(){\n    testObj.repo = repo\n}"
            );
            assert!(!artifact.append_to_method("cleanup", &[]).unwrap());
        }

        #[test]
        fn body_without_brace_is_malformed() {
            let mut artifact = TestClassArtifact::new("CalcTest");
            artifact.add_method("setup", "def setup()".to_string());
            let err = artifact
                .append_to_method("setup", &["x".to_string()])
                .unwrap_err();
            assert!(matches!(err, RenderError::MalformedFixture { .. }));
        }

        #[test]
        fn source_layout() {
            let mut artifact = TestClassArtifact::new("com.example.CalcTest");
            artifact.ensure_superclass("spock.lang.Specification");
            artifact.add_field("testObj", "def testObj = new com.example.Calc()".to_string());
            artifact.add_method("setup", "def setup(){\n    x\n}".to_string());
            let source = artifact.to_source();
            assert_eq!(
                source,
                "package com.example\n\n\
                 class CalcTest extends spock.lang.Specification {\n\
                 \n\
                 \x20   def testObj = new com.example.Calc()\n\
                 \n\
                 \x20   def setup(){\n\
                 \x20       x\n\
                 \x20   }\n\
                 }\n"
            );
        }
    }

    mod stores {
        use super::*;

        #[test]
        fn creation_can_be_refused() {
            let mut store = InMemoryTargetStore::new(false);
            let err = store.open("com.example.CalcTest").unwrap_err();
            assert!(matches!(err, TargetError::CreationRefused { .. }));
            assert!(store.get("com.example.CalcTest").is_none());
        }

        #[test]
        fn read_only_targets_are_not_writable() {
            let mut store = InMemoryTargetStore::new(true);
            let mut artifact = TestClassArtifact::new("com.example.CalcTest");
            artifact.read_only = true;
            store.insert(artifact);
            let err = store.open("com.example.CalcTest").unwrap_err();
            assert_eq!(err.target(), "com.example.CalcTest");
        }

        #[test]
        fn minimal_json_target() {
            let artifact: TestClassArtifact =
                serde_json::from_str(r#"{ "name": "CalcTest" }"#).unwrap();
            assert_eq!(artifact.qualified_name(), "CalcTest");
            assert!(artifact.superclass.is_none());
            assert!(!artifact.read_only);
        }

        #[test]
        fn missing_targets_are_created() {
            let mut store = InMemoryTargetStore::new(true);
            store.open("com.example.CalcTest").unwrap().name.push('X');
            let artifacts = store.into_artifacts();
            assert_eq!(artifacts["com.example.CalcTest"].name, "CalcTestX");
        }
    }
}
