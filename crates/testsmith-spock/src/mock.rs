//! Test-double decisions: which fields get a double, what kind, and which
//! collaborator calls need a stubbed response.

use testsmith_core::config::MockPolicy;
use testsmith_core::model::{Field, Method, Param};
use testsmith_core::tables::MatcherTable;

/// Placeholder in a substitution factory replaced by the field type.
pub const TYPE_PLACEHOLDER: &str = "<TYPE>";

/// How a field of the class under test is replaced in the specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestDouble {
    /// `Mock(T)`.
    Mock,
    /// A factory expression from the substitution policy, type already filled in.
    Factory(String),
}

/// A collaborator method whose result the tested method consumes.
#[derive(Debug, Clone, Copy)]
pub struct StubTarget<'m> {
    pub field: &'m Field,
    pub method: &'m Method,
}

/// Mockability and stub-need analysis.
pub struct MockBuilder<'c> {
    policy: &'c MockPolicy,
    matchers: &'c MatcherTable,
    subject: String,
}

impl<'c> MockBuilder<'c> {
    /// `subject` is the canonical name of the class under test.
    pub fn new(policy: &'c MockPolicy, matchers: &'c MatcherTable, subject: impl Into<String>) -> Self {
        MockBuilder {
            policy,
            matchers,
            subject: subject.into(),
        }
    }

    /// Factory expression for `field` when its type carries a substitution
    /// marker.
    fn substitution(&self, field: &Field) -> Option<String> {
        let ty = field.field_type();
        self.policy
            .substitutions
            .iter()
            .find(|s| ty.has_annotation(&s.annotation))
            .map(|s| s.factory.replace(TYPE_PLACEHOLDER, ty.canonical_name()))
    }

    /// Reference type, not the subject, not excluded by the policy.
    fn is_replaceable(&self, field: &Field) -> bool {
        let ty = field.field_type();
        if ty.is_primitive() || ty.is_void() || ty.is_type_param() {
            return false;
        }
        if ty.canonical_name() == self.subject {
            return false;
        }
        if self
            .policy
            .excluded_types
            .iter()
            .any(|t| t == ty.canonical_name())
        {
            return false;
        }
        if field.is_static() && field.is_final() {
            return false;
        }
        (self.policy.mock_final || !ty.is_final())
            && (self.policy.mock_enums || !ty.is_enum())
            && (self.policy.mock_arrays || !ty.is_array())
    }

    /// True when `field` is replaced by `Mock(T)`.
    ///
    /// Fields whose type matches a substitution entry are not mockable; they
    /// get a factory double instead.
    pub fn is_mockable(&self, field: &Field) -> bool {
        self.is_replaceable(field) && self.substitution(field).is_none()
    }

    /// The double `field` gets, if any.
    pub fn double_for(&self, field: &Field) -> Option<TestDouble> {
        if !self.is_replaceable(field) {
            return None;
        }
        Some(match self.substitution(field) {
            Some(factory) => TestDouble::Factory(factory),
            None => TestDouble::Mock,
        })
    }

    pub fn has_mockable(&self, fields: &[Field]) -> bool {
        fields.iter().any(|f| self.is_mockable(f))
    }

    /// Value-returning methods of mockable field types that `method` calls.
    pub fn stub_targets<'m>(&self, method: &Method, fields: &'m [Field]) -> Vec<StubTarget<'m>> {
        fields
            .iter()
            .filter(|f| self.is_mockable(f))
            .flat_map(|field| {
                field
                    .field_type()
                    .methods()
                    .iter()
                    .filter(move |m| m.has_return() && method.calls(m))
                    .map(move |m| StubTarget { field, method: m })
            })
            .collect()
    }

    pub fn should_stub(&self, method: &Method, fields: &[Field]) -> bool {
        !self.stub_targets(method, fields).is_empty()
    }

    /// One "match anything" expression per parameter, comma-separated.
    ///
    /// Dialects absent from the matcher table fall back to Spock's `_`.
    pub fn build_mock_args_matchers(&self, params: &[Param], dialect: &str) -> String {
        params
            .iter()
            .map(|p| {
                self.matchers
                    .matcher(dialect, p.param_type().canonical_name())
                    .unwrap_or("_")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testsmith_core::adapter::{
        CallSiteNode, ClassNode, FieldNode, MethodHandle, MethodNode, Modifier, ParamNode, TypeNode,
    };
    use testsmith_core::config::DoubleSubstitution;
    use testsmith_core::dictionary::{DictionaryOptions, TypeDictionary};
    use testsmith_core::index::ClassIndex;

    const SUBJECT: &str = "com.example.Service";

    fn subject_index() -> ClassIndex {
        let mut subject = ClassNode::new(SUBJECT);
        subject
            .fields
            .push(FieldNode::new("repo", TypeNode::class("com.example.Repo")));
        subject
            .fields
            .push(FieldNode::new("name", TypeNode::class("java.lang.String")));
        subject
            .fields
            .push(FieldNode::new("count", TypeNode::primitive("int")));
        subject
            .fields
            .push(FieldNode::new("self", TypeNode::class(SUBJECT)));
        subject
            .fields
            .push(FieldNode::new("mapper", TypeNode::class("com.example.UserMapper")));
        subject
            .fields
            .push(FieldNode::new("status", TypeNode::class("com.example.Status")));
        let mut constant = FieldNode::new("DEFAULT", TypeNode::class("com.example.Repo"));
        constant.modifiers = vec![Modifier::Static, Modifier::Final];
        subject.fields.push(constant);

        let mut mapper = ClassNode::interface("com.example.UserMapper");
        mapper.annotations.push("org.mapstruct.Mapper".to_string());
        let mut status = ClassNode::new("com.example.Status");
        status.is_enum = true;
        status.enum_constants = vec!["ACTIVE".to_string()];

        ClassIndex::from_classes([
            subject,
            ClassNode::interface("com.example.Repo"),
            mapper,
            status,
        ])
    }

    fn field<'a>(fields: &'a [Field], name: &str) -> &'a Field {
        fields.iter().find(|f| f.name() == name).unwrap()
    }

    #[test]
    fn mockability_follows_policy() {
        let index = subject_index();
        let dict = TypeDictionary::new(&index, SUBJECT, DictionaryOptions::default()).unwrap();
        let ty = dict.extract_class();
        let policy = MockPolicy::default();
        let matchers = MatcherTable::with_defaults();
        let builder = MockBuilder::new(&policy, &matchers, SUBJECT);
        let fields = ty.fields();

        assert!(builder.is_mockable(field(fields, "repo")));
        assert!(!builder.is_mockable(field(fields, "name")));
        assert!(!builder.is_mockable(field(fields, "count")));
        assert!(!builder.is_mockable(field(fields, "self")));
        assert!(!builder.is_mockable(field(fields, "status")));
        assert!(!builder.is_mockable(field(fields, "DEFAULT")));
        assert!(!builder.is_mockable(field(fields, "mapper")));
        assert!(builder.has_mockable(fields));

        assert_eq!(
            builder.double_for(field(fields, "mapper")),
            Some(TestDouble::Factory(
                "org.mapstruct.factory.Mappers.getMapper(com.example.UserMapper)".to_string()
            ))
        );
        assert_eq!(builder.double_for(field(fields, "repo")), Some(TestDouble::Mock));
        assert_eq!(builder.double_for(field(fields, "name")), None);
    }

    #[test]
    fn policy_switches_open_up_enums_and_clear_substitutions() {
        let index = subject_index();
        let dict = TypeDictionary::new(&index, SUBJECT, DictionaryOptions::default()).unwrap();
        let ty = dict.extract_class();
        let policy = MockPolicy {
            mock_enums: true,
            substitutions: vec![DoubleSubstitution {
                annotation: "com.example.Unused".to_string(),
                factory: "x".to_string(),
            }],
            ..MockPolicy::default()
        };
        let matchers = MatcherTable::with_defaults();
        let builder = MockBuilder::new(&policy, &matchers, SUBJECT);
        assert!(builder.is_mockable(field(ty.fields(), "status")));
        assert!(builder.is_mockable(field(ty.fields(), "mapper")));
    }

    #[test]
    fn stubs_follow_value_returning_collaborator_calls() {
        const REPO: &str = "com.example.Repo";
        let repo_call = |name: &str| CallSiteNode {
            target: MethodHandle::new(REPO, name, Vec::new()),
            args: Vec::new(),
            field: Some("repo".to_string()),
        };

        let mut subject = ClassNode::new(SUBJECT);
        subject
            .fields
            .push(FieldNode::new("repo", TypeNode::class(REPO)));
        let mut load = MethodNode::new("load").returning(TypeNode::primitive("int"));
        load.call_sites.push(repo_call("count"));
        load.call_sites.push(repo_call("touch"));
        subject.methods.push(load);
        let mut touch_only = MethodNode::new("touchOnly").returning(TypeNode::void());
        touch_only.call_sites.push(repo_call("touch"));
        subject.methods.push(touch_only);
        subject.methods.push(MethodNode::new("idle").returning(TypeNode::void()));

        let mut repo = ClassNode::interface(REPO);
        repo.methods.push(
            MethodNode::new("count")
                .returning(TypeNode::primitive("int"))
                .with_modifiers(&[Modifier::Public, Modifier::Abstract]),
        );
        repo.methods.push(
            MethodNode::new("touch")
                .returning(TypeNode::void())
                .with_modifiers(&[Modifier::Public, Modifier::Abstract]),
        );

        let index = ClassIndex::from_classes([subject, repo]);
        let dict = TypeDictionary::new(&index, SUBJECT, DictionaryOptions::default()).unwrap();
        let ty = dict.extract_class();
        let policy = MockPolicy::default();
        let matchers = MatcherTable::with_defaults();
        let builder = MockBuilder::new(&policy, &matchers, SUBJECT);
        let method = |name: &str| ty.methods().iter().find(|m| m.name() == name).unwrap();

        let targets = builder.stub_targets(method("load"), ty.fields());
        let names: Vec<(&str, &str)> = targets
            .iter()
            .map(|t| (t.field.name(), t.method.name()))
            .collect();
        assert_eq!(names, vec![("repo", "count")]);
        assert!(builder.should_stub(method("load"), ty.fields()));
        assert!(!builder.should_stub(method("touchOnly"), ty.fields()));
        assert!(!builder.should_stub(method("idle"), ty.fields()));
    }

    #[test]
    fn matchers_per_dialect() {
        let mut subject = ClassNode::new(SUBJECT);
        let mut lookup = MethodNode::new("lookup").returning(TypeNode::primitive("int"));
        lookup
            .params
            .push(ParamNode::new("id", TypeNode::primitive("long")));
        lookup
            .params
            .push(ParamNode::new("key", TypeNode::class("java.lang.String")));
        subject.methods.push(lookup);
        subject.methods.push(MethodNode::new("reset"));
        let index = ClassIndex::from_classes([subject]);
        let dict = TypeDictionary::new(&index, SUBJECT, DictionaryOptions::default()).unwrap();
        let ty = dict.extract_class();
        let policy = MockPolicy::default();
        let matchers = MatcherTable::with_defaults();
        let builder = MockBuilder::new(&policy, &matchers, SUBJECT);

        let lookup = ty.methods().iter().find(|m| m.name() == "lookup").unwrap();
        assert_eq!(builder.build_mock_args_matchers(lookup.params(), "Groovy"), "_, _");
        assert_eq!(
            builder.build_mock_args_matchers(lookup.params(), "java"),
            "anyLong(), anyString()"
        );
        assert_eq!(builder.build_mock_args_matchers(lookup.params(), "kotlin"), "_, _");

        let reset = ty.methods().iter().find(|m| m.name() == "reset").unwrap();
        assert_eq!(builder.build_mock_args_matchers(reset.params(), "groovy"), "");
    }
}
