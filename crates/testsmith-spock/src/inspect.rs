//! Questions asked about the tested method itself: is it eligible, does it
//! call its own class, and should those self-calls be spied.

use testsmith_core::model::Method;

pub struct TestSubjectInspector {
    spy_self_calls: bool,
}

impl TestSubjectInspector {
    pub fn new(spy_self_calls: bool) -> Self {
        TestSubjectInspector { spy_self_calls }
    }

    pub fn should_be_tested(&self, method: &Method) -> bool {
        method.is_testable()
    }

    /// True when `method` calls `callee` directly.
    pub fn is_method_called(&self, callee: &Method, method: &Method) -> bool {
        method
            .method_calls_ignore_public_and_protected()
            .iter()
            .any(|call| call.method() == callee)
    }

    /// Whether `candidate` can be stubbed on a spy of the subject while
    /// testing `method`.
    ///
    /// Spock spies intercept neither private nor static methods, and the
    /// tested method itself must run for real.
    pub fn is_spy_method(&self, candidate: &Method, method: &Method) -> bool {
        candidate != method
            && !candidate.flags().is_private
            && !candidate.is_static()
            && !candidate.is_constructor()
    }

    /// Self-calls of `method` that get a spy stub, in call order.
    pub fn spy_methods<'m>(&self, method: &'m Method) -> Vec<&'m Method> {
        if !self.spy_self_calls || method.is_static() {
            return Vec::new();
        }
        method
            .spy_methods()
            .into_iter()
            .filter(|candidate| self.is_spy_method(candidate, method))
            .collect()
    }

    pub fn should_spy(&self, method: &Method) -> bool {
        !self.spy_methods(method).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testsmith_core::adapter::{CallSiteNode, ClassNode, MethodHandle, MethodNode, Modifier, TypeNode};
    use testsmith_core::dictionary::{DictionaryOptions, TypeDictionary};
    use testsmith_core::index::ClassIndex;

    const SUBJECT: &str = "com.example.Orders";

    fn self_call(name: &str) -> CallSiteNode {
        CallSiteNode {
            target: MethodHandle::new(SUBJECT, name, Vec::new()),
            args: Vec::new(),
            field: None,
        }
    }

    fn orders() -> ClassIndex {
        let mut class = ClassNode::new(SUBJECT);
        let mut total = MethodNode::new("total").returning(TypeNode::primitive("int"));
        total.call_sites.push(self_call("discount"));
        total.call_sites.push(self_call("audit"));
        total.call_sites.push(self_call("rate"));
        total.call_sites.push(self_call("total"));
        class.methods.push(total);
        class
            .methods
            .push(MethodNode::new("discount").returning(TypeNode::primitive("int")));
        class.methods.push(
            MethodNode::new("audit")
                .returning(TypeNode::void())
                .with_modifiers(&[Modifier::Private]),
        );
        class.methods.push(
            MethodNode::new("rate")
                .returning(TypeNode::primitive("double"))
                .with_modifiers(&[Modifier::Public, Modifier::Static]),
        );
        ClassIndex::from_classes([class])
    }

    #[test]
    fn spies_only_interceptable_self_calls() {
        let index = orders();
        let dict = TypeDictionary::new(&index, SUBJECT, DictionaryOptions::default()).unwrap();
        let ty = dict.extract_class();
        let total = ty.methods().iter().find(|m| m.name() == "total").unwrap();
        let discount = ty.methods().iter().find(|m| m.name() == "discount").unwrap();

        let inspector = TestSubjectInspector::new(true);
        assert!(inspector.should_be_tested(total));
        assert!(inspector.is_method_called(discount, total));
        let names: Vec<&str> = inspector.spy_methods(total).iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["discount"]);
        assert!(inspector.should_spy(total));
        assert!(!inspector.should_spy(discount));
    }

    #[test]
    fn spying_can_be_disabled() {
        let index = orders();
        let dict = TypeDictionary::new(&index, SUBJECT, DictionaryOptions::default()).unwrap();
        let ty = dict.extract_class();
        let total = ty.methods().iter().find(|m| m.name() == "total").unwrap();
        assert!(!TestSubjectInspector::new(false).should_spy(total));
    }
}
