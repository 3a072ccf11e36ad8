//! Per-language rules the extractor needs.
//!
//! One [`Dialect`] implementation per supported source language, selected by
//! the class's [`Language`] tag. The semantic model never branches on the
//! language itself; it asks the dialect.

use crate::adapter::{ClassNode, Language, MethodMarker, MethodNode, Modifier};

/// Visibility a member gets when it declares none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplicitVisibility {
    /// Package-private (Java classes).
    Package,
    /// Public (Groovy, Scala, Java interfaces).
    Public,
}

/// Language-specific classification rules.
pub trait Dialect: Sync {
    fn language(&self) -> Language;

    /// Default visibility of a member declared in a class or interface.
    fn implicit_visibility(&self, owner_is_interface: bool) -> ImplicitVisibility;

    /// Compiler-generated methods that should never be tested directly.
    fn is_synthetic(&self, _method: &MethodNode) -> bool {
        false
    }

    /// Runtime-injected dynamic dispatch helpers that are never relevant callees.
    fn is_dynamic_dispatch(&self, _method: &MethodNode, _method_id: &str) -> bool {
        false
    }

    /// Whether callees built from this dialect's call sites get their
    /// declaring class as override/inheritance context.
    fn callee_context(&self) -> bool;
}

/// Java: package-private default outside interfaces, callees keep their declaring class as context.
pub struct JavaDialect;

/// Groovy: public default, GDK methods and dynamic property accessors are noise.
pub struct GroovyDialect;

/// Scala: public default, compiler-generated members are synthetic.
pub struct ScalaDialect;

const GROOVY_DYNAMIC_SUFFIXES: [&str; 3] = [
    ".invokeMethod(java.lang.String,java.lang.Object)",
    ".getProperty(java.lang.String)",
    ".setProperty(java.lang.String,java.lang.Object)",
];

impl Dialect for JavaDialect {
    fn language(&self) -> Language {
        Language::Java
    }

    fn implicit_visibility(&self, owner_is_interface: bool) -> ImplicitVisibility {
        if owner_is_interface {
            ImplicitVisibility::Public
        } else {
            ImplicitVisibility::Package
        }
    }

    fn callee_context(&self) -> bool {
        true
    }
}

impl Dialect for GroovyDialect {
    fn language(&self) -> Language {
        Language::Groovy
    }

    fn implicit_visibility(&self, _owner_is_interface: bool) -> ImplicitVisibility {
        ImplicitVisibility::Public
    }

    fn is_dynamic_dispatch(&self, method: &MethodNode, method_id: &str) -> bool {
        method.has_marker(MethodMarker::DynamicDispatch)
            || GROOVY_DYNAMIC_SUFFIXES
                .iter()
                .any(|suffix| method_id.ends_with(suffix))
    }

    fn callee_context(&self) -> bool {
        false
    }
}

impl Dialect for ScalaDialect {
    fn language(&self) -> Language {
        Language::Scala
    }

    fn implicit_visibility(&self, _owner_is_interface: bool) -> ImplicitVisibility {
        ImplicitVisibility::Public
    }

    fn is_synthetic(&self, method: &MethodNode) -> bool {
        method.has_marker(MethodMarker::Synthetic)
    }

    fn callee_context(&self) -> bool {
        false
    }
}

static JAVA: JavaDialect = JavaDialect;
static GROOVY: GroovyDialect = GroovyDialect;
static SCALA: ScalaDialect = ScalaDialect;

/// The dialect for a language tag.
pub fn dialect_for(language: Language) -> &'static dyn Dialect {
    match language {
        Language::Java => &JAVA,
        Language::Groovy => &GROOVY,
        Language::Scala => &SCALA,
    }
}

/// Visibility flags of a member after applying the dialect default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    /// Package-private.
    pub is_default: bool,
}

impl Visibility {
    /// Visibility of a member of `owner` declared with `modifiers`.
    pub fn resolve(modifiers: &[Modifier], owner: &ClassNode) -> Self {
        let dialect = dialect_for(owner.language);
        let is_private = modifiers.contains(&Modifier::Private);
        let is_protected = modifiers.contains(&Modifier::Protected);
        let explicit_public = modifiers.contains(&Modifier::Public);
        let implicit = !is_private && !is_protected && !explicit_public;
        let (is_public, is_default) = match dialect.implicit_visibility(owner.is_interface) {
            ImplicitVisibility::Public => (explicit_public || implicit, false),
            ImplicitVisibility::Package => (explicit_public, implicit),
        };
        Visibility {
            is_public,
            is_protected,
            is_private,
            is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_default_is_package_private() {
        let v = Visibility::resolve(&[], &ClassNode::new("com.example.Foo"));
        assert!(v.is_default);
        assert!(!v.is_public);
    }

    #[test]
    fn java_interface_members_are_public() {
        let owner = ClassNode::interface("com.example.Greeter");
        let v = Visibility::resolve(&[], &owner);
        assert!(v.is_public);
        assert!(!v.is_default);
        let v = Visibility::resolve(&[Modifier::Static, Modifier::Final], &owner);
        assert!(v.is_public);
        assert!(Visibility::resolve(&[Modifier::Private], &owner).is_private);
    }

    #[test]
    fn groovy_default_is_public() {
        let mut owner = ClassNode::new("com.example.Foo");
        owner.language = Language::Groovy;
        let v = Visibility::resolve(&[Modifier::Static], &owner);
        assert!(v.is_public);
        assert!(!v.is_default);
    }

    #[test]
    fn groovy_dynamic_accessors() {
        let dialect = dialect_for(Language::Groovy);
        let m = MethodNode::new("getProperty");
        assert!(dialect.is_dynamic_dispatch(&m, "com.example.Foo.getProperty(java.lang.String)"));
        assert!(!dialect.is_dynamic_dispatch(&m, "com.example.Foo.getProperty(int)"));

        let mut gdk = MethodNode::new("each");
        gdk.markers.push(MethodMarker::DynamicDispatch);
        assert!(dialect.is_dynamic_dispatch(&gdk, "java.util.List.each(groovy.lang.Closure)"));
        assert!(!dialect_for(Language::Java).is_dynamic_dispatch(&gdk, "x"));
    }

    #[test]
    fn scala_synthetic_marker() {
        let mut m = MethodNode::new("copy");
        m.markers.push(MethodMarker::Synthetic);
        assert!(dialect_for(Language::Scala).is_synthetic(&m));
        assert!(!dialect_for(Language::Java).is_synthetic(&m));
    }

    #[test]
    fn only_java_keeps_callee_context() {
        assert!(dialect_for(Language::Java).callee_context());
        assert!(!dialect_for(Language::Groovy).callee_context());
        assert!(!dialect_for(Language::Scala).callee_context());
    }
}
