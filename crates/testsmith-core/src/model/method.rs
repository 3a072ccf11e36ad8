//! The `Method` entity and its classification.
//!
//! A [`Method`] is built in one pass, in this order:
//!
//! 1. modifiers and visibility (dialect default applied)
//! 2. constructor / getter / setter by naming and signature convention
//! 3. `inherited` and `overridden` relative to the class it is seen from
//! 4. interface-shape and synthetic detection
//! 5. generic substitution, only for inherited testable methods that may
//!    mention a type parameter
//! 6. return and parameter types through the [`TypeDictionary`]
//! 7. the call graph, when requested (methods of the class under test)

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::adapter::{ClassNode, MethodNode, Modifier, TypeKind, TypeNode};
use crate::callgraph::{self, CallGraph};
use crate::dialect::{dialect_for, Visibility};
use crate::dictionary::TypeDictionary;
use crate::hierarchy;
use crate::model::call::MethodCall;
use crate::model::field::Field;
use crate::model::param::Param;
use crate::model::reference::Reference;
use crate::model::types::Type;

static ACCESSOR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(get|is|set)(\p{Lu}\w*)$").unwrap());

/// `owner.name(paramType1,paramType2)` using declared parameter types.
pub fn format_method_id(owner: &str, method: &MethodNode) -> String {
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| p.type_node.canonical_text())
        .collect();
    format!("{}.{}({})", owner, method.name, params.join(","))
}

/// Classification flags of a method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodFlags {
    pub is_private: bool,
    pub is_protected: bool,
    /// Package-private.
    pub is_default: bool,
    pub is_public: bool,
    pub is_abstract: bool,
    pub is_native: bool,
    pub is_static: bool,
    pub is_constructor: bool,
    pub is_primary_constructor: bool,
    pub is_getter: bool,
    pub is_setter: bool,
    pub is_synthetic: bool,
    /// Declared without a body: treated as interface-shaped.
    pub in_interface: bool,
    /// Declared on an ancestor of the class it is seen from.
    pub inherited: bool,
    /// A concrete override exists between the declaring class and the
    /// class it is seen from.
    pub overridden: bool,
    /// Callable from the class under test.
    pub accessible: bool,
}

/// A method or constructor.
///
/// Equality and hashing use [`Method::method_id`] only.
#[derive(Debug, Clone)]
pub struct Method {
    method_id: String,
    name: String,
    owner: String,
    return_type: Option<Rc<Type>>,
    params: Vec<Param>,
    flags: MethodFlags,
    property_name: Option<String>,
    direct_method_calls: Vec<MethodCall>,
    method_calls: Vec<MethodCall>,
    method_calls_ignore_public_and_protected: Vec<MethodCall>,
    method_references: Vec<Method>,
    internal_references: Vec<Reference>,
    indirectly_affected_fields: Vec<Field>,
    internals_resolved: bool,
}

impl Method {
    /// Build the method declared as `node` on `owner`, seen from `src`.
    ///
    /// `depth` bounds the expansion of the return and parameter types.
    /// With `resolve_internals`, the call graph of the body is resolved and
    /// every callee is built at depth 1 without its own call graph.
    pub(crate) fn build(
        node: &MethodNode,
        owner: &ClassNode,
        src: Option<&ClassNode>,
        depth: usize,
        dict: &TypeDictionary<'_>,
        resolve_internals: bool,
    ) -> Self {
        let dialect = dialect_for(owner.language);
        let visibility = Visibility::resolve(&node.modifiers, owner);
        let is_static = node.has_modifier(Modifier::Static);
        let is_abstract = node.has_modifier(Modifier::Abstract);
        let is_native = node.has_modifier(Modifier::Native);
        let (is_getter, is_setter) = accessor_kind(node, is_static);
        let inherited = src.is_some_and(|s| s.qualified_name != owner.qualified_name);
        let overridden = match src {
            Some(s) if inherited => {
                hierarchy::is_overridden(dict.provider(), &s.qualified_name, &owner.qualified_name, node)
            }
            _ => false,
        };

        let flags = MethodFlags {
            is_private: visibility.is_private,
            is_protected: visibility.is_protected,
            is_default: visibility.is_default,
            is_public: visibility.is_public,
            is_abstract,
            is_native,
            is_static,
            is_constructor: node.is_constructor,
            is_primary_constructor: node.is_constructor && node.is_primary_constructor,
            is_getter,
            is_setter,
            is_synthetic: dialect.is_synthetic(node),
            in_interface: is_abstract || (!node.has_body && !is_native),
            inherited,
            overridden,
            accessible: dict.is_accessible(owner, &node.modifiers),
        };
        let method_id = format_method_id(&owner.qualified_name, node);

        let bindings = match src {
            Some(s) if inherited && is_testable(&owner.qualified_name, &flags) && may_be_generic(node) => {
                find_substitution(dict, s, owner, node)
            }
            _ => None,
        };

        let return_type = node
            .return_type
            .as_ref()
            .map(|t| dict.get_type(t, depth, true, bindings.as_ref()));
        let params = node
            .params
            .iter()
            .map(|p| Param::build(p, node, owner, bindings.as_ref(), depth, dict))
            .collect();

        let graph = if resolve_internals {
            callgraph::resolve(node, owner, dict)
        } else {
            CallGraph::default()
        };
        let method_calls = graph.direct.clone();
        let method_calls_ignore_public_and_protected = graph.direct.clone();

        Method {
            property_name: property_name(&node.name, is_getter || is_setter),
            method_id,
            name: node.name.clone(),
            owner: owner.qualified_name.clone(),
            return_type,
            params,
            flags,
            direct_method_calls: graph.direct,
            method_calls,
            method_calls_ignore_public_and_protected,
            method_references: graph.method_refs,
            internal_references: graph.references,
            indirectly_affected_fields: graph.indirectly_affected_fields,
            internals_resolved: resolve_internals,
        }
    }

    /// Unique signature string, stable across the hierarchy.
    pub fn method_id(&self) -> &str {
        &self.method_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name of the declaring class.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// `None` when the host exposed no return type.
    pub fn return_type(&self) -> Option<&Rc<Type>> {
        self.return_type.as_ref()
    }

    /// True when there is a non-void return type.
    pub fn has_return(&self) -> bool {
        self.return_type.as_ref().is_some_and(|t| !t.is_void())
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn flags(&self) -> &MethodFlags {
        &self.flags
    }

    pub fn is_constructor(&self) -> bool {
        self.flags.is_constructor
    }

    pub fn is_static(&self) -> bool {
        self.flags.is_static
    }

    pub fn is_inherited(&self) -> bool {
        self.flags.inherited
    }

    /// Property name for getters and setters (`getUserName` -> `userName`).
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    /// Eligible for standalone test generation.
    pub fn is_testable(&self) -> bool {
        is_testable(&self.owner, &self.flags)
    }

    /// Whether the call graph of this method was resolved.
    pub fn internals_resolved(&self) -> bool {
        self.internals_resolved
    }

    /// Relevant calls as found in the body.
    pub fn direct_method_calls(&self) -> &[MethodCall] {
        &self.direct_method_calls
    }

    /// Calls used for stub decisions; currently the direct calls.
    pub fn method_calls(&self) -> &[MethodCall] {
        &self.method_calls
    }

    /// Calls used for spy-candidate selection; currently the direct calls.
    pub fn method_calls_ignore_public_and_protected(&self) -> &[MethodCall] {
        &self.method_calls_ignore_public_and_protected
    }

    /// Bound method values (`this::helper`) found in the body.
    pub fn method_references(&self) -> &[Method] {
        &self.method_references
    }

    pub fn internal_references(&self) -> &[Reference] {
        &self.internal_references
    }

    /// Fields assigned by a constructor this constructor delegates to.
    pub fn indirectly_affected_fields(&self) -> &[Field] {
        &self.indirectly_affected_fields
    }

    /// Callees declared on this method's own class.
    pub fn spy_methods(&self) -> Vec<&Method> {
        let mut seen: Vec<&Method> = Vec::new();
        for call in &self.method_calls_ignore_public_and_protected {
            let callee = call.method();
            if callee.owner == self.owner && !seen.contains(&callee) {
                seen.push(callee);
            }
        }
        seen
    }

    /// True when `callee` is among the calls of this method.
    pub fn calls(&self, callee: &Method) -> bool {
        self.method_calls.iter().any(|c| c.method() == callee)
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.method_id == other.method_id
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method_id.hash(state);
    }
}

// ============================================================================
// Classification helpers
// ============================================================================

fn is_testable(owner: &str, flags: &MethodFlags) -> bool {
    !callgraph::is_root_type(owner)
        && !flags.is_setter
        && !flags.is_getter
        && !flags.is_constructor
        && (flags.is_public || ((flags.is_default || flags.is_protected) && !flags.inherited))
        && !flags.overridden
        && !flags.in_interface
        && !flags.is_abstract
        && !flags.is_synthetic
}

/// (getter, setter) by JavaBeans naming and signature.
fn accessor_kind(node: &MethodNode, is_static: bool) -> (bool, bool) {
    if is_static || node.is_constructor {
        return (false, false);
    }
    let Some(caps) = ACCESSOR_NAME.captures(&node.name) else {
        return (false, false);
    };
    let returns_value = node.return_type.as_ref().is_some_and(|t| !t.is_void());
    match &caps[1] {
        "get" => (node.params.is_empty() && returns_value, false),
        "is" => {
            let returns_boolean = node
                .return_type
                .as_ref()
                .is_some_and(|t| t.is_primitive() && t.name == "boolean");
            (node.params.is_empty() && returns_boolean, false)
        }
        _ => (false, node.params.len() == 1 && !returns_value),
    }
}

fn property_name(name: &str, is_accessor: bool) -> Option<String> {
    if !is_accessor {
        return None;
    }
    let caps = ACCESSOR_NAME.captures(name)?;
    Some(decapitalize(&caps[2]))
}

/// `URL` stays `URL`, `UserName` becomes `userName`.
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if a.is_uppercase() && b.is_uppercase() => name.to_string(),
        (Some(a), _) => {
            let mut out: String = a.to_lowercase().collect();
            out.push_str(&name[a.len_utf8()..]);
            out
        }
        _ => String::new(),
    }
}

fn may_be_generic(node: &MethodNode) -> bool {
    let is_reference = |t: &TypeNode| matches!(t.kind, TypeKind::Class | TypeKind::TypeParameter);
    node.params.iter().any(|p| is_reference(&p.type_node))
        || node.return_type.as_ref().is_some_and(is_reference)
}

/// The bindings under which `src` sees `node` declared on `owner`.
fn find_substitution(
    dict: &TypeDictionary<'_>,
    src: &ClassNode,
    owner: &ClassNode,
    node: &MethodNode,
) -> Option<HashMap<String, TypeNode>> {
    let handle = node.handle(&owner.qualified_name);
    let found = hierarchy::methods_named(dict.provider(), &src.qualified_name, &node.name)
        .into_iter()
        .find(|(declaring, method, _)| {
            declaring.qualified_name == owner.qualified_name && handle.matches(method)
        })
        .map(|(_, _, bindings)| bindings);
    if found.is_none() {
        tracing::debug!(
            method = %format_method_id(&owner.qualified_name, node),
            "no substitution entry; using declared types"
        );
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ParamNode;

    #[test]
    fn method_id_uses_declared_param_types() {
        let mut m = MethodNode::new("save");
        m.params.push(ParamNode::new(
            "items",
            TypeNode::generic("java.util.List", vec![TypeNode::type_param("T")]),
        ));
        m.params.push(ParamNode::new("flag", TypeNode::primitive("boolean")));
        assert_eq!(
            format_method_id("com.example.Repo", &m),
            "com.example.Repo.save(java.util.List<T>,boolean)"
        );
    }

    #[test]
    fn accessor_classification() {
        let getter = MethodNode::new("getName").returning(TypeNode::class("java.lang.String"));
        assert_eq!(accessor_kind(&getter, false), (true, false));
        assert_eq!(accessor_kind(&getter, true), (false, false));

        let is_getter = MethodNode::new("isActive").returning(TypeNode::primitive("boolean"));
        assert_eq!(accessor_kind(&is_getter, false), (true, false));

        let not_is_getter = MethodNode::new("isActive").returning(TypeNode::primitive("int"));
        assert_eq!(accessor_kind(&not_is_getter, false), (false, false));

        let mut setter = MethodNode::new("setName").returning(TypeNode::void());
        setter
            .params
            .push(ParamNode::new("name", TypeNode::class("java.lang.String")));
        assert_eq!(accessor_kind(&setter, false), (false, true));

        let getaway = MethodNode::new("getaway").returning(TypeNode::primitive("int"));
        assert_eq!(accessor_kind(&getaway, false), (false, false));
    }

    mod substitution {
        use super::*;
        use crate::adapter::SymbolProvider;
        use crate::dictionary::DictionaryOptions;
        use crate::index::ClassIndex;

        fn index() -> ClassIndex {
            let mut base = ClassNode::new("com.example.Base");
            base.type_params.push("T".to_string());
            let mut put = MethodNode::new("put").returning(TypeNode::void());
            put.params.push(ParamNode::new("value", TypeNode::type_param("T")));
            base.methods.push(put);

            let string_base = TypeNode::generic(
                "com.example.Base",
                vec![TypeNode::class("java.lang.String")],
            );
            let mut names = ClassNode::new("com.example.Names");
            names.supertypes.push(string_base.clone());

            let mut looped = ClassNode::new("com.example.Looped");
            looped.supertypes.push(string_base);
            looped.supertypes.push(TypeNode::class("com.example.Back"));
            let mut back = ClassNode::new("com.example.Back");
            back.supertypes.push(TypeNode::class("com.example.Looped"));

            ClassIndex::from_classes([base, names, looped, back])
        }

        fn inherited_put(index: &ClassIndex, src: &str) -> Method {
            let options = DictionaryOptions {
                max_depth: 2,
                pojo_prefixes: Vec::new(),
            };
            let dict = TypeDictionary::new(index, "com.example.Base", options).unwrap();
            let base = index.class("com.example.Base").unwrap();
            let src = index.class(src).unwrap();
            Method::build(&base.methods[0], base, Some(src), 1, &dict, false)
        }

        #[test]
        fn inherited_generic_param_is_bound() {
            let index = index();
            let put = inherited_put(&index, "com.example.Names");
            assert!(put.is_inherited());
            assert_eq!(put.params()[0].param_type().canonical_name(), "java.lang.String");
        }

        #[test]
        fn cyclic_ancestry_keeps_declared_type() {
            let index = index();
            let put = inherited_put(&index, "com.example.Looped");
            assert!(put.is_inherited());
            assert!(put.is_testable());
            assert_eq!(put.params()[0].param_type().canonical_name(), "T");
            assert_eq!(put.method_id(), "com.example.Base.put(T)");
        }
    }

    #[test]
    fn property_names() {
        assert_eq!(property_name("getUserName", true), Some("userName".to_string()));
        assert_eq!(property_name("getURL", true), Some("URL".to_string()));
        assert_eq!(property_name("getUserName", false), None);
    }
}
