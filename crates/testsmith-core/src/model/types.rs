//! The `Type` entity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::Serialize;

use crate::adapter::{ClassNode, Language, TypeKind, TypeNode};
use crate::dictionary::TypeDictionary;
use crate::hierarchy;
use crate::model::field::Field;
use crate::model::method::Method;

/// A resolved type.
///
/// Built only by [`TypeDictionary`]. A type resolved with remaining depth 0
/// is a *stub*: it knows its name but has no members
/// ([`Type::is_populated`] is false).
#[derive(Debug, Clone)]
pub struct Type {
    identity: String,
    canonical_name: String,
    name: String,
    package_name: String,
    kind: TypeKind,
    language: Language,
    type_args: Vec<Rc<Type>>,
    element: Option<Rc<Type>>,
    is_interface: bool,
    is_abstract: bool,
    is_enum: bool,
    is_final: bool,
    known: bool,
    populated: bool,
    type_params: Vec<String>,
    supertypes: Vec<String>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    enum_values: Vec<String>,
    annotations: Vec<String>,
    has_default_constructor: bool,
}

impl Type {
    fn bare(node: &TypeNode) -> Self {
        let canonical_name = node.erasure();
        let (package_name, name) = match node.name.rfind('.') {
            Some(idx) if node.kind == TypeKind::Class => (
                node.name[..idx].to_string(),
                canonical_name[idx + 1..].to_string(),
            ),
            _ => (String::new(), canonical_name.clone()),
        };
        Type {
            identity: node.canonical_text(),
            canonical_name,
            name,
            package_name,
            kind: node.kind,
            language: Language::default(),
            type_args: Vec::new(),
            element: None,
            is_interface: false,
            is_abstract: false,
            is_enum: false,
            is_final: false,
            known: false,
            populated: false,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_values: Vec::new(),
            annotations: Vec::new(),
            has_default_constructor: false,
        }
    }

    /// Name only, no members.
    pub(crate) fn stub(node: &TypeNode) -> Self {
        Type::bare(node)
    }

    /// Resolve `node` with `depth > 0` remaining.
    pub(crate) fn build(
        node: &TypeNode,
        depth: usize,
        dict: &TypeDictionary<'_>,
        resolve_internals: bool,
    ) -> Self {
        let mut ty = Type::bare(node);
        ty.populated = true;

        if let Some(element) = node.element() {
            ty.element = Some(dict.get_type(&element, depth, true, None));
            return ty;
        }
        if node.kind != TypeKind::Class {
            return ty;
        }

        ty.type_args = node
            .args
            .iter()
            .map(|arg| dict.get_type(arg, depth, true, None))
            .collect();

        match dict.provider().class(&node.name) {
            Some(class) => ty.populate(class, depth, dict, resolve_internals),
            None => tracing::trace!(type_name = %node.name, "type outside the snapshot"),
        }
        ty
    }

    fn populate(
        &mut self,
        class: &ClassNode,
        depth: usize,
        dict: &TypeDictionary<'_>,
        resolve_internals: bool,
    ) {
        let provider = dict.provider();
        let member_depth = depth.saturating_sub(1);

        self.known = true;
        self.language = class.language;
        self.is_interface = class.is_interface;
        self.is_abstract = class.is_abstract;
        self.is_enum = class.is_enum;
        self.is_final = class.is_final;
        self.type_params = class.type_params.clone();
        self.enum_values = class.enum_constants.clone();
        self.annotations = class.annotations.clone();
        self.has_default_constructor = class.has_default_constructor;

        let chain: Vec<&ClassNode> = match hierarchy::ancestors(provider, &class.qualified_name) {
            Ok(chain) => {
                self.supertypes = chain.iter().skip(1).map(|a| a.class_name.clone()).collect();
                chain
                    .iter()
                    .filter_map(|a| provider.class(&a.class_name))
                    .collect()
            }
            Err(err) => {
                tracing::warn!(class = %class.qualified_name, error = %err, "cannot walk supertypes");
                vec![class]
            }
        };

        for declaring in &chain {
            for field in &declaring.fields {
                self.fields.push(Field::build(
                    field,
                    declaring,
                    Some(class),
                    member_depth,
                    dict,
                ));
            }
        }

        for declaring in &chain {
            let own = declaring.qualified_name == class.qualified_name;
            for method in &declaring.methods {
                if method.is_constructor && !own {
                    continue;
                }
                self.methods.push(Method::build(
                    method,
                    declaring,
                    Some(class),
                    member_depth,
                    dict,
                    resolve_internals && own,
                ));
            }
        }
    }

    /// Canonical text including type arguments; the identity of the type.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Erased qualified name with array suffix, e.g. `java.util.List` or `int[]`.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Simple name, e.g. `List`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn type_args(&self) -> &[Rc<Type>] {
        &self.type_args
    }

    /// Element type for arrays.
    pub fn element(&self) -> Option<&Rc<Type>> {
        self.element.as_ref()
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive && self.element.is_none() && !self.is_array()
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn is_type_param(&self) -> bool {
        self.kind == TypeKind::TypeParameter && !self.is_array()
    }

    pub fn is_array(&self) -> bool {
        self.canonical_name.ends_with("[]")
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_enum(&self) -> bool {
        self.is_enum
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// True when the provider knew the class.
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// False for depth-bound stubs.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    /// Qualified names of all ancestors, nearest first.
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Own and inherited fields, own first.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Own and inherited methods, own first.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn enum_values(&self) -> &[String] {
        &self.enum_values
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotations.iter().any(|a| a == qualified_name)
    }

    pub fn has_default_constructor(&self) -> bool {
        self.has_default_constructor
    }

    pub fn find_constructors(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|m| m.is_constructor())
    }

    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// `new T()` compiles: concrete, with an implicit or accessible no-arg constructor.
    pub fn has_valid_empty_constructor(&self) -> bool {
        if self.is_interface || self.is_abstract || !self.known {
            return false;
        }
        self.has_default_constructor
            || self
                .find_constructors()
                .any(|c| c.flags().accessible && c.params().is_empty())
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}

impl Serialize for Type {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.identity)
    }
}
