//! Symbol provider trait and host-supplied class data types.
//!
//! This module defines the [`SymbolProvider`] trait, the facade through which
//! the host (an IDE plugin, a compiler plugin, or a JSON snapshot) hands parsed
//! classes to the model extractor, along with the plain data types used to
//! describe those classes.
//!
//! # Architecture
//!
//! The extractor never parses source text. A host adapter walks its own AST
//! and produces one [`ClassNode`] per class, with methods, fields, call sites,
//! method references, variable references and field writes already resolved
//! to qualified names. The extractor reads these through the provider and
//! builds the immutable semantic model in [`crate::model`].
//!
//! # Language Tags
//!
//! Every class carries a [`Language`] tag. Per-language behavior (implicit
//! visibility, synthetic methods, dynamic-dispatch accessors, call-graph
//! context) is selected from the tag by [`crate::dialect::dialect_for`];
//! the data types themselves are the same for all languages.
//!
//! # Capabilities
//!
//! Not every host can answer every question. A provider advertises what it
//! can find inside method bodies via [`SymbolProvider::supports`]; the call
//! graph resolver skips the views a provider cannot populate instead of
//! treating their absence as "no calls".
//!
//! ## Example
//!
//! ```
//! use testsmith_core::adapter::{ClassNode, MethodNode, ParamNode, TypeNode};
//!
//! let mut calculator = ClassNode::new("com.example.Calculator");
//! let mut add = MethodNode::new("add").returning(TypeNode::primitive("int"));
//! add.params.push(ParamNode::new("a", TypeNode::primitive("int")));
//! add.params.push(ParamNode::new("b", TypeNode::primitive("int")));
//! calculator.methods.push(add);
//!
//! assert_eq!(calculator.simple_name(), "Calculator");
//! assert_eq!(calculator.package_name(), "com.example");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// ============================================================================
// Language
// ============================================================================

/// Source dialect of a class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Java,
    Groovy,
    Scala,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Java => "java",
            Language::Groovy => "groovy",
            Language::Scala => "scala",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Type References
// ============================================================================

/// What a [`TypeNode`] names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A class, interface, enum or other reference type.
    #[default]
    Class,
    /// A primitive keyword (`int`, `boolean`, ...).
    Primitive,
    /// A type parameter (`T`), unresolved until substituted.
    TypeParameter,
    /// The `void` pseudo-type.
    Void,
}

/// A type as written at a declaration or use site.
///
/// `name` is the erased qualified name for classes, the keyword for
/// primitives, and the parameter name for type parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeNode>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_dims: u8,
}

fn is_zero(dims: &u8) -> bool {
    *dims == 0
}

impl TypeNode {
    /// A reference type without type arguments.
    pub fn class(name: impl Into<String>) -> Self {
        TypeNode {
            name: name.into(),
            args: Vec::new(),
            kind: TypeKind::Class,
            array_dims: 0,
        }
    }

    /// A reference type with type arguments.
    pub fn generic(name: impl Into<String>, args: Vec<TypeNode>) -> Self {
        TypeNode {
            args,
            ..TypeNode::class(name)
        }
    }

    pub fn primitive(keyword: impl Into<String>) -> Self {
        TypeNode {
            kind: TypeKind::Primitive,
            ..TypeNode::class(keyword)
        }
    }

    pub fn type_param(name: impl Into<String>) -> Self {
        TypeNode {
            kind: TypeKind::TypeParameter,
            ..TypeNode::class(name)
        }
    }

    pub fn void() -> Self {
        TypeNode {
            kind: TypeKind::Void,
            ..TypeNode::class("void")
        }
    }

    /// The same type with `dims` additional array dimensions.
    pub fn array_of(mut self, dims: u8) -> Self {
        self.array_dims += dims;
        self
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive && self.array_dims == 0
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn is_array(&self) -> bool {
        self.array_dims > 0
    }

    /// Erased name plus array suffix, e.g. `java.util.List` or `int[]`.
    pub fn erasure(&self) -> String {
        let mut text = self.name.clone();
        for _ in 0..self.array_dims {
            text.push_str("[]");
        }
        text
    }

    /// Full canonical text including type arguments,
    /// e.g. `java.util.Map<java.lang.String,java.lang.Integer>[]`.
    pub fn canonical_text(&self) -> String {
        let mut text = self.name.clone();
        if !self.args.is_empty() {
            text.push('<');
            let args: Vec<String> = self.args.iter().map(TypeNode::canonical_text).collect();
            text.push_str(&args.join(","));
            text.push('>');
        }
        for _ in 0..self.array_dims {
            text.push_str("[]");
        }
        text
    }

    /// Last segment of the erased name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The element type of an array, `None` otherwise.
    pub fn element(&self) -> Option<TypeNode> {
        if self.array_dims == 0 {
            return None;
        }
        let mut element = self.clone();
        element.array_dims -= 1;
        Some(element)
    }

    /// True when a type parameter appears anywhere in this type.
    pub fn mentions_type_param(&self) -> bool {
        self.kind == TypeKind::TypeParameter || self.args.iter().any(TypeNode::mentions_type_param)
    }

    /// Replace type parameters named in `bindings`, keeping array dimensions.
    pub fn substitute(&self, bindings: &HashMap<String, TypeNode>) -> TypeNode {
        if bindings.is_empty() {
            return self.clone();
        }
        if self.kind == TypeKind::TypeParameter {
            if let Some(bound) = bindings.get(&self.name) {
                return bound.clone().array_of(self.array_dims);
            }
            return self.clone();
        }
        TypeNode {
            name: self.name.clone(),
            args: self.args.iter().map(|a| a.substitute(bindings)).collect(),
            kind: self.kind,
            array_dims: self.array_dims,
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

// ============================================================================
// Modifiers and Markers
// ============================================================================

/// Declaration modifiers as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Native,
    Final,
}

/// Host-side facts about a method that are not modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodMarker {
    /// Compiler-generated (e.g. Scala case-class accessors).
    Synthetic,
    /// Dynamically dispatched helper injected by the runtime (e.g. Groovy GDK).
    DynamicDispatch,
}

// ============================================================================
// Members
// ============================================================================

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    #[serde(rename = "type")]
    pub type_node: TypeNode,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl FieldNode {
    pub fn new(name: impl Into<String>, type_node: TypeNode) -> Self {
        FieldNode {
            name: name.into(),
            type_node,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamNode {
    pub name: String,
    #[serde(rename = "type")]
    pub type_node: TypeNode,
}

impl ParamNode {
    pub fn new(name: impl Into<String>, type_node: TypeNode) -> Self {
        ParamNode {
            name: name.into(),
            type_node,
        }
    }
}

/// Resolved target of a call site or method reference.
///
/// `owner` is the declaring class as resolved by the host; `param_types`
/// are the declared parameter types of the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodHandle {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub param_types: Vec<TypeNode>,
}

impl MethodHandle {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, param_types: Vec<TypeNode>) -> Self {
        MethodHandle {
            owner: owner.into(),
            name: name.into(),
            param_types,
        }
    }

    /// True when `method` has this handle's name and parameter types.
    pub fn matches(&self, method: &MethodNode) -> bool {
        method.name == self.name
            && method.params.len() == self.param_types.len()
            && method
                .params
                .iter()
                .zip(&self.param_types)
                .all(|(p, t)| p.type_node.canonical_text() == t.canonical_text())
    }
}

/// A call found inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteNode {
    pub target: MethodHandle,
    /// Argument expressions as source text.
    #[serde(default)]
    pub args: Vec<String>,
    /// Field the call is made on, when the receiver is a field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Whether a reference reads or writes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Read,
    Write,
}

/// A variable or field reference inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub name: String,
    pub kind: ReferenceKind,
    #[serde(rename = "type")]
    pub ref_type: TypeNode,
    /// Qualified name of the type that owns the referenced member.
    pub owner: String,
}

/// An assignment of an expression into a field inside a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWrite {
    pub field: String,
    pub declaring_type: String,
    /// Right-hand side as source text.
    pub value: String,
}

/// A method or constructor declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// `None` when the host exposes no return type (constructors, some
    /// dynamically typed declarations).
    #[serde(default)]
    pub return_type: Option<TypeNode>,
    #[serde(default)]
    pub params: Vec<ParamNode>,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub is_primary_constructor: bool,
    #[serde(default = "default_true")]
    pub has_body: bool,
    #[serde(default)]
    pub markers: Vec<MethodMarker>,
    #[serde(default)]
    pub call_sites: Vec<CallSiteNode>,
    #[serde(default)]
    pub method_refs: Vec<MethodHandle>,
    #[serde(default)]
    pub references: Vec<ReferenceNode>,
    #[serde(default)]
    pub field_writes: Vec<FieldWrite>,
    /// Constructor this constructor delegates to (`this(...)`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegates_to: Option<MethodHandle>,
}

fn default_true() -> bool {
    true
}

impl MethodNode {
    pub fn new(name: impl Into<String>) -> Self {
        MethodNode {
            name: name.into(),
            modifiers: vec![Modifier::Public],
            return_type: None,
            params: Vec::new(),
            is_constructor: false,
            is_primary_constructor: false,
            has_body: true,
            markers: Vec::new(),
            call_sites: Vec::new(),
            method_refs: Vec::new(),
            references: Vec::new(),
            field_writes: Vec::new(),
            delegates_to: None,
        }
    }

    pub fn returning(mut self, return_type: TypeNode) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn has_marker(&self, marker: MethodMarker) -> bool {
        self.markers.contains(&marker)
    }

    /// Handle naming this declaration on `owner`.
    pub fn handle(&self, owner: &str) -> MethodHandle {
        MethodHandle::new(
            owner,
            self.name.clone(),
            self.params.iter().map(|p| p.type_node.clone()).collect(),
        )
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A class, interface or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub qualified_name: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub is_final: bool,
    /// Declared type parameter names, in order.
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Direct supertypes (superclass first, then interfaces) with arguments.
    #[serde(default)]
    pub supertypes: Vec<TypeNode>,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
    /// Qualified names of annotations on the class.
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub enum_constants: Vec<String>,
    /// True when the compiler supplies an implicit no-arg constructor.
    #[serde(default = "default_true")]
    pub has_default_constructor: bool,
    /// True when the class belongs to the project sources (not a library).
    #[serde(default = "default_true")]
    pub in_project: bool,
}

impl ClassNode {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        ClassNode {
            qualified_name: qualified_name.into(),
            language: Language::Java,
            is_interface: false,
            is_abstract: false,
            is_enum: false,
            is_final: false,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            enum_constants: Vec::new(),
            has_default_constructor: true,
            in_project: true,
        }
    }

    pub fn interface(qualified_name: impl Into<String>) -> Self {
        ClassNode {
            is_interface: true,
            is_abstract: true,
            has_default_constructor: false,
            ..ClassNode::new(qualified_name)
        }
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Package part of the qualified name, empty for the default package.
    pub fn package_name(&self) -> &str {
        match self.qualified_name.rfind('.') {
            Some(idx) => &self.qualified_name[..idx],
            None => "",
        }
    }

    /// A type reference to this class with its own parameters as arguments.
    pub fn self_type(&self) -> TypeNode {
        TypeNode::generic(
            self.qualified_name.clone(),
            self.type_params.iter().map(TypeNode::type_param).collect(),
        )
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ============================================================================
// Symbol Provider
// ============================================================================

/// What a provider can find inside method bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CallSites,
    MethodReferences,
    References,
    FieldWrites,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::CallSites,
        Capability::MethodReferences,
        Capability::References,
        Capability::FieldWrites,
    ];
}

/// Read-only access to host classes.
///
/// Implementations are queried many times during one extraction and must
/// answer consistently for the duration of a request.
pub trait SymbolProvider {
    /// Look up a class by qualified name.
    fn class(&self, qualified_name: &str) -> Option<&ClassNode>;

    /// Whether this provider can populate the given view of method bodies.
    fn supports(&self, capability: Capability) -> bool;

    /// Names of fields of `owner` that `param` is assigned into within `method`.
    ///
    /// This is a cross-reference search; hosts may fail it (index not ready,
    /// stale syntax trees). Callers treat a failure as "no match".
    fn assigned_fields(
        &self,
        owner: &ClassNode,
        method: &MethodNode,
        param: &str,
    ) -> Result<Vec<String>, ProviderError>;
}

// ============================================================================
// Tests
// ============================================================================
