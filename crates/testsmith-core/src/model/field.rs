//! The `Field` entity.

use std::rc::Rc;

use crate::adapter::{ClassNode, FieldNode, Modifier};
use crate::dialect::Visibility;
use crate::dictionary::TypeDictionary;
use crate::model::types::Type;

/// A field of a type, own or inherited.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    field_type: Rc<Type>,
    owner: String,
    visibility: Visibility,
    is_static: bool,
    is_final: bool,
    inherited: bool,
}

impl Field {
    /// `src` is the class the field is seen from; the field is inherited
    /// when it is declared elsewhere.
    pub(crate) fn build(
        node: &FieldNode,
        owner: &ClassNode,
        src: Option<&ClassNode>,
        depth: usize,
        dict: &TypeDictionary<'_>,
    ) -> Self {
        Field {
            name: node.name.clone(),
            field_type: dict.get_type(&node.type_node, depth, true, None),
            owner: owner.qualified_name.clone(),
            visibility: Visibility::resolve(&node.modifiers, owner),
            is_static: node.has_modifier(Modifier::Static),
            is_final: node.has_modifier(Modifier::Final),
            inherited: src.is_some_and(|s| s.qualified_name != owner.qualified_name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &Rc<Type> {
        &self.field_type
    }

    /// Qualified name of the declaring class.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }
}
