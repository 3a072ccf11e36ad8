//! The `Param` entity.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use crate::adapter::{ClassNode, MethodNode, Modifier, ParamNode, TypeNode};
use crate::dictionary::TypeDictionary;
use crate::hierarchy;
use crate::model::field::Field;
use crate::model::types::Type;

/// A method parameter.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    param_type: Rc<Type>,
    assigned_to_fields: Vec<Field>,
}

impl Param {
    pub(crate) fn build(
        node: &ParamNode,
        method: &MethodNode,
        owner: &ClassNode,
        bindings: Option<&HashMap<String, TypeNode>>,
        depth: usize,
        dict: &TypeDictionary<'_>,
    ) -> Self {
        Param {
            name: node.name.clone(),
            param_type: dict.get_type(&node.type_node, depth, true, bindings),
            assigned_to_fields: assigned_fields(node, method, owner, dict),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type, substituted when the method is seen through a subtype.
    pub fn param_type(&self) -> &Rc<Type> {
        &self.param_type
    }

    /// Fields of the owner this parameter is assigned into.
    pub fn assigned_to_fields(&self) -> &[Field] {
        &self.assigned_to_fields
    }
}

/// Fields `param` is written into inside `method`, as shallow entities.
///
/// Static methods are skipped. A failed search degrades to no match.
pub(crate) fn assigned_fields(
    param: &ParamNode,
    method: &MethodNode,
    owner: &ClassNode,
    dict: &TypeDictionary<'_>,
) -> Vec<Field> {
    if method.has_modifier(Modifier::Static) {
        return Vec::new();
    }
    let names = match dict.provider().assigned_fields(owner, method, &param.name) {
        Ok(names) => names,
        Err(err) => {
            warn!(
                param = %param.name,
                method = %method.name,
                error = %err,
                "cannot search for fields assigned from parameter"
            );
            return Vec::new();
        }
    };
    names
        .iter()
        .filter_map(|name| find_declared_field(owner, name, dict))
        .collect()
}

/// Look a field up on `owner` or its ancestors and build it at depth 0.
pub(crate) fn find_declared_field(
    owner: &ClassNode,
    name: &str,
    dict: &TypeDictionary<'_>,
) -> Option<Field> {
    if let Some(field) = owner.find_field(name) {
        return Some(Field::build(field, owner, None, 0, dict));
    }
    let provider = dict.provider();
    hierarchy::ancestor_names(provider, &owner.qualified_name)
        .iter()
        .filter_map(|n| provider.class(n))
        .find_map(|declaring| {
            declaring
                .find_field(name)
                .map(|field| Field::build(field, declaring, None, 0, dict))
        })
}
