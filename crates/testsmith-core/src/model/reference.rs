//! The `Reference` entity.

use std::rc::Rc;

use crate::adapter::{ReferenceKind, ReferenceNode};
use crate::dictionary::TypeDictionary;
use crate::model::types::Type;

/// A variable or field referenced from a method body.
#[derive(Debug, Clone)]
pub struct Reference {
    name: String,
    kind: ReferenceKind,
    ref_type: Rc<Type>,
    owner: String,
}

impl Reference {
    pub(crate) fn build(node: &ReferenceNode, dict: &TypeDictionary<'_>) -> Self {
        Reference {
            name: node.name.clone(),
            kind: node.kind,
            ref_type: dict.get_type(&node.ref_type, 1, true, None),
            owner: node.owner.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn ref_type(&self) -> &Rc<Type> {
        &self.ref_type
    }

    /// Qualified name of the type owning the referenced member.
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.owner == other.owner
    }
}

impl Eq for Reference {}
