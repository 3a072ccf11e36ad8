//! In-memory symbol provider.
//!
//! [`ClassIndex`] holds a snapshot of host classes keyed by qualified name.
//! It is what the CLI loads from JSON and what tests build by hand.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{Capability, ClassNode, MethodNode, SymbolProvider};
use crate::error::{ProviderError, TestsmithError};

/// Snapshot of host classes, serialized as `{"capabilities": [...], "classes": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassIndex {
    /// Views this snapshot populated. Absent means all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capabilities: Option<BTreeSet<Capability>>,
    #[serde(with = "class_list")]
    classes: BTreeMap<String, ClassNode>,
}

impl ClassIndex {
    pub fn new() -> Self {
        ClassIndex::default()
    }

    /// Build an index from a list of classes. Later duplicates replace earlier ones.
    pub fn from_classes(classes: impl IntoIterator<Item = ClassNode>) -> Self {
        let mut index = ClassIndex::new();
        for class in classes {
            index.insert(class);
        }
        index
    }

    pub fn insert(&mut self, class: ClassNode) {
        self.classes.insert(class.qualified_name.clone(), class);
    }

    /// Restrict the advertised capabilities.
    pub fn with_capabilities(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = Some(capabilities.iter().copied().collect());
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, TestsmithError> {
        serde_json::from_str(json).map_err(|e| {
            TestsmithError::invalid_args_with_details(
                format!("malformed class snapshot: {}", e),
                serde_json::json!({ "line": e.line(), "column": e.column() }),
            )
        })
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: &Path) -> Result<Self, TestsmithError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| TestsmithError::file_not_found(path.display().to_string()))?;
        let index = Self::from_json(&content)?;
        debug!(path = %path.display(), classes = index.len(), "loaded class snapshot");
        Ok(index)
    }
}

impl SymbolProvider for ClassIndex {
    fn class(&self, qualified_name: &str) -> Option<&ClassNode> {
        self.classes.get(qualified_name)
    }

    fn supports(&self, capability: Capability) -> bool {
        match &self.capabilities {
            Some(set) => set.contains(&capability),
            None => true,
        }
    }

    fn assigned_fields(
        &self,
        owner: &ClassNode,
        method: &MethodNode,
        param: &str,
    ) -> Result<Vec<String>, ProviderError> {
        if !self.supports(Capability::FieldWrites) {
            return Err(ProviderError::SearchFailed {
                owner: owner.qualified_name.clone(),
                method: method.name.clone(),
                reason: "snapshot carries no field writes".to_string(),
            });
        }
        let mut fields = Vec::new();
        for write in &method.field_writes {
            if write.value.trim() == param && !fields.contains(&write.field) {
                fields.push(write.field.clone());
            }
        }
        Ok(fields)
    }
}

mod class_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::adapter::ClassNode;

    pub fn serialize<S: Serializer>(
        classes: &BTreeMap<String, ClassNode>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&ClassNode> = classes.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, ClassNode>, D::Error> {
        let list = Vec::<ClassNode>::deserialize(deserializer)?;
        Ok(list
            .into_iter()
            .map(|c| (c.qualified_name.clone(), c))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FieldNode, FieldWrite, ParamNode, TypeNode};

    fn service_with_constructor() -> ClassNode {
        let mut class = ClassNode::new("com.example.Service");
        class
            .fields
            .push(FieldNode::new("repo", TypeNode::class("com.example.Repo")));
        let mut ctor = MethodNode::new("Service");
        ctor.is_constructor = true;
        ctor.params
            .push(ParamNode::new("repo", TypeNode::class("com.example.Repo")));
        ctor.field_writes.push(FieldWrite {
            field: "repo".to_string(),
            declaring_type: "com.example.Service".to_string(),
            value: "repo".to_string(),
        });
        class.methods.push(ctor);
        class
    }

    #[test]
    fn assigned_fields_follow_field_writes() {
        let index = ClassIndex::from_classes([service_with_constructor()]);
        let class = index.class("com.example.Service").unwrap();
        let fields = index
            .assigned_fields(class, &class.methods[0], "repo")
            .unwrap();
        assert_eq!(fields, vec!["repo".to_string()]);
        let none = index
            .assigned_fields(class, &class.methods[0], "other")
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn restricted_capabilities_fail_the_search() {
        let index = ClassIndex::from_classes([service_with_constructor()])
            .with_capabilities(&[Capability::CallSites]);
        let class = index.class("com.example.Service").unwrap();
        assert!(!index.supports(Capability::FieldWrites));
        assert!(index
            .assigned_fields(class, &class.methods[0], "repo")
            .is_err());
    }

    #[test]
    fn json_round_trip_keeps_classes() {
        let index = ClassIndex::from_classes([service_with_constructor()]);
        let json = serde_json::to_string(&index).unwrap();
        let back = ClassIndex::from_json(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back.class("com.example.Service").is_some());
    }

    #[test]
    fn malformed_json_is_invalid_arguments() {
        let err = ClassIndex::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code().code(), 2);
    }
}
