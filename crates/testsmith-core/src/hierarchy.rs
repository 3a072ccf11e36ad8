//! Supertype linearization, generic substitution and override detection.
//!
//! Classes reach the extractor with only their *direct* supertypes. This
//! module walks the full ancestor chain through a [`SymbolProvider`],
//! composing type-parameter bindings along the way so that every ancestor is
//! seen "as the subtype sees it": walking `UserRepo implements Repo<User>`
//! yields `Repo` with `T -> com.example.User`.
//!
//! # Ordering
//!
//! Ancestors are listed depth-first in declaration order (the class itself,
//! then its superclass chain, then interfaces), each class once. Classes the
//! provider does not know (library types like `java.util.List`) still appear
//! as leaves so name-based lookups over ancestors can match them.
//!
//! # Cycles
//!
//! Malformed snapshots can declare inheritance cycles. The walk tracks the
//! current path and reports [`HierarchyError::Cycle`]; callers degrade to
//! treating the class as having no ancestors.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::adapter::{ClassNode, MethodHandle, MethodNode, Modifier, SymbolProvider, TypeNode};

// ============================================================================
// Ancestor Entry
// ============================================================================

/// One class in a linearized hierarchy, with the bindings that map its type
/// parameters into the terms of the class the walk started from.
#[derive(Debug, Clone)]
pub struct Ancestor {
    pub class_name: String,
    pub bindings: HashMap<String, TypeNode>,
    /// False for classes the provider does not know.
    pub known: bool,
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while walking a hierarchy.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A class is (transitively) its own supertype.
    #[error("inheritance cycle through class '{class_name}'")]
    Cycle { class_name: String },
}

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

// ============================================================================
// Linearization
// ============================================================================

/// List `class_name` and all of its ancestors.
///
/// The first entry is always `class_name` itself with empty bindings.
pub fn ancestors(
    provider: &dyn SymbolProvider,
    class_name: &str,
) -> HierarchyResult<Vec<Ancestor>> {
    let mut out = Vec::new();
    let mut path = HashSet::new();
    let mut seen = HashSet::new();
    walk(
        provider,
        class_name,
        HashMap::new(),
        &mut path,
        &mut seen,
        &mut out,
    )?;
    Ok(out)
}

fn walk(
    provider: &dyn SymbolProvider,
    class_name: &str,
    bindings: HashMap<String, TypeNode>,
    path: &mut HashSet<String>,
    seen: &mut HashSet<String>,
    out: &mut Vec<Ancestor>,
) -> HierarchyResult<()> {
    if path.contains(class_name) {
        return Err(HierarchyError::Cycle {
            class_name: class_name.to_string(),
        });
    }
    // Diamonds: first path wins.
    if !seen.insert(class_name.to_string()) {
        return Ok(());
    }

    let class = provider.class(class_name);
    out.push(Ancestor {
        class_name: class_name.to_string(),
        bindings: bindings.clone(),
        known: class.is_some(),
    });
    let Some(class) = class else {
        return Ok(());
    };

    path.insert(class_name.to_string());
    for supertype in &class.supertypes {
        let super_bindings = match provider.class(&supertype.name) {
            Some(super_class) => super_class
                .type_params
                .iter()
                .zip(&supertype.args)
                .map(|(param, arg)| (param.clone(), arg.substitute(&bindings)))
                .collect(),
            None => HashMap::new(),
        };
        walk(provider, &supertype.name, super_bindings, path, seen, out)?;
    }
    path.remove(class_name);
    Ok(())
}

/// Qualified names of all ancestors, excluding `class_name` itself.
///
/// Cycles degrade to an empty list.
pub fn ancestor_names(provider: &dyn SymbolProvider, class_name: &str) -> Vec<String> {
    match ancestors(provider, class_name) {
        Ok(chain) => chain.into_iter().skip(1).map(|a| a.class_name).collect(),
        Err(err) => {
            tracing::warn!(class = class_name, error = %err, "cannot linearize hierarchy");
            Vec::new()
        }
    }
}

/// True when `child` is `parent` or inherits from it.
pub fn is_subclass(provider: &dyn SymbolProvider, child: &str, parent: &str) -> bool {
    if child == parent {
        return true;
    }
    ancestor_names(provider, child).iter().any(|n| n == parent)
}

// ============================================================================
// Method Lookup
// ============================================================================

fn param_texts(method: &MethodNode, bindings: &HashMap<String, TypeNode>) -> Vec<String> {
    method
        .params
        .iter()
        .map(|p| p.type_node.substitute(bindings).canonical_text())
        .collect()
}

/// Resolve a call target to its declaration.
///
/// Looks at the handle's owner first, then at the owner's ancestors, where
/// parameter types are compared both as declared and as substituted.
pub fn resolve_method<'p>(
    provider: &'p dyn SymbolProvider,
    handle: &MethodHandle,
) -> Option<(&'p ClassNode, &'p MethodNode)> {
    let owner = provider.class(&handle.owner)?;
    if let Some(method) = owner.methods.iter().find(|m| handle.matches(m)) {
        return Some((owner, method));
    }

    let wanted: Vec<String> = handle
        .param_types
        .iter()
        .map(TypeNode::canonical_text)
        .collect();
    let chain = ancestors(provider, &handle.owner).ok()?;
    for ancestor in chain.iter().skip(1) {
        let Some(class) = provider.class(&ancestor.class_name) else {
            continue;
        };
        let found = class.methods.iter().find(|m| {
            m.name == handle.name
                && (handle.matches(m) || param_texts(m, &ancestor.bindings) == wanted)
        });
        if let Some(method) = found {
            return Some((class, method));
        }
    }
    None
}

/// All methods named `name` visible from `src`, each with the bindings of
/// its declaring class as seen from `src`.
pub fn methods_named<'p>(
    provider: &'p dyn SymbolProvider,
    src: &str,
    name: &str,
) -> Vec<(&'p ClassNode, &'p MethodNode, HashMap<String, TypeNode>)> {
    let Ok(chain) = ancestors(provider, src) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for ancestor in chain {
        let Some(class) = provider.class(&ancestor.class_name) else {
            continue;
        };
        for method in class.methods.iter().filter(|m| m.name == name) {
            found.push((class, method, ancestor.bindings.clone()));
        }
    }
    found
}

/// True when a concrete method between `src` and `owner` (inclusive of
/// `src`, exclusive of `owner`) overrides `method` declared on `owner`.
pub fn is_overridden(
    provider: &dyn SymbolProvider,
    src: &str,
    owner: &str,
    method: &MethodNode,
) -> bool {
    if src == owner {
        return false;
    }
    let Ok(chain) = ancestors(provider, src) else {
        return false;
    };
    let Some(owner_entry) = chain.iter().find(|a| a.class_name == owner) else {
        return false;
    };
    let target = param_texts(method, &owner_entry.bindings);

    chain
        .iter()
        .filter(|a| a.class_name != owner && is_subclass(provider, &a.class_name, owner))
        .filter_map(|a| provider.class(&a.class_name).map(|c| (a, c)))
        .any(|(ancestor, class)| {
            class.methods.iter().any(|candidate| {
                candidate.name == method.name
                    && !candidate.is_constructor
                    && !candidate.has_modifier(Modifier::Abstract)
                    && candidate.has_body
                    && param_texts(candidate, &ancestor.bindings) == target
            })
        })
}

// ============================================================================
// Tests
// ============================================================================
