//! Call-graph resolution for methods of the class under test.
//!
//! For every call site the provider reports, the target is resolved to its
//! declaration and kept when it is *relevant*. Relevant callees are built as
//! full [`Method`]s at depth 1 without their own call graph, so the work is
//! bounded to two levels whatever the real call depth.
//!
//! # Relevance
//!
//! A callee is not relevant when:
//!
//! - its declaring class is a universal root type (`java.lang.Object`,
//!   `java.lang.Class`, `groovy.lang.GroovyObjectSupport`); nothing admits these
//! - its dialect marks it as a dynamic-dispatch helper (Groovy GDK methods,
//!   `invokeMethod`/`getProperty`/`setProperty`)
//! - its declaring class is not part of the project
//!
//! The last two may be re-admitted by the configured method-id prefixes.

use tracing::{debug, warn};

use crate::adapter::{Capability, ClassNode, MethodNode};
use crate::dialect::dialect_for;
use crate::dictionary::TypeDictionary;
use crate::hierarchy;
use crate::model::field::Field;
use crate::model::method::{format_method_id, Method};
use crate::model::param::find_declared_field;
use crate::model::{MethodCall, Reference};

/// Declaring types whose methods are never relevant nor testable.
pub const ROOT_TYPES: [&str; 3] = [
    "java.lang.Object",
    "java.lang.Class",
    "groovy.lang.GroovyObjectSupport",
];

pub fn is_root_type(qualified_name: &str) -> bool {
    ROOT_TYPES.contains(&qualified_name)
}

/// Whether a call to `method` declared on `owner` belongs in the call graph.
pub fn is_relevant(dict: &TypeDictionary<'_>, owner: &ClassNode, method: &MethodNode) -> bool {
    if is_root_type(&owner.qualified_name) {
        return false;
    }
    let method_id = format_method_id(&owner.qualified_name, method);
    let dynamic = dialect_for(owner.language).is_dynamic_dispatch(method, &method_id);
    if !dynamic && owner.in_project {
        return true;
    }
    dict.options()
        .pojo_prefixes
        .iter()
        .any(|prefix| method_id.starts_with(prefix.as_str()))
}

/// Everything resolved from one method body.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallGraph {
    pub direct: Vec<MethodCall>,
    pub method_refs: Vec<Method>,
    pub references: Vec<Reference>,
    pub indirectly_affected_fields: Vec<Field>,
}

/// Resolve the body of `node` declared on `owner`.
pub(crate) fn resolve(node: &MethodNode, owner: &ClassNode, dict: &TypeDictionary<'_>) -> CallGraph {
    let mut graph = CallGraph::default();
    if is_root_type(&owner.qualified_name) {
        return graph;
    }
    let provider = dict.provider();
    let keep_context = dialect_for(owner.language).callee_context();

    if provider.supports(Capability::CallSites) {
        for site in &node.call_sites {
            let Some((callee_owner, callee)) = hierarchy::resolve_method(provider, &site.target)
            else {
                debug!(
                    caller = %node.name,
                    target = %site.target.name,
                    owner = %site.target.owner,
                    "unresolved call target"
                );
                continue;
            };
            if !is_relevant(dict, callee_owner, callee) {
                continue;
            }
            let context = keep_context.then_some(callee_owner);
            let method = Method::build(callee, callee_owner, context, 1, dict, false);
            let call = MethodCall::new(method, site.args.clone());
            if !graph.direct.contains(&call) {
                graph.direct.push(call);
            }
        }
    }

    if provider.supports(Capability::MethodReferences) {
        for handle in &node.method_refs {
            let Some((callee_owner, callee)) = hierarchy::resolve_method(provider, handle) else {
                continue;
            };
            if !is_relevant(dict, callee_owner, callee) {
                continue;
            }
            let method = Method::build(callee, callee_owner, Some(callee_owner), 1, dict, false);
            if !graph.method_refs.contains(&method) {
                graph.method_refs.push(method);
            }
        }
    }

    if provider.supports(Capability::References) {
        for reference in &node.references {
            let reference = Reference::build(reference, dict);
            if !graph.references.contains(&reference) {
                graph.references.push(reference);
            }
        }
    }

    if node.is_constructor {
        graph.indirectly_affected_fields = delegated_fields(node, owner, dict);
    }

    graph
}

/// Fields assigned by the constructor `node` delegates to.
fn delegated_fields(node: &MethodNode, owner: &ClassNode, dict: &TypeDictionary<'_>) -> Vec<Field> {
    let Some(handle) = &node.delegates_to else {
        return Vec::new();
    };
    let provider = dict.provider();
    let Some((target_owner, target)) = hierarchy::resolve_method(provider, handle) else {
        return Vec::new();
    };
    let mut fields: Vec<Field> = Vec::new();
    for param in &target.params {
        match provider.assigned_fields(target_owner, target, &param.name) {
            Ok(names) => {
                for name in names {
                    if fields.iter().any(|f| f.name() == name) {
                        continue;
                    }
                    if let Some(field) = find_declared_field(owner, &name, dict) {
                        fields.push(field);
                    }
                }
            }
            Err(err) => warn!(
                constructor = %format_method_id(&owner.qualified_name, node),
                error = %err,
                "cannot search fields of delegated constructor"
            ),
        }
    }
    fields
}
