//! Per-request type dictionary.
//!
//! The dictionary is the only way [`Type`]s are created. It holds the symbol
//! provider, the class under test and a cache keyed by canonical type text.
//! Each cache entry remembers the remaining depth it was built with; a
//! request is served from the cache only when the entry was built at least
//! as deep as requested, otherwise the type is rebuilt and the deeper result
//! replaces the entry.
//!
//! Recursion terminates because every nested resolution passes a strictly
//! smaller remaining depth, and depth 0 yields a member-less stub.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::adapter::{ClassNode, Modifier, SymbolProvider, TypeNode};
use crate::config::GeneratorConfig;
use crate::dialect::Visibility;
use crate::error::ModelError;
use crate::hierarchy;
use crate::model::types::Type;

/// Knobs that shape extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryOptions {
    /// Remaining depth given to the class under test.
    pub max_depth: usize,
    /// Method-id prefixes admitted into call graphs even when not relevant.
    pub pojo_prefixes: Vec<String>,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        DictionaryOptions::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for DictionaryOptions {
    fn from(config: &GeneratorConfig) -> Self {
        DictionaryOptions {
            max_depth: config.max_recursion_depth,
            pojo_prefixes: config.pojo_prefixes(),
        }
    }
}

/// Cache counters, reported by `inspect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Depth-0 stubs handed out.
    pub stubs: usize,
}

#[derive(Debug)]
struct CachedType {
    depth: usize,
    ty: Rc<Type>,
}

/// Type cache and provider access for one extraction request.
pub struct TypeDictionary<'p> {
    provider: &'p dyn SymbolProvider,
    src: &'p ClassNode,
    options: DictionaryOptions,
    cache: RefCell<HashMap<String, CachedType>>,
    stats: Cell<CacheStats>,
}

impl<'p> TypeDictionary<'p> {
    /// Open a dictionary for the class under test `src_name`.
    pub fn new(
        provider: &'p dyn SymbolProvider,
        src_name: &str,
        options: DictionaryOptions,
    ) -> Result<Self, ModelError> {
        let src = provider
            .class(src_name)
            .ok_or_else(|| ModelError::ClassNotFound {
                name: src_name.to_string(),
            })?;
        Ok(TypeDictionary {
            provider,
            src,
            options,
            cache: RefCell::new(HashMap::new()),
            stats: Cell::new(CacheStats::default()),
        })
    }

    pub fn provider(&self) -> &'p dyn SymbolProvider {
        self.provider
    }

    /// The class under test.
    pub fn src_class(&self) -> &'p ClassNode {
        self.src
    }

    pub fn options(&self) -> &DictionaryOptions {
        &self.options
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    /// Number of distinct types cached so far.
    pub fn cached_types(&self) -> usize {
        self.cache.borrow().len()
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    /// Resolve `node` with `depth` levels of member expansion left.
    ///
    /// With a `generic_context`, type parameters are substituted first.
    /// Without `resolve_generics`, type arguments are dropped.
    pub fn get_type(
        &self,
        node: &TypeNode,
        depth: usize,
        resolve_generics: bool,
        generic_context: Option<&HashMap<String, TypeNode>>,
    ) -> Rc<Type> {
        let mut node = match generic_context {
            Some(bindings) => node.substitute(bindings),
            None => node.clone(),
        };
        if !resolve_generics {
            node.args.clear();
        }

        if depth == 0 {
            self.bump(|s| s.stubs += 1);
            return Rc::new(Type::stub(&node));
        }

        let key = node.canonical_text();
        let cached = self
            .cache
            .borrow()
            .get(&key)
            .filter(|entry| entry.depth >= depth)
            .map(|entry| Rc::clone(&entry.ty));
        if let Some(ty) = cached {
            self.bump(|s| s.hits += 1);
            return ty;
        }

        self.bump(|s| s.misses += 1);
        let ty = Rc::new(Type::build(&node, depth, self, false));
        self.store(key, depth, &ty);
        ty
    }

    fn store(&self, key: String, depth: usize, ty: &Rc<Type>) {
        let mut cache = self.cache.borrow_mut();
        let deeper_exists = cache.get(&key).is_some_and(|entry| entry.depth > depth);
        if !deeper_exists {
            cache.insert(
                key,
                CachedType {
                    depth,
                    ty: Rc::clone(ty),
                },
            );
        }
    }

    /// Build the class under test with its call graphs resolved.
    pub fn extract_class(&self) -> Rc<Type> {
        let node = self.src.self_type();
        let depth = self.options.max_depth.max(1);
        debug!(class = %self.src.qualified_name, depth, "extracting class under test");
        self.bump(|s| s.misses += 1);
        let ty = Rc::new(Type::build(&node, depth, self, true));
        self.store(node.canonical_text(), depth, &ty);
        ty
    }

    /// Whether a member of `owner` with `modifiers` is callable from the
    /// class under test.
    pub fn is_accessible(&self, owner: &ClassNode, modifiers: &[Modifier]) -> bool {
        let visibility = Visibility::resolve(modifiers, owner);
        if visibility.is_public || owner.qualified_name == self.src.qualified_name {
            return true;
        }
        if visibility.is_private {
            return false;
        }
        let same_package = owner.package_name() == self.src.package_name();
        if visibility.is_protected {
            return same_package
                || hierarchy::is_subclass(
                    self.provider,
                    &self.src.qualified_name,
                    &owner.qualified_name,
                );
        }
        same_package
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FieldNode, MethodNode};
    use crate::index::ClassIndex;

    fn options(depth: usize) -> DictionaryOptions {
        DictionaryOptions {
            max_depth: depth,
            pojo_prefixes: Vec::new(),
        }
    }

    fn linked_index() -> ClassIndex {
        let mut node = ClassNode::new("com.example.Node");
        node.fields
            .push(FieldNode::new("next", TypeNode::class("com.example.Node")));
        node.methods
            .push(MethodNode::new("getNext").returning(TypeNode::class("com.example.Node")));
        ClassIndex::from_classes([node])
    }

    mod construction {
        use super::*;

        #[test]
        fn unknown_class_is_error() {
            let index = ClassIndex::new();
            let err = TypeDictionary::new(&index, "com.example.Missing", options(3))
                .err()
                .unwrap();
            assert!(matches!(err, ModelError::ClassNotFound { .. }));
        }

        #[test]
        fn options_follow_generator_config() {
            let mut config = GeneratorConfig::default();
            config.max_recursion_depth = 5;
            config.generate_pojo_prefix = "com.a.,com.b.".to_string();
            let options = DictionaryOptions::from(&config);
            assert_eq!(options.max_depth, 5);
            assert_eq!(options.pojo_prefixes.len(), 2);
        }
    }

    mod caching {
        use super::*;

        #[test]
        fn depth_zero_is_a_stub() {
            let index = linked_index();
            let dict = TypeDictionary::new(&index, "com.example.Node", options(3)).unwrap();
            let ty = dict.get_type(&TypeNode::class("com.example.Node"), 0, true, None);
            assert!(!ty.is_populated());
            assert!(ty.fields().is_empty());
            assert_eq!(dict.stats().stubs, 1);
        }

        #[test]
        fn shallower_request_hits_deeper_entry() {
            let index = linked_index();
            let dict = TypeDictionary::new(&index, "com.example.Node", options(3)).unwrap();
            let node = TypeNode::class("com.example.Node");
            let deep = dict.get_type(&node, 2, true, None);
            let hits_before = dict.stats().hits;
            let shallow = dict.get_type(&node, 1, true, None);
            assert!(Rc::ptr_eq(&deep, &shallow));
            assert_eq!(dict.stats().hits, hits_before + 1);
        }

        #[test]
        fn deeper_request_rebuilds() {
            let index = linked_index();
            let dict = TypeDictionary::new(&index, "com.example.Node", options(3)).unwrap();
            let node = TypeNode::class("com.example.Node");
            let shallow = dict.get_type(&node, 1, true, None);
            assert!(!shallow.fields()[0].field_type().is_populated());
            let deep = dict.get_type(&node, 2, true, None);
            assert!(deep.fields()[0].field_type().is_populated());
        }

        #[test]
        fn self_reference_terminates() {
            let index = linked_index();
            let dict = TypeDictionary::new(&index, "com.example.Node", options(4)).unwrap();
            let ty = dict.extract_class();
            let mut level = Rc::clone(&ty);
            let mut populated = 0;
            while level.is_populated() {
                populated += 1;
                let next = Rc::clone(level.fields()[0].field_type());
                level = next;
            }
            assert_eq!(populated, 4);
            assert_eq!(dict.cached_types(), 1);
        }

        #[test]
        fn generics_can_be_erased() {
            let index = linked_index();
            let dict = TypeDictionary::new(&index, "com.example.Node", options(3)).unwrap();
            let list = TypeNode::generic("java.util.List", vec![TypeNode::class("com.example.Node")]);
            assert_eq!(
                dict.get_type(&list, 1, true, None).identity(),
                "java.util.List<com.example.Node>"
            );
            assert_eq!(dict.get_type(&list, 1, false, None).identity(), "java.util.List");
        }

        #[test]
        fn generic_context_substitutes() {
            let index = linked_index();
            let dict = TypeDictionary::new(&index, "com.example.Node", options(3)).unwrap();
            let mut bindings = HashMap::new();
            bindings.insert("T".to_string(), TypeNode::class("java.lang.String"));
            let ty = dict.get_type(&TypeNode::type_param("T"), 1, true, Some(&bindings));
            assert_eq!(ty.canonical_name(), "java.lang.String");
        }
    }

    mod accessibility {
        use super::*;

        fn index() -> ClassIndex {
            let mut subject = ClassNode::new("com.example.app.Subject");
            subject.supertypes.push(TypeNode::class("com.example.base.Base"));
            ClassIndex::from_classes([
                subject,
                ClassNode::new("com.example.base.Base"),
                ClassNode::new("com.example.app.Neighbour"),
                ClassNode::new("com.example.other.Stranger"),
            ])
        }

        #[test]
        fn java_visibility_rules() {
            let index = index();
            let dict = TypeDictionary::new(&index, "com.example.app.Subject", options(2)).unwrap();
            let neighbour = index.class("com.example.app.Neighbour").unwrap();
            let base = index.class("com.example.base.Base").unwrap();
            let stranger = index.class("com.example.other.Stranger").unwrap();

            assert!(dict.is_accessible(stranger, &[Modifier::Public]));
            assert!(!dict.is_accessible(neighbour, &[Modifier::Private]));
            assert!(dict.is_accessible(neighbour, &[]));
            assert!(!dict.is_accessible(stranger, &[]));
            assert!(dict.is_accessible(base, &[Modifier::Protected]));
            assert!(!dict.is_accessible(stranger, &[Modifier::Protected]));
            assert!(dict.is_accessible(dict.src_class(), &[Modifier::Private]));
        }

        #[test]
        fn java_interface_members_are_public() {
            let mut greeter = ClassNode::interface("com.b.Greeter");
            greeter.methods.push(
                MethodNode::new("greet")
                    .returning(TypeNode::class("java.lang.String"))
                    .with_modifiers(&[]),
            );
            greeter.fields.push(
                FieldNode::new("PREFIX", TypeNode::class("java.lang.String")).with_modifiers(&[]),
            );
            let mut imp = ClassNode::new("com.a.Impl");
            imp.supertypes.push(TypeNode::class("com.b.Greeter"));
            let index = ClassIndex::from_classes([imp, greeter]);
            let dict = TypeDictionary::new(&index, "com.a.Impl", options(2)).unwrap();

            let greeter = index.class("com.b.Greeter").unwrap();
            assert!(dict.is_accessible(greeter, &[]));

            let ty = dict.extract_class();
            let greet = ty.methods().iter().find(|m| m.name() == "greet").unwrap();
            let flags = greet.flags();
            assert!(flags.is_public);
            assert!(!flags.is_default);
            assert!(flags.inherited);
            assert!(flags.accessible);
            assert!(greet.is_testable());

            let prefix = ty.fields().iter().find(|f| f.name() == "PREFIX").unwrap();
            assert!(prefix.visibility().is_public);
        }
    }
}
