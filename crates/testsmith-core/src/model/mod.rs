//! Immutable semantic model of the class under test.
//!
//! Every entity is built once, inside its constructor, from host data and
//! the request's [`crate::dictionary::TypeDictionary`]. Nothing is patched
//! afterwards; extracting again yields fresh instances.

pub mod call;
pub mod field;
pub mod method;
pub mod param;
pub mod reference;
pub mod types;

pub use call::MethodCall;
pub use field::Field;
pub use method::{format_method_id, Method, MethodFlags};
pub use param::Param;
pub use reference::Reference;
pub use types::Type;
