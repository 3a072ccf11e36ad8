//! Testsmith: model-driven Spock specification generation.
//!
//! Turns a host-supplied class snapshot into an immutable semantic model
//! (types, methods, fields, call graph) and generates parameterized Spock
//! feature methods from it, merging them into an existing or new test class.

// Semantic model - re-exported from testsmith-core
pub use testsmith_core::adapter;
pub use testsmith_core::callgraph;
pub use testsmith_core::config;
pub use testsmith_core::dialect;
pub use testsmith_core::dictionary;
pub use testsmith_core::error;
pub use testsmith_core::hierarchy;
pub use testsmith_core::index;
pub use testsmith_core::model;
pub use testsmith_core::output;
pub use testsmith_core::tables;

// Generation - re-exported from testsmith-spock
pub use testsmith_spock::artifact;
pub use testsmith_spock::builder;
pub use testsmith_spock::generator;
pub use testsmith_spock::inspect;
pub use testsmith_spock::mock;
pub use testsmith_spock::plan;
pub use testsmith_spock::render;

// Front door
pub mod cli;
