//! Core infrastructure for testsmith.
//!
//! This crate turns a class-and-method snapshot into an immutable semantic
//! model that test generators consume:
//! - Symbol facade the host implements (`adapter`) and a JSON-backed index
//! - Hierarchy walking, generic substitution and override detection
//! - Per-language dialect rules
//! - The per-request type dictionary and depth-bounded type cache
//! - Model entities: types, methods, fields, params, calls, references
//! - Call-graph resolution and relevance filtering
//! - Literal, shape and matcher tables
//! - Configuration, error types and JSON output types

pub mod adapter;
pub mod callgraph;
pub mod config;
pub mod dialect;
pub mod dictionary;
pub mod error;
pub mod hierarchy;
pub mod index;
pub mod model;
pub mod output;
pub mod tables;
