//! Spock specification generation over the testsmith semantic model.
//!
//! A request flows through four stages:
//!
//! - [`mock`] and [`inspect`] decide which fields become test doubles, which
//!   collaborator calls are stubbed and which self-calls are spied
//! - [`builder`] synthesizes literals and the data table
//! - [`plan`] gathers those decisions into plain data, failing fast on
//!   untestable selections
//! - [`render`] turns the plan into member text, which [`generator`] merges
//!   into an [`artifact::TestClassArtifact`] held by a
//!   [`artifact::TargetStore`]

pub mod artifact;
pub mod builder;
pub mod error;
pub mod generator;
pub mod inspect;
pub mod mock;
pub mod plan;
pub mod render;

pub use artifact::{InMemoryTargetStore, TargetStore, TestClassArtifact};
pub use error::{GenerationError, GenerationResult, RenderError, TargetError};
pub use generator::{GenerationReport, GenerationRequest, SpockGenerator};
