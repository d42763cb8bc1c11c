//! # attrib-core
//!
//! Core types for the attrib toolbox: shared data structures used across
//! all crates.
//!
//! This crate provides:
//! - **Document model**: `Document`, `Sentence`, `Mention`, `ClaimEvent`,
//!   `ClaimFrame` and their JSON (de)serialization
//! - **Span types**: `TokenSpan`, `Provenance`
//! - **Topic configuration**: `TopicConfig`, `QuestionTemplates`
//!
//! The pipeline crate depends on `attrib-core` so the CLI and any external
//! oracle implementation agree on the record types.

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod span;
pub mod topic;

// Re-exports for convenience
pub use document::{ClaimEvent, ClaimFrame, Document, DocumentIndex, Mention, Sentence};
pub use error::{Error, Result};
pub use span::{Provenance, TokenSpan};
pub use topic::{QuestionTemplates, TopicConfig};
