//! Core types for seedplan.
//!
//! Provides the generation unit model ([`unit::GenerationUnit`]), the dependency
//! graph ([`graph::DependencyGraph`]), and the collaborator interfaces the planner
//! consumes: record-kind relation metadata, feature flags, and the translation
//! unit predicate. Also owns configuration and manifest persistence.

pub mod config;
pub mod flags;
pub mod graph;
pub mod manifest;
pub mod relations;
pub mod translation;
pub mod unit;
