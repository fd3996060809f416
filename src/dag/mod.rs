// src/dag/mod.rs

//! Dependency graph and round scheduling.
//!
//! - [`graph`] turns the link references of a goal set into an explicit
//!   name-to-dependencies map and validates that it is closed.
//! - [`scheduler`] applies the goals round by round, running each round's
//!   containers concurrently.

pub mod graph;
pub mod scheduler;

pub use graph::DependencyGraph;
pub use scheduler::{apply_graph, GraphReport, Scheduler};
