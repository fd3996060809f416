// src/goal/mod.rs

//! Container goals.
//!
//! - [`descriptor`] holds the immutable desired state of one container and the
//!   option mechanism that builds it.
//! - [`reconcile`] drives one goal against a [`crate::client::ContainerClient`].

pub mod descriptor;
pub mod reconcile;

pub use descriptor::{ContainerGoal, ContainerGoalBuilder, ContainerOption};
pub use reconcile::ApplyOutcome;
