// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::client::ClientError;

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("container '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("{container} expects unknown link {link}")]
    UnknownLink { container: String, link: String },

    #[error(
        "container {container:?} running with image {running_image:?} but desired image is {desired_image:?} with id {desired_image_id:?}"
    )]
    ImageMismatch {
        container: String,
        running_image: String,
        desired_image: String,
        desired_image_id: String,
    },

    #[error("{context}: {source}")]
    Client {
        context: String,
        #[source]
        source: ClientError,
    },

    #[error("no containers became ready; still waiting: {}", format_waiting(.waiting))]
    Stalled { waiting: Vec<(String, Vec<String>)> },

    #[error("reconcile task for container '{0}' panicked")]
    TaskPanicked(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GoalError {
    /// Wrap a client failure with a description of what was being attempted.
    pub fn client(context: impl Into<String>, source: ClientError) -> Self {
        GoalError::Client {
            context: context.into(),
            source,
        }
    }
}

fn format_waiting(waiting: &[(String, Vec<String>)]) -> String {
    waiting
        .iter()
        .map(|(name, deps)| format!("{name} (needs {})", deps.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GoalError>;
