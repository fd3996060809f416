// src/client/mod.rs

//! Container runtime client abstraction.
//!
//! The reconciler and the graph scheduler talk to a [`ContainerClient`]
//! instead of a concrete runtime. This keeps the core free of process and
//! socket handling and lets tests plug in an in-memory fake.
//!
//! - [`docker_cli`] provides [`DockerCli`], the production implementation,
//!   which shells out to the `docker` binary.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{AuthConfig, ContainerConfig, HostConfig};

pub mod docker_cli;

pub use docker_cli::DockerCli;

/// What the core needs to know about an existing container instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Runtime identifier.
    pub id: String,
    pub name: String,
    pub running: bool,
    /// Identity (content id) of the image the instance was created from.
    pub image: String,
}

/// Options for [`ContainerClient::resolve_image_id`].
#[derive(Debug, Clone, Default)]
pub struct ImageResolveOptions {
    /// Pull the image when it is not present locally.
    pub pull_missing: bool,
    /// Credentials for that pull.
    pub auth: Option<AuthConfig>,
}

/// Failures reported by a [`ContainerClient`].
///
/// `NotFound` is the one variant the reconciler treats as an expected outcome
/// (the container is absent); everything else is fatal.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoding runtime output: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Operations the reconciler needs from a container runtime.
///
/// Implementations must be safe to call concurrently: the scheduler runs one
/// reconciliation per ready container in parallel against a shared client.
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Look up a container by name. Absent containers yield
    /// [`ClientError::NotFound`].
    async fn inspect_container(&self, name: &str) -> Result<ContainerInfo, ClientError>;

    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        remove_volumes: bool,
    ) -> Result<(), ClientError>;

    /// Create a container named `name`, pulling its image first if it is not
    /// present locally. Returns the new runtime identifier.
    async fn create_container_with_pull(
        &self,
        config: &ContainerConfig,
        host: &HostConfig,
        name: &str,
        auth: Option<&AuthConfig>,
    ) -> Result<String, ClientError>;

    async fn start_container(&self, id: &str, host: &HostConfig) -> Result<(), ClientError>;

    /// Map an image reference to the content identity a running container
    /// reports for it.
    async fn resolve_image_id(
        &self,
        image: &str,
        options: &ImageResolveOptions,
    ) -> Result<String, ClientError>;
}
