// src/types.rs

//! Configuration payloads carried by a container goal.
//!
//! These are plain data: the reconciler hands them to the runtime client
//! untouched. The only part the core interprets is the dependency references
//! in [`HostConfig`] (`links` and `volumes_from`).

use std::collections::BTreeMap;

use serde::Deserialize;

/// What to create: image, command and process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContainerConfig {
    /// Image reference, e.g. `"postgres:16"`.
    pub image: String,

    #[serde(default)]
    pub cmd: Vec<String>,

    #[serde(default)]
    pub entrypoint: Option<Vec<String>>,

    /// `KEY=value` pairs.
    #[serde(default)]
    pub env: Vec<String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub working_dir: Option<String>,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }
}

/// Where and how the container runs on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Links in `target[:alias]` form. Each target must be another goal.
    #[serde(default)]
    pub links: Vec<String>,

    /// Volume sources in `target[:ro|:rw]` form. Targets may be containers
    /// outside the goal set.
    #[serde(default)]
    pub volumes_from: Vec<String>,

    /// Port bindings in docker's `[ip:]host:container[/proto]` form.
    #[serde(default)]
    pub ports: Vec<String>,

    /// Bind mounts in `src:dst[:mode]` form.
    #[serde(default)]
    pub binds: Vec<String>,

    #[serde(default)]
    pub network_mode: Option<String>,

    #[serde(default)]
    pub restart_policy: Option<String>,
}

impl HostConfig {
    /// Every container this host config refers to, in declaration order,
    /// with alias/mode suffixes stripped. Links come first.
    pub fn dependency_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.link_targets().chain(self.volume_source_targets())
    }

    /// `(target, reference)` for each link.
    pub fn link_targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links
            .iter()
            .map(|reference| (reference_target(reference), reference.as_str()))
    }

    /// `(target, reference)` for each volumes-from source.
    pub fn volume_source_targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.volumes_from
            .iter()
            .map(|reference| (reference_target(reference), reference.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Registry credentials used only when pulling an image.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Registry host; empty means the default registry.
    #[serde(default)]
    pub server_address: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("server_address", &self.server_address)
            .finish()
    }
}

/// The container name in a `target[:suffix]` reference.
pub fn reference_target(reference: &str) -> &str {
    reference.split(':').next().unwrap_or(reference)
}
