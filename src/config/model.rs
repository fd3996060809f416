// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::goal::{ContainerGoal, ContainerOption};
use crate::types::{AuthConfig, ContainerConfig, HostConfig};

/// Goal file exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [defaults]
/// check_running_image = true
///
/// [container.db]
/// image = "postgres:16"
///
/// [container.web]
/// image = "nginx:1.27"
/// remove_existing = true
///
/// [container.web.host]
/// links = ["db:database"]
/// ports = ["8080:80"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawGoalFile {
    /// Policy defaults from `[defaults]`.
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// All containers from `[container.<name>]`, keyed by container name.
    #[serde(default)]
    pub container: BTreeMap<String, ContainerSection>,
}

/// `[defaults]` section. Every flag defaults to `false`.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct DefaultsSection {
    #[serde(default)]
    pub remove_existing: bool,

    #[serde(default)]
    pub force_remove_existing: bool,

    #[serde(default)]
    pub check_running_image: bool,
}

/// `[container.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSection {
    /// Image, command, env, ... at the top level of the section.
    #[serde(flatten)]
    pub config: ContainerConfig,

    /// `[container.<name>.host]`: links, ports, mounts.
    #[serde(default)]
    pub host: HostConfig,

    /// `[container.<name>.auth]`: pull credentials.
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Per-container overrides of `[defaults]`.
    #[serde(default)]
    pub remove_existing: Option<bool>,

    #[serde(default)]
    pub force_remove_existing: Option<bool>,

    #[serde(default)]
    pub check_running_image: Option<bool>,
}

impl ContainerSection {
    /// The option list that builds this container's goal.
    pub fn to_options(&self, name: &str, defaults: &DefaultsSection) -> Vec<ContainerOption> {
        let mut options = vec![
            ContainerOption::Name(name.to_string()),
            ContainerOption::Config(self.config.clone()),
            ContainerOption::HostConfig(self.host.clone()),
        ];
        if self.remove_existing.unwrap_or(defaults.remove_existing) {
            options.push(ContainerOption::RemoveExisting);
        }
        if self
            .force_remove_existing
            .unwrap_or(defaults.force_remove_existing)
        {
            options.push(ContainerOption::ForceRemoveExisting);
        }
        if self
            .check_running_image
            .unwrap_or(defaults.check_running_image)
        {
            options.push(ContainerOption::CheckRunningImage);
        }
        if let Some(auth) = &self.auth {
            options.push(ContainerOption::AuthConfig(auth.clone()));
        }
        options
    }
}

/// A validated goal file.
///
/// Only constructible through `TryFrom<RawGoalFile>`, which checks link
/// closure and builds every [`ContainerGoal`].
#[derive(Debug, Clone)]
pub struct GoalFile {
    goals: Vec<ContainerGoal>,
}

impl GoalFile {
    pub(crate) fn new_unchecked(goals: Vec<ContainerGoal>) -> Self {
        Self { goals }
    }

    pub fn goals(&self) -> &[ContainerGoal] {
        &self.goals
    }

    pub fn into_goals(self) -> Vec<ContainerGoal> {
        self.goals
    }
}
