// src/goal/descriptor.rs

//! Desired-state descriptor for a single container and the options used to
//! build it.

use crate::errors::{GoalError, Result};
use crate::types::{AuthConfig, ContainerConfig, HostConfig};

/// Desired state of one container.
///
/// This is only the goal; nothing touches the runtime until
/// [`ContainerGoal::apply`] is called. A goal is immutable once built and
/// carries no execution state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerGoal {
    name: String,
    container_config: ContainerConfig,
    host_config: HostConfig,
    remove_existing: bool,
    force_remove_existing: bool,
    check_running_image: bool,
    auth_config: Option<AuthConfig>,
}

/// A single configuration step applied while building a [`ContainerGoal`].
///
/// Options are applied in order; the first one that fails validation aborts
/// construction.
#[derive(Debug, Clone)]
pub enum ContainerOption {
    /// Name of the container, also its key in the dependency graph.
    Name(String),
    /// Replace a running container whose image differs from the goal.
    /// Without this (or `ForceRemoveExisting`) a mismatch is an error.
    RemoveExisting,
    /// Remove any existing container, even one that matches the goal.
    ForceRemoveExisting,
    Config(ContainerConfig),
    HostConfig(HostConfig),
    /// Compare the running container's image id with the goal's image id.
    CheckRunningImage,
    /// Credentials used when pulling the image.
    AuthConfig(AuthConfig),
}

impl ContainerOption {
    fn apply(self, builder: &mut ContainerGoalBuilder) -> Result<()> {
        match self {
            ContainerOption::Name(name) => {
                validate_name(&name)?;
                builder.name = Some(name);
            }
            ContainerOption::RemoveExisting => builder.remove_existing = true,
            ContainerOption::ForceRemoveExisting => builder.force_remove_existing = true,
            ContainerOption::Config(config) => {
                if config.image.trim().is_empty() {
                    return Err(GoalError::ConfigError(
                        "container config must name an image".to_string(),
                    ));
                }
                builder.container_config = Some(config);
            }
            ContainerOption::HostConfig(host) => {
                for (target, reference) in host.dependency_names() {
                    if target.trim().is_empty() {
                        return Err(GoalError::ConfigError(format!(
                            "host config reference '{reference}' has no container name"
                        )));
                    }
                }
                builder.host_config = host;
            }
            ContainerOption::CheckRunningImage => builder.check_running_image = true,
            ContainerOption::AuthConfig(auth) => builder.auth_config = Some(auth),
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GoalError::ConfigError(
            "container name must not be empty".to_string(),
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c == ':' || c == '/') {
        return Err(GoalError::ConfigError(format!(
            "container name '{name}' must not contain whitespace, ':' or '/'"
        )));
    }
    Ok(())
}

/// In-progress goal. Options mutate it; [`ContainerGoalBuilder::build`]
/// applies them and checks that the result is complete.
#[derive(Debug, Default)]
pub struct ContainerGoalBuilder {
    options: Vec<ContainerOption>,
    name: Option<String>,
    container_config: Option<ContainerConfig>,
    host_config: HostConfig,
    remove_existing: bool,
    force_remove_existing: bool,
    check_running_image: bool,
    auth_config: Option<AuthConfig>,
}

impl ContainerGoalBuilder {
    pub fn option(mut self, option: ContainerOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.option(ContainerOption::Name(name.into()))
    }

    pub fn remove_existing(self) -> Self {
        self.option(ContainerOption::RemoveExisting)
    }

    pub fn force_remove_existing(self) -> Self {
        self.option(ContainerOption::ForceRemoveExisting)
    }

    pub fn config(self, config: ContainerConfig) -> Self {
        self.option(ContainerOption::Config(config))
    }

    pub fn host_config(self, host: HostConfig) -> Self {
        self.option(ContainerOption::HostConfig(host))
    }

    pub fn check_running_image(self) -> Self {
        self.option(ContainerOption::CheckRunningImage)
    }

    pub fn auth_config(self, auth: AuthConfig) -> Self {
        self.option(ContainerOption::AuthConfig(auth))
    }

    /// Apply all options in order and produce the goal.
    pub fn build(mut self) -> Result<ContainerGoal> {
        let options = std::mem::take(&mut self.options);
        for option in options {
            option.apply(&mut self)?;
        }

        let name = self.name.ok_or_else(|| {
            GoalError::ConfigError("container goal requires a name".to_string())
        })?;
        let container_config = self.container_config.ok_or_else(|| {
            GoalError::ConfigError(format!("container '{name}' requires a container config"))
        })?;

        Ok(ContainerGoal {
            name,
            container_config,
            host_config: self.host_config,
            remove_existing: self.remove_existing,
            force_remove_existing: self.force_remove_existing,
            check_running_image: self.check_running_image,
            auth_config: self.auth_config,
        })
    }
}

impl ContainerGoal {
    /// Build a goal from an ordered list of options.
    pub fn new(options: impl IntoIterator<Item = ContainerOption>) -> Result<Self> {
        options
            .into_iter()
            .fold(Self::builder(), ContainerGoalBuilder::option)
            .build()
    }

    pub fn builder() -> ContainerGoalBuilder {
        ContainerGoalBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_config(&self) -> &ContainerConfig {
        &self.container_config
    }

    pub fn host_config(&self) -> &HostConfig {
        &self.host_config
    }

    pub fn remove_existing(&self) -> bool {
        self.remove_existing
    }

    pub fn force_remove_existing(&self) -> bool {
        self.force_remove_existing
    }

    pub fn check_running_image(&self) -> bool {
        self.check_running_image
    }

    pub fn auth_config(&self) -> Option<&AuthConfig> {
        self.auth_config.as_ref()
    }
}
