// src/goal/reconcile.rs

//! Per-container reconciliation.
//!
//! [`ContainerGoal::apply`] walks a fixed sequence of states:
//!
//! 1. inspect the named container (absent is a normal outcome)
//! 2. force-remove it if the goal asks for that
//! 3. if it is running, decide whether it already satisfies the goal,
//!    replacing it when the image differs and the goal allows removal
//! 4. create it if it is (now) absent
//! 5. start it
//!
//! Client calls are made one at a time; no two mutating calls for the same
//! container ever overlap.

use tracing::{debug, info, warn};

use crate::client::{ClientError, ContainerClient, ContainerInfo, ImageResolveOptions};
use crate::errors::{GoalError, Result};

use super::descriptor::ContainerGoal;

/// Which path [`ContainerGoal::apply`] took to reach the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A running container already satisfied the goal; nothing was changed.
    AlreadyRunning,
    /// A stopped container was kept and started.
    StartedExisting,
    /// No container existed; one was created and started.
    Created,
    /// An existing container was removed, then a new one created and started.
    Replaced,
}

/// Result of checking a running container against the goal.
enum RunningCheck {
    Satisfied,
    /// The container was removed and must be recreated.
    Removed,
}

impl ContainerGoal {
    /// Drive the container to the desired running state.
    pub async fn apply<C>(&self, client: &C) -> Result<ApplyOutcome>
    where
        C: ContainerClient + ?Sized,
    {
        let name = self.name();

        let mut existing = match client.inspect_container(name).await {
            Ok(info) => Some(info),
            Err(ClientError::NotFound(_)) => None,
            Err(source) => {
                return Err(GoalError::client(
                    format!("inspecting container '{name}'"),
                    source,
                ));
            }
        };
        debug!(
            container = %name,
            found = existing.is_some(),
            running = existing.as_ref().is_some_and(|info| info.running),
            "inspected container"
        );

        let mut removed = false;

        if self.force_remove_existing() {
            if let Some(info) = existing.take() {
                info!(container = %name, id = %info.id, "force removing existing container");
                self.remove(client, &info).await?;
                removed = true;
            }
        }

        let running = existing.as_ref().filter(|info| info.running).cloned();
        if let Some(info) = running {
            match self.check_running(client, &info).await? {
                RunningCheck::Satisfied => {
                    info!(container = %name, "container already running with desired state");
                    return Ok(ApplyOutcome::AlreadyRunning);
                }
                RunningCheck::Removed => {
                    existing = None;
                    removed = true;
                }
            }
        }

        let (id, created) = match existing {
            Some(info) => {
                if !self.host_config().is_empty() {
                    warn!(
                        container = %name,
                        id = %info.id,
                        "starting existing container in place; host config from the goal may not be applied"
                    );
                }
                (info.id, false)
            }
            None => (self.create(client).await?, true),
        };

        client
            .start_container(&id, self.host_config())
            .await
            .map_err(|source| {
                GoalError::client(format!("starting container '{name}' ({id})"), source)
            })?;

        let outcome = match (created, removed) {
            (false, _) => ApplyOutcome::StartedExisting,
            (true, false) => ApplyOutcome::Created,
            (true, true) => ApplyOutcome::Replaced,
        };
        info!(container = %name, %id, ?outcome, "container started");
        Ok(outcome)
    }

    /// Decide whether a running container satisfies the goal, removing it
    /// when it doesn't and removal is allowed.
    async fn check_running<C>(&self, client: &C, current: &ContainerInfo) -> Result<RunningCheck>
    where
        C: ContainerClient + ?Sized,
    {
        if !self.check_running_image() {
            return Ok(RunningCheck::Satisfied);
        }

        // Containers report the image id, not the reference they were
        // created with.
        let desired_image = &self.container_config().image;
        let options = ImageResolveOptions {
            pull_missing: true,
            auth: self.auth_config().cloned(),
        };
        let desired_image_id = client
            .resolve_image_id(desired_image, &options)
            .await
            .map_err(|source| {
                GoalError::client(format!("resolving image id of '{desired_image}'"), source)
            })?;

        if current.image == desired_image_id {
            return Ok(RunningCheck::Satisfied);
        }

        if !self.remove_existing() {
            return Err(GoalError::ImageMismatch {
                container: self.name().to_string(),
                running_image: current.image.clone(),
                desired_image: desired_image.clone(),
                desired_image_id,
            });
        }

        warn!(
            container = %self.name(),
            running_image = %current.image,
            desired_image = %desired_image,
            %desired_image_id,
            "running image differs from goal; replacing container"
        );
        self.remove(client, current).await?;
        Ok(RunningCheck::Removed)
    }

    async fn remove<C>(&self, client: &C, info: &ContainerInfo) -> Result<()>
    where
        C: ContainerClient + ?Sized,
    {
        client
            .remove_container(&info.id, true, false)
            .await
            .map_err(|source| {
                GoalError::client(
                    format!("removing container '{}' ({})", self.name(), info.id),
                    source,
                )
            })
    }

    /// Create the container and return its runtime id as reported by a
    /// fresh inspect.
    async fn create<C>(&self, client: &C) -> Result<String>
    where
        C: ContainerClient + ?Sized,
    {
        let name = self.name();
        info!(container = %name, image = %self.container_config().image, "creating container");

        client
            .create_container_with_pull(
                self.container_config(),
                self.host_config(),
                name,
                self.auth_config(),
            )
            .await
            .map_err(|source| GoalError::client(format!("creating container '{name}'"), source))?;

        let info = client.inspect_container(name).await.map_err(|source| {
            GoalError::client(format!("inspecting created container '{name}'"), source)
        })?;
        Ok(info.id)
    }
}
