// src/client/docker_cli.rs

//! [`ContainerClient`] backed by the `docker` command-line binary.
//!
//! Each operation is one or a few `docker` invocations run through
//! `tokio::process::Command`. Argument construction and output parsing are
//! plain functions so they can be tested without a daemon.
//!
//! The CLI has no notion of start-time host configuration, so the
//! [`HostConfig`] is applied when the container is created and
//! `start_container` only starts it.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ClientError, ContainerClient, ContainerInfo, ImageResolveOptions};
use crate::types::{AuthConfig, ContainerConfig, HostConfig};

/// Runs `docker` subcommands for every client operation.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run `docker <args>` and return its trimmed stdout.
    ///
    /// A non-zero exit becomes [`ClientError::NotFound`] when stderr reports a
    /// missing object, and [`ClientError::Command`] otherwise.
    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, ClientError> {
        debug!(binary = %self.binary.display(), args = %redacted(args), "running docker");

        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).await?;
            // Closing stdin signals end of input (e.g. --password-stdin).
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_missing_object(&stderr) {
            return Err(ClientError::NotFound(stderr));
        }
        Err(ClientError::Command {
            command: format!("docker {}", args.first().map(String::as_str).unwrap_or("")),
            status: output.status.code().unwrap_or(-1),
            stderr,
        })
    }

    async fn login(&self, auth: &AuthConfig) -> Result<(), ClientError> {
        info!(
            username = %auth.username,
            registry = %auth.server_address,
            "logging in to registry"
        );
        self.run(&login_args(auth), Some(&auth.password)).await?;
        Ok(())
    }

    async fn pull(&self, image: &str, auth: Option<&AuthConfig>) -> Result<(), ClientError> {
        if let Some(auth) = auth {
            self.login(auth).await?;
        }
        info!(%image, "pulling image");
        self.run(&["pull".to_string(), image.to_string()], None)
            .await?;
        Ok(())
    }

    async fn image_id(&self, image: &str) -> Result<String, ClientError> {
        let args = vec![
            "image".to_string(),
            "inspect".to_string(),
            "--format".to_string(),
            "{{.Id}}".to_string(),
            image.to_string(),
        ];
        self.run(&args, None).await
    }
}

#[async_trait]
impl ContainerClient for DockerCli {
    async fn inspect_container(&self, name: &str) -> Result<ContainerInfo, ClientError> {
        let args = vec![
            "container".to_string(),
            "inspect".to_string(),
            name.to_string(),
        ];
        let stdout = self.run(&args, None).await?;
        parse_inspect(&stdout)?
            .ok_or_else(|| ClientError::NotFound(format!("No such container: {name}")))
    }

    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        remove_volumes: bool,
    ) -> Result<(), ClientError> {
        self.run(&remove_args(id, force, remove_volumes), None)
            .await?;
        Ok(())
    }

    async fn create_container_with_pull(
        &self,
        config: &ContainerConfig,
        host: &HostConfig,
        name: &str,
        auth: Option<&AuthConfig>,
    ) -> Result<String, ClientError> {
        let args = create_args(name, config, host);
        match self.run(&args, None).await {
            Ok(id) => Ok(id),
            Err(ClientError::NotFound(ref stderr)) if is_missing_image(stderr) => {
                debug!(image = %config.image, "image missing locally; pulling before retry");
                self.pull(&config.image, auth).await?;
                self.run(&args, None).await
            }
            Err(ClientError::Command { ref stderr, .. })
                if auth.is_some() && is_pull_denied(stderr) =>
            {
                self.pull(&config.image, auth).await?;
                self.run(&args, None).await
            }
            Err(other) => Err(other),
        }
    }

    async fn start_container(&self, id: &str, _host: &HostConfig) -> Result<(), ClientError> {
        self.run(&["start".to_string(), id.to_string()], None)
            .await?;
        Ok(())
    }

    async fn resolve_image_id(
        &self,
        image: &str,
        options: &ImageResolveOptions,
    ) -> Result<String, ClientError> {
        match self.image_id(image).await {
            Err(ClientError::NotFound(_)) if options.pull_missing => {
                self.pull(image, options.auth.as_ref()).await?;
                self.image_id(image).await
            }
            other => other,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectEntry {
    id: String,
    #[serde(default)]
    name: String,
    image: String,
    state: InspectState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    #[serde(default)]
    running: bool,
}

/// Decode `docker container inspect` output (a JSON array).
///
/// Returns `Ok(None)` for an empty array.
pub fn parse_inspect(stdout: &str) -> Result<Option<ContainerInfo>, ClientError> {
    let entries: Vec<InspectEntry> = serde_json::from_str(stdout)?;
    Ok(entries.into_iter().next().map(|entry| ContainerInfo {
        id: entry.id,
        name: entry.name.trim_start_matches('/').to_string(),
        running: entry.state.running,
        image: entry.image,
    }))
}

/// Whether docker's stderr reports that the requested object does not exist.
pub fn is_missing_object(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("no such container")
        || lower.contains("no such object")
        || lower.contains("no such image")
}

/// Whether docker's stderr reports a missing image, as opposed to a missing
/// link target or volume source.
pub fn is_missing_image(stderr: &str) -> bool {
    stderr.to_lowercase().contains("no such image")
}

fn is_pull_denied(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("pull access denied") || lower.contains("unauthorized")
}

/// Arguments for `docker create`, including every host-level setting.
pub fn create_args(name: &str, config: &ContainerConfig, host: &HostConfig) -> Vec<String> {
    let mut args = vec!["create".to_string(), "--name".to_string(), name.to_string()];

    // docker only takes the entrypoint executable; remaining words go
    // before the command.
    let mut entry_rest: Vec<String> = Vec::new();
    if let Some(entrypoint) = &config.entrypoint {
        if let Some((first, rest)) = entrypoint.split_first() {
            args.push("--entrypoint".to_string());
            args.push(first.clone());
            entry_rest = rest.to_vec();
        }
    }

    for env in &config.env {
        args.push("--env".to_string());
        args.push(env.clone());
    }
    for (key, value) in &config.labels {
        args.push("--label".to_string());
        args.push(format!("{key}={value}"));
    }
    if let Some(user) = &config.user {
        args.push("--user".to_string());
        args.push(user.clone());
    }
    if let Some(dir) = &config.working_dir {
        args.push("--workdir".to_string());
        args.push(dir.clone());
    }

    let repeated = [
        ("--link", &host.links),
        ("--volumes-from", &host.volumes_from),
        ("--publish", &host.ports),
        ("--volume", &host.binds),
    ];
    for (flag, values) in repeated {
        for value in values {
            args.push(flag.to_string());
            args.push(value.clone());
        }
    }
    if let Some(network) = &host.network_mode {
        args.push("--network".to_string());
        args.push(network.clone());
    }
    if let Some(restart) = &host.restart_policy {
        args.push("--restart".to_string());
        args.push(restart.clone());
    }

    args.push(config.image.clone());
    args.extend(entry_rest);
    args.extend(config.cmd.iter().cloned());
    args
}

pub fn remove_args(id: &str, force: bool, remove_volumes: bool) -> Vec<String> {
    let mut args = vec!["rm".to_string()];
    if force {
        args.push("--force".to_string());
    }
    if remove_volumes {
        args.push("--volumes".to_string());
    }
    args.push(id.to_string());
    args
}

/// `docker login` arguments; the password is written to stdin.
pub fn login_args(auth: &AuthConfig) -> Vec<String> {
    let mut args = vec![
        "login".to_string(),
        "--username".to_string(),
        auth.username.clone(),
        "--password-stdin".to_string(),
    ];
    if !auth.server_address.is_empty() {
        args.push(auth.server_address.clone());
    }
    args
}

/// Render arguments for logging with `--env` values masked.
fn redacted(args: &[String]) -> String {
    let mut out = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            let key = arg.split('=').next().unwrap_or("");
            out.push(format!("{key}=***"));
            mask_next = false;
        } else {
            mask_next = arg == "--env";
            out.push(arg.clone());
        }
    }
    out.join(" ")
}
