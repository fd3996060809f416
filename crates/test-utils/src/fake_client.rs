use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dockergoal::client::{ClientError, ContainerClient, ContainerInfo, ImageResolveOptions};
use dockergoal::types::{AuthConfig, ContainerConfig, HostConfig};

/// A client operation, used to inject failures and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Inspect,
    Remove,
    Create,
    Start,
    ResolveImage,
}

/// One recorded client call. Container calls carry the container name even
/// when the client was addressed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Inspect(String),
    Remove {
        name: String,
        force: bool,
        remove_volumes: bool,
    },
    Create {
        name: String,
        image: String,
    },
    /// Recorded once the (possibly delayed) start has taken effect.
    Start(String),
    ResolveImage(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Call::Remove { .. } | Call::Create { .. } | Call::Start(_))
    }

    pub fn container(&self) -> Option<&str> {
        match self {
            Call::Inspect(name) | Call::Start(name) => Some(name),
            Call::Remove { name, .. } | Call::Create { name, .. } => Some(name),
            Call::ResolveImage(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    containers: HashMap<String, ContainerInfo>,
    /// Image reference -> image id.
    images: HashMap<String, String>,
    /// (op, container name or image reference) -> error message.
    failures: HashMap<(Op, String), String>,
    delays: HashMap<(Op, String), Duration>,
    calls: Vec<Call>,
    next_id: u64,
}

/// In-memory `ContainerClient`:
/// - keeps a map of containers by name and of image references to ids
/// - records every call in order
/// - fails or delays chosen operations on request
#[derive(Debug, Default)]
pub struct FakeClient {
    state: Mutex<State>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image reference and its id.
    pub fn with_image(self, reference: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .images
            .insert(reference.to_string(), id.to_string());
        self
    }

    /// Register an existing container created from image id `image_id`.
    pub fn with_container(self, name: &str, image_id: &str, running: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = format!("{name}-{}", state.next_id);
            state.containers.insert(
                name.to_string(),
                ContainerInfo {
                    id,
                    name: name.to_string(),
                    running,
                    image: image_id.to_string(),
                },
            );
        }
        self
    }

    /// Make `op` fail for the given container name (or image reference for
    /// `Op::ResolveImage`).
    pub fn failing(self, op: Op, key: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, key.to_string()), format!("injected {op:?} failure for {key}"));
        self
    }

    /// Sleep before `op` takes effect for the given container.
    pub fn delayed(self, op: Op, key: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert((op, key.to_string()), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, name: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.container() == Some(name))
            .collect()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// Position of the first call equal to `call`, if any.
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    pub fn container(&self, name: &str) -> Option<ContainerInfo> {
        self.state.lock().unwrap().containers.get(name).cloned()
    }

    fn injected(&self, op: Op, key: &str) -> Result<(), ClientError> {
        let state = self.state.lock().unwrap();
        match state.failures.get(&(op, key.to_string())) {
            Some(msg) => Err(ClientError::Command {
                command: format!("fake {op:?}"),
                status: 1,
                stderr: msg.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn pause(&self, op: Op, key: &str) {
        let delay = self
            .state
            .lock()
            .unwrap()
            .delays
            .get(&(op, key.to_string()))
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn name_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .containers
            .values()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }
}

#[async_trait]
impl ContainerClient for FakeClient {
    async fn inspect_container(&self, name: &str) -> Result<ContainerInfo, ClientError> {
        self.record(Call::Inspect(name.to_string()));
        self.pause(Op::Inspect, name).await;
        self.injected(Op::Inspect, name)?;
        self.container(name)
            .ok_or_else(|| ClientError::NotFound(format!("No such container: {name}")))
    }

    async fn remove_container(
        &self,
        id: &str,
        force: bool,
        remove_volumes: bool,
    ) -> Result<(), ClientError> {
        let name = self
            .name_of(id)
            .ok_or_else(|| ClientError::NotFound(format!("No such container: {id}")))?;
        self.record(Call::Remove {
            name: name.clone(),
            force,
            remove_volumes,
        });
        self.pause(Op::Remove, &name).await;
        self.injected(Op::Remove, &name)?;
        self.state.lock().unwrap().containers.remove(&name);
        Ok(())
    }

    async fn create_container_with_pull(
        &self,
        config: &ContainerConfig,
        _host: &HostConfig,
        name: &str,
        _auth: Option<&AuthConfig>,
    ) -> Result<String, ClientError> {
        self.record(Call::Create {
            name: name.to_string(),
            image: config.image.clone(),
        });
        self.pause(Op::Create, name).await;
        self.injected(Op::Create, name)?;

        let mut state = self.state.lock().unwrap();
        if state.containers.contains_key(name) {
            return Err(ClientError::Command {
                command: "fake Create".to_string(),
                status: 1,
                stderr: format!("Conflict. The container name \"/{name}\" is already in use"),
            });
        }
        // "Pull" unknown images by minting an id for them.
        let image_id = state
            .images
            .entry(config.image.clone())
            .or_insert_with(|| format!("sha256:{}", config.image))
            .clone();
        state.next_id += 1;
        let id = format!("{name}-{}", state.next_id);
        state.containers.insert(
            name.to_string(),
            ContainerInfo {
                id: id.clone(),
                name: name.to_string(),
                running: false,
                image: image_id,
            },
        );
        Ok(id)
    }

    async fn start_container(&self, id: &str, _host: &HostConfig) -> Result<(), ClientError> {
        let name = self
            .name_of(id)
            .ok_or_else(|| ClientError::NotFound(format!("No such container: {id}")))?;
        self.pause(Op::Start, &name).await;
        self.injected(Op::Start, &name)?;
        {
            let mut state = self.state.lock().unwrap();
            if let Some(info) = state.containers.get_mut(&name) {
                info.running = true;
            }
        }
        self.record(Call::Start(name));
        Ok(())
    }

    async fn resolve_image_id(
        &self,
        image: &str,
        _options: &ImageResolveOptions,
    ) -> Result<String, ClientError> {
        self.record(Call::ResolveImage(image.to_string()));
        self.injected(Op::ResolveImage, image)?;
        self.state
            .lock()
            .unwrap()
            .images
            .get(image)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("No such image: {image}")))
    }
}
