#![allow(dead_code)]

use dockergoal::goal::{ContainerGoal, ContainerGoalBuilder};
use dockergoal::types::{ContainerConfig, HostConfig};

/// Builder pre-filled with a name and an image.
pub fn goal(name: &str, image: &str) -> ContainerGoalBuilder {
    ContainerGoal::builder()
        .name(name)
        .config(ContainerConfig::new(image))
}

/// A goal with the given links and no policy flags.
pub fn linked_goal(name: &str, image: &str, links: &[&str]) -> ContainerGoal {
    goal(name, image)
        .host_config(HostConfigBuilder::new().links(links).build())
        .build()
        .expect("Failed to build valid goal from builder")
}

/// Builder for `HostConfig`.
#[derive(Default)]
pub struct HostConfigBuilder {
    host: HostConfig,
}

impl HostConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(mut self, link: &str) -> Self {
        self.host.links.push(link.to_string());
        self
    }

    pub fn links(mut self, links: &[&str]) -> Self {
        self.host.links.extend(links.iter().map(|l| l.to_string()));
        self
    }

    pub fn volumes_from(mut self, source: &str) -> Self {
        self.host.volumes_from.push(source.to_string());
        self
    }

    pub fn port(mut self, port: &str) -> Self {
        self.host.ports.push(port.to_string());
        self
    }

    pub fn build(self) -> HostConfig {
        self.host
    }
}
