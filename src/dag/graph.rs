// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::errors::{GoalError, Result};
use crate::goal::ContainerGoal;

/// Dependency graph of a goal set, keyed by container name.
///
/// Link and volumes-from references are parsed once here; the scheduler only
/// works with the resulting name sets. Construction rejects duplicate names
/// and links to containers outside the goal set. A volumes-from source
/// outside the set is assumed to exist already and adds no ordering. Cycles
/// are not rejected here; they surface as a round that makes no progress.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Container names in goal-set order.
    order: Vec<String>,
    /// Containers that must be running before each container is started.
    deps: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn from_goals(goals: &[ContainerGoal]) -> Result<Self> {
        let mut order = Vec::with_capacity(goals.len());
        let mut deps: HashMap<String, Vec<String>> = HashMap::new();

        // First pass: every known name.
        for goal in goals {
            let name = goal.name();
            if name.is_empty() {
                return Err(GoalError::ConfigError(
                    "container name must not be empty".to_string(),
                ));
            }
            if deps.insert(name.to_string(), Vec::new()).is_some() {
                return Err(GoalError::DuplicateName(name.to_string()));
            }
            order.push(name.to_string());
        }

        // Second pass: resolve references against the known names.
        for goal in goals {
            let host = goal.host_config();
            let mut targets: Vec<String> = Vec::new();

            for (target, reference) in host.link_targets() {
                if !deps.contains_key(target) {
                    return Err(GoalError::UnknownLink {
                        container: goal.name().to_string(),
                        link: reference.to_string(),
                    });
                }
                if !targets.iter().any(|d| d == target) {
                    targets.push(target.to_string());
                }
            }

            for (target, reference) in host.volume_source_targets() {
                if !deps.contains_key(target) {
                    debug!(
                        container = %goal.name(),
                        volumes_from = %reference,
                        "volumes-from source is outside the goal set"
                    );
                    continue;
                }
                if !targets.iter().any(|d| d == target) {
                    targets.push(target.to_string());
                }
            }

            if let Some(entry) = deps.get_mut(goal.name()) {
                *entry = targets;
            }
        }

        Ok(Self { order, deps })
    }

    /// All container names, in goal-set order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Immediate dependencies of a container: link targets and volumes-from
    /// sources that are part of the goal set.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.deps.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every dependency of `name` is in `started`.
    pub fn deps_satisfied(&self, name: &str, started: &HashSet<String>) -> bool {
        self.dependencies_of(name)
            .iter()
            .all(|dep| started.contains(dep))
    }

    /// Dependencies of `name` that are not in `started`.
    pub fn unmet_dependencies(&self, name: &str, started: &HashSet<String>) -> Vec<String> {
        self.dependencies_of(name)
            .iter()
            .filter(|dep| !started.contains(*dep))
            .cloned()
            .collect()
    }

    /// Build the error for a round in which none of `waiting` became ready.
    pub fn stalled(&self, waiting: &[&str], started: &HashSet<String>) -> GoalError {
        GoalError::Stalled {
            waiting: waiting
                .iter()
                .map(|name| (name.to_string(), self.unmet_dependencies(name, started)))
                .collect(),
        }
    }

    /// The rounds the scheduler would run if every container succeeded.
    ///
    /// Each round lists, in goal-set order, the containers whose dependencies
    /// all appear in earlier rounds.
    pub fn plan_rounds(&self) -> Result<Vec<Vec<String>>> {
        let mut started: HashSet<String> = HashSet::new();
        let mut pending: Vec<&str> = self.names().collect();
        let mut rounds: Vec<Vec<String>> = Vec::new();

        while !pending.is_empty() {
            let (ready, deferred): (Vec<&str>, Vec<&str>) = pending
                .into_iter()
                .partition(|name| self.deps_satisfied(name, &started));

            if ready.is_empty() {
                return Err(self.stalled(&deferred, &started));
            }

            started.extend(ready.iter().map(|s| s.to_string()));
            rounds.push(ready.into_iter().map(str::to_string).collect());
            pending = deferred;
        }

        Ok(rounds)
    }
}
