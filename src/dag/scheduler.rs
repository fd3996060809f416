// src/dag/scheduler.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::client::ContainerClient;
use crate::dag::graph::DependencyGraph;
use crate::errors::{GoalError, Result};
use crate::goal::{ApplyOutcome, ContainerGoal};

/// What a successful [`Scheduler::apply_graph`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphReport {
    /// Container names per round, in goal-set order within each round.
    pub rounds: Vec<Vec<String>>,
    /// How each container reached its goal.
    pub outcomes: BTreeMap<String, ApplyOutcome>,
}

/// Applies a whole goal set in dependency order.
///
/// Work proceeds in rounds. A round contains every pending container whose
/// dependencies were all applied in earlier rounds; its containers are
/// reconciled concurrently and the round ends only when all of them have
/// finished. The first failure in a round ends the run once its siblings are
/// done. A round with nothing ready means the remaining dependencies can
/// never be met, and is reported as [`GoalError::Stalled`].
///
/// The `started`/`pending` bookkeeping lives on the stack of
/// [`apply_graph`](Self::apply_graph) and is only touched between rounds.
#[derive(Debug)]
pub struct Scheduler<C: ?Sized> {
    client: Arc<C>,
}

impl<C> Scheduler<C>
where
    C: ContainerClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Create and start all `goals`, dependencies first.
    pub async fn apply_graph(&self, goals: Vec<ContainerGoal>) -> Result<GraphReport> {
        // Unknown links and duplicate names fail here, before any client call.
        let graph = DependencyGraph::from_goals(&goals)?;
        info!(containers = graph.len(), "applying container goal graph");

        let mut report = GraphReport::default();
        let mut started: HashSet<String> = HashSet::new();
        let mut pending: Vec<Arc<ContainerGoal>> = goals.into_iter().map(Arc::new).collect();

        while !pending.is_empty() {
            let (ready, deferred): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|goal| graph.deps_satisfied(goal.name(), &started));

            if ready.is_empty() {
                let waiting: Vec<&str> = deferred.iter().map(|g| g.name()).collect();
                let err = graph.stalled(&waiting, &started);
                error!(error = %err, "dependency graph cannot make progress");
                return Err(err);
            }

            let round = report.rounds.len() + 1;
            let names: Vec<String> = ready.iter().map(|g| g.name().to_string()).collect();
            info!(round, containers = ?names, deferred = deferred.len(), "starting round");

            let outcomes = self.run_round(round, ready).await?;

            started.extend(names.iter().cloned());
            report.outcomes.extend(outcomes);
            report.rounds.push(names);
            pending = deferred;
        }

        info!(rounds = report.rounds.len(), "all container goals applied");
        Ok(report)
    }

    /// Reconcile every goal of one round concurrently and wait for all of them.
    ///
    /// Returns the first error reported, after the whole round has drained.
    async fn run_round(
        &self,
        round: usize,
        ready: Vec<Arc<ContainerGoal>>,
    ) -> Result<Vec<(String, ApplyOutcome)>> {
        let mut tasks = JoinSet::new();
        let mut names_by_task = HashMap::new();

        for goal in ready {
            let client = Arc::clone(&self.client);
            let name = goal.name().to_string();
            debug!(round, container = %name, "dispatching reconcile task");
            let handle = tasks.spawn(async move { goal.apply(client.as_ref()).await });
            names_by_task.insert(handle.id(), name);
        }

        let mut outcomes = Vec::with_capacity(names_by_task.len());
        let mut first_error: Option<GoalError> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let (name, result) = match joined {
                Ok((id, result)) => (names_by_task.remove(&id).unwrap_or_default(), result),
                Err(join_err) => {
                    let name = names_by_task.remove(&join_err.id()).unwrap_or_default();
                    (name.clone(), Err(GoalError::TaskPanicked(name)))
                }
            };

            match result {
                Ok(outcome) => {
                    debug!(round, container = %name, ?outcome, "reconcile task finished");
                    outcomes.push((name, outcome));
                }
                Err(err) => {
                    error!(round, container = %name, error = %err, "reconcile task failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(outcomes),
        }
    }
}

/// Convenience wrapper around [`Scheduler::apply_graph`].
pub async fn apply_graph<C>(client: Arc<C>, goals: Vec<ContainerGoal>) -> Result<GraphReport>
where
    C: ContainerClient + ?Sized + 'static,
{
    Scheduler::new(client).apply_graph(goals).await
}
