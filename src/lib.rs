// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod dag;
pub mod errors;
pub mod goal;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::client::DockerCli;
use crate::config::{default_config_path, load_and_validate};
use crate::dag::{DependencyGraph, Scheduler};
use crate::goal::ContainerGoal;

pub use crate::dag::{apply_graph, GraphReport};
pub use crate::errors::{GoalError, Result as GoalResult};
pub use crate::goal::{ApplyOutcome, ContainerOption};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - goal file loading and validation
/// - the docker CLI client
/// - the round scheduler
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let goal_file = load_and_validate(&config_path)?;
    info!(
        path = %config_path.display(),
        containers = goal_file.goals().len(),
        "loaded goal file"
    );

    if args.dry_run {
        print_dry_run(goal_file.goals())?;
        return Ok(());
    }

    let client = Arc::new(DockerCli::new(&args.docker));
    let scheduler = Scheduler::new(client);
    let report = scheduler.apply_graph(goal_file.into_goals()).await?;

    for (name, outcome) in &report.outcomes {
        info!(container = %name, ?outcome, "goal reached");
    }
    Ok(())
}

/// Simple dry-run output: print containers, their policies and the rounds.
fn print_dry_run(goals: &[ContainerGoal]) -> Result<()> {
    let graph = DependencyGraph::from_goals(goals)?;
    let rounds = graph.plan_rounds()?;

    println!("dockergoal dry-run");
    println!();
    println!("containers ({}):", goals.len());
    for goal in goals {
        println!("  - {}", goal.name());
        println!("      image: {}", goal.container_config().image);
        let deps = graph.dependencies_of(goal.name());
        if !deps.is_empty() {
            println!("      depends on: {:?}", deps);
        }
        if goal.remove_existing() {
            println!("      remove_existing: true");
        }
        if goal.force_remove_existing() {
            println!("      force_remove_existing: true");
        }
        if goal.check_running_image() {
            println!("      check_running_image: true");
        }
    }
    println!();

    println!("rounds ({}):", rounds.len());
    for (i, round) in rounds.iter().enumerate() {
        println!("  {}: {}", i + 1, round.join(", "));
    }

    debug!("dry-run complete (no container touched)");
    Ok(())
}
