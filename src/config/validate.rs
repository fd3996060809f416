// src/config/validate.rs

use crate::config::model::{GoalFile, RawGoalFile};
use crate::dag::DependencyGraph;
use crate::errors::{GoalError, Result};
use crate::goal::ContainerGoal;

impl TryFrom<RawGoalFile> for GoalFile {
    type Error = crate::errors::GoalError;

    fn try_from(raw: RawGoalFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_containers(&raw)?;
        let goals = build_goals(&raw)?;
        validate_links(&goals)?;
        Ok(GoalFile::new_unchecked(goals))
    }
}

fn ensure_has_containers(raw: &RawGoalFile) -> Result<()> {
    if raw.container.is_empty() {
        return Err(GoalError::ConfigError(
            "goal file must contain at least one [container.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn build_goals(raw: &RawGoalFile) -> Result<Vec<ContainerGoal>> {
    raw.container
        .iter()
        .map(|(name, section)| {
            ContainerGoal::new(section.to_options(name, &raw.defaults)).map_err(|err| match err {
                GoalError::ConfigError(msg) => {
                    GoalError::ConfigError(format!("[container.{name}]: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

/// Every link target must be declared in the same file.
fn validate_links(goals: &[ContainerGoal]) -> Result<()> {
    DependencyGraph::from_goals(goals).map(|_| ())
}
