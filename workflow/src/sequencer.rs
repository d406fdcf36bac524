//! Stage sequencing: the ordered steps and the current position.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use vvp_types::{Stage, Timestamp};

/// An audited use of the skip override.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOverride {
    pub from: Stage,
    pub to: Stage,
    /// Stages whose completion gate was bypassed, in order.
    pub bypassed: Vec<Stage>,
    pub reason: String,
    pub at: Timestamp,
}

/// Tracks the current stage and every stage visited since the last reset.
///
/// Between resets the visited stages are non-decreasing: `advance` only moves
/// to the immediate successor and `skip_to` only moves forward.
#[derive(Clone, Debug)]
pub struct StageSequencer {
    current: Stage,
    history: Vec<Stage>,
    overrides: Vec<StageOverride>,
}

impl Default for StageSequencer {
    fn default() -> Self {
        Self {
            current: Stage::Intake,
            history: vec![Stage::Intake],
            overrides: Vec::new(),
        }
    }
}

impl StageSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    pub fn overrides(&self) -> &[StageOverride] {
        &self.overrides
    }

    /// Move to `to` if it is the immediate successor of the current stage.
    pub fn advance(&mut self, to: Stage) -> Result<Stage, WorkflowError> {
        if self.current.successor() != Some(to) {
            return Err(WorkflowError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        self.history.push(to);
        Ok(to)
    }

    /// Jump forward to `to`, bypassing the completion gates of every stage in
    /// between. Intake cannot be skipped (consent must be given) and Complete
    /// cannot be reached this way (a result must be issued through mobility).
    pub fn skip_to(
        &mut self,
        to: Stage,
        reason: impl Into<String>,
        at: Timestamp,
    ) -> Result<&StageOverride, WorkflowError> {
        let from = self.current;
        if from == Stage::Intake || to == Stage::Complete || to <= from {
            return Err(WorkflowError::SkipNotAllowed { from, to });
        }

        let bypassed: Vec<Stage> = Stage::ALL
            .iter()
            .copied()
            .filter(|s| *s >= from && *s < to)
            .collect();

        self.current = to;
        self.history.push(to);
        self.overrides.push(StageOverride {
            from,
            to,
            bypassed,
            reason: reason.into(),
            at,
        });
        Ok(&self.overrides[self.overrides.len() - 1])
    }

    /// Return to Intake and forget the history and overrides.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
