//! Suspension state of the phase loop.

use std::collections::VecDeque;
use std::fmt;

use game_core::FateCard;
use serde::{Deserialize, Serialize};

use crate::api::CoordinatorError;

/// Identifies one reveal so a late or duplicated dismissal can be told apart
/// from the one the coordinator is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevealToken(pub u64);

impl fmt::Display for RevealToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reveal#{}", self.0)
    }
}

/// A fate card the presentation layer must dramatize before play continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealRequest {
    pub token: RevealToken,
    pub card: FateCard,
    /// Final modifier after bias and suit match.
    pub value: i32,
    pub suit_match: bool,
}

impl RevealRequest {
    pub fn critical(&self) -> bool {
        self.card.critical
    }
}

/// Where the phase loop continues once every queued reveal is dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStep {
    /// Telegraph intents for the current round (phase `Intent`).
    BeginRound,
    /// Move to `PlayerAction` and wait for input.
    OpenPlayerAction,
    /// Stay in `PlayerAction`; used after a fate choice was offered.
    AwaitPlayer,
    EnterResolution,
    /// Let enemies act, starting at roster index `from`.
    ResolveEnemies { from: usize },
    EnterRoundEnd,
    Finish,
}

/// Either running, or parked on a FIFO of reveals with exactly one resume
/// step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    Running,
    AwaitingReveal {
        queue: VecDeque<RevealRequest>,
        resume: PhaseStep,
    },
    TornDown,
}

impl Flow {
    pub(crate) fn is_running(&self) -> bool {
        matches!(self, Flow::Running)
    }

    pub(crate) fn front(&self) -> Option<&RevealRequest> {
        match self {
            Flow::AwaitingReveal { queue, .. } => queue.front(),
            _ => None,
        }
    }

    /// Parks the loop. Only legal while running.
    pub(crate) fn suspend(
        &mut self,
        queue: VecDeque<RevealRequest>,
        resume: PhaseStep,
    ) -> Result<(), CoordinatorError> {
        match self {
            Flow::Running => {
                *self = Flow::AwaitingReveal { queue, resume };
                Ok(())
            }
            Flow::AwaitingReveal { .. } => Err(CoordinatorError::AlreadySuspended),
            Flow::TornDown => Err(CoordinatorError::TornDown),
        }
    }

    /// Pops the front reveal if `token` matches it.
    ///
    /// Returns the resume step once the queue drains; the flow is `Running`
    /// again before the caller executes it.
    pub(crate) fn dismiss(
        &mut self,
        token: RevealToken,
    ) -> Result<Option<PhaseStep>, CoordinatorError> {
        let queue = match self {
            Flow::Running => return Err(CoordinatorError::NotAwaitingReveal),
            Flow::TornDown => return Err(CoordinatorError::TornDown),
            Flow::AwaitingReveal { queue, .. } => queue,
        };
        let expected = queue
            .front()
            .map(|request| request.token)
            .ok_or(CoordinatorError::NotAwaitingReveal)?;
        if expected != token {
            return Err(CoordinatorError::StaleRevealToken {
                expected,
                received: token,
            });
        }

        queue.pop_front();
        if !queue.is_empty() {
            return Ok(None);
        }

        match std::mem::replace(self, Flow::Running) {
            Flow::AwaitingReveal { resume, .. } => Ok(Some(resume)),
            other => {
                *self = other;
                Ok(None)
            }
        }
    }

    /// Enters the terminal state, returning how many reveals were dropped.
    pub(crate) fn tear_down(&mut self) -> usize {
        match std::mem::replace(self, Flow::TornDown) {
            Flow::AwaitingReveal { queue, .. } => queue.len(),
            _ => 0,
        }
    }
}
