//! Error types surfaced by the runtime API.
//!
//! Constructor failures, protocol misuse of the coordinator, reconciliation
//! refusals and save-state encoding problems each get their own type so
//! callers can match on exactly what their call can produce.
use thiserror::Error;

use game_core::{CardId, ContextError, EncounterId, EngineError, Phase};

use crate::coordinator::RevealToken;

/// Preconditions that prevent an encounter from being orchestrated at all.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("campaign has no active encounter to start")]
    NoActiveEncounter,

    #[error("encounter context is invalid")]
    InvalidContext(#[from] ContextError),

    #[error("combat engine could not be created")]
    Engine(#[from] EngineError),

    #[error("save state could not be decoded")]
    Save(#[from] SaveError),

    #[error("restored encounter could not resume")]
    Resume(#[from] CoordinatorError),
}

/// Misuse of the coordinator protocol.
///
/// Phase violations by player input are not errors (they are silently
/// ignored); these cover calls that indicate a bug in the caller or an
/// engine out of step with the phase table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: Phase, to: Phase },

    #[error("engine reported phase {reported}, expected {expected}")]
    EngineDesync { expected: Phase, reported: Phase },

    #[error("reveal token {received} does not match pending reveal {expected}")]
    StaleRevealToken {
        expected: RevealToken,
        received: RevealToken,
    },

    #[error("no reveal is pending")]
    NotAwaitingReveal,

    #[error("encounter suspended twice without resuming")]
    AlreadySuspended,

    #[error("mulligan is not open")]
    MulliganNotOpen,

    #[error("{0} is not in the mulligan hand")]
    MulliganCardNotInHand(CardId),

    #[error("coordinator has been torn down")]
    TornDown,
}

/// Reasons a result cannot be committed to the campaign.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("no encounter slot is open")]
    NoOpenEncounter,

    #[error("result for {received} does not match open slot {expected}")]
    SlotMismatch {
        expected: EncounterId,
        received: EncounterId,
    },

    #[error("encounter {0} is still in progress")]
    EncounterInProgress(EncounterId),

    #[error("encounter {0} was abandoned")]
    Abandoned(EncounterId),
}

/// Failures while encoding or decoding a mid-combat save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to encode save state")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode save state")]
    Decode(#[source] serde_json::Error),

    #[error("unsupported save version {found} (expected {expected})")]
    Version { expected: u32, found: u32 },
}
