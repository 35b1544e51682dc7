//! Event types for different topics.

use game_core::{
    ActionCommand, ActionErrorKind, EncounterId, EncounterOutcome, EncounterStateChange, EnemyId,
    Intent, Phase,
};
use serde::{Deserialize, Serialize};

use super::bus::Event;
use crate::coordinator::{FeedbackKind, Rejection, RevealRequest, RevealToken};

/// Phase machine progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PhaseEvent {
    Entered {
        encounter: EncounterId,
        phase: Phase,
        round: u32,
    },

    /// Enemy intents for the round, published before player action opens
    IntentsTelegraphed { round: u32, intents: Vec<Intent> },

    MulliganOpened { encounter: EncounterId },

    MulliganClosed { encounter: EncounterId, replaced: usize },

    Finished {
        encounter: EncounterId,
        outcome: EncounterOutcome,
    },

    TornDown { encounter: EncounterId },
}

/// Player and enemy actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEvent {
    ActionApplied {
        command: ActionCommand,
        changes: Vec<EncounterStateChange>,
    },

    /// Stopped locally; the engine never saw the command
    ActionRejected {
        command: ActionCommand,
        rejection: Rejection,
    },

    /// Refused by the engine
    ActionFailed {
        command: ActionCommand,
        error: Option<ActionErrorKind>,
    },

    EnemyResolved {
        enemy: EnemyId,
        changes: Vec<EncounterStateChange>,
    },
}

/// Fate reveal lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RevealEvent {
    Requested(RevealRequest),
    Dismissed { token: RevealToken },
    /// Pending reveals dropped by teardown without resuming
    Discarded { count: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeedbackEvent {
    Raised(FeedbackKind),
    Cleared,
}

/// Campaign slot lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CampaignEvent {
    EncounterOpened { encounter: EncounterId },
    ResultCommitted {
        encounter: EncounterId,
        outcome: EncounterOutcome,
    },
    DuplicateIgnored { encounter: EncounterId },
    EncounterAbandoned { encounter: EncounterId },
}

macro_rules! into_event {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Event {
                fn from(event: $ty) -> Self {
                    Event::$variant(event)
                }
            }
        )*
    };
}

into_event! {
    PhaseEvent => Phase,
    CombatEvent => Combat,
    RevealEvent => Reveal,
    FeedbackEvent => Feedback,
    CampaignEvent => Campaign,
}
