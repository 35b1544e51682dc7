//! Action rejection reasons reported by combat engines.

use crate::error::{ErrorSeverity, GameError};

// ============================================================================
// Action Rejection Errors
// ============================================================================

/// Why an engine refused a command. Carried in [`ActionResult::error`]
/// (crate::ActionResult); a rejected command mutates nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionErrorKind {
    /// The rules of this encounter forbid fleeing.
    #[error("fleeing is not allowed in this encounter")]
    FleeNotAllowed,

    /// Target exists but cannot be targeted (dead, pacified, no spirit).
    #[error("invalid target")]
    InvalidTarget,

    /// Target not part of the encounter.
    #[error("target not found")]
    TargetNotFound,

    /// Card cost exceeds available faith.
    #[error("insufficient faith")]
    InsufficientFaith,

    /// Card is not in the hero's hand.
    #[error("card not in hand")]
    CardNotInHand,

    /// `ResolveFateChoice` without a pending choice.
    #[error("no fate choice pending")]
    NoFateChoicePending,

    /// Option index outside the pending choice.
    #[error("invalid fate choice option")]
    InvalidFateOption,

    /// A fate choice must be resolved before any other command.
    #[error("a fate choice must be resolved first")]
    FateChoiceUnresolved,

    /// Mulligan requested after the encounter's first round began.
    #[error("mulligan unavailable")]
    MulliganUnavailable,

    /// Command arrived while the engine is not in its player phase.
    #[error("not the player's phase")]
    NotPlayerPhase,

    /// Encounter already over.
    #[error("encounter is over")]
    EncounterOver,
}

impl GameError for ActionErrorKind {
    fn severity(&self) -> ErrorSeverity {
        use ActionErrorKind::*;
        match self {
            FleeNotAllowed | InvalidTarget | InsufficientFaith => ErrorSeverity::Recoverable,
            TargetNotFound | CardNotInHand | InvalidFateOption => ErrorSeverity::Validation,
            NoFateChoicePending | FateChoiceUnresolved | MulliganUnavailable | NotPlayerPhase => {
                ErrorSeverity::Validation
            }
            EncounterOver => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionErrorKind::*;
        match self {
            FleeNotAllowed => "ACTION_FLEE_NOT_ALLOWED",
            InvalidTarget => "ACTION_INVALID_TARGET",
            TargetNotFound => "ACTION_TARGET_NOT_FOUND",
            InsufficientFaith => "ACTION_INSUFFICIENT_FAITH",
            CardNotInHand => "ACTION_CARD_NOT_IN_HAND",
            NoFateChoicePending => "ACTION_NO_FATE_CHOICE_PENDING",
            InvalidFateOption => "ACTION_INVALID_FATE_OPTION",
            FateChoiceUnresolved => "ACTION_FATE_CHOICE_UNRESOLVED",
            MulliganUnavailable => "ACTION_MULLIGAN_UNAVAILABLE",
            NotPlayerPhase => "ACTION_NOT_PLAYER_PHASE",
            EncounterOver => "ACTION_ENCOUNTER_OVER",
        }
    }
}
