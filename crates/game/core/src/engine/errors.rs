//! Errors raised while building or restoring a combat engine.

use crate::context::ContextError;
use crate::error::{ErrorSeverity, GameError};
use crate::ids::{CardId, EnemyId};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    #[error("invalid encounter context: {0}")]
    InvalidContext(#[from] ContextError),

    #[error("save state references unknown enemy {0}")]
    UnknownEnemy(EnemyId),

    #[error("save state references unknown card {0}")]
    UnknownCard(CardId),

    #[error("save state round {0} is not a valid round")]
    InvalidRound(u32),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::InvalidContext(inner) => inner.severity(),
            EngineError::UnknownEnemy(_)
            | EngineError::UnknownCard(_)
            | EngineError::InvalidRound(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidContext(inner) => inner.error_code(),
            EngineError::UnknownEnemy(_) => "ENGINE_UNKNOWN_ENEMY",
            EngineError::UnknownCard(_) => "ENGINE_UNKNOWN_CARD",
            EngineError::InvalidRound(_) => "ENGINE_INVALID_ROUND",
        }
    }
}
