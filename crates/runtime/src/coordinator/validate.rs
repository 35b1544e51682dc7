//! Local checks run before a command reaches the engine.

use game_core::{ActionCommand, Card, CardId, EncounterView, EnemyId};
use serde::{Deserialize, Serialize};

/// Why the coordinator refused a command without consulting the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Target missing, killed or pacified.
    InvalidTarget(EnemyId),
    CardNotInHand(CardId),
    InsufficientFaith { required: u32, available: u32 },
    /// A fate choice is pending and must be resolved first.
    FateChoiceRequired,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::InvalidTarget(enemy) => write!(f, "{enemy} cannot be targeted"),
            Rejection::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            Rejection::InsufficientFaith {
                required,
                available,
            } => write!(f, "not enough faith ({available}/{required})"),
            Rejection::FateChoiceRequired => f.write_str("resolve the fate choice first"),
        }
    }
}

pub(crate) fn check(
    command: &ActionCommand,
    view: &EncounterView,
    cards: &[Card],
) -> Result<(), Rejection> {
    if view.fate_choice.is_some() && !matches!(command, ActionCommand::ResolveFateChoice { .. }) {
        return Err(Rejection::FateChoiceRequired);
    }

    if let ActionCommand::UseCard { card, .. } = command {
        if !view.hand.contains(card) {
            return Err(Rejection::CardNotInHand(*card));
        }
        let required = command
            .cost_in(cards)
            .ok_or(Rejection::CardNotInHand(*card))?;
        if required > view.hero.faith {
            return Err(Rejection::InsufficientFaith {
                required,
                available: view.hero.faith,
            });
        }
    }

    if let Some(target) = command.target()
        && !view.enemy(target).is_some_and(|enemy| enemy.is_active())
    {
        return Err(Rejection::InvalidTarget(target));
    }

    Ok(())
}
