//! Player commands and the engine's answer to them.

mod error;

pub use error::ActionErrorKind;

use crate::card::Card;
use crate::change::EncounterStateChange;
use crate::ids::{CardId, EnemyId};

/// How a card from hand is committed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CardUseMode {
    /// Resolve the card's own effect.
    Play,
    /// Attack with the card's power added to the blow.
    Strike,
    /// Spirit attack with the card's power added.
    Influence,
    /// Discard the card for faith; costs nothing.
    Sacrifice,
}

/// Canonical player command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCommand {
    Attack {
        target: EnemyId,
    },
    SpiritAttack {
        target: EnemyId,
    },
    Wait,
    Flee,
    UseCard {
        card: CardId,
        target: Option<EnemyId>,
        mode: CardUseMode,
    },
    Mulligan {
        cards: Vec<CardId>,
    },
    ResolveFateChoice {
        option: usize,
    },
}

impl ActionCommand {
    /// Enemy targeted by this command, if any.
    pub fn target(&self) -> Option<EnemyId> {
        match self {
            ActionCommand::Attack { target } | ActionCommand::SpiritAttack { target } => {
                Some(*target)
            }
            ActionCommand::UseCard { target, .. } => *target,
            _ => None,
        }
    }

    /// Faith required to issue this command with the given card definitions.
    ///
    /// Returns `None` when the command references a card with no definition.
    pub fn cost_in(&self, cards: &[Card]) -> Option<u32> {
        match self {
            ActionCommand::UseCard { mode: CardUseMode::Sacrifice, .. } => Some(0),
            ActionCommand::UseCard { card, .. } => cards
                .iter()
                .find(|definition| definition.id == *card)
                .map(|definition| definition.cost),
            _ => Some(0),
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            ActionCommand::Attack { .. } => "attack",
            ActionCommand::SpiritAttack { .. } => "spirit_attack",
            ActionCommand::Wait => "wait",
            ActionCommand::Flee => "flee",
            ActionCommand::UseCard { .. } => "use_card",
            ActionCommand::Mulligan { .. } => "mulligan",
            ActionCommand::ResolveFateChoice { .. } => "resolve_fate_choice",
        }
    }
}

/// Outcome of one engine call.
///
/// `changes` is the single channel through which engine effects become
/// observable; consumers must apply them in order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    pub success: bool,
    pub error: Option<ActionErrorKind>,
    pub changes: Vec<EncounterStateChange>,
}

impl ActionResult {
    pub fn ok(changes: Vec<EncounterStateChange>) -> Self {
        Self {
            success: true,
            error: None,
            changes,
        }
    }

    pub fn rejected(error: ActionErrorKind) -> Self {
        Self {
            success: false,
            error: Some(error),
            changes: Vec::new(),
        }
    }

    /// Fate cards revealed by this call, in order.
    pub fn fate_draws(&self) -> impl Iterator<Item = &EncounterStateChange> {
        self.changes
            .iter()
            .filter(|change| matches!(change, EncounterStateChange::FateDraw { card: Some(_), .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardEffect;

    fn cards() -> Vec<Card> {
        vec![Card::new(CardId(1), "Smite", 3, 2, CardEffect::Damage(4))]
    }

    #[test]
    fn cost_comes_from_card_definition() {
        let play = ActionCommand::UseCard {
            card: CardId(1),
            target: Some(EnemyId(1)),
            mode: CardUseMode::Strike,
        };
        assert_eq!(play.cost_in(&cards()), Some(3));
    }

    #[test]
    fn sacrifice_is_free() {
        let sacrifice = ActionCommand::UseCard {
            card: CardId(1),
            target: None,
            mode: CardUseMode::Sacrifice,
        };
        assert_eq!(sacrifice.cost_in(&cards()), Some(0));
    }

    #[test]
    fn unknown_card_has_no_cost() {
        let play = ActionCommand::UseCard {
            card: CardId(9),
            target: None,
            mode: CardUseMode::Play,
        };
        assert_eq!(play.cost_in(&cards()), None);
        assert_eq!(ActionCommand::Wait.cost_in(&cards()), Some(0));
    }
}
