//! Atomic state deltas emitted by combat engines.

use crate::card::{FateCard, Keyword};
use crate::context::EnemyAbility;
use crate::ids::{CardId, EnemyId};
use crate::outcome::EncounterOutcome;
use crate::view::FateChoice;

/// A single observable effect of an engine call.
///
/// Engines report everything they do as an ordered list of these; the
/// coordinator never inspects engine internals.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterStateChange {
    EnemyHpChanged {
        enemy: EnemyId,
        delta: i32,
        new_value: u32,
    },
    EnemyWpChanged {
        enemy: EnemyId,
        delta: i32,
        new_value: u32,
    },
    PlayerHpChanged {
        delta: i32,
        new_value: u32,
    },
    EnemyKilled {
        enemy: EnemyId,
    },
    EnemyPacified {
        enemy: EnemyId,
    },
    /// A fate card was consulted. `card` is `None` when the deck was empty
    /// and the draw resolved with a neutral value.
    FateDraw {
        card: Option<FateCard>,
        value: i32,
        suit_match: bool,
    },
    ResonanceShifted {
        delta: f32,
        new_value: f32,
    },
    CardPlayed {
        card: CardId,
    },
    FaithChanged {
        delta: i32,
        new_value: u32,
    },
    FleeAttempt {
        success: bool,
    },
    CardDrawn {
        card: CardId,
    },
    EncounterEnded {
        outcome: EncounterOutcome,
    },
    WeaknessTriggered {
        enemy: EnemyId,
        keyword: Keyword,
    },
    ResistanceTriggered {
        enemy: EnemyId,
        keyword: Keyword,
    },
    AbilityTriggered {
        enemy: EnemyId,
        ability: EnemyAbility,
    },
    EnemySummoned {
        enemy: EnemyId,
    },
    FateChoicePending {
        choice: FateChoice,
    },
    PlayerDefended {
        armor_bonus: u32,
    },
    RageShieldApplied {
        enemy: EnemyId,
        amount: u32,
    },
}

impl EncounterStateChange {
    /// One-line description for the combat log.
    pub fn describe(&self) -> String {
        use EncounterStateChange::*;
        match self {
            EnemyHpChanged {
                enemy,
                delta,
                new_value,
            } if *delta < 0 => format!("{enemy} takes {} damage ({new_value} hp left)", -delta),
            EnemyHpChanged {
                enemy, new_value, ..
            } => format!("{enemy} is at {new_value} hp"),
            EnemyWpChanged {
                enemy,
                delta,
                new_value,
            } if *delta < 0 => format!("{enemy} loses {} will ({new_value} left)", -delta),
            EnemyWpChanged {
                enemy, new_value, ..
            } => format!("{enemy} steadies at {new_value} will"),
            PlayerHpChanged { delta, new_value } if *delta < 0 => {
                format!("you take {} damage ({new_value} hp left)", -delta)
            }
            PlayerHpChanged { delta, new_value } => {
                format!("you recover {delta} hp ({new_value} hp)")
            }
            EnemyKilled { enemy } => format!("{enemy} is slain"),
            EnemyPacified { enemy } => format!("{enemy} is pacified"),
            FateDraw {
                card: Some(card),
                value,
                suit_match,
            } => {
                let matched = if *suit_match { ", suit match" } else { "" };
                let critical = if card.critical { " critical" } else { "" };
                format!("fate reveals {}{critical} {value:+}{matched}", card.suit)
            }
            FateDraw { card: None, .. } => "the fate deck is empty".to_string(),
            ResonanceShifted { delta, new_value } => {
                format!("resonance shifts by {delta:+.1} to {new_value:.1}")
            }
            CardPlayed { card } => format!("{card} is played"),
            FaithChanged { delta, new_value } => {
                format!("faith {delta:+} ({new_value})")
            }
            FleeAttempt { success: true } => "you escape".to_string(),
            FleeAttempt { success: false } => "you fail to escape".to_string(),
            CardDrawn { card } => format!("you draw {card}"),
            EncounterEnded { outcome } => format!("the encounter ends: {outcome}"),
            WeaknessTriggered { enemy, keyword } => {
                format!("{enemy} is weak to {keyword}")
            }
            ResistanceTriggered { enemy, keyword } => {
                format!("{enemy} resists {keyword}")
            }
            AbilityTriggered { enemy, ability } => format!("{enemy} uses {ability}"),
            EnemySummoned { enemy } => format!("{enemy} is summoned"),
            FateChoicePending { choice } => {
                format!("fate offers a choice of {}", choice.options.len())
            }
            PlayerDefended { armor_bonus } => format!("you brace (+{armor_bonus} armor)"),
            RageShieldApplied { enemy, amount } => {
                format!("{enemy} rages behind a {amount} point shield")
            }
        }
    }

    /// Whether this change reveals a fate card that must be dramatized.
    pub fn is_reveal(&self) -> bool {
        matches!(self, EncounterStateChange::FateDraw { card: Some(_), .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;
    use crate::ids::FateCardId;

    #[test]
    fn damage_reads_as_positive_amount() {
        let change = EncounterStateChange::EnemyHpChanged {
            enemy: EnemyId(2),
            delta: -4,
            new_value: 6,
        };
        assert_eq!(change.describe(), "enemy#2 takes 4 damage (6 hp left)");
    }

    #[test]
    fn only_drawn_cards_are_reveals() {
        let drawn = EncounterStateChange::FateDraw {
            card: Some(FateCard::new(FateCardId(1), 2, Suit::Light)),
            value: 2,
            suit_match: true,
        };
        let empty = EncounterStateChange::FateDraw {
            card: None,
            value: 0,
            suit_match: false,
        };
        assert!(drawn.is_reveal());
        assert!(!empty.is_reveal());
        assert_eq!(drawn.describe(), "fate reveals light +2, suit match");
    }
}
