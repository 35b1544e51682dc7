//! Per-encounter combat statistics.
//!
//! Counters are derived purely from the ordered stream of
//! [`EncounterStateChange`]s, except `turns_played` which the coordinator
//! bumps when a player turn completes. Every counter saturates and never
//! decreases.

use crate::change::EncounterStateChange;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub turns_played: u32,
    pub total_damage_dealt: u32,
    pub total_damage_taken: u32,
    pub cards_played: u32,
    pub fate_cards_drawn: u32,
}

impl CombatStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one change into the counters.
    pub fn record(&mut self, change: &EncounterStateChange) {
        match change {
            EncounterStateChange::EnemyHpChanged { delta, .. } if *delta < 0 => {
                self.total_damage_dealt = self.total_damage_dealt.saturating_add(delta.unsigned_abs());
            }
            EncounterStateChange::PlayerHpChanged { delta, .. } if *delta < 0 => {
                self.total_damage_taken = self.total_damage_taken.saturating_add(delta.unsigned_abs());
            }
            EncounterStateChange::CardPlayed { .. } => {
                self.cards_played = self.cards_played.saturating_add(1);
            }
            EncounterStateChange::FateDraw { card: Some(_), .. } => {
                self.fate_cards_drawn = self.fate_cards_drawn.saturating_add(1);
            }
            _ => {}
        }
    }

    pub fn complete_turn(&mut self) {
        self.turns_played = self.turns_played.saturating_add(1);
    }

    /// Returns true if no counter in `self` is below its value in `earlier`.
    pub fn dominates(&self, earlier: &CombatStats) -> bool {
        self.turns_played >= earlier.turns_played
            && self.total_damage_dealt >= earlier.total_damage_dealt
            && self.total_damage_taken >= earlier.total_damage_taken
            && self.cards_played >= earlier.cards_played
            && self.fate_cards_drawn >= earlier.fate_cards_drawn
    }
}
