//! Final outcome of an encounter and the transaction it commits.

use std::collections::BTreeMap;

use crate::card::FateDeckState;
use crate::ids::{CardId, EncounterId, EnemyId};

/// How the enemies were overcome.
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
pub enum VictoryKind {
    Killed,
    Pacified,
    Mixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterOutcome {
    Victory(VictoryKind),
    Defeat,
    Escaped,
}

impl EncounterOutcome {
    pub const fn is_victory(&self) -> bool {
        matches!(self, EncounterOutcome::Victory(_))
    }
}

impl std::fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncounterOutcome::Victory(kind) => write!(f, "victory ({kind})"),
            EncounterOutcome::Defeat => f.write_str("defeat"),
            EncounterOutcome::Escaped => f.write_str("escaped"),
        }
    }
}

/// Fate of a single enemy when the encounter closed.
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
pub enum EntityOutcome {
    Killed,
    Pacified,
    Alive,
    Escaped,
}

/// Everything an encounter is allowed to change in the campaign.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterTransaction {
    pub hp_delta: i32,
    pub faith_delta: i32,
    pub resonance_delta: f32,
    pub world_flags: BTreeMap<String, bool>,
    pub loot_cards: Vec<CardId>,
    /// Fate deck to carry forward; `None` leaves the campaign deck untouched.
    pub updated_fate_deck: Option<FateDeckState>,
}

/// Produced exactly once per encounter by
/// [`CombatEngine::finish_encounter`](crate::CombatEngine::finish_encounter).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterResult {
    pub encounter: EncounterId,
    pub outcome: EncounterOutcome,
    pub transaction: EncounterTransaction,
    pub per_entity: BTreeMap<EnemyId, EntityOutcome>,
}

impl EncounterResult {
    /// Derives the victory kind from per-enemy outcomes.
    ///
    /// Returns `None` while any enemy is still alive.
    pub fn victory_kind(per_entity: &BTreeMap<EnemyId, EntityOutcome>) -> Option<VictoryKind> {
        let mut killed = false;
        let mut pacified = false;
        for outcome in per_entity.values() {
            match outcome {
                EntityOutcome::Killed => killed = true,
                EntityOutcome::Pacified => pacified = true,
                EntityOutcome::Alive | EntityOutcome::Escaped => return None,
            }
        }
        match (killed, pacified) {
            (true, true) => Some(VictoryKind::Mixed),
            (true, false) => Some(VictoryKind::Killed),
            (false, true) => Some(VictoryKind::Pacified),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn victory_kind_reflects_mix_of_outcomes() {
        let mut per_entity = BTreeMap::new();
        per_entity.insert(EnemyId(1), EntityOutcome::Killed);
        assert_eq!(
            EncounterResult::victory_kind(&per_entity),
            Some(VictoryKind::Killed)
        );

        per_entity.insert(EnemyId(2), EntityOutcome::Pacified);
        assert_eq!(
            EncounterResult::victory_kind(&per_entity),
            Some(VictoryKind::Mixed)
        );

        per_entity.insert(EnemyId(3), EntityOutcome::Alive);
        assert_eq!(EncounterResult::victory_kind(&per_entity), None);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            EncounterOutcome::Victory(VictoryKind::Pacified).to_string(),
            "victory (pacified)"
        );
        assert_eq!(EncounterOutcome::Escaped.to_string(), "escaped");
    }
}
