//! Immutable encounter input built by the campaign.

use std::collections::BTreeSet;

use crate::card::{Card, FateDeckState, Keyword};
use crate::config::RuleConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::ids::{CardId, EncounterId, EnemyId};

/// Hero attributes at encounter start.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroSnapshot {
    pub hp: u32,
    pub max_hp: u32,
    pub strength: u32,
    pub wisdom: u32,
    pub armor: u32,
    pub faith: u32,
}

/// Special behaviour an enemy may exhibit during resolution.
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
pub enum EnemyAbility {
    /// Raises a shield the first time it drops to half health.
    Rage,
    /// Calls a lesser copy of itself once, from the second round on.
    Summon,
    /// Raises a shield when defending.
    Guard,
}

/// Enemy attributes at encounter start.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemySnapshot {
    pub id: EnemyId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    /// Spirit pool; an enemy with `max_will == 0` cannot be pacified.
    pub will: u32,
    pub max_will: u32,
    pub power: u32,
    pub armor: u32,
    pub weakness: Option<Keyword>,
    pub resistance: Option<Keyword>,
    pub abilities: Vec<EnemyAbility>,
    pub loot: Vec<CardId>,
}

impl EnemySnapshot {
    /// Plain enemy with no spirit pool, abilities or loot.
    pub fn new(id: EnemyId, name: impl Into<String>, hp: u32, power: u32, armor: u32) -> Self {
        Self {
            id,
            name: name.into(),
            hp,
            max_hp: hp,
            will: 0,
            max_will: 0,
            power,
            armor,
            weakness: None,
            resistance: None,
            abilities: Vec::new(),
            loot: Vec::new(),
        }
    }

    pub fn with_will(mut self, will: u32) -> Self {
        self.will = will;
        self.max_will = will;
        self
    }

    pub fn with_ability(mut self, ability: EnemyAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn with_weakness(mut self, keyword: Keyword) -> Self {
        self.weakness = Some(keyword);
        self
    }

    pub fn with_resistance(mut self, keyword: Keyword) -> Self {
        self.resistance = Some(keyword);
        self
    }

    pub fn with_loot(mut self, loot: Vec<CardId>) -> Self {
        self.loot = loot;
        self
    }

    pub fn has_ability(&self, ability: EnemyAbility) -> bool {
        self.abilities.contains(&ability)
    }
}

/// Encounter-wide modifier applied by the engine at setup.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    /// Adds to hero strength.
    Strength(i32),
    /// Adds to hero armor.
    Armor(i32),
    /// Shifts every fate card value drawn by the hero.
    FateBias(i32),
}

/// Immutable input of one encounter.
///
/// Created once by the campaign at encounter start and never mutated; the
/// engine copies whatever it needs to evolve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterContext {
    pub id: EncounterId,
    pub hero: HeroSnapshot,
    pub enemies: Vec<EnemySnapshot>,
    pub fate_deck: FateDeckState,
    pub modifiers: Vec<Modifier>,
    pub rules: RuleConfig,
    pub seed: u64,
    pub world_resonance: f32,
    /// Definitions for every card id in `hand` and `draw_pile`.
    pub cards: Vec<Card>,
    pub hand: Vec<CardId>,
    pub draw_pile: Vec<CardId>,
}

impl EncounterContext {
    /// Looks up a card definition.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Checks the preconditions every engine relies on.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.enemies.is_empty() {
            return Err(ContextError::NoEnemies);
        }
        if self.hero.hp == 0 {
            return Err(ContextError::HeroDefeated);
        }

        let mut seen = BTreeSet::new();
        for enemy in &self.enemies {
            if !seen.insert(enemy.id) {
                return Err(ContextError::DuplicateEnemy(enemy.id));
            }
        }

        if let Some(unknown) = self
            .hand
            .iter()
            .chain(self.draw_pile.iter())
            .find(|id| self.card(**id).is_none())
        {
            return Err(ContextError::UnknownCard(*unknown));
        }

        Ok(())
    }
}

/// Reasons an [`EncounterContext`] cannot start an encounter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContextError {
    #[error("encounter has no enemies")]
    NoEnemies,

    #[error("hero enters the encounter with no hit points")]
    HeroDefeated,

    #[error("enemy id {0} appears more than once")]
    DuplicateEnemy(EnemyId),

    #[error("card {0} has no definition in the encounter")]
    UnknownCard(CardId),
}

impl GameError for ContextError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ContextError::NoEnemies | ContextError::HeroDefeated => ErrorSeverity::Fatal,
            ContextError::DuplicateEnemy(_) | ContextError::UnknownCard(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ContextError::NoEnemies => "CONTEXT_NO_ENEMIES",
            ContextError::HeroDefeated => "CONTEXT_HERO_DEFEATED",
            ContextError::DuplicateEnemy(_) => "CONTEXT_DUPLICATE_ENEMY",
            ContextError::UnknownCard(_) => "CONTEXT_UNKNOWN_CARD",
        }
    }
}
