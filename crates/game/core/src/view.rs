//! Read-only mirror of engine state used by the orchestration layer.

use crate::ids::{CardId, EncounterId, EnemyId};
use crate::phase::Phase;

/// What an enemy plans to do in the coming resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intent {
    pub enemy: EnemyId,
    pub kind: IntentKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntentKind {
    Attack { damage: u32 },
    Defend { armor: u32 },
    Ritual { resonance: f32 },
    Summon,
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentKind::Attack { damage } => write!(f, "attack {damage}"),
            IntentKind::Defend { armor } => write!(f, "defend {armor}"),
            IntentKind::Ritual { resonance } => write!(f, "ritual {resonance:+.1}"),
            IntentKind::Summon => f.write_str("summon"),
        }
    }
}

/// One option of a pending fate choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FateOption {
    /// Restore hit points.
    Mend(u32),
    /// Gain faith.
    Kindle(u32),
    /// Deal damage to the named enemy.
    Smite { enemy: EnemyId, damage: u32 },
}

/// A choice the hero must resolve before anything else.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FateChoice {
    pub options: Vec<FateOption>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnemyStatus {
    Active,
    Killed,
    Pacified,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyView {
    pub id: EnemyId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub will: u32,
    pub max_will: u32,
    pub shield: u32,
    pub status: EnemyStatus,
}

impl EnemyView {
    pub fn is_active(&self) -> bool {
        self.status == EnemyStatus::Active
    }

    /// Spirit attacks only work on enemies with a will pool.
    pub fn has_spirit(&self) -> bool {
        self.max_will > 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroView {
    pub hp: u32,
    pub max_hp: u32,
    pub faith: u32,
    pub armor_bonus: u32,
}

/// Snapshot of the encounter as reported by the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterView {
    pub encounter: EncounterId,
    pub phase: Phase,
    pub round: u32,
    pub hero: HeroView,
    pub enemies: Vec<EnemyView>,
    pub hand: Vec<CardId>,
    pub draw_pile_len: usize,
    pub intents: Vec<Intent>,
    pub resonance: f32,
    pub fate_choice: Option<FateChoice>,
    pub fled: bool,
}

impl EncounterView {
    pub fn enemy(&self, id: EnemyId) -> Option<&EnemyView> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &EnemyView> {
        self.enemies.iter().filter(|enemy| enemy.is_active())
    }

    /// Encounter-end check: hero down, hero escaped, or nobody left to fight.
    pub fn is_over(&self) -> bool {
        self.hero.hp == 0 || self.fled || self.active_enemies().next().is_none()
    }

    pub fn intent_for(&self, enemy: EnemyId) -> Option<&Intent> {
        self.intents.iter().find(|intent| intent.enemy == enemy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: u32, status: EnemyStatus) -> EnemyView {
        EnemyView {
            id: EnemyId(id),
            name: format!("shade {id}"),
            hp: 5,
            max_hp: 5,
            will: 0,
            max_will: 0,
            shield: 0,
            status,
        }
    }

    fn view(enemies: Vec<EnemyView>) -> EncounterView {
        EncounterView {
            encounter: EncounterId(1),
            phase: Phase::PlayerAction,
            round: 1,
            hero: HeroView {
                hp: 10,
                max_hp: 10,
                faith: 0,
                armor_bonus: 0,
            },
            enemies,
            hand: Vec::new(),
            draw_pile_len: 0,
            intents: Vec::new(),
            resonance: 0.0,
            fate_choice: None,
            fled: false,
        }
    }

    #[test]
    fn over_when_no_enemy_active() {
        let mut view = view(vec![
            enemy(1, EnemyStatus::Killed),
            enemy(2, EnemyStatus::Active),
        ]);
        assert!(!view.is_over());
        view.enemies[1].status = EnemyStatus::Pacified;
        assert!(view.is_over());
    }

    #[test]
    fn over_when_hero_down_or_fled() {
        let mut down = view(vec![enemy(1, EnemyStatus::Active)]);
        down.hero.hp = 0;
        assert!(down.is_over());

        let mut fled = view(vec![enemy(1, EnemyStatus::Active)]);
        fled.fled = true;
        assert!(fled.is_over());
    }
}
