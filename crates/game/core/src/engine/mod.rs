//! The combat engine boundary.
//!
//! The orchestration layer treats combat rules as an opaque collaborator
//! behind [`CombatEngine`]. Every effect of an engine call is reported as an
//! ordered list of [`EncounterStateChange`](crate::EncounterStateChange)s
//! inside an [`ActionResult`]; nothing else about the engine is observable
//! except through [`CombatEngine::view`].
//!
//! [`BaselineEngine`] is a small deterministic implementation used by the
//! demo client and the tests.

mod baseline;
pub mod damage;
mod errors;
pub mod rng;

pub use baseline::{BaselineEngine, BaselineEngineFactory};
pub use errors::EngineError;

use crate::action::{ActionCommand, ActionResult};
use crate::card::FateDeckState;
use crate::context::{EncounterContext, EnemySnapshot};
use crate::ids::{CardId, EnemyId};
use crate::outcome::EncounterResult;
use crate::phase::Phase;
use crate::view::{EncounterView, EnemyStatus, FateChoice, Intent};

/// Combat rules for one encounter.
pub trait CombatEngine {
    /// Executes a player command. Rejected commands mutate nothing.
    fn perform_action(&mut self, command: &ActionCommand) -> ActionResult;

    /// Moves the engine to the nominal successor phase and reports it.
    fn advance_phase(&mut self) -> Phase;

    /// Computes the intent of one enemy for the current round.
    ///
    /// Returns `None` for enemies that are no longer active.
    fn generate_intent(&mut self, enemy: EnemyId) -> Option<Intent>;

    /// Lets one enemy act on its intent.
    fn resolve_enemy_action(&mut self, enemy: EnemyId) -> ActionResult;

    /// Closes the encounter and produces its result.
    fn finish_encounter(&mut self) -> EncounterResult;

    fn view(&self) -> EncounterView;

    fn create_save_state(&self) -> EncounterSaveState;
}

/// Builds engines for new or restored encounters.
pub trait EngineFactory {
    type Engine: CombatEngine;

    fn create(&self, context: &EncounterContext) -> Result<Self::Engine, EngineError>;

    fn restore(&self, save: &EncounterSaveState) -> Result<Self::Engine, EngineError>;
}

/// Mutable state of one enemy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyState {
    /// Current values; `hp` and `will` evolve, the rest is fixed.
    pub snapshot: EnemySnapshot,
    pub status: EnemyStatus,
    /// Absorbs damage until the round ends.
    pub shield: u32,
    /// Rage and summon trigger at most once.
    pub ability_used: bool,
}

impl EnemyState {
    pub fn new(snapshot: EnemySnapshot) -> Self {
        let status = if snapshot.hp == 0 {
            EnemyStatus::Killed
        } else {
            EnemyStatus::Active
        };
        Self {
            snapshot,
            status,
            shield: 0,
            ability_used: false,
        }
    }

    pub fn id(&self) -> EnemyId {
        self.snapshot.id
    }

    pub fn is_active(&self) -> bool {
        self.status == EnemyStatus::Active
    }
}

/// Everything needed to rebuild an engine mid-encounter.
///
/// Opaque to the orchestration layer, which only passes it through.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterSaveState {
    pub context: EncounterContext,
    pub hero_hp: u32,
    pub faith: u32,
    pub armor_bonus: u32,
    pub enemies: Vec<EnemyState>,
    pub hand: Vec<CardId>,
    pub draw_pile: Vec<CardId>,
    pub fate_deck: FateDeckState,
    pub rng_state: u64,
    pub world_resonance: f32,
    pub round: u32,
    pub phase: Phase,
    pub intents: Vec<Intent>,
    pub fate_choice: Option<FateChoice>,
    pub fled: bool,
    pub mulligan_done: bool,
    pub next_enemy_id: u32,
}
