//! Deterministic encounter data model shared by the runtime and clients.
//!
//! `game-core` defines what an encounter is (context, phases, commands, state
//! changes, results) and the [`CombatEngine`] boundary behind which combat
//! rules live. It performs no I/O and does not log; the orchestration layer
//! in `runtime` drives it.
pub mod action;
pub mod card;
pub mod change;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod phase;
pub mod stats;
pub mod view;

pub use action::{ActionCommand, ActionErrorKind, ActionResult, CardUseMode};
pub use card::{Card, CardEffect, FateCard, FateDeckState, Keyword, Suit};
pub use change::EncounterStateChange;
pub use config::RuleConfig;
pub use context::{
    ContextError, EncounterContext, EnemyAbility, EnemySnapshot, HeroSnapshot, Modifier,
};
pub use engine::{
    BaselineEngine, BaselineEngineFactory, CombatEngine, EncounterSaveState, EnemyState,
    EngineError, EngineFactory,
};
pub use error::{ErrorSeverity, GameError};
pub use ids::{CardId, EncounterId, EnemyId, FateCardId};
pub use outcome::{
    EncounterOutcome, EncounterResult, EncounterTransaction, EntityOutcome, VictoryKind,
};
pub use phase::Phase;
pub use stats::CombatStats;
pub use view::{
    EncounterView, EnemyStatus, EnemyView, FateChoice, FateOption, HeroView, Intent, IntentKind,
};
