//! Runtime orchestration for turn-based encounters.
//!
//! This crate sits between the combat engine in `game-core` and whatever
//! presents the encounter. [`EncounterCoordinator`] drives the phase cycle
//! of a single encounter, suspends it while fate reveals are dramatized and
//! hands the result to the campaign exactly once through
//! [`ResultReconciler`].
//!
//! Modules are organized by responsibility:
//! - [`coordinator`] hosts the phase loop and its builder
//! - [`campaign`] holds persistent state and reconciliation
//! - [`api`] exposes the error types downstream clients match on
//! - [`events`] provides the topic-based event bus
//! - [`persistence`] encodes mid-combat saves
pub mod api;
pub mod campaign;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod persistence;

pub use api::{CoordinatorError, InitError, ReconcileError, SaveError};
pub use campaign::{
    Campaign, CampaignContent, CampaignSink, CampaignSource, CampaignState, CommitOutcome,
    CommitSummary, EncounterPlan, EncounterSlot, HeroRecord, ResultReconciler, StaticContent,
};
pub use config::RuntimeConfig;
pub use coordinator::{
    CombatLog, CoordinatorBuilder, EncounterCoordinator, Feedback, FeedbackKind, LogEntry,
    LogLevel, MulliganGate, MulliganSession, PhaseStep, Rejection, RevealRequest, RevealToken, Submission,
};
pub use events::{
    CampaignEvent, CombatEvent, Event, EventBus, FeedbackEvent, PhaseEvent, RevealEvent, Topic,
};
pub use persistence::CoordinatorSave;
