//! Headless encounter client.
//!
//! # Architecture
//!
//! ```text
//! Client (composition root)
//!   ├─→ Campaign (persistent state + content, reconciles results)
//!   ├─→ EncounterCoordinator (phase loop over the baseline engine)
//!   └─→ PhaseDrivenCombat scene, driven by a scripted Pilot
//! ```
//!
//! Each encounter is opened on the campaign, played through a scene variant
//! and committed back exactly once, or abandoned when it hits the round
//! limit.

mod builder;
pub mod config;
pub mod content;
pub mod pilot;

pub use builder::ClientBuilder;
pub use config::ClientConfig;

use std::collections::VecDeque;

use anyhow::Result;
use client_frontend_core::{DispositionCombat, GestureInterpreter, PhaseDrivenCombat, RitualCombat, ZoneResolver};
use game_core::{
    BaselineEngineFactory, CombatEngine, CombatStats, EncounterId, EncounterOutcome, EncounterResult,
};
use runtime::{
    Campaign, CampaignSink, CommitOutcome, CoordinatorBuilder, EncounterPlan, LogEntry, StaticContent,
};

use pilot::Pilot;

/// Scene layout an encounter is presented with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Ritual,
    Disposition,
}

/// What happened in one encounter, for printing.
#[derive(Debug, Clone)]
pub struct EncounterReport {
    pub encounter: EncounterId,
    pub variant: Variant,
    /// `None` when the encounter was abandoned at the round limit.
    pub outcome: Option<EncounterOutcome>,
    pub rounds: u32,
    pub stats: CombatStats,
    pub log: Vec<LogEntry>,
    pub commit: Option<CommitOutcome>,
}

pub struct Client {
    config: ClientConfig,
    campaign: Campaign<StaticContent>,
    queue: VecDeque<(EncounterPlan, Variant)>,
    last_result: Option<EncounterResult>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn campaign(&self) -> &Campaign<StaticContent> {
        &self.campaign
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Plays every queued encounter in order. Stops early once the hero has
    /// fallen.
    pub fn run(&mut self) -> Result<Vec<EncounterReport>> {
        let mut reports = Vec::new();
        while let Some((plan, variant)) = self.queue.pop_front() {
            if self.campaign.state.hero.hp == 0 {
                tracing::warn!(remaining = self.queue.len() + 1, "hero has fallen, campaign over");
                break;
            }
            reports.push(self.run_encounter(plan, variant)?);
        }
        Ok(reports)
    }

    pub fn run_encounter(&mut self, plan: EncounterPlan, variant: Variant) -> Result<EncounterReport> {
        let encounter = self.campaign.begin_encounter(plan)?;
        let coordinator = CoordinatorBuilder::default()
            .config(self.config.runtime.clone())
            .build_from_campaign(&mut self.campaign, &BaselineEngineFactory)?;
        tracing::info!(%encounter, ?variant, "encounter opened");

        match variant {
            Variant::Ritual => {
                let mut scene = RitualCombat::ritual(coordinator, &self.config.frontend);
                self.play(encounter, variant, &mut scene)
            }
            Variant::Disposition => {
                let mut scene = DispositionCombat::disposition(coordinator, &self.config.frontend);
                self.play(encounter, variant, &mut scene)
            }
        }
    }

    fn play<I, Z, E>(
        &mut self,
        encounter: EncounterId,
        variant: Variant,
        scene: &mut PhaseDrivenCombat<I, Z, E>,
    ) -> Result<EncounterReport>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        let pilot = Pilot::new(self.config.frame, self.config.max_rounds);
        let result = pilot.play(scene)?;

        let coordinator = scene.coordinator();
        let mut report = EncounterReport {
            encounter,
            variant,
            outcome: result.as_ref().map(|result| result.outcome),
            rounds: coordinator.round(),
            stats: *coordinator.stats(),
            log: coordinator.log().iter().cloned().collect(),
            commit: None,
        };

        match result {
            Some(result) => {
                report.commit = Some(self.campaign.apply_encounter_result(&result)?);
                self.last_result = Some(result);
            }
            None => self.campaign.abandon_encounter(encounter)?,
        }
        Ok(report)
    }

    /// Sends the last committed result again; the campaign must ignore it.
    pub fn resubmit_last(&mut self) -> Result<Option<CommitOutcome>> {
        let Some(result) = self.last_result.as_ref() else {
            return Ok(None);
        };
        Ok(Some(self.campaign.apply_encounter_result(result)?))
    }
}
