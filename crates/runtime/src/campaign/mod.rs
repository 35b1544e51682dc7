//! Persistent campaign state and its encounter boundary.
//!
//! The campaign is read once to build an [`EncounterContext`] and written
//! once, through [`ResultReconciler`], when the encounter is over. An open
//! [`EncounterSlot`] marks the encounter in between. An encounter that is
//! torn down before it finishes is abandoned instead: its slot closes with
//! no transaction and any later result for it is refused.

mod reconciler;

pub use reconciler::{CommitOutcome, CommitSummary, ResultReconciler};

use std::collections::{BTreeMap, BTreeSet};

use game_core::{
    Card, CardId, EncounterContext, EncounterId, EncounterOutcome, EncounterResult, EnemySnapshot,
    FateDeckState, HeroSnapshot, Modifier, RuleConfig,
};

use crate::api::ReconcileError;
use crate::events::{CampaignEvent, EventBus};

/// Supplies the context of the encounter the campaign wants to run next.
pub trait CampaignSource {
    fn make_encounter_context(&mut self) -> Option<EncounterContext>;
}

/// Accepts the result of a finished encounter.
pub trait CampaignSink {
    fn apply_encounter_result(
        &mut self,
        result: &EncounterResult,
    ) -> Result<CommitOutcome, ReconcileError>;
}

/// Static game content the campaign draws on.
pub trait CampaignContent {
    /// Deck used when the campaign has never carried one forward.
    fn default_fate_deck(&self) -> FateDeckState;

    fn card(&self, id: CardId) -> Option<&Card>;
}

impl<C: CampaignContent + ?Sized> CampaignContent for &C {
    fn default_fate_deck(&self) -> FateDeckState {
        (**self).default_fate_deck()
    }

    fn card(&self, id: CardId) -> Option<&Card> {
        (**self).card(id)
    }
}

/// In-memory content tables.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    pub cards: Vec<Card>,
    pub fate_deck: FateDeckState,
}

impl CampaignContent for StaticContent {
    fn default_fate_deck(&self) -> FateDeckState {
        self.fate_deck.clone()
    }

    fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }
}

/// Persistent hero attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRecord {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub strength: u32,
    pub wisdom: u32,
    pub armor: u32,
    pub faith: u32,
    /// Persistent card pool, in deck order.
    pub deck: Vec<CardId>,
}

impl HeroRecord {
    fn snapshot(&self) -> HeroSnapshot {
        HeroSnapshot {
            hp: self.hp,
            max_hp: self.max_hp,
            strength: self.strength,
            wisdom: self.wisdom,
            armor: self.armor,
            faith: self.faith,
        }
    }
}

/// What the campaign wants the next encounter to contain.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterPlan {
    pub enemies: Vec<EnemySnapshot>,
    pub modifiers: Vec<Modifier>,
    pub rules: RuleConfig,
}

impl EncounterPlan {
    pub fn new(enemies: Vec<EnemySnapshot>) -> Self {
        Self {
            enemies,
            modifiers: Vec::new(),
            rules: RuleConfig::default(),
        }
    }

    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// The encounter currently in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterSlot {
    pub id: EncounterId,
    pub plan: EncounterPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignState {
    pub hero: HeroRecord,
    pub world_resonance: f32,
    /// `None` until the first encounter carries a deck forward.
    pub fate_deck: Option<FateDeckState>,
    pub world_flags: BTreeMap<String, bool>,
    pub seed: u64,
    pub history: Vec<(EncounterId, EncounterOutcome)>,
    open: Option<EncounterSlot>,
    applied: BTreeSet<EncounterId>,
    abandoned: BTreeSet<EncounterId>,
    next_encounter: u64,
}

impl CampaignState {
    pub fn new(hero: HeroRecord, seed: u64) -> Self {
        Self {
            hero,
            world_resonance: 0.0,
            fate_deck: None,
            world_flags: BTreeMap::new(),
            seed,
            history: Vec::new(),
            open: None,
            applied: BTreeSet::new(),
            abandoned: BTreeSet::new(),
            next_encounter: 1,
        }
    }

    /// Opens a slot for the next encounter. Refused while one is open.
    pub fn begin_encounter(&mut self, plan: EncounterPlan) -> Result<EncounterId, ReconcileError> {
        if let Some(slot) = &self.open {
            return Err(ReconcileError::EncounterInProgress(slot.id));
        }
        let id = EncounterId(self.next_encounter);
        self.next_encounter = self.next_encounter.saturating_add(1);
        self.open = Some(EncounterSlot { id, plan });
        tracing::info!(encounter = %id, "encounter slot opened");
        Ok(id)
    }

    pub fn open_encounter(&self) -> Option<&EncounterSlot> {
        self.open.as_ref()
    }

    pub fn is_applied(&self, encounter: EncounterId) -> bool {
        self.applied.contains(&encounter)
    }

    pub fn is_abandoned(&self, encounter: EncounterId) -> bool {
        self.abandoned.contains(&encounter)
    }

    /// Closes the open slot without touching the hero or the world.
    pub fn abandon_encounter(&mut self, encounter: EncounterId) -> Result<(), ReconcileError> {
        let slot = self.open.as_ref().ok_or(ReconcileError::NoOpenEncounter)?;
        if slot.id != encounter {
            return Err(ReconcileError::SlotMismatch {
                expected: slot.id,
                received: encounter,
            });
        }
        self.open = None;
        self.abandoned.insert(encounter);
        tracing::warn!(%encounter, "encounter abandoned");
        Ok(())
    }

    /// Builds the immutable context for the open slot.
    pub fn encounter_context(&self, content: &impl CampaignContent) -> Option<EncounterContext> {
        let slot = self.open.as_ref()?;

        let mut pool: Vec<CardId> = self.hero.deck.clone();
        let hand_size = slot.plan.rules.hand_size.min(pool.len());
        let mut draw_pile = pool.split_off(hand_size);
        draw_pile.reverse();

        let mut cards: Vec<Card> = Vec::new();
        for id in &self.hero.deck {
            if cards.iter().all(|card| card.id != *id)
                && let Some(card) = content.card(*id)
            {
                cards.push(card.clone());
            }
        }

        Some(EncounterContext {
            id: slot.id,
            hero: self.hero.snapshot(),
            enemies: slot.plan.enemies.clone(),
            fate_deck: self
                .fate_deck
                .clone()
                .unwrap_or_else(|| content.default_fate_deck()),
            modifiers: slot.plan.modifiers.clone(),
            rules: slot.plan.rules.clone(),
            seed: self.seed ^ slot.id.0.wrapping_mul(0x9e3779b97f4a7c15),
            world_resonance: self.world_resonance,
            cards,
            hand: pool,
            draw_pile,
        })
    }

    pub(crate) fn close_slot(&mut self, encounter: EncounterId, outcome: EncounterOutcome) {
        self.open = None;
        self.applied.insert(encounter);
        self.history.push((encounter, outcome));
    }
}

/// Campaign state paired with its content; the object an encounter talks to.
pub struct Campaign<C: CampaignContent> {
    pub state: CampaignState,
    pub content: C,
    bus: Option<EventBus>,
}

impl<C: CampaignContent> Campaign<C> {
    pub fn new(state: CampaignState, content: C) -> Self {
        Self {
            state,
            content,
            bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn begin_encounter(&mut self, plan: EncounterPlan) -> Result<EncounterId, ReconcileError> {
        let id = self.state.begin_encounter(plan)?;
        if let Some(bus) = &self.bus {
            bus.publish(CampaignEvent::EncounterOpened { encounter: id });
        }
        Ok(id)
    }

    pub fn abandon_encounter(&mut self, encounter: EncounterId) -> Result<(), ReconcileError> {
        self.state.abandon_encounter(encounter)?;
        if let Some(bus) = &self.bus {
            bus.publish(CampaignEvent::EncounterAbandoned { encounter });
        }
        Ok(())
    }
}

impl<C: CampaignContent> CampaignSource for Campaign<C> {
    fn make_encounter_context(&mut self) -> Option<EncounterContext> {
        self.state.encounter_context(&self.content)
    }
}

impl<C: CampaignContent> CampaignSink for Campaign<C> {
    fn apply_encounter_result(
        &mut self,
        result: &EncounterResult,
    ) -> Result<CommitOutcome, ReconcileError> {
        let outcome = ResultReconciler::new(&self.content).apply(&mut self.state, result)?;
        if let Some(bus) = &self.bus {
            let event = match outcome {
                CommitOutcome::Committed(_) => CampaignEvent::ResultCommitted {
                    encounter: result.encounter,
                    outcome: result.outcome,
                },
                CommitOutcome::AlreadyApplied => CampaignEvent::DuplicateIgnored {
                    encounter: result.encounter,
                },
            };
            bus.publish(event);
        }
        Ok(outcome)
    }
}
