//! Shared fixtures: a scripted combat engine that records every call the
//! coordinator makes, plus context and event helpers.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use game_core::{
    ActionCommand, ActionErrorKind, ActionResult, Card, CardEffect, CardId, CardUseMode,
    CombatEngine, EncounterContext, EncounterId, EncounterOutcome, EncounterResult,
    EncounterSaveState, EncounterStateChange, EncounterTransaction, EncounterView, EngineError,
    EngineFactory, EnemyId, EnemySnapshot, EnemyState, EnemyStatus, EnemyView, EntityOutcome,
    FateCard, FateCardId, FateDeckState, HeroSnapshot, HeroView, Intent, IntentKind, Phase,
    RuleConfig, Suit,
};
use runtime::{Event, PhaseEvent};
use tokio::sync::broadcast;

/// Every engine entry point the coordinator can hit.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Perform(ActionCommand),
    Advance(Phase),
    Intent(EnemyId),
    Resolve(EnemyId),
    Finish,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Deterministic engine with just enough rules to exercise orchestration.
///
/// Hero attacks deal `strength + fate value` and draw up to `hero_draws`
/// cards from `hero_fate`; each enemy action draws one card from
/// `enemy_fate` when any are left.
pub struct ScriptedEngine {
    context: EncounterContext,
    phase: Phase,
    round: u32,
    hero_hp: u32,
    faith: u32,
    enemies: Vec<EnemyState>,
    hand: Vec<CardId>,
    draw_pile: Vec<CardId>,
    intents: Vec<Intent>,
    fled: bool,
    hero_fate: VecDeque<FateCard>,
    enemy_fate: VecDeque<FateCard>,
    hero_draws: usize,
    stuck: bool,
    refuse_mulligan: bool,
    calls: CallLog,
}

impl ScriptedEngine {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    fn over(&self) -> bool {
        self.hero_hp == 0 || self.fled || self.enemies.iter().all(|enemy| !enemy.is_active())
    }

    fn draw(pile: &mut VecDeque<FateCard>, changes: &mut Vec<EncounterStateChange>) -> i32 {
        match pile.pop_front() {
            Some(card) => {
                let value = card.effective_value();
                changes.push(EncounterStateChange::FateDraw {
                    card: Some(card),
                    value,
                    suit_match: false,
                });
                value
            }
            None => 0,
        }
    }

    fn hit(&mut self, target: EnemyId, amount: u32, changes: &mut Vec<EncounterStateChange>) {
        let Some(enemy) = self.enemy_mut(target) else {
            return;
        };
        let before = enemy.snapshot.hp;
        enemy.snapshot.hp = before.saturating_sub(amount);
        let after = enemy.snapshot.hp;
        changes.push(EncounterStateChange::EnemyHpChanged {
            enemy: target,
            delta: after as i32 - before as i32,
            new_value: after,
        });
        if after == 0 {
            enemy.status = EnemyStatus::Killed;
            changes.push(EncounterStateChange::EnemyKilled { enemy: target });
        }
    }

    fn execute(&mut self, command: &ActionCommand) -> Result<Vec<EncounterStateChange>, ActionErrorKind> {
        if self.phase == Phase::Finished || self.over() {
            return Err(ActionErrorKind::EncounterOver);
        }
        if let ActionCommand::Mulligan { cards } = command {
            if self.refuse_mulligan || self.phase != Phase::Intent {
                return Err(ActionErrorKind::MulliganUnavailable);
            }
            let mut changes = Vec::new();
            for card in cards {
                let slot = self
                    .hand
                    .iter()
                    .position(|held| held == card)
                    .ok_or(ActionErrorKind::CardNotInHand)?;
                self.hand.remove(slot);
                self.draw_pile.insert(0, *card);
            }
            for _ in cards {
                if let Some(card) = self.draw_pile.pop() {
                    self.hand.push(card);
                    changes.push(EncounterStateChange::CardDrawn { card });
                }
            }
            return Ok(changes);
        }
        if self.phase != Phase::PlayerAction {
            return Err(ActionErrorKind::NotPlayerPhase);
        }

        let mut changes = Vec::new();
        match command {
            ActionCommand::Attack { target } => {
                if !self.enemies.iter().any(|e| e.id() == *target && e.is_active()) {
                    return Err(ActionErrorKind::InvalidTarget);
                }
                let mut bonus = 0;
                for _ in 0..self.hero_draws {
                    bonus += Self::draw(&mut self.hero_fate, &mut changes);
                }
                let damage = (self.context.hero.strength as i32 + bonus).max(0) as u32;
                self.hit(*target, damage, &mut changes);
            }
            ActionCommand::Wait => {
                self.faith += 1;
                changes.push(EncounterStateChange::FaithChanged {
                    delta: 1,
                    new_value: self.faith,
                });
            }
            ActionCommand::Flee => {
                if !self.context.rules.allow_flee {
                    return Err(ActionErrorKind::FleeNotAllowed);
                }
                self.fled = true;
                changes.push(EncounterStateChange::FleeAttempt { success: true });
            }
            ActionCommand::UseCard { card, target, mode } => {
                let definition = self
                    .context
                    .card(*card)
                    .cloned()
                    .ok_or(ActionErrorKind::CardNotInHand)?;
                let slot = self
                    .hand
                    .iter()
                    .position(|held| held == card)
                    .ok_or(ActionErrorKind::CardNotInHand)?;
                let cost = if *mode == CardUseMode::Sacrifice { 0 } else { definition.cost };
                if cost > self.faith {
                    return Err(ActionErrorKind::InsufficientFaith);
                }
                self.hand.remove(slot);
                self.faith -= cost;
                changes.push(EncounterStateChange::CardPlayed { card: *card });
                if let (CardEffect::Damage(amount), Some(target)) = (definition.effect, target) {
                    self.hit(*target, amount, &mut changes);
                }
            }
            ActionCommand::SpiritAttack { .. } => return Err(ActionErrorKind::InvalidTarget),
            ActionCommand::ResolveFateChoice { .. } => {
                return Err(ActionErrorKind::NoFateChoicePending);
            }
            ActionCommand::Mulligan { .. } => return Err(ActionErrorKind::MulliganUnavailable),
        }
        Ok(changes)
    }

    fn outcome(&self) -> (EncounterOutcome, BTreeMap<EnemyId, EntityOutcome>) {
        let per_entity: BTreeMap<_, _> = self
            .enemies
            .iter()
            .map(|enemy| {
                let outcome = match enemy.status {
                    EnemyStatus::Killed => EntityOutcome::Killed,
                    EnemyStatus::Pacified => EntityOutcome::Pacified,
                    EnemyStatus::Active if self.fled => EntityOutcome::Escaped,
                    EnemyStatus::Active => EntityOutcome::Alive,
                };
                (enemy.id(), outcome)
            })
            .collect();
        let outcome = if self.hero_hp == 0 {
            EncounterOutcome::Defeat
        } else if let Some(kind) = EncounterResult::victory_kind(&per_entity) {
            EncounterOutcome::Victory(kind)
        } else {
            EncounterOutcome::Escaped
        };
        (outcome, per_entity)
    }
}

impl CombatEngine for ScriptedEngine {
    fn perform_action(&mut self, command: &ActionCommand) -> ActionResult {
        self.record(Call::Perform(command.clone()));
        match self.execute(command) {
            Ok(changes) => ActionResult::ok(changes),
            Err(kind) => ActionResult::rejected(kind),
        }
    }

    fn advance_phase(&mut self) -> Phase {
        if !self.stuck && self.phase != Phase::Finished {
            self.phase = self.phase.next();
            if self.phase == Phase::Intent {
                self.round += 1;
                self.intents.clear();
            }
        }
        self.record(Call::Advance(self.phase));
        self.phase
    }

    fn generate_intent(&mut self, enemy: EnemyId) -> Option<Intent> {
        self.record(Call::Intent(enemy));
        let state = self.enemies.iter().find(|e| e.id() == enemy && e.is_active())?;
        let intent = Intent {
            enemy,
            kind: IntentKind::Attack {
                damage: state.snapshot.power,
            },
        };
        self.intents.push(intent);
        Some(intent)
    }

    fn resolve_enemy_action(&mut self, enemy: EnemyId) -> ActionResult {
        self.record(Call::Resolve(enemy));
        let Some(power) = self
            .enemies
            .iter()
            .find(|e| e.id() == enemy && e.is_active())
            .map(|e| e.snapshot.power)
        else {
            return ActionResult::rejected(ActionErrorKind::InvalidTarget);
        };

        let mut changes = Vec::new();
        let bonus = Self::draw(&mut self.enemy_fate, &mut changes);
        let damage = (power as i32 + bonus).max(0) as u32;
        let before = self.hero_hp;
        self.hero_hp = before.saturating_sub(damage);
        changes.push(EncounterStateChange::PlayerHpChanged {
            delta: self.hero_hp as i32 - before as i32,
            new_value: self.hero_hp,
        });
        ActionResult::ok(changes)
    }

    fn finish_encounter(&mut self) -> EncounterResult {
        self.record(Call::Finish);
        self.phase = Phase::Finished;
        let (outcome, per_entity) = self.outcome();
        let loot_cards = if outcome.is_victory() {
            self.enemies
                .iter()
                .flat_map(|enemy| enemy.snapshot.loot.iter().copied())
                .collect()
        } else {
            Vec::new()
        };
        EncounterResult {
            encounter: self.context.id,
            outcome,
            transaction: EncounterTransaction {
                hp_delta: self.hero_hp as i32 - self.context.hero.hp as i32,
                faith_delta: self.faith as i32 - self.context.hero.faith as i32,
                loot_cards,
                ..EncounterTransaction::default()
            },
            per_entity,
        }
    }

    fn view(&self) -> EncounterView {
        EncounterView {
            encounter: self.context.id,
            phase: self.phase,
            round: self.round,
            hero: HeroView {
                hp: self.hero_hp,
                max_hp: self.context.hero.max_hp,
                faith: self.faith,
                armor_bonus: 0,
            },
            enemies: self
                .enemies
                .iter()
                .map(|enemy| EnemyView {
                    id: enemy.id(),
                    name: enemy.snapshot.name.clone(),
                    hp: enemy.snapshot.hp,
                    max_hp: enemy.snapshot.max_hp,
                    will: enemy.snapshot.will,
                    max_will: enemy.snapshot.max_will,
                    shield: enemy.shield,
                    status: enemy.status,
                })
                .collect(),
            hand: self.hand.clone(),
            draw_pile_len: self.draw_pile.len(),
            intents: self.intents.clone(),
            resonance: self.context.world_resonance,
            fate_choice: None,
            fled: self.fled,
        }
    }

    fn create_save_state(&self) -> EncounterSaveState {
        EncounterSaveState {
            context: self.context.clone(),
            hero_hp: self.hero_hp,
            faith: self.faith,
            armor_bonus: 0,
            enemies: self.enemies.clone(),
            hand: self.hand.clone(),
            draw_pile: self.draw_pile.clone(),
            fate_deck: FateDeckState::new(self.hero_fate.iter().cloned().collect()),
            rng_state: 0,
            world_resonance: self.context.world_resonance,
            round: self.round,
            phase: self.phase,
            intents: self.intents.clone(),
            fate_choice: None,
            fled: self.fled,
            mulligan_done: false,
            next_enemy_id: 0,
        }
    }
}

/// Builds [`ScriptedEngine`]s sharing one call log.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    pub calls: CallLog,
    pub hero_fate: Vec<FateCard>,
    pub enemy_fate: Vec<FateCard>,
    pub hero_draws: usize,
    /// Engine never leaves its starting phase.
    pub stuck: bool,
    /// Engine turns down every mulligan.
    pub refuse_mulligan: bool,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            hero_draws: 1,
            ..Self::default()
        }
    }

    pub fn with_hero_fate(mut self, cards: Vec<FateCard>, draws: usize) -> Self {
        self.hero_fate = cards;
        self.hero_draws = draws;
        self
    }

    pub fn with_enemy_fate(mut self, cards: Vec<FateCard>) -> Self {
        self.enemy_fate = cards;
        self
    }

    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    pub fn refusing_mulligan(mut self) -> Self {
        self.refuse_mulligan = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| matches(call)).count()
    }
}

impl EngineFactory for ScriptedFactory {
    type Engine = ScriptedEngine;

    fn create(&self, context: &EncounterContext) -> Result<ScriptedEngine, EngineError> {
        context.validate()?;
        Ok(ScriptedEngine {
            context: context.clone(),
            phase: Phase::Intent,
            round: 1,
            hero_hp: context.hero.hp,
            faith: context.hero.faith,
            enemies: context.enemies.iter().cloned().map(EnemyState::new).collect(),
            hand: context.hand.clone(),
            draw_pile: context.draw_pile.clone(),
            intents: Vec::new(),
            fled: false,
            hero_fate: self.hero_fate.iter().cloned().collect(),
            enemy_fate: self.enemy_fate.iter().cloned().collect(),
            hero_draws: self.hero_draws,
            stuck: self.stuck,
            refuse_mulligan: self.refuse_mulligan,
            calls: Rc::clone(&self.calls),
        })
    }

    fn restore(&self, save: &EncounterSaveState) -> Result<ScriptedEngine, EngineError> {
        Ok(ScriptedEngine {
            context: save.context.clone(),
            phase: save.phase,
            round: save.round,
            hero_hp: save.hero_hp,
            faith: save.faith,
            enemies: save.enemies.clone(),
            hand: save.hand.clone(),
            draw_pile: save.draw_pile.clone(),
            intents: save.intents.clone(),
            fled: save.fled,
            hero_fate: save.fate_deck.draw_pile.iter().cloned().collect(),
            enemy_fate: self.enemy_fate.iter().cloned().collect(),
            hero_draws: self.hero_draws,
            stuck: self.stuck,
            refuse_mulligan: self.refuse_mulligan,
            calls: Rc::clone(&self.calls),
        })
    }
}

// ===== fixtures =====

pub const SHADE: EnemyId = EnemyId(1);
pub const WRAITH: EnemyId = EnemyId(2);

/// Costs 3 faith; heals.
pub const BLESSING: CardId = CardId(1);
/// Free; deals 2 damage.
pub const SPARK: CardId = CardId(2);
pub const EMBER: CardId = CardId(3);

pub fn hero() -> HeroSnapshot {
    HeroSnapshot {
        hp: 20,
        max_hp: 20,
        strength: 5,
        wisdom: 3,
        armor: 0,
        faith: 1,
    }
}

pub fn cards() -> Vec<Card> {
    vec![
        Card::new(BLESSING, "Blessing", 3, 0, CardEffect::Heal(3)),
        Card::new(SPARK, "Spark", 0, 1, CardEffect::Damage(2)),
        Card::new(EMBER, "Ember", 1, 1, CardEffect::Damage(3)),
    ]
}

pub fn rules() -> RuleConfig {
    RuleConfig {
        mulligan_enabled: false,
        ..RuleConfig::without_fate()
    }
}

pub fn context(enemies: Vec<EnemySnapshot>, rules: RuleConfig) -> EncounterContext {
    EncounterContext {
        id: EncounterId(7),
        hero: hero(),
        enemies,
        fate_deck: FateDeckState::default(),
        modifiers: Vec::new(),
        rules,
        seed: 42,
        world_resonance: 0.0,
        cards: cards(),
        hand: vec![BLESSING, SPARK],
        draw_pile: vec![EMBER],
    }
}

pub fn shade(hp: u32) -> EnemySnapshot {
    EnemySnapshot::new(SHADE, "shade", hp, 2, 0)
}

pub fn wraith(hp: u32) -> EnemySnapshot {
    EnemySnapshot::new(WRAITH, "wraith", hp, 3, 0)
}

pub fn fate(id: u32, value: i32) -> FateCard {
    FateCard::new(FateCardId(id), value, Suit::Neutral)
}

// ===== events =====

pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Phases entered, in order.
pub fn entered(events: &[Event]) -> Vec<Phase> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Phase(PhaseEvent::Entered { phase, .. }) => Some(*phase),
            _ => None,
        })
        .collect()
}
