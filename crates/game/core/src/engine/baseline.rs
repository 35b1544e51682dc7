use std::collections::BTreeMap;

use super::damage::{self, Affinity};
use super::rng::{PcgRng, RngOracle, compute_seed, roll};
use super::{CombatEngine, EncounterSaveState, EnemyState, EngineError, EngineFactory};
use crate::action::{ActionCommand, ActionErrorKind, ActionResult, CardUseMode};
use crate::card::{CardEffect, FateCard, FateDeckState, Keyword};
use crate::change::EncounterStateChange;
use crate::config::RuleConfig;
use crate::context::{EncounterContext, EnemyAbility, Modifier};
use crate::ids::{CardId, EnemyId};
use crate::outcome::{EncounterOutcome, EncounterResult, EncounterTransaction, EntityOutcome};
use crate::phase::Phase;
use crate::view::{
    EncounterView, EnemyStatus, EnemyView, FateChoice, FateOption, HeroView, Intent, IntentKind,
};

/// Extra damage granted by a `Surge` fate card.
const SURGE_BONUS: u32 = 2;
/// Extra spirit damage granted by a `Focus` fate card.
const FOCUS_BONUS: u32 = 2;
/// Faith restored by an `Echo` fate card.
const ECHO_FAITH: u32 = 1;
/// Armor granted by a `Ward` fate card until the round ends.
const WARD_ARMOR: u32 = 1;
/// Value added to a fate card whose suit matches world resonance.
const SUIT_MATCH_BONUS: i32 = 1;
/// Resonance pulled by an enemy ritual.
const RITUAL_RESONANCE: f32 = -0.5;

/// Result of consulting the fate deck once.
struct FateReveal {
    change: EncounterStateChange,
    card: Option<FateCard>,
    value: i32,
}

impl FateReveal {
    fn keyword(&self) -> Option<Keyword> {
        self.card.as_ref().and_then(|card| card.keyword)
    }
}

/// Deterministic reference rules: subtractive damage, fate modifiers, spirit
/// pacification, a flee roll, card plays and simple telegraphed intents.
#[derive(Clone, Debug)]
pub struct BaselineEngine {
    context: EncounterContext,
    hero_hp: u32,
    faith: u32,
    armor_bonus: u32,
    enemies: Vec<EnemyState>,
    hand: Vec<CardId>,
    draw_pile: Vec<CardId>,
    fate_deck: FateDeckState,
    nonce: u64,
    resonance: f32,
    round: u32,
    phase: Phase,
    intents: Vec<Intent>,
    fate_choice: Option<FateChoice>,
    fled: bool,
    mulligan_done: bool,
    next_enemy_id: u32,
    rng: PcgRng,
}

impl BaselineEngine {
    pub fn new(context: &EncounterContext) -> Result<Self, EngineError> {
        context.validate()?;

        let mut hand = context.hand.clone();
        let mut draw_pile = context.draw_pile.clone();
        while hand.len() < context.rules.hand_size {
            match draw_pile.pop() {
                Some(card) => hand.push(card),
                None => break,
            }
        }

        let next_enemy_id = context
            .enemies
            .iter()
            .map(|enemy| enemy.id.0)
            .max()
            .unwrap_or(0)
            .saturating_add(1);

        Ok(Self {
            hero_hp: context.hero.hp.min(context.hero.max_hp),
            faith: context.hero.faith,
            armor_bonus: 0,
            enemies: context.enemies.iter().cloned().map(EnemyState::new).collect(),
            hand,
            draw_pile,
            fate_deck: context.fate_deck.clone(),
            nonce: 0,
            resonance: context.world_resonance,
            round: 1,
            phase: Phase::Intent,
            intents: Vec::new(),
            fate_choice: None,
            fled: false,
            mulligan_done: false,
            next_enemy_id,
            rng: PcgRng,
            context: context.clone(),
        })
    }

    pub fn from_save(save: &EncounterSaveState) -> Result<Self, EngineError> {
        save.context.validate()?;
        if save.round == 0 {
            return Err(EngineError::InvalidRound(save.round));
        }
        if let Some(unknown) = save
            .hand
            .iter()
            .chain(save.draw_pile.iter())
            .find(|id| save.context.card(**id).is_none())
        {
            return Err(EngineError::UnknownCard(*unknown));
        }
        if let Some(intent) = save
            .intents
            .iter()
            .find(|intent| !save.enemies.iter().any(|enemy| enemy.id() == intent.enemy))
        {
            return Err(EngineError::UnknownEnemy(intent.enemy));
        }

        Ok(Self {
            context: save.context.clone(),
            hero_hp: save.hero_hp,
            faith: save.faith,
            armor_bonus: save.armor_bonus,
            enemies: save.enemies.clone(),
            hand: save.hand.clone(),
            draw_pile: save.draw_pile.clone(),
            fate_deck: save.fate_deck.clone(),
            nonce: save.rng_state,
            resonance: save.world_resonance,
            round: save.round,
            phase: save.phase,
            intents: save.intents.clone(),
            fate_choice: save.fate_choice.clone(),
            fled: save.fled,
            mulligan_done: save.mulligan_done,
            next_enemy_id: save.next_enemy_id,
            rng: PcgRng,
        })
    }

    fn rules(&self) -> &RuleConfig {
        &self.context.rules
    }

    fn modifier_sum(&self, pick: impl Fn(&Modifier) -> Option<i32>) -> i32 {
        self.context.modifiers.iter().filter_map(pick).sum()
    }

    fn strength(&self) -> u32 {
        let bonus = self.modifier_sum(|m| match m {
            Modifier::Strength(n) => Some(*n),
            _ => None,
        });
        (self.context.hero.strength as i64 + bonus as i64).max(0) as u32
    }

    fn hero_armor(&self) -> u32 {
        let bonus = self.modifier_sum(|m| match m {
            Modifier::Armor(n) => Some(*n),
            _ => None,
        });
        let base = (self.context.hero.armor as i64 + bonus as i64).max(0) as u32;
        base.saturating_add(self.armor_bonus)
    }

    fn fate_bias(&self) -> i32 {
        self.modifier_sum(|m| match m {
            Modifier::FateBias(n) => Some(*n),
            _ => None,
        })
    }

    fn next_seed(&mut self, actor: u32, context: u32) -> u64 {
        let seed = compute_seed(self.context.seed, self.nonce, actor, context);
        self.nonce = self.nonce.wrapping_add(1);
        seed
    }

    fn enemy(&self, id: EnemyId) -> Option<&EnemyState> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    fn outcome_now(&self) -> Option<EncounterOutcome> {
        if self.fled {
            return Some(EncounterOutcome::Escaped);
        }
        if self.hero_hp == 0 {
            return Some(EncounterOutcome::Defeat);
        }
        EncounterResult::victory_kind(&self.per_entity()).map(EncounterOutcome::Victory)
    }

    fn per_entity(&self) -> BTreeMap<EnemyId, EntityOutcome> {
        self.enemies
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
            .collect()
    }

    /// Pushes `EncounterEnded` if the call just ended the encounter.
    fn push_end_check(&self, changes: &mut Vec<EncounterStateChange>) {
        if let Some(outcome) = self.outcome_now() {
            changes.push(EncounterStateChange::EncounterEnded { outcome });
        }
    }

    fn shift_resonance(&mut self, delta: f32, changes: &mut Vec<EncounterStateChange>) {
        if delta == 0.0 {
            return;
        }
        self.resonance += delta;
        changes.push(EncounterStateChange::ResonanceShifted {
            delta,
            new_value: self.resonance,
        });
    }

    fn gain_faith(&mut self, amount: u32, changes: &mut Vec<EncounterStateChange>) {
        if amount == 0 {
            return;
        }
        self.faith = self.faith.saturating_add(amount);
        changes.push(EncounterStateChange::FaithChanged {
            delta: amount as i32,
            new_value: self.faith,
        });
    }

    fn heal_hero(&mut self, amount: u32, changes: &mut Vec<EncounterStateChange>) {
        let before = self.hero_hp;
        self.hero_hp = damage::apply_healing(self.hero_hp, amount, self.context.hero.max_hp);
        changes.push(EncounterStateChange::PlayerHpChanged {
            delta: self.hero_hp as i32 - before as i32,
            new_value: self.hero_hp,
        });
    }

    fn raise_armor(&mut self, amount: u32, changes: &mut Vec<EncounterStateChange>) {
        self.armor_bonus = self.armor_bonus.saturating_add(amount);
        changes.push(EncounterStateChange::PlayerDefended {
            armor_bonus: amount,
        });
    }

    /// Consults the fate deck, reshuffling the discard pile when empty.
    fn draw_fate(&mut self) -> FateReveal {
        if self.fate_deck.draw_pile.is_empty() && !self.fate_deck.discard.is_empty() {
            let seed = self.next_seed(0, roll::RESHUFFLE);
            let mut pile = std::mem::take(&mut self.fate_deck.discard);
            self.rng.shuffle(seed, &mut pile);
            self.fate_deck.draw_pile = pile;
        }

        match self.fate_deck.draw_pile.pop() {
            Some(card) => {
                let suit_match = card.suit.matches_resonance(self.resonance);
                let mut value = card.effective_value().saturating_add(self.fate_bias());
                if suit_match {
                    value = value.saturating_add(SUIT_MATCH_BONUS);
                }
                self.fate_deck.discard.push(card.clone());
                FateReveal {
                    change: EncounterStateChange::FateDraw {
                        card: Some(card.clone()),
                        value,
                        suit_match,
                    },
                    card: Some(card),
                    value,
                }
            }
            None => FateReveal {
                change: EncounterStateChange::FateDraw {
                    card: None,
                    value: 0,
                    suit_match: false,
                },
                card: None,
                value: 0,
            },
        }
    }

    fn check_target(&self, target: EnemyId, spirit: bool) -> Result<(), ActionErrorKind> {
        let enemy = self.enemy(target).ok_or(ActionErrorKind::TargetNotFound)?;
        if !enemy.is_active() || (spirit && enemy.snapshot.max_will == 0) {
            return Err(ActionErrorKind::InvalidTarget);
        }
        Ok(())
    }

    /// Physical blow against a validated target.
    fn strike(
        &mut self,
        target: EnemyId,
        attack: u32,
        draw: bool,
        changes: &mut Vec<EncounterStateChange>,
    ) -> Option<Keyword> {
        let reveal = draw.then(|| self.draw_fate());
        let (modifier, keyword) = match &reveal {
            Some(reveal) => (reveal.value, reveal.keyword()),
            None => (0, None),
        };
        if let Some(reveal) = reveal {
            changes.push(reveal.change);
        }

        let mut attack = attack;
        match keyword {
            Some(Keyword::Surge) => attack = attack.saturating_add(SURGE_BONUS),
            Some(Keyword::Echo) => self.gain_faith(ECHO_FAITH, changes),
            Some(Keyword::Ward) => self.raise_armor(WARD_ARMOR, changes),
            _ => {}
        }

        let Some(enemy) = self.enemy(target) else {
            return keyword;
        };
        let defense = enemy.snapshot.armor.saturating_add(enemy.shield);
        let raw = damage::calculate_damage(attack, modifier, defense);
        let (dealt, affinity) = damage::apply_affinity(
            raw,
            keyword,
            enemy.snapshot.weakness,
            enemy.snapshot.resistance,
        );
        match affinity {
            Affinity::Weak(keyword) => changes.push(EncounterStateChange::WeaknessTriggered {
                enemy: target,
                keyword,
            }),
            Affinity::Resistant(keyword) => {
                changes.push(EncounterStateChange::ResistanceTriggered {
                    enemy: target,
                    keyword,
                })
            }
            Affinity::Neutral => {}
        }

        self.damage_enemy(target, dealt, changes);
        keyword
    }

    fn damage_enemy(&mut self, target: EnemyId, amount: u32, changes: &mut Vec<EncounterStateChange>) {
        let Some(enemy) = self.enemy_mut(target) else {
            return;
        };
        let before = enemy.snapshot.hp;
        enemy.snapshot.hp = damage::apply_damage(before, amount);
        let new_value = enemy.snapshot.hp;
        changes.push(EncounterStateChange::EnemyHpChanged {
            enemy: target,
            delta: new_value as i32 - before as i32,
            new_value,
        });
        if new_value == 0 {
            enemy.status = EnemyStatus::Killed;
            changes.push(EncounterStateChange::EnemyKilled { enemy: target });
            self.shift_resonance(RuleConfig::KILL_RESONANCE_SHIFT, changes);
        }
    }

    /// Spirit blow against a validated target.
    fn influence(
        &mut self,
        target: EnemyId,
        attack: u32,
        draw: bool,
        changes: &mut Vec<EncounterStateChange>,
    ) -> Option<Keyword> {
        let reveal = draw.then(|| self.draw_fate());
        let (modifier, keyword) = match &reveal {
            Some(reveal) => (reveal.value, reveal.keyword()),
            None => (0, None),
        };
        if let Some(reveal) = reveal {
            changes.push(reveal.change);
        }

        let mut attack = attack;
        match keyword {
            Some(Keyword::Focus) => attack = attack.saturating_add(FOCUS_BONUS),
            Some(Keyword::Echo) => self.gain_faith(ECHO_FAITH, changes),
            Some(Keyword::Ward) => self.raise_armor(WARD_ARMOR, changes),
            _ => {}
        }

        let amount = damage::calculate_damage(attack, modifier, 0);
        let Some(enemy) = self.enemy_mut(target) else {
            return keyword;
        };
        let before = enemy.snapshot.will;
        enemy.snapshot.will = damage::apply_damage(before, amount);
        let new_value = enemy.snapshot.will;
        changes.push(EncounterStateChange::EnemyWpChanged {
            enemy: target,
            delta: new_value as i32 - before as i32,
            new_value,
        });
        if new_value == 0 {
            enemy.status = EnemyStatus::Pacified;
            changes.push(EncounterStateChange::EnemyPacified { enemy: target });
            self.shift_resonance(RuleConfig::PACIFY_RESONANCE_SHIFT, changes);
        }
        keyword
    }

    fn offer_choice(&mut self, changes: &mut Vec<EncounterStateChange>) {
        let mut options = vec![FateOption::Mend(2), FateOption::Kindle(1)];
        if let Some(enemy) = self.enemies.iter().find(|enemy| enemy.is_active()) {
            options.push(FateOption::Smite {
                enemy: enemy.id(),
                damage: 2,
            });
        }
        let choice = FateChoice { options };
        self.fate_choice = Some(choice.clone());
        changes.push(EncounterStateChange::FateChoicePending { choice });
    }

    fn draw_card(&mut self, changes: &mut Vec<EncounterStateChange>) {
        if let Some(card) = self.draw_pile.pop() {
            self.hand.push(card);
            changes.push(EncounterStateChange::CardDrawn { card });
        }
    }

    fn use_card(
        &mut self,
        card: CardId,
        target: Option<EnemyId>,
        mode: CardUseMode,
    ) -> Result<Vec<EncounterStateChange>, ActionErrorKind> {
        let slot = self
            .hand
            .iter()
            .position(|held| *held == card)
            .ok_or(ActionErrorKind::CardNotInHand)?;
        let definition = self
            .context
            .card(card)
            .cloned()
            .ok_or(ActionErrorKind::CardNotInHand)?;

        let cost = match mode {
            CardUseMode::Sacrifice => 0,
            _ => definition.cost,
        };
        if self.faith < cost {
            return Err(ActionErrorKind::InsufficientFaith);
        }

        let needs_target = match mode {
            CardUseMode::Strike | CardUseMode::Influence => true,
            CardUseMode::Play => definition.effect.needs_target(),
            CardUseMode::Sacrifice => false,
        };
        if needs_target {
            let target = target.ok_or(ActionErrorKind::InvalidTarget)?;
            self.check_target(target, mode == CardUseMode::Influence)?;
        }

        let mut changes = Vec::new();
        if cost > 0 {
            self.faith -= cost;
            changes.push(EncounterStateChange::FaithChanged {
                delta: -(cost as i32),
                new_value: self.faith,
            });
        }
        self.hand.remove(slot);
        changes.push(EncounterStateChange::CardPlayed { card });

        let mut keyword = None;
        match (mode, target) {
            (CardUseMode::Strike, Some(target)) => {
                let attack = self.strength().saturating_add(definition.power);
                keyword = self.strike(target, attack, self.rules().fate_on_attack, &mut changes);
            }
            (CardUseMode::Influence, Some(target)) => {
                let attack = self.context.hero.wisdom.saturating_add(definition.power);
                keyword = self.influence(target, attack, self.rules().fate_on_attack, &mut changes);
            }
            (CardUseMode::Sacrifice, _) => {
                self.gain_faith(definition.cost.saturating_add(1), &mut changes);
            }
            (CardUseMode::Play, _) => match definition.effect {
                CardEffect::Damage(amount) => {
                    if let Some(target) = target {
                        let defense = self
                            .enemy(target)
                            .map(|enemy| enemy.snapshot.armor.saturating_add(enemy.shield))
                            .unwrap_or(0);
                        let dealt = damage::calculate_damage(amount, 0, defense);
                        self.damage_enemy(target, dealt, &mut changes);
                    }
                }
                CardEffect::Heal(amount) => self.heal_hero(amount, &mut changes),
                CardEffect::Faith(amount) => self.gain_faith(amount, &mut changes),
                CardEffect::Ward(amount) => self.raise_armor(amount, &mut changes),
                CardEffect::Foresight => {
                    let reveal = self.draw_fate();
                    let shift = reveal
                        .card
                        .as_ref()
                        .map(|card| card.suit.resonance_shift())
                        .unwrap_or(0.0);
                    keyword = reveal.keyword();
                    changes.push(reveal.change);
                    self.shift_resonance(shift, &mut changes);
                }
            },
            (CardUseMode::Strike | CardUseMode::Influence, None) => {}
        }

        self.draw_card(&mut changes);
        self.after_hero_action(keyword, &mut changes);
        Ok(changes)
    }

    fn after_hero_action(&mut self, keyword: Option<Keyword>, changes: &mut Vec<EncounterStateChange>) {
        if self.outcome_now().is_some() {
            self.push_end_check(changes);
        } else if keyword == Some(Keyword::Choice) {
            self.offer_choice(changes);
        }
    }

    fn mulligan(&mut self, cards: &[CardId]) -> Result<Vec<EncounterStateChange>, ActionErrorKind> {
        let eligible = self.rules().mulligan_enabled
            && !self.mulligan_done
            && self.round == 1
            && self.phase == Phase::Intent;
        if !eligible {
            return Err(ActionErrorKind::MulliganUnavailable);
        }

        let mut remaining = self.hand.clone();
        for card in cards {
            let slot = remaining
                .iter()
                .position(|held| held == card)
                .ok_or(ActionErrorKind::CardNotInHand)?;
            remaining.remove(slot);
        }

        self.mulligan_done = true;
        self.hand = remaining;
        for card in cards {
            self.draw_pile.insert(0, *card);
        }
        let mut changes = Vec::new();
        for _ in cards {
            self.draw_card(&mut changes);
        }
        Ok(changes)
    }

    fn resolve_choice(&mut self, option: usize) -> Result<Vec<EncounterStateChange>, ActionErrorKind> {
        let choice = self
            .fate_choice
            .as_ref()
            .ok_or(ActionErrorKind::NoFateChoicePending)?;
        let picked = *choice
            .options
            .get(option)
            .ok_or(ActionErrorKind::InvalidFateOption)?;
        self.fate_choice = None;

        let mut changes = Vec::new();
        match picked {
            FateOption::Mend(amount) => self.heal_hero(amount, &mut changes),
            FateOption::Kindle(amount) => self.gain_faith(amount, &mut changes),
            FateOption::Smite { enemy, damage } => {
                if self.enemy(enemy).is_some_and(EnemyState::is_active) {
                    self.damage_enemy(enemy, damage, &mut changes);
                }
            }
        }
        self.push_end_check(&mut changes);
        Ok(changes)
    }

    fn execute(&mut self, command: &ActionCommand) -> Result<Vec<EncounterStateChange>, ActionErrorKind> {
        if self.phase == Phase::Finished || self.outcome_now().is_some() {
            return Err(ActionErrorKind::EncounterOver);
        }
        if let ActionCommand::Mulligan { cards } = command {
            return self.mulligan(cards);
        }
        if self.phase != Phase::PlayerAction {
            return Err(ActionErrorKind::NotPlayerPhase);
        }
        if self.fate_choice.is_some() && !matches!(command, ActionCommand::ResolveFateChoice { .. }) {
            return Err(ActionErrorKind::FateChoiceUnresolved);
        }

        match command {
            ActionCommand::Attack { target } => {
                self.check_target(*target, false)?;
                let mut changes = Vec::new();
                let keyword = self.strike(*target, self.strength(), self.rules().fate_on_attack, &mut changes);
                self.after_hero_action(keyword, &mut changes);
                Ok(changes)
            }
            ActionCommand::SpiritAttack { target } => {
                self.check_target(*target, true)?;
                let mut changes = Vec::new();
                let keyword = self.influence(
                    *target,
                    self.context.hero.wisdom,
                    self.rules().fate_on_attack,
                    &mut changes,
                );
                self.after_hero_action(keyword, &mut changes);
                Ok(changes)
            }
            ActionCommand::Wait => {
                let mut changes = Vec::new();
                self.raise_armor(RuleConfig::DEFEND_ARMOR_BONUS as u32, &mut changes);
                self.gain_faith(RuleConfig::WAIT_FAITH_GAIN as u32, &mut changes);
                Ok(changes)
            }
            ActionCommand::Flee => {
                if !self.rules().allow_flee {
                    return Err(ActionErrorKind::FleeNotAllowed);
                }
                let seed = self.next_seed(0, roll::FLEE);
                let success = self.rng.roll_d100(seed) <= self.rules().flee_chance_percent;
                let mut changes = vec![EncounterStateChange::FleeAttempt { success }];
                if success {
                    self.fled = true;
                    self.push_end_check(&mut changes);
                }
                Ok(changes)
            }
            ActionCommand::UseCard { card, target, mode } => self.use_card(*card, *target, *mode),
            ActionCommand::ResolveFateChoice { option } => self.resolve_choice(*option),
            ActionCommand::Mulligan { .. } => Err(ActionErrorKind::MulliganUnavailable),
        }
    }

    fn intent_for(&self, enemy: &EnemyState) -> IntentKind {
        let snapshot = &enemy.snapshot;
        if snapshot.has_ability(EnemyAbility::Summon) && !enemy.ability_used && self.round >= 2 {
            IntentKind::Summon
        } else if self.round % 3 == 0 {
            let armor = if snapshot.has_ability(EnemyAbility::Guard) {
                RuleConfig::GUARD_SHIELD
            } else {
                1
            };
            IntentKind::Defend { armor }
        } else if snapshot.max_will > 0 && self.round % 4 == 0 {
            IntentKind::Ritual {
                resonance: RITUAL_RESONANCE,
            }
        } else {
            IntentKind::Attack {
                damage: snapshot.power,
            }
        }
    }

    fn summon(&mut self, caller: EnemyId, changes: &mut Vec<EncounterStateChange>) {
        let Some(parent) = self.enemy(caller).map(|enemy| enemy.snapshot.clone()) else {
            return;
        };
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);

        let mut minion = parent.clone();
        minion.id = id;
        minion.name = format!("lesser {}", parent.name);
        minion.max_hp = (parent.max_hp / 2).max(1);
        minion.hp = minion.max_hp;
        minion.max_will /= 2;
        minion.will = minion.max_will;
        minion.abilities.clear();
        minion.loot.clear();
        self.enemies.push(EnemyState::new(minion));

        changes.push(EncounterStateChange::AbilityTriggered {
            enemy: caller,
            ability: EnemyAbility::Summon,
        });
        changes.push(EncounterStateChange::EnemySummoned { enemy: id });
    }

    fn enemy_turn(&mut self, id: EnemyId) -> Result<Vec<EncounterStateChange>, ActionErrorKind> {
        if self.phase == Phase::Finished || self.outcome_now().is_some() {
            return Err(ActionErrorKind::EncounterOver);
        }
        let enemy = self.enemy(id).ok_or(ActionErrorKind::TargetNotFound)?;
        if !enemy.is_active() {
            return Err(ActionErrorKind::InvalidTarget);
        }

        let kind = match self.intents.iter().find(|intent| intent.enemy == id) {
            Some(intent) => intent.kind,
            None => self.intent_for(enemy),
        };
        let mut changes = Vec::new();

        if let Some(enemy) = self.enemy_mut(id) {
            let raging = enemy.snapshot.has_ability(EnemyAbility::Rage)
                && !enemy.ability_used
                && enemy.snapshot.hp.saturating_mul(2) <= enemy.snapshot.max_hp;
            if raging {
                enemy.ability_used = true;
                enemy.shield = enemy.shield.saturating_add(RuleConfig::RAGE_SHIELD);
                changes.push(EncounterStateChange::AbilityTriggered {
                    enemy: id,
                    ability: EnemyAbility::Rage,
                });
                changes.push(EncounterStateChange::RageShieldApplied {
                    enemy: id,
                    amount: RuleConfig::RAGE_SHIELD,
                });
            }
        }

        match kind {
            IntentKind::Attack { damage: power } => {
                let mut modifier = 0;
                let mut armor = self.hero_armor();
                if self.rules().enemy_fate_draws {
                    let reveal = self.draw_fate();
                    modifier = reveal.value;
                    if reveal.keyword() == Some(Keyword::Ward) {
                        armor = armor.saturating_add(WARD_ARMOR);
                    }
                    changes.push(reveal.change);
                }
                let dealt = damage::calculate_damage(power, modifier, armor);
                let before = self.hero_hp;
                self.hero_hp = damage::apply_damage(before, dealt);
                changes.push(EncounterStateChange::PlayerHpChanged {
                    delta: self.hero_hp as i32 - before as i32,
                    new_value: self.hero_hp,
                });
            }
            IntentKind::Defend { armor } => {
                if let Some(enemy) = self.enemy_mut(id) {
                    enemy.shield = enemy.shield.saturating_add(armor);
                    if enemy.snapshot.has_ability(EnemyAbility::Guard) {
                        changes.push(EncounterStateChange::AbilityTriggered {
                            enemy: id,
                            ability: EnemyAbility::Guard,
                        });
                    }
                }
            }
            IntentKind::Ritual { resonance } => self.shift_resonance(resonance, &mut changes),
            IntentKind::Summon => {
                if let Some(enemy) = self.enemy_mut(id) {
                    enemy.ability_used = true;
                }
                self.summon(id, &mut changes);
            }
        }

        self.push_end_check(&mut changes);
        Ok(changes)
    }
}

impl CombatEngine for BaselineEngine {
    fn perform_action(&mut self, command: &ActionCommand) -> ActionResult {
        match self.execute(command) {
            Ok(changes) => ActionResult::ok(changes),
            Err(kind) => ActionResult::rejected(kind),
        }
    }

    fn advance_phase(&mut self) -> Phase {
        if self.phase == Phase::Finished {
            return self.phase;
        }
        self.phase = self.phase.next();
        if self.phase == Phase::Intent {
            self.round = self.round.saturating_add(1);
            self.armor_bonus = 0;
            self.intents.clear();
            for enemy in &mut self.enemies {
                enemy.shield = 0;
            }
        }
        self.phase
    }

    fn generate_intent(&mut self, enemy: EnemyId) -> Option<Intent> {
        let state = self.enemy(enemy).filter(|state| state.is_active())?;
        let intent = Intent {
            enemy,
            kind: self.intent_for(state),
        };
        self.intents.retain(|existing| existing.enemy != enemy);
        self.intents.push(intent);
        Some(intent)
    }

    fn resolve_enemy_action(&mut self, enemy: EnemyId) -> ActionResult {
        match self.enemy_turn(enemy) {
            Ok(changes) => ActionResult::ok(changes),
            Err(kind) => ActionResult::rejected(kind),
        }
    }

    fn finish_encounter(&mut self) -> EncounterResult {
        self.phase = Phase::Finished;
        let per_entity = self.per_entity();
        let outcome = self.outcome_now().unwrap_or(EncounterOutcome::Escaped);

        let mut world_flags = BTreeMap::new();
        let mut loot_cards = Vec::new();
        for enemy in &self.enemies {
            match enemy.status {
                EnemyStatus::Killed => {
                    world_flags.insert(format!("slain:{}", enemy.snapshot.name), true);
                }
                EnemyStatus::Pacified => {
                    world_flags.insert(format!("pacified:{}", enemy.snapshot.name), true);
                }
                EnemyStatus::Active => continue,
            }
            if outcome.is_victory() {
                loot_cards.extend(enemy.snapshot.loot.iter().copied());
            }
        }

        EncounterResult {
            encounter: self.context.id,
            outcome,
            transaction: EncounterTransaction {
                hp_delta: self.hero_hp as i32 - self.context.hero.hp as i32,
                faith_delta: self.faith as i32 - self.context.hero.faith as i32,
                resonance_delta: self.resonance - self.context.world_resonance,
                world_flags,
                loot_cards,
                updated_fate_deck: Some(self.fate_deck.clone()),
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
                armor_bonus: self.armor_bonus,
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
            resonance: self.resonance,
            fate_choice: self.fate_choice.clone(),
            fled: self.fled,
        }
    }

    fn create_save_state(&self) -> EncounterSaveState {
        EncounterSaveState {
            context: self.context.clone(),
            hero_hp: self.hero_hp,
            faith: self.faith,
            armor_bonus: self.armor_bonus,
            enemies: self.enemies.clone(),
            hand: self.hand.clone(),
            draw_pile: self.draw_pile.clone(),
            fate_deck: self.fate_deck.clone(),
            rng_state: self.nonce,
            world_resonance: self.resonance,
            round: self.round,
            phase: self.phase,
            intents: self.intents.clone(),
            fate_choice: self.fate_choice.clone(),
            fled: self.fled,
            mulligan_done: self.mulligan_done,
            next_enemy_id: self.next_enemy_id,
        }
    }
}

/// Builds [`BaselineEngine`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaselineEngineFactory;

impl EngineFactory for BaselineEngineFactory {
    type Engine = BaselineEngine;

    fn create(&self, context: &EncounterContext) -> Result<BaselineEngine, EngineError> {
        BaselineEngine::new(context)
    }

    fn restore(&self, save: &EncounterSaveState) -> Result<BaselineEngine, EngineError> {
        BaselineEngine::from_save(save)
    }
}
