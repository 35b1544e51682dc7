//! Phase-driven orchestration of one encounter.
//!
//! [`EncounterCoordinator`] owns the combat engine for a single encounter and
//! drives the round cycle `Intent -> PlayerAction -> Resolution -> RoundEnd`
//! until the encounter-end check routes it to `Finished`. Whenever engine
//! changes reveal fate cards the loop parks itself on an explicit resume step
//! ([`PhaseStep`]) and continues only after the presentation layer dismisses
//! every queued reveal.

mod feedback;
mod flow;
mod log;
mod mulligan;
mod validate;

pub use feedback::{Feedback, FeedbackKind};
pub use flow::{PhaseStep, RevealRequest, RevealToken};
pub use log::{CombatLog, LogEntry, LogLevel};
pub use mulligan::{MulliganGate, MulliganSession};
pub use validate::Rejection;

use std::collections::VecDeque;
use std::time::Duration;

use game_core::{
    ActionCommand, ActionErrorKind, CardId, CombatEngine, CombatStats, EncounterContext,
    EncounterResult, EncounterStateChange, EncounterView, EngineFactory, EnemyId, EnemyView,
    Intent, Phase,
};

use crate::api::{CoordinatorError, InitError};
use crate::campaign::CampaignSource;
use crate::config::RuntimeConfig;
use crate::events::{CombatEvent, EventBus, FeedbackEvent, PhaseEvent, RevealEvent};
use crate::persistence::CoordinatorSave;
use flow::Flow;

/// What happened to a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Wrong phase, reveal pending, mulligan open, finished or torn down.
    Ignored,
    /// Stopped by local validation; the engine was not called.
    Rejected(Rejection),
    /// The engine refused the command; nothing changed.
    Failed(Option<ActionErrorKind>),
    /// `suspended` is set when the loop stopped on a fate reveal, whether
    /// the command's own draw or one made later by an enemy.
    Applied { suspended: bool },
}

/// Builder for [`EncounterCoordinator`].
#[derive(Default)]
pub struct CoordinatorBuilder {
    config: RuntimeConfig,
    bus: Option<EventBus>,
}

impl CoordinatorBuilder {
    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish on an existing bus instead of a private one
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    fn take_bus(&mut self) -> EventBus {
        self.bus
            .take()
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size))
    }

    pub fn build<F>(
        mut self,
        context: EncounterContext,
        factory: &F,
    ) -> Result<EncounterCoordinator<F::Engine>, InitError>
    where
        F: EngineFactory,
    {
        context.validate()?;
        let engine = factory.create(&context)?;
        let bus = self.take_bus();
        Ok(EncounterCoordinator::assemble(engine, context, self.config, bus))
    }

    /// Pulls the context from the campaign.
    pub fn build_from_campaign<F>(
        self,
        campaign: &mut impl CampaignSource,
        factory: &F,
    ) -> Result<EncounterCoordinator<F::Engine>, InitError>
    where
        F: EngineFactory,
    {
        let context = campaign
            .make_encounter_context()
            .ok_or(InitError::NoActiveEncounter)?;
        self.build(context, factory)
    }

    /// Rebuilds a coordinator from a save.
    ///
    /// A save taken while reveals were pending resumes immediately: the
    /// engine already applied the draws, only the dramatization is skipped.
    /// An open mulligan comes back open with its selection; a closed one
    /// stays closed.
    pub fn restore<F>(
        mut self,
        save: CoordinatorSave,
        factory: &F,
    ) -> Result<EncounterCoordinator<F::Engine>, InitError>
    where
        F: EngineFactory,
    {
        save.check_version()?;
        let engine = factory.restore(&save.engine)?;
        let context = save.engine.context.clone();
        let bus = self.take_bus();

        let mut coordinator = EncounterCoordinator::assemble(engine, context, self.config, bus);
        coordinator.phase = save.phase;
        coordinator.round = save.round;
        coordinator.stats = save.stats;
        coordinator.started = save.started;
        coordinator.intents = save.intents;
        coordinator.next_token = save.next_token;
        coordinator.mulligan = save.mulligan;
        for entry in save.log {
            coordinator.log.push(entry);
        }
        coordinator.finished = save.result.is_some() || save.result_taken;
        coordinator.result = save.result;
        coordinator.result_taken = save.result_taken;

        tracing::info!(
            encounter = %coordinator.context.id,
            phase = %coordinator.phase,
            round = coordinator.round,
            "encounter restored"
        );
        if let Some(step) = save.resume {
            coordinator.run(step)?;
        }
        Ok(coordinator)
    }
}

/// Drives one encounter from context to result.
pub struct EncounterCoordinator<E: CombatEngine> {
    engine: E,
    context: EncounterContext,
    config: RuntimeConfig,
    bus: EventBus,
    phase: Phase,
    round: u32,
    view: EncounterView,
    intents: Vec<Intent>,
    flow: Flow,
    mulligan: MulliganGate,
    stats: CombatStats,
    log: CombatLog,
    feedback: Option<Feedback>,
    started: bool,
    finished: bool,
    result: Option<EncounterResult>,
    result_taken: bool,
    next_token: u64,
}

impl<E: CombatEngine> EncounterCoordinator<E> {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::default()
    }

    /// Validates `context` and builds the engine through `factory`.
    pub fn new<F>(context: EncounterContext, factory: &F, config: RuntimeConfig) -> Result<Self, InitError>
    where
        F: EngineFactory<Engine = E>,
    {
        Self::builder().config(config).build(context, factory)
    }

    pub fn from_campaign<F>(
        campaign: &mut impl CampaignSource,
        factory: &F,
        config: RuntimeConfig,
    ) -> Result<Self, InitError>
    where
        F: EngineFactory<Engine = E>,
    {
        Self::builder()
            .config(config)
            .build_from_campaign(campaign, factory)
    }

    pub fn restore<F>(save: CoordinatorSave, factory: &F, config: RuntimeConfig) -> Result<Self, InitError>
    where
        F: EngineFactory<Engine = E>,
    {
        Self::builder().config(config).restore(save, factory)
    }

    fn assemble(engine: E, context: EncounterContext, config: RuntimeConfig, bus: EventBus) -> Self {
        let view = engine.view();
        let log = CombatLog::new(config.log_capacity);
        Self {
            phase: view.phase,
            round: view.round.max(1),
            view,
            engine,
            context,
            config,
            bus,
            intents: Vec::new(),
            flow: Flow::Running,
            mulligan: MulliganGate::NotOffered,
            stats: CombatStats::new(),
            log,
            feedback: None,
            started: false,
            finished: false,
            result: None,
            result_taken: false,
            next_token: 0,
        }
    }

    // ===== observation =====

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn view(&self) -> &EncounterView {
        &self.view
    }

    pub fn context(&self) -> &EncounterContext {
        &self.context
    }

    /// Intents telegraphed for the current round.
    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn stats(&self) -> &CombatStats {
        &self.stats
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn pending_reveal(&self) -> Option<&RevealRequest> {
        self.flow.front()
    }

    pub fn is_awaiting_reveal(&self) -> bool {
        matches!(self.flow, Flow::AwaitingReveal { .. })
    }

    pub fn mulligan(&self) -> Option<&MulliganSession> {
        self.mulligan.session()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_torn_down(&self) -> bool {
        matches!(self.flow, Flow::TornDown)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Whether a submitted command would reach validation.
    pub fn accepts_commands(&self) -> bool {
        self.started
            && self.flow.is_running()
            && self.phase == Phase::PlayerAction
            && !self.mulligan.is_open()
    }

    // ===== lifecycle =====

    /// Enters round 1: telegraphs intents, then opens the mulligan or the
    /// player phase. Idempotent.
    pub fn start(&mut self) -> Result<(), CoordinatorError> {
        if self.is_torn_down() {
            return Err(CoordinatorError::TornDown);
        }
        if self.started {
            return Ok(());
        }
        self.started = true;
        tracing::info!(
            encounter = %self.context.id,
            enemies = self.view.enemies.len(),
            "encounter started"
        );
        self.bus.publish(PhaseEvent::Entered {
            encounter: self.context.id,
            phase: self.phase,
            round: self.round,
        });
        self.run(PhaseStep::BeginRound)
    }

    /// Routes a player command through the phase gate, local validation and
    /// the engine.
    pub fn submit(&mut self, command: ActionCommand) -> Result<Submission, CoordinatorError> {
        if !self.accepts_commands() || matches!(command, ActionCommand::Mulligan { .. }) {
            tracing::debug!(
                command = command.label(),
                phase = %self.phase,
                "command ignored"
            );
            return Ok(Submission::Ignored);
        }

        if let Err(rejection) = validate::check(&command, &self.view, &self.context.cards) {
            return Ok(self.reject(command, rejection));
        }

        let result = self.engine.perform_action(&command);
        if !result.success {
            let reason = result
                .error
                .map(|error| error.to_string())
                .unwrap_or_else(|| "refused".to_string());
            tracing::warn!(command = command.label(), %reason, "engine rejected command");
            self.log
                .warn(self.round, format!("{} failed: {reason}", command.label()));
            self.bus.publish(CombatEvent::ActionFailed {
                command,
                error: result.error,
            });
            return Ok(Submission::Failed(result.error));
        }

        self.clear_feedback();
        let reveals = self.apply_changes(&result.changes);
        self.bus.publish(CombatEvent::ActionApplied {
            command,
            changes: result.changes,
        });

        let resume = if self.view.is_over() {
            PhaseStep::Finish
        } else if self.view.fate_choice.is_some() {
            PhaseStep::AwaitPlayer
        } else {
            PhaseStep::EnterResolution
        };
        let suspended = self.suspend_or_run(reveals, resume)?;
        Ok(Submission::Applied { suspended })
    }

    /// Acknowledges that the front reveal finished presenting.
    pub fn dismiss_reveal(&mut self, token: RevealToken) -> Result<(), CoordinatorError> {
        let resume = self.flow.dismiss(token)?;
        self.bus.publish(RevealEvent::Dismissed { token });
        if let Some(step) = resume {
            tracing::debug!(?step, "resuming after reveals");
            self.run(step)?;
        }
        Ok(())
    }

    /// Advances time for transient feedback.
    pub fn update(&mut self, elapsed: Duration) {
        if self.is_torn_down() {
            return;
        }
        let expired = self
            .feedback
            .as_mut()
            .is_some_and(|feedback| feedback.tick(elapsed));
        if expired {
            self.clear_feedback();
        }
    }

    /// Drops any queued reveal and the pending resume without running it.
    /// Every later call is ignored.
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            return;
        }
        let dropped = self.flow.tear_down();
        self.mulligan.close();
        self.feedback = None;
        if dropped > 0 {
            self.bus.publish(RevealEvent::Discarded { count: dropped });
        }
        self.bus.publish(PhaseEvent::TornDown {
            encounter: self.context.id,
        });
        tracing::info!(
            encounter = %self.context.id,
            dropped_reveals = dropped,
            "coordinator torn down"
        );
    }

    /// Hands out the encounter result exactly once.
    pub fn take_result(&mut self) -> Option<EncounterResult> {
        let result = self.result.take();
        if result.is_some() {
            self.result_taken = true;
        }
        result
    }

    // ===== mulligan =====

    /// Flips a card in the mulligan selection; returns whether it is now
    /// selected.
    pub fn toggle_mulligan(&mut self, card: CardId) -> Result<bool, CoordinatorError> {
        if self.is_torn_down() {
            return Err(CoordinatorError::TornDown);
        }
        let session = self
            .mulligan
            .session_mut()
            .ok_or(CoordinatorError::MulliganNotOpen)?;
        session
            .toggle(card)
            .ok_or(CoordinatorError::MulliganCardNotInHand(card))
    }

    /// Replaces the selected cards and opens the player phase. The sub-phase
    /// closes whether or not the engine accepts the replacement.
    pub fn confirm_mulligan(&mut self) -> Result<Submission, CoordinatorError> {
        if self.is_torn_down() {
            return Err(CoordinatorError::TornDown);
        }
        let session = self.mulligan.close().ok_or(CoordinatorError::MulliganNotOpen)?;
        let cards = session.into_selection();
        let replaced = cards.len();

        if cards.is_empty() {
            self.close_mulligan(0);
            self.run(PhaseStep::OpenPlayerAction)?;
            return Ok(Submission::Applied { suspended: false });
        }

        let command = ActionCommand::Mulligan { cards };
        let result = self.engine.perform_action(&command);
        if !result.success {
            tracing::warn!(error = ?result.error, "mulligan refused by engine");
            self.log.warn(self.round, "the mulligan is refused");
            self.bus.publish(CombatEvent::ActionFailed {
                command,
                error: result.error,
            });
            self.close_mulligan(0);
            self.run(PhaseStep::OpenPlayerAction)?;
            return Ok(Submission::Failed(result.error));
        }

        let reveals = self.apply_changes(&result.changes);
        self.bus.publish(CombatEvent::ActionApplied {
            command,
            changes: result.changes,
        });
        self.close_mulligan(replaced);
        let suspended = self.suspend_or_run(reveals, PhaseStep::OpenPlayerAction)?;
        Ok(Submission::Applied { suspended })
    }

    /// Closes the mulligan without replacing anything.
    pub fn skip_mulligan(&mut self) -> Result<(), CoordinatorError> {
        if self.is_torn_down() {
            return Err(CoordinatorError::TornDown);
        }
        self.mulligan.close().ok_or(CoordinatorError::MulliganNotOpen)?;
        self.close_mulligan(0);
        self.run(PhaseStep::OpenPlayerAction)
    }

    fn close_mulligan(&mut self, replaced: usize) {
        tracing::debug!(replaced, "mulligan closed");
        self.bus.publish(PhaseEvent::MulliganClosed {
            encounter: self.context.id,
            replaced,
        });
    }

    fn mulligan_eligible(&self) -> bool {
        self.context.rules.mulligan_enabled
            && !self.view.hand.is_empty()
            && self.view.draw_pile_len > 0
    }

    // ===== persistence =====

    pub fn save(&self) -> Result<CoordinatorSave, CoordinatorError> {
        let resume = match &self.flow {
            Flow::TornDown => return Err(CoordinatorError::TornDown),
            Flow::AwaitingReveal { resume, .. } => Some(*resume),
            Flow::Running => None,
        };
        Ok(CoordinatorSave {
            version: CoordinatorSave::VERSION,
            engine: self.engine.create_save_state(),
            phase: self.phase,
            round: self.round,
            stats: self.stats,
            started: self.started,
            mulligan: self.mulligan.clone(),
            resume,
            intents: self.intents.clone(),
            log: self.log.iter().cloned().collect(),
            result: self.result.clone(),
            result_taken: self.result_taken,
            next_token: self.next_token,
        })
    }

    // ===== phase loop =====

    fn run(&mut self, first: PhaseStep) -> Result<(), CoordinatorError> {
        let mut next = Some(first);
        while let Some(step) = next {
            if !self.flow.is_running() {
                break;
            }
            tracing::trace!(?step, phase = %self.phase, "phase step");
            next = match step {
                PhaseStep::BeginRound => self.begin_round()?,
                PhaseStep::OpenPlayerAction => {
                    self.transition(Phase::PlayerAction)?;
                    None
                }
                PhaseStep::AwaitPlayer => None,
                PhaseStep::EnterResolution => {
                    self.transition(Phase::Resolution)?;
                    Some(PhaseStep::ResolveEnemies { from: 0 })
                }
                PhaseStep::ResolveEnemies { from } => self.resolve_enemies(from)?,
                PhaseStep::EnterRoundEnd => self.end_round()?,
                PhaseStep::Finish => self.finish()?,
            };
        }
        Ok(())
    }

    fn transition(&mut self, to: Phase) -> Result<(), CoordinatorError> {
        let from = self.phase;
        if !from.permits(to) {
            self.log
                .error(self.round, format!("cannot move from {from} to {to}"));
            return Err(CoordinatorError::IllegalTransition { from, to });
        }
        if to != Phase::Finished {
            let reported = self.engine.advance_phase();
            if reported != to {
                tracing::warn!(expected = %to, %reported, "engine phase out of step");
                self.log.error(
                    self.round,
                    format!("engine reported {reported} while entering {to}"),
                );
                return Err(CoordinatorError::EngineDesync {
                    expected: to,
                    reported,
                });
            }
        }
        if from == Phase::RoundEnd && to == Phase::Intent {
            self.round = self.round.saturating_add(1);
        }

        self.phase = to;
        self.view = self.engine.view();
        tracing::debug!(%from, %to, round = self.round, "phase transition");
        self.bus.publish(PhaseEvent::Entered {
            encounter: self.context.id,
            phase: to,
            round: self.round,
        });
        Ok(())
    }

    fn begin_round(&mut self) -> Result<Option<PhaseStep>, CoordinatorError> {
        if self.view.is_over() {
            return Ok(Some(PhaseStep::Finish));
        }

        let roster: Vec<EnemyId> = self.view.active_enemies().map(|enemy| enemy.id).collect();
        self.intents = roster
            .into_iter()
            .filter_map(|enemy| self.engine.generate_intent(enemy))
            .collect();
        self.view = self.engine.view();

        self.log.info(self.round, format!("round {} begins", self.round));
        for intent in &self.intents {
            self.log
                .info(self.round, format!("{} intends to {}", intent.enemy, intent.kind));
        }
        self.bus.publish(PhaseEvent::IntentsTelegraphed {
            round: self.round,
            intents: self.intents.clone(),
        });

        if self.round == 1 && self.mulligan == MulliganGate::NotOffered {
            if self.mulligan_eligible() {
                self.mulligan = MulliganGate::Open(MulliganSession::new(self.view.hand.clone()));
                tracing::debug!(encounter = %self.context.id, "mulligan offered");
                self.bus.publish(PhaseEvent::MulliganOpened {
                    encounter: self.context.id,
                });
                return Ok(None);
            }
            self.mulligan = MulliganGate::Closed;
        }

        Ok(Some(PhaseStep::OpenPlayerAction))
    }

    fn resolve_enemies(&mut self, from: usize) -> Result<Option<PhaseStep>, CoordinatorError> {
        let roster: Vec<EnemyId> = self.view.enemies.iter().map(|enemy| enemy.id).collect();

        for (index, enemy) in roster.iter().copied().enumerate().skip(from) {
            let telegraphed = self.intents.iter().any(|intent| intent.enemy == enemy);
            let active = self.view.enemy(enemy).is_some_and(EnemyView::is_active);
            if !telegraphed || !active {
                continue;
            }

            let result = self.engine.resolve_enemy_action(enemy);
            if result.success {
                let reveals = self.apply_changes(&result.changes);
                self.bus.publish(CombatEvent::EnemyResolved {
                    enemy,
                    changes: result.changes,
                });

                let over = self.view.is_over();
                if !reveals.is_empty() {
                    let resume = if over {
                        PhaseStep::Finish
                    } else if index + 1 < roster.len() {
                        PhaseStep::ResolveEnemies { from: index + 1 }
                    } else {
                        PhaseStep::EnterRoundEnd
                    };
                    self.suspend(reveals, resume)?;
                    return Ok(None);
                }
            } else {
                tracing::warn!(%enemy, error = ?result.error, "enemy action failed");
                self.log.warn(self.round, format!("{enemy} falters"));
                self.view = self.engine.view();
            }

            if self.view.is_over() {
                return Ok(Some(PhaseStep::Finish));
            }
        }

        Ok(Some(PhaseStep::EnterRoundEnd))
    }

    fn end_round(&mut self) -> Result<Option<PhaseStep>, CoordinatorError> {
        self.transition(Phase::RoundEnd)?;
        self.stats.complete_turn();
        self.transition(Phase::Intent)?;
        Ok(Some(PhaseStep::BeginRound))
    }

    fn finish(&mut self) -> Result<Option<PhaseStep>, CoordinatorError> {
        if self.phase != Phase::Finished {
            self.transition(Phase::Finished)?;
        }
        if !self.finished {
            self.finished = true;
            let result = self.engine.finish_encounter();
            self.view = self.engine.view();
            self.log
                .info(self.round, format!("the encounter is over: {}", result.outcome));
            tracing::info!(
                encounter = %result.encounter,
                outcome = %result.outcome,
                rounds = self.round,
                "encounter finished"
            );
            self.bus.publish(PhaseEvent::Finished {
                encounter: result.encounter,
                outcome: result.outcome,
            });
            self.result = Some(result);
        }
        Ok(None)
    }

    // ===== helpers =====

    fn apply_changes(&mut self, changes: &[EncounterStateChange]) -> VecDeque<RevealRequest> {
        let mut reveals = VecDeque::new();
        for change in changes {
            self.stats.record(change);
            self.log.info(self.round, change.describe());
            if let EncounterStateChange::FateDraw {
                card: Some(card),
                value,
                suit_match,
            } = change
            {
                let token = RevealToken(self.next_token);
                self.next_token = self.next_token.wrapping_add(1);
                reveals.push_back(RevealRequest {
                    token,
                    card: card.clone(),
                    value: *value,
                    suit_match: *suit_match,
                });
            }
        }
        self.view = self.engine.view();
        reveals
    }

    fn suspend_or_run(
        &mut self,
        reveals: VecDeque<RevealRequest>,
        resume: PhaseStep,
    ) -> Result<bool, CoordinatorError> {
        if reveals.is_empty() {
            self.run(resume)?;
        } else {
            self.suspend(reveals, resume)?;
        }
        Ok(self.is_awaiting_reveal())
    }

    fn suspend(
        &mut self,
        reveals: VecDeque<RevealRequest>,
        resume: PhaseStep,
    ) -> Result<(), CoordinatorError> {
        for request in &reveals {
            self.bus.publish(RevealEvent::Requested(request.clone()));
        }
        tracing::debug!(reveals = reveals.len(), ?resume, "suspending for fate reveal");
        self.flow.suspend(reveals, resume)
    }

    fn reject(&mut self, command: ActionCommand, rejection: Rejection) -> Submission {
        tracing::debug!(command = command.label(), %rejection, "command rejected locally");
        self.log.warn(self.round, rejection.to_string());
        if let Rejection::InsufficientFaith { .. } = rejection {
            self.feedback = Some(Feedback::new(
                FeedbackKind::InsufficientFaith,
                self.config.feedback_duration,
            ));
            self.bus
                .publish(FeedbackEvent::Raised(FeedbackKind::InsufficientFaith));
        }
        self.bus
            .publish(CombatEvent::ActionRejected { command, rejection });
        Submission::Rejected(rejection)
    }

    fn clear_feedback(&mut self) {
        if self.feedback.take().is_some() {
            self.bus.publish(FeedbackEvent::Cleared);
        }
    }
}
