//! The scene loop shared by every combat presentation.
//!
//! [`PhaseDrivenCombat`] glues a gesture interpreter, a zone layout and a
//! reveal sequencer onto one [`EncounterCoordinator`]. Variants differ only in
//! the interpreter and zone resolver they are built with; see
//! [`RitualCombat`] and [`DispositionCombat`].

use std::time::Duration;

use game_core::{ActionCommand, CardId, CardUseMode, CombatEngine, EncounterResult, EnemyId, EnemyView, Intent};
use runtime::{CoordinatorError, EncounterCoordinator, Submission};

use crate::config::FrontendConfig;
use crate::gesture::{ActionGestureInterpreter, GestureCommand, GestureInterpreter};
use crate::reveal::{RevealSequencer, RevealStep};
use crate::zone::{Offset, Point, RadialZones, YBandZones, Zone, ZoneResolver};

/// Result of releasing a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TouchOutcome {
    /// No gesture was in flight.
    Nothing,
    /// Tapped without dragging.
    Selected(CardId),
    /// Dropped outside every zone; the card goes back to hand.
    ReturnedToOrigin(CardId),
    /// Dropped into a zone and forwarded to the coordinator.
    Submitted(Submission),
}

/// Ritual circle presentation: radial zones around the table.
pub type RitualCombat<E> = PhaseDrivenCombat<ActionGestureInterpreter, RadialZones, E>;

/// Disposition presentation: strike, influence and sacrifice bands.
pub type DispositionCombat<E> = PhaseDrivenCombat<ActionGestureInterpreter, YBandZones, E>;

pub struct PhaseDrivenCombat<I, Z, E>
where
    I: GestureInterpreter,
    Z: ZoneResolver,
    E: CombatEngine,
{
    coordinator: EncounterCoordinator<E>,
    interpreter: I,
    zones: Z,
    sequencer: RevealSequencer,
    focus: Option<EnemyId>,
}

impl<E: CombatEngine> RitualCombat<E> {
    pub fn ritual(coordinator: EncounterCoordinator<E>, config: &FrontendConfig) -> Self {
        PhaseDrivenCombat::new(
            coordinator,
            ActionGestureInterpreter::new(config.drag_threshold),
            RadialZones::ritual_layout(),
            RevealSequencer::new(config.reveal),
        )
    }
}

impl<E: CombatEngine> DispositionCombat<E> {
    pub fn disposition(coordinator: EncounterCoordinator<E>, config: &FrontendConfig) -> Self {
        PhaseDrivenCombat::new(
            coordinator,
            ActionGestureInterpreter::new(config.drag_threshold),
            YBandZones::disposition_layout(),
            RevealSequencer::new(config.reveal),
        )
    }
}

impl<I, Z, E> PhaseDrivenCombat<I, Z, E>
where
    I: GestureInterpreter,
    Z: ZoneResolver,
    E: CombatEngine,
{
    pub fn new(coordinator: EncounterCoordinator<E>, interpreter: I, zones: Z, sequencer: RevealSequencer) -> Self {
        Self {
            coordinator,
            interpreter,
            zones,
            sequencer,
            focus: None,
        }
    }

    pub fn coordinator(&self) -> &EncounterCoordinator<E> {
        &self.coordinator
    }

    /// Direct access for commands without a gesture (mulligan, fate choices).
    /// Reveals raised through it are picked up on the next [`update`](Self::update).
    pub fn coordinator_mut(&mut self) -> &mut EncounterCoordinator<E> {
        &mut self.coordinator
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    pub fn zones(&self) -> &Z {
        &self.zones
    }

    pub fn sequencer(&self) -> &RevealSequencer {
        &self.sequencer
    }

    pub fn start(&mut self) -> Result<(), CoordinatorError> {
        self.coordinator.start()?;
        self.sync_reveal();
        Ok(())
    }

    // ===== targeting =====

    /// The explicit focus while it is still standing, otherwise the first
    /// active enemy.
    pub fn focus_target(&self) -> Option<EnemyId> {
        let view = self.coordinator.view();
        self.focus
            .filter(|id| view.enemy(*id).is_some_and(EnemyView::is_active))
            .or_else(|| view.active_enemies().next().map(|enemy| enemy.id))
    }

    /// Returns false when `enemy` cannot be targeted.
    pub fn set_focus(&mut self, enemy: EnemyId) -> bool {
        let targetable = self
            .coordinator
            .view()
            .enemy(enemy)
            .is_some_and(EnemyView::is_active);
        if targetable {
            self.focus = Some(enemy);
        }
        targetable
    }

    /// Enemy intents for this round, next to the enemy they belong to.
    pub fn telegraph(&self) -> Vec<(&EnemyView, &Intent)> {
        let view = self.coordinator.view();
        self.coordinator
            .intents()
            .iter()
            .filter_map(|intent| view.enemy(intent.enemy).map(|enemy| (enemy, intent)))
            .collect()
    }

    // ===== gestures =====

    /// Starts dragging `card`. Refused outside the player phase and for
    /// cards not in hand.
    pub fn begin_touch(&mut self, card: CardId, at: Point) -> bool {
        if !self.coordinator.accepts_commands() || !self.coordinator.view().hand.contains(&card) {
            tracing::trace!(%card, phase = %self.coordinator.phase(), "touch refused");
            return false;
        }
        self.interpreter.begin_touch(card, at)
    }

    pub fn drag(&mut self, offset: Offset) {
        self.interpreter.update_drag(offset);
    }

    pub fn end_touch(&mut self) -> Result<TouchOutcome, CoordinatorError> {
        let Some(command) = self.interpreter.end_touch() else {
            return Ok(TouchOutcome::Nothing);
        };

        match command {
            GestureCommand::Select { card } => Ok(TouchOutcome::Selected(card)),
            GestureCommand::Drop { card, position } => {
                let zone = self.zones.resolve(position);
                match self.action_for(zone, card) {
                    Some(action) => {
                        tracing::debug!(%card, %zone, "card committed");
                        self.submit(action).map(TouchOutcome::Submitted)
                    }
                    None => {
                        tracing::debug!(%card, "card returned to hand");
                        Ok(TouchOutcome::ReturnedToOrigin(card))
                    }
                }
            }
            GestureCommand::Cancel { .. } => Ok(TouchOutcome::Nothing),
        }
    }

    pub fn cancel_touch(&mut self) -> Option<CardId> {
        self.interpreter.cancel().map(|command| command.card())
    }

    /// Command for dropping `card` into `zone`; `None` sends it back.
    pub fn action_for(&self, zone: Zone, card: CardId) -> Option<ActionCommand> {
        let (mode, target) = match zone {
            Zone::Strike => (CardUseMode::Strike, self.focus_target()),
            Zone::Influence => (CardUseMode::Influence, self.focus_target()),
            Zone::Sacrifice | Zone::Burn => (CardUseMode::Sacrifice, None),
            Zone::Circle => (CardUseMode::Play, self.focus_target()),
            Zone::None => return None,
        };
        Some(ActionCommand::UseCard { card, target, mode })
    }

    pub fn submit(&mut self, command: ActionCommand) -> Result<Submission, CoordinatorError> {
        let submission = self.coordinator.submit(command)?;
        self.sync_reveal();
        Ok(submission)
    }

    // ===== time =====

    /// Advances feedback and the reveal in progress. A finished reveal is
    /// handed back to the coordinator, which may resume the round and queue
    /// the next one; time left over from this frame goes to that next one.
    pub fn update(&mut self, elapsed: Duration) -> Result<RevealStep, CoordinatorError> {
        if self.coordinator.is_torn_down() {
            return Ok(RevealStep::default());
        }
        self.coordinator.update(elapsed);

        let step = self.sequencer.advance(elapsed);
        if let Some(token) = step.completed {
            self.coordinator.dismiss_reveal(token)?;
            self.start_reveal(step.leftover);
        }
        self.sync_reveal();
        Ok(step)
    }

    /// Starts presenting the coordinator's front reveal if the sequencer is
    /// free.
    fn sync_reveal(&mut self) {
        self.start_reveal(Duration::ZERO);
    }

    fn start_reveal(&mut self, carried: Duration) {
        if self.sequencer.is_busy() {
            return;
        }
        if let Some(request) = self.coordinator.pending_reveal().cloned()
            && let Err(error) = self.sequencer.begin_reveal_carrying(request, carried)
        {
            tracing::warn!(%error, "reveal not started");
        }
    }

    // ===== lifecycle =====

    pub fn teardown(&mut self) {
        if self.coordinator.is_torn_down() {
            return;
        }
        let gesture = self.interpreter.cancel();
        let reveal = self.sequencer.reset();
        self.coordinator.teardown();
        tracing::info!(
            encounter = %self.coordinator.context().id,
            cancelled_gesture = gesture.is_some(),
            cancelled_reveal = reveal.is_some(),
            "scene torn down"
        );
    }

    pub fn take_result(&mut self) -> Option<EncounterResult> {
        self.coordinator.take_result()
    }
}
