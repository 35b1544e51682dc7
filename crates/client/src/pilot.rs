//! Scripted player that drives a scene through gestures, the way a person
//! would: pick a card, drag it to a zone, wait for the reveal.

use std::time::Duration;

use anyhow::{Result, bail};
use client_frontend_core::{GestureInterpreter, Offset, PhaseDrivenCombat, Point, TouchOutcome, Zone, ZoneResolver};
use game_core::{ActionCommand, Card, CardEffect, CardId, CombatEngine, EncounterResult};
use runtime::Submission;

/// Where cards rest before they are picked up; outside every zone.
const HAND: Point = Point::new(0.0, 520.0);

pub struct Pilot {
    frame: Duration,
    max_rounds: u32,
}

impl Pilot {
    pub fn new(frame: Duration, max_rounds: u32) -> Self {
        Self { frame, max_rounds }
    }

    /// Plays until the encounter finishes. Returns `None` when the round
    /// limit was hit and the scene torn down instead.
    pub fn play<I, Z, E>(&self, scene: &mut PhaseDrivenCombat<I, Z, E>) -> Result<Option<EncounterResult>>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        scene.start()?;

        while !scene.coordinator().is_finished() {
            let coordinator = scene.coordinator();
            if coordinator.round() > self.max_rounds {
                tracing::warn!(round = coordinator.round(), "round limit reached, abandoning encounter");
                scene.teardown();
                return Ok(None);
            }

            if coordinator.is_awaiting_reveal() {
                scene.update(self.frame)?;
            } else if coordinator.mulligan().is_some() {
                self.mulligan(scene)?;
            } else if coordinator.accepts_commands() {
                self.take_turn(scene)?;
            } else {
                bail!("coordinator stalled in {}", coordinator.phase());
            }
        }

        Ok(scene.take_result())
    }

    /// Throws back every card the hero cannot pay for yet.
    fn mulligan<I, Z, E>(&self, scene: &mut PhaseDrivenCombat<I, Z, E>) -> Result<()>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        let coordinator = scene.coordinator();
        let faith = coordinator.view().hero.faith;
        let expensive: Vec<CardId> = coordinator
            .mulligan()
            .map(|session| {
                session
                    .hand()
                    .iter()
                    .copied()
                    .filter(|card| coordinator.context().card(*card).is_some_and(|c| c.cost > faith + 1))
                    .collect()
            })
            .unwrap_or_default();

        let coordinator = scene.coordinator_mut();
        for card in &expensive {
            coordinator.toggle_mulligan(*card)?;
        }
        let submission = coordinator.confirm_mulligan()?;
        tracing::debug!(replaced = expensive.len(), ?submission, "mulligan confirmed");
        Ok(())
    }

    fn take_turn<I, Z, E>(&self, scene: &mut PhaseDrivenCombat<I, Z, E>) -> Result<()>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        let view = scene.coordinator().view();
        if view.fate_choice.is_some() {
            return self.submit_or_wait(scene, ActionCommand::ResolveFateChoice { option: 0 });
        }

        let hero = view.hero;
        if scene.coordinator().context().rules.allow_flee && hero.hp.saturating_mul(4) <= hero.max_hp {
            return self.submit_or_wait(scene, ActionCommand::Flee);
        }

        if let Some((card, point)) = self.pick_card(scene)
            && let TouchOutcome::Submitted(Submission::Applied { .. }) = self.drag_card(scene, card, point)?
        {
            return Ok(());
        }

        match scene.focus_target() {
            Some(target) => self.submit_or_wait(scene, ActionCommand::Attack { target }),
            None => self.submit_or_wait(scene, ActionCommand::Wait),
        }
    }

    /// First playable card and the drop point of the zone it should go to.
    fn pick_card<I, Z, E>(&self, scene: &PhaseDrivenCombat<I, Z, E>) -> Option<(CardId, Point)>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        let coordinator = scene.coordinator();
        let view = coordinator.view();
        let faith = view.hero.faith;
        let wounded = view.hero.hp.saturating_mul(2) <= view.hero.max_hp;
        let spirited = scene
            .focus_target()
            .and_then(|target| view.enemy(target))
            .is_some_and(|enemy| enemy.will > 0);

        let hand: Vec<&Card> = view
            .hand
            .iter()
            .filter_map(|card| coordinator.context().card(*card))
            .collect();
        let affordable = |card: &&Card| card.cost <= faith;

        let mut wishes: Vec<(CardId, Zone)> = Vec::new();
        if wounded {
            wishes.extend(
                hand.iter()
                    .copied()
                    .filter(affordable)
                    .filter(|card| matches!(card.effect, CardEffect::Heal(_) | CardEffect::Ward(_)))
                    .map(|card| (card.id, Zone::Circle)),
            );
        }
        if spirited {
            wishes.extend(hand.iter().copied().filter(affordable).map(|card| (card.id, Zone::Influence)));
        }
        wishes.extend(
            hand.iter()
                .copied()
                .filter(affordable)
                .filter(|card| card.power > 0)
                .map(|card| (card.id, Zone::Strike)),
        );
        wishes.extend(
            hand.iter()
                .copied()
                .filter(affordable)
                .filter(|card| matches!(card.effect, CardEffect::Faith(_) | CardEffect::Foresight))
                .map(|card| (card.id, Zone::Circle)),
        );
        if let Some(cheapest) = hand.iter().min_by_key(|card| card.cost)
            && faith < cheapest.cost.max(1)
        {
            wishes.push((cheapest.id, Zone::Sacrifice));
            wishes.push((cheapest.id, Zone::Burn));
        }

        wishes
            .into_iter()
            .find_map(|(card, zone)| scene.zones().center_of(zone).map(|point| (card, point)))
    }

    fn drag_card<I, Z, E>(
        &self,
        scene: &mut PhaseDrivenCombat<I, Z, E>,
        card: CardId,
        to: Point,
    ) -> Result<TouchOutcome>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        if !scene.begin_touch(card, HAND) {
            return Ok(TouchOutcome::Nothing);
        }
        let travel = Offset::new(to.x - HAND.x, to.y - HAND.y);
        scene.drag(Offset::new(travel.dx / 2.0, travel.dy / 2.0));
        scene.drag(travel);
        let outcome = scene.end_touch()?;
        tracing::debug!(%card, ?outcome, "card dragged");
        Ok(outcome)
    }

    /// Submits `command`; waits instead when it does not go through so the
    /// round always advances.
    fn submit_or_wait<I, Z, E>(&self, scene: &mut PhaseDrivenCombat<I, Z, E>, command: ActionCommand) -> Result<()>
    where
        I: GestureInterpreter,
        Z: ZoneResolver,
        E: CombatEngine,
    {
        let label = command.label();
        match scene.submit(command)? {
            Submission::Applied { .. } | Submission::Ignored => Ok(()),
            refused => {
                tracing::debug!(command = label, ?refused, "falling back to wait");
                scene.submit(ActionCommand::Wait)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_frontend_core::{DispositionCombat, FrontendConfig, RevealTimings, RitualCombat};
    use game_core::BaselineEngineFactory;
    use runtime::{Campaign, CampaignState, CoordinatorBuilder, RuntimeConfig};

    use crate::content;

    fn campaign() -> Campaign<runtime::StaticContent> {
        Campaign::new(CampaignState::new(content::hero(), 7), content::content())
    }

    fn frontend() -> FrontendConfig {
        FrontendConfig::new(12.0, RevealTimings::default())
    }

    #[test]
    fn plays_disposition_encounter_to_the_end() {
        let mut campaign = campaign();
        let (plan, _) = content::encounters(false).remove(0);
        campaign.begin_encounter(plan).expect("no open slot");
        let coordinator = CoordinatorBuilder::default()
            .config(RuntimeConfig::default())
            .build_from_campaign(&mut campaign, &BaselineEngineFactory)
            .expect("valid context");
        let mut scene = DispositionCombat::disposition(coordinator, &frontend());

        let result = Pilot::new(Duration::from_millis(50), 60)
            .play(&mut scene)
            .expect("protocol holds")
            .expect("finished within the limit");
        assert!(scene.coordinator().is_finished());
        assert!(scene.coordinator().stats().turns_played >= 1);
        assert!(scene.take_result().is_none());
        assert_eq!(Some(result.encounter), campaign.state.open_encounter().map(|slot| slot.id));
    }

    #[test]
    fn round_limit_tears_the_scene_down() {
        let mut campaign = campaign();
        let (plan, _) = content::encounters(false).remove(1);
        campaign.begin_encounter(plan).expect("no open slot");
        let coordinator = CoordinatorBuilder::default()
            .build_from_campaign(&mut campaign, &BaselineEngineFactory)
            .expect("valid context");
        let mut scene = RitualCombat::ritual(coordinator, &frontend());

        let result = Pilot::new(Duration::from_millis(50), 0)
            .play(&mut scene)
            .expect("protocol holds");
        assert_eq!(result, None);
        assert!(scene.coordinator().is_torn_down());
    }
}
