use game_core::{EncounterId, EncounterOutcome, EncounterResult};

use super::{CampaignContent, CampaignState};
use crate::api::ReconcileError;

/// What a successful commit changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub encounter: EncounterId,
    pub outcome: EncounterOutcome,
    pub hp_before: u32,
    pub hp_after: u32,
    pub faith_gained: u32,
    pub loot_added: usize,
    pub flags_set: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommitSummary),
    /// The encounter was reconciled before; nothing changed.
    AlreadyApplied,
}

/// Terminal step of an encounter: folds its transaction into the campaign.
pub struct ResultReconciler<C> {
    content: C,
}

impl<C: CampaignContent> ResultReconciler<C> {
    pub fn new(content: C) -> Self {
        Self { content }
    }

    /// Commits `result` to `state` exactly once per encounter id.
    pub fn apply(
        &self,
        state: &mut CampaignState,
        result: &EncounterResult,
    ) -> Result<CommitOutcome, ReconcileError> {
        if state.is_applied(result.encounter) {
            tracing::debug!(encounter = %result.encounter, "result already reconciled");
            return Ok(CommitOutcome::AlreadyApplied);
        }
        if state.is_abandoned(result.encounter) {
            tracing::warn!(encounter = %result.encounter, "result for abandoned encounter");
            return Err(ReconcileError::Abandoned(result.encounter));
        }
        let slot = state
            .open_encounter()
            .ok_or(ReconcileError::NoOpenEncounter)?;
        if slot.id != result.encounter {
            return Err(ReconcileError::SlotMismatch {
                expected: slot.id,
                received: result.encounter,
            });
        }

        let transaction = &result.transaction;
        let hp_before = state.hero.hp;
        let hp_after = (hp_before as i64 + transaction.hp_delta as i64)
            .clamp(0, state.hero.max_hp as i64) as u32;
        state.hero.hp = hp_after;

        state.world_resonance += transaction.resonance_delta;

        state.fate_deck = match &transaction.updated_fate_deck {
            Some(deck) => Some(deck.clone()),
            None => Some(
                state
                    .fate_deck
                    .take()
                    .unwrap_or_else(|| self.content.default_fate_deck()),
            ),
        };

        let faith_gained = transaction.faith_delta.max(0) as u32;
        state.hero.faith = state.hero.faith.saturating_add(faith_gained);

        state.hero.deck.extend(transaction.loot_cards.iter().copied());

        for (flag, value) in &transaction.world_flags {
            state.world_flags.insert(flag.clone(), *value);
        }

        state.close_slot(result.encounter, result.outcome);
        tracing::info!(
            encounter = %result.encounter,
            outcome = %result.outcome,
            hp = hp_after,
            loot = transaction.loot_cards.len(),
            "encounter result reconciled"
        );

        Ok(CommitOutcome::Committed(CommitSummary {
            encounter: result.encounter,
            outcome: result.outcome,
            hp_before,
            hp_after,
            faith_gained,
            loot_added: transaction.loot_cards.len(),
            flags_set: transaction.world_flags.len(),
        }))
    }
}
