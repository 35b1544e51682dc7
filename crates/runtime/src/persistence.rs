//! Mid-combat save states.
//!
//! The engine's own save state is opaque and passed through untouched; the
//! coordinator adds its phase, counters, mulligan gate, combat log and the
//! resume step it was parked on.

use game_core::{CombatStats, EncounterResult, EncounterSaveState, Intent, Phase};
use serde::{Deserialize, Serialize};

use crate::api::SaveError;
use crate::coordinator::{LogEntry, MulliganGate, PhaseStep};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorSave {
    pub version: u32,
    pub engine: EncounterSaveState,
    pub phase: Phase,
    pub round: u32,
    pub stats: CombatStats,
    pub started: bool,
    pub mulligan: MulliganGate,
    /// Step to run immediately after restoring.
    pub resume: Option<PhaseStep>,
    pub intents: Vec<Intent>,
    /// Oldest first; trimmed to the restoring coordinator's log capacity.
    pub log: Vec<LogEntry>,
    pub result: Option<EncounterResult>,
    pub result_taken: bool,
    pub next_token: u64,
}

impl CoordinatorSave {
    pub const VERSION: u32 = 2;

    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(SaveError::Encode)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let save: Self = serde_json::from_str(json).map_err(SaveError::Decode)?;
        save.check_version()?;
        Ok(save)
    }

    pub(crate) fn check_version(&self) -> Result<(), SaveError> {
        if self.version != Self::VERSION {
            return Err(SaveError::Version {
                expected: Self::VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}
