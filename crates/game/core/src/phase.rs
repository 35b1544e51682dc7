/// Phase of an encounter round.
///
/// Successor table, single round:
///
/// ```text
/// Intent -> PlayerAction -> Resolution -> RoundEnd -> Intent (next round)
///            \______________\_________________________-> Finished
/// ```
///
/// `Finished` is reachable from any phase through the encounter-end check
/// and is absorbing.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Phase {
    /// Enemy intents for the upcoming round are computed and telegraphed.
    #[default]
    Intent,
    /// The only phase in which player commands reach the engine.
    PlayerAction,
    /// Enemies act.
    Resolution,
    /// Round bookkeeping before the next intent.
    RoundEnd,
    /// Terminal.
    Finished,
}

impl Phase {
    /// Nominal successor in the round cycle.
    pub const fn next(self) -> Phase {
        match self {
            Phase::Intent => Phase::PlayerAction,
            Phase::PlayerAction => Phase::Resolution,
            Phase::Resolution => Phase::RoundEnd,
            Phase::RoundEnd => Phase::Intent,
            Phase::Finished => Phase::Finished,
        }
    }

    /// Returns true if moving from `self` to `to` is allowed by the
    /// successor table (nominal successor or the end-check shortcut).
    pub fn permits(self, to: Phase) -> bool {
        match self {
            Phase::Finished => false,
            _ => to == self.next() || to == Phase::Finished,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished)
    }
}
