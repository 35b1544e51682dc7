/// Rule switches handed to the combat engine through the encounter context.
///
/// The orchestration layer never interprets these; they are part of the
/// immutable [`EncounterContext`](crate::EncounterContext) so a restored
/// encounter keeps the rules it started with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleConfig {
    /// Whether the hero may attempt to flee at all.
    pub allow_flee: bool,
    /// Chance (1-100) that a permitted flee attempt succeeds.
    pub flee_chance_percent: u32,
    /// Hero attacks reveal a fate card that modifies the blow.
    pub fate_on_attack: bool,
    /// Enemy attacks reveal a fate card that modifies the blow.
    pub enemy_fate_draws: bool,
    /// Cards dealt into the starting hand.
    pub hand_size: usize,
    /// Offer the one-time pre-combat mulligan.
    pub mulligan_enabled: bool,
}

impl RuleConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FLEE_CHANCE_PERCENT: u32 = 50;
    pub const DEFAULT_HAND_SIZE: usize = 5;

    // ===== compile-time constants =====
    /// Armor granted by a `Wait` (defensive stance) until the round ends.
    pub const DEFEND_ARMOR_BONUS: i32 = 3;
    /// Faith restored by a `Wait`.
    pub const WAIT_FAITH_GAIN: i32 = 1;
    /// Shield an enemy raises when it defends.
    pub const GUARD_SHIELD: u32 = 2;
    /// Shield an enemy raises when its rage triggers.
    pub const RAGE_SHIELD: u32 = 3;
    /// Resonance shift when an enemy is slain.
    pub const KILL_RESONANCE_SHIFT: f32 = -1.0;
    /// Resonance shift when an enemy is pacified.
    pub const PACIFY_RESONANCE_SHIFT: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            allow_flee: true,
            flee_chance_percent: Self::DEFAULT_FLEE_CHANCE_PERCENT,
            fate_on_attack: true,
            enemy_fate_draws: false,
            hand_size: Self::DEFAULT_HAND_SIZE,
            mulligan_enabled: true,
        }
    }

    /// Rules without any randomness from the fate deck.
    pub fn without_fate() -> Self {
        Self {
            fate_on_attack: false,
            enemy_fate_draws: false,
            ..Self::new()
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::new()
    }
}
