//! Damage calculation and application.

use crate::card::Keyword;

/// Extra damage when a blow carries the keyword an enemy is weak to.
pub const WEAKNESS_BONUS: u32 = 2;

/// How an enemy's affinities changed a blow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    Neutral,
    Weak(Keyword),
    Resistant(Keyword),
}

/// Calculate damage from a blow.
///
/// # Formula
///
/// ```text
/// raw     = attack + fate_modifier        (fate may be negative)
/// reduced = raw - defense                 (floored at 0)
/// ```
pub fn calculate_damage(attack: u32, fate_modifier: i32, defense: u32) -> u32 {
    let raw = (attack as i64 + fate_modifier as i64).max(0) as u64;
    raw.saturating_sub(defense as u64).min(u32::MAX as u64) as u32
}

/// Adjust damage for the keyword carried by the blow.
pub fn apply_affinity(
    damage: u32,
    keyword: Option<Keyword>,
    weakness: Option<Keyword>,
    resistance: Option<Keyword>,
) -> (u32, Affinity) {
    match keyword {
        Some(keyword) if weakness == Some(keyword) => (
            damage.saturating_add(WEAKNESS_BONUS),
            Affinity::Weak(keyword),
        ),
        Some(keyword) if resistance == Some(keyword) => (damage / 2, Affinity::Resistant(keyword)),
        _ => (damage, Affinity::Neutral),
    }
}

/// Apply damage to a pool, returning the new value (saturating at 0).
pub fn apply_damage(current: u32, damage: u32) -> u32 {
    current.saturating_sub(damage)
}

/// Apply healing to a pool, capped at `max`.
pub fn apply_healing(current: u32, amount: u32, max: u32) -> u32 {
    current.saturating_add(amount).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fate_can_zero_the_blow() {
        assert_eq!(calculate_damage(3, -5, 0), 0);
        assert_eq!(calculate_damage(6, 2, 3), 5);
    }

    #[test]
    fn affinity_adjusts_damage() {
        let shadow = Some(Keyword::Shadow);
        assert_eq!(
            apply_affinity(4, shadow, shadow, None),
            (6, Affinity::Weak(Keyword::Shadow))
        );
        assert_eq!(
            apply_affinity(5, shadow, None, shadow),
            (2, Affinity::Resistant(Keyword::Shadow))
        );
        assert_eq!(apply_affinity(5, None, shadow, None), (5, Affinity::Neutral));
    }

    #[test]
    fn pools_saturate() {
        assert_eq!(apply_damage(3, 10), 0);
        assert_eq!(apply_healing(8, 5, 10), 10);
    }
}
