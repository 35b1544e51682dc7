//! Built-in demo content: one hero, a small card pool, a fate deck and two
//! encounters.

use game_core::{
    Card, CardEffect, CardId, EnemyAbility, EnemyId, EnemySnapshot, FateCard, FateCardId,
    FateDeckState, Keyword, Modifier, RuleConfig, Suit,
};
use runtime::{EncounterPlan, HeroRecord, StaticContent};

use crate::Variant;

pub const SMITE: CardId = CardId(1);
pub const MEND: CardId = CardId(2);
pub const TITHE: CardId = CardId(3);
pub const BULWARK: CardId = CardId(4);
pub const OMEN: CardId = CardId(5);
pub const LANCE: CardId = CardId(6);
pub const EMBER: CardId = CardId(7);
pub const RELIC: CardId = CardId(9);

pub fn cards() -> Vec<Card> {
    vec![
        Card::new(SMITE, "Smite", 2, 3, CardEffect::Damage(5)),
        Card::new(MEND, "Mend", 1, 0, CardEffect::Heal(4)),
        Card::new(TITHE, "Tithe", 0, 0, CardEffect::Faith(2)),
        Card::new(BULWARK, "Bulwark", 1, 1, CardEffect::Ward(2)),
        Card::new(OMEN, "Omen", 1, 0, CardEffect::Foresight),
        Card::new(LANCE, "Lance", 3, 5, CardEffect::Damage(8)),
        Card::new(EMBER, "Ember", 0, 1, CardEffect::Damage(2)),
        Card::new(RELIC, "Relic", 2, 2, CardEffect::Faith(3)),
    ]
}

/// Twelve cards; the top of the pile is drawn first.
pub fn fate_deck() -> FateDeckState {
    let suits = [Suit::Light, Suit::Dark, Suit::Neutral];
    let cards = (0u32..12)
        .map(|index| {
            let value = index as i32 % 5 - 1;
            let card = FateCard::new(FateCardId(index), value, suits[index as usize % 3]);
            match index {
                2 => card.with_keyword(Keyword::Surge),
                5 => card.with_keyword(Keyword::Echo),
                7 => card.with_keyword(Keyword::Ward),
                9 => card.with_keyword(Keyword::Choice),
                11 => card.critical(),
                _ => card,
            }
        })
        .collect();
    FateDeckState::new(cards)
}

pub fn content() -> StaticContent {
    StaticContent {
        cards: cards(),
        fate_deck: fate_deck(),
    }
}

pub fn hero() -> HeroRecord {
    HeroRecord {
        name: "Wanderer".to_string(),
        hp: 24,
        max_hp: 24,
        strength: 4,
        wisdom: 3,
        armor: 1,
        faith: 2,
        deck: vec![SMITE, MEND, TITHE, BULWARK, OMEN, LANCE, EMBER],
    }
}

fn rules(allow_flee: bool) -> RuleConfig {
    RuleConfig {
        allow_flee,
        ..RuleConfig::new()
    }
}

/// The scripted campaign: a roadside ambush played with the disposition
/// layout, then a ritual duel in the crypt.
pub fn encounters(allow_flee: bool) -> Vec<(EncounterPlan, Variant)> {
    let ambush = EncounterPlan::new(vec![
        EnemySnapshot::new(EnemyId(1), "Wolf", 14, 3, 1).with_loot(vec![RELIC]),
        EnemySnapshot::new(EnemyId(2), "Crow", 8, 2, 0).with_will(4),
    ])
    .with_rules(rules(allow_flee));

    let crypt = EncounterPlan::new(vec![
        EnemySnapshot::new(EnemyId(1), "Shade", 16, 3, 0)
            .with_will(6)
            .with_ability(EnemyAbility::Summon)
            .with_weakness(Keyword::Surge),
        EnemySnapshot::new(EnemyId(2), "Ogre", 14, 3, 2).with_ability(EnemyAbility::Rage),
    ])
    .with_rules(rules(allow_flee))
    .with_modifier(Modifier::FateBias(1));

    vec![(ambush, Variant::Disposition), (crypt, Variant::Ritual)]
}
