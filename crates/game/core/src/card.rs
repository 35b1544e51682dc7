//! Hero cards and the fate deck.

use crate::ids::{CardId, FateCardId};

/// Native effect of a hero card when it is played into the circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardEffect {
    /// Deals damage to the targeted enemy.
    Damage(u32),
    /// Restores hero hit points.
    Heal(u32),
    /// Grants faith.
    Faith(u32),
    /// Raises the hero's armor until the round ends.
    Ward(u32),
    /// Reveals a fate card and shifts resonance by its suit.
    Foresight,
}

impl CardEffect {
    /// Whether the effect needs an enemy target.
    pub const fn needs_target(&self) -> bool {
        matches!(self, Self::Damage(_))
    }
}

/// Definition of a hero card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Faith paid to play, strike or influence with this card.
    pub cost: u32,
    /// Bonus added when the card is committed as a strike or influence.
    pub power: u32,
    pub effect: CardEffect,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<String>, cost: u32, power: u32, effect: CardEffect) -> Self {
        Self {
            id,
            name: name.into(),
            cost,
            power,
            effect,
        }
    }
}

/// Alignment of a fate card. A suit that agrees with the sign of world
/// resonance is a suit match.
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
pub enum Suit {
    Light,
    Dark,
    #[default]
    Neutral,
}

impl Suit {
    /// Returns true if this suit agrees with the given world resonance.
    pub fn matches_resonance(self, resonance: f32) -> bool {
        match self {
            Suit::Light => resonance > 0.0,
            Suit::Dark => resonance < 0.0,
            Suit::Neutral => false,
        }
    }

    /// Resonance shift applied when a card of this suit is foreseen.
    pub fn resonance_shift(self) -> f32 {
        match self {
            Suit::Light => 1.0,
            Suit::Dark => -1.0,
            Suit::Neutral => 0.0,
        }
    }
}

/// Keyword printed on a fate card.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Keyword {
    /// Extra damage on top of the card value.
    Surge,
    /// Spirit blows land harder.
    Focus,
    /// The hero regains one faith.
    Echo,
    /// Dark keyword, enemies are often weak or resistant to it.
    Shadow,
    /// Blunts the incoming or outgoing blow.
    Ward,
    /// Offers the hero a choice after the action resolves.
    Choice,
}

/// One card of the fate deck.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FateCard {
    pub id: FateCardId,
    /// Signed modifier applied to the blow.
    pub value: i32,
    pub suit: Suit,
    pub keyword: Option<Keyword>,
    /// Critical cards double their value.
    pub critical: bool,
}

impl FateCard {
    pub fn new(id: FateCardId, value: i32, suit: Suit) -> Self {
        Self {
            id,
            value,
            suit,
            keyword: None,
            critical: false,
        }
    }

    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Value after the critical multiplier.
    pub fn effective_value(&self) -> i32 {
        if self.critical {
            self.value.saturating_mul(2)
        } else {
            self.value
        }
    }
}

/// Contents of the fate deck. The top of the draw pile is the last element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FateDeckState {
    pub draw_pile: Vec<FateCard>,
    pub discard: Vec<FateCard>,
}

impl FateDeckState {
    pub fn new(draw_pile: Vec<FateCard>) -> Self {
        Self {
            draw_pile,
            discard: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.draw_pile.len() + self.discard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty() && self.discard.is_empty()
    }
}
