use std::collections::BTreeSet;

use game_core::CardId;
use serde::{Deserialize, Serialize};

/// The one-time pre-combat hand replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulliganSession {
    hand: Vec<CardId>,
    selected: BTreeSet<CardId>,
}

impl MulliganSession {
    pub(crate) fn new(hand: Vec<CardId>) -> Self {
        Self {
            hand,
            selected: BTreeSet::new(),
        }
    }

    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    pub fn is_selected(&self, card: CardId) -> bool {
        self.selected.contains(&card)
    }

    pub fn selected(&self) -> impl Iterator<Item = CardId> + '_ {
        self.selected.iter().copied()
    }

    /// Flips the selection of `card`. Returns `None` if it is not in hand,
    /// otherwise whether it is now selected.
    pub(crate) fn toggle(&mut self, card: CardId) -> Option<bool> {
        if !self.hand.contains(&card) {
            return None;
        }
        if self.selected.remove(&card) {
            Some(false)
        } else {
            self.selected.insert(card);
            Some(true)
        }
    }

    pub(crate) fn into_selection(self) -> Vec<CardId> {
        self.selected.into_iter().collect()
    }
}

/// Where the encounter stands with its one mulligan offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MulliganGate {
    NotOffered,
    Open(MulliganSession),
    Closed,
}

impl MulliganGate {
    pub(crate) fn is_open(&self) -> bool {
        matches!(self, MulliganGate::Open(_))
    }

    pub(crate) fn session(&self) -> Option<&MulliganSession> {
        match self {
            MulliganGate::Open(session) => Some(session),
            _ => None,
        }
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut MulliganSession> {
        match self {
            MulliganGate::Open(session) => Some(session),
            _ => None,
        }
    }

    /// Closes the gate, handing back the session if it was open.
    pub(crate) fn close(&mut self) -> Option<MulliganSession> {
        match std::mem::replace(self, MulliganGate::Closed) {
            MulliganGate::Open(session) => Some(session),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_only_hand_cards() {
        let mut session = MulliganSession::new(vec![CardId(1), CardId(2)]);
        assert_eq!(session.toggle(CardId(1)), Some(true));
        assert_eq!(session.toggle(CardId(1)), Some(false));
        assert_eq!(session.toggle(CardId(7)), None);
    }

    #[test]
    fn close_is_final() {
        let mut gate = MulliganGate::Open(MulliganSession::new(vec![CardId(1)]));
        assert!(gate.close().is_some());
        assert!(gate.close().is_none());
        assert_eq!(gate, MulliganGate::Closed);
    }
}
