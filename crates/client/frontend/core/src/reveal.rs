//! Fate reveal presentation.
//!
//! [`RevealSequencer`] dramatizes one [`RevealRequest`] at a time through a
//! fixed series of beats. It holds no reference to the encounter; the owner
//! hands the completed token back to the coordinator.

use std::time::Duration;

use runtime::{RevealRequest, RevealToken};

use crate::config::RevealTimings;

/// Beat of the reveal animation.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RevealPhase {
    #[default]
    Idle,
    /// Card held face down.
    Anticipation,
    Flip,
    /// Only when the card's suit matched the world resonance.
    SuitMatch,
    /// Only when the card carries a keyword.
    KeywordEffect,
    Complete,
}

/// Output of one [`RevealSequencer::advance`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealStep {
    /// Phases entered during this call, in order.
    pub entered: Vec<RevealPhase>,
    /// Set exactly once per reveal, on the call that reached `Complete`.
    pub completed: Option<RevealToken>,
    /// Time past the end of the completed reveal, owed to the next one.
    pub leftover: Duration,
}

impl RevealStep {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.completed.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RevealError {
    #[error("{0} is still being revealed")]
    Busy(RevealToken),
}

#[derive(Clone, Debug)]
struct ActiveReveal {
    request: RevealRequest,
    beats: Vec<(RevealPhase, Duration)>,
    index: usize,
    into_beat: Duration,
    skipped: bool,
}

impl ActiveReveal {
    fn phase(&self) -> RevealPhase {
        self.beats
            .get(self.index)
            .map_or(RevealPhase::Complete, |(phase, _)| *phase)
    }
}

#[derive(Clone, Debug)]
pub struct RevealSequencer {
    timings: RevealTimings,
    active: Option<ActiveReveal>,
}

impl RevealSequencer {
    pub fn new(timings: RevealTimings) -> Self {
        Self {
            timings,
            active: None,
        }
    }

    pub fn timings(&self) -> &RevealTimings {
        &self.timings
    }

    pub fn phase(&self) -> RevealPhase {
        self.active
            .as_ref()
            .map_or(RevealPhase::Idle, ActiveReveal::phase)
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// The request being dramatized.
    pub fn current(&self) -> Option<&RevealRequest> {
        self.active.as_ref().map(|active| &active.request)
    }

    /// Enters `Anticipation` for `request`. Completion is only ever reported
    /// by [`advance`](Self::advance), even for zero-length beats.
    pub fn begin_reveal(&mut self, request: RevealRequest) -> Result<(), RevealError> {
        self.begin_reveal_carrying(request, Duration::ZERO)
    }

    /// Like [`begin_reveal`](Self::begin_reveal), with `carried` already
    /// spent on the first beat. The beats it covers are reported by the next
    /// [`advance`](Self::advance).
    pub fn begin_reveal_carrying(
        &mut self,
        request: RevealRequest,
        carried: Duration,
    ) -> Result<(), RevealError> {
        if let Some(active) = &self.active {
            return Err(RevealError::Busy(active.request.token));
        }

        let timings = &self.timings;
        let mut beats = vec![
            (
                RevealPhase::Anticipation,
                timings.anticipation_for(request.critical()),
            ),
            (RevealPhase::Flip, timings.flip),
        ];
        if request.suit_match {
            beats.push((RevealPhase::SuitMatch, timings.suit_match));
        }
        if request.card.keyword.is_some() {
            beats.push((RevealPhase::KeywordEffect, timings.keyword));
        }

        tracing::debug!(
            token = %request.token,
            value = request.value,
            critical = request.critical(),
            beats = beats.len(),
            "reveal started"
        );
        self.active = Some(ActiveReveal {
            request,
            beats,
            index: 0,
            into_beat: carried,
            skipped: false,
        });
        Ok(())
    }

    pub fn advance(&mut self, elapsed: Duration) -> RevealStep {
        let mut step = RevealStep::default();
        let Some(active) = self.active.as_mut() else {
            return step;
        };

        active.into_beat = active.into_beat.saturating_add(elapsed);
        while let Some(&(_, length)) = active.beats.get(active.index) {
            if !active.skipped && active.into_beat < length {
                break;
            }
            active.into_beat = active.into_beat.saturating_sub(length);
            active.index += 1;
            step.entered.push(active.phase());
        }

        if active.index >= active.beats.len() {
            let token = active.request.token;
            if !active.skipped {
                step.leftover = active.into_beat;
            }
            self.active = None;
            tracing::debug!(%token, "reveal complete");
            step.completed = Some(token);
        }
        step
    }

    /// Fast-forwards to `Complete`; the next [`advance`](Self::advance)
    /// reports the remaining beats and the completion.
    pub fn skip(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.skipped = true;
        }
    }

    /// Drops the reveal in progress without reporting completion.
    pub fn reset(&mut self) -> Option<RevealToken> {
        let active = self.active.take()?;
        tracing::debug!(token = %active.request.token, "reveal cancelled");
        Some(active.request.token)
    }
}

impl Default for RevealSequencer {
    fn default() -> Self {
        Self::new(RevealTimings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{FateCard, FateCardId, Keyword, Suit};

    fn request(token: u64, suit_match: bool, card: FateCard) -> RevealRequest {
        RevealRequest {
            token: RevealToken(token),
            value: card.effective_value(),
            card,
            suit_match,
        }
    }

    fn plain(token: u64) -> RevealRequest {
        request(token, false, FateCard::new(FateCardId(1), 1, Suit::Neutral))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn walks_beats_by_duration() {
        let mut sequencer = RevealSequencer::default();
        sequencer.begin_reveal(plain(3)).expect("idle");
        assert_eq!(sequencer.phase(), RevealPhase::Anticipation);

        assert!(sequencer.advance(ms(449)).is_empty());
        assert_eq!(
            sequencer.advance(ms(1)).entered,
            vec![RevealPhase::Flip]
        );

        let step = sequencer.advance(ms(300));
        assert_eq!(step.entered, vec![RevealPhase::Complete]);
        assert_eq!(step.completed, Some(RevealToken(3)));
        assert_eq!(step.leftover, Duration::ZERO);
        assert_eq!(sequencer.phase(), RevealPhase::Idle);
        assert!(sequencer.advance(ms(1000)).is_empty());
    }

    #[test]
    fn optional_beats_follow_the_card() {
        let card = FateCard::new(FateCardId(2), 2, Suit::Neutral).with_keyword(Keyword::Surge);
        let mut sequencer = RevealSequencer::new(RevealTimings::instant());
        sequencer
            .begin_reveal(request(0, true, card))
            .expect("idle");

        let step = sequencer.advance(Duration::ZERO);
        assert_eq!(
            step.entered,
            vec![
                RevealPhase::Flip,
                RevealPhase::SuitMatch,
                RevealPhase::KeywordEffect,
                RevealPhase::Complete,
            ]
        );
        assert_eq!(step.completed, Some(RevealToken(0)));
    }

    #[test]
    fn critical_cards_hold_anticipation_longer() {
        let card = FateCard::new(FateCardId(3), 2, Suit::Neutral).critical();
        let mut sequencer = RevealSequencer::default();
        sequencer
            .begin_reveal(request(1, false, card))
            .expect("idle");

        assert!(sequencer.advance(ms(600)).is_empty());
        assert_eq!(sequencer.advance(ms(300)).entered, vec![RevealPhase::Flip]);
    }

    #[test]
    fn busy_until_complete() {
        let mut sequencer = RevealSequencer::new(RevealTimings::instant());
        sequencer.begin_reveal(plain(0)).expect("idle");
        assert_eq!(
            sequencer.begin_reveal(plain(1)),
            Err(RevealError::Busy(RevealToken(0)))
        );
        assert_eq!(sequencer.current().map(|r| r.token), Some(RevealToken(0)));

        sequencer.advance(Duration::ZERO);
        assert!(sequencer.begin_reveal(plain(1)).is_ok());
    }

    #[test]
    fn skip_reports_on_next_advance() {
        let mut sequencer = RevealSequencer::default();
        sequencer.begin_reveal(plain(5)).expect("idle");
        sequencer.skip();
        assert!(sequencer.is_busy());

        let step = sequencer.advance(Duration::ZERO);
        assert_eq!(step.entered, vec![RevealPhase::Flip, RevealPhase::Complete]);
        assert_eq!(step.completed, Some(RevealToken(5)));
    }

    #[test]
    fn reset_cancels_without_completion() {
        let mut sequencer = RevealSequencer::default();
        assert_eq!(sequencer.reset(), None);

        sequencer.begin_reveal(plain(8)).expect("idle");
        assert_eq!(sequencer.reset(), Some(RevealToken(8)));
        assert!(!sequencer.is_busy());
        assert_eq!(sequencer.advance(ms(5000)).completed, None);
    }

    #[test]
    fn overshoot_carries_into_the_next_reveal() {
        let mut sequencer = RevealSequencer::default();
        sequencer.begin_reveal(plain(0)).expect("idle");

        let step = sequencer.advance(ms(900));
        assert_eq!(step.completed, Some(RevealToken(0)));
        assert_eq!(step.leftover, ms(150));

        sequencer
            .begin_reveal_carrying(plain(1), step.leftover)
            .expect("idle");
        assert_eq!(sequencer.phase(), RevealPhase::Anticipation);
        assert!(sequencer.advance(ms(299)).is_empty());
        assert_eq!(sequencer.advance(ms(1)).entered, vec![RevealPhase::Flip]);
    }

    #[test]
    fn skipped_reveal_owes_nothing() {
        let mut sequencer = RevealSequencer::default();
        sequencer.begin_reveal(plain(2)).expect("idle");
        sequencer.skip();
        assert_eq!(sequencer.advance(ms(5000)).leftover, Duration::ZERO);
    }
}
