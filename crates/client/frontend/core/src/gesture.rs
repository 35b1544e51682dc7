//! Pointer gestures on hand cards.
//!
//! An interpreter turns press/move/release events into canonical
//! [`GestureCommand`]s. It knows nothing about combat rules; deciding what a
//! drop point means is left to a [`ZoneResolver`](crate::zone::ZoneResolver).

use game_core::CardId;

use crate::zone::{Offset, Point};

/// Observable state of the interpreter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragGestureState {
    #[default]
    Idle,
    Pressing(CardId),
    Dragging { card: CardId, offset: Offset },
    /// The last gesture ended with a command for this card.
    Released(CardId),
}

impl DragGestureState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            DragGestureState::Pressing(_) | DragGestureState::Dragging { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureCommand {
    /// Released without travelling past the threshold.
    Select { card: CardId },
    /// Released after a drag; `position` is where the card was let go.
    Drop { card: CardId, position: Point },
    Cancel { card: CardId },
}

impl GestureCommand {
    pub fn card(&self) -> CardId {
        match self {
            GestureCommand::Select { card }
            | GestureCommand::Drop { card, .. }
            | GestureCommand::Cancel { card } => *card,
        }
    }
}

pub trait GestureInterpreter {
    /// Starts a gesture on `card`. Returns false while another gesture is
    /// in flight.
    fn begin_touch(&mut self, card: CardId, at: Point) -> bool;

    fn update_drag(&mut self, offset: Offset);

    fn end_touch(&mut self) -> Option<GestureCommand>;

    /// Aborts the gesture in flight, if any.
    fn cancel(&mut self) -> Option<GestureCommand>;

    fn state(&self) -> DragGestureState;
}

/// The single gesture in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSession {
    pub card: CardId,
    pub origin: Point,
    pub offset: Offset,
    pub dragging: bool,
}

impl GestureSession {
    fn position(&self) -> Point {
        self.origin.offset_by(self.offset)
    }
}

/// Press, drag past a threshold, release.
#[derive(Clone, Debug)]
pub struct ActionGestureInterpreter {
    threshold: f32,
    session: Option<GestureSession>,
    released: Option<CardId>,
}

impl ActionGestureInterpreter {
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_nan() { 0.0 } else { threshold.max(0.0) };
        Self {
            threshold,
            session: None,
            released: None,
        }
    }

    /// Never turns a press into a drag; every release is a selection.
    pub fn tap_only() -> Self {
        Self {
            threshold: f32::INFINITY,
            session: None,
            released: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }
}

impl GestureInterpreter for ActionGestureInterpreter {
    fn begin_touch(&mut self, card: CardId, at: Point) -> bool {
        if self.session.is_some() {
            tracing::trace!(%card, "touch ignored, gesture in flight");
            return false;
        }
        self.released = None;
        self.session = Some(GestureSession {
            card,
            origin: at,
            offset: Offset::ZERO,
            dragging: false,
        });
        true
    }

    fn update_drag(&mut self, offset: Offset) {
        let threshold = self.threshold;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.offset = offset;
        if !session.dragging && offset.magnitude() >= threshold {
            session.dragging = true;
            tracing::trace!(card = %session.card, "drag started");
        }
    }

    fn end_touch(&mut self) -> Option<GestureCommand> {
        let session = self.session.take()?;
        self.released = Some(session.card);
        let command = if session.dragging {
            GestureCommand::Drop {
                card: session.card,
                position: session.position(),
            }
        } else {
            GestureCommand::Select { card: session.card }
        };
        Some(command)
    }

    fn cancel(&mut self) -> Option<GestureCommand> {
        self.released = None;
        let session = self.session.take()?;
        Some(GestureCommand::Cancel { card: session.card })
    }

    fn state(&self) -> DragGestureState {
        match (&self.session, self.released) {
            (Some(session), _) if session.dragging => DragGestureState::Dragging {
                card: session.card,
                offset: session.offset,
            },
            (Some(session), _) => DragGestureState::Pressing(session.card),
            (None, Some(card)) => DragGestureState::Released(card),
            (None, None) => DragGestureState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CARD: CardId = CardId(4);

    #[test]
    fn press_and_release_selects() {
        let mut gesture = ActionGestureInterpreter::new(12.0);
        assert!(gesture.begin_touch(CARD, Point::new(10.0, 10.0)));
        gesture.update_drag(Offset::new(3.0, 4.0));
        assert_eq!(gesture.state(), DragGestureState::Pressing(CARD));

        assert_eq!(gesture.end_touch(), Some(GestureCommand::Select { card: CARD }));
        assert_eq!(gesture.state(), DragGestureState::Released(CARD));
        assert_eq!(gesture.end_touch(), None);
    }

    #[test]
    fn drag_reports_drop_position() {
        let mut gesture = ActionGestureInterpreter::new(12.0);
        gesture.begin_touch(CARD, Point::new(10.0, 10.0));
        gesture.update_drag(Offset::new(0.0, 20.0));
        gesture.update_drag(Offset::new(2.0, 5.0));

        assert!(matches!(gesture.state(), DragGestureState::Dragging { .. }));
        assert_eq!(
            gesture.end_touch(),
            Some(GestureCommand::Drop {
                card: CARD,
                position: Point::new(12.0, 15.0),
            })
        );
    }

    #[test]
    fn one_gesture_at_a_time() {
        let mut gesture = ActionGestureInterpreter::new(12.0);
        assert!(gesture.begin_touch(CARD, Point::ORIGIN));
        assert!(!gesture.begin_touch(CardId(5), Point::ORIGIN));
        assert_eq!(gesture.state(), DragGestureState::Pressing(CARD));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut gesture = ActionGestureInterpreter::new(12.0);
        assert_eq!(gesture.cancel(), None);

        gesture.begin_touch(CARD, Point::ORIGIN);
        gesture.update_drag(Offset::new(30.0, 0.0));
        assert_eq!(gesture.cancel(), Some(GestureCommand::Cancel { card: CARD }));
        assert_eq!(gesture.state(), DragGestureState::Idle);
        assert_eq!(gesture.end_touch(), None);
    }

    #[test]
    fn tap_only_never_drags() {
        let mut gesture = ActionGestureInterpreter::tap_only();
        gesture.begin_touch(CARD, Point::ORIGIN);
        gesture.update_drag(Offset::new(1e6, 1e6));
        assert_eq!(gesture.end_touch(), Some(GestureCommand::Select { card: CARD }));
    }

    proptest! {
        #[test]
        fn threshold_separates_select_from_drop(
            threshold in 1.0f32..100.0,
            angle in 0.0f32..std::f32::consts::TAU,
            scale in 0.0f32..2.0,
        ) {
            let distance = threshold * scale;
            let offset = Offset::new(distance * angle.cos(), distance * angle.sin());
            let mut gesture = ActionGestureInterpreter::new(threshold);
            gesture.begin_touch(CARD, Point::ORIGIN);
            gesture.update_drag(offset);
            let command = gesture.end_touch();

            if offset.magnitude() < threshold {
                prop_assert_eq!(command, Some(GestureCommand::Select { card: CARD }));
            } else {
                prop_assert!(
                    matches!(command, Some(GestureCommand::Drop { card: CARD, .. })),
                    "expected Drop command, got {:?}",
                    command
                );
            }
        }
    }
}
