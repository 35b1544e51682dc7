//! Cross-frontend primitives for presenting an encounter.
//!
//! Houses the gesture interpreter, zone layouts, the fate reveal sequencer
//! and the scene loop that ties them to a coordinator. Nothing here renders;
//! a client feeds pointer events and elapsed time in and reads state back.
pub mod config;
pub mod gesture;
pub mod reveal;
pub mod scene;
pub mod zone;

pub use config::{FrontendConfig, RevealTimings};
pub use gesture::{
    ActionGestureInterpreter, DragGestureState, GestureCommand, GestureInterpreter, GestureSession,
};
pub use reveal::{RevealError, RevealPhase, RevealSequencer, RevealStep};
pub use scene::{DispositionCombat, PhaseDrivenCombat, RitualCombat, TouchOutcome};
pub use zone::{Anchor, Offset, Point, RadialZones, YBandZones, Zone, ZoneError, ZoneResolver};
