//! Recording and playback session.
//!
//! [`reduce`] is the whole state machine: a synchronous transition from one
//! [`SessionState`] to the next that returns the side effects to run.
//! [`SessionController`] owns the state and the devices and runs those
//! effects, feeding their outcomes back in as new events.

mod controller;
mod effect;
mod event;
mod reducer;
mod state;

pub use {
    controller::SessionController,
    effect::Effect,
    event::SessionEvent,
    reducer::reduce,
    state::{CapturePhase, PlaybackStatus, Selection, SessionState},
};
