//! Session services used by the websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! `transition` holds the pure state machine, `ticker` the phase/apparatus
//! timers, and `session` the task that owns state and fans events out.
//! Route handlers only translate between the wire and a `SessionHandle`.

pub mod session;
pub mod ticker;
pub mod transition;
