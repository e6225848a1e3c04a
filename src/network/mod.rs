//! Session Boundary
//!
//! Message types and the per-connection state machine the transport
//! layer drives. Socket handling and fan-out live outside this crate.

pub mod protocol;
pub mod session;

pub use protocol::{ClientMessage, ServerMessage};
pub use session::{Outbound, PlayerSession, SessionState};
