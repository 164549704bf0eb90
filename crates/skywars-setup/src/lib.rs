//! Arena setup core: capture sessions, the tool lease, the setup panel and
//! the edit lifecycle that keeps each arena world either archived or live.

pub mod capture;
pub mod coordinator;
pub mod draft;
pub mod error;
pub mod lease;
pub mod messages;
pub mod session;

#[cfg(test)]
mod testing;

pub use capture::{CaptureEventHandler, CaptureOutcome};
pub use coordinator::{ArenaEditCoordinator, ArenaPhase, PanelForm, SetupSettings, Stores, TIME_DAY};
pub use draft::PendingEdit;
pub use error::SetupError;
pub use lease::{ToolLease, ToolLoanRecord, TOOL_SLOT};
pub use messages::Messages;
pub use session::{InteractionSession, InteractionStateTracker, SessionHandle, SessionKind};
