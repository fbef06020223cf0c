//! Multi-provider evaluation orchestrator.
//!
//! Fans one audit out to the three provider gateways concurrently, tracks
//! every (prompt, provider) unit, keeps per-provider results, and blends
//! successful batches into a composite report.

mod error;
mod lock;
pub mod dispatcher;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod tracker;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchErrorKind};
pub use orchestrator::{AuditOutcome, Orchestrator};
pub use session::AuditSession;
pub use store::ResultStore;
pub use tracker::{Tracker, UnitKey, UnitPhase, UnitState};

#[cfg(test)]
pub(crate) mod testing;
