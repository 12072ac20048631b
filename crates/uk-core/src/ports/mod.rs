//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and the world outside the process: the verification provider, the
//! remote backup store, the history service, the durable local store and
//! the clock. Implementations are provided by the infrastructure layer or
//! injected by the hosting application; the core never selects them.

mod backup_store;
mod clock;
mod history;
mod local_store;
mod verification;

pub use backup_store::BackupStorePort;
pub use clock::ClockPort;
pub use history::HistoryServicePort;
pub use local_store::LocalStorePort;
pub use verification::{VerificationPort, VerifyOutcome};
