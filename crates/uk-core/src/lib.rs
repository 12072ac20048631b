//! # uk-core
//!
//! Core domain models and business logic for UKcal.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod account;
pub mod backup;
pub mod history;
pub mod ids;
pub mod ports;
pub mod rehydrate;
pub mod session;
pub mod settings;

// Re-export commonly used types at the crate root
pub use account::{Avatar, BusinessProfile, Channel, ClosureMode, Identifier, UserAccount};
pub use backup::{BackupDomain, DomainSnapshots};
pub use history::{AnalysisEntry, HistoryList, MediaKind};
pub use ids::UserId;
pub use session::{Session, SessionMarker, SessionState};
