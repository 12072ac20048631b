//! UKcal Application Orchestration Layer
//!
//! This crate contains business logic use cases and runtime orchestration.

pub mod deps;
pub mod state;
pub mod usecases;

pub use deps::{App, AppDeps};
pub use usecases::session::{AuthError, SessionOrchestrator};
