//! Account resolution
//!
//! Decides, from a verified login identifier and the current local record,
//! whether the caller is a new user, a returning user, or a user whose
//! local record belongs to someone else, and brings local state in line
//! before the session is allowed to become authenticated.

mod resolve;

pub use resolve::{ResolveAccount, ResolveError};
