//! Shared identifier types used across the lending workspace.

mod types;

pub use types::{ActorId, ItemId, LoanId};
