//! Domain error types.

use common::{ActorId, ItemId};
use thiserror::Error;

/// Errors and rejected outcomes of lending operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed input, such as a blank name or a zero quantity.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No item with the given id exists in the catalog.
    #[error("Item not found: {item_id}")]
    NotFound { item_id: ItemId },

    /// Not enough units are available to satisfy a borrow.
    #[error("Insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// The actor holds no open loan for the item.
    #[error("Nothing to return: {actor_id} has no open loan for {item_id}")]
    NothingToReturn { actor_id: ActorId, item_id: ItemId },

    /// The operation would break the total/available/borrowed invariant.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A lending policy rejected the request.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// A return asked for more than is owed while over-return capping is off.
    #[error("Return of {requested} exceeds outstanding quantity {owed}")]
    ExceedsOutstanding { requested: u32, owed: u32 },
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        Self::PolicyViolation(msg.into())
    }

    /// Returns true for expected business outcomes as opposed to caller or
    /// invariant errors.
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            DomainError::InsufficientStock { .. }
                | DomainError::NothingToReturn { .. }
                | DomainError::PolicyViolation(_)
                | DomainError::ExceedsOutstanding { .. }
        )
    }

    /// Short, stable label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::InvalidArgument(_) => "invalid_argument",
            DomainError::NotFound { .. } => "not_found",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::NothingToReturn { .. } => "nothing_to_return",
            DomainError::InvalidState(_) => "invalid_state",
            DomainError::PolicyViolation(_) => "policy_violation",
            DomainError::ExceedsOutstanding { .. } => "exceeds_outstanding",
        }
    }
}

/// Convenience type alias for lending results.
pub type Result<T> = std::result::Result<T, DomainError>;
