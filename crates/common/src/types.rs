use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a catalog item.
///
/// Allocated by the catalog from a monotonic counter. Uniqueness is the only
/// contract callers may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw numeric identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the identifier following this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a borrower.
///
/// The original spelling is kept for display, but two actor ids refer to the
/// same borrower when they match ignoring case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Creates an actor id from a string, trimming surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Returns the actor id as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison against another actor id.
    pub fn matches(&self, other: &ActorId) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl PartialEq for ActorId {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for ActorId {}

impl std::hash::Hash for ActorId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a single loan record in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    /// Creates a new random loan id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
