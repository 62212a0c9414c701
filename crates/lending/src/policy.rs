//! Lending policy flags.

use serde::{Deserialize, Serialize};

/// Business rules that vary between deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    /// Refuse new borrows while the actor holds any open loan.
    pub exclusive_loans: bool,

    /// Accept over-generous returns up to the amount owed. When false, such
    /// returns are rejected outright.
    pub cap_over_returns: bool,
}

impl LendingPolicy {
    pub fn with_exclusive_loans(mut self, enabled: bool) -> Self {
        self.exclusive_loans = enabled;
        self
    }

    pub fn with_cap_over_returns(mut self, enabled: bool) -> Self {
        self.cap_over_returns = enabled;
        self
    }
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            exclusive_loans: false,
            cap_over_returns: true,
        }
    }
}
