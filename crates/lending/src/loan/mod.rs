//! Loan records and the ledger that tracks them.

mod ledger;
mod record;

pub use ledger::LoanLedger;
pub use record::{LoanRecord, LoanStatus};
