//! Borrow/return ledger engine.
//!
//! This crate keeps the available stock of borrowable items consistent with
//! the loans outstanding against them:
//! - `ItemRecord` holds total/available counts for one item
//! - `Catalog` keeps item records keyed by id, merging additions by name
//! - `LoanLedger` records loans and closes them LIFO on return, splitting
//!   partially returned records
//! - `LoanService` serializes borrow and return use cases over both

pub mod catalog;
pub mod error;
pub mod item;
pub mod loan;
pub mod policy;
pub mod service;
pub mod view;

pub use catalog::{AddOutcome, Catalog};
pub use error::{DomainError, Result};
pub use item::ItemRecord;
pub use loan::{LoanLedger, LoanRecord, LoanStatus};
pub use policy::LendingPolicy;
pub use service::{BorrowReceipt, LoanService, ReturnReceipt};
pub use view::{ItemView, LoanView, TransactionFilter};

pub use common::{ActorId, ItemId, LoanId};
