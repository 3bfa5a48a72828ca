//! # Oysterbooks Core
//!
//! The double-entry bookkeeping core of a small oyster-farm business:
//! journal transactions, derived inventory tracking, and standard financial
//! statements.
//!
//! ## Features
//!
//! - **Double-entry bookkeeping**: full validation (balance tolerance,
//!   duplicate accounts, malformed lines, template compliance) with every
//!   violation collected at once
//! - **Atomic posting**: entry, lines, inventory movements, and cached
//!   stock counters commit as one batch
//! - **Account management**: explicit categories (Asset, Contra-Asset,
//!   Liability, Equity, Revenue, Expense) with per-account normal balance
//! - **Statements**: trial balance (before/after adjustment), income
//!   statement, balance sheet, cash flow, equity statement, post-closing
//!   trial balance
//! - **Period closing**: nominal accounts zeroed into retained earnings,
//!   guarded against double posting
//! - **Storage abstraction**: database-agnostic design with a trait-based
//!   store and an in-memory implementation for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use oysterbooks_core::{EntryBuilder, Ledger, MemoryStore};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn demo() -> oysterbooks_core::LedgerResult<()> {
//! let mut ledger = Ledger::new(MemoryStore::new());
//! let accounts = ledger.seed_farm_chart().await?;
//!
//! let sale = EntryBuilder::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
//!     "Penjualan tunai".to_string(),
//! )
//! .debit(accounts["kas"].id.clone(), BigDecimal::from(500_000), None)
//! .credit(accounts["penjualan"].id.clone(), BigDecimal::from(500_000), None)
//! .build()?;
//! ledger.post_journal_entry(sale).await?;
//! # Ok(())
//! # }
//! ```

pub mod inventory;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use inventory::{EntryClass, InventoryPricing};
pub use ledger::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStore;
