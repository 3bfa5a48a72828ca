//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Which entry set a committed entry belongs to. Journal and adjusting
/// entries are kept in parallel stores so "before adjustment" views can
/// exclude the adjusting set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySet {
    Journal,
    Adjusting,
}

/// Everything a single posting writes, committed as one unit.
///
/// `LedgerStore::commit_posting` must persist the entry (header plus lines),
/// the inventory movements, and the settings updates all-or-nothing: a
/// failing commit leaves no partial state behind. Backends with real
/// transactions wrap the batch in one; `MemoryStore` applies it under a
/// single write lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingBatch {
    /// Entry set the entry is committed into
    pub set: EntrySet,
    /// The entry and its lines
    pub entry: JournalEntry,
    /// Inventory movements derived from the entry's lines
    pub movements: Vec<InventoryMovement>,
    /// Settings keys written alongside (cached stock counters, period flags)
    pub settings: Vec<(String, String)>,
}

impl PostingBatch {
    /// A batch carrying only an entry, no side effects
    pub fn entry_only(set: EntrySet, entry: JournalEntry) -> Self {
        Self {
            set,
            entry,
            movements: Vec::new(),
            settings: Vec::new(),
        }
    }
}

/// Storage abstraction for the ledger system
///
/// This trait allows the bookkeeping core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these
/// methods. The logical schema mirrors the persisted tables: accounts,
/// journal entries/lines, adjusting entries/lines, opening balances,
/// inventory movements, settings, and templates.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Save an account to storage
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Get an account by ID
    async fn account(&self, account_id: &str) -> LedgerResult<Option<Account>>;

    /// Get an account by its chart code
    async fn account_by_code(&self, code: &str) -> LedgerResult<Option<Account>>;

    /// List all accounts, optionally filtered by category, ordered by code
    async fn list_accounts(
        &self,
        category: Option<AccountCategory>,
    ) -> LedgerResult<Vec<Account>>;

    /// Replace the whole opening-balance set (delete + reinsert)
    async fn replace_opening_balances(&mut self, rows: &[OpeningBalance]) -> LedgerResult<()>;

    /// Get the opening balance row for an account, if any
    async fn opening_balance(&self, account_id: &str) -> LedgerResult<Option<OpeningBalance>>;

    /// List all opening balance rows
    async fn list_opening_balances(&self) -> LedgerResult<Vec<OpeningBalance>>;

    /// Atomically commit a posting batch: entry + lines + inventory
    /// movements + settings, all-or-nothing
    async fn commit_posting(&mut self, batch: &PostingBatch) -> LedgerResult<()>;

    /// Get an entry by ID from the given set
    async fn entry(&self, set: EntrySet, entry_id: &str) -> LedgerResult<Option<JournalEntry>>;

    /// List all entries in the given set
    async fn list_entries(&self, set: EntrySet) -> LedgerResult<Vec<JournalEntry>>;

    /// List the entries in the given set that touch an account
    async fn entries_for_account(
        &self,
        set: EntrySet,
        account_id: &str,
    ) -> LedgerResult<Vec<JournalEntry>>;

    /// Delete an entry and its lines as a unit
    async fn delete_entry(&mut self, set: EntrySet, entry_id: &str) -> LedgerResult<()>;

    /// List the append-only inventory movement log
    async fn list_inventory_movements(&self) -> LedgerResult<Vec<InventoryMovement>>;

    /// Read a settings value
    async fn setting(&self, key: &str) -> LedgerResult<Option<String>>;

    /// Write a settings value
    async fn put_setting(&mut self, key: &str, value: &str) -> LedgerResult<()>;

    /// Get a transaction template by key
    async fn template(&self, key: &str) -> LedgerResult<Option<TransactionTemplate>>;

    /// Save a transaction template
    async fn save_template(&mut self, template: &TransactionTemplate) -> LedgerResult<()>;
}
