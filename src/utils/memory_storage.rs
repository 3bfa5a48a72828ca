//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    opening_balances: HashMap<String, OpeningBalance>,
    journal_entries: HashMap<String, JournalEntry>,
    adjusting_entries: HashMap<String, JournalEntry>,
    movements: Vec<InventoryMovement>,
    settings: HashMap<String, String>,
    templates: HashMap<String, TransactionTemplate>,
}

impl Inner {
    fn entries(&self, set: EntrySet) -> &HashMap<String, JournalEntry> {
        match set {
            EntrySet::Journal => &self.journal_entries,
            EntrySet::Adjusting => &self.adjusting_entries,
        }
    }

    fn entries_mut(&mut self, set: EntrySet) -> &mut HashMap<String, JournalEntry> {
        match set {
            EntrySet::Journal => &mut self.journal_entries,
            EntrySet::Adjusting => &mut self.adjusting_entries,
        }
    }
}

/// In-memory ledger store. Every table lives behind one lock, so
/// `commit_posting` is atomic by construction: the batch is applied under a
/// single write guard and nothing can observe it half-done.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        *self.inner.write().unwrap() = Inner::default();
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()> {
        self.inner
            .write()
            .unwrap()
            .accounts
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        Ok(self.inner.read().unwrap().accounts.get(account_id).cloned())
    }

    async fn account_by_code(&self, code: &str) -> LedgerResult<Option<Account>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .accounts
            .values()
            .find(|a| a.code == code)
            .cloned())
    }

    async fn list_accounts(
        &self,
        category: Option<AccountCategory>,
    ) -> LedgerResult<Vec<Account>> {
        let inner = self.inner.read().unwrap();
        let mut accounts: Vec<Account> = inner
            .accounts
            .values()
            .filter(|a| category.is_none_or(|c| a.category == c))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn replace_opening_balances(&mut self, rows: &[OpeningBalance]) -> LedgerResult<()> {
        let mut inner = self.inner.write().unwrap();
        inner.opening_balances.clear();
        for row in rows {
            inner
                .opening_balances
                .insert(row.account_id.clone(), row.clone());
        }
        Ok(())
    }

    async fn opening_balance(&self, account_id: &str) -> LedgerResult<Option<OpeningBalance>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .opening_balances
            .get(account_id)
            .cloned())
    }

    async fn list_opening_balances(&self) -> LedgerResult<Vec<OpeningBalance>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .opening_balances
            .values()
            .cloned()
            .collect())
    }

    async fn commit_posting(&mut self, batch: &PostingBatch) -> LedgerResult<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .entries_mut(batch.set)
            .insert(batch.entry.id.clone(), batch.entry.clone());
        inner.movements.extend(batch.movements.iter().cloned());
        for (key, value) in &batch.settings {
            inner.settings.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn entry(&self, set: EntrySet, entry_id: &str) -> LedgerResult<Option<JournalEntry>> {
        Ok(self.inner.read().unwrap().entries(set).get(entry_id).cloned())
    }

    async fn list_entries(&self, set: EntrySet) -> LedgerResult<Vec<JournalEntry>> {
        let inner = self.inner.read().unwrap();
        let mut entries: Vec<JournalEntry> = inner.entries(set).values().cloned().collect();
        entries.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
        Ok(entries)
    }

    async fn entries_for_account(
        &self,
        set: EntrySet,
        account_id: &str,
    ) -> LedgerResult<Vec<JournalEntry>> {
        let inner = self.inner.read().unwrap();
        let mut entries: Vec<JournalEntry> = inner
            .entries(set)
            .values()
            .filter(|e| e.lines.iter().any(|l| l.account_id == account_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));
        Ok(entries)
    }

    async fn delete_entry(&mut self, set: EntrySet, entry_id: &str) -> LedgerResult<()> {
        if self
            .inner
            .write()
            .unwrap()
            .entries_mut(set)
            .remove(entry_id)
            .is_some()
        {
            Ok(())
        } else {
            Err(LedgerError::EntryNotFound(entry_id.to_string()))
        }
    }

    async fn list_inventory_movements(&self) -> LedgerResult<Vec<InventoryMovement>> {
        Ok(self.inner.read().unwrap().movements.clone())
    }

    async fn setting(&self, key: &str) -> LedgerResult<Option<String>> {
        Ok(self.inner.read().unwrap().settings.get(key).cloned())
    }

    async fn put_setting(&mut self, key: &str, value: &str) -> LedgerResult<()> {
        self.inner
            .write()
            .unwrap()
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn template(&self, key: &str) -> LedgerResult<Option<TransactionTemplate>> {
        Ok(self.inner.read().unwrap().templates.get(key).cloned())
    }

    async fn save_template(&mut self, template: &TransactionTemplate) -> LedgerResult<()> {
        self.inner
            .write()
            .unwrap()
            .templates
            .insert(template.key.clone(), template.clone());
        Ok(())
    }
}
