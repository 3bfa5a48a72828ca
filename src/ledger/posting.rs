//! Posting engine: validated, atomic commitment of entries

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::inventory::{self, InventoryPricing, MovementPlan};
use crate::ledger::validation::{check_structure, compile_template, validate_lines};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_entry_description;

/// A proposed entry prior to validation and commitment
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    pub transaction_type: Option<String>,
    pub template_key: Option<String>,
    pub lines: Vec<LineInput>,
}

/// Fluent construction of a [`NewEntry`]. `build()` runs the structural
/// checks; the posting engine re-runs the full validation regardless, so a
/// built entry is convenient but not trusted.
#[derive(Debug)]
pub struct EntryBuilder {
    entry: NewEntry,
}

impl EntryBuilder {
    /// Start a new entry
    pub fn new(date: NaiveDate, description: String) -> Self {
        Self {
            entry: NewEntry {
                date,
                description,
                reference: None,
                transaction_type: None,
                template_key: None,
                lines: Vec::new(),
            },
        }
    }

    /// Set the reference (invoice number, receipt number, etc.)
    pub fn reference(mut self, reference: String) -> Self {
        self.entry.reference = Some(reference);
        self
    }

    /// Tag the transaction type ("sale", "harvest", ...)
    pub fn transaction_type(mut self, transaction_type: String) -> Self {
        self.entry.transaction_type = Some(transaction_type);
        self
    }

    /// Declare the template this entry was submitted against
    pub fn template_key(mut self, template_key: String) -> Self {
        self.entry.template_key = Some(template_key);
        self
    }

    /// Add a debit line
    pub fn debit(
        mut self,
        account_id: String,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        let mut line = LineInput::debit(account_id, amount);
        line.description = description;
        self.entry.lines.push(line);
        self
    }

    /// Add a credit line
    pub fn credit(
        mut self,
        account_id: String,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        let mut line = LineInput::credit(account_id, amount);
        line.description = description;
        self.entry.lines.push(line);
        self
    }

    /// Add a raw line input
    pub fn line(mut self, line: LineInput) -> Self {
        self.entry.lines.push(line);
        self
    }

    /// Run the structural checks and hand back the entry
    pub fn build(self) -> LedgerResult<NewEntry> {
        let errors = check_structure(&self.entry.lines);
        if !errors.is_empty() {
            return Err(LedgerError::EntryRejected { errors });
        }
        Ok(self.entry)
    }
}

/// Commits validated entries and their derived side effects atomically
pub struct PostingEngine<S: LedgerStore> {
    storage: S,
    pricing: InventoryPricing,
}

impl<S: LedgerStore> PostingEngine<S> {
    /// Create a posting engine with the default price-per-unit table
    pub fn new(storage: S) -> Self {
        Self::with_pricing(storage, InventoryPricing::default())
    }

    /// Create a posting engine with a custom price-per-unit table
    pub fn with_pricing(storage: S, pricing: InventoryPricing) -> Self {
        Self { storage, pricing }
    }

    /// Post a journal entry. Validation is re-run here — caller-side checks
    /// are never trusted — and the entry, its lines, the derived inventory
    /// movements, and the stock-counter updates commit as one batch.
    pub async fn post_journal_entry(&mut self, new_entry: NewEntry) -> LedgerResult<String> {
        self.post(EntrySet::Journal, new_entry, None).await
    }

    /// Post an adjusting entry. Same validation and atomicity; adjusting
    /// entries never move inventory.
    pub async fn post_adjusting_entry(&mut self, new_entry: NewEntry) -> LedgerResult<String> {
        self.post(EntrySet::Adjusting, new_entry, None).await
    }

    /// Post a journal entry and stamp `flag_key = entry id` in the same
    /// batch. Used by the closing path to mark the period closed atomically
    /// with the closing entry itself.
    pub(crate) async fn post_flagged(
        &mut self,
        new_entry: NewEntry,
        flag_key: &str,
    ) -> LedgerResult<String> {
        self.post(EntrySet::Journal, new_entry, Some(flag_key)).await
    }

    async fn post(
        &mut self,
        set: EntrySet,
        new_entry: NewEntry,
        flag_key: Option<&str>,
    ) -> LedgerResult<String> {
        validate_entry_description(&new_entry.description)?;

        let template = match &new_entry.template_key {
            Some(key) => {
                let template = self
                    .storage
                    .template(key)
                    .await?
                    .ok_or_else(|| LedgerError::TemplateNotFound(key.clone()))?;
                Some(compile_template(&self.storage, &template).await?)
            }
            None => None,
        };

        let errors = validate_lines(&self.storage, &new_entry.lines, template.as_ref()).await?;
        if !errors.is_empty() {
            debug!(errors = errors.len(), "Rejected entry");
            return Err(LedgerError::EntryRejected { errors });
        }

        let entry = JournalEntry {
            id: uuid::Uuid::new_v4().to_string(),
            date: new_entry.date,
            description: new_entry.description,
            reference: new_entry.reference,
            transaction_type: new_entry.transaction_type,
            posted: true,
            lines: new_entry
                .lines
                .into_iter()
                .map(|l| JournalLine {
                    account_id: l.account_id,
                    debit: l.debit,
                    credit: l.credit,
                    description: l.description,
                })
                .collect(),
            created_at: chrono::Utc::now().naive_utc(),
        };

        // Accounts were checked by the validator; a miss here means the
        // chart changed underneath us and is fatal.
        let mut accounts = HashMap::new();
        for line in &entry.lines {
            let account = self
                .storage
                .account(&line.account_id)
                .await?
                .ok_or_else(|| LedgerError::AccountNotFound(line.account_id.clone()))?;
            accounts.insert(line.account_id.clone(), account);
        }

        let plan = match set {
            EntrySet::Journal => inventory::plan_movements(&entry, &accounts, &self.pricing)?,
            EntrySet::Adjusting => MovementPlan::none(),
        };
        if let Some(class) = plan.class {
            debug!(class = ?class, movements = plan.movements.len(), "Planned inventory effects");
        }

        let mut settings = Vec::new();
        for (code, delta) in &plan.deltas {
            let current = inventory::current_stock(&self.storage, code).await?;
            let next = &current + delta;
            settings.push((inventory::stock_key(code), next.normalized().to_string()));
        }
        if let Some(key) = flag_key {
            settings.push((key.to_string(), entry.id.clone()));
        }

        let batch = PostingBatch {
            set,
            entry,
            movements: plan.movements,
            settings,
        };
        self.storage.commit_posting(&batch).await?;
        info!(
            entry_id = %batch.entry.id,
            lines = batch.entry.lines.len(),
            movements = batch.movements.len(),
            "Posted entry"
        );

        Ok(batch.entry.id)
    }

    /// Delete a journal entry and its lines as a unit. The inventory
    /// movement log is append-only and is not rewound; recompute the stock
    /// counters afterwards if the entry had moved stock.
    pub async fn delete_journal_entry(&mut self, entry_id: &str) -> LedgerResult<()> {
        self.storage.delete_entry(EntrySet::Journal, entry_id).await
    }

    /// Delete an adjusting entry and its lines as a unit
    pub async fn delete_adjusting_entry(&mut self, entry_id: &str) -> LedgerResult<()> {
        self.storage
            .delete_entry(EntrySet::Adjusting, entry_id)
            .await
    }
}
