//! Main ledger orchestrator that coordinates the accounting engines

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::inventory::{self, InventoryPricing};
use crate::ledger::account::AccountManager;
use crate::ledger::balance::{BalanceCalculator, GeneralLedger};
use crate::ledger::closing::{ClosingEngine, ClosingPlan};
use crate::ledger::posting::{NewEntry, PostingEngine};
use crate::ledger::statements::*;
use crate::traits::*;
use crate::types::*;

/// Main ledger system that orchestrates all bookkeeping operations
pub struct Ledger<S: LedgerStore> {
    accounts: AccountManager<S>,
    posting: PostingEngine<S>,
    balances: BalanceCalculator<S>,
    statements: StatementGenerator<S>,
    closing: ClosingEngine<S>,
    pricing: InventoryPricing,
    storage: S,
}

impl<S: LedgerStore + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend and the default
    /// price-per-unit table
    pub fn new(storage: S) -> Self {
        Self::with_pricing(storage, InventoryPricing::default())
    }

    /// Create a new ledger with a custom price-per-unit table
    pub fn with_pricing(storage: S, pricing: InventoryPricing) -> Self {
        Self {
            accounts: AccountManager::new(storage.clone()),
            posting: PostingEngine::with_pricing(storage.clone(), pricing.clone()),
            balances: BalanceCalculator::new(storage.clone()),
            statements: StatementGenerator::new(storage.clone()),
            closing: ClosingEngine::new(storage.clone()),
            pricing,
            storage,
        }
    }

    // Account operations
    /// Create a new account with the category's default normal balance
    pub async fn create_account(
        &mut self,
        code: String,
        name: String,
        category: AccountCategory,
    ) -> LedgerResult<Account> {
        self.accounts.create_account(code, name, category).await
    }

    /// Create a new account with an explicit normal balance side
    pub async fn create_account_with_normal_balance(
        &mut self,
        code: String,
        name: String,
        category: AccountCategory,
        normal_balance: Side,
    ) -> LedgerResult<Account> {
        self.accounts
            .create_account_with_normal_balance(code, name, category, normal_balance)
            .await
    }

    /// Get an account by ID
    pub async fn account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.accounts.account(account_id).await
    }

    /// Get an account by chart code
    pub async fn account_by_code(&self, code: &str) -> LedgerResult<Option<Account>> {
        self.accounts.account_by_code(code).await
    }

    /// List all accounts in code order
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.accounts.list_accounts().await
    }

    /// List accounts of one category
    pub async fn list_accounts_by_category(
        &self,
        category: AccountCategory,
    ) -> LedgerResult<Vec<Account>> {
        self.accounts.list_accounts_by_category(category).await
    }

    /// Seed the standard oyster-farm chart of accounts
    pub async fn seed_farm_chart(&mut self) -> LedgerResult<HashMap<String, Account>> {
        crate::ledger::account::utils::seed_farm_chart(&mut self.accounts).await
    }

    // Opening balances
    /// Replace the whole opening-balance set (delete + reinsert). This is
    /// also the explicit, user-triggered repair for broken opening data.
    pub async fn set_opening_balances(&mut self, rows: Vec<OpeningBalance>) -> LedgerResult<()> {
        self.accounts.replace_opening_balances(rows).await
    }

    /// Get the opening balance row for an account, if any
    pub async fn opening_balance(&self, account_id: &str) -> LedgerResult<Option<OpeningBalance>> {
        self.accounts.opening_balance(account_id).await
    }

    // Posting operations
    /// Validate and post a journal entry; returns the new entry id
    pub async fn post_journal_entry(&mut self, entry: NewEntry) -> LedgerResult<String> {
        self.posting.post_journal_entry(entry).await
    }

    /// Validate and post an adjusting entry; returns the new entry id
    pub async fn post_adjusting_entry(&mut self, entry: NewEntry) -> LedgerResult<String> {
        self.posting.post_adjusting_entry(entry).await
    }

    /// Get a journal entry by id
    pub async fn journal_entry(&self, entry_id: &str) -> LedgerResult<Option<JournalEntry>> {
        self.storage.entry(EntrySet::Journal, entry_id).await
    }

    /// List all journal entries
    pub async fn list_journal_entries(&self) -> LedgerResult<Vec<JournalEntry>> {
        self.storage.list_entries(EntrySet::Journal).await
    }

    /// List all adjusting entries
    pub async fn list_adjusting_entries(&self) -> LedgerResult<Vec<JournalEntry>> {
        self.storage.list_entries(EntrySet::Adjusting).await
    }

    /// Delete a journal entry and its lines as a unit
    pub async fn delete_journal_entry(&mut self, entry_id: &str) -> LedgerResult<()> {
        self.posting.delete_journal_entry(entry_id).await
    }

    /// Delete an adjusting entry and its lines as a unit
    pub async fn delete_adjusting_entry(&mut self, entry_id: &str) -> LedgerResult<()> {
        self.posting.delete_adjusting_entry(entry_id).await
    }

    // Balance and reporting operations
    /// Balance of an account, optionally including adjusting entries
    pub async fn account_balance(
        &self,
        account_id: &str,
        include_adjustments: bool,
    ) -> LedgerResult<BigDecimal> {
        self.balances
            .account_balance(account_id, include_adjustments)
            .await
    }

    /// General ledger view of one account with a running balance
    pub async fn general_ledger(
        &self,
        account_id: &str,
        include_adjustments: bool,
    ) -> LedgerResult<GeneralLedger> {
        self.balances
            .general_ledger(account_id, include_adjustments)
            .await
    }

    /// Trial balance over all accounts
    pub async fn trial_balance(&self, include_adjustments: bool) -> LedgerResult<TrialBalance> {
        self.statements.trial_balance(include_adjustments).await
    }

    /// Income statement
    pub async fn income_statement(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<IncomeStatement> {
        self.statements.income_statement(include_adjustments).await
    }

    /// Balance sheet
    pub async fn balance_sheet(&self, include_adjustments: bool) -> LedgerResult<BalanceSheet> {
        self.statements.balance_sheet(include_adjustments).await
    }

    /// Cash flow statement
    pub async fn cash_flow_statement(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<CashFlowStatement> {
        self.statements
            .cash_flow_statement(include_adjustments)
            .await
    }

    /// Equity statement
    pub async fn equity_statement(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<EquityStatement> {
        self.statements.equity_statement(include_adjustments).await
    }

    // Closing operations
    /// Compute the closing lines without posting them
    pub async fn closing_entries(&self, include_adjustments: bool) -> LedgerResult<ClosingPlan> {
        self.closing.closing_entries(include_adjustments).await
    }

    /// Post the closing entry; fails with `PeriodClosed` when already done
    pub async fn post_closing_entries(
        &mut self,
        date: NaiveDate,
        include_adjustments: bool,
    ) -> LedgerResult<String> {
        self.closing
            .post_closing_entries(&mut self.posting, date, include_adjustments)
            .await
    }

    /// Whether closing entries have already been posted this period
    pub async fn is_period_closed(&self) -> LedgerResult<bool> {
        self.closing.is_period_closed().await
    }

    /// Post-closing trial balance (real accounts only, adjustments included)
    pub async fn post_closing_trial_balance(&self) -> LedgerResult<TrialBalance> {
        self.statements.post_closing_trial_balance().await
    }

    // Inventory operations
    /// Cached stock level for a tracked code
    pub async fn current_stock(&self, code: &str) -> LedgerResult<BigDecimal> {
        inventory::current_stock(&self.storage, code).await
    }

    /// The append-only inventory movement log
    pub async fn inventory_movements(&self) -> LedgerResult<Vec<InventoryMovement>> {
        self.storage.list_inventory_movements().await
    }

    /// Rebuild the cached stock counters from the movement log
    pub async fn recompute_stock(&mut self) -> LedgerResult<Vec<(String, BigDecimal)>> {
        inventory::recompute_stock(&mut self.storage, &self.pricing).await
    }

    // Templates
    /// Save a transaction template
    pub async fn save_template(&mut self, template: &TransactionTemplate) -> LedgerResult<()> {
        crate::utils::validation::validate_template_key(&template.key)?;
        self.storage.save_template(template).await
    }

    /// Get a transaction template by key
    pub async fn template(&self, key: &str) -> LedgerResult<Option<TransactionTemplate>> {
        self.storage.template(key).await
    }

    /// Validate the internal consistency of the ledger. Imbalances are
    /// reported as issues, never repaired.
    pub async fn validate_integrity(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<LedgerIntegrityReport> {
        let trial_balance = self.trial_balance(include_adjustments).await?;
        let balance_sheet = self.balance_sheet(include_adjustments).await?;

        let mut issues = Vec::new();

        if !trial_balance.is_balanced {
            issues.push(format!(
                "Trial balance is not balanced: debits = {}, credits = {}",
                trial_balance.total_debits, trial_balance.total_credits
            ));
        }

        let total_liabilities_equity =
            &balance_sheet.total_liabilities + &balance_sheet.total_equity;
        if !balance_sheet.is_balanced {
            issues.push(format!(
                "Balance sheet is not balanced: assets = {}, liabilities + equity = {}",
                balance_sheet.total_assets, total_liabilities_equity
            ));
        }

        Ok(LedgerIntegrityReport {
            is_valid: issues.is_empty(),
            issues,
            trial_balance_total_debits: trial_balance.total_debits,
            trial_balance_total_credits: trial_balance.total_credits,
            balance_sheet_total_assets: balance_sheet.total_assets,
            balance_sheet_total_liabilities_equity: total_liabilities_equity,
        })
    }
}

/// Report on ledger integrity and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub trial_balance_total_debits: BigDecimal,
    pub trial_balance_total_credits: BigDecimal,
    pub balance_sheet_total_assets: BigDecimal,
    pub balance_sheet_total_liabilities_equity: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::codes;
    use crate::ledger::posting::EntryBuilder;
    use crate::utils::memory_storage::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_ledger_basic_operations() {
        let storage = MemoryStore::new();
        let mut ledger = Ledger::new(storage);

        let kas = ledger
            .create_account("101".to_string(), "Kas".to_string(), AccountCategory::Asset)
            .await
            .unwrap();
        let penjualan = ledger
            .create_account(
                "401".to_string(),
                "Penjualan Tiram".to_string(),
                AccountCategory::Revenue,
            )
            .await
            .unwrap();

        let entry = EntryBuilder::new(date(2024, 1, 1), "Penjualan tunai".to_string())
            .debit(kas.id.clone(), BigDecimal::from(500_000), None)
            .credit(penjualan.id.clone(), BigDecimal::from(500_000), None)
            .build()
            .unwrap();
        ledger.post_journal_entry(entry).await.unwrap();

        assert_eq!(
            ledger.account_balance(&kas.id, false).await.unwrap(),
            BigDecimal::from(500_000)
        );
        assert_eq!(
            ledger.account_balance(&penjualan.id, false).await.unwrap(),
            BigDecimal::from(500_000)
        );

        let trial_balance = ledger.trial_balance(false).await.unwrap();
        assert!(trial_balance.is_balanced);
        assert_eq!(trial_balance.total_debits, BigDecimal::from(500_000));
        assert_eq!(trial_balance.total_credits, BigDecimal::from(500_000));
    }

    #[tokio::test]
    async fn test_missing_account_is_an_error_not_zero() {
        let storage = MemoryStore::new();
        let ledger = Ledger::new(storage);

        let result = ledger.account_balance("nonexistent", true).await;
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_integrity_report_flags_missing_counterpart() {
        let storage = MemoryStore::new();
        let mut ledger = Ledger::new(storage);
        let accounts = ledger.seed_farm_chart().await.unwrap();

        // opening debit with no matching credit: trial balance must report,
        // not fail
        ledger
            .set_opening_balances(vec![OpeningBalance::debit_of(
                accounts["kas"].id.clone(),
                BigDecimal::from(1_000_000),
            )])
            .await
            .unwrap();

        let report = ledger.validate_integrity(true).await.unwrap();
        assert!(!report.is_valid);
        assert!(!report.issues.is_empty());

        // repair by balancing against capital
        ledger
            .set_opening_balances(vec![
                OpeningBalance::debit_of(accounts["kas"].id.clone(), BigDecimal::from(1_000_000)),
                OpeningBalance::credit_of(
                    accounts["modal"].id.clone(),
                    BigDecimal::from(1_000_000),
                ),
            ])
            .await
            .unwrap();
        let report = ledger.validate_integrity(true).await.unwrap();
        assert!(report.is_valid, "issues: {:?}", report.issues);
    }

    #[tokio::test]
    async fn test_harvest_updates_stock_counter() {
        let storage = MemoryStore::new();
        let mut ledger = Ledger::new(storage);
        let accounts = ledger.seed_farm_chart().await.unwrap();

        // 100 seeds in at 2,000 each
        let purchase = EntryBuilder::new(date(2024, 2, 1), "Beli bibit tiram".to_string())
            .debit(accounts["bibit"].id.clone(), BigDecimal::from(200_000), None)
            .credit(accounts["kas"].id.clone(), BigDecimal::from(200_000), None)
            .build()
            .unwrap();
        ledger.post_journal_entry(purchase).await.unwrap();
        assert_eq!(
            ledger.current_stock(codes::SEED_INVENTORY).await.unwrap(),
            BigDecimal::from(100)
        );

        // harvest: 20 grade-A oysters from 100 seeds
        let harvest = EntryBuilder::new(date(2024, 3, 1), "Panen tiram".to_string())
            .debit(
                accounts["tiram_a"].id.clone(),
                BigDecimal::from(300_000),
                None,
            )
            .credit(accounts["bibit"].id.clone(), BigDecimal::from(200_000), None)
            .credit(
                accounts["pendapatan_lain"].id.clone(),
                BigDecimal::from(100_000),
                None,
            )
            .build()
            .unwrap();
        ledger.post_journal_entry(harvest).await.unwrap();

        assert_eq!(
            ledger.current_stock(codes::SEED_INVENTORY).await.unwrap(),
            BigDecimal::from(0)
        );
        assert_eq!(
            ledger.current_stock(codes::OYSTER_GRADE_A).await.unwrap(),
            BigDecimal::from(20)
        );
        assert_eq!(ledger.inventory_movements().await.unwrap().len(), 3);
    }
}
