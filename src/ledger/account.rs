//! Account management functionality

use std::collections::HashMap;

use tracing::info;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_account_code, validate_account_name};

/// Well-known chart codes the statements and the closing engine rely on.
/// The standard chart seeds every one of them.
pub mod codes {
    pub const CASH: &str = "101";
    pub const RECEIVABLES: &str = "102";
    /// Oyster seed stock (raw material)
    pub const SEED_INVENTORY: &str = "103";
    /// Finished oysters, grade A
    pub const OYSTER_GRADE_A: &str = "104";
    /// Finished oysters, grade B
    pub const OYSTER_GRADE_B: &str = "105";
    /// Finished oysters, grade C
    pub const OYSTER_GRADE_C: &str = "106";
    pub const SUPPLIES: &str = "107";
    pub const EQUIPMENT: &str = "121";
    pub const ACCUMULATED_DEPRECIATION: &str = "122";
    pub const PAYABLES: &str = "201";
    pub const BANK_LOAN: &str = "202";
    pub const OWNER_CAPITAL: &str = "301";
    pub const DRAWINGS: &str = "302";
    pub const RETAINED_EARNINGS: &str = "303";
    pub const SALES: &str = "401";
    pub const OTHER_INCOME: &str = "402";
    pub const WAGES_EXPENSE: &str = "501";
    pub const SEED_EXPENSE: &str = "502";
    pub const DEPRECIATION_EXPENSE: &str = "503";
    pub const OTHER_EXPENSE: &str = "504";
}

/// Account manager for chart-of-accounts and opening-balance operations
pub struct AccountManager<S: LedgerStore> {
    pub(crate) storage: S,
}

impl<S: LedgerStore> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new account with the category's default normal balance
    pub async fn create_account(
        &mut self,
        code: String,
        name: String,
        category: AccountCategory,
    ) -> LedgerResult<Account> {
        let normal = category.default_normal_balance();
        self.create_account_with_normal_balance(code, name, category, normal)
            .await
    }

    /// Create a new account with an explicit normal balance side
    pub async fn create_account_with_normal_balance(
        &mut self,
        code: String,
        name: String,
        category: AccountCategory,
        normal_balance: Side,
    ) -> LedgerResult<Account> {
        validate_account_code(&code)?;
        validate_account_name(&name)?;

        if self.storage.account_by_code(&code).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Account with code '{code}' already exists"
            )));
        }

        let account = Account::with_normal_balance(code, name, category, normal_balance);
        self.storage.save_account(&account).await?;

        Ok(account)
    }

    /// Get an account by ID
    pub async fn account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.storage.account(account_id).await
    }

    /// Get an account by ID, returning an error if not found
    pub async fn account_required(&self, account_id: &str) -> LedgerResult<Account> {
        self.storage
            .account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    /// Get an account by chart code
    pub async fn account_by_code(&self, code: &str) -> LedgerResult<Option<Account>> {
        self.storage.account_by_code(code).await
    }

    /// Get an account by chart code, returning an error if not found
    pub async fn account_by_code_required(&self, code: &str) -> LedgerResult<Account> {
        self.storage
            .account_by_code(code)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(format!("code {code}")))
    }

    /// List all accounts in code order
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.storage.list_accounts(None).await
    }

    /// List accounts of one category in code order
    pub async fn list_accounts_by_category(
        &self,
        category: AccountCategory,
    ) -> LedgerResult<Vec<Account>> {
        self.storage.list_accounts(Some(category)).await
    }

    /// Replace the whole opening-balance set. Every row must reference an
    /// existing account; the previous rows are deleted wholesale.
    pub async fn replace_opening_balances(
        &mut self,
        rows: Vec<OpeningBalance>,
    ) -> LedgerResult<()> {
        let zero = bigdecimal::BigDecimal::from(0);
        let mut seen = std::collections::HashSet::new();
        for row in &rows {
            if self.storage.account(&row.account_id).await?.is_none() {
                return Err(LedgerError::AccountNotFound(row.account_id.clone()));
            }
            if !seen.insert(row.account_id.clone()) {
                return Err(LedgerError::Validation(format!(
                    "Duplicate opening balance for account '{}'",
                    row.account_id
                )));
            }
            if row.debit < zero || row.credit < zero {
                return Err(LedgerError::Validation(
                    "Opening balance amounts cannot be negative".to_string(),
                ));
            }
        }

        self.storage.replace_opening_balances(&rows).await?;
        info!(rows = rows.len(), "Replaced opening balances");
        Ok(())
    }

    /// Get the opening balance row for an account, if any
    pub async fn opening_balance(&self, account_id: &str) -> LedgerResult<Option<OpeningBalance>> {
        self.storage.opening_balance(account_id).await
    }
}

/// Utility functions for working with accounts
pub mod utils {
    use super::*;

    /// Seed the standard chart of accounts for the oyster farm. Returns the
    /// created accounts keyed by a stable slug.
    pub async fn seed_farm_chart<S: LedgerStore>(
        manager: &mut AccountManager<S>,
    ) -> LedgerResult<HashMap<String, Account>> {
        use AccountCategory::*;

        let chart: [(&str, &str, &str, AccountCategory); 20] = [
            ("kas", codes::CASH, "Kas", Asset),
            ("piutang", codes::RECEIVABLES, "Piutang Usaha", Asset),
            ("bibit", codes::SEED_INVENTORY, "Persediaan Bibit Tiram", Asset),
            ("tiram_a", codes::OYSTER_GRADE_A, "Persediaan Tiram Grade A", Asset),
            ("tiram_b", codes::OYSTER_GRADE_B, "Persediaan Tiram Grade B", Asset),
            ("tiram_c", codes::OYSTER_GRADE_C, "Persediaan Tiram Grade C", Asset),
            ("perlengkapan", codes::SUPPLIES, "Perlengkapan", Asset),
            ("peralatan", codes::EQUIPMENT, "Peralatan", Asset),
            (
                "akum_penyusutan",
                codes::ACCUMULATED_DEPRECIATION,
                "Akumulasi Penyusutan Peralatan",
                ContraAsset,
            ),
            ("utang_usaha", codes::PAYABLES, "Utang Usaha", Liability),
            ("utang_bank", codes::BANK_LOAN, "Utang Bank", Liability),
            ("modal", codes::OWNER_CAPITAL, "Modal Pemilik", Equity),
            ("prive", codes::DRAWINGS, "Prive", Equity),
            ("laba_ditahan", codes::RETAINED_EARNINGS, "Laba Ditahan", Equity),
            ("penjualan", codes::SALES, "Penjualan Tiram", Revenue),
            ("pendapatan_lain", codes::OTHER_INCOME, "Pendapatan Lain-lain", Revenue),
            ("beban_gaji", codes::WAGES_EXPENSE, "Beban Gaji", Expense),
            ("beban_bibit", codes::SEED_EXPENSE, "Beban Bibit", Expense),
            (
                "beban_penyusutan",
                codes::DEPRECIATION_EXPENSE,
                "Beban Penyusutan",
                Expense,
            ),
            ("beban_lain", codes::OTHER_EXPENSE, "Beban Lain-lain", Expense),
        ];

        let mut accounts = HashMap::new();
        for (slug, code, name, category) in chart {
            // Prive carries a debit balance despite sitting in equity
            let account = if code == codes::DRAWINGS {
                manager
                    .create_account_with_normal_balance(
                        code.to_string(),
                        name.to_string(),
                        category,
                        Side::Debit,
                    )
                    .await?
            } else {
                manager
                    .create_account(code.to_string(), name.to_string(), category)
                    .await?
            };
            accounts.insert(slug.to_string(), account);
        }

        info!(accounts = accounts.len(), "Seeded standard farm chart");
        Ok(accounts)
    }
}
