//! Financial statement generation
//!
//! Pure read-side aggregation over the ledger snapshot. Imbalances (trial
//! balance columns unequal, balance sheet sides unequal) are legitimate,
//! displayable results reflecting bad underlying data — they are reported
//! through `is_balanced` flags, never raised as errors.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::ledger::account::codes;
use crate::ledger::balance::BalanceCalculator;
use crate::traits::*;
use crate::types::*;

/// One trial-balance row: the account's balance placed on its debit or
/// credit column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: Account,
    pub debit: Option<BigDecimal>,
    pub credit: Option<BigDecimal>,
}

impl AccountBalance {
    /// The balance amount regardless of column
    pub fn amount(&self) -> BigDecimal {
        self.debit
            .clone()
            .or_else(|| self.credit.clone())
            .unwrap_or_else(|| BigDecimal::from(0))
    }
}

/// Trial balance: every non-zero account balance split into debit/credit
/// columns, in code order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<AccountBalance>,
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
    pub is_balanced: bool,
}

/// One statement line: an account and its signed contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub account: Account,
    pub amount: BigDecimal,
}

/// Income statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: Vec<StatementLine>,
    pub expenses: Vec<StatementLine>,
    pub total_revenue: BigDecimal,
    pub total_expenses: BigDecimal,
    pub net_income: BigDecimal,
}

/// Balance sheet. Contra-asset and drawings lines carry negative amounts so
/// each section's total is the plain sum of its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
    pub total_assets: BigDecimal,
    pub total_liabilities: BigDecimal,
    pub total_equity: BigDecimal,
    pub is_balanced: bool,
}

/// Cash flow item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowItem {
    pub description: String,
    pub amount: BigDecimal,
}

/// Cash flow statement (cash basis; accruals are not modeled)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub operating_activities: Vec<CashFlowItem>,
    pub investing_activities: Vec<CashFlowItem>,
    pub financing_activities: Vec<CashFlowItem>,
    pub net_operating_cash_flow: BigDecimal,
    pub net_investing_cash_flow: BigDecimal,
    pub net_financing_cash_flow: BigDecimal,
    pub net_cash_flow: BigDecimal,
}

/// Statement of changes in equity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityStatement {
    pub beginning_capital: BigDecimal,
    pub net_income: BigDecimal,
    pub drawings: BigDecimal,
    pub ending_capital: BigDecimal,
}

/// Generates financial statements from the ledger store
pub struct StatementGenerator<S: LedgerStore> {
    storage: S,
    balances: BalanceCalculator<S>,
}

impl<S: LedgerStore + Clone> StatementGenerator<S> {
    /// Create a new statement generator
    pub fn new(storage: S) -> Self {
        Self {
            balances: BalanceCalculator::new(storage.clone()),
            storage,
        }
    }

    /// Trial balance over all accounts
    pub async fn trial_balance(&self, include_adjustments: bool) -> LedgerResult<TrialBalance> {
        let accounts = self.storage.list_accounts(None).await?;
        self.build_trial_balance(accounts, include_adjustments).await
    }

    /// Post-closing trial balance: real accounts only, adjustments always
    /// included
    pub async fn post_closing_trial_balance(&self) -> LedgerResult<TrialBalance> {
        let accounts = self
            .storage
            .list_accounts(None)
            .await?
            .into_iter()
            .filter(|a| a.category.is_real())
            .collect();
        self.build_trial_balance(accounts, true).await
    }

    async fn build_trial_balance(
        &self,
        accounts: Vec<Account>,
        include_adjustments: bool,
    ) -> LedgerResult<TrialBalance> {
        let zero = BigDecimal::from(0);
        let mut rows = Vec::new();
        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);

        for account in accounts {
            let balance = self.balances.balance_of(&account, include_adjustments).await?;
            if balance == zero {
                continue;
            }

            // A non-negative balance sits on the account's normal side; a
            // negative one flips to the opposite column as an absolute value.
            let row = match (account.normal_balance, balance >= zero) {
                (Side::Debit, true) | (Side::Credit, false) => {
                    total_debits += balance.abs();
                    AccountBalance {
                        account,
                        debit: Some(balance.abs()),
                        credit: None,
                    }
                }
                (Side::Credit, true) | (Side::Debit, false) => {
                    total_credits += balance.abs();
                    AccountBalance {
                        account,
                        debit: None,
                        credit: Some(balance.abs()),
                    }
                }
            };
            rows.push(row);
        }

        let is_balanced = total_debits == total_credits;
        Ok(TrialBalance {
            rows,
            total_debits,
            total_credits,
            is_balanced,
        })
    }

    /// Income statement: revenue nets, expense nets, net income
    pub async fn income_statement(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<IncomeStatement> {
        let revenue = self
            .category_lines(AccountCategory::Revenue, Side::Credit, include_adjustments)
            .await?;
        let expenses = self
            .category_lines(AccountCategory::Expense, Side::Debit, include_adjustments)
            .await?;

        let total_revenue: BigDecimal = revenue.iter().map(|l| &l.amount).sum();
        let total_expenses: BigDecimal = expenses.iter().map(|l| &l.amount).sum();
        let net_income = &total_revenue - &total_expenses;

        Ok(IncomeStatement {
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income,
        })
    }

    /// Balance sheet with current-period net income folded into equity as a
    /// synthetic row (closing has not necessarily occurred yet)
    pub async fn balance_sheet(&self, include_adjustments: bool) -> LedgerResult<BalanceSheet> {
        let mut assets = self
            .category_lines(AccountCategory::Asset, Side::Debit, include_adjustments)
            .await?;
        assets.extend(
            self.category_lines(AccountCategory::ContraAsset, Side::Debit, include_adjustments)
                .await?,
        );
        assets.sort_by(|a, b| a.account.code.cmp(&b.account.code));

        let liabilities = self
            .category_lines(AccountCategory::Liability, Side::Credit, include_adjustments)
            .await?;
        let mut equity = self
            .category_lines(AccountCategory::Equity, Side::Credit, include_adjustments)
            .await?;

        let net_income = self.income_statement(include_adjustments).await?.net_income;
        if net_income != BigDecimal::from(0) {
            equity.push(StatementLine {
                account: Account::new(
                    "390".to_string(),
                    "Laba Periode Berjalan".to_string(),
                    AccountCategory::Equity,
                ),
                amount: net_income.clone(),
            });
        }

        let total_assets: BigDecimal = assets.iter().map(|l| &l.amount).sum();
        let total_liabilities: BigDecimal = liabilities.iter().map(|l| &l.amount).sum();
        let total_equity: BigDecimal = equity.iter().map(|l| &l.amount).sum();
        let is_balanced = total_assets == &total_liabilities + &total_equity;

        Ok(BalanceSheet {
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            is_balanced,
        })
    }

    /// Cash flow statement: operating from the income statement, investing
    /// from the equipment code, financing from capital/drawing/loan codes
    pub async fn cash_flow_statement(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<CashFlowStatement> {
        let income = self.income_statement(include_adjustments).await?;
        let operating_activities = vec![
            CashFlowItem {
                description: "Penerimaan pendapatan".to_string(),
                amount: income.total_revenue.clone(),
            },
            CashFlowItem {
                description: "Pembayaran beban".to_string(),
                amount: -income.total_expenses.clone(),
            },
        ];
        let net_operating_cash_flow = &income.total_revenue - &income.total_expenses;

        let mut investing_activities = Vec::new();
        let mut net_investing_cash_flow = BigDecimal::from(0);
        if let Some(equipment) = self.storage.account_by_code(codes::EQUIPMENT).await? {
            let activity = self
                .period_activity(&equipment, include_adjustments)
                .await?;
            // A net debit is money spent on equipment
            let cash_effect = -activity;
            if cash_effect != BigDecimal::from(0) {
                investing_activities.push(CashFlowItem {
                    description: equipment.name.clone(),
                    amount: cash_effect.clone(),
                });
            }
            net_investing_cash_flow = cash_effect;
        }

        let mut financing_activities = Vec::new();
        let mut net_financing_cash_flow = BigDecimal::from(0);
        for code in [codes::OWNER_CAPITAL, codes::DRAWINGS, codes::BANK_LOAN] {
            let Some(account) = self.storage.account_by_code(code).await? else {
                continue;
            };
            let activity = self.period_activity(&account, include_adjustments).await?;
            let cash_effect = match account.normal_balance {
                Side::Credit => activity,
                Side::Debit => -activity,
            };
            if cash_effect != BigDecimal::from(0) {
                financing_activities.push(CashFlowItem {
                    description: account.name.clone(),
                    amount: cash_effect.clone(),
                });
            }
            net_financing_cash_flow += cash_effect;
        }

        let net_cash_flow =
            &net_operating_cash_flow + &net_investing_cash_flow + &net_financing_cash_flow;

        Ok(CashFlowStatement {
            operating_activities,
            investing_activities,
            financing_activities,
            net_operating_cash_flow,
            net_investing_cash_flow,
            net_financing_cash_flow,
            net_cash_flow,
        })
    }

    /// Equity statement: beginning capital + net income − drawings
    pub async fn equity_statement(
        &self,
        include_adjustments: bool,
    ) -> LedgerResult<EquityStatement> {
        let capital = self
            .storage
            .account_by_code(codes::OWNER_CAPITAL)
            .await?
            .ok_or_else(|| {
                LedgerError::AccountNotFound(format!("code {}", codes::OWNER_CAPITAL))
            })?;
        let beginning_capital = self.balances.balance_of(&capital, include_adjustments).await?;

        let drawings = match self.storage.account_by_code(codes::DRAWINGS).await? {
            Some(account) => self.balances.balance_of(&account, include_adjustments).await?,
            None => BigDecimal::from(0),
        };

        let net_income = self.income_statement(include_adjustments).await?.net_income;
        let ending_capital = &beginning_capital + &net_income - &drawings;

        Ok(EquityStatement {
            beginning_capital,
            net_income,
            drawings,
            ending_capital,
        })
    }

    /// Non-zero balances of a category as statement lines, signed so the
    /// section's natural side is positive
    async fn category_lines(
        &self,
        category: AccountCategory,
        section_side: Side,
        include_adjustments: bool,
    ) -> LedgerResult<Vec<StatementLine>> {
        let zero = BigDecimal::from(0);
        let mut lines = Vec::new();
        for account in self.storage.list_accounts(Some(category)).await? {
            let balance = self.balances.balance_of(&account, include_adjustments).await?;
            if balance == zero {
                continue;
            }
            let amount = if account.normal_balance == section_side {
                balance
            } else {
                -balance
            };
            lines.push(StatementLine { account, amount });
        }
        Ok(lines)
    }

    /// Entry activity for an account this period (opening balance excluded),
    /// signed by its normal side
    async fn period_activity(
        &self,
        account: &Account,
        include_adjustments: bool,
    ) -> LedgerResult<BigDecimal> {
        let mut activity = self.balances.entry_net(EntrySet::Journal, account).await?;
        if include_adjustments {
            activity += self.balances.entry_net(EntrySet::Adjusting, account).await?;
        }
        Ok(activity)
    }
}
