//! Period closing
//!
//! Closing zeroes every nominal (revenue/expense) account into retained
//! earnings. Plan computation is pure; posting goes through the ordinary
//! atomic path and stamps a settings flag in the same batch so closing
//! cannot run twice in one period.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::info;

use crate::ledger::account::codes;
use crate::ledger::balance::BalanceCalculator;
use crate::ledger::posting::{NewEntry, PostingEngine};
use crate::traits::*;
use crate::types::*;

/// Settings key recording the posted closing entry's id
pub const CLOSING_ENTRY_KEY: &str = "closing_entry_id";

/// The computed closing lines and the net income they move into retained
/// earnings
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingPlan {
    pub lines: Vec<LineInput>,
    pub net_income: BigDecimal,
}

/// Computes and posts period-closing entries
pub struct ClosingEngine<S: LedgerStore> {
    storage: S,
    balances: BalanceCalculator<S>,
}

impl<S: LedgerStore + Clone> ClosingEngine<S> {
    /// Create a new closing engine
    pub fn new(storage: S) -> Self {
        Self {
            balances: BalanceCalculator::new(storage.clone()),
            storage,
        }
    }

    /// Whether closing entries have already been posted this period
    pub async fn is_period_closed(&self) -> LedgerResult<bool> {
        Ok(self.storage.setting(CLOSING_ENTRY_KEY).await?.is_some())
    }

    /// Compute the closing lines without mutating anything.
    ///
    /// Each non-zero revenue account is posted on the side opposite its
    /// balance (normally a debit) and symmetrically for expense accounts;
    /// one final line moves the net into retained earnings. The
    /// adjusting-inclusion policy is the same parameter the statements use.
    pub async fn closing_entries(&self, include_adjustments: bool) -> LedgerResult<ClosingPlan> {
        let zero = BigDecimal::from(0);
        let mut lines = Vec::new();
        let mut net_revenue = BigDecimal::from(0);
        let mut net_expense = BigDecimal::from(0);

        for account in self
            .storage
            .list_accounts(Some(AccountCategory::Revenue))
            .await?
        {
            let balance = self.balances.balance_of(&account, include_adjustments).await?;
            if balance == zero {
                continue;
            }
            net_revenue += &balance;
            let mut line = if balance > zero {
                LineInput::debit(account.id, balance)
            } else {
                LineInput::credit(account.id, balance.abs())
            };
            line.description = Some(format!("Penutupan {}", account.name));
            lines.push(line);
        }

        for account in self
            .storage
            .list_accounts(Some(AccountCategory::Expense))
            .await?
        {
            let balance = self.balances.balance_of(&account, include_adjustments).await?;
            if balance == zero {
                continue;
            }
            net_expense += &balance;
            let mut line = if balance > zero {
                LineInput::credit(account.id, balance)
            } else {
                LineInput::debit(account.id, balance.abs())
            };
            line.description = Some(format!("Penutupan {}", account.name));
            lines.push(line);
        }

        let net_income = &net_revenue - &net_expense;

        if !lines.is_empty() && net_income != zero {
            let retained = self
                .storage
                .account_by_code(codes::RETAINED_EARNINGS)
                .await?
                .ok_or_else(|| {
                    LedgerError::AccountNotFound(format!("code {}", codes::RETAINED_EARNINGS))
                })?;
            let mut line = if net_income > zero {
                LineInput::credit(retained.id, net_income.clone())
            } else {
                LineInput::debit(retained.id, net_income.abs())
            };
            line.description = Some("Laba bersih periode berjalan".to_string());
            lines.push(line);
        }

        Ok(ClosingPlan { lines, net_income })
    }

    /// Post the closing entry through the ordinary atomic path. Refuses to
    /// run when the period is already closed; the period flag commits in the
    /// same batch as the entry.
    pub async fn post_closing_entries(
        &self,
        posting: &mut PostingEngine<S>,
        date: NaiveDate,
        include_adjustments: bool,
    ) -> LedgerResult<String> {
        if self.is_period_closed().await? {
            return Err(LedgerError::PeriodClosed);
        }

        let plan = self.closing_entries(include_adjustments).await?;
        if plan.lines.is_empty() {
            return Err(LedgerError::NothingToClose);
        }

        let entry = NewEntry {
            date,
            description: "Closing Entry".to_string(),
            reference: None,
            transaction_type: Some("closing".to_string()),
            template_key: None,
            lines: plan.lines,
        };
        let entry_id = posting.post_flagged(entry, CLOSING_ENTRY_KEY).await?;
        info!(entry_id = %entry_id, net_income = %plan.net_income, "Posted closing entries");

        Ok(entry_id)
    }
}
