//! Point-in-time balance derivation
//!
//! A balance is never stored: it is opening net + journal net, with the
//! adjusting net folded in on request, every component signed by the
//! account's normal side.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::traits::*;
use crate::types::*;

/// One line of the general ledger view, with the running balance after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    /// Balance on the account's normal side after this line
    pub balance: BigDecimal,
}

/// General ledger for one account: opening balance, date-ordered activity,
/// and the resulting balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralLedger {
    pub account: Account,
    pub opening: BigDecimal,
    pub rows: Vec<LedgerRow>,
    pub balance: BigDecimal,
}

/// Derives account balances from the ledger store
pub struct BalanceCalculator<S: LedgerStore> {
    storage: S,
}

impl<S: LedgerStore> BalanceCalculator<S> {
    /// Create a new balance calculator
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Balance of an account: opening net + journal net, plus the adjusting
    /// net when `include_adjustments` is set. A missing account is an error,
    /// never zero — returning zero here would let a broken reference hide
    /// inside report totals.
    pub async fn account_balance(
        &self,
        account_id: &str,
        include_adjustments: bool,
    ) -> LedgerResult<BigDecimal> {
        let account = self
            .storage
            .account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;
        self.balance_of(&account, include_adjustments).await
    }

    /// Balance of an already-loaded account
    pub async fn balance_of(
        &self,
        account: &Account,
        include_adjustments: bool,
    ) -> LedgerResult<BigDecimal> {
        let mut balance = self.opening_net(account).await?;
        balance += self.entry_net(EntrySet::Journal, account).await?;
        if include_adjustments {
            balance += self.entry_net(EntrySet::Adjusting, account).await?;
        }
        Ok(balance)
    }

    /// Opening balance netted onto the account's normal side (zero when no
    /// opening row exists)
    pub async fn opening_net(&self, account: &Account) -> LedgerResult<BigDecimal> {
        Ok(match self.storage.opening_balance(&account.id).await? {
            Some(row) => account.signed_net(&row.debit, &row.credit),
            None => BigDecimal::from(0),
        })
    }

    /// Net of all lines for the account in one entry set, signed by the
    /// account's normal side
    pub async fn entry_net(&self, set: EntrySet, account: &Account) -> LedgerResult<BigDecimal> {
        let mut net = BigDecimal::from(0);
        for entry in self.storage.entries_for_account(set, &account.id).await? {
            for line in entry.lines.iter().filter(|l| l.account_id == account.id) {
                net += account.signed_net(&line.debit, &line.credit);
            }
        }
        Ok(net)
    }

    /// General ledger view: the account's lines in date order with a running
    /// balance starting from the opening net.
    pub async fn general_ledger(
        &self,
        account_id: &str,
        include_adjustments: bool,
    ) -> LedgerResult<GeneralLedger> {
        let account = self
            .storage
            .account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        let mut entries = self
            .storage
            .entries_for_account(EntrySet::Journal, account_id)
            .await?;
        if include_adjustments {
            entries.extend(
                self.storage
                    .entries_for_account(EntrySet::Adjusting, account_id)
                    .await?,
            );
        }
        entries.sort_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)));

        let opening = self.opening_net(&account).await?;
        let mut balance = opening.clone();
        let mut rows = Vec::new();
        for entry in &entries {
            for line in entry.lines.iter().filter(|l| l.account_id == account.id) {
                balance += account.signed_net(&line.debit, &line.credit);
                rows.push(LedgerRow {
                    date: entry.date,
                    description: line
                        .description
                        .clone()
                        .unwrap_or_else(|| entry.description.clone()),
                    reference: entry.reference.clone(),
                    debit: line.debit.clone(),
                    credit: line.credit.clone(),
                    balance: balance.clone(),
                });
            }
        }

        Ok(GeneralLedger {
            account,
            opening,
            rows,
            balance,
        })
    }
}
