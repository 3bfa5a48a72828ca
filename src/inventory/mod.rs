//! Oyster stock derivation from journal postings
//!
//! Stock is never entered directly: postings against the quantity-tracked
//! inventory account codes are converted into [`InventoryMovement`] rows
//! using a fixed price-per-unit table, and cached per-code counters in
//! Settings are updated in the same atomic batch as the entry. The movement
//! log is append-only; [`recompute_stock`] rebuilds the counters from it.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ledger::account::codes;
use crate::traits::LedgerStore;
use crate::types::*;

/// Settings key prefix for the cached stock counters
pub const STOCK_KEY_PREFIX: &str = "current_stock_";

/// Settings key holding the cached stock counter for a tracked code
pub fn stock_key(code: &str) -> String {
    format!("{STOCK_KEY_PREFIX}{code}")
}

/// Fixed price-per-unit table keyed by account code.
///
/// The default table covers the four tracked codes of the standard chart:
/// oyster seed and the three finished grades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPricing {
    prices: BTreeMap<String, BigDecimal>,
}

impl Default for InventoryPricing {
    fn default() -> Self {
        let mut prices = BTreeMap::new();
        prices.insert(codes::SEED_INVENTORY.to_string(), BigDecimal::from(2_000));
        prices.insert(codes::OYSTER_GRADE_A.to_string(), BigDecimal::from(15_000));
        prices.insert(codes::OYSTER_GRADE_B.to_string(), BigDecimal::from(10_000));
        prices.insert(codes::OYSTER_GRADE_C.to_string(), BigDecimal::from(8_000));
        Self { prices }
    }
}

impl InventoryPricing {
    /// An empty table (nothing tracked)
    pub fn empty() -> Self {
        Self {
            prices: BTreeMap::new(),
        }
    }

    /// Add or override a tracked code's unit price
    pub fn with_price(mut self, code: &str, unit_price: BigDecimal) -> Self {
        self.prices.insert(code.to_string(), unit_price);
        self
    }

    /// Whether postings against this code move stock
    pub fn is_tracked(&self, code: &str) -> bool {
        self.prices.contains_key(code)
    }

    /// Unit price for a tracked code
    pub fn unit_price(&self, code: &str) -> Option<&BigDecimal> {
        self.prices.get(code)
    }

    /// The tracked codes, in code order
    pub fn tracked_codes(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }
}

/// How a posting relates to inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryClass {
    /// Debit to a finished-goods code: harvested oysters enter stock,
    /// usually consuming seed stock on the credit side
    Harvest,
    /// Debit to the seed code without a harvest: seed bought into stock
    Purchase,
    /// Tracked code credited alongside a revenue account: goods leave stock
    Sale,
    /// Any other posting that touches a tracked code
    Adjustment,
}

/// Classify an entry by how its lines touch the tracked codes. Returns
/// `None` when no tracked code is involved. `accounts` maps account id to
/// account for every line of the entry.
pub fn classify(
    entry: &JournalEntry,
    accounts: &HashMap<String, Account>,
    pricing: &InventoryPricing,
) -> Option<EntryClass> {
    let mut finished_debited = false;
    let mut seed_debited = false;
    let mut tracked_credited = false;
    let mut touches_revenue = false;
    let mut touches_tracked = false;

    let zero = BigDecimal::from(0);
    for line in &entry.lines {
        let Some(account) = accounts.get(&line.account_id) else {
            continue;
        };
        if account.category == AccountCategory::Revenue {
            touches_revenue = true;
        }
        if !pricing.is_tracked(&account.code) {
            continue;
        }
        touches_tracked = true;
        if line.debit > zero {
            if account.code == codes::SEED_INVENTORY {
                seed_debited = true;
            } else {
                finished_debited = true;
            }
        }
        if line.credit > zero {
            tracked_credited = true;
        }
    }

    if !touches_tracked {
        return None;
    }
    Some(if finished_debited {
        EntryClass::Harvest
    } else if tracked_credited && touches_revenue {
        EntryClass::Sale
    } else if seed_debited {
        EntryClass::Purchase
    } else {
        EntryClass::Adjustment
    })
}

/// Inventory side effects planned for one posting: the movement rows to
/// append and the per-code stock deltas to fold into the cached counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementPlan {
    pub class: Option<EntryClass>,
    pub movements: Vec<InventoryMovement>,
    pub deltas: Vec<(String, BigDecimal)>,
}

impl MovementPlan {
    /// A plan with no inventory effect
    pub fn none() -> Self {
        Self {
            class: None,
            movements: Vec::new(),
            deltas: Vec::new(),
        }
    }
}

/// Plan the inventory side effects of an entry.
///
/// A debit against a tracked code converts its monetary amount into a
/// quantity in (`amount / unit_price`); a credit converts into a quantity
/// out. A harvest is simply the combination of a finished-goods quantity in
/// and a seed quantity out.
pub fn plan_movements(
    entry: &JournalEntry,
    accounts: &HashMap<String, Account>,
    pricing: &InventoryPricing,
) -> LedgerResult<MovementPlan> {
    let class = classify(entry, accounts, pricing);
    if class.is_none() {
        return Ok(MovementPlan::none());
    }

    let zero = BigDecimal::from(0);
    let mut movements = Vec::new();
    let mut deltas: BTreeMap<String, BigDecimal> = BTreeMap::new();

    for line in &entry.lines {
        let account = accounts
            .get(&line.account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(line.account_id.clone()))?;
        let Some(unit_price) = pricing.unit_price(&account.code) else {
            continue;
        };

        let (quantity_in, quantity_out, value) = if line.debit > zero {
            (&line.debit / unit_price, zero.clone(), line.debit.clone())
        } else if line.credit > zero {
            (zero.clone(), &line.credit / unit_price, line.credit.clone())
        } else {
            continue;
        };

        let delta = &quantity_in - &quantity_out;
        movements.push(InventoryMovement {
            id: uuid::Uuid::new_v4().to_string(),
            date: entry.date,
            description: entry.description.clone(),
            account_code: account.code.clone(),
            quantity_in,
            quantity_out,
            unit_cost: unit_price.clone(),
            value,
        });
        let slot = deltas.entry(account.code.clone()).or_insert_with(|| zero.clone());
        *slot += delta;
    }

    Ok(MovementPlan {
        class,
        movements,
        deltas: deltas.into_iter().collect(),
    })
}

/// Read the cached stock counter for a tracked code (zero when unset)
pub async fn current_stock<S: LedgerStore>(store: &S, code: &str) -> LedgerResult<BigDecimal> {
    let key = stock_key(code);
    match store.setting(&key).await? {
        Some(value) => value
            .parse::<BigDecimal>()
            .map_err(|_| LedgerError::InvalidSetting { key, value }),
        None => Ok(BigDecimal::from(0)),
    }
}

/// Rebuild every cached stock counter from the movement log. This is the
/// user-triggered repair for counters that drifted (e.g. after entries were
/// deleted); the log itself is never rewritten.
pub async fn recompute_stock<S: LedgerStore>(
    store: &mut S,
    pricing: &InventoryPricing,
) -> LedgerResult<Vec<(String, BigDecimal)>> {
    let mut totals: BTreeMap<String, BigDecimal> = pricing
        .tracked_codes()
        .map(|code| (code.to_string(), BigDecimal::from(0)))
        .collect();

    for movement in store.list_inventory_movements().await? {
        let delta = &movement.quantity_in - &movement.quantity_out;
        let slot = totals
            .entry(movement.account_code.clone())
            .or_insert_with(|| BigDecimal::from(0));
        *slot += delta;
    }

    for (code, total) in &totals {
        store
            .put_setting(&stock_key(code), &total.normalized().to_string())
            .await?;
    }
    info!(codes = totals.len(), "Rebuilt stock counters from movement log");

    Ok(totals.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn account(code: &str, category: AccountCategory) -> Account {
        Account::new(code.to_string(), format!("acct {code}"), category)
    }

    fn entry(lines: Vec<JournalLine>) -> JournalEntry {
        JournalEntry {
            id: "e1".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            description: "Panen tiram".into(),
            reference: None,
            transaction_type: None,
            posted: true,
            lines,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn harvest_converts_money_to_quantity() {
        let grade_a = account(codes::OYSTER_GRADE_A, AccountCategory::Asset);
        let seed = account(codes::SEED_INVENTORY, AccountCategory::Asset);
        let accounts: HashMap<String, Account> = [
            (grade_a.id.clone(), grade_a.clone()),
            (seed.id.clone(), seed.clone()),
        ]
        .into();

        // 30 grade-A oysters in, 100 seeds consumed
        let e = entry(vec![
            JournalLine::debit(grade_a.id.clone(), BigDecimal::from(450_000), None),
            JournalLine::credit(seed.id.clone(), BigDecimal::from(200_000), None),
        ]);

        let plan = plan_movements(&e, &accounts, &InventoryPricing::default()).unwrap();
        assert_eq!(plan.class, Some(EntryClass::Harvest));
        assert_eq!(plan.movements.len(), 2);
        assert_eq!(
            plan.deltas,
            vec![
                (codes::SEED_INVENTORY.to_string(), BigDecimal::from(-100)),
                (codes::OYSTER_GRADE_A.to_string(), BigDecimal::from(30)),
            ]
        );
    }

    #[test]
    fn sale_reduces_stock_by_credit_over_unit_cost() {
        let grade_b = account(codes::OYSTER_GRADE_B, AccountCategory::Asset);
        let sales = account(codes::SALES, AccountCategory::Revenue);
        let kas = account(codes::CASH, AccountCategory::Asset);
        let accounts: HashMap<String, Account> = [
            (grade_b.id.clone(), grade_b.clone()),
            (sales.id.clone(), sales.clone()),
            (kas.id.clone(), kas.clone()),
        ]
        .into();

        let e = entry(vec![
            JournalLine::debit(kas.id.clone(), BigDecimal::from(50_000), None),
            JournalLine::credit(grade_b.id.clone(), BigDecimal::from(50_000), None),
        ]);
        // not a sale without a revenue line in the entry
        assert_eq!(
            classify(&e, &accounts, &InventoryPricing::default()),
            Some(EntryClass::Adjustment)
        );

        let e = entry(vec![
            JournalLine::debit(kas.id.clone(), BigDecimal::from(100_000), None),
            JournalLine::credit(sales.id.clone(), BigDecimal::from(50_000), None),
            JournalLine::credit(grade_b.id.clone(), BigDecimal::from(50_000), None),
        ]);
        let plan = plan_movements(&e, &accounts, &InventoryPricing::default()).unwrap();
        assert_eq!(plan.class, Some(EntryClass::Sale));
        assert_eq!(
            plan.deltas,
            vec![(codes::OYSTER_GRADE_B.to_string(), BigDecimal::from(-5))]
        );
    }

    #[test]
    fn untracked_codes_produce_no_plan() {
        let kas = account(codes::CASH, AccountCategory::Asset);
        let modal = account(codes::OWNER_CAPITAL, AccountCategory::Equity);
        let accounts: HashMap<String, Account> = [
            (kas.id.clone(), kas.clone()),
            (modal.id.clone(), modal.clone()),
        ]
        .into();

        let e = entry(vec![
            JournalLine::debit(kas.id.clone(), BigDecimal::from(1_000_000), None),
            JournalLine::credit(modal.id.clone(), BigDecimal::from(1_000_000), None),
        ]);
        let plan = plan_movements(&e, &accounts, &InventoryPricing::default()).unwrap();
        assert_eq!(plan.class, None);
        assert!(plan.movements.is_empty());
        assert!(plan.deltas.is_empty());
    }
}
