//! Core types and data structures for the bookkeeping system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Account categories following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountCategory {
    /// Assets - what the business owns (Cash, Inventory, Equipment, etc.)
    Asset,
    /// Contra-assets - valuation offsets against assets (Accumulated Depreciation)
    ContraAsset,
    /// Liabilities - what the business owes (Loans, Accounts Payable, etc.)
    Liability,
    /// Equity - owner's interest in the business (Capital, Retained Earnings, etc.)
    Equity,
    /// Revenue - money earned by the business
    Revenue,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountCategory {
    /// Returns the default normal balance side for this category.
    /// Assets and Expenses normally carry debit balances; contra-assets,
    /// liabilities, equity, and revenue normally carry credit balances.
    pub fn default_normal_balance(&self) -> Side {
        match self {
            AccountCategory::Asset | AccountCategory::Expense => Side::Debit,
            AccountCategory::ContraAsset
            | AccountCategory::Liability
            | AccountCategory::Equity
            | AccountCategory::Revenue => Side::Credit,
        }
    }

    /// Whether accounts of this category survive period closing.
    /// Revenue and Expense accounts are nominal and get zeroed into
    /// retained earnings; everything else is real.
    pub fn is_real(&self) -> bool {
        !matches!(self, AccountCategory::Revenue | AccountCategory::Expense)
    }
}

/// The two sides of a double-entry posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Debit - increases Assets and Expenses, decreases the credit-normal categories
    Debit,
    /// Credit - increases Liabilities, Equity, and Revenue, decreases the debit-normal categories
    Credit,
}

impl Side {
    /// The opposite side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}

/// Chart-of-accounts entry. Reference data: immutable after seeding and
/// never deleted while journal lines still point at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: String,
    /// Unique, sortable account code (e.g. "101")
    pub code: String,
    /// Human-readable account name
    pub name: String,
    /// Category of the account (Asset, Liability, etc.)
    pub category: AccountCategory,
    /// Side on which this account's balance is conventionally positive
    pub normal_balance: Side,
    /// When the account was created
    pub created_at: NaiveDateTime,
}

impl Account {
    /// Create a new account with a generated id and the category's default
    /// normal balance.
    pub fn new(code: String, name: String, category: AccountCategory) -> Self {
        Self::with_normal_balance(code, name, category, category.default_normal_balance())
    }

    /// Create a new account with an explicit normal balance, for accounts
    /// whose convention differs from their category (e.g. drawings: Equity
    /// with a Debit normal side).
    pub fn with_normal_balance(
        code: String,
        name: String,
        category: AccountCategory,
        normal_balance: Side,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code,
            name,
            category,
            normal_balance,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Net a debit/credit amount pair onto this account's normal side.
    /// Debit-normal accounts net debit − credit; credit-normal accounts
    /// net credit − debit.
    pub fn signed_net(&self, debit: &BigDecimal, credit: &BigDecimal) -> BigDecimal {
        match self.normal_balance {
            Side::Debit => debit - credit,
            Side::Credit => credit - debit,
        }
    }
}

/// Starting balance of an account at the beginning of the current period.
/// At most one of the two amounts is conceptually non-zero; both columns are
/// stored and netted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    /// Account the balance belongs to (one row per account)
    pub account_id: String,
    /// Opening debit amount
    pub debit: BigDecimal,
    /// Opening credit amount
    pub credit: BigDecimal,
}

impl OpeningBalance {
    /// Create an opening balance row
    pub fn new(account_id: String, debit: BigDecimal, credit: BigDecimal) -> Self {
        Self {
            account_id,
            debit,
            credit,
        }
    }

    /// Opening balance row carrying only a debit amount
    pub fn debit_of(account_id: String, amount: BigDecimal) -> Self {
        Self::new(account_id, amount, BigDecimal::from(0))
    }

    /// Opening balance row carrying only a credit amount
    pub fn credit_of(account_id: String, amount: BigDecimal) -> Self {
        Self::new(account_id, BigDecimal::from(0), amount)
    }
}

/// Individual line within a journal or adjusting entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account being affected
    pub account_id: String,
    /// Debit amount (zero when the line credits)
    pub debit: BigDecimal,
    /// Credit amount (zero when the line debits)
    pub credit: BigDecimal,
    /// Optional description for this specific line
    pub description: Option<String>,
}

impl JournalLine {
    /// Create a debit line
    pub fn debit(account_id: String, amount: BigDecimal, description: Option<String>) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: BigDecimal::from(0),
            description,
        }
    }

    /// Create a credit line
    pub fn credit(account_id: String, amount: BigDecimal, description: Option<String>) -> Self {
        Self {
            account_id,
            debit: BigDecimal::from(0),
            credit: amount,
            description,
        }
    }

    /// Which side this line populates, if exactly one is non-zero
    pub fn populated_side(&self) -> Option<Side> {
        let zero = BigDecimal::from(0);
        match (self.debit > zero, self.credit > zero) {
            (true, false) => Some(Side::Debit),
            (false, true) => Some(Side::Credit),
            _ => None,
        }
    }
}

/// A committed entry: header plus its ordered, non-empty lines. Journal and
/// adjusting entries share this shape but live in parallel stores so the
/// adjusting set can be included or excluded from balance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier for the entry
    pub id: String,
    /// Date the transaction occurred
    pub date: NaiveDate,
    /// Description of the transaction
    pub description: String,
    /// Optional reference (invoice number, receipt number, etc.)
    pub reference: Option<String>,
    /// Optional transaction type tag ("sale", "harvest", "closing", ...)
    pub transaction_type: Option<String>,
    /// Whether the entry has been posted to the permanent record
    pub posted: bool,
    /// Lines making up this entry
    pub lines: Vec<JournalLine>,
    /// When the entry was created
    pub created_at: NaiveDateTime,
}

impl JournalEntry {
    /// Total of the debit column across all lines
    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    /// Total of the credit column across all lines
    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }
}

/// Raw line submission from a form or API layer, prior to validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    /// Account being affected
    pub account_id: String,
    /// Debit amount
    pub debit: BigDecimal,
    /// Credit amount
    pub credit: BigDecimal,
    /// Optional description for this line
    pub description: Option<String>,
    /// Optional declared side; must not contradict the populated amount
    pub side: Option<Side>,
}

impl LineInput {
    /// Create a debit line input
    pub fn debit(account_id: String, amount: BigDecimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: BigDecimal::from(0),
            description: None,
            side: Some(Side::Debit),
        }
    }

    /// Create a credit line input
    pub fn credit(account_id: String, amount: BigDecimal) -> Self {
        Self {
            account_id,
            debit: BigDecimal::from(0),
            credit: amount,
            description: None,
            side: Some(Side::Credit),
        }
    }

    /// Which side this input populates, if exactly one is non-zero
    pub fn populated_side(&self) -> Option<Side> {
        let zero = BigDecimal::from(0);
        match (self.debit > zero, self.credit > zero) {
            (true, false) => Some(Side::Debit),
            (false, true) => Some(Side::Credit),
            _ => None,
        }
    }
}

/// One row of the append-only inventory log, derived from a posting that
/// touched a quantity-tracked account code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMovement {
    /// Unique identifier for the movement
    pub id: String,
    /// Date of the movement (the posting date)
    pub date: NaiveDate,
    /// Description carried over from the posting
    pub description: String,
    /// Tracked account code the movement belongs to
    pub account_code: String,
    /// Quantity added to stock
    pub quantity_in: BigDecimal,
    /// Quantity removed from stock
    pub quantity_out: BigDecimal,
    /// Unit cost used for the monetary-to-quantity conversion
    pub unit_cost: BigDecimal,
    /// Monetary value of the movement
    pub value: BigDecimal,
}

/// A declared line of a transaction template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLine {
    /// Account code this line must post to
    pub account_code: String,
    /// Side the line posts on
    pub side: Side,
    /// Whether the submitting user may alter this line
    pub editable: bool,
    /// Optional default description
    pub description: Option<String>,
}

/// Declares which lines of a transaction type are fixed vs free. Used only
/// to validate that a submitted entry's fixed lines were not altered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionTemplate {
    /// Key identifying the template ("sale", "harvest", ...)
    pub key: String,
    /// Human-readable label
    pub label: String,
    /// Declared lines
    pub lines: Vec<TemplateLine>,
}

/// A single rule violation found while validating a proposed set of lines.
/// Validation collects every violation at once rather than stopping at the
/// first, so the caller can surface all of them together.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("entry must have at least two lines, got {0}")]
    TooFewLines(usize),
    #[error("entry is not balanced: debits = {debits}, credits = {credits}")]
    Unbalanced {
        debits: BigDecimal,
        credits: BigDecimal,
    },
    #[error("account '{0}' appears on more than one line")]
    DuplicateAccount(String),
    #[error("line {index}: account '{account_id}' does not exist")]
    UnknownAccount { index: usize, account_id: String },
    #[error("line {index}: a line cannot carry both a debit and a credit amount")]
    BothSidesPopulated { index: usize },
    #[error("line {index}: amounts cannot be negative")]
    NegativeAmount { index: usize },
    #[error("line {index}: neither debit nor credit is populated")]
    EmptyLine { index: usize },
    #[error("line {index}: declared side {declared:?} contradicts the populated amount")]
    SideMismatch { index: usize, declared: Side },
    #[error("template requires a fixed {side:?} line for account code '{account_code}'")]
    TemplateViolation { account_code: String, side: Side },
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("entry rejected with {} validation error(s)", errors.len())]
    EntryRejected { errors: Vec<ValidationError> },
    #[error("invalid setting value for '{key}': {value}")]
    InvalidSetting { key: String, value: String },
    #[error("closing entries have already been posted for this period")]
    PeriodClosed,
    #[error("no revenue or expense balances to close")]
    NothingToClose,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
