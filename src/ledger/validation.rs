//! Double-entry validation rules
//!
//! Rules are checked independently and collected, so a caller sees every
//! violation of a submission at once. Only the minimum-line-count rule
//! short-circuits: with fewer than two lines the remaining checks are
//! meaningless.

use std::collections::HashSet;

use bigdecimal::BigDecimal;

use crate::traits::LedgerStore;
use crate::types::*;

/// Rounding tolerance for the entry balance check (one cent of currency)
pub fn balance_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}

/// A fixed template line with its account resolved
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLine {
    pub account_id: String,
    pub account_code: String,
    pub side: Side,
}

/// A template with its non-editable lines resolved to account ids, computed
/// once when the template is loaded rather than re-matched per validation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    pub key: String,
    pub fixed: Vec<FixedLine>,
}

/// Resolve a template's fixed lines against the chart of accounts
pub async fn compile_template<S: LedgerStore>(
    store: &S,
    template: &TransactionTemplate,
) -> LedgerResult<CompiledTemplate> {
    let mut fixed = Vec::new();
    for line in template.lines.iter().filter(|l| !l.editable) {
        let account = store
            .account_by_code(&line.account_code)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(format!("code {}", line.account_code)))?;
        fixed.push(FixedLine {
            account_id: account.id,
            account_code: line.account_code.clone(),
            side: line.side,
        });
    }
    Ok(CompiledTemplate {
        key: template.key.clone(),
        fixed,
    })
}

/// Storage-free structural checks over a proposed set of lines
pub fn check_structure(lines: &[LineInput]) -> Vec<ValidationError> {
    if lines.len() < 2 {
        return vec![ValidationError::TooFewLines(lines.len())];
    }

    let mut errors = Vec::new();
    let zero = BigDecimal::from(0);

    let debits: BigDecimal = lines.iter().map(|l| &l.debit).sum();
    let credits: BigDecimal = lines.iter().map(|l| &l.credit).sum();
    if (&debits - &credits).abs() > balance_tolerance() {
        errors.push(ValidationError::Unbalanced { debits, credits });
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for line in lines {
        if !seen.insert(line.account_id.as_str()) && reported.insert(line.account_id.as_str()) {
            errors.push(ValidationError::DuplicateAccount(line.account_id.clone()));
        }
    }

    for (index, line) in lines.iter().enumerate() {
        if line.debit < zero || line.credit < zero {
            errors.push(ValidationError::NegativeAmount { index });
        }
        if line.debit > zero && line.credit > zero {
            errors.push(ValidationError::BothSidesPopulated { index });
        }
        if line.debit == zero && line.credit == zero {
            errors.push(ValidationError::EmptyLine { index });
        }
        if let (Some(declared), Some(populated)) = (line.side, line.populated_side()) {
            if declared != populated {
                errors.push(ValidationError::SideMismatch { index, declared });
            }
        }
    }

    errors
}

/// Full validation: structure, per-line account existence, and template
/// compliance. An empty list means the submission is valid.
pub async fn validate_lines<S: LedgerStore>(
    store: &S,
    lines: &[LineInput],
    template: Option<&CompiledTemplate>,
) -> LedgerResult<Vec<ValidationError>> {
    let errors = check_structure(lines);
    if matches!(errors.first(), Some(ValidationError::TooFewLines(_))) {
        return Ok(errors);
    }
    let mut errors = errors;

    for (index, line) in lines.iter().enumerate() {
        if store.account(&line.account_id).await?.is_none() {
            errors.push(ValidationError::UnknownAccount {
                index,
                account_id: line.account_id.clone(),
            });
        }
    }

    if let Some(template) = template {
        for fixed in &template.fixed {
            let matched = lines.iter().any(|l| {
                l.account_id == fixed.account_id && l.populated_side() == Some(fixed.side)
            });
            if !matched {
                errors.push(ValidationError::TemplateViolation {
                    account_code: fixed.account_code.clone(),
                    side: fixed.side,
                });
            }
        }
    }

    Ok(errors)
}
