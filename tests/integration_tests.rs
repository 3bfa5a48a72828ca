//! Integration tests for oysterbooks-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use oysterbooks_core::{
    codes, AccountCategory, EntryBuilder, Ledger, LedgerError, LedgerStore, LineInput,
    MemoryStore, OpeningBalance, Side, TemplateLine, TransactionTemplate, ValidationError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn idr(amount: i64) -> BigDecimal {
    BigDecimal::from(amount)
}

#[tokio::test]
async fn balance_sign_follows_normal_side() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    // debit-normal with opening debit 800k / credit 300k, no journal activity
    // credit-normal with opening credit 900k / debit 200k
    ledger
        .set_opening_balances(vec![
            OpeningBalance::new(accounts["kas"].id.clone(), idr(800_000), idr(300_000)),
            OpeningBalance::new(accounts["modal"].id.clone(), idr(200_000), idr(900_000)),
        ])
        .await
        .unwrap();

    assert_eq!(
        ledger
            .account_balance(&accounts["kas"].id, false)
            .await
            .unwrap(),
        idr(500_000)
    );
    assert_eq!(
        ledger
            .account_balance(&accounts["modal"].id, false)
            .await
            .unwrap(),
        idr(700_000)
    );
}

#[tokio::test]
async fn cash_sale_flows_through_balances_and_trial_balance() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let kas = ledger
        .create_account("101".into(), "Kas".into(), AccountCategory::Asset)
        .await
        .unwrap();
    let _piutang = ledger
        .create_account("102".into(), "Piutang".into(), AccountCategory::Asset)
        .await
        .unwrap();
    let penjualan = ledger
        .create_account("401".into(), "Penjualan".into(), AccountCategory::Revenue)
        .await
        .unwrap();

    let entry = EntryBuilder::new(date(2024, 1, 5), "Penjualan tunai".into())
        .debit(kas.id.clone(), idr(500_000), None)
        .credit(penjualan.id.clone(), idr(500_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(entry).await.unwrap();

    assert_eq!(
        ledger.account_balance(&kas.id, false).await.unwrap(),
        idr(500_000)
    );
    assert_eq!(
        ledger.account_balance(&penjualan.id, false).await.unwrap(),
        idr(500_000)
    );

    let tb = ledger.trial_balance(false).await.unwrap();
    assert!(tb.is_balanced);
    assert_eq!(tb.total_debits, idr(500_000));
    assert_eq!(tb.total_credits, idr(500_000));
}

#[tokio::test]
async fn unbalanced_submission_reports_one_error_and_persists_nothing() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    // both lines debit, no credit side at all
    let entry_result = ledger
        .post_journal_entry(
            oysterbooks_core::NewEntry {
                date: date(2024, 1, 5),
                description: "Salah input".into(),
                reference: None,
                transaction_type: None,
                template_key: None,
                lines: vec![
                    LineInput::debit(accounts["kas"].id.clone(), idr(500_000)),
                    LineInput::debit(accounts["piutang"].id.clone(), idr(300_000)),
                ],
            },
        )
        .await;

    match entry_result {
        Err(LedgerError::EntryRejected { errors }) => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], ValidationError::Unbalanced { .. }));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(ledger.list_journal_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn all_violations_are_collected_at_once() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    let result = ledger
        .post_journal_entry(oysterbooks_core::NewEntry {
            date: date(2024, 1, 5),
            description: "Salah ganda".into(),
            reference: None,
            transaction_type: None,
            template_key: None,
            lines: vec![
                LineInput::debit(accounts["kas"].id.clone(), idr(500_000)),
                LineInput::debit(accounts["kas"].id.clone(), idr(300_000)),
                LineInput::debit("tidak-ada".into(), idr(100_000)),
            ],
        })
        .await;

    let Err(LedgerError::EntryRejected { errors }) = result else {
        panic!("expected rejection");
    };
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::Unbalanced { .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::DuplicateAccount(_))));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::UnknownAccount { index: 2, .. })));
    assert!(ledger.list_journal_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_account_rejected_regardless_of_amounts() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    let result = ledger
        .post_journal_entry(oysterbooks_core::NewEntry {
            date: date(2024, 1, 5),
            description: "Kas dua kali".into(),
            reference: None,
            transaction_type: None,
            template_key: None,
            lines: vec![
                LineInput::debit(accounts["kas"].id.clone(), idr(250_000)),
                LineInput::credit(accounts["kas"].id.clone(), idr(250_000)),
            ],
        })
        .await;

    let Err(LedgerError::EntryRejected { errors }) = result else {
        panic!("expected rejection");
    };
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::DuplicateAccount(_))));
}

#[tokio::test]
async fn trial_balance_totals_equal_row_sums() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(accounts["kas"].id.clone(), idr(8_500_000)),
            OpeningBalance::credit_of(accounts["modal"].id.clone(), idr(8_500_000)),
        ])
        .await
        .unwrap();

    let tb = ledger.trial_balance(false).await.unwrap();
    assert!(tb.is_balanced);
    assert_eq!(tb.total_debits, idr(8_500_000));
    assert_eq!(tb.total_credits, idr(8_500_000));

    let row_debits: BigDecimal = tb
        .rows
        .iter()
        .filter_map(|r| r.debit.clone())
        .sum();
    let row_credits: BigDecimal = tb
        .rows
        .iter()
        .filter_map(|r| r.credit.clone())
        .sum();
    assert_eq!(tb.total_debits, row_debits);
    assert_eq!(tb.total_credits, row_credits);
}

#[tokio::test]
async fn adjusting_entries_are_optional_in_reports() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    let sale = EntryBuilder::new(date(2024, 1, 10), "Penjualan tunai".into())
        .debit(accounts["kas"].id.clone(), idr(2_000_000), None)
        .credit(accounts["penjualan"].id.clone(), idr(2_000_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(sale).await.unwrap();

    let depreciation = EntryBuilder::new(date(2024, 1, 31), "Penyusutan peralatan".into())
        .debit(accounts["beban_penyusutan"].id.clone(), idr(100_000), None)
        .credit(accounts["akum_penyusutan"].id.clone(), idr(100_000), None)
        .build()
        .unwrap();
    ledger.post_adjusting_entry(depreciation).await.unwrap();

    // before adjustment
    let income = ledger.income_statement(false).await.unwrap();
    assert_eq!(income.total_expenses, idr(0));
    assert_eq!(income.net_income, idr(2_000_000));

    // after adjustment
    let income = ledger.income_statement(true).await.unwrap();
    assert_eq!(income.total_expenses, idr(100_000));
    assert_eq!(income.net_income, idr(1_900_000));

    assert_eq!(
        ledger
            .account_balance(&accounts["beban_penyusutan"].id, false)
            .await
            .unwrap(),
        idr(0)
    );
    assert_eq!(
        ledger
            .account_balance(&accounts["beban_penyusutan"].id, true)
            .await
            .unwrap(),
        idr(100_000)
    );
}

#[tokio::test]
async fn closing_zeroes_nominal_accounts_into_retained_earnings() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(accounts["kas"].id.clone(), idr(5_000_000)),
            OpeningBalance::credit_of(accounts["modal"].id.clone(), idr(5_000_000)),
        ])
        .await
        .unwrap();

    let sale = EntryBuilder::new(date(2024, 1, 10), "Penjualan tunai".into())
        .debit(accounts["kas"].id.clone(), idr(2_000_000), None)
        .credit(accounts["penjualan"].id.clone(), idr(2_000_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(sale).await.unwrap();

    let wages = EntryBuilder::new(date(2024, 1, 20), "Bayar gaji".into())
        .debit(accounts["beban_gaji"].id.clone(), idr(500_000), None)
        .credit(accounts["kas"].id.clone(), idr(500_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(wages).await.unwrap();

    let depreciation = EntryBuilder::new(date(2024, 1, 31), "Penyusutan peralatan".into())
        .debit(accounts["beban_penyusutan"].id.clone(), idr(100_000), None)
        .credit(accounts["akum_penyusutan"].id.clone(), idr(100_000), None)
        .build()
        .unwrap();
    ledger.post_adjusting_entry(depreciation).await.unwrap();

    let plan = ledger.closing_entries(true).await.unwrap();
    assert_eq!(plan.net_income, idr(1_400_000));

    ledger
        .post_closing_entries(date(2024, 1, 31), true)
        .await
        .unwrap();

    for slug in ["penjualan", "pendapatan_lain", "beban_gaji", "beban_penyusutan"] {
        assert_eq!(
            ledger
                .account_balance(&accounts[slug].id, true)
                .await
                .unwrap(),
            idr(0),
            "{slug} should be zero after closing"
        );
    }
    assert_eq!(
        ledger
            .account_balance(&accounts["laba_ditahan"].id, true)
            .await
            .unwrap(),
        idr(1_400_000)
    );

    // the period is closed exactly once
    assert!(ledger.is_period_closed().await.unwrap());
    assert!(matches!(
        ledger.post_closing_entries(date(2024, 1, 31), true).await,
        Err(LedgerError::PeriodClosed)
    ));

    // post-closing trial balance carries real accounts only and balances
    let tb = ledger.post_closing_trial_balance().await.unwrap();
    assert!(tb.is_balanced);
    assert!(tb.rows.iter().all(|r| r.account.category.is_real()));
    assert_eq!(tb.total_debits, idr(6_500_000));
}

#[tokio::test]
async fn closing_with_no_activity_is_nothing_to_close() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger.seed_farm_chart().await.unwrap();

    assert!(matches!(
        ledger.post_closing_entries(date(2024, 1, 31), true).await,
        Err(LedgerError::NothingToClose)
    ));
    assert!(!ledger.is_period_closed().await.unwrap());
}

#[tokio::test]
async fn balance_sheet_equation_holds_for_consistent_books() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(accounts["kas"].id.clone(), idr(5_000_000)),
            OpeningBalance::credit_of(accounts["modal"].id.clone(), idr(5_000_000)),
        ])
        .await
        .unwrap();

    let sale = EntryBuilder::new(date(2024, 1, 10), "Penjualan tunai".into())
        .debit(accounts["kas"].id.clone(), idr(2_000_000), None)
        .credit(accounts["penjualan"].id.clone(), idr(2_000_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(sale).await.unwrap();

    let depreciation = EntryBuilder::new(date(2024, 1, 31), "Penyusutan peralatan".into())
        .debit(accounts["beban_penyusutan"].id.clone(), idr(100_000), None)
        .credit(accounts["akum_penyusutan"].id.clone(), idr(100_000), None)
        .build()
        .unwrap();
    ledger.post_adjusting_entry(depreciation).await.unwrap();

    // assets = liabilities + equity is a property of good data, not a
    // guarantee of the computation; assert it here
    let bs = ledger.balance_sheet(true).await.unwrap();
    assert!(bs.is_balanced);
    assert_eq!(
        bs.total_assets,
        &bs.total_liabilities + &bs.total_equity
    );
    assert_eq!(bs.total_assets, idr(6_900_000));
}

#[tokio::test]
async fn cash_flow_sections_sum_to_net_cash_flow() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    let postings: [(&str, &str, i64); 6] = [
        ("kas", "modal", 10_000_000),       // owner investment
        ("peralatan", "kas", 3_000_000),    // equipment purchase
        ("kas", "utang_bank", 2_000_000),   // bank loan
        ("prive", "kas", 500_000),          // drawings
        ("kas", "penjualan", 1_000_000),    // cash sale
        ("beban_gaji", "kas", 400_000),     // wages
    ];
    for (i, (debit, credit, amount)) in postings.iter().enumerate() {
        let entry = EntryBuilder::new(date(2024, 1, 1 + i as u32), format!("Transaksi {i}"))
            .debit(accounts[*debit].id.clone(), idr(*amount), None)
            .credit(accounts[*credit].id.clone(), idr(*amount), None)
            .build()
            .unwrap();
        ledger.post_journal_entry(entry).await.unwrap();
    }

    let cf = ledger.cash_flow_statement(false).await.unwrap();
    assert_eq!(cf.net_operating_cash_flow, idr(600_000));
    assert_eq!(cf.net_investing_cash_flow, idr(-3_000_000));
    assert_eq!(cf.net_financing_cash_flow, idr(11_500_000));
    assert_eq!(cf.net_cash_flow, idr(9_100_000));

    // net cash flow matches the cash account's derived balance
    assert_eq!(
        ledger
            .account_balance(&accounts["kas"].id, false)
            .await
            .unwrap(),
        cf.net_cash_flow
    );

    let eq = ledger.equity_statement(false).await.unwrap();
    assert_eq!(eq.beginning_capital, idr(10_000_000));
    assert_eq!(eq.net_income, idr(600_000));
    assert_eq!(eq.drawings, idr(500_000));
    assert_eq!(eq.ending_capital, idr(10_100_000));
}

#[tokio::test]
async fn template_fixed_lines_must_survive_submission() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    ledger
        .save_template(&TransactionTemplate {
            key: "penjualan_tunai".into(),
            label: "Penjualan Tunai".into(),
            lines: vec![
                TemplateLine {
                    account_code: codes::CASH.into(),
                    side: Side::Debit,
                    editable: false,
                    description: None,
                },
                TemplateLine {
                    account_code: codes::SALES.into(),
                    side: Side::Credit,
                    editable: false,
                    description: None,
                },
            ],
        })
        .await
        .unwrap();

    // fixed sales line replaced by another revenue account
    let tampered = oysterbooks_core::NewEntry {
        date: date(2024, 1, 5),
        description: "Penjualan tunai".into(),
        reference: None,
        transaction_type: Some("penjualan".into()),
        template_key: Some("penjualan_tunai".into()),
        lines: vec![
            LineInput::debit(accounts["kas"].id.clone(), idr(500_000)),
            LineInput::credit(accounts["pendapatan_lain"].id.clone(), idr(500_000)),
        ],
    };
    let result = ledger.post_journal_entry(tampered).await;
    let Err(LedgerError::EntryRejected { errors }) = result else {
        panic!("expected rejection");
    };
    assert_eq!(
        errors,
        vec![ValidationError::TemplateViolation {
            account_code: codes::SALES.to_string(),
            side: Side::Credit,
        }]
    );

    // compliant submission passes
    let compliant = oysterbooks_core::NewEntry {
        date: date(2024, 1, 5),
        description: "Penjualan tunai".into(),
        reference: None,
        transaction_type: Some("penjualan".into()),
        template_key: Some("penjualan_tunai".into()),
        lines: vec![
            LineInput::debit(accounts["kas"].id.clone(), idr(500_000)),
            LineInput::credit(accounts["penjualan"].id.clone(), idr(500_000)),
        ],
    };
    ledger.post_journal_entry(compliant).await.unwrap();
}

#[tokio::test]
async fn sale_reduces_stock_and_recompute_repairs_counter() {
    let store = MemoryStore::new();
    let mut ledger = Ledger::new(store.clone());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    // 100 seeds in
    let purchase = EntryBuilder::new(date(2024, 2, 1), "Beli bibit".into())
        .debit(accounts["bibit"].id.clone(), idr(200_000), None)
        .credit(accounts["kas"].id.clone(), idr(200_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(purchase).await.unwrap();

    // harvest 50 grade-B oysters from the 100 seeds
    let harvest = EntryBuilder::new(date(2024, 3, 1), "Panen tiram".into())
        .debit(accounts["tiram_b"].id.clone(), idr(500_000), None)
        .credit(accounts["bibit"].id.clone(), idr(200_000), None)
        .credit(accounts["pendapatan_lain"].id.clone(), idr(300_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(harvest).await.unwrap();
    assert_eq!(
        ledger.current_stock(codes::OYSTER_GRADE_B).await.unwrap(),
        idr(50)
    );

    // sell 30 of them
    let sale = EntryBuilder::new(date(2024, 3, 5), "Jual tiram grade B".into())
        .debit(accounts["kas"].id.clone(), idr(600_000), None)
        .credit(accounts["penjualan"].id.clone(), idr(300_000), None)
        .credit(accounts["tiram_b"].id.clone(), idr(300_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(sale).await.unwrap();
    assert_eq!(
        ledger.current_stock(codes::OYSTER_GRADE_B).await.unwrap(),
        idr(20)
    );

    // corrupt the cached counter, then rebuild it from the movement log
    let mut raw = store.clone();
    raw.put_setting("current_stock_105", "999").await.unwrap();
    assert_eq!(
        ledger.current_stock(codes::OYSTER_GRADE_B).await.unwrap(),
        idr(999)
    );
    ledger.recompute_stock().await.unwrap();
    assert_eq!(
        ledger.current_stock(codes::OYSTER_GRADE_B).await.unwrap(),
        idr(20)
    );
}

#[tokio::test]
async fn general_ledger_carries_a_running_balance() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(accounts["kas"].id.clone(), idr(1_000_000)),
            OpeningBalance::credit_of(accounts["modal"].id.clone(), idr(1_000_000)),
        ])
        .await
        .unwrap();

    let sale = EntryBuilder::new(date(2024, 1, 10), "Penjualan tunai".into())
        .debit(accounts["kas"].id.clone(), idr(500_000), None)
        .credit(accounts["penjualan"].id.clone(), idr(500_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(sale).await.unwrap();

    let wages = EntryBuilder::new(date(2024, 1, 20), "Bayar gaji".into())
        .debit(accounts["beban_gaji"].id.clone(), idr(200_000), None)
        .credit(accounts["kas"].id.clone(), idr(200_000), None)
        .build()
        .unwrap();
    ledger.post_journal_entry(wages).await.unwrap();

    let gl = ledger
        .general_ledger(&accounts["kas"].id, false)
        .await
        .unwrap();
    assert_eq!(gl.opening, idr(1_000_000));
    assert_eq!(gl.rows.len(), 2);
    assert_eq!(gl.rows[0].balance, idr(1_500_000));
    assert_eq!(gl.rows[1].balance, idr(1_300_000));
    assert_eq!(gl.balance, idr(1_300_000));
}

#[tokio::test]
async fn opening_balances_replace_wholesale() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let accounts = ledger.seed_farm_chart().await.unwrap();

    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(accounts["kas"].id.clone(), idr(3_000_000)),
            OpeningBalance::credit_of(accounts["modal"].id.clone(), idr(3_000_000)),
        ])
        .await
        .unwrap();

    // a full replacement drops the old rows
    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(accounts["piutang"].id.clone(), idr(750_000)),
            OpeningBalance::credit_of(accounts["modal"].id.clone(), idr(750_000)),
        ])
        .await
        .unwrap();

    assert_eq!(
        ledger
            .account_balance(&accounts["kas"].id, false)
            .await
            .unwrap(),
        idr(0)
    );
    assert_eq!(
        ledger
            .account_balance(&accounts["piutang"].id, false)
            .await
            .unwrap(),
        idr(750_000)
    );

    // unknown account in the replacement set is rejected up front
    let result = ledger
        .set_opening_balances(vec![OpeningBalance::debit_of("tidak-ada".into(), idr(1))])
        .await;
    assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
}
