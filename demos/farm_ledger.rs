//! Walkthrough of a bookkeeping period for the oyster farm

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use oysterbooks_core::{codes, EntryBuilder, Ledger, MemoryStore, OpeningBalance};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🦪 Oysterbooks Core - Farm Ledger Example\n");

    let mut ledger = Ledger::new(MemoryStore::new());

    // 1. Chart of accounts and opening balances
    println!("📊 Seeding Chart of Accounts...");
    let accounts = ledger.seed_farm_chart().await?;
    for account in accounts.values() {
        println!(
            "  ✓ {} - {} ({:?})",
            account.code, account.name, account.category
        );
    }
    println!();

    ledger
        .set_opening_balances(vec![
            OpeningBalance::debit_of(
                accounts["kas"].id.clone(),
                BigDecimal::from(8_500_000),
            ),
            OpeningBalance::credit_of(
                accounts["modal"].id.clone(),
                BigDecimal::from(8_500_000),
            ),
        ])
        .await?;
    println!("💼 Opening balances set: Kas / Modal Rp 8.500.000\n");

    // 2. The period's transactions
    println!("💰 Posting Transactions...\n");

    let seed_purchase = EntryBuilder::new(
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        "Pembelian bibit tiram".to_string(),
    )
    .debit(
        accounts["bibit"].id.clone(),
        BigDecimal::from(400_000),
        Some("200 ekor bibit".to_string()),
    )
    .credit(accounts["kas"].id.clone(), BigDecimal::from(400_000), None)
    .build()?;
    ledger.post_journal_entry(seed_purchase).await?;
    println!("  ✓ Pembelian bibit Rp 400.000 (200 ekor)");

    let harvest = EntryBuilder::new(
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
        "Panen tiram grade A".to_string(),
    )
    .debit(
        accounts["tiram_a"].id.clone(),
        BigDecimal::from(1_500_000),
        Some("100 ekor tiram siap jual".to_string()),
    )
    .credit(accounts["bibit"].id.clone(), BigDecimal::from(400_000), None)
    .credit(
        accounts["pendapatan_lain"].id.clone(),
        BigDecimal::from(1_100_000),
        None,
    )
    .build()?;
    ledger.post_journal_entry(harvest).await?;
    println!("  ✓ Panen 100 ekor tiram grade A");

    let sale = EntryBuilder::new(
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        "Penjualan tiram grade A".to_string(),
    )
    .debit(accounts["kas"].id.clone(), BigDecimal::from(1_800_000), None)
    .credit(
        accounts["penjualan"].id.clone(),
        BigDecimal::from(900_000),
        None,
    )
    .credit(
        accounts["tiram_a"].id.clone(),
        BigDecimal::from(900_000),
        None,
    )
    .build()?;
    ledger.post_journal_entry(sale).await?;
    println!("  ✓ Penjualan 60 ekor tiram grade A");

    let wages = EntryBuilder::new(
        NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
        "Pembayaran gaji pekerja".to_string(),
    )
    .debit(
        accounts["beban_gaji"].id.clone(),
        BigDecimal::from(600_000),
        None,
    )
    .credit(accounts["kas"].id.clone(), BigDecimal::from(600_000), None)
    .build()?;
    ledger.post_journal_entry(wages).await?;
    println!("  ✓ Pembayaran gaji Rp 600.000\n");

    // 3. Stock derived from the postings
    println!("🦪 Inventory:");
    for (slug, code) in [("bibit", codes::SEED_INVENTORY), ("tiram_a", codes::OYSTER_GRADE_A)] {
        println!(
            "  {} ({}): {} ekor",
            accounts[slug].name,
            code,
            ledger.current_stock(code).await?
        );
    }
    println!();

    // 4. Statements
    let tb = ledger.trial_balance(true).await?;
    println!(
        "📑 Trial balance: debit {} / credit {} ({})",
        tb.total_debits,
        tb.total_credits,
        if tb.is_balanced { "balanced" } else { "NOT balanced" }
    );

    let income = ledger.income_statement(true).await?;
    println!(
        "📈 Income statement: pendapatan {} - beban {} = laba {}",
        income.total_revenue, income.total_expenses, income.net_income
    );

    let bs = ledger.balance_sheet(true).await?;
    println!(
        "🏦 Balance sheet: aset {} | kewajiban {} + ekuitas {}",
        bs.total_assets, bs.total_liabilities, bs.total_equity
    );

    let cf = ledger.cash_flow_statement(true).await?;
    println!("💧 Net cash flow: {}", cf.net_cash_flow);

    let eq = ledger.equity_statement(true).await?;
    println!(
        "🪙 Equity: {} + {} - {} = {}",
        eq.beginning_capital, eq.net_income, eq.drawings, eq.ending_capital
    );
    println!();

    // 5. Close the period
    let closing_id = ledger
        .post_closing_entries(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), true)
        .await?;
    println!("🔒 Closing entries posted ({closing_id})");

    let post_closing = ledger.post_closing_trial_balance().await?;
    println!(
        "📑 Post-closing trial balance: debit {} / credit {} ({})",
        post_closing.total_debits,
        post_closing.total_credits,
        if post_closing.is_balanced {
            "balanced"
        } else {
            "NOT balanced"
        }
    );

    Ok(())
}
