//! Aggregation engine: pure derivations over a transaction snapshot.
//!
//! Nothing here mutates the ledger or reads a clock; callers pass the
//! snapshot and, where relevant, an explicit reference date. Empty
//! input is a normal state and yields zero-filled results.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::{Category, CategoryKind, CategoryRegistry, Transaction};
use crate::time::months_back;

/// Number of calendar months a trend covers unless callers ask
/// otherwise.
pub const DEFAULT_TREND_WINDOW: usize = 6;

/// Whole-snapshot income, expense, and their difference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// Per-category total within one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRollup {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub total: Decimal,
}

/// Rollup buckets sorted by total descending, plus the total of
/// transactions whose category could not be resolved. The unresolved
/// amount keeps `sum(buckets) + unresolved` reconcilable against the
/// kind's overall total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRollupReport {
    pub buckets: Vec<CategoryRollup>,
    pub unresolved: Decimal,
}

/// One calendar month of a trend series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    /// First day of the month.
    pub month: NaiveDate,
    /// Display label, e.g. `"Mar 2024"`.
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Sums the full snapshot with no implicit time filtering.
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for txn in transactions {
        match txn.kind {
            CategoryKind::Income => totals.income += txn.amount,
            CategoryKind::Expense => totals.expense += txn.amount,
        }
    }
    totals.balance = totals.income - totals.expense;
    totals
}

/// Accumulates each transaction of `kind` into its category's bucket.
/// Buckets come back sorted by total descending; ties keep category
/// insertion order. Dangling category references land in the
/// unresolved total instead of disappearing.
pub fn rollup_by_category(
    transactions: &[Transaction],
    categories: &CategoryRegistry,
    kind: CategoryKind,
) -> CategoryRollupReport {
    let mut by_category: HashMap<Uuid, Decimal> = HashMap::new();
    let mut unresolved = Decimal::ZERO;
    for txn in transactions.iter().filter(|txn| txn.kind == kind) {
        match categories.resolve(txn.category_id) {
            Some(category) if category.kind == kind => {
                *by_category.entry(category.id).or_insert(Decimal::ZERO) += txn.amount;
            }
            _ => unresolved += txn.amount,
        }
    }

    // Registry order first, then a stable sort, so equal totals keep
    // category insertion order.
    let mut buckets: Vec<CategoryRollup> = categories
        .of_kind(kind)
        .filter_map(|category| {
            by_category
                .get(&category.id)
                .map(|total| bucket_for(category, *total))
        })
        .collect();
    buckets.sort_by(|a, b| b.total.cmp(&a.total));

    CategoryRollupReport {
        buckets,
        unresolved,
    }
}

fn bucket_for(category: &Category, total: Decimal) -> CategoryRollup {
    CategoryRollup {
        category_id: category.id,
        name: category.name.clone(),
        color: category.color.clone(),
        total,
    }
}

/// Builds `window_size` consecutive month buckets ending at the month
/// containing `reference`, oldest first and zero-filled. A transaction
/// belongs to the bucket matching the calendar year and month of its
/// timestamp; data outside the window is dropped.
pub fn monthly_trend(
    transactions: &[Transaction],
    window_size: usize,
    reference: NaiveDate,
) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = (0..window_size)
        .rev()
        .map(|steps| {
            let month = months_back(reference, steps as u32);
            MonthBucket {
                month,
                label: month.format("%b %Y").to_string(),
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
            }
        })
        .collect();

    let index: HashMap<(i32, u32), usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| ((bucket.month.year(), bucket.month.month()), i))
        .collect();

    for txn in transactions {
        let date = txn.timestamp.date_naive();
        if let Some(&i) = index.get(&(date.year(), date.month())) {
            match txn.kind {
                CategoryKind::Income => buckets[i].income += txn.amount,
                CategoryKind::Expense => buckets[i].expense += txn.amount,
            }
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{IdSource, Ledger, SequentialIdSource, TransactionDraft};
    use chrono::{DateTime, Utc};

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC 3339 instant")
    }

    fn category_named(ledger: &Ledger, name: &str) -> Uuid {
        ledger
            .categories
            .iter()
            .find(|c| c.name == name)
            .expect("stock category present")
            .id
    }

    fn seeded_ledger() -> (Ledger, SequentialIdSource) {
        (Ledger::new("Aggregation"), SequentialIdSource::new())
    }

    fn add(
        ledger: &mut Ledger,
        ids: &mut SequentialIdSource,
        kind: CategoryKind,
        amount: u32,
        category: &str,
        at: &str,
    ) -> Uuid {
        let category_id = category_named(ledger, category);
        let draft = TransactionDraft::new(kind, Decimal::from(amount), category_id, "", instant(at));
        ledger
            .add_transaction(draft, ids)
            .expect("valid transaction")
            .id
    }

    #[test]
    fn totals_cover_the_whole_snapshot() {
        let (mut ledger, mut ids) = seeded_ledger();
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Income,
            100,
            "Salary",
            "2024-03-01T09:00:00Z",
        );
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            40,
            "Food",
            "2024-03-02T12:00:00Z",
        );
        let totals = compute_totals(&ledger.transactions);
        assert_eq!(totals.income, Decimal::from(100));
        assert_eq!(totals.expense, Decimal::from(40));
        assert_eq!(totals.balance, Decimal::from(60));
    }

    #[test]
    fn empty_snapshot_yields_zero_totals() {
        assert_eq!(compute_totals(&[]), Totals::default());
    }

    #[test]
    fn rollup_sorts_descending_and_skips_other_kind() {
        let (mut ledger, mut ids) = seeded_ledger();
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            30,
            "Food",
            "2024-03-02T12:00:00Z",
        );
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            90,
            "Rent",
            "2024-03-03T12:00:00Z",
        );
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Income,
            500,
            "Salary",
            "2024-03-01T09:00:00Z",
        );
        let report = rollup_by_category(
            &ledger.transactions,
            &ledger.categories,
            CategoryKind::Expense,
        );
        let names: Vec<_> = report.buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food"]);
        assert_eq!(report.unresolved, Decimal::ZERO);
    }

    #[test]
    fn rollup_ties_keep_registry_insertion_order() {
        let (mut ledger, mut ids) = seeded_ledger();
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            25,
            "Rent",
            "2024-03-03T12:00:00Z",
        );
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            25,
            "Food",
            "2024-03-02T12:00:00Z",
        );
        let report = rollup_by_category(
            &ledger.transactions,
            &ledger.categories,
            CategoryKind::Expense,
        );
        // Food precedes Rent in the stock registry.
        let names: Vec<_> = report.buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Rent"]);
    }

    #[test]
    fn dangling_reference_reconciles_through_unresolved_bucket() {
        let (mut ledger, mut ids) = seeded_ledger();
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            40,
            "Food",
            "2024-03-02T12:00:00Z",
        );
        // Simulate a blob whose category was removed out-of-band.
        let mut orphan = TransactionDraft::new(
            CategoryKind::Expense,
            Decimal::from(7),
            category_named(&ledger, "Rent"),
            "orphaned",
            instant("2024-03-04T12:00:00Z"),
        )
        .finalize(ids.next_id());
        orphan.category_id = Uuid::new_v4();
        ledger.transactions.push(orphan);

        let totals = compute_totals(&ledger.transactions);
        let report = rollup_by_category(
            &ledger.transactions,
            &ledger.categories,
            CategoryKind::Expense,
        );
        let bucket_sum: Decimal = report.buckets.iter().map(|b| b.total).sum();
        assert_eq!(report.unresolved, Decimal::from(7));
        assert_eq!(bucket_sum + report.unresolved, totals.expense);
    }

    #[test]
    fn trend_returns_exactly_n_zero_filled_buckets_for_empty_input() {
        let reference = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        let trend = monthly_trend(&[], DEFAULT_TREND_WINDOW, reference);
        assert_eq!(trend.len(), 6);
        assert_eq!(trend[0].label, "Jan 2024");
        assert_eq!(trend[5].label, "Jun 2024");
        assert!(trend
            .iter()
            .all(|b| b.income == Decimal::ZERO && b.expense == Decimal::ZERO));
    }

    #[test]
    fn trend_assigns_by_year_and_month_and_drops_out_of_window_data() {
        let (mut ledger, mut ids) = seeded_ledger();
        // Third-oldest bucket of a Jun 2024 window is Mar 2024.
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            55,
            "Food",
            "2024-03-10T08:00:00Z",
        );
        // Same calendar month, previous year: outside the window.
        add(
            &mut ledger,
            &mut ids,
            CategoryKind::Expense,
            99,
            "Food",
            "2023-03-10T08:00:00Z",
        );
        let reference = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        let trend = monthly_trend(&ledger.transactions, 6, reference);
        assert_eq!(trend[2].label, "Mar 2024");
        assert_eq!(trend[2].expense, Decimal::from(55));
        let other: Decimal = trend
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 2)
            .map(|(_, b)| b.income + b.expense)
            .sum();
        assert_eq!(other, Decimal::ZERO);
    }
}
