//! Budget tracker: per-category spend against limits for one
//! accounting period.
//!
//! Everything is recomputed from the snapshot on each call; there is no
//! stored budget state, and the reference date is always explicit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::{CategoryKind, Ledger, Transaction};
use crate::time::MonthWindow;

/// Visual-treatment state derived purely from spend and limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetState {
    NoLimit,
    OnTrack,
    Warning,
    Critical,
    Exceeded,
}

/// Consumption of one budget for the accounting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatus {
    pub limit: Option<Decimal>,
    pub spend: Decimal,
    /// Share of the limit already spent, clamped to `[0, 100]`. Zero
    /// when no limit is set.
    pub percent: Decimal,
    pub remaining: Decimal,
    pub over_by: Decimal,
    pub state: BudgetState,
}

/// One expense category's budget picture, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBudget {
    pub category_id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub status: BudgetStatus,
}

/// Sums expense transactions for `category_id` whose timestamp falls
/// within the half-open window.
pub fn period_spend(
    transactions: &[Transaction],
    category_id: Uuid,
    window: &MonthWindow,
) -> Decimal {
    transactions
        .iter()
        .filter(|txn| {
            matches!(txn.kind, CategoryKind::Expense)
                && txn.category_id == category_id
                && window.contains(txn.timestamp)
        })
        .map(|txn| txn.amount)
        .sum()
}

/// Derives percent, remaining, overrun, and state from a limit and the
/// period spend. `Exceeded` holds exactly when spend surpasses the
/// limit; a fully consumed budget stays `Critical`.
pub fn budget_status(limit: Option<Decimal>, spend: Decimal) -> BudgetStatus {
    let hundred = Decimal::from(100);
    // a limit that is not strictly positive carries no budget meaning
    let Some(limit) = limit.filter(|limit| *limit > Decimal::ZERO) else {
        return BudgetStatus {
            limit: None,
            spend,
            percent: Decimal::ZERO,
            remaining: Decimal::ZERO,
            over_by: Decimal::ZERO,
            state: BudgetState::NoLimit,
        };
    };

    let percent = (spend / limit * hundred).clamp(Decimal::ZERO, hundred);
    let state = if spend > limit {
        BudgetState::Exceeded
    } else if percent >= Decimal::from(90) {
        BudgetState::Critical
    } else if percent >= Decimal::from(70) {
        BudgetState::Warning
    } else {
        BudgetState::OnTrack
    };
    BudgetStatus {
        limit: Some(limit),
        spend,
        percent,
        remaining: (limit - spend).max(Decimal::ZERO),
        over_by: (spend - limit).max(Decimal::ZERO),
        state,
    }
}

/// Budget picture for every expense category, using the calendar month
/// containing `reference` as the accounting period.
pub fn budget_overview(ledger: &Ledger, reference: NaiveDate) -> Vec<CategoryBudget> {
    let window = MonthWindow::containing(reference);
    ledger
        .categories
        .of_kind(CategoryKind::Expense)
        .map(|category| {
            let limit = ledger.budget_limit(category.id).map(|budget| budget.limit);
            let spend = period_spend(&ledger.transactions, category.id, &window);
            CategoryBudget {
                category_id: category.id,
                name: category.name.clone(),
                icon: category.icon.clone(),
                color: category.color.clone(),
                status: budget_status(limit, spend),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{SequentialIdSource, TransactionDraft};
    use chrono::{DateTime, Utc};

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid RFC 3339 instant")
    }

    #[test]
    fn warning_at_eighty_percent() {
        let status = budget_status(Some(dec(50)), dec(40));
        assert_eq!(status.percent, dec(80));
        assert_eq!(status.state, BudgetState::Warning);
        assert_eq!(status.remaining, dec(10));
        assert_eq!(status.over_by, Decimal::ZERO);
    }

    #[test]
    fn exceeded_clamps_percent_and_reports_overrun() {
        let status = budget_status(Some(dec(30)), dec(40));
        assert_eq!(status.percent, dec(100));
        assert_eq!(status.state, BudgetState::Exceeded);
        assert_eq!(status.remaining, Decimal::ZERO);
        assert_eq!(status.over_by, dec(10));
    }

    #[test]
    fn fully_consumed_budget_is_critical_not_exceeded() {
        let status = budget_status(Some(dec(30)), dec(30));
        assert_eq!(status.percent, dec(100));
        assert_eq!(status.state, BudgetState::Critical);
    }

    #[test]
    fn state_thresholds() {
        assert_eq!(budget_status(None, dec(10)).state, BudgetState::NoLimit);
        assert_eq!(
            budget_status(Some(dec(100)), dec(69)).state,
            BudgetState::OnTrack
        );
        assert_eq!(
            budget_status(Some(dec(100)), dec(70)).state,
            BudgetState::Warning
        );
        assert_eq!(
            budget_status(Some(dec(100)), dec(90)).state,
            BudgetState::Critical
        );
        assert_eq!(
            budget_status(Some(dec(100)), dec(101)).state,
            BudgetState::Exceeded
        );
    }

    #[test]
    fn period_spend_respects_window_category_and_kind() {
        let mut ledger = Ledger::new("Budgets");
        let mut ids = SequentialIdSource::new();
        let food = ledger
            .categories
            .iter()
            .find(|c| c.name == "Food")
            .expect("stock category")
            .id;
        let salary = ledger
            .categories
            .iter()
            .find(|c| c.name == "Salary")
            .expect("stock category")
            .id;
        for (kind, amount, category, at) in [
            (CategoryKind::Expense, 40, food, "2024-03-05T10:00:00Z"),
            // previous month, excluded
            (CategoryKind::Expense, 15, food, "2024-02-28T10:00:00Z"),
            // income never counts as spend
            (CategoryKind::Income, 500, salary, "2024-03-01T10:00:00Z"),
        ] {
            let draft = TransactionDraft::new(kind, dec(amount), category, "", instant(at));
            ledger.add_transaction(draft, &mut ids).expect("valid");
        }
        let window = MonthWindow::containing(
            NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
        );
        assert_eq!(period_spend(&ledger.transactions, food, &window), dec(40));
    }

    #[test]
    fn overview_walks_expense_categories_in_registry_order() {
        let mut ledger = Ledger::new("Budgets");
        let mut ids = SequentialIdSource::new();
        let food = ledger
            .categories
            .iter()
            .find(|c| c.name == "Food")
            .expect("stock category")
            .id;
        ledger.upsert_budget_limit(food, dec(50)).expect("valid");
        let draft = TransactionDraft::new(
            CategoryKind::Expense,
            dec(40),
            food,
            "groceries",
            instant("2024-03-05T10:00:00Z"),
        );
        ledger.add_transaction(draft, &mut ids).expect("valid");

        let reference = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
        let overview = budget_overview(&ledger, reference);
        assert_eq!(overview.len(), 6);
        assert_eq!(overview[0].name, "Food");
        assert_eq!(overview[0].status.state, BudgetState::Warning);
        assert!(overview[1..]
            .iter()
            .all(|c| c.status.state == BudgetState::NoLimit));
    }
}
