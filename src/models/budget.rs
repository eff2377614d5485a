use rust_decimal::Decimal;

use super::ExpenseCategory;

/// A per-category spending limit for one month.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub month_id: i64,
    pub category: ExpenseCategory,
    pub budget_amount: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

impl Budget {
    pub(crate) fn new(
        user_id: i64,
        month_id: i64,
        category: ExpenseCategory,
        budget_amount: Decimal,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            user_id,
            month_id,
            category,
            budget_amount,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A budget joined with the month's actual spending in its category.
#[derive(Debug, Clone)]
pub(crate) struct BudgetWithSpending {
    pub budget: Budget,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Percent of the limit spent; 0 when the limit itself is 0.
    pub percentage: Decimal,
    pub is_over_budget: bool,
}

/// Whole-month roll-up across every budgeted category.
#[derive(Debug, Clone)]
pub(crate) struct BudgetOverview {
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub overall_percentage: Decimal,
    pub is_over_budget: bool,
    pub budgets: Vec<BudgetWithSpending>,
}
