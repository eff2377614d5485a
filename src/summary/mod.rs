//! Derived monthly metrics: per-category spending, budget progress, and the
//! month's net balance. Everything here is a pure function over rows the
//! store has already filtered.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{
    Budget, BudgetOverview, BudgetWithSpending, Expense, ExpenseCategory, Income, MonthSummary,
};

/// Sums expense amounts per category. Categories with no spending are
/// absent from the map rather than present with a zero.
pub(crate) fn spending_by_category(expenses: &[Expense]) -> HashMap<ExpenseCategory, Decimal> {
    let mut totals: HashMap<ExpenseCategory, Decimal> = HashMap::new();
    for expense in expenses {
        *totals.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
    }
    totals
}

/// Percent of `limit` consumed by `spent`; a zero limit yields 0 rather
/// than dividing by zero.
fn percentage_of(spent: Decimal, limit: Decimal) -> Decimal {
    if limit > Decimal::ZERO {
        spent / limit * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Joins each budget with the month's actual spending in its category.
/// Budget-driven: categories with spending but no budget do not appear.
/// Input order is preserved.
pub(crate) fn budgets_with_spending(
    budgets: Vec<Budget>,
    spending: &HashMap<ExpenseCategory, Decimal>,
) -> Vec<BudgetWithSpending> {
    budgets
        .into_iter()
        .map(|budget| {
            let spent = spending
                .get(&budget.category)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let remaining = budget.budget_amount - spent;
            let percentage = percentage_of(spent, budget.budget_amount);
            let is_over_budget = spent > budget.budget_amount;
            BudgetWithSpending {
                budget,
                spent,
                remaining,
                percentage,
                is_over_budget,
            }
        })
        .collect()
}

/// Rolls the per-category entries up into month-wide totals.
pub(crate) fn budget_overview(budgets: Vec<BudgetWithSpending>) -> BudgetOverview {
    let total_budget: Decimal = budgets.iter().map(|b| b.budget.budget_amount).sum();
    let total_spent: Decimal = budgets.iter().map(|b| b.spent).sum();
    BudgetOverview {
        total_budget,
        total_spent,
        total_remaining: total_budget - total_spent,
        overall_percentage: percentage_of(total_spent, total_budget),
        is_over_budget: total_spent > total_budget,
        budgets,
    }
}

pub(crate) fn income_total(incomes: &[Income]) -> Decimal {
    incomes.iter().map(|i| i.amount).sum()
}

pub(crate) fn expense_total(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// `balance = starting_balance + total_income - total_expenses`.
pub(crate) fn month_summary(
    starting_balance: Decimal,
    incomes: &[Income],
    expenses: &[Expense],
) -> MonthSummary {
    let total_income = income_total(incomes);
    let total_expenses = expense_total(expenses);
    MonthSummary {
        starting_balance,
        total_income,
        total_expenses,
        balance: starting_balance + total_income - total_expenses,
    }
}
