//! User-scoped domain operations: validation in front, the store behind,
//! derived metrics on the way out. The acting user is always an explicit
//! parameter; nothing here reads ambient session state.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::db::Database;
use crate::error::{DomainError, Result};
use crate::models::{
    Budget, BudgetOverview, BudgetWithSpending, Expense, ExpenseCategory, Income, IncomeSource,
    Month, MonthSummary, User,
};
use crate::summary;

/// Upper bound on every stored amount: 99 999 999.99.
fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

// ── Input parsing & validation ────────────────────────────────

pub(crate) fn parse_amount(field: &'static str, s: &str) -> Result<Decimal> {
    let amount = s
        .parse::<Decimal>()
        .map_err(|_| DomainError::validation(field, format!("'{s}' is not a number")))?;
    validate_amount(field, amount)?;
    Ok(amount)
}

fn validate_amount(field: &'static str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(DomainError::validation(field, "cannot be negative"));
    }
    if amount > max_amount() {
        return Err(DomainError::validation(field, "exceeds 99999999.99"));
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DomainError::validation("date", format!("'{date}' is not a YYYY-MM-DD date")))?;
    Ok(())
}

/// "YYYY-MM" → (year, month).
pub(crate) fn parse_month_key(key: &str) -> Result<(i32, u32)> {
    let invalid = || DomainError::validation("month", format!("'{key}' is not a YYYY-MM month"));
    let (year_str, month_str) = key.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year_str.parse().map_err(|_| invalid())?;
    let month: u32 = month_str.parse().map_err(|_| invalid())?;
    if year_str.len() != 4 || !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

pub(crate) fn parse_category(s: &str) -> Result<ExpenseCategory> {
    ExpenseCategory::parse(s).ok_or_else(|| {
        let valid = ExpenseCategory::all()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        DomainError::validation("category", format!("'{s}' is not one of: {valid}"))
    })
}

pub(crate) fn parse_source(s: &str) -> Result<IncomeSource> {
    IncomeSource::parse(s).ok_or_else(|| {
        let valid = IncomeSource::all()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        DomainError::validation("source", format!("'{s}' is not one of: {valid}"))
    })
}

fn user_id(user: &User) -> Result<i64> {
    user.id.ok_or(DomainError::NotAuthenticated)
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

// ── Users ─────────────────────────────────────────────────────

pub(crate) fn register_user(db: &Database, email: &str) -> Result<User> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("email", "not a valid email address"));
    }
    let mut user = User::new(email.to_string());
    user.id = Some(db.insert_user(&user)?);
    info!(email, "registered user");
    Ok(user)
}

/// Resolves the acting user from an explicit selector. No selector, or a
/// selector naming nobody, means there is no authenticated identity.
pub(crate) fn resolve_user(db: &Database, email: Option<&str>) -> Result<User> {
    let email = email.ok_or(DomainError::NotAuthenticated)?;
    db.find_user_by_email(email)?
        .ok_or(DomainError::NotAuthenticated)
}

// ── Months ────────────────────────────────────────────────────

pub(crate) fn resolve_month(db: &Database, user: &User, key: &str) -> Result<Month> {
    let (year, month) = parse_month_key(key)?;
    db.get_or_create_month(user_id(user)?, year, month)
}

pub(crate) fn list_months(db: &Database, user: &User) -> Result<Vec<Month>> {
    db.get_months(user_id(user)?)
}

pub(crate) fn set_starting_balance(
    db: &Database,
    user: &User,
    key: &str,
    amount: Decimal,
) -> Result<Month> {
    validate_amount("starting_balance", amount)?;
    let mut month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    db.set_starting_balance(user_id(user)?, month_id, amount)?;
    month.starting_balance = amount;
    info!(month = %month.key(), %amount, "set starting balance");
    Ok(month)
}

// ── Incomes ───────────────────────────────────────────────────

pub(crate) struct IncomeInput {
    pub date: Option<String>,
    pub amount: Decimal,
    pub source: IncomeSource,
    pub custom_source: Option<String>,
    pub notes: Option<String>,
}

pub(crate) fn add_income(
    db: &Database,
    user: &User,
    key: &str,
    input: IncomeInput,
) -> Result<Income> {
    validate_amount("amount", input.amount)?;
    let date = input.date.unwrap_or_else(today);
    validate_date(&date)?;

    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let mut income = Income::new(user_id(user)?, month_id, date, input.amount, input.source);
    income.custom_source = input.custom_source;
    income.notes = input.notes;
    income.id = Some(db.insert_income(&income)?);
    info!(month = %month.key(), amount = %income.amount, source = income.source.as_str(), "recorded income");
    Ok(income)
}

pub(crate) fn list_incomes(db: &Database, user: &User, key: &str) -> Result<Vec<Income>> {
    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    db.get_incomes(user_id(user)?, month_id)
}

pub(crate) fn update_income_amount(
    db: &Database,
    user: &User,
    income_id: i64,
    amount: Decimal,
) -> Result<()> {
    validate_amount("amount", amount)?;
    db.update_income_amount(user_id(user)?, income_id, amount)?;
    info!(income_id, %amount, "updated income");
    Ok(())
}

pub(crate) fn remove_income(db: &Database, user: &User, income_id: i64) -> Result<()> {
    db.soft_delete_income(user_id(user)?, income_id)?;
    info!(income_id, "removed income");
    Ok(())
}

// ── Expenses ──────────────────────────────────────────────────

pub(crate) struct ExpenseInput {
    pub date: Option<String>,
    pub amount: Decimal,
    pub item_name: String,
    pub category: ExpenseCategory,
    pub notes: Option<String>,
}

pub(crate) fn add_expense(
    db: &Database,
    user: &User,
    key: &str,
    input: ExpenseInput,
) -> Result<Expense> {
    validate_amount("amount", input.amount)?;
    if input.item_name.trim().is_empty() {
        return Err(DomainError::validation("item_name", "cannot be empty"));
    }
    let date = input.date.unwrap_or_else(today);
    validate_date(&date)?;

    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let mut expense = Expense::new(
        user_id(user)?,
        month_id,
        date,
        input.amount,
        input.item_name.trim().to_string(),
        input.category,
    );
    expense.notes = input.notes;
    expense.id = Some(db.insert_expense(&expense)?);
    info!(month = %month.key(), amount = %expense.amount, category = expense.category.as_str(), "recorded expense");
    Ok(expense)
}

pub(crate) fn list_expenses(db: &Database, user: &User, key: &str) -> Result<Vec<Expense>> {
    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    db.get_expenses(user_id(user)?, month_id)
}

pub(crate) fn update_expense_amount(
    db: &Database,
    user: &User,
    expense_id: i64,
    amount: Decimal,
) -> Result<()> {
    validate_amount("amount", amount)?;
    db.update_expense_amount(user_id(user)?, expense_id, amount)?;
    info!(expense_id, %amount, "updated expense");
    Ok(())
}

pub(crate) fn remove_expense(db: &Database, user: &User, expense_id: i64) -> Result<()> {
    db.soft_delete_expense(user_id(user)?, expense_id)?;
    info!(expense_id, "removed expense");
    Ok(())
}

// ── Budgets ───────────────────────────────────────────────────

pub(crate) fn set_budget(
    db: &Database,
    user: &User,
    key: &str,
    category: ExpenseCategory,
    amount: Decimal,
) -> Result<Budget> {
    validate_amount("budget_amount", amount)?;
    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let budget = Budget::new(user_id(user)?, month_id, category, amount);
    let created = db.insert_budget(&budget)?;
    info!(month = %month.key(), category = category.as_str(), %amount, "created budget");
    Ok(created)
}

pub(crate) fn edit_budget(
    db: &Database,
    user: &User,
    budget_id: i64,
    amount: Decimal,
) -> Result<Budget> {
    validate_amount("budget_amount", amount)?;
    let updated = db.update_budget_amount(user_id(user)?, budget_id, amount)?;
    info!(budget_id, %amount, "updated budget");
    Ok(updated)
}

pub(crate) fn remove_budget(db: &Database, user: &User, budget_id: i64) -> Result<()> {
    db.soft_delete_budget(user_id(user)?, budget_id)?;
    info!(budget_id, "removed budget");
    Ok(())
}

/// Replaces the month's entire budget set. The previous rows are gone
/// afterwards and the returned budgets carry fresh ids.
pub(crate) fn replace_budgets(
    db: &mut Database,
    user: &User,
    key: &str,
    entries: &[(ExpenseCategory, Decimal)],
) -> Result<Vec<Budget>> {
    if entries.is_empty() {
        return Err(DomainError::validation(
            "budgets",
            "at least one category budget must be provided",
        ));
    }
    let mut seen = HashSet::new();
    for &(category, amount) in entries {
        validate_amount("budget_amount", amount)?;
        if !seen.insert(category) {
            return Err(DomainError::validation(
                "budgets",
                format!("category '{category}' appears more than once"),
            ));
        }
    }

    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let created = db.replace_budgets(user_id(user)?, month_id, entries)?;
    info!(month = %month.key(), count = created.len(), "replaced budgets");
    Ok(created)
}

/// Every budget of the month joined with its category's actual spending,
/// in store order.
pub(crate) fn budgets_for_month(
    db: &Database,
    user: &User,
    key: &str,
) -> Result<Vec<BudgetWithSpending>> {
    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let uid = user_id(user)?;
    let budgets = db.get_budgets(uid, month_id)?;
    let expenses = db.get_expenses(uid, month_id)?;
    let spending = summary::spending_by_category(&expenses);
    Ok(summary::budgets_with_spending(budgets, &spending))
}

pub(crate) fn budget_overview_for_month(
    db: &Database,
    user: &User,
    key: &str,
) -> Result<BudgetOverview> {
    let budgets = budgets_for_month(db, user, key)?;
    Ok(summary::budget_overview(budgets))
}

// ── Summaries & export ────────────────────────────────────────

pub(crate) fn month_summary(db: &Database, user: &User, key: &str) -> Result<MonthSummary> {
    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let uid = user_id(user)?;
    let incomes = db.get_incomes(uid, month_id)?;
    let expenses = db.get_expenses(uid, month_id)?;
    Ok(summary::month_summary(
        month.starting_balance,
        &incomes,
        &expenses,
    ))
}

pub(crate) fn export_month(db: &Database, user: &User, key: &str, path: &str) -> Result<usize> {
    let month = resolve_month(db, user, key)?;
    let month_id = month.id.ok_or(DomainError::NotFound("month"))?;
    let count = db.export_month_csv(user_id(user)?, month_id, path)?;
    info!(month = %month.key(), count, path, "exported month to CSV");
    Ok(count)
}

#[cfg(test)]
mod tests;
