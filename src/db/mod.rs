mod schema;

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DomainError, Result};
use crate::models::{
    Budget, Expense, ExpenseCategory, Income, IncomeSource, Month, User,
};

/// SQLite-backed ledger store. Every query is scoped to the acting user and
/// filters out soft-deleted rows; callers never see a row whose
/// `deleted_at` is set.
pub(crate) struct Database {
    conn: Connection,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            DomainError::Store(format!("failed to open database {}: {e}", path.display()))
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(&self, user: &User) -> Result<i64> {
        let result = self.conn.execute(
            "INSERT INTO users (email, created_at) VALUES (?1, ?2)",
            params![user.email, user.created_at],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => Err(DomainError::Conflict(format!(
                "a user with email '{}' already exists",
                user.email
            ))),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, email, created_at FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    email: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email, created_at FROM users ORDER BY email")?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                id: Some(row.get(0)?),
                email: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Months ────────────────────────────────────────────────

    fn map_month_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Month> {
        let balance_str: String = row.get(4)?;
        Ok(Month {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            year: row.get(2)?,
            month: row.get(3)?,
            starting_balance: Decimal::from_str(&balance_str).unwrap_or_default(),
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    pub(crate) fn find_month(&self, user_id: i64, year: i32, month: u32) -> Result<Option<Month>> {
        let result = self.conn.query_row(
            "SELECT id, user_id, year, month, starting_balance, created_at, updated_at
             FROM months
             WHERE user_id = ?1 AND year = ?2 AND month = ?3 AND deleted_at IS NULL",
            params![user_id, year, month],
            Self::map_month_row,
        );
        match result {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the month row, creating it with a zero starting balance on
    /// first access. A concurrent first access racing past the SELECT loses
    /// the insert to the unique index and falls back to re-reading the
    /// winner's row, so both callers resolve to the same id.
    pub(crate) fn get_or_create_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Month> {
        if let Some(existing) = self.find_month(user_id, year, month)? {
            return Ok(existing);
        }
        self.insert_month_or_reread(Month::new(user_id, year, month))
    }

    fn insert_month_or_reread(&self, fresh: Month) -> Result<Month> {
        let result = self.conn.execute(
            "INSERT INTO months (user_id, year, month, starting_balance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                fresh.user_id,
                fresh.year,
                fresh.month,
                fresh.starting_balance.to_string(),
                fresh.created_at,
                fresh.updated_at,
            ],
        );
        match result {
            Ok(_) => {
                let mut created = fresh;
                created.id = Some(self.conn.last_insert_rowid());
                Ok(created)
            }
            Err(err) if is_unique_violation(&err) => self
                .find_month(fresh.user_id, fresh.year, fresh.month)?
                .ok_or(DomainError::NotFound("month")),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn get_months(&self, user_id: i64) -> Result<Vec<Month>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, year, month, starting_balance, created_at, updated_at
             FROM months
             WHERE user_id = ?1 AND deleted_at IS NULL
             ORDER BY year DESC, month DESC",
        )?;
        let rows = stmt.query_map(params![user_id], Self::map_month_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn set_starting_balance(
        &self,
        user_id: i64,
        month_id: i64,
        amount: Decimal,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE months SET starting_balance = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
            params![amount.to_string(), now_rfc3339(), month_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("month"));
        }
        Ok(())
    }

    // ── Incomes ───────────────────────────────────────────────

    fn map_income_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Income> {
        let amount_str: String = row.get(4)?;
        let source_str: String = row.get(5)?;
        Ok(Income {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            month_id: row.get(2)?,
            date: row.get(3)?,
            amount: Decimal::from_str(&amount_str).unwrap_or_default(),
            source: IncomeSource::parse(&source_str).unwrap_or(IncomeSource::Other),
            custom_source: row.get(6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    pub(crate) fn insert_income(&self, income: &Income) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO incomes (user_id, month_id, date, amount, source_type, custom_source, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                income.user_id,
                income.month_id,
                income.date,
                income.amount.to_string(),
                income.source.as_str(),
                income.custom_source,
                income.notes,
                income.created_at,
                income.updated_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_incomes(&self, user_id: i64, month_id: i64) -> Result<Vec<Income>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, month_id, date, amount, source_type, custom_source, notes, created_at, updated_at
             FROM incomes
             WHERE user_id = ?1 AND month_id = ?2 AND deleted_at IS NULL
             ORDER BY date, id",
        )?;
        let rows = stmt.query_map(params![user_id, month_id], Self::map_income_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_income_amount(
        &self,
        user_id: i64,
        income_id: i64,
        amount: Decimal,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE incomes SET amount = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
            params![amount.to_string(), now_rfc3339(), income_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("income"));
        }
        Ok(())
    }

    pub(crate) fn soft_delete_income(&self, user_id: i64, income_id: i64) -> Result<()> {
        let now = now_rfc3339();
        let changed = self.conn.execute(
            "UPDATE incomes SET deleted_at = ?1, updated_at = ?1
             WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
            params![now, income_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("income"));
        }
        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    fn map_expense_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
        let amount_str: String = row.get(4)?;
        let category_str: String = row.get(6)?;
        Ok(Expense {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            month_id: row.get(2)?,
            date: row.get(3)?,
            amount: Decimal::from_str(&amount_str).unwrap_or_default(),
            item_name: row.get(5)?,
            category: ExpenseCategory::parse(&category_str).unwrap_or(ExpenseCategory::Extra),
            notes: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (user_id, month_id, date, amount, item_name, category, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                expense.user_id,
                expense.month_id,
                expense.date,
                expense.amount.to_string(),
                expense.item_name,
                expense.category.as_str(),
                expense.notes,
                expense.created_at,
                expense.updated_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_expenses(&self, user_id: i64, month_id: i64) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, month_id, date, amount, item_name, category, notes, created_at, updated_at
             FROM expenses
             WHERE user_id = ?1 AND month_id = ?2 AND deleted_at IS NULL
             ORDER BY date, id",
        )?;
        let rows = stmt.query_map(params![user_id, month_id], Self::map_expense_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_expense_amount(
        &self,
        user_id: i64,
        expense_id: i64,
        amount: Decimal,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET amount = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
            params![amount.to_string(), now_rfc3339(), expense_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("expense"));
        }
        Ok(())
    }

    pub(crate) fn soft_delete_expense(&self, user_id: i64, expense_id: i64) -> Result<()> {
        let now = now_rfc3339();
        let changed = self.conn.execute(
            "UPDATE expenses SET deleted_at = ?1, updated_at = ?1
             WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
            params![now, expense_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("expense"));
        }
        Ok(())
    }

    // ── Budgets ───────────────────────────────────────────────

    fn map_budget_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
        let amount_str: String = row.get(4)?;
        let category_str: String = row.get(3)?;
        Ok(Budget {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            month_id: row.get(2)?,
            category: ExpenseCategory::parse(&category_str).unwrap_or(ExpenseCategory::Extra),
            budget_amount: Decimal::from_str(&amount_str).unwrap_or_default(),
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Budgets in store order (row id), which is insertion order. Callers
    /// that want a different ordering sort on their side.
    pub(crate) fn get_budgets(&self, user_id: i64, month_id: i64) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, month_id, category, budget_amount, created_at, updated_at
             FROM budgets
             WHERE user_id = ?1 AND month_id = ?2 AND deleted_at IS NULL
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id, month_id], Self::map_budget_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_budget(&self, user_id: i64, budget_id: i64) -> Result<Budget> {
        let result = self.conn.query_row(
            "SELECT id, user_id, month_id, category, budget_amount, created_at, updated_at
             FROM budgets
             WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
            params![budget_id, user_id],
            Self::map_budget_row,
        );
        match result {
            Ok(b) => Ok(b),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DomainError::NotFound("budget")),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn insert_budget(&self, budget: &Budget) -> Result<Budget> {
        let result = self.conn.execute(
            "INSERT INTO budgets (user_id, month_id, category, budget_amount, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                budget.user_id,
                budget.month_id,
                budget.category.as_str(),
                budget.budget_amount.to_string(),
                budget.created_at,
                budget.updated_at,
            ],
        );
        match result {
            Ok(_) => {
                let mut created = budget.clone();
                created.id = Some(self.conn.last_insert_rowid());
                Ok(created)
            }
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!(category = budget.category.as_str(), "duplicate budget rejected");
                Err(DomainError::Conflict(format!(
                    "a budget for '{}' already exists in this month",
                    budget.category
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn update_budget_amount(
        &self,
        user_id: i64,
        budget_id: i64,
        amount: Decimal,
    ) -> Result<Budget> {
        let changed = self.conn.execute(
            "UPDATE budgets SET budget_amount = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
            params![amount.to_string(), now_rfc3339(), budget_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("budget"));
        }
        self.get_budget(user_id, budget_id)
    }

    pub(crate) fn soft_delete_budget(&self, user_id: i64, budget_id: i64) -> Result<()> {
        let now = now_rfc3339();
        let changed = self.conn.execute(
            "UPDATE budgets SET deleted_at = ?1, updated_at = ?1
             WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
            params![now, budget_id, user_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound("budget"));
        }
        Ok(())
    }

    /// Replaces the month's whole budget set in one transaction: the prior
    /// non-deleted rows are soft-deleted and the new set inserted, so a
    /// failure part-way leaves the previous set intact. Row ids are not
    /// preserved across a replace.
    pub(crate) fn replace_budgets(
        &mut self,
        user_id: i64,
        month_id: i64,
        entries: &[(ExpenseCategory, Decimal)],
    ) -> Result<Vec<Budget>> {
        let tx = self.conn.transaction()?;
        let now = now_rfc3339();
        tx.execute(
            "UPDATE budgets SET deleted_at = ?1, updated_at = ?1
             WHERE user_id = ?2 AND month_id = ?3 AND deleted_at IS NULL",
            params![now, user_id, month_id],
        )?;

        let mut created = Vec::with_capacity(entries.len());
        for &(category, amount) in entries {
            tx.execute(
                "INSERT INTO budgets (user_id, month_id, category, budget_amount, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user_id, month_id, category.as_str(), amount.to_string(), now, now],
            )?;
            created.push(Budget {
                id: Some(tx.last_insert_rowid()),
                user_id,
                month_id,
                category,
                budget_amount: amount,
                created_at: now.clone(),
                updated_at: now.clone(),
            });
        }
        tx.commit()?;
        Ok(created)
    }

    // ── Export ────────────────────────────────────────────────

    /// Writes the month's non-deleted incomes and expenses to a CSV file.
    /// Returns the number of rows written.
    pub(crate) fn export_month_csv(
        &self,
        user_id: i64,
        month_id: i64,
        path: &str,
    ) -> Result<usize> {
        let incomes = self.get_incomes(user_id, month_id)?;
        let expenses = self.get_expenses(user_id, month_id)?;

        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["date", "kind", "label", "category", "amount", "notes"])?;

        let mut count = 0;
        let mut rows: Vec<[String; 6]> = Vec::with_capacity(incomes.len() + expenses.len());
        for income in &incomes {
            rows.push([
                income.date.clone(),
                "income".into(),
                income.source_label().to_string(),
                String::new(),
                income.amount.to_string(),
                income.notes.clone().unwrap_or_default(),
            ]);
        }
        for expense in &expenses {
            rows.push([
                expense.date.clone(),
                "expense".into(),
                expense.item_name.clone(),
                expense.category.as_str().to_string(),
                expense.amount.to_string(),
                expense.notes.clone().unwrap_or_default(),
            ]);
        }
        rows.sort_by(|a, b| a[0].cmp(&b[0]));

        for row in &rows {
            wtr.write_record(row)?;
            count += 1;
        }
        wtr.flush()?;
        Ok(count)
    }
}
