use rust_decimal::Decimal;

const MONTH_NAMES: [&str; 12] = [
    "Január",
    "Február",
    "Március",
    "Április",
    "Május",
    "Június",
    "Július",
    "Augusztus",
    "Szeptember",
    "Október",
    "November",
    "December",
];

/// One user's ledger container for a single calendar month.
#[derive(Debug, Clone)]
pub(crate) struct Month {
    pub id: Option<i64>,
    pub user_id: i64,
    pub year: i32,
    pub month: u32,
    pub starting_balance: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

impl Month {
    pub(crate) fn new(user_id: i64, year: i32, month: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            user_id,
            year,
            month,
            starting_balance: Decimal::ZERO,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// "YYYY-MM" form, e.g. "2024-02".
    pub(crate) fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Hungarian display label, e.g. "2024 Február".
    pub(crate) fn label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .unwrap_or(&"?");
        format!("{} {}", self.year, name)
    }
}

/// Net view of a month: starting balance plus income minus expenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthSummary {
    pub starting_balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}
