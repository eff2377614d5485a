use rust_decimal::Decimal;

use super::ExpenseCategory;

#[derive(Debug, Clone)]
pub(crate) struct Expense {
    pub id: Option<i64>,
    pub user_id: i64,
    pub month_id: i64,
    pub date: String,
    pub amount: Decimal,
    pub item_name: String,
    pub category: ExpenseCategory,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Expense {
    pub(crate) fn new(
        user_id: i64,
        month_id: i64,
        date: String,
        amount: Decimal,
        item_name: String,
        category: ExpenseCategory,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            user_id,
            month_id,
            date,
            amount,
            item_name,
            category,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
