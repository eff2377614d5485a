use rust_decimal::Decimal;

use super::IncomeSource;

#[derive(Debug, Clone)]
pub(crate) struct Income {
    pub id: Option<i64>,
    pub user_id: i64,
    pub month_id: i64,
    pub date: String,
    pub amount: Decimal,
    pub source: IncomeSource,
    pub custom_source: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Income {
    pub(crate) fn new(
        user_id: i64,
        month_id: i64,
        date: String,
        amount: Decimal,
        source: IncomeSource,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            user_id,
            month_id,
            date,
            amount,
            source,
            custom_source: None,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The custom label when one was given, otherwise the source type name.
    pub(crate) fn source_label(&self) -> &str {
        match self.custom_source.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => self.source.as_str(),
        }
    }
}
