#[derive(Debug, Clone)]
pub(crate) struct User {
    pub id: Option<i64>,
    pub email: String,
    pub created_at: String,
}

impl User {
    pub(crate) fn new(email: String) -> Self {
        Self {
            id: None,
            email,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
