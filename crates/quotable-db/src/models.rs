/// Database row types — these map directly to SQLite rows.
/// Distinct from the quotable-types API models to keep the DB layer
/// independent.

pub struct UserRow {
    pub id: i64,
    pub email: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}

pub struct QuoteRow {
    pub id: i64,
    pub text: String,
    pub author: Option<String>,
    pub is_public: bool,
    pub is_favorite: bool,
    pub user_id: Option<i64>,
    pub topic_id: Option<i64>,
    /// Owner's username from the LEFT JOIN; None for ownerless rows.
    pub username: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct TopicRow {
    pub id: i64,
    pub name: String,
}
