/// Database row types. These map directly to SQLite rows.
/// Distinct from minion-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub api_key: String,
    pub client_url_identifier: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub sender_name: String,
    pub receiver_name: String,
    pub sender_minion_url_identifier: String,
    pub receiver_minion_url_identifier: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MinionRow {
    pub name: String,
    pub url_identifier: String,
    pub acknowledged: bool,
}
