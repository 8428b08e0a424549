use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                      TEXT PRIMARY KEY,
            username                TEXT NOT NULL UNIQUE,
            password                TEXT NOT NULL,
            api_key                 TEXT NOT NULL,
            client_url_identifier   TEXT NOT NULL DEFAULT '',
            created_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id                              TEXT PRIMARY KEY,
            sender_name                     TEXT NOT NULL,
            receiver_name                   TEXT NOT NULL,
            sender_minion_url_identifier    TEXT NOT NULL,
            receiver_minion_url_identifier  TEXT NOT NULL DEFAULT '',
            content                         TEXT NOT NULL,
            created_at                      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_pair
            ON messages(sender_name, receiver_name, created_at);

        CREATE TABLE IF NOT EXISTS minions (
            name            TEXT PRIMARY KEY,
            url_identifier  TEXT NOT NULL,
            acknowledged    INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
