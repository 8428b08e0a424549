use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use minion_db::models::{MessageRow, MinionRow};
use minion_db::{Database, format_timestamp, parse_timestamp};
use minion_types::models::{Message, Minion};

/// The slice of the directory the routing core needs.
///
/// Calls are blocking; [`crate::MinionNode`] runs them on the blocking pool.
/// Implementations only have to make each call atomic on its own; nothing
/// here spans resolution, forwarding and persistence.
pub trait DirectoryStore: Send + Sync {
    fn user_exists(&self, username: &str) -> Result<bool>;

    /// Most recent message from `sender` to `receiver`.
    fn latest_message(&self, sender: &str, receiver: &str) -> Result<Option<Message>>;

    /// Append a message. Missing timestamps are filled with the current time.
    fn record_message(&self, message: &Message) -> Result<()>;

    fn find_minion(&self, name: &str) -> Result<Option<Minion>>;

    fn create_minion(&self, name: &str, url_identifier: &str) -> Result<Minion>;

    /// Move an existing identity to a new identifier, unacknowledged.
    fn reset_minion(&self, name: &str, url_identifier: &str) -> Result<()>;

    fn acknowledge_minion(&self, name: &str) -> Result<()>;
}

impl DirectoryStore for Database {
    fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.get_user_by_username(username)?.is_some())
    }

    fn latest_message(&self, sender: &str, receiver: &str) -> Result<Option<Message>> {
        Ok(self.get_latest_message(sender, receiver)?.map(message_from_row))
    }

    fn record_message(&self, message: &Message) -> Result<()> {
        let created_at = message.created_at.unwrap_or_else(Utc::now);
        self.insert_message(&MessageRow {
            id: Uuid::new_v4().to_string(),
            sender_name: message.sender_name.clone(),
            receiver_name: message.receiver_name.clone(),
            sender_minion_url_identifier: message.sender_minion_url_identifier.clone(),
            receiver_minion_url_identifier: message.receiver_minion_url_identifier.clone(),
            content: message.content.clone(),
            created_at: format_timestamp(created_at),
        })
    }

    fn find_minion(&self, name: &str) -> Result<Option<Minion>> {
        Ok(self.get_minion(name)?.map(minion_from_row))
    }

    fn create_minion(&self, name: &str, url_identifier: &str) -> Result<Minion> {
        Database::create_minion(self, name, url_identifier).map(minion_from_row)
    }

    fn reset_minion(&self, name: &str, url_identifier: &str) -> Result<()> {
        if !Database::reset_minion(self, name, url_identifier)? {
            anyhow::bail!("no minion named {name}");
        }
        Ok(())
    }

    fn acknowledge_minion(&self, name: &str) -> Result<()> {
        if !Database::acknowledge_minion(self, name)? {
            anyhow::bail!("no minion named {name}");
        }
        Ok(())
    }
}

pub fn message_from_row(row: MessageRow) -> Message {
    Message {
        created_at: parse_timestamp(&row.created_at),
        sender_name: row.sender_name,
        receiver_name: row.receiver_name,
        sender_minion_url_identifier: row.sender_minion_url_identifier,
        receiver_minion_url_identifier: row.receiver_minion_url_identifier,
        content: row.content,
    }
}

fn minion_from_row(row: MinionRow) -> Minion {
    Minion {
        name: row.name,
        url_identifier: row.url_identifier,
        acknowledged: row.acknowledged,
    }
}
