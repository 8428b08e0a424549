use crate::Database;
use crate::models::{MessageRow, MinionRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, username, password, api_key, client_url_identifier, created_at";
const MESSAGE_COLUMNS: &str = "id, sender_name, receiver_name, sender_minion_url_identifier, \
     receiver_minion_url_identifier, content, created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, api_key, client_url_identifier, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id,
                    user.username,
                    user.password,
                    user.api_key,
                    user.client_url_identifier,
                    user.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_name, receiver_name, sender_minion_url_identifier,
                                       receiver_minion_url_identifier, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    message.id,
                    message.sender_name,
                    message.receiver_name,
                    message.sender_minion_url_identifier,
                    message.receiver_minion_url_identifier,
                    message.content,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Most recent message sent from `sender` to `receiver`. One direction only.
    pub fn get_latest_message(&self, sender: &str, receiver: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE sender_name = ?1 AND receiver_name = ?2
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT 1"
                ),
                [sender, receiver],
                message_from_row,
            )
            .optional()
        })
    }

    /// Both directions of a conversation, oldest first.
    pub fn get_messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE (sender_name = ?1 AND receiver_name = ?2)
                    OR (sender_name = ?2 AND receiver_name = ?1)
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt
                .query_map([a, b], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt
                .query_map([], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Everyone `username` has sent to or received from, sorted by name.
    pub fn get_chat_partners(&self, username: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT receiver_name AS partner FROM messages WHERE sender_name = ?1
                 UNION
                 SELECT sender_name AS partner FROM messages WHERE receiver_name = ?1
                 ORDER BY partner",
            )?;
            let rows = stmt
                .query_map([username], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }

    // -- Minions --

    pub fn get_minion(&self, name: &str) -> Result<Option<MinionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT name, url_identifier, acknowledged FROM minions WHERE name = ?1",
                [name],
                |row| {
                    Ok(MinionRow {
                        name: row.get(0)?,
                        url_identifier: row.get(1)?,
                        acknowledged: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn create_minion(&self, name: &str, url_identifier: &str) -> Result<MinionRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO minions (name, url_identifier, acknowledged) VALUES (?1, ?2, 0)",
                [name, url_identifier],
            )?;
            Ok(MinionRow {
                name: name.to_string(),
                url_identifier: url_identifier.to_string(),
                acknowledged: false,
            })
        })
    }

    /// Point an existing identity at a new identifier and drop its
    /// acknowledgement. Returns false when no minion with that name exists.
    pub fn reset_minion(&self, name: &str, url_identifier: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE minions SET url_identifier = ?2, acknowledged = 0 WHERE name = ?1",
                [name, url_identifier],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false when no minion with that name exists.
    pub fn acknowledge_minion(&self, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE minions SET acknowledged = 1 WHERE name = ?1", [name])?;
            Ok(changed > 0)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))?;
    stmt.query_row([username], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        api_key: row.get(3)?,
        client_url_identifier: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_name: row.get(1)?,
        receiver_name: row.get(2)?,
        sender_minion_url_identifier: row.get(3)?,
        receiver_minion_url_identifier: row.get(4)?,
        content: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format_timestamp;
    use chrono::{Duration, Utc};

    fn message(id: &str, from: &str, to: &str, receiver_minion: &str, offset_secs: i64) -> MessageRow {
        MessageRow {
            id: id.to_string(),
            sender_name: from.to_string(),
            receiver_name: to.to_string(),
            sender_minion_url_identifier: "alpha".to_string(),
            receiver_minion_url_identifier: receiver_minion.to_string(),
            content: format!("hello from {from}"),
            created_at: format_timestamp(Utc::now() + Duration::seconds(offset_secs)),
        }
    }

    fn user(username: &str) -> UserRow {
        UserRow {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: "hash".to_string(),
            api_key: format!("key-{username}"),
            client_url_identifier: String::new(),
            created_at: format_timestamp(Utc::now()),
        }
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&user("alice")).unwrap();
        assert!(db.create_user(&user("alice")).is_err());

        let stored = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(stored.api_key, "key-alice");
        assert!(db.get_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn latest_message_is_directional_and_newest() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&message("1", "alice", "bob", "beta", 0)).unwrap();
        db.insert_message(&message("2", "alice", "bob", "", 10)).unwrap();
        db.insert_message(&message("3", "bob", "alice", "alpha", 20)).unwrap();

        let latest = db.get_latest_message("alice", "bob").unwrap().unwrap();
        assert_eq!(latest.id, "2");
        assert_eq!(latest.receiver_minion_url_identifier, "");

        assert!(db.get_latest_message("alice", "carol").unwrap().is_none());
    }

    #[test]
    fn same_timestamp_falls_back_to_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let mut first = message("b", "alice", "bob", "beta", 0);
        let mut second = message("a", "alice", "bob", "gamma", 0);
        second.created_at = first.created_at.clone();
        first.content = "first".into();
        second.content = "second".into();
        db.insert_message(&first).unwrap();
        db.insert_message(&second).unwrap();

        let latest = db.get_latest_message("alice", "bob").unwrap().unwrap();
        assert_eq!(latest.content, "second");
    }

    #[test]
    fn conversation_and_partners_cover_both_directions() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&message("1", "alice", "bob", "beta", 0)).unwrap();
        db.insert_message(&message("2", "bob", "alice", "alpha", 5)).unwrap();
        db.insert_message(&message("3", "carol", "alice", "alpha", 10)).unwrap();
        db.insert_message(&message("4", "bob", "carol", "gamma", 15)).unwrap();

        let between: Vec<String> = db
            .get_messages_between("alice", "bob")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(between, vec!["1", "2"]);

        assert_eq!(db.get_chat_partners("alice").unwrap(), vec!["bob", "carol"]);
        assert_eq!(db.list_messages().unwrap().len(), 4);
    }

    #[test]
    fn minion_acknowledgement_persists() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_minion("alpha").unwrap().is_none());
        assert!(!db.acknowledge_minion("alpha").unwrap());

        let created = db.create_minion("alpha", "alpha-id").unwrap();
        assert!(!created.acknowledged);

        assert!(db.acknowledge_minion("alpha").unwrap());
        let stored = db.get_minion("alpha").unwrap().unwrap();
        assert!(stored.acknowledged);
        assert_eq!(stored.url_identifier, "alpha-id");

        assert!(db.reset_minion("alpha", "alpha-new").unwrap());
        let moved = db.get_minion("alpha").unwrap().unwrap();
        assert!(!moved.acknowledged);
        assert_eq!(moved.url_identifier, "alpha-new");
        assert!(!db.reset_minion("beta", "beta-id").unwrap());
    }

    #[test]
    fn timestamps_round_trip_in_order() {
        let early = Utc::now();
        let late = early + Duration::milliseconds(3);
        let (a, b) = (format_timestamp(early), format_timestamp(late));
        assert!(a < b);
        assert_eq!(crate::parse_timestamp(&a).unwrap().timestamp_micros(), early.timestamp_micros());
        assert!(crate::parse_timestamp("2024-01-01 10:00:00").is_none());
    }
}
