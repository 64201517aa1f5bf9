//! User rows: lookup, creation on first contact, profile fields

use rusqlite::{Connection, OptionalExtension, params};

use super::Db;
use crate::clock::Clock;
use crate::domain::{User, normalize_address};
use crate::error::{Error, Result};

/// Load a user by canonical address
pub(crate) fn find_by_address(conn: &Connection, address: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE address = ?1", User::COLUMNS),
        params![address],
        User::from_row,
    )
    .optional()
}

/// Load a user, creating an empty row on first contact
pub(crate) fn ensure_user(conn: &Connection, address: &str, now_ms: i64) -> rusqlite::Result<User> {
    conn.execute(
        "INSERT INTO users (address, created_at) VALUES (?1, ?2) ON CONFLICT(address) DO NOTHING",
        params![address, now_ms],
    )?;
    conn.query_row(
        &format!("SELECT {} FROM users WHERE address = ?1", User::COLUMNS),
        params![address],
        User::from_row,
    )
}

/// Profile reads and edits
pub struct UserRepository<'a> {
    db: &'a Db,
    clock: &'a dyn Clock,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Db, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    pub fn get(&self, address: &str) -> Result<Option<User>> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        Ok(find_by_address(&conn, &address)?)
    }

    /// Fetch or create the user row for an address
    pub fn get_or_create(&self, address: &str) -> Result<User> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        Ok(ensure_user(&conn, &address, self.clock.now_ms())?)
    }

    /// Set the display name; blank clears it
    pub fn set_username(&self, address: &str, username: &str) -> Result<User> {
        let username = clean_optional(username, 32, "username")?;
        self.update_field(address, "username", username)
    }

    /// Link (or with a blank id, unlink) a Discord account
    pub fn link_discord(&self, address: &str, discord_id: &str) -> Result<User> {
        let discord_id = clean_optional(discord_id, 32, "discord id")?;
        if let Some(id) = &discord_id {
            if !id.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::InvalidInput(format!("discord id must be numeric: {id}")));
            }
        }
        self.update_field(address, "discord_id", discord_id)
    }

    fn update_field(&self, address: &str, column: &str, value: Option<String>) -> Result<User> {
        let address = normalize_address(address)?;
        let conn = self.db.conn();
        ensure_user(&conn, &address, self.clock.now_ms())?;
        conn.execute(
            &format!("UPDATE users SET {column} = ?1 WHERE address = ?2"),
            params![value, address],
        )?;
        find_by_address(&conn, &address)?.ok_or(Error::UserNotFound(address))
    }
}

fn clean_optional(raw: &str, max_len: usize, what: &str) -> Result<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_len {
        return Err(Error::InvalidInput(format!("{what} longer than {max_len} characters")));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tempfile::tempdir;

    const ADDR: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn test_get_or_create_is_stable() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(1_000);
        let repo = UserRepository::new(&db, &clock);

        let first = repo.get_or_create(ADDR).unwrap();
        let again = repo.get_or_create(&ADDR.to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.level, 1);
        assert_eq!(first.xp, 0);
        assert_eq!(first.created_at, 1_000);
    }

    #[test]
    fn test_profile_updates() {
        let dir = tempdir().unwrap();
        let db = Db::open(&dir.path().join("test.db")).unwrap();
        let clock = ManualClock::at_millis(0);
        let repo = UserRepository::new(&db, &clock);

        let user = repo.set_username(ADDR, "  satoshi ").unwrap();
        assert_eq!(user.username.as_deref(), Some("satoshi"));

        let user = repo.link_discord(ADDR, "123456789").unwrap();
        assert_eq!(user.discord_id.as_deref(), Some("123456789"));

        assert!(repo.link_discord(ADDR, "not-a-snowflake").is_err());

        let user = repo.set_username(ADDR, "   ").unwrap();
        assert_eq!(user.username, None);
    }
}
