//! SQLite database connection and schema management
//!
//! Manages the guildhall SQLite database with automatic schema migration.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, ErrorCode};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle
///
/// Cloning shares the connection. Opening the same file twice gives two
/// independent connections, which is how multiple server instances behave.
#[derive(Clone)]
pub struct Db {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open with an explicit busy timeout for writers waiting on the file lock
    pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create db dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open db: {}", path.display()))?;

        conn.busy_timeout(busy_timeout)?;
        // WAL lets readers proceed while one writer holds the lock
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Lock the connection
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("DB lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: claims.coins_spent (legacy rows stay NULL until backfilled)
        if version < 2 {
            if !has_column(&conn, "claims", "coins_spent") {
                conn.execute_batch("ALTER TABLE claims ADD COLUMN coins_spent INTEGER;")?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        // Migration 3: cached eligibility year on users
        if version < 3 {
            if !has_column(&conn, "users", "first_activity_year") {
                conn.execute_batch("ALTER TABLE users ADD COLUMN first_activity_year INTEGER;")?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (3)", [])?;
        }

        Ok(())
    }
}

fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare(&format!(
        "SELECT COUNT(*) FROM pragma_table_info('{table}') WHERE name = ?1"
    ))
    .and_then(|mut s| s.query_row([column], |r| r.get::<_, i32>(0)))
    .map(|c| c > 0)
    .unwrap_or(false)
}

/// True for `UNIQUE`/`CHECK`/`FOREIGN KEY` failures
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

/// SQL schema for the community database
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL UNIQUE,
    username TEXT,
    xp INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
    coins INTEGER NOT NULL DEFAULT 0 CHECK (coins >= 0),
    level INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
    discord_id TEXT,
    last_active INTEGER,
    first_activity_year INTEGER,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_last_active ON users(last_active);
CREATE INDEX IF NOT EXISTS idx_users_xp ON users(xp);

-- xp_required is the coin price (legacy column name)
CREATE TABLE IF NOT EXISTS rewards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    image_url TEXT,
    xp_required INTEGER NOT NULL CHECK (xp_required >= 0),
    total_available INTEGER NOT NULL CHECK (total_available >= 0),
    claimed INTEGER NOT NULL DEFAULT 0 CHECK (claimed >= 0 AND claimed <= total_available),
    active INTEGER NOT NULL DEFAULT 1,
    contract_address TEXT,
    required_year INTEGER,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_rewards_active_price ON rewards(active, xp_required);

CREATE TABLE IF NOT EXISTS claims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    reward_id INTEGER NOT NULL,
    coins_spent INTEGER,
    claimed_at INTEGER NOT NULL,
    UNIQUE (user_id, reward_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (reward_id) REFERENCES rewards(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_claims_reward ON claims(reward_id);

CREATE TABLE IF NOT EXISTS votes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    voted_date INTEGER NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_votes_user_date ON votes(user_id, voted_date);

CREATE TABLE IF NOT EXISTS collectables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    image_url TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    contract_address TEXT,
    required_year INTEGER,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS collectable_claims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    collectable_id INTEGER NOT NULL,
    claimed_at INTEGER NOT NULL,
    UNIQUE (user_id, collectable_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (collectable_id) REFERENCES collectables(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
