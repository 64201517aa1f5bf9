//! SQLite persistence for users, rewards, claims, votes and collectables
//!
//! The database file is the only shared mutable state. Several processes may
//! open it at once, so every write path runs inside an immediate transaction
//! and relies on guarded `UPDATE ... WHERE` clauses plus `UNIQUE`/`CHECK`
//! constraints rather than the in-process mutex.

mod db;
pub(crate) mod users;

pub use db::Db;
pub(crate) use db::is_constraint_violation;
pub use users::UserRepository;
