use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::{User, UserId};

/// Read access to registered borrowers, plus the seeding path that is the
/// only way users get into the table.
pub struct UserDirectory<'c> {
    conn: &'c Connection,
}

impl<'c> UserDirectory<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Every user ordered by id.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, username FROM users ORDER BY id")
            .context("failed to prepare user query")?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: UserId(row.get(0)?),
                    name: row.get(1)?,
                    username: row.get(2)?,
                })
            })
            .context("failed to load users")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect users")?;

        Ok(users)
    }

    /// Linear scan over `list_users`. Directories are small enough that a
    /// keyed query buys nothing.
    pub fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.list_users()?.into_iter().find(|user| user.id == id))
    }

    pub fn add_user(&self, name: &str, username: &str) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (name, username) VALUES (?1, ?2)",
                params![name, username],
            )
            .context("failed to insert user")?;

        Ok(User {
            id: UserId(self.conn.last_insert_rowid()),
            name: name.to_string(),
            username: username.to_string(),
        })
    }

    /// Insert `seeds` only when the table is empty, then return the full list.
    /// Restarting with the same seeds never duplicates anyone.
    pub fn load_or_seed_users(&self, seeds: &[(String, String)]) -> Result<Vec<User>> {
        let existing = self.list_users()?;
        if !existing.is_empty() || seeds.is_empty() {
            return Ok(existing);
        }

        for (name, username) in seeds {
            let user = self.add_user(name, username)?;
            tracing::info!(user_id = %user.id, username = %user.username, "seeded user");
        }

        self.list_users()
    }
}
