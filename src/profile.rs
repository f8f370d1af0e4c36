// SQLite persistence for the profile record and parade session state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::clan::Clan;
use crate::stats::StatBlock;

/// The long-lived profile record: the ApocaMon the parade assigns a clan to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub name: String,
    /// `None` until the parade pick is committed.
    pub clan: Option<Clan>,
    /// `None` until the classification dice have been rolled.
    pub stats: Option<StatBlock>,
    /// Whether the profile has entered ranked play.
    pub ranked: bool,
}

/// SQLite-backed store for profile records plus a key-value table used to
/// recover an in-progress parade after a crash.
pub struct ProfileStore {
    conn: Mutex<Connection>,
}

impl ProfileStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    /// Pass `":memory:"` for an ephemeral in-memory store (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open profile store at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set profile store pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS profiles (
                name         TEXT PRIMARY KEY,
                clan         TEXT,
                max_life     REAL,
                defense      REAL,
                max_stamina  REAL,
                reach        REAL,
                attack_speed REAL,
                ranked       INTEGER NOT NULL DEFAULT 0,
                updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS session_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create profile store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("profile store mutex poisoned")
    }

    /// Write the assigned clan into the profile record. Exactly one write
    /// per call; repeating with the same clan overwrites with the same
    /// value, a different clan overwrites the previous assignment.
    pub fn assign_clan(&self, name: &str, clan: Clan) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO profiles (name, clan) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                 clan = excluded.clan,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![name, clan.as_str()],
        )
        .context("failed to assign clan")?;
        Ok(())
    }

    /// Persist a rolled stat block for the profile.
    pub fn save_stats(&self, name: &str, stats: &StatBlock) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO profiles (name, max_life, defense, max_stamina, reach, attack_speed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(name) DO UPDATE SET
                 max_life = excluded.max_life,
                 defense = excluded.defense,
                 max_stamina = excluded.max_stamina,
                 reach = excluded.reach,
                 attack_speed = excluded.attack_speed,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![
                name,
                stats.max_life,
                stats.defense,
                stats.max_stamina,
                stats.reach,
                stats.attack_speed,
            ],
        )
        .context("failed to save stats")?;
        Ok(())
    }

    /// Mark whether the profile has entered ranked play.
    pub fn set_ranked(&self, name: &str, ranked: bool) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO profiles (name, ranked) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                 ranked = excluded.ranked,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![name, ranked],
        )
        .context("failed to set ranked flag")?;
        Ok(())
    }

    /// Load a profile record by name. Returns `None` if no row exists.
    pub fn load_profile(&self, name: &str) -> Result<Option<ProfileRecord>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT clan, max_life, defense, max_stamina, reach, attack_speed, ranked
                 FROM profiles WHERE name = ?1",
                params![name],
                |row| {
                    let clan_str: Option<String> = row.get(0)?;
                    let max_life: Option<f64> = row.get(1)?;
                    let defense: Option<f64> = row.get(2)?;
                    let max_stamina: Option<f64> = row.get(3)?;
                    let reach: Option<f64> = row.get(4)?;
                    let attack_speed: Option<f64> = row.get(5)?;
                    let ranked: bool = row.get(6)?;
                    Ok((
                        clan_str,
                        max_life,
                        defense,
                        max_stamina,
                        reach,
                        attack_speed,
                        ranked,
                    ))
                },
            )
            .optional()
            .context("failed to query profile")?;

        let Some((clan_str, max_life, defense, max_stamina, reach, attack_speed, ranked)) = row
        else {
            return Ok(None);
        };

        // An unparsable stored clan is treated as unassigned rather than
        // failing the whole load.
        let clan = clan_str.as_deref().and_then(|s| {
            let parsed = Clan::parse(s);
            if parsed.is_none() {
                warn!("ignoring unrecognized stored clan `{s}` for profile `{name}`");
            }
            parsed
        });

        let stats = match (max_life, defense, max_stamina, reach, attack_speed) {
            (Some(max_life), Some(defense), Some(max_stamina), Some(reach), Some(attack_speed)) => {
                Some(StatBlock {
                    max_life,
                    defense,
                    max_stamina,
                    reach,
                    attack_speed,
                })
            }
            _ => None,
        };

        Ok(Some(ProfileRecord {
            name: name.to_string(),
            clan,
            stats,
            ranked,
        }))
    }

    /// Persist an arbitrary JSON value under `key`. Repeated saves overwrite
    /// the previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str = serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO session_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save session state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the
    /// key does not exist.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row(
                "SELECT value FROM session_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query session state")?;

        match json_str {
            Some(s) => {
                let value =
                    serde_json::from_str(&s).context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Remove a saved state entry, if present.
    pub fn clear_state(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM session_state WHERE key = ?1", params![key])
            .context("failed to clear session state")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
