//! SQLite staging store for the raw extraction tables.
//!
//! SQLite has no `CREATE SCHEMA`, so the raw namespace is a `raw_` prefix
//! on the four table names. DDL runs at every open and is idempotent; a
//! table that already exists with a different shape is left untouched (no
//! migration).

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::melt::MeltedPokemon;

/// Full staging DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS raw_pokemon (
    id              INTEGER,
    name            TEXT,
    height          INTEGER,
    weight          INTEGER,
    base_experience INTEGER,
    is_default      INTEGER NOT NULL,
    order_num       INTEGER,
    extracted_at    TEXT NOT NULL,
    raw_data        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS raw_pokemon_types (
    pokemon_id   INTEGER,
    pokemon_name TEXT,
    type_slot    INTEGER,
    type_name    TEXT,
    extracted_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS raw_pokemon_abilities (
    pokemon_id   INTEGER,
    pokemon_name TEXT,
    ability_slot INTEGER,
    ability_name TEXT,
    is_hidden    INTEGER NOT NULL,
    extracted_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS raw_pokemon_stats (
    pokemon_id   INTEGER,
    pokemon_name TEXT,
    stat_name    TEXT,
    base_stat    INTEGER,
    effort       INTEGER,
    extracted_at TEXT NOT NULL
);
";

/// Row counts across the four staging tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCounts {
    pub pokemon: u64,
    pub types: u64,
    pub abilities: u64,
    pub stats: u64,
}

/// Staging store backed by a single SQLite file.
///
/// The connection is held exclusively by the running process for the
/// duration of a phase; no concurrent writers are assumed.
pub struct RawStore {
    conn: Connection,
}

impl RawStore {
    /// Open (or create) the store at `path` and run schema initialisation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = RawStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = RawStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create the staging tables if absent. Safe to call repeatedly.
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Delete all rows in all four staging tables (full refresh).
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM raw_pokemon", [])?;
        self.conn.execute("DELETE FROM raw_pokemon_types", [])?;
        self.conn.execute("DELETE FROM raw_pokemon_abilities", [])?;
        self.conn.execute("DELETE FROM raw_pokemon_stats", [])?;
        Ok(())
    }

    /// Insert one melted payload: the entity row plus its association rows.
    ///
    /// The inserts are not wrapped in a transaction; a crash mid-item can
    /// leave partial rows for that item, which the next full refresh
    /// clears.
    pub fn insert_pokemon(&self, melted: &MeltedPokemon) -> Result<()> {
        let p = &melted.pokemon;
        self.conn.execute(
            "INSERT INTO raw_pokemon
               (id, name, height, weight, base_experience,
                is_default, order_num, extracted_at, raw_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                p.id,
                p.name,
                p.height,
                p.weight,
                p.base_experience,
                p.is_default,
                p.order_num,
                p.extracted_at.to_rfc3339(),
                p.raw_data,
            ],
        )?;

        for t in &melted.types {
            self.conn.execute(
                "INSERT INTO raw_pokemon_types
                   (pokemon_id, pokemon_name, type_slot, type_name, extracted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    t.pokemon_id,
                    t.pokemon_name,
                    t.slot,
                    t.type_name,
                    t.extracted_at.to_rfc3339(),
                ],
            )?;
        }

        for a in &melted.abilities {
            self.conn.execute(
                "INSERT INTO raw_pokemon_abilities
                   (pokemon_id, pokemon_name, ability_slot, ability_name, is_hidden, extracted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    a.pokemon_id,
                    a.pokemon_name,
                    a.slot,
                    a.ability_name,
                    a.is_hidden,
                    a.extracted_at.to_rfc3339(),
                ],
            )?;
        }

        for s in &melted.stats {
            self.conn.execute(
                "INSERT INTO raw_pokemon_stats
                   (pokemon_id, pokemon_name, stat_name, base_stat, effort, extracted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    s.pokemon_id,
                    s.pokemon_name,
                    s.stat_name,
                    s.base_stat,
                    s.effort,
                    s.extracted_at.to_rfc3339(),
                ],
            )?;
        }

        Ok(())
    }

    /// Per-table row counts for the run report.
    pub fn counts(&self) -> Result<RawCounts> {
        Ok(RawCounts {
            pokemon: self.count_table("raw_pokemon")?,
            types: self.count_table("raw_pokemon_types")?,
            abilities: self.count_table("raw_pokemon_abilities")?,
            stats: self.count_table("raw_pokemon_stats")?,
        })
    }

    /// Names in listing order; used by tests to compare full-refresh runs.
    pub fn pokemon_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM raw_pokemon ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn count_table(&self, table: &str) -> Result<u64> {
        let n: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(n as u64)
    }
}
