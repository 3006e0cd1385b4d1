//! Learning-data persistence.
//!
//! Each agent's learned aggregates are captured in a [`LearningData`] blob
//! and stored per creature GUID in an SQLite table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS autonomous_npc_learning (
//!     creature_guid INTEGER PRIMARY KEY,
//!     format        TEXT NOT NULL,
//!     data          BLOB NOT NULL,
//!     updated_at    TEXT NOT NULL,
//!     checksum      TEXT
//! );
//! ```
//!
//! - The blob is JSON or MessagePack; both round-trip every float exactly.
//! - The table name comes from configuration and is validated as a plain
//!   identifier before it is spliced into SQL.
//! - An optional CRC-32 checksum detects corrupted rows (logged, not fatal).
//!
//! Agents never talk to the database directly. They flush through a
//! [`LearningSink`], which swallows and logs failures.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{AutonpcError, Result};
use crate::learning::Role;
use crate::types::{CreatureGuid, PlayerGuid, SpellId, ZoneId};

// ---------------------------------------------------------------------------
// Blob schema
// ---------------------------------------------------------------------------

/// Everything an agent carries across respawns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningData {
    /// Encounters ever recorded.
    pub total_combats: u32,
    /// Victories.
    pub wins: u32,
    /// Defeats.
    pub losses: u32,
    /// Mean encounter length in ms.
    pub average_combat_time_ms: f64,
    /// Mean effectiveness per spell.
    pub spell_success_rates: BTreeMap<SpellId, f32>,
    /// Recorded uses per spell (weights the running mean after restore).
    pub spell_casts: BTreeMap<SpellId, u32>,
    /// Score per role.
    pub role_affinities: BTreeMap<Role, f32>,
    /// Role chosen by the last derivation.
    pub primary_role: Option<Role>,
    /// Distinct zones in discovery order.
    pub visited_zones: Vec<ZoneId>,
    /// Visit counter per zone.
    pub zone_preferences: BTreeMap<ZoneId, u32>,
    /// Phrases heard from players, oldest first.
    pub learned_phrases: Vec<String>,
    /// Non-neutral relationship values.
    pub relationship_values: BTreeMap<PlayerGuid, i32>,
}

/// Blob encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobFormat {
    /// Human-readable JSON.
    #[default]
    Json,
    /// Compact MessagePack (field names kept).
    MessagePack,
}

impl BlobFormat {
    /// Name stored in the `format` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::MessagePack => "msgpack",
        }
    }

    fn from_column(s: &str) -> Option<Self> {
        match s {
            "json" => Some(Self::Json),
            "msgpack" => Some(Self::MessagePack),
            _ => None,
        }
    }

    /// Encode `data`.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Serialization`] if encoding fails.
    pub fn encode(self, data: &LearningData) -> Result<Vec<u8>> {
        match self {
            Self::Json => serde_json::to_vec(data).map_err(|e| AutonpcError::Serialization(e.to_string())),
            Self::MessagePack => {
                rmp_serde::to_vec_named(data).map_err(|e| AutonpcError::Serialization(e.to_string()))
            }
        }
    }

    /// Decode a blob written by [`BlobFormat::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Serialization`] if the bytes are not a valid blob.
    pub fn decode(self, bytes: &[u8]) -> Result<LearningData> {
        match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| AutonpcError::Serialization(e.to_string())),
            Self::MessagePack => {
                rmp_serde::from_slice(bytes).map_err(|e| AutonpcError::Serialization(e.to_string()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 of `data` as lowercase hex.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// Basic CRC-32 (ISO 3309 / ITU-T V.42).
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }
    !crc
}

/// Table names are spliced into SQL, so only plain identifiers are allowed.
fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name.len() <= 64 {
        Ok(())
    } else {
        Err(AutonpcError::Config(format!("invalid learning data table name: {name:?}")))
    }
}

// ---------------------------------------------------------------------------
// LearningDb
// ---------------------------------------------------------------------------

/// Handle to an SQLite database of [`LearningData`] blobs.
///
/// ```no_run
/// # use autonpc_core::persistence::{LearningDb, LearningData};
/// # use autonpc_core::config::PersistenceConfig;
/// # use autonpc_core::types::CreatureGuid;
/// let db = LearningDb::open("learning.db", &PersistenceConfig::default())?;
/// db.save(CreatureGuid(42), &LearningData::default())?;
/// let loaded = db.load(CreatureGuid(42))?;
/// # Ok::<(), autonpc_core::AutonpcError>(())
/// ```
pub struct LearningDb {
    conn: Connection,
    config: PersistenceConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for LearningDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningDb")
            .field("db_path", &self.db_path)
            .field("table", &self.config.learning_data_table)
            .finish_non_exhaustive()
    }
}

impl LearningDb {
    /// Open (or create) the database at `path` and ensure the table exists.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Config`] for an invalid table name, or
    /// [`AutonpcError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        validate_table_name(&config.learning_data_table)?;
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;

        let db = Self {
            conn,
            config: config.clone(),
            db_path,
        };
        db.create_schema()?;

        info!(
            path = %db.db_path.display(),
            table = %db.config.learning_data_table,
            wal = db.config.wal_mode,
            "Learning database opened"
        );
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Config`] for an invalid table name, or
    /// [`AutonpcError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        validate_table_name(&config.learning_data_table)?;
        let db = Self {
            conn: Connection::open_in_memory()?,
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                creature_guid INTEGER PRIMARY KEY,
                format        TEXT NOT NULL,
                data          BLOB NOT NULL,
                updated_at    TEXT NOT NULL,
                checksum      TEXT
            );",
            table = self.config.learning_data_table
        ))?;
        Ok(())
    }

    fn table(&self) -> &str {
        &self.config.learning_data_table
    }

    /// Save (upsert) a creature's learning data in the configured format.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Serialization`] if encoding fails, or
    /// [`AutonpcError::Database`] on SQLite failures.
    pub fn save(&self, guid: CreatureGuid, data: &LearningData) -> Result<()> {
        let start = Instant::now();
        let format = self.config.format;
        let blob = format.encode(data)?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&blob));
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            &format!(
                "INSERT INTO {table} (creature_guid, format, data, updated_at, checksum)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(creature_guid) DO UPDATE SET
                    format = excluded.format,
                    data = excluded.data,
                    updated_at = excluded.updated_at,
                    checksum = excluded.checksum",
                table = self.table()
            ),
            params![guid_to_sql(guid), format.as_str(), blob, now, checksum],
        )?;

        debug!(
            creature = %guid,
            combats = data.total_combats,
            bytes = blob.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved learning data"
        );
        Ok(())
    }

    /// Load a creature's learning data, `None` if nothing is stored.
    ///
    /// Rows are decoded in the format they were written with. A checksum
    /// mismatch is logged and the data is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Serialization`] if the blob cannot be decoded,
    /// or [`AutonpcError::Database`] on SQLite failures.
    pub fn load(&self, guid: CreatureGuid) -> Result<Option<LearningData>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT format, data, checksum FROM {table} WHERE creature_guid = ?1",
            table = self.table()
        ))?;
        let row: Option<(String, Vec<u8>, Option<String>)> = stmt
            .query_row(params![guid_to_sql(guid)], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;

        let Some((format, blob, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.config.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&blob);
                if expected != actual {
                    warn!(
                        creature = %guid,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, learning data may be corrupt"
                    );
                }
            }
        }

        let format = BlobFormat::from_column(&format)
            .ok_or_else(|| AutonpcError::Serialization(format!("unknown blob format {format:?}")))?;
        format.decode(&blob).map(Some)
    }

    /// Load a creature's learning data, failing if none is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::NotFound`] when no row exists, plus the
    /// errors of [`LearningDb::load`].
    pub fn load_required(&self, guid: CreatureGuid) -> Result<LearningData> {
        self.load(guid)?.ok_or(AutonpcError::NotFound(guid))
    }

    /// Delete a creature's row. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Database`] on SQLite failures.
    pub fn delete(&self, guid: CreatureGuid) -> Result<bool> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {table} WHERE creature_guid = ?1", table = self.table()),
            params![guid_to_sql(guid)],
        )?;
        Ok(deleted > 0)
    }

    /// Every creature with stored learning data.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Database`] on SQLite failures.
    pub fn list(&self) -> Result<Vec<CreatureGuid>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT creature_guid FROM {table} ORDER BY creature_guid",
            table = self.table()
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let mut guids = Vec::new();
        for row in rows {
            guids.push(guid_from_sql(row?));
        }
        Ok(guids)
    }

    /// Number of stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`AutonpcError::Database`] on SQLite failures.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table}", table = self.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Path of the database file (`:memory:` for in-memory databases).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

// SQLite integers are signed; GUIDs are stored bit-for-bit.
#[allow(clippy::cast_possible_wrap)]
fn guid_to_sql(guid: CreatureGuid) -> i64 {
    guid.0 as i64
}

#[allow(clippy::cast_sign_loss)]
fn guid_from_sql(raw: i64) -> CreatureGuid {
    CreatureGuid(raw as u64)
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Fire-and-forget destination for learning-data flushes.
///
/// Implementations must not panic; failures are logged and reported as
/// `false` so the caller can count them.
pub trait LearningSink {
    /// Persist `data` for `guid`. Returns `true` on success.
    fn persist(&mut self, guid: CreatureGuid, data: &LearningData) -> bool;

    /// Previously persisted data for `guid`, if any.
    fn fetch(&mut self, guid: CreatureGuid) -> Option<LearningData>;
}

impl LearningSink for Rc<LearningDb> {
    fn persist(&mut self, guid: CreatureGuid, data: &LearningData) -> bool {
        match self.save(guid, data) {
            Ok(()) => true,
            Err(e) => {
                warn!(creature = %guid, error = %e, "Failed to persist learning data");
                false
            }
        }
    }

    fn fetch(&mut self, guid: CreatureGuid) -> Option<LearningData> {
        match self.load(guid) {
            Ok(data) => data,
            Err(e) => {
                warn!(creature = %guid, error = %e, "Failed to load learning data");
                None
            }
        }
    }
}

/// In-process sink keeping the latest blob per creature.
///
/// Clones share storage, so a test can hand one clone to an agent and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    store: Rc<RefCell<BTreeMap<CreatureGuid, LearningData>>>,
    writes: Rc<RefCell<u64>>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest data persisted for `guid`.
    #[must_use]
    pub fn get(&self, guid: CreatureGuid) -> Option<LearningData> {
        self.store.borrow().get(&guid).cloned()
    }

    /// Total `persist` calls observed.
    #[must_use]
    pub fn writes(&self) -> u64 {
        *self.writes.borrow()
    }
}

impl LearningSink for MemorySink {
    fn persist(&mut self, guid: CreatureGuid, data: &LearningData) -> bool {
        self.store.borrow_mut().insert(guid, data.clone());
        *self.writes.borrow_mut() += 1;
        true
    }

    fn fetch(&mut self, guid: CreatureGuid) -> Option<LearningData> {
        self.get(guid)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LearningData {
        let mut data = LearningData {
            total_combats: 12,
            wins: 7,
            losses: 4,
            average_combat_time_ms: 12_345.678_901_234_5,
            primary_role: Some(Role::CasterDps),
            visited_zones: vec![ZoneId(12), ZoneId(1519)],
            learned_phrases: vec!["Well met!".into(), "For the Alliance".into()],
            ..LearningData::default()
        };
        data.spell_success_rates.insert(SpellId(133), 0.1 + 0.2);
        data.spell_casts.insert(SpellId(133), 9);
        data.role_affinities.insert(Role::CasterDps, 3.141_592_7);
        data.role_affinities.insert(Role::Tank, 0.0);
        data.zone_preferences.insert(ZoneId(12), 3);
        data.zone_preferences.insert(ZoneId(1519), 1);
        data.relationship_values.insert(PlayerGuid(77), -35);
        data
    }

    fn config(format: BlobFormat) -> PersistenceConfig {
        PersistenceConfig {
            format,
            ..PersistenceConfig::default()
        }
    }

    #[test]
    fn json_and_msgpack_round_trip_exactly() {
        let data = sample();
        for format in [BlobFormat::Json, BlobFormat::MessagePack] {
            let bytes = format.encode(&data).expect("encode");
            assert_eq!(format.decode(&bytes).expect("decode"), data, "{format:?}");
        }
    }

    #[test]
    fn json_missing_fields_default() {
        let data = BlobFormat::Json.decode(br#"{"total_combats": 3}"#).expect("decode");
        assert_eq!(data.total_combats, 3);
        assert!(data.spell_casts.is_empty());
    }

    #[test]
    fn save_load_upsert_delete() {
        let db = LearningDb::open_in_memory(&config(BlobFormat::Json)).expect("open");
        let guid = CreatureGuid(9001);
        assert!(db.load(guid).expect("load").is_none());

        db.save(guid, &sample()).expect("save");
        let mut updated = sample();
        updated.total_combats = 13;
        db.save(guid, &updated).expect("upsert");

        assert_eq!(db.load(guid).expect("load"), Some(updated));
        assert_eq!(db.count().expect("count"), 1);
        assert!(db.delete(guid).expect("delete"));
        assert!(!db.delete(guid).expect("delete again"));
        assert!(matches!(db.load_required(guid), Err(AutonpcError::NotFound(g)) if g == guid));
    }

    #[test]
    fn rows_decode_with_their_own_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("learning.db");
        let guid = CreatureGuid(5);
        {
            let db = LearningDb::open(&path, &config(BlobFormat::MessagePack)).expect("open");
            db.save(guid, &sample()).expect("save");
        }
        let db = LearningDb::open(&path, &config(BlobFormat::Json)).expect("reopen");
        assert_eq!(db.load(guid).expect("load"), Some(sample()));
    }

    #[test]
    fn checksum_mismatch_still_loads() {
        let db = LearningDb::open_in_memory(&config(BlobFormat::Json)).expect("open");
        let guid = CreatureGuid(3);
        db.save(guid, &sample()).expect("save");
        db.conn
            .execute(
                "UPDATE autonomous_npc_learning SET checksum = 'deadbeef' WHERE creature_guid = ?1",
                params![3_i64],
            )
            .expect("corrupt checksum");
        assert_eq!(db.load(guid).expect("load"), Some(sample()));
    }

    #[test]
    fn list_is_sorted_and_handles_large_guids() {
        let db = LearningDb::open_in_memory(&config(BlobFormat::Json)).expect("open");
        for g in [u64::MAX, 2, 40] {
            db.save(CreatureGuid(g), &LearningData::default()).expect("save");
        }
        let listed = db.list().expect("list");
        assert_eq!(listed.len(), 3);
        assert!(listed.contains(&CreatureGuid(u64::MAX)));
        assert!(db.load(CreatureGuid(u64::MAX)).expect("load").is_some());
    }

    #[test]
    fn table_name_is_validated() {
        let mut cfg = PersistenceConfig::default();
        cfg.learning_data_table = "npc; DROP TABLE x".into();
        assert!(matches!(LearningDb::open_in_memory(&cfg), Err(AutonpcError::Config(_))));
        cfg.learning_data_table = "npc_learning_v2".into();
        assert!(LearningDb::open_in_memory(&cfg).is_ok());
    }

    #[test]
    fn memory_sink_shares_storage_between_clones() {
        let sink = MemorySink::new();
        let mut handle = sink.clone();
        assert!(handle.persist(CreatureGuid(1), &sample()));
        assert_eq!(sink.get(CreatureGuid(1)), Some(sample()));
        assert_eq!(sink.writes(), 1);
    }

    #[test]
    fn crc32_known_vector() {
        assert_eq!(crc32_compute(b"123456789"), 0xCBF4_3926);
    }
}
