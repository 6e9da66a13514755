use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::models::Rotation;
use crate::snapshot::normalize;

/// Fixed key the active rotation is stored under.
pub const STORAGE_KEY: &str = "rota-state-v1";

/// Snapshot repository for store operations
///
/// The rotation is persisted as one opaque JSON value under `STORAGE_KEY`.
/// Reads run the stored value through normalization, so a `Rotation`
/// handed out here is always well formed no matter what another process
/// (or an older version) wrote. Writes are fire-and-forget: persistence
/// failure never interrupts whatever the user was doing.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Raw stored value, if any. A row that does not parse as JSON counts
    /// as absent.
    pub fn load_raw(conn: &Connection) -> Result<Option<Value>> {
        let text: Option<String> = conn
            .query_row(
                "SELECT value FROM snapshots WHERE key = ?1",
                [STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read snapshot row")?;

        match text {
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    log::debug!("stored snapshot is not JSON, treating as absent: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Load the active rotation: the stored snapshot run through
    /// normalization, or defaults when nothing usable is stored. A
    /// snapshot that needed repair is saved back in repaired form.
    pub fn load(conn: &Connection) -> Result<Rotation> {
        let value = match Self::load_raw(conn)? {
            Some(value) => value,
            None => return Ok(Rotation::default()),
        };

        let normalized = normalize(&value);
        if !normalized.is_clean() {
            log::debug!(
                "stored snapshot repaired; defaulted fields: {}",
                normalized.defaulted.join(", ")
            );
            Self::save(conn, &normalized.rotation);
        }
        Ok(normalized.rotation)
    }

    /// Persist a rotation. Failures are logged and swallowed; the
    /// in-memory rotation stays usable either way.
    pub fn save(conn: &Connection, rotation: &Rotation) {
        if let Err(e) = Self::try_save(conn, rotation) {
            log::debug!("snapshot save failed (ignored): {:#}", e);
        }
    }

    fn try_save(conn: &Connection, rotation: &Rotation) -> Result<()> {
        let text = serde_json::to_string(rotation).context("Failed to serialize snapshot")?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO snapshots (key, value, updated_ts) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_ts = excluded.updated_ts",
            rusqlite::params![STORAGE_KEY, text, now],
        )
        .context("Failed to write snapshot row")?;
        Ok(())
    }
}
