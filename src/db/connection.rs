use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

use crate::db::migrations::MigrationManager;

/// Snapshot store connection manager
pub struct DbConnection;

impl DbConnection {
    /// Default store location: ~/.rota/rota.db
    pub fn default_path() -> PathBuf {
        Self::home_dir().join(".rota").join("rota.db")
    }

    /// Configuration file path: ~/.rota/rc
    pub fn config_path() -> PathBuf {
        Self::home_dir().join(".rota").join("rc")
    }

    fn home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the store path, honoring a `data.location=` line in the rc
    /// file. Relative locations resolve against the rc file's directory.
    pub fn resolve_path() -> Result<PathBuf> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            return Ok(Self::default_path());
        }

        let config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        for line in config.lines() {
            let line = line.trim();
            if let Some(location) = line.strip_prefix("data.location=") {
                let path = PathBuf::from(location.trim());
                if path.is_relative() {
                    return Ok(config_path
                        .parent()
                        .map(|dir| dir.join(&path))
                        .unwrap_or(path));
                }
                return Ok(path);
            }
        }

        Ok(Self::default_path())
    }

    /// Open the snapshot store, creating it and parent directories if
    /// needed, and bring the schema up to date.
    pub fn connect() -> Result<Connection> {
        let db_path = Self::resolve_path()?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        MigrationManager::initialize(&conn).context("Failed to initialize database schema")?;

        Ok(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn connect_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;

        MigrationManager::initialize(&conn).context("Failed to initialize database schema")?;

        Ok(conn)
    }
}
