use crate::{Error, Result};
use rusqlite::Connection as SqliteConnection;
use std::path::{Path, PathBuf};

pub type Connection = SqliteConnection;

/// Schema version written by `schema.sql`
pub const SCHEMA_VERSION: i32 = 1;

/// Database manager for the local storage file
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    /// Create a new database manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Get a connection to the database
    pub fn connect(&self) -> Result<Connection> {
        let conn = SqliteConnection::open(&self.db_path)?;
        tracing::debug!(path = %self.db_path.display(), "opened storage database");
        Ok(conn)
    }

    /// Create a new database and initialize it with the schema
    pub fn create(&self) -> Result<Connection> {
        // Ensure parent directory exists
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = SqliteConnection::open(&self.db_path)?;
        Self::initialize_schema(&conn)?;
        tracing::info!(path = %self.db_path.display(), "created storage database");

        Ok(conn)
    }

    /// Initialize the database schema. Idempotent.
    pub fn initialize_schema(conn: &Connection) -> Result<()> {
        let schema = include_str!("../../schema.sql");
        conn.execute_batch(schema)?;
        Ok(())
    }

    /// Check if the database exists
    pub fn exists(&self) -> bool {
        self.db_path.exists()
    }

    /// Get or create a database connection
    pub fn get_or_create(&self) -> Result<Connection> {
        if self.exists() {
            let conn = self.connect()?;
            Self::initialize_schema(&conn)?;
            let version = self.get_schema_version(&conn)?;
            if version != SCHEMA_VERSION {
                tracing::warn!(version, expected = SCHEMA_VERSION, "unsupported storage schema");
                return Err(Error::InvalidInput(format!(
                    "{} has schema version {}, expected {}",
                    self.db_path.display(),
                    version,
                    SCHEMA_VERSION
                )));
            }
            Ok(conn)
        } else {
            self.create()
        }
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get the current schema version
    pub fn get_schema_version(&self, conn: &Connection) -> Result<i32> {
        let version: String = conn.query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;

        version
            .parse::<i32>()
            .map_err(|_| Error::InvalidInput("Invalid schema version".to_string()))
    }

    /// Copy the database file to `backup_path`
    pub fn backup<P: AsRef<Path>>(&self, backup_path: P) -> Result<()> {
        if !self.exists() {
            return Err(Error::NotFound(format!("{}", self.db_path.display())));
        }
        let backup_path = backup_path.as_ref();
        std::fs::copy(&self.db_path, backup_path)?;
        tracing::info!(from = %self.db_path.display(), to = %backup_path.display(), "backed up storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_creation() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::new(&db_path);
        assert!(!db.exists());

        let conn = db.create().unwrap();
        assert!(db.exists());

        let version = db.get_schema_version(&conn).unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("test.db");

        let db = Database::new(&db_path);
        db.create().unwrap();
        assert!(db.exists());
    }

    #[test]
    fn test_get_or_create() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::new(&db_path);

        // First call should create
        let _conn1 = db.get_or_create().unwrap();
        assert!(db.exists());

        // Second call should connect and keep the schema
        let conn2 = db.get_or_create().unwrap();
        assert_eq!(db.get_schema_version(&conn2).unwrap(), 1);
    }

    #[test]
    fn test_backup() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let backup_path = dir.path().join("backup.db");

        let db = Database::new(&db_path);
        db.create().unwrap();

        db.backup(&backup_path).unwrap();
        assert!(backup_path.exists());
    }

    #[test]
    fn test_backup_missing_database() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("absent.db"));
        let result = db.backup(dir.path().join("backup.db"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_get_or_create_rejects_other_schema_version() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(&db_path);

        let conn = db.create().unwrap();
        conn.execute(
            "UPDATE metadata SET value = '2' WHERE key = 'schema_version'",
            [],
        )
        .unwrap();
        drop(conn);

        assert!(matches!(db.get_or_create(), Err(Error::InvalidInput(_))));
    }
}
