//! Store-level schema bookkeeping: the schema version and the forward
//! migrations that bring an older store up to date before it is used.

use rusqlite::{params, Connection, OptionalExtension};

use crate::world::error::MapDbError;
use crate::world::handlers::immortals;
use crate::world::players;

pub const SCHEMA_VERSION: i64 = 3;

const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  version INTEGER NOT NULL
);
"#;

struct Migration {
    version: i64,
    name: &'static str,
    apply: fn(&Connection) -> Result<(), MapDbError>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "baseline",
        apply: baseline,
    },
    Migration {
        version: 2,
        name: "players country column",
        apply: players::add_country_column_if_missing,
    },
    Migration {
        version: 3,
        name: "widen simple immortal types",
        apply: immortals::widen_simple_immortals_if_needed,
    },
];

fn baseline(_conn: &Connection) -> Result<(), MapDbError> {
    Ok(())
}

pub fn is_missing_table(err: &rusqlite::Error) -> bool {
    err.to_string().contains("no such table")
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, MapDbError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, MapDbError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// The `CREATE TABLE` statement a table was created with.
pub fn table_sql(conn: &Connection, table: &str) -> Result<Option<String>, MapDbError> {
    Ok(conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn stored_version(conn: &Connection) -> Result<i64, MapDbError> {
    if !table_exists(conn, "schema_version")? {
        return Ok(0);
    }
    let version = conn
        .query_row(
            "SELECT version FROM schema_version WHERE id = 1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(version.unwrap_or(0))
}

/// Applies every migration newer than the store's recorded version, in one
/// transaction, and records the new version.
pub fn migrate(conn: &mut Connection) -> Result<i64, MapDbError> {
    let stored = stored_version(conn)?;
    if stored > SCHEMA_VERSION {
        return Err(MapDbError::UnsupportedVersion {
            found: stored,
            supported: SCHEMA_VERSION,
        });
    }
    if stored == SCHEMA_VERSION {
        return Ok(stored);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_VERSION_TABLE)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > stored) {
        (migration.apply)(&tx)?;
        tracing::info!(
            version = migration.version,
            migration = migration.name,
            "applied schema migration"
        );
    }
    tx.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
        params![SCHEMA_VERSION],
    )?;
    tx.commit()?;
    Ok(SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrating_twice_is_harmless() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(migrate(&mut conn).unwrap(), SCHEMA_VERSION);
        assert_eq!(migrate(&mut conn).unwrap(), SCHEMA_VERSION);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn newer_store_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_VERSION_TABLE).unwrap();
        conn.execute(
            "INSERT INTO schema_version (id, version) VALUES (1, ?1)",
            params![SCHEMA_VERSION + 1],
        )
        .unwrap();
        assert!(matches!(
            migrate(&mut conn),
            Err(MapDbError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn missing_table_errors_are_recognized() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.prepare("SELECT * FROM nowhere").unwrap_err();
        assert!(is_missing_table(&err));
        assert!(!table_exists(&conn, "nowhere").unwrap());
    }
}
