//! Reactive repair of tables whose shape changed after the session opened.
//!
//! Migrations bring a store up to date when it is opened; this catches the
//! stragglers (a table recreated by another tool, say). Each write gets one
//! repair-and-retry; a second failure is fatal.

use rusqlite::Connection;

use crate::world::error::MapDbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Clean,
    Retried,
}

pub fn is_missing_column(err: &rusqlite::Error) -> bool {
    let message = err.to_string();
    message.contains("no such column") || message.contains("has no column named")
}

/// A CHECK failure; uniqueness violations are real errors, not drift.
pub fn is_check_violation(err: &rusqlite::Error) -> bool {
    err.to_string().contains("CHECK constraint failed")
}

pub fn with_recovery<T, F>(
    conn: &Connection,
    table: &'static str,
    detects: fn(&rusqlite::Error) -> bool,
    repair: fn(&Connection) -> Result<(), MapDbError>,
    mut attempt: F,
) -> Result<(T, Recovery), MapDbError>
where
    F: FnMut(&Connection) -> rusqlite::Result<T>,
{
    match attempt(conn) {
        Ok(value) => Ok((value, Recovery::Clean)),
        Err(err) if detects(&err) => {
            tracing::warn!(table, error = %err, "schema drift detected, repairing and retrying once");
            repair(conn)?;
            match attempt(conn) {
                Ok(value) => Ok((value, Recovery::Retried)),
                Err(source) => Err(MapDbError::SchemaDrift { table, source }),
            }
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_b(conn: &Connection) -> Result<(), MapDbError> {
        conn.execute_batch("ALTER TABLE t ADD COLUMN b INTEGER")?;
        Ok(())
    }

    fn no_repair(_conn: &Connection) -> Result<(), MapDbError> {
        Ok(())
    }

    #[test]
    fn repairs_once_then_succeeds() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER)").unwrap();
        let (_, recovery) = with_recovery(&conn, "t", is_missing_column, add_b, |conn| {
            conn.execute("INSERT INTO t (a, b) VALUES (1, 2)", [])
        })
        .unwrap();
        assert_eq!(recovery, Recovery::Retried);
    }

    #[test]
    fn second_failure_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER)").unwrap();
        let mut attempts = 0;
        let result = with_recovery(&conn, "t", is_missing_column, no_repair, |conn| {
            attempts += 1;
            conn.execute("INSERT INTO t (a, b) VALUES (1, 2)", [])
        });
        assert!(matches!(result, Err(MapDbError::SchemaDrift { table: "t", .. })));
        assert_eq!(attempts, 2);
    }

    #[test]
    fn unrelated_errors_are_not_retried() {
        let conn = Connection::open_in_memory().unwrap();
        let result = with_recovery(&conn, "t", is_missing_column, no_repair, |conn| {
            conn.execute("INSERT INTO t (a) VALUES (1)", [])
        });
        assert!(matches!(result, Err(MapDbError::Sqlite(_))));
    }
}
