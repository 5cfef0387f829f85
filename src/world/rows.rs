use rusqlite::types::FromSql;
use rusqlite::{Connection, Row};

use crate::model::Point;
use crate::world::error::MapDbError;
use crate::world::resolve::Location;
use crate::world::schema::is_missing_table;

/// Runs `SELECT *` over a table and feeds each row to `f`. A table that does
/// not exist yet simply has no rows.
pub fn read_rows<F>(conn: &Connection, table: &str, mut f: F) -> Result<(), MapDbError>
where
    F: FnMut(&Row<'_>) -> Result<(), MapDbError>,
{
    let mut stmt = match conn.prepare(&format!("SELECT * FROM \"{}\"", table)) {
        Ok(stmt) => stmt,
        Err(err) if is_missing_table(&err) => {
            tracing::debug!(table, "table absent, nothing to read");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        f(row)?;
    }
    Ok(())
}

/// Reads a column that older stores may lack.
pub fn optional_column<T: FromSql>(row: &Row<'_>, name: &str) -> rusqlite::Result<Option<T>> {
    match row.as_ref().column_index(name) {
        Ok(index) => row.get(index),
        Err(_) => Ok(None),
    }
}

pub fn row_point(row: &Row<'_>) -> Result<Point, MapDbError> {
    Ok(Point::new(row.get("row")?, row.get("column")?))
}

pub fn row_location(row: &Row<'_>) -> Result<Location, MapDbError> {
    let r: Option<i32> = row.get("row")?;
    let c: Option<i32> = row.get("column")?;
    let parent: Option<u32> = optional_column(row, "parent")?;
    match (r, c, parent) {
        (Some(r), Some(c), None) => Ok(Location::Point(Point::new(r, c))),
        (None, None, Some(parent)) => Ok(Location::Parent(parent)),
        _ => Err(MapDbError::InvalidData(format!(
            "row {:?} is rooted neither at a tile nor in a parent",
            row.get::<_, Option<i64>>("id").ok().flatten()
        ))),
    }
}
