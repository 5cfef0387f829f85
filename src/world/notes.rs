use std::collections::BTreeMap;

use rusqlite::{params, Connection};

use crate::world::dispatch::UnitOfWork;
use crate::world::error::MapDbError;
use crate::world::resolve::ResolutionContext;
use crate::world::rows::read_rows;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS notes (
  fixture INTEGER NOT NULL,
  player INTEGER NOT NULL,
  note VARCHAR(2048) NOT NULL,
  PRIMARY KEY (fixture, player)
);
"#];

/// Per-player notes on fixtures, stored apart from the fixture tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotesHandler;

impl NotesHandler {
    pub fn tables(&self) -> &'static [&'static str] {
        &["notes"]
    }

    pub fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: u32,
        notes: &BTreeMap<i32, String>,
    ) -> Result<(), MapDbError> {
        uow.ensure_schema("notes", SCHEMA)?;
        for (player, note) in notes {
            uow.conn().execute(
                "INSERT OR REPLACE INTO notes (fixture, player, note) VALUES (?1, ?2, ?3)",
                params![fixture, player, note],
            )?;
        }
        Ok(())
    }

    pub fn read(
        &self,
        conn: &Connection,
        resolution: &mut ResolutionContext,
    ) -> Result<(), MapDbError> {
        read_rows(conn, "notes", |row| {
            resolution.add_note(row.get("fixture")?, row.get("player")?, row.get("note")?);
            Ok(())
        })
    }
}
