use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, TextFixture, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS text_notes (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  turn INTEGER,
  body VARCHAR(1024) NOT NULL,
  image VARCHAR(255)
);
"#];

/// Free-text annotations pinned to a tile, optionally dated by turn.
pub struct TextHandler;

impl FixtureHandler for TextHandler {
    fn name(&self) -> &'static str {
        "text_notes"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["text_notes"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Text(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Text(text) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO text_notes (\"row\", \"column\", id, turn, body, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![point.row, point.column, text.id, text.turn, text.text, text.image],
        )?;
        Ok(())
    }

    fn read(
        &self,
        conn: &Connection,
        map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        read_rows(conn, "text_notes", |row| {
            let text = TextFixture {
                id: row.get("id")?,
                text: row.get("body")?,
                turn: row.get("turn")?,
                image: row.get("image")?,
            };
            resolution.register_id(text.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Text(text));
            Ok(())
        })
    }
}
