use rusqlite::{params, Connection};

use crate::model::{Adventure, FixtureRef, GameMap, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS adventures (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  brief_description VARCHAR(255) NOT NULL,
  full_description VARCHAR(512) NOT NULL,
  owner INTEGER,
  image VARCHAR(255)
);
"#];

pub struct AdventureHandler;

impl FixtureHandler for AdventureHandler {
    fn name(&self) -> &'static str {
        "adventures"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["adventures"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Adventure(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Adventure(adventure) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO adventures (\"row\", \"column\", id, brief_description, full_description, owner, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                point.row,
                point.column,
                adventure.id,
                adventure.brief,
                adventure.full,
                adventure.owner,
                adventure.image
            ],
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
        read_rows(conn, "adventures", |row| {
            let adventure = Adventure {
                id: row.get("id")?,
                brief: row.get("brief_description")?,
                full: row.get("full_description")?,
                owner: row.get("owner")?,
                image: row.get("image")?,
            };
            resolution.register_id(adventure.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Adventure(adventure));
            Ok(())
        })
    }
}
