use rusqlite::{params, Connection};

use crate::model::{Battlefield, Cave, FixtureRef, GameMap, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS caves (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  dc INTEGER,
  image VARCHAR(255)
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS battlefields (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  dc INTEGER,
  image VARCHAR(255)
);
"#,
];

/// Caves and battlefields: same shape, separate tables.
pub struct ExplorableHandler;

impl FixtureHandler for ExplorableHandler {
    fn name(&self) -> &'static str {
        "explorables"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["caves", "battlefields"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Cave(_) | FixtureRef::Battlefield(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let point = point_of(fixture, context)?;
        let (table, id, dc, image) = match fixture {
            FixtureRef::Cave(cave) => ("caves", cave.id, cave.dc, &cave.image),
            FixtureRef::Battlefield(field) => ("battlefields", field.id, field.dc, &field.image),
            _ => return Err(unexpected(fixture)),
        };
        uow.conn().execute(
            &format!(
                "INSERT INTO {} (\"row\", \"column\", id, dc, image) VALUES (?1, ?2, ?3, ?4, ?5)",
                table
            ),
            params![point.row, point.column, id, dc, image],
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
        read_rows(conn, "caves", |row| {
            let cave = Cave {
                id: row.get("id")?,
                dc: row.get::<_, Option<i32>>("dc")?.unwrap_or(0),
                image: row.get("image")?,
            };
            resolution.register_id(cave.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Cave(cave));
            Ok(())
        })?;
        read_rows(conn, "battlefields", |row| {
            let battlefield = Battlefield {
                id: row.get("id")?,
                dc: row.get::<_, Option<i32>>("dc")?.unwrap_or(0),
                image: row.get("image")?,
            };
            resolution.register_id(battlefield.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Battlefield(battlefield));
            Ok(())
        })
    }
}
