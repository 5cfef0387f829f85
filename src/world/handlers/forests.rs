use rusqlite::{params, Connection};

use crate::model::{FixtureRef, Forest, GameMap, TileFixture};
use crate::world::codes::{decimal_from_sql, decimal_to_sql};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS forests (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  in_rows BOOLEAN NOT NULL,
  acres VARCHAR(128) NOT NULL CHECK (acres NOT GLOB '*[^0-9.]*' AND acres NOT GLOB '*.*.*' AND acres <> ''),
  image VARCHAR(255)
);
"#];

pub struct ForestHandler;

impl FixtureHandler for ForestHandler {
    fn name(&self) -> &'static str {
        "forests"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["forests"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Forest(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Forest(forest) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO forests (\"row\", \"column\", id, kind, in_rows, acres, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                point.row,
                point.column,
                forest.id,
                forest.kind,
                forest.rows,
                decimal_to_sql(&forest.acres, "forest", forest.id)?,
                forest.image
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
        read_rows(conn, "forests", |row| {
            let forest = Forest {
                id: row.get("id")?,
                kind: row.get("kind")?,
                rows: row.get("in_rows")?,
                acres: decimal_from_sql(&row.get::<_, String>("acres")?)?,
                image: row.get("image")?,
            };
            resolution.register_id(forest.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Forest(forest));
            Ok(())
        })
    }
}
