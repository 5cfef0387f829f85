use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Shrub, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS shrubs (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(64) NOT NULL,
  count INTEGER,
  image VARCHAR(255)
);
"#];

pub struct ShrubHandler;

impl FixtureHandler for ShrubHandler {
    fn name(&self) -> &'static str {
        "shrubs"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["shrubs"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Shrub(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Shrub(shrub) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        // -1 is the only way to say "unknown"; it is stored as NULL.
        if shrub.population < -1 {
            return Err(MapDbError::InvalidData(format!(
                "shrub {} has population {}",
                shrub.id, shrub.population
            )));
        }
        let count = (shrub.population >= 0).then_some(shrub.population);
        uow.conn().execute(
            "INSERT INTO shrubs (\"row\", \"column\", id, kind, count, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![point.row, point.column, shrub.id, shrub.kind, count, shrub.image],
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
        read_rows(conn, "shrubs", |row| {
            let shrub = Shrub {
                id: row.get("id")?,
                kind: row.get("kind")?,
                population: row.get::<_, Option<i32>>("count")?.unwrap_or(-1),
                image: row.get("image")?,
            };
            resolution.register_id(shrub.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Shrub(shrub));
            Ok(())
        })
    }
}
