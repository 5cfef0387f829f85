use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Mine, TileFixture};
use crate::world::codes::{town_status_from_str, town_status_to_str};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS mines (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(128) NOT NULL,
  status VARCHAR(9) NOT NULL CHECK (status IN ('abandoned', 'active', 'burned', 'ruined')),
  image VARCHAR(255)
);
"#];

pub struct MineHandler;

impl FixtureHandler for MineHandler {
    fn name(&self) -> &'static str {
        "mines"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["mines"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Mine(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Mine(mine) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO mines (\"row\", \"column\", id, kind, status, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                point.row,
                point.column,
                mine.id,
                mine.kind,
                town_status_to_str(mine.status),
                mine.image
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
        read_rows(conn, "mines", |row| {
            let mine = Mine {
                id: row.get("id")?,
                kind: row.get("kind")?,
                status: town_status_from_str(&row.get::<_, String>("status")?)?,
                image: row.get("image")?,
            };
            resolution.register_id(mine.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Mine(mine));
            Ok(())
        })
    }
}
