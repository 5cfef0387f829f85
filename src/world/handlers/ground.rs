use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Ground, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS ground (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  exposed BOOLEAN NOT NULL,
  image VARCHAR(255)
);
"#];

pub struct GroundHandler;

impl FixtureHandler for GroundHandler {
    fn name(&self) -> &'static str {
        "ground"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["ground"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Ground(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Ground(ground) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO ground (\"row\", \"column\", id, kind, exposed, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                point.row,
                point.column,
                ground.id,
                ground.kind,
                ground.exposed,
                ground.image
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
        read_rows(conn, "ground", |row| {
            let ground = Ground {
                id: row.get("id")?,
                kind: row.get("kind")?,
                exposed: row.get("exposed")?,
                image: row.get("image")?,
            };
            resolution.register_id(ground.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Ground(ground));
            Ok(())
        })
    }
}
