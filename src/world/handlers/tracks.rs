use rusqlite::{params, Connection};

use crate::model::{AnimalTracks, FixtureRef, GameMap, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS tracks (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  image VARCHAR(255)
);
"#];

pub struct TracksHandler;

impl FixtureHandler for TracksHandler {
    fn name(&self) -> &'static str {
        "tracks"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["tracks"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::AnimalTracks(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::AnimalTracks(tracks) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO tracks (\"row\", \"column\", id, kind, image) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![point.row, point.column, tracks.id, tracks.kind, tracks.image],
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
        read_rows(conn, "tracks", |row| {
            let tracks = AnimalTracks {
                id: row.get("id")?,
                kind: row.get("kind")?,
                image: row.get("image")?,
            };
            resolution.register_id(tracks.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::AnimalTracks(tracks));
            Ok(())
        })
    }
}
