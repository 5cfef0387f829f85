use rusqlite::{params, Connection};

use crate::model::{CacheFixture, FixtureRef, GameMap, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS caches (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  contents VARCHAR(512) NOT NULL,
  image VARCHAR(255)
);
"#];

pub struct CacheHandler;

impl FixtureHandler for CacheHandler {
    fn name(&self) -> &'static str {
        "caches"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["caches"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Cache(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Cache(cache) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO caches (\"row\", \"column\", id, kind, contents, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                point.row,
                point.column,
                cache.id,
                cache.kind,
                cache.contents,
                cache.image
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
        read_rows(conn, "caches", |row| {
            let cache = CacheFixture {
                id: row.get("id")?,
                kind: row.get("kind")?,
                contents: row.get("contents")?,
                image: row.get("image")?,
            };
            resolution.register_id(cache.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Cache(cache));
            Ok(())
        })
    }
}
