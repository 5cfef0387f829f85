use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Grove, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS groves (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  type VARCHAR(7) NOT NULL CHECK (type IN ('grove', 'orchard')),
  kind VARCHAR(64) NOT NULL,
  cultivated BOOLEAN NOT NULL,
  count INTEGER NOT NULL,
  image VARCHAR(255)
);
"#];

pub struct GroveHandler;

impl FixtureHandler for GroveHandler {
    fn name(&self) -> &'static str {
        "groves"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["groves"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Grove(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Grove(grove) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO groves (\"row\", \"column\", id, type, kind, cultivated, count, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                point.row,
                point.column,
                grove.id,
                if grove.orchard { "orchard" } else { "grove" },
                grove.kind,
                grove.cultivated,
                grove.population,
                grove.image
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
        read_rows(conn, "groves", |row| {
            let grove = Grove {
                id: row.get("id")?,
                kind: row.get("kind")?,
                orchard: row.get::<_, String>("type")? == "orchard",
                cultivated: row.get("cultivated")?,
                population: row.get("count")?,
                image: row.get("image")?,
            };
            resolution.register_id(grove.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Grove(grove));
            Ok(())
        })
    }
}
