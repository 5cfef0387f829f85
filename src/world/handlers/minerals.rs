use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, MineralVein, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS minerals (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(64) NOT NULL,
  exposed BOOLEAN NOT NULL,
  dc INTEGER NOT NULL,
  image VARCHAR(255)
);
"#];

pub struct MineralHandler;

impl FixtureHandler for MineralHandler {
    fn name(&self) -> &'static str {
        "minerals"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["minerals"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::MineralVein(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::MineralVein(vein) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO minerals (\"row\", \"column\", id, kind, exposed, dc, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                point.row,
                point.column,
                vein.id,
                vein.kind,
                vein.exposed,
                vein.dc,
                vein.image
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
        read_rows(conn, "minerals", |row| {
            let vein = MineralVein {
                id: row.get("id")?,
                kind: row.get("kind")?,
                exposed: row.get("exposed")?,
                dc: row.get("dc")?,
                image: row.get("image")?,
            };
            resolution.register_id(vein.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::MineralVein(vein));
            Ok(())
        })
    }
}
