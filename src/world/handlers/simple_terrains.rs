use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Hill, Oasis, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS simple_terrains (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  type VARCHAR(7) NOT NULL CHECK (type IN ('hill', 'oasis')),
  id INTEGER NOT NULL,
  image VARCHAR(255)
);
"#];

/// Terrain features with nothing but an ID: hills and oases.
pub struct SimpleTerrainHandler;

impl FixtureHandler for SimpleTerrainHandler {
    fn name(&self) -> &'static str {
        "simple_terrains"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["simple_terrains"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Hill(_) | FixtureRef::Oasis(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let point = point_of(fixture, context)?;
        let (kind, id, image) = match fixture {
            FixtureRef::Hill(hill) => ("hill", hill.id, &hill.image),
            FixtureRef::Oasis(oasis) => ("oasis", oasis.id, &oasis.image),
            _ => return Err(unexpected(fixture)),
        };
        uow.conn().execute(
            "INSERT INTO simple_terrains (\"row\", \"column\", type, id, image) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![point.row, point.column, kind, id, image],
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
        read_rows(conn, "simple_terrains", |row| {
            let id: u32 = row.get("id")?;
            let image: Option<String> = row.get("image")?;
            let fixture = match row.get::<_, String>("type")?.as_str() {
                "hill" => TileFixture::Hill(Hill { id, image }),
                "oasis" => TileFixture::Oasis(Oasis { id, image }),
                other => {
                    return Err(MapDbError::InvalidData(format!(
                        "unexpected terrain feature {}",
                        other
                    )))
                }
            };
            resolution.register_id(id, warnings);
            map.add_fixture(row_point(row)?, fixture);
            Ok(())
        })
    }
}
