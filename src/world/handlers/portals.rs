use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Point, Portal, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS portals (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  image VARCHAR(255),
  destination_world VARCHAR(16),
  destination_row INTEGER,
  destination_column INTEGER CHECK ((destination_row IS NULL) = (destination_column IS NULL))
);
"#];

/// Portals to another world; the far end's coordinates may be unknown.
pub struct PortalHandler;

impl FixtureHandler for PortalHandler {
    fn name(&self) -> &'static str {
        "portals"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["portals"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Portal(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Portal(portal) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO portals (\"row\", \"column\", id, image, destination_world, destination_row, destination_column) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                point.row,
                point.column,
                portal.id,
                portal.image,
                portal.destination_world,
                portal.destination.map(|p| p.row),
                portal.destination.map(|p| p.column)
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
        read_rows(conn, "portals", |row| {
            let destination = match (
                row.get::<_, Option<i32>>("destination_row")?,
                row.get::<_, Option<i32>>("destination_column")?,
            ) {
                (Some(r), Some(c)) => Some(Point::new(r, c)),
                _ => None,
            };
            let portal = Portal {
                id: row.get("id")?,
                destination_world: row
                    .get::<_, Option<String>>("destination_world")?
                    .unwrap_or_default(),
                destination,
                image: row.get("image")?,
            };
            resolution.register_id(portal.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Portal(portal));
            Ok(())
        })
    }
}
