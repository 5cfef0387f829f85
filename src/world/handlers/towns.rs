use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Town};
use crate::world::codes::{
    town_kind_from_str, town_kind_to_str, town_size_from_str, town_size_to_str,
    town_status_from_str, town_status_to_str,
};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::{Container, Location, ResolutionContext};
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS towns (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(13) NOT NULL CHECK (kind IN ('town', 'city', 'fortification')),
  status VARCHAR(9) NOT NULL CHECK (status IN ('abandoned', 'active', 'burned', 'ruined')),
  size VARCHAR(6) NOT NULL CHECK (size IN ('small', 'medium', 'large')),
  name VARCHAR(128) NOT NULL,
  owner INTEGER NOT NULL,
  dc INTEGER NOT NULL,
  portrait VARCHAR(255),
  image VARCHAR(255)
);
"#];

/// Towns, cities and fortifications share one table keyed by `kind`.
pub struct TownHandler;

impl FixtureHandler for TownHandler {
    fn name(&self) -> &'static str {
        "towns"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["towns"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Town(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Town(town) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO towns (\"row\", \"column\", id, kind, status, size, name, owner, dc, portrait, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                point.row,
                point.column,
                town.id,
                town_kind_to_str(town.kind),
                town_status_to_str(town.status),
                town_size_to_str(town.size),
                town.name,
                town.owner,
                town.dc,
                town.portrait,
                town.image
            ],
        )?;
        if let Some(stats) = &town.population {
            uow.write(
                FixtureRef::CommunityStats(stats),
                Context::owner(town.id, OwnerKind::Town),
            )?;
        }
        Ok(())
    }

    fn read(
        &self,
        conn: &Connection,
        _map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        read_rows(conn, "towns", |row| {
            let town = Town {
                id: row.get("id")?,
                kind: town_kind_from_str(&row.get::<_, String>("kind")?)?,
                status: town_status_from_str(&row.get::<_, String>("status")?)?,
                size: town_size_from_str(&row.get::<_, String>("size")?)?,
                name: row.get("name")?,
                owner: row.get("owner")?,
                dc: row.get("dc")?,
                portrait: row.get("portrait")?,
                image: row.get("image")?,
                population: None,
            };
            resolution.register_id(town.id, warnings);
            resolution.add_container(Location::Point(row_point(row)?), Container::Town(town));
            Ok(())
        })
    }
}
