use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Village};
use crate::world::codes::{town_status_from_str, town_status_to_str};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::{Container, Location, ResolutionContext};
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS villages (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  status VARCHAR(9) NOT NULL CHECK (status IN ('abandoned', 'active', 'burned', 'ruined')),
  name VARCHAR(128) NOT NULL,
  id INTEGER NOT NULL,
  owner INTEGER NOT NULL,
  race VARCHAR(32) NOT NULL,
  portrait VARCHAR(255),
  image VARCHAR(255)
);
"#];

pub struct VillageHandler;

impl FixtureHandler for VillageHandler {
    fn name(&self) -> &'static str {
        "villages"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["villages"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Village(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Village(village) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO villages (\"row\", \"column\", status, name, id, owner, race, portrait, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                point.row,
                point.column,
                town_status_to_str(village.status),
                village.name,
                village.id,
                village.owner,
                village.race,
                village.portrait,
                village.image
            ],
        )?;
        if let Some(stats) = &village.population {
            uow.write(
                FixtureRef::CommunityStats(stats),
                Context::owner(village.id, OwnerKind::Village),
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
        read_rows(conn, "villages", |row| {
            let village = Village {
                id: row.get("id")?,
                status: town_status_from_str(&row.get::<_, String>("status")?)?,
                name: row.get("name")?,
                owner: row.get("owner")?,
                race: row.get("race")?,
                portrait: row.get("portrait")?,
                image: row.get("image")?,
                population: None,
            };
            resolution.register_id(village.id, warnings);
            resolution.add_container(Location::Point(row_point(row)?), Container::Village(village));
            Ok(())
        })
    }
}
