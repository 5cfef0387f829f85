use rusqlite::{params, Connection};

use crate::model::{Fortress, FixtureRef, GameMap};
use crate::world::codes::{town_size_from_str, town_size_to_str};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::{Container, Location, ResolutionContext};
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS fortresses (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  owner INTEGER NOT NULL,
  name VARCHAR(128) NOT NULL,
  size VARCHAR(6) NOT NULL CHECK (size IN ('small', 'medium', 'large')),
  id INTEGER NOT NULL,
  portrait VARCHAR(255),
  image VARCHAR(255)
);
"#];

/// Fortresses, written together with every unit, pile and implement inside.
pub struct FortressHandler;

impl FixtureHandler for FortressHandler {
    fn name(&self) -> &'static str {
        "fortresses"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["fortresses"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Fortress(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Fortress(fortress) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO fortresses (\"row\", \"column\", owner, name, size, id, portrait, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                point.row,
                point.column,
                fortress.owner,
                fortress.name,
                town_size_to_str(fortress.size),
                fortress.id,
                fortress.portrait,
                fortress.image
            ],
        )?;
        let inside = Context::owner(fortress.id, OwnerKind::Fortress);
        for member in fortress.members.values() {
            uow.write(member.as_fixture(), inside)?;
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
        read_rows(conn, "fortresses", |row| {
            let fortress = Fortress {
                size: town_size_from_str(&row.get::<_, String>("size")?)?,
                portrait: row.get("portrait")?,
                image: row.get("image")?,
                ..Fortress::new(row.get("id")?, row.get::<_, String>("name")?, row.get("owner")?)
            };
            resolution.register_id(fortress.id, warnings);
            resolution.add_container(Location::Point(row_point(row)?), Container::Fortress(fortress));
            Ok(())
        })
    }
}
