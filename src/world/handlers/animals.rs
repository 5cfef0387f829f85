use rusqlite::{params, Connection};

use crate::model::{Animal, FixtureRef, GameMap, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::unexpected;
use crate::world::resolve::{Location, Member, ResolutionContext};
use crate::world::rows::{read_rows, row_location};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS animals (
  "row" INTEGER,
  "column" INTEGER,
  parent INTEGER,
  id INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  talking BOOLEAN NOT NULL,
  status VARCHAR(32) NOT NULL,
  born INTEGER,
  population INTEGER NOT NULL CHECK (population >= 0),
  image VARCHAR(255),
  CHECK (("row" IS NOT NULL AND "column" IS NOT NULL AND parent IS NULL)
      OR ("row" IS NULL AND "column" IS NULL AND parent IS NOT NULL))
);
"#];

/// Animals roam tiles, travel with units, or serve as a worker's mount.
pub struct AnimalHandler;

impl FixtureHandler for AnimalHandler {
    fn name(&self) -> &'static str {
        "animals"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["animals"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Animal(_))
            && (context.is_point() || context.is_owned_by(&[OwnerKind::Unit, OwnerKind::Worker]))
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Animal(animal) = fixture else {
            return Err(unexpected(fixture));
        };
        let born = animal
            .born
            .filter(|born| {
                uow.config()
                    .should_store_birth(&animal.kind, *born, uow.current_turn())
            });
        let (row, column, parent) = context.columns();
        uow.conn().execute(
            "INSERT INTO animals (\"row\", \"column\", parent, id, kind, talking, status, born, population, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row,
                column,
                parent,
                animal.id,
                animal.kind,
                animal.talking,
                animal.status,
                born,
                animal.population,
                animal.image
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
        read_rows(conn, "animals", |row| {
            let animal = Animal {
                id: row.get("id")?,
                kind: row.get("kind")?,
                talking: row.get("talking")?,
                status: row.get("status")?,
                born: row.get("born")?,
                population: row.get("population")?,
                image: row.get("image")?,
            };
            resolution.register_id(animal.id, warnings);
            match row_location(row)? {
                Location::Point(point) => map.add_fixture(point, TileFixture::Animal(animal)),
                Location::Parent(owner) => resolution.add_containee(owner, Member::Animal(animal)),
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MapDimensions, Point};
    use crate::world::sqlite::MapDb;
    use crate::world::warning::WarningLog;
    use crate::world::MapDbConfig;

    fn colt(born: i32) -> Animal {
        Animal {
            born: Some(born),
            status: "domesticated".to_string(),
            ..Animal::new(11, "horse")
        }
    }

    fn round_trip(current_turn: i32, animal: Animal) -> Option<i32> {
        let mut db = MapDb::open_in_memory(MapDbConfig::default()).unwrap();
        let mut map = GameMap::new(MapDimensions::new(5, 5, 2), current_turn);
        map.add_fixture(Point::new(1, 1), TileFixture::Animal(animal));
        db.write_map(&map, &mut WarningLog::default()).unwrap();
        let read = db.read_map(&mut WarningLog::default()).unwrap();
        match read.fixture_at(Point::new(1, 1), 11) {
            Some(TileFixture::Animal(animal)) => animal.born,
            other => panic!("expected animal, got {:?}", other),
        }
    }

    #[test]
    fn young_animals_keep_their_birth_turn() {
        assert_eq!(round_trip(15, colt(10)), Some(10));
    }

    #[test]
    fn adult_animals_drop_their_birth_turn() {
        assert_eq!(round_trip(30, colt(10)), None);
    }

    #[test]
    fn birth_is_kept_when_turn_is_unknown() {
        assert_eq!(round_trip(-1, colt(10)), Some(10));
    }
}
