use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Implement};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{owner_of, unexpected};
use crate::world::resolve::{Member, ResolutionContext};
use crate::world::rows::read_rows;
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS implements (
  parent INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(255) NOT NULL,
  count INTEGER NOT NULL DEFAULT 1,
  image VARCHAR(255)
);
"#];

/// Equipment carried by a unit, stored in a fortress, or held by a worker.
pub struct ImplementHandler;

impl FixtureHandler for ImplementHandler {
    fn name(&self) -> &'static str {
        "implements"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["implements"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Implement(_))
            && context.is_owned_by(&[OwnerKind::Unit, OwnerKind::Fortress, OwnerKind::Worker])
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Implement(implement) = fixture else {
            return Err(unexpected(fixture));
        };
        let parent = owner_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO implements (parent, id, kind, count, image) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                parent,
                implement.id,
                implement.kind,
                implement.count,
                implement.image
            ],
        )?;
        Ok(())
    }

    fn read(
        &self,
        conn: &Connection,
        _map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        read_rows(conn, "implements", |row| {
            let implement = Implement {
                id: row.get("id")?,
                kind: row.get("kind")?,
                count: row.get("count")?,
                image: row.get("image")?,
            };
            resolution.register_id(implement.id, warnings);
            resolution.add_containee(row.get("parent")?, Member::Implement(implement));
            Ok(())
        })
    }
}
