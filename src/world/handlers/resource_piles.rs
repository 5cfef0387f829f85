use rusqlite::{params, Connection, Row};

use crate::model::{FixtureRef, GameMap, Quantity, ResourcePile};
use crate::world::codes::{decimal_from_sql, decimal_to_sql};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{owner_of, unexpected};
use crate::world::resolve::{Member, ResolutionContext};
use crate::world::rows::read_rows;
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS resource_piles (
  parent INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(64) NOT NULL,
  contents VARCHAR(64) NOT NULL,
  quantity VARCHAR(128) NOT NULL CHECK (quantity NOT GLOB '*[^0-9.]*' AND quantity NOT GLOB '*.*.*' AND quantity <> ''),
  units VARCHAR(32) NOT NULL,
  created INTEGER,
  image VARCHAR(255)
);
"#];

/// Decodes the pile columns shared with the town production tables.
pub(crate) fn pile_from_row(row: &Row<'_>) -> Result<ResourcePile, MapDbError> {
    Ok(ResourcePile {
        id: row.get("id")?,
        kind: row.get("kind")?,
        contents: row.get("contents")?,
        quantity: Quantity::new(
            decimal_from_sql(&row.get::<_, String>("quantity")?)?,
            row.get::<_, String>("units")?,
        ),
        created: row.get("created")?,
        image: row.get("image")?,
    })
}

/// Resource piles only exist inside a unit or a fortress.
pub struct ResourcePileHandler;

impl FixtureHandler for ResourcePileHandler {
    fn name(&self) -> &'static str {
        "resource_piles"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["resource_piles"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::ResourcePile(_))
            && context.is_owned_by(&[OwnerKind::Unit, OwnerKind::Fortress])
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::ResourcePile(pile) = fixture else {
            return Err(unexpected(fixture));
        };
        let parent = owner_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO resource_piles (parent, id, kind, contents, quantity, units, created, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                parent,
                pile.id,
                pile.kind,
                pile.contents,
                decimal_to_sql(&pile.quantity.number, "resource pile", pile.id)?,
                pile.quantity.units,
                pile.created,
                pile.image
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
        read_rows(conn, "resource_piles", |row| {
            let pile = pile_from_row(row)?;
            resolution.register_id(pile.id, warnings);
            resolution.add_containee(row.get("parent")?, Member::ResourcePile(pile));
            Ok(())
        })
    }
}
