use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, StoneDeposit, TileFixture};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS stone_deposits (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  dc INTEGER NOT NULL,
  image VARCHAR(255)
);
"#];

pub struct StoneDepositHandler;

impl FixtureHandler for StoneDepositHandler {
    fn name(&self) -> &'static str {
        "stone_deposits"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["stone_deposits"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::StoneDeposit(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::StoneDeposit(stone) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO stone_deposits (\"row\", \"column\", id, kind, dc, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![point.row, point.column, stone.id, stone.kind, stone.dc, stone.image],
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
        read_rows(conn, "stone_deposits", |row| {
            let stone = StoneDeposit {
                id: row.get("id")?,
                kind: row.get("kind")?,
                dc: row.get("dc")?,
                image: row.get("image")?,
            };
            resolution.register_id(stone.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::StoneDeposit(stone));
            Ok(())
        })
    }
}
