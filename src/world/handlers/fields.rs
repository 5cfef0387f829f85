use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Meadow, TileFixture};
use crate::world::codes::{decimal_from_sql, decimal_to_sql, field_status_from_str, field_status_to_str};
use crate::world::dispatch::{Context, FixtureHandler, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::{point_of, unexpected};
use crate::world::resolve::ResolutionContext;
use crate::world::rows::{read_rows, row_point};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS fields (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  id INTEGER NOT NULL,
  type VARCHAR(6) NOT NULL CHECK (type IN ('field', 'meadow')),
  kind VARCHAR(64) NOT NULL,
  cultivated BOOLEAN NOT NULL,
  status VARCHAR(7) NOT NULL CHECK (status IN ('fallow', 'seeding', 'growing', 'bearing')),
  acres VARCHAR(128) NOT NULL CHECK (acres NOT GLOB '*[^0-9.]*' AND acres NOT GLOB '*.*.*' AND acres <> ''),
  image VARCHAR(255)
);
"#];

/// Fields and meadows share a table, told apart by `type`.
pub struct FieldHandler;

impl FixtureHandler for FieldHandler {
    fn name(&self) -> &'static str {
        "fields"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["fields"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Meadow(_)) && context.is_point()
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Meadow(meadow) = fixture else {
            return Err(unexpected(fixture));
        };
        let point = point_of(fixture, context)?;
        uow.conn().execute(
            "INSERT INTO fields (\"row\", \"column\", id, type, kind, cultivated, status, acres, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                point.row,
                point.column,
                meadow.id,
                if meadow.field { "field" } else { "meadow" },
                meadow.kind,
                meadow.cultivated,
                field_status_to_str(meadow.status),
                decimal_to_sql(&meadow.acres, "field", meadow.id)?,
                meadow.image
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
        read_rows(conn, "fields", |row| {
            let field = match row.get::<_, String>("type")?.as_str() {
                "field" => true,
                "meadow" => false,
                other => {
                    return Err(MapDbError::InvalidData(format!(
                        "unexpected field type {}",
                        other
                    )))
                }
            };
            let meadow = Meadow {
                id: row.get("id")?,
                kind: row.get("kind")?,
                field,
                cultivated: row.get("cultivated")?,
                status: field_status_from_str(&row.get::<_, String>("status")?)?,
                acres: decimal_from_sql(&row.get::<_, String>("acres")?)?,
                image: row.get("image")?,
            };
            resolution.register_id(meadow.id, warnings);
            map.add_fixture(row_point(row)?, TileFixture::Meadow(meadow));
            Ok(())
        })
    }
}
