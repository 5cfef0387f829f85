use std::collections::{BTreeMap, HashMap};

use rusqlite::{params, Connection};

use crate::model::{FixtureRef, GameMap, Unit};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::unexpected;
use crate::world::resolve::{Container, ResolutionContext};
use crate::world::rows::{read_rows, row_location};
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS units (
  "row" INTEGER,
  "column" INTEGER,
  parent INTEGER,
  owner INTEGER NOT NULL,
  kind VARCHAR(32) NOT NULL,
  name VARCHAR(64) NOT NULL,
  id INTEGER NOT NULL,
  portrait VARCHAR(255),
  image VARCHAR(255),
  CHECK (("row" IS NOT NULL AND "column" IS NOT NULL AND parent IS NULL)
      OR ("row" IS NULL AND "column" IS NULL AND parent IS NOT NULL))
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS unit_orders (
  unit INTEGER NOT NULL,
  turn INTEGER,
  body VARCHAR(2048) NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS unit_results (
  unit INTEGER NOT NULL,
  turn INTEGER,
  body VARCHAR(2048) NOT NULL
);
"#,
];

// Orders and results with no turn are keyed under this turn in memory; it is
// stored as NULL. Lower turns are rejected.
const NO_TURN: i32 = -1;

fn read_by_turn(
    conn: &Connection,
    table: &str,
) -> Result<HashMap<u32, BTreeMap<i32, String>>, MapDbError> {
    let mut by_unit: HashMap<u32, BTreeMap<i32, String>> = HashMap::new();
    read_rows(conn, table, |row| {
        let turn: Option<i32> = row.get("turn")?;
        by_unit
            .entry(row.get("unit")?)
            .or_default()
            .insert(turn.unwrap_or(NO_TURN), row.get("body")?);
        Ok(())
    })?;
    Ok(by_unit)
}

/// Units sit on a tile or inside a fortress, and own their members.
pub struct UnitHandler;

impl FixtureHandler for UnitHandler {
    fn name(&self) -> &'static str {
        "units"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["units", "unit_orders", "unit_results"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::Unit(_))
            && (context.is_point() || context.is_owned_by(&[OwnerKind::Fortress]))
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::Unit(unit) = fixture else {
            return Err(unexpected(fixture));
        };
        let (row, column, parent) = context.columns();
        let conn = uow.conn();
        conn.execute(
            "INSERT INTO units (\"row\", \"column\", parent, owner, kind, name, id, portrait, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row,
                column,
                parent,
                unit.owner,
                unit.kind,
                unit.name,
                unit.id,
                unit.portrait,
                unit.image
            ],
        )?;
        for (table, entries) in [("unit_orders", &unit.orders), ("unit_results", &unit.results)] {
            for (turn, body) in entries {
                if *turn < NO_TURN {
                    return Err(MapDbError::InvalidData(format!(
                        "unit {} has an entry for turn {}",
                        unit.id, turn
                    )));
                }
                let turn = (*turn != NO_TURN).then_some(*turn);
                conn.execute(
                    &format!("INSERT INTO {} (unit, turn, body) VALUES (?1, ?2, ?3)", table),
                    params![unit.id, turn, body],
                )?;
            }
        }
        let inside = Context::owner(unit.id, OwnerKind::Unit);
        for member in unit.members.values() {
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
        let mut orders = read_by_turn(conn, "unit_orders")?;
        let mut results = read_by_turn(conn, "unit_results")?;
        read_rows(conn, "units", |row| {
            let id: u32 = row.get("id")?;
            let unit = Unit {
                portrait: row.get("portrait")?,
                image: row.get("image")?,
                orders: orders.remove(&id).unwrap_or_default(),
                results: results.remove(&id).unwrap_or_default(),
                ..Unit::new(
                    id,
                    row.get("owner")?,
                    row.get::<_, String>("kind")?,
                    row.get::<_, String>("name")?,
                )
            };
            resolution.register_id(id, warnings);
            resolution.add_container(row_location(row)?, Container::Unit(unit));
            Ok(())
        })
    }
}
