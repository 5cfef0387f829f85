use rusqlite::{params, Connection};

use crate::model::{
    FixtureRef, GameMap, Immortal, KindedImmortal, SimpleImmortal, TileFixture,
};
use crate::world::codes::{
    kinded_immortal_from_str, kinded_immortal_to_str, simple_immortal_from_str,
    simple_immortal_to_str,
};
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::drift::{self, Recovery};
use crate::world::error::MapDbError;
use crate::world::handlers::unexpected;
use crate::world::resolve::{Location, Member, ResolutionContext};
use crate::world::rows::{read_rows, row_location};
use crate::world::schema::{table_exists, table_sql};
use crate::world::warning::WarningSink;

const SIMPLE_IMMORTALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS simple_immortals (
  "row" INTEGER,
  "column" INTEGER,
  parent INTEGER,
  type VARCHAR(16) NOT NULL CHECK (type IN ('sphinx', 'djinn', 'griffin', 'minotaur', 'ogre', 'phoenix', 'simurgh', 'troll', 'snowbird', 'thunderbird', 'pegasus', 'unicorn', 'kraken')),
  id INTEGER NOT NULL,
  dc INTEGER NOT NULL,
  image VARCHAR(255),
  CHECK (("row" IS NOT NULL AND "column" IS NOT NULL AND parent IS NULL)
      OR ("row" IS NULL AND "column" IS NULL AND parent IS NOT NULL))
);
"#;

/// The table as it was before the last five kinds were added.
pub const LEGACY_SIMPLE_IMMORTALS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS simple_immortals (
  "row" INTEGER,
  "column" INTEGER,
  parent INTEGER,
  type VARCHAR(16) NOT NULL CHECK (type IN ('sphinx', 'djinn', 'griffin', 'minotaur', 'ogre', 'phoenix', 'simurgh', 'troll')),
  id INTEGER NOT NULL,
  dc INTEGER NOT NULL,
  image VARCHAR(255),
  CHECK (("row" IS NOT NULL AND "column" IS NOT NULL AND parent IS NULL)
      OR ("row" IS NULL AND "column" IS NULL AND parent IS NOT NULL))
);
"#;

const SIMPLE_SCHEMA: &[&str] = &[SIMPLE_IMMORTALS_TABLE];

const KINDED_SCHEMA: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS kinded_immortals (
  "row" INTEGER,
  "column" INTEGER,
  parent INTEGER,
  type VARCHAR(16) NOT NULL CHECK (type IN ('centaur', 'dragon', 'fairy', 'giant')),
  id INTEGER NOT NULL,
  race VARCHAR(32) NOT NULL,
  dc INTEGER NOT NULL,
  image VARCHAR(255),
  CHECK (("row" IS NOT NULL AND "column" IS NOT NULL AND parent IS NULL)
      OR ("row" IS NULL AND "column" IS NULL AND parent IS NOT NULL))
);
"#];

/// Rebuilds `simple_immortals` with the current type constraint if it still
/// has the legacy one. Rows are carried over unchanged.
pub fn widen_simple_immortals_if_needed(conn: &Connection) -> Result<(), MapDbError> {
    if !table_exists(conn, "simple_immortals")? {
        return Ok(());
    }
    let current = table_sql(conn, "simple_immortals")?.unwrap_or_default();
    if current.contains("'kraken'") {
        return Ok(());
    }
    conn.execute_batch(&SIMPLE_IMMORTALS_TABLE.replacen(
        "simple_immortals",
        "simple_immortals_replacement",
        1,
    ))?;
    conn.execute_batch(
        "INSERT INTO simple_immortals_replacement SELECT * FROM simple_immortals;
         DROP TABLE simple_immortals;
         ALTER TABLE simple_immortals_replacement RENAME TO simple_immortals;",
    )?;
    tracing::info!("rebuilt simple_immortals with widened type constraint");
    Ok(())
}

fn can_hold_immortal(context: Context) -> bool {
    context.is_point() || context.is_owned_by(&[OwnerKind::Unit])
}

fn place(
    map: &mut GameMap,
    resolution: &mut ResolutionContext,
    location: Location,
    immortal: Immortal,
) {
    match location {
        Location::Point(point) => map.add_fixture(point, TileFixture::Immortal(immortal)),
        Location::Parent(owner) => resolution.add_containee(owner, Member::Immortal(immortal)),
    }
}

/// Immortals identified by their kind alone, all in one table.
pub struct SimpleImmortalHandler;

impl FixtureHandler for SimpleImmortalHandler {
    fn name(&self) -> &'static str {
        "simple_immortals"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["simple_immortals"]
    }

    fn schema(&self) -> &'static [&'static str] {
        SIMPLE_SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::SimpleImmortal(_)) && can_hold_immortal(context)
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::SimpleImmortal(immortal) = fixture else {
            return Err(unexpected(fixture));
        };
        let (row, column, parent) = context.columns();
        let (_, recovery) = drift::with_recovery(
            uow.conn(),
            "simple_immortals",
            drift::is_check_violation,
            widen_simple_immortals_if_needed,
            |conn| {
                conn.execute(
                    "INSERT INTO simple_immortals (\"row\", \"column\", parent, type, id, dc, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        row,
                        column,
                        parent,
                        simple_immortal_to_str(immortal.kind),
                        immortal.id,
                        immortal.dc,
                        immortal.image
                    ],
                )
            },
        )?;
        if recovery == Recovery::Retried {
            uow.record_recovery("simple_immortals");
        }
        Ok(())
    }

    fn read(
        &self,
        conn: &Connection,
        map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        read_rows(conn, "simple_immortals", |row| {
            let immortal = SimpleImmortal {
                id: row.get("id")?,
                kind: simple_immortal_from_str(&row.get::<_, String>("type")?)?,
                dc: row.get("dc")?,
                image: row.get("image")?,
            };
            resolution.register_id(immortal.id, warnings);
            place(map, resolution, row_location(row)?, Immortal::Simple(immortal));
            Ok(())
        })
    }
}

/// Immortals that also carry a race, such as dragons and giants.
pub struct KindedImmortalHandler;

impl FixtureHandler for KindedImmortalHandler {
    fn name(&self) -> &'static str {
        "kinded_immortals"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["kinded_immortals"]
    }

    fn schema(&self) -> &'static [&'static str] {
        KINDED_SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::KindedImmortal(_)) && can_hold_immortal(context)
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::KindedImmortal(immortal) = fixture else {
            return Err(unexpected(fixture));
        };
        let (row, column, parent) = context.columns();
        uow.conn().execute(
            "INSERT INTO kinded_immortals (\"row\", \"column\", parent, type, id, race, dc, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                row,
                column,
                parent,
                kinded_immortal_to_str(immortal.kind),
                immortal.id,
                immortal.race,
                immortal.dc,
                immortal.image
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
        read_rows(conn, "kinded_immortals", |row| {
            let immortal = KindedImmortal {
                id: row.get("id")?,
                kind: kinded_immortal_from_str(&row.get::<_, String>("type")?)?,
                race: row.get("race")?,
                dc: row.get("dc")?,
                image: row.get("image")?,
            };
            resolution.register_id(immortal.id, warnings);
            place(map, resolution, row_location(row)?, Immortal::Kinded(immortal));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, SimpleImmortalKind};
    use crate::world::config::MapDbConfig;
    use crate::world::sqlite::MapDb;

    fn kraken() -> SimpleImmortal {
        SimpleImmortal {
            id: 40,
            kind: SimpleImmortalKind::Kraken,
            dc: 25,
            image: None,
        }
    }

    #[test]
    fn legacy_table_is_widened_on_write() {
        let mut db = MapDb::open_in_memory(MapDbConfig::default()).unwrap();
        db.connection()
            .execute_batch(LEGACY_SIMPLE_IMMORTALS_SCHEMA)
            .unwrap();

        let kraken = kraken();
        let recovery = db
            .write_fixture(
                FixtureRef::SimpleImmortal(&kraken),
                Context::Point(Point::new(0, 0)),
                0,
            )
            .unwrap();

        assert_eq!(recovery, Recovery::Retried);
        let sql = table_sql(db.connection(), "simple_immortals").unwrap().unwrap();
        assert!(sql.contains("'kraken'"));
    }

    #[test]
    fn legacy_table_is_migrated_on_open() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(LEGACY_SIMPLE_IMMORTALS_SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO simple_immortals (\"row\", \"column\", type, id, dc) VALUES (1, 2, 'sphinx', 7, 20)",
            [],
        )
        .unwrap();

        let db = MapDb::with_connection(conn, MapDbConfig::default()).unwrap();
        let sql = table_sql(db.connection(), "simple_immortals").unwrap().unwrap();
        assert!(sql.contains("'kraken'"));
        let kept: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM simple_immortals WHERE id = 7", [], |row| row.get(0))
            .unwrap();
        assert_eq!(kept, 1);
    }

    #[test]
    fn duplicate_key_is_not_treated_as_drift() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();
        let err = conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap_err();
        assert!(!drift::is_check_violation(&err));
    }
}
