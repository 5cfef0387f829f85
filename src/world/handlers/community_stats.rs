use std::collections::{BTreeMap, BTreeSet, HashMap};

use rusqlite::{params, Connection};

use crate::model::{CommunityStats, FixtureRef, GameMap, ResourcePile};
use crate::world::codes::decimal_to_sql;
use crate::world::dispatch::{Context, FixtureHandler, OwnerKind, UnitOfWork};
use crate::world::error::MapDbError;
use crate::world::handlers::resource_piles::pile_from_row;
use crate::world::handlers::{owner_of, unexpected};
use crate::world::resolve::{Member, ResolutionContext};
use crate::world::rows::read_rows;
use crate::world::warning::WarningSink;

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS town_populations (
  town INTEGER NOT NULL,
  population INTEGER NOT NULL CHECK (population >= 0)
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS town_expertise (
  town INTEGER NOT NULL,
  skill VARCHAR(255) NOT NULL,
  level INTEGER NOT NULL CHECK (level >= 0)
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS town_worked_resources (
  town INTEGER NOT NULL,
  resource INTEGER NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS town_production (
  town INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(64) NOT NULL,
  contents VARCHAR(64) NOT NULL,
  quantity VARCHAR(128) NOT NULL CHECK (quantity NOT GLOB '*[^0-9.]*' AND quantity NOT GLOB '*.*.*' AND quantity <> ''),
  units VARCHAR(32) NOT NULL,
  created INTEGER,
  image VARCHAR(255)
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS town_consumption (
  town INTEGER NOT NULL,
  id INTEGER NOT NULL,
  kind VARCHAR(64) NOT NULL,
  contents VARCHAR(64) NOT NULL,
  quantity VARCHAR(128) NOT NULL CHECK (quantity NOT GLOB '*[^0-9.]*' AND quantity NOT GLOB '*.*.*' AND quantity <> ''),
  units VARCHAR(32) NOT NULL,
  created INTEGER,
  image VARCHAR(255)
);
"#,
];

/// Population, expertise, worked fields and trade of a town or village.
pub struct CommunityStatsHandler;

fn write_piles<'a>(
    conn: &Connection,
    table: &str,
    town: u32,
    piles: impl Iterator<Item = &'a ResourcePile>,
) -> Result<(), MapDbError> {
    let sql = format!(
        "INSERT INTO {} (town, id, kind, contents, quantity, units, created, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        table
    );
    for pile in piles {
        conn.execute(
            &sql,
            params![
                town,
                pile.id,
                pile.kind,
                pile.contents,
                decimal_to_sql(&pile.quantity.number, "resource pile", pile.id)?,
                pile.quantity.units,
                pile.created,
                pile.image
            ],
        )?;
    }
    Ok(())
}

fn read_piles(
    conn: &Connection,
    table: &str,
    resolution: &mut ResolutionContext,
    warnings: &mut dyn WarningSink,
) -> Result<HashMap<u32, BTreeMap<u32, ResourcePile>>, MapDbError> {
    let mut piles: HashMap<u32, BTreeMap<u32, ResourcePile>> = HashMap::new();
    read_rows(conn, table, |row| {
        let pile = pile_from_row(row)?;
        resolution.register_id(pile.id, warnings);
        piles
            .entry(row.get("town")?)
            .or_default()
            .insert(pile.id, pile);
        Ok(())
    })?;
    Ok(piles)
}

impl FixtureHandler for CommunityStatsHandler {
    fn name(&self) -> &'static str {
        "community_stats"
    }

    fn tables(&self) -> &'static [&'static str] {
        &[
            "town_populations",
            "town_expertise",
            "town_worked_resources",
            "town_production",
            "town_consumption",
        ]
    }

    fn schema(&self) -> &'static [&'static str] {
        SCHEMA
    }

    fn can_write(&self, fixture: FixtureRef<'_>, context: Context) -> bool {
        matches!(fixture, FixtureRef::CommunityStats(_))
            && context.is_owned_by(&[OwnerKind::Town, OwnerKind::Village])
    }

    fn write(
        &self,
        uow: &mut UnitOfWork<'_>,
        fixture: FixtureRef<'_>,
        context: Context,
    ) -> Result<(), MapDbError> {
        let FixtureRef::CommunityStats(stats) = fixture else {
            return Err(unexpected(fixture));
        };
        let town = owner_of(fixture, context)?;
        let conn = uow.conn();
        conn.execute(
            "INSERT INTO town_populations (town, population) VALUES (?1, ?2)",
            params![town, stats.population],
        )?;
        for (skill, level) in &stats.skill_levels {
            conn.execute(
                "INSERT INTO town_expertise (town, skill, level) VALUES (?1, ?2, ?3)",
                params![town, skill, level],
            )?;
        }
        for resource in &stats.worked_fields {
            conn.execute(
                "INSERT INTO town_worked_resources (town, resource) VALUES (?1, ?2)",
                params![town, resource],
            )?;
        }
        write_piles(conn, "town_production", town, stats.produced.values())?;
        write_piles(conn, "town_consumption", town, stats.consumed.values())?;
        Ok(())
    }

    fn read(
        &self,
        conn: &Connection,
        _map: &mut GameMap,
        resolution: &mut ResolutionContext,
        warnings: &mut dyn WarningSink,
    ) -> Result<(), MapDbError> {
        let mut expertise: HashMap<u32, BTreeMap<String, i32>> = HashMap::new();
        read_rows(conn, "town_expertise", |row| {
            expertise
                .entry(row.get("town")?)
                .or_default()
                .insert(row.get("skill")?, row.get("level")?);
            Ok(())
        })?;
        let mut worked: HashMap<u32, BTreeSet<u32>> = HashMap::new();
        read_rows(conn, "town_worked_resources", |row| {
            worked
                .entry(row.get("town")?)
                .or_default()
                .insert(row.get("resource")?);
            Ok(())
        })?;
        let mut produced = read_piles(conn, "town_production", resolution, warnings)?;
        let mut consumed = read_piles(conn, "town_consumption", resolution, warnings)?;

        read_rows(conn, "town_populations", |row| {
            let town: u32 = row.get("town")?;
            let stats = CommunityStats {
                population: row.get("population")?,
                skill_levels: expertise.remove(&town).unwrap_or_default(),
                worked_fields: worked.remove(&town).unwrap_or_default(),
                produced: produced.remove(&town).unwrap_or_default(),
                consumed: consumed.remove(&town).unwrap_or_default(),
            };
            resolution.add_containee(town, Member::CommunityStats(stats));
            Ok(())
        })
    }
}
