//! Map-level tables: metadata, per-tile terrain, roads and bookmarks.

use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{GameMap, MapDimensions, River};
use crate::world::codes::{direction_from_str, tile_type_from_str};
use crate::world::dispatch::UnitOfWork;
use crate::world::error::MapDbError;
use crate::world::rows::{read_rows, row_point};
use crate::world::schema::is_missing_table;

const METADATA_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  version INTEGER NOT NULL,
  map_rows INTEGER NOT NULL,
  map_columns INTEGER NOT NULL,
  current_turn INTEGER NOT NULL
);
"#;

const TERRAIN_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS terrain (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  terrain VARCHAR(16) CHECK (terrain IN ('tundra', 'desert', 'ocean', 'plains', 'jungle', 'steppe', 'swamp')),
  mountainous BOOLEAN NOT NULL,
  north_river BOOLEAN NOT NULL,
  east_river BOOLEAN NOT NULL,
  south_river BOOLEAN NOT NULL,
  west_river BOOLEAN NOT NULL,
  lake BOOLEAN NOT NULL,
  PRIMARY KEY ("row", "column")
);

CREATE TABLE IF NOT EXISTS roads (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  direction VARCHAR(9) NOT NULL CHECK (direction IN ('north', 'northeast', 'east', 'southeast', 'south', 'southwest', 'west', 'northwest')),
  quality INTEGER NOT NULL CHECK (quality >= 0),
  PRIMARY KEY ("row", "column", direction)
);

CREATE TABLE IF NOT EXISTS bookmarks (
  "row" INTEGER NOT NULL,
  "column" INTEGER NOT NULL,
  player INTEGER NOT NULL,
  PRIMARY KEY ("row", "column", player)
);
"#;

pub const MAP_TABLES: &[&str] = &["metadata", "players", "terrain", "roads", "bookmarks"];

pub fn write_metadata(uow: &mut UnitOfWork<'_>, map: &GameMap) -> Result<(), MapDbError> {
    uow.ensure_schema("metadata", &[METADATA_SCHEMA])?;
    uow.conn().execute(
        "INSERT OR REPLACE INTO metadata (id, version, map_rows, map_columns, current_turn) VALUES (1, ?1, ?2, ?3, ?4)",
        params![
            map.dimensions.version,
            map.dimensions.rows,
            map.dimensions.columns,
            map.current_turn
        ],
    )?;
    Ok(())
}

/// Dimensions and current turn, or `None` for a store with no map in it.
pub fn read_metadata(conn: &Connection) -> Result<Option<(MapDimensions, i32)>, MapDbError> {
    let row = conn
        .query_row(
            "SELECT version, map_rows, map_columns, current_turn FROM metadata WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, i32>(3)?,
                ))
            },
        )
        .optional();
    match row {
        Ok(Some((version, rows, columns, turn))) => {
            Ok(Some((MapDimensions::new(rows, columns, version), turn)))
        }
        Ok(None) => Ok(None),
        Err(err) if is_missing_table(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn write_terrain(uow: &mut UnitOfWork<'_>, map: &GameMap) -> Result<(), MapDbError> {
    uow.ensure_schema("terrain", &[TERRAIN_SCHEMA])?;
    let conn = uow.conn();
    for point in map.locations() {
        let terrain = map.terrain_at(point);
        let mountainous = map.is_mountainous(point);
        let rivers: Vec<River> = map.rivers_at(point).collect();
        if terrain.is_some() || mountainous || !rivers.is_empty() {
            conn.execute(
                "INSERT INTO terrain (\"row\", \"column\", terrain, mountainous, north_river, east_river, south_river, west_river, lake) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    point.row,
                    point.column,
                    terrain.map(|t| t.as_str()),
                    mountainous,
                    rivers.contains(&River::North),
                    rivers.contains(&River::East),
                    rivers.contains(&River::South),
                    rivers.contains(&River::West),
                    rivers.contains(&River::Lake),
                ],
            )?;
        }
        for (direction, quality) in map.roads_at(point) {
            conn.execute(
                "INSERT INTO roads (\"row\", \"column\", direction, quality) VALUES (?1, ?2, ?3, ?4)",
                params![point.row, point.column, direction.as_str(), quality],
            )?;
        }
        for player in map.bookmarks_at(point) {
            conn.execute(
                "INSERT INTO bookmarks (\"row\", \"column\", player) VALUES (?1, ?2, ?3)",
                params![point.row, point.column, player],
            )?;
        }
    }
    Ok(())
}

pub fn read_terrain(conn: &Connection, map: &mut GameMap) -> Result<(), MapDbError> {
    read_rows(conn, "terrain", |row| {
        let point = row_point(row)?;
        if let Some(terrain) = row.get::<_, Option<String>>("terrain")? {
            map.set_terrain(point, tile_type_from_str(&terrain)?);
        }
        if row.get::<_, bool>("mountainous")? {
            map.set_mountainous(point, true);
        }
        for (column, river) in [
            ("north_river", River::North),
            ("east_river", River::East),
            ("south_river", River::South),
            ("west_river", River::West),
            ("lake", River::Lake),
        ] {
            if row.get::<_, bool>(column)? {
                map.add_river(point, river);
            }
        }
        Ok(())
    })
}

pub fn read_roads_and_bookmarks(conn: &Connection, map: &mut GameMap) -> Result<(), MapDbError> {
    read_rows(conn, "roads", |row| {
        let point = row_point(row)?;
        let direction = direction_from_str(&row.get::<_, String>("direction")?)?;
        map.set_road(point, direction, row.get("quality")?);
        Ok(())
    })?;
    read_rows(conn, "bookmarks", |row| {
        let point = row_point(row)?;
        map.add_bookmark(point, row.get("player")?);
        Ok(())
    })
}
