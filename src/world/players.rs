use rusqlite::{params, Connection};

use crate::model::{GameMap, Player};
use crate::world::dispatch::UnitOfWork;
use crate::world::drift::{self, Recovery};
use crate::world::error::MapDbError;
use crate::world::rows::{optional_column, read_rows};
use crate::world::schema::{column_exists, table_exists};

pub const PLAYERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
  id INTEGER NOT NULL PRIMARY KEY,
  codename VARCHAR(64) NOT NULL,
  is_current BOOLEAN NOT NULL,
  portrait VARCHAR(256),
  country VARCHAR(64)
);
"#;

/// The shape of the players table before countries were tracked.
pub const LEGACY_PLAYERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
  id INTEGER NOT NULL PRIMARY KEY,
  codename VARCHAR(64) NOT NULL,
  is_current BOOLEAN NOT NULL,
  portrait VARCHAR(256)
);
"#;

pub fn add_country_column_if_missing(conn: &Connection) -> Result<(), MapDbError> {
    if table_exists(conn, "players")? && !column_exists(conn, "players", "country")? {
        conn.execute_batch("ALTER TABLE players ADD COLUMN country VARCHAR(64)")?;
        tracing::info!("added country column to players table");
    }
    Ok(())
}

pub fn write_player(uow: &mut UnitOfWork<'_>, player: &Player) -> Result<Recovery, MapDbError> {
    uow.ensure_schema("players", &[PLAYERS_SCHEMA])?;
    let (_, recovery) = drift::with_recovery(
        uow.conn(),
        "players",
        drift::is_missing_column,
        add_country_column_if_missing,
        |conn| {
            conn.execute(
                "INSERT INTO players (id, codename, is_current, portrait, country) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    player.id,
                    player.name,
                    player.current,
                    player.portrait,
                    player.country
                ],
            )
        },
    )?;
    if recovery == Recovery::Retried {
        uow.record_recovery("players");
    }
    Ok(recovery)
}

pub fn read_players(conn: &Connection, map: &mut GameMap) -> Result<(), MapDbError> {
    read_rows(conn, "players", |row| {
        map.players.add(Player {
            id: row.get("id")?,
            name: row.get("codename")?,
            current: row.get("is_current")?,
            portrait: row.get("portrait")?,
            country: optional_column(row, "country")?,
        });
        Ok(())
    })
}
