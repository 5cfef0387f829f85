use std::env;
use std::path::PathBuf;

use strategic_map_db::core::serialization::export_map;
use strategic_map_db::model::GameMap;
use strategic_map_db::world::{MapDb, MapDbConfig, MapRepository, WarningLog};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Paths {
    db: PathBuf,
    copy_to: Option<PathBuf>,
    export_json: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let paths = parse_paths(env::args().collect());
    if !paths.db.exists() {
        eprintln!(
            "DB not found at {}. Use --db <path> to point at a valid SQLite file.",
            paths.db.display()
        );
        std::process::exit(1);
    }

    let db = match MapDb::open(&paths.db, MapDbConfig::default()) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Failed to open map DB: {}", err);
            std::process::exit(1);
        }
    };
    let mut warnings = WarningLog::default();
    let map = match db.read_map(&mut warnings) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("Failed to read map: {}", err);
            std::process::exit(1);
        }
    };
    for warning in &warnings.warnings {
        println!("Warning: {}", warning);
    }

    print_stats(&map);

    if let Some(target) = &paths.copy_to {
        let mut copy: Box<dyn MapRepository> =
            match MapDb::open(target, MapDbConfig::default()) {
                Ok(db) => Box::new(db),
                Err(err) => {
                    eprintln!("Failed to open {}: {}", target.display(), err);
                    std::process::exit(1);
                }
            };
        if let Err(err) = copy.save_map(&map) {
            eprintln!("Failed to copy map to {}: {}", target.display(), err);
            std::process::exit(1);
        }
        println!("Copied map to {}", target.display());
    }

    if let Some(target) = &paths.export_json {
        if let Err(err) = export_map(&map, target) {
            eprintln!("Failed to export map to {}: {}", target.display(), err);
            std::process::exit(1);
        }
        println!("Exported map to {}", target.display());
    }
}

fn parse_paths(args: Vec<String>) -> Paths {
    let mut iter = args.iter().skip(1);
    let mut paths = Paths {
        db: PathBuf::from("./map.db"),
        ..Paths::default()
    };
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                if let Some(value) = iter.next() {
                    paths.db = PathBuf::from(value);
                }
            }
            "--copy-to" => {
                if let Some(value) = iter.next() {
                    paths.copy_to = Some(PathBuf::from(value));
                }
            }
            "--export-json" => {
                if let Some(value) = iter.next() {
                    paths.export_json = Some(PathBuf::from(value));
                }
            }
            _ => {}
        }
    }
    paths
}

fn print_stats(map: &GameMap) {
    let current = map
        .players
        .current()
        .map(|player| player.name.as_str())
        .unwrap_or("none");
    println!(
        "Map: {}x{} (version {}), turn {}",
        map.dimensions.rows, map.dimensions.columns, map.dimensions.version, map.current_turn
    );
    println!(
        "Stats: players={}, current={}, tiles={}, fixtures={}",
        map.players.len(),
        current,
        map.locations().len(),
        map.fixture_count()
    );
}
