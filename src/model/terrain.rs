use serde::{Deserialize, Serialize};

/// A location on the map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: i32,
    pub column: i32,
}

impl Point {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Tundra,
    Desert,
    Ocean,
    Plains,
    Jungle,
    Steppe,
    Swamp,
}

impl TileType {
    pub fn as_str(self) -> &'static str {
        match self {
            TileType::Tundra => "tundra",
            TileType::Desert => "desert",
            TileType::Ocean => "ocean",
            TileType::Plains => "plains",
            TileType::Jungle => "jungle",
            TileType::Steppe => "steppe",
            TileType::Swamp => "swamp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tundra" => Some(TileType::Tundra),
            "desert" => Some(TileType::Desert),
            "ocean" => Some(TileType::Ocean),
            "plains" => Some(TileType::Plains),
            "jungle" => Some(TileType::Jungle),
            "steppe" => Some(TileType::Steppe),
            "swamp" => Some(TileType::Swamp),
            _ => None,
        }
    }
}

/// A river segment on a tile; `Lake` marks a river's source or sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum River {
    North,
    East,
    South,
    West,
    Lake,
}

impl River {
    pub const ALL: [River; 5] = [
        River::North,
        River::East,
        River::South,
        River::West,
        River::Lake,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::Northeast => "northeast",
            Direction::East => "east",
            Direction::Southeast => "southeast",
            Direction::South => "south",
            Direction::Southwest => "southwest",
            Direction::West => "west",
            Direction::Northwest => "northwest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "north" => Some(Direction::North),
            "northeast" => Some(Direction::Northeast),
            "east" => Some(Direction::East),
            "southeast" => Some(Direction::Southeast),
            "south" => Some(Direction::South),
            "southwest" => Some(Direction::Southwest),
            "west" => Some(Direction::West),
            "northwest" => Some(Direction::Northwest),
            _ => None,
        }
    }
}
