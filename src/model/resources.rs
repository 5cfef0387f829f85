//! Harvestable and stored resources: terrain-bound sources plus the piles and
//! equipment that units and fortresses carry around.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::towns::TownStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mine {
    pub id: u32,
    pub kind: String,
    pub status: TownStatus,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineralVein {
    pub id: u32,
    pub kind: String,
    pub exposed: bool,
    pub dc: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneDeposit {
    pub id: u32,
    pub kind: String,
    pub dc: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ground {
    pub id: u32,
    pub kind: String,
    pub exposed: bool,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forest {
    pub id: u32,
    pub kind: String,
    /// Planted in rows rather than growing wild.
    pub rows: bool,
    pub acres: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shrub {
    pub id: u32,
    pub kind: String,
    pub population: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grove {
    pub id: u32,
    pub kind: String,
    pub orchard: bool,
    pub cultivated: bool,
    pub population: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldStatus {
    Fallow,
    Seeding,
    Growing,
    Bearing,
}

/// A field (cultivated crop land) or a meadow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meadow {
    pub id: u32,
    pub kind: String,
    pub field: bool,
    pub cultivated: bool,
    pub status: FieldStatus,
    pub acres: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFixture {
    pub id: u32,
    pub kind: String,
    pub contents: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub number: Decimal,
    pub units: String,
}

impl Quantity {
    pub fn new(number: Decimal, units: impl Into<String>) -> Self {
        Self {
            number,
            units: units.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePile {
    pub id: u32,
    pub kind: String,
    pub contents: String,
    pub quantity: Quantity,
    /// Turn the resource was produced, if known.
    #[serde(default)]
    pub created: Option<i32>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implement {
    pub id: u32,
    pub kind: String,
    pub count: i32,
    #[serde(default)]
    pub image: Option<String>,
}
