use serde::{Deserialize, Serialize};

use crate::model::terrain::Point;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adventure {
    pub id: u32,
    pub brief: String,
    pub full: String,
    /// Player who has claimed the adventure, if any.
    #[serde(default)]
    pub owner: Option<i32>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub id: u32,
    pub destination_world: String,
    /// `None` until the far side has been explored.
    #[serde(default)]
    pub destination: Option<Point>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cave {
    pub id: u32,
    pub dc: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battlefield {
    pub id: u32,
    pub dc: i32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFixture {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub turn: Option<i32>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hill {
    pub id: u32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oasis {
    pub id: u32,
    #[serde(default)]
    pub image: Option<String>,
}
