//! Text encodings of enumerated fields, shared by the handlers.

use rust_decimal::Decimal;

use crate::model::{
    Direction, FieldStatus, KindedImmortalKind, SimpleImmortalKind, TileType, TownKind, TownSize,
    TownStatus,
};
use crate::world::error::MapDbError;

pub fn town_status_to_str(status: TownStatus) -> &'static str {
    match status {
        TownStatus::Active => "active",
        TownStatus::Abandoned => "abandoned",
        TownStatus::Burned => "burned",
        TownStatus::Ruined => "ruined",
    }
}

pub fn town_status_from_str(value: &str) -> Result<TownStatus, MapDbError> {
    match value {
        "active" => Ok(TownStatus::Active),
        "abandoned" => Ok(TownStatus::Abandoned),
        "burned" => Ok(TownStatus::Burned),
        "ruined" => Ok(TownStatus::Ruined),
        _ => Err(MapDbError::InvalidData(format!(
            "unknown town status {}",
            value
        ))),
    }
}

pub fn town_size_to_str(size: TownSize) -> &'static str {
    match size {
        TownSize::Small => "small",
        TownSize::Medium => "medium",
        TownSize::Large => "large",
    }
}

pub fn town_size_from_str(value: &str) -> Result<TownSize, MapDbError> {
    match value {
        "small" => Ok(TownSize::Small),
        "medium" => Ok(TownSize::Medium),
        "large" => Ok(TownSize::Large),
        _ => Err(MapDbError::InvalidData(format!("unknown town size {}", value))),
    }
}

pub fn town_kind_to_str(kind: TownKind) -> &'static str {
    match kind {
        TownKind::Town => "town",
        TownKind::City => "city",
        TownKind::Fortification => "fortification",
    }
}

pub fn town_kind_from_str(value: &str) -> Result<TownKind, MapDbError> {
    match value {
        "town" => Ok(TownKind::Town),
        "city" => Ok(TownKind::City),
        "fortification" => Ok(TownKind::Fortification),
        _ => Err(MapDbError::InvalidData(format!("unknown town kind {}", value))),
    }
}

pub fn field_status_to_str(status: FieldStatus) -> &'static str {
    match status {
        FieldStatus::Fallow => "fallow",
        FieldStatus::Seeding => "seeding",
        FieldStatus::Growing => "growing",
        FieldStatus::Bearing => "bearing",
    }
}

pub fn field_status_from_str(value: &str) -> Result<FieldStatus, MapDbError> {
    match value {
        "fallow" => Ok(FieldStatus::Fallow),
        "seeding" => Ok(FieldStatus::Seeding),
        "growing" => Ok(FieldStatus::Growing),
        "bearing" => Ok(FieldStatus::Bearing),
        _ => Err(MapDbError::InvalidData(format!(
            "unknown field status {}",
            value
        ))),
    }
}

pub fn simple_immortal_to_str(kind: SimpleImmortalKind) -> &'static str {
    match kind {
        SimpleImmortalKind::Sphinx => "sphinx",
        SimpleImmortalKind::Djinn => "djinn",
        SimpleImmortalKind::Griffin => "griffin",
        SimpleImmortalKind::Minotaur => "minotaur",
        SimpleImmortalKind::Ogre => "ogre",
        SimpleImmortalKind::Phoenix => "phoenix",
        SimpleImmortalKind::Simurgh => "simurgh",
        SimpleImmortalKind::Troll => "troll",
        SimpleImmortalKind::Snowbird => "snowbird",
        SimpleImmortalKind::Thunderbird => "thunderbird",
        SimpleImmortalKind::Pegasus => "pegasus",
        SimpleImmortalKind::Unicorn => "unicorn",
        SimpleImmortalKind::Kraken => "kraken",
    }
}

pub fn simple_immortal_from_str(value: &str) -> Result<SimpleImmortalKind, MapDbError> {
    match value {
        "sphinx" => Ok(SimpleImmortalKind::Sphinx),
        "djinn" => Ok(SimpleImmortalKind::Djinn),
        "griffin" => Ok(SimpleImmortalKind::Griffin),
        "minotaur" => Ok(SimpleImmortalKind::Minotaur),
        "ogre" => Ok(SimpleImmortalKind::Ogre),
        "phoenix" => Ok(SimpleImmortalKind::Phoenix),
        "simurgh" => Ok(SimpleImmortalKind::Simurgh),
        "troll" => Ok(SimpleImmortalKind::Troll),
        "snowbird" => Ok(SimpleImmortalKind::Snowbird),
        "thunderbird" => Ok(SimpleImmortalKind::Thunderbird),
        "pegasus" => Ok(SimpleImmortalKind::Pegasus),
        "unicorn" => Ok(SimpleImmortalKind::Unicorn),
        "kraken" => Ok(SimpleImmortalKind::Kraken),
        _ => Err(MapDbError::InvalidData(format!(
            "unknown immortal type {}",
            value
        ))),
    }
}

pub fn kinded_immortal_to_str(kind: KindedImmortalKind) -> &'static str {
    match kind {
        KindedImmortalKind::Centaur => "centaur",
        KindedImmortalKind::Dragon => "dragon",
        KindedImmortalKind::Fairy => "fairy",
        KindedImmortalKind::Giant => "giant",
    }
}

pub fn kinded_immortal_from_str(value: &str) -> Result<KindedImmortalKind, MapDbError> {
    match value {
        "centaur" => Ok(KindedImmortalKind::Centaur),
        "dragon" => Ok(KindedImmortalKind::Dragon),
        "fairy" => Ok(KindedImmortalKind::Fairy),
        "giant" => Ok(KindedImmortalKind::Giant),
        _ => Err(MapDbError::InvalidData(format!(
            "unknown immortal type {}",
            value
        ))),
    }
}

pub fn tile_type_from_str(value: &str) -> Result<TileType, MapDbError> {
    TileType::parse(value)
        .ok_or_else(|| MapDbError::InvalidData(format!("unknown terrain type {}", value)))
}

pub fn direction_from_str(value: &str) -> Result<Direction, MapDbError> {
    Direction::parse(value)
        .ok_or_else(|| MapDbError::InvalidData(format!("unknown direction {}", value)))
}

/// Decimal quantities are stored as text so they survive a round trip exactly.
/// Negative amounts are rejected, naming the fixture that carried them.
pub fn decimal_to_sql(value: &Decimal, kind: &str, id: u32) -> Result<String, MapDbError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MapDbError::InvalidData(format!(
            "{} {} has negative amount {}",
            kind, id, value
        )));
    }
    Ok(value.to_string())
}

pub fn decimal_from_sql(value: &str) -> Result<Decimal, MapDbError> {
    value
        .parse::<Decimal>()
        .map_err(|err| MapDbError::InvalidData(format!("malformed quantity {}: {}", value, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_text_keeps_precision() {
        let value = decimal_from_sql("0.1000000000000000000000000001").unwrap();
        assert_eq!(
            decimal_to_sql(&value, "forest", 1).unwrap(),
            "0.1000000000000000000000000001"
        );
        assert!(decimal_from_sql("1.2.3").is_err());
    }

    #[test]
    fn negative_amount_names_the_fixture() {
        let err = decimal_to_sql(&Decimal::new(-15, 1), "forest", 41).unwrap_err();
        let MapDbError::InvalidData(message) = err else {
            panic!("expected invalid data, got {:?}", err);
        };
        assert!(message.contains("forest 41"));
        assert_eq!(decimal_to_sql(&Decimal::ZERO, "field", 2).unwrap(), "0");
    }

    #[test]
    fn unknown_status_is_invalid_data() {
        assert!(matches!(
            town_status_from_str("sacked"),
            Err(MapDbError::InvalidData(_))
        ));
    }
}
