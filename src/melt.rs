//! Melt one nested detail payload into flat staging rows.
//!
//! A detail payload nests its list fields (`types`, `abilities`, `stats`);
//! melting projects them into one entity row plus zero-or-more association
//! rows per list. Every association row carries the parent id, name and the
//! same extraction timestamp as the entity row, and the entity row keeps
//! the complete original payload for audit/replay.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Error, Result};

/// Entity row destined for `raw_pokemon`.
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonRow {
    pub id: i64,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub base_experience: Option<i64>,
    pub is_default: bool,
    pub order_num: Option<i64>,
    pub extracted_at: DateTime<Utc>,
    /// Complete original payload, serialized as compact JSON.
    pub raw_data: String,
}

/// Association row for `raw_pokemon_types`. Slot 1 is the primary typing,
/// 2+ are secondary.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRow {
    pub pokemon_id: i64,
    pub pokemon_name: String,
    pub slot: i64,
    pub type_name: String,
    pub extracted_at: DateTime<Utc>,
}

/// Association row for `raw_pokemon_abilities`.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityRow {
    pub pokemon_id: i64,
    pub pokemon_name: String,
    pub slot: i64,
    pub ability_name: String,
    pub is_hidden: bool,
    pub extracted_at: DateTime<Utc>,
}

/// Association row for `raw_pokemon_stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub pokemon_id: i64,
    pub pokemon_name: String,
    pub stat_name: String,
    pub base_stat: i64,
    pub effort: i64,
    pub extracted_at: DateTime<Utc>,
}

/// One fully melted detail payload: the entity row and its association rows.
#[derive(Debug, Clone)]
pub struct MeltedPokemon {
    pub pokemon: PokemonRow,
    pub types: Vec<TypeRow>,
    pub abilities: Vec<AbilityRow>,
    pub stats: Vec<StatRow>,
}

/// Melt a detail payload into staging rows.
///
/// Required fields raise [`Error::Load`] when missing or mistyped. Optional
/// fields fall back to their documented defaults: `is_default` true,
/// `is_hidden` false, `base_experience` and `order` NULL.
pub fn melt_pokemon(detail: &Value, extracted_at: DateTime<Utc>) -> Result<MeltedPokemon> {
    let id = require_i64(detail, "id")?;
    let name = require_str(detail, "name")?.to_string();

    let pokemon = PokemonRow {
        id,
        name: name.clone(),
        height: require_i64(detail, "height")?,
        weight: require_i64(detail, "weight")?,
        base_experience: optional_i64(detail, "base_experience"),
        is_default: detail
            .get("is_default")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        order_num: optional_i64(detail, "order"),
        extracted_at,
        raw_data: detail.to_string(),
    };

    let mut types = Vec::new();
    for entry in list_field(detail, "types") {
        types.push(TypeRow {
            pokemon_id: id,
            pokemon_name: name.clone(),
            slot: require_i64(entry, "slot")?,
            type_name: require_nested_name(entry, "type")?,
            extracted_at,
        });
    }

    let mut abilities = Vec::new();
    for entry in list_field(detail, "abilities") {
        abilities.push(AbilityRow {
            pokemon_id: id,
            pokemon_name: name.clone(),
            slot: require_i64(entry, "slot")?,
            ability_name: require_nested_name(entry, "ability")?,
            is_hidden: entry
                .get("is_hidden")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            extracted_at,
        });
    }

    let mut stats = Vec::new();
    for entry in list_field(detail, "stats") {
        stats.push(StatRow {
            pokemon_id: id,
            pokemon_name: name.clone(),
            stat_name: require_nested_name(entry, "stat")?,
            base_stat: require_i64(entry, "base_stat")?,
            effort: require_i64(entry, "effort")?,
            extracted_at,
        });
    }

    Ok(MeltedPokemon {
        pokemon,
        types,
        abilities,
        stats,
    })
}

/// Absent or non-array list fields melt to zero association rows.
fn list_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn require_i64(value: &Value, key: &str) -> Result<i64> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::Load(format!("missing integer field `{key}`")))
}

fn optional_i64(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(Value::as_i64)
}

fn require_str<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Load(format!("missing string field `{key}`")))
}

/// Project `{ "<key>": { "name": ... } }` to the inner name.
fn require_nested_name(entry: &Value, key: &str) -> Result<String> {
    entry
        .get(key)
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Load(format!("missing `{key}.name`")))
}
