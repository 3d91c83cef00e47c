use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Species data needed to register a new pokemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    /// Type names, primary first
    pub types: Vec<String>,
    pub abilities: Vec<SpeciesAbility>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesAbility {
    pub name: String,
    pub is_hidden: bool,
}

#[derive(Debug, Deserialize)]
struct NamedResourceList {
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PokemonRecord {
    name: String,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    slot: u32,
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    slot: u32,
    is_hidden: bool,
    ability: NamedResource,
}

/// API names are lower-case and hyphenated ("keen-eye"); stored names use spaces
pub fn canonical_name(api_name: &str) -> String {
    api_name.trim().replace('-', " ")
}

/// Parse a paginated resource list into canonical names, keeping API order
pub fn parse_name_list(body: &str) -> Result<Vec<String>> {
    let list: NamedResourceList = serde_json::from_str(body)
        .map_err(|e| Error::Connectivity(format!("Malformed resource list: {}", e)))?;

    Ok(list
        .results
        .iter()
        .map(|r| canonical_name(&r.name))
        .collect())
}

/// Parse a `/pokemon/{name}` response
pub fn parse_species(body: &str) -> Result<SpeciesData> {
    let mut record: PokemonRecord = serde_json::from_str(body)
        .map_err(|e| Error::Connectivity(format!("Malformed pokemon record: {}", e)))?;

    record.types.sort_by_key(|t| t.slot);
    record.abilities.sort_by_key(|a| a.slot);

    Ok(SpeciesData {
        name: canonical_name(&record.name),
        types: record
            .types
            .iter()
            .map(|t| canonical_name(&t.kind.name))
            .collect(),
        abilities: record
            .abilities
            .iter()
            .map(|a| SpeciesAbility {
                name: canonical_name(&a.ability.name),
                is_hidden: a.is_hidden,
            })
            .collect(),
    })
}
