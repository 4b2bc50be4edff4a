use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Game data for one species, assembled from several PokéAPI endpoints.
/// Fetched fresh per query; nothing is cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonDetails {
    pub name: String,
    pub sprites: BTreeMap<String, String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: BTreeMap<String, i64>,
    pub evolution_chain: Vec<String>,
    pub associated_games: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cry_url: Option<String>,
    pub location_encounters: Vec<String>,
}

// Wire types below mirror the slices of the PokéAPI payloads this client
// actually reads; everything else is ignored.

#[derive(Debug, Deserialize)]
pub struct PokemonResponse {
    pub name: String,
    pub sprites: Sprites,
    pub cries: Option<Cries>,
    pub types: Vec<TypeSlot>,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub game_indices: Vec<GameIndex>,
    pub species: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_shiny: Option<String>,
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork")]
    pub official_artwork: Option<ArtworkSprites>,
}

#[derive(Debug, Deserialize)]
pub struct ArtworkSprites {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Cries {
    pub latest: Option<String>,
    pub legacy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct StatSlot {
    pub base_stat: i64,
    pub stat: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct GameIndex {
    pub version: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesResponse {
    pub evolution_chain: Option<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRef {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionChainResponse {
    pub chain: ChainLink,
}

#[derive(Debug, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Deserialize)]
pub struct Encounter {
    pub location_area: NamedResource,
}
