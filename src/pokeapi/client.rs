use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Client;
use tracing::{debug, warn};

use super::chain;
use super::types::{
    Encounter, EvolutionChainResponse, PokemonDetails, PokemonResponse, SpeciesResponse,
};

const API_BASE: &str = "https://pokeapi.co/api/v2";

/// Characters to percent-encode when a name becomes a URL path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'?')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'[')
    .add(b']')
    .add(b';')
    .add(b'=');

#[derive(Debug, thiserror::Error)]
pub enum PokeApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("PokéAPI rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("PokéAPI error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Read-only species lookup by name.
/// Implemented by `PokeApiClient` for production; mocks in pipeline tests.
pub trait PokemonSource {
    async fn get_pokemon(&self, name: &str) -> Result<PokemonDetails, PokeApiError>;
}

/// Client for the public PokéAPI. No credentials required.
#[derive(Clone)]
pub struct PokeApiClient {
    http: Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, PokeApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;
        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(response.json().await?),
            404 => Err(PokeApiError::NotFound(path.trim_start_matches('/').to_string())),
            429 => Err(PokeApiError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(PokeApiError::Api {
                    code: status.as_u16(),
                    message: body.chars().take(200).collect(),
                })
            }
        }
    }

    /// Evolution paths for a species: species record → chain URL → chain tree.
    async fn fetch_evolution_paths(&self, species: &str) -> Result<Vec<String>, PokeApiError> {
        let species: SpeciesResponse = self
            .get_json(&format!("/pokemon-species/{}", encode_segment(species)))
            .await?;
        let Some(chain_ref) = species.evolution_chain else {
            return Ok(Vec::new());
        };
        let Some(id) = chain::resource_id(&chain_ref.url) else {
            warn!(url = %chain_ref.url, "unrecognized evolution chain URL");
            return Ok(Vec::new());
        };
        let response: EvolutionChainResponse =
            self.get_json(&format!("/evolution-chain/{id}")).await?;
        Ok(chain::flatten_paths(&response.chain))
    }
}

impl PokemonSource for PokeApiClient {
    /// Core record failures (unknown name, API down) are errors; the
    /// encounter and evolution sub-fetches degrade to empty lists with a
    /// logged warning.
    async fn get_pokemon(&self, name: &str) -> Result<PokemonDetails, PokeApiError> {
        let slug = normalize_name(name);
        let encoded = encode_segment(&slug);

        let pokemon: PokemonResponse = self.get_json(&format!("/pokemon/{encoded}")).await?;

        let location_encounters = match self
            .get_json::<Vec<Encounter>>(&format!("/pokemon/{encoded}/encounters"))
            .await
        {
            Ok(encounters) => encounters
                .into_iter()
                .map(|e| e.location_area.name)
                .collect(),
            Err(e) => {
                warn!(error = %e, slug, "encounter lookup failed");
                Vec::new()
            }
        };

        let evolution_chain = match self.fetch_evolution_paths(&pokemon.species.name).await {
            Ok(paths) => paths,
            Err(e) => {
                warn!(error = %e, slug, "evolution chain lookup failed");
                Vec::new()
            }
        };

        debug!(slug, "pokemon details assembled");
        Ok(build_details(pokemon, evolution_chain, location_encounters))
    }
}

/// Normalize a display name to the PokéAPI slug: `"Mr. Mime"` → `"mr-mime"`,
/// `"Farfetch'd"` → `"farfetchd"`.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['.', '\''], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn encode_segment(s: &str) -> String {
    utf8_percent_encode(s, SEGMENT_ENCODE_SET).to_string()
}

fn build_details(
    pokemon: PokemonResponse,
    evolution_chain: Vec<String>,
    location_encounters: Vec<String>,
) -> PokemonDetails {
    let mut sprites = BTreeMap::new();
    let labeled = [
        ("front_default", pokemon.sprites.front_default),
        ("back_default", pokemon.sprites.back_default),
        ("front_shiny", pokemon.sprites.front_shiny),
        ("back_shiny", pokemon.sprites.back_shiny),
        (
            "official_artwork",
            pokemon
                .sprites
                .other
                .and_then(|o| o.official_artwork)
                .and_then(|a| a.front_default),
        ),
    ];
    for (label, url) in labeled {
        if let Some(url) = url {
            sprites.insert(label.to_string(), url);
        }
    }

    let stats = pokemon
        .stats
        .into_iter()
        .map(|s| (s.stat.name, s.base_stat))
        .collect();

    let cry_url = pokemon.cries.and_then(|c| c.latest.or(c.legacy));

    PokemonDetails {
        name: pokemon.name,
        sprites,
        types: pokemon.types.into_iter().map(|t| t.kind.name).collect(),
        abilities: pokemon.abilities.into_iter().map(|a| a.ability.name).collect(),
        stats,
        evolution_chain,
        associated_games: pokemon
            .game_indices
            .into_iter()
            .map(|g| g.version.name)
            .collect(),
        cry_url,
        location_encounters,
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pokemon_body() -> serde_json::Value {
        serde_json::json!({
            "name": "ralts",
            "sprites": {
                "front_default": "https://img/ralts-front.png",
                "back_default": null,
                "front_shiny": "https://img/ralts-shiny.png",
                "back_shiny": null,
                "other": {
                    "official-artwork": {"front_default": "https://img/ralts-art.png"}
                }
            },
            "cries": {"latest": "https://cries/ralts.ogg", "legacy": null},
            "types": [
                {"slot": 1, "type": {"name": "psychic", "url": ""}},
                {"slot": 2, "type": {"name": "fairy", "url": ""}}
            ],
            "abilities": [
                {"ability": {"name": "synchronize", "url": ""}, "is_hidden": false},
                {"ability": {"name": "trace", "url": ""}, "is_hidden": false}
            ],
            "stats": [
                {"base_stat": 28, "stat": {"name": "hp", "url": ""}},
                {"base_stat": 25, "stat": {"name": "attack", "url": ""}}
            ],
            "game_indices": [
                {"game_index": 280, "version": {"name": "ruby", "url": ""}},
                {"game_index": 280, "version": {"name": "emerald", "url": ""}}
            ],
            "species": {"name": "ralts", "url": "https://pokeapi.co/api/v2/pokemon-species/280/"}
        })
    }

    async fn mount_happy_path(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/pokemon/ralts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon/ralts/encounters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"location_area": {"name": "hoenn-route-102-area", "url": ""}}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon-species/ralts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "evolution_chain": {"url": "https://pokeapi.co/api/v2/evolution-chain/140/"}
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/evolution-chain/140"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "chain": {
                    "species": {"name": "ralts", "url": ""},
                    "evolves_to": [{
                        "species": {"name": "kirlia", "url": ""},
                        "evolves_to": [
                            {"species": {"name": "gardevoir", "url": ""}, "evolves_to": []},
                            {"species": {"name": "gallade", "url": ""}, "evolves_to": []}
                        ]
                    }]
                }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn assembles_full_details() {
        let server = MockServer::start().await;
        mount_happy_path(&server).await;

        let client = PokeApiClient::with_base_url(Client::new(), &server.uri());
        let details = client.get_pokemon("Ralts").await.unwrap();

        assert_eq!(details.name, "ralts");
        assert_eq!(details.types, vec!["psychic", "fairy"]);
        assert_eq!(details.abilities, vec!["synchronize", "trace"]);
        assert_eq!(details.stats.get("hp"), Some(&28));
        assert_eq!(details.stats.get("attack"), Some(&25));
        assert_eq!(
            details.sprites.get("official_artwork").map(String::as_str),
            Some("https://img/ralts-art.png")
        );
        assert!(!details.sprites.contains_key("back_default"));
        assert_eq!(details.cry_url.as_deref(), Some("https://cries/ralts.ogg"));
        assert_eq!(details.associated_games, vec!["ruby", "emerald"]);
        assert_eq!(details.location_encounters, vec!["hoenn-route-102-area"]);
        assert_eq!(
            details.evolution_chain,
            vec!["ralts → kirlia → gardevoir", "ralts → kirlia → gallade"]
        );
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/missingno"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = PokeApiClient::with_base_url(Client::new(), &server.uri());
        let err = client.get_pokemon("missingno").await.unwrap_err();
        assert!(matches!(err, PokeApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn sub_fetch_failures_degrade_to_empty_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/ralts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon/ralts/encounters"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon-species/ralts"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PokeApiClient::with_base_url(Client::new(), &server.uri());
        let details = client.get_pokemon("ralts").await.unwrap();

        assert!(details.location_encounters.is_empty());
        assert!(details.evolution_chain.is_empty());
        assert_eq!(details.types, vec!["psychic", "fairy"]);
    }

    #[tokio::test]
    async fn species_without_chain_has_no_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/tauros"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "tauros",
                "sprites": {"front_default": null, "back_default": null,
                            "front_shiny": null, "back_shiny": null, "other": null},
                "cries": null,
                "types": [{"slot": 1, "type": {"name": "normal", "url": ""}}],
                "abilities": [],
                "stats": [],
                "game_indices": [],
                "species": {"name": "tauros", "url": ""}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon/tauros/encounters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon-species/tauros"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "evolution_chain": null
            })))
            .mount(&server)
            .await;

        let client = PokeApiClient::with_base_url(Client::new(), &server.uri());
        let details = client.get_pokemon("tauros").await.unwrap();
        assert!(details.evolution_chain.is_empty());
        assert!(details.cry_url.is_none());
        assert!(details.sprites.is_empty());
    }
}
