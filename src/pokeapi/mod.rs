//! PokéAPI client: species records, evolution chains, and encounter locations.

mod chain;
pub(crate) mod client;
pub(crate) mod types;

pub use client::{PokeApiClient, PokeApiError, PokemonSource, normalize_name};
pub use types::PokemonDetails;
