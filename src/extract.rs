use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::claude::{ClaudeClient, ClaudeError};

/// Structured fields pulled out of a free-text question. Produced once per
/// query and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFields {
    pub game: Option<String>,
    pub intent: Option<String>,
    pub pokemon: Option<String>,
}

impl QueryFields {
    /// The mentioned Pokémon, if any. The extractor uses the string `"none"`
    /// as a sentinel for "no Pokémon in the question"; blanks count as absent.
    pub fn mentioned_pokemon(&self) -> Option<&str> {
        self.pokemon
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("none"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{0}")]
    Model(#[from] ClaudeError),

    #[error("could not parse fields from model output: {0}")]
    Parse(String),
}

/// Turns free-text user input into `QueryFields`.
/// Implemented by `ClaudeExtractor` for production; mocks in pipeline tests.
pub trait FieldExtractor {
    async fn extract(&self, question: &str) -> Result<QueryFields, ExtractError>;
}

const EXTRACT_SYSTEM: &str = "You extract structured fields from questions about Pokémon video games. \
Reply with a single JSON object and nothing else, using exactly these keys: \
\"game\" (the game title mentioned, e.g. \"Emerald\", or null), \
\"intent\" (a short phrase for what the player wants to do, e.g. \"catch-location\", or null), \
\"pokemon\" (the Pokémon species mentioned, in the language the user wrote it, or the string \"none\" if no species is mentioned).";

pub struct ClaudeExtractor {
    client: ClaudeClient,
}

impl ClaudeExtractor {
    pub fn new(client: ClaudeClient) -> Self {
        Self { client }
    }
}

impl FieldExtractor for ClaudeExtractor {
    async fn extract(&self, question: &str) -> Result<QueryFields, ExtractError> {
        let raw = self.client.complete(EXTRACT_SYSTEM, question).await?;
        let fields = parse_fields(&raw)?;
        debug!(?fields, "fields extracted");
        Ok(fields)
    }
}

/// Parse the model's reply into `QueryFields`.
///
/// Models occasionally wrap the JSON in code fences or prose, so this slices
/// from the first `{` to the last `}` before deserializing.
fn parse_fields(raw: &str) -> Result<QueryFields, ExtractError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ExtractError::Parse(format!(
            "no JSON object in reply: {}",
            snippet(raw)
        )));
    };
    if end < start {
        return Err(ExtractError::Parse(format!(
            "malformed reply: {}",
            snippet(raw)
        )));
    }
    serde_json::from_str(&raw[start..=end])
        .map_err(|e| ExtractError::Parse(format!("{e}: {}", snippet(raw))))
}

fn snippet(raw: &str) -> String {
    raw.chars().take(120).collect()
}
