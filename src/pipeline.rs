use serde::Serialize;
use tracing::{debug, warn};

use crate::extract::{FieldExtractor, QueryFields};
use crate::google::{WalkthroughResult, WalkthroughSearch};
use crate::lang;
use crate::pokeapi::{PokemonDetails, PokemonSource};
use crate::translate::NameTranslator;
use crate::writer::ArticleWriter;

pub const NO_POKEMON_MENTIONED: &str = "No specific Pokémon mentioned in the question.";

/// Species data for the answer: either the details, or the reason they are
/// missing. Serializes as the details object or as `{"error": …}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PokemonOutcome {
    Found(PokemonDetails),
    Unavailable { error: String },
}

/// Everything the caller gets back for one question. Constructed once,
/// returned, discarded; fields are empty for the steps that did not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Answer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryFields>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub walkthroughs: Vec<WalkthroughResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pokemon: Option<PokemonOutcome>,
}

/// Answer a free-text question by composing the four collaborators in
/// sequence. Never errors: field extraction failure is the one fatal case
/// and yields an `Answer` holding only the top-level error; every other
/// collaborator failure degrades its own field and the rest still runs.
pub async fn answer_query(
    extractor: &impl FieldExtractor,
    search: &impl WalkthroughSearch,
    writer: &impl ArticleWriter,
    translator: &impl NameTranslator,
    dex: &impl PokemonSource,
    question: &str,
) -> Answer {
    let fields = match extractor.extract(question).await {
        Ok(fields) => fields,
        Err(e) => {
            warn!(error = %e, "field extraction failed");
            return Answer {
                error: Some(format!("Keyword extraction failed: {e}")),
                ..Answer::default()
            };
        }
    };
    debug!(?fields, "query fields");

    let mut walkthroughs = Vec::new();
    let mut article = None;
    if fields.game.is_some() || fields.intent.is_some() {
        let game = fields.game.as_deref().unwrap_or("");
        let intent = fields.intent.as_deref().unwrap_or("");
        walkthroughs = match search.search_walkthroughs(game, intent).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "walkthrough search failed");
                Vec::new()
            }
        };
        if !walkthroughs.is_empty() {
            article = Some(match writer.write_article(question, &walkthroughs).await {
                Ok(text) => text,
                Err(e) => format!("Failed to generate article: {e}"),
            });
        }
    }

    let pokemon = match fields.mentioned_pokemon() {
        Some(name) => {
            let name = resolve_name(translator, name).await;
            match dex.get_pokemon(&name).await {
                Ok(details) => PokemonOutcome::Found(details),
                Err(e) => PokemonOutcome::Unavailable {
                    error: format!("Failed to fetch Pokémon info for {name}: {e}"),
                },
            }
        }
        None => PokemonOutcome::Unavailable {
            error: NO_POKEMON_MENTIONED.to_string(),
        },
    };

    Answer {
        error: None,
        query: Some(fields),
        walkthroughs,
        article,
        pokemon: Some(pokemon),
    }
}

/// Swap a Japanese or Chinese name for the canonical English one before the
/// data-source call. Lookup failure is logged and swallowed; the original
/// spelling is the fallback either way.
async fn resolve_name(translator: &impl NameTranslator, name: &str) -> String {
    let Some(script) = lang::detect(name) else {
        return name.to_string();
    };
    match translator.to_english(name, script).await {
        Ok(Some(canonical)) => {
            debug!(name, canonical, "reverse lookup succeeded");
            canonical
        }
        Ok(None) => {
            warn!(name, "reverse lookup found no English name; using original");
            name.to_string()
        }
        Err(e) => {
            warn!(error = %e, name, "reverse lookup failed; using original");
            name.to_string()
        }
    }
}
