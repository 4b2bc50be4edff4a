use tracing::debug;

use crate::claude::{ClaudeClient, ClaudeError};
use crate::lang::Script;

/// Reverse lookup from a non-English species name to the canonical English
/// one used as the data-source key. `Ok(None)` means the name could not be
/// resolved; callers fall back to the original spelling.
pub trait NameTranslator {
    async fn to_english(&self, name: &str, script: Script) -> Result<Option<String>, ClaudeError>;
}

const TRANSLATE_SYSTEM: &str = "You translate Pokémon species names to their official English names. \
Reply with the English name only, nothing else. If the input is not a Pokémon \
species you recognize, reply with the single word: unknown";

pub struct ClaudeTranslator {
    client: ClaudeClient,
}

impl ClaudeTranslator {
    pub fn new(client: ClaudeClient) -> Self {
        Self { client }
    }
}

impl NameTranslator for ClaudeTranslator {
    async fn to_english(&self, name: &str, script: Script) -> Result<Option<String>, ClaudeError> {
        let prompt = format!(
            "Official English name of the Pokémon called \"{name}\" ({} name):",
            script.language_name()
        );
        let raw = self.client.complete(TRANSLATE_SYSTEM, &prompt).await?;
        let canonical = parse_name(&raw);
        debug!(name, canonical = canonical.as_deref(), "reverse lookup");
        Ok(canonical)
    }
}

/// Normalize the model's reply to a lowercase lookup key, or `None` when it
/// declined. Takes the first line only and strips surrounding quotes.
fn parse_name(raw: &str) -> Option<String> {
    let line = raw.trim().lines().next()?.trim();
    let line = line
        .trim_end_matches('.')
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”'));
    if line.is_empty() || line.eq_ignore_ascii_case("unknown") {
        return None;
    }
    Some(line.to_lowercase())
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use reqwest::Client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn japanese_name_resolves_to_english() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Bulbasaur"}]
            })))
            .mount(&server)
            .await;

        let translator =
            ClaudeTranslator::new(ClaudeClient::with_base_url(Client::new(), &server.uri()));
        let canonical = translator
            .to_english("フシギダネ", Script::Japanese)
            .await
            .unwrap();
        assert_eq!(canonical.as_deref(), Some("bulbasaur"));
    }

    #[tokio::test]
    async fn unrecognized_name_resolves_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "unknown"}]
            })))
            .mount(&server)
            .await;

        let translator =
            ClaudeTranslator::new(ClaudeClient::with_base_url(Client::new(), &server.uri()));
        let canonical = translator
            .to_english("謎のポケモン", Script::Japanese)
            .await
            .unwrap();
        assert_eq!(canonical, None);
    }
}
