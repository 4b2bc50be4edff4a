use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const API_BASE: &str = "https://www.googleapis.com";
const RESULT_COUNT: u8 = 5;

/// Fan/wiki domains the walkthrough search is restricted to.
const SEARCH_SITES: &[&str] = &[
    "gamefaqs.gamespot.com",
    "ign.com",
    "bulbapedia.bulbagarden.net",
];

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("GOOGLE_API_KEY or GOOGLE_CSE_ID not set; walkthrough search is unavailable")]
    CredentialsNotSet,

    #[error("Search API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// One search hit, in engine ranking order. No uniqueness is enforced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkthroughResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// Ranked walkthrough search for a game + topic.
/// Implemented by `GoogleSearchClient` for production; mocks in pipeline tests.
pub trait WalkthroughSearch {
    async fn search_walkthroughs(
        &self,
        game: &str,
        topic: &str,
    ) -> Result<Vec<WalkthroughResult>, SearchError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for the Google Custom Search JSON API.
#[derive(Clone)]
pub struct GoogleSearchClient {
    http: Client,
    credentials: Option<(ApiKey, String)>,
    base_url: String,
}

impl GoogleSearchClient {
    /// Reads `GOOGLE_API_KEY` and `GOOGLE_CSE_ID` from the environment.
    /// Missing credentials are not an error until the first call.
    pub fn from_env(http: Client) -> Self {
        let key = non_empty_env("GOOGLE_API_KEY").map(ApiKey);
        let cx = non_empty_env("GOOGLE_CSE_ID");
        let credentials = key.zip(cx);
        if credentials.is_none() {
            warn!("GOOGLE_API_KEY / GOOGLE_CSE_ID not set; walkthrough search will fail");
        }
        Self {
            http,
            credentials,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            credentials: Some((ApiKey("test-key".to_string()), "test-cx".to_string())),
            base_url: base_url.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn without_credentials(http: Client, base_url: &str) -> Self {
        Self {
            http,
            credentials: None,
            base_url: base_url.to_string(),
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WalkthroughSearch for GoogleSearchClient {
    async fn search_walkthroughs(
        &self,
        game: &str,
        topic: &str,
    ) -> Result<Vec<WalkthroughResult>, SearchError> {
        let (key, cx) = self
            .credentials
            .as_ref()
            .ok_or(SearchError::CredentialsNotSet)?;

        let url = format!("{}/customsearch/v1", self.base_url);
        let query = build_query(game, topic);
        let num = RESULT_COUNT.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", key.0.as_str()),
                ("cx", cx.as_str()),
                ("q", query.as_str()),
                ("num", num.as_str()),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!("search API rate limited");
                return Err(SearchError::RateLimited);
            }
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "search API error");
            return Err(SearchError::Api {
                code: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let body: SearchResponse = response.json().await?;
        let results = collect_results(body);
        debug!(query = %query, hits = results.len(), "walkthrough search complete");
        Ok(results)
    }
}

fn build_query(game: &str, topic: &str) -> String {
    let sites = SEARCH_SITES
        .iter()
        .map(|s| format!("site:{s}"))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{game} {topic} {sites}")
}

/// Items without a link are useless to render and are skipped; missing
/// titles and snippets degrade to empty strings.
fn collect_results(body: SearchResponse) -> Vec<WalkthroughResult> {
    body.items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| {
            let link = item.link.filter(|l| !l.is_empty())?;
            Some(WalkthroughResult {
                title: item.title.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
                link,
            })
        })
        .collect()
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}
