use tracing::debug;

use crate::claude::{ClaudeClient, ClaudeError};
use crate::google::WalkthroughResult;

/// Synthesizes a prose walkthrough guide from the question and search hits.
/// Implemented by `ClaudeWriter` for production; mocks in pipeline tests.
pub trait ArticleWriter {
    async fn write_article(
        &self,
        question: &str,
        results: &[WalkthroughResult],
    ) -> Result<String, ClaudeError>;
}

const WRITER_SYSTEM: &str = "You are a Pokémon game guide writer. Using only the search results \
provided, write a concise step-by-step walkthrough answering the player's question. \
Cite the source links inline where they back a step. If the results do not answer \
the question, say so briefly rather than inventing steps.";

pub struct ClaudeWriter {
    client: ClaudeClient,
}

impl ClaudeWriter {
    pub fn new(client: ClaudeClient) -> Self {
        Self { client }
    }
}

impl ArticleWriter for ClaudeWriter {
    async fn write_article(
        &self,
        question: &str,
        results: &[WalkthroughResult],
    ) -> Result<String, ClaudeError> {
        let prompt = build_prompt(question, results);
        let article = self.client.complete(WRITER_SYSTEM, &prompt).await?;
        debug!(chars = article.len(), "article generated");
        Ok(article)
    }
}

fn build_prompt(question: &str, results: &[WalkthroughResult]) -> String {
    let mut prompt = format!("Question: {question}\n\nSearch results:\n");
    for (i, result) in results.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {}\n   {}\n   {}\n",
            i + 1,
            result.title,
            result.snippet,
            result.link
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(title: &str, snippet: &str, link: &str) -> WalkthroughResult {
        WalkthroughResult {
            title: title.into(),
            snippet: snippet.into(),
            link: link.into(),
        }
    }

    #[test]
    fn prompt_includes_question_and_numbered_results() {
        let results = vec![
            make_result("Guide A", "snippet a", "https://a.com"),
            make_result("Guide B", "snippet b", "https://b.com"),
        ];
        let prompt = build_prompt("Where do I catch Ralts?", &results);

        assert!(prompt.contains("Question: Where do I catch Ralts?"));
        assert!(prompt.contains("1. Guide A"));
        assert!(prompt.contains("2. Guide B"));
        assert!(prompt.contains("snippet a"));
        assert!(prompt.contains("https://b.com"));
    }

    #[test]
    fn prompt_with_no_results_still_has_question() {
        let prompt = build_prompt("anything", &[]);
        assert!(prompt.contains("Question: anything"));
    }
}
