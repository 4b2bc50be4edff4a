mod claude;
mod extract;
mod google;
mod lang;
mod pipeline;
mod pokeapi;
mod report;
mod translate;
mod writer;

pub const USER_AGENT: &str = concat!("pokeguide/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use claude::ClaudeClient;
use extract::ClaudeExtractor;
use google::GoogleSearchClient;
use pokeapi::{PokeApiClient, PokemonSource};
use translate::ClaudeTranslator;
use writer::ClaudeWriter;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Parser)]
#[command(
    name = "pokeguide",
    version,
    about = "Ask questions about Pokémon games: walkthrough search, generated guides, and species data"
)]
struct Cli {
    /// Print results as JSON instead of Markdown.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a free-text question, e.g. "Where do I catch Ralts in Emerald?"
    Ask {
        /// The question; bare words are joined, so quoting is optional.
        question: Vec<String>,
    },
    /// Look up species data for one Pokémon.
    Pokemon { name: String },
    /// Compare the base stats and types of two Pokémon.
    Compare { first: String, second: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pokeguide=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;

    match cli.command {
        Command::Ask { question } => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                return Err("question must not be empty".into());
            }

            let model = ClaudeClient::from_env(http.clone());
            let extractor = ClaudeExtractor::new(model.clone());
            let writer = ClaudeWriter::new(model.clone());
            let translator = ClaudeTranslator::new(model);
            let search = GoogleSearchClient::from_env(http.clone());
            let dex = PokeApiClient::new(http);

            info!(question = %question, "answering query");
            let answer =
                pipeline::answer_query(&extractor, &search, &writer, &translator, &dex, &question)
                    .await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", report::render(&question, &answer));
            }
        }
        Command::Pokemon { name } => {
            let dex = PokeApiClient::new(http);
            let details = dex.get_pokemon(&name).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                println!("{}", report::render_pokemon_page(&details));
            }
        }
        Command::Compare { first, second } => {
            let dex = PokeApiClient::new(http);
            let (first, second) =
                futures::future::join(dex.get_pokemon(&first), dex.get_pokemon(&second)).await;
            let (first, second) = (first?, second?);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!([first, second]))?
                );
            } else {
                println!("{}", report::render_comparison(&first, &second));
            }
        }
    }

    Ok(())
}
