use std::collections::BTreeSet;

use crate::pipeline::{Answer, PokemonOutcome};
use crate::pokeapi::PokemonDetails;

/// Icon per Pokémon type, for terminal-friendly Markdown.
const TYPE_ICONS: &[(&str, &str)] = &[
    ("normal", "⬜"),
    ("fire", "🔥"),
    ("water", "💧"),
    ("electric", "⚡"),
    ("grass", "🍃"),
    ("ice", "❄️"),
    ("fighting", "🥊"),
    ("poison", "☠️"),
    ("ground", "🌍"),
    ("flying", "🕊️"),
    ("psychic", "🔮"),
    ("bug", "🐛"),
    ("rock", "🪨"),
    ("ghost", "👻"),
    ("dragon", "🐉"),
    ("dark", "🌑"),
    ("steel", "⚙️"),
    ("fairy", "🧚"),
];

pub fn render(question: &str, answer: &Answer) -> String {
    let mut out = format!("# {}\n\n", sanitize_heading(question));

    if let Some(error) = &answer.error {
        out.push_str(&format!("**Error:** {error}\n"));
        return out;
    }

    if let Some(query) = &answer.query {
        out.push_str("## Extracted fields\n\n");
        out.push_str(&format!("- Game: {}\n", query.game.as_deref().unwrap_or("-")));
        out.push_str(&format!("- Intent: {}\n", query.intent.as_deref().unwrap_or("-")));
        out.push_str(&format!(
            "- Pokémon: {}\n\n",
            query.pokemon.as_deref().unwrap_or("-")
        ));
    }

    out.push_str("## Walkthroughs\n\n");
    if answer.walkthroughs.is_empty() {
        out.push_str("No walkthroughs found.\n\n");
    } else {
        for result in &answer.walkthroughs {
            out.push_str(&format!(
                "- [{}]({})\n",
                escape_md_link(&result.title),
                escape_md_link(&result.link)
            ));
            if !result.snippet.is_empty() {
                out.push_str(&format!("  {}\n", result.snippet));
            }
        }
        out.push('\n');
    }

    if let Some(article) = &answer.article {
        out.push_str("## Guide\n\n");
        out.push_str(article);
        out.push_str("\n\n");
    }

    match &answer.pokemon {
        Some(PokemonOutcome::Found(details)) => {
            out.push_str(&format!("## Pokémon: {}\n\n", details.name));
            push_details(&mut out, details);
        }
        Some(PokemonOutcome::Unavailable { error }) => {
            out.push_str("## Pokémon\n\n");
            out.push_str(&format!("> ⚠ {error}\n"));
        }
        None => {}
    }

    out
}

pub fn render_pokemon_page(details: &PokemonDetails) -> String {
    let mut out = format!("# {}\n\n", details.name);
    push_details(&mut out, details);
    out
}

/// Side-by-side base stats and types, one column per Pokémon.
pub fn render_comparison(a: &PokemonDetails, b: &PokemonDetails) -> String {
    let mut out = format!("# {} vs {}\n\n", a.name, b.name);
    out.push_str(&format!("**{} type(s):** {}\n\n", a.name, render_types(&a.types)));
    out.push_str(&format!("**{} type(s):** {}\n\n", b.name, render_types(&b.types)));

    out.push_str(&format!("| Stat | {} | {} |\n|---|---:|---:|\n", a.name, b.name));
    let stat_names: BTreeSet<&String> = a.stats.keys().chain(b.stats.keys()).collect();
    for stat in stat_names {
        let left = a.stats.get(stat).map_or("-".to_string(), |v| v.to_string());
        let right = b.stats.get(stat).map_or("-".to_string(), |v| v.to_string());
        out.push_str(&format!("| {stat} | {left} | {right} |\n"));
    }
    out
}

fn push_details(out: &mut String, details: &PokemonDetails) {
    out.push_str(&format!("**Type(s):** {}\n\n", render_types(&details.types)));

    if !details.abilities.is_empty() {
        out.push_str(&format!("**Abilities:** {}\n\n", details.abilities.join(", ")));
    }

    if !details.stats.is_empty() {
        out.push_str("### Base stats\n\n| Stat | Value |\n|---|---:|\n");
        for (stat, value) in &details.stats {
            out.push_str(&format!("| {stat} | {value} |\n"));
        }
        out.push('\n');
    }

    if !details.location_encounters.is_empty() {
        out.push_str(&format!(
            "**Location encounters:** {}\n\n",
            details.location_encounters.join(", ")
        ));
    }

    if !details.associated_games.is_empty() {
        out.push_str(&format!(
            "**Games appeared in:** {}\n\n",
            details.associated_games.join(", ")
        ));
    }

    if !details.evolution_chain.is_empty() {
        out.push_str("**Evolution chain:**\n\n");
        for path in &details.evolution_chain {
            out.push_str(&format!("- {path}\n"));
        }
        out.push('\n');
    }

    if let Some(cry) = &details.cry_url {
        out.push_str(&format!("**Cry:** {cry}\n\n"));
    }

    if !details.sprites.is_empty() {
        out.push_str("### Sprites\n\n");
        for (label, url) in &details.sprites {
            out.push_str(&format!("- [{}]({})\n", label, escape_md_link(url)));
        }
        out.push('\n');
    }
}

fn render_types(types: &[String]) -> String {
    types
        .iter()
        .map(|t| format!("{} {t}", type_icon(t)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn type_icon(name: &str) -> &'static str {
    TYPE_ICONS
        .iter()
        .find(|(t, _)| name.eq_ignore_ascii_case(t))
        .map(|(_, icon)| *icon)
        .unwrap_or("❓")
}

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '[' | ']' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Headings must stay on one line.
fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
