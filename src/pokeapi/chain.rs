use url::Url;

use super::types::ChainLink;

/// Numeric id at the end of a PokéAPI resource URL
/// (`https://pokeapi.co/api/v2/evolution-chain/67/` → `67`).
pub(super) fn resource_id(url: &str) -> Option<u64> {
    Url::parse(url)
        .ok()?
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()?
        .parse()
        .ok()
}

/// Flatten an evolution tree into one string per root-to-leaf path,
/// e.g. `"ralts → kirlia → gardevoir"`. Branching chains (Eevee) yield one
/// path per final form; species that never evolve yield their own name.
pub(super) fn flatten_paths(root: &ChainLink) -> Vec<String> {
    let mut paths = Vec::new();
    let mut trail = Vec::new();
    walk(root, &mut trail, &mut paths);
    paths
}

fn walk<'a>(link: &'a ChainLink, trail: &mut Vec<&'a str>, out: &mut Vec<String>) {
    trail.push(&link.species.name);
    if link.evolves_to.is_empty() {
        out.push(trail.join(" → "));
    } else {
        for next in &link.evolves_to {
            walk(next, trail, out);
        }
    }
    trail.pop();
}
