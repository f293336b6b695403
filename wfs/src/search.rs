//! Recherche de station par nom

use std::sync::OnceLock;

use geojson::{Feature, FeatureCollection};
use regex::Regex;

/// Propriété portant le nom d'une station
pub const STATION_NAME_PROPERTY: &str = "nom_emt";

fn hyphen_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*-\s*").expect("valid hyphen pattern"))
}

/// Normalise un nom pour la comparaison: minuscules, tirets (et espaces
/// autour) remplacés par un espace simple
pub fn normalize_name(name: &str) -> String {
    hyphen_pattern()
        .replace_all(&name.to_lowercase(), " ")
        .into_owned()
}

/// Première station dont le nom contient le terme recherché
///
/// Retourne `None` si le terme est vide.
pub fn find_station<'a>(stations: &'a FeatureCollection, term: &str) -> Option<&'a Feature> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let needle = normalize_name(term);

    stations.features.iter().find(|feature| {
        feature
            .property(STATION_NAME_PROPERTY)
            .and_then(|v| v.as_str())
            .map(|name| normalize_name(name).contains(&needle))
            .unwrap_or(false)
    })
}

/// Toutes les stations correspondant au terme, dans l'ordre de la collection
pub fn filter_stations<'a>(stations: &'a FeatureCollection, term: &str) -> Vec<&'a Feature> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }
    let needle = normalize_name(term);

    stations
        .features
        .iter()
        .filter(|feature| {
            feature
                .property(STATION_NAME_PROPERTY)
                .and_then(|v| v.as_str())
                .is_some_and(|name| normalize_name(name).contains(&needle))
        })
        .collect()
}
