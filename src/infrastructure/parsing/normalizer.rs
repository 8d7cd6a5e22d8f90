//! Type-specific post-processing of resolved characteristic text
//!
//! Normalization never fails: when no numeric value can be read the raw
//! text is kept as-is.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{AlcoholPercent, VolumeMl};

static VOLUME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*ml").expect("static regex"));

static ALCOHOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+\.?[0-9]*)\s*%?").expect("static regex"));

/// "750 ml" becomes 750; anything without an integer before "ml" stays raw
pub fn normalize_volume(raw: &str) -> VolumeMl {
    VOLUME_PATTERN
        .captures(&raw.to_lowercase())
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map(VolumeMl::Millilitres)
        .unwrap_or_else(|| VolumeMl::Raw(raw.to_string()))
}

/// "13,5%" becomes 13.5; decimal commas are read as points
pub fn normalize_alcohol(raw: &str) -> AlcoholPercent {
    ALCOHOL_PATTERN
        .captures(&raw.replace(',', "."))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(AlcoholPercent::Percent)
        .unwrap_or_else(|| AlcoholPercent::Raw(raw.to_string()))
}

/// Split a pairing sentence on `,` `;` `/` and the standalone `conjunction`.
///
/// Fragments are trimmed of whitespace and periods; empty ones are dropped.
/// Order is kept and duplicates are not removed.
pub fn split_pairings(raw: &str, conjunction: &str) -> Vec<String> {
    let separator = if conjunction.trim().is_empty() {
        r",|;|/".to_string()
    } else {
        format!(r",|;|/| {} ", regex::escape(conjunction.trim()))
    };

    let fragments: Vec<&str> = match Regex::new(&separator) {
        Ok(pattern) => pattern.split(raw).collect(),
        Err(_) => vec![raw],
    };

    fragments
        .into_iter()
        .map(|fragment| fragment.trim_matches(|c: char| c.is_whitespace() || c == '.'))
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}
