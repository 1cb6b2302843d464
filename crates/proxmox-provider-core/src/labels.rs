//! Routing labels embedded in guest descriptions.
//!
//! A description holds one `key=value` pair per line; keys and values may be
//! wrapped in double quotes and surrounded by whitespace. Lines without `=`
//! are ordinary notes and are ignored.

use std::collections::HashMap;

/// Only keys with this prefix are retained.
pub const LABEL_PREFIX: &str = "traefik.";

/// Parse a description into a label map. Later lines overwrite earlier ones.
pub fn parse(description: &str) -> HashMap<String, String> {
    description
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (trim_label(key), trim_label(value)))
        .filter(|(key, _)| key.starts_with(LABEL_PREFIX))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn trim_label(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '"')
}
