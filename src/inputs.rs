use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Split a comma-separated CLI value into trimmed, non-empty, unique items.
pub fn split_list(value: &str) -> Vec<String> {
    dedup(value.split(','))
}

/// Parse list file content: one item per line, blank lines and `#` comments skipped.
pub fn parse_items_str(content: &str) -> Vec<String> {
    dedup(content.lines().filter(|l| !l.trim_start().starts_with('#')))
}

/// Load a list file. Errors if the file cannot be read.
pub fn load_items_from_path(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read list file: {}", path.as_ref().display()))?;
    Ok(parse_items_str(&content))
}

/// Items from the inline value when given, otherwise from the file, otherwise none.
pub fn from_value_or_file(value: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    match (value, file) {
        (Some(v), _) if !v.trim().is_empty() => Ok(split_list(v)),
        (_, Some(path)) => load_items_from_path(path),
        _ => Ok(Vec::new()),
    }
}

fn dedup<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}
