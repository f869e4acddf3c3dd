use anyhow::{anyhow, Result};
use std::path::Path;

/// Quote a word for `sh`. Plain words are returned as-is.
pub fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "/._-+@%:,=".contains(ch));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Expand a leading `~` or `~/` against `home`.
pub fn expand_tilde(input: &str, home: &Path) -> String {
    if input == "~" {
        home.display().to_string()
    } else if let Some(rest) = input.strip_prefix("~/") {
        home.join(rest).display().to_string()
    } else {
        input.to_string()
    }
}

/// Parse a depth/day/count answer. Blank input takes the default.
pub fn parse_positive(input: &str, default: u32) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    match input.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(anyhow!("'{}' is not a positive whole number", input)),
    }
}
