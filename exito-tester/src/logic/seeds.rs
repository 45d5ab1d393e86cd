use anyhow::{Result, bail};
use exito_game::{normalize_room_code, room_seed};
use std::collections::HashSet;

/// A seed and, when it came from one, the room code that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub room_code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            room_code: None,
        }
    }

    #[must_use]
    pub fn from_room_code(code: String) -> Self {
        Self {
            seed: room_seed(&code),
            room_code: Some(code),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match &self.room_code {
            Some(code) => format!("{} ({code})", self.seed),
            None => self.seed.to_string(),
        }
    }
}

/// Resolve CLI seed tokens into seeds.
///
/// Accepts decimal integers (negative values use their magnitude), `0x` hex
/// literals and room codes, which play the game a room with that code would.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let info = if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            && let Ok(value) = u64::from_str_radix(&hex.replace('_', ""), 16)
        {
            SeedInfo::from_numeric(value)
        } else if let Some(code) = normalize_room_code(token) {
            SeedInfo::from_room_code(code)
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(1337));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numbers_hex_and_room_codes() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xFF", "k7pq2m"])).unwrap();
        assert_eq!(seeds[0], SeedInfo::from_numeric(42));
        assert_eq!(seeds[1].seed, 7);
        assert_eq!(seeds[2].seed, 255);
        assert_eq!(seeds[3].room_code.as_deref(), Some("K7PQ2M"));
        assert_eq!(seeds[3].seed, room_seed("K7PQ2M"));
    }

    #[test]
    fn duplicates_collapse_and_empty_defaults() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "0x5", "5"])).unwrap();
        assert_eq!(seeds.len(), 1);
        let fallback = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(fallback, vec![SeedInfo::from_numeric(1337)]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(resolve_seed_inputs(&tokens(&["not-a-seed"])).is_err());
    }
}
