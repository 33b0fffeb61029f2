use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn env_true(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|val| {
        let trimmed = val.trim();
        !trimmed.is_empty() && !matches!(trimmed, "0" | "false" | "FALSE" | "False")
    })
}

fn bool_from_env(key: &str, default: bool) -> bool {
    env_true(key).unwrap_or(default)
}

/// Whether an unresolved plain segment is retried as a parameterless call.
pub fn implicit_calls() -> bool {
    static IMPLICIT: OnceLock<bool> = OnceLock::new();
    *IMPLICIT.get_or_init(|| bool_from_env("REFLEKT_IMPLICIT_CALLS", true))
}

/// Whether expressions need the `@` sentinel to be evaluated dynamically.
pub fn expression_flags() -> bool {
    static FLAGS: OnceLock<bool> = OnceLock::new();
    *FLAGS.get_or_init(|| bool_from_env("REFLEKT_EXPRESSION_FLAGS", false))
}

pub fn match_cache() -> bool {
    static CACHE: OnceLock<bool> = OnceLock::new();
    *CACHE.get_or_init(|| bool_from_env("REFLEKT_MATCH_CACHE", true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub implicit_calls: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            implicit_calls: implicit_calls(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    pub flag_gating: bool,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            flag_gating: expression_flags(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub cache: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            cache: match_cache(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflektConfig {
    pub parser: ParserConfig,
    pub expressions: ExpressionConfig,
    pub matcher: MatcherConfig,
}

impl ReflektConfig {
    /// Defaults taken from the `REFLEKT_*` environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Missing sections and keys fall back to the environment defaults.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
