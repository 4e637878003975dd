//! Runtime configuration
//!
//! Defaults live here as constants; `AnalyzerConfig::from_env` reads the
//! `SLICELENS_*` overrides. Anything that fails to parse keeps its default.

use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::presets::RetryPolicy;

// =================================
// Preset catalog defaults
// =================================
pub const DEFAULT_PROFILE_ROOT: &str = "https://obico-public.s3.amazonaws.com/slicer-profiles/";
pub const DEFAULT_CATALOG_FILE: &str = "presets.json";
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
pub const DEFAULT_FETCH_BACKOFF_MS: u64 = 1000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

// =================================
// Upload limits
// =================================
pub const DEFAULT_MAX_PROJECT_BYTES: usize = 4_718_592; // 4.5 MiB
pub const DEFAULT_MAX_GCODE_BYTES: usize = 20 * 1024 * 1024; // decompressed

// =================================
// LLM defaults
// =================================
pub const DEFAULT_LLM_PROVIDER: &str = "openai";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;

/// LLM backends the analyzer knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
    Ollama,
    Groq,
    Mistral,
    DeepSeek,
}

impl ProviderKind {
    /// Parse provider name (case insensitive)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "google" => Some(Self::Google),
            "ollama" => Some(Self::Ollama),
            "groq" => Some(Self::Groq),
            "mistral" => Some(Self::Mistral),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Groq => "groq",
            ProviderKind::Mistral => "mistral",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Local backends run without credentials
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

/// Everything an [`crate::Analyzer`] needs besides its collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Base URL of the preset store, always ending in `/`
    pub profile_root: String,
    /// Catalog document name, relative to `profile_root`
    pub catalog_file: String,
    pub fetch_attempts: u32,
    pub fetch_backoff: Duration,
    pub fetch_timeout: Duration,
    pub max_project_bytes: usize,
    pub max_gcode_bytes: usize,
    /// Provider name as given; validated when the provider is built
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_api_key: String,
    pub llm_temperature: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            profile_root: DEFAULT_PROFILE_ROOT.to_string(),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            fetch_backoff: Duration::from_millis(DEFAULT_FETCH_BACKOFF_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            max_project_bytes: DEFAULT_MAX_PROJECT_BYTES,
            max_gcode_bytes: DEFAULT_MAX_GCODE_BYTES,
            llm_provider: DEFAULT_LLM_PROVIDER.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: String::new(),
            llm_temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

impl AnalyzerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let profile_root = non_empty("SLICELENS_PROFILE_ROOT")
            .or_else(|| non_empty("PROFILE_ROOT"))
            .unwrap_or(defaults.profile_root);

        Self {
            profile_root: normalize_root(&profile_root),
            catalog_file: non_empty("SLICELENS_CATALOG_FILE").unwrap_or(defaults.catalog_file),
            fetch_attempts: parse_or(
                "SLICELENS_FETCH_ATTEMPTS",
                non_empty("SLICELENS_FETCH_ATTEMPTS"),
                defaults.fetch_attempts,
            )
            .max(1),
            fetch_backoff: Duration::from_millis(parse_or(
                "SLICELENS_FETCH_BACKOFF_MS",
                non_empty("SLICELENS_FETCH_BACKOFF_MS"),
                DEFAULT_FETCH_BACKOFF_MS,
            )),
            fetch_timeout: Duration::from_millis(parse_or(
                "SLICELENS_FETCH_TIMEOUT_MS",
                non_empty("SLICELENS_FETCH_TIMEOUT_MS"),
                DEFAULT_FETCH_TIMEOUT_MS,
            )),
            max_project_bytes: parse_or(
                "SLICELENS_MAX_PROJECT_BYTES",
                non_empty("SLICELENS_MAX_PROJECT_BYTES"),
                defaults.max_project_bytes,
            ),
            max_gcode_bytes: parse_or(
                "SLICELENS_MAX_GCODE_BYTES",
                non_empty("SLICELENS_MAX_GCODE_BYTES"),
                defaults.max_gcode_bytes,
            ),
            llm_provider: non_empty("SLICELENS_LLM_PROVIDER").unwrap_or(defaults.llm_provider),
            llm_model: non_empty("SLICELENS_LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_api_key: non_empty("SLICELENS_LLM_API_KEY")
                .or_else(|| non_empty("OPENAI_API_KEY"))
                .unwrap_or_default(),
            llm_temperature: parse_or(
                "SLICELENS_LLM_TEMPERATURE",
                non_empty("SLICELENS_LLM_TEMPERATURE"),
                defaults.llm_temperature,
            ),
        }
    }

    /// Override the profile root, keeping the trailing-slash invariant
    pub fn with_profile_root(mut self, root: &str) -> Self {
        self.profile_root = normalize_root(root);
        self
    }

    /// Full URL of the preset catalog
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.profile_root, self.catalog_file)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.fetch_attempts, self.fetch_backoff, self.fetch_timeout)
    }
}

fn normalize_root(root: &str) -> String {
    let trimmed = root.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("⚠️ Ignoring {key}={value}: not a valid value, keeping default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AnalyzerConfig::from_lookup(|_| None);
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(
            config.catalog_url(),
            "https://obico-public.s3.amazonaws.com/slicer-profiles/presets.json"
        );
    }

    #[test]
    fn test_profile_root_fallback_and_normalisation() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[(
            "PROFILE_ROOT",
            "http://localhost:9000/profiles",
        )]));
        assert_eq!(config.profile_root, "http://localhost:9000/profiles/");

        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("PROFILE_ROOT", "http://ignored/"),
            ("SLICELENS_PROFILE_ROOT", "http://preferred/"),
        ]));
        assert_eq!(config.profile_root, "http://preferred/");
    }

    #[test]
    fn test_bad_numbers_keep_defaults() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("SLICELENS_FETCH_ATTEMPTS", "lots"),
            ("SLICELENS_FETCH_TIMEOUT_MS", "250"),
            ("SLICELENS_LLM_TEMPERATURE", "warm"),
        ]));
        assert_eq!(config.fetch_attempts, DEFAULT_FETCH_ATTEMPTS);
        assert_eq!(config.fetch_timeout, Duration::from_millis(250));
        assert_eq!(config.llm_temperature, DEFAULT_LLM_TEMPERATURE);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let config =
            AnalyzerConfig::from_lookup(lookup_from(&[("SLICELENS_FETCH_ATTEMPTS", "0")]));
        assert_eq!(config.fetch_attempts, 1);
    }

    #[test]
    fn test_api_key_fallback() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")]));
        assert_eq!(config.llm_api_key, "sk-test");
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("ollama"), Some(ProviderKind::Ollama));
        assert_eq!(ProviderKind::parse("skynet"), None);
        assert!(!ProviderKind::Ollama.requires_api_key());
        assert!(ProviderKind::DeepSeek.requires_api_key());
        assert_eq!(ProviderKind::Groq.as_str(), "groq");
    }
}
