//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_SCORING__ENTITY_BOOST`).
//! [`Config::settings`] extracts the typed [`Settings`]; every field has a
//! default so an empty configuration is valid.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Wrap an already assembled figment (tests, embedding applications).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed, validated settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub retrieval: RetrievalSettings,
    pub scoring: ScoringSettings,
    pub embedding: EmbeddingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".into()));
        }
        if self.retrieval.batch_size == 0 {
            return Err(Error::InvalidConfig("retrieval.batch_size must be at least 1".into()));
        }
        if self.scoring.entity_boost.is_nan() || self.scoring.entity_boost < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "scoring.entity_boost must be >= 1.0, got {}",
                self.scoring.entity_boost
            )));
        }
        for (name, value) in [
            ("scoring.template_confidence", self.scoring.template_confidence),
            ("scoring.clarification_confidence", self.scoring.clarification_confidence),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{name} must be within [0, 100], got {value}")));
            }
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub records_dir: String,
    /// Read only the first `max_records` files (sorted by path).
    pub max_records: Option<usize>,
}

impl Default for DataSettings {
    fn default() -> Self { Self { records_dir: "data/colleges".to_string(), max_records: None } }
}

/// Which retriever the engine should try to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Vector search, degrading to lexical if the embedder cannot load.
    #[default]
    Auto,
    /// Same as `Auto`; degraded mode still applies.
    Vector,
    /// Skip the embedder entirely.
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub backend: BackendPreference,
    pub batch_size: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { top_k: 5, backend: BackendPreference::Auto, batch_size: 32 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub entity_boost: f32,
    pub template_confidence: f32,
    pub clarification_confidence: f32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self { entity_boost: 1.2, template_confidence: 95.0, clarification_confidence: 90.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<String>,
    pub max_len: usize,
    pub use_fake: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self { Self { model_dir: None, max_len: 256, use_fake: false } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
