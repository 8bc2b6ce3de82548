//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge compiled-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g. `APP_RETRIEVAL__ALPHA`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against the directory the config was loaded from.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf(), env_name };
        config.validate_for_env()?;
        Ok(config)
    }

    /// Wraps an already assembled figment; defaults are merged underneath it.
    pub fn from_figment(figment: Figment, base_dir: &Path, env_name: &str) -> Self {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(figment);
        Self { figment, base_dir: base_dir.to_path_buf(), env_name: env_name.to_string() }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extracts, validates and path-resolves the full settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        settings.data.resolve_against(&self.base_dir);
        if let Some(dir) = settings.embedding.model_dir.take() {
            settings.embedding.model_dir = Some(resolve_with_base(&self.base_dir, dir.to_string_lossy()));
        }
        Ok(settings)
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    fn validate_for_env(&self) -> anyhow::Result<()> {
        match self.env_name.as_str() {
            "prod" | "production" => {
                let use_fake: bool = self.get("embedding.use_fake").unwrap_or(false);
                if use_fake {
                    return Err(Error::InvalidConfig("embedding.use_fake must be false in production".into()).into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub data: DataSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        let r = &self.retrieval;
        if !(0.0..=1.0).contains(&r.alpha) {
            return Err(Error::InvalidConfig(format!("retrieval.alpha must be within [0, 1], got {}", r.alpha)));
        }
        if r.top_candidates == 0 {
            return Err(Error::InvalidConfig("retrieval.top_candidates must be at least 1".into()));
        }
        if r.top_k_vector == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k_vector must be at least 1".into()));
        }
        if self.embedding.fake_dim == 0 {
            return Err(Error::InvalidConfig("embedding.fake_dim must be at least 1".into()));
        }
        Ok(())
    }
}

/// Score fusion knobs. `alpha` weights the vector side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    pub alpha: f32,
    pub top_k_vector: usize,
    pub top_candidates: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { alpha: 0.5, top_k_vector: 3, top_candidates: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub clinical_path: PathBuf,
    pub disease_path: PathBuf,
    pub pharma_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            clinical_path: PathBuf::from("database/clinical_data.json"),
            disease_path: PathBuf::from("database/disease_symptoms.json"),
            pharma_path: PathBuf::from("database/pharma.json"),
            cache_dir: PathBuf::from("database/embeddings"),
        }
    }
}

impl DataSettings {
    fn resolve_against(&mut self, base: &Path) {
        for p in [&mut self.clinical_path, &mut self.disease_path, &mut self.pharma_path, &mut self.cache_dir] {
            *p = resolve_with_base(base, p.to_string_lossy());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<PathBuf>,
    pub use_fake: bool,
    pub fake_dim: usize,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, fake_dim: 384, max_len: 256 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub gemini_model: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            gemini_model: "gemini-2.0-flash-lite-preview-02-05".to_string(),
            timeout_secs: 60,
        }
    }
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
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from_toml(toml: &str) -> Config {
        Config::from_figment(Figment::from(Toml::string(toml)), Path::new("/srv/vet"), "test")
    }

    #[test]
    fn defaults_are_valid() {
        let settings = config_from_toml("").settings().expect("settings");
        assert_eq!(settings.retrieval, RetrievalSettings::default());
        assert_eq!(settings.data.pharma_path, PathBuf::from("/srv/vet/database/pharma.json"));
        assert_eq!(settings.llm.provider, ProviderKind::Ollama);
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let settings = config_from_toml(
            "[retrieval]\nalpha = 0.7\n\n[llm]\nprovider = \"gemini\"\n",
        )
        .settings()
        .expect("settings");
        assert!((settings.retrieval.alpha - 0.7).abs() < f32::EPSILON);
        assert_eq!(settings.retrieval.top_candidates, 5);
        assert_eq!(settings.llm.provider, ProviderKind::Gemini);
    }

    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        let err = config_from_toml("[retrieval]\nalpha = 1.5\n").settings().unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn zero_top_candidates_is_rejected() {
        assert!(config_from_toml("[retrieval]\ntop_candidates = 0\n").settings().is_err());
    }

    #[test]
    fn absolute_paths_are_kept() {
        let settings = config_from_toml("[data]\ncache_dir = \"/var/cache/vet\"\n").settings().expect("settings");
        assert_eq!(settings.data.cache_dir, PathBuf::from("/var/cache/vet"));
    }

    #[test]
    fn get_reads_nested_keys() {
        let config = config_from_toml("[retrieval]\ntop_k_vector = 7\n");
        let k: usize = config.get("retrieval.top_k_vector").expect("key");
        assert_eq!(k, 7);
    }
}
