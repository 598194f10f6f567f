use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::{BackendLocal, StorageManager};

const CONFIG_FILE: &str = "config.yaml";

/// Default embedding model. MiniLM keeps the first-run download small.
const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
/// Minimum combined score a pair needs to become a suggestion.
const DEFAULT_THRESHOLD: f32 = 0.30;
const DEFAULT_MAX_SUGGESTIONS: usize = 15;
const DEFAULT_CHUNK_TARGET_WORDS: usize = 200;
const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.7;
const DEFAULT_KEYWORD_WEIGHT: f32 = 0.3;

/// Configuration for the suggestion engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggesterConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_model")]
    pub model: String,

    /// Default similarity threshold [0.0, 1.0]
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Maximum number of suggestions returned per run
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Approximate words per chunk
    #[serde(default = "default_chunk_target_words")]
    pub chunk_target_words: usize,

    /// Weight of embedding similarity in the combined score
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f32,

    /// Weight of keyword overlap in the combined score
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f32,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            default_threshold: DEFAULT_THRESHOLD,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            chunk_target_words: DEFAULT_CHUNK_TARGET_WORDS,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

fn default_chunk_target_words() -> usize {
    DEFAULT_CHUNK_TARGET_WORDS
}

fn default_semantic_weight() -> f32 {
    DEFAULT_SEMANTIC_WEIGHT
}

fn default_keyword_weight() -> f32 {
    DEFAULT_KEYWORD_WEIGHT
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub suggester: SuggesterConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&self) {
        let sug = &self.suggester;

        if !(0.0..=1.0).contains(&sug.default_threshold) {
            panic!(
                "suggester.default_threshold must be between 0.0 and 1.0, got {}",
                sug.default_threshold
            );
        }

        for (name, weight) in [
            ("semantic_weight", sug.semantic_weight),
            ("keyword_weight", sug.keyword_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                panic!("suggester.{name} must be between 0.0 and 1.0, got {weight}");
            }
        }
        let weight_sum = sug.semantic_weight + sug.keyword_weight;
        if (weight_sum - 1.0).abs() > 0.001 {
            panic!("suggester weights must sum to 1.0, got {weight_sum}");
        }

        if sug.max_suggestions == 0 {
            panic!("suggester.max_suggestions must be greater than 0");
        }

        if sug.chunk_target_words == 0 {
            panic!("suggester.chunk_target_words must be greater than 0");
        }
    }

    pub fn load() -> Self {
        Self::load_with(&default_base_path())
    }

    pub fn load_with(base_path: &Path) -> Self {
        let store = BackendLocal::new(base_path).expect("cannot create config directory");

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store
                .write(
                    CONFIG_FILE,
                    serde_yml::to_string(&Self::default()).unwrap().as_bytes(),
                )
                .expect("cannot write default config");
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE).expect("cannot read config"))
            .expect("config file is not valid utf8");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_path_buf();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let store = BackendLocal::new(&self.base_path).expect("cannot create config directory");

        let config_str = serde_yml::to_string(&self).unwrap();
        store
            .write(CONFIG_FILE, config_str.as_bytes())
            .expect("cannot write config");
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Data directory: `$LINKWISE_PATH` when set, otherwise `~/.linkwise`.
pub fn default_base_path() -> PathBuf {
    if let Ok(path) = std::env::var("LINKWISE_PATH") {
        return PathBuf::from(path);
    }

    match homedir::my_home() {
        Ok(Some(home)) => home.join(".linkwise"),
        _ => PathBuf::from(".linkwise"),
    }
}
