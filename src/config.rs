use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;
use crate::internal::models::SortOrder;
use crate::internal::ui::app::Action;

const CONFIG_FILE: &str = "config.ron";
const APP_DIR: &str = "tui-reddit-app";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Collection opened at startup
    pub default_collection: String,
    /// Collections PageUp/PageDown cycle through, in order
    pub preferred_collections: Vec<String>,
    /// Initial order of every listing
    pub listing_sort: SortOrder,
    /// Initial order of comment trees on a freshly opened item
    pub comment_sort: SortOrder,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
    /// Extra or replacement key bindings, e.g. `global: {"x": Quit}`
    pub keybindings: KeyBindingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_collection: "all".to_string(),
            preferred_collections: [
                "all",
                "linux",
                "ubuntu",
                "europe",
                "romania",
                "technology",
                "programming",
                "worldnews",
                "games",
                "formula1",
                "bicycling",
            ]
            .map(String::from)
            .to_vec(),
            listing_sort: SortOrder::Hot,
            comment_sort: SortOrder::Top,
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
            keybindings: KeyBindingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("{}/{}", APP_DIR, env!("CARGO_PKG_VERSION")),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base filter level ("info", "debug", ...); `RUST_LOG` overrides it
    pub level: String,
    /// Directory for the rolling log file, defaults to `logs`
    pub log_directory: Option<String>,
    /// Per-module levels appended to the filter
    pub module_levels: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_directory: None,
            module_levels: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive built from the level and module overrides.
    pub fn filter_directive(&self) -> String {
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort();

        let mut filter = self.level.clone();
        for (module, level) in modules {
            filter.push_str(&format!(",{}={}", module, level));
        }
        filter
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct KeyBindingConfig {
    pub global: HashMap<String, Action>,
    pub listing: HashMap<String, Action>,
    pub detail: HashMap<String, Action>,
    pub thread: HashMap<String, Action>,
}

/// Outcome of the config search. Kept until logging is set up, since the
/// search runs before any subscriber exists.
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
    /// Files that exist but could not be read or parsed
    pub skipped: Vec<anyhow::Error>,
}

impl ConfigLoad {
    pub fn log(&self) {
        for e in &self.skipped {
            tracing::error!("Skipped config: {:#}", e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {}", path.display()),
            None => tracing::info!("No usable config file found, using defaults"),
        }
    }
}

impl AppConfig {
    /// Loads the first usable config among the candidate paths, falling
    /// back to defaults.
    pub fn load() -> ConfigLoad {
        Self::load_first(&Self::candidates())
    }

    /// Tries `candidates` in order. Missing files are passed over silently,
    /// broken ones are recorded in `skipped`.
    pub fn load_first(candidates: &[PathBuf]) -> ConfigLoad {
        let mut skipped = Vec::new();

        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from(path) {
                Ok(config) => {
                    return ConfigLoad {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    };
                }
                Err(e) => skipped.push(e),
            }
        }

        ConfigLoad {
            config: Self::default(),
            source: None,
            skipped,
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_ron(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_ron(content: &str) -> Result<Self> {
        Ok(ron::from_str::<AppConfig>(content)?)
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE)];

        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join(CONFIG_FILE));
        }

        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(APP_DIR).join(CONFIG_FILE));
        }

        candidates
    }
}
