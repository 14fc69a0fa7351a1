use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the saved-filter catalog is persisted under
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from TOML file, with environment variable overrides.
    /// Falls back to defaults if file is not found. KEYLOOM_CONFIG env var
    /// overrides the path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        ConfigLoader::new().load(path)
    }
}

/// Resolves configuration from file, CLI args, and environment variables.
struct ConfigLoader {
    args: Vec<String>,
}

impl ConfigLoader {
    fn new() -> Self {
        Self {
            args: env::args().collect(),
        }
    }

    fn load<P: AsRef<Path>>(&self, default_path: P) -> anyhow::Result<Config> {
        let mut cfg_path = self.resolve_config_path(default_path);

        // Allow KEYLOOM_CONFIG to fully override any arg/default
        if let Ok(env_path) = env::var("KEYLOOM_CONFIG") {
            cfg_path = PathBuf::from(env_path);
        }

        match fs::read_to_string(&cfg_path) {
            Ok(s) => {
                let mut cfg: Config = toml::from_str(&s)?;
                Self::apply_env_overrides(&mut cfg);
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut cfg = Config::default();
                Self::apply_env_overrides(&mut cfg);
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve config path from CLI args, env vars, or default.
    fn resolve_config_path<P: AsRef<Path>>(&self, default_path: P) -> PathBuf {
        if let Some(p) = Self::find_config_arg(&self.args) {
            p
        } else {
            default_path.as_ref().to_path_buf()
        }
    }

    /// Find --config or -c flag in arguments.
    fn find_config_arg(args: &[String]) -> Option<PathBuf> {
        let mut iter = args.iter().peekable();
        while let Some(a) = iter.next() {
            if a.starts_with("--config=") || a.starts_with("-c=") {
                if let Some((_, val)) = a.split_once('=') {
                    return Some(PathBuf::from(val));
                }
            } else if (a == "--config" || a == "-c")
                && let Some(next) = iter.peek()
            {
                return Some(PathBuf::from((*next).clone()));
            }
        }
        None
    }

    /// Apply KEYLOOM_* environment variable overrides.
    fn apply_env_overrides(cfg: &mut Config) {
        if let Ok(v) = env::var("KEYLOOM_DATA_DIR") {
            cfg.storage.data_dir = v;
        }
    }
}
