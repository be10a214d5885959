//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file: the `--config` path, or `config.toml` in the platform
//!    config directory
//! 3. Environment variables prefixed with `CHUNKDUPE_`
//!    (e.g. `CHUNKDUPE_CHUNK_SIZE=4096`, `CHUNKDUPE_HASH=blake3`)
//! 4. Command-line flags ([`Config::apply_scan_args`])
//!
//! # Example file
//!
//! ```toml
//! chunk_size = 4096
//! hash = "xxh3"
//! recursive = true
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "target/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::ScanArgs;
use crate::duplicates::DEFAULT_CHUNK_SIZE;
use crate::hasher::HashAlgorithm;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "CHUNKDUPE_";

/// Errors that can occur while loading the configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has values of the wrong type.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The chunk size must be at least one byte.
    #[error("Invalid configuration: chunk_size must be at least 1")]
    ZeroChunkSize,
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bytes read from each file per round.
    pub chunk_size: usize,
    /// Chunk hash combiner.
    pub hash: HashAlgorithm,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash: HashAlgorithm::default(),
            recursive: false,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Load defaults, the configuration file and `CHUNKDUPE_` variables.
    ///
    /// With `path` set the file must exist. Without it the platform default
    /// file is used when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the requested file is missing or any layer
    /// holds invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    fn load_with_env_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(env_prefix));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "chunkdupe", "chunkdupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Layer explicit command-line flags on top of this configuration.
    ///
    /// Flags only override when given; ignore patterns are appended.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(chunk_size) = args.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(hash) = args.hash {
            self.hash = hash;
        }
        self.recursive |= args.recursive;
        self.follow_symlinks |= args.follow_symlinks;
        self.skip_hidden |= args.skip_hidden;
        self.ignore_patterns
            .extend(args.ignore_patterns.iter().cloned());
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}
