//! Configuration structs with defaults and RON persistence.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "tessera.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Quadtree parameters.
    pub lod: LodConfig,
    /// Demo driver settings.
    pub demo: DemoConfig,
    /// Logging and checking.
    pub debug: DebugConfig,
}

/// Quadtree parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Edge length of the root square (power of two).
    pub root_size: u32,
    /// Number of detail slots (texture array layers).
    pub slot_capacity: u32,
    /// Split quota per step.
    pub max_splits_per_step: u32,
}

/// Path the demo viewpoint follows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewpointPath {
    /// Circle around the center of the root square.
    #[default]
    Orbit,
    /// Straight line across the square, diagonal from corner to corner.
    FlyBy,
    /// Seeded random walk.
    RandomWalk,
}

impl fmt::Display for ViewpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewpointPath::Orbit => "orbit",
            ViewpointPath::FlyBy => "fly-by",
            ViewpointPath::RandomWalk => "random-walk",
        };
        f.write_str(name)
    }
}

/// Demo driver settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of steps to run.
    pub frames: u32,
    /// Viewpoint path.
    pub path: ViewpointPath,
    /// Distance the viewpoint moves per step, in world units.
    pub speed: f64,
    /// Orbit radius as a fraction of the root size.
    pub orbit_radius: f64,
    /// Seed for the random walk.
    pub seed: u64,
    /// Print a character map of the final leaf layout.
    pub print_map: bool,
    /// Columns of the character map.
    pub map_width: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,tessera_lod=trace").
    pub log_level: String,
    /// Run the full invariant check after every step.
    pub validate_every_step: bool,
    /// Log every detail notification.
    pub log_detail_requests: bool,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            root_size: 1024,
            slot_capacity: 100,
            max_splits_per_step: 8,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 240,
            path: ViewpointPath::Orbit,
            speed: 12.0,
            orbit_radius: 0.35,
            seed: 42,
            print_map: true,
            map_width: 64,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            validate_every_step: cfg!(debug_assertions),
            log_detail_requests: false,
        }
    }
}

/// Per-user config directory, e.g. `~/.config/tessera` on Linux.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("tessera"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
