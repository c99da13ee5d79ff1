//! Configuration for the Tessera LOD tools.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line via clap, and are reloaded when the file changes. Unknown or missing
//! fields fall back to defaults so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, DemoConfig, LodConfig, ViewpointPath, default_config_dir,
};
pub use error::ConfigError;
