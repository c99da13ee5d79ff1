//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ViewpointPath};

/// Tessera demo command-line arguments.
///
/// CLI values override settings loaded from `tessera.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera-demo", about = "Drive a quadtree LOD manager along a viewpoint path")]
pub struct CliArgs {
    /// Edge length of the root square (power of two).
    #[arg(long)]
    pub root_size: Option<u32>,

    /// Number of detail slots.
    #[arg(long)]
    pub slots: Option<u32>,

    /// Split quota per step.
    #[arg(long)]
    pub max_splits: Option<u32>,

    /// Number of steps to run.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Viewpoint path.
    #[arg(long, value_enum)]
    pub path: Option<ViewpointPath>,

    /// Random walk seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.root_size {
            self.lod.root_size = size;
        }
        if let Some(slots) = args.slots {
            self.lod.slot_capacity = slots;
        }
        if let Some(max) = args.max_splits {
            self.lod.max_splits_per_step = max;
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(path) = args.path {
            self.demo.path = path;
        }
        if let Some(seed) = args.seed {
            self.demo.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            slots: Some(16),
            path: Some(ViewpointPath::RandomWalk),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.lod.slot_capacity, 16);
        assert_eq!(config.demo.path, ViewpointPath::RandomWalk);
        // Non-overridden fields retain defaults
        assert_eq!(config.lod.root_size, 1024);
        assert_eq!(config.demo.frames, 240);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "tessera-demo",
            "--root-size",
            "2048",
            "--path",
            "fly-by",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.root_size, Some(2048));
        assert_eq!(args.path, Some(ViewpointPath::FlyBy));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
