//! Headless driver for the quadtree LOD manager.
//!
//! Loads `tessera.ron` (created with defaults on first run), applies CLI
//! overrides, then steps a [`QuadtreeLod`] along a viewpoint path and prints
//! the final leaf layout.
//!
//! Run with `cargo run -p tessera-demo -- --path random-walk --slots 64`.

mod map;
mod path;

use std::process::ExitCode;

use clap::Parser;
use tessera_config::{CliArgs, Config, default_config_dir};
use tessera_lod::{DetailSink, LodError, LodLeaf, LogSink, QuadtreeConfig, QuadtreeLod};
use tracing::{debug, error, info};

use crate::path::ViewpointDriver;

/// Counts detail requests, optionally logging each one.
struct DemoSink {
    requests: u64,
    log_each: bool,
}

impl DetailSink for DemoSink {
    fn detail_needed(&mut self, leaf: &LodLeaf) {
        self.requests += 1;
        if self.log_each {
            LogSink.detail_needed(leaf);
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessera_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("LOD run aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), LodError> {
    let lod_config = QuadtreeConfig {
        root_size: config.lod.root_size,
        slot_capacity: config.lod.slot_capacity,
        max_splits_per_step: config.lod.max_splits_per_step,
    };
    let sink = DemoSink {
        requests: 0,
        log_each: config.debug.log_detail_requests,
    };
    let mut lod = QuadtreeLod::new(lod_config, sink)?;
    let mut driver = ViewpointDriver::new(&config.demo, lod_config.root_size);

    info!(
        "Quadtree: root={} slots={} max_splits={} path={} frames={}",
        lod_config.root_size,
        lod_config.slot_capacity,
        lod_config.max_splits_per_step,
        config.demo.path,
        config.demo.frames,
    );

    let mut viewpoint = driver.next_viewpoint();
    let (mut splits, mut merges, mut deferred, mut peak) = (0u64, 0u64, 0u64, 1usize);
    for frame in 0..config.demo.frames {
        if frame > 0 {
            viewpoint = driver.next_viewpoint();
        }
        let report = lod.step(viewpoint)?;
        if config.debug.validate_every_step {
            lod.validate()?;
        }

        splits += u64::from(report.splits);
        merges += u64::from(report.merges);
        deferred += u64::from(report.deferred_splits);
        peak = peak.max(report.leaf_count);

        if report.changed() {
            info!(
                "frame {frame}: viewpoint=({:.1}, {:.1}) splits={} merges={} leaves={} free_slots={}",
                viewpoint.x,
                viewpoint.y,
                report.splits,
                report.merges,
                report.leaf_count,
                lod.pool().available(),
            );
        } else {
            debug!(frame, deferred = report.deferred_splits, "no change");
        }
    }

    info!(
        "Done: {} splits, {} merges, {} deferred, peak {} leaves, {} detail requests",
        splits,
        merges,
        deferred,
        peak,
        lod.sink().requests,
    );

    let leaves: Vec<LodLeaf> = lod.leaves().collect();
    for leaf in &leaves {
        let center = leaf.center();
        debug!(
            "leaf {} at ({:.1}, {:.1}) size {} slot {:?}",
            leaf.id, center.x, center.y, leaf.size, leaf.slot
        );
    }
    info!("{} leaves in final layout", leaves.len());

    if config.demo.print_map {
        println!(
            "{}",
            map::render(&leaves, lod_config.root_size, config.demo.map_width, viewpoint)
        );
    }
    Ok(())
}
