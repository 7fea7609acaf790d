//! Headless show runner

use anyhow::{Context, Result};
use ember_particles::{DrawTally, FireworkShow, FrameStats, ShowConfig, WindMode};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;

/// Samples between two random gust levels
const GUST_SPAN: usize = 24;

pub struct RunArgs {
    pub show: Option<PathBuf>,
    pub frames: Option<u64>,
    pub seed: Option<u64>,
    pub report_every: u64,
    pub format: String,
}

/// Totals over a whole run
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub frames: u64,
    pub spawned: usize,
    pub activated: usize,
    pub rejected: usize,
    pub reaped: usize,
    pub peak_systems: usize,
    pub peak_particles: usize,
    pub final_systems: usize,
    pub final_particles: usize,
    pub draw_calls: usize,
    pub vertex_bytes: usize,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = match &args.show {
        Some(path) => ShowConfig::load(path)
            .with_context(|| format!("loading show {}", path.display()))?,
        None => ShowConfig::builtin().context("loading built-in show")?,
    };

    let seed = args
        .seed
        .or(config.show.seed)
        .unwrap_or_else(rand::random::<u64>);
    let frames = args.frames.unwrap_or(config.show.frames);
    let json = args.format == "json";

    let samples = match config.wind.mode {
        WindMode::Gusts => gust_samples(config.wind.samples, seed),
        WindMode::Calm => Vec::new(),
    };
    let wind = config.wind_source(samples)?;
    let mut show = FireworkShow::from_config(&config, wind, seed)?;

    info!(
        "running {} spawner(s) for {} frames with seed {}",
        show.spawners().len(),
        frames,
        seed
    );

    let summary = simulate(&mut show, seed, frames, args.report_every, |stats| {
        if json {
            println!("{}", serde_json::to_string(stats)?);
        } else {
            println!(
                "frame {:>6}  wind {:+.3}  systems {:>4}  particles {:>7}  +{} launched  +{} chained  -{} reaped",
                stats.frame,
                stats.wind,
                stats.active_systems,
                stats.live_particles,
                stats.spawned,
                stats.activated,
                stats.reaped
            );
        }
        Ok(())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Run `frames` frames, handing every `report_every`-th frame to `report`
pub fn simulate(
    show: &mut FireworkShow,
    seed: u64,
    frames: u64,
    report_every: u64,
    mut report: impl FnMut(&FrameStats) -> Result<()>,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        seed,
        ..RunSummary::default()
    };

    for _ in 0..frames {
        let stats = show.tick();
        summary.frames = stats.frame;
        summary.spawned += stats.spawned;
        summary.activated += stats.activated;
        summary.rejected += stats.rejected;
        summary.reaped += stats.reaped;
        summary.peak_systems = summary.peak_systems.max(stats.active_systems);
        summary.peak_particles = summary.peak_particles.max(stats.live_particles);
        summary.final_systems = stats.active_systems;
        summary.final_particles = stats.live_particles;

        if report_every > 0 && stats.frame % report_every == 0 {
            report(&stats)?;
        }
    }

    let mut tally = DrawTally::default();
    show.render(&mut tally);
    summary.draw_calls = tally.draw_calls;
    summary.vertex_bytes = tally.bytes;

    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Show finished after {} frame(s) (seed {})", summary.frames, summary.seed);
    println!("  Launched:  {} system(s)", summary.spawned);
    println!("  Chained:   {} system(s)", summary.activated);
    println!("  Reaped:    {} system(s)", summary.reaped);
    if summary.rejected > 0 {
        println!("  Rejected:  {} system(s)", summary.rejected);
    }
    println!(
        "  Peak:      {} system(s), {} particle(s)",
        summary.peak_systems, summary.peak_particles
    );
    println!(
        "  Last frame: {} system(s), {} particle(s), {} draw call(s), {} vertex byte(s)",
        summary.final_systems, summary.final_particles, summary.draw_calls, summary.vertex_bytes
    );
}

/// Smooth gust levels in `[0, 1]`: random levels every `GUST_SPAN` samples,
/// cosine-blended in between.
pub fn gust_samples(count: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
    let levels: Vec<f32> = (0..count / GUST_SPAN + 2)
        .map(|_| rng.random::<f32>())
        .collect();

    (0..count)
        .map(|i| {
            let k = i / GUST_SPAN;
            let t = (i % GUST_SPAN) as f32 / GUST_SPAN as f32;
            let w = (1.0 - (t * std::f32::consts::PI).cos()) * 0.5;
            levels[k] * (1.0 - w) + levels[k + 1] * w
        })
        .collect()
}
