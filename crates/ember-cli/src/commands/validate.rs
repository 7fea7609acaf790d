//! Show file validation command

use anyhow::{Context, Result};
use ember_particles::{ShowConfig, WindMode};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let config = ShowConfig::load(path).with_context(|| format!("invalid show {}", path.display()))?;

    println!("Show: {}", path.display());
    println!("  Textures: {}", config.textures.join(", "));
    match config.wind.mode {
        WindMode::Calm => println!("  Wind: calm at {}", config.wind.speed),
        WindMode::Gusts => println!(
            "  Wind: gusts up to {} ({} samples, {}% change per frame)",
            config.wind.strength, config.wind.samples, config.wind.change_percent
        ),
    }
    println!(
        "  Largest pool: {} of {} allowed",
        config.template_builder().max_capacity(),
        config.show.max_capacity
    );

    println!("  Spawners: {}", config.spawners.len());
    for spawner in &config.spawners {
        let [x, y, z] = spawner.location.to_array();
        println!(
            "    {:<10} at ({x}, {y}, {z})  cycle {:>5}  {} cue(s)",
            spawner.name,
            spawner.cycle,
            spawner.cues.len()
        );
    }

    let usage = template_usage(&config);
    if !usage.is_empty() {
        println!("  Templates cued:");
        for (name, count) in usage {
            println!("    {name:<24} {count}");
        }
    }

    println!("OK");
    Ok(())
}

/// How many cues name each template, by template name
fn template_usage(config: &ShowConfig) -> BTreeMap<&'static str, usize> {
    let mut usage = BTreeMap::new();
    for cue in config.spawners.iter().flat_map(|s| s.cues.iter()) {
        *usage.entry(cue.template.name()).or_insert(0) += 1;
    }
    usage
}
