//! Texture atlas planning utility
//!
//! Picks a block grid for a memory budget, prints the resulting atlas layout
//! and optionally replays a synthetic viewing pattern against the cache.
//!
//! Usage:
//!     plan_atlas [OPTIONS]
//!
//! Options:
//!     --block <XxYxZ>         Block size in voxels (default: 32x32x32)
//!     --bytes <N>             Bytes per voxel (default: 2)
//!     --budget <MB>           Texture memory budget (default: 256)
//!     --grid <XxYxZ>          Explicit grid size in blocks
//!     --config <FILE>         Load settings from a JSON config
//!     --save <FILE>           Write the effective settings as JSON
//!     --simulate <FRAMES>     Replay a camera sweep for FRAMES frames
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use glam::IVec3;

use blockgrid::core::logging;
use blockgrid::{AtlasBlock, AtlasBlockFactory, AtlasConfig, BlockGridCache, BlockKey};

/// Chunks visible per axis around the simulated camera
const VIEW_RADIUS: i32 = 3;

/// Resolution levels requested per frame
const SIM_LEVELS: u32 = 3;

fn print_help() {
    eprintln!("plan_atlas - Texture atlas planning utility");
    eprintln!();
    eprintln!("Usage: plan_atlas [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --block <XxYxZ>         Block size in voxels (default: 32x32x32)");
    eprintln!("    --bytes <N>             Bytes per voxel (default: 2)");
    eprintln!("    --budget <MB>           Texture memory budget (default: 256)");
    eprintln!("    --grid <XxYxZ>          Explicit grid size in blocks");
    eprintln!("    --config <FILE>         Load settings from a JSON config");
    eprintln!("    --save <FILE>           Write the effective settings as JSON");
    eprintln!("    --simulate <FRAMES>     Replay a camera sweep for FRAMES frames");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    plan_atlas --block 64x64x32 --bytes 1 --budget 512");
    eprintln!("    plan_atlas --config atlas.json --simulate 500");
}

#[derive(Debug)]
struct Args {
    config: AtlasConfig,
    save: Option<PathBuf>,
    simulate: Option<u32>,
}

fn parse_extent(flag: &str, value: &str) -> Result<[u32; 3], String> {
    let parts: Vec<&str> = value.split(['x', 'X']).collect();
    if parts.len() != 3 {
        return Err(format!("Invalid {}: {} (expected XxYxZ)", flag, value));
    }
    let mut extent = [0u32; 3];
    for (axis, part) in extent.iter_mut().zip(parts) {
        *axis = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid {}: {}", flag, value))?;
    }
    Ok(extent)
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut config: Option<AtlasConfig> = None;
    let mut block: Option<[u32; 3]> = None;
    let mut bytes: Option<u32> = None;
    let mut budget: Option<u32> = None;
    let mut grid: Option<[u32; 3]> = None;
    let mut save: Option<PathBuf> = None;
    let mut simulate: Option<u32> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "-h" | "--help") {
            print_help();
            std::process::exit(0);
        }

        i += 1;
        let value = args
            .get(i)
            .ok_or_else(|| format!("Missing value for {}", flag))?;

        match flag {
            "--block" => block = Some(parse_extent(flag, value)?),
            "--grid" => grid = Some(parse_extent(flag, value)?),
            "--bytes" => {
                bytes = Some(value.parse().map_err(|_| format!("Invalid bytes: {}", value))?);
            }
            "--budget" => {
                budget = Some(value.parse().map_err(|_| format!("Invalid budget: {}", value))?);
            }
            "--config" => {
                let path = PathBuf::from(value);
                let loaded = AtlasConfig::load(&path)
                    .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;
                config = Some(loaded);
            }
            "--save" => save = Some(PathBuf::from(value)),
            "--simulate" => {
                simulate = Some(value.parse().map_err(|_| format!("Invalid frame count: {}", value))?);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    // command line values override the config file
    let mut config = config.unwrap_or_default();
    if let Some(block) = block {
        config.block_size = block;
    }
    if let Some(bytes) = bytes {
        config.bytes_per_element = bytes;
    }
    if let Some(budget) = budget {
        config.memory_budget_mb = budget;
    }
    if grid.is_some() {
        config.grid_size = grid;
    }

    Ok(Args {
        config,
        save,
        simulate,
    })
}

/// Sweep a camera along x through a volume, requesting the chunks around it
/// at several resolution levels, the way a volume viewer streams blocks.
fn simulate(cache: &mut BlockGridCache<BlockKey, AtlasBlock, AtlasBlockFactory>, frames: u32) {
    let start = Instant::now();
    let mut uploads = 0u64;

    for frame in 0..frames {
        let camera = IVec3::new(frame as i32 / 4, 0, 0);

        for level in 0..SIM_LEVELS {
            let center = camera >> level as i32;
            let radius = (VIEW_RADIUS >> level).max(1);
            for z in -radius..=radius {
                for y in -radius..=radius {
                    for x in -radius..=radius {
                        let key = BlockKey::new(level, center + IVec3::new(x, y, z));
                        if cache.get(&key).is_some() {
                            continue;
                        }
                        match cache.add(key) {
                            Ok(_) => uploads += 1,
                            Err(e) => {
                                log::error!("Failed to add {:?}: {}", key, e);
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    let stats = cache.stats();
    let elapsed = start.elapsed();
    println!("Simulated {} frames in {:.2}ms", frames, elapsed.as_secs_f64() * 1000.0);
    println!("  Lookups:   {}", stats.hits + stats.misses);
    println!("  Hit rate:  {:.1}%", stats.hit_rate() * 100.0);
    println!("  Uploads:   {}", uploads);
    println!("  Evictions: {}", stats.evictions);
    println!("  Blocks:    {} created, {} cached", stats.blocks_created, cache.len());
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let config = &args.config;

    if let Some(path) = &args.save {
        if let Err(e) = config.save(path) {
            eprintln!("Error: failed to save {}: {}", path.display(), e);
            std::process::exit(1);
        }
        log::info!("Saved config to {}", path.display());
    }

    let factory = AtlasBlockFactory::new(config.block_size());
    let mut cache: BlockGridCache<BlockKey, AtlasBlock, _> = match config.build_cache(factory) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let grid = cache.grid_size();
    let bytes = config.texture_bytes(grid);
    println!("Atlas Plan");
    println!("==========");
    println!("{}", cache.summary());
    println!("Capacity: {} blocks", cache.capacity());
    println!(
        "Memory: {:.1}MB of {}MB budget",
        bytes as f64 / (1024.0 * 1024.0),
        config.memory_budget_mb
    );

    if let Some(frames) = args.simulate {
        println!();
        simulate(&mut cache, frames);
    }
}
