//! World generator binary — pre-generates chunks to the save folder.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --radius <CHUNKS>  Half-width of the square region in chunks (default: 16)
//!   --seed <SEED>      World seed (default: "Hello")
//!   --name <NAME>      World name (default: "world")
//!   --dir <PATH>       Save root (default: "saves")
//!   --jobs <N>         Max parallel chunk builds (default: 4)
//!   --force            Overwrite chunks that already have a save file
//!
//! Output: one `{x:08x}{z:08x}.bin` voxel file and one
//! `{x:08x}{z:08x}0.bin` tickables file per chunk under `<dir>/<name>/`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use voxstream::atmosphere::ChunkTimeStamp;
use voxstream::core::{logging, Error, StreamingConfig};
use voxstream::streaming::ChunkDataFile;
use voxstream::terrain::{ChunkGenerator, NoiseTerrainGenerator, TerrainParams};
use voxstream::voxel::{ChunkCoord, VoxelData, CHUNK_SIZE};

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("generate_world failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> voxstream::core::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let radius = parse_arg::<i32>(&args, "--radius").unwrap_or(16);
    let jobs = parse_arg::<usize>(&args, "--jobs").unwrap_or(4);
    let force = args.iter().any(|a| a == "--force");

    let mut config = StreamingConfig::default();
    if let Some(seed) = parse_str_arg(&args, "--seed") {
        config.seed = seed;
    }
    if let Some(name) = parse_str_arg(&args, "--name") {
        config.world_name = name;
    }
    if let Some(dir) = parse_str_arg(&args, "--dir") {
        config.save_dir = PathBuf::from(dir);
    }

    // Limit rayon's thread pool to cap peak memory usage
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .map_err(|e| Error::Worker(e.to_string()))?;

    let files = ChunkDataFile::new(config.world_dir())?;
    let generator = NoiseTerrainGenerator::new(&config.seed, TerrainParams::default());

    let side = 2 * radius + 1;
    println!("=== Voxstream World Generator ===");
    println!("World:  {}", config.world_name);
    println!("Seed:   {:?}", config.seed);
    println!("Region: {} x {} chunks", side, side);
    println!("Jobs:   {} parallel", jobs);
    println!("Output: {}", files.dir().display());
    println!();

    let coords: Vec<ChunkCoord> = (-radius..=radius)
        .flat_map(|x| (-radius..=radius).map(move |z| ChunkCoord::new(x, z)))
        .collect();
    let total = coords.len();

    let start = Instant::now();
    let done = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let tickables = AtomicUsize::new(0);
    let timestamp = ChunkTimeStamp::new(0, 0, 0.0);
    let size = CHUNK_SIZE as i32;

    coords.par_iter().for_each(|&coord| {
        if !force && files.chunk_exists(coord) {
            skipped.fetch_add(1, Ordering::Relaxed);
        } else {
            let mut voxels = VoxelData::default();
            generator.generate_chunk(&mut voxels, coord.x * size, coord.z * size, timestamp);
            let records = generator.generate_tickable_blocks(&voxels);
            tickables.fetch_add(records.len(), Ordering::Relaxed);

            let written = files
                .save_chunk_data(coord, &voxels)
                .and_then(|_| files.save_tickables(coord, &records));
            if let Err(e) = written {
                log::warn!("Failed to write chunk ({}, {}): {}", coord.x, coord.z, e);
                failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 256 == 0 || n == total {
            let elapsed = start.elapsed().as_secs_f64();
            let rate = n as f64 / elapsed;
            let remaining = (total - n) as f64 / rate;
            eprintln!("  [{}/{}] {:.0} chunks/sec, ~{:.0}s remaining", n, total, rate, remaining);
        }
    });

    let elapsed = start.elapsed();
    println!();
    println!("=== Generation Complete ===");
    println!(
        "Chunks: {} written, {} skipped, {} failed in {:.1}s",
        total - skipped.load(Ordering::Relaxed) - failed.load(Ordering::Relaxed),
        skipped.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        elapsed.as_secs_f64()
    );
    println!("Tickable blocks: {}", tickables.load(Ordering::Relaxed));
    println!();
    println!("To stream this world:");
    println!("  cargo run --release --bin chunkstream -- --world {} --seed {:?}", config.world_name, config.seed);
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
