//! Headless chunk streaming driver.
//!
//! Walks an observer across the world, running the same per-frame sequence a
//! game client runs (clock, player update, pool update, draw list, block ticks
//! every third frame), then shuts down with a full save.
//!
//! Usage: cargo run --release --bin chunkstream -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>    JSON streaming config (default: built-in defaults)
//!   --ticks <N>        Frames to simulate (default: 600)
//!   --world <NAME>     World folder name, overrides the config
//!   --seed <SEED>      World seed, overrides the config
//!   --speed <BLOCKS>   Observer speed in blocks per frame (default: 0.5)
//!   --frame-ms <MS>    Sleep per frame (default: 2)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use voxstream::atmosphere::WorldClock;
use voxstream::block::BlockRegistry;
use voxstream::core::{logging, Result, StreamingConfig, Vec3};
use voxstream::streaming::{ChunkManager, MeshSink};
use voxstream::terrain::{NoiseTerrainGenerator, TerrainParams};
use voxstream::voxel::{ChunkCoord, MeshHandle};

/// Game minutes per simulated frame
const MINUTES_PER_FRAME: f32 = 0.5;

/// Stand-in for the graphics context: hands out handles and tracks
/// resident vertex memory.
#[derive(Default)]
struct CountingSink {
    next_handle: u64,
    resident: std::collections::HashMap<u64, usize>,
    uploads: usize,
}

impl CountingSink {
    fn resident_floats(&self) -> usize {
        self.resident.values().sum()
    }
}

impl MeshSink for CountingSink {
    fn upload(&mut self, _coord: ChunkCoord, vertices: &[f32]) -> MeshHandle {
        self.next_handle += 1;
        self.uploads += 1;
        self.resident.insert(self.next_handle, vertices.len());
        MeshHandle(self.next_handle)
    }

    fn release(&mut self, handle: MeshHandle) {
        self.resident.remove(&handle.0);
    }
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("chunkstream failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => StreamingConfig::load(PathBuf::from(path))?,
        None => StreamingConfig::default(),
    };
    if let Some(world) = parse_str_arg(&args, "--world") {
        config.world_name = world;
    }
    if let Some(seed) = parse_str_arg(&args, "--seed") {
        config.seed = seed;
    }
    let ticks = parse_arg::<u32>(&args, "--ticks").unwrap_or(600);
    let speed = parse_arg::<f32>(&args, "--speed").unwrap_or(0.5);
    let frame = Duration::from_millis(parse_arg::<u64>(&args, "--frame-ms").unwrap_or(2));

    log::info!(
        "World '{}' (seed {:?}), {} frames at {} blocks/frame",
        config.world_name,
        config.seed,
        ticks,
        speed
    );

    let generator = Arc::new(NoiseTerrainGenerator::new(&config.seed, TerrainParams::default()));
    let blocks = Arc::new(BlockRegistry::standard());
    let mut manager = ChunkManager::new(config, generator.clone(), blocks)?;
    let mut sink = CountingSink::default();
    let mut clock = WorldClock::new(0, 3, 6.0 * 60.0);

    let start = Instant::now();
    let mut draws = 0usize;
    let mut tick_swaps = 0usize;
    let mut x = 8.0f32;
    let z = 8.0f32;

    for tick in 0..ticks {
        clock.advance(MINUTES_PER_FRAME);
        let now = clock.now();

        let y = generator.height_at(x as i32, z as i32) as f32 + 2.0;
        manager.update_player(Vec3::new(x, y, z));
        manager.update(now, &mut sink)?;

        manager.update_render_list();
        while let Some(info) = manager.next_render_info() {
            draws += info.vertex_count as usize / 3;
        }

        if tick % 3 == 0 {
            tick_swaps += manager.process_block_ticks(now);
        }

        if tick % 100 == 0 {
            log::info!(
                "frame {}: chunk ({}, {}), {} occupied / {} free, {} in flight, {} drawn, {:.1} MB meshes",
                tick,
                manager.player_chunk().x,
                manager.player_chunk().z,
                manager.occupied_count(),
                manager.free_count(),
                manager.in_flight_count(),
                manager.render_list().len(),
                (sink.resident_floats() * 4) as f64 / (1024.0 * 1024.0)
            );
        }

        x += speed;
        std::thread::sleep(frame);
    }

    let saved = manager.shutdown(&mut sink)?;
    log::info!(
        "Done in {:.1}s: {} mesh uploads, {} triangles submitted, {} block tick swaps, {} chunks saved",
        start.elapsed().as_secs_f64(),
        sink.uploads,
        draws,
        tick_swaps,
        saved
    );
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
