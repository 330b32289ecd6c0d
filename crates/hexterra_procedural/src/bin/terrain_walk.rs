//! # Terrain Walk
//!
//! Walks a reference point east through a streamed world and prints what
//! the streamer did on every step.
//!
//! ```text
//! terrain_walk [--config world.toml] [--steps 200] [--stride 4.0]
//! ```

use std::process::ExitCode;

use hexterra_procedural::{ChunkEvent, WorldConfig, WorldStreamer};

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: terrain_walk [options]");
        println!();
        println!("Options:");
        println!("  --config <path>  World config (TOML). Defaults if omitted.");
        println!("  --steps <n>      Number of steps to walk (default 200)");
        println!("  --stride <f>     World units per step (default 4.0)");
        return ExitCode::SUCCESS;
    }

    let config = match arg_value(&args, "--config") {
        Some(path) => match WorldConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::default(),
    };
    let steps: u32 = arg_value(&args, "--steps")
        .and_then(|s| s.parse().ok())
        .unwrap_or(200);
    let stride: f32 = arg_value(&args, "--stride")
        .and_then(|s| s.parse().ok())
        .unwrap_or(4.0);

    let mut streamer = match WorldStreamer::new(config) {
        Ok(streamer) => streamer,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let events = streamer.events();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         HEXTERRA TERRAIN WALK                                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!(
        "seed {} | render distance {} | {} steps of {stride}",
        streamer.config().generation.seed,
        streamer.config().streaming.render_distance,
        steps
    );
    println!();
    println!(" step |      x | chunk    | +new  -evict  mesh | pending stale | triangles");

    let start = std::time::Instant::now();
    let z = 0.0f32;
    let mut triangles = 0usize;
    for step in 0..steps {
        let x = step as f32 * stride;
        let report = streamer.tick(x, z);

        for event in events.drain() {
            match event {
                ChunkEvent::Added { mesh, .. } | ChunkEvent::Updated { mesh, .. } => {
                    triangles += mesh.triangle_count();
                }
                ChunkEvent::Removed { .. } => {}
            }
        }

        if report.retargeted || step % 10 == 0 {
            let center = streamer.center().unwrap_or_default();
            println!(
                " {step:4} | {x:6.1} | ({:3},{:3}) | {:4} {:6} {:5} | {:7} {:5} | {triangles}",
                center.x,
                center.z,
                report.created,
                report.evicted,
                report.meshed,
                report.pending,
                report.stale,
            );
        }
    }

    let final_report = streamer.flush();
    let stats = streamer.stats();
    let spawn = streamer.spawn_height(steps as f32 * stride, z);

    println!();
    println!("┌─ SUMMARY ──────────────────────────────────────────────────────┐");
    println!("│ Elapsed:        {:?}", start.elapsed());
    println!("│ Loaded:         {}", stats.loaded);
    println!("│ Generated:      {}", stats.generated_total);
    println!("│ Restored:       {}", stats.restored_total);
    println!("│ Evicted:        {}", stats.evicted_total);
    println!("│ Cancelled:      {}", stats.cancelled_total);
    println!("│ Meshed:         {} (+{} on flush)", stats.meshed_total, final_report.meshed);
    println!("│ Pooled slots:   {}", stats.pooled);
    println!("│ Cached volumes: {}", stats.cached);
    match spawn {
        Ok(height) => println!("│ Ground at end:  {height:.1}"),
        Err(e) => println!("│ Ground at end:  {e}"),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");

    ExitCode::SUCCESS
}
