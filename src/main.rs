//! Disk Gas headless runner
//!
//! Runs a preset or a JSON config through the frame driver and prints a JSON
//! summary. With `--realtime` frames follow the wall clock and control
//! messages (`pause`, `resume`, `reset`) are read from stdin.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use disk_gas::renderer::{AsciiSurface, draw};
use disk_gas::sim::{Snapshot, Violation};
use disk_gas::{ControlEvent, ControlSender, FrameDriver, SimConfig, Simulation, Variant};

#[derive(Parser, Debug)]
#[command(version, about = "Event-aware 2D hard-disk gas simulation")]
struct Args {
    /// Preset: non_interacting, cold, bunimovich, circle
    #[arg(short, long, default_value = "cold")]
    variant: String,

    /// JSON config file (overrides --variant)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulated time to run
    #[arg(short, long, default_value_t = 10_000.0)]
    duration: f64,

    /// Time per frame
    #[arg(long, default_value_t = 16.0)]
    frame_dt: f64,

    /// Pace frames by the wall clock (1 time unit = 1 ms) and accept control
    /// messages on stdin
    #[arg(long)]
    realtime: bool,

    /// Print an ASCII frame every N frames (0 = never)
    #[arg(long, default_value_t = 0)]
    render_every: usize,

    /// ASCII frame width in characters
    #[arg(long, default_value_t = 80)]
    cols: usize,

    /// Check invariants after every frame and fail on violation (overlaps
    /// left by a wall bounce are allowed to settle)
    #[arg(long)]
    check: bool,

    /// Allowed penetration for --check
    #[arg(long, default_value_t = 0.05)]
    tolerance: f64,
}

#[derive(Serialize)]
struct Summary {
    config: SimConfig,
    seed: u64,
    frames: usize,
    capped_frames: usize,
    wall_bounces: usize,
    momentum: [f64; 2],
    snapshot: Snapshot,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => match Variant::from_str(&args.variant) {
            Some(variant) => variant.config(),
            None => bail!("unknown variant '{}'", args.variant),
        },
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

/// Forward stdin lines to the driver as control events
fn spawn_stdin_controls(sender: ControlSender) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match ControlEvent::from_message(&line) {
                Some(event) => {
                    if !sender.send(event) {
                        break;
                    }
                }
                None => log::warn!("Unknown control message '{}'", line.trim()),
            }
        }
    });
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.frame_dt.is_nan() || args.frame_dt <= 0.0 {
        bail!("--frame-dt must be positive");
    }

    let config = load_config(&args)?;
    let sim = Simulation::new(config.clone())?;
    log::info!("Disk Gas starting (seed {})", sim.seed());

    let (mut driver, sender) = FrameDriver::new(sim);
    if args.realtime {
        spawn_stdin_controls(sender);
    } else {
        drop(sender);
    }

    let rows = ((args.cols as f64) * config.height / config.width / 2.0).ceil() as usize;
    let mut surface = AsciiSurface::new(args.cols, rows, config.width, config.height);

    let started = Instant::now();
    let mut now = 0.0;
    let mut frames = 0;
    let mut capped_frames = 0;
    let mut wall_bounces = 0;

    while driver.simulation().time() < args.duration {
        if args.realtime {
            std::thread::sleep(Duration::from_secs_f64(args.frame_dt / 1000.0));
            now = started.elapsed().as_secs_f64() * 1000.0;
        } else {
            now += args.frame_dt;
        }

        let Some(stats) = driver.frame(now) else {
            continue;
        };
        frames += 1;
        wall_bounces += stats.wall_bounces;
        if stats.capped {
            capped_frames += 1;
        }

        if args.render_every > 0 && frames % args.render_every == 0 {
            draw(driver.simulation(), &mut surface);
            println!("t = {:.0}\n{surface}", driver.simulation().time());
        }

        if args.check {
            let (settling, violations): (Vec<Violation>, Vec<Violation>) = driver
                .simulation()
                .check_invariants(args.tolerance)
                .into_iter()
                .partition(Violation::is_transient);
            if !settling.is_empty() {
                log::debug!("{} wall-bounce overlap(s) still settling", settling.len());
            }
            if let Some(first) = violations.first() {
                bail!(
                    "{} invariant violation(s) at t = {}: first {:?}",
                    violations.len(),
                    driver.simulation().time(),
                    first
                );
            }
        }
    }

    let sim = driver.into_simulation();
    let momentum = sim.momentum();
    let summary = Summary {
        config,
        seed: sim.seed(),
        frames,
        capped_frames,
        wall_bounces,
        momentum: [momentum.x, momentum.y],
        snapshot: sim.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
