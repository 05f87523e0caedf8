//! Headless effect simulation

use anyhow::{bail, Context, Result};
use ember_particles::{EffectDescription, EmissionMode, ParticleRng, ParticleSystem, RandomSource};
use ember_runtime::{FrameClock, RuntimeSystem};

pub struct SimulateArgs {
    pub effect: String,
    pub seconds: f64,
    pub fps: f64,
    pub seed: Option<u32>,
    pub jitter: bool,
    pub format: String,
}

struct Report {
    frames: u64,
    simulated: f64,
    spawned: u64,
    dropped: u64,
    killed: u64,
    alive: usize,
    peak_alive: usize,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if !(args.fps > 0.0) {
        bail!("--fps must be positive");
    }

    let effect = EffectDescription::load(&args.effect)
        .with_context(|| format!("Failed to load effect {}", args.effect))?;
    let atlas = effect.atlas();
    let rng = args
        .seed
        .map(ParticleRng::new)
        .unwrap_or_else(ParticleRng::from_time);
    let mut emitter = effect.build(&atlas, rng).context("Failed to build effect")?;

    // Manual effects get one wave up front, otherwise nothing would happen
    let manual = emitter.mode() == EmissionMode::Manual;
    if manual {
        emitter.emit_wave()?;
    }

    let mut system = ParticleSystem::new();
    let id = system.add_emitter(emitter);
    system.initialize()?;

    let mut jitter_rng = ParticleRng::new(args.seed.unwrap_or(0).wrapping_add(1));
    let frame = 1.0 / args.fps;
    let mut clock = FrameClock::new();
    let mut peak_alive = 0;

    while clock.total_time < args.seconds {
        let mut dt = frame;
        if args.jitter {
            dt *= 0.5 + jitter_rng.next_f32() as f64;
        }
        let dt = clock.advance(dt.min(args.seconds - clock.total_time));

        if manual {
            if let Some(emitter) = system.get_mut(id) {
                emitter.update(dt as f32)?;
            }
        } else {
            system.update(dt)?;
        }
        peak_alive = peak_alive.max(system.total_alive());
    }

    let report = match system.get(id) {
        Some(emitter) => {
            let stats = emitter.stats();
            Report {
                frames: clock.frame_count,
                simulated: clock.total_time,
                spawned: stats.spawned,
                dropped: stats.dropped,
                killed: stats.killed,
                alive: emitter.active_count(),
                peak_alive,
            }
        }
        None => bail!("emitter vanished during simulation"),
    };
    system.shutdown()?;

    if args.format == "json" {
        print_report_json(effect.display_name(), &report)?;
    } else {
        print_report_text(effect.display_name(), &report);
    }
    Ok(())
}

fn print_report_text(name: &str, report: &Report) {
    println!(
        "Effect '{}': {} frame(s), {:.3}s simulated",
        name, report.frames, report.simulated
    );
    println!("  spawned: {}", report.spawned);
    println!("  dropped: {}", report.dropped);
    println!("  killed:  {}", report.killed);
    println!("  alive:   {} (peak {})", report.alive, report.peak_alive);
}

fn print_report_json(name: &str, report: &Report) -> Result<()> {
    let output = serde_json::json!({
        "effect": name,
        "frames": report.frames,
        "seconds": report.simulated,
        "spawned": report.spawned,
        "dropped": report.dropped,
        "killed": report.killed,
        "alive": report.alive,
        "peak_alive": report.peak_alive,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
