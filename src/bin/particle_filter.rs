// Range-only particle filter localization demo
//
// example: particle_filter 900 400 3 2000 --cycles 300 --output img/pf.png

use std::error::Error;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, LevelFilter};

use range_localization::localization::ResamplingStrategy;
use range_localization::utils::{prepare_landmarks, render_snapshot, BORDER_MARGIN};
use range_localization::{FilterConfig, FilterRunner, ParticleFilterEngine, RunnerOptions};

/// How often the consumer looks at the latest snapshot
const RENDER_PERIOD: Duration = Duration::from_millis(33);

#[derive(Parser, Debug)]
#[command(name = "particle_filter", about = "2D particle filter localization against range-only landmarks")]
struct Cli {
    /// World width
    width: u32,
    /// World height
    height: u32,
    /// Number of landmarks
    landmarks: usize,
    /// Number of particles
    particles: usize,

    /// Stop after this many cycles (runs until Ctrl-C otherwise)
    #[arg(long)]
    cycles: Option<u64>,

    /// Pause between cycles in milliseconds
    #[arg(long, default_value_t = 150)]
    period_ms: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Use the binary-search sampler instead of the linear roulette wheel
    #[arg(long)]
    binary_search: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write the final snapshot to this PNG
    #[arg(long)]
    output: Option<String>,
}

fn init_logger(log_level: &str) -> Result<(), Box<dyn Error>> {
    let level = log_level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
        LevelFilter::Info
    });

    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .try_init()?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let width = f64::from(cli.width);
    let height = f64::from(cli.height);

    let landmarks = prepare_landmarks(cli.landmarks, width, height, BORDER_MARGIN)?;
    info!("landmarks: {:?}", landmarks);

    let mut config = FilterConfig::new(width, height, cli.particles)
        .with_cycle_period(Duration::from_millis(cli.period_ms));
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.binary_search {
        config = config.with_resampling(ResamplingStrategy::BinarySearch);
    }

    let engine = ParticleFilterEngine::new(config.clone(), landmarks)?;
    let mut options = RunnerOptions::from(&config);
    if let Some(cycles) = cli.cycles {
        options = options.with_max_cycles(cycles);
    }

    let quit = Arc::new(AtomicBool::new(false));
    let q = quit.clone();
    ctrlc::set_handler(move || {
        q.store(true, Ordering::SeqCst);
    })?;

    let handle = FilterRunner::spawn(engine, options)?;
    let reader = handle.reader();

    handle.watch(&quit, RENDER_PERIOD, |snapshot| {
        if let Some(estimate) = &snapshot.estimate {
            info!(
                "cycle {}: robot ({:.1}, {:.1}) estimate ({:.1}, {:.1}) error {:.2}, n_eff {:.1}",
                snapshot.cycle,
                snapshot.robot.x,
                snapshot.robot.y,
                estimate.mean.x,
                estimate.mean.y,
                estimate.position_error(&snapshot.robot),
                estimate.effective_sample_size
            );
        }
    });
    if quit.load(Ordering::SeqCst) {
        info!("quit requested, stopping at the next cycle boundary");
    }

    handle.join()?;
    let last = reader.latest();
    info!("finished after {} cycles", last.cycle);

    if let Some(path) = cli.output {
        render_snapshot(&last, width, height, &path)?;
        info!("final snapshot saved to {}", path);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logger(&cli.log_level) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
