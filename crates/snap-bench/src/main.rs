use std::hint::black_box;
use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use desk_widgets::geometry::{Point, Rect, Size};
use desk_widgets::layout::{SnapQuery, SnapSettings, snap_position};

const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);
const MOVING: Size = Size::new(240, 240);

#[derive(Parser, Debug)]
#[command(
    name = "snap-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Measures snap queries per second against a crowded desktop"
)]
struct BenchCli {
    /// Number of sibling widgets scattered over the screen.
    #[arg(short = 's', long = "siblings", value_name = "COUNT", default_value_t = 32)]
    siblings: usize,

    /// Snap queries to run.
    #[arg(short = 'n', long = "queries", value_name = "COUNT", default_value_t = 1_000_000)]
    queries: u64,

    /// Snap threshold in pixels.
    #[arg(short = 't', long = "threshold", value_name = "PX", default_value_t = 20)]
    threshold: i32,
}

struct BenchConfig {
    siblings: usize,
    queries: u64,
    threshold: i32,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if cli.siblings > 10_000 {
            return Err("siblings must be at most 10000".to_string());
        }
        if cli.queries == 0 {
            return Err("queries must be positive".to_string());
        }
        if !(1..=500).contains(&cli.threshold) {
            return Err("threshold must be between 1 and 500".to_string());
        }
        Ok(Self {
            siblings: cli.siblings,
            queries: cli.queries,
            threshold: cli.threshold,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let mut rng = Lcg::seeded_from_clock();
    let siblings: Vec<Rect> = (0..config.siblings)
        .map(|_| {
            let x = rng.below(SCREEN.width - MOVING.width);
            let y = rng.below(SCREEN.height - MOVING.height);
            Rect::new(x, y, MOVING.width, MOVING.height)
        })
        .collect();

    let stats = run(&config, &siblings, &mut rng);
    println!("{}", stats.report(&config));
    Ok(())
}

struct BenchStats {
    elapsed: Duration,
    snapped_x: u64,
    snapped_y: u64,
}

fn run(config: &BenchConfig, siblings: &[Rect], rng: &mut Lcg) -> BenchStats {
    let settings = SnapSettings {
        enabled: true,
        threshold: config.threshold,
    };
    let mut stats = BenchStats {
        elapsed: Duration::ZERO,
        snapped_x: 0,
        snapped_y: 0,
    };
    let start = Instant::now();
    for _ in 0..config.queries {
        let candidate = Point::new(
            rng.below(SCREEN.width + 200) - 100,
            rng.below(SCREEN.height + 200) - 100,
        );
        let result = snap_position(black_box(&SnapQuery {
            candidate,
            size: MOVING,
            screen: SCREEN,
            siblings,
            settings,
        }));
        if let Some(result) = result {
            stats.snapped_x += u64::from(result.x.is_some());
            stats.snapped_y += u64::from(result.y.is_some());
        }
    }
    stats.elapsed = start.elapsed();
    stats
}

impl BenchStats {
    fn report(&self, config: &BenchConfig) -> String {
        let secs = self.elapsed.as_secs_f64();
        let per_second = if secs > 0.0 {
            config.queries as f64 / secs
        } else {
            0.0
        };
        let ns_per_query = secs * 1e9 / config.queries as f64;
        indoc::formatdoc!(
            r#"
            Snap bench: {queries} queries against {siblings} siblings (threshold {threshold}px)
            Elapsed: {secs:.3}s | {per_second:.0} queries/s | {ns:.1} ns/query
            Snapped x: {sx} | Snapped y: {sy}
            "#,
            queries = config.queries,
            siblings = config.siblings,
            threshold = config.threshold,
            secs = secs,
            per_second = per_second,
            ns = ns_per_query,
            sx = self.snapped_x,
            sy = self.snapped_y,
        )
    }
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0x5DEE_CE66_D1CE_4E5B;
        Self { state: seed }
    }

    /// Uniform-ish value in `0..bound`; `bound` must be positive.
    fn below(&mut self, bound: i32) -> i32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 33) % bound.max(1) as u64) as i32
    }
}
