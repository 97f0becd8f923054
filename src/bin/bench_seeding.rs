//! Benchmark track seeding on synthetic events.
//!
//! Run with: cargo run --release --bin bench_seeding
//!
//! Usage:
//!   bench_seeding                      200 helices + 2k noise hits, 10 events
//!   bench_seeding --tracks 1k --noise 20k
//!   bench_seeding -n 100               Run 100 events (for profiling)
//!
//! For per-phase timing, build with: cargo run --release --features timing --bin bench_seeding

use ca_seeding::{
    Cluster, ClusterStore, Event, GeometryTable, HitKey, LayerId, Seeder, SeedingConfig,
    GEV_PER_TESLA_METER,
};
use clap::Parser;
use glam::DVec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use std::time::Instant;

const FIRST_LAYER: LayerId = 39;
const LAST_LAYER: LayerId = 54;

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('m') {
        (n, 1_000_000)
    } else if let Some(n) = s.strip_suffix('k') {
        (n, 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser)]
#[command(name = "bench_seeding")]
#[command(about = "Benchmark track seeding on synthetic helix events")]
struct Args {
    /// Helices per event (e.g., 200, 1k)
    #[arg(long, value_parser = parse_count, default_value = "200")]
    tracks: usize,

    /// Uniform noise hits per event
    #[arg(long, value_parser = parse_count, default_value = "2k")]
    noise: usize,

    /// Number of events
    #[arg(short = 'n', long, default_value_t = 10)]
    events: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Transverse momentum range of the generated helices (GeV/c)
    #[arg(long, default_value_t = 0.5)]
    pt_min: f64,
    #[arg(long, default_value_t = 10.0)]
    pt_max: f64,

    /// Pseudorapidity range is [-eta, eta]
    #[arg(long, default_value_t = 1.0)]
    eta: f64,
}

/// Layers 39..=54 from 30 to 48 cm.
fn geometry() -> GeometryTable {
    GeometryTable::from_radii(
        (FIRST_LAYER..=LAST_LAYER).map(|l| (l, 30.0 + 1.2 * (l - FIRST_LAYER) as f64)),
    )
    .expect("static geometry is valid")
}

/// Position at transverse distance `r` on a helix from the origin.
fn helix_point(r: f64, phi0: f64, eta: f64, pt: f64, charge: f64, config: &SeedingConfig) -> DVec3 {
    let big_r = pt / (GEV_PER_TESLA_METER * config.b_field_tesla) * config.units_per_meter;
    let half_turn = (r / (2.0 * big_r)).asin();
    let phi = phi0 - charge * half_turn;
    DVec3::new(r * phi.cos(), r * phi.sin(), eta.sinh() * 2.0 * big_r * half_turn)
}

struct SyntheticEvent {
    clusters: ClusterStore,
    /// Start-layer key and charge of each generated helix.
    truth: Vec<(HitKey, i8)>,
}

fn generate_event<R: Rng>(
    rng: &mut R,
    args: &Args,
    geometry: &GeometryTable,
    config: &SeedingConfig,
) -> SyntheticEvent {
    let mut clusters = ClusterStore::new();
    let mut truth = Vec::with_capacity(args.tracks);

    for i in 0..args.tracks {
        let pt = rng.gen_range(args.pt_min..args.pt_max);
        let phi0 = rng.gen_range(0.0..std::f64::consts::TAU);
        let eta = rng.gen_range(-args.eta..args.eta);
        let charge: i8 = if rng.gen_bool(0.5) { 1 } else { -1 };
        for (layer, r) in geometry.iter() {
            let p = helix_point(r, phi0, eta, pt, charge as f64, config);
            clusters.insert(Cluster::new(HitKey::new(layer, i as u32), p));
        }
        truth.push((HitKey::new(config.start_layer, i as u32), charge));
    }

    for j in 0..args.noise {
        let layer = rng.gen_range(FIRST_LAYER..=LAST_LAYER);
        let Some(r) = geometry.radius(layer) else {
            continue;
        };
        let phi = rng.gen_range(0.0..std::f64::consts::TAU);
        let eta: f64 = rng.gen_range(-args.eta..args.eta);
        let p = DVec3::new(r * phi.cos(), r * phi.sin(), r * eta.sinh());
        clusters.insert(Cluster::new(HitKey::new(layer, (args.tracks + j) as u32), p));
    }

    SyntheticEvent { clusters, truth }
}

fn main() {
    let args = Args::parse();

    println!("ca-seeding Benchmark");
    println!("====================\n");

    let config = SeedingConfig::default();
    let geometry = geometry();
    let mut seeder = match Seeder::new(config.clone()) {
        Ok(seeder) => seeder,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    println!("Configuration:");
    println!("  seed = {}", args.seed);
    println!("  helices/event = {}", args.tracks);
    println!("  noise hits/event = {}", args.noise);
    println!("  pt = [{}, {}) GeV/c, |eta| < {}", args.pt_min, args.pt_max, args.eta);
    println!("  events = {}", args.events);
    #[cfg(feature = "parallel")]
    println!("  parallel = enabled ({} threads)", rayon::current_num_threads());
    #[cfg(feature = "timing")]
    println!("  timing = enabled (per-phase timing will be printed)");

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut times: Vec<f64> = Vec::with_capacity(args.events);
    let (mut generated, mut found, mut charge_ok, mut emitted) = (0usize, 0usize, 0usize, 0usize);

    for _ in 0..args.events {
        let event = generate_event(&mut rng, &args, &geometry, &config);

        let t = Instant::now();
        let output = match seeder.run(&Event::new(&geometry, &event.clusters, DVec3::ZERO)) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("event failed: {e}");
                continue;
            }
        };
        times.push(t.elapsed().as_secs_f64() * 1000.0);

        #[cfg(feature = "timing")]
        println!("  {:?}", output.summary.timings);

        let starts: FxHashSet<(HitKey, i8)> = output
            .tracks
            .iter()
            .filter_map(|t| t.keys.first().map(|&k| (k, t.charge)))
            .collect();
        let start_keys: FxHashSet<HitKey> = starts.iter().map(|&(k, _)| k).collect();
        generated += event.truth.len();
        found += event.truth.iter().filter(|(k, _)| start_keys.contains(k)).count();
        charge_ok += event.truth.iter().filter(|t| starts.contains(t)).count();
        emitted += output.tracks.len();
    }

    if times.is_empty() {
        return;
    }
    let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = times.iter().sum::<f64>() / times.len() as f64;

    println!("\nResults:");
    println!("  Min time:      {:>8.2}ms", min);
    println!("  Max time:      {:>8.2}ms", max);
    println!("  Avg time:      {:>8.2}ms", avg);
    println!(
        "  Efficiency:    {:>8.1}% ({} of {} helices seeded)",
        100.0 * found as f64 / generated.max(1) as f64,
        found,
        generated
    );
    println!(
        "  Charge ok:     {:>8.1}%",
        100.0 * charge_ok as f64 / found.max(1) as f64
    );
    println!(
        "  Tracks/event:  {:>8.1}",
        emitted as f64 / times.len() as f64
    );
}
