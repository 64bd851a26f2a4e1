use anyhow::{Result, bail};
use arena_core::config::{DivisiveParams, GenomeParams, StrategyConfig};
use arena_core::invariants::check_map;
use arena_core::{GenerationConfig, generate_with_seed};
use clap::{Parser, ValueEnum};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    Cellular,
    Divisive,
    Genome,
    All,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    count: u32,
    #[arg(long, value_enum, default_value = "all")]
    strategy: StrategyKind,
    #[arg(long, default_value_t = 48)]
    width: usize,
    #[arg(long, default_value_t = 40)]
    height: usize,
}

fn strategies(kind: StrategyKind) -> Vec<StrategyConfig> {
    let cellular = StrategyConfig::default();
    let divisive = StrategyConfig::Divisive(DivisiveParams::default());
    let genome = StrategyConfig::Genome(GenomeParams::default());
    match kind {
        StrategyKind::Cellular => vec![cellular],
        StrategyKind::Divisive => vec![divisive],
        StrategyKind::Genome => vec![genome],
        StrategyKind::All => vec![cellular, divisive, genome],
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Sweeping {} seeds from master seed {}...", args.count, args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut failures = 0;
    let mut soft_errors = 0;

    for strategy in strategies(args.strategy) {
        let config = GenerationConfig {
            width: args.width,
            height: args.height,
            strategy,
            ..GenerationConfig::default()
        };
        for _ in 0..args.count {
            let seed = format!("sweep-{:016x}", rng.next_u64());
            let map = match generate_with_seed(&config, &seed) {
                Ok(map) => map,
                Err(error) => {
                    println!("{seed}: generation failed: {error}");
                    failures += 1;
                    continue;
                }
            };
            soft_errors += map.soft_errors.len();
            for violation in check_map(&map, config.border) {
                println!("{seed}: {violation}");
                failures += 1;
            }
            log::debug!("{seed}: {} room(s), {:016x}", map.rooms.len(), map.fingerprint);
        }
    }

    println!("Sweep finished: {failures} failure(s), {soft_errors} soft error(s)");
    if failures > 0 {
        bail!("{failures} invariant failure(s)");
    }
    Ok(())
}
