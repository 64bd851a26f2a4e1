use arena_core::config::{DivisiveParams, GenomeParams, StrategyConfig};
use arena_core::{GenerationConfig, generate, generate_with_seed};

fn config_for(strategy: StrategyConfig) -> GenerationConfig {
    GenerationConfig { strategy, ..GenerationConfig::default() }
}

fn all_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::default(),
        StrategyConfig::Divisive(DivisiveParams::default()),
        StrategyConfig::Genome(GenomeParams::default()),
    ]
}

#[test]
fn test_determinism_identical_seeds_produce_identical_maps() {
    for strategy in all_strategies() {
        let config = config_for(strategy);
        let first = generate_with_seed(&config, "test-1").expect("first run failed");
        let second = generate_with_seed(&config, "test-1").expect("second run failed");

        assert_eq!(first.grid, second.grid, "identical seeds must produce identical grids");
        assert_eq!(first.properties, second.properties);
        assert_eq!(first.placements, second.placements);
        assert_eq!(first.fingerprint, second.fingerprint);
    }
}

#[test]
fn test_determinism_different_seeds_produce_different_grids() {
    for strategy in all_strategies() {
        let config = config_for(strategy);
        let first = generate_with_seed(&config, "test-1").expect("first run failed");
        let second = generate_with_seed(&config, "test-2").expect("second run failed");

        assert_ne!(
            first.fingerprint, second.fingerprint,
            "different seeds should produce different grids"
        );
    }
}

#[test]
fn test_fingerprint_is_the_grid_hash() {
    let map = generate_with_seed(&GenerationConfig::default(), "test-1").expect("run failed");
    assert_eq!(map.fingerprint, map.grid.fingerprint());
    assert_eq!(map.seed, "test-1");
}

#[test]
fn test_auto_seed_records_the_seed_it_used() {
    let config = GenerationConfig { auto_seed: true, ..GenerationConfig::default() };
    let map = generate(&config).expect("auto-seeded run failed");
    assert!(!map.seed.is_empty());

    let replayed = generate_with_seed(&config, &map.seed).expect("replay failed");
    assert_eq!(map.grid, replayed.grid, "the reported seed must reproduce the map");
}
