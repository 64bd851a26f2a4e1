use arena_core::config::{DivisiveParams, GenomeParams, StrategyConfig};
use arena_core::invariants::{check_map, regions_below};
use arena_core::mapgen::regions::denoise;
use arena_core::mapgen::strategy_for;
use arena_core::{GenerationConfig, MapRng, NodeId, generate_with_seed};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};

fn sweep(strategy: StrategyConfig, cases: u32) {
    let config =
        GenerationConfig { width: 32, height: 28, strategy, ..GenerationConfig::default() };
    let mut runner = TestRunner::new(ProptestConfig::with_cases(cases));
    runner
        .run(&any::<u64>(), |seed| {
            let seed = format!("sweep-{seed}");
            let map = generate_with_seed(&config, &seed)
                .map_err(|error| TestCaseError::fail(error.to_string()))?;
            if let Some(violation) = check_map(&map, config.border).first() {
                return Err(TestCaseError::fail(format!("seed {seed:?}: {violation}")));
            }
            Ok(())
        })
        .expect("generated maps should preserve invariants");
}

#[test]
fn cellular_maps_preserve_invariants() {
    sweep(StrategyConfig::default(), 12);
}

#[test]
fn divisive_maps_preserve_invariants() {
    sweep(StrategyConfig::Divisive(DivisiveParams::default()), 12);
}

#[test]
fn genome_maps_preserve_invariants() {
    sweep(StrategyConfig::Genome(GenomeParams::default()), 12);
}

#[test]
fn one_denoising_pass_leaves_nothing_below_threshold() {
    let config = GenerationConfig::default();
    let strategies = [
        StrategyConfig::default(),
        StrategyConfig::Divisive(DivisiveParams::default()),
        StrategyConfig::Genome(GenomeParams::default()),
    ];
    let mut runner = TestRunner::new(ProptestConfig::with_cases(16));
    runner
        .run(&any::<u64>(), |seed| {
            for strategy in &strategies {
                let mut rng = MapRng::from_u64(seed);
                let layout = strategy_for(strategy, config.symbols)
                    .generate(config.width, config.height, &mut rng)
                    .map_err(|error| TestCaseError::fail(error.to_string()))?;
                let mut grid = layout.grid;
                denoise(&mut grid, strategy.thresholds());
                let left = regions_below(&grid, strategy.thresholds());
                if left > 0 {
                    return Err(TestCaseError::fail(format!("{left} region(s) survived")));
                }
            }
            Ok(())
        })
        .expect("denoising should settle in a single pass");
}

#[test]
fn cave_resources_stay_inside_their_room_tiles() {
    let config = GenerationConfig::default();
    for index in 0..20 {
        let map = generate_with_seed(&config, &format!("p-{index}")).expect("cave map generates");
        assert!(!map.footprints.is_empty(), "cave rooms carry exact tiles");
        for placed in &map.placements {
            let NodeId::Room(room) = placed.room else {
                panic!("resource anchored to a tile node: {placed:?}");
            };
            assert!(
                map.rooms[room as usize].tiles.contains(&placed.coord),
                "seed p-{index}: {placed:?} outside room {room}"
            );
        }
    }
}

#[test]
fn wide_borders_and_passages_stay_sealed() {
    let mut config = GenerationConfig { border: 3, ..GenerationConfig::default() };
    if let StrategyConfig::Cellular(params) = &mut config.strategy {
        params.passage_width = 2;
    }
    let map = generate_with_seed(&config, "test-1").expect("wide border run failed");
    assert_eq!(map.grid.width(), config.width + 6);
    assert_eq!(map.grid.height(), config.height + 6);
    assert_eq!(check_map(&map, config.border), Vec::new());
}
