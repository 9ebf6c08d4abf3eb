//! End-to-end checks of the generation life cycle.

use lifemutation_core::{
    GameMode, LifeForm, MovementMode, SimulationConfig, SimulationWorld, PLAY_AREA_CENTER,
};
use lifemutation_geom::distance;

fn small_world(mode: GameMode, config: SimulationConfig) -> SimulationWorld {
    SimulationWorld::new(config, mode).expect("config is valid")
}

#[test]
fn invalid_configs_are_rejected_up_front() {
    let bad = SimulationConfig {
        population_count: 0,
        ..SimulationConfig::default()
    };
    assert!(SimulationWorld::new(bad, GameMode::ReachCenter).is_err());

    let bad = SimulationConfig {
        food_sensor_sector_degrees: 7.3,
        ..SimulationConfig::default()
    };
    assert!(SimulationWorld::new(bad, GameMode::DontStarve).is_err());
}

#[test]
fn reach_center_spawns_stay_out_of_the_circle() {
    let config = SimulationConfig {
        population_count: 50,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::ReachCenter, config);

    // repeat to exercise plenty of random draws
    for _ in 0..5 {
        world.seed_population().unwrap();
        assert_eq!(world.lifeforms().len(), 50);
        for lifeform in world.lifeforms().values() {
            let d = distance(lifeform.location(), PLAY_AREA_CENTER);
            assert!(d >= 50.0, "spawned {d} from the centre");
        }
    }
}

#[test]
fn stepping_keeps_everyone_in_bounds_and_scored() {
    let config = SimulationConfig {
        population_count: 10,
        moves_per_generation: 100,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::ReachCenter, config);
    world.seed_population().unwrap();
    assert_eq!(world.generation(), 1);

    for _ in 0..100 {
        if !world.step().unwrap() {
            break;
        }
    }

    for (id, lifeform) in world.lifeforms() {
        // the lethal boundary sits at 290, so even agents that died crossing
        // it (death skips the clamp) remain inside the play area
        let p = lifeform.location();
        assert!((5.0..=295.0).contains(&p.x) && (5.0..=295.0).contains(&p.y));

        // the world mirrors each agent's score onto its network every move
        let network = world.network(*id).expect("network per slot");
        let expected = GameMode::ReachCenter.fitness(lifeform);
        assert!(
            (network.fitness - expected).abs() < 1e-5,
            "slot {id}: fitness {} vs position-derived {expected}",
            network.fitness
        );
        if lifeform.is_dead() {
            assert_eq!(network.fitness, 0.0);
        }
    }
}

#[test]
fn a_finished_generation_stays_finished() {
    let config = SimulationConfig {
        population_count: 4,
        moves_per_generation: 3,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::ReachCorner, config);
    world.seed_population().unwrap();

    while world.step().unwrap() {}
    assert_eq!(world.moves_remaining(), 0);

    let frozen: Vec<_> = world
        .lifeforms()
        .values()
        .map(LifeForm::location)
        .collect();

    // further stepping is a no-op
    for _ in 0..5 {
        assert!(!world.step().unwrap());
    }
    let still: Vec<_> = world
        .lifeforms()
        .values()
        .map(LifeForm::location)
        .collect();
    assert_eq!(frozen, still);

    // reseeding re-arms the world
    world.seed_population().unwrap();
    assert_eq!(world.generation(), 2);
    assert!(world.step().unwrap());
}

#[test]
fn a_scoreless_generation_restarts_the_population() {
    // DontStarve with no food: the run ends immediately and every network
    // scores zero
    let config = SimulationConfig {
        population_count: 6,
        food_dot_count: 0,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::DontStarve, config);
    world.seed_population().unwrap();
    assert!(world.food_dots().is_empty());
    assert!(!world.step().unwrap(), "no food ends the generation at once");

    world.run_selection().unwrap();
    assert!(
        world.networks().is_empty(),
        "a zero-fitness population is discarded wholesale"
    );

    world.seed_population().unwrap();
    assert_eq!(world.networks().len(), 6);
    assert_eq!(world.generation(), 2);
}

#[test]
fn selection_copies_survivors_over_the_bottom_half() {
    // Mutation disabled so loser weights must match their survivor exactly.
    let config = SimulationConfig {
        population_count: 8,
        selection_mutation_chance: 0.0,
        selection_mutation_magnitude: 0.0,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::DontTouchRed, config);
    world.seed_population().unwrap();

    // score at spawn positions: everyone is alive and outside the red box,
    // so every fitness is positive
    let mut before: Vec<(usize, f32, Vec<Vec<Vec<f32>>>)> = world
        .lifeforms()
        .iter()
        .map(|(id, lifeform)| {
            let network = world.network(*id).unwrap();
            (
                *id,
                GameMode::DontTouchRed.fitness(lifeform),
                network.weights().to_vec(),
            )
        })
        .collect();
    before.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    world.run_selection().unwrap();
    assert_eq!(world.networks().len(), 8);

    let half = 4;
    for rank in 0..half {
        let (loser_id, _, _) = before[rank];
        let (_, _, ref survivor_weights) = before[rank + half];
        let after = world.network(loser_id).unwrap();
        assert_eq!(after.id(), loser_id, "slots keep their ids");
        assert_eq!(
            after.weights(),
            &survivor_weights[..],
            "rank {rank} did not inherit its survivor"
        );
    }

    // middle survivors are untouched
    for rank in half..7 {
        let (id, _, ref weights) = before[rank];
        assert_eq!(world.network(id).unwrap().weights(), &weights[..]);
    }

    // the champion slot is rebuilt from scratch
    let (champion_id, _, ref champion_weights) = before[7];
    let rebuilt = world.network(champion_id).unwrap();
    assert_eq!(rebuilt.id(), champion_id);
    assert_ne!(rebuilt.weights(), &champion_weights[..]);
    assert_eq!(rebuilt.fitness, 0.0);
}

#[test]
fn network_slots_survive_across_generations() {
    let config = SimulationConfig {
        population_count: 6,
        moves_per_generation: 5,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::DontTouchRed, config);

    for generation in 1..=3 {
        world.seed_population().unwrap();
        assert_eq!(world.generation(), generation);
        while world.step().unwrap() {}
        world.run_selection().unwrap();

        let ids: Vec<usize> = world.networks().keys().copied().collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }
}

#[test]
fn topology_follows_mode_config_and_hidden_layer_zero() {
    let config = SimulationConfig {
        hidden_layers: vec![0, 12],
        ..SimulationConfig::default()
    };
    let world = small_world(GameMode::ReachCenter, config);

    // ReachCenter: 1 indicator + 16 wall sectors; hidden 0 widens to match
    assert_eq!(world.topology(), vec![17, 17, 12, 2]);

    let config = SimulationConfig {
        movement: MovementMode::EightDirection,
        ..SimulationConfig::default()
    };
    let world = small_world(GameMode::DontStarve, config);
    // 32 food sectors, no targets, no peers; six output neurons
    assert_eq!(world.topology(), vec![32, 6]);
}

#[test]
fn changing_mode_discards_the_evolved_networks() {
    let config = SimulationConfig {
        population_count: 4,
        moves_per_generation: 5,
        ..SimulationConfig::default()
    };
    let mut world = small_world(GameMode::ReachCorner, config);
    world.seed_population().unwrap();
    assert_eq!(world.networks().len(), 4);

    world.set_game_mode(GameMode::ReachCenter);
    assert!(world.networks().is_empty());
    assert!(!world.step().unwrap(), "mode changes halt the world");
    assert_eq!(world.targets().len(), 1, "centre marker installed");

    world.seed_population().unwrap();
    assert_eq!(world.networks().len(), 4);
    let expected_inputs =
        LifeForm::input_neurons_required(world.config(), GameMode::ReachCenter, true);
    for network in world.networks().values() {
        assert_eq!(network.layers()[0], expected_inputs);
    }
}
