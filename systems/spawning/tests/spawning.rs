use std::collections::BTreeMap;

use geocoin_core::{CellCoord, Command, Direction, Event};
use geocoin_system_spawning::{Config as SpawningConfig, Spawning};
use geocoin_world::{
    self as world,
    memento,
    persistence::{self, BlobStore, MemoryStore, SAVE_KEY},
    query, CellState, Config, World,
};

fn pump(world: &mut World, spawning: &Spawning, command: Command) -> Vec<Event> {
    let mut log = Vec::new();
    let mut pending = vec![command];

    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        spawning.handle(&events, &mut pending);
        log.extend(events);
    }

    log
}

fn live_counts(world: &World) -> BTreeMap<CellCoord, usize> {
    query::active_caches(world)
        .into_iter()
        .filter_map(|cell| query::cache_view(world, cell).map(|view| (cell, view.tokens.len())))
        .collect()
}

fn snapshot_count(world: &World, cell: CellCoord) -> Option<u32> {
    let snapshot = query::snapshot(world, cell)?;
    memento::summarize(snapshot).ok().map(|summary| summary.token_count)
}

#[test]
fn first_refresh_populates_roughly_a_tenth_of_the_neighbourhood() {
    let mut world = World::new(Config::default()).expect("valid config");
    let spawning = Spawning::new(SpawningConfig::default());
    let log = pump(&mut world, &spawning, Command::Refresh);

    let spawned = log
        .iter()
        .filter(|event| matches!(event, Event::CacheSpawned { .. }))
        .count();
    assert!(spawned > 0, "expected at least one cache near the start");
    assert!(spawned < 289 / 2, "spawn rate far above threshold: {spawned}");
    assert_eq!(query::visible_cells(&world).len(), 289);

    for (cell, count) in live_counts(&world) {
        assert!(count < 20);
        assert_eq!(spawning.evaluate(cell).map(|n| n as usize), Some(count));
    }
}

#[test]
fn moving_north_shifts_only_the_latitude_index_and_snapshots_departing_caches() {
    let config = Config::default();
    let tile_width = config.tile_width;
    let mut world = World::new(config).expect("valid config");
    let spawning = Spawning::default();
    let _ = pump(&mut world, &spawning, Command::Refresh);

    for cell in query::active_caches(&world) {
        let _ = pump(&mut world, &spawning, Command::Collect { cell });
    }
    let before_counts = live_counts(&world);
    let before_cell = query::player_cell(&world);
    let lat = query::player_position(&world).lat();

    let _ = pump(
        &mut world,
        &spawning,
        Command::MovePlayer {
            direction: Direction::North,
        },
    );

    let after_cell = query::player_cell(&world);
    let expected_shift =
        ((lat + 1e-4) / tile_width).floor() as i32 - (lat / tile_width).floor() as i32;
    assert_eq!(after_cell.i() - before_cell.i(), expected_shift);
    assert_eq!(after_cell.j(), before_cell.j());

    let visible = query::visible_cells(&world);
    assert_eq!(visible.len(), 289);
    assert!(visible
        .iter()
        .all(|cell| (cell.i() - after_cell.i()).abs() <= 8 && (cell.j() - after_cell.j()).abs() <= 8));

    for (cell, count) in before_counts {
        if visible.contains(&cell) {
            assert_eq!(query::cell_state(&world, cell), CellState::Active);
        } else {
            assert_eq!(query::cell_state(&world, cell), CellState::Dormant);
            assert_eq!(snapshot_count(&world, cell), Some(count as u32));
        }
    }
}

#[test]
fn unvisited_cells_regenerate_identically_in_independent_worlds() {
    let spawning = Spawning::default();

    let mut wanderer = World::new(Config::default()).expect("valid config");
    let _ = pump(&mut wanderer, &spawning, Command::Refresh);
    for direction in [Direction::East; 20] {
        let _ = pump(&mut wanderer, &spawning, Command::MovePlayer { direction });
    }

    let mut newcomer = World::new(Config::default()).expect("valid config");
    for direction in [Direction::East; 20] {
        let mut events = Vec::new();
        world::apply(&mut newcomer, Command::MovePlayer { direction }, &mut events);
    }
    let _ = pump(&mut newcomer, &spawning, Command::Refresh);

    assert_eq!(live_counts(&wanderer), live_counts(&newcomer));
}

#[test]
fn deterministic_replay_produces_identical_worlds() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn saved_world_resumes_with_mutated_caches() {
    let spawning = Spawning::default();
    let mut world = World::new(Config::default()).expect("valid config");
    let _ = pump(&mut world, &spawning, Command::Refresh);

    let target = query::active_caches(&world)
        .into_iter()
        .find(|cell| {
            query::cache_view(&world, *cell).map_or(false, |view| !view.tokens.is_empty())
        })
        .expect("a non-empty cache near the start");
    let _ = pump(&mut world, &spawning, Command::Collect { cell: target });
    let expected = live_counts(&world);

    let mut store = MemoryStore::new();
    persistence::save(&world, &mut store).expect("save succeeds");

    let mut resumed = persistence::restore(Config::default(), &store).expect("valid config");
    let log = pump(&mut resumed, &spawning, Command::Refresh);

    assert_eq!(live_counts(&resumed), expected);
    assert_eq!(query::player_inventory(&resumed).len(), 1);
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::CacheSpawned { .. })));
}

#[test]
fn malformed_save_falls_back_to_a_fresh_world() {
    let mut store = MemoryStore::new();
    store
        .set(SAVE_KEY, r#"{"playerPosition":{"lat":"#.to_owned())
        .expect("memory store accepts writes");

    let spawning = Spawning::default();
    let mut resumed = persistence::restore(Config::default(), &store).expect("valid config");
    let _ = pump(&mut resumed, &spawning, Command::Refresh);

    let mut fresh = World::new(Config::default()).expect("valid config");
    let _ = pump(&mut fresh, &spawning, Command::Refresh);

    assert_eq!(query::player_points(&resumed), 0);
    assert_eq!(query::player_inventory(&resumed).len(), 0);
    assert_eq!(
        query::player_position(&resumed),
        geocoin_world::DEFAULT_START_POSITION
    );
    assert_eq!(live_counts(&resumed), live_counts(&fresh));
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let spawning = Spawning::default();
    let mut world = World::new(Config::default()).expect("valid config");
    let mut events = Vec::new();

    for command in commands {
        events.extend(pump(&mut world, &spawning, command));
        for cell in query::active_caches(&world).into_iter().take(2) {
            events.extend(pump(&mut world, &spawning, Command::Collect { cell }));
        }
    }

    let snapshots = query::snapshots(&world)
        .map(|(cell, snapshot)| (cell, snapshot.as_str().to_owned()))
        .collect();

    ReplayOutcome { events, snapshots }
}

fn scripted_commands() -> Vec<Command> {
    vec![
        Command::Refresh,
        Command::MovePlayer {
            direction: Direction::North,
        },
        Command::MovePlayer {
            direction: Direction::North,
        },
        Command::MovePlayer {
            direction: Direction::West,
        },
        Command::MovePlayer {
            direction: Direction::South,
        },
        Command::MovePlayer {
            direction: Direction::South,
        },
        Command::MovePlayer {
            direction: Direction::South,
        },
    ]
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    snapshots: BTreeMap<CellCoord, String>,
}
