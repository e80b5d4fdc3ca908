use geocoin_core::{CellCoord, Command, Direction, Event, GeoPoint, Token};
use geocoin_system_status::{CachePopup, Status};
use geocoin_world::{self as world, query, Config, World};

fn world_with_cache(cell: CellCoord, token_count: u32) -> (World, Vec<Event>) {
    let mut world = World::new(Config {
        tile_width: 1.0,
        visibility_radius: 1,
        step_size: 1.0,
        start_position: GeoPoint::new(0.5, 0.5),
    })
    .expect("valid config");

    let mut events = Vec::new();
    world::apply(&mut world, Command::Refresh, &mut events);
    world::apply(
        &mut world,
        Command::SpawnCache { cell, token_count },
        &mut events,
    );
    (world, events)
}

#[test]
fn popup_reflects_cache_after_every_transfer() {
    let cell = CellCoord::new(0, 1);
    let (mut world, events) = world_with_cache(cell, 2);
    let mut status = Status::new();
    status.handle(&events);
    assert_eq!(status.take_redraw().caches, vec![cell]);

    let popup = status.cache_popup(&world, cell).expect("cache is active");
    assert_eq!(
        popup.to_string(),
        "Cache at \"0,1\"\nInventory:\n  - 0: 1 #0\n  - 0: 1 #1"
    );
    assert!(popup.can_collect);
    assert!(!popup.can_deposit);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Collect { cell }, &mut events);
    status.handle(&events);
    let redraw = status.take_redraw();
    assert!(redraw.panel);
    assert_eq!(redraw.caches, vec![cell]);

    assert_eq!(
        status.cache_popup(&world, cell),
        Some(CachePopup {
            cell,
            bounds: query::board(&world).cell_bounds(cell),
            tokens: vec![Token::new(cell, 1)],
            can_collect: true,
            can_deposit: true,
        })
    );
    assert_eq!(
        status.status_panel(&world).to_string(),
        "0 points | Inventory: 1 coins\n  0: 1 #0"
    );
}

#[test]
fn departed_cache_has_no_popup() {
    let cell = CellCoord::new(-1, 0);
    let (mut world, events) = world_with_cache(cell, 1);
    let mut status = Status::new();
    status.handle(&events);
    let _ = status.take_redraw();

    let mut events = Vec::new();
    for _ in 0..2 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );
    }
    status.handle(&events);

    let redraw = status.take_redraw();
    assert!(redraw.map);
    assert_eq!(redraw.caches, vec![cell]);
    assert!(status.cache_popup(&world, cell).is_none());
}

#[test]
fn banner_comes_from_the_world() {
    let (world, _) = world_with_cache(CellCoord::new(0, 0), 0);
    assert_eq!(Status::default().welcome_banner(&world), "Welcome to Geocoin.");
}
