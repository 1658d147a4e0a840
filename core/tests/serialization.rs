use tilegrid_core::{
    Cell, Direction, Engine, GemKind, Grid, Removal, SlideConfig, SlideEngine, SlideStep,
    SwapConfig, SwapEngine, SwapStep, Terminal, TileValue,
};

#[test]
fn grid_round_trips_through_json() {
    let grid = Grid::from_values(&[[2, 0, 4], [0, 8, 0]]).unwrap();

    let json = serde_json::to_string(&grid).unwrap();
    let back: Grid<TileValue> = serde_json::from_str(&json).unwrap();

    assert_eq!(back, grid);
    assert_eq!(back[(1, 1)], Cell::Occupied(8));
    assert!(back[(0, 1)].is_empty());
}

#[test]
fn steps_round_trip_through_json() {
    let slide = [
        SlideStep::Slide {
            from: (0, 3),
            to: (0, 0),
        },
        SlideStep::Merge {
            from: (0, 1),
            into: (0, 0),
            value: 8,
        },
        SlideStep::Spawn {
            at: (3, 3),
            value: 2,
        },
    ];
    let json = serde_json::to_string(&slide).unwrap();
    assert_eq!(serde_json::from_str::<Vec<SlideStep>>(&json).unwrap(), slide);

    let swap = [
        SwapStep::Swapped { a: (2, 0), b: (2, 1) },
        SwapStep::Removed(Removal {
            removed: vec![(0, 0), (1, 0), (2, 0)],
            score_delta: 30,
        }),
        SwapStep::Dropped {
            from: (0, 1),
            to: (2, 1),
        },
        SwapStep::Refilled { at: (0, 0), kind: 4 },
        SwapStep::SwappedBack { a: (2, 0), b: (2, 1) },
    ];
    let json = serde_json::to_string(&swap).unwrap();
    assert_eq!(serde_json::from_str::<Vec<SwapStep>>(&json).unwrap(), swap);
}

#[test]
fn slide_snapshot_serializes_every_field() {
    let grid = Grid::from_values(&[[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    let mut engine = SlideEngine::from_grid(grid, SlideConfig::new((4, 4), 1)).unwrap();
    engine.submit_action(Direction::Left).unwrap();
    engine.settle().unwrap();

    let value = serde_json::to_value(engine.snapshot()).unwrap();

    assert_eq!(value["score"], 2048);
    assert_eq!(value["best_score"], 2048);
    assert_eq!(value["move_count"], 1);
    assert_eq!(value["is_settled"], true);
    assert!(value["selected"].is_null());
    assert_eq!(
        serde_json::from_value::<Terminal>(value["terminal"].clone()).unwrap(),
        Terminal::Win
    );
    let grid: Grid<TileValue> = serde_json::from_value(value["grid"].clone()).unwrap();
    assert_eq!(&grid, engine.grid());
}

#[test]
fn swap_snapshot_carries_selection() {
    let mut engine = SwapEngine::new(SwapConfig::new((7, 7), 6, 5));
    engine
        .submit_action(tilegrid_core::SwapAction::Select((3, 4)))
        .unwrap();

    let value = serde_json::to_value(engine.snapshot()).unwrap();

    assert_eq!(value["selected"], serde_json::json!([3, 4]));
    assert!(value["best_score"].is_null());
    assert!(value["terminal"].is_null());
    let grid: Grid<GemKind> = serde_json::from_value(value["grid"].clone()).unwrap();
    assert_eq!(&grid, engine.grid());
}

#[test]
fn configs_fill_missing_fields_with_defaults() {
    let slide: SlideConfig = serde_json::from_str(r#"{"win_value": 512}"#).unwrap();
    assert_eq!(slide.win_value, 512);
    assert_eq!(slide.size, SlideConfig::default().size);

    let swap: SwapConfig = serde_json::from_str(r#"{"size": [8, 9]}"#).unwrap();
    assert_eq!(swap.size, (8, 9));
    assert_eq!(swap.kinds, SwapConfig::default().kinds);
}
