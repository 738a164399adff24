//! Integration tests for relative layout resolution

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use receipt_engine::layout::{LayoutError, Point};
use receipt_engine::model::{ElementKind, RelativePosition, VerticalAnchor};
use receipt_engine::{parse_elements, resolve_positions, resolve_positions_lenient, Element};

fn text(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(id, ElementKind::Text).with_bounds(x, y, w, h)
}

#[test]
fn test_below_with_offset() {
    let elements = vec![
        text("a", 10.0, 20.0, 100.0, 30.0),
        text("b", 10.0, 0.0, 100.0, 20.0)
            .relative_to("a")
            .with_anchors(Some(VerticalAnchor::Bottom), None)
            .with_offset(0.0, 10.0),
    ];
    let positions = resolve_positions(&elements).unwrap();
    assert_eq!(positions["b"].y, 60.0);
    assert_eq!(positions["b"].x, 10.0);
}

#[test]
fn test_chain_is_order_independent() {
    let chain = vec![
        text("header", 0.0, 0.0, 200.0, 40.0),
        text("items", 0.0, 0.0, 200.0, 100.0)
            .relative_to("header")
            .with_position(RelativePosition::Below),
        text("total", 0.0, 0.0, 80.0, 20.0)
            .relative_to("items")
            .with_position(RelativePosition::BottomRight)
            .with_offset(-80.0, 5.0),
        text("footer", 0.0, 0.0, 200.0, 30.0)
            .relative_to("total")
            .with_position(RelativePosition::Below),
    ];
    let expected = resolve_positions(&chain).unwrap();
    assert_eq!(expected["total"], Point::new(120.0, 145.0));
    assert_eq!(expected["footer"], Point::new(120.0, 165.0));

    let mut reversed = chain.clone();
    reversed.reverse();
    assert_eq!(resolve_positions(&reversed).unwrap(), expected);

    let mut rotated = chain;
    rotated.rotate_left(2);
    assert_eq!(resolve_positions(&rotated).unwrap(), expected);
}

const POSITIONS: [RelativePosition; 9] = [
    RelativePosition::Above,
    RelativePosition::Below,
    RelativePosition::Left,
    RelativePosition::Right,
    RelativePosition::Center,
    RelativePosition::TopLeft,
    RelativePosition::TopRight,
    RelativePosition::BottomLeft,
    RelativePosition::BottomRight,
];

/// A forest where every element after the first hangs off an earlier one
fn arb_forest() -> impl Strategy<Value = Vec<Element>> {
    prop::collection::vec((any::<usize>(), 0usize..9, -50i32..50, -50i32..50), 1..12).prop_map(
        |nodes| {
            nodes
                .into_iter()
                .enumerate()
                .map(|(i, (parent, position, dx, dy))| {
                    let f = i as f64;
                    let element = text(&format!("e{i}"), f * 3.0, f * 7.0, 20.0 + f, 10.0 + f);
                    if i == 0 || parent % 4 == 0 {
                        element
                    } else {
                        element
                            .relative_to(format!("e{}", parent % i))
                            .with_position(POSITIONS[position])
                            .with_offset(f64::from(dx), f64::from(dy))
                    }
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_input_order_does_not_change_positions(
        (forest, shuffled) in arb_forest()
            .prop_flat_map(|forest| (Just(forest.clone()), Just(forest).prop_shuffle()))
    ) {
        let expected = resolve_positions(&forest).unwrap();
        prop_assert_eq!(resolve_positions(&shuffled).unwrap(), expected);
    }
}

#[test]
fn test_cycle_is_reported_promptly() {
    let elements = vec![
        text("a", 0.0, 0.0, 10.0, 10.0).relative_to("b"),
        text("b", 0.0, 0.0, 10.0, 10.0).relative_to("a"),
    ];

    let started = Instant::now();
    let err = resolve_positions(&elements).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(1));

    insta::assert_snapshot!(err.to_string(), @"circular relative reference: a -> b -> a");
}

#[test]
fn test_undefined_reference_suggests() {
    let elements = vec![
        text("header", 0.0, 0.0, 10.0, 10.0),
        text("t", 0.0, 0.0, 10.0, 10.0).relative_to("heder"),
    ];
    let err = resolve_positions(&elements).unwrap_err();

    assert_eq!(
        err,
        LayoutError::undefined("t", "heder", vec!["header".to_string()])
    );
    insta::assert_snapshot!(
        err.to_string(),
        @"element 't' is relative to undefined element 'heder'"
    );
}

#[test]
fn test_duplicate_id() {
    let elements = vec![
        text("a", 0.0, 0.0, 1.0, 1.0),
        text("a", 5.0, 5.0, 1.0, 1.0),
    ];
    assert_eq!(
        resolve_positions(&elements).unwrap_err(),
        LayoutError::duplicate("a")
    );
}

#[test]
fn test_lenient_degrades_and_continues() {
    let elements = vec![
        text("ok", 0.0, 0.0, 50.0, 50.0),
        text("below_ok", 3.0, 3.0, 10.0, 10.0)
            .relative_to("ok")
            .with_position(RelativePosition::Below),
        text("x", 7.0, 8.0, 10.0, 10.0).relative_to("y"),
        text("y", 9.0, 10.0, 10.0, 10.0).relative_to("x"),
        text("orphan", 1.0, 2.0, 10.0, 10.0).relative_to("nowhere"),
    ];
    let resolution = resolve_positions_lenient(&elements);

    assert_eq!(resolution.errors.len(), 2);
    assert_eq!(resolution.positions["below_ok"], Point::new(0.0, 50.0));
    assert_eq!(resolution.positions["x"], Point::new(7.0, 8.0));
    assert_eq!(resolution.positions["y"], Point::new(9.0, 10.0));
    assert_eq!(resolution.positions["orphan"], Point::new(1.0, 2.0));
}

#[test]
fn test_elements_from_json() {
    let json = r#"[
        {"id": "logo", "type": "image", "x": 10, "y": 10, "width": 80, "height": 40},
        {"id": "name", "type": "text", "x": 0, "y": 0, "width": 120, "height": 20,
         "relativeTo": "logo", "relativePosition": "right",
         "relativeVertical": "", "relativeOffset": {"x": 8}}
    ]"#;
    let elements = parse_elements(json).unwrap();
    let positions = resolve_positions(&elements).unwrap();

    assert_eq!(positions["name"], Point::new(98.0, 10.0));
}
