//! Position resolution over the reference graph
//!
//! Elements are visited once, in dependency order, so every reference is
//! placed before anything anchored to it.

use std::collections::HashMap;

use crate::model::Element;

use super::error::LayoutError;
use super::graph::ReferenceGraph;
use super::types::{predefined_placements, BoundingBox, Placement, Point};

/// Resolved origin of every element, keyed by id
pub type PositionMap = HashMap<String, Point>;

/// Outcome of a lenient resolution pass
#[derive(Debug, Clone, Default)]
pub struct LayoutResolution {
    pub positions: PositionMap,
    /// Everything that forced a fallback, in discovery order
    pub errors: Vec<LayoutError>,
}

impl LayoutResolution {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolve absolute positions, failing on the first graph problem.
///
/// Cycles yield [`LayoutError::CircularReference`]; unknown references and
/// duplicate ids are errors as well.
pub fn resolve_positions(elements: &[Element]) -> Result<PositionMap, LayoutError> {
    let graph = ReferenceGraph::build(elements);

    if let Some(issue) = graph.issues.first() {
        return Err(issue.clone());
    }
    if let Some(cycle) = graph.cycles.first() {
        return Err(LayoutError::circular(cycle.clone()));
    }

    Ok(place_all(&graph))
}

/// Resolve absolute positions without failing.
///
/// Elements on a cycle or pointing at an unknown id keep their authored
/// position; their dependents are placed against that fallback geometry.
pub fn resolve_positions_lenient(elements: &[Element]) -> LayoutResolution {
    let graph = ReferenceGraph::build(elements);

    let mut errors = graph.issues.clone();
    errors.extend(graph.cycles.iter().cloned().map(LayoutError::circular));

    for error in &errors {
        tracing::warn!("layout degraded: {error}");
    }

    LayoutResolution {
        positions: place_all(&graph),
        errors,
    }
}

fn place_all(graph: &ReferenceGraph<'_>) -> PositionMap {
    let elements = graph.elements;
    let mut resolved: Vec<BoundingBox> = elements.iter().map(BoundingBox::of).collect();

    for i in graph.topological_order() {
        let element = &elements[i];
        match graph.references[i] {
            Some(target) => {
                let origin = anchor_origin(element, &resolved[target]);
                resolved[i].x = origin.x;
                resolved[i].y = origin.y;
                tracing::debug!(
                    element = %element.id,
                    reference = %elements[target].id,
                    x = origin.x,
                    y = origin.y,
                    "placed relative element"
                );
            }
            None if graph.is_degraded(i) => {
                tracing::debug!(element = %element.id, "keeping authored position");
            }
            None => {}
        }
    }

    let mut positions = PositionMap::with_capacity(elements.len());
    for (element, bounds) in elements.iter().zip(&resolved) {
        positions
            .entry(element.id.clone())
            .or_insert_with(|| bounds.origin());
    }
    positions
}

/// Origin of `element` anchored to the resolved `reference` box.
///
/// Custom anchors win over a predefined position when both are set; an axis
/// without an anchor keeps the authored coordinate. The offset is added last.
pub fn anchor_origin(element: &Element, reference: &BoundingBox) -> Point {
    let (vertical, horizontal): (Option<Placement>, Option<Placement>) =
        if element.has_custom_anchor() {
            (
                element.relative_vertical.map(Placement::from),
                element.relative_horizontal.map(Placement::from),
            )
        } else if let Some(position) = element.relative_position {
            let (v, h) = predefined_placements(position);
            (Some(v), Some(h))
        } else {
            (None, None)
        };

    let y = vertical
        .map(|p| p.place(reference.y, reference.height, element.height))
        .unwrap_or(element.y);
    let x = horizontal
        .map(|p| p.place(reference.x, reference.width, element.width))
        .unwrap_or(element.x);

    Point::new(x + element.relative_offset.x, y + element.relative_offset.y)
}
