//! Core geometry types for the layout resolver

use serde::Serialize;

use crate::model::{Element, HorizontalAnchor, RelativePosition, VerticalAnchor};

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Authored geometry of an element
    pub fn of(element: &Element) -> Self {
        Self::new(element.x, element.y, element.width, element.height)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Where a dependent element sits along one axis of its reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Far edge flush with the reference's near edge (above / left of it)
    Before,
    /// Centered on the reference
    Center,
    /// Near edge flush with the reference's far edge (below / right of it)
    After,
    /// Near edges aligned
    AlignStart,
}

impl Placement {
    /// Coordinate of the element's near edge on this axis
    pub fn place(self, start: f64, extent: f64, size: f64) -> f64 {
        match self {
            Placement::Before => start - size,
            Placement::Center => start + (extent - size) / 2.0,
            Placement::After => start + extent,
            Placement::AlignStart => start,
        }
    }
}

impl From<VerticalAnchor> for Placement {
    fn from(anchor: VerticalAnchor) -> Self {
        match anchor {
            VerticalAnchor::Top => Placement::Before,
            VerticalAnchor::Center => Placement::Center,
            VerticalAnchor::Bottom => Placement::After,
        }
    }
}

impl From<HorizontalAnchor> for Placement {
    fn from(anchor: HorizontalAnchor) -> Self {
        match anchor {
            HorizontalAnchor::Left => Placement::Before,
            HorizontalAnchor::Center => Placement::Center,
            HorizontalAnchor::Right => Placement::After,
        }
    }
}

/// `(vertical, horizontal)` placement of a predefined anchor
pub fn predefined_placements(position: RelativePosition) -> (Placement, Placement) {
    use Placement::*;
    match position {
        RelativePosition::Above => (Before, AlignStart),
        RelativePosition::Below => (After, AlignStart),
        RelativePosition::Left => (AlignStart, Before),
        RelativePosition::Right => (AlignStart, After),
        RelativePosition::Center => (Center, Center),
        RelativePosition::TopLeft => (Before, Before),
        RelativePosition::TopRight => (Before, After),
        RelativePosition::BottomLeft => (After, Before),
        RelativePosition::BottomRight => (After, After),
    }
}
