use serde::Serialize;

use super::geometry::{Rect, Vec2};

/// Stable key of a pin in the engine's pin table. Ids are never reused
/// within one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PinId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pin {
    pub id: PinId,
    pub position: Vec2,
}

/// A label box anchored to one or more pins. `position` is the box center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub position: Vec2,
    pub velocity: Vec2,
    pub dimension: Vec2,
    pub pins: Vec<PinId>,
}

impl Bubble {
    pub fn new(position: Vec2, dimension: Vec2, pins: Vec<PinId>) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            dimension,
            pins,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.dimension)
    }

    /// The visual box grown by `margin`, used for overlap tests.
    pub fn margin_rect(&self, margin: f32) -> Rect {
        self.rect().inflate(margin)
    }

    pub fn is_anchored_to(&self, pin: PinId) -> bool {
        self.pins.contains(&pin)
    }
}

/// Per-bubble debug data for one step. Not part of the persistent state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BubbleDiagnostics {
    pub total_force: Vec2,
    /// Center of the last UI or bubble overlap seen while computing forces.
    pub intersection_center: Option<Vec2>,
    /// The silhouette force fell back to the attraction-area escape target.
    pub used_escape_force: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StepDiagnostics {
    /// Iteration index the step computed (before the counter advanced).
    pub iteration: usize,
    pub bubbles: Vec<BubbleDiagnostics>,
}
