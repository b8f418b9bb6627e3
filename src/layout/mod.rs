pub mod attraction;
mod error;
pub mod forces;
pub mod geometry;
pub mod silhouette;
pub(crate) mod types;
pub use attraction::AttractionArea;
pub use error::{LayoutError, Result};
pub use forces::ActiveForces;
pub use geometry::{Rect, Vec2};
pub use silhouette::SilhouettePoint;
pub use types::*;

use crate::config::{LayoutConfig, SceneConfig};
use crate::input::IntensityGrid;
use attraction::compute_attraction_areas;
use forces::{ForceContext, total_force};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use silhouette::sample_silhouette;
use std::collections::BTreeMap;

/// Wall shifts smaller than this leave the bubble's velocity untouched.
const WALL_SHIFT_EPS: f32 = 1e-4;

/// Force-directed placement of bubbles around a silhouette.
///
/// The silhouette points, attraction areas, viewport and UI rectangles are
/// fixed at construction. Pins and bubbles are (re)created by [`reset`] and
/// moved one tick at a time by [`step`]; a pass completes after
/// `max_iterations` steps, after which stepping is a no-op until the next reset.
///
/// [`reset`]: LayoutEngine::reset
/// [`step`]: LayoutEngine::step
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    viewport: Rect,
    ui_rects: Vec<Rect>,
    silhouette: Vec<SilhouettePoint>,
    attraction_areas: Vec<AttractionArea>,
    pins: BTreeMap<PinId, Pin>,
    next_pin_id: u32,
    bubbles: Vec<Bubble>,
    iterations: usize,
    done: bool,
    rng: SmallRng,
}

impl LayoutEngine {
    /// Samples `grid` into silhouette points and precomputes attraction areas.
    pub fn from_grid(grid: &IntensityGrid, scene: &SceneConfig, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        scene.validate()?;
        let points = sample_silhouette(grid, &scene.viewport(), &config);
        Self::from_points(points, scene, config)
    }

    /// Builds an engine over an already sampled silhouette.
    pub fn from_points(
        silhouette: Vec<SilhouettePoint>,
        scene: &SceneConfig,
        config: LayoutConfig,
    ) -> Result<Self> {
        config.validate()?;
        scene.validate()?;

        let viewport = scene.viewport();
        let attraction_areas =
            compute_attraction_areas(&viewport, config.attraction_grid_size, &silhouette);

        tracing::debug!(
            points = silhouette.len(),
            areas = attraction_areas.len(),
            ui_rects = scene.ui_rects.len(),
            "layout engine initialized"
        );
        for area in &attraction_areas {
            tracing::trace!(
                weight = area.weight,
                x = area.attraction_point.x,
                y = area.attraction_point.y,
                "attraction area"
            );
        }

        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Ok(Self {
            config,
            viewport,
            ui_rects: scene.ui_rects(),
            silhouette,
            attraction_areas,
            pins: BTreeMap::new(),
            next_pin_id: 0,
            bubbles: Vec::new(),
            iterations: 0,
            done: false,
            rng,
        })
    }

    /// Replaces all pins and bubbles with `bubble_count` freshly seeded ones,
    /// each pinned somewhere on a random silhouette point.
    pub fn reset(&mut self) -> Result<()> {
        if self.silhouette.is_empty() {
            return Err(LayoutError::NoSilhouetteData);
        }
        self.clear();

        for _ in 0..self.config.bubble_count {
            let idx = self.rng.gen_range(0..self.silhouette.len());
            let square = self.silhouette[idx].rect;
            let anchor = Vec2::new(
                square.min.x + square.width() * self.rng.r#gen::<f32>(),
                square.min.y + square.height() * self.rng.r#gen::<f32>(),
            );
            self.add_bubble_with_random_dim(anchor);
        }

        tracing::debug!(
            bubbles = self.bubbles.len(),
            pins = self.pins.len(),
            "bubbles reset"
        );
        Ok(())
    }

    /// Drops every pin and bubble and rewinds the pass.
    pub fn clear(&mut self) {
        self.pins.clear();
        self.bubbles.clear();
        self.iterations = 0;
        self.done = false;
    }

    pub fn add_pin(&mut self, position: Vec2) -> PinId {
        let id = PinId(self.next_pin_id);
        self.next_pin_id += 1;
        self.pins.insert(id, Pin { id, position });
        id
    }

    /// Adds a bubble anchored to existing pins. Without an explicit position
    /// it starts at the mean of its pins. Returns the bubble's index.
    pub fn add_bubble(
        &mut self,
        pins: &[PinId],
        position: Option<Vec2>,
        dimension: Vec2,
    ) -> Result<usize> {
        if !(dimension.x.is_finite() && dimension.y.is_finite())
            || dimension.x <= 0.0
            || dimension.y <= 0.0
        {
            return Err(LayoutError::InvalidBubble(format!(
                "dimension must be positive, got {}x{}",
                dimension.x, dimension.y
            )));
        }

        let mut anchor_sum = Vec2::ZERO;
        for id in pins {
            let pin = self.pins.get(id).ok_or(LayoutError::UnknownPin(*id))?;
            anchor_sum += pin.position;
        }

        let position = match position {
            Some(p) => p,
            None if pins.is_empty() => return Err(LayoutError::EmptyPinSet),
            None => anchor_sum * (1.0 / pins.len() as f32),
        };
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(LayoutError::InvalidBubble("position must be finite".to_string()));
        }

        Ok(self.push_bubble(Bubble::new(position, dimension, pins.to_vec())))
    }

    /// Adds a pin at `pin_position` and a randomly sized bubble on top of it.
    pub fn add_bubble_with_random_dim(&mut self, pin_position: Vec2) -> usize {
        let pin = self.add_pin(pin_position);
        let dimension = self.random_dimension();
        self.push_bubble(Bubble::new(pin_position, dimension, vec![pin]))
    }

    /// Adds a randomly sized bubble shared by two new pins, starting halfway
    /// between them.
    pub fn add_bubble_with_two_pins(&mut self, first: Vec2, second: Vec2) -> usize {
        let a = self.add_pin(first);
        let b = self.add_pin(second);
        let dimension = self.random_dimension();
        self.push_bubble(Bubble::new(first.midpoint(second), dimension, vec![a, b]))
    }

    /// Whether the bubble's margin box fits the viewport on both axes.
    pub fn fits_viewport(&self, bubble: &Bubble) -> bool {
        let (wide, tall) = bubble
            .margin_rect(self.config.bubble_margin)
            .exceeds(&self.viewport);
        !(wide || tall)
    }

    fn push_bubble(&mut self, bubble: Bubble) -> usize {
        if !self.fits_viewport(&bubble) {
            tracing::warn!(
                width = bubble.dimension.x,
                height = bubble.dimension.y,
                "bubble with margin is larger than the viewport; it will be aligned to the far edge"
            );
        }
        self.bubbles.push(bubble);
        self.bubbles.len() - 1
    }

    fn random_dimension(&mut self) -> Vec2 {
        let [w_lo, w_hi] = self.config.bubble_width_range;
        let [h_lo, h_hi] = self.config.bubble_height_range;
        Vec2::new(self.rng.gen_range(w_lo..w_hi), self.rng.gen_range(h_lo..h_hi))
    }

    /// Advances every bubble by one tick. Forces are computed from the
    /// pre-step state of all bubbles before any of them moves.
    ///
    /// Returns `None` without touching anything once the pass is complete.
    pub fn step(&mut self) -> Option<StepDiagnostics> {
        if self.done {
            return None;
        }

        let iteration = self.iterations;
        let active = ActiveForces::for_iteration(&self.config, iteration);
        let mut diagnostics = StepDiagnostics {
            iteration,
            bubbles: vec![BubbleDiagnostics::default(); self.bubbles.len()],
        };

        let forces: Vec<Vec2> = {
            let ctx = ForceContext {
                config: &self.config,
                silhouette: &self.silhouette,
                attraction_areas: &self.attraction_areas,
                ui_rects: &self.ui_rects,
                pins: &self.pins,
                bubbles: &self.bubbles,
            };
            diagnostics
                .bubbles
                .iter_mut()
                .enumerate()
                .map(|(index, diag)| total_force(&ctx, active, index, diag))
                .collect()
        };

        let damping = self.config.damping;
        let margin = self.config.bubble_margin;
        for (bubble, force) in self.bubbles.iter_mut().zip(forces) {
            bubble.velocity += force;
            bubble.position += bubble.velocity;
            bubble.velocity *= damping;

            let shift = bubble.margin_rect(margin).shift_to_fit(&self.viewport);
            bubble.position += shift;
            if shift.x.abs() > WALL_SHIFT_EPS {
                bubble.velocity.x = 0.0;
            }
            if shift.y.abs() > WALL_SHIFT_EPS {
                bubble.velocity.y = 0.0;
            }
        }

        self.iterations += 1;
        tracing::trace!(iteration, active = active.count(), "layout step");

        if self.iterations >= self.config.max_iterations {
            self.done = true;
            tracing::debug!(iterations = self.iterations, "layout pass complete");
        }

        Some(diagnostics)
    }

    /// Steps until the pass completes; returns the number of steps taken.
    pub fn run_to_completion(&mut self) -> usize {
        let mut steps = 0;
        while self.step().is_some() {
            steps += 1;
        }
        steps
    }

    /// Moves the iteration counter, e.g. to start a pass with every force active.
    pub fn fast_forward(&mut self, iteration: usize) {
        self.iterations = iteration;
        self.done = iteration >= self.config.max_iterations;
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn ui_rects(&self) -> &[Rect] {
        &self.ui_rects
    }

    pub fn silhouette_points(&self) -> &[SilhouettePoint] {
        &self.silhouette
    }

    pub fn attraction_areas(&self) -> &[AttractionArea] {
        &self.attraction_areas
    }

    pub fn pins(&self) -> impl Iterator<Item = &Pin> + '_ {
        self.pins.values()
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn active_forces(&self) -> ActiveForces {
        ActiveForces::for_iteration(&self.config, self.iterations)
    }
}
