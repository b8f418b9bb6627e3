// The five force generators. Each one sums raw directions for a single bubble,
// then normalizes the sum and scales it by its own factor, so a generator
// contributes at most its factor per step regardless of how many obstacles it saw.

use std::collections::BTreeMap;

use serde::Serialize;

use super::attraction::{AttractionArea, area_containing};
use super::geometry::{Rect, Vec2};
use super::silhouette::SilhouettePoint;
use super::types::{Bubble, BubbleDiagnostics, Pin, PinId};
use crate::config::LayoutConfig;

/// Which generators run at a given iteration.
///
/// Silhouette and UI avoidance always run. The bubble-to-bubble and pin
/// forces switch on once the iteration counter passes their thresholds, so
/// early steps are spent getting off the silhouette. Every flag is a
/// `iteration > threshold` test, which makes the schedule monotonic: once a
/// generator is active it stays active for the rest of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveForces {
    pub silhouette: bool,
    pub ui: bool,
    pub long_range: bool,
    pub collision: bool,
    pub pins: bool,
}

impl ActiveForces {
    pub fn for_iteration(config: &LayoutConfig, iteration: usize) -> Self {
        Self {
            silhouette: true,
            ui: true,
            long_range: iteration > config.long_range_after,
            collision: iteration > config.collision_after,
            pins: iteration > config.pins_after,
        }
    }

    pub fn all() -> Self {
        Self {
            silhouette: true,
            ui: true,
            long_range: true,
            collision: true,
            pins: true,
        }
    }

    pub fn count(&self) -> usize {
        [
            self.silhouette,
            self.ui,
            self.long_range,
            self.collision,
            self.pins,
        ]
        .into_iter()
        .filter(|on| *on)
        .count()
    }
}

/// Read-only view of everything a force generator may look at.
pub struct ForceContext<'a> {
    pub config: &'a LayoutConfig,
    pub silhouette: &'a [SilhouettePoint],
    pub attraction_areas: &'a [AttractionArea],
    pub ui_rects: &'a [Rect],
    pub pins: &'a BTreeMap<PinId, Pin>,
    pub bubbles: &'a [Bubble],
}

/// Sum of the active forces acting on bubble `index`.
pub fn total_force(
    ctx: &ForceContext<'_>,
    active: ActiveForces,
    index: usize,
    diag: &mut BubbleDiagnostics,
) -> Vec2 {
    let mut total = Vec2::ZERO;
    if active.silhouette {
        total += silhouette_force(ctx, index, diag);
    }
    if active.ui {
        total += ui_force(ctx, index, diag);
    }
    if active.long_range {
        total += long_range_force(ctx, index);
    }
    if active.collision {
        total += collision_force(ctx, index, diag);
    }
    if active.pins {
        total += pin_force(ctx, index);
    }
    diag.total_force = total;
    total
}

/// Pushes the bubble down the silhouette coverage gradient. When the probe
/// box is almost entirely covered there is no usable gradient, and the bubble
/// is steered toward the attraction point of the area it sits in instead.
pub fn silhouette_force(
    ctx: &ForceContext<'_>,
    index: usize,
    diag: &mut BubbleDiagnostics,
) -> Vec2 {
    let bubble = &ctx.bubbles[index];
    let probe = bubble.margin_rect(ctx.config.silhouette_margin);
    let probe_area = probe.area();

    let mut push = Vec2::ZERO;
    let mut covered = 0.0f32;
    let mut touched = false;

    for point in ctx.silhouette {
        let hit = probe.intersection(&point.rect);
        if hit.is_empty() {
            continue;
        }
        touched = true;
        let weighted = hit.area() * point.weight;
        covered += weighted;
        push += (bubble.position - hit.center()).normalized() * weighted;
    }

    if !touched {
        return Vec2::ZERO;
    }

    let coverage = if probe_area > 0.0 {
        covered / probe_area
    } else {
        0.0
    };
    if coverage < ctx.config.escape_coverage_ratio {
        return push.with_length(ctx.config.silhouette_force);
    }

    area_containing(ctx.attraction_areas, bubble.position)
        .map(|area| {
            diag.used_escape_force = true;
            (area.attraction_point - bubble.position).with_length(ctx.config.attraction_force)
        })
        .unwrap_or(Vec2::ZERO)
}

pub fn ui_force(ctx: &ForceContext<'_>, index: usize, diag: &mut BubbleDiagnostics) -> Vec2 {
    let bubble = &ctx.bubbles[index];
    let probe = bubble.margin_rect(ctx.config.bubble_margin);

    let mut push = Vec2::ZERO;
    for ui in ctx.ui_rects {
        let hit = probe.intersection(ui);
        if hit.is_empty() {
            continue;
        }
        let center = hit.center();
        diag.intersection_center = Some(center);
        push += (bubble.position - center).normalized();
    }
    push.with_length(ctx.config.ui_force)
}

/// Inverse-square repulsion between bubble centers; spreads bubbles apart
/// and keeps their leader lines from crossing.
pub fn long_range_force(ctx: &ForceContext<'_>, index: usize) -> Vec2 {
    let bubble = &ctx.bubbles[index];
    let config = ctx.config;

    let mut push = Vec2::ZERO;
    for (other_index, other) in ctx.bubbles.iter().enumerate() {
        if other_index == index {
            continue;
        }
        let delta = bubble.position - other.position;
        let dist_sq = delta.length_sq().max(config.long_range_min_distance_sq);
        let dir = separation_direction(delta, index, other_index);
        push += dir * (config.long_range_coefficient / dist_sq);
    }
    push.with_length(config.long_range_force)
}

pub fn collision_force(
    ctx: &ForceContext<'_>,
    index: usize,
    diag: &mut BubbleDiagnostics,
) -> Vec2 {
    let bubble = &ctx.bubbles[index];
    let margin = ctx.config.bubble_margin;
    let probe = bubble.margin_rect(margin);

    let mut push = Vec2::ZERO;
    for (other_index, other) in ctx.bubbles.iter().enumerate() {
        if other_index == index {
            continue;
        }
        let hit = probe.intersection(&other.margin_rect(margin));
        if hit.is_empty() {
            continue;
        }
        let center = hit.center();
        diag.intersection_center = Some(center);
        let mut delta = bubble.position - center;
        if delta.is_near_zero() {
            delta = bubble.position - other.position;
        }
        push += separation_direction(delta, index, other_index);
    }
    push.with_length(ctx.config.collision_force)
}

/// Pulls the bubble toward its own pins and pushes it hard off any pin its
/// margin box covers, its own included.
pub fn pin_force(ctx: &ForceContext<'_>, index: usize) -> Vec2 {
    let bubble = &ctx.bubbles[index];
    let probe = bubble.margin_rect(ctx.config.bubble_margin);

    let mut push = Vec2::ZERO;
    for pin in ctx.pins.values() {
        let dir = (bubble.position - pin.position).normalized();
        if probe.contains_point(pin.position) {
            push += dir * ctx.config.pin_overlap_multiplier;
        } else if bubble.is_anchored_to(pin.id) {
            push -= dir;
        }
    }
    push.with_length(ctx.config.pin_force)
}

/// Unit direction away from `delta`'s origin. Coincident bubbles get an
/// x-axis split ordered by index so the pair separates symmetrically.
fn separation_direction(delta: Vec2, index: usize, other_index: usize) -> Vec2 {
    if delta.is_near_zero() {
        return if index < other_index {
            Vec2::new(-1.0, 0.0)
        } else {
            Vec2::new(1.0, 0.0)
        };
    }
    delta.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::attraction::compute_attraction_areas;

    struct Fixture {
        config: LayoutConfig,
        silhouette: Vec<SilhouettePoint>,
        areas: Vec<AttractionArea>,
        ui: Vec<Rect>,
        pins: BTreeMap<PinId, Pin>,
        bubbles: Vec<Bubble>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: LayoutConfig::default(),
                silhouette: Vec::new(),
                areas: compute_attraction_areas(&Rect::from_coords(0.0, 0.0, 1000.0, 1000.0), 2, &[]),
                ui: Vec::new(),
                pins: BTreeMap::new(),
                bubbles: Vec::new(),
            }
        }

        fn with_silhouette(mut self, points: Vec<SilhouettePoint>) -> Self {
            self.areas = compute_attraction_areas(
                &Rect::from_coords(0.0, 0.0, 1000.0, 1000.0),
                self.config.attraction_grid_size,
                &points,
            );
            self.silhouette = points;
            self
        }

        fn bubble(mut self, x: f32, y: f32, w: f32, h: f32, pins: Vec<PinId>) -> Self {
            self.bubbles
                .push(Bubble::new(Vec2::new(x, y), Vec2::new(w, h), pins));
            self
        }

        fn pin(mut self, id: u32, x: f32, y: f32) -> Self {
            let id = PinId(id);
            self.pins.insert(
                id,
                Pin {
                    id,
                    position: Vec2::new(x, y),
                },
            );
            self
        }

        fn ctx(&self) -> ForceContext<'_> {
            ForceContext {
                config: &self.config,
                silhouette: &self.silhouette,
                attraction_areas: &self.areas,
                ui_rects: &self.ui,
                pins: &self.pins,
                bubbles: &self.bubbles,
            }
        }
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn schedule_is_staged_and_monotonic() {
        let config = LayoutConfig::default();
        let early = ActiveForces::for_iteration(&config, 0);
        assert_eq!(early.count(), 2);
        let mid = ActiveForces::for_iteration(&config, 16);
        assert!(mid.long_range && mid.pins && !mid.collision);
        assert_eq!(ActiveForces::for_iteration(&config, 21), ActiveForces::all());
        let mut previous = 0;
        for iteration in 0..60 {
            let count = ActiveForces::for_iteration(&config, iteration).count();
            assert!(count >= previous);
            previous = count;
        }
    }

    #[test]
    fn silhouette_pushes_away_from_covered_mass() {
        let fx = Fixture::new()
            .with_silhouette(vec![SilhouettePoint::new(Vec2::new(500.0, 500.0), 1.0, 60.0)])
            .bubble(540.0, 500.0, 150.0, 50.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        let force = silhouette_force(&fx.ctx(), 0, &mut diag);
        assert!(approx(force, Vec2::new(0.75, 0.0)));
        assert!(!diag.used_escape_force);
    }

    #[test]
    fn silhouette_without_overlap_is_zero() {
        let fx = Fixture::new()
            .with_silhouette(vec![SilhouettePoint::new(Vec2::new(100.0, 100.0), 1.0, 60.0)])
            .bubble(800.0, 800.0, 150.0, 50.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        assert_eq!(silhouette_force(&fx.ctx(), 0, &mut diag), Vec2::ZERO);
    }

    #[test]
    fn zero_weight_silhouette_exerts_no_force() {
        let fx = Fixture::new()
            .with_silhouette(vec![
                SilhouettePoint::new(Vec2::new(480.0, 500.0), 0.0, 60.0),
                SilhouettePoint::new(Vec2::new(560.0, 470.0), 0.0, 60.0),
            ])
            .bubble(500.0, 500.0, 150.0, 50.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        assert_eq!(silhouette_force(&fx.ctx(), 0, &mut diag), Vec2::ZERO);
    }

    #[test]
    fn solid_silhouette_falls_back_to_attraction_point() {
        // One huge point blankets the whole top-left quadrant except a strip
        // on its right, so that area's attraction point sits to the right.
        let fx = Fixture::new()
            .with_silhouette(vec![SilhouettePoint::new(Vec2::new(200.0, 250.0), 1.0, 500.0)])
            .bubble(200.0, 250.0, 40.0, 40.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        let force = silhouette_force(&fx.ctx(), 0, &mut diag);
        assert!(diag.used_escape_force);
        assert!((force.length() - fx.config.attraction_force).abs() < 1e-4);
        assert!(force.x > 0.0);
    }

    #[test]
    fn covered_bubble_outside_every_area_gets_no_escape() {
        let fx = Fixture::new()
            .with_silhouette(vec![SilhouettePoint::new(Vec2::new(-300.0, -300.0), 1.0, 500.0)])
            .bubble(-300.0, -300.0, 40.0, 40.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        assert_eq!(silhouette_force(&fx.ctx(), 0, &mut diag), Vec2::ZERO);
        assert!(!diag.used_escape_force);
    }

    #[test]
    fn ui_rect_pushes_bubble_out() {
        let mut fx = Fixture::new().bubble(310.0, 700.0, 100.0, 40.0, vec![]);
        fx.ui.push(Rect::from_coords(0.0, 0.0, 300.0, 1000.0));
        let mut diag = BubbleDiagnostics::default();
        let force = ui_force(&fx.ctx(), 0, &mut diag);
        assert!(approx(force, Vec2::new(1.0, 0.0)));
        assert!(diag.intersection_center.is_some());
    }

    #[test]
    fn long_range_forces_are_opposite() {
        let fx = Fixture::new()
            .bubble(400.0, 500.0, 100.0, 40.0, vec![])
            .bubble(600.0, 500.0, 100.0, 40.0, vec![]);
        let a = long_range_force(&fx.ctx(), 0);
        let b = long_range_force(&fx.ctx(), 1);
        assert!(approx(a, Vec2::new(-5.0, 0.0)));
        assert!(approx(a, -b));
    }

    #[test]
    fn long_range_closer_neighbour_dominates() {
        let fx = Fixture::new()
            .bubble(500.0, 500.0, 10.0, 10.0, vec![])
            .bubble(520.0, 500.0, 10.0, 10.0, vec![])
            .bubble(500.0, 900.0, 10.0, 10.0, vec![]);
        let force = long_range_force(&fx.ctx(), 0);
        assert!(force.x < 0.0);
        assert!(force.x.abs() > force.y.abs());
    }

    #[test]
    fn coincident_bubbles_split_along_x() {
        let fx = Fixture::new()
            .bubble(500.0, 500.0, 100.0, 40.0, vec![])
            .bubble(500.0, 500.0, 100.0, 40.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        let a = collision_force(&fx.ctx(), 0, &mut diag);
        let b = collision_force(&fx.ctx(), 1, &mut diag);
        assert!(approx(a, Vec2::new(-1.0, 0.0)));
        assert!(approx(b, Vec2::new(1.0, 0.0)));
        assert!(approx(long_range_force(&fx.ctx(), 0), Vec2::new(-5.0, 0.0)));
    }

    #[test]
    fn separated_bubbles_do_not_collide() {
        let fx = Fixture::new()
            .bubble(100.0, 100.0, 100.0, 40.0, vec![])
            .bubble(400.0, 100.0, 100.0, 40.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        assert_eq!(collision_force(&fx.ctx(), 0, &mut diag), Vec2::ZERO);
        assert!(diag.intersection_center.is_none());
    }

    #[test]
    fn own_distant_pin_attracts() {
        let fx = Fixture::new()
            .pin(0, 100.0, 500.0)
            .bubble(500.0, 500.0, 100.0, 40.0, vec![PinId(0)]);
        assert!(approx(pin_force(&fx.ctx(), 0), Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn foreign_distant_pin_is_ignored() {
        let fx = Fixture::new()
            .pin(0, 100.0, 500.0)
            .bubble(500.0, 500.0, 100.0, 40.0, vec![]);
        assert_eq!(pin_force(&fx.ctx(), 0), Vec2::ZERO);
    }

    #[test]
    fn covered_pin_repels_even_when_own() {
        let fx = Fixture::new()
            .pin(0, 480.0, 500.0)
            .pin(1, 100.0, 500.0)
            .bubble(500.0, 500.0, 100.0, 40.0, vec![PinId(0), PinId(1)]);
        // Covered own pin pushes +x with weight 5, distant own pin pulls -x with weight 1.
        let force = pin_force(&fx.ctx(), 0);
        assert!(approx(force, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn total_force_respects_schedule() {
        let fx = Fixture::new()
            .bubble(400.0, 500.0, 100.0, 40.0, vec![])
            .bubble(600.0, 500.0, 100.0, 40.0, vec![]);
        let mut diag = BubbleDiagnostics::default();
        let early = ActiveForces::for_iteration(&fx.config, 0);
        assert_eq!(total_force(&fx.ctx(), early, 0, &mut diag), Vec2::ZERO);
        let late = ActiveForces::for_iteration(&fx.config, 30);
        let force = total_force(&fx.ctx(), late, 0, &mut diag);
        assert!(approx(force, Vec2::new(-5.0, 0.0)));
        assert_eq!(diag.total_force, force);
    }
}
