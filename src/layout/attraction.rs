// Attraction areas push bubbles off solid silhouette regions. Inside a solid
// region there is no coverage gradient, so the silhouette force has no
// direction; the viewport is cut into a coarse grid and each cell stores the
// point where it is least covered, which a stuck bubble is steered toward.

use serde::Serialize;

use super::geometry::{Rect, Vec2};
use super::silhouette::SilhouettePoint;

const FULL_COVERAGE_EPS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttractionArea {
    pub rect: Rect,
    /// Fraction of the cell not covered by weighted silhouette.
    pub weight: f32,
    pub attraction_point: Vec2,
}

impl AttractionArea {
    pub fn compute(rect: Rect, points: &[SilhouettePoint]) -> Self {
        let center = rect.center();
        let area = rect.area();

        let mut covered = 0.0f32;
        let mut offset = Vec2::ZERO;
        for point in points {
            let hit = rect.intersection(&point.rect);
            if hit.is_empty() {
                continue;
            }
            let weighted = hit.area() * point.weight;
            covered += weighted;
            offset += (hit.center() - center) * weighted;
        }

        let free = area - covered;
        let weight = if area > 0.0 { free / area } else { 0.0 };

        // An uncovered cell keeps its own center; so does a fully covered
        // one, where the rescale below would divide by zero. Overlapping
        // squares can push the point outside the cell.
        let attraction_point = if covered > 0.0 && free > area * FULL_COVERAGE_EPS {
            let mass_center = offset * (1.0 / covered);
            center - mass_center * (area / free)
        } else {
            center
        };

        Self {
            rect,
            weight,
            attraction_point,
        }
    }
}

/// Splits `viewport` into `cells_per_axis`² equal areas, column by column.
pub fn compute_attraction_areas(
    viewport: &Rect,
    cells_per_axis: usize,
    points: &[SilhouettePoint],
) -> Vec<AttractionArea> {
    let n = cells_per_axis.max(1);
    let cell_w = viewport.width() / n as f32;
    let cell_h = viewport.height() / n as f32;

    let mut areas = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let rect = Rect::from_coords(
                viewport.min.x + i as f32 * cell_w,
                viewport.min.y + j as f32 * cell_h,
                viewport.min.x + (i + 1) as f32 * cell_w,
                viewport.min.y + (j + 1) as f32 * cell_h,
            );
            areas.push(AttractionArea::compute(rect, points));
        }
    }
    areas
}

/// Last area whose rect contains `p`; on a shared edge the later cell wins.
pub fn area_containing(areas: &[AttractionArea], p: Vec2) -> Option<&AttractionArea> {
    areas.iter().rev().find(|area| area.rect.contains_point(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::from_coords(0.0, 0.0, 1000.0, 1000.0)
    }

    #[test]
    fn grid_covers_viewport() {
        let areas = compute_attraction_areas(&viewport(), 2, &[]);
        assert_eq!(areas.len(), 4);
        assert_eq!(areas[0].rect, Rect::from_coords(0.0, 0.0, 500.0, 500.0));
        assert_eq!(areas[1].rect, Rect::from_coords(0.0, 500.0, 500.0, 1000.0));
        let total: f32 = areas.iter().map(|a| a.rect.area()).sum();
        assert_eq!(total, viewport().area());
    }

    #[test]
    fn empty_area_stays_centered() {
        let areas = compute_attraction_areas(&viewport(), 2, &[]);
        for area in &areas {
            assert_eq!(area.weight, 1.0);
            assert_eq!(area.attraction_point, area.rect.center());
        }
    }

    #[test]
    fn attraction_point_moves_away_from_mass() {
        let point = SilhouettePoint::new(Vec2::new(100.0, 100.0), 1.0, 60.0);
        let area = AttractionArea::compute(Rect::from_coords(0.0, 0.0, 500.0, 500.0), &[point]);
        assert!((area.weight - 246_400.0 / 250_000.0).abs() < 1e-6);
        let expected = 250.0 + 150.0 * 250_000.0 / 246_400.0;
        assert!((area.attraction_point.x - expected).abs() < 1e-2);
        assert!((area.attraction_point.y - expected).abs() < 1e-2);
    }

    #[test]
    fn fully_covered_area_is_finite() {
        let point = SilhouettePoint::new(Vec2::new(50.0, 50.0), 1.0, 200.0);
        let area = AttractionArea::compute(Rect::from_coords(0.0, 0.0, 100.0, 100.0), &[point]);
        assert_eq!(area.weight, 0.0);
        assert_eq!(area.attraction_point, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn overlapping_squares_can_place_point_outside_cell() {
        let cell = Rect::from_coords(0.0, 0.0, 100.0, 100.0);
        let points = [
            SilhouettePoint::new(Vec2::new(25.0, 50.0), 1.0, 100.0),
            SilhouettePoint::new(Vec2::new(25.0, 50.0), 0.3, 100.0),
        ];
        let area = AttractionArea::compute(cell, &points);
        // 7500 * 1.3 covered, mass 12.5 left of center, rescaled by 10000 / 250.
        assert!((area.weight - 0.025).abs() < 1e-5);
        assert!((area.attraction_point.x - 550.0).abs() < 1e-2);
        assert!((area.attraction_point.y - 50.0).abs() < 1e-4);
        assert!(!cell.contains_point(area.attraction_point));
    }

    #[test]
    fn area_lookup_prefers_last_on_shared_edge() {
        let areas = compute_attraction_areas(&viewport(), 2, &[]);
        let hit = area_containing(&areas, Vec2::new(500.0, 500.0)).unwrap();
        assert_eq!(hit.rect, areas[3].rect);
        let edge = area_containing(&areas, Vec2::new(500.0, 100.0)).unwrap();
        assert_eq!(edge.rect, areas[2].rect);
        let inner = area_containing(&areas, Vec2::new(100.0, 100.0)).unwrap();
        assert_eq!(inner.rect, areas[0].rect);
        assert!(area_containing(&areas, Vec2::new(-1.0, 10.0)).is_none());
    }
}
