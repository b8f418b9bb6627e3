use serde::Serialize;

use super::geometry::{Rect, Vec2};
use crate::config::LayoutConfig;
use crate::input::IntensityGrid;

/// One weighted sample of the silhouette. The square around it is what the
/// force generators intersect against; it can be larger than the grid
/// spacing so neighbouring samples overlap and the coverage gradient is smooth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SilhouettePoint {
    pub position: Vec2,
    /// Normalized intensity in `[0, 1]`.
    pub weight: f32,
    pub rect: Rect,
}

impl SilhouettePoint {
    pub fn new(position: Vec2, weight: f32, size: f32) -> Self {
        Self {
            position,
            weight,
            rect: Rect::from_center(position, Vec2::new(size, size)),
        }
    }
}

/// Samples every cell above the intensity threshold, centering the sampled
/// grid on the viewport.
pub fn sample_silhouette(
    grid: &IntensityGrid,
    viewport: &Rect,
    config: &LayoutConfig,
) -> Vec<SilhouettePoint> {
    let spacing = config.silhouette_grid_spacing;
    let center = viewport.center();
    let origin = Vec2::new(
        center.x - spacing * (grid.width() as f32 - 1.0) * 0.5,
        center.y - spacing * (grid.height() as f32 - 1.0) * 0.5,
    );

    grid.cells()
        .filter_map(|(col, row, value)| {
            let weight = value as f32 / 255.0;
            if weight < config.intensity_threshold {
                return None;
            }
            let position = Vec2::new(
                origin.x + col as f32 * spacing,
                origin.y + row as f32 * spacing,
            );
            Some(SilhouettePoint::new(
                position,
                weight,
                config.silhouette_point_size,
            ))
        })
        .collect()
}
