use crate::layout::geometry::Rect;
use crate::layout::LayoutError;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the placement engine. Distances are in viewport units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Inflation of a bubble's box when sampling silhouette coverage.
    pub silhouette_margin: f32,
    /// Inflation used for bubble, UI, pin and viewport collisions.
    pub bubble_margin: f32,
    /// Side of the square each silhouette point covers.
    pub silhouette_point_size: f32,
    /// Distance between neighbouring samples of the intensity grid.
    pub silhouette_grid_spacing: f32,
    /// Normalized intensity below which a cell is not sampled.
    pub intensity_threshold: f32,
    pub silhouette_force: f32,
    pub attraction_force: f32,
    pub long_range_force: f32,
    pub collision_force: f32,
    pub ui_force: f32,
    pub pin_force: f32,
    /// How much harder a covered pin pushes than an own pin pulls.
    pub pin_overlap_multiplier: f32,
    pub long_range_coefficient: f32,
    /// Squared distances below this are clamped before the inverse-square falloff.
    pub long_range_min_distance_sq: f32,
    /// Silhouette coverage ratio at which the gradient force gives way to the escape force.
    pub escape_coverage_ratio: f32,
    pub damping: f32,
    /// Attraction areas per viewport axis.
    pub attraction_grid_size: usize,
    pub bubble_count: usize,
    pub max_iterations: usize,
    pub long_range_after: usize,
    pub collision_after: usize,
    pub pins_after: usize,
    /// Half-open `[min, max)` range bubble widths are sampled from.
    pub bubble_width_range: [f32; 2],
    pub bubble_height_range: [f32; 2],
    pub rng_seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            silhouette_margin: 150.0,
            bubble_margin: 20.0,
            silhouette_point_size: 60.0,
            silhouette_grid_spacing: 60.0,
            intensity_threshold: 0.05,
            silhouette_force: 0.75,
            attraction_force: 3.0,
            long_range_force: 5.0,
            collision_force: 1.0,
            ui_force: 1.0,
            pin_force: 1.0,
            pin_overlap_multiplier: 5.0,
            long_range_coefficient: 2000.0,
            long_range_min_distance_sq: 0.001,
            escape_coverage_ratio: 0.9,
            damping: 0.9,
            attraction_grid_size: 2,
            bubble_count: 5,
            max_iterations: 50,
            long_range_after: 15,
            collision_after: 20,
            pins_after: 15,
            bubble_width_range: [150.0, 250.0],
            bubble_height_range: [20.0, 120.0],
            rng_seed: None,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let non_negative = [
            ("silhouette_margin", self.silhouette_margin),
            ("bubble_margin", self.bubble_margin),
            ("silhouette_force", self.silhouette_force),
            ("attraction_force", self.attraction_force),
            ("long_range_force", self.long_range_force),
            ("collision_force", self.collision_force),
            ("ui_force", self.ui_force),
            ("pin_force", self.pin_force),
            ("pin_overlap_multiplier", self.pin_overlap_multiplier),
            ("long_range_coefficient", self.long_range_coefficient),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::config(
                    field,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }

        let positive = [
            ("silhouette_point_size", self.silhouette_point_size),
            ("silhouette_grid_spacing", self.silhouette_grid_spacing),
            ("long_range_min_distance_sq", self.long_range_min_distance_sq),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::config(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }

        let unit = [
            ("intensity_threshold", self.intensity_threshold),
            ("escape_coverage_ratio", self.escape_coverage_ratio),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(LayoutError::config(field, format!("must be in [0, 1], got {value}")));
            }
        }

        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(LayoutError::config(
                "damping",
                format!("must be in (0, 1], got {}", self.damping),
            ));
        }
        if self.attraction_grid_size == 0 {
            return Err(LayoutError::config("attraction_grid_size", "must be at least 1"));
        }
        if self.bubble_count == 0 {
            return Err(LayoutError::config("bubble_count", "must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(LayoutError::config("max_iterations", "must be at least 1"));
        }

        for (field, [lo, hi]) in [
            ("bubble_width_range", self.bubble_width_range),
            ("bubble_height_range", self.bubble_height_range),
        ] {
            if !lo.is_finite() || !hi.is_finite() || lo <= 0.0 || hi <= lo {
                return Err(LayoutError::config(
                    field,
                    format!("needs 0 < min < max, got [{lo}, {hi}]"),
                ));
            }
        }

        Ok(())
    }
}

/// Static scene: the logical viewport and the UI regions bubbles avoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// `[min_x, min_y, max_x, max_y]` per rectangle.
    pub ui_rects: Vec<[f32; 4]>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1000.0,
            viewport_height: 1000.0,
            ui_rects: vec![[0.0, 800.0, 300.0, 1000.0]],
        }
    }
}

impl SceneConfig {
    pub fn without_ui() -> Self {
        Self {
            ui_rects: Vec::new(),
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Rect {
        Rect::from_coords(0.0, 0.0, self.viewport_width, self.viewport_height)
    }

    pub fn ui_rects(&self) -> Vec<Rect> {
        self.ui_rects
            .iter()
            .map(|[x0, y0, x1, y1]| Rect::from_coords(*x0, *y0, *x1, *y1))
            .collect()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        for (field, value) in [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::config(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }
        if self.ui_rects.iter().flatten().any(|v| !v.is_finite()) {
            return Err(LayoutError::config("ui_rects", "coordinates must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 700.0,
            background: "#4B4B4B".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub scene: SceneConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::debug_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            scene: SceneConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    silhouette_margin: Option<f32>,
    bubble_margin: Option<f32>,
    silhouette_point_size: Option<f32>,
    silhouette_grid_spacing: Option<f32>,
    intensity_threshold: Option<f32>,
    silhouette_force: Option<f32>,
    attraction_force: Option<f32>,
    long_range_force: Option<f32>,
    collision_force: Option<f32>,
    ui_force: Option<f32>,
    pin_force: Option<f32>,
    pin_overlap_multiplier: Option<f32>,
    long_range_coefficient: Option<f32>,
    long_range_min_distance_sq: Option<f32>,
    escape_coverage_ratio: Option<f32>,
    damping: Option<f32>,
    attraction_grid_size: Option<usize>,
    bubble_count: Option<usize>,
    max_iterations: Option<usize>,
    long_range_after: Option<usize>,
    collision_after: Option<usize>,
    pins_after: Option<usize>,
    bubble_width_range: Option<[f32; 2]>,
    bubble_height_range: Option<[f32; 2]>,
    rng_seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneConfigFile {
    viewport_width: Option<f32>,
    viewport_height: Option<f32>,
    ui_rects: Option<Vec<[f32; 4]>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutConfigFile>,
    scene: Option<SceneConfigFile>,
    render: Option<RenderConfigFile>,
}

macro_rules! overlay {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $source.$field {
                $target.$field = v;
            }
        )+
    };
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "light" => config.theme = Theme::light(),
            "debug" | "default" => config.theme = Theme::debug_default(),
            other => anyhow::bail!("unknown theme `{other}`"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(layout) = parsed.layout {
        overlay!(
            config.layout,
            layout,
            silhouette_margin,
            bubble_margin,
            silhouette_point_size,
            silhouette_grid_spacing,
            intensity_threshold,
            silhouette_force,
            attraction_force,
            long_range_force,
            collision_force,
            ui_force,
            pin_force,
            pin_overlap_multiplier,
            long_range_coefficient,
            long_range_min_distance_sq,
            escape_coverage_ratio,
            damping,
            attraction_grid_size,
            bubble_count,
            max_iterations,
            long_range_after,
            collision_after,
            pins_after,
            bubble_width_range,
            bubble_height_range,
        );
        if layout.rng_seed.is_some() {
            config.layout.rng_seed = layout.rng_seed;
        }
    }

    if let Some(scene) = parsed.scene {
        overlay!(config.scene, scene, viewport_width, viewport_height, ui_rects);
    }

    if let Some(render) = parsed.render {
        overlay!(config.render, render, width, height, background);
    }

    config.layout.validate()?;
    config.scene.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_attraction_grid() {
        let config = LayoutConfig {
            attraction_grid_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig {
                field: "attraction_grid_size",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_positive_bubble_dimension() {
        let config = LayoutConfig {
            bubble_height_range: [0.0, 10.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = LayoutConfig {
            bubble_width_range: [40.0, 40.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_force_factor() {
        let config = LayoutConfig {
            pin_force: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_ui_list_is_fine() {
        let scene = SceneConfig::without_ui();
        assert!(scene.validate().is_ok());
        assert!(scene.ui_rects().is_empty());
        assert_eq!(scene.viewport().area(), 1_000_000.0);
    }

    #[test]
    fn parse_config_overlays_fields() {
        let config = parse_config(
            r#"{
                "theme": "light",
                "layout": { "bubbleCount": 8, "maxIterations": 80, "rngSeed": 11 },
                "scene": { "uiRects": [] },
                "render": { "width": 400 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.layout.bubble_count, 8);
        assert_eq!(config.layout.max_iterations, 80);
        assert_eq!(config.layout.rng_seed, Some(11));
        assert_eq!(config.layout.damping, 0.9);
        assert!(config.scene.ui_rects.is_empty());
        assert_eq!(config.render.width, 400.0);
        assert_eq!(config.theme.background, Theme::light().background);
    }

    #[test]
    fn parse_config_rejects_invalid_values() {
        assert!(parse_config(r#"{ "layout": { "damping": 1.5 } }"#).is_err());
        assert!(parse_config(r#"{ "scene": { "viewportWidth": 0 } }"#).is_err());
        assert!(parse_config(r#"{ "theme": "neon" }"#).is_err());
    }
}
