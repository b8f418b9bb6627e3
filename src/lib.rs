#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod input;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, SceneConfig};
pub use input::IntensityGrid;
pub use layout::{
    ActiveForces, AttractionArea, Bubble, LayoutEngine, LayoutError, Pin, PinId, Rect,
    SilhouettePoint, StepDiagnostics, Vec2,
};
pub use render::render_svg;
pub use theme::Theme;
