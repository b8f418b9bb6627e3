use crate::config::RenderConfig;
use crate::layout::{LayoutEngine, Rect};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const PIN_RADIUS: f32 = 5.0;
const ATTRACTION_POINT_RADIUS: f32 = 15.0;
const CAPTION_PAD: f32 = 20.0;

/// Draws the current engine state, mapping the logical viewport onto
/// `render.width` x `render.height` pixels.
pub fn render_svg(engine: &LayoutEngine, theme: &Theme, render: &RenderConfig) -> String {
    let mut svg = String::new();
    let width = render.width.max(100.0);
    let height = render.height.max(100.0);
    let viewport = engine.viewport();
    let sx = width / viewport.width();
    let sy = height / viewport.height();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));
    svg.push_str(&format!(
        "<g transform=\"scale({sx:.5} {sy:.5}) translate({:.2} {:.2})\">",
        -viewport.min.x, -viewport.min.y
    ));

    for point in engine.silhouette_points() {
        svg.push_str(&rect_svg(
            &point.rect,
            &theme.silhouette_fill,
            point.weight,
            &theme.silhouette_stroke,
            0.4,
        ));
    }

    for pin in engine.pins() {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{PIN_RADIUS}\" fill=\"{}\"/>",
            pin.position.x, pin.position.y, theme.pin_color
        ));
    }

    for bubble in engine.bubbles() {
        svg.push_str(&rect_svg(
            &bubble.rect(),
            &theme.bubble_fill,
            0.4,
            &theme.bubble_stroke,
            1.0,
        ));
        for id in &bubble.pins {
            let Some(pin) = engine.pin(*id) else {
                continue;
            };
            svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-opacity=\"0.4\"/>",
                bubble.position.x,
                bubble.position.y,
                pin.position.x,
                pin.position.y,
                theme.leader_line
            ));
        }
    }

    for area in engine.attraction_areas() {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"0.4\"/>",
            area.rect.min.x,
            area.rect.min.y,
            area.rect.width(),
            area.rect.height(),
            theme.attraction_area_stroke
        ));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{ATTRACTION_POINT_RADIUS}\" fill=\"{}\"/>",
            area.attraction_point.x, area.attraction_point.y, theme.attraction_point
        ));
    }

    for ui in engine.ui_rects() {
        svg.push_str(&rect_svg(ui, &theme.ui_fill, 0.4, &theme.ui_stroke, 1.0));
    }

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\"/>",
        viewport.min.x,
        viewport.min.y,
        viewport.width(),
        viewport.height(),
        theme.viewport_stroke
    ));

    let captions = [
        format!("Silhouette points: {}", engine.silhouette_points().len()),
        format!("Bubbles: {}", engine.bubbles().len()),
        format!("Iterations: {}", engine.iterations()),
    ];
    for (idx, caption) in captions.iter().enumerate() {
        let y = viewport.min.y + CAPTION_PAD + 5.0 + idx as f32 * theme.font_size * 1.25;
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            viewport.min.x + CAPTION_PAD,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(caption)
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

fn rect_svg(rect: &Rect, fill: &str, fill_opacity: f32, stroke: &str, stroke_opacity: f32) -> String {
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\" fill-opacity=\"{fill_opacity:.3}\" stroke=\"{stroke}\" stroke-opacity=\"{stroke_opacity:.3}\"/>",
        rect.min.x,
        rect.min.y,
        rect.width(),
        rect.height(),
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
