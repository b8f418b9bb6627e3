use crate::layout::{AttractionArea, LayoutEngine, PinId, SilhouettePoint};
use serde::Serialize;
use std::path::Path;

/// Serializable snapshot of everything a renderer reads from the engine.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub viewport: [f32; 4],
    pub iterations: usize,
    pub done: bool,
    pub ui_rects: Vec<[f32; 4]>,
    pub silhouette: Vec<SilhouetteDump>,
    pub attraction_areas: Vec<AttractionAreaDump>,
    pub pins: Vec<PinDump>,
    pub bubbles: Vec<BubbleDump>,
}

#[derive(Debug, Serialize)]
pub struct SilhouetteDump {
    pub x: f32,
    pub y: f32,
    pub weight: f32,
}

#[derive(Debug, Serialize)]
pub struct AttractionAreaDump {
    pub rect: [f32; 4],
    pub weight: f32,
    pub attraction_point: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct PinDump {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct BubbleDump {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub velocity: [f32; 2],
    pub pins: Vec<u32>,
}

fn rect_array(rect: &crate::layout::Rect) -> [f32; 4] {
    [rect.min.x, rect.min.y, rect.max.x, rect.max.y]
}

impl From<&SilhouettePoint> for SilhouetteDump {
    fn from(point: &SilhouettePoint) -> Self {
        Self {
            x: point.position.x,
            y: point.position.y,
            weight: point.weight,
        }
    }
}

impl From<&AttractionArea> for AttractionAreaDump {
    fn from(area: &AttractionArea) -> Self {
        Self {
            rect: rect_array(&area.rect),
            weight: area.weight,
            attraction_point: [area.attraction_point.x, area.attraction_point.y],
        }
    }
}

impl LayoutDump {
    pub fn from_engine(engine: &LayoutEngine) -> Self {
        let pins = engine
            .pins()
            .map(|pin| PinDump {
                id: pin.id.0,
                x: pin.position.x,
                y: pin.position.y,
            })
            .collect();

        let bubbles = engine
            .bubbles()
            .iter()
            .map(|bubble| BubbleDump {
                x: bubble.position.x,
                y: bubble.position.y,
                width: bubble.dimension.x,
                height: bubble.dimension.y,
                velocity: [bubble.velocity.x, bubble.velocity.y],
                pins: bubble.pins.iter().map(|PinId(id)| *id).collect(),
            })
            .collect();

        LayoutDump {
            viewport: rect_array(&engine.viewport()),
            iterations: engine.iterations(),
            done: engine.is_done(),
            ui_rects: engine.ui_rects().iter().map(rect_array).collect(),
            silhouette: engine.silhouette_points().iter().map(Into::into).collect(),
            attraction_areas: engine.attraction_areas().iter().map(Into::into).collect(),
            pins,
            bubbles,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_output_json(dump: &LayoutDump, output: Option<&Path>) -> anyhow::Result<()> {
    let json = dump.to_json()?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
