use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub background: String,
    pub viewport_stroke: String,
    pub silhouette_fill: String,
    pub silhouette_stroke: String,
    pub pin_color: String,
    pub bubble_fill: String,
    pub bubble_stroke: String,
    pub leader_line: String,
    pub attraction_area_stroke: String,
    pub attraction_point: String,
    pub ui_fill: String,
    pub ui_stroke: String,
}

impl Theme {
    /// Dark inspection palette; silhouette cells are tinted by weight.
    pub fn debug_default() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 20.0,
            text_color: "#FFFFFF".to_string(),
            background: "#4B4B4B".to_string(),
            viewport_stroke: "#FFFFFF".to_string(),
            silhouette_fill: "#6496FF".to_string(),
            silhouette_stroke: "#FF9933".to_string(),
            pin_color: "#FFFF00".to_string(),
            bubble_fill: "#FFFFAA".to_string(),
            bubble_stroke: "#FFFFAA".to_string(),
            leader_line: "#FFFFFF".to_string(),
            attraction_area_stroke: "#AAFFAA".to_string(),
            attraction_point: "#AAFFAA".to_string(),
            ui_fill: "#FFFFFF".to_string(),
            ui_stroke: "#FFFFFF".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 18.0,
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            viewport_stroke: "#C7D2E5".to_string(),
            silhouette_fill: "#7A8AA6".to_string(),
            silhouette_stroke: "#D7E0F0".to_string(),
            pin_color: "#D9480F".to_string(),
            bubble_fill: "#F8FAFF".to_string(),
            bubble_stroke: "#1C2430".to_string(),
            leader_line: "#7A8AA6".to_string(),
            attraction_area_stroke: "#2B8A3E".to_string(),
            attraction_point: "#2B8A3E".to_string(),
            ui_fill: "#EEF2F8".to_string(),
            ui_stroke: "#C7D2E5".to_string(),
        }
    }
}
