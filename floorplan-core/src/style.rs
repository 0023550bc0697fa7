use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::PlanError;

/// Colors, stroke widths and labels for one rendered layout. Every field has
/// a default reproducing the reference deployment's palette, so a style file
/// only needs to name what it overrides.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Style {
    pub title: String,
    pub x_label: String,
    pub y_label: String,

    pub room_fill: String,
    pub room_fill_opacity: f64,
    pub room_outline: String,
    pub room_outline_width: f64,

    pub pipe_color: String,
    pub pipe_width: f64,

    pub sprinkler_color: String,
    pub connection_color: String,
    pub marker_radius: f64,

    pub connector_color: String,
    pub connector_width: f64,
    pub connector_opacity: f64,

    pub annotation_color: String,
    pub annotation_size: f64,
    /// Pixel displacement of an annotation from its marker, x right, y up.
    pub annotation_offset: [f64; 2],

    pub room_label: String,
    pub pipe_label: String,
    pub sprinkler_label: String,
    pub connection_label: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            title: "Sprinkler Layout with Room Area and Pipes".to_string(),
            x_label: "X (mm)".to_string(),
            y_label: "Y (mm)".to_string(),
            room_fill: "lightblue".to_string(),
            room_fill_opacity: 0.2,
            room_outline: "black".to_string(),
            room_outline_width: 4.0,
            pipe_color: "red".to_string(),
            pipe_width: 4.0,
            sprinkler_color: "blue".to_string(),
            connection_color: "green".to_string(),
            marker_radius: 14.0,
            connector_color: "gray".to_string(),
            connector_width: 2.0,
            connector_opacity: 0.6,
            annotation_color: "blue".to_string(),
            annotation_size: 33.0,
            annotation_offset: [21.0, 21.0],
            room_label: "Room Area".to_string(),
            pipe_label: "Water Pipe".to_string(),
            sprinkler_label: "Sprinklers".to_string(),
            connection_label: "Pipe Connections".to_string(),
        }
    }
}

impl Style {
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        serde_json::from_str(text).map_err(|e| PlanError::InvalidConfig(format!("bad style: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = fs::read_to_string(path).map_err(|e| PlanError::SourceNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_style_keeps_defaults() {
        let style = Style::from_json(r##"{"pipe_color": "#cc0000", "pipe_width": 6.0}"##).unwrap();
        assert_eq!(style.pipe_color, "#cc0000");
        assert_eq!(style.pipe_width, 6.0);
        assert_eq!(style.sprinkler_color, "blue");
        assert_eq!(style.pipe_label, "Water Pipe");
    }

    #[test]
    fn garbage_style_is_invalid_config() {
        let err = Style::from_json("not json").unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
    }
}
