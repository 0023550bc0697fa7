use std::collections::HashSet;

use crate::dataset::SprinklerRecord;
use crate::geometry::{FloorPlan, Point};
use crate::style::Style;

/// Back-to-front draw order. Markers and annotations sit on top so lines and
/// fills never occlude them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    RoomFill,
    RoomOutline,
    Pipes,
    Connectors,
    Markers,
    Annotations,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Cross,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Fill {
        outline: Vec<Point>,
        color: String,
        opacity: f64,
    },
    PolyLine {
        points: Vec<Point>,
        color: String,
        width: f64,
        opacity: f64,
    },
    Marker {
        at: Point,
        shape: MarkerShape,
        color: String,
    },
    Text {
        at: Point,
        content: String,
        color: String,
        /// Pixel displacement from the anchor, x right, y up.
        offset_px: [f64; 2],
    },
}

#[derive(Clone, Debug)]
pub struct Primitive {
    pub layer: Layer,
    pub shape: Shape,
    /// Legend category label. At most one primitive per category carries it.
    pub legend: Option<String>,
}

/// The ordered drawing plan for one render pass. Primitives are stored in
/// draw order (layer order, insertion order within a layer), built once and
/// consumed once.
#[derive(Clone, Debug, Default)]
pub struct DrawingPlan {
    primitives: Vec<Primitive>,
}

impl DrawingPlan {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Legend entries in first-encounter order.
    pub fn legend_entries(&self) -> Vec<(&str, &Primitive)> {
        self.primitives
            .iter()
            .filter_map(|p| p.legend.as_deref().map(|label| (label, p)))
            .collect()
    }

    /// Bounding box of all drawn geometry, (min_x, min_y, max_x, max_y).
    /// None for an empty plan.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut out: Option<(f64, f64, f64, f64)> = None;
        let mut extend = |p: Point| {
            let b = out.get_or_insert((p.x, p.y, p.x, p.y));
            b.0 = b.0.min(p.x);
            b.1 = b.1.min(p.y);
            b.2 = b.2.max(p.x);
            b.3 = b.3.max(p.y);
        };
        for prim in &self.primitives {
            match &prim.shape {
                Shape::Fill { outline, .. } => outline.iter().copied().for_each(&mut extend),
                Shape::PolyLine { points, .. } => points.iter().copied().for_each(&mut extend),
                Shape::Marker { at, .. } | Shape::Text { at, .. } => extend(*at),
            }
        }
        out
    }
}

/// Assembles the drawing plan for one floor plan and dataset.
///
/// Legend labels are de-duplicated by category with an explicit seen set:
/// however many pipes or sprinklers there are, each category label appears on
/// exactly one primitive, the first of its kind encountered.
pub fn compose(plan: &FloorPlan, records: &[SprinklerRecord], style: &Style) -> DrawingPlan {
    let mut seen: HashSet<String> = HashSet::new();
    let mut legend = |label: &str| -> Option<String> {
        seen.insert(label.to_string()).then(|| label.to_string())
    };

    let mut primitives = Vec::with_capacity(3 + plan.pipes.len() + records.len() * 4);

    primitives.push(Primitive {
        layer: Layer::RoomFill,
        shape: Shape::Fill {
            outline: plan.room.vertices().to_vec(),
            color: style.room_fill.clone(),
            opacity: style.room_fill_opacity,
        },
        legend: legend(&style.room_label),
    });
    primitives.push(Primitive {
        layer: Layer::RoomOutline,
        shape: Shape::PolyLine {
            points: plan.room.closed_outline(),
            color: style.room_outline.clone(),
            width: style.room_outline_width,
            opacity: 1.0,
        },
        legend: None,
    });
    for pipe in &plan.pipes {
        primitives.push(Primitive {
            layer: Layer::Pipes,
            shape: Shape::PolyLine {
                points: vec![pipe.start, pipe.end],
                color: style.pipe_color.clone(),
                width: style.pipe_width,
                opacity: 1.0,
            },
            legend: legend(&style.pipe_label),
        });
    }

    let mut connectors = Vec::with_capacity(records.len());
    let mut markers = Vec::with_capacity(records.len() * 2);
    let mut annotations = Vec::with_capacity(records.len());
    for record in records {
        connectors.push(Primitive {
            layer: Layer::Connectors,
            shape: Shape::PolyLine {
                points: vec![record.sprinkler, record.connection],
                color: style.connector_color.clone(),
                width: style.connector_width,
                opacity: style.connector_opacity,
            },
            legend: None,
        });
        markers.push(Primitive {
            layer: Layer::Markers,
            shape: Shape::Marker {
                at: record.sprinkler,
                shape: MarkerShape::Circle,
                color: style.sprinkler_color.clone(),
            },
            legend: legend(&style.sprinkler_label),
        });
        markers.push(Primitive {
            layer: Layer::Markers,
            shape: Shape::Marker {
                at: record.connection,
                shape: MarkerShape::Cross,
                color: style.connection_color.clone(),
            },
            legend: legend(&style.connection_label),
        });
        annotations.push(Primitive {
            layer: Layer::Annotations,
            shape: Shape::Text {
                at: record.sprinkler,
                content: format!(
                    "({},{})",
                    record.sprinkler.x.round() as i64,
                    record.sprinkler.y.round() as i64
                ),
                color: style.annotation_color.clone(),
                offset_px: style.annotation_offset,
            },
            legend: None,
        });
    }
    primitives.extend(connectors);
    primitives.extend(markers);
    primitives.extend(annotations);

    DrawingPlan { primitives }
}
