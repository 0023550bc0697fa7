use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::PlanError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Closed room boundary. At least 3 finite vertices, fixed after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Result<Self, PlanError> {
        if vertices.len() < 3 {
            return Err(PlanError::InvalidConfig(format!(
                "room polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if let Some(p) = vertices.iter().find(|p| !p.is_finite()) {
            return Err(PlanError::InvalidConfig(format!(
                "non-finite room vertex ({}, {})",
                p.x, p.y
            )));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Outline path for drawing: the vertex sequence with the first vertex
    /// appended again, so the last point equals the first.
    pub fn closed_outline(&self) -> Vec<Point> {
        let mut out = self.vertices.clone();
        out.push(self.vertices[0]);
        out
    }
}

/// One pipe run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// The static geometry a scene is composed over: one room, any number of
/// pipes (zero means no pipes are drawn).
#[derive(Clone, Debug)]
pub struct FloorPlan {
    pub room: Polygon,
    pub pipes: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    room: Vec<[f64; 2]>,
    #[serde(default)]
    pipes: Vec<[[f64; 2]; 2]>,
}

impl FloorPlan {
    pub fn new(room: Polygon, pipes: Vec<Segment>) -> Result<Self, PlanError> {
        for seg in &pipes {
            if !seg.start.is_finite() || !seg.end.is_finite() {
                return Err(PlanError::InvalidConfig(format!(
                    "non-finite pipe segment ({}, {}) -> ({}, {})",
                    seg.start.x, seg.start.y, seg.end.x, seg.end.y
                )));
            }
        }
        Ok(Self { room, pipes })
    }

    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        let raw: RawPlan = serde_json::from_str(text)
            .map_err(|e| PlanError::InvalidConfig(format!("bad floor plan: {e}")))?;
        let room = Polygon::new(
            raw.room
                .iter()
                .map(|&[x, y]| Point::new(x, y))
                .collect(),
        )?;
        let pipes = raw
            .pipes
            .iter()
            .map(|&[[x1, y1], [x2, y2]]| Segment {
                start: Point::new(x1, y1),
                end: Point::new(x2, y2),
            })
            .collect();
        Self::new(room, pipes)
    }

    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = fs::read_to_string(path).map_err(|e| PlanError::SourceNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        let plan = Self::from_json(&text)?;
        log::debug!(
            "loaded floor plan from {}: {} room vertices, {} pipes",
            path.display(),
            plan.room.vertices().len(),
            plan.pipes.len()
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_closes_on_first_vertex() {
        let poly = Polygon::new(vec![
            Point::new(97500.0, 34000.0),
            Point::new(85647.67, 43193.61),
            Point::new(91776.75, 51095.16),
            Point::new(103629.07, 41901.55),
        ])
        .unwrap();
        let outline = poly.closed_outline();
        assert_eq!(outline.len(), poly.vertices().len() + 1);
        assert_eq!(outline.first(), outline.last());
    }

    #[test]
    fn outline_closes_for_any_vertex_count() {
        for n in 3..10 {
            let verts = (0..n)
                .map(|i| {
                    let a = i as f64 / n as f64 * std::f64::consts::TAU;
                    Point::new(a.cos() * 100.0, a.sin() * 100.0)
                })
                .collect();
            let poly = Polygon::new(verts).unwrap();
            let outline = poly.closed_outline();
            assert_eq!(outline.len(), n + 1);
            assert_eq!(outline.first(), outline.last());
        }
    }

    #[test]
    fn too_few_vertices_rejected() {
        let err = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
    }

    #[test]
    fn non_finite_vertex_rejected() {
        let err = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, f64::NAN),
            Point::new(1.0, 1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
    }

    #[test]
    fn plan_parses_from_json() {
        let plan = FloorPlan::from_json(
            r#"{"room": [[0,0],[10,0],[10,10],[0,10]], "pipes": [[[1,1],[9,9]]]}"#,
        )
        .unwrap();
        assert_eq!(plan.room.vertices().len(), 4);
        assert_eq!(plan.pipes.len(), 1);
        assert_eq!(plan.pipes[0].end, Point::new(9.0, 9.0));
    }

    #[test]
    fn pipes_may_be_absent() {
        let plan = FloorPlan::from_json(r#"{"room": [[0,0],[10,0],[5,10]]}"#).unwrap();
        assert!(plan.pipes.is_empty());
    }

    #[test]
    fn missing_plan_file_is_source_not_found() {
        let err = FloorPlan::load(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert!(matches!(err, PlanError::SourceNotFound { .. }));
    }
}
