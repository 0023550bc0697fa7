pub mod dataset;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod style;
pub mod svg;

pub use dataset::{SprinklerRecord, load_csv, read_records};
pub use error::PlanError;
pub use geometry::{FloorPlan, Point, Polygon, Segment};
pub use scene::{DrawingPlan, Layer, MarkerShape, Primitive, Shape, compose};
pub use style::Style;
pub use svg::{CanvasOptions, build_scene_svg};
