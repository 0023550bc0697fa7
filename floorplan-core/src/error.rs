use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the load -> compose -> render -> export pipeline.
///
/// Every variant names the stage it belongs to; nothing here is retried.
#[derive(Debug, Error)]
pub enum PlanError {
    /// An input file (floor plan, style, or dataset) does not resolve or
    /// cannot be read.
    #[error("data source not found: {path} ({source})")]
    SourceNotFound { path: PathBuf, source: std::io::Error },

    /// A dataset row could not bind all four coordinate columns to finite
    /// numbers. Line numbers are 1-based and count the header line.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A floor-plan or style file parsed but describes something unusable,
    /// e.g. a room polygon with fewer than 3 vertices.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The composed SVG scene could not be rasterized.
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// The output image could not be published. No partial file is left at
    /// the target path.
    #[error("failed to write output {path} ({source})")]
    WriteFailed { path: PathBuf, source: std::io::Error },
}
