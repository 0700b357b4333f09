//! Error handling for floorkit
//!
//! Provides error types for every layer of the plan core:
//! - Geometry errors (scale, polygons, item lookup)
//! - Export errors (cancellation, I/O, raster allocation)
//! - Icon errors (top-view baking and image decoding)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::model::ItemId;

/// Geometry error type
///
/// Raised by coordinate transforms and shape computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Scale must be a finite, strictly positive number
    #[error("Invalid scale {scale}: must be finite and > 0")]
    InvalidScale {
        /// The rejected scale value.
        scale: f32,
    },

    /// A polygon has too few points to enclose an area
    #[error("Degenerate polygon with {points} point(s)")]
    DegeneratePolygon {
        /// Number of points supplied.
        points: usize,
    },

    /// No item with this identifier exists in the model snapshot
    #[error("Unknown item {id}")]
    UnknownItem {
        /// The identifier that was looked up.
        id: ItemId,
    },
}

/// Export error type
///
/// Covers print, clipboard and vector exports. Cancellation is kept apart
/// from I/O failures so callers can discard partial output silently.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Export was cancelled through its cancellation token
    #[error("Export interrupted")]
    Interrupted,

    /// Writing to the export target failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding failed
    #[error("Image encoding failed: {0}")]
    Image(String),

    /// Requested page is outside the computed page range
    #[error("Page {index} out of range (page count {count})")]
    InvalidPage {
        /// Requested page index.
        index: usize,
        /// Number of pages available.
        count: usize,
    },

    /// A selection-only export was requested with nothing selected
    #[error("Nothing selected to export")]
    EmptySelection,

    /// The raster target could not be allocated
    #[error("Cannot allocate a {width}x{height} raster surface")]
    SurfaceAllocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// Icon error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IconError {
    /// No offscreen 3D renderer is available
    #[error("Top view renderer unavailable")]
    RendererUnavailable,

    /// The renderer failed to produce a top view
    #[error("Top view rendering failed: {reason}")]
    BakeFailed {
        /// Why the render failed.
        reason: String,
    },

    /// Icon or texture bytes could not be decoded
    #[error("Image decode failed: {0}")]
    Decode(String),
}

/// Main error type for floorkit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Icon error
    #[error(transparent)]
    Icon(#[from] IconError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error signals a cancelled export
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Export(ExportError::Interrupted))
    }

    /// Check if this is an I/O failure, whatever layer raised it
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Export(ExportError::Io(_)))
    }

    /// Errors a host should report to the user and carry on from
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Export(ExportError::Interrupted) => true,
            Error::Export(ExportError::Io(_)) | Error::Io(_) => true,
            Error::Export(ExportError::EmptySelection) => true,
            Error::Icon(_) => true,
            _ => false,
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_display() {
        let err = GeometryError::InvalidScale { scale: -1.0 };
        assert_eq!(err.to_string(), "Invalid scale -1: must be finite and > 0");

        let err = GeometryError::DegeneratePolygon { points: 2 };
        assert_eq!(err.to_string(), "Degenerate polygon with 2 point(s)");
    }

    #[test]
    fn test_export_error_display() {
        assert_eq!(ExportError::Interrupted.to_string(), "Export interrupted");
        let err = ExportError::InvalidPage { index: 3, count: 2 };
        assert_eq!(err.to_string(), "Page 3 out of range (page count 2)");
    }

    #[test]
    fn test_interrupted_is_distinct_from_io() {
        let interrupted: Error = ExportError::Interrupted.into();
        assert!(interrupted.is_interrupted());
        assert!(!interrupted.is_io());

        let io: Error =
            ExportError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")).into();
        assert!(io.is_io());
        assert!(!io.is_interrupted());
        assert!(io.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = IconError::RendererUnavailable.into();
        assert!(matches!(err, Error::Icon(IconError::RendererUnavailable)));

        let err: Error = GeometryError::InvalidScale { scale: 0.0 }.into();
        assert!(!err.is_recoverable());
    }
}
