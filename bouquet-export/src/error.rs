//! Export error types.

use thiserror::Error;

/// Result type for export and share operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting or sharing a bouquet.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Rendering the card to an image failed.
    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    /// Encoding the rendered pixels failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// A flower or bush image could not be read.
    #[error("Failed to load asset {path}: {reason}")]
    Asset {
        /// Asset path as referenced by the layout.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// The persistence collaborator rejected or failed the request.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Handing the image to the platform failed.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Another export or share request is still pending.
    #[error("An export request is already in flight")]
    Busy,

    /// Requested format is not compiled in.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}
