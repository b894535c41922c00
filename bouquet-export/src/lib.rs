//! # Digibouquet Export
//!
//! Card rendering and the export/share boundary.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ BouquetLayout│──▶│ SVG (card)  │──▶│ resvg/skia   │──▶│ PNG / JPEG   │
//! └──────────────┘   └─────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! [`ShareController`] wraps the pipeline and the persistence collaborator
//! behind a single-in-flight guard.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod share;

pub use error::{ExportError, ExportResult};
pub use export::{BouquetExporter, ExportConfig, ExportFormat};
pub use share::{
    BouquetPersistence, Delivery, DeliveryTarget, ExportOutcome, ImageArtifact, ShareController,
    ShareResolution, SurfaceRasterizer, DOWNLOAD_FILENAME,
};
