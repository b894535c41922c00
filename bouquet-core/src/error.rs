//! Error types for bouquet operations.

use thiserror::Error;

/// Result type for bouquet operations.
pub type BouquetResult<T> = Result<T, BouquetError>;

/// Errors that can occur in bouquet operations.
///
/// Model edits never fail: removing an absent flower or referencing a stale
/// catalog id is absorbed as a no-op. The variants here cover wiring bugs in
/// the host application and records that arrive from outside the session.
#[derive(Debug, Error)]
pub enum BouquetError {
    /// A session operation was invoked while no creation session is active.
    #[error("No active bouquet session")]
    NoActiveSession,

    /// Greenery index outside the three available variants.
    #[error("Invalid greenery variant: {0} (expected 0..=2)")]
    InvalidGreenery(u8),

    /// An externally supplied record violates a composition invariant.
    #[error("Invalid bouquet record: {0}")]
    InvalidRecord(String),

    /// Share identifier is empty, too long or contains invalid characters.
    #[error("Invalid share id: {0}")]
    InvalidShareId(String),

    /// Catalog or record serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
