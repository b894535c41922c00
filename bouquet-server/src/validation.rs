//! Input validation for untrusted data.
//!
//! All user-supplied input MUST be validated before use.
//! Records arrive from browsers we do not control, so caps apply here even
//! though the model itself places no length limit on letter fields.

use bouquet_core::{BouquetError, Composition, Letter, ShareId};
use thiserror::Error;

/// Maximum length of each letter field, in characters.
pub const MAX_LETTER_FIELD_LEN: usize = 2000;
/// Maximum length of a palette mode.
pub const MAX_MODE_LEN: usize = 32;
/// Maximum number of flower units in a shared bouquet.
pub const MAX_SHARED_FLOWERS: usize = 64;

/// Validation error types.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A letter field exceeds the maximum length.
    #[error("{field} too long (max {MAX_LETTER_FIELD_LEN} chars)")]
    LetterFieldTooLong {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Mode exceeds maximum length.
    #[error("mode too long (max {MAX_MODE_LEN} chars)")]
    ModeTooLong,
    /// Mode is empty or contains characters outside `[a-z0-9_-]`.
    #[error("mode contains invalid characters")]
    ModeInvalidChars,
    /// Too many flowers for one card.
    #[error("too many flowers (max {MAX_SHARED_FLOWERS})")]
    TooManyFlowers,
    /// Share id is malformed.
    #[error("invalid bouquet id")]
    InvalidId,
    /// Composition breaks a model invariant.
    #[error("{0}")]
    Record(#[from] BouquetError),
}

impl ValidationError {
    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LetterFieldTooLong { .. } => "letter",
            Self::ModeTooLong | Self::ModeInvalidChars => "mode",
            Self::TooManyFlowers => "flowers",
            Self::InvalidId => "id",
            Self::Record(_) => "record",
        }
    }
}

fn is_valid_mode_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// Validate a palette mode.
///
/// Valid modes:
/// - 1-32 characters
/// - Lowercase ASCII letters, digits, hyphen, underscore only
///
/// # Errors
///
/// Returns [`ValidationError::ModeTooLong`] or
/// [`ValidationError::ModeInvalidChars`].
pub fn validate_mode(mode: &str) -> Result<(), ValidationError> {
    if mode.len() > MAX_MODE_LEN {
        return Err(ValidationError::ModeTooLong);
    }
    if mode.is_empty() || !mode.chars().all(is_valid_mode_char) {
        return Err(ValidationError::ModeInvalidChars);
    }
    Ok(())
}

/// Validate letter field lengths.
///
/// # Errors
///
/// Returns [`ValidationError::LetterFieldTooLong`] naming the first field
/// over the limit.
pub fn validate_letter(letter: &Letter) -> Result<(), ValidationError> {
    for (field, value) in [
        ("recipient", &letter.recipient),
        ("message", &letter.message),
        ("sender", &letter.sender),
    ] {
        if value.chars().count() > MAX_LETTER_FIELD_LEN {
            return Err(ValidationError::LetterFieldTooLong { field });
        }
    }
    Ok(())
}

/// Validate a composition submitted for sharing.
///
/// # Errors
///
/// Returns the first failing check: mode, letter, flower count, then the
/// composition's own invariants.
pub fn validate_composition(composition: &Composition) -> Result<(), ValidationError> {
    validate_mode(composition.mode())?;
    validate_letter(composition.letter())?;
    if composition.total_flowers() > MAX_SHARED_FLOWERS {
        return Err(ValidationError::TooManyFlowers);
    }
    composition.validate()?;
    Ok(())
}

/// Parse a share id from a path segment.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidId`] if the id is malformed.
pub fn validate_share_id(id: &str) -> Result<ShareId, ValidationError> {
    ShareId::new(id).map_err(|_| ValidationError::InvalidId)
}
