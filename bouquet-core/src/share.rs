//! Shareable bouquet records.
//!
//! A shared bouquet is persisted with a composite mode string that carries
//! the sender's language alongside the palette, e.g. `"color&lang=ar"`. The
//! viewing path strips the marker again before resolving asset paths.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::composition::Composition;
use crate::session::Language;
use crate::{BouquetError, BouquetResult};

/// Maximum length of a share identifier.
pub const MAX_SHARE_ID_LEN: usize = 64;

/// Length of generated share identifiers.
const GENERATED_ID_LEN: usize = 12;

/// Language markers recognised inside a composite mode string.
const LANG_MARKERS: [&str; 2] = ["&lang=", "?lang="];

/// Opaque identifier of a persisted bouquet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareId(String);

impl ShareId {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BouquetError::InvalidShareId`] if the id is empty, longer
    /// than [`MAX_SHARE_ID_LEN`], or contains characters other than ASCII
    /// alphanumerics, `-` and `_`.
    pub fn new(id: impl Into<String>) -> BouquetResult<Self> {
        let id = id.into();
        let valid_chars = id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if id.is_empty() || id.len() > MAX_SHARE_ID_LEN || !valid_chars {
            return Err(BouquetError::InvalidShareId(id));
        }
        Ok(Self(id))
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(GENERATED_ID_LEN);
        Self(id)
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShareId {
    type Error = BouquetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShareId> for String {
    fn from(id: ShareId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ShareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Palette mode plus the language it was shared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTag {
    /// Clean palette mode, safe for asset paths.
    pub mode: String,
    /// Language encoded in the tag.
    pub language: Language,
}

impl ModeTag {
    /// Create a tag.
    #[must_use]
    pub fn new(mode: impl Into<String>, language: Language) -> Self {
        Self {
            mode: mode.into(),
            language,
        }
    }

    /// Encode as `"{mode}&lang={code}"`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}&lang={}", self.mode, self.language.code())
    }

    /// Decode a composite mode string.
    ///
    /// The language is Arabic iff the string contains `lang=ar`; every
    /// `&lang=..`/`?lang=..` marker is removed from the mode.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let language = if raw.contains("lang=ar") {
            Language::Arabic
        } else {
            Language::English
        };
        Self {
            mode: strip_lang_markers(raw),
            language,
        }
    }
}

fn strip_lang_markers(raw: &str) -> String {
    let mut mode = raw.to_string();
    while let Some((start, marker)) = LANG_MARKERS
        .iter()
        .filter_map(|m| mode.find(m).map(|pos| (pos, *m)))
        .min_by_key(|(pos, _)| *pos)
    {
        let value_start = start + marker.len();
        let value_len = mode[value_start..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(mode.len() - value_start);
        mode.replace_range(start..value_start + value_len, "");
    }
    mode
}

/// A composition prepared for the persistence collaborator.
///
/// Identical to the session's composition except that `mode` holds the
/// encoded [`ModeTag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharePayload(Composition);

impl SharePayload {
    /// Tag `composition` with the sharing language.
    #[must_use]
    pub fn new(composition: &Composition, language: Language) -> Self {
        let tag = ModeTag::new(composition.mode(), language);
        Self(composition.with_mode(tag.encode()))
    }

    /// Wrap a record as stored, with its composite mode untouched.
    #[must_use]
    pub fn from_stored(composition: Composition) -> Self {
        Self(composition)
    }

    /// The stored record.
    #[must_use]
    pub const fn record(&self) -> &Composition {
        &self.0
    }

    /// The decoded mode tag.
    #[must_use]
    pub fn tag(&self) -> ModeTag {
        ModeTag::parse(self.0.mode())
    }

    /// Check the record's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BouquetError::InvalidRecord`] if the composition is
    /// inconsistent.
    pub fn validate(&self) -> BouquetResult<()> {
        self.0.validate()
    }

    /// Decode for read-only display.
    #[must_use]
    pub fn resolve(&self) -> SharedBouquet {
        let tag = self.tag();
        SharedBouquet {
            composition: self.0.with_mode(tag.mode),
            language: tag.language,
        }
    }
}

/// A shared bouquet ready for read-only rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedBouquet {
    /// Composition with a clean palette mode.
    pub composition: Composition,
    /// Language the bouquet was shared in.
    pub language: Language,
}
