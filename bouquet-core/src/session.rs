//! Session-scoped state for one bouquet creation session.
//!
//! [`SessionStore`] owns the single active [`Composition`] plus the display
//! language and derives the validation flags the creation flow gates on.
//! [`SessionHost`] is the explicit slot a host application keeps the store
//! in; it has a clear begin/end boundary instead of ambient global state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{FlowerCatalogEntry, FlowerId};
use crate::composition::{Composition, LetterField};
use crate::{BouquetError, BouquetResult};

/// Fewest flowers a bouquet may have before leaving the picking stage.
pub const MIN_FLOWERS: usize = 6;

/// Most flowers a bouquet may have before leaving the picking stage.
pub const MAX_FLOWERS: usize = 10;

/// Palette mode used when the entry point supplies none.
pub const DEFAULT_MODE: &str = "mono";

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Arabic, right-to-left.
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    /// English, left-to-right.
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Two-letter language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::English => "en",
        }
    }

    /// Whether text in this language runs right to left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Arabic)
    }

    /// Parse a language code. Anything other than `"ar"` is English.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("ar") {
            Self::Arabic
        } else {
            Self::English
        }
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Parameters supplied by the entry point when a session begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryParams {
    /// Palette mode, fixed for the whole session.
    pub mode: String,
    /// Initial display language.
    pub lang: Language,
}

impl EntryParams {
    /// Build entry params from optional query values, applying defaults.
    #[must_use]
    pub fn from_query(mode: Option<&str>, lang: Option<&str>) -> Self {
        Self {
            mode: mode
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MODE)
                .to_string(),
            lang: lang
                .filter(|l| !l.is_empty())
                .map(Language::from_code)
                .unwrap_or_default(),
        }
    }
}

impl Default for EntryParams {
    fn default() -> Self {
        Self::from_query(None, None)
    }
}

/// Unique identifier for a creation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State for one creation session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    id: SessionId,
    composition: Composition,
    language: Language,
}

impl SessionStore {
    /// Start a session with an empty composition.
    #[must_use]
    pub fn begin(params: EntryParams) -> Self {
        let id = SessionId::new();
        tracing::info!(
            "Bouquet session {id} started (mode={}, lang={})",
            params.mode,
            params.lang
        );
        Self {
            id,
            composition: Composition::new(params.mode),
            language: params.lang,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The current composition.
    #[must_use]
    pub const fn composition(&self) -> &Composition {
        &self.composition
    }

    /// An owned, read-only copy of the composition for export/share.
    #[must_use]
    pub fn snapshot(&self) -> Composition {
        self.composition.clone()
    }

    /// Current display language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Switch the display language. The composition's mode is unaffected.
    pub fn set_language(&mut self, language: Language) {
        tracing::debug!("Session {} language -> {language}", self.id);
        self.language = language;
    }

    /// Total number of flower units selected.
    #[must_use]
    pub fn total_flowers(&self) -> usize {
        self.composition.total_flowers()
    }

    /// Whether the bouquet size allows leaving the picking stage.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        (MIN_FLOWERS..=MAX_FLOWERS).contains(&self.total_flowers())
    }

    /// Add one unit of a flower.
    pub fn add_flower(&mut self, entry: &FlowerCatalogEntry) {
        self.composition = self.composition.with_flower_added(entry);
    }

    /// Remove one unit of a flower. No-op if it is not selected.
    pub fn remove_flower(&mut self, id: FlowerId) {
        self.composition = self.composition.with_flower_removed(id);
    }

    /// Cycle to the next greenery variant.
    pub fn change_greenery(&mut self) {
        self.composition = self.composition.with_next_greenery();
    }

    /// Replace one field of the card.
    pub fn set_letter_field(&mut self, field: LetterField, value: impl Into<String>) {
        self.composition = self.composition.with_letter_field(field, value);
    }

    /// Shuffle the arrangement using the thread-local RNG.
    pub fn randomize_arrangement(&mut self) {
        self.randomize_arrangement_with(&mut rand::thread_rng());
    }

    /// Shuffle the arrangement using the given RNG.
    pub fn randomize_arrangement_with<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.composition = self.composition.with_new_arrangement(rng);
    }

    /// End the session, yielding the final composition.
    #[must_use]
    pub fn end(self) -> Composition {
        tracing::info!("Bouquet session {} ended", self.id);
        self.composition
    }
}

/// Slot holding at most one active [`SessionStore`].
#[derive(Debug, Default)]
pub struct SessionHost {
    active: Option<SessionStore>,
}

impl SessionHost {
    /// Create a host with no active session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session, replacing any active one.
    pub fn begin(&mut self, params: EntryParams) -> &mut SessionStore {
        if let Some(previous) = self.active.take() {
            tracing::warn!("Session {} replaced by a new session", previous.id());
        }
        self.active.insert(SessionStore::begin(params))
    }

    /// End the active session, returning its final composition.
    pub fn end(&mut self) -> Option<Composition> {
        self.active.take().map(SessionStore::end)
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The active session.
    ///
    /// # Errors
    ///
    /// Returns [`BouquetError::NoActiveSession`] when called outside a
    /// session; this indicates a wiring bug in the host.
    pub fn store(&self) -> BouquetResult<&SessionStore> {
        self.active.as_ref().ok_or_else(no_active_session)
    }

    /// The active session, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`BouquetError::NoActiveSession`] when called outside a
    /// session.
    pub fn store_mut(&mut self) -> BouquetResult<&mut SessionStore> {
        self.active.as_mut().ok_or_else(no_active_session)
    }
}

fn no_active_session() -> BouquetError {
    tracing::error!("Bouquet session operation invoked with no active session");
    BouquetError::NoActiveSession
}
