//! The bouquet record and the operations that keep it consistent.
//!
//! A [`Composition`] is a value: every edit returns a new composition and
//! leaves the receiver untouched. Structural edits to `flowers` always
//! regenerate `flower_order` wholesale so it never indexes a stale range.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arrangement::{default_order, is_permutation, reorder, total_instances};
use crate::catalog::{FlowerCatalogEntry, FlowerId};
use crate::{BouquetError, BouquetResult};

/// Number of greenery variants.
pub const GREENERY_VARIANTS: u8 = 3;

/// One chosen flower type and its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerSelection {
    /// Catalog id of the flower type.
    pub id: FlowerId,
    /// Number of units, always at least 1 inside a composition.
    pub count: u32,
}

/// Greenery (bush) variant, always in `0..=2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Greenery(u8);

impl Greenery {
    /// Variant index in `0..=2`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The next variant, wrapping after the last.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % GREENERY_VARIANTS)
    }
}

impl TryFrom<u8> for Greenery {
    type Error = BouquetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < GREENERY_VARIANTS {
            Ok(Self(value))
        } else {
            Err(BouquetError::InvalidGreenery(value))
        }
    }
}

impl From<Greenery> for u8 {
    fn from(greenery: Greenery) -> Self {
        greenery.0
    }
}

/// The greeting card text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    /// Who the bouquet is for.
    #[serde(default)]
    pub recipient: String,
    /// Who signed the card.
    #[serde(default)]
    pub sender: String,
    /// Free-form message body.
    #[serde(default)]
    pub message: String,
}

/// Selector for one field of a [`Letter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterField {
    /// The recipient line.
    Recipient,
    /// The sender signature.
    Sender,
    /// The message body.
    Message,
}

impl FromStr for LetterField {
    type Err = BouquetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recipient" => Ok(Self::Recipient),
            "sender" => Ok(Self::Sender),
            "message" => Ok(Self::Message),
            other => Err(BouquetError::InvalidRecord(format!(
                "unknown letter field: {other}"
            ))),
        }
    }
}

/// The full in-progress bouquet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    /// Palette/style selector, e.g. `"color"` or `"mono"`.
    mode: String,
    /// Selected flower types in selection order.
    #[serde(default)]
    flowers: Vec<FlowerSelection>,
    /// Display position per natural instance index.
    #[serde(default, alias = "flowerOrder")]
    flower_order: Vec<usize>,
    /// Bush variant.
    #[serde(default)]
    greenery: Greenery,
    /// Card text.
    #[serde(default)]
    letter: Letter,
    /// Creation time, milliseconds since the Unix epoch.
    #[serde(default, alias = "timestamp")]
    created_at: u64,
    /// Seed for per-flower rotation jitter.
    #[serde(default)]
    arrangement_seed: u64,
}

impl Composition {
    /// Create an empty composition for the given palette mode.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            flowers: Vec::new(),
            flower_order: Vec::new(),
            greenery: Greenery::default(),
            letter: Letter::default(),
            created_at: current_timestamp_ms(),
            arrangement_seed: 0,
        }
    }

    /// Palette mode.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Selected flowers in selection order.
    #[must_use]
    pub fn flowers(&self) -> &[FlowerSelection] {
        &self.flowers
    }

    /// Current display order.
    #[must_use]
    pub fn flower_order(&self) -> &[usize] {
        &self.flower_order
    }

    /// Current greenery variant.
    #[must_use]
    pub const fn greenery(&self) -> Greenery {
        self.greenery
    }

    /// Card text.
    #[must_use]
    pub const fn letter(&self) -> &Letter {
        &self.letter
    }

    /// Creation timestamp in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Seed for rotation jitter.
    #[must_use]
    pub const fn arrangement_seed(&self) -> u64 {
        self.arrangement_seed
    }

    /// Total number of flower units.
    #[must_use]
    pub fn total_flowers(&self) -> usize {
        total_instances(&self.flowers)
    }

    /// Quantity selected for `id` (0 when absent).
    #[must_use]
    pub fn count_of(&self, id: FlowerId) -> u32 {
        self.flowers
            .iter()
            .find(|f| f.id == id)
            .map_or(0, |f| f.count)
    }

    /// Add one unit of `entry`.
    #[must_use]
    pub fn with_flower_added(&self, entry: &FlowerCatalogEntry) -> Self {
        let mut flowers = self.flowers.clone();
        match flowers.iter_mut().find(|f| f.id == entry.id) {
            Some(existing) => existing.count += 1,
            None => flowers.push(FlowerSelection {
                id: entry.id,
                count: 1,
            }),
        }
        tracing::debug!("Added {} ({})", entry.name, entry.id);
        self.with_flowers(flowers)
    }

    /// Remove one unit of flower `id`; drops the entry when it reaches zero.
    ///
    /// Returns an unchanged copy when `id` is not selected.
    #[must_use]
    pub fn with_flower_removed(&self, id: FlowerId) -> Self {
        let Some(position) = self.flowers.iter().position(|f| f.id == id) else {
            tracing::debug!("Remove of absent flower {id} ignored");
            return self.clone();
        };

        let mut flowers = self.flowers.clone();
        if flowers[position].count <= 1 {
            flowers.remove(position);
        } else {
            flowers[position].count -= 1;
        }
        self.with_flowers(flowers)
    }

    /// Advance to the next greenery variant.
    #[must_use]
    pub fn with_next_greenery(&self) -> Self {
        Self {
            greenery: self.greenery.next(),
            ..self.clone()
        }
    }

    /// Replace one letter field.
    #[must_use]
    pub fn with_letter_field(&self, field: LetterField, value: impl Into<String>) -> Self {
        let mut letter = self.letter.clone();
        let value = value.into();
        match field {
            LetterField::Recipient => letter.recipient = value,
            LetterField::Sender => letter.sender = value,
            LetterField::Message => letter.message = value,
        }
        Self {
            letter,
            ..self.clone()
        }
    }

    /// Shuffle the arrangement and re-draw the rotation seed.
    #[must_use]
    pub fn with_new_arrangement<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let total = self.total_flowers();
        let flower_order = reorder(total, rng);
        tracing::debug!("New arrangement for {total} flowers");
        Self {
            flower_order,
            arrangement_seed: rng.gen(),
            ..self.clone()
        }
    }

    /// Copy with a different mode string. Used to build share payloads.
    #[must_use]
    pub(crate) fn with_mode(&self, mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ..self.clone()
        }
    }

    /// Check a composition received from outside the session.
    ///
    /// # Errors
    ///
    /// Returns [`BouquetError::InvalidRecord`] if flower ids repeat, a count
    /// is zero, or `flower_order` is neither empty nor a permutation of the
    /// instance range.
    pub fn validate(&self) -> BouquetResult<()> {
        for (i, selection) in self.flowers.iter().enumerate() {
            if selection.count == 0 {
                return Err(BouquetError::InvalidRecord(format!(
                    "flower {} has zero count",
                    selection.id
                )));
            }
            if self.flowers[..i].iter().any(|f| f.id == selection.id) {
                return Err(BouquetError::InvalidRecord(format!(
                    "flower {} selected twice",
                    selection.id
                )));
            }
        }

        let total = self.total_flowers();
        if !self.flower_order.is_empty() && !is_permutation(&self.flower_order, total) {
            return Err(BouquetError::InvalidRecord(format!(
                "flower order is not a permutation of 0..{total}"
            )));
        }
        Ok(())
    }

    /// Replace `flowers` and reset the order to the sequential default.
    fn with_flowers(&self, flowers: Vec<FlowerSelection>) -> Self {
        let flower_order = default_order(total_instances(&flowers));
        Self {
            flowers,
            flower_order,
            ..self.clone()
        }
    }
}

/// Get the current Unix timestamp in milliseconds.
#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

/// Get the current Unix timestamp in milliseconds.
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn current_timestamp_ms() -> u64 {
    js_sys::Date::now() as u64
}
