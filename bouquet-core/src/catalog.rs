//! The flower catalog - a static, read-only lookup of available flowers.

use serde::{Deserialize, Serialize};

use crate::BouquetResult;

/// Identifier of a flower type in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowerId(pub u32);

impl std::fmt::Display for FlowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FlowerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Visual size class of a flower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// Small blooms (80px).
    Small,
    /// Medium blooms (120px).
    Medium,
    /// Large blooms (160px).
    Large,
}

impl SizeClass {
    /// Base square dimension in pixels for this size class.
    #[must_use]
    pub const fn base_dimension(self) -> f32 {
        match self {
            Self::Small => 80.0,
            Self::Medium => 120.0,
            Self::Large => 160.0,
        }
    }
}

/// One entry of the flower catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerCatalogEntry {
    /// Unique flower identifier.
    pub id: FlowerId,
    /// Asset name, e.g. `"peony"`.
    pub name: String,
    /// Size class controlling rendered dimensions.
    #[serde(alias = "size")]
    pub size_class: SizeClass,
}

impl FlowerCatalogEntry {
    /// Create a catalog entry.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, size_class: SizeClass) -> Self {
        Self {
            id: FlowerId(id),
            name: name.into(),
            size_class,
        }
    }
}

/// Ordered, immutable list of flowers available for picking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowerCatalog {
    entries: Vec<FlowerCatalogEntry>,
}

impl FlowerCatalog {
    /// Build a catalog from entries. Later duplicates of an id are dropped.
    #[must_use]
    pub fn new(entries: Vec<FlowerCatalogEntry>) -> Self {
        let mut unique: Vec<FlowerCatalogEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.iter().any(|e| e.id == entry.id) {
                tracing::warn!("Duplicate catalog id {} ignored", entry.id);
                continue;
            }
            unique.push(entry);
        }
        Self { entries: unique }
    }

    /// The catalog shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        use SizeClass::{Large, Medium, Small};
        Self::new(vec![
            FlowerCatalogEntry::new(1, "orchid", Medium),
            FlowerCatalogEntry::new(2, "tulip", Small),
            FlowerCatalogEntry::new(3, "dahlia", Large),
            FlowerCatalogEntry::new(4, "anemone", Medium),
            FlowerCatalogEntry::new(5, "carnation", Small),
            FlowerCatalogEntry::new(6, "zinnia", Small),
            FlowerCatalogEntry::new(7, "ranunculus", Medium),
            FlowerCatalogEntry::new(8, "sunflower", Large),
            FlowerCatalogEntry::new(9, "lily", Medium),
            FlowerCatalogEntry::new(10, "daisy", Small),
            FlowerCatalogEntry::new(11, "peony", Large),
        ])
    }

    /// Parse a catalog from a JSON array of entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> BouquetResult<Self> {
        let entries: Vec<FlowerCatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: FlowerId) -> Option<&FlowerCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Iterate entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FlowerCatalogEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
