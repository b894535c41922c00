//! Render plan for a bouquet card.
//!
//! [`BouquetLayout`] resolves a [`Composition`] into everything the
//! presentation layer needs: asset paths, flower sizes, rotations, display
//! order and fitted card text. It is a pure function of its inputs, so the
//! live preview and the exported image are built from identical plans.

use serde::{Deserialize, Serialize};

use crate::arrangement::{display_position, expand, rotation_jitter};
use crate::catalog::FlowerCatalog;
use crate::composition::Composition;
use crate::session::Language;
use crate::share::ModeTag;
use crate::sizing::TextFit;

/// Flowers are drawn slightly smaller on the compact card than in the picker.
pub const CARD_FLOWER_SCALE: f32 = 0.9;

/// Path of a flower image for the given palette mode.
#[must_use]
pub fn flower_asset_path(mode: &str, name: &str) -> String {
    format!("/{mode}/flowers/{name}.png")
}

/// Path of a bush image. `top` selects the layer drawn over the flowers.
#[must_use]
pub fn bush_asset_path(mode: &str, greenery: u8, top: bool) -> String {
    let suffix = if top { "-top" } else { "" };
    format!("/{mode}/bush/bush-{}{suffix}.png", greenery + 1)
}

/// One flower as it will be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFlower {
    /// Catalog name.
    pub name: String,
    /// Image path.
    pub asset_path: String,
    /// Square edge length in pixels.
    pub dimension: f32,
    /// Rotation in degrees.
    pub rotation_deg: f32,
    /// Display position (lower draws first).
    pub order: usize,
}

/// Fitted card text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardText {
    /// Caption above the recipient.
    pub to_caption: String,
    /// Recipient line.
    pub recipient: String,
    /// Message body.
    pub message: String,
    /// Message font size in pixels.
    pub message_font_size: f32,
    /// Caption above the sender.
    pub from_caption: String,
    /// Sender signature.
    pub sender: String,
    /// Sender font size in pixels.
    pub sender_font_size: f32,
    /// Whether text runs right to left.
    pub rtl: bool,
}

impl CardText {
    fn compose(composition: &Composition, language: Language) -> Self {
        let letter = composition.letter();
        let (to_caption, from_caption) = match language {
            Language::Arabic => ("إلى", "من"),
            Language::English => ("TO", "FROM"),
        };
        Self {
            to_caption: to_caption.to_string(),
            recipient: letter.recipient.clone(),
            message: letter.message.clone(),
            message_font_size: TextFit::MESSAGE.size_for(&letter.message),
            from_caption: from_caption.to_string(),
            sender: letter.sender.clone(),
            sender_font_size: TextFit::SENDER.size_for(&letter.sender),
            rtl: language.is_rtl(),
        }
    }
}

/// Everything needed to draw one bouquet card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BouquetLayout {
    /// Clean palette mode.
    pub mode: String,
    /// Display language.
    pub language: Language,
    /// Bush layer drawn behind the flowers.
    pub bush_back: String,
    /// Bush layer drawn over the flowers.
    pub bush_top: String,
    /// Flowers sorted by display order.
    pub flowers: Vec<PlacedFlower>,
    /// Card text.
    pub card: CardText,
}

impl BouquetLayout {
    /// Plan the card view of `composition`.
    #[must_use]
    pub fn compose(composition: &Composition, catalog: &FlowerCatalog, language: Language) -> Self {
        Self::compose_scaled(composition, catalog, language, CARD_FLOWER_SCALE)
    }

    /// Plan with an explicit flower scale (1.0 for the full-size preview).
    #[must_use]
    pub fn compose_scaled(
        composition: &Composition,
        catalog: &FlowerCatalog,
        language: Language,
        flower_scale: f32,
    ) -> Self {
        let mode = ModeTag::parse(composition.mode()).mode;
        let greenery = composition.greenery().index();
        let order = composition.flower_order();
        let seed = composition.arrangement_seed();

        let mut flowers: Vec<(usize, PlacedFlower)> = expand(composition.flowers(), catalog)
            .into_iter()
            .map(|instance| {
                let placed = PlacedFlower {
                    name: instance.entry.name.clone(),
                    asset_path: flower_asset_path(&mode, &instance.entry.name),
                    dimension: instance.entry.size_class.base_dimension() * flower_scale,
                    rotation_deg: rotation_jitter(seed, instance.natural_index),
                    order: display_position(order, instance.natural_index),
                };
                (instance.natural_index, placed)
            })
            .collect();
        flowers.sort_by_key(|(natural, placed)| (placed.order, *natural));

        Self {
            bush_back: bush_asset_path(&mode, greenery, false),
            bush_top: bush_asset_path(&mode, greenery, true),
            flowers: flowers.into_iter().map(|(_, placed)| placed).collect(),
            card: CardText::compose(composition, language),
            mode,
            language,
        }
    }
}
