//! Responsive text fitting for the greeting card.
//!
//! Font size shrinks hyperbolically as the character count grows and is
//! clamped to a per-field range. The message body and the sender signature
//! share the same function with different parameters.

use serde::{Deserialize, Serialize};

/// Font size returned for empty text, in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Compute the display font size for `text`.
///
/// Returns [`DEFAULT_FONT_SIZE`] for empty text. Otherwise returns
/// `container_width / (chars * weight_factor)` clamped to
/// `[min_size, max_size]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn font_size(
    text: &str,
    container_width: f32,
    min_size: f32,
    max_size: f32,
    weight_factor: f32,
) -> f32 {
    let chars = text.chars().count();
    if chars == 0 {
        return DEFAULT_FONT_SIZE;
    }
    let raw = container_width / (chars as f32 * weight_factor);
    // max/min rather than f32::clamp, which panics when min > max.
    raw.min(max_size).max(min_size)
}

/// A named set of text-fit parameters for one card field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextFit {
    /// Reference container width in pixels.
    pub container_width: f32,
    /// Smallest size the field may shrink to.
    pub min_size: f32,
    /// Largest size, used for very short text.
    pub max_size: f32,
    /// Higher values shrink faster per character.
    pub weight_factor: f32,
}

impl TextFit {
    /// Parameters for the card's message body.
    pub const MESSAGE: Self = Self {
        container_width: 600.0,
        min_size: 14.0,
        max_size: 34.0,
        weight_factor: 0.5,
    };

    /// Parameters for the sender signature line.
    pub const SENDER: Self = Self {
        container_width: 400.0,
        min_size: 14.0,
        max_size: 20.0,
        weight_factor: 0.7,
    };

    /// Font size for `text` under these parameters.
    #[must_use]
    pub fn size_for(&self, text: &str) -> f32 {
        font_size(
            text,
            self.container_width,
            self.min_size,
            self.max_size,
            self.weight_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_text_uses_default() {
        assert!((font_size("", 600.0, 14.0, 34.0, 0.5) - 16.0).abs() < f32::EPSILON);
        assert!((font_size("", 0.0, 40.0, 80.0, 0.0) - 16.0).abs() < f32::EPSILON);
    }

    #[test]
    fn short_message_hits_ceiling() {
        // 600 / (3 * 0.5) = 400 -> clamped to 34
        assert!((TextFit::MESSAGE.size_for("Hi!") - 34.0).abs() < f32::EPSILON);
    }

    #[test]
    fn long_message_hits_floor() {
        let text = "a".repeat(500);
        assert!((TextFit::MESSAGE.size_for(&text) - 14.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mid_length_message_scales() {
        // 600 / (50 * 0.5) = 24
        let text = "b".repeat(50);
        assert!((TextFit::MESSAGE.size_for(&text) - 24.0).abs() < 1e-4);
    }

    #[test]
    fn sender_preset() {
        // 400 / (40 * 0.7) ~= 14.29
        let name = "c".repeat(40);
        let size = TextFit::SENDER.size_for(&name);
        assert!(size > 14.0 && size < 15.0);
        assert!((TextFit::SENDER.size_for("Me") - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Arabic letters are two bytes each in UTF-8.
        let arabic = "سلام".repeat(10);
        let latin = "abcd".repeat(10);
        assert!(
            (TextFit::MESSAGE.size_for(&arabic) - TextFit::MESSAGE.size_for(&latin)).abs()
                < f32::EPSILON
        );
    }

    proptest! {
        #[test]
        fn prop_size_within_bounds(
            text in "[a-z ]{1,400}",
            width in 1.0f32..2000.0,
            min in 1.0f32..30.0,
            span in 0.0f32..60.0,
            weight in 0.05f32..3.0,
        ) {
            let max = min + span;
            let size = font_size(&text, width, min, max, weight);
            prop_assert!(size >= min && size <= max);
        }

        #[test]
        fn prop_size_weakly_decreasing(
            len in 1usize..300,
            extra in 0usize..300,
            width in 1.0f32..2000.0,
            weight in 0.05f32..3.0,
        ) {
            let shorter = "x".repeat(len);
            let longer = "x".repeat(len + extra);
            let a = font_size(&shorter, width, 14.0, 34.0, weight);
            let b = font_size(&longer, width, 14.0, 34.0, weight);
            prop_assert!(b <= a);
        }
    }
}
