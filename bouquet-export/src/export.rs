//! Bouquet card export to image formats.
//!
//! Renders a [`BouquetLayout`] to PNG, JPEG or SVG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline. The card
//! is a 4:5 sheet: bush and flowers in the upper part, the letter panel in
//! the bottom 30%.

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use bouquet_core::{BouquetLayout, PlacedFlower};

use crate::error::{ExportError, ExportResult};

/// Logical card width in pixels.
pub const CARD_WIDTH: f32 = 500.0;
/// Logical card height in pixels.
pub const CARD_HEIGHT: f32 = 625.0;
/// Card background (`#F5F5DC`).
pub const CARD_BACKGROUND: [u8; 4] = [0xF5, 0xF5, 0xDC, 0xFF];

const BUSH_WIDTH: f32 = CARD_WIDTH * 0.85;
const BUSH_HEIGHT: f32 = BUSH_WIDTH * 500.0 / 600.0;
const BUSH_CENTER_Y: f32 = CARD_HEIGHT * 0.40;

const FLOWER_AREA_WIDTH: f32 = CARD_WIDTH * 0.65;
const FLOWER_CENTER_Y: f32 = CARD_HEIGHT * 0.38;
const FLOWER_OVERLAP_X: f32 = 16.0;
const FLOWER_OVERLAP_Y: f32 = 64.0;
const FLOWER_PADDING_TOP: f32 = 8.0;

const PANEL_HEIGHT: f32 = CARD_HEIGHT * 0.30;
const PANEL_TOP: f32 = CARD_HEIGHT - PANEL_HEIGHT;
const PANEL_PADDING: f32 = 24.0;
const MESSAGE_LINE_HEIGHT: f32 = 1.4;

const CRESCENT_PATH: &str = "/crescent.png";
const CRESCENT_SIZE: f32 = 28.0;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector graphics (returns the SVG XML string as UTF-8 bytes).
    Svg,
}

impl ExportFormat {
    /// MIME type of the encoded output.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
        }
    }
}

/// Configuration for card export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
    /// JPEG quality 1-100 (default: 90).
    pub jpeg_quality: u8,
    /// Directory that layout asset paths are resolved against.
    ///
    /// When set, assets are inlined as data URIs so the output is
    /// self-contained. When unset, asset paths are written through unchanged.
    pub asset_root: Option<PathBuf>,
    /// Load system fonts for card text.
    pub system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: CARD_BACKGROUND,
            jpeg_quality: 90,
            asset_root: None,
            system_fonts: true,
        }
    }
}

/// One flower positioned on the card.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowerSlot<'a> {
    /// The flower from the layout.
    pub flower: &'a PlacedFlower,
    /// Left edge in logical pixels.
    pub x: f32,
    /// Top edge in logical pixels.
    pub y: f32,
}

/// Exports a [`BouquetLayout`] to image formats.
///
/// Cloning is cheap; the font database is shared.
#[derive(Clone)]
pub struct BouquetExporter {
    config: ExportConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl BouquetExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        if config.system_fonts {
            fontdb.load_system_fonts();
            tracing::debug!("Loaded {} font faces for card text", fontdb.len());
        }
        Self {
            config,
            fontdb: Arc::new(fontdb),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a layout to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be rendered or encoded.
    pub fn export(&self, layout: &BouquetLayout, format: ExportFormat) -> ExportResult<Vec<u8>> {
        match format {
            ExportFormat::Png => self.render_to_png(layout),
            ExportFormat::Jpeg => self.render_to_jpeg(layout),
            ExportFormat::Svg => Ok(self.render_to_svg(layout)?.into_bytes()),
        }
    }

    /// Export the card to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, layout: &BouquetLayout) -> ExportResult<Vec<u8>> {
        let svg = self.render_to_svg(layout)?;
        let pixmap = self.rasterize_svg(&svg)?;

        pixmap
            .encode_png()
            .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Export the card to JPEG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "jpeg")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, layout: &BouquetLayout) -> ExportResult<Vec<u8>> {
        use image::ImageEncoder;

        let svg = self.render_to_svg(layout)?;
        let pixmap = self.rasterize_svg(&svg)?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let alpha = f32::from(pixel[3]) / 255.0;
            let inv = 1.0 - alpha;
            rgb_data.push((f32::from(pixel[0]).mul_add(alpha, f32::from(bg[0]) * inv)) as u8);
            rgb_data.push((f32::from(pixel[1]).mul_add(alpha, f32::from(bg[1]) * inv)) as u8);
            rgb_data.push((f32::from(pixel[2]).mul_add(alpha, f32::from(bg[2]) * inv)) as u8);
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| ExportError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Export the card to JPEG bytes.
    ///
    /// # Errors
    ///
    /// Always fails: built without the `jpeg` feature.
    #[cfg(not(feature = "jpeg"))]
    pub fn render_to_jpeg(&self, _layout: &BouquetLayout) -> ExportResult<Vec<u8>> {
        Err(ExportError::UnsupportedFormat("jpeg".to_string()))
    }

    /// Export the card to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset under `asset_root` exists but cannot be
    /// read.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_svg(&self, layout: &BouquetLayout) -> ExportResult<String> {
        let scale = self.config.scale.max(0.1);
        let out_w = (CARD_WIDTH * scale).round().max(1.0) as u32;
        let out_h = (CARD_HEIGHT * scale).round().max(1.0) as u32;

        let mut svg = String::with_capacity(8192);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {CARD_WIDTH} {CARD_HEIGHT}\">",
        );

        // Background
        let bg = &self.config.background;
        let bg_alpha = f32::from(bg[3]) / 255.0;
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
            bg[0], bg[1], bg[2], bg_alpha,
        );

        self.render_bush_svg(&mut svg, &layout.bush_back)?;
        for slot in arrange_flowers(layout) {
            self.render_flower_svg(&mut svg, &slot)?;
        }
        self.render_bush_svg(&mut svg, &layout.bush_top)?;
        self.render_card_svg(&mut svg, layout)?;

        svg.push_str("</svg>");
        Ok(svg)
    }

    fn render_bush_svg(&self, svg: &mut String, path: &str) -> ExportResult<()> {
        let Some(href) = self.resolve_href(path)? else {
            return Ok(());
        };
        let x = (CARD_WIDTH - BUSH_WIDTH) / 2.0;
        let y = BUSH_CENTER_Y - BUSH_HEIGHT / 2.0;
        let _ = write!(
            svg,
            "<image x=\"{x}\" y=\"{y}\" width=\"{BUSH_WIDTH}\" height=\"{BUSH_HEIGHT}\" preserveAspectRatio=\"xMidYMid meet\" xlink:href=\"{href}\"/>",
        );
        Ok(())
    }

    fn render_flower_svg(&self, svg: &mut String, slot: &FlowerSlot<'_>) -> ExportResult<()> {
        let Some(href) = self.resolve_href(&slot.flower.asset_path)? else {
            return Ok(());
        };
        let size = slot.flower.dimension;
        let cx = slot.x + size / 2.0;
        let cy = slot.y + size / 2.0;
        let _ = write!(
            svg,
            "<image x=\"{}\" y=\"{}\" width=\"{size}\" height=\"{size}\" transform=\"rotate({} {cx} {cy})\" xlink:href=\"{href}\"/>",
            slot.x, slot.y, slot.flower.rotation_deg,
        );
        Ok(())
    }

    fn render_card_svg(&self, svg: &mut String, layout: &BouquetLayout) -> ExportResult<()> {
        let card = &layout.card;
        let left = PANEL_PADDING;
        let right = CARD_WIDTH - PANEL_PADDING;
        let center = CARD_WIDTH / 2.0;
        let bottom = CARD_HEIGHT - PANEL_PADDING;

        let _ = write!(
            svg,
            "<rect x=\"0\" y=\"{PANEL_TOP}\" width=\"{CARD_WIDTH}\" height=\"{PANEL_HEIGHT}\" fill=\"#ffffff\" fill-opacity=\"0.95\"/>\
             <line x1=\"0\" y1=\"{PANEL_TOP}\" x2=\"{CARD_WIDTH}\" y2=\"{PANEL_TOP}\" stroke=\"#000000\" stroke-width=\"2\"/>",
        );

        // Recipient
        let caption_y = PANEL_TOP + PANEL_PADDING + 10.0;
        let _ = write!(
            svg,
            "<text x=\"{center}\" y=\"{caption_y}\" font-size=\"12\" letter-spacing=\"2\" fill=\"#6b7280\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
            escape_xml(&card.to_caption),
        );
        let recipient_y = caption_y + 20.0;
        let _ = write!(
            svg,
            "<text x=\"{center}\" y=\"{recipient_y}\" font-size=\"16\" font-weight=\"bold\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
            escape_xml(&card.recipient),
        );

        // Message body, centered in the band between recipient and footer
        let footer_top = bottom - card.sender_font_size - 18.0;
        let band_top = recipient_y + 8.0;
        let band_height = (footer_top - band_top).max(0.0);
        let line_height = card.message_font_size * MESSAGE_LINE_HEIGHT;
        let max_chars = chars_per_line(right - left, card.message_font_size);
        let lines = wrap_text(&card.message, max_chars, line_height, band_height);
        #[allow(clippy::cast_precision_loss)]
        let block_height = lines.len() as f32 * line_height;
        let first_baseline =
            band_top + (band_height - block_height) / 2.0 + card.message_font_size;
        let direction = if card.rtl { "rtl" } else { "ltr" };
        for (i, line) in lines.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let y = line_height.mul_add(i as f32, first_baseline);
            let _ = write!(
                svg,
                "<text x=\"{center}\" y=\"{y}\" font-size=\"{}\" direction=\"{direction}\" text-anchor=\"middle\" font-family=\"serif\">{}</text>",
                card.message_font_size,
                escape_xml(line),
            );
        }

        // Footer: crescent on the leading edge, sender on the trailing edge
        let _ = write!(
            svg,
            "<line x1=\"{left}\" y1=\"{footer_top}\" x2=\"{right}\" y2=\"{footer_top}\" stroke=\"#f3f4f6\" stroke-width=\"1\"/>",
        );
        let (crescent_x, sender_x, anchor) = if card.rtl {
            (right - CRESCENT_SIZE, left, "start")
        } else {
            (left, right, "end")
        };
        if let Some(href) = self.resolve_href(CRESCENT_PATH)? {
            let crescent_y = bottom - CRESCENT_SIZE;
            let flip = if card.rtl {
                format!(
                    " transform=\"translate({} 0) scale(-1 1)\"",
                    2.0f32.mul_add(crescent_x, CRESCENT_SIZE)
                )
            } else {
                String::new()
            };
            let _ = write!(
                svg,
                "<image x=\"{crescent_x}\" y=\"{crescent_y}\" width=\"{CRESCENT_SIZE}\" height=\"{CRESCENT_SIZE}\"{flip} xlink:href=\"{href}\"/>",
            );
        }
        let from_y = bottom - card.sender_font_size - 4.0;
        let _ = write!(
            svg,
            "<text x=\"{sender_x}\" y=\"{from_y}\" font-size=\"10\" fill=\"#9ca3af\" text-anchor=\"{anchor}\" font-family=\"sans-serif\">{}</text>",
            escape_xml(&card.from_caption),
        );
        let _ = write!(
            svg,
            "<text x=\"{sender_x}\" y=\"{bottom}\" font-size=\"{}\" font-weight=\"bold\" text-anchor=\"{anchor}\" font-family=\"sans-serif\">{}</text>",
            card.sender_font_size,
            escape_xml(&card.sender),
        );

        Ok(())
    }

    /// Map a layout asset path to an `href`.
    ///
    /// Returns `None` when an asset root is configured but the file is
    /// missing; that layer is left out of the card.
    fn resolve_href(&self, path: &str) -> ExportResult<Option<String>> {
        let Some(root) = &self.config.asset_root else {
            return Ok(Some(escape_xml(path)));
        };

        let file = root.join(path.trim_start_matches('/'));
        match std::fs::read(&file) {
            Ok(bytes) => {
                let mime = mime_for_path(path);
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Ok(Some(format!("data:{mime};base64,{encoded}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Asset {} not found under {}", path, root.display());
                Ok(None)
            }
            Err(e) => Err(ExportError::Asset {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> ExportResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| ExportError::ImageGeneration(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width() as u32;
        let px_h = tree.size().height() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| ExportError::ImageGeneration("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Position every flower of `layout` on the card.
///
/// Flowers wrap into rows no wider than the flower area. The first row sits
/// at the bottom and later rows stack upwards, overlapping their neighbours;
/// the whole block is centred on the bouquet's focal point.
#[must_use]
pub fn arrange_flowers(layout: &BouquetLayout) -> Vec<FlowerSlot<'_>> {
    let rows = pack_rows(&layout.flowers);
    let row_heights: Vec<f32> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|f| f.dimension + FLOWER_PADDING_TOP)
                .fold(0.0, f32::max)
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let overlap = FLOWER_OVERLAP_Y * rows.len().saturating_sub(1) as f32;
    let block_height = row_heights.iter().sum::<f32>() - overlap;
    let mut row_bottom = FLOWER_CENTER_Y + block_height / 2.0;

    let mut slots = Vec::with_capacity(layout.flowers.len());
    for (row, row_height) in rows.iter().zip(&row_heights) {
        let row_top = row_bottom - row_height;
        let mut x = (CARD_WIDTH - row_width(row)) / 2.0;
        for flower in row {
            let item_height = flower.dimension + FLOWER_PADDING_TOP;
            let y = row_top + (row_height - item_height) / 2.0 + FLOWER_PADDING_TOP;
            slots.push(FlowerSlot { flower, x, y });
            x += flower.dimension - FLOWER_OVERLAP_X;
        }
        row_bottom = row_top + FLOWER_OVERLAP_Y;
    }
    slots
}

fn pack_rows(flowers: &[PlacedFlower]) -> Vec<Vec<&PlacedFlower>> {
    let mut rows: Vec<Vec<&PlacedFlower>> = Vec::new();
    for flower in flowers {
        match rows.last_mut() {
            Some(row)
                if row_width(row) + flower.dimension - FLOWER_OVERLAP_X <= FLOWER_AREA_WIDTH =>
            {
                row.push(flower);
            }
            _ => rows.push(vec![flower]),
        }
    }
    rows
}

#[allow(clippy::cast_precision_loss)]
fn row_width(row: &[&PlacedFlower]) -> f32 {
    let total: f32 = row.iter().map(|f| f.dimension).sum();
    total - FLOWER_OVERLAP_X * row.len().saturating_sub(1) as f32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn chars_per_line(width: f32, font_size: f32) -> usize {
    // Average glyph advance is roughly half the font size.
    ((width / (font_size * 0.5)).floor() as usize).max(1)
}

/// Break `text` into lines of at most `max_chars` characters, keeping
/// explicit newlines and dropping lines that would overflow the band.
fn wrap_text(text: &str, max_chars: usize, line_height: f32, max_height: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            while line.chars().count() > max_chars {
                let split = line
                    .char_indices()
                    .nth(max_chars)
                    .map_or(line.len(), |(i, _)| i);
                let rest = line.split_off(split);
                lines.push(std::mem::replace(&mut line, rest));
            }
        }
        lines.push(line);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_lines = ((max_height / line_height).floor() as usize).max(1);
    if lines.len() > max_lines {
        tracing::debug!("Card message truncated to {max_lines} lines");
        lines.truncate(max_lines);
    }
    lines
}

fn mime_for_path(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bouquet_core::{Composition, FlowerCatalog, FlowerId, Language, LetterField};

    fn exporter() -> BouquetExporter {
        BouquetExporter::new(ExportConfig {
            system_fonts: false,
            ..Default::default()
        })
    }

    fn layout(flowers: &[(u32, usize)], message: &str, language: Language) -> BouquetLayout {
        let catalog = FlowerCatalog::builtin();
        let mut composition = Composition::new("color");
        for &(id, count) in flowers {
            let entry = catalog.get(FlowerId(id)).expect("builtin flower");
            for _ in 0..count {
                composition = composition.with_flower_added(entry);
            }
        }
        let composition = composition
            .with_letter_field(LetterField::Recipient, "Layla")
            .with_letter_field(LetterField::Message, message)
            .with_letter_field(LetterField::Sender, "Omar");
        BouquetLayout::compose(&composition, &catalog, language)
    }

    #[test]
    fn test_svg_dimensions_follow_scale() {
        let svg = exporter()
            .render_to_svg(&layout(&[(1, 6)], "Hi", Language::English))
            .expect("svg");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"1000\""));
        assert!(svg.contains("height=\"1250\""));
        assert!(svg.contains("viewBox=\"0 0 500 625\""));
    }

    #[test]
    fn test_svg_contains_layers_in_order() {
        let svg = exporter()
            .render_to_svg(&layout(&[(1, 6)], "Hi", Language::English))
            .expect("svg");
        let back = svg.find("/color/bush/bush-1.png").expect("back bush");
        let flower = svg.find("/color/flowers/").expect("flower");
        let top = svg.find("/color/bush/bush-1-top.png").expect("top bush");
        assert!(back < flower && flower < top);
        assert_eq!(svg.matches("/color/flowers/").count(), 6);
    }

    #[test]
    fn test_card_text_localized() {
        let en = exporter()
            .render_to_svg(&layout(&[(1, 6)], "Hi", Language::English))
            .expect("svg");
        assert!(en.contains(">TO<"));
        assert!(en.contains(">FROM<"));
        assert!(en.contains("direction=\"ltr\""));

        let ar = exporter()
            .render_to_svg(&layout(&[(1, 6)], "مرحبا", Language::Arabic))
            .expect("svg");
        assert!(ar.contains(">إلى<"));
        assert!(ar.contains("direction=\"rtl\""));
        assert!(ar.contains("scale(-1 1)"));
    }

    #[test]
    fn test_xml_escaping() {
        let svg = exporter()
            .render_to_svg(&layout(&[(1, 6)], "A < B & C > D", Language::English))
            .expect("svg");
        assert!(svg.contains("A &lt; B &amp; C &gt; D"));
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let png = exporter()
            .render_to_png(&layout(&[(1, 3), (10, 3)], "Hello", Language::English))
            .expect("png export");

        // PNG magic bytes: \x89PNG
        assert!(png.len() > 8);
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn test_jpeg_export_produces_valid_bytes() {
        let jpeg = exporter()
            .export(&layout(&[(1, 6)], "Hello", Language::English), ExportFormat::Jpeg)
            .expect("jpeg export");

        // JPEG magic bytes: FFD8
        assert!(jpeg.len() > 2);
        assert_eq!(jpeg[0], 0xFF);
        assert_eq!(jpeg[1], 0xD8);
    }

    #[test]
    fn test_flowers_stay_near_bouquet_area() {
        let layout = layout(&[(11, 5), (8, 5)], "", Language::English);
        let slots = arrange_flowers(&layout);
        assert_eq!(slots.len(), 10);
        for slot in &slots {
            assert!(slot.x >= 0.0 && slot.x + slot.flower.dimension <= CARD_WIDTH);
            assert!(slot.y + slot.flower.dimension <= PANEL_TOP + FLOWER_OVERLAP_Y);
        }
    }

    #[test]
    fn test_first_row_is_lowest() {
        let layout = layout(&[(11, 10)], "", Language::English);
        let slots = arrange_flowers(&layout);
        let first = slots.first().expect("slot");
        let last = slots.last().expect("slot");
        assert!(first.y > last.y);
    }

    #[test]
    fn test_empty_layout_has_no_slots() {
        let layout = layout(&[], "", Language::English);
        assert!(arrange_flowers(&layout).is_empty());
        assert!(exporter().render_to_png(&layout).is_ok());
    }

    #[test]
    fn test_wrap_text_respects_width_and_newlines() {
        let lines = wrap_text("one two three\nfour", 7, 10.0, 100.0);
        assert_eq!(lines, ["one two", "three", "four"]);

        let long = wrap_text("abcdefghij", 4, 10.0, 100.0);
        assert_eq!(long, ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_truncates_to_band() {
        let text = "word ".repeat(200);
        let lines = wrap_text(&text, 10, 20.0, 60.0);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_asset_root_inlines_and_skips_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bush_dir = dir.path().join("color/bush");
        std::fs::create_dir_all(&bush_dir).expect("mkdir");
        std::fs::write(bush_dir.join("bush-1.png"), [0x89, b'P', b'N', b'G']).expect("write");

        let exporter = BouquetExporter::new(ExportConfig {
            asset_root: Some(dir.path().to_path_buf()),
            system_fonts: false,
            ..Default::default()
        });
        let svg = exporter
            .render_to_svg(&layout(&[(1, 6)], "Hi", Language::English))
            .expect("svg");
        assert_eq!(svg.matches("data:image/png;base64,").count(), 1);
        assert!(!svg.contains("/color/flowers/"));
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(mime_for_path("/a/b.JPG"), "image/jpeg");
        assert_eq!(mime_for_path("/crescent.png"), "image/png");
    }
}
