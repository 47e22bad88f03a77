//! Cell metrics and cached text measurement.

use crate::cache::LruCache;
use crate::surface::{Font, Surface};

/// Widest a column grows from its content alone.
pub const MAX_COL_WIDTH: f64 = 200.0;

/// Cell padding, top/right/bottom/left.
pub const CELL_PADDING: [f64; 4] = [4.0, 12.0, 4.0, 12.0];
/// Horizontal padding of a cell (left + right).
pub const CELL_PADDING_X: f64 = 24.0;

pub const LINE_HEIGHT: f64 = 22.0;
/// Lines of body text shown before the expand affordance appears.
pub const LINE_CLAMP: u32 = 10;
/// One line of text, vertical padding and the bottom border.
pub const MIN_BODY_CELL_HEIGHT: f64 = 31.0;
/// Fully clamped cell: ten lines, vertical padding and the bottom border.
pub const MAX_BODY_CELL_HEIGHT: f64 = 229.0;

/// Slack added to every measured text so glyph rounding never wraps.
pub const TEXT_WIDTH_DIFF: f64 = 4.0;
/// Width of the sort/tree icons; also the tree indent per level.
pub const ICON_WIDTH: f64 = 16.0;

pub const FONT_FAMILY: &str = "PingFangSC-Regular";

pub const HEADER_FONT: Font = Font {
    size: 12.0,
    weight: 400,
    family: FONT_FAMILY,
};

pub const BODY_FONT: Font = Font {
    size: 14.0,
    weight: 400,
    family: FONT_FAMILY,
};

/// Text colour of negative numbers in key/value tables.
pub const NEGATIVE_COLOR: &str = "#07AB4B";

const MEASURE_CACHE_CAP: usize = 4096;

/// Text measurement with memoization across layout passes.
pub struct TextMeter {
    cache: LruCache<(String, u64), f64>,
}

impl Default for TextMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeter {
    pub fn new() -> Self {
        Self {
            cache: LruCache::new(MEASURE_CACHE_CAP),
        }
    }

    /// Raw pixel width of `text`.
    pub fn text_width(&mut self, surface: &dyn Surface, text: &str, font: &Font) -> f64 {
        let key = (text.to_string(), font.size.to_bits());
        if let Some(width) = self.cache.get(&key) {
            return *width;
        }
        let width = surface.measure_text(text, font);
        self.cache.insert(key, width);
        width
    }

    /// Width a cell needs to show `text` on one line: text plus horizontal
    /// padding plus [`TEXT_WIDTH_DIFF`].
    pub fn cell_width(&mut self, surface: &dyn Surface, text: &str, font: &Font) -> f64 {
        self.text_width(surface, text, font) + CELL_PADDING_X + TEXT_WIDTH_DIFF
    }

    pub fn header_width(&mut self, surface: &dyn Surface, text: &str) -> f64 {
        self.cell_width(surface, text, &HEADER_FONT)
    }

    pub fn body_width(&mut self, surface: &dyn Surface, text: &str) -> f64 {
        self.cell_width(surface, text, &BODY_FONT)
    }
}
