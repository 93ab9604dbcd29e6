//! Metrics for the two built-in Helvetica faces, plus the character
//! repertoire check applied before any text is drawn.

use crate::error::{InvoiceError, Result};

/// Millimetres per point.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Which of the two embedded faces a piece of text uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// Glyph advance widths for chars 0x20..=0x7E, in 1/1000 of the font size.
/// Values match the standard Helvetica AFM tables.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, // ' ' .. ')'
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556, // '*' .. '3'
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584, // '4' .. '='
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, // '>' .. 'G'
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778, // 'H' .. 'Q'
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278, // 'R' .. '['
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, // '\' .. 'e'
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 'f' .. 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, // 'p' .. 'y'
    500, 334, 260, 334, 584, // 'z' .. '~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, // ' ' .. ')'
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556, // '*' .. '3'
    556, 556, 556, 556, 556, 556, 333, 333, 584, 584, // '4' .. '='
    584, 611, 975, 722, 722, 722, 722, 667, 611, 778, // '>' .. 'G'
    722, 278, 556, 722, 611, 833, 722, 778, 667, 778, // 'H' .. 'Q'
    722, 667, 611, 722, 667, 944, 667, 667, 611, 333, // 'R' .. '['
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, // '\' .. 'e'
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 'f' .. 'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, // 'p' .. 'y'
    500, 389, 280, 389, 584, // 'z' .. '~'
];

/// Advance width of the superscript digits, identical in both faces. These
/// can appear in right-aligned cells, so they carry their real width.
const SUPERSCRIPT_WIDTH: u16 = 333;

/// Width used for characters outside the table. Such characters only occur
/// in left-aligned cells, where the measured width never affects placement.
const FALLBACK_WIDTH: u16 = 556;

fn char_width(style: FontStyle, ch: char) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA_WIDTHS,
        FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) {
        table[(code - 0x20) as usize]
    } else if matches!(ch, '¹' | '²' | '³') {
        SUPERSCRIPT_WIDTH
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of `text` in mm when set at `font_size` points.
pub fn text_width_mm(style: FontStyle, text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(style, c))).sum();
    units as f32 / 1000.0 * font_size * PT_TO_MM
}

/// Rejects text containing characters beyond U+00FF, which the single-byte
/// encoding of the built-in fonts cannot represent.
pub fn check_encodable(field: &'static str, text: &str) -> Result<()> {
    match text.chars().find(|c| *c as u32 > 0xFF) {
        Some(ch) => Err(InvoiceError::Encoding { field, ch }),
        None => Ok(()),
    }
}
