//! Invoice PDF rendering.
//!
//! Produces an A4 portrait document: logo and metadata block at the top,
//! then a bordered three-column table of per-patient commissions, then the
//! grand total and footer notes. Layout runs on a top-down cursor; rows
//! that would cross the bottom margin continue on a fresh page.

use ::image::{DynamicImage, Rgba, RgbImage};
use chrono::{DateTime, FixedOffset, Utc};
use log::warn;
use printpdf::*;
use std::io::{BufWriter, Read};

use crate::commission::{PatientRecord, COMMISSION_TAX_RATE};
use crate::error::{InvoiceError, Result};
use crate::fonts::{self, FontStyle};

// ============================================================================
// Constants
// ============================================================================

/// A4 dimensions in mm
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// Margins
const MARGIN_LEFT_MM: f32 = 10.0;
const MARGIN_TOP_MM: f32 = 15.0;
const MARGIN_RIGHT_MM: f32 = 10.0;
const MARGIN_BOTTOM_MM: f32 = 15.0;

/// Logo placement (above the top margin, like a letterhead)
const LOGO_X_MM: f32 = 10.0;
const LOGO_Y_MM: f32 = 5.0;
const LOGO_WIDTH_MM: f32 = 40.0;

/// Table columns: index, patient name, commission amount
const COL_WIDTHS_MM: [f32; 3] = [10.0, 80.0, 80.0];
const COL_TITLES: [&str; 3] = ["No.", "Patient Name", "Comm. ATax"];
const ROW_HEIGHT_MM: f32 = 8.0;

/// Font sizes in points
const META_FONT_SIZE: f32 = 12.0;
const TABLE_FONT_SIZE: f32 = 10.0;

/// Horizontal padding inside a cell
const CELL_PADDING_MM: f32 = 1.0;

/// Cell border stroke width in points (0.2 mm)
const BORDER_THICKNESS: f32 = 0.57;

// ============================================================================
// Data Structures
// ============================================================================

/// Invoice-level fields printed above the table.
#[derive(Debug, Clone)]
pub struct InvoiceHeader {
    pub invoice_id: String,
    pub agent_id: String,
    pub agent_name: String,
    /// Recorded with the submission; the current layout does not print it.
    pub company_address: String,
    /// Logo source (file path or URL). A logo that cannot be loaded is
    /// skipped with a warning rather than failing the invoice.
    pub logo_path: Option<String>,
}

// ============================================================================
// Clock and Identifiers
// ============================================================================

/// Clock fixed to UTC+7. Invoice dates and identifiers always use this
/// zone, regardless of where the program runs.
fn now_utc7() -> DateTime<FixedOffset> {
    let zone = FixedOffset::east_opt(7 * 3600).expect("fixed offset in range");
    Utc::now().with_timezone(&zone)
}

/// Current UTC+7 timestamp compacted into an invoice identifier,
/// e.g. "20250316094210".
pub fn generate_invoice_id() -> String {
    now_utc7().format("%Y%m%d%H%M%S").to_string()
}

// ============================================================================
// Formatting
// ============================================================================

/// Format an IDR amount with thousands separators and exactly two decimals,
/// the way table cells and the grand total print it.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (number, decimals) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, decimals)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

/// Cell content that is purely digits once separators are ignored prints
/// right-aligned. This covers the index and amount columns while patient
/// names stay left-aligned.
fn table_alignment(content: &str) -> Align {
    let mut saw_digit = false;
    for ch in content.chars() {
        if ch == '.' || ch == ',' {
            continue;
        }
        if !is_cell_digit(ch) {
            return Align::Left;
        }
        saw_digit = true;
    }
    if saw_digit {
        Align::Right
    } else {
        Align::Left
    }
}

/// Digit characters for the alignment test: the decimal digits plus the
/// superscript digits of the single-byte repertoire.
fn is_cell_digit(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '¹' | '²' | '³')
}

// ============================================================================
// Invoice Rendering
// ============================================================================

/// Render the invoice and return the PDF bytes.
///
/// All printed text is checked against the font repertoire up front, so a
/// name that cannot be encoded fails the whole invoice instead of
/// producing a broken document.
pub fn render(header: &InvoiceHeader, records: &[PatientRecord]) -> Result<Vec<u8>> {
    fonts::check_encodable("invoice id", &header.invoice_id)?;
    fonts::check_encodable("agent id", &header.agent_id)?;
    fonts::check_encodable("agent name", &header.agent_name)?;
    fonts::check_encodable("company address", &header.company_address)?;
    for record in records {
        fonts::check_encodable("patient name", &record.patient_name)?;
    }

    let mut page = PageWriter::new("Commission Invoice")?;

    // Logo sits in the letterhead area, outside the cursor flow
    if let Some(source) = header.logo_path.as_deref() {
        match load_logo(source) {
            Ok(img) => page.place_image(&img, LOGO_X_MM, LOGO_Y_MM, LOGO_WIDTH_MM),
            Err(reason) => warn!("Skipping logo {}: {}", source, reason),
        }
    }

    // Clear the logo area, then the metadata block
    page.ln(20.0);
    page.ln(2.0);

    page.set_font(FontStyle::Regular, META_FONT_SIZE);
    let date = now_utc7().format("%d-%m-%Y");
    page.label_row(10.0, &format!("Date: {}", date));
    page.label_row(10.0, &format!("Invoice ID: {}", header.invoice_id));
    page.label_row(10.0, &format!("Agent ID: {}", header.agent_id));
    page.label_row(10.0, &format!("Pay Commission to: {}", header.agent_name));
    page.ln(5.0);

    // Table header
    page.set_font(FontStyle::Bold, TABLE_FONT_SIZE);
    for (width, title) in COL_WIDTHS_MM.iter().zip(COL_TITLES) {
        page.cell(*width, ROW_HEIGHT_MM, title, true, Align::Center);
    }
    page.ln(ROW_HEIGHT_MM);

    // Body rows, accumulating the grand total as rows are emitted
    page.set_font(FontStyle::Regular, TABLE_FONT_SIZE);
    let mut total_commission = 0.0;
    for (index, record) in records.iter().enumerate() {
        total_commission += record.commission_to_agent_after_tax;
        let cells = [
            (index + 1).to_string(),
            record.patient_name.clone(),
            format_amount(record.commission_to_agent_after_tax),
        ];
        for (width, content) in COL_WIDTHS_MM.iter().zip(cells.iter()) {
            page.cell(*width, ROW_HEIGHT_MM, content, true, table_alignment(content));
        }
        page.ln(ROW_HEIGHT_MM);
    }

    // Footer
    page.set_font(FontStyle::Bold, TABLE_FONT_SIZE);
    page.label_row(
        10.0,
        &format!(
            "Total Commission After Tax (IDR): {}",
            format_amount(total_commission)
        ),
    );
    page.label_row(12.0, "Notes:");
    page.label_row(
        13.0,
        &format!("Tax Rate: {:.0} %", COMMISSION_TAX_RATE * 100.0),
    );

    page.finish()
}

// ============================================================================
// Page Writer
// ============================================================================

/// Cursor-driven writer over a printpdf document.
///
/// The cursor lives in top-down page coordinates (y grows downward from the
/// top edge) and is flipped only when talking to the PDF layer.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font_regular: IndirectFontRef,
    font_bold: IndirectFontRef,
    style: FontStyle,
    font_size: f32,
    x: f32,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let layer = doc.get_page(page).get_layer(layer);

        let font_regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| InvoiceError::Pdf(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| InvoiceError::Pdf(e.to_string()))?;

        apply_stroke_style(&layer);

        Ok(PageWriter {
            doc,
            layer,
            font_regular,
            font_bold,
            style: FontStyle::Regular,
            font_size: TABLE_FONT_SIZE,
            x: MARGIN_LEFT_MM,
            y: MARGIN_TOP_MM,
        })
    }

    fn set_font(&mut self, style: FontStyle, size: f32) {
        self.style = style;
        self.font_size = size;
    }

    /// Move the cursor to the left margin of the next line.
    fn ln(&mut self, h: f32) {
        self.x = MARGIN_LEFT_MM;
        self.y += h;
    }

    /// Draw one cell at the cursor and advance past its right edge.
    ///
    /// A width of zero stretches the cell to the right margin. A cell that
    /// would cross the bottom margin moves to a fresh page first, keeping
    /// its horizontal position.
    fn cell(&mut self, w: f32, h: f32, text: &str, border: bool, align: Align) {
        if self.y + h > PAGE_HEIGHT_MM - MARGIN_BOTTOM_MM {
            let x = self.x;
            self.add_page();
            self.x = x;
        }

        let w = if w > 0.0 {
            w
        } else {
            PAGE_WIDTH_MM - MARGIN_RIGHT_MM - self.x
        };

        if border {
            self.stroke_rect(self.x, self.y, w, h);
        }

        if !text.is_empty() {
            let dx = match align {
                Align::Left => CELL_PADDING_MM,
                Align::Center => (w - fonts::text_width_mm(self.style, text, self.font_size)) / 2.0,
                Align::Right => {
                    w - CELL_PADDING_MM - fonts::text_width_mm(self.style, text, self.font_size)
                }
            };
            // Baseline sits below the vertical center by 30% of the font size
            let baseline = self.y + 0.5 * h + 0.3 * self.font_size * fonts::PT_TO_MM;
            let font = match self.style {
                FontStyle::Regular => &self.font_regular,
                FontStyle::Bold => &self.font_bold,
            };
            self.layer.use_text(
                text,
                self.font_size,
                Mm(self.x + dx),
                Mm(PAGE_HEIGHT_MM - baseline),
                font,
            );
        }

        self.x += w;
    }

    /// Full-width unbordered cell followed by a line feed of the same height.
    fn label_row(&mut self, h: f32, text: &str) {
        self.cell(0.0, h, text, false, Align::Left);
        self.ln(h);
    }

    fn add_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        apply_stroke_style(&self.layer);
        self.x = MARGIN_LEFT_MM;
        self.y = MARGIN_TOP_MM;
    }

    /// Stroke a rectangle given in top-down page coordinates.
    fn stroke_rect(&self, x: f32, y: f32, w: f32, h: f32) {
        let top = PAGE_HEIGHT_MM - y;
        let bottom = top - h;
        let points = vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + w), Mm(top)), false),
            (Point::new(Mm(x + w), Mm(bottom)), false),
            (Point::new(Mm(x), Mm(bottom)), false),
        ];
        let line = Line {
            points,
            is_closed: true,
        };
        self.layer.add_line(line);
    }

    /// Place an image with its top edge at `top_y`, scaled to `width_mm`.
    /// Placement is absolute; the cursor does not move.
    fn place_image(&self, logo: &DynamicImage, x: f32, top_y: f32, width_mm: f32) {
        // Convert to RGBA first to handle transparency
        let rgba_image = logo.to_rgba8();
        let (width_px, height_px) = rgba_image.dimensions();

        // Composite against white background
        let mut rgb_image = RgbImage::new(width_px, height_px);
        for (px, py, pixel) in rgba_image.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *pixel;
            let alpha = a as f32 / 255.0;
            let bg = 255.0; // White background
            let out_r = (r as f32 * alpha + bg * (1.0 - alpha)) as u8;
            let out_g = (g as f32 * alpha + bg * (1.0 - alpha)) as u8;
            let out_b = (b as f32 * alpha + bg * (1.0 - alpha)) as u8;
            rgb_image.put_pixel(px, py, ::image::Rgb([out_r, out_g, out_b]));
        }

        let height_mm = width_mm * height_px as f32 / width_px as f32;
        let raw_pixels = rgb_image.into_raw();

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: raw_pixels,
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // Calculate DPI to achieve desired physical size
        // DPI = pixels / (mm / 25.4)
        let dpi = width_px as f32 / (width_mm / 25.4);

        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - top_y - height_mm)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }

    /// Serialize the document and return the PDF bytes.
    fn finish(self) -> Result<Vec<u8>> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| InvoiceError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| InvoiceError::Pdf(e.to_string()))
    }
}

fn apply_stroke_style(layer: &PdfLayerReference) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(BORDER_THICKNESS);
}

// ============================================================================
// Logo Loading
// ============================================================================

/// Load the logo from a file path or http(s) URL. The failure description
/// is plain text because the caller only logs it and carries on.
fn load_logo(source: &str) -> std::result::Result<DynamicImage, String> {
    let image_bytes = if source.starts_with("http://") || source.starts_with("https://") {
        // Load from URL
        let response = ureq::get(source)
            .call()
            .map_err(|e| format!("Failed to fetch URL: {}", e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| format!("Failed to read response: {}", e))?;
        bytes
    } else {
        // Load from file
        std::fs::read(source).map_err(|e| format!("{}: {}", source, e))?
    };

    ::image::load_from_memory(&image_bytes).map_err(|e| format!("Failed to decode image: {}", e))
}

// ============================================================================
// Tests
// ============================================================================
