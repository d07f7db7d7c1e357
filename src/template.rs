//! Invoice template – renders an [`Invoice`] into a fixed-geometry A4
//! [`Sheet`]: title, letterhead, bill-to block, line-item table, totals
//! block, and signature block. Geometry is fixed (print-accurate, viewport
//! independent); only the table grows with its line items and wrapped
//! description text.

use serde::{Deserialize, Serialize};

use crate::fonts::FontManager;
use crate::invoice::Invoice;
use crate::money::{format_date, format_rupiah};
use crate::sheet::{ImageRef, Sheet, SheetBox, Stroke, TextAlign, TextRun};

// Page geometry, in layout pixels.
const OUTER_MARGIN: f32 = 32.0;
const FRAME_PADDING: f32 = 32.0;

// Palette.
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const GRAY_BORDER: [f32; 3] = [0.82, 0.835, 0.859]; // #d1d5db
const HEADER_BLUE: [f32; 3] = [0.231, 0.51, 0.965]; // #3b82f6

// Table columns. Description takes the remaining width.
const SL_COL: f32 = 48.0;
const QTY_COL: f32 = 64.0;
const RATE_COL: f32 = 110.0;
const AMOUNT_COL: f32 = 110.0;
const CELL_PAD: f32 = 8.0;

const BODY_SIZE: f32 = 14.0;
const TABLE_SIZE: f32 = 13.0;
const SMALL_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 24.0;
const LINE_H: f32 = 20.0;
const TABLE_LINE_H: f32 = 18.0;

/// Fixed company block printed on every invoice, plus the image assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Letterhead {
    pub hotel_name: String,
    pub address_lines: Vec<String>,
    /// Logo image source (path or base64 data URI); `None` leaves the slot empty.
    pub logo_src: Option<String>,
    /// Signature image source; `None` leaves the slot empty.
    pub signature_src: Option<String>,
    pub signatory: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            hotel_name: "NUSA INDAH PANJALU HOTEL".to_string(),
            address_lines: vec![
                "Jln. Pasanggrahan No 59 Panjalu".to_string(),
                "Ciamis".to_string(),
                "Indonesia".to_string(),
                "Mobile: 081297742115".to_string(),
                "Email: nusaindahpanjalu@gmail.com".to_string(),
            ],
            logo_src: Some("assets/logo.png".to_string()),
            signature_src: Some("assets/signature.png".to_string()),
            signatory: "Muhamad Kobul".to_string(),
        }
    }
}

/// Build the complete off-screen sheet for one invoice.
pub fn build_sheet(invoice: &Invoice, letterhead: &Letterhead, fonts: &FontManager) -> Sheet {
    let mut w = SheetWriter {
        sheet: Sheet::a4(),
    };

    let content_x = OUTER_MARGIN + FRAME_PADDING;
    let content_w = w.sheet.width - 2.0 * (OUTER_MARGIN + FRAME_PADDING);
    let content_right = content_x + content_w;

    // Page frame.
    w.stroke_rect(
        OUTER_MARGIN,
        OUTER_MARGIN,
        w.sheet.width - 2.0 * OUTER_MARGIN,
        w.sheet.height - 2.0 * OUTER_MARGIN,
        1.0,
        GRAY_BORDER,
    );

    let mut y = content_x;

    // Document title.
    w.text(content_x, y, content_w, TITLE_SIZE, true, TextAlign::Center, "INVOICE");
    y += 32.0 + 24.0;

    // Letterhead: company block left, logo right.
    w.text(content_x, y, content_w, BODY_SIZE, true, TextAlign::Left, &letterhead.hotel_name);
    let mut line_y = y + 22.0;
    for line in &letterhead.address_lines {
        w.text(content_x, line_y, content_w, SMALL_SIZE, false, TextAlign::Left, line);
        line_y += 17.0;
    }
    if let Some(src) = &letterhead.logo_src {
        w.image(content_right - 96.0, y, 96.0, 96.0, src);
    }
    y = (line_y).max(y + 96.0) + 16.0;

    // Divider between letterhead and bill info.
    w.hline(content_x, y, content_w, GRAY_BORDER);
    y += 24.0;

    // Bill-to block left; invoice number/date block right.
    w.text(content_x, y, content_w / 2.0, BODY_SIZE, true, TextAlign::Left, "Bill To");
    w.text(
        content_x,
        y + LINE_H,
        content_w / 2.0,
        BODY_SIZE,
        false,
        TextAlign::Left,
        &invoice.header.customer_name,
    );

    let half_x = content_x + content_w / 2.0;
    let half_w = content_w / 2.0;
    w.text(half_x, y, half_w / 2.0, BODY_SIZE, true, TextAlign::Left, "Invoice No");
    w.text(
        half_x,
        y,
        half_w,
        BODY_SIZE,
        true,
        TextAlign::Right,
        &invoice.header.invoice_number,
    );
    w.text(half_x, y + LINE_H, half_w / 2.0, BODY_SIZE, false, TextAlign::Left, "Invoice Date");
    w.text(
        half_x,
        y + LINE_H,
        half_w,
        BODY_SIZE,
        false,
        TextAlign::Right,
        &format_date(invoice.header.invoice_date),
    );
    y += 2.0 * LINE_H + 24.0;

    // Line-item table.
    y = build_table(&mut w, invoice, fonts, content_x, y, content_w);
    y += 16.0;

    // Totals block, right half of the content area.
    y = build_totals(&mut w, invoice, half_x, y, half_w);
    y += 8.0;

    // Signature block, offset in from the right edge.
    let sig_x = content_right - 96.0 - 128.0;
    if let Some(src) = &letterhead.signature_src {
        w.image(sig_x, y, 128.0, 64.0, src);
    }
    y += 64.0 + 8.0;
    w.text(sig_x, y, 128.0, BODY_SIZE, false, TextAlign::Center, &letterhead.signatory);

    w.sheet
}

/// Emit the header row and one row per line item; returns the y just below
/// the table.
fn build_table(
    w: &mut SheetWriter,
    invoice: &Invoice,
    fonts: &FontManager,
    x: f32,
    mut y: f32,
    width: f32,
) -> f32 {
    let desc_col = width - SL_COL - QTY_COL - RATE_COL - AMOUNT_COL;
    let cols = [SL_COL, desc_col, QTY_COL, RATE_COL, AMOUNT_COL];

    // Header row.
    let header_h = TABLE_LINE_H + 2.0 * CELL_PAD;
    let headers = ["Sl.", "Description", "Qty", "Rate", "Amount"];
    let header_aligns = [
        TextAlign::Center,
        TextAlign::Left,
        TextAlign::Center,
        TextAlign::Right,
        TextAlign::Right,
    ];
    let mut cx = x;
    for ((&col_w, label), &align) in cols.iter().zip(headers).zip(header_aligns.iter()) {
        w.fill_rect(cx, y, col_w, header_h, HEADER_BLUE);
        w.stroke_rect(cx, y, col_w, header_h, 1.0, GRAY_BORDER);
        w.text_colored(
            cx + CELL_PAD,
            y + CELL_PAD,
            col_w - 2.0 * CELL_PAD,
            TABLE_SIZE,
            true,
            align,
            WHITE,
            label,
        );
        cx += col_w;
    }
    y += header_h;

    // Body rows. Long descriptions wrap and grow the row.
    for (index, item) in invoice.items.iter().enumerate() {
        let desc_lines = fonts.wrap_text(
            &item.description,
            TABLE_SIZE,
            false,
            desc_col - 2.0 * CELL_PAD,
        );
        let row_h = desc_lines.len() as f32 * TABLE_LINE_H + 2.0 * CELL_PAD;

        let cells = [
            (format!("{}", index + 1), TextAlign::Center),
            (String::new(), TextAlign::Left), // description painted per line below
            (format!("{}", item.quantity), TextAlign::Center),
            (format_rupiah(item.rate), TextAlign::Right),
            (format_rupiah(item.amount()), TextAlign::Right),
        ];

        let mut cx = x;
        for (&col_w, (content, align)) in cols.iter().zip(cells.iter()) {
            w.stroke_rect(cx, y, col_w, row_h, 1.0, GRAY_BORDER);
            if !content.is_empty() {
                w.text(
                    cx + CELL_PAD,
                    y + CELL_PAD,
                    col_w - 2.0 * CELL_PAD,
                    TABLE_SIZE,
                    false,
                    *align,
                    content,
                );
            }
            cx += col_w;
        }

        let desc_x = x + SL_COL + CELL_PAD;
        for (i, line) in desc_lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            w.text(
                desc_x,
                y + CELL_PAD + i as f32 * TABLE_LINE_H,
                desc_col - 2.0 * CELL_PAD,
                TABLE_SIZE,
                false,
                TextAlign::Left,
                line,
            );
        }

        y += row_h;
    }

    y
}

/// Subtotal / Total / Paid / Balance Due rows; returns the y just below the
/// closing divider.
fn build_totals(w: &mut SheetWriter, invoice: &Invoice, x: f32, mut y: f32, width: f32) -> f32 {
    let label_w = width / 2.0;
    let value_x = x + label_w;

    let paid_label = format!("Paid ({}):", format_date(invoice.payment.payment_date));
    let rows: [(String, f64, bool); 4] = [
        ("Subtotal:".to_string(), invoice.subtotal(), true),
        ("Total:".to_string(), invoice.subtotal(), true),
        (paid_label, invoice.payment.paid_amount, false),
        ("Balance Due:".to_string(), invoice.balance_due(), true),
    ];

    for (i, (label, amount, bold)) in rows.iter().enumerate() {
        // Divider between Subtotal and Total, as on the original form.
        if i == 1 {
            y += 4.0;
            w.hline(x, y, width, GRAY_BORDER);
            y += 8.0;
        }
        w.text(x, y, label_w, BODY_SIZE, *bold, TextAlign::Right, label);
        w.text(
            value_x,
            y,
            label_w,
            BODY_SIZE,
            *bold,
            TextAlign::Right,
            &format_rupiah(*amount),
        );
        y += LINE_H;
    }

    y += 4.0;
    w.hline(x, y, width, GRAY_BORDER);
    y + 8.0
}

/// Small append-only wrapper over [`Sheet`].
struct SheetWriter {
    sheet: Sheet,
}

impl SheetWriter {
    fn text(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        font_size: f32,
        bold: bool,
        align: TextAlign,
        text: &str,
    ) {
        self.text_colored(x, y, width, font_size, bold, align, BLACK, text);
    }

    #[allow(clippy::too_many_arguments)]
    fn text_colored(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        font_size: f32,
        bold: bool,
        align: TextAlign,
        color: [f32; 3],
        text: &str,
    ) {
        if text.is_empty() {
            return;
        }
        let mut b = SheetBox::new(x, y, width, font_size * 1.4);
        b.text = Some(TextRun {
            text: text.to_string(),
            font_size,
            bold,
            align,
            color,
        });
        self.sheet.boxes.push(b);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: [f32; 3]) {
        let mut b = SheetBox::new(x, y, width, height);
        b.fill = Some(color);
        self.sheet.boxes.push(b);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, sw: f32, color: [f32; 3]) {
        let mut b = SheetBox::new(x, y, width, height);
        b.stroke = Some(Stroke { width: sw, color });
        self.sheet.boxes.push(b);
    }

    fn hline(&mut self, x: f32, y: f32, width: f32, color: [f32; 3]) {
        self.fill_rect(x, y, width, 1.0, color);
    }

    fn image(&mut self, x: f32, y: f32, width: f32, height: f32, src: &str) {
        let mut b = SheetBox::new(x, y, width, height);
        b.image = Some(ImageRef {
            src: src.to_string(),
        });
        self.sheet.boxes.push(b);
    }
}
