use printpdf::{
    BuiltinFont,
    Color,
    IndirectFontRef,
    Line,
    Mm,
    PdfDocument,
    PdfDocumentReference,
    PdfLayerReference,
    Point,
    Rgb,
};

use crate::{
    core::billing::PricedSession,
    prelude::*,
    report::{Report, TIMESTAMP_FORMAT, UNMATCHED_NOTE},
};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LAYER_NAME: &str = "Layer 1";

const MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 10.0;
const LABEL_WIDTH: f32 = 50.0;

/// Text baseline offset from the top of its row.
const BASELINE: f32 = 7.0;

const COLUMN_WIDTHS: [f32; 4] = [50.0, 40.0, 50.0, 50.0];
const HEADER: [&str; 4] = ["Date", "Energy (kWh)", "Tibber Price [EUR/kWh]", "Total Cost (EUR)"];

/// PDF document: summary block and the session table with the unit price in four decimals.
pub fn render(report: &Report<'_>) -> Result<Vec<u8>> {
    let mut writer = Writer::new()?;
    writer.title("Charging Report");
    writer.skip(10.0);
    for (index, (label, value)) in report.summary_fields().into_iter().enumerate() {
        if index == 4 {
            writer.skip(5.0);
        }
        writer.field(label, &value);
    }
    writer.skip(10.0);
    writer.table_row(&HEADER.map(String::from), true);
    for priced in report.sessions {
        writer.table_row(&session_row(priced), false);
    }
    if report.summary.n_unmatched != 0 {
        writer.skip(5.0);
        writer.field(&format!("* {UNMATCHED_NOTE}"), "");
    }
    writer.document.save_to_bytes().context("failed to save the PDF document")
}

/// Table cells of a session, the rate of an unmatched one marked with an asterisk.
fn session_row(priced: &PricedSession) -> [String; 4] {
    [
        priced.session.start.format(TIMESTAMP_FORMAT).to_string(),
        format!("{:.2}", priced.session.energy.0),
        format!("{:.4}{}", priced.rate.0, if priced.is_matched { "" } else { " *" }),
        format!("{:.2}", priced.cost.0),
    ]
}

struct Writer {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,

    /// Top of the next row, from the page bottom in millimetres.
    top: f32,
}

impl Writer {
    fn new() -> Result<Self> {
        let (document, page, layer) =
            PdfDocument::new("Charging Report", PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
        let regular = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("failed to add the regular font")?;
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("failed to add the bold font")?;
        let layer = document.get_page(page).get_layer(layer);
        Ok(Self { document, layer, regular, bold, top: PAGE_HEIGHT.0 - MARGIN })
    }

    fn title(&mut self, text: &str) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.5, None)));
        self.layer.use_text(text, 16.0, Mm(MARGIN), Mm(self.top - BASELINE), &self.bold);
        self.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.top -= ROW_HEIGHT;
    }

    fn skip(&mut self, height: f32) {
        self.top -= height;
    }

    fn field(&mut self, label: &str, value: &str) {
        self.break_page_if_full();
        let baseline = Mm(self.top - BASELINE);
        self.layer.use_text(label, 12.0, Mm(MARGIN), baseline, &self.regular);
        self.layer.use_text(value, 12.0, Mm(MARGIN + LABEL_WIDTH), baseline, &self.regular);
        self.top -= ROW_HEIGHT;
    }

    /// Bordered table row, repeating the header on every new page.
    fn table_row(&mut self, cells: &[String; 4], is_header: bool) {
        if self.break_page_if_full() && !is_header {
            self.table_row(&HEADER.map(String::from), true);
        }
        let font = if is_header { &self.bold } else { &self.regular };
        let (top, bottom) = (self.top, self.top - ROW_HEIGHT);
        let mut left = MARGIN;
        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            self.layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(left), Mm(bottom)), false),
                    (Point::new(Mm(left + width), Mm(bottom)), false),
                    (Point::new(Mm(left + width), Mm(top)), false),
                    (Point::new(Mm(left), Mm(top)), false),
                ],
                is_closed: true,
            });
            self.layer.use_text(cell.as_str(), 12.0, Mm(left + 2.0), Mm(top - BASELINE), font);
            left += width;
        }
        self.top = bottom;
    }

    /// Start a new page when the next row would cross the bottom margin.
    fn break_page_if_full(&mut self) -> bool {
        if self.top - ROW_HEIGHT >= MARGIN {
            return false;
        }
        let (page, layer) = self.document.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
        self.layer = self.document.get_page(page).get_layer(layer);
        self.top = PAGE_HEIGHT.0 - MARGIN;
        true
    }
}
