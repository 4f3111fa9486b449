use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::{
    prelude::*,
    report::{Report, TIMESTAMP_FORMAT, UNMATCHED_NOTE},
};

const SHEET_NAME: &str = "Charging Report";
const HEADER: [&str; 4] = ["Date", "Energy (kWh)", "Cost per kWh (EUR)", "Total Cost (EUR)"];

/// Zero-based row of the session table header, `A11`.
const HEADER_ROW: u32 = 10;

/// Spreadsheet document: title, summary block and the session table with two decimals.
pub fn render(report: &Report<'_>) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    fill(workbook.add_worksheet(), report).context("failed to fill the spreadsheet")?;
    workbook.save_to_buffer().context("failed to save the spreadsheet")
}

fn fill(worksheet: &mut Worksheet, report: &Report<'_>) -> Result<(), XlsxError> {
    let title_format = Format::new().set_bold().set_font_size(14).set_align(FormatAlign::Center);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00F9_DA04))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_align(FormatAlign::Center).set_border(FormatBorder::Thin);
    let number_format = cell_format.clone().set_num_format("0.00");
    let summary_format =
        Format::new().set_bold().set_align(FormatAlign::Left).set_border(FormatBorder::Thin);

    worksheet.set_name(SHEET_NAME)?;
    for column in 0..4 {
        worksheet.set_column_width(column, 20)?;
    }
    worksheet.merge_range(0, 0, 0, 3, "Charging Report", &title_format)?;

    // The totals start at `A3`, the parties at `A8`.
    for (index, (label, value)) in (0_u32..).zip(report.summary_fields()) {
        let row = if index < 4 { 2 + index } else { 3 + index };
        worksheet.write_string_with_format(row, 0, label, &summary_format)?;
        worksheet.write_string_with_format(row, 1, value, &summary_format)?;
    }

    for (column, title) in (0_u16..).zip(HEADER) {
        worksheet.write_string_with_format(HEADER_ROW, column, title, &header_format)?;
    }
    let mut row = HEADER_ROW;
    for priced in report.sessions {
        row += 1;
        let start = priced.session.start.format(TIMESTAMP_FORMAT).to_string();
        worksheet.write_string_with_format(row, 0, start, &cell_format)?;
        worksheet.write_number_with_format(row, 1, priced.session.energy.0, &number_format)?;
        worksheet.write_number_with_format(row, 2, priced.rate.0, &number_format)?;
        worksheet.write_number_with_format(row, 3, priced.cost.0, &number_format)?;
        if !priced.is_matched {
            worksheet.write_string(row, 4, "*")?;
        }
    }
    if report.summary.n_unmatched != 0 {
        worksheet.write_string(row + 2, 0, format!("* {UNMATCHED_NOTE}"))?;
    }
    Ok(())
}
