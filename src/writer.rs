use crate::canonical::FinalTable;
use crate::error::Result;
use chrono::NaiveDate;
use log::info;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Output naming rule: current-date prefix, fixed stem.
pub fn output_filename(today: NaiveDate) -> String {
    format!("{}_oildata.xlsx", today.format("%Y-%m-%d"))
}

/// Writes the final table to a single-sheet workbook: the header row, then
/// one row per (case, line item, unit) series.
pub fn write_table(table: &FinalTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, title) in table.header().iter().enumerate() {
        worksheet.write_string(0, col as u16, title)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &row.case_name)?;
        worksheet.write_string(r, 1, &row.value_type)?;
        worksheet.write_string(r, 2, &row.units)?;
        for (j, value) in row.values.iter().enumerate() {
            worksheet.write_number(r, (j + 3) as u16, *value)?;
        }
    }

    workbook.save(path)?;
    info!(
        "wrote {} row(s) x {} date column(s) to {}",
        table.rows.len(),
        table.dates.len(),
        path.display()
    );
    Ok(())
}
