use calamine::{open_workbook_auto, Data, Reader};
use oildata_normalizer::{
    normalize_file, run_batch, stage_file, write_table, LoadOptions, NormalizeOptions,
};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

enum V {
    S(&'static str),
    N(f64),
}

fn write_sheet(path: &Path, cells: &[(u32, u16, V)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row, col, value) in cells {
        match value {
            V::S(s) => worksheet.write_string(*row, *col, *s).unwrap(),
            V::N(n) => worksheet.write_number(*row, *col, *n).unwrap(),
        };
    }
    workbook.save(path).unwrap();
}

/// A two-case report in the source template's shape: two preamble rows,
/// company names four rows above each "Year" marker, compound headers, and
/// the case label in the trailing column. Dates arrive out of order on
/// purpose.
fn write_report(path: &Path) {
    write_sheet(
        path,
        &[
            (0, 0, V::S("Reservoir Economics Report")),
            (1, 0, V::S("Date : 05/03/2024")),
            // First case block (grid rows after skip_rows=2).
            (2, 1, V::S("Acme Oil")),
            (6, 0, V::S("Year")),
            (6, 1, V::S("Oil Net\n(MSTB)")),
            (6, 2, V::S("Gas Net\n(MMCF)")),
            (6, 3, V::S("Costs Net\n(M$)")),
            (6, 4, V::S("Case")),
            (7, 0, V::S("01/02/2024")),
            (7, 1, V::N(1.2)),
            (7, 2, V::N(10.2)),
            (7, 3, V::N(100.2)),
            (7, 4, V::S("BASE")),
            (8, 0, V::S("01/01/2024")),
            (8, 1, V::N(1.1)),
            (8, 2, V::N(10.1)),
            (8, 3, V::N(100.1)),
            (8, 4, V::S("BASE")),
            (9, 0, V::S("Total")),
            (9, 1, V::N(2.3)),
            // Second case block, company left blank (forward-filled).
            (14, 0, V::S("Year")),
            (14, 1, V::S("Gas Net\n(MMCF)")),
            (14, 2, V::S("Oil Net\n(MSTB)")),
            (14, 4, V::S("Case")),
            (15, 0, V::S("01/03/2024")),
            (15, 1, V::N(20.3)),
            (15, 2, V::N(2.3)),
            (15, 4, V::S("HIGH")),
        ],
    );
}

fn options() -> NormalizeOptions {
    NormalizeOptions {
        load: LoadOptions {
            sheet: None,
            skip_rows: 2,
        },
        ..NormalizeOptions::default()
    }
}

fn read_first_sheet(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let sheet = workbook.sheet_names().first().cloned().unwrap();
    let range = workbook.worksheet_range(&sheet).unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

fn cell_text(rows: &[Vec<Data>], row: usize, col: usize) -> String {
    match &rows[row][col] {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[test]
fn test_normalize_report_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("economics.xlsx");
    write_report(&report);

    let table = normalize_file(&report, &options()).unwrap();

    // Two blocks: 3 keys + 2 keys.
    assert_eq!(table.rows.len(), 5);

    // Dates sorted chronologically across both blocks.
    let header = table.header();
    assert_eq!(
        header,
        vec!["CaseName", "ValueType", "Units", "01/01/2024", "01/02/2024", "01/03/2024"]
    );

    // Block one sorted by taxonomy: Oil Net, Gas Net, Costs Net.
    let labels: Vec<&str> = table.rows.iter().map(|r| r.value_type.as_str()).collect();
    assert_eq!(
        labels,
        ["Oil Net", "Gas Net", "Costs Net", "Oil Net", "Gas Net"]
    );
    assert_eq!(table.rows[0].case_name, "BASE");
    assert_eq!(table.rows[0].units, "MSTB");
    assert_eq!(table.rows[2].units, "M$");
    assert_eq!(table.rows[3].case_name, "HIGH");

    // Block one has no 01/03 observation: zero-filled. The "Total" row was
    // dropped, not summed in.
    assert_eq!(table.rows[0].values, vec![1.1, 1.2, 0.0]);
    assert_eq!(table.rows[2].values, vec![100.1, 100.2, 0.0]);
    // Block two only reports 01/03.
    assert_eq!(table.rows[3].values, vec![0.0, 0.0, 2.3]);
}

#[test]
fn test_written_workbook_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("economics.xlsx");
    write_report(&report);

    let table = normalize_file(&report, &options()).unwrap();
    let output = dir.path().join("out.xlsx");
    write_table(&table, &output).unwrap();

    let rows = read_first_sheet(&output);
    assert_eq!(rows.len(), 6);
    assert_eq!(cell_text(&rows, 0, 0), "CaseName");
    assert_eq!(cell_text(&rows, 0, 3), "01/01/2024");
    assert_eq!(cell_text(&rows, 1, 0), "BASE");
    assert_eq!(cell_text(&rows, 1, 1), "Oil Net");
    assert_eq!(cell_text(&rows, 1, 2), "MSTB");
    assert_eq!(rows[1][3], Data::Float(1.1));
    assert_eq!(rows[1][5], Data::Float(0.0));
}

#[test]
fn test_malformed_file_does_not_sink_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw");
    std::fs::create_dir_all(&input).unwrap();
    let processed = dir.path().join("processed");
    let curated = dir.path().join("curated");

    write_report(&input.join("good.xlsx"));
    // No marker rows anywhere: NoTablesFound for this file only.
    write_sheet(
        &input.join("broken.xlsx"),
        &[(0, 0, V::S("not a report")), (5, 2, V::N(1.0))],
    );

    let summary = run_batch(&input, &processed, &curated, &options()).unwrap();

    assert_eq!(summary.processed.len(), 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].error.contains("no case tables"));

    // The well-formed file's data appears fully in the aggregate output.
    let output = summary.output.expect("output workbook should exist");
    let rows = read_first_sheet(&output);
    assert_eq!(summary.rows_written, 5);
    assert_eq!(rows.len(), 6);

    // Inputs were staged out of the raw directory either way.
    assert!(oildata_normalizer::find_report_files(&input)
        .unwrap()
        .is_empty());
}

#[test]
fn test_staging_prefers_embedded_report_date() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("economics.xlsx");
    write_report(&report);
    let processed = dir.path().join("processed");

    let staged = stage_file(&report, &processed, &options().load).unwrap();
    let name = staged.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name, "2024-03-05_economics.xlsx");
    assert!(staged.exists());
    assert!(!report.exists());
}

#[test]
fn test_staging_falls_back_to_filesystem_date() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("undated.xlsx");
    write_sheet(&report, &[(0, 0, V::S("no date label here"))]);
    let processed = dir.path().join("processed");

    let staged = stage_file(&report, &processed, &options().load).unwrap();
    let name = staged.file_name().unwrap().to_string_lossy().into_owned();
    let (prefix, rest) = name.split_at(11);
    assert_eq!(rest, "undated.xlsx");
    assert!(
        chrono::NaiveDate::parse_from_str(&prefix[..10], "%Y-%m-%d").is_ok(),
        "prefix should be an ISO date, got {:?}",
        prefix
    );
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config: PathBuf = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{
            "load": {"skip_rows": 0},
            "layout": {"marker": "Period"},
            "taxonomy": ["Gas Net", "Oil Net"]
        }"#,
    )
    .unwrap();

    let options = NormalizeOptions::from_path(&config).unwrap();
    assert_eq!(options.load.skip_rows, 0);
    assert_eq!(options.layout.marker, "Period");
    assert_eq!(options.layout.net_value_cols, vec![1, 2, 3]);
    assert_eq!(options.taxonomy.rank("Gas Net"), Some(0));
}
