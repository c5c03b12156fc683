use std::io::Write;

use data_sweeper::data::{
    export, fill_missing_numeric, load_bytes, load_file, project, remove_duplicates, sweep,
    CellValue, CleaningOp, Column, ColumnKind, ColumnSelection, Dataset, ExportTarget,
    PipelineError, SweepOptions,
};

fn sample() -> Dataset {
    Dataset::from_columns(vec![
        Column::from_cells(
            "id",
            vec![
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::Integer(2),
                CellValue::Integer(3),
            ],
        ),
        Column::from_cells(
            "price",
            vec![
                CellValue::Float(9.5),
                CellValue::Null,
                CellValue::Null,
                CellValue::Float(0.25),
            ],
        ),
        Column::from_cells(
            "name",
            vec![
                CellValue::Text("apple".into()),
                CellValue::Text("pear, ripe".into()),
                CellValue::Text("pear, ripe".into()),
                CellValue::Null,
            ],
        ),
        Column::from_cells(
            "fresh",
            vec![
                CellValue::Bool(true),
                CellValue::Bool(false),
                CellValue::Bool(false),
                CellValue::Bool(true),
            ],
        ),
    ])
    .unwrap()
}

fn assert_same_cells(a: &Dataset, b: &Dataset) {
    assert_eq!(a.column_names(), b.column_names());
    assert_eq!(a.num_rows(), b.num_rows());
    for (ca, cb) in a.columns().iter().zip(b.columns()) {
        for (va, vb) in ca.values.iter().zip(&cb.values) {
            match (va.as_f64(), vb.as_f64()) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9, "{x} != {y}"),
                _ => assert_eq!(va, vb, "column {}", ca.name),
            }
        }
    }
}

#[test]
fn csv_round_trip_preserves_names_rows_and_values() {
    let original = sample();
    let file = export(&original, "fruit.csv", ExportTarget::Csv).unwrap();
    let reread = load_bytes(&file.file_name, &file.bytes).unwrap();
    assert_same_cells(&original, &reread);
    assert_eq!(reread.column("fresh").unwrap().kind, ColumnKind::Boolean);
}

#[test]
fn spreadsheet_round_trip_preserves_names_rows_and_values() {
    let original = sample();
    let file = export(&original, "fruit.csv", ExportTarget::Spreadsheet).unwrap();
    assert_eq!(file.file_name, "fruit.xlsx");
    let reread = load_bytes(&file.file_name, &file.bytes).unwrap();
    assert_same_cells(&original, &reread);
}

#[test]
fn duplicate_removal_scenario() {
    let ds = load_bytes("s.csv", b"A,B\n1,x\n1,x\n2,y\n").unwrap();
    let out = remove_duplicates(&ds);
    assert_eq!(out.num_rows(), 2);
    assert_eq!(
        out.row(0),
        vec![&CellValue::Integer(1), &CellValue::Text("x".into())]
    );
    assert_eq!(
        out.row(1),
        vec![&CellValue::Integer(2), &CellValue::Text("y".into())]
    );
    assert_eq!(remove_duplicates(&out), out);
}

#[test]
fn mean_fill_scenario() {
    // Blank lines are skipped by the reader, so the gap sits next to another field.
    let ds = load_bytes("s.csv", b"A,B\n2,a\n,b\n4,c\n").unwrap();
    let filled = fill_missing_numeric(&ds);
    let values: Vec<Option<f64>> = filled.columns()[0].values.iter().map(|v| v.as_f64()).collect();
    assert_eq!(values, vec![Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn nan_text_is_filled_and_exports_to_spreadsheet() {
    let ds = load_bytes("s.csv", b"A\n2\nNAN\n4\n").unwrap();
    let filled = fill_missing_numeric(&ds);
    let values: Vec<Option<f64>> = filled.columns()[0].values.iter().map(|v| v.as_f64()).collect();
    assert_eq!(values, vec![Some(2.0), Some(3.0), Some(4.0)]);
    let file = export(&filled, "s.csv", ExportTarget::Spreadsheet).unwrap();
    assert_eq!(file.file_name, "s.xlsx");
}

#[test]
fn fill_is_identity_without_gaps() {
    let ds = load_bytes("s.csv", b"A,B\n1,x\n2,y\n").unwrap();
    assert_eq!(fill_missing_numeric(&ds), ds);
}

#[test]
fn txt_upload_is_unsupported() {
    let err = load_bytes("data.txt", b"A\n1\n").unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
}

#[test]
fn single_row_csv_export_scenario() {
    let ds = load_bytes("data.csv", b"A,B\n1,x\n").unwrap();
    let file = export(&ds, "data.csv", ExportTarget::Csv).unwrap();
    assert_eq!(file.file_name, "data.csv");
    assert_eq!(file.mime, "text/csv");
}

#[test]
fn full_projection_is_identity() {
    let ds = sample();
    assert_eq!(project(&ds, &ColumnSelection::all(&ds)).unwrap(), ds);
}

#[test]
fn load_file_reads_from_disk() {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    tmp.write_all(b"city,temp\nOslo,-3.5\nLima,19\n").unwrap();
    let ds = load_file(tmp.path()).unwrap();
    assert_eq!(ds.num_rows(), 2);
    assert!(ds.column("temp").unwrap().is_numeric());
}

#[test]
fn load_file_rejects_extension_before_reading() {
    let err = load_file(std::path::Path::new("/does/not/exist.json")).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
}

#[test]
fn recipe_file_drives_a_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let recipe = dir.path().join("tidy.json");
    std::fs::write(
        &recipe,
        r#"{"cleaning": ["fill_missing_numeric", "remove_duplicates"], "columns": ["A"], "target": "xlsx"}"#,
    )
    .unwrap();
    let options = SweepOptions::from_path(&recipe).unwrap();
    assert_eq!(
        options.cleaning,
        vec![CleaningOp::FillMissingNumeric, CleaningOp::RemoveDuplicates]
    );

    let report = sweep("in.csv", b"A,B\n1,x\n1,x\n,y\n", &options).unwrap();
    assert_eq!(report.output.file_name, "in.xlsx");
    assert_eq!(report.rows_in, 3);
    assert_eq!(report.rows_out, 2);

    let reread = load_bytes(&report.output.file_name, &report.output.bytes).unwrap();
    assert_eq!(reread.column_names(), vec!["A"]);
    let values: Vec<Option<f64>> = reread.columns()[0].values.iter().map(|v| v.as_f64()).collect();
    assert_eq!(values, vec![Some(1.0), Some(1.0)]);
}
