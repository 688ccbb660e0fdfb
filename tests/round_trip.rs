use sales_dashboard::{
    Config, Dashboard, DashboardError, GridSnapshot, Schema, Storage, Summary, Table, Value,
    format_euro, merge_annotations,
};
use std::path::Path;

fn config_in(dir: &Path, extension: &str) -> Config {
    Config {
        primary_path: dir.join(format!("supermarkt_sales.{}", extension)),
        annotations_path: dir.join(format!("opmerkingen.{}", extension)),
        ..Config::default()
    }
}

fn seed_sales(config: &Config) -> Table {
    let mut sales = Table::with_columns(&["Invoice ID", "Branch", "Quantity", "Total"]);
    sales.push_row(vec!["A1".into(), "A".into(), 7.0.into(), 10.0.into()]);
    sales.push_row(vec!["A2".into(), "C".into(), 5.0.into(), 20.0.into()]);
    Storage::from_config(config).save_primary(&sales).unwrap();
    sales
}

fn set_note(view: &Table, id: &str, note: &str) -> Table {
    let mut edited = view.clone();
    let key = edited.column_index("Invoice ID").unwrap();
    let col = edited.column_index("Opmerkingen").unwrap();
    for row in &mut edited.rows {
        if row[key] == Value::from(id) {
            row[col] = Value::from(note);
        }
    }
    edited
}

#[test]
fn fresh_dataset_has_empty_notes_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config);

    let view = dashboard.view().unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view.columns.last().map(String::as_str), Some("Opmerkingen"));
    assert!(view.column_values("Opmerkingen").all(|v| *v == Value::from("")));

    let summary = Summary::of(&view, &Schema::default());
    assert_eq!(summary.record_count, 2);
    assert_eq!(summary.column_count, 5);
    assert_eq!(format_euro(summary.total_sales.unwrap()), "€30.00");
}

#[test]
fn note_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    let sales = seed_sales(&config);
    let mut dashboard = Dashboard::new(config.clone());

    let view = dashboard.view().unwrap();
    let report = dashboard
        .save_table(&set_note(&view, "A1", "follow up"))
        .unwrap();
    assert_eq!(
        report.saved_annotations.rows,
        vec![vec![Value::from("A1"), Value::from("follow up")]]
    );

    let storage = Storage::from_config(&config);
    let annotations = storage.load_annotations().unwrap();
    assert_eq!(annotations.columns, vec!["Invoice ID", "Opmerkingen"]);
    assert_eq!(
        annotations.rows,
        vec![vec![Value::from("A1"), Value::from("follow up")]]
    );

    let reloaded = dashboard.view().unwrap();
    assert_eq!(reloaded.cell(0, "Opmerkingen"), Some(&Value::from("follow up")));
    assert_eq!(reloaded.cell(1, "Opmerkingen"), Some(&Value::from("")));

    // primary data itself is unchanged apart from the note column
    let primary = storage.load_primary().unwrap().without_column("Opmerkingen");
    assert_eq!(primary, sales);
}

// Notes are stored as written. Wide notes stay below Excel's 32,767 character
// cell limit; a longer note fails the xlsx save with `FileWrite`.
#[test]
fn multiline_and_wide_notes_are_preserved() {
    let wide = format!(
        "eerste regel\ntweede regel, met \"quotes\"\n{}",
        "breed ".repeat(400)
    );
    let notes = [
        wide.as_str(),
        "1.50",
        "TRUE",
        "2019-01-05 13:08:00",
        "1e3",
        "0012",
        "   ",
    ];
    for extension in ["xlsx", "csv"] {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), extension);
        seed_sales(&config);
        let mut dashboard = Dashboard::new(config);

        for note in notes {
            let view = dashboard.view().unwrap();
            dashboard.save_table(&set_note(&view, "A2", note)).unwrap();

            let reloaded = dashboard.view().unwrap();
            assert_eq!(
                reloaded.cell(1, "Opmerkingen"),
                Some(&Value::from(note)),
                "{} changed the note {:?}",
                extension,
                note
            );
        }
    }
}

#[test]
fn whitespace_only_note_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config.clone());

    let view = dashboard.view().unwrap();
    let report = dashboard.save_table(&set_note(&view, "A1", "   ")).unwrap();
    assert_eq!(report.saved_annotations.len(), 1);

    let annotations = Storage::from_config(&config).load_annotations().unwrap();
    assert_eq!(
        annotations.rows,
        vec![vec![Value::from("A1"), Value::from("   ")]]
    );
    assert_eq!(
        dashboard.view().unwrap().cell(0, "Opmerkingen"),
        Some(&Value::from("   "))
    );
}

#[test]
fn note_beyond_xlsx_cell_limit_fails_the_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config.clone());
    let before = std::fs::read(&config.primary_path).unwrap();

    let view = dashboard.view().unwrap();
    let too_long = "x".repeat(32_768);
    assert!(matches!(
        dashboard.save_table(&set_note(&view, "A1", &too_long)),
        Err(DashboardError::FileWrite { .. })
    ));
    assert_eq!(std::fs::read(&config.primary_path).unwrap(), before);
    assert!(!config.annotations_path.exists());
}

#[test]
fn text_column_with_dates_in_it_survives_a_page_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    let mut sales = Table::with_columns(&["Invoice ID", "Code", "Total"]);
    sales.push_row(vec!["A1".into(), "2019-01-05T13:08:00".into(), 10.0.into()]);
    sales.push_row(vec!["A2".into(), "B-17".into(), 20.0.into()]);
    Storage::from_config(&config).save_primary(&sales).unwrap();
    let mut dashboard = Dashboard::new(config);

    let view = dashboard.view().unwrap();
    dashboard.save(GridSnapshot::from_table(&view)).unwrap();

    let reloaded = dashboard.view().unwrap();
    assert_eq!(
        reloaded.cell(0, "Code"),
        Some(&Value::from("2019-01-05T13:08:00"))
    );
}

#[test]
fn saving_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "csv");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config.clone());

    let view = dashboard.view().unwrap();
    dashboard.save_table(&set_note(&view, "A1", "follow up")).unwrap();
    let primary_first = std::fs::read(&config.primary_path).unwrap();
    let notes_first = std::fs::read(&config.annotations_path).unwrap();

    let view = dashboard.view().unwrap();
    dashboard.save_table(&view).unwrap();
    assert_eq!(std::fs::read(&config.primary_path).unwrap(), primary_first);
    assert_eq!(std::fs::read(&config.annotations_path).unwrap(), notes_first);
}

#[test]
fn xlsx_resave_keeps_contents() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config.clone());
    let storage = Storage::from_config(&config);

    let view = dashboard.view().unwrap();
    dashboard.save_table(&set_note(&view, "A2", "later")).unwrap();
    let primary_first = storage.load_primary().unwrap();
    let notes_first = storage.load_annotations().unwrap();

    let view = dashboard.view().unwrap();
    dashboard.save_table(&view).unwrap();
    assert_eq!(storage.load_primary().unwrap(), primary_first);
    assert_eq!(storage.load_annotations().unwrap(), notes_first);
}

#[test]
fn clearing_a_note_removes_it_from_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config.clone());

    let view = dashboard.view().unwrap();
    dashboard.save_table(&set_note(&view, "A1", "tmp")).unwrap();
    let view = dashboard.view().unwrap();
    dashboard.save_table(&set_note(&view, "A1", "")).unwrap();

    let annotations = Storage::from_config(&config).load_annotations().unwrap();
    assert!(annotations.is_empty());
    assert!(dashboard
        .view()
        .unwrap()
        .column_values("Opmerkingen")
        .all(Value::is_empty));
}

#[test]
fn snapshot_from_page_is_saved_in_display_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    let mut dashboard = Dashboard::new(config);

    let snapshot: GridSnapshot = serde_json::from_value(serde_json::json!({
        "columns": ["Invoice ID", "Branch", "Quantity", "Total", "Opmerkingen"],
        "rows": [
            ["A2", "C", 5.0, 20.0, "sorted first"],
            ["A1", "A", 7.0, 10.0, ""]
        ]
    }))
    .unwrap();
    dashboard.save(snapshot).unwrap();

    let view = dashboard.view().unwrap();
    assert_eq!(view.cell(0, "Invoice ID"), Some(&Value::from("A2")));
    assert_eq!(view.cell(0, "Opmerkingen"), Some(&Value::from("sorted first")));
}

#[test]
fn merged_rows_match_primary_rows_for_unique_keys() {
    let mut primary = Table::with_columns(&["Invoice ID", "Total"]);
    for i in 0..250 {
        primary.push_row(vec![format!("INV-{:04}", i).into(), (i as f64).into()]);
    }
    let mut notes = Table::with_columns(&["Invoice ID", "Opmerkingen"]);
    for i in (0..250).step_by(7) {
        notes.push_row(vec![format!("INV-{:04}", i).into(), "gecontroleerd".into()]);
    }

    let merged = merge_annotations(&primary, &notes, &Schema::default());
    assert_eq!(merged.len(), primary.len());
    let annotated = merged
        .column_values("Opmerkingen")
        .filter(|v| !v.is_empty())
        .count();
    assert_eq!(annotated, notes.len());
}

#[test]
fn corrupt_annotations_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "xlsx");
    seed_sales(&config);
    std::fs::write(&config.annotations_path, b"not a workbook").unwrap();
    let mut dashboard = Dashboard::new(config);

    assert!(matches!(
        dashboard.view(),
        Err(DashboardError::FileRead { .. })
    ));
}
