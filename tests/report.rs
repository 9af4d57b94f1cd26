use chrono::NaiveDate;
use loading_report::filter::select_rows;
use loading_report::model::{FieldRole, Group, GroupedReport, RawTable, Record, Table};
use loading_report::render::{ColumnSpec, Layout, RenderConfig, fixed_width_line, render};
use loading_report::resolve::SynonymTable;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    Table::from_raw(RawTable {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
    })
}

fn record(party: &str, material: &str, qty: &str) -> Record {
    Record::from_pairs([("PARTY", party), ("MATERIAL", material), ("QTY", qty)])
}

fn three_column_config() -> RenderConfig {
    RenderConfig {
        columns: vec![
            ColumnSpec::new(FieldRole::Party, 10),
            ColumnSpec::new(FieldRole::Material, 10),
            ColumnSpec::new(FieldRole::Quantity, 5),
        ],
        ..RenderConfig::default()
    }
}

#[test]
fn table_without_date_column_is_returned_unchanged() {
    let source = table(&["PARTY", "QTY"], &[&["Acme", "10"], &["Bolt", "4"]]);
    let selected = select_rows(source.clone(), date(2024, 6, 2), false);
    assert_eq!(selected, source);
}

#[test]
fn matching_rows_keep_their_order() {
    let source = table(
        &["PARTY", "Loading Date"],
        &[
            &["a", "2024-06-02"],
            &["b", "2024-06-03"],
            &["c", "06/02/2024"],
            &["d", "not a date"],
        ],
    );
    let selected = select_rows(source, date(2024, 6, 2), false);
    let parties: Vec<_> = selected.rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(parties, vec!["a", "c"]);
}

#[test]
fn second_date_column_is_used_only_when_first_has_no_match() {
    let target = date(2024, 6, 2);

    let fall_through = table(
        &["Order Date", "Loading Date", "PARTY"],
        &[&["2024-05-01", "2024-06-02", "a"], &["2024-05-02", "2024-06-05", "b"]],
    );
    let selected = select_rows(fall_through, target, false);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected.rows()[0][2], "a");

    let short_circuit = table(
        &["Order Date", "Loading Date", "PARTY"],
        &[&["2024-06-02", "2024-06-09", "a"], &["2024-05-02", "2024-06-02", "b"]],
    );
    let selected = select_rows(short_circuit, target, false);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected.rows()[0][2], "a");
}

#[test]
fn unmatched_date_columns_give_empty_table_with_labels() {
    let source = table(&["PARTY", "DATE"], &[&["a", "2024-01-01"]]);
    let selected = select_rows(source, date(2024, 6, 2), false);
    assert!(selected.is_empty());
    assert_eq!(selected.columns(), ["PARTY", "DATE"]);
}

#[test]
fn fixed_width_line_pads_without_delimiters() {
    let config = three_column_config();
    let values = vec!["Acme".to_string(), "Steel".to_string(), "10".to_string()];
    assert_eq!(fixed_width_line(&values, &config), "Acme      Steel     10   ");
}

#[test]
fn scenario_with_empty_group_and_total() {
    let report = GroupedReport::new(vec![
        Group {
            name: "A".into(),
            records: vec![
                record("Acme", "Steel", "10"),
                record("Bolt", "Wire", "4"),
                record("Crane", "Pipe", "7"),
            ],
        },
        Group {
            name: "B".into(),
            records: Vec::new(),
        },
    ]);
    let config = three_column_config();
    let document = render(&report, &config, &SynonymTable::default(), date(2024, 6, 2));
    let text = document.to_text();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "NEXT-DAY LOADING REPORT");
    assert_eq!(lines[1], "Date: 2024-06-02");

    let a = lines.iter().position(|line| *line == "A").expect("A section");
    assert_eq!(lines[a + 1], "PARTY     MATERIAL  QTY  ");
    assert_eq!(lines[a + 2], "-".repeat(25));
    assert_eq!(lines[a + 3], "Acme      Steel     10   ");
    assert_eq!(lines[a + 5], "Crane     Pipe      7    ");

    let b = lines.iter().position(|line| *line == "B").expect("B section");
    assert_eq!(lines[b + 1], "No items");

    assert_eq!(lines.last(), Some(&"Total Items: 3"));
    assert_eq!(document.total, 3);
    assert_eq!(document.sections[1].rendered, 0);
}

#[test]
fn ceiling_limits_rendered_rows_and_total() {
    let records = (1..=5)
        .map(|n| record(&format!("p{n}"), "Steel", "1"))
        .collect();
    let report = GroupedReport::new(vec![Group {
        name: "north".into(),
        records,
    }]);
    let config = RenderConfig {
        max_rows_per_group: 2,
        ..three_column_config()
    };
    let document = render(&report, &config, &SynonymTable::default(), date(2024, 6, 2));

    let section = &document.sections[0];
    assert_eq!(section.heading, "NORTH");
    assert_eq!(section.rendered, 2);
    assert_eq!(section.omitted, 3);
    // heading row, rule, two data rows
    assert_eq!(section.lines.len(), 4);
    assert_eq!(document.total, 2);
    assert!(document.to_text().ends_with("Total Items: 2"));
}

#[test]
fn overflow_note_is_opt_in() {
    let records = (1..=3).map(|n| record(&format!("p{n}"), "", "")).collect();
    let report = GroupedReport::new(vec![Group {
        name: "g".into(),
        records,
    }]);
    let config = RenderConfig {
        max_rows_per_group: 1,
        overflow_note: true,
        ..three_column_config()
    };
    let document = render(&report, &config, &SynonymTable::default(), date(2024, 6, 2));
    assert_eq!(
        document.sections[0].lines.last().map(String::as_str),
        Some("(showing first 1 of 3)")
    );
    assert_eq!(document.total, 1);
}

#[test]
fn bullet_layout_skips_blank_optional_fields() {
    let report = GroupedReport::new(vec![Group {
        name: "Redhills".into(),
        records: vec![
            Record::from_pairs([
                ("Party", "Acme"),
                ("Material", "Steel"),
                ("Approx Qty", "10"),
                ("Rate / Kg", "52"),
            ]),
            Record::from_pairs([
                ("PARTY", "Bolt"),
                ("MATERIAL", "Wire"),
                ("QTY", "4"),
                ("RATE", ""),
            ]),
        ],
    }]);
    let config = RenderConfig {
        layout: Layout::Bullet,
        columns: vec![
            ColumnSpec::new(FieldRole::Party, 10),
            ColumnSpec::new(FieldRole::Material, 10),
            ColumnSpec::new(FieldRole::Quantity, 5),
            ColumnSpec::new(FieldRole::Rate, 5).optional(),
        ],
        ..RenderConfig::default()
    };
    let document = render(&report, &config, &SynonymTable::default(), date(2024, 6, 2));
    assert_eq!(
        document.sections[0].lines,
        vec!["• Acme — Steel — 10 — 52", "• Bolt — Wire — 4"]
    );
}

#[test]
fn bullet_layout_has_no_heading_row() {
    let report = GroupedReport::new(vec![Group {
        name: "north".into(),
        records: vec![record("Acme", "Steel", "10")],
    }]);
    let config = RenderConfig {
        layout: Layout::Bullet,
        ..three_column_config()
    };
    let document = render(&report, &config, &SynonymTable::default(), date(2024, 6, 2));
    let section = &document.sections[0];
    assert_eq!(section.lines, vec!["• Acme — Steel — 10"]);

    let text = document.to_text();
    let lines: Vec<&str> = text.lines().collect();
    let heading = lines.iter().position(|line| *line == "NORTH").expect("section");
    assert_eq!(lines[heading + 1], "• Acme — Steel — 10");
    assert!(!lines.iter().any(|line| line.starts_with("PARTY")));
}

#[test]
fn unmapped_roles_render_blank() {
    let report = GroupedReport::new(vec![Group {
        name: "g".into(),
        records: vec![Record::from_pairs([("PARTY", "Acme")])],
    }]);
    let document = render(
        &report,
        &three_column_config(),
        &SynonymTable::default(),
        date(2024, 6, 2),
    );
    assert_eq!(document.sections[0].lines[2], format!("Acme{}", " ".repeat(21)));
}

#[test]
fn rendering_is_repeatable() {
    let report = GroupedReport::new(vec![
        Group {
            name: "b".into(),
            records: vec![record("Acme", "Steel", "10")],
        },
        Group {
            name: "a".into(),
            records: vec![record("Bolt", "Wire", "4")],
        },
    ]);
    let config = RenderConfig::default();
    let synonyms = SynonymTable::default();
    let first = render(&report, &config, &synonyms, date(2024, 6, 2)).to_text();
    let second = render(&report, &config, &synonyms, date(2024, 6, 2)).to_text();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert!(first.find("\nB\n").expect("b") < first.find("\nA\n").expect("a"));
}

#[test]
fn empty_report_still_has_total_line() {
    let document = render(
        &GroupedReport::default(),
        &RenderConfig::default(),
        &SynonymTable::default(),
        date(2024, 6, 2),
    );
    assert_eq!(document.total, 0);
    assert_eq!(document.to_text().lines().last(), Some("Total Items: 0"));
}
