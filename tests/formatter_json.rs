use ngdeps::extract::DependencyRecord;
use ngdeps::formatters::JsonRecordWriter;
use serde_json::Value;

fn records() -> Vec<DependencyRecord> {
    let mut app = DependencyRecord::new("AppComponent", "src/app.ts");
    app.directives = Some(vec!["Foo".into(), "Bar".into()]);
    app.providers = Some(vec!["Token1*".into()]);

    let mut view = DependencyRecord::new("AppComponent", "src/app.ts");
    view.template_url = Some(vec![]);

    vec![app, view, DependencyRecord::new("Shell", "src/shell.ts")]
}

#[test]
fn json_output_carries_meta_and_records() {
    let output = JsonRecordWriter::new().format_records(&records()).unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["meta"]["records"], 3);
    assert_eq!(value["meta"]["files"], 2);

    let records = value["records"].as_array().unwrap();
    assert_eq!(records[0]["name"], "AppComponent");
    assert_eq!(records[0]["directives"], serde_json::json!(["Foo", "Bar"]));
    assert_eq!(records[0]["providers"], serde_json::json!(["Token1*"]));

    // Absent categories are omitted; explicitly empty ones are kept.
    assert!(records[0].get("templateUrl").is_none());
    assert_eq!(records[1]["templateUrl"], serde_json::json!([]));
    assert!(records[2].get("directives").is_none());
}

#[test]
fn compact_output_is_single_line_and_round_trips() {
    let output = JsonRecordWriter::new()
        .with_pretty(false)
        .format_records(&records())
        .unwrap();
    assert!(!output.contains('\n'));

    let value: Value = serde_json::from_str(&output).unwrap();
    let parsed: Vec<DependencyRecord> = serde_json::from_value(value["records"].clone()).unwrap();
    assert_eq!(parsed, records());
}

#[test]
fn format_to_file_creates_parent_dirs() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("out/nested/deps.json");

    JsonRecordWriter::new()
        .format_to_file(&records(), &path)
        .unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["records"].as_array().unwrap().len(), 3);
}
