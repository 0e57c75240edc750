mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use csv_mare::{AggregationType, MappingPreset, PresetLibrary};
use predicates::{prelude::PredicateBooleanExt, str::contains};

const ORDERS_CSV: &str = "\
customer,product,qty,ordered_at
acme,bolts,10,2024-03-09
acme,nuts,4,2024-01-15
globex,gears,7,2023-12-31
acme,bolts,,2024-02-01
";

const ORDERS_MAPPING: &str = r#"{
  "headings": [
    {"type": "Distinct values", "label": "Customer"},
    {"type": "Distinct values", "label": "Products"},
    {"type": "Number range", "label": "Quantity"},
    {"type": "Max date", "label": "Last order"}
  ],
  "mappings": {"0": [null, [1], [2], [3]]}
}"#;

fn csv_mare() -> Command {
    Command::cargo_bin("csv-mare").expect("binary exists")
}

#[test]
fn headings_lists_column_indices() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    csv_mare()
        .args(["headings", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("column  heading"))
        .stdout(contains("2       qty"))
        .stdout(contains("ordered_at"));
}

#[test]
fn reshape_writes_aggregated_csv() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    let mapping = ws.write("mapping.json", ORDERS_MAPPING);
    let output = ws.file("out.csv");
    csv_mare()
        .args([
            "reshape",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        ws.read("out.csv"),
        "Customer,Products,Quantity,Last order\n\
         acme,bolts; nuts,4-10,2024-03-09\n\
         globex,gears,7-7,2023-12-31\n"
    );
}

#[test]
fn reshape_streams_to_stdout_and_honours_skip_rows() {
    let ws = TestWorkspace::new();
    let input = ws.write(
        "report.tsv",
        "Quarterly export\nregion\tstore\nnorth\ts1\nnorth\ts2\nsouth\ts3\n",
    );
    let mapping = ws.write(
        "mapping.json",
        r#"{"headings":[{"type":"Distinct values","label":"Region"},{"type":"Distinct count","label":"Stores"}],
            "mappings":{"0":[null,[1]]}}"#,
    );
    csv_mare()
        .args([
            "reshape",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--skip-rows",
            "1",
        ])
        .assert()
        .success()
        .stdout("Region\tStores\nnorth\t2\nsouth\t1\n");
}

#[test]
fn reshape_auto_output_names_file_after_input() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    let mapping = ws.write("mapping.json", ORDERS_MAPPING);
    csv_mare()
        .args([
            "reshape",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--auto-output",
        ])
        .assert()
        .success();
    assert!(ws.read("mare-orders.csv").starts_with("Customer,Products"));
}

#[test]
fn reshape_table_preview_renders_rows() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    let mapping = ws.write("mapping.json", ORDERS_MAPPING);
    csv_mare()
        .args([
            "reshape",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--table",
        ])
        .assert()
        .success()
        .stdout(contains("Customer  Products"))
        .stdout(contains("globex    gears"));
}

#[test]
fn reshape_requires_a_mapping_source() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    csv_mare()
        .args(["reshape", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("--mapping"));
}

#[test]
fn mapping_directives_build_a_preset_file() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    let mapping = ws.file("built.json");
    csv_mare()
        .args([
            "mapping",
            "-m",
            mapping.to_str().unwrap(),
            "--op",
            "label=0:Customer",
            "--op",
            "add-key=0",
            "--op",
            "add-heading=Spend:min-number",
            "--op",
            "map=0:1:2",
            "--preview",
            input.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Customer  Spend"))
        .stdout(contains("acme      4"));

    let preset = MappingPreset::load_json(&mapping).expect("load built preset");
    assert_eq!(preset.headings.len(), 2);
    assert_eq!(preset.headings[1].kind, AggregationType::MinNumber);
    assert_eq!(preset.mappings[&0].sources(1), &[2]);
}

#[test]
fn mapping_preview_follows_read_options() {
    let ws = TestWorkspace::new();
    let input = ws.write(
        "report.tsv",
        "Quarterly export\nregion\tstore\nnorth\ts1\nnorth\ts2\nsouth\ts3\n",
    );
    let mapping = ws.file("stores.json");
    csv_mare()
        .args([
            "mapping",
            "-m",
            mapping.to_str().unwrap(),
            "--op",
            "add-key=0",
            "--op",
            "add-heading=Stores:distinct-count",
            "--op",
            "map=0:1:1",
            "--preview",
            input.to_str().unwrap(),
            "--skip-rows",
            "1",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(contains("north  2"))
        .stdout(contains("south  1"))
        .stdout(contains("region").not());
    assert!(!mapping.exists());
}

#[test]
fn mapping_reports_invalid_directives() {
    let ws = TestWorkspace::new();
    let mapping = ws.file("broken.json");
    csv_mare()
        .args([
            "mapping",
            "-m",
            mapping.to_str().unwrap(),
            "--op",
            "map=3:1:1",
        ])
        .assert()
        .failure()
        .stderr(contains("map=3:1:1").and(contains("No mapping exists for identity key 3")));
    assert!(!mapping.exists());
}

#[test]
fn preset_library_round_trip() {
    let ws = TestWorkspace::new();
    let mapping = ws.write("mapping.json", ORDERS_MAPPING);
    let library = ws.file("presets.yml");
    let exported = ws.file("exported.json");
    let library_arg = library.to_str().unwrap();

    csv_mare()
        .args(["preset", "-l", library_arg, "save", "-n", "orders"])
        .args(["-m", mapping.to_str().unwrap()])
        .assert()
        .success();
    csv_mare()
        .args(["preset", "-l", library_arg, "list"])
        .assert()
        .success()
        .stdout(contains("orders"));

    let stored = PresetLibrary::load(&library).expect("load library");
    assert_eq!(
        stored.get("orders"),
        Some(&MappingPreset::from_json_str(ORDERS_MAPPING).unwrap())
    );

    csv_mare()
        .args(["preset", "-l", library_arg, "export", "-n", "orders"])
        .args(["-o", exported.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(
        MappingPreset::load_json(&exported).unwrap(),
        MappingPreset::from_json_str(ORDERS_MAPPING).unwrap()
    );

    csv_mare()
        .args(["preset", "-l", library_arg, "delete", "-n", "orders"])
        .assert()
        .success();
    csv_mare()
        .args(["preset", "-l", library_arg, "delete", "-n", "orders"])
        .assert()
        .failure()
        .stderr(contains("Preset 'orders' not found"));
}

#[test]
fn reshape_uses_stored_preset() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    let library = ws.file("presets.yml");
    let mut presets = PresetLibrary::default();
    presets.insert("orders", MappingPreset::from_json_str(ORDERS_MAPPING).unwrap());
    presets.save(&library).expect("save library");

    csv_mare()
        .args([
            "reshape",
            "-i",
            input.to_str().unwrap(),
            "-l",
            library.to_str().unwrap(),
            "-p",
            "orders",
        ])
        .assert()
        .success()
        .stdout(contains("globex,gears,7-7,2023-12-31"));
}

#[test]
fn reshape_names_stored_presets_when_one_is_missing() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", ORDERS_CSV);
    let library = ws.file("presets.yml");
    let mut presets = PresetLibrary::default();
    presets.insert("orders", MappingPreset::from_json_str(ORDERS_MAPPING).unwrap());
    presets.save(&library).expect("save library");

    csv_mare()
        .args([
            "reshape",
            "-i",
            input.to_str().unwrap(),
            "-l",
            library.to_str().unwrap(),
            "-p",
            "invoices",
        ])
        .assert()
        .failure()
        .stderr(contains("Preset 'invoices' not found").and(contains("(available: orders)")));
}
