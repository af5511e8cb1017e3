use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_modeldoc")))
}

const ORDER_RS: &str = r#"
/// Customer order.
/// @xmlRoot order
/// @xmlEncoding UTF-8
#[derive(Debug, Default)]
pub struct OrderModel {
    /// @name orderId
    /// @attribute
    /// @required
    pub id: u64,
    /// @var string[]|null
    /// @rule length(1, 20)
    pub tags: Vec<String>,
    pub total: Option<f64>,
}

/// Marker without fields.
pub struct Draft;
"#;

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

// -- stdin mode --

#[test]
fn stdin_mode_produces_json() {
    let assert = cmd().write_stdin(ORDER_RS).assert().success();
    let json: serde_json::Value = serde_json::from_str(&stdout_of(&assert)).unwrap();

    assert_eq!(json.as_array().unwrap().len(), 1);
    let order = &json[0];
    assert_eq!(order["class_name"], "OrderModel");
    assert_eq!(order["root_name"], "order");
    assert_eq!(order["root_encoding"], "UTF-8");

    let props = order["properties"].as_array().unwrap();
    let names: Vec<_> = props.iter().map(|p| p["declared_name"].as_str().unwrap()).collect();
    assert_eq!(names, ["id", "tags", "total"]);

    assert_eq!(props[0]["external_name"], "orderId");
    assert_eq!(props[0]["is_attribute"], true);
    assert_eq!(props[0]["required_contexts"], serde_json::json!([""]));
    assert_eq!(props[0]["type"]["base_type"], "integer");

    assert_eq!(props[1]["type"]["base_type"], "string");
    assert_eq!(props[1]["type"]["is_array"], true);
    assert_eq!(props[1]["type"]["is_nullable"], true);
    assert_eq!(props[1]["rule_specs"][0]["args"], serde_json::json!(["1", "20"]));

    assert_eq!(props[2]["type"]["base_type"], "float");
    assert_eq!(props[2]["type"]["is_nullable"], true);
    assert_eq!(props[2]["is_required"], false);
}

#[test]
fn stdin_mode_warns_about_fieldless_structs() {
    cmd()
        .write_stdin(ORDER_RS)
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping Draft"))
        .stderr(predicate::str::contains("has no properties defined"));
}

#[test]
fn stdin_mode_namespace_flag() {
    let assert = cmd()
        .args(["-n", "shop"])
        .write_stdin(ORDER_RS)
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_str(&stdout_of(&assert)).unwrap();
    assert_eq!(json[0]["class_name"], "shop::OrderModel");
    assert_eq!(json[0]["properties"][0]["parent_class_name"], "shop::OrderModel");
    assert_eq!(json[0]["properties"][0]["type"]["source_namespace"], "shop");
}

#[test]
fn stdin_mode_markdown() {
    cmd()
        .args(["-f", "markdown"])
        .write_stdin(ORDER_RS)
        .assert()
        .success()
        .stdout(predicate::str::contains("### OrderModel"))
        .stdout(predicate::str::contains("| id | @orderId | `integer` | yes |  |"));
}

#[test]
fn unknown_format_fails() {
    cmd()
        .args(["-f", "xml"])
        .write_stdin(ORDER_RS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: xml"));
}

// -- file mode --

#[test]
fn file_mode_creates_output() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(src.path().join("order.rs"), ORDER_RS).unwrap();
    std::fs::write(src.path().join("util.rs"), "pub fn helper() {}\n").unwrap();

    cmd()
        .args(["-o", out.path().to_str().unwrap()])
        .arg(src.path())
        .assert()
        .success();

    let output = std::fs::read_to_string(out.path().join("order.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json[0]["class_name"], "order::OrderModel");
    assert!(!out.path().join("util.json").exists());
}

#[test]
fn file_mode_with_glob_and_markdown() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(src.path().join("order.rs"), ORDER_RS).unwrap();

    let pattern = format!("{}/*.rs", src.path().display());
    cmd()
        .args(["-o", out.path().to_str().unwrap(), "-f", "md"])
        .arg(pattern)
        .assert()
        .success();

    let output = std::fs::read_to_string(out.path().join("order.md")).unwrap();
    assert!(output.contains("### order::OrderModel"));
    assert!(output.contains("* Encoding: `UTF-8`"));
}

#[test]
fn file_mode_requires_output() {
    let src = TempDir::new().unwrap();
    let file = src.path().join("order.rs");
    std::fs::write(&file, ORDER_RS).unwrap();

    cmd()
        .arg(file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn file_mode_warns_on_unmatched_glob() {
    let out = TempDir::new().unwrap();
    cmd()
        .args(["-o", out.path().to_str().unwrap()])
        .arg("/nonexistent/dir/*.rs")
        .assert()
        .success()
        .stderr(predicate::str::contains("no files matched"));
}
