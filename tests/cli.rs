//! 命令行集成测试

use std::fs;

use assert_cmd::Command;

fn mathmark() -> Command {
    let mut cmd = Command::cargo_bin("mathmark").unwrap();
    cmd.env_remove("MATHMARK_TRANSLATOR_COMMAND")
        .env_remove("MATHMARK_LOG_LEVEL")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_mark_from_stdin() {
    let assert = mathmark()
        .arg("mark")
        .write_stdin("<p>Let ⁅x⁆ be</p>")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains(
        r#"<span class="unicodemathml-placeholder" data-unicodemath="x">⁅x⁆</span>"#
    ));
}

#[test]
fn test_mark_markdeep_unescapes_delimiters() {
    let assert = mathmark()
        .args(["mark", "--markdeep"])
        .write_stdin(r"\⁅literal\⁆ ⁅a+b⁆")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert_eq!(
        stdout,
        r#"⁅literal⁆ <span class="unicodemathml-placeholder" data-unicodemath="a%2Bb">⁅a+b⁆</span>"#
    );
}

#[test]
fn test_render_without_translator_fails() {
    let assert = mathmark()
        .args(["render", "--silent"])
        .write_stdin("<p>⁅x⁆</p>")
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();

    assert!(stderr.contains("no translator configured"));
}

#[test]
fn test_generate_config_writes_toml() {
    let path = std::env::temp_dir().join(format!("mathmark-cli-{}.toml", std::process::id()));

    mathmark()
        .arg("generate-config")
        .arg(&path)
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).ok();

    assert!(content.contains("show_progress = true"));
    assert!(content.contains("progress_interval_ms = 200"));
}

#[test]
fn test_env_docs_lists_variables() {
    let assert = mathmark().arg("env-docs").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("MATHMARK_PROGRESS_INTERVAL_MS"));
}
