//! End-to-end resolution through the front-end library API.

use anyhow::{Result, anyhow, ensure};
use boot_config_cli::cli::{Args, Assignment};
use boot_config_cli::error::CliError;
use boot_config_cli::resolve;
use boot_config_cli::settings::Settings;
use clap::Parser;
use rstest::rstest;
use serde_json::{Value, json};
use test_helpers::fragments::{FragmentDir, base_conf_dir, corpus_conf_dirs, run_file};

fn corpus_settings() -> Settings {
    Settings {
        conf_dirs: corpus_conf_dirs(),
        run_file: Some(run_file()),
        pretty: false,
    }
}

fn parse(argv: &[&str]) -> Args {
    Args::parse_from(std::iter::once("boot-config").chain(argv.iter().copied()))
}

#[rstest]
#[case("node.shell-port=16000", "node.shell-port", json!(16000))]
#[case("transport=http", "transport", json!("http"))]
#[case("node.top-composer=false", "node.top-composer", json!(false))]
#[case("list=[\"http\", \"xmpp\",]", "list", json!(["http", "xmpp"]))]
#[case("label=a=b", "label", json!("a=b"))]
#[case("empty=", "empty", json!(""))]
fn parses_assignments(#[case] text: &str, #[case] path: &str, #[case] value: Value) -> Result<()> {
    let assignment: Assignment = text.parse().map_err(|err: String| anyhow!(err))?;
    ensure!(assignment.path == path && assignment.value == value, "{assignment:?}");
    Ok(())
}

#[rstest]
#[case("no-equals")]
#[case("=value")]
fn rejects_malformed_assignments(#[case] text: &str) {
    assert!(text.parse::<Assignment>().is_err(), "{text} should be rejected");
}

#[test]
fn single_root_prints_its_document() -> Result<()> {
    let args = parse(&["boot-osgi.js", "--set", "node.shell-port=7000"]);
    let resolved = resolve(&args, &corpus_settings())?;
    let port = resolved
        .get("composition")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|shell| shell.pointer("/properties/pelix.shell.port"))
        .cloned();
    ensure!(port == Some(json!(7000)), "unexpected port in {resolved}");
    Ok(())
}

#[test]
fn several_roots_are_keyed_by_name() -> Result<()> {
    let args = parse(&["herald/java-transport.js", "boot-java.js", "--set", "transport=xmpp"]);
    let resolved = resolve(&args, &corpus_settings())?;
    let Some(object) = resolved.as_object() else {
        return Err(anyhow!("expected an object, got {resolved}"));
    };
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    ensure!(keys == ["herald/java-transport.js", "boot-java.js"]);
    ensure!(
        resolved.pointer("/herald~1java-transport.js/bundles") == Some(&json!([{"name": "org.cohorte.herald.xmpp"}])),
        "unexpected transport bundles in {resolved}"
    );
    Ok(())
}

#[test]
fn duplicate_roots_are_rejected() {
    let args = parse(&["boot-java.js", "boot-java.js"]);
    let outcome = resolve(&args, &corpus_settings());
    assert!(matches!(outcome, Err(CliError::DuplicateRoot(root)) if root == "boot-java.js"));
}

#[test]
fn composition_errors_surface_unchanged() -> Result<()> {
    let dir = FragmentDir::with_fragments(&[("loop.js", r#"{ "$merge": "loop.js" }"#)])?;
    let settings = Settings {
        conf_dirs: vec![dir.path().to_path_buf()],
        run_file: None,
        pretty: false,
    };
    let err = match resolve(&parse(&["loop.js"]), &settings) {
        Ok(value) => return Err(anyhow!("unexpected success {value}")),
        Err(err) => err,
    };
    ensure!(
        err.to_string() == "cyclic reference detected: loop.js -> loop.js",
        "unexpected error {err}"
    );
    Ok(())
}

#[test]
fn base_directory_alone_lacks_home_fragments() {
    let settings = Settings {
        conf_dirs: vec![base_conf_dir()],
        run_file: None,
        pretty: false,
    };
    let outcome = resolve(&parse(&["python-monitor.js"]), &settings);
    assert!(matches!(outcome, Err(CliError::Boot(_))));
}

#[test]
fn missing_run_file_is_reported_with_its_path() -> Result<()> {
    let dir = FragmentDir::with_fragments(&[("boot.js", "{}")])?;
    let run = dir.path().join("launch/run.js");
    let settings = Settings {
        conf_dirs: vec![dir.path().to_path_buf()],
        run_file: Some(run.clone()),
        pretty: false,
    };
    match resolve(&parse(&["boot.js"]), &settings) {
        Err(CliError::Io { path, .. }) => {
            ensure!(path == run, "reported {path}");
            Ok(())
        }
        other => Err(anyhow!("expected an I/O error, got {other:?}")),
    }
}

#[test]
fn run_file_beside_the_fragments_feeds_placeholders() -> Result<()> {
    let dir = FragmentDir::with_fragments(&[
        ("boot.js", r#"{ "properties": { "port": "${run:node.shell-port}" } }"#),
        ("run.js", "{ /* launch */ \"node\": { \"shell-port\": 9000, }, }"),
    ])?;
    let settings = Settings {
        conf_dirs: vec![dir.path().to_path_buf()],
        run_file: Some(dir.path().join("run.js")),
        pretty: false,
    };
    let resolved = resolve(&parse(&["boot.js"]), &settings)?;
    ensure!(resolved == json!({"properties": {"port": 9000}}), "got {resolved}");
    Ok(())
}
