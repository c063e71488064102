use std::path::Path;

use anyhow::Result;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

fn neighborly_command(cwd: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("neighborly")?;
    cmd.current_dir(cwd)
        .env_remove("NEIGHBORLY_URL")
        .env_remove("NEIGHBORLY_ANON_KEY")
        .env_remove("NEIGHBORLY_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn format_commands_work_offline() -> Result<()> {
    let cwd = TempDir::new()?;

    neighborly_command(cwd.path())?
        .args(["format", "author", "John Smith|Oak St"])
        .assert()
        .success()
        .stdout("John S. on Oak St\n");

    neighborly_command(cwd.path())?
        .args(["format", "author"])
        .assert()
        .success()
        .stdout("Neighbor\n");

    neighborly_command(cwd.path())?
        .args(["format", "phone", "+1 (555) 123-4567"])
        .assert()
        .success()
        .stdout("(555) 123-4567\n");

    neighborly_command(cwd.path())?
        .args(["format", "name", "Mary Jane Watson"])
        .assert()
        .success()
        .stdout("Mary W.\n");

    Ok(())
}

#[test]
fn categories_json_lists_every_category() -> Result<()> {
    let cwd = TempDir::new()?;

    let output = neighborly_command(cwd.path())?
        .args(["categories", "--json"])
        .output()?;
    assert!(output.status.success());

    let rows: JsonValue = serde_json::from_slice(&output.stdout)?;
    let labels: Vec<&str> = rows
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["category"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(
        labels,
        vec![
            "Pool Service",
            "HVAC",
            "Landscaping",
            "Plumbing",
            "Electrical",
            "Pest Control",
            "Roofing",
            "Handyman",
            "House Cleaning",
        ]
    );
    Ok(())
}

#[test]
fn missing_config_file_fails() -> Result<()> {
    let cwd = TempDir::new()?;

    neighborly_command(cwd.path())?
        .args(["rewards", "--config", "nope.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error: Configuration error: config file not found"));
    Ok(())
}

#[test]
fn unset_backend_url_fails_before_any_request() -> Result<()> {
    let cwd = TempDir::new()?;

    neighborly_command(cwd.path())?
        .arg("whoami")
        .assert()
        .failure()
        .stderr(contains("NEIGHBORLY_URL").and(contains("Loading...").not()));
    Ok(())
}

#[test]
fn unreachable_backend_reports_loading_then_error() -> Result<()> {
    let cwd = TempDir::new()?;
    std::fs::write(
        cwd.path().join("neighborly.toml"),
        "url = \"http://127.0.0.1:9\"\nanon_key = \"anon\"\ntimeout_secs = 5\n",
    )?;

    neighborly_command(cwd.path())?
        .arg("rewards")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Loading...").and(contains("Error: ")));
    Ok(())
}
