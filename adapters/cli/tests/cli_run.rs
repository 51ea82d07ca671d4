use std::{fs, process::Command};

fn starfall() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_starfall"));
    let _ = command.env("RUST_LOG", "warn");
    command
}

#[test]
fn locked_level_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let progress = dir.path().join("progress.json");

    let output = starfall()
        .args(["--level", "alien-front", "--max-seconds", "1", "--progress"])
        .arg(&progress)
        .output()?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("locked"));
    Ok(())
}

#[test]
fn short_run_reports_a_summary() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let progress = dir.path().join("progress.json");

    let output = starfall()
        .args(["--max-seconds", "5", "--tick-hz", "30", "--seed", "3", "--progress"])
        .arg(&progress)
        .output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("outcome:"));
    assert!(stdout.contains("totals:"));
    Ok(())
}

#[test]
fn unlock_all_opens_the_alien_front() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let progress = dir.path().join("progress.json");
    let config = dir.path().join("starfall.toml");
    fs::write(
        &config,
        "[levels]\nalien_front_seconds = 1\n\n[session]\ntick_hz = 30\n",
    )?;

    let output = starfall()
        .args(["--level", "alien-front", "--choice", "return", "--unlock-all"])
        .args(["--max-seconds", "20", "--config"])
        .arg(&config)
        .arg("--progress")
        .arg(&progress)
        .output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("outcome: Retreated -> Summary"), "{stdout}");
    assert!(stdout.contains("level 2 unlocked"));

    let saved = fs::read_to_string(&progress)?;
    assert!(saved.contains("Level2Unlocked"));
    Ok(())
}

#[test]
fn malformed_config_fails_with_context() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("starfall.toml");
    fs::write(&config, "[session]\ntick_hz = \"fast\"\n")?;

    let output = starfall()
        .arg("--config")
        .arg(&config)
        .arg("--progress")
        .arg(dir.path().join("progress.json"))
        .output()?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load game configuration"));
    Ok(())
}

#[test]
fn reset_progress_clears_the_saved_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let progress = dir.path().join("progress.json");
    fs::write(
        &progress,
        r#"{"TotalShards": 40, "TotalGoo": 20, "MissilesUnlocked": 1, "Level2Unlocked": 1}"#,
    )?;

    let output = starfall()
        .args(["--reset-progress", "--max-seconds", "1", "--tick-hz", "30", "--progress"])
        .arg(&progress)
        .output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("missiles locked"), "{stdout}");
    assert!(stdout.contains("level 2 locked"), "{stdout}");

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&progress)?)?;
    assert!(saved.get("MissilesUnlocked").is_none(), "{saved}");
    assert!(saved.get("Level2Unlocked").is_none(), "{saved}");
    Ok(())
}
