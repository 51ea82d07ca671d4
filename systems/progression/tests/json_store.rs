use std::fs;

use starfall_core::{Event, LevelId, Loadout};
use starfall_system_progression::{
    Config, JsonFileStore, ProgressKey, ProgressStore, Progression, StoreError, Unlock,
};

#[test]
fn progress_survives_a_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("progress.json");

    let mut progression = Progression::new(Config::default(), JsonFileStore::open(&path)?);
    let mut unlocks = Vec::new();
    progression.handle(
        &[Event::RewardsCommitted {
            level: LevelId::AlienFront,
            shards: 3,
            goo: 15,
        }],
        &mut unlocks,
    )?;
    assert_eq!(unlocks, vec![Unlock::Shield]);

    let reopened = Progression::new(Config::default(), JsonFileStore::open(&path)?);
    let snapshot = reopened.snapshot();
    assert_eq!(snapshot.total_shards, 3);
    assert_eq!(snapshot.total_goo, 15);
    assert!(snapshot.shield_unlocked);
    assert_eq!(
        reopened.loadout(),
        Loadout {
            lives: 3,
            shields: 2
        }
    );

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(raw["TotalGoo"], 15);
    assert_eq!(raw["ShieldUnlocked"], 1);
    Ok(())
}

#[test]
fn missing_file_reads_as_zero() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = JsonFileStore::open(dir.path().join("absent.json"))?;

    for key in ProgressKey::ALL {
        assert_eq!(store.read(key), 0);
    }
    Ok(())
}

#[test]
fn malformed_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("progress.json");
    fs::write(&path, "{\"TotalShards\": \"many\"}")?;

    let error = JsonFileStore::open(&path).expect_err("strings are not totals");
    assert!(matches!(error, StoreError::Malformed { .. }));
    Ok(())
}

#[test]
fn reset_persists_an_empty_map() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("progress.json");
    let mut progression = Progression::new(Config::default(), JsonFileStore::open(&path)?);
    progression.unlock_all()?;
    assert!(JsonFileStore::open(&path)?.read(ProgressKey::MissilesUnlocked) != 0);

    progression.reset()?;

    assert_eq!(fs::read_to_string(&path)?.trim(), "{}");
    Ok(())
}
