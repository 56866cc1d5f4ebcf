use alphaworld_testkit::{ChunkTree, EntityTree, WorldFixture};
use alphaworld_world::ChunkPos;
use std::path::Path;
use std::process::{Command, Output};

fn alphaworld(world: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_alphaworld"))
        .arg("--config")
        .arg(world.join("no-such-config.toml"))
        .arg("--world")
        .arg(world)
        .args(args)
        .output()
        .expect("can run alphaworld")
}

#[test]
fn info_prints_metadata_without_taking_the_lock() {
    let fixture = WorldFixture::standard().expect("fixture");
    fixture.write_lock(555).expect("lock");

    let output = alphaworld(fixture.path(), &["info"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RandomSeed: 42"));
    assert!(stdout.contains("Spawn: 0 64 0"));
    assert_eq!(fixture.lock_timestamp().expect("lock"), 555);
}

#[test]
fn cooperative_mode_claims_the_lock() {
    let fixture = WorldFixture::standard().expect("fixture");
    let output = alphaworld(fixture.path(), &["--lock-mode", "cooperative", "info"]);
    assert!(output.status.success(), "{output:?}");
    assert_ne!(fixture.lock_timestamp().expect("lock"), 0);
}

#[test]
fn chunk_json_lists_entities() {
    let fixture = WorldFixture::standard().expect("fixture");
    let pos = ChunkPos::new(-2, 40);
    fixture
        .write_chunk(
            pos,
            &ChunkTree::new(pos)
                .entity(EntityTree::new("Cow").health(10))
                .build(),
        )
        .expect("chunk");

    let output = alphaworld(fixture.path(), &["chunk", "-2", "40", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("chunk summary is JSON");
    assert_eq!(summary["requested"]["x"], -2);
    assert_eq!(summary["stored"]["z"], 40);
    assert_eq!(summary["entities"][0]["id"], "Cow");
    assert_eq!(summary["entities"][0]["health"], 10);
}

#[test]
fn missing_chunk_fails() {
    let fixture = WorldFixture::standard().expect("fixture");
    let output = alphaworld(fixture.path(), &["chunk", "9", "9"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("chunk (9, 9)"), "{stderr}");
}

#[test]
fn lock_prints_raw_timestamp() {
    let fixture = WorldFixture::standard().expect("fixture");
    fixture.write_lock(1_000).expect("lock");
    let output = alphaworld(fixture.path(), &["lock"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("1000 (1970-01-01T00:00:01+00:00)"));
}
