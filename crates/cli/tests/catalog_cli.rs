//! CLI integration tests driving the `dipia` binary against a temp home.

use std::process::{Command, Output};

use anyhow::{Context, Result};
use dipia_test_utils::TestFixture;

fn dipia(fixture: &TestFixture, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_dipia"))
        .args(args)
        .env("HOME", fixture.home_path())
        .env_remove("DIPIA_STORE")
        .env_remove("DIPIA_CONFIG")
        .env_remove("DIPIA_FETCH_TIMEOUT_MS")
        .output()
        .with_context(|| format!("failed to execute dipia {args:?}"))?;

    assert!(
        output.status.success(),
        "dipia {:?} should succeed\nSTDOUT:\n{}\nSTDERR:\n{}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(output)
}

#[test]
fn given_added_materials_when_recommending_then_ranked_json_is_printed() -> Result<()> {
    // GIVEN two materials in the default catalog under ~/.dipia
    let fixture = TestFixture::new()?;
    dipia(
        &fixture,
        &[
            "material", "add", "--owner", "1", "--name", "Sellador", "--supplier", "Acme",
            "--price", "80", "--unit", "l", "--category", "Humedad",
        ],
    )?;
    dipia(
        &fixture,
        &[
            "material", "add", "--owner", "1", "--name", "Malla", "--supplier", "Acme",
            "--price", "600", "--unit", "m2", "--tag", "grieta",
        ],
    )?;
    dipia(&fixture, &["material", "favorite", "--owner", "1", "--id", "1"])?;
    assert!(fixture.store_path().exists(), "catalog should be persisted");

    // WHEN recommending for the detected pathologies
    let output = dipia(
        &fixture,
        &[
            "recommend", "--owner", "1", "--label", "Humedad,Crack", "--format", "json",
        ],
    )?;

    // THEN the favorite cheap sealant outranks the mesh
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["total_found"], 2);
    assert_eq!(report["recommendations"][0]["name"], "Sellador");
    assert_eq!(report["recommendations"][0]["score"], 70);
    assert_eq!(report["recommendations"][1]["name"], "Malla");
    assert_eq!(report["recommendations"][1]["score"], 0);
    Ok(())
}

#[test]
fn given_other_owner_when_listing_then_nothing_is_shown() -> Result<()> {
    let fixture = TestFixture::new()?;
    dipia(
        &fixture,
        &[
            "material", "add", "--owner", "1", "--name", "Yeso", "--supplier", "Acme",
            "--price", "12", "--unit", "kg",
        ],
    )?;

    let output = dipia(&fixture, &["material", "list", "--owner", "2"])?;
    assert_eq!(String::from_utf8_lossy(&output.stdout), "No materials found.\n");
    Ok(())
}

#[test]
fn knowledge_prints_reference_sheet() -> Result<()> {
    let fixture = TestFixture::new()?;
    let output = dipia(&fixture, &["knowledge", "grieta_escalonada"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Grieta Escalonada\n"));
    assert!(stdout.contains("Severity: Media-Alta"));
    Ok(())
}
