//! Snapshot tests for CLI output using insta.
//!
//! To update snapshots after intentional changes:
//! ```bash
//! cargo insta test --accept
//! ```

mod common;
use common::prelude::*;

/// Strip trailing whitespace from each line for stable snapshots
fn normalize_output(output: &str) -> String {
    output
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_order_plan_snapshot() {
    let fixture = TestFixture::new().with_manifest(manifests::LAYERED);
    let output = fixture
        .command()
        .arg("order")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    insta::assert_snapshot!("order_plan", normalize_output(&stdout));
}
