use std::process::Command;

use anyhow::{Context, Result};

/// `(label, extra cargo args)` for each ledgerlink-infra build that must compile.
const FEATURE_COMBINATIONS: &[(&str, &[&str])] = &[
    ("default", &[]),
    ("no-default-features", &["--no-default-features"]),
    ("compression", &["--no-default-features", "--features", "compression"]),
];

/// Check that all required feature combinations compile successfully.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} ledgerlink-infra feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, (label, args)) in FEATURE_COMBINATIONS.iter().enumerate() {
        println!(
            "\n[{}/{}] cargo check -p ledgerlink-infra --all-targets {}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            args.join(" ")
        );

        let status = Command::new("cargo")
            .args(["check", "-p", "ledgerlink-infra", "--all-targets"])
            .args(*args)
            .status()
            .with_context(|| format!("Failed to run cargo check for '{label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{label}' failed to compile");
        }

        println!("✅ Features '{label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
