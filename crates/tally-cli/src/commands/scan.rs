//! Receipt scanning command

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tally_core::{normalize_bill, VisionBackend, VisionClient};
use tracing::info;

use super::print_review;

/// Scan a receipt image and print the extracted bill
///
/// With `--out`, the raw vision payload is also written as JSON so the bill
/// can be reviewed or split later without re-scanning.
pub async fn cmd_scan(image: &Path, out: Option<&Path>) -> Result<()> {
    if !image.exists() {
        return Err(anyhow!("File not found: {}", image.display()));
    }
    let image_data = std::fs::read(image).context("Failed to read receipt image")?;

    let client = VisionClient::from_env().ok_or_else(|| {
        anyhow!("No vision backend configured - set GEMINI_API_KEY (or VISION_BACKEND=mock)")
    })?;
    info!(model = client.model(), host = client.host(), "Scanning receipt");

    println!("Scanning {}...", image.display());
    let raw = client
        .extract_bill(&image_data)
        .await
        .context("Vision backend could not extract the bill")?;

    let bill = normalize_bill(&raw)?;
    print_review(&bill);

    if let Some(out) = out {
        let payload = serde_json::to_string_pretty(&raw)?;
        std::fs::write(out, payload)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        println!("\nSaved bill payload to {}", out.display());
        println!("Run 'tally run --bill {} --people A,B' to split it", out.display());
    }

    Ok(())
}
