use anyhow::{Context, Result};
use lottie_model::{decode, encode};
use std::path::Path;

pub fn verify_file(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    verify_text(&raw)
}

/// `decode(encode(D)) == D`, and a second encode reproduces the first.
pub fn verify_text(raw: &str) -> Result<()> {
    let doc = decode(raw)?;
    let once = encode(&doc)?;
    let again = decode(&once).context("Re-encoded document no longer decodes")?;
    if again != doc {
        anyhow::bail!("decoding the re-encoded document changed its content");
    }

    let twice = encode(&again)?;
    if twice != once {
        anyhow::bail!("encoding is not idempotent");
    }
    Ok(())
}
