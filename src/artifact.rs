use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs;

use crate::formats::{Pet, PetsArtifact};

/// `2026-10-19T08:30:00Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn build(pets: Vec<Pet>, generated_at: DateTime<Utc>) -> PetsArtifact {
    PetsArtifact {
        pets,
        updated_at: format_timestamp(generated_at),
    }
}

/// Writes the artifact as pretty JSON. The target only ever holds a complete file:
/// data goes to a sibling temp file that is then renamed into place.
pub async fn write(path: &Path, artifact: &PetsArtifact) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let mut data = serde_json::to_vec_pretty(artifact).context("serialize pets json")?;
    data.push(b'\n');

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("output path has no file name: {}", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(format!(".tmp.{}", uuid::Uuid::new_v4().simple()));
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(err) = fs::write(&tmp_path, &data).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err).with_context(|| format!("write tmp: {}", tmp_path.display()));
    }
    if let Err(err) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err).with_context(|| format!("rename tmp to final: {}", path.display()));
    }

    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote pets artifact");
    Ok(())
}
