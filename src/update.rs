use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::adoptapet::{AdoptapetClient, PetSource};
use crate::cli::UpdateArgs;
use crate::normalize::{NormalizeOptions, normalize_with};
use crate::retry::RetryPolicy;
use crate::summary::RunSummary;

pub async fn run(args: UpdateArgs) -> anyhow::Result<()> {
    if args.api_key.trim().is_empty() {
        anyhow::bail!("--api-key (or ADOPTAPET_API_KEY) must not be empty");
    }

    let request_timeout = Duration::from_secs(args.timeout_secs.max(1));
    let retry = RetryPolicy::with_retries(usize::from(args.retries));
    let client = AdoptapetClient::new(&args.base_url, &args.api_key, request_timeout, retry)
        .context("build adoptapet client")?;

    let output = PathBuf::from(&args.output);
    let summary = run_pipeline(
        Arc::new(client),
        &args.shelter_id,
        &output,
        retry.worst_case(request_timeout),
    )
    .await?;

    println!("{summary}");
    println!("Wrote {} pets to {}", summary.total, output.display());
    Ok(())
}

/// list -> details (fan-out) -> normalize -> write. Returns the run summary.
pub async fn run_pipeline(
    source: Arc<dyn PetSource>,
    shelter_id: &str,
    output: &Path,
    detail_timeout: Duration,
) -> anyhow::Result<RunSummary> {
    tracing::info!(shelter_id, "update: fetch listing");
    let listings = source
        .pets_at_shelter(shelter_id)
        .await
        .with_context(|| format!("fetch pets at shelter {shelter_id}"))?;
    tracing::info!(count = listings.len(), "update: listing fetched");

    tracing::info!("update: fetch details");
    let enriched = crate::enrich::enrich(source, listings, detail_timeout)
        .await
        .context("fetch pet details")?;

    let options = NormalizeOptions::default();
    let pets = enriched
        .iter()
        .map(|pair| normalize_with(&options, &pair.listing, pair.detail.as_detail()))
        .collect::<Vec<_>>();

    let summary = RunSummary::from_pets(&pets);
    for name in &summary.without_photo {
        tracing::debug!(name = %name, "pet has no photo");
    }
    if !summary.without_photo.is_empty() {
        tracing::warn!(
            without_photo = summary.without_photo.len(),
            total = summary.total,
            "some pets have no photo"
        );
    }

    tracing::info!(out = %output.display(), "update: write artifact");
    let artifact = crate::artifact::build(pets, chrono::Utc::now());
    crate::artifact::write(output, &artifact)
        .await
        .context("write pets artifact")?;

    Ok(summary)
}
