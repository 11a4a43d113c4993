use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::adoptapet::PetSource;
use crate::formats::{DetailOutcome, RawListing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedListing {
    pub listing: RawListing,
    pub detail: DetailOutcome,
}

/// Fetches details for every listing at once and returns them paired in input order.
///
/// A detail call that exceeds `detail_timeout` counts as `NoDetail`. Only a task
/// that panics or is cancelled fails the whole batch.
pub async fn enrich(
    source: Arc<dyn PetSource>,
    listings: Vec<RawListing>,
    detail_timeout: Duration,
) -> anyhow::Result<Vec<EnrichedListing>> {
    let total = listings.len();
    let mut join_set = tokio::task::JoinSet::new();

    for (index, listing) in listings.iter().enumerate() {
        let source = Arc::clone(&source);
        let pet_id = listing.pet_id.clone();
        join_set.spawn(async move {
            let outcome = match tokio::time::timeout(detail_timeout, source.pet_details(&pet_id))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        pet_id = %pet_id,
                        timeout_ms = u64::try_from(detail_timeout.as_millis()).unwrap_or(u64::MAX),
                        "pet details timed out"
                    );
                    DetailOutcome::NoDetail
                }
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<DetailOutcome>> = vec![None; total];
    while let Some(joined) = join_set.join_next().await {
        let (index, outcome) = joined.context("join pet detail task")?;
        outcomes[index] = Some(outcome);
    }

    let enriched = listings
        .into_iter()
        .zip(outcomes)
        .map(|(listing, outcome)| {
            let detail = outcome.ok_or_else(|| {
                anyhow::anyhow!("missing detail result for pet {}", listing.pet_id)
            })?;
            Ok(EnrichedListing { listing, detail })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let with_detail = enriched.iter().filter(|e| e.detail.is_detail()).count();
    tracing::info!(
        listings = total,
        with_detail,
        without_detail = total - with_detail,
        "pet details fetched"
    );

    Ok(enriched)
}
