//! # Fetch Fan-Out
//!
//! Runs a batch of provider extractions concurrently: the result vector
//! is pre-allocated by input index, workers write their slot in place,
//! and one barrier at the end of the batch hands back in-order results.
//! Per-origin semaphores keep any single portal under its concurrency
//! budget no matter how many layers it serves.
//!
//! This is the first suspension point: cancellation is checked before
//! the fan-out and surfaces as `Cancelled` without publishing anything.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use atlas_core::AtlasError;
use atlas_ingest::{LayerConfig, Provider, SourceMetadata};

use crate::cancel::CancelToken;

/// One extraction to run.
pub struct FetchTask {
    /// The source to extract from.
    pub provider: Arc<dyn Provider>,
    /// The layer to extract.
    pub layer: LayerConfig,
}

/// The scheme-and-host part of an endpoint, the unit of rate limiting.
fn origin_of(url: &str) -> String {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find('/').unwrap_or(rest.len());
            url[..scheme_end + 3 + host_end].to_string()
        }
        // Static-file paths rate-limit as one origin.
        None => "file".to_string(),
    }
}

/// Run every task, at most `per_origin` in flight against any one
/// origin, and return results in task order.
///
/// Any task failure fails the whole batch — a partial fetch set must
/// not reach the builder.
pub async fn fetch_all(
    tasks: Vec<FetchTask>,
    per_origin: usize,
    cancel: &CancelToken,
) -> Result<Vec<(Value, SourceMetadata)>, AtlasError> {
    cancel.checkpoint()?;
    let task_count = tasks.len();

    let mut semaphores: BTreeMap<String, Arc<Semaphore>> = BTreeMap::new();
    for task in &tasks {
        semaphores
            .entry(origin_of(&task.layer.endpoint.base_url))
            .or_insert_with(|| Arc::new(Semaphore::new(per_origin.max(1))));
    }

    let mut join_set = JoinSet::new();
    for (index, task) in tasks.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphores[&origin_of(&task.layer.endpoint.base_url)]);
        let cancel = cancel.clone();
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            if cancel.is_cancelled() {
                return (index, Err(AtlasError::Cancelled));
            }
            // Adapters are synchronous (retry loop sleeps); keep them
            // off the async workers.
            let result = tokio::task::spawn_blocking(move || {
                task.provider
                    .extract(&task.layer)
                    .map_err(AtlasError::from)
            })
            .await
            .unwrap_or_else(|e| Err(AtlasError::InvalidInput(format!("fetch worker died: {e}"))));
            (index, result)
        });
    }

    // Pre-allocated by input index; completion order never shows.
    let mut results: Vec<Option<(Value, SourceMetadata)>> = Vec::new();
    results.resize_with(task_count, || None);

    while let Some(joined) = join_set.join_next().await {
        let (index, result) = joined
            .map_err(|e| AtlasError::InvalidInput(format!("fetch worker died: {e}")))?;
        match result {
            Ok(payload) => results[index] = Some(payload),
            Err(e) => {
                join_set.abort_all();
                return Err(e);
            }
        }
    }
    cancel.checkpoint()?;

    results
        .into_iter()
        .map(|slot| slot.ok_or_else(|| AtlasError::InvalidInput("missing fetch result".into())))
        .collect()
}
