// ABOUTME: RankingStage scores one course against the profile; rank_top_k fans many out.
// ABOUTME: One worker per ranker instance, round-robin assignment, results reduced to the top K.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use advisor_core::{CourseRecord, PreferenceProfile};
use advisor_store::CatalogStore;

use crate::prompts::PromptSet;
use crate::runtime::{ModelRuntime, StageError};
use crate::stage::strip_code_fences;

/// Expected reply schema for the ranking stage.
#[derive(Debug, Deserialize)]
struct RankReply {
    course: String,
    score: f64,
}

/// Scores how well a single course matches the profile, 0 to 100.
pub struct RankingStage {
    runtime: Arc<dyn ModelRuntime>,
    prompts: PromptSet,
}

impl RankingStage {
    pub fn new(runtime: Arc<dyn ModelRuntime>, prompts: PromptSet) -> Self {
        Self { runtime, prompts }
    }

    /// Rank one course. Scores outside 0..=100 are a schema violation.
    pub async fn rank(
        &self,
        name: &str,
        record: &CourseRecord,
        profile: &PreferenceProfile,
    ) -> Result<f64, StageError> {
        let metadata = serde_json::to_string_pretty(record)
            .map_err(|e| StageError::InvalidInput(format!("unserializable record: {e}")))?;
        let user_prompt = format!(
            "STUDENT PREFERENCES:\n{}\n\nCOURSE: {}\nMETADATA:\n{}",
            profile.prompt_block(),
            name,
            metadata
        );

        let reply = self.runtime.complete(&self.prompts.ranker, &user_prompt).await?;
        let body = strip_code_fences(&reply);

        let parsed: RankReply = serde_json::from_str(body).map_err(|e| {
            StageError::MalformedResponse(format!("ranker reply is not a score object: {e}"))
        })?;

        if !(0.0..=100.0).contains(&parsed.score) {
            return Err(StageError::MalformedResponse(format!(
                "score {} is outside 0..=100",
                parsed.score
            )));
        }
        if parsed.course != name {
            tracing::warn!(
                expected = %name,
                got = %parsed.course,
                "ranker echoed a different course name"
            );
        }

        Ok(parsed.score)
    }
}

/// Rank many courses in parallel and keep the top `k` by score.
///
/// One worker task per ranker instance; course names are assigned
/// round-robin, so no two workers share a stage instance and the only
/// shared state is the read-only catalog and profile. Per-course failures
/// (missing record, provider error, malformed score) are logged and
/// skipped. Results are sorted by descending score, ties broken by name.
pub async fn rank_top_k(
    rankers: Vec<Arc<RankingStage>>,
    catalog: Arc<CatalogStore>,
    profile: Arc<PreferenceProfile>,
    names: Vec<String>,
    k: usize,
    call_delay: Duration,
) -> Result<Vec<(String, f64)>, StageError> {
    if rankers.is_empty() {
        return Err(StageError::InvalidInput(
            "ranking fan-out needs at least one ranker instance".to_string(),
        ));
    }
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<(String, f64)>();
    let worker_count = rankers.len();

    let mut handles = Vec::with_capacity(worker_count);
    for (worker_idx, ranker) in rankers.into_iter().enumerate() {
        let assigned: Vec<String> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| i % worker_count == worker_idx)
            .map(|(_, name)| name.clone())
            .collect();

        let catalog = Arc::clone(&catalog);
        let profile = Arc::clone(&profile);
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            for name in assigned {
                if !call_delay.is_zero() {
                    tokio::time::sleep(call_delay).await;
                }

                let Some(record) = catalog.get(&name) else {
                    tracing::warn!(course = %name, "course not in catalog, skipping");
                    continue;
                };

                match ranker.rank(&name, record, &profile).await {
                    Ok(score) => {
                        tracing::debug!(course = %name, score, "course ranked");
                        // Receiver only drops once all workers are done.
                        let _ = tx.send((name, score));
                    }
                    Err(e) => {
                        tracing::warn!(course = %name, error = %e, "ranking failed, skipping");
                    }
                }
            }
        }));
    }
    drop(tx);

    let mut scored = Vec::new();
    while let Some(result) = rx.recv().await {
        scored.push(result);
    }
    for handle in handles {
        let _ = handle.await;
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(k);
    Ok(scored)
}
