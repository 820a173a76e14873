// ABOUTME: RecommendationPipeline drives the catalog through filter and selector in chunks.
// ABOUTME: An explicit state machine accumulates recommendations until quota or budget runs out.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ulid::Ulid;

use advisor_core::{
    PreferenceProfile, RecommendationAggregator, RunReport, RunStatus, StageInput,
};
use advisor_store::CatalogStore;

use crate::runtime::StageError;
use crate::stage::Stage;

/// Tuning for one pipeline run. Validated on pipeline construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Catalog entries fed through the stages per iteration.
    pub chunk_size: usize,
    /// Minimum recommendations required to stop early.
    pub quota: usize,
    /// Hard bound on iterations; the run aborts with partial results after this.
    pub max_iters: u32,
    /// Minimum acceptable fraction of resolved names in the catalog lookup.
    pub tolerance: f64,
    /// Fixed pause before each model call. The only rate limiting there is.
    pub call_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            quota: 5,
            max_iters: 10,
            tolerance: 0.3,
            call_delay: Duration::from_secs(1),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), StageError> {
        if self.chunk_size == 0 {
            return Err(StageError::InvalidInput(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.quota == 0 {
            return Err(StageError::InvalidInput(
                "quota must be at least 1".to_string(),
            ));
        }
        if self.max_iters == 0 {
            return Err(StageError::InvalidInput(
                "max_iters must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance <= 1.0) {
            return Err(StageError::InvalidInput(format!(
                "tolerance {} is outside (0.0, 1.0]",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Controller states. One FetchChunk→RunStages→UpdateAggregate pass is one
/// iteration; UpdateAggregate decides whether to loop, finish, or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    FetchChunk,
    RunStages,
    UpdateAggregate,
    Done,
    Aborted,
}

/// Drives the catalog through the name filter and metadata selector in
/// fixed-size chunks, merging each chunk's accepted names into the
/// aggregator until the quota is met or the iteration budget runs out.
///
/// The chunk cursor is 0-indexed, starts at 0, and advances by
/// `chunk_size` after every processed chunk — the first chunk is always
/// processed.
pub struct RecommendationPipeline {
    catalog: Arc<CatalogStore>,
    filter: Box<dyn Stage>,
    selector: Box<dyn Stage>,
    config: PipelineConfig,
    state: ControllerState,
}

impl RecommendationPipeline {
    pub fn new(
        catalog: Arc<CatalogStore>,
        filter: Box<dyn Stage>,
        selector: Box<dyn Stage>,
        config: PipelineConfig,
    ) -> Result<Self, StageError> {
        config.validate()?;
        Ok(Self {
            catalog,
            filter,
            selector,
            config,
            state: ControllerState::Idle,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Run the pipeline to completion and report the outcome.
    ///
    /// Per-chunk stage, lookup, and aggregator failures are logged and the
    /// run moves on to the next chunk; the iteration is still consumed, so
    /// `max_iters` remains a hard liveness bound. An exhausted catalog ends
    /// the run the same way as an exhausted budget: `QuotaUnmet` with
    /// whatever was accumulated.
    pub async fn run(&mut self, profile: &PreferenceProfile) -> RunReport {
        let run_id = Ulid::new();
        let started_at = Utc::now();

        let mut aggregator = RecommendationAggregator::new();
        let mut cursor: usize = 0;
        let mut iterations: u32 = 0;
        let mut chunk_names: BTreeSet<String> = BTreeSet::new();
        let mut chunk_accepted: BTreeSet<String> = BTreeSet::new();

        tracing::info!(
            run_id = %run_id,
            catalog = self.catalog.len(),
            chunk_size = self.config.chunk_size,
            quota = self.config.quota,
            max_iters = self.config.max_iters,
            "pipeline run starting"
        );

        self.state = ControllerState::Idle;
        loop {
            match self.state {
                ControllerState::Idle => {
                    self.state = ControllerState::FetchChunk;
                }

                ControllerState::FetchChunk => {
                    let slice = self.catalog.chunk(cursor, self.config.chunk_size);
                    if slice.is_empty() {
                        tracing::warn!(cursor, "catalog exhausted before quota was met");
                        self.state = ControllerState::Aborted;
                        continue;
                    }
                    chunk_names = slice.iter().cloned().collect();
                    tracing::debug!(cursor, chunk = chunk_names.len(), "fetched chunk");
                    self.state = ControllerState::RunStages;
                }

                ControllerState::RunStages => {
                    chunk_accepted = self.run_stages(&chunk_names, profile).await;
                    self.state = ControllerState::UpdateAggregate;
                }

                ControllerState::UpdateAggregate => {
                    if let Err(e) = aggregator.update(&chunk_accepted) {
                        // An empty chunk verdict is a reportable condition,
                        // not the end of the run.
                        tracing::warn!(error = %e, "chunk produced no recommendations");
                    }

                    iterations += 1;
                    cursor += self.config.chunk_size;

                    if aggregator.len() >= self.config.quota {
                        self.state = ControllerState::Done;
                    } else if iterations >= self.config.max_iters {
                        tracing::warn!(
                            iterations,
                            accumulated = aggregator.len(),
                            "iteration budget exhausted before quota"
                        );
                        self.state = ControllerState::Aborted;
                    } else {
                        self.state = ControllerState::FetchChunk;
                    }
                }

                ControllerState::Done => {
                    tracing::info!(
                        run_id = %run_id,
                        iterations,
                        recommendations = aggregator.len(),
                        "pipeline reached quota"
                    );
                    return RunReport::new(
                        run_id,
                        RunStatus::Done,
                        aggregator.into_recommendations(),
                        iterations,
                        started_at,
                    );
                }

                ControllerState::Aborted => {
                    tracing::info!(
                        run_id = %run_id,
                        iterations,
                        recommendations = aggregator.len(),
                        "pipeline aborted with partial results"
                    );
                    return RunReport::new(
                        run_id,
                        RunStatus::QuotaUnmet,
                        aggregator.into_recommendations(),
                        iterations,
                        started_at,
                    );
                }
            }
        }
    }

    /// Filter then select one chunk. Any failure along the way logs and
    /// yields an empty accepted set for this chunk.
    async fn run_stages(
        &self,
        chunk_names: &BTreeSet<String>,
        profile: &PreferenceProfile,
    ) -> BTreeSet<String> {
        self.pace().await;
        let filtered = match self
            .filter
            .evaluate(&StageInput::Names(chunk_names.clone()), profile)
            .await
        {
            Ok(verdict) => verdict.accepted,
            Err(e) => {
                tracing::warn!(stage = self.filter.name(), error = %e, "stage failed, skipping chunk");
                return BTreeSet::new();
            }
        };

        if filtered.is_empty() {
            tracing::debug!("name filter kept nothing in this chunk");
            return BTreeSet::new();
        }

        let records = match self
            .catalog
            .get_courses_details(&filtered, self.config.tolerance)
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "catalog lookup failed, skipping chunk");
                return BTreeSet::new();
            }
        };

        self.pace().await;
        match self
            .selector
            .evaluate(&StageInput::Records(records), profile)
            .await
        {
            Ok(verdict) => verdict.accepted,
            Err(e) => {
                tracing::warn!(stage = self.selector.name(), error = %e, "stage failed, skipping chunk");
                BTreeSet::new()
            }
        }
    }

    /// Fixed inter-call delay. No adaptive backoff by design.
    async fn pace(&self) {
        if !self.config.call_delay.is_zero() {
            tokio::time::sleep(self.config.call_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::prompts::PromptSet;
    use crate::stage::{MetadataSelectorStage, NameFilterStage};
    use crate::testing::StubModelRuntime;

    // Three-course scenario: the first fits every criterion, the second's
    // title clashes with a disliked topic, the third passes the title
    // check but fails on ECTS.
    const CATALOG: &str = r#"{
        "Principles of Management": {"ects": 6, "delivery_mode": "remote", "assessment": "project"},
        "Spanish for Beginners": {"ects": 4, "delivery_mode": "remote", "assessment": "project"},
        "Introduction to Management": {"ects": 2, "delivery_mode": "remote", "assessment": "project"}
    }"#;

    fn catalog() -> Arc<CatalogStore> {
        Arc::new(CatalogStore::from_json_str(CATALOG).unwrap())
    }

    fn profile() -> PreferenceProfile {
        PreferenceProfile::from_answers(
            "6-8",
            "under 4",
            "management",
            "foreign languages",
            "remote",
            "",
            "project",
            "",
            "",
            "",
        )
    }

    fn fast_config(chunk_size: usize, quota: usize, max_iters: u32) -> PipelineConfig {
        PipelineConfig {
            chunk_size,
            quota,
            max_iters,
            tolerance: 0.3,
            call_delay: Duration::ZERO,
        }
    }

    fn scenario_stages() -> (Box<dyn Stage>, Box<dyn Stage>) {
        // Filter drops B on its title; selector drops C on ECTS.
        let filter = NameFilterStage::new(
            Arc::new(StubModelRuntime::accepting(&[
                "Principles of Management",
                "Introduction to Management",
            ])),
            PromptSet::default(),
        );
        let selector = MetadataSelectorStage::new(
            Arc::new(StubModelRuntime::accepting(&["Principles of Management"])),
            PromptSet::default(),
        );
        (Box::new(filter), Box::new(selector))
    }

    #[tokio::test]
    async fn scenario_quota_one_reaches_done() {
        let (filter, selector) = scenario_stages();
        let mut pipeline =
            RecommendationPipeline::new(catalog(), filter, selector, fast_config(3, 1, 1)).unwrap();

        let report = pipeline.run(&profile()).await;

        assert_eq!(report.status, RunStatus::Done);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations.contains("Principles of Management"));
        assert_eq!(pipeline.state(), ControllerState::Done);
    }

    #[tokio::test]
    async fn scenario_quota_five_aborts_with_partial_results() {
        let (filter, selector) = scenario_stages();
        let mut pipeline =
            RecommendationPipeline::new(catalog(), filter, selector, fast_config(3, 5, 1)).unwrap();

        let report = pipeline.run(&profile()).await;

        assert_eq!(report.status, RunStatus::QuotaUnmet);
        assert_eq!(report.iterations, 1);
        assert!(report.recommendations.contains("Principles of Management"));
        assert_eq!(pipeline.state(), ControllerState::Aborted);
    }

    #[tokio::test]
    async fn first_chunk_is_never_skipped() {
        // The accepted course is the first catalog entry; with chunk_size 1
        // it only ever appears in chunk 0.
        let filter = NameFilterStage::new(
            Arc::new(StubModelRuntime::accepting(&["Principles of Management"])),
            PromptSet::default(),
        );
        let selector = MetadataSelectorStage::new(
            Arc::new(StubModelRuntime::accepting(&["Principles of Management"])),
            PromptSet::default(),
        );
        let mut pipeline = RecommendationPipeline::new(
            catalog(),
            Box::new(filter),
            Box::new(selector),
            fast_config(1, 1, 3),
        )
        .unwrap();

        let report = pipeline.run(&profile()).await;

        assert_eq!(report.status, RunStatus::Done);
        assert_eq!(report.iterations, 1);
    }

    #[tokio::test]
    async fn run_terminates_within_max_iters() {
        let filter = NameFilterStage::new(
            Arc::new(StubModelRuntime::rejecting_all()),
            PromptSet::default(),
        );
        let selector = MetadataSelectorStage::new(
            Arc::new(StubModelRuntime::rejecting_all()),
            PromptSet::default(),
        );
        let mut pipeline = RecommendationPipeline::new(
            catalog(),
            Box::new(filter),
            Box::new(selector),
            fast_config(1, 5, 2),
        )
        .unwrap();

        let report = pipeline.run(&profile()).await;

        assert_eq!(report.status, RunStatus::QuotaUnmet);
        assert_eq!(report.iterations, 2, "budget is a hard bound");
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn catalog_exhaustion_aborts_with_quota_unmet() {
        let filter = NameFilterStage::new(
            Arc::new(StubModelRuntime::rejecting_all()),
            PromptSet::default(),
        );
        let selector = MetadataSelectorStage::new(
            Arc::new(StubModelRuntime::rejecting_all()),
            PromptSet::default(),
        );
        // Three courses, chunk of three: one pass exhausts the catalog well
        // before the ten-iteration budget.
        let mut pipeline = RecommendationPipeline::new(
            catalog(),
            Box::new(filter),
            Box::new(selector),
            fast_config(3, 5, 10),
        )
        .unwrap();

        let report = pipeline.run(&profile()).await;

        assert_eq!(report.status, RunStatus::QuotaUnmet);
        assert_eq!(report.iterations, 1);
    }

    #[tokio::test]
    async fn malformed_stage_reply_skips_chunk_but_run_continues() {
        // Chunk 0 dies on a non-JSON reply; chunk 1 ("Introduction to
        // Management") is still processed and satisfies the quota.
        let filter = NameFilterStage::new(
            Arc::new(StubModelRuntime::new(vec![
                "this is not json at all",
                "{\"accepted\": [\"Introduction to Management\"]}",
            ])),
            PromptSet::default(),
        );
        let selector = MetadataSelectorStage::new(
            Arc::new(StubModelRuntime::accepting(&["Introduction to Management"])),
            PromptSet::default(),
        );
        let mut pipeline = RecommendationPipeline::new(
            catalog(),
            Box::new(filter),
            Box::new(selector),
            fast_config(2, 1, 3),
        )
        .unwrap();

        let report = pipeline.run(&profile()).await;

        assert_eq!(report.status, RunStatus::Done);
        assert_eq!(report.iterations, 2);
        assert!(report.recommendations.contains("Introduction to Management"));
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        let bad_chunk = PipelineConfig {
            chunk_size: 0,
            ..PipelineConfig::default()
        };
        assert!(bad_chunk.validate().is_err());

        let bad_quota = PipelineConfig {
            quota: 0,
            ..PipelineConfig::default()
        };
        assert!(bad_quota.validate().is_err());

        let bad_iters = PipelineConfig {
            max_iters: 0,
            ..PipelineConfig::default()
        };
        assert!(bad_iters.validate().is_err());

        let bad_tolerance = PipelineConfig {
            tolerance: 1.5,
            ..PipelineConfig::default()
        };
        assert!(bad_tolerance.validate().is_err());
    }

    #[test]
    fn config_defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.quota, 5);
        assert_eq!(config.tolerance, 0.3);
        assert_eq!(config.call_delay, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }
}
