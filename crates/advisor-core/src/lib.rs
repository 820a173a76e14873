// ABOUTME: Core library for the course advisor, containing the domain data model.
// ABOUTME: Defines course records, preference profiles, stage verdicts, and the aggregator.

pub mod aggregator;
pub mod course;
pub mod error;
pub mod profile;
pub mod report;
pub mod verdict;

pub use aggregator::RecommendationAggregator;
pub use course::{CourseRecord, CreditLoad};
pub use error::AdvisorError;
pub use profile::{NO_PREFERENCE, PreferenceProfile};
pub use report::{RunReport, RunStatus};
pub use verdict::{StageInput, StageVerdict};
