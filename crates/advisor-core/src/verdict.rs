// ABOUTME: Defines StageInput and StageVerdict, the data flowing through pipeline stages.
// ABOUTME: A verdict is the subset of input course names a stage judged acceptable.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::course::CourseRecord;

/// Input handed to a pipeline stage. The name filter sees titles only;
/// the metadata selector sees full records resolved from the catalog.
#[derive(Debug, Clone)]
pub enum StageInput {
    Names(BTreeSet<String>),
    Records(BTreeMap<String, CourseRecord>),
}

impl StageInput {
    /// The course names present in this input, regardless of shape.
    pub fn names(&self) -> BTreeSet<String> {
        match self {
            StageInput::Names(names) => names.clone(),
            StageInput::Records(records) => records.keys().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StageInput::Names(names) => names.is_empty(),
            StageInput::Records(records) => records.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StageInput::Names(names) => names.len(),
            StageInput::Records(records) => records.len(),
        }
    }
}

/// The outcome of one stage evaluation: the accepted subset of the input.
/// Transient — consumed by the next stage or the aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageVerdict {
    pub accepted: BTreeSet<String>,
}

impl StageVerdict {
    pub fn new(accepted: BTreeSet<String>) -> Self {
        Self { accepted }
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
