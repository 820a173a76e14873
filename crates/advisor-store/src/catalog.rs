// ABOUTME: CatalogStore loads the JSON course catalog once per run, keyed by course name.
// ABOUTME: Preserves file insertion order for chunking and resolves names with a tolerance ratio.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;

use advisor_core::{AdvisorError, CourseRecord};

/// Errors loading the catalog file. Lookup errors use the shared
/// [`AdvisorError`] taxonomy instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is not a JSON object keyed by course name: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog entry {name:?} is not a metadata object")]
    BadEntry { name: String },
}

/// Read-only course catalog for one run. Iteration order is the insertion
/// order of the loaded JSON file, which the chunk cursor relies on.
#[derive(Debug)]
pub struct CatalogStore {
    order: Vec<String>,
    records: HashMap<String, CourseRecord>,
}

impl CatalogStore {
    /// Load a catalog from a JSON object file: `{ "Course Name": { ...meta } }`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse a catalog from a JSON string. Split out from [`load`](Self::load)
    /// so tests can build catalogs without touching the filesystem.
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        // serde_json's preserve_order feature keeps the Map in file order.
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;

        let mut order = Vec::with_capacity(object.len());
        let mut records = HashMap::with_capacity(object.len());

        for (name, value) in object {
            let record: CourseRecord =
                serde_json::from_value(value).map_err(|_| StoreError::BadEntry {
                    name: name.clone(),
                })?;
            order.push(name.clone());
            records.insert(name, record);
        }

        tracing::info!(courses = order.len(), "catalog loaded");
        Ok(Self { order, records })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All course names in catalog order.
    pub fn course_names(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&CourseRecord> {
        self.records.get(name)
    }

    /// The slice of course names starting at `cursor`, at most `size` long.
    /// Empty once the cursor has walked past the end of the catalog.
    pub fn chunk(&self, cursor: usize, size: usize) -> &[String] {
        if cursor >= self.order.len() {
            return &[];
        }
        let end = (cursor + size).min(self.order.len());
        &self.order[cursor..end]
    }

    /// Resolve candidate names to their full metadata records.
    ///
    /// Fails with `InvalidInput` on an empty candidate set or a tolerance
    /// outside `(0.0, 1.0]`, with `NotFound` when nothing resolves, and with
    /// `ToleranceExceeded` when the resolved fraction is strictly below
    /// `tolerance`. Unresolved names are dropped with a warning otherwise.
    pub fn get_courses_details(
        &self,
        names: &BTreeSet<String>,
        tolerance: f64,
    ) -> Result<BTreeMap<String, CourseRecord>, AdvisorError> {
        if names.is_empty() {
            return Err(AdvisorError::InvalidInput(
                "candidate set for catalog lookup is empty".to_string(),
            ));
        }
        if !(tolerance > 0.0 && tolerance <= 1.0) {
            return Err(AdvisorError::InvalidInput(format!(
                "tolerance {tolerance} is outside (0.0, 1.0]"
            )));
        }

        let mut resolved = BTreeMap::new();
        for name in names {
            match self.records.get(name) {
                Some(record) => {
                    resolved.insert(name.clone(), record.clone());
                }
                None => {
                    tracing::warn!(name = %name, "candidate name not in catalog");
                }
            }
        }

        if resolved.is_empty() {
            return Err(AdvisorError::NotFound {
                requested: names.len(),
            });
        }

        let ratio = resolved.len() as f64 / names.len() as f64;
        if ratio < tolerance {
            return Err(AdvisorError::ToleranceExceeded {
                resolved: resolved.len(),
                requested: names.len(),
                tolerance,
            });
        }

        Ok(resolved)
    }
}
