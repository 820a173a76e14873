// ABOUTME: Defines CourseRecord, the immutable metadata for one catalog entry.
// ABOUTME: CreditLoad models ECTS credit as either a point value or a textual range.

use serde::{Deserialize, Serialize};

/// ECTS credit load for a course. Catalogs store this either as a bare
/// number or as free text like `"6-8"`, so both shapes deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreditLoad {
    Points(f64),
    Text(String),
}

impl CreditLoad {
    /// Resolve the credit load to an inclusive `(min, max)` bound.
    ///
    /// A point value bounds itself; text is parsed as either a single number
    /// or a `min-max` range. Returns `None` for text that is neither.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            CreditLoad::Points(p) => Some((*p, *p)),
            CreditLoad::Text(s) => {
                let s = s.trim();
                if let Ok(p) = s.parse::<f64>() {
                    return Some((p, p));
                }
                let (lo, hi) = s.split_once('-')?;
                let lo: f64 = lo.trim().parse().ok()?;
                let hi: f64 = hi.trim().parse().ok()?;
                if lo <= hi { Some((lo, hi)) } else { None }
            }
        }
    }
}

/// Metadata for a single academic course. The course name is the catalog
/// key and lives outside the record. Immutable once loaded for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(default)]
    pub ects: Option<CreditLoad>,

    #[serde(default)]
    pub topics: Vec<String>,

    #[serde(default)]
    pub delivery_mode: Option<String>,

    #[serde(default)]
    pub assessment: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Catalog fields the advisor does not model explicitly. Carried along
    /// so the selector stage can still show them to the model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_load_points_bound_themselves() {
        assert_eq!(CreditLoad::Points(6.0).bounds(), Some((6.0, 6.0)));
    }

    #[test]
    fn credit_load_parses_single_number_text() {
        assert_eq!(CreditLoad::Text("4".to_string()).bounds(), Some((4.0, 4.0)));
    }

    #[test]
    fn credit_load_parses_range_text() {
        assert_eq!(
            CreditLoad::Text("6-8".to_string()).bounds(),
            Some((6.0, 8.0))
        );
        assert_eq!(
            CreditLoad::Text(" 2 - 4 ".to_string()).bounds(),
            Some((2.0, 4.0))
        );
    }

    #[test]
    fn credit_load_rejects_inverted_or_garbled_ranges() {
        assert_eq!(CreditLoad::Text("8-6".to_string()).bounds(), None);
        assert_eq!(CreditLoad::Text("several".to_string()).bounds(), None);
    }

    #[test]
    fn course_record_deserializes_with_numeric_ects() {
        let record: CourseRecord = serde_json::from_value(serde_json::json!({
            "ects": 6,
            "topics": ["finance", "management"],
            "delivery_mode": "remote",
            "assessment": "project",
            "description": "Corporate finance fundamentals."
        }))
        .unwrap();

        assert_eq!(record.ects, Some(CreditLoad::Points(6.0)));
        assert_eq!(record.topics.len(), 2);
        assert!(record.extra.is_empty());
    }

    #[test]
    fn course_record_keeps_unknown_fields_in_extra() {
        let record: CourseRecord = serde_json::from_value(serde_json::json!({
            "ects": "6-8",
            "semester": "winter",
            "language": "English"
        }))
        .unwrap();

        assert_eq!(record.ects, Some(CreditLoad::Text("6-8".to_string())));
        assert_eq!(record.extra.len(), 2);
        assert_eq!(record.extra["semester"], "winter");
    }

    #[test]
    fn course_record_tolerates_missing_fields() {
        let record: CourseRecord = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(record.ects.is_none());
        assert!(record.topics.is_empty());
        assert!(record.description.is_none());
    }
}
