// ABOUTME: Binary-classification metrics for scoring a stage against labeled courses.
// ABOUTME: ConfusionMatrix tallies TP/TN/FP/FN; each metric is None when its denominator is zero.

use std::collections::BTreeSet;

/// Confusion matrix for a stage treated as a binary classifier over
/// courses: "accepted" is the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one labeled prediction.
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
        }
    }

    /// Tally a whole verdict against a labeled ground truth: courses in
    /// `expected` should have been accepted, the rest rejected.
    pub fn from_verdict(
        universe: &BTreeSet<String>,
        accepted: &BTreeSet<String>,
        expected: &BTreeSet<String>,
    ) -> Self {
        let mut matrix = Self::new();
        for course in universe {
            matrix.record(accepted.contains(course), expected.contains(course));
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Fraction of correct calls, or None for an empty matrix.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some((self.tp + self.tn) as f64 / total as f64)
    }

    /// Of everything accepted, the fraction that should have been.
    /// None when nothing was accepted.
    pub fn precision(&self) -> Option<f64> {
        let positives = self.tp + self.fp;
        if positives == 0 {
            return None;
        }
        Some(self.tp as f64 / positives as f64)
    }

    /// Of everything that should have been accepted, the fraction that was.
    /// None when the ground truth has no positives.
    pub fn recall(&self) -> Option<f64> {
        let actual_positives = self.tp + self.fn_;
        if actual_positives == 0 {
            return None;
        }
        Some(self.tp as f64 / actual_positives as f64)
    }
}
