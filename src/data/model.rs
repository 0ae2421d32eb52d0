use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// MatchScores – precision / recall / F-measure from match counts
// ---------------------------------------------------------------------------

/// Quality scores of one merge result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScores {
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}

impl MatchScores {
    /// Scores from true positive, false positive and false negative counts.
    ///
    /// Without a single true positive all three scores are `0.0`.
    pub fn from_counts(tp: f64, fp: f64, fn_: f64) -> Self {
        if tp == 0.0 {
            return MatchScores {
                precision: 0.0,
                recall: 0.0,
                f_measure: 0.0,
            };
        }
        let precision = tp / (tp + fp);
        let recall = tp / (tp + fn_);
        let f_measure = (2.0 * (precision * recall)) / (precision + recall);
        MatchScores {
            precision,
            recall,
            f_measure,
        }
    }
}

// ---------------------------------------------------------------------------
// RunResult – one row of a result file
// ---------------------------------------------------------------------------

/// One run of one method on one dataset, as written by the experiment runner.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Empty when the file does not say; the loader fills it in.
    #[serde(default)]
    pub dataset: String,
    #[serde(default, alias = "runID")]
    pub run_id: u32,
    /// Wall-clock runtime in seconds.
    #[serde(default)]
    pub runtime: f64,
    #[serde(default)]
    pub tp: f64,
    #[serde(default)]
    pub fp: f64,
    #[serde(default, rename = "fn")]
    pub false_negatives: f64,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub f_measure: Option<f64>,
    /// Total weight of the matching the method produced.
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub number_of_comparisons: Option<u64>,
    /// Comparisons a naive all-pairs matcher needs on the same input.
    #[serde(default)]
    pub comparisons_all_pairs: Option<u64>,
    /// Neighbourhood size for the incremental-k experiments.
    #[serde(default)]
    pub k: Option<u32>,
}

impl RunResult {
    /// Fill in the dataset name and any missing derived scores.
    pub fn finalize(&mut self, fallback_dataset: &str) {
        if self.dataset.is_empty() {
            self.dataset = fallback_dataset.to_string();
        }
        if self.precision.is_none() || self.recall.is_none() {
            let scores = MatchScores::from_counts(self.tp, self.fp, self.false_negatives);
            self.precision = self.precision.or(Some(scores.precision));
            self.recall = self.recall.or(Some(scores.recall));
        }
        if self.f_measure.is_none() {
            let (p, r) = (self.precision.unwrap_or(0.0), self.recall.unwrap_or(0.0));
            self.f_measure = Some(if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 });
        }
    }
}

// ---------------------------------------------------------------------------
// Metric – what a table column or plot axis shows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Precision,
    Recall,
    FMeasure,
    Weight,
    Runtime,
    Comparisons,
}

impl Metric {
    /// Read this metric from a run. `None` when the run does not carry it.
    pub fn value(self, run: &RunResult) -> Option<f64> {
        match self {
            Metric::Precision => run.precision,
            Metric::Recall => run.recall,
            Metric::FMeasure => run.f_measure,
            Metric::Weight => Some(run.weight),
            Metric::Runtime => Some(run.runtime),
            Metric::Comparisons => run.number_of_comparisons.map(|c| c as f64),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
            Metric::FMeasure => "F-Measure",
            Metric::Weight => "Weight",
            Metric::Runtime => "Runtime",
            Metric::Comparisons => "Comparisons",
        }
    }

    /// Axis description including the unit, if any.
    pub fn axis_label(self) -> &'static str {
        match self {
            Metric::Runtime => "Runtime (s)",
            other => other.label(),
        }
    }

    /// Scores live in `[0, 1]`; everything else is unbounded.
    pub fn is_score(self) -> bool {
        matches!(self, Metric::Precision | Metric::Recall | Metric::FMeasure)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// MethodResults – everything one method produced
// ---------------------------------------------------------------------------

/// All runs of a single method, grouped by dataset.
#[derive(Debug, Clone, Default)]
pub struct MethodResults {
    pub method: String,
    pub runs_per_dataset: BTreeMap<String, Vec<RunResult>>,
}

impl MethodResults {
    pub fn new(method: &str) -> Self {
        MethodResults {
            method: method.to_string(),
            runs_per_dataset: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, run: RunResult) {
        self.runs_per_dataset
            .entry(run.dataset.clone())
            .or_default()
            .push(run);
    }

    /// Runs on `dataset`; empty if the method never ran on it.
    pub fn runs(&self, dataset: &str) -> &[RunResult] {
        self.runs_per_dataset
            .get(dataset)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mean of `metric` over the runs on `dataset` that carry it.
    pub fn mean(&self, dataset: &str, metric: Metric) -> Option<f64> {
        mean(self.runs(dataset).iter().filter_map(|r| metric.value(r)))
    }

    /// Total number of runs over all datasets.
    pub fn len(&self) -> usize {
        self.runs_per_dataset.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Method name → results, ordered by name.
pub type ResultsPerMethod = BTreeMap<String, MethodResults>;

/// Arithmetic mean; `None` for an empty iterator.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// SubjectStats – size of one experimental subject
// ---------------------------------------------------------------------------

/// Size of an experimental subject (or the average over a set of subsets).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubjectStats {
    /// Number of files averaged into this entry (1 for a plain subject).
    pub sets: usize,
    pub models: f64,
    pub elements: f64,
    pub properties: f64,
}

impl SubjectStats {
    pub fn elements_per_model(&self) -> f64 {
        if self.models == 0.0 {
            0.0
        } else {
            self.elements / self.models
        }
    }

    pub fn properties_per_element(&self) -> f64 {
        if self.elements == 0.0 {
            0.0
        } else {
            self.properties / self.elements
        }
    }
}
