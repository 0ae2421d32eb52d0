use std::collections::BTreeMap;

use super::model::{mean, Metric, ResultsPerMethod, RunResult};

// ---------------------------------------------------------------------------
// Selection helpers over loaded results
// ---------------------------------------------------------------------------

/// Datasets of `group` that are also in `wanted`, in `group` order.
pub fn intersect_datasets<S: AsRef<str>>(wanted: &[&str], group: &[S]) -> Vec<String> {
    group
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|d| wanted.contains(d))
        .map(str::to_string)
        .collect()
}

/// Runs of `method` on `dataset`. Empty when either is unknown.
pub fn runs_for<'a>(results: &'a ResultsPerMethod, method: &str, dataset: &str) -> &'a [RunResult] {
    results
        .get(method)
        .map(|m| m.runs(dataset))
        .unwrap_or(&[])
}

/// Mean of `metric` of `method` on `dataset`.
pub fn mean_for(
    results: &ResultsPerMethod,
    method: &str,
    dataset: &str,
    metric: Metric,
) -> Option<f64> {
    results.get(method)?.mean(dataset, metric)
}

/// Mean of `metric` per `k`, ascending in `k`. Runs without `k` are ignored.
pub fn mean_by_k(runs: &[RunResult], metric: Metric) -> Vec<(u32, f64)> {
    let mut per_k: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for run in runs {
        let (Some(k), Some(value)) = (run.k, metric.value(run)) else {
            continue;
        };
        per_k.entry(k).or_default().push(value);
    }
    per_k
        .into_iter()
        .filter_map(|(k, values)| mean(values).map(|m| (k, m)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MethodResults;

    #[test]
    fn intersection_keeps_group_order() {
        let part_2: &[&str] = &["ppu", "ppu_statem", "bcms", "bcs", "argouml"];
        assert_eq!(intersect_datasets(&["bcms", "ppu"], part_2), vec!["ppu", "bcms"]);
        assert!(intersect_datasets(&["hospitals"], part_2).is_empty());
    }

    #[test]
    fn unknown_method_or_dataset_yields_nothing() {
        let mut results = ResultsPerMethod::new();
        let mut nwm = MethodResults::new("NwM");
        nwm.push(RunResult {
            dataset: "ppu".into(),
            runtime: 2.0,
            ..Default::default()
        });
        results.insert("NwM".into(), nwm);

        assert_eq!(runs_for(&results, "NwM", "ppu").len(), 1);
        assert!(runs_for(&results, "NwM", "bcms").is_empty());
        assert!(runs_for(&results, "RaQuN_k", "ppu").is_empty());
        assert_eq!(mean_for(&results, "NwM", "ppu", Metric::Runtime), Some(2.0));
        assert_eq!(mean_for(&results, "PairwiseAsc", "ppu", Metric::Runtime), None);
    }

    #[test]
    fn means_grouped_by_k() {
        let run = |k: Option<u32>, runtime: f64| RunResult {
            k,
            runtime,
            ..Default::default()
        };
        let runs = vec![
            run(Some(2), 4.0),
            run(Some(1), 1.0),
            run(Some(2), 6.0),
            run(None, 100.0),
        ];
        assert_eq!(mean_by_k(&runs, Metric::Runtime), vec![(1, 1.0), (2, 5.0)]);
    }
}
