//! LaTeX `tabular` fragments for the paper.
//!
//! Every builder returns the complete fragment as a `String`; `save_table`
//! writes it unchanged. Tables use booktabs rules (`\toprule` etc.), so the
//! paper preamble needs `\usepackage{booktabs}`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::argo_subset_label;
use crate::data::filter::{mean_for, runs_for};
use crate::data::model::{mean, Metric, ResultsPerMethod, SubjectStats};
use crate::data::subjects::subject_stats;

/// Placeholder for a cell without data.
const MISSING: &str = "--";

/// Columns shown per method in the comparison tables.
const OVERVIEW_METRICS: [Metric; 4] = [
    Metric::Precision,
    Metric::Recall,
    Metric::FMeasure,
    Metric::Runtime,
];

// ---------------------------------------------------------------------------
// Comparison tables (RQ1, RQ4)
// ---------------------------------------------------------------------------

/// One row per dataset; precision, recall, F-measure and runtime per method.
/// The best F-measure of each row is set in bold.
pub fn tabular_overview<S: AsRef<str>>(
    methods: &[S],
    datasets: &[S],
    results: &ResultsPerMethod,
) -> String {
    for method in methods {
        if !results.contains_key(method.as_ref()) {
            log::warn!("No results for {}, its columns stay empty", method.as_ref());
        }
    }

    let n_cols = OVERVIEW_METRICS.len();
    let mut lines = Vec::new();
    lines.push(format!(
        "\\begin{{tabular}}{{l{}}}",
        "r".repeat(n_cols * methods.len())
    ));
    lines.push("\\toprule".to_string());

    let mut group_header = vec![String::new()];
    let mut rules = Vec::new();
    for (i, method) in methods.iter().enumerate() {
        group_header.push(format!(
            "\\multicolumn{{{n_cols}}}{{c}}{{{}}}",
            escape(method.as_ref())
        ));
        let first = 2 + i * n_cols;
        rules.push(format!("\\cmidrule(lr){{{first}-{}}}", first + n_cols - 1));
    }
    lines.push(row(&group_header));
    lines.push(rules.join(" "));

    let mut column_header = vec!["Dataset".to_string()];
    for _ in methods {
        column_header.extend(["P", "R", "F", "T(s)"].map(String::from));
    }
    lines.push(row(&column_header));
    lines.push("\\midrule".to_string());

    for dataset in datasets {
        let dataset = dataset.as_ref();
        let means: Vec<[Option<f64>; 4]> = methods
            .iter()
            .map(|m| OVERVIEW_METRICS.map(|metric| mean_for(results, m.as_ref(), dataset, metric)))
            .collect();
        let best_f = means
            .iter()
            .filter_map(|cols| cols[2])
            .max_by(f64::total_cmp)
            .map(format_score);

        let mut cells = vec![escape(dataset)];
        for [precision, recall, f_measure, runtime] in means {
            cells.push(precision.map(format_score).unwrap_or_else(missing));
            cells.push(recall.map(format_score).unwrap_or_else(missing));
            cells.push(match f_measure.map(format_score) {
                Some(f) if Some(&f) == best_f.as_ref() => format!("\\textbf{{{f}}}"),
                Some(f) => f,
                None => missing(),
            });
            cells.push(runtime.map(format_runtime).unwrap_or_else(missing));
        }
        lines.push(row(&cells));
    }

    lines.push("\\bottomrule".to_string());
    lines.push("\\end{tabular}".to_string());
    finish(lines)
}

/// Comparisons `method` needed per dataset, next to the all-pairs count.
pub fn comparisons_overview<S: AsRef<str>>(
    method: &str,
    datasets: &[S],
    results: &ResultsPerMethod,
) -> String {
    let mut lines = vec![
        "\\begin{tabular}{lrrr}".to_string(),
        "\\toprule".to_string(),
        row(&[
            "Dataset".to_string(),
            escape(method),
            "All pairs".to_string(),
            "Ratio".to_string(),
        ]),
        "\\midrule".to_string(),
    ];

    for dataset in datasets {
        let dataset = dataset.as_ref();
        let needed = mean_for(results, method, dataset, Metric::Comparisons);
        let all_pairs = mean(
            runs_for(results, method, dataset)
                .iter()
                .filter_map(|r| r.comparisons_all_pairs.map(|c| c as f64)),
        );
        let ratio = match (needed, all_pairs) {
            (Some(n), Some(all)) if all > 0.0 => format!("{:.1}\\%", 100.0 * n / all),
            _ => missing(),
        };
        lines.push(row(&[
            escape(dataset),
            needed.map(format_count).unwrap_or_else(missing),
            all_pairs.map(format_count).unwrap_or_else(missing),
            ratio,
        ]));
    }

    lines.push("\\bottomrule".to_string());
    lines.push("\\end{tabular}".to_string());
    finish(lines)
}

// ---------------------------------------------------------------------------
// Experimental subject tables
// ---------------------------------------------------------------------------

/// Size of each experimental subject.
pub fn model_stats_overview<S: AsRef<str>>(subjects_dir: &Path, datasets: &[S]) -> Result<String> {
    let mut lines = vec![
        "\\begin{tabular}{lrrrr}".to_string(),
        "\\toprule".to_string(),
        "Dataset & \\#Models & \\#Elements & Elements/Model & Properties/Element \\\\".to_string(),
        "\\midrule".to_string(),
    ];
    for dataset in datasets {
        let dataset = dataset.as_ref();
        let stats = subject_stats(subjects_dir, dataset)
            .with_context(|| format!("statistics of subject {dataset}"))?;
        lines.push(row(&[
            escape(dataset),
            format_count(stats.models),
            format_count(stats.elements),
            format!("{:.1}", stats.elements_per_model()),
            format!("{:.1}", stats.properties_per_element()),
        ]));
    }
    lines.push("\\bottomrule".to_string());
    lines.push("\\end{tabular}".to_string());
    Ok(finish(lines))
}

/// Average size of the random ArgoUML subsets.
pub fn argo_subset_stats_overview<S: AsRef<str>>(argo_dir: &Path, subsets: &[S]) -> Result<String> {
    let mut lines = vec![
        "\\begin{tabular}{lrrrr}".to_string(),
        "\\toprule".to_string(),
        "Subset & Sets & Avg.\\ \\#Models & Avg.\\ \\#Elements & Avg.\\ \\#Properties \\\\".to_string(),
        "\\midrule".to_string(),
    ];
    for subset in subsets {
        let subset = subset.as_ref();
        let stats: SubjectStats = subject_stats(argo_dir, subset)
            .with_context(|| format!("statistics of ArgoUML subset {subset}"))?;
        lines.push(row(&[
            escape(&argo_subset_label(subset)),
            stats.sets.to_string(),
            format!("{:.1}", stats.models),
            format!("{:.1}", stats.elements),
            format!("{:.1}", stats.properties),
        ]));
    }
    lines.push("\\bottomrule".to_string());
    lines.push("\\end{tabular}".to_string());
    Ok(finish(lines))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Write `table` to `path`, replacing any previous file.
pub fn save_table(path: &Path, table: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    file.write_all(table.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Escape the characters of a name that LaTeX treats specially.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '%' | '&' | '#' | '$' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

fn row(cells: &[String]) -> String {
    format!("{} \\\\", cells.join(" & "))
}

fn finish(lines: Vec<String>) -> String {
    let mut table = lines.join("\n");
    table.push('\n');
    table
}

fn missing() -> String {
    MISSING.to_string()
}

fn format_score(v: f64) -> String {
    format!("{v:.2}")
}

fn format_runtime(seconds: f64) -> String {
    if seconds < 0.01 {
        "$<$0.01".to_string()
    } else {
        format!("{seconds:.2}")
    }
}

/// Rounded count with `{,}` thousands separators.
fn format_count(v: f64) -> String {
    let digits = format!("{:.0}", v.max(0.0));
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str("{,}");
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MethodResults, RunResult};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn results() -> ResultsPerMethod {
        let mut results = ResultsPerMethod::new();
        for (method, tp, fp, fn_, runtime, comparisons) in [
            ("A", 3.0, 1.0, 1.0, 1.5, Some(250_000)),
            ("B_k", 2.0, 0.0, 0.0, 0.004, None),
        ] {
            let mut m = MethodResults::new(method);
            let mut run = RunResult {
                dataset: "hospitals".into(),
                runtime,
                tp,
                fp,
                false_negatives: fn_,
                number_of_comparisons: comparisons,
                comparisons_all_pairs: comparisons.map(|_| 1_000_000),
                ..Default::default()
            };
            run.finalize("hospitals");
            m.push(run);
            results.insert(method.to_string(), m);
        }
        results
    }

    #[test]
    fn overview_marks_best_f_measure() {
        let table = tabular_overview(&["A", "B_k"][..], &["hospitals", "ppu_statem"][..], &results());
        let expected = "\
\\begin{tabular}{lrrrrrrrr}
\\toprule
 & \\multicolumn{4}{c}{A} & \\multicolumn{4}{c}{B\\_k} \\\\
\\cmidrule(lr){2-5} \\cmidrule(lr){6-9}
Dataset & P & R & F & T(s) & P & R & F & T(s) \\\\
\\midrule
hospitals & 0.75 & 0.75 & 0.75 & 1.50 & 1.00 & 1.00 & \\textbf{1.00} & $<$0.01 \\\\
ppu\\_statem & -- & -- & -- & -- & -- & -- & -- & -- \\\\
\\bottomrule
\\end{tabular}
";
        assert_eq!(table, expected);
    }

    #[test]
    fn overview_with_unknown_method() {
        let table = tabular_overview(&["NwM"][..], &["hospitals"][..], &results());
        assert!(table.contains("hospitals & -- & -- & -- & -- \\\\"));
    }

    #[test]
    fn comparisons_with_ratio() {
        let table = comparisons_overview("A", &["hospitals", "bcs"][..], &results());
        assert!(table.contains("hospitals & 250{,}000 & 1{,}000{,}000 & 25.0\\% \\\\"));
        assert!(table.contains("bcs & -- & -- & -- \\\\"));
    }

    #[test]
    fn subject_tables() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bcs.csv"), "0;a;A;p;q\n1;b;B;p\n1;c;C\n").unwrap();
        let argo = tmp.path().join("argouml");
        fs::create_dir_all(argo.join("argouml_p005")).unwrap();
        fs::write(argo.join("argouml_p005").join("s0.csv"), "0;a;A;p\n").unwrap();
        fs::write(argo.join("argouml.csv"), "0;a;A\n1;b;B\n").unwrap();

        let models = model_stats_overview(tmp.path(), &["bcs"][..]).unwrap();
        assert!(models.contains("bcs & 2 & 3 & 1.5 & 1.0 \\\\"));

        let subsets = argo_subset_stats_overview(&argo, &["argouml_p005", "argouml"][..]).unwrap();
        assert!(subsets.contains("5\\% & 1 & 1.0 & 1.0 & 1.0 \\\\"));
        assert!(subsets.contains("100\\% & 1 & 2.0 & 2.0 & 0.0 \\\\"));

        assert!(model_stats_overview(tmp.path(), &["ppu"][..]).is_err());
    }

    #[test]
    fn escaping_and_counts() {
        assert_eq!(escape("ppu_statem"), "ppu\\_statem");
        assert_eq!(escape("DEFLT.slx"), "DEFLT.slx");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1234.4), "1{,}234");
    }

    #[test]
    fn save_table_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("table_rq1_1.tex");
        save_table(&path, "old").unwrap();
        save_table(&path, "\\begin{tabular}{l}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\\begin{tabular}{l}\n");
    }
}
