use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::MethodColors;
use crate::config::{
    ReportConfig, ARGO_DATASET, ARGO_SETS_TABLE, COMPARISON_TABLE, DATASETS_TABLE, RQ1_TABLES,
    RQ2_DATASETS, RQ4_TABLES,
};
use crate::data::filter::intersect_datasets;
use crate::data::loader::{list_methods, load_results};
use crate::data::model::{Metric, ResultsPerMethod};
use crate::error::ReportError;
use crate::plots::Plotter;
use crate::tables::{
    argo_subset_stats_overview, comparisons_overview, model_stats_overview, save_table,
    tabular_overview,
};

// ---------------------------------------------------------------------------
// Report run
// ---------------------------------------------------------------------------

/// What a run wrote, in order.
#[derive(Debug, Default)]
pub struct ReportSummary {
    pub tables: Vec<PathBuf>,
    pub plots: Vec<PathBuf>,
    /// Set when the ArgoUML results were missing and their figures skipped.
    pub argo_skipped: bool,
}

/// Produce every table and figure of the paper from `config`.
pub fn run(config: &ReportConfig) -> Result<ReportSummary> {
    let non_method_dirs = config.non_method_dirs();
    let exclude: Vec<&Path> = non_method_dirs.iter().map(PathBuf::as_path).collect();
    let methods = list_methods(&config.results_dir, &exclude)?;
    let results = load_results(&methods, &config.results_dir)?;

    let tables_dir = config.tables_dir();
    let plots_dir = config.plots_dir();
    for dir in [&tables_dir, &plots_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let with_comparisons = results.contains_key(&config.comparison_reference_method);
    log::debug!(
        "Writing tables {}",
        config.expected_tables(with_comparisons).join(", ")
    );

    let colors = MethodColors::new(&config.all_methods());
    let plotter = Plotter::new(&plots_dir, &colors);
    let mut summary = ReportSummary::default();
    let parts: [&[String]; 3] = [
        &config.datasets_part_1,
        &config.datasets_part_2,
        &config.datasets_part_3,
    ];

    // RQ1
    for (file_name, datasets) in RQ1_TABLES.into_iter().zip(parts) {
        let tabular = tabular_overview(&config.rq1_methods, datasets, &results);
        summary
            .tables
            .push(write_table(&tables_dir, file_name, &tabular)?);
    }

    // Number of comparisons
    let reference = &config.comparison_reference_method;
    if with_comparisons {
        let tabular = comparisons_overview(reference, &config.all_datasets(), &results);
        summary
            .tables
            .push(write_table(&tables_dir, COMPARISON_TABLE, &tabular)?);
    } else {
        log::warn!("No data for RaQuN, skipping creation of TABLE III");
    }

    // RQ2
    let rq2_datasets = intersect_datasets(RQ2_DATASETS, &config.datasets_part_2);
    summary.plots.extend(plotter.runtime_plots(
        &config.incremental_k_methods,
        &rq2_datasets,
        &results,
        Metric::Weight,
    )?);

    // RQ4
    for (file_name, datasets) in RQ4_TABLES.into_iter().zip(parts) {
        let tabular = tabular_overview(&config.rq4_methods, datasets, &results);
        summary
            .tables
            .push(write_table(&tables_dir, file_name, &tabular)?);
    }

    if config.includes_argo() {
        match argo_figures(config, &plotter, &mut summary.plots) {
            Ok(()) => {}
            Err(e) if ReportError::is_not_found(&e) => {
                log::warn!("No ArgoUML results found: {e:#}");
                summary.argo_skipped = true;
            }
            Err(e) => return Err(e),
        }
    }

    // Experimental subjects
    let tabular = model_stats_overview(&config.subjects_dir, &config.all_datasets())?;
    summary
        .tables
        .push(write_table(&tables_dir, DATASETS_TABLE, &tabular)?);
    let tabular = argo_subset_stats_overview(&config.argo_subjects_dir(), &config.argo_datasets)?;
    summary
        .tables
        .push(write_table(&tables_dir, ARGO_SETS_TABLE, &tabular)?);

    log::info!(
        "Result evaluation done. Saved {} tables and {} plots under {}",
        summary.tables.len(),
        summary.plots.len(),
        config.output_dir.display()
    );
    Ok(summary)
}

/// RQ2–RQ5 figures on the ArgoUML subsets. Figures are appended to `plots`
/// as they are written, so a failure keeps the ones done so far.
fn argo_figures(config: &ReportConfig, plotter: &Plotter, plots: &mut Vec<PathBuf>) -> Result<()> {
    let argo_dir = config.argo_results_dir();
    let methods = list_methods(&argo_dir, &[]).context("listing ArgoUML results")?;
    let results: ResultsPerMethod =
        load_results(&methods, &argo_dir).context("loading ArgoUML results")?;

    plots.extend(plotter.runtime_plots(
        &config.incremental_k_methods,
        &[ARGO_DATASET.to_string()],
        &results,
        Metric::Weight,
    )?);

    let bar_charts = [
        ("fig_rq3_precision", &config.rq3_methods, Metric::Precision),
        ("fig_rq3_recall", &config.rq3_methods, Metric::Recall),
        ("fig_rq3_f1", &config.rq3_methods, Metric::FMeasure),
        ("fig_rq4_precision", &config.rq4_methods, Metric::Precision),
        ("fig_rq4_recall", &config.rq4_methods, Metric::Recall),
        ("fig_rq4_f1", &config.rq4_methods, Metric::FMeasure),
    ];
    for (name, methods, metric) in bar_charts {
        plots.extend(plotter.generic_plot_argouml(
            name,
            methods,
            &config.argo_datasets,
            &results,
            metric,
            true,
        )?);
    }

    for (name, use_log) in [("fig_rq5_runtime", true), ("fig_rq5_runtime2", false)] {
        plots.extend(plotter.runtime_plot_argouml(
            name,
            &config.rq5_methods,
            &config.argo_datasets,
            &results,
            true,
            use_log,
        )?);
    }
    Ok(())
}

/// Save a table and echo it to stdout.
fn write_table(dir: &Path, file_name: &str, tabular: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    save_table(&path, tabular)?;
    println!("{tabular}");
    println!();
    println!();
    Ok(path)
}
