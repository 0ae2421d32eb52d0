use std::ops::Range;
use std::path::PathBuf;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::color::MethodColors;
use crate::config::argo_subset_label;
use crate::data::filter::{mean_by_k, mean_for, runs_for};
use crate::data::model::{Metric, ResultsPerMethod};

const FIGURE_SIZE: (u32, u32) = (1200, 600);
const FONT: &str = "sans-serif";

/// One line of a chart: method name and its `(x, y)` points.
type Series = (String, Vec<(f64, f64)>);

// ---------------------------------------------------------------------------
// Plotter – writes the paper figures as SVG
// ---------------------------------------------------------------------------

/// Writes figures into one directory, colouring methods consistently.
pub struct Plotter<'a> {
    dir: PathBuf,
    colors: &'a MethodColors,
}

impl<'a> Plotter<'a> {
    pub fn new(dir: impl Into<PathBuf>, colors: &'a MethodColors) -> Self {
        Plotter {
            dir: dir.into(),
            colors,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.svg"))
    }

    /// RQ2: runtime and `metric` over `k`, one figure `fig_rq2_<dataset>`
    /// per dataset. Datasets without any run that records `k` are skipped.
    pub fn runtime_plots<S: AsRef<str>>(
        &self,
        methods: &[S],
        datasets: &[S],
        results: &ResultsPerMethod,
        metric: Metric,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for dataset in datasets {
            let dataset = dataset.as_ref();
            let series_of = |m: Metric| -> Vec<Series> {
                methods
                    .iter()
                    .map(|method| {
                        let points = mean_by_k(runs_for(results, method.as_ref(), dataset), m)
                            .into_iter()
                            .map(|(k, v)| (f64::from(k), v))
                            .collect();
                        (method.as_ref().to_string(), points)
                    })
                    .filter(|(_, points): &Series| !points.is_empty())
                    .collect()
            };
            let runtime = series_of(Metric::Runtime);
            let other = series_of(metric);
            if runtime.is_empty() {
                log::warn!("No incremental-k runs on {dataset}, skipping RQ2 figure");
                continue;
            }

            let path = self.path(&format!("fig_rq2_{dataset}"));
            {
                let root = SVGBackend::new(&path, FIGURE_SIZE).into_drawing_area();
                root.fill(&WHITE)?;
                let (left, right) = root.split_horizontally((FIGURE_SIZE.0 / 2) as i32);
                self.draw_k_panel(&left, &format!("{dataset}: runtime"), Metric::Runtime, &runtime)?;
                self.draw_k_panel(&right, &format!("{dataset}: {metric}"), metric, &other)?;
                root.present()
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            log::info!("Saved {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    fn draw_k_panel(
        &self,
        area: &DrawingArea<SVGBackend, Shift>,
        caption: &str,
        metric: Metric,
        series: &[Series],
    ) -> Result<()> {
        let x_max = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|&(k, _)| k))
            .fold(1.0, f64::max);
        let y_range = value_range(series.iter().flat_map(|(_, p)| p.iter().map(|&(_, v)| v)), metric);

        let mut chart = ChartBuilder::on(area)
            .caption(caption, (FONT, 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..x_max + 1.0, y_range)?;

        chart
            .configure_mesh()
            .x_desc("k")
            .y_desc(metric.axis_label())
            .draw()?;

        for (method, points) in series {
            let color = self.colors.color_for(method);
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(method.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    /// Grouped bar chart of `metric` over the ArgoUML subsets, one bar per
    /// method. `None` when no method has data on any subset.
    pub fn generic_plot_argouml<S: AsRef<str>>(
        &self,
        name: &str,
        methods: &[S],
        subsets: &[S],
        results: &ResultsPerMethod,
        metric: Metric,
        use_legend: bool,
    ) -> Result<Option<PathBuf>> {
        let bars: Vec<(String, Vec<Option<f64>>)> = methods
            .iter()
            .map(|m| {
                let values = subsets
                    .iter()
                    .map(|s| mean_for(results, m.as_ref(), s.as_ref(), metric))
                    .collect();
                (m.as_ref().to_string(), values)
            })
            .collect();
        if bars.iter().all(|(_, values)| values.iter().all(Option::is_none)) {
            log::warn!("No ArgoUML data for {name}, skipping");
            return Ok(None);
        }

        let labels: Vec<String> = subsets.iter().map(|s| argo_subset_label(s.as_ref())).collect();
        let y_range = value_range(bars.iter().flat_map(|(_, v)| v.iter().flatten().copied()), metric);
        let width = 0.8 / methods.len().max(1) as f64;

        let path = self.path(name);
        {
            let root = SVGBackend::new(&path, FIGURE_SIZE).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(-0.5..labels.len() as f64 - 0.5, y_range)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("Subset size")
                .y_desc(metric.axis_label())
                .x_labels(labels.len())
                .x_label_formatter(&|x: &f64| subset_tick(&labels, *x))
                .draw()?;

            for (j, (method, values)) in bars.iter().enumerate() {
                let color = self.colors.color_for(method);
                let offset = -0.4 + j as f64 * width;
                let anno = chart.draw_series(values.iter().enumerate().filter_map(|(i, v)| {
                    let v = (*v)?;
                    let x0 = i as f64 + offset;
                    Some(Rectangle::new([(x0, 0.0), (x0 + width, v)], color.filled()))
                }))?;
                if use_legend {
                    anno.label(method.as_str()).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
                }
            }

            if use_legend {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::LowerRight)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
            root.present()
                .with_context(|| format!("writing {}", path.display()))?;
        }
        log::info!("Saved {}", path.display());
        Ok(Some(path))
    }

    /// Mean runtime per method over the ArgoUML subsets, on a log10 axis
    /// when `use_log` is set. `None` when there is nothing to draw.
    pub fn runtime_plot_argouml<S: AsRef<str>>(
        &self,
        name: &str,
        methods: &[S],
        subsets: &[S],
        results: &ResultsPerMethod,
        use_legend: bool,
        use_log: bool,
    ) -> Result<Option<PathBuf>> {
        let series: Vec<Series> = methods
            .iter()
            .map(|m| {
                let points = subsets
                    .iter()
                    .enumerate()
                    .filter_map(|(i, s)| {
                        let v = mean_for(results, m.as_ref(), s.as_ref(), Metric::Runtime)?;
                        match use_log {
                            true if v > 0.0 => Some((i as f64, v.log10())),
                            true => None,
                            false => Some((i as f64, v)),
                        }
                    })
                    .collect();
                (m.as_ref().to_string(), points)
            })
            .collect();
        let values: Vec<f64> = series.iter().flat_map(|(_, p)| p.iter().map(|&(_, v)| v)).collect();
        if values.is_empty() {
            log::warn!("No ArgoUML runtimes for {name}, skipping");
            return Ok(None);
        }

        let y_range = if use_log {
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min).floor();
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max).ceil();
            lo..hi.max(lo + 1.0)
        } else {
            value_range(values.iter().copied(), Metric::Runtime)
        };
        let labels: Vec<String> = subsets.iter().map(|s| argo_subset_label(s.as_ref())).collect();

        let path = self.path(name);
        {
            let root = SVGBackend::new(&path, FIGURE_SIZE).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(-0.5..labels.len() as f64 - 0.5, y_range)?;

            let x_ticks = |x: &f64| subset_tick(&labels, *x);
            let log_ticks = |y: &f64| format_seconds(10f64.powf(*y));
            let mut mesh = chart.configure_mesh();
            mesh.x_desc("Subset size")
                .y_desc(Metric::Runtime.axis_label())
                .x_labels(labels.len())
                .x_label_formatter(&x_ticks);
            if use_log {
                mesh.y_label_formatter(&log_ticks);
            }
            mesh.draw()?;

            for (method, points) in &series {
                let color = self.colors.color_for(method);
                let anno = chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
                if use_legend {
                    anno.label(method.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }
                chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
            }

            if use_legend {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
            root.present()
                .with_context(|| format!("writing {}", path.display()))?;
        }
        log::info!("Saved {}", path.display());
        Ok(Some(path))
    }
}

/// Axis range for `metric`: scores always span `[0, 1]`, other metrics
/// start at zero and leave some headroom above the largest value.
fn value_range(values: impl Iterator<Item = f64>, metric: Metric) -> Range<f64> {
    if metric.is_score() {
        return 0.0..1.05;
    }
    let max = values.fold(0.0, f64::max);
    0.0..if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Category label for an x position; empty between categories.
fn subset_tick(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn format_seconds(v: f64) -> String {
    if v >= 100.0 {
        format!("{v:.0}")
    } else if v >= 1.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MethodResults, RunResult};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn results() -> ResultsPerMethod {
        let mut results = ResultsPerMethod::new();
        let mut raqun_k = MethodResults::new("RaQuN_k");
        for k in 1..=3u32 {
            raqun_k.push(RunResult {
                dataset: "ppu".into(),
                k: Some(k),
                runtime: f64::from(k) * 0.5,
                weight: 10.0 + f64::from(k),
                ..Default::default()
            });
        }
        results.insert("RaQuN_k".into(), raqun_k);

        let mut nwm = MethodResults::new("NwM");
        for (subset, runtime, tp) in [("argouml_p001", 0.2, 5.0), ("argouml", 40.0, 8.0)] {
            let mut run = RunResult {
                dataset: subset.into(),
                runtime,
                tp,
                fp: 2.0,
                false_negatives: 2.0,
                ..Default::default()
            };
            run.finalize(subset);
            nwm.push(run);
        }
        results.insert("NwM".into(), nwm);
        results
    }

    fn svg(path: &Path) -> String {
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("<svg"), "{} is not an SVG", path.display());
        text
    }

    #[test]
    fn rq2_figure_per_dataset_with_k_runs() {
        let tmp = TempDir::new().unwrap();
        let colors = MethodColors::new(&["RaQuN_k"][..]);
        let plotter = Plotter::new(tmp.path(), &colors);

        let written = plotter
            .runtime_plots(&["RaQuN_k"][..], &["ppu", "bcms"][..], &results(), Metric::Weight)
            .unwrap();
        assert_eq!(written, vec![tmp.path().join("fig_rq2_ppu.svg")]);
        svg(&written[0]);
    }

    #[test]
    fn argo_bar_chart() {
        let tmp = TempDir::new().unwrap();
        let colors = MethodColors::new(&["NwM", "PairwiseAsc"][..]);
        let plotter = Plotter::new(tmp.path(), &colors);
        let subsets = ["argouml_p001", "argouml_p005", "argouml"];

        let path = plotter
            .generic_plot_argouml(
                "fig_rq4_precision",
                &["NwM", "PairwiseAsc"][..],
                &subsets[..],
                &results(),
                Metric::Precision,
                true,
            )
            .unwrap()
            .unwrap();
        assert_eq!(path, tmp.path().join("fig_rq4_precision.svg"));
        let text = svg(&path);
        assert!(text.contains("NwM"));
    }

    #[test]
    fn argo_plot_without_data_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let colors = MethodColors::new(&["PairwiseDesc"][..]);
        let plotter = Plotter::new(tmp.path(), &colors);
        let out = plotter
            .generic_plot_argouml(
                "fig_rq3_recall",
                &["PairwiseDesc"][..],
                &["argouml"][..],
                &results(),
                Metric::Recall,
                false,
            )
            .unwrap();
        assert!(out.is_none());
        assert!(!tmp.path().join("fig_rq3_recall.svg").exists());
    }

    #[test]
    fn runtime_lines_linear_and_log() {
        let tmp = TempDir::new().unwrap();
        let colors = MethodColors::new(&["NwM"][..]);
        let plotter = Plotter::new(tmp.path(), &colors);
        let subsets = ["argouml_p001", "argouml"];

        for (name, log) in [("fig_rq5_runtime", true), ("fig_rq5_runtime2", false)] {
            let path = plotter
                .runtime_plot_argouml(name, &["NwM"][..], &subsets[..], &results(), true, log)
                .unwrap()
                .unwrap();
            svg(&path);
        }
    }

    #[test]
    fn ticks_and_ranges() {
        let labels = vec!["1%".to_string(), "100%".to_string()];
        assert_eq!(subset_tick(&labels, 1.0), "100%");
        assert_eq!(subset_tick(&labels, 0.5), "");
        assert_eq!(subset_tick(&labels, 7.0), "");
        assert_eq!(value_range([0.3, 0.9].into_iter(), Metric::FMeasure), 0.0..1.05);
        assert_eq!(value_range(std::iter::empty(), Metric::Runtime), 0.0..1.0);
        assert_eq!(format_seconds(0.01234), "0.012");
        assert_eq!(format_seconds(250.4), "250");
    }
}
