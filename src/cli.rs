use clap::Parser;
use std::path::PathBuf;

use crate::config::ReportConfig;

/// Write the LaTeX tables and figures of the RaQuN evaluation
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Directory with one subdirectory of result files per method
    #[arg(long, default_value = "results", env = "RAQUN_RESULTS_DIR")]
    pub results_dir: PathBuf,

    /// Directory with the experimental subject CSV files
    #[arg(long, default_value = "experimental_subjects", env = "RAQUN_SUBJECTS_DIR")]
    pub subjects_dir: PathBuf,

    /// Output directory for tables and plots [default: <results-dir>/eval-results]
    #[arg(long, env = "RAQUN_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> ReportConfig {
        ReportConfig::with_dirs(self.results_dir, self.subjects_dir, self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_layout() {
        let cli = Cli::try_parse_from([
            "raqun-eval",
            "--results-dir",
            "/data/results",
            "--subjects-dir",
            "/data/subjects",
            "--output-dir",
            "/tmp/report",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.results_dir, PathBuf::from("/data/results"));
        assert_eq!(config.subjects_dir, PathBuf::from("/data/subjects"));
        assert_eq!(config.tables_dir(), PathBuf::from("/tmp/report/tables"));
    }

    #[test]
    fn output_defaults_below_results() {
        let cli = Cli::try_parse_from(["raqun-eval", "--results-dir", "out"]).unwrap();
        assert_eq!(cli.output_dir, None);
        assert_eq!(
            cli.into_config().output_dir,
            PathBuf::from("out/eval-results")
        );
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["raqun-eval", "--verbose-plots"]).is_err());
    }
}
