use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Experiment layout: which datasets and methods go into which table / figure
// ---------------------------------------------------------------------------

pub const DATASETS_PART_1: &[&str] = &[
    "hospitals",
    "warehouses",
    "random",
    "randomLoose",
    "randomTight",
    "Apogames",
];

pub const DATASETS_PART_2: &[&str] = &["ppu", "ppu_statem", "bcms", "bcs", "argouml"];

pub const DATASETS_PART_3: &[&str] = &[
    "DEFLT.slx",
    "Driving_ACC_CACC.slx",
    "Driving_ACC_CACC_TL.slx",
    "simulink_family_1",
    "simulink_family_2",
];

pub const ARGO_DATASETS: &[&str] = &[
    "argouml_p001",
    "argouml_p005",
    "argouml_p010",
    "argouml_p015",
    "argouml_p020",
    "argouml_p025",
    "argouml_p030",
    "argouml_p035",
    "argouml_p040",
    "argouml_p045",
    "argouml_p050",
    "argouml_p055",
    "argouml_p060",
    "argouml_p065",
    "argouml_p070",
    "argouml_p075",
    "argouml_p080",
    "argouml_p085",
    "argouml_p090",
    "argouml_p095",
    "argouml",
];

pub const RQ1_METHODS: &[&str] = &["RaQuN-Property-Vec", "RaQuN-Character-Vec"];

pub const RQ3_METHODS: &[&str] = &[
    "RaQuN-Character-Vec",
    "RaQuN-Jaccard-25",
    "RaQuN-Jaccard-50",
    "RaQuN-Jaccard-75",
    "RaQuN-Jaccard-100",
];

pub const RQ4_METHODS: &[&str] = &["RaQuN-Property-Vec", "NwM", "PairwiseAsc", "PairwiseDesc"];

pub const RQ5_METHODS: &[&str] = &[
    "RaQuN-Property-Vec",
    "NwM",
    "PairwiseAsc",
    "PairwiseDesc",
    "RaQuN-Character-Vec",
];

pub const INCREMENTAL_K_METHODS: &[&str] = &["RaQuN_k"];

/// Method whose comparison counts go into `table_comp.tex`.
pub const COMPARISON_REFERENCE_METHOD: &str = "RaQuN-Character-Vec";

/// Datasets the RQ2 runtime-over-k figures are drawn for.
pub const RQ2_DATASETS: &[&str] = &["ppu", "bcms"];

/// Name of the ArgoUML dataset; also the name of its results directory.
pub const ARGO_DATASET: &str = "argouml";

// Table file names, one per dataset part where the table is split.
pub const RQ1_TABLES: [&str; 3] = ["table_rq1_1.tex", "table_rq1_2.tex", "table_rq1_3.tex"];
pub const COMPARISON_TABLE: &str = "table_comp.tex";
pub const RQ4_TABLES: [&str; 3] = ["table_rq4_1.tex", "table_rq4_2.tex", "table_rq4_3.tex"];
pub const DATASETS_TABLE: &str = "table_datasets.tex";
pub const ARGO_SETS_TABLE: &str = "table_argo_sets.tex";

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

/// Everything a report run needs to know. `Default` is the paper layout.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub results_dir: PathBuf,
    pub subjects_dir: PathBuf,
    pub output_dir: PathBuf,

    pub datasets_part_1: Vec<String>,
    pub datasets_part_2: Vec<String>,
    pub datasets_part_3: Vec<String>,
    pub argo_datasets: Vec<String>,

    pub rq1_methods: Vec<String>,
    pub rq3_methods: Vec<String>,
    pub rq4_methods: Vec<String>,
    pub rq5_methods: Vec<String>,
    pub incremental_k_methods: Vec<String>,

    pub comparison_reference_method: String,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::with_dirs("results", "experimental_subjects", None::<PathBuf>)
    }
}

impl ReportConfig {
    /// Paper layout rooted at the given directories. Without an explicit
    /// output directory, output goes to `<results_dir>/eval-results`.
    pub fn with_dirs(
        results_dir: impl Into<PathBuf>,
        subjects_dir: impl Into<PathBuf>,
        output_dir: Option<impl Into<PathBuf>>,
    ) -> Self {
        let results_dir = results_dir.into();
        let output_dir = output_dir
            .map(Into::into)
            .unwrap_or_else(|| results_dir.join("eval-results"));
        ReportConfig {
            results_dir,
            subjects_dir: subjects_dir.into(),
            output_dir,
            datasets_part_1: owned(DATASETS_PART_1),
            datasets_part_2: owned(DATASETS_PART_2),
            datasets_part_3: owned(DATASETS_PART_3),
            argo_datasets: owned(ARGO_DATASETS),
            rq1_methods: owned(RQ1_METHODS),
            rq3_methods: owned(RQ3_METHODS),
            rq4_methods: owned(RQ4_METHODS),
            rq5_methods: owned(RQ5_METHODS),
            incremental_k_methods: owned(INCREMENTAL_K_METHODS),
            comparison_reference_method: COMPARISON_REFERENCE_METHOD.to_string(),
        }
    }

    /// Part 1, 2 and 3 in order.
    pub fn all_datasets(&self) -> Vec<String> {
        self.datasets_part_1
            .iter()
            .chain(&self.datasets_part_2)
            .chain(&self.datasets_part_3)
            .cloned()
            .collect()
    }

    pub fn argo_results_dir(&self) -> PathBuf {
        self.results_dir.join(ARGO_DATASET)
    }

    pub fn argo_subjects_dir(&self) -> PathBuf {
        self.subjects_dir.join(ARGO_DATASET)
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.output_dir.join("tables")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.output_dir.join("plots")
    }

    pub fn includes_argo(&self) -> bool {
        self.datasets_part_2.iter().any(|d| d == ARGO_DATASET)
    }

    /// Every method name any table or figure refers to, without repeats.
    pub fn all_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = Vec::new();
        for m in self
            .rq1_methods
            .iter()
            .chain(&self.rq3_methods)
            .chain(&self.rq4_methods)
            .chain(&self.rq5_methods)
            .chain(&self.incremental_k_methods)
        {
            if !methods.contains(m) {
                methods.push(m.clone());
            }
        }
        methods
    }

    /// Directories below `results_dir` that are not method directories.
    pub fn non_method_dirs(&self) -> [PathBuf; 2] {
        [self.argo_results_dir(), self.output_dir.clone()]
    }

    /// Table file names in the order a complete run writes them.
    pub fn expected_tables(&self, with_comparisons: bool) -> Vec<String> {
        let mut names = RQ1_TABLES.to_vec();
        if with_comparisons {
            names.push(COMPARISON_TABLE);
        }
        names.extend(RQ4_TABLES);
        names.extend([DATASETS_TABLE, ARGO_SETS_TABLE]);
        names.into_iter().map(str::to_string).collect()
    }
}

/// Short axis label for an ArgoUML subset: `argouml_p005` → `5%`,
/// the full `argouml` → `100%`.
pub fn argo_subset_label(subset: &str) -> String {
    if subset == ARGO_DATASET {
        return "100%".to_string();
    }
    subset
        .strip_prefix("argouml_p")
        .and_then(|p| p.parse::<u32>().ok())
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| subset.to_string())
}
