/// Data layer: result records, loading, selection and subject statistics.
///
/// Architecture:
/// ```text
///  results/<method>/**/*.{json,jsonl,csv,parquet}
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → ResultsPerMethod
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ ResultsPerMethod │  method → dataset → Vec<RunResult>
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  pick runs per (method, dataset), means, per-k series
///   └──────────┘
///
///  experimental_subjects/**/*.csv ──▶ subjects ──▶ SubjectStats
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod subjects;
