use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const DATASETS: &[(&str, u32, u32)] = &[
    // (name, models, elements per model)
    ("hospitals", 8, 26),
    ("warehouses", 16, 24),
    ("random", 10, 30),
    ("randomLoose", 10, 30),
    ("randomTight", 10, 30),
    ("Apogames", 20, 400),
    ("ppu", 14, 90),
    ("ppu_statem", 14, 60),
    ("bcms", 18, 120),
    ("bcs", 12, 80),
    ("argouml", 7, 1500),
    ("DEFLT.slx", 8, 200),
    ("Driving_ACC_CACC.slx", 2, 600),
    ("Driving_ACC_CACC_TL.slx", 2, 640),
    ("simulink_family_1", 5, 300),
    ("simulink_family_2", 5, 320),
];

const METHODS: &[(&str, f64, f64)] = &[
    // (name, quality, seconds per element)
    ("RaQuN-Property-Vec", 0.82, 0.0004),
    ("RaQuN-Character-Vec", 0.78, 0.0003),
    ("RaQuN-Jaccard-25", 0.74, 0.0006),
    ("RaQuN-Jaccard-50", 0.76, 0.0007),
    ("RaQuN-Jaccard-75", 0.77, 0.0008),
    ("RaQuN-Jaccard-100", 0.77, 0.0009),
    ("NwM", 0.80, 0.0100),
    ("PairwiseAsc", 0.70, 0.0020),
    ("PairwiseDesc", 0.71, 0.0020),
];

const RUNS: u32 = 5;
const MAX_K: u32 = 10;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[1 - spread, 1 + spread)`
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }

    fn below(&mut self, n: u32) -> u32 {
        (self.next_u64() % u64::from(n.max(1))) as u32
    }
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Run {
    dataset: String,
    #[serde(rename = "runID")]
    run_id: u32,
    k: Option<u32>,
    runtime: f64,
    tp: f64,
    fp: f64,
    #[serde(rename = "fn")]
    false_negatives: f64,
    weight: f64,
    number_of_comparisons: Option<u64>,
    comparisons_all_pairs: Option<u64>,
}

#[allow(clippy::too_many_arguments)]
fn simulate_run(
    rng: &mut SimpleRng,
    dataset: &str,
    models: u32,
    elements_per_model: u32,
    quality: f64,
    seconds_per_element: f64,
    run_id: u32,
    k: Option<u32>,
) -> Run {
    let elements = f64::from(models * elements_per_model);
    // Larger neighbourhoods find more matches but cost more time.
    let k_factor = k.map_or(1.0, |k| 1.0 - 0.3 / f64::from(k));
    let q = (quality * k_factor * rng.jitter(0.05)).min(0.99);
    let true_matches = (elements / 2.0).round();

    let tp = (true_matches * q).round();
    let fp = (true_matches * (1.0 - q) * 0.6).round();
    let false_negatives = true_matches - tp;

    let all_pairs = {
        let m = u64::from(models);
        let per_model = u64::from(elements_per_model);
        m * (m - 1) / 2 * per_model * per_model
    };
    let comparisons = (all_pairs as f64 * 0.02 * rng.jitter(0.1)) as u64;

    Run {
        dataset: dataset.to_string(),
        run_id,
        k,
        runtime: elements * seconds_per_element * k.map_or(1.0, f64::from) * rng.jitter(0.2),
        tp,
        fp,
        false_negatives,
        weight: tp * f64::from(models) * 0.1 * rng.jitter(0.05),
        number_of_comparisons: Some(comparisons),
        comparisons_all_pairs: Some(all_pairs),
    }
}

// ---------------------------------------------------------------------------
// Writers: one format per layer of the results tree
// ---------------------------------------------------------------------------

fn write_json_lines(path: &Path, runs: &[Run]) -> anyhow::Result<()> {
    fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
    let mut text = String::new();
    for run in runs {
        text.push_str(&serde_json::to_string(run)?);
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}

fn write_csv(path: &Path, runs: &[Run]) -> anyhow::Result<()> {
    fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
    let mut writer = csv::Writer::from_path(path)?;
    for run in runs {
        writer.serialize(run)?;
    }
    writer.flush()?;
    Ok(())
}

fn runs_to_batch(runs: &[Run]) -> anyhow::Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("dataset", DataType::Utf8, false),
        Field::new("runID", DataType::Int64, false),
        Field::new("k", DataType::UInt32, true),
        Field::new("runtime", DataType::Float64, false),
        Field::new("tp", DataType::Float64, false),
        Field::new("fp", DataType::Float64, false),
        Field::new("fn", DataType::Float64, false),
        Field::new("weight", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(
                runs.iter().map(|r| r.dataset.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                runs.iter().map(|r| i64::from(r.run_id)).collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from(runs.iter().map(|r| r.k).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(runs.iter().map(|r| r.runtime).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(runs.iter().map(|r| r.tp).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(runs.iter().map(|r| r.fp).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(
                runs.iter().map(|r| r.false_negatives).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(runs.iter().map(|r| r.weight).collect::<Vec<_>>())),
        ],
    )?;
    Ok(batch)
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> anyhow::Result<()> {
    fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
    let file = fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// `model id;element id;name;properties...`
fn write_subject(
    path: &Path,
    models: u32,
    elements_per_model: u32,
    rng: &mut SimpleRng,
) -> anyhow::Result<()> {
    fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;
    for model in 0..models {
        for element in 0..elements_per_model {
            let mut record = vec![
                model.to_string(),
                format!("{model}-{element}"),
                format!("element_{element}"),
            ];
            for p in 0..(2 + rng.below(6)) {
                record.push(format!("prop_{}", (element + p) % 50));
            }
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let results = root.join("results");
    let subjects = root.join("experimental_subjects");
    let mut rng = SimpleRng::new(42);
    let mut files = 0usize;

    // results/<method>/<dataset>/runs.jsonl
    for &(method, quality, cost) in METHODS {
        for &(dataset, models, size) in DATASETS {
            let runs: Vec<Run> = (0..RUNS)
                .map(|run| simulate_run(&mut rng, dataset, models, size, quality, cost, run, None))
                .collect();
            write_json_lines(&results.join(method).join(dataset).join("runs.jsonl"), &runs)?;
            files += 1;
        }
    }

    // results/RaQuN_k/runs.csv, runs over k = 1..=MAX_K
    let mut incremental = Vec::new();
    for &(dataset, models, size) in DATASETS {
        for k in 1..=MAX_K {
            for run in 0..RUNS {
                incremental.push(simulate_run(&mut rng, dataset, models, size, 0.82, 0.0004, run, Some(k)));
            }
        }
    }
    write_csv(&results.join("RaQuN_k").join("runs.csv"), &incremental)?;
    files += 1;

    // results/argouml/<method>/runs.parquet over the random subsets
    let subsets: Vec<(String, u32)> = std::iter::once(1)
        .chain((1..20).map(|i| i * 5))
        .map(|p| (format!("argouml_p{p:03}"), p))
        .chain(std::iter::once(("argouml".to_string(), 100)))
        .collect();
    let argo_methods = METHODS
        .iter()
        .map(|&(m, q, c)| (m, q, c, None))
        .chain((1..=MAX_K).map(|k| ("RaQuN_k", 0.82, 0.0004, Some(k))));
    let mut argo_runs: std::collections::BTreeMap<&str, Vec<Run>> = Default::default();
    for (method, quality, cost, k) in argo_methods {
        for (subset, percent) in &subsets {
            let size = 1500 * percent / 100;
            for run in 0..RUNS {
                let r = simulate_run(&mut rng, subset, 7, size.max(10), quality, cost, run, k);
                argo_runs.entry(method).or_default().push(r);
            }
        }
    }
    for (method, runs) in &argo_runs {
        let batch = runs_to_batch(runs)?;
        write_parquet(&results.join("argouml").join(method).join("runs.parquet"), &batch)?;
        files += 1;
        if *method == "NwM" {
            arrow::util::pretty::print_batches(&[batch.slice(0, 5.min(batch.num_rows()))])?;
        }
    }

    // experimental_subjects/<dataset>.csv and argouml/<subset>/subset_<i>.csv
    for &(dataset, models, size) in DATASETS {
        write_subject(&subjects.join(format!("{dataset}.csv")), models, size.min(200), &mut rng)?;
        files += 1;
    }
    for (subset, percent) in &subsets {
        let sets = if subset == "argouml" { 1 } else { 3 };
        for i in 0..sets {
            let path = subjects.join("argouml").join(subset).join(format!("subset_{i}.csv"));
            write_subject(&path, 7, (1500 * percent / 100).clamp(10, 300), &mut rng)?;
            files += 1;
        }
    }

    println!("Wrote {files} files below {}", root.display());
    Ok(())
}
