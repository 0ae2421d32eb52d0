use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::SubjectStats;
use crate::error::ReportError;

// ---------------------------------------------------------------------------
// Experimental subject files
// ---------------------------------------------------------------------------

/// Statistics of the subject `name` below `dir`.
///
/// `dir/<name>.csv` is a single subject. A directory `dir/<name>/` holds
/// several random subsets of one subject (the ArgoUML subsets); its entry is
/// the average over all CSV files in it.
pub fn subject_stats(dir: &Path, name: &str) -> Result<SubjectStats> {
    let file = dir.join(format!("{name}.csv"));
    if file.is_file() {
        return read_subject(&file);
    }

    let set_dir = dir.join(name);
    if !set_dir.is_dir() {
        return Err(ReportError::SubjectNotFound {
            dir: dir.to_path_buf(),
            name: name.to_string(),
        }
        .into());
    }

    let mut files: Vec<_> = std::fs::read_dir(&set_dir)
        .with_context(|| format!("listing {}", set_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")))
        .collect();
    files.sort();

    let mut total = SubjectStats::default();
    for path in &files {
        let stats = read_subject(path)?;
        total.models += stats.models;
        total.elements += stats.elements;
        total.properties += stats.properties;
    }
    let n = files.len();
    if n > 0 {
        total.models /= n as f64;
        total.elements /= n as f64;
        total.properties /= n as f64;
    }
    total.sets = n;
    Ok(total)
}

/// Subject CSV layout, `;`-separated, no header:
///
/// ```text
/// model id;element id;element name;property;property;...
/// ```
///
/// Every line is one element; the number of properties varies per line.
fn read_subject(path: &Path) -> Result<SubjectStats> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening subject {}", path.display()))?;

    let mut models = BTreeSet::new();
    let mut elements = 0usize;
    let mut properties = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} row {row_no}", path.display()))?;
        let Some(model_id) = record.get(0).filter(|id| !id.trim().is_empty()) else {
            continue;
        };
        models.insert(model_id.trim().to_string());
        elements += 1;
        properties += record.iter().skip(3).filter(|p| !p.trim().is_empty()).count();
    }

    Ok(SubjectStats {
        sets: 1,
        models: models.len() as f64,
        elements: elements as f64,
        properties: properties as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn single_subject_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("hospitals.csv"),
            "0;e1;Patient;n_name;n_age\n0;e2;Doctor;n_name\n1;e3;Patient;n_name;n_age;n_ward\n\n",
        )
        .unwrap();

        let stats = subject_stats(tmp.path(), "hospitals").unwrap();
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.models, 2.0);
        assert_eq!(stats.elements, 3.0);
        assert_eq!(stats.properties, 6.0);
        assert_eq!(stats.elements_per_model(), 1.5);
        assert_eq!(stats.properties_per_element(), 2.0);
    }

    #[test]
    fn subset_directory_is_averaged() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("argouml_p010");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("subset_0.csv"), "0;a;A;p\n1;b;B;p\n").unwrap();
        fs::write(dir.join("subset_1.csv"), "0;a;A;p;q\n0;b;B\n1;c;C\n2;d;D\n").unwrap();
        fs::write(dir.join("README"), "ignored").unwrap();

        let stats = subject_stats(tmp.path(), "argouml_p010").unwrap();
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.models, 2.5);
        assert_eq!(stats.elements, 3.0);
        assert_eq!(stats.properties, 2.0);
    }

    #[test]
    fn missing_subject() {
        let tmp = TempDir::new().unwrap();
        let err = subject_stats(tmp.path(), "bcs").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::SubjectNotFound { name, .. }) if name == "bcs"
        ));
    }
}
