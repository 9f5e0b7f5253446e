use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::Rng;
use std::fs;
use std::path::Path;

use super::info_path::{InfoPath, PathPool};
use crate::logger::{log, LogTag};

/// Load change trajectories from a CSV file, one trajectory per row, one
/// fractional change per column. No header row.
pub fn load_changes_csv(path: &str) -> Result<Vec<Vec<f64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open corpus file: {}", path))?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read {} line {}", path, line + 1))?;
        let mut changes = Vec::with_capacity(record.len());
        for field in record.iter() {
            let value: f64 = field
                .trim()
                .parse()
                .with_context(|| format!("Bad change value '{}' in {} line {}", field, path, line + 1))?;
            changes.push(value);
        }
        rows.push(changes);
    }

    log(
        LogTag::Corpus,
        "DEBUG",
        &format!("Loaded {} trajectories from {}", rows.len(), path),
    );

    Ok(rows)
}

/// Load change trajectories from a JSON array-of-arrays file
pub fn load_changes_json(path: &str) -> Result<Vec<Vec<f64>>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read corpus file: {}", path))?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse corpus file: {}", path))?;
    Ok(rows)
}

/// Load a replay price series from a CSV file with one price per row
pub fn load_price_series_csv(path: &str) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open price series: {}", path))?;

    let mut prices = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read {} line {}", path, line + 1))?;
        let field = record
            .get(0)
            .with_context(|| format!("Empty row in {} line {}", path, line + 1))?;
        let price: f64 = field
            .trim()
            .parse()
            .with_context(|| format!("Bad price '{}' in {} line {}", field, path, line + 1))?;
        prices.push(price);
    }
    Ok(prices)
}

/// Assemble a validated pool from raw change rows.
///
/// Rows longer than the horizon are trimmed to it; rows shorter than the
/// horizon are dropped with a warning (which trajectories qualify is the
/// provider's call, covering the horizon is not negotiable).
pub fn build_pool(
    rows: Vec<Vec<f64>>,
    base_price: f64,
    horizon: usize,
) -> crate::errors::Result<PathPool> {
    let total = rows.len();
    let mut paths = Vec::with_capacity(total);
    for row in rows {
        if row.len() < horizon {
            continue;
        }
        paths.push(InfoPath::from_changes(&row[..horizon], base_price));
    }

    if paths.len() < total {
        log(
            LogTag::Corpus,
            "WARN",
            &format!(
                "Dropped {} of {} trajectories shorter than the {}-step horizon",
                total - paths.len(),
                total,
                horizon
            ),
        );
    }

    PathPool::new(paths, horizon)
}

/// Generate random-walk change trajectories for simulation and benchmarks.
/// Each step moves between -5% and +5%.
pub fn synthetic_changes(count: usize, horizon: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    (0..count)
        .map(|_| (0..horizon).map(|_| rng.gen_range(-0.05..0.05)).collect())
        .collect()
}

/// Load a corpus file by extension (.json or CSV otherwise)
pub fn load_changes(path: &str) -> Result<Vec<Vec<f64>>> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("json") => load_changes_json(path),
        _ => load_changes_csv(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_load_changes_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "0.01,-0.02,0.005").unwrap();
        writeln!(file, "0.0,0.0,0.0").unwrap();
        drop(file);

        let rows = load_changes_csv(path.to_str().unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![0.01, -0.02, 0.005]);
    }

    #[test]
    fn test_load_changes_csv_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "0.01,not_a_number\n").unwrap();
        assert!(load_changes_csv(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_build_pool_trims_and_drops() {
        let rows = vec![
            vec![0.0; 10], // trimmed to horizon
            vec![0.0; 5],  // exact
            vec![0.0; 3],  // dropped
        ];
        let pool = build_pool(rows, 1.0, 5).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).len(), 5);
    }

    #[test]
    fn test_build_pool_all_short_is_error() {
        let rows = vec![vec![0.0; 2]];
        assert!(build_pool(rows, 1.0, 5).is_err());
    }

    #[test]
    fn test_synthetic_changes_shape_and_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = synthetic_changes(8, 12, &mut rng);
        assert_eq!(rows.len(), 8);
        for row in &rows {
            assert_eq!(row.len(), 12);
            assert!(row.iter().all(|c| (-0.05..0.05).contains(c)));
        }
    }

    #[test]
    fn test_load_price_series_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "1.0\n1.1\n0.9\n").unwrap();
        let prices = load_price_series_csv(path.to_str().unwrap()).unwrap();
        assert_eq!(prices, vec![1.0, 1.1, 0.9]);
    }
}
