use crate::errors::{ConfigurationError, CorpusError, Result, SimBotError};

/// One step of a historical trajectory: the fractional price change over the
/// step (0.01 = +1%, 1.0 = price doubled) and the price level the source
/// trajectory reached after applying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub change_pct: f64,
    pub price: f64,
}

/// An ordered, immutable sequence of price changes used as a stand-in for an
/// unknown future trajectory.
///
/// The simulation consumes `change_pct` entries in order; the `price` column
/// records the levels the changes produce from the path's base price and is
/// kept for diagnostics only.
#[derive(Debug, Clone)]
pub struct InfoPath {
    steps: Vec<PathStep>,
}

impl InfoPath {
    /// Build a path from raw fractional changes, deriving price levels from
    /// `base_price`.
    pub fn from_changes(changes: &[f64], base_price: f64) -> Self {
        let mut price = base_price;
        let steps = changes
            .iter()
            .map(|&change_pct| {
                price *= 1.0 + change_pct;
                PathStep { change_pct, price }
            })
            .collect();
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The fractional change consumed at `cursor`, or None past the end
    pub fn change_at(&self, cursor: usize) -> Option<f64> {
        self.steps.get(cursor).map(|s| s.change_pct)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

/// Read-only pool of info paths, validated against the simulation horizon at
/// construction so the search never consumes past a path's end.
///
/// The pool is shared by reference across searches; each search only keeps an
/// index of its active path.
#[derive(Debug, Clone)]
pub struct PathPool {
    paths: Vec<InfoPath>,
    horizon: usize,
}

impl PathPool {
    /// Validates that the pool is non-empty and every path covers `horizon`
    /// steps with finite changes. Fails fast on mismatch rather than letting
    /// a short path corrupt reward estimates mid-search.
    pub fn new(paths: Vec<InfoPath>, horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(SimBotError::Configuration(ConfigurationError::ZeroHorizon));
        }
        if paths.is_empty() {
            return Err(SimBotError::Configuration(ConfigurationError::EmptyPathPool));
        }
        for (path_index, path) in paths.iter().enumerate() {
            if path.len() < horizon {
                return Err(SimBotError::Corpus(CorpusError::PathTooShort {
                    path_index,
                    length: path.len(),
                    required: horizon,
                }));
            }
            for (step, s) in path.steps().iter().enumerate() {
                if !s.change_pct.is_finite() {
                    return Err(SimBotError::Corpus(CorpusError::NonFiniteChange {
                        path_index,
                        step,
                    }));
                }
            }
        }
        Ok(Self { paths, horizon })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn get(&self, index: usize) -> &InfoPath {
        &self.paths[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_changes_derives_price_levels() {
        let path = InfoPath::from_changes(&[0.1, -0.5, 0.0], 100.0);
        assert_eq!(path.len(), 3);
        let steps = path.steps();
        assert!((steps[0].price - 110.0).abs() < 1e-9);
        assert!((steps[1].price - 55.0).abs() < 1e-9);
        assert!((steps[2].price - 55.0).abs() < 1e-9);
        assert_eq!(path.change_at(1), Some(-0.5));
        assert_eq!(path.change_at(3), None);
    }

    #[test]
    fn test_pool_rejects_empty() {
        let err = PathPool::new(vec![], 5).unwrap_err();
        assert!(matches!(
            err,
            SimBotError::Configuration(ConfigurationError::EmptyPathPool)
        ));
    }

    #[test]
    fn test_pool_rejects_short_path() {
        let paths = vec![
            InfoPath::from_changes(&[0.0; 5], 1.0),
            InfoPath::from_changes(&[0.0; 3], 1.0),
        ];
        let err = PathPool::new(paths, 5).unwrap_err();
        match err {
            SimBotError::Corpus(CorpusError::PathTooShort {
                path_index,
                length,
                required,
            }) => {
                assert_eq!(path_index, 1);
                assert_eq!(length, 3);
                assert_eq!(required, 5);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_pool_rejects_non_finite_change() {
        let paths = vec![InfoPath::from_changes(&[0.0, f64::NAN, 0.0], 1.0)];
        assert!(PathPool::new(paths, 3).is_err());
    }

    #[test]
    fn test_pool_rejects_zero_horizon() {
        let paths = vec![InfoPath::from_changes(&[0.0; 5], 1.0)];
        assert!(PathPool::new(paths, 0).is_err());
    }
}
