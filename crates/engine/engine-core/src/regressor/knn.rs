//! K-Nearest Neighbors over training windows
//!
//! Stores every normalized training window with the value that followed it.
//! A forecast finds the K closest stored windows and averages their
//! successors, weighted by inverse distance.
//!
//! ## Distance Metrics
//!
//! - Euclidean distance (default)
//! - Manhattan (L1) distance

use engine_api::{DistanceMetric, EngineError, Result, SequenceRegressor, TrainingSet};
use serde::{Deserialize, Serialize};

/// Added to every distance so exact matches do not divide by zero.
const DISTANCE_EPSILON: f64 = 1e-10;

/// K-Nearest Neighbors sequence regressor
///
/// @complexity O(n*w) fit, O(n*w + n log n) predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnRegressor {
    /// Number of neighbors
    k: usize,
    /// Distance metric
    metric: DistanceMetric,
    /// Stored windows from training data
    windows: Vec<Vec<f64>>,
    /// Value that followed each window
    next_values: Vec<f64>,
}

impl KnnRegressor {
    /// Create a new KNN regressor
    ///
    /// # Arguments
    ///
    /// * `k` - Number of neighbors to consider
    /// * `metric` - Distance metric for similarity
    pub fn new(k: usize, metric: DistanceMetric) -> Result<Self> {
        if k < 1 {
            return Err(EngineError::invalid_parameter("k", "must be at least 1"));
        }

        Ok(Self {
            k,
            metric,
            windows: Vec::new(),
            next_values: Vec::new(),
        })
    }

    /// Compute distance between two windows
    fn compute_distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.metric {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
        }
    }

    /// Find K nearest neighbors to a query window
    fn find_neighbors(&self, query: &[f64]) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = self
            .windows
            .iter()
            .enumerate()
            .map(|(i, window)| (i, self.compute_distance(query, window)))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(self.k);

        distances
    }

    /// Get the number of stored patterns
    pub fn n_patterns(&self) -> usize {
        self.windows.len()
    }
}

impl SequenceRegressor for KnnRegressor {
    fn name(&self) -> &str {
        "knn"
    }

    fn fit(&mut self, training: &TrainingSet) -> Result<()> {
        if training.is_empty() {
            return Err(EngineError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        self.windows = training.windows().to_vec();
        self.next_values = training.targets().to_vec();
        Ok(())
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        let expected = self.input_size().ok_or(EngineError::NotFitted)?;
        if window.len() != expected {
            return Err(EngineError::invalid_parameter(
                "window",
                format!("expected {} values, got {}", expected, window.len()),
            ));
        }

        let neighbors = self.find_neighbors(window);
        let total_weight: f64 = neighbors
            .iter()
            .map(|(_, d)| 1.0 / (d + DISTANCE_EPSILON))
            .sum();
        let weighted_sum: f64 = neighbors
            .iter()
            .map(|(idx, d)| self.next_values[*idx] / (d + DISTANCE_EPSILON))
            .sum();

        Ok(weighted_sum / total_weight)
    }

    fn input_size(&self) -> Option<usize> {
        self.windows.first().map(Vec::len)
    }
}

// Private method tests must stay here
#[cfg(test)]
mod tests {
    use super::*;

    fn training() -> TrainingSet {
        TrainingSet::new(
            vec![vec![0.0, 0.1], vec![0.5, 0.6], vec![0.9, 1.0]],
            vec![0.2, 0.7, 0.8],
        )
        .unwrap()
    }

    #[test]
    fn test_distance_metrics() {
        let knn = KnnRegressor::new(1, DistanceMetric::Euclidean).unwrap();
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];

        let euclidean = knn.compute_distance(&a, &b);
        assert!((euclidean - (27.0_f64).sqrt()).abs() < 1e-10);

        let knn = KnnRegressor::new(1, DistanceMetric::Manhattan).unwrap();
        let manhattan = knn.compute_distance(&a, &b);
        assert!((manhattan - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_single_neighbor_returns_successor() {
        let mut knn = KnnRegressor::new(1, DistanceMetric::Euclidean).unwrap();
        knn.fit(&training()).unwrap();

        assert_eq!(knn.n_patterns(), 3);
        assert!((knn.predict(&[0.52, 0.61]).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_exact_match_dominates_weighting() {
        let mut knn = KnnRegressor::new(3, DistanceMetric::Manhattan).unwrap();
        knn.fit(&training()).unwrap();
        assert!((knn.predict(&[0.9, 1.0]).unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_patterns() {
        let mut knn = KnnRegressor::new(10, DistanceMetric::Euclidean).unwrap();
        knn.fit(&training()).unwrap();
        let forecast = knn.predict(&[0.4, 0.5]).unwrap();
        assert!(forecast > 0.2 && forecast < 0.8);
    }

    #[test]
    fn test_invalid_k() {
        assert!(KnnRegressor::new(0, DistanceMetric::Euclidean).is_err());
    }

    #[test]
    fn test_unfitted() {
        let knn = KnnRegressor::new(2, DistanceMetric::Euclidean).unwrap();
        assert!(matches!(knn.predict(&[0.1]), Err(EngineError::NotFitted)));
    }
}
