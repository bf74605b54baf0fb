//! Isolation forest.
//!
//! Anomalies are isolated by fewer random axis-aligned splits than normal
//! points. Each tree is grown on a random sub-sample without replacement;
//! the score of a row is `2^(-E[h(x)] / c(psi))` where `h` is the path
//! length and `c` the average path length of an unsuccessful BST search.

use super::{validate_query, validate_training, AnomalyDetector};
use crate::core::Matrix;
use crate::error::{EvalError, Result};
use rand::rngs::StdRng;
use rand::{seq::index, Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful search in a BST of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn grow(data: &Matrix, rows: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        Self {
            root: Self::grow_node(data, rows, 0, max_depth, rng),
        }
    }

    fn grow_node(
        data: &Matrix,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        if depth >= max_depth || rows.len() <= 1 {
            return Node::Leaf { size: rows.len() };
        }

        // only features that still vary inside this node can split it
        let ranges: Vec<(usize, f64, f64)> = (0..data.ncols())
            .filter_map(|j| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, &i| {
                    let v = data[(i, j)];
                    (acc.0.min(v), acc.1.max(v))
                });
                (hi > lo).then_some((j, lo, hi))
            })
            .collect();
        if ranges.is_empty() {
            return Node::Leaf { size: rows.len() };
        }

        let (feature, lo, hi) = ranges[rng.gen_range(0..ranges.len())];
        // convex combination stays finite even when `hi - lo` overflows
        let u: f64 = rng.gen();
        let threshold = (lo * (1.0 - u) + hi * u).clamp(lo, hi);
        let (left, right): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&i| data[(i, feature)] < threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(Self::grow_node(data, left, depth + 1, max_depth, rng)),
            right: Box::new(Self::grow_node(data, right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *threshold {
                        left
                    } else {
                        right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Isolation forest detector.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_trees: usize,
    max_samples: usize,
    seed: u64,
    trees: Vec<IsolationTree>,
    sample_size: usize,
    ncols: usize,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl IsolationForest {
    /// 100 trees, sub-samples of at most 256 rows, seed 123.
    pub fn new() -> Self {
        Self {
            n_trees: 100,
            max_samples: 256,
            seed: 123,
            trees: Vec::new(),
            sample_size: 0,
            ncols: 0,
        }
    }

    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, data: &Matrix) -> Result<()> {
        validate_training(data)?;
        if self.n_trees == 0 || self.max_samples == 0 {
            return Err(EvalError::InvalidParameter(
                "isolation forest needs at least one tree and one sample".to_string(),
            ));
        }

        let n = data.nrows();
        let psi = self.max_samples.min(n);
        let max_depth = (psi.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees = (0..self.n_trees)
            .map(|_| {
                let rows = index::sample(&mut rng, n, psi).into_vec();
                IsolationTree::grow(data, rows, max_depth, &mut rng)
            })
            .collect();
        self.sample_size = psi;
        self.ncols = data.ncols();
        Ok(())
    }

    fn anomaly_scores(&self, data: &Matrix) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(EvalError::FitRequired);
        }
        validate_query(data, self.ncols)?;

        let c = average_path_length(self.sample_size);
        Ok(data
            .rows()
            .map(|row| {
                let mean_depth = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
                    / self.trees.len() as f64;
                if c > 0.0 {
                    2f64.powf(-mean_depth / c)
                } else {
                    0.5
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "IF"
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
