//! Per-series AUC table addressed by named keys.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input representation handed to the detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    /// Raw sliding-window subsequences.
    #[serde(rename = "TS")]
    Subsequences,
    /// Cleaned feature vectors extracted from the subsequences.
    #[serde(rename = "FE")]
    Features,
}

impl Representation {
    pub const ALL: [Representation; 2] = [Representation::Subsequences, Representation::Features];

    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Subsequences => "TS",
            Representation::Features => "FE",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Grid = Vec<Vec<Option<f64>>>;

fn check_unique<T: PartialEq + fmt::Display>(keys: &[T], what: &str) -> Result<()> {
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].contains(key) {
            return Err(EvalError::InvalidParameter(format!("duplicate {what} {key}")));
        }
    }
    Ok(())
}

/// Persisted shape: `{"TS": [[..]], "FE": [[..]]}`, rows by window size,
/// columns by method, `null` for cells that were not computed.
#[derive(Debug, Serialize, Deserialize)]
struct WireTable {
    #[serde(rename = "TS")]
    ts: Grid,
    #[serde(rename = "FE")]
    fe: Grid,
}

/// AUC per (representation, window size, method).
///
/// `None` marks a cell whose computation failed or has not run yet.
#[derive(Debug, Clone, PartialEq)]
pub struct AucTable {
    window_sizes: Vec<usize>,
    methods: Vec<String>,
    ts: Grid,
    fe: Grid,
}

impl AucTable {
    /// Table with every cell unset.
    ///
    /// Window sizes and method names address cells, so neither may repeat.
    pub fn new(window_sizes: Vec<usize>, methods: Vec<String>) -> Result<Self> {
        check_unique(&window_sizes, "window size")?;
        check_unique(&methods, "method")?;
        let grid = vec![vec![None; methods.len()]; window_sizes.len()];
        Ok(Self {
            ts: grid.clone(),
            fe: grid,
            window_sizes,
            methods,
        })
    }

    pub fn window_sizes(&self) -> &[usize] {
        &self.window_sizes
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    fn grid(&self, rep: Representation) -> &Grid {
        match rep {
            Representation::Subsequences => &self.ts,
            Representation::Features => &self.fe,
        }
    }

    fn grid_mut(&mut self, rep: Representation) -> &mut Grid {
        match rep {
            Representation::Subsequences => &mut self.ts,
            Representation::Features => &mut self.fe,
        }
    }

    fn position(&self, window_size: usize, method: &str) -> Result<(usize, usize)> {
        let row = self
            .window_sizes
            .iter()
            .position(|&w| w == window_size)
            .ok_or_else(|| {
                EvalError::InvalidParameter(format!("unknown window size {window_size}"))
            })?;
        let col = self
            .methods
            .iter()
            .position(|m| m == method)
            .ok_or_else(|| EvalError::InvalidParameter(format!("unknown method {method}")))?;
        Ok((row, col))
    }

    pub fn get(&self, rep: Representation, window_size: usize, method: &str) -> Result<Option<f64>> {
        let (row, col) = self.position(window_size, method)?;
        Ok(self.grid(rep)[row][col])
    }

    pub fn set(
        &mut self,
        rep: Representation,
        window_size: usize,
        method: &str,
        value: Option<f64>,
    ) -> Result<()> {
        let (row, col) = self.position(window_size, method)?;
        self.grid_mut(rep)[row][col] = value;
        Ok(())
    }

    /// Number of cells holding a value.
    pub fn computed_cells(&self) -> usize {
        self.ts
            .iter()
            .chain(&self.fe)
            .flatten()
            .filter(|c| c.is_some())
            .count()
    }

    pub fn total_cells(&self) -> usize {
        2 * self.window_sizes.len() * self.methods.len()
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        let wire = WireTable {
            ts: self.ts.clone(),
            fe: self.fe.clone(),
        };
        Ok(serde_json::to_value(wire)?)
    }

    /// Reads a persisted table back, checking it against the expected keys.
    pub fn from_json(
        value: serde_json::Value,
        window_sizes: Vec<usize>,
        methods: Vec<String>,
    ) -> Result<Self> {
        check_unique(&window_sizes, "window size")?;
        check_unique(&methods, "method")?;
        let wire: WireTable = serde_json::from_value(value)?;
        for grid in [&wire.ts, &wire.fe] {
            if grid.len() != window_sizes.len() {
                return Err(EvalError::DimensionMismatch {
                    expected: window_sizes.len(),
                    got: grid.len(),
                });
            }
            if let Some(row) = grid.iter().find(|r| r.len() != methods.len()) {
                return Err(EvalError::DimensionMismatch {
                    expected: methods.len(),
                    got: row.len(),
                });
            }
        }
        Ok(Self {
            window_sizes,
            methods,
            ts: wire.ts,
            fe: wire.fe,
        })
    }
}
