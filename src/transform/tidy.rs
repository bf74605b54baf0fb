//! Long ("tidy") layout expected by the feature extractor.
//!
//! Each cell `(row, col)` of a [`WindowTable`] becomes one observation
//! `(id = window_id(row), time = col, value)`. Rows are ordered by
//! `(id, time)`, which for zero-padded ids is the original row order.

use super::window::{window_id, WindowTable};
use crate::core::Matrix;
use crate::error::{EvalError, Result};

/// One observation of the tidy table.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRow {
    pub id: String,
    pub time: usize,
    pub value: f64,
}

/// Long-format table with one `(id, time, value)` observation per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    rows: Vec<TidyRow>,
}

impl TidyTable {
    /// Build from raw rows. Rows are sorted by `(id, time)`.
    pub fn from_rows(mut rows: Vec<TidyRow>) -> Self {
        rows.sort_by(|a, b| a.id.cmp(&b.id).then(a.time.cmp(&b.time)));
        Self { rows }
    }

    /// Build from rows kept in the given order.
    pub fn from_rows_unchecked(rows: Vec<TidyRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when rows are ordered by `(id, time)` with no duplicate pair.
    pub fn is_sorted(&self) -> bool {
        self.rows.windows(2).all(|w| {
            (w[0].id.as_str(), w[0].time) < (w[1].id.as_str(), w[1].time)
        })
    }

    /// Contiguous runs of rows sharing the same id, in table order.
    pub fn groups(&self) -> Vec<(&str, Vec<f64>)> {
        let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
        for row in &self.rows {
            let last = groups.len();
            if last > 0 && groups[last - 1].0 == row.id {
                groups[last - 1].1.push(row.value);
            } else {
                groups.push((row.id.as_str(), vec![row.value]));
            }
        }
        groups
    }

    /// Pivot back to wide form.
    ///
    /// Every id must carry the same contiguous time range `0..size`.
    pub fn to_wide(&self) -> Result<WindowTable> {
        if !self.is_sorted() {
            return Err(EvalError::InvalidParameter(
                "tidy table must be sorted by (id, time) without duplicates".to_string(),
            ));
        }
        let groups = self.groups();
        let size = groups.first().map_or(0, |(_, v)| v.len());

        let mut data = Vec::with_capacity(self.rows.len());
        let mut offset = 0;
        for (_, values) in &groups {
            if values.len() != size {
                return Err(EvalError::DimensionMismatch {
                    expected: size,
                    got: values.len(),
                });
            }
            for (t, row) in self.rows[offset..offset + size].iter().enumerate() {
                if row.time != t {
                    return Err(EvalError::InvalidParameter(format!(
                        "id {} is missing time offset {t}",
                        row.id
                    )));
                }
            }
            offset += size;
            data.extend_from_slice(values);
        }
        let matrix = Matrix::from_row_major(data, groups.len(), size)?;
        Ok(WindowTable::from_matrix(matrix))
    }
}

/// Reshape a windowed table into the tidy layout.
///
/// Output row count is `table.len() * table.size()`; no value is lost or
/// duplicated.
pub fn to_tidy(table: &WindowTable) -> TidyTable {
    let mut rows = Vec::with_capacity(table.len() * table.size());
    for i in 0..table.len() {
        let id = window_id(i);
        for (time, &value) in table.window(i).iter().enumerate() {
            rows.push(TidyRow {
                id: id.clone(),
                time,
                value,
            });
        }
    }
    // already in (id, time) order
    TidyTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::window::sliding_window;

    #[test]
    fn to_tidy_layout() {
        let table = sliding_window(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        let tidy = to_tidy(&table);

        assert_eq!(tidy.len(), 6);
        assert!(tidy.is_sorted());
        assert_eq!(
            tidy.rows()[0],
            TidyRow {
                id: "w000000".to_string(),
                time: 0,
                value: 1.0
            }
        );
        assert_eq!(
            tidy.rows()[5],
            TidyRow {
                id: "w000001".to_string(),
                time: 2,
                value: 4.0
            }
        );
    }

    #[test]
    fn round_trip_recovers_table() {
        let values: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin()).collect();
        let table = sliding_window(&values, 8).unwrap();
        let back = to_tidy(&table).to_wide().unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn from_rows_sorts() {
        let rows = vec![
            TidyRow { id: "w000001".into(), time: 0, value: 3.0 },
            TidyRow { id: "w000000".into(), time: 1, value: 2.0 },
            TidyRow { id: "w000000".into(), time: 0, value: 1.0 },
            TidyRow { id: "w000001".into(), time: 1, value: 4.0 },
        ];
        let tidy = TidyTable::from_rows(rows);
        assert!(tidy.is_sorted());
        let wide = tidy.to_wide().unwrap();
        assert_eq!(wide.window(0), &[1.0, 2.0]);
        assert_eq!(wide.window(1), &[3.0, 4.0]);
    }

    #[test]
    fn to_wide_rejects_ragged_groups() {
        let rows = vec![
            TidyRow { id: "a".into(), time: 0, value: 1.0 },
            TidyRow { id: "a".into(), time: 1, value: 2.0 },
            TidyRow { id: "b".into(), time: 0, value: 3.0 },
        ];
        assert!(TidyTable::from_rows(rows).to_wide().is_err());
    }

    #[test]
    fn to_wide_rejects_gaps() {
        let rows = vec![
            TidyRow { id: "a".into(), time: 0, value: 1.0 },
            TidyRow { id: "a".into(), time: 2, value: 2.0 },
        ];
        assert!(matches!(
            TidyTable::from_rows(rows).to_wide(),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn groups_follow_ids() {
        let table = sliding_window(&[1.0, 2.0, 3.0], 2).unwrap();
        let tidy = to_tidy(&table);
        let groups = tidy.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("w000000", vec![1.0, 2.0]));
        assert_eq!(groups[1], ("w000001", vec![2.0, 3.0]));
    }
}
