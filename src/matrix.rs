//! Square cost matrix with sub-matrix extraction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Cost;

/// Immutable square matrix of travel costs, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    size: usize,
    data: Vec<Cost>,
}

impl Matrix {
    /// Build a matrix from rows, checking squareness.
    pub fn new(rows: Vec<Vec<Cost>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);

        for row in &rows {
            if row.len() != size {
                return Err(Error::InvalidInput(format!(
                    "matrix row has {} entries, expected {}",
                    row.len(),
                    size
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Matrix { size, data })
    }

    /// Number of rows (equal to the number of columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of traveling from `from` to `to`.
    pub fn get(&self, from: usize, to: usize) -> Cost {
        self.data[from * self.size + to]
    }

    /// Extract the sub-matrix over the given location indices, in order.
    pub fn sub_matrix(&self, indices: &[usize]) -> Matrix {
        let size = indices.len();
        let mut data = Vec::with_capacity(size * size);

        for &i in indices {
            for &j in indices {
                data.push(self.get(i, j));
            }
        }

        Matrix { size, data }
    }
}
