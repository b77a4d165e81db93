//! # Matrix implementation
//!
//! A dense, row-major matrix of `f64` values. Rows and columns can be appended and removed, which
//! is how constraints and variables are added to a tableau during branching and cutting.
use std::ops::{Index, IndexMut};

/// Uses a `Vec<Vec<f64>>` as underlying data structure, with one `Vec` per row.
///
/// All rows always have the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
    data: Vec<Vec<f64>>,
    nr_rows: usize,
    nr_columns: usize,
}

impl DenseMatrix {
    /// Create a `DenseMatrix` from the provided rows.
    ///
    /// # Arguments
    ///
    /// * `data`: Rows of the matrix, all of equal length.
    ///
    /// # Return value
    ///
    /// The matrix, or `None` if the rows don't all have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Option<Self> {
        let nr_rows = data.len();
        let nr_columns = data.first().map_or(0, Vec::len);
        if data.iter().any(|row| row.len() != nr_columns) {
            return None;
        }

        Some(Self { data, nr_rows, nr_columns })
    }

    /// Get all values in row `i` of this matrix.
    pub fn row(&self, i: usize) -> &[f64] {
        debug_assert!(i < self.nr_rows);

        &self.data[i]
    }

    /// Iterate over the values of column `j`, top to bottom.
    pub fn column_iter(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        debug_assert!(j < self.nr_columns);

        self.data.iter().map(move |row| row[j])
    }

    /// Multiply row `i` with a factor `factor`.
    pub fn multiply_row(&mut self, i: usize, factor: f64) {
        debug_assert!(i < self.nr_rows);

        for value in &mut self.data[i] {
            *value *= factor;
        }
    }

    /// Add a multiple of row `read_row` to row `write_row`.
    pub fn mul_add_rows(&mut self, read_row: usize, write_row: usize, factor: f64) {
        debug_assert!(read_row < self.nr_rows);
        debug_assert!(write_row < self.nr_rows);
        debug_assert_ne!(read_row, write_row);

        for j in 0..self.nr_columns {
            let read = self.data[read_row][j];
            self.data[write_row][j] += factor * read;
        }
    }

    /// Append a row at the bottom of the matrix.
    pub fn push_row(&mut self, row: Vec<f64>) {
        debug_assert_eq!(row.len(), self.nr_columns);

        self.data.push(row);
        self.nr_rows += 1;
    }

    /// Insert a column such that it ends up at index `j`.
    ///
    /// Columns at index `j` and beyond shift one position to the right.
    pub fn insert_column(&mut self, j: usize, column: &[f64]) {
        debug_assert!(j <= self.nr_columns);
        debug_assert_eq!(column.len(), self.nr_rows);

        for (row, &value) in self.data.iter_mut().zip(column) {
            row.insert(j, value);
        }
        self.nr_columns += 1;
    }

    /// Remove row `i`, shifting all rows below it up.
    pub fn remove_row(&mut self, i: usize) -> Vec<f64> {
        debug_assert!(i < self.nr_rows);

        self.nr_rows -= 1;
        self.data.remove(i)
    }

    /// Remove column `j`, shifting all columns to the right of it to the left.
    pub fn remove_column(&mut self, j: usize) -> Vec<f64> {
        debug_assert!(j < self.nr_columns);

        self.nr_columns -= 1;
        self.data.iter_mut().map(|row| row.remove(j)).collect()
    }

    /// Get the number of rows in this matrix.
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Get the number of columns in this matrix.
    pub fn nr_columns(&self) -> usize {
        self.nr_columns
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i][j]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i][j]
    }
}
