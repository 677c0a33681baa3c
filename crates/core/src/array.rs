//! Row-major numeric arrays for per-node and per-edge data.
//!
//! Every hierarchy algorithm in this crate consumes either scalar data
//! (one `f64` per item) or vectorial data (a fixed-length row of `f64`
//! per item). [`DataArray`] holds both shapes in one owned container:
//! `item_size == 1` is the scalar case, and a scalar input is just
//! `DataArray::from_scalars(values)`.
//!
//! Rows are addressed along axis 0, so `row(i)` is the data attached to
//! item `i` (a graph vertex, an edge, or a tree node depending on
//! context).

/// Owned row-major 2-D array of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    data: Vec<f64>,
    item_size: usize,
}

impl DataArray {
    /// Create an array from raw row-major data.
    ///
    /// # Panics
    /// Panics if `item_size` is zero or does not divide `data.len()`.
    pub fn new(data: Vec<f64>, item_size: usize) -> Self {
        assert!(item_size > 0, "item size must be positive");
        assert!(
            data.len() % item_size == 0,
            "data length must be a multiple of the item size"
        );
        Self { data, item_size }
    }

    /// Create a scalar array (`item_size == 1`).
    pub fn from_scalars(values: Vec<f64>) -> Self {
        Self {
            data: values,
            item_size: 1,
        }
    }

    /// Create a zero-filled array with `num_items` rows of `item_size`.
    pub fn zeros(num_items: usize, item_size: usize) -> Self {
        assert!(item_size > 0, "item size must be positive");
        Self {
            data: vec![0.0; num_items * item_size],
            item_size,
        }
    }

    /// Number of items (rows).
    pub fn num_items(&self) -> usize {
        self.data.len() / self.item_size
    }

    /// Length of one row.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Whether rows are single scalars.
    pub fn is_scalar(&self) -> bool {
        self.item_size == 1
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.item_size..(i + 1) * self.item_size]
    }

    /// Mutably borrow row `i`.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.item_size..(i + 1) * self.item_size]
    }

    /// Scalar value of item `i`.
    ///
    /// # Panics
    /// Panics if the array is not scalar.
    pub fn scalar(&self, i: usize) -> f64 {
        assert!(self.is_scalar(), "scalar access on a vectorial array");
        self.data[i]
    }

    /// Copy row `src` into row `dst`.
    pub fn copy_row(&mut self, dst: usize, src: usize) {
        let w = self.item_size;
        self.data.copy_within(src * w..(src + 1) * w, dst * w);
    }

    /// Overwrite row `i` with the given values.
    pub fn set_row(&mut self, i: usize, values: &[f64]) {
        self.row_mut(i).copy_from_slice(values);
    }

    /// Append a row.
    ///
    /// # Panics
    /// Panics if the row length differs from the item size.
    pub fn push_row(&mut self, values: &[f64]) {
        assert_eq!(values.len(), self.item_size, "row length mismatch");
        self.data.extend_from_slice(values);
    }

    /// Consume the array and return its raw data.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// View of the scalar values; only defined for scalar arrays.
    ///
    /// # Panics
    /// Panics if the array is not scalar.
    pub fn scalars(&self) -> &[f64] {
        assert!(self.is_scalar(), "scalar access on a vectorial array");
        &self.data
    }
}

impl From<Vec<f64>> for DataArray {
    fn from(values: Vec<f64>) -> Self {
        DataArray::from_scalars(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roundtrip() {
        let a = DataArray::from_scalars(vec![1.0, 2.0, 3.0]);
        assert!(a.is_scalar());
        assert_eq!(a.num_items(), 3);
        assert_eq!(a.scalar(1), 2.0);
    }

    #[test]
    fn test_vectorial_rows() {
        let mut a = DataArray::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);
        assert_eq!(a.num_items(), 3);
        assert_eq!(a.row(1), &[3.0, 4.0]);
        a.copy_row(0, 2);
        assert_eq!(a.row(0), &[5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "multiple of the item size")]
    fn test_bad_shape_panics() {
        let _ = DataArray::new(vec![1.0, 2.0, 3.0], 2);
    }
}
