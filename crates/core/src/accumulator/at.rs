//! Accumulation of rows grouped by a target index.

use super::{Accumulator, AccumulatorKernel};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::INVALID_INDEX;

/// Group rows of `values` by `indices` and reduce each group.
///
/// With `m = max(indices) + 1`, returns an array of `m` rows where row
/// `i` is `acc({values[j] : indices[j] == i})`. Entries equal to
/// [`INVALID_INDEX`] are skipped. Groups with no member hold the
/// accumulator's identity.
pub fn accumulate_at(
    indices: &[usize],
    values: &DataArray,
    acc: Accumulator,
) -> Result<DataArray> {
    if values.num_items() != indices.len() {
        return Err(HisegError::InvalidShape(format!(
            "values have {} items for {} indices",
            values.num_items(),
            indices.len()
        )));
    }
    let size = indices
        .iter()
        .filter(|&&i| i != INVALID_INDEX)
        .max()
        .map_or(0, |&m| m + 1);

    let width = values.item_size();
    let out_width = acc.output_item_size(width);
    let mut kernels = Vec::with_capacity(size);
    for _ in 0..size {
        kernels.push(AccumulatorKernel::new(acc, width)?);
    }
    for (j, &target) in indices.iter().enumerate() {
        if target != INVALID_INDEX {
            kernels[target].accumulate(values.row(j));
        }
    }
    let mut out = DataArray::zeros(size, out_width);
    for (i, kernel) in kernels.iter_mut().enumerate() {
        out.set_row(i, kernel.finalize());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_sum() {
        let indices = vec![0, 1, 0, 2, 1];
        let values = DataArray::from_scalars(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = accumulate_at(&indices, &values, Accumulator::Sum).unwrap();
        assert_eq!(out.scalars(), &[4.0, 7.0, 4.0]);
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let indices = vec![0, INVALID_INDEX, 1];
        let values = DataArray::from_scalars(vec![1.0, 99.0, 2.0]);
        let out = accumulate_at(&indices, &values, Accumulator::Sum).unwrap();
        assert_eq!(out.scalars(), &[1.0, 2.0]);
    }

    #[test]
    fn test_first_accumulator() {
        let indices = vec![0, 0, 1];
        let values = DataArray::from_scalars(vec![7.0, 8.0, 9.0]);
        let out = accumulate_at(&indices, &values, Accumulator::First).unwrap();
        assert_eq!(out.scalars(), &[7.0, 9.0]);
    }
}
