//! Conversions between numpy arrays and simulation tables.

use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::core::error::GrowthError;

/// Convert numpy array to Vec<f64>.
pub fn numpy_to_vec_f64(arr: PyReadonlyArray1<f64>) -> Vec<f64> {
    arr.as_array().to_vec()
}

/// Convert numpy day indices to Vec<usize>, rejecting negative days.
pub fn numpy_to_days(arr: PyReadonlyArray1<i64>) -> PyResult<Vec<usize>> {
    arr.as_array()
        .iter()
        .map(|&d| {
            usize::try_from(d).map_err(|_| {
                pyo3::exceptions::PyValueError::new_err(format!("negative day index {}", d))
            })
        })
        .collect()
}

/// Convert a 2D numpy array into row vectors.
pub fn numpy_to_table_f64(arr: PyReadonlyArray2<f64>) -> Vec<Vec<f64>> {
    arr.as_array().rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Convert Vec<f64> to numpy array.
pub fn vec_to_numpy_f64<'py>(py: Python<'py>, vec: Vec<f64>) -> &'py PyArray1<f64> {
    PyArray1::from_vec(py, vec)
}

/// Convert day indices to an int64 numpy array.
pub fn days_to_numpy<'py>(py: Python<'py>, days: &[usize]) -> &'py PyArray1<i64> {
    PyArray1::from_vec(py, days.iter().map(|&d| d as i64).collect())
}

/// Convert row vectors into a 2D numpy array.
pub fn table_to_numpy_f64<'py>(py: Python<'py>, table: &[Vec<f64>]) -> PyResult<&'py PyArray2<f64>> {
    PyArray2::from_vec2(py, table).map_err(|e| {
        GrowthError::PythonError {
            message: e.to_string(),
        }
        .into()
    })
}
