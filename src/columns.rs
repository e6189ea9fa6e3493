//! Named tensor containers crossing the inference boundary
//!
//! [`ColumnData`] is the caller-facing container at transform time: an
//! ordered mapping from column name to [`TensorValue`]. Values are plain
//! n-dimensional arrays; no schema validation happens here.

use ndarray::ArrayD;

use crate::schema::DType;

/// Typed n-dimensional tensor payload
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
}

impl TensorValue {
    /// Element type of the payload
    pub fn dtype(&self) -> DType {
        match self {
            TensorValue::Float32(_) => DType::Float32,
            TensorValue::Float64(_) => DType::Float64,
            TensorValue::Int32(_) => DType::Int32,
            TensorValue::Int64(_) => DType::Int64,
        }
    }

    /// Shape of the payload
    pub fn shape(&self) -> &[usize] {
        match self {
            TensorValue::Float32(arr) => arr.shape(),
            TensorValue::Float64(arr) => arr.shape(),
            TensorValue::Int32(arr) => arr.shape(),
            TensorValue::Int64(arr) => arr.shape(),
        }
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        match self {
            TensorValue::Float32(arr) => arr.len(),
            TensorValue::Float64(arr) => arr.len(),
            TensorValue::Int32(arr) => arr.len(),
            TensorValue::Int64(arr) => arr.len(),
        }
    }

    /// Whether the payload holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ArrayD<f32>> for TensorValue {
    fn from(arr: ArrayD<f32>) -> Self {
        TensorValue::Float32(arr)
    }
}

impl From<ArrayD<f64>> for TensorValue {
    fn from(arr: ArrayD<f64>) -> Self {
        TensorValue::Float64(arr)
    }
}

impl From<ArrayD<i32>> for TensorValue {
    fn from(arr: ArrayD<i32>) -> Self {
        TensorValue::Int32(arr)
    }
}

impl From<ArrayD<i64>> for TensorValue {
    fn from(arr: ArrayD<i64>) -> Self {
        TensorValue::Int64(arr)
    }
}

/// Ordered mapping from column name to tensor payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnData {
    columns: Vec<(String, TensorValue)>,
}

impl ColumnData {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, replacing any existing column of the same name
    /// without disturbing its position
    pub fn insert(&mut self, name: impl Into<String>, value: TensorValue) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name, value)),
        }
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&TensorValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Column names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Iterate columns in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TensorValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the container has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Vec<(String, TensorValue)>> for ColumnData {
    fn from(columns: Vec<(String, TensorValue)>) -> Self {
        let mut data = ColumnData::new();
        for (name, value) in columns {
            data.insert(name, value);
        }
        data
    }
}
