//! Column schemas describing a model's input and output tensors
//!
//! A [`Schema`] is an ordered mapping from column name to [`ColumnSchema`],
//! one per named tensor in a model's serving signature. Column schemas carry
//! the element type, list encoding (fixed or ragged length), and optional
//! explicit shape dimensions that drive the serving-config translation.

use serde::{Deserialize, Serialize};

/// Scalar element type of a tensor column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    String,
}

/// One explicit shape dimension of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dim {
    /// Known fixed extent
    Fixed(i64),
    /// Unknown or variable extent
    Unknown,
    /// Bounded extent with a minimum and maximum
    Range { min: i64, max: i64 },
}

/// Bounds on the number of values in a list column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub min: i64,
    pub max: i64,
}

impl ValueCount {
    /// Create value-count bounds
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether the bounds pin the list to a single fixed length
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

/// Descriptor for one named tensor column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column (tensor) name
    pub name: String,
    /// Scalar element type
    pub dtype: DType,
    /// Whether the column holds list values
    pub is_list: bool,
    /// Whether list lengths vary per row (only meaningful when `is_list`)
    pub is_ragged: bool,
    /// Explicit shape dimensions, when known
    pub dims: Option<Vec<Dim>>,
    /// List-length bounds, when known
    pub value_count: Option<ValueCount>,
}

impl ColumnSchema {
    /// Create a plain scalar column
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            dtype,
            is_list: false,
            is_ragged: false,
            dims: None,
            value_count: None,
        }
    }

    /// Mark the column as a list with per-row (ragged) lengths
    pub fn as_list(mut self) -> Self {
        self.is_list = true;
        self.is_ragged = true;
        self
    }

    /// Mark the column as a fixed-length list of `length` values per row
    pub fn with_fixed_list_length(mut self, length: i64) -> Self {
        self.is_list = true;
        self.is_ragged = false;
        self.value_count = Some(ValueCount::new(length, length));
        self
    }

    /// Attach explicit shape dimensions
    pub fn with_dims(mut self, dims: Vec<Dim>) -> Self {
        self.dims = Some(dims);
        self
    }

    /// Attach list-length bounds
    pub fn with_value_count(mut self, min: i64, max: i64) -> Self {
        self.value_count = Some(ValueCount::new(min, max));
        self
    }

    /// The fixed list length, when the column is a non-ragged list whose
    /// value-count bounds agree
    pub fn fixed_list_length(&self) -> Option<i64> {
        if !self.is_list || self.is_ragged {
            return None;
        }
        self.value_count.filter(|vc| vc.is_fixed()).map(|vc| vc.max)
    }
}

/// Ordered mapping from column name to [`ColumnSchema`]
///
/// Represents either a model's input tensor set or its output tensor set.
/// Insertion order is preserved and drives every downstream listing
/// (config tensors, transform marshalling); re-inserting an existing name
/// replaces the column in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, replacing any existing column of the same name
    /// without disturbing its position
    pub fn insert(&mut self, column: ColumnSchema) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column of this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Iterate columns in schema order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Vec<ColumnSchema>> for Schema {
    fn from(columns: Vec<ColumnSchema>) -> Self {
        let mut schema = Schema::new();
        for column in columns {
            schema.insert(column);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_column_defaults() {
        let col = ColumnSchema::new("age", DType::Int64);
        assert!(!col.is_list);
        assert!(!col.is_ragged);
        assert!(col.dims.is_none());
        assert_eq!(col.fixed_list_length(), None);
    }

    #[test]
    fn test_list_column_is_ragged_by_default() {
        let col = ColumnSchema::new("genres", DType::Int32).as_list();
        assert!(col.is_list);
        assert!(col.is_ragged);
        assert_eq!(col.fixed_list_length(), None);
    }

    #[test]
    fn test_fixed_list_length() {
        let col = ColumnSchema::new("embedding", DType::Float32).with_fixed_list_length(16);
        assert!(col.is_list);
        assert!(!col.is_ragged);
        assert_eq!(col.fixed_list_length(), Some(16));
    }

    #[test]
    fn test_value_count_bounds_are_not_fixed_length() {
        let col = ColumnSchema::new("tags", DType::Int32)
            .as_list()
            .with_value_count(1, 4);
        assert_eq!(col.fixed_list_length(), None);
    }

    #[test]
    fn test_schema_preserves_insertion_order() {
        let mut schema = Schema::new();
        schema.insert(ColumnSchema::new("b", DType::Float32));
        schema.insert(ColumnSchema::new("a", DType::Float32));
        schema.insert(ColumnSchema::new("c", DType::Int64));
        assert_eq!(schema.column_names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_schema_insert_replaces_in_place() {
        let mut schema = Schema::new();
        schema.insert(ColumnSchema::new("a", DType::Float32));
        schema.insert(ColumnSchema::new("b", DType::Float32));
        schema.insert(ColumnSchema::new("a", DType::Int64));

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.column_names(), vec!["a", "b"]);
        assert_eq!(schema.get("a").unwrap().dtype, DType::Int64);
    }

    #[test]
    fn test_schema_from_vec() {
        let schema = Schema::from(vec![
            ColumnSchema::new("x", DType::Float32),
            ColumnSchema::new("y", DType::Float32),
        ]);
        assert_eq!(schema.len(), 2);
        assert!(schema.contains("x"));
        assert!(!schema.contains("z"));
    }

    #[test]
    fn test_schema_serde_roundtrip() {
        let schema = Schema::from(vec![
            ColumnSchema::new("ids", DType::Int32).with_fixed_list_length(8),
            ColumnSchema::new("score", DType::Float64),
        ]);
        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
