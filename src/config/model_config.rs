//! Serving model configuration
//!
//! In-memory form of the `config.pbtxt` message: model name, backend and
//! platform identifiers, input/output tensor descriptors, and string
//! parameters. Tensor descriptors are derived from [`ColumnSchema`] values
//! via [`compute_dims`] and [`tensor_configs`].

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnSchema, DType, Dim, Schema};

/// Backend identifier written into generated configs
pub const TENSORFLOW_BACKEND: &str = "tensorflow";

/// Platform identifier for saved-model artifacts
pub const SAVEDMODEL_PLATFORM: &str = "tensorflow_savedmodel";

/// Parameter key selecting the graph tag to load
pub const TF_GRAPH_TAG: &str = "TF_GRAPH_TAG";

/// Parameter key selecting the signature definition to invoke
pub const TF_SIGNATURE_DEF: &str = "TF_SIGNATURE_DEF";

/// Suffix of the values tensor in a ragged list pair
pub const VALUES_SUFFIX: &str = "__values";

/// Suffix of the offsets tensor in a ragged list pair
pub const OFFSETS_SUFFIX: &str = "__offsets";

/// One named tensor in a serving config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorConfig {
    pub name: String,
    pub data_type: DType,
    pub dims: Vec<i64>,
}

impl TensorConfig {
    /// Create a tensor descriptor
    pub fn new(name: impl Into<String>, data_type: DType, dims: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            data_type,
            dims,
        }
    }
}

/// Complete serving configuration for one model package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub backend: String,
    pub platform: String,
    pub inputs: Vec<TensorConfig>,
    pub outputs: Vec<TensorConfig>,
    /// String parameters, serialized in insertion order
    pub parameters: Vec<(String, String)>,
}

impl ModelConfig {
    /// Create an empty config with the given model name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the backend identifier
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Set the platform identifier
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Append a string parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    /// Append the input descriptors for one column
    pub fn add_input(&mut self, column: &ColumnSchema) {
        self.inputs.extend(tensor_configs(column));
    }

    /// Append the output descriptors for one column
    pub fn add_output(&mut self, column: &ColumnSchema) {
        self.outputs.extend(tensor_configs(column));
    }

    /// Build a saved-model serving config from input and output schemas
    ///
    /// Fills in the tensorflow backend/platform identifiers, the graph tag
    /// and signature parameters, and one descriptor per column (two for
    /// ragged list columns).
    pub fn for_saved_model(
        name: impl Into<String>,
        input_schema: &Schema,
        output_schema: &Schema,
    ) -> Self {
        let mut config = ModelConfig::new(name)
            .with_backend(TENSORFLOW_BACKEND)
            .with_platform(SAVEDMODEL_PLATFORM)
            .with_parameter(TF_GRAPH_TAG, "serve")
            .with_parameter(TF_SIGNATURE_DEF, "serving_default");

        for column in input_schema.iter() {
            config.add_input(column);
        }
        for column in output_schema.iter() {
            config.add_output(column);
        }
        config
    }
}

/// Compute the dims vector for one column
///
/// The leading dim is the batch cardinality and is always -1. With explicit
/// shape dims beyond the batch dim, each is kept when fixed and replaced by
/// -1 when unknown or a min/max range. Otherwise a list column maps to its
/// fixed length when one is declared, -1 when ragged, and a scalar column
/// maps to the unit feature dim.
pub fn compute_dims(column: &ColumnSchema) -> Vec<i64> {
    if let Some(shape) = column.dims.as_ref().filter(|dims| dims.len() > 1) {
        let mut dims = Vec::with_capacity(shape.len());
        dims.push(-1);
        for dim in &shape[1..] {
            dims.push(match dim {
                Dim::Fixed(n) => *n,
                Dim::Unknown | Dim::Range { .. } => -1,
            });
        }
        return dims;
    }

    if column.is_list {
        match column.fixed_list_length() {
            Some(length) => vec![-1, length],
            None => vec![-1, -1],
        }
    } else {
        vec![-1, 1]
    }
}

/// Tensor descriptors for one column
///
/// A ragged list column is carried on the wire as two tensors, the flat
/// values and the int32 row offsets, both named after the column. Every
/// other column maps to a single tensor.
pub fn tensor_configs(column: &ColumnSchema) -> Vec<TensorConfig> {
    let dims = compute_dims(column);
    if column.is_list && column.is_ragged {
        vec![
            TensorConfig::new(
                format!("{}{}", column.name, VALUES_SUFFIX),
                column.dtype,
                dims.clone(),
            ),
            TensorConfig::new(
                format!("{}{}", column.name, OFFSETS_SUFFIX),
                DType::Int32,
                dims,
            ),
        ]
    } else {
        vec![TensorConfig::new(&column.name, column.dtype, dims)]
    }
}

/// Wire name for an element type in the serving config
pub fn data_type_str(dtype: DType) -> &'static str {
    match dtype {
        DType::Bool => "TYPE_BOOL",
        DType::UInt8 => "TYPE_UINT8",
        DType::UInt16 => "TYPE_UINT16",
        DType::UInt32 => "TYPE_UINT32",
        DType::UInt64 => "TYPE_UINT64",
        DType::Int8 => "TYPE_INT8",
        DType::Int16 => "TYPE_INT16",
        DType::Int32 => "TYPE_INT32",
        DType::Int64 => "TYPE_INT64",
        DType::Float16 => "TYPE_FP16",
        DType::Float32 => "TYPE_FP32",
        DType::Float64 => "TYPE_FP64",
        DType::String => "TYPE_STRING",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_column_dims() {
        let col = ColumnSchema::new("col", DType::Float32);
        assert_eq!(compute_dims(&col), vec![-1, 1]);
    }

    #[test]
    fn test_list_column_dims() {
        let col = ColumnSchema::new("col", DType::Float32).as_list();
        assert_eq!(compute_dims(&col), vec![-1, -1]);
    }

    #[test]
    fn test_fixed_second_dim() {
        let col =
            ColumnSchema::new("col", DType::Float32).with_dims(vec![Dim::Unknown, Dim::Fixed(2)]);
        assert_eq!(compute_dims(&col), vec![-1, 2]);
    }

    #[test]
    fn test_unknown_second_dim() {
        let col =
            ColumnSchema::new("col", DType::Float32).with_dims(vec![Dim::Unknown, Dim::Unknown]);
        assert_eq!(compute_dims(&col), vec![-1, -1]);
    }

    #[test]
    fn test_range_second_dim() {
        let col = ColumnSchema::new("col", DType::Float32)
            .with_dims(vec![Dim::Unknown, Dim::Range { min: 1, max: 4 }]);
        assert_eq!(compute_dims(&col), vec![-1, -1]);
    }

    #[test]
    fn test_fully_specified_dims() {
        let col = ColumnSchema::new("col", DType::Float32).with_dims(vec![
            Dim::Unknown,
            Dim::Fixed(3),
            Dim::Fixed(4),
        ]);
        assert_eq!(compute_dims(&col), vec![-1, 3, 4]);
    }

    #[test]
    fn test_fixed_length_list_dims() {
        let col = ColumnSchema::new("col", DType::Int64).with_fixed_list_length(3);
        assert_eq!(compute_dims(&col), vec![-1, 3]);
    }

    #[test]
    fn test_scalar_tensor_configs() {
        let col = ColumnSchema::new("age", DType::Float32);
        let tensors = tensor_configs(&col);
        assert_eq!(tensors.len(), 1);
        assert_eq!(tensors[0].name, "age");
        assert_eq!(tensors[0].dims, vec![-1, 1]);
    }

    #[test]
    fn test_ragged_list_tensor_pair() {
        let col = ColumnSchema::new("genres", DType::Int64).as_list();
        let tensors = tensor_configs(&col);
        assert_eq!(tensors.len(), 2);
        assert_eq!(tensors[0].name, "genres__values");
        assert_eq!(tensors[0].data_type, DType::Int64);
        assert_eq!(tensors[1].name, "genres__offsets");
        assert_eq!(tensors[1].data_type, DType::Int32);
        assert_eq!(tensors[1].dims, vec![-1, -1]);
    }

    #[test]
    fn test_for_saved_model_fills_identifiers() {
        let inputs = Schema::from(vec![
            ColumnSchema::new("a", DType::Float32),
            ColumnSchema::new("b", DType::Float32),
        ]);
        let outputs = Schema::from(vec![ColumnSchema::new("c", DType::Float32)]);

        let config = ModelConfig::for_saved_model("0_predictor", &inputs, &outputs);
        assert_eq!(config.backend, TENSORFLOW_BACKEND);
        assert_eq!(config.platform, SAVEDMODEL_PLATFORM);
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.outputs.len(), 1);
        assert_eq!(
            config.parameters,
            vec![
                (TF_GRAPH_TAG.to_string(), "serve".to_string()),
                (TF_SIGNATURE_DEF.to_string(), "serving_default".to_string()),
            ]
        );
    }

    #[test]
    fn test_data_type_wire_names() {
        assert_eq!(data_type_str(DType::Float32), "TYPE_FP32");
        assert_eq!(data_type_str(DType::Int64), "TYPE_INT64");
        assert_eq!(data_type_str(DType::String), "TYPE_STRING");
    }
}
