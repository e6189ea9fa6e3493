//! Serving configuration generation
//!
//! Builds the backend configuration for an exported model package:
//! - Tensor descriptors (name, data type, dims) derived from column schemas
//! - Dimension vector computation with the leading batch dim pinned to -1
//! - Ragged list expansion into `__values`/`__offsets` tensor pairs
//! - Text serialization to `config.pbtxt`

mod model_config;
mod pbtxt;

pub use model_config::{
    compute_dims, data_type_str, tensor_configs, ModelConfig, TensorConfig, OFFSETS_SUFFIX,
    SAVEDMODEL_PLATFORM, TENSORFLOW_BACKEND, TF_GRAPH_TAG, TF_SIGNATURE_DEF, VALUES_SUFFIX,
};
pub use pbtxt::{PbtxtExporter, CONFIG_FILE_NAME};
