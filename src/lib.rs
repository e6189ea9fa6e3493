//! Servepack - model packaging for inference serving
//!
//! This crate turns trained models into packages an inference-serving
//! runtime can load directly:
//! - Schema derivation from a model's serving signature
//! - Serving config generation (tensor names, types, dims) as `config.pbtxt`
//! - Versioned package directories bundling the model artifact
//! - Transform-time marshalling through a synchronous inference client
//!
//! # Modules
//!
//! ## Schema & Data
//! - [`schema`] - Column schemas for input/output tensor sets
//! - [`columns`] - Named tensor containers crossing the inference boundary
//! - [`model`] - Model artifacts and serving signatures
//!
//! ## Packaging
//! - [`config`] - Serving config generation and text serialization
//! - [`export`] - Model package export to disk
//!
//! ## Serving
//! - [`serving`] - Inference client boundary and pipeline assembly

// Core error handling
pub mod error;

// Schema and data containers
pub mod schema;
pub mod columns;
pub mod model;

// Packaging
pub mod config;
pub mod export;

// Serving integration
pub mod serving;

pub use error::{ExportError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ExportError, Result};

    // Schemas
    pub use crate::schema::{ColumnSchema, DType, Dim, Schema, ValueCount};

    // Data containers
    pub use crate::columns::{ColumnData, TensorValue};

    // Models
    pub use crate::model::{SavedModel, ServableModel, Signature, TensorSpec};

    // Serving config
    pub use crate::config::{compute_dims, ModelConfig, PbtxtExporter, TensorConfig};

    // Package export
    pub use crate::export::{copy_dir_recursive, PredictSavedModel, MODEL_SUBDIR};

    // Serving
    pub use crate::serving::{
        Ensemble, EnsembleExport, ExportOptions, InferenceClient, InferenceOperator,
        InferenceRequest, InferenceResponse,
    };
}
