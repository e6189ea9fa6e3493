//! Serving-time integration
//!
//! Everything that touches the external serving runtime lives here:
//! - The [`InferenceClient`] boundary and its request/response types
//! - The [`InferenceOperator`] trait packaged operators implement
//! - [`Ensemble`] pipelines that export and transform a chain of operators

mod client;
mod ensemble;

pub use client::{InferenceClient, InferenceRequest, InferenceResponse};
pub use ensemble::{
    Ensemble, EnsembleExport, ExportOptions, InferenceOperator, DEFAULT_ENSEMBLE_NAME,
    DEFAULT_MODEL_VERSION,
};
