//! Inference client boundary
//!
//! The exporter never executes models itself. At transform time it marshals
//! columns into an [`InferenceRequest`], hands it to an [`InferenceClient`],
//! and reads named tensors back out of the [`InferenceResponse`]. The
//! client is the seam to the external serving runtime; in tests it is a
//! local stub.

use crate::columns::{ColumnData, TensorValue};
use crate::error::Result;

/// One synchronous inference call against a served model
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Package name the model serves under
    pub model_name: String,
    /// Named input tensors, in schema order
    pub inputs: Vec<(String, TensorValue)>,
    /// Names of the output tensors to return
    pub requested_outputs: Vec<String>,
}

impl InferenceRequest {
    /// Create a request against the named served model
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            inputs: Vec::new(),
            requested_outputs: Vec::new(),
        }
    }

    /// Append a named input tensor
    pub fn with_input(mut self, name: impl Into<String>, value: TensorValue) -> Self {
        self.inputs.push((name.into(), value));
        self
    }

    /// Set the output tensor names to request
    pub fn with_requested_outputs(mut self, names: Vec<String>) -> Self {
        self.requested_outputs = names;
        self
    }
}

/// Named output tensors returned from an inference call
#[derive(Debug, Clone, Default)]
pub struct InferenceResponse {
    outputs: ColumnData,
}

impl InferenceResponse {
    /// Wrap a set of output columns
    pub fn new(outputs: ColumnData) -> Self {
        Self { outputs }
    }

    /// Look up one output tensor by name
    pub fn output(&self, name: &str) -> Option<&TensorValue> {
        self.outputs.get(name)
    }

    /// All output columns
    pub fn outputs(&self) -> &ColumnData {
        &self.outputs
    }
}

/// Synchronous connection to a serving runtime
///
/// Implementations execute the request against the named served model and
/// return its outputs, or report the runtime's error verbatim. No retries
/// or shape validation happen at this boundary.
pub trait InferenceClient {
    /// Execute one inference call
    fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse>;
}
