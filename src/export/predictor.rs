//! Saved-model packaging operator
//!
//! [`PredictSavedModel`] wraps a servable model and packages it for the
//! tensorflow serving backend. On construction it derives input and output
//! column schemas from the model's serving signature, round-tripping the
//! model through a scoped temporary directory when no signature is exposed
//! directly. Exporting materializes the versioned package directory plus
//! its `config.pbtxt`; transforming marshals columns through an
//! [`InferenceClient`] against the exported package name.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::columns::ColumnData;
use crate::config::{ModelConfig, PbtxtExporter, CONFIG_FILE_NAME};
use crate::error::{ExportError, Result};
use crate::export::fsutil::copy_dir_recursive;
use crate::model::{SavedModel, ServableModel, Signature, TensorSpec};
use crate::schema::{ColumnSchema, Schema};
use crate::serving::{ExportOptions, InferenceClient, InferenceOperator, InferenceRequest};

/// Model artifact directory name inside a version subdirectory
pub const MODEL_SUBDIR: &str = "model.savedmodel";

/// Packages a saved model for the tensorflow serving backend
pub struct PredictSavedModel {
    model: Box<dyn ServableModel>,
    source: Option<PathBuf>,
    input_schema: Schema,
    output_schema: Schema,
    served_model_name: Option<String>,
}

impl std::fmt::Debug for PredictSavedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictSavedModel")
            .field("source", &self.source)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .field("served_model_name", &self.served_model_name)
            .finish_non_exhaustive()
    }
}

impl PredictSavedModel {
    /// Wrap an in-memory model
    pub fn new(model: impl ServableModel + 'static) -> Result<Self> {
        let model: Box<dyn ServableModel> = Box::new(model);
        let (input_schema, output_schema) = derive_schemas(model.as_ref())?;
        Ok(Self {
            model,
            source: None,
            input_schema,
            output_schema,
            served_model_name: None,
        })
    }

    /// Load a model artifact from disk and wrap it
    ///
    /// The artifact directory is remembered and copied verbatim into the
    /// package on export, instead of re-saving the model.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = SavedModel::load(path)?;
        let mut operator = Self::new(model)?;
        operator.source = Some(path.to_path_buf());
        Ok(operator)
    }

    /// The artifact directory this operator was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The package name recorded by the last export, if any
    pub fn served_model_name(&self) -> Option<&str> {
        self.served_model_name.as_deref()
    }

    /// Override the served package name transform calls target
    pub fn set_served_model_name(&mut self, name: impl Into<String>) {
        self.served_model_name = Some(name.into());
    }
}

impl InferenceOperator for PredictSavedModel {
    fn export_name(&self) -> String {
        "predictsavedmodel".to_string()
    }

    fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    fn export(&mut self, path: &Path, options: &ExportOptions) -> Result<ModelConfig> {
        let node_name = match options.node_id {
            Some(id) => format!("{}_{}", id, self.export_name()),
            None => self.export_name(),
        };

        let node_export_path = path.join(&node_name);
        fs::create_dir_all(&node_export_path)?;

        let model_path = node_export_path
            .join(options.version.to_string())
            .join(MODEL_SUBDIR);
        match &self.source {
            Some(source) => copy_dir_recursive(source, &model_path)?,
            None => self.model.save(&model_path)?,
        }

        self.served_model_name = Some(node_name.clone());

        let config =
            ModelConfig::for_saved_model(&node_name, &self.input_schema, &self.output_schema);
        PbtxtExporter::new().export(&config, node_export_path.join(CONFIG_FILE_NAME))?;

        info!(
            package = %node_name,
            path = %node_export_path.display(),
            "exported saved-model package"
        );
        Ok(config)
    }

    fn transform(&self, client: &dyn InferenceClient, data: &ColumnData) -> Result<ColumnData> {
        let model_name = self
            .served_model_name
            .as_deref()
            .ok_or(ExportError::ModelNameUnset)?;

        let mut request = InferenceRequest::new(model_name)
            .with_requested_outputs(self.output_schema.column_names());
        for name in self.input_schema.column_names() {
            let value = data
                .get(&name)
                .ok_or_else(|| ExportError::ColumnNotFound(name.clone()))?;
            request = request.with_input(name, value.clone());
        }

        let response = client.infer(request)?;

        let mut outputs = ColumnData::new();
        for name in self.output_schema.column_names() {
            let value = response
                .output(&name)
                .ok_or_else(|| ExportError::ColumnNotFound(name.clone()))?;
            outputs.insert(name, value.clone());
        }
        Ok(outputs)
    }
}

/// Derive input and output schemas from a model's serving signature
///
/// Falls back to a save/reload round trip through a scoped temporary
/// directory when the model exposes no signature; fails with
/// [`ExportError::SignatureUnavailable`] when the round trip produces none
/// either.
fn derive_schemas(model: &dyn ServableModel) -> Result<(Schema, Schema)> {
    let signature = match model.serving_signature() {
        Some(signature) => signature,
        None => regenerate_signature(model)?,
    };
    Ok((
        schema_from_specs(&signature.inputs),
        schema_from_specs(&signature.outputs),
    ))
}

fn regenerate_signature(model: &dyn ServableModel) -> Result<Signature> {
    debug!("no serving signature exposed, regenerating via save/reload round trip");

    let tmp = tempfile::tempdir()?;
    let artifact_path = tmp.path().join(MODEL_SUBDIR);
    model.save(&artifact_path)?;
    let reloaded = SavedModel::load(&artifact_path)?;
    reloaded
        .signature()
        .cloned()
        .ok_or(ExportError::SignatureUnavailable)
}

fn schema_from_specs(specs: &[TensorSpec]) -> Schema {
    let mut schema = Schema::new();
    for spec in specs {
        let mut column = ColumnSchema::new(&spec.name, spec.dtype);
        // a known second dim above one means the tensor carries a
        // fixed-length list per row
        if let Some(Some(length)) = spec.shape.get(1) {
            if *length > 1 {
                column = column.with_fixed_list_length(*length);
            }
        }
        schema.insert(column);
    }
    schema
}
