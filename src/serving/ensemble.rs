//! Serving pipeline assembly
//!
//! An [`Ensemble`] is a linear pipeline of [`InferenceOperator`]s behind one
//! request schema. Exporting an ensemble materializes one model package per
//! operator, numbering the package directories by pipeline position.
//! Transforming runs the operators in order, feeding each one's outputs to
//! the next; any operator failure aborts the run and surfaces unchanged to
//! the caller.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::columns::ColumnData;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::schema::Schema;
use crate::serving::client::InferenceClient;

/// Package version used when none is requested
pub const DEFAULT_MODEL_VERSION: u32 = 1;

/// Name an ensemble serves under when none is configured
pub const DEFAULT_ENSEMBLE_NAME: &str = "executor_model";

/// Placement options for one package export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Position prefix for the package directory name, omitted when `None`
    pub node_id: Option<usize>,
    /// Version subdirectory the model artifact lands in
    pub version: u32,
}

impl ExportOptions {
    /// Options with no node prefix and the default version
    pub fn new() -> Self {
        Self {
            node_id: None,
            version: DEFAULT_MODEL_VERSION,
        }
    }

    /// Set the node id prefix
    pub fn with_node_id(mut self, node_id: usize) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Set the version subdirectory
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An operator that can be packaged for serving and invoked at transform time
pub trait InferenceOperator {
    /// Identifier used to build the package directory name
    fn export_name(&self) -> String;

    /// Columns the operator consumes
    fn input_schema(&self) -> &Schema;

    /// Columns the operator produces
    fn output_schema(&self) -> &Schema;

    /// Materialize the operator's model package under `path`
    ///
    /// The package directory is named `<node_id>_<export_name>`, or just
    /// `<export_name>` when no node id is given. Returns the serving config
    /// written into the package.
    fn export(&mut self, path: &Path, options: &ExportOptions) -> Result<ModelConfig>;

    /// Marshal `data` through the served model and return its outputs
    fn transform(&self, client: &dyn InferenceClient, data: &ColumnData) -> Result<ColumnData>;
}

/// Summary of one ensemble export
#[derive(Debug, Clone)]
pub struct EnsembleExport {
    /// Name the assembled pipeline serves under
    pub name: String,
    /// Config of each exported node package, in pipeline order
    pub node_configs: Vec<ModelConfig>,
}

/// A linear pipeline of inference operators serving one request schema
pub struct Ensemble {
    name: String,
    request_schema: Schema,
    operators: Vec<Box<dyn InferenceOperator>>,
}

impl Ensemble {
    /// Create an empty pipeline answering requests shaped by `request_schema`
    pub fn new(request_schema: Schema) -> Self {
        Self {
            name: DEFAULT_ENSEMBLE_NAME.to_string(),
            request_schema,
            operators: Vec::new(),
        }
    }

    /// Set the name the pipeline serves under
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append an operator to the pipeline
    pub fn with_operator(mut self, operator: Box<dyn InferenceOperator>) -> Self {
        self.operators.push(operator);
        self
    }

    /// The pipeline's serving name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema of the requests the pipeline is served behind
    pub fn request_schema(&self) -> &Schema {
        &self.request_schema
    }

    /// Columns the pipeline consumes: the first operator's inputs, or the
    /// request schema itself when the pipeline is empty
    pub fn input_schema(&self) -> &Schema {
        self.operators
            .first()
            .map(|operator| operator.input_schema())
            .unwrap_or(&self.request_schema)
    }

    /// Columns the pipeline produces: the last operator's outputs, or the
    /// request schema itself when the pipeline is empty
    pub fn output_schema(&self) -> &Schema {
        self.operators
            .last()
            .map(|operator| operator.output_schema())
            .unwrap_or(&self.request_schema)
    }

    /// Number of operators in the pipeline
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether the pipeline has no operators
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Export every operator's model package under `path`
    ///
    /// Each operator gets its pipeline position as node id, so repeated
    /// exports of the same pipeline produce the same directory names.
    pub fn export(&mut self, path: impl AsRef<Path>) -> Result<EnsembleExport> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;

        let mut node_configs = Vec::with_capacity(self.operators.len());
        for (node_id, operator) in self.operators.iter_mut().enumerate() {
            let options = ExportOptions::new().with_node_id(node_id);
            let config = operator.export(path, &options)?;
            info!(package = %config.name, "exported model package");
            node_configs.push(config);
        }

        Ok(EnsembleExport {
            name: self.name.clone(),
            node_configs,
        })
    }

    /// Run the pipeline over `data`, one operator at a time
    ///
    /// Operator errors are not caught here; they propagate verbatim so the
    /// top-level caller sees the original failure.
    pub fn transform(&self, client: &dyn InferenceClient, data: &ColumnData) -> Result<ColumnData> {
        let mut current = data.clone();
        for operator in &self.operators {
            current = operator.transform(client, &current)?;
        }
        Ok(current)
    }
}

impl Default for Ensemble {
    fn default() -> Self {
        Self::new(Schema::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::TensorValue;
    use crate::error::ExportError;
    use crate::schema::{ColumnSchema, DType};
    use crate::serving::client::{InferenceRequest, InferenceResponse};
    use ndarray::ArrayD;

    struct PassthroughClient;

    impl InferenceClient for PassthroughClient {
        fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse> {
            let mut outputs = ColumnData::new();
            for (name, value) in request.inputs {
                outputs.insert(name, value);
            }
            Ok(InferenceResponse::new(outputs))
        }
    }

    struct RenameOperator {
        from: String,
        to: String,
        inputs: Schema,
        outputs: Schema,
    }

    impl RenameOperator {
        fn new(from: &str, to: &str) -> Self {
            Self {
                from: from.to_string(),
                to: to.to_string(),
                inputs: Schema::from(vec![ColumnSchema::new(from, DType::Float32)]),
                outputs: Schema::from(vec![ColumnSchema::new(to, DType::Float32)]),
            }
        }
    }

    impl InferenceOperator for RenameOperator {
        fn export_name(&self) -> String {
            "rename".to_string()
        }

        fn input_schema(&self) -> &Schema {
            &self.inputs
        }

        fn output_schema(&self) -> &Schema {
            &self.outputs
        }

        fn export(&mut self, path: &Path, options: &ExportOptions) -> Result<ModelConfig> {
            let node_name = match options.node_id {
                Some(id) => format!("{}_{}", id, self.export_name()),
                None => self.export_name(),
            };
            fs::create_dir_all(path.join(&node_name))?;
            Ok(ModelConfig::new(node_name))
        }

        fn transform(
            &self,
            _client: &dyn InferenceClient,
            data: &ColumnData,
        ) -> Result<ColumnData> {
            let value = data
                .get(&self.from)
                .ok_or_else(|| ExportError::ColumnNotFound(self.from.clone()))?;
            let mut out = ColumnData::new();
            out.insert(self.to.clone(), value.clone());
            Ok(out)
        }
    }

    struct FailingOperator {
        schema: Schema,
    }

    impl FailingOperator {
        fn new() -> Self {
            Self {
                schema: Schema::new(),
            }
        }
    }

    impl InferenceOperator for FailingOperator {
        fn export_name(&self) -> String {
            "failing".to_string()
        }

        fn input_schema(&self) -> &Schema {
            &self.schema
        }

        fn output_schema(&self) -> &Schema {
            &self.schema
        }

        fn export(&mut self, _path: &Path, _options: &ExportOptions) -> Result<ModelConfig> {
            Ok(ModelConfig::new("failing"))
        }

        fn transform(
            &self,
            _client: &dyn InferenceClient,
            _data: &ColumnData,
        ) -> Result<ColumnData> {
            Err(ExportError::InferenceFailure("Number Too High!!".to_string()))
        }
    }

    fn scalar(value: f32) -> TensorValue {
        TensorValue::Float32(ArrayD::from_shape_vec(vec![1, 1], vec![value]).unwrap())
    }

    fn request_schema() -> Schema {
        Schema::from(vec![ColumnSchema::new("a", DType::Float32)])
    }

    #[test]
    fn test_transform_chains_operators() {
        let ensemble = Ensemble::new(request_schema())
            .with_operator(Box::new(RenameOperator::new("a", "b")))
            .with_operator(Box::new(RenameOperator::new("b", "c")));

        let mut data = ColumnData::new();
        data.insert("a", scalar(1.0));

        let out = ensemble.transform(&PassthroughClient, &data).unwrap();
        assert_eq!(out.names(), vec!["c"]);
    }

    #[test]
    fn test_transform_surfaces_operator_error() {
        let ensemble = Ensemble::new(request_schema())
            .with_operator(Box::new(RenameOperator::new("a", "b")))
            .with_operator(Box::new(FailingOperator::new()));

        let mut data = ColumnData::new();
        data.insert("a", scalar(1.0));

        let err = ensemble.transform(&PassthroughClient, &data).unwrap_err();
        assert!(err.to_string().contains("Number Too High!!"));
    }

    #[test]
    fn test_export_numbers_nodes_by_position() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut ensemble = Ensemble::new(request_schema())
            .with_operator(Box::new(RenameOperator::new("a", "b")))
            .with_operator(Box::new(RenameOperator::new("b", "c")));

        let export = ensemble.export(tmp.path()).unwrap();
        assert_eq!(export.name, DEFAULT_ENSEMBLE_NAME);
        assert_eq!(export.node_configs.len(), 2);
        assert_eq!(export.node_configs[0].name, "0_rename");
        assert_eq!(export.node_configs[1].name, "1_rename");
        assert!(tmp.path().join("0_rename").is_dir());
        assert!(tmp.path().join("1_rename").is_dir());
    }

    #[test]
    fn test_ensemble_named() {
        let ensemble = Ensemble::new(request_schema()).with_name("ranking");
        assert_eq!(ensemble.name(), "ranking");
        assert!(ensemble.is_empty());
    }

    #[test]
    fn test_schemas_follow_pipeline_ends() {
        let ensemble = Ensemble::new(request_schema())
            .with_operator(Box::new(RenameOperator::new("a", "b")))
            .with_operator(Box::new(RenameOperator::new("b", "c")));

        assert_eq!(ensemble.request_schema().column_names(), vec!["a"]);
        assert_eq!(ensemble.input_schema().column_names(), vec!["a"]);
        assert_eq!(ensemble.output_schema().column_names(), vec!["c"]);
    }

    #[test]
    fn test_empty_pipeline_schemas_mirror_request() {
        let ensemble = Ensemble::new(request_schema());
        assert_eq!(ensemble.input_schema().column_names(), vec!["a"]);
        assert_eq!(ensemble.output_schema().column_names(), vec!["a"]);
    }
}
