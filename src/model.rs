//! Model artifacts and serving signatures
//!
//! A serving signature is a model's declared set of named input and output
//! tensors with element types and shapes. A [`SavedModel`] is the
//! self-contained on-disk artifact form: a directory with a
//! `saved_model.json` metadata file (carrying the signature) and a
//! `variables/` payload. Any model that can describe and persist itself this
//! way implements [`ServableModel`] and can be packaged for serving.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::schema::DType;

/// Metadata file inside a saved-model artifact directory
pub const ARTIFACT_METADATA_FILE: &str = "saved_model.json";

/// Format tag written into the metadata file
const ARTIFACT_FORMAT: &str = "servepack.savedmodel";

const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Descriptor for one named tensor in a serving signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorSpec {
    /// Tensor name
    pub name: String,
    /// Element type
    pub dtype: DType,
    /// Shape extents; `None` marks a dynamic dimension
    pub shape: Vec<Option<i64>>,
}

impl TensorSpec {
    /// Create a tensor descriptor
    pub fn new(name: impl Into<String>, dtype: DType, shape: Vec<Option<i64>>) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
        }
    }
}

/// A model's declared serving signature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

impl Signature {
    /// Create a signature from input and output tensor descriptors
    pub fn new(inputs: Vec<TensorSpec>, outputs: Vec<TensorSpec>) -> Self {
        Self { inputs, outputs }
    }
}

/// A model that can be packaged for serving
///
/// The two capabilities the exporter needs from a model: introspecting its
/// serving signature, and persisting itself as a self-contained artifact
/// directory. A model may legitimately expose no live signature; the
/// exporter then regenerates one by saving and reloading the artifact.
pub trait ServableModel {
    /// The model's declared serving signature, if any
    fn serving_signature(&self) -> Option<Signature>;

    /// Persist the model as a self-contained artifact directory
    fn save(&self, dir: &Path) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactMetadata {
    format: String,
    format_version: u32,
    signature: Option<Signature>,
}

/// A self-contained model artifact loaded from (or destined for) disk
#[derive(Debug, Clone)]
pub struct SavedModel {
    signature: Option<Signature>,
    source: Option<PathBuf>,
}

impl SavedModel {
    /// Load an artifact directory
    ///
    /// Fails with [`ExportError::PathNotFound`] when the directory does not
    /// exist and [`ExportError::InvalidArtifact`] when it is not a
    /// saved-model artifact.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ExportError::PathNotFound {
                path: dir.to_path_buf(),
            });
        }

        let metadata_path = dir.join(ARTIFACT_METADATA_FILE);
        if !metadata_path.exists() {
            return Err(ExportError::InvalidArtifact {
                path: dir.to_path_buf(),
                reason: format!("missing {ARTIFACT_METADATA_FILE}"),
            });
        }

        let raw = fs::read_to_string(&metadata_path)?;
        let metadata: ArtifactMetadata = serde_json::from_str(&raw)?;
        if metadata.format != ARTIFACT_FORMAT {
            return Err(ExportError::InvalidArtifact {
                path: dir.to_path_buf(),
                reason: format!("unrecognized format tag '{}'", metadata.format),
            });
        }

        Ok(Self {
            signature: metadata.signature,
            source: Some(dir.to_path_buf()),
        })
    }

    /// Create an in-memory saved model carrying a signature
    pub fn from_signature(signature: Signature) -> Self {
        Self {
            signature: Some(signature),
            source: None,
        }
    }

    /// The directory this model was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The stored serving signature, if any
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Write a saved-model artifact directory holding `signature`
    ///
    /// Creates the metadata file and an (initially empty) `variables/`
    /// payload; model implementations with real weights append to it.
    pub fn write_artifact(dir: &Path, signature: Option<&Signature>) -> Result<()> {
        let variables_dir = dir.join("variables");
        fs::create_dir_all(&variables_dir)?;

        let metadata = ArtifactMetadata {
            format: ARTIFACT_FORMAT.to_string(),
            format_version: ARTIFACT_FORMAT_VERSION,
            signature: signature.cloned(),
        };
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(dir.join(ARTIFACT_METADATA_FILE), json)?;

        let variables_file = variables_dir.join("variables.bin");
        if !variables_file.exists() {
            fs::write(variables_file, b"")?;
        }
        Ok(())
    }
}

impl ServableModel for SavedModel {
    fn serving_signature(&self) -> Option<Signature> {
        self.signature.clone()
    }

    fn save(&self, dir: &Path) -> Result<()> {
        SavedModel::write_artifact(dir, self.signature.as_ref())
    }
}
