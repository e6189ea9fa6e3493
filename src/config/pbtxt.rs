//! Text serialization of serving configs
//!
//! Writes a [`ModelConfig`] in the protobuf text format the serving runtime
//! reads from `config.pbtxt`. Fields are emitted in wire order: name,
//! platform, inputs, outputs, parameters, backend.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::model_config::{data_type_str, ModelConfig, TensorConfig};
use crate::error::{ExportError, Result};

/// Config file name inside a model package
pub const CONFIG_FILE_NAME: &str = "config.pbtxt";

/// Serving config exporter
pub struct PbtxtExporter;

impl PbtxtExporter {
    /// Create new exporter
    pub fn new() -> Self {
        Self
    }

    /// Export a config to a file
    pub fn export(&self, config: &ModelConfig, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_config(&mut writer, config)?;
        writer.flush()?;
        Ok(())
    }

    /// Export to string
    pub fn export_to_string(&self, config: &ModelConfig) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_config(&mut buffer, config)?;
        String::from_utf8(buffer)
            .map_err(|e| ExportError::Serialization(format!("Invalid UTF-8: {}", e)))
    }

    fn write_config<W: Write>(&self, writer: &mut W, config: &ModelConfig) -> Result<()> {
        writeln!(writer, "name: \"{}\"", Self::escape(&config.name))?;
        if !config.platform.is_empty() {
            writeln!(writer, "platform: \"{}\"", Self::escape(&config.platform))?;
        }

        for input in &config.inputs {
            self.write_tensor(writer, "input", input)?;
        }
        for output in &config.outputs {
            self.write_tensor(writer, "output", output)?;
        }

        for (key, value) in &config.parameters {
            self.write_parameter(writer, key, value)?;
        }

        if !config.backend.is_empty() {
            writeln!(writer, "backend: \"{}\"", Self::escape(&config.backend))?;
        }
        Ok(())
    }

    fn write_tensor<W: Write>(
        &self,
        writer: &mut W,
        label: &str,
        tensor: &TensorConfig,
    ) -> Result<()> {
        writeln!(writer, "{} {{", label)?;
        writeln!(writer, "  name: \"{}\"", Self::escape(&tensor.name))?;
        writeln!(writer, "  data_type: {}", data_type_str(tensor.data_type))?;
        for dim in &tensor.dims {
            writeln!(writer, "  dims: {}", dim)?;
        }
        writeln!(writer, "}}")?;
        Ok(())
    }

    fn write_parameter<W: Write>(&self, writer: &mut W, key: &str, value: &str) -> Result<()> {
        writeln!(writer, "parameters {{")?;
        writeln!(writer, "  key: \"{}\"", Self::escape(key))?;
        writeln!(writer, "  value {{")?;
        writeln!(writer, "    string_value: \"{}\"", Self::escape(value))?;
        writeln!(writer, "  }}")?;
        writeln!(writer, "}}")?;
        Ok(())
    }

    fn escape(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

impl Default for PbtxtExporter {
    fn default() -> Self {
        Self::new()
    }
}
