//! The engine facade: one loaded model plus its configuration.

use std::path::Path;

use shapewire_model::{ShapeModel, ShapeSet, Value};
use shapewire_protocol::{ProtocolAdapter, adapter_for, decode_json, encode_json};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{ShapeWireError, ShapeWireResult};

/// Transcodes values of one service model.
#[derive(Debug, Clone)]
pub struct Engine {
    set: ShapeSet,
    config: EngineConfig,
}

impl Engine {
    /// An engine over an already built shape set.
    #[must_use]
    pub fn new(set: ShapeSet, config: EngineConfig) -> Self {
        Self { set, config }
    }

    /// Load a JSON model document.
    pub fn from_model_json(json: &str, config: EngineConfig) -> ShapeWireResult<Self> {
        let set = ShapeSet::from_json(json)?;
        info!(shapes = set.len(), "loaded shape model");
        Ok(Self::new(set, config))
    }

    /// Load a JSON model document from `path`.
    pub fn from_model_file(path: impl AsRef<Path>, config: EngineConfig) -> ShapeWireResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ShapeWireError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let set = ShapeSet::from_slice(&bytes)?;
        info!(path = %path.display(), shapes = set.len(), "loaded shape model");
        Ok(Self::new(set, config))
    }

    /// The loaded shapes.
    #[must_use]
    pub fn shapes(&self) -> &ShapeSet {
        &self.set
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn model<'a>(&'a self, shape: &'a str) -> ShapeWireResult<ShapeModel<'a>> {
        Ok(self.set.root(shape)?)
    }

    /// Decode an XML document against `shape`.
    pub fn decode_xml(&self, xml: &[u8], shape: &str) -> ShapeWireResult<Value> {
        let model = self.model(shape)?;
        debug!(shape, bytes = xml.len(), "decoding xml");
        Ok(shapewire_xml::unmarshal(
            xml,
            &self.set,
            &model,
            &self.config.decode_options(),
            self.config.unmarshal_options(),
        )?)
    }

    /// Decode an operation's XML response body, honoring its result wrapper.
    pub fn decode_output_xml(&self, xml: &[u8], operation: &str) -> ShapeWireResult<Value> {
        let op = self
            .set
            .operation(operation)
            .ok_or_else(|| ShapeWireError::UnknownOperation(operation.to_owned()))?;
        let shape = op
            .output
            .as_deref()
            .ok_or_else(|| ShapeWireError::NoOutput(operation.to_owned()))?;
        let mut model = self.model(shape)?;
        if let Some(wrapper) = op.result_wrapper.as_deref() {
            model = model.with_result_wrapper(wrapper);
        }
        debug!(operation, shape, "decoding operation output");
        Ok(shapewire_xml::unmarshal(
            xml,
            &self.set,
            &model,
            &self.config.decode_options(),
            self.config.unmarshal_options(),
        )?)
    }

    /// Encode `value` as an XML document rooted at `shape`.
    pub fn encode_xml(&self, value: &Value, shape: &str) -> ShapeWireResult<Vec<u8>> {
        let model = self.model(shape)?;
        Ok(shapewire_xml::marshal(value, &self.set, &model)?)
    }

    /// Decode a JSON document against `shape`.
    pub fn decode_json(&self, json: &[u8], shape: &str) -> ShapeWireResult<Value> {
        let model = self.model(shape)?;
        Ok(decode_json(
            json,
            &self.set,
            &model,
            self.config.unmarshal_options(),
        )?)
    }

    /// Encode `value` as JSON shaped by `shape`.
    pub fn encode_json(&self, value: &Value, shape: &str) -> ShapeWireResult<Vec<u8>> {
        let model = self.model(shape)?;
        Ok(encode_json(value, &self.set, &model)?)
    }

    /// Resolve a flat command-line string against `shape`.
    pub fn resolve_cli(&self, raw: &str, shape: &str) -> ShapeWireResult<Value> {
        let model = self.model(shape)?;
        Ok(shapewire_cli::resolve(raw, &self.set, &model)?)
    }

    /// The protocol adapter named by the model metadata.
    pub fn adapter(&self) -> ShapeWireResult<Box<dyn ProtocolAdapter + '_>> {
        Ok(adapter_for(&self.set, self.config.adapter_options())?)
    }
}
