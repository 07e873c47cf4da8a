//! Configuration for the ShapeWire engine.
//!
//! All configuration is driven by environment variables.

use shapewire_protocol::AdapterOptions;
use shapewire_xml::{CharDataMode, DecodeOptions, UnmarshalOptions};

/// Global configuration for ShapeWire.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Character data handling: `last` or `concat`.
    pub char_data: String,
    /// Fail when a document ends inside an element.
    pub strict_eof: bool,
    /// Fail when a decoded structure lacks a required member.
    pub enforce_required: bool,
    /// Log level.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            char_data: "last".to_owned(),
            strict_eof: false,
            enforce_required: true,
            log_level: "info".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("SHAPEWIRE_CHAR_DATA") {
            config.char_data = v;
        }
        if let Some(v) = lookup("SHAPEWIRE_STRICT_EOF") {
            config.strict_eof = flag(&v);
        }
        if let Some(v) = lookup("SHAPEWIRE_ENFORCE_REQUIRED") {
            config.enforce_required = flag(&v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Tree construction options.
    ///
    /// An unrecognized `char_data` spelling keeps the default.
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        let char_data = CharDataMode::from_name(&self.char_data).unwrap_or_else(|| {
            tracing::warn!(value = %self.char_data, "unknown char data mode, keeping last run");
            CharDataMode::default()
        });
        DecodeOptions {
            char_data,
            strict_eof: self.strict_eof,
        }
    }

    /// Shape-driven decoding options.
    #[must_use]
    pub fn unmarshal_options(&self) -> UnmarshalOptions {
        UnmarshalOptions {
            enforce_required: self.enforce_required,
        }
    }

    /// Options for the protocol adapters.
    #[must_use]
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            decode: self.decode_options(),
            unmarshal: self.unmarshal_options(),
        }
    }
}

fn flag(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
