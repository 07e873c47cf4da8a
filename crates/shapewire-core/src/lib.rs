//! Engine facade, configuration, and errors for ShapeWire.
//!
//! [`Engine`] owns a loaded [`ShapeSet`](shapewire_model::ShapeSet) together
//! with an [`EngineConfig`] and exposes the transcoders of the other crates
//! (XML, JSON, command-line strings, protocol adapters) behind one type.

mod config;
mod engine;
mod error;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ShapeWireError, ShapeWireResult};
