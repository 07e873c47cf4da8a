//! Command-line value resolution for `ShapeWire`.
//!
//! Flat strings such as `Name=demo,Tags=[a,b]` are split by [`lex`] and then
//! coerced against a [`ShapeModel`](shapewire_model::ShapeModel) by
//! [`CliResolver`]. Resolution never rejects malformed leaves; they become
//! the zero value of their kind.

pub mod lexer;
pub mod resolve;

pub use lexer::{CliValue, lex, map_literal, split_list, strip_brackets};
pub use resolve::{CliResolver, coerce_scalar, resolve};
