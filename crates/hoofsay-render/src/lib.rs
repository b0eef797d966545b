//! Rendering engine for hoofsay.
//!
//! Turns a pony template, a message and a balloon style into a terminal
//! byte stream: directive expansion, colour-scope-aware emission,
//! column-true word wrapping and balloon drawing. The engine is synchronous
//! and one-shot; it owns no I/O and touches no global state, so the caller
//! decides where the stream goes.

pub mod balloon;
pub mod error;
pub mod metadata;
pub mod scope;
pub mod template;
pub mod width;
pub mod wrap;

pub use balloon::{BalloonStyle, Justify};
pub use error::UndefinedVariableError;
pub use template::{InfoLevel, RenderOptions, render};
