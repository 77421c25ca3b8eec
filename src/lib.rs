//! Adapter service for the "Blame Charles" frontend
//!
//! Forwards a fixed blame prompt to Gemini and a caller-supplied blame text to
//! Imagen, then reshapes their responses into the small envelopes the frontend
//! expects. Every request is stateless and bounded by a single deadline.

pub mod ai;
pub mod deadline;
pub mod error;
pub mod handler;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
