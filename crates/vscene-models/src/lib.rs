//! Shared data models for the vscene backend.
//!
//! This crate provides Serde-serializable types for:
//! - Analysis requests and responses
//! - Scene / physics annotation schemas
//! - Callback delivery targets

pub mod callback;
pub mod request;
pub mod scene;

pub use callback::{CallbackMethod, CallbackTarget};
pub use request::{AnalyzeRequest, RequestError, SubmitRequest, SubmitAccepted};
pub use scene::{AnalyzeResponse, Physics, PhysicsObject, Scene, StructuredAnalysis};
