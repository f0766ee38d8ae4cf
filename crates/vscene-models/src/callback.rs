//! Callback delivery targets.
//!
//! Callbacks are an optional collaborator interface: each target receives
//! the terminal run payload exactly once, and delivery outcomes are
//! independent of the run's own success.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// HTTP method used for a callback delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackMethod {
    Get,
    Post,
    Put,
}

impl CallbackMethod {
    /// Returns the method as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// A single callback delivery target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackTarget {
    /// Target URL
    pub url: String,

    /// HTTP method to invoke the target with
    pub method: CallbackMethod,

    /// Headers sent with the delivery request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}
