//! Pure functions for converting values to and from store text.
//!
//! Values are stored as JSON so entries stay human-readable in `redis-cli`.

use serde::{de::DeserializeOwned, Serialize};

use super::{Result, StoreError};

/// Serializes a value to JSON text.
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Deserializes JSON text to a value.
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
}
