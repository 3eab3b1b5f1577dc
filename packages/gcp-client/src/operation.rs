//! Long-running operations (`google.longrunning.Operation`).

use crate::error::{GcpError, Result, RpcStatus};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Handle returned by mutating calls that complete asynchronously.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcStatus>,
}

impl Operation {
    /// Response of a finished operation, or its error.
    ///
    /// Operations whose result type is `Empty` (deletes) carry no response;
    /// they resolve to an empty object.
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error {
            return Err(GcpError::Operation(error.into()));
        }
        Ok(self
            .response
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    /// Decode the response of a finished operation.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let name = self.name.clone();
        let value = self.into_result()?;
        serde_json::from_value(value).map_err(|e| {
            GcpError::Parse(format!("Failed to decode result of operation {}: {}", name, e))
        })
    }
}
