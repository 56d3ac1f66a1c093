use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable description of the import a record belongs to.
///
/// `data` holds source-specific state. At the registry boundary it is raw
/// JSON; each converter reads it as its own context type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportContext<D = Value> {
    /// The service or integration the record came from, e.g. "e-amusement"
    pub service: String,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub data: D,
}

impl ImportContext<Value> {
    /// A context with no source-specific data
    pub fn new(service: impl Into<String>, user_id: Option<u64>) -> Self {
        Self {
            service: service.into(),
            user_id,
            data: Value::Object(Default::default()),
        }
    }

    pub fn typed<D: DeserializeOwned>(&self) -> Result<ImportContext<D>, serde_json::Error> {
        Ok(ImportContext {
            service: self.service.clone(),
            user_id: self.user_id,
            data: serde_json::from_value(self.data.clone())?,
        })
    }
}

impl<D: Serialize> ImportContext<D> {
    pub fn erase(&self) -> Result<ImportContext<Value>, serde_json::Error> {
        Ok(ImportContext {
            service: self.service.clone(),
            user_id: self.user_id,
            data: serde_json::to_value(&self.data)?,
        })
    }
}

/// Context data for sources that need none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyContext {}
