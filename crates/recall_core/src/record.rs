use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A page as known to the retrieval service.
///
/// Identity is the URL. Everything else the service returns (the reference
/// backend sends `text` and `timestamp`) is kept verbatim in `metadata` so it
/// survives the round trip back through `openAndHighlight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl PageRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.metadata.get("text").and_then(Value::as_str)
    }

    /// Seconds since the Unix epoch at which the page was indexed.
    pub fn timestamp(&self) -> Option<f64> {
        self.metadata.get("timestamp").and_then(Value::as_f64)
    }
}

/// Success payload of an index submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReceipt {
    #[serde(default)]
    pub status: Option<String>,
    pub id: u64,
}
